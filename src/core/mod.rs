//! Core domain logic: identity, configuration, SKU generation, and the
//! catalog lookup cache.

pub mod abbrev;
pub mod cache;
pub mod config;
pub mod entity;
pub mod identity;
pub mod loader;
pub mod project;
pub mod resolver;
pub mod shortid;
pub mod sku;

pub use abbrev::AbbreviationDictionary;
pub use cache::CatalogCache;
pub use config::Config;
pub use identity::{EntityId, EntityPrefix};
pub use project::Project;
pub use resolver::{sku_exists, suggest_alternate_sku, CatalogQuery, LookupError, OverlayCatalog};
pub use sku::generate_sku;
