//! Cache type definitions

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A product row as cached from its YAML file
#[derive(Debug, Clone)]
pub struct CachedProduct {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub variant: Option<String>,
    pub sku: Option<String>,
    pub status: String,
    pub price: Option<f64>,
    pub on_hand: Option<i64>,
    pub author: String,
    pub created: DateTime<Utc>,
    pub tags: Vec<String>,
    pub file_path: PathBuf,
}

/// Filters for listing cached products
#[derive(Debug, Default)]
pub struct ProductFilter<'a> {
    /// Exact status match
    pub status: Option<&'a str>,
    /// Substring match on the category path
    pub category: Option<&'a str>,
    /// Substring match on the brand
    pub brand: Option<&'a str>,
    /// Substring match on the author
    pub author: Option<&'a str>,
    /// Substring match across name, brand, and SKU
    pub search: Option<&'a str>,
    /// Only products without a SKU
    pub missing_sku: bool,
    /// Maximum number of rows
    pub limit: Option<usize>,
}

/// A SKU carried by more than one product
#[derive(Debug, Clone)]
pub struct DuplicateSku {
    pub sku: String,
    pub product_ids: Vec<String>,
}

/// Statistics from a sync operation
#[derive(Debug, Default)]
pub struct SyncStats {
    pub files_scanned: usize,
    pub products_added: usize,
    pub products_updated: usize,
    pub products_removed: usize,
    pub duration_ms: u64,
}

/// Cache summary counts
#[derive(Debug)]
pub struct CacheStatistics {
    pub total_products: i64,
    pub with_sku: i64,
    pub missing_sku: i64,
    pub duplicate_skus: i64,
    pub db_size_bytes: u64,
}
