//! Product entity type - items in the catalog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::abbrev::AbbreviationDictionary;
use crate::core::entity::{Entity, ProductStatus};
use crate::core::identity::EntityId;
use crate::core::sku::generate_sku;

/// Physical condition of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl Default for Condition {
    fn default() -> Self {
        Condition::New
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::New => write!(f, "new"),
            Condition::Used => write!(f, "used"),
            Condition::Refurbished => write!(f, "refurbished"),
        }
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "used" => Ok(Condition::Used),
            "refurbished" => Ok(Condition::Refurbished),
            _ => Err(format!(
                "Invalid condition: {}. Use new, used, or refurbished",
                s
            )),
        }
    }
}

/// A Product entity - a single catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: EntityId,

    /// Product name
    pub name: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Brand name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Hierarchical category path, segments joined by ">"
    /// (e.g. "Books > Fiction")
    #[serde(default)]
    pub category: String,

    /// Variant descriptor (color, size, binding, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,

    /// Stock keeping unit; unique across the whole catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Retail price
    #[serde(default)]
    pub price: f64,

    /// Unit cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,

    /// Units in stock
    #[serde(default)]
    pub on_hand: u32,

    /// Global trade item number (barcode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,

    /// Manufacturer part number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,

    /// Physical condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,

    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: ProductStatus,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this product)
    pub author: String,
}

impl Entity for Product {
    const PREFIX: &'static str = "PROD";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> &str {
        match self.status {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Archived => "archived",
        }
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Product {
    /// Create a new product with the given parameters
    pub fn new(name: String, category: String, author: String) -> Self {
        Self {
            id: EntityId::new(crate::core::EntityPrefix::Prod),
            name,
            description: None,
            brand: None,
            category,
            variant: None,
            sku: None,
            price: 0.0,
            cost: None,
            on_hand: 0,
            gtin: None,
            mpn: None,
            condition: None,
            tags: Vec::new(),
            status: ProductStatus::default(),
            created: Utc::now(),
            author,
        }
    }

    /// The SKU this product's fields derive to, before uniqueness checks
    pub fn generated_sku(&self, dict: &AbbreviationDictionary) -> String {
        generate_sku(
            dict,
            &self.category,
            self.brand.as_deref().unwrap_or(""),
            &self.name,
            self.variant.as_deref(),
        )
    }
}
