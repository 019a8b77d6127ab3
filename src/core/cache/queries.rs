//! Query methods for retrieving cached products

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use rusqlite::{params, OptionalExtension, Row, ToSql};

use super::{parse_datetime, CachedProduct, CatalogCache, DuplicateSku, ProductFilter};
use crate::core::resolver::{CatalogQuery, LookupError};

const PRODUCT_COLUMNS: &str = "id, name, brand, category, variant, sku, status, price, on_hand, author, created, tags, file_path";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<CachedProduct> {
    let tags_str: Option<String> = row.get(11)?;
    let tags = tags_str
        .map(|s| {
            s.split(',')
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    Ok(CachedProduct {
        id: row.get(0)?,
        name: row.get(1)?,
        brand: row.get(2)?,
        category: row.get(3)?,
        variant: row.get(4)?,
        sku: row.get(5)?,
        status: row.get(6)?,
        price: row.get(7)?,
        on_hand: row.get(8)?,
        author: row.get(9)?,
        created: parse_datetime(row.get::<_, String>(10)?),
        tags,
        file_path: PathBuf::from(row.get::<_, String>(12)?),
    })
}

impl CatalogCache {
    /// Get a product by ID (exact match first, then partial)
    pub fn get_product(&self, id: &str) -> Option<CachedProduct> {
        let exact = self
            .conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                product_from_row,
            )
            .optional()
            .ok()
            .flatten();

        if exact.is_some() {
            return exact;
        }

        self.conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id LIKE ?1"),
                params![format!("%{}%", id)],
                product_from_row,
            )
            .optional()
            .ok()
            .flatten()
    }

    /// List cached products matching the given filters, ordered by name
    pub fn list_products(&self, filter: &ProductFilter) -> Vec<CachedProduct> {
        let mut sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1=1");
        let mut owned: Vec<String> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            owned.push(status.to_string());
        }
        if let Some(category) = filter.category {
            sql.push_str(" AND category LIKE ?");
            owned.push(format!("%{}%", category));
        }
        if let Some(brand) = filter.brand {
            sql.push_str(" AND brand LIKE ?");
            owned.push(format!("%{}%", brand));
        }
        if let Some(author) = filter.author {
            sql.push_str(" AND author LIKE ?");
            owned.push(format!("%{}%", author));
        }
        if let Some(search) = filter.search {
            sql.push_str(" AND (name LIKE ? OR brand LIKE ? OR sku LIKE ?)");
            let pattern = format!("%{}%", search);
            owned.push(pattern.clone());
            owned.push(pattern.clone());
            owned.push(pattern);
        }
        if filter.missing_sku {
            sql.push_str(" AND (sku IS NULL OR sku = '')");
        }

        sql.push_str(" ORDER BY name, id");

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            owned.push(limit.to_string());
        }

        let params: Vec<&dyn ToSql> = owned.iter().map(|s| s as &dyn ToSql).collect();

        let mut stmt = match self.conn.prepare(&sql) {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };

        let rows = match stmt.query_map(&params[..], product_from_row) {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };

        rows.filter_map(|r| r.ok()).collect()
    }

    /// SKUs carried by more than one product, across every lifecycle state
    pub fn duplicate_skus(&self) -> Result<Vec<DuplicateSku>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"SELECT sku, GROUP_CONCAT(id)
                   FROM products
                   WHERE sku IS NOT NULL AND sku != ''
                   GROUP BY sku
                   HAVING COUNT(*) > 1
                   ORDER BY sku"#,
            )
            .into_diagnostic()?;

        let rows = stmt
            .query_map([], |row| {
                let sku: String = row.get(0)?;
                let ids: String = row.get(1)?;
                Ok(DuplicateSku {
                    sku,
                    product_ids: ids.split(',').map(String::from).collect(),
                })
            })
            .into_diagnostic()?;

        let mut duplicates = Vec::new();
        for row in rows {
            duplicates.push(row.into_diagnostic()?);
        }
        Ok(duplicates)
    }

    /// Products without a SKU, ordered by name
    pub fn products_missing_sku(&self) -> Vec<CachedProduct> {
        self.list_products(&ProductFilter {
            missing_sku: true,
            ..ProductFilter::default()
        })
    }
}

impl CatalogQuery for CatalogCache {
    fn find_by_sku(&self, sku: &str, exclude_id: Option<&str>) -> Result<Vec<String>, LookupError> {
        let map_err = |e: rusqlite::Error| LookupError::LookupFailure(e.to_string());

        let mut ids = Vec::new();
        match exclude_id {
            Some(exclude) => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT id FROM products WHERE sku = ?1 AND id != ?2")
                    .map_err(map_err)?;
                let rows = stmt
                    .query_map(params![sku, exclude], |row| row.get::<_, String>(0))
                    .map_err(map_err)?;
                for row in rows {
                    ids.push(row.map_err(map_err)?);
                }
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT id FROM products WHERE sku = ?1")
                    .map_err(map_err)?;
                let rows = stmt
                    .query_map(params![sku], |row| row.get::<_, String>(0))
                    .map_err(map_err)?;
                for row in rows {
                    ids.push(row.map_err(map_err)?);
                }
            }
        }

        Ok(ids)
    }
}
