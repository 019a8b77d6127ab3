//! Cache synchronization with the filesystem
//!
//! Methods for rebuilding and incrementally syncing the cache with product
//! YAML files.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use miette::{IntoDiagnostic, Result};
use rusqlite::params;

use super::{compute_hash, get_file_mtime, CatalogCache, SyncStats};

impl CatalogCache {
    /// Full rebuild of the cache from the filesystem
    pub fn rebuild(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        self.conn
            .execute("DELETE FROM products", [])
            .into_diagnostic()?;

        for path in self.product_files() {
            stats.files_scanned += 1;
            if let Err(e) = self.cache_product_file(&path) {
                eprintln!("Warning: Failed to cache {}: {}", path.display(), e);
            } else {
                stats.products_added += 1;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    /// Incremental sync: add new files, refresh changed ones, drop deleted ones
    pub fn sync(&mut self) -> Result<SyncStats> {
        let start = std::time::Instant::now();
        let mut stats = SyncStats::default();

        // file_path -> (id, mtime, hash) for every cached row
        let mut cached: HashMap<String, (String, i64, String)> = HashMap::new();
        {
            let mut stmt = self
                .conn
                .prepare("SELECT file_path, id, file_mtime, file_hash FROM products")
                .into_diagnostic()?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        (row.get::<_, String>(1)?, row.get::<_, i64>(2)?, row.get::<_, String>(3)?),
                    ))
                })
                .into_diagnostic()?;
            for row in rows {
                let (path, value) = row.into_diagnostic()?;
                cached.insert(path, value);
            }
        }

        let mut seen: HashSet<String> = HashSet::new();

        for path in self.product_files() {
            stats.files_scanned += 1;
            let rel = self.relative_path(&path);
            seen.insert(rel.clone());

            match cached.get(&rel) {
                None => {
                    if let Err(e) = self.cache_product_file(&path) {
                        eprintln!("Warning: Failed to cache {}: {}", path.display(), e);
                    } else {
                        stats.products_added += 1;
                    }
                }
                Some((_, mtime, hash)) => {
                    let new_mtime = get_file_mtime(&path)?;
                    if new_mtime == *mtime {
                        continue;
                    }
                    let content = fs::read_to_string(&path).into_diagnostic()?;
                    if compute_hash(&content) == *hash {
                        // Touched but unchanged; just remember the new mtime
                        self.conn
                            .execute(
                                "UPDATE products SET file_mtime = ?1 WHERE file_path = ?2",
                                params![new_mtime, rel],
                            )
                            .into_diagnostic()?;
                    } else if let Err(e) = self.cache_product_file(&path) {
                        eprintln!("Warning: Failed to cache {}: {}", path.display(), e);
                    } else {
                        stats.products_updated += 1;
                    }
                }
            }
        }

        // Drop rows whose files are gone
        for (rel, (id, _, _)) in &cached {
            if !seen.contains(rel) {
                self.conn
                    .execute("DELETE FROM products WHERE id = ?1", params![id])
                    .into_diagnostic()?;
                stats.products_removed += 1;
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    /// Cache a single product file
    ///
    /// Only the fields the cache serves are extracted; unknown YAML keys are
    /// ignored so the cache survives schema drift in product files.
    pub(super) fn cache_product_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).into_diagnostic()?;
        let mtime = get_file_mtime(path)?;
        let hash = compute_hash(&content);
        let rel_path = self.relative_path(path);

        let value: serde_yml::Value = serde_yml::from_str(&content).into_diagnostic()?;

        let id = value["id"]
            .as_str()
            .ok_or_else(|| miette::miette!("Missing 'id' field"))?;
        let name = value["name"].as_str().unwrap_or("");
        let brand = value["brand"].as_str();
        let category = value["category"].as_str();
        let variant = value["variant"].as_str();
        let sku = value["sku"].as_str();
        let status = value["status"].as_str().unwrap_or("draft");
        let price = value["price"].as_f64();
        let on_hand = value["on_hand"].as_i64();
        let author = value["author"].as_str().unwrap_or("");
        let created = value["created"].as_str().unwrap_or("");
        let tags: Option<String> = value["tags"].as_sequence().map(|seq| {
            seq.iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(",")
        });

        self.conn
            .execute(
                r#"INSERT OR REPLACE INTO products
                   (id, name, brand, category, variant, sku, status, price, on_hand,
                    author, created, tags, file_path, file_mtime, file_hash)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"#,
                params![
                    id, name, brand, category, variant, sku, status, price, on_hand, author,
                    created, tags, rel_path, mtime, hash
                ],
            )
            .into_diagnostic()?;

        Ok(())
    }
}
