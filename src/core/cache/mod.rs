//! SQLite-backed product lookup cache
//!
//! This module provides a local SQLite cache that:
//! - Caches product metadata for fast lookups and list filtering
//! - Answers SKU collision queries without parsing every YAML file
//! - Auto-detects file changes and syncs incrementally
//!
//! IMPORTANT: The cache is user-local and gitignored. Product files are the
//! source of truth; the cache can always be rebuilt from them.

mod queries;
mod schema;
mod sync;
mod types;

// Re-export all types
pub use types::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use miette::{IntoDiagnostic, Result};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::core::project::Project;

/// Cache file location within a project
const CACHE_FILE: &str = ".carton/cache.db";

/// Current schema version - cache is rebuilt on version mismatch
const SCHEMA_VERSION: i32 = 2;

/// The product cache backed by SQLite
pub struct CatalogCache {
    conn: Connection,
    project_root: PathBuf,
}

impl CatalogCache {
    /// Open or create cache for a project
    ///
    /// If the cache doesn't exist, it will be created and populated.
    /// If the cache is stale (files changed), it will be synced automatically.
    pub fn open(project: &Project) -> Result<Self> {
        let mut cache = Self::open_without_sync(project)?;
        cache.auto_sync()?;
        Ok(cache)
    }

    /// Open the cache without the automatic staleness check
    pub fn open_without_sync(project: &Project) -> Result<Self> {
        let cache_path = project.root().join(CACHE_FILE);

        // Ensure .carton directory exists
        if let Some(parent) = cache_path.parent() {
            fs::create_dir_all(parent).into_diagnostic()?;
        }

        let needs_init = !cache_path.exists();
        let conn = Connection::open(&cache_path).into_diagnostic()?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .into_diagnostic()?;

        let mut cache = Self {
            conn,
            project_root: project.root().to_path_buf(),
        };

        if needs_init {
            cache.init_schema()?;
            cache.rebuild()?;
        } else if cache.needs_schema_rebuild()? {
            // Schema version mismatch - reinitialize (no migrations needed)
            cache.reinitialize_schema()?;
        }

        Ok(cache)
    }

    /// Check if schema version matches current version
    fn needs_schema_rebuild(&self) -> Result<bool> {
        let current_version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        Ok(current_version != SCHEMA_VERSION)
    }

    /// Drop all tables and reinitialize schema, then rebuild
    fn reinitialize_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
                DROP TABLE IF EXISTS schema_version;
                DROP TABLE IF EXISTS products;
                "#,
            )
            .into_diagnostic()?;

        self.init_schema()?;
        self.rebuild()?;

        Ok(())
    }

    /// Auto-sync: quickly check if any files changed and sync if needed
    fn auto_sync(&mut self) -> Result<()> {
        // Get the most recent file mtime from cache
        let cached_max_mtime: Option<i64> = self
            .conn
            .query_row("SELECT MAX(file_mtime) FROM products", [], |row| row.get(0))
            .optional()
            .into_diagnostic()?
            .flatten();

        if self.needs_sync(cached_max_mtime.unwrap_or(0))? {
            self.sync()?;
        }

        Ok(())
    }

    /// Check whether any product file is newer than the cached max mtime,
    /// or whether files were added/removed since the last sync
    fn needs_sync(&self, max_cached_mtime: i64) -> Result<bool> {
        let mut actual_count = 0i64;

        for path in self.product_files() {
            actual_count += 1;
            let mtime = get_file_mtime(&path)?;
            if mtime > max_cached_mtime {
                return Ok(true);
            }
        }

        let cached_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .into_diagnostic()?;

        Ok(actual_count != cached_count)
    }

    /// All product files currently on disk
    pub(super) fn product_files(&self) -> Vec<PathBuf> {
        let products_dir = self.project_root.join("products");
        if !products_dir.exists() {
            return Vec::new();
        }

        walkdir::WalkDir::new(&products_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().to_string_lossy().ends_with(".carton.yaml"))
            .map(|e| e.path().to_path_buf())
            .collect()
    }

    /// Path of a product file relative to the project root
    pub(super) fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }

    /// Summary counts for `carton cache status`
    pub fn statistics(&self) -> Result<CacheStatistics> {
        let total_products: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .into_diagnostic()?;

        let with_sku: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM products WHERE sku IS NOT NULL AND sku != ''",
                [],
                |row| row.get(0),
            )
            .into_diagnostic()?;

        let duplicate_skus = self.duplicate_skus()?.len() as i64;

        let db_size_bytes = fs::metadata(self.project_root.join(CACHE_FILE))
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(CacheStatistics {
            total_products,
            with_sku,
            missing_sku: total_products - with_sku,
            duplicate_skus,
            db_size_bytes,
        })
    }

    /// Delete the cache database files for a project
    pub fn clear(project: &Project) -> Result<()> {
        let cache_path = project.root().join(CACHE_FILE);
        for suffix in ["", "-wal", "-shm"] {
            let path = PathBuf::from(format!("{}{}", cache_path.display(), suffix));
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(miette::miette!("failed to remove {:?}: {}", path, e)),
            }
        }
        Ok(())
    }
}

/// File modification time as nanoseconds since the Unix epoch
///
/// Nanosecond precision so a rewrite landing in the same second as the last
/// sync still registers as a change.
pub(super) fn get_file_mtime(path: &Path) -> Result<i64> {
    let metadata = fs::metadata(path).into_diagnostic()?;
    let mtime = metadata.modified().into_diagnostic()?;
    Ok(mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0))
}

/// Content hash used to detect real changes behind mtime bumps
pub(super) fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Parse an RFC 3339 timestamp from the cache, tolerating bad data
pub(super) fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
