//! Database schema initialization

use miette::{IntoDiagnostic, Result};
use rusqlite::params;

use super::{CatalogCache, SCHEMA_VERSION};

impl CatalogCache {
    /// Initialize database schema
    ///
    /// There is deliberately no UNIQUE index on `sku`: product files are the
    /// source of truth and may already contain duplicates, which the cache
    /// must be able to represent so `carton sku check` can report them.
    pub(super) fn init_schema(&mut self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Product metadata mirrored from YAML files
            CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                brand TEXT,
                category TEXT,
                variant TEXT,
                sku TEXT,
                status TEXT NOT NULL,
                price REAL,
                on_hand INTEGER,
                author TEXT NOT NULL,
                created TEXT NOT NULL,
                tags TEXT,
                file_path TEXT NOT NULL,
                file_mtime INTEGER NOT NULL,
                file_hash TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_products_sku ON products(sku);
            CREATE INDEX IF NOT EXISTS idx_products_status ON products(status);
            CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
            CREATE INDEX IF NOT EXISTS idx_products_brand ON products(brand);
            CREATE INDEX IF NOT EXISTS idx_products_file_path ON products(file_path);
            "#,
            )
            .into_diagnostic()?;

        self.conn
            .execute("DELETE FROM schema_version", [])
            .into_diagnostic()?;
        self.conn
            .execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )
            .into_diagnostic()?;

        Ok(())
    }
}
