//! `carton cache` command - Manage the product lookup cache
//!
//! The cache is a local SQLite database that mirrors product metadata for
//! fast list filtering and SKU collision checks. It is user-local
//! (gitignored) and auto-rebuilds from product files.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::cache::CatalogCache;

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Rebuild the cache from scratch
    Rebuild,

    /// Sync cache with filesystem changes (incremental)
    Sync,

    /// Show cache statistics
    Status,

    /// Clear the cache completely
    Clear,
}

pub fn run(cmd: CacheCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CacheCommands::Rebuild => run_rebuild(global),
        CacheCommands::Sync => run_sync(global),
        CacheCommands::Status => run_status(global),
        CacheCommands::Clear => run_clear(global),
    }
}

fn run_rebuild(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut cache = CatalogCache::open_without_sync(&project)?;

    println!("{} Rebuilding cache...", style("→").blue());
    let stats = cache.rebuild()?;

    println!(
        "{} Cache rebuilt in {}ms",
        style("✓").green(),
        stats.duration_ms
    );
    println!("  Files scanned:   {}", stats.files_scanned);
    println!("  Products cached: {}", stats.products_added);

    Ok(())
}

fn run_sync(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let mut cache = CatalogCache::open_without_sync(&project)?;

    let stats = cache.sync()?;

    if stats.products_added == 0 && stats.products_updated == 0 && stats.products_removed == 0 {
        println!("{} Cache is up to date", style("✓").green());
    } else {
        println!(
            "{} Cache synced in {}ms",
            style("✓").green(),
            stats.duration_ms
        );
        if stats.products_added > 0 {
            println!("  Added:   {}", style(stats.products_added).green());
        }
        if stats.products_updated > 0 {
            println!("  Updated: {}", style(stats.products_updated).yellow());
        }
        if stats.products_removed > 0 {
            println!("  Removed: {}", style(stats.products_removed).red());
        }
    }

    Ok(())
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let cache = CatalogCache::open(&project)?;

    let stats = cache.statistics()?;

    println!("{}", style("Cache Status").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!(
        "  Location:       {}",
        project.carton_dir().join("cache.db").display()
    );
    println!("  Products:       {}", style(stats.total_products).cyan());
    println!("  With SKU:       {}", style(stats.with_sku).cyan());
    println!("  Missing SKU:    {}", style(stats.missing_sku).cyan());
    if stats.duplicate_skus > 0 {
        println!("  Duplicate SKUs: {}", style(stats.duplicate_skus).red());
    }
    println!(
        "  Database size:  {} KB",
        style(stats.db_size_bytes / 1024).cyan()
    );

    Ok(())
}

fn run_clear(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    CatalogCache::clear(&project)?;
    println!("{} Cache cleared", style("✓").green());
    Ok(())
}
