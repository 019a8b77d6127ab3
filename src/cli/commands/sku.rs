//! `carton sku` command - SKU generation and uniqueness tools

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_project, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::abbrev::AbbreviationDictionary;
use crate::core::cache::CatalogCache;
use crate::core::loader;
use crate::core::resolver::{sku_exists, suggest_alternate_sku, OverlayCatalog};
use crate::core::shortid::parse_product_reference;
use crate::core::sku::generate_sku;
use crate::entities::product::Product;

#[derive(Subcommand, Debug)]
pub enum SkuCommands {
    /// Generate a SKU from product fields (no catalog lookup)
    Generate(GenerateArgs),

    /// Suggest the next free numbered variant of a SKU
    Suggest(SuggestArgs),

    /// Generate and store the SKU for an existing product
    Assign(AssignArgs),

    /// Fill in missing SKUs across the whole catalog
    Backfill(BackfillArgs),

    /// Report duplicate and missing SKUs
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Category path (segments joined by '>')
    #[arg(long, short = 'c', default_value = "")]
    pub category: String,

    /// Brand name
    #[arg(long, short = 'b', default_value = "")]
    pub brand: String,

    /// Product name
    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Variant descriptor
    #[arg(long)]
    pub variant: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SuggestArgs {
    /// Base SKU to find a free numbered variant for
    pub base: String,
}

#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    /// Product ID, partial ID, or short ID (@N)
    pub id: String,

    /// Replace an existing SKU instead of keeping it
    #[arg(long)]
    pub regenerate: bool,
}

#[derive(clap::Args, Debug)]
pub struct BackfillArgs {
    /// Report what would change without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Regenerate SKUs for products that already have one
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {}

/// Run a SKU subcommand
pub fn run(cmd: SkuCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SkuCommands::Generate(args) => run_generate(args),
        SkuCommands::Suggest(args) => run_suggest(args, global),
        SkuCommands::Assign(args) => run_assign(args, global),
        SkuCommands::Backfill(args) => run_backfill(args, global),
        SkuCommands::Check(_) => run_check(global),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let dict = AbbreviationDictionary::bundled();
    let sku = generate_sku(
        dict,
        &args.category,
        &args.brand,
        &args.name,
        args.variant.as_deref(),
    );

    if sku.is_empty() {
        return Err(miette::miette!(
            "no SKU could be generated: category, brand, and name are all empty"
        ));
    }

    println!("{}", sku);
    Ok(())
}

fn run_suggest(args: SuggestArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let cache = CatalogCache::open(&project)?;

    let suggestion = suggest_alternate_sku(&cache, &args.base).into_diagnostic()?;
    println!("{}", suggestion);
    Ok(())
}

fn run_assign(args: AssignArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let reference = parse_product_reference(&args.id, &project);

    let Some((path, mut product)) =
        loader::load_entity::<Product>(&project.products_dir(), &reference)?
    else {
        return Err(miette::miette!("no product matching '{}'", args.id));
    };

    if let Some(ref existing) = product.sku {
        if !existing.is_empty() && !args.regenerate {
            println!(
                "{} Product {} already has SKU {}. Use {} to replace it.",
                style("!").yellow(),
                style(&product.id).cyan(),
                style(existing).cyan(),
                style("--regenerate").yellow()
            );
            return Ok(());
        }
    }

    let dict = AbbreviationDictionary::bundled();
    let base = product.generated_sku(dict);
    if base.is_empty() {
        return Err(miette::miette!(
            "product {} has no category, brand, or name to derive a SKU from",
            product.id
        ));
    }

    // The product's own row is excluded so re-assigning an unchanged SKU is
    // not treated as a collision.
    let cache = CatalogCache::open(&project)?;
    let own_id = product.id.to_string();
    let chosen = if sku_exists(&cache, &base, Some(&own_id)).into_diagnostic()? {
        let alternate = suggest_alternate_sku(&cache, &base).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} SKU {} is taken; using {}",
                style("!").yellow(),
                style(&base).cyan(),
                style(&alternate).cyan()
            );
        }
        alternate
    } else {
        base
    };

    product.sku = Some(chosen.clone());
    let yaml = serde_yml::to_string(&product).into_diagnostic()?;
    std::fs::write(&path, yaml).into_diagnostic()?;

    println!(
        "{} Assigned SKU {} to {}",
        style("✓").green(),
        style(&chosen).cyan(),
        style(&product.id).cyan()
    );

    Ok(())
}

fn run_backfill(args: BackfillArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let dict = AbbreviationDictionary::bundled();

    // Load through the file list rather than the cache: the files are what
    // get rewritten, and parse failures should be visible per product.
    let mut products: Vec<(std::path::PathBuf, Product)> = Vec::new();
    let mut errors = 0usize;
    for path in project.iter_product_files() {
        let content = std::fs::read_to_string(&path).into_diagnostic()?;
        match serde_yml::from_str::<Product>(&content) {
            Ok(product) => products.push((path, product)),
            Err(e) => {
                eprintln!(
                    "{} Skipping {}: {}",
                    style("✗").red(),
                    path.display(),
                    e
                );
                errors += 1;
            }
        }
    }
    products.sort_by(|a, b| a.1.id.to_string().cmp(&b.1.id.to_string()));

    let cache = CatalogCache::open(&project)?;
    let mut overlay = OverlayCatalog::new(&cache);

    let mut updated = 0usize;
    let mut skipped = 0usize;

    for (path, mut product) in products {
        let has_sku = product.sku.as_deref().is_some_and(|s| !s.is_empty());
        if has_sku && !args.overwrite {
            skipped += 1;
            continue;
        }

        let base = product.generated_sku(dict);
        if base.is_empty() {
            if !global.quiet {
                println!(
                    "{} {} has no fields to derive a SKU from",
                    style("!").yellow(),
                    truncate_str(&product.name, 40)
                );
            }
            skipped += 1;
            continue;
        }

        let own_id = product.id.to_string();
        let chosen = if sku_exists(&overlay, &base, Some(&own_id)).into_diagnostic()? {
            suggest_alternate_sku(&overlay, &base).into_diagnostic()?
        } else {
            base
        };

        if product.sku.as_deref() == Some(chosen.as_str()) {
            overlay.reserve(chosen);
            skipped += 1;
            continue;
        }

        if args.dry_run {
            println!(
                "{} {} {} -> {}",
                style("→").blue(),
                truncate_str(&product.name, 40),
                product.sku.as_deref().unwrap_or("(none)"),
                style(&chosen).cyan()
            );
            overlay.reserve(chosen);
            updated += 1;
            continue;
        }

        product.sku = Some(chosen.clone());
        let write_result = serde_yml::to_string(&product)
            .map_err(|e| e.to_string())
            .and_then(|yaml| std::fs::write(&path, yaml).map_err(|e| e.to_string()));
        match write_result {
            Ok(()) => {
                if global.verbose {
                    println!(
                        "{} {} -> {}",
                        style("✓").green(),
                        truncate_str(&product.name, 40),
                        style(&chosen).cyan()
                    );
                }
                overlay.reserve(chosen);
                updated += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", style("✗").red(), path.display(), e);
                errors += 1;
            }
        }
    }

    println!();
    println!("{} Backfill complete.", style("✓").green());
    println!("  Updated: {}", style(updated).green());
    println!("  Skipped: {}", skipped);
    if errors > 0 {
        println!("  Errors:  {}", style(errors).red());
    }
    if args.dry_run {
        println!("  (dry run - no files written)");
    }

    Ok(())
}

fn run_check(global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let cache = CatalogCache::open(&project)?;

    let duplicates = cache.duplicate_skus()?;
    let missing = cache.products_missing_sku();

    if duplicates.is_empty() {
        println!("{} No duplicate SKUs found.", style("✓").green());
    } else {
        println!(
            "{} {} SKU(s) are shared by multiple products:",
            style("✗").red(),
            style(duplicates.len()).red()
        );
        for duplicate in &duplicates {
            println!(
                "  {}  {}",
                style(&duplicate.sku).cyan(),
                duplicate.product_ids.join(", ")
            );
        }
    }

    if !missing.is_empty() {
        println!(
            "{} {} product(s) missing a SKU (run {}):",
            style("!").yellow(),
            missing.len(),
            style("carton sku backfill").yellow()
        );
        for product in &missing {
            println!("  {}  {}", product.id, truncate_str(&product.name, 40));
        }
    } else if !global.quiet {
        println!("{} Every product has a SKU.", style("✓").green());
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(miette::miette!(
            "found {} duplicate SKU(s)",
            duplicates.len()
        ))
    }
}
