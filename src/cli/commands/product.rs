//! `carton product` command - Product management

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use clap::{Subcommand, ValueEnum};
use console::style;
use csv::{ReaderBuilder, StringRecord};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_csv, format_short_id_str, open_project, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::abbrev::AbbreviationDictionary;
use crate::core::cache::{CachedProduct, CatalogCache, ProductFilter};
use crate::core::config::Config;
use crate::core::entity::{Entity, ProductStatus};
use crate::core::loader;
use crate::core::resolver::{sku_exists, suggest_alternate_sku, OverlayCatalog};
use crate::core::shortid::{parse_product_reference, ShortIdIndex};
use crate::entities::product::{Condition, Product};

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products with filtering
    List(ListArgs),

    /// Create a new product
    New(NewArgs),

    /// Show a product's details
    Show(ShowArgs),

    /// Edit a product in your editor
    Edit(EditArgs),

    /// Import products from a CSV file
    Import(ImportArgs),
}

/// Status filter for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Draft,
    Active,
    Inactive,
    Archived,
    All,
}

/// Status choice for new command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliProductStatus {
    Draft,
    Active,
    Inactive,
    Archived,
}

impl From<CliProductStatus> for ProductStatus {
    fn from(status: CliProductStatus) -> Self {
        match status {
            CliProductStatus::Draft => ProductStatus::Draft,
            CliProductStatus::Active => ProductStatus::Active,
            CliProductStatus::Inactive => ProductStatus::Inactive,
            CliProductStatus::Archived => ProductStatus::Archived,
        }
    }
}

/// Condition choice for new command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliCondition {
    New,
    Used,
    Refurbished,
}

impl From<CliCondition> for Condition {
    fn from(condition: CliCondition) -> Self {
        match condition {
            CliCondition::New => Condition::New,
            CliCondition::Used => Condition::Used,
            CliCondition::Refurbished => Condition::Refurbished,
        }
    }
}

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Id,
    Sku,
    Name,
    Brand,
    Category,
    Variant,
    Price,
    OnHand,
    Status,
    Author,
    Created,
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListColumn::Id => write!(f, "id"),
            ListColumn::Sku => write!(f, "sku"),
            ListColumn::Name => write!(f, "name"),
            ListColumn::Brand => write!(f, "brand"),
            ListColumn::Category => write!(f, "category"),
            ListColumn::Variant => write!(f, "variant"),
            ListColumn::Price => write!(f, "price"),
            ListColumn::OnHand => write!(f, "on-hand"),
            ListColumn::Status => write!(f, "status"),
            ListColumn::Author => write!(f, "author"),
            ListColumn::Created => write!(f, "created"),
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by category (substring match on the path)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Filter by brand
    #[arg(long, short = 'b')]
    pub brand: Option<String>,

    /// Search in name, brand, and SKU
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by author
    #[arg(long, short = 'a')]
    pub author: Option<String>,

    /// Show only products created in the last N days
    #[arg(long)]
    pub recent: Option<u32>,

    /// Show only products without a SKU
    #[arg(long)]
    pub missing_sku: bool,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Id,
        ListColumn::Sku,
        ListColumn::Name,
        ListColumn::Brand,
        ListColumn::Category,
        ListColumn::Price,
        ListColumn::Status
    ])]
    pub columns: Vec<ListColumn>,

    /// Sort by field
    #[arg(long, default_value = "name")]
    pub sort: ListColumn,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product name (required unless --interactive)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Brand name
    #[arg(long, short = 'b')]
    pub brand: Option<String>,

    /// Category path (segments joined by '>')
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Variant descriptor (color, size, binding, ...)
    #[arg(long)]
    pub variant: Option<String>,

    /// Retail price
    #[arg(long, short = 'p')]
    pub price: Option<f64>,

    /// Unit cost
    #[arg(long)]
    pub cost: Option<f64>,

    /// Units in stock
    #[arg(long, value_name = "COUNT")]
    pub on_hand: Option<u32>,

    /// Detailed description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Global trade item number (barcode)
    #[arg(long)]
    pub gtin: Option<String>,

    /// Manufacturer part number
    #[arg(long)]
    pub mpn: Option<String>,

    /// Physical condition
    #[arg(long)]
    pub condition: Option<CliCondition>,

    /// Tags (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Lifecycle status
    #[arg(long, short = 's', default_value = "draft")]
    pub status: CliProductStatus,

    /// Explicit SKU (rejected if another product already carries it)
    #[arg(long, conflicts_with = "no_sku")]
    pub sku: Option<String>,

    /// Skip SKU generation entirely
    #[arg(long)]
    pub no_sku: bool,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product ID, partial ID, or short ID (@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Product ID, partial ID, or short ID (@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import (headers: name, brand, category, variant, price, ...)
    pub file: std::path::PathBuf,

    /// Parse and report without writing any files
    #[arg(long)]
    pub dry_run: bool,

    /// Keep going past rows that fail to parse
    #[arg(long)]
    pub skip_errors: bool,
}

/// Run a product subcommand
pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::New(args) => run_new(args, global),
        ProductCommands::Show(args) => run_show(args, global),
        ProductCommands::Edit(args) => run_edit(args, global),
        ProductCommands::Import(args) => run_import(args, global),
    }
}

fn status_filter_str(filter: StatusFilter) -> Option<&'static str> {
    match filter {
        StatusFilter::Draft => Some("draft"),
        StatusFilter::Active => Some("active"),
        StatusFilter::Inactive => Some("inactive"),
        StatusFilter::Archived => Some("archived"),
        StatusFilter::All => None,
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    let output_format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    // Full-fidelity output needs the YAML files; everything else is served
    // straight from the cache.
    if matches!(output_format, OutputFormat::Json | OutputFormat::Yaml) {
        return run_list_full(&args, &project, output_format);
    }

    let cache = CatalogCache::open(&project)?;
    let filter = ProductFilter {
        status: status_filter_str(args.status),
        category: args.category.as_deref(),
        brand: args.brand.as_deref(),
        author: args.author.as_deref(),
        search: args.search.as_deref(),
        missing_sku: args.missing_sku,
        limit: None,
    };

    let mut products = cache.list_products(&filter);

    products.retain(|p| {
        args.recent.is_none_or(|days| {
            let cutoff = chrono::Utc::now() - chrono::Duration::days(days as i64);
            p.created >= cutoff
        })
    });

    sort_cached(&mut products, args.sort);
    if args.reverse {
        products.reverse();
    }
    if let Some(limit) = args.limit {
        products.truncate(limit);
    }

    if args.count {
        println!("{}", products.len());
        return Ok(());
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.ensure_all(products.iter().map(|p| p.id.clone()));
    let _ = short_ids.save(&project);

    output_cached_products(&products, &short_ids, &args, output_format, global);
    Ok(())
}

/// Slow path: full entity loading for json/yaml output
fn run_list_full(
    args: &ListArgs,
    project: &crate::core::Project,
    format: OutputFormat,
) -> Result<()> {
    let mut products: Vec<Product> = loader::load_all(&project.products_dir())?;

    products.retain(|p| {
        status_filter_str(args.status).is_none_or(|status| p.status() == status)
    });
    products.retain(|p| {
        args.category
            .as_ref()
            .is_none_or(|c| p.category.to_lowercase().contains(&c.to_lowercase()))
    });
    products.retain(|p| {
        args.brand.as_ref().is_none_or(|b| {
            p.brand
                .as_ref()
                .is_some_and(|brand| brand.to_lowercase().contains(&b.to_lowercase()))
        })
    });
    products.retain(|p| {
        args.search.as_ref().is_none_or(|needle| {
            let needle = needle.to_lowercase();
            p.name.to_lowercase().contains(&needle)
                || p.brand
                    .as_ref()
                    .is_some_and(|b| b.to_lowercase().contains(&needle))
                || p.sku
                    .as_ref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
    });
    products.retain(|p| {
        args.author
            .as_ref()
            .is_none_or(|a| p.author.to_lowercase().contains(&a.to_lowercase()))
    });
    products.retain(|p| {
        args.recent.is_none_or(|days| {
            let cutoff = chrono::Utc::now() - chrono::Duration::days(days as i64);
            p.created >= cutoff
        })
    });
    if args.missing_sku {
        products.retain(|p| p.sku.as_deref().unwrap_or("").is_empty());
    }

    sort_full(&mut products, args.sort);
    if args.reverse {
        products.reverse();
    }
    if let Some(limit) = args.limit {
        products.truncate(limit);
    }

    if args.count {
        println!("{}", products.len());
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&products).into_diagnostic()?
            );
        }
        _ => {
            print!("{}", serde_yml::to_string(&products).into_diagnostic()?);
        }
    }

    Ok(())
}

fn sort_full(products: &mut [Product], sort: ListColumn) {
    match sort {
        ListColumn::Id => products.sort_by_key(|p| p.id.to_string()),
        ListColumn::Sku => products.sort_by(|a, b| a.sku.cmp(&b.sku)),
        ListColumn::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        ListColumn::Brand => products.sort_by(|a, b| a.brand.cmp(&b.brand)),
        ListColumn::Category => products.sort_by(|a, b| a.category.cmp(&b.category)),
        ListColumn::Variant => products.sort_by(|a, b| a.variant.cmp(&b.variant)),
        ListColumn::Price => products.sort_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        ListColumn::OnHand => products.sort_by_key(|p| p.on_hand),
        ListColumn::Status => products.sort_by(|a, b| a.status.cmp(&b.status)),
        ListColumn::Author => products.sort_by(|a, b| a.author.cmp(&b.author)),
        ListColumn::Created => products.sort_by_key(|p| p.created),
    }
}

fn sort_cached(products: &mut [CachedProduct], sort: ListColumn) {
    match sort {
        ListColumn::Id => products.sort_by(|a, b| a.id.cmp(&b.id)),
        ListColumn::Sku => products.sort_by(|a, b| a.sku.cmp(&b.sku)),
        ListColumn::Name => products.sort_by(|a, b| a.name.cmp(&b.name)),
        ListColumn::Brand => products.sort_by(|a, b| a.brand.cmp(&b.brand)),
        ListColumn::Category => products.sort_by(|a, b| a.category.cmp(&b.category)),
        ListColumn::Variant => products.sort_by(|a, b| a.variant.cmp(&b.variant)),
        ListColumn::Price => products.sort_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        ListColumn::OnHand => products.sort_by(|a, b| a.on_hand.cmp(&b.on_hand)),
        ListColumn::Status => products.sort_by(|a, b| a.status.cmp(&b.status)),
        ListColumn::Author => products.sort_by(|a, b| a.author.cmp(&b.author)),
        ListColumn::Created => products.sort_by(|a, b| a.created.cmp(&b.created)),
    }
}

fn output_cached_products(
    products: &[CachedProduct],
    short_ids: &ShortIdIndex,
    args: &ListArgs,
    format: OutputFormat,
    global: &GlobalOpts,
) {
    match format {
        OutputFormat::Csv => {
            println!("short_id,id,sku,name,brand,category,variant,price,on_hand,status,author,created");
            for p in products {
                let short_id = short_ids.get_short_id(&p.id).unwrap_or_default();
                println!(
                    "{},{},{},{},{},{},{},{},{},{},{},{}",
                    short_id,
                    p.id,
                    p.sku.as_deref().unwrap_or(""),
                    escape_csv(&p.name),
                    escape_csv(p.brand.as_deref().unwrap_or("")),
                    escape_csv(p.category.as_deref().unwrap_or("")),
                    escape_csv(p.variant.as_deref().unwrap_or("")),
                    p.price.map(|v| format!("{:.2}", v)).unwrap_or_default(),
                    p.on_hand.map(|v| v.to_string()).unwrap_or_default(),
                    p.status,
                    escape_csv(&p.author),
                    p.created.format("%Y-%m-%d"),
                );
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | SKU | Name | Brand | Category | Price | Status |");
            println!("|---|---|---|---|---|---|---|---|");
            for p in products {
                let short_id = short_ids.get_short_id(&p.id).unwrap_or_default();
                println!(
                    "| {} | {} | {} | {} | {} | {} | {:.2} | {} |",
                    short_id,
                    format_short_id_str(&p.id),
                    p.sku.as_deref().unwrap_or("-"),
                    p.name.replace('|', "\\|"),
                    p.brand.as_deref().unwrap_or("-"),
                    p.category.as_deref().unwrap_or("-"),
                    p.price.unwrap_or(0.0),
                    p.status,
                );
            }
        }
        OutputFormat::Id => {
            for p in products {
                println!("{}", p.id);
            }
        }
        _ => {
            let mut header_parts = vec![format!("{:<8}", style("SHORT").bold().dim())];
            for col in &args.columns {
                let header = match col {
                    ListColumn::Id => format!("{:<17}", style("ID").bold()),
                    ListColumn::Sku => format!("{:<20}", style("SKU").bold()),
                    ListColumn::Name => format!("{:<30}", style("NAME").bold()),
                    ListColumn::Brand => format!("{:<14}", style("BRAND").bold()),
                    ListColumn::Category => format!("{:<18}", style("CATEGORY").bold()),
                    ListColumn::Variant => format!("{:<12}", style("VARIANT").bold()),
                    ListColumn::Price => format!("{:>10}", style("PRICE").bold()),
                    ListColumn::OnHand => format!("{:>8}", style("ON HAND").bold()),
                    ListColumn::Status => format!("{:<10}", style("STATUS").bold()),
                    ListColumn::Author => format!("{:<16}", style("AUTHOR").bold()),
                    ListColumn::Created => format!("{:<12}", style("CREATED").bold()),
                };
                header_parts.push(header);
            }
            println!("{}", header_parts.join(" "));
            println!("{}", "-".repeat(100));

            for p in products {
                let short_id = short_ids
                    .get_short_id(&p.id)
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                let mut row_parts = vec![format!("{:<8}", style(&short_id).cyan())];

                for col in &args.columns {
                    let value = match col {
                        ListColumn::Id => format!("{:<17}", format_short_id_str(&p.id)),
                        ListColumn::Sku => {
                            format!("{:<20}", truncate_str(p.sku.as_deref().unwrap_or("-"), 18))
                        }
                        ListColumn::Name => format!("{:<30}", truncate_str(&p.name, 28)),
                        ListColumn::Brand => {
                            format!("{:<14}", truncate_str(p.brand.as_deref().unwrap_or("-"), 12))
                        }
                        ListColumn::Category => format!(
                            "{:<18}",
                            truncate_str(p.category.as_deref().unwrap_or("-"), 16)
                        ),
                        ListColumn::Variant => format!(
                            "{:<12}",
                            truncate_str(p.variant.as_deref().unwrap_or("-"), 10)
                        ),
                        ListColumn::Price => match p.price {
                            Some(price) => format!("{:>10.2}", price),
                            None => format!("{:>10}", "-"),
                        },
                        ListColumn::OnHand => match p.on_hand {
                            Some(n) => format!("{:>8}", n),
                            None => format!("{:>8}", "-"),
                        },
                        ListColumn::Status => format!("{:<10}", styled_status(&p.status)),
                        ListColumn::Author => format!("{:<16}", truncate_str(&p.author, 14)),
                        ListColumn::Created => format!("{:<12}", p.created.format("%Y-%m-%d")),
                    };
                    row_parts.push(value);
                }
                println!("{}", row_parts.join(" "));
            }

            if !global.quiet {
                println!();
                println!(
                    "{} product(s) found. Use {} to reference by short ID.",
                    style(products.len()).cyan(),
                    style("@N").cyan()
                );
            }
        }
    }
}

fn styled_status(status: &str) -> console::StyledObject<String> {
    let s = status.to_string();
    match status {
        "draft" => style(s).dim(),
        "active" => style(s).green(),
        "inactive" => style(s).yellow(),
        "archived" => style(s).red().dim(),
        _ => style(s).white(),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load();
    let theme = ColorfulTheme::default();

    let name = match args.name {
        Some(name) => name,
        None if args.interactive => Input::with_theme(&theme)
            .with_prompt("Product name")
            .interact_text()
            .into_diagnostic()?,
        None => {
            return Err(miette::miette!(
                "product name is required (pass --name or use --interactive)"
            ))
        }
    };

    let brand = or_prompt(args.brand, args.interactive, &theme, "Brand")?;
    let category = or_prompt(
        args.category,
        args.interactive,
        &theme,
        "Category (segments joined by '>')",
    )?;
    let variant = or_prompt(args.variant, args.interactive, &theme, "Variant")?;

    let price = match args.price {
        Some(price) => price,
        None if args.interactive => {
            let raw: String = Input::with_theme(&theme)
                .with_prompt("Price")
                .allow_empty(true)
                .interact_text()
                .into_diagnostic()?;
            raw.trim().parse().unwrap_or(0.0)
        }
        None => 0.0,
    };

    let status: ProductStatus = if args.interactive {
        let items = ["draft", "active", "inactive", "archived"];
        let default = items
            .iter()
            .position(|&s| s == ProductStatus::from(args.status).to_string())
            .unwrap_or(0);
        let idx = Select::with_theme(&theme)
            .with_prompt("Status")
            .items(&items)
            .default(default)
            .interact()
            .into_diagnostic()?;
        items[idx].parse().unwrap_or_default()
    } else {
        args.status.into()
    };

    let mut product = Product::new(name, category.unwrap_or_default(), config.author());
    product.brand = brand;
    product.variant = variant;
    product.price = price;
    product.cost = args.cost;
    product.on_hand = args.on_hand.unwrap_or(0);
    product.description = args.description;
    product.gtin = args.gtin;
    product.mpn = args.mpn;
    product.condition = args.condition.map(Condition::from);
    product.tags = args.tags;
    product.status = status;

    // SKU: explicit codes are validated against the catalog, generated ones
    // are de-duplicated through the resolver before anything is written.
    let dict = AbbreviationDictionary::bundled();
    if let Some(explicit) = args.sku {
        let cache = CatalogCache::open(&project)?;
        if sku_exists(&cache, &explicit, None).into_diagnostic()? {
            let suggestion = suggest_alternate_sku(&cache, &explicit).into_diagnostic()?;
            return Err(miette::miette!(
                "SKU {} is already in use. Try {} instead, or drop --sku to pick one automatically.",
                explicit,
                suggestion
            ));
        }
        product.sku = Some(explicit);
    } else if !args.no_sku {
        let base = product.generated_sku(dict);
        if !base.is_empty() {
            let cache = CatalogCache::open(&project)?;
            let chosen = if sku_exists(&cache, &base, None).into_diagnostic()? {
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
            product.sku = Some(chosen);
        }
    }

    std::fs::create_dir_all(project.products_dir()).into_diagnostic()?;
    let path = project.product_path(&product.id);
    let yaml = serde_yml::to_string(&product).into_diagnostic()?;
    std::fs::write(&path, yaml).into_diagnostic()?;

    println!(
        "{} Created product {}",
        style("✓").green(),
        style(&product.id).cyan()
    );
    if let Some(ref sku) = product.sku {
        println!("  SKU: {}", style(sku).cyan());
    }
    if global.verbose {
        println!("  File: {}", path.display());
    }

    if args.edit {
        config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn or_prompt(
    value: Option<String>,
    interactive: bool,
    theme: &ColorfulTheme,
    prompt: &str,
) -> Result<Option<String>> {
    if value.is_some() || !interactive {
        return Ok(value);
    }

    let answer: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    if answer.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(answer))
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let reference = parse_product_reference(&args.id, &project);

    let Some((path, product)) =
        loader::load_entity::<Product>(&project.products_dir(), &reference)?
    else {
        return Err(miette::miette!("no product matching '{}'", args.id));
    };

    match global.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&product).into_diagnostic()?
        ),
        OutputFormat::Yaml => {
            print!("{}", std::fs::read_to_string(&path).into_diagnostic()?)
        }
        _ => print_product_summary(&product, global),
    }

    Ok(())
}

fn print_product_summary(product: &Product, global: &GlobalOpts) {
    println!(
        "{} {}",
        style("Product").bold(),
        style(&product.id).cyan()
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  Name:     {}", product.name);
    if let Some(ref brand) = product.brand {
        println!("  Brand:    {}", brand);
    }
    if !product.category.is_empty() {
        println!("  Category: {}", product.category);
    }
    if let Some(ref variant) = product.variant {
        println!("  Variant:  {}", variant);
    }
    match product.sku {
        Some(ref sku) => println!("  SKU:      {}", style(sku).cyan()),
        None => println!("  SKU:      {}", style("(none)").dim()),
    }
    println!("  Price:    {:.2}", product.price);
    if let Some(cost) = product.cost {
        println!("  Cost:     {:.2}", cost);
    }
    println!("  On hand:  {}", product.on_hand);
    if let Some(ref gtin) = product.gtin {
        println!("  GTIN:     {}", gtin);
    }
    if let Some(ref mpn) = product.mpn {
        println!("  MPN:      {}", mpn);
    }
    if let Some(condition) = product.condition {
        println!("  Condition: {}", condition);
    }
    if !product.tags.is_empty() {
        println!("  Tags:     {}", product.tags.join(", "));
    }
    println!("  Status:   {}", styled_status(&product.status.to_string()));
    println!(
        "  Created:  {} by {}",
        product.created.format("%Y-%m-%d %H:%M"),
        product.author
    );
    if global.verbose {
        if let Some(ref description) = product.description {
            println!();
            println!("{}", description);
        }
    }
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load();
    let reference = parse_product_reference(&args.id, &project);

    let Some(path) = loader::find_entity_file(&project.products_dir(), &reference) else {
        return Err(miette::miette!("no product matching '{}'", args.id));
    };

    let status = config.run_editor(&path).into_diagnostic()?;
    if status.success() {
        println!("{} Edited {}", style("✓").green(), path.display());
    } else {
        println!("{} Editor exited with an error", style("!").yellow());
    }

    Ok(())
}

/// Import statistics
#[derive(Default)]
struct ImportStats {
    rows_processed: usize,
    products_created: usize,
    errors: usize,
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a field value from a CSV record
fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load();
    let dict = AbbreviationDictionary::bundled();

    let file = File::open(&args.file).into_diagnostic()?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    let cache = CatalogCache::open(&project)?;
    let mut overlay = OverlayCatalog::new(&cache);
    let mut stats = ImportStats::default();

    std::fs::create_dir_all(project.products_dir()).into_diagnostic()?;

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!(
                    "{} Row {}: CSV parse error: {}",
                    style("✗").red(),
                    row_num,
                    e
                );
                stats.errors += 1;
                if !args.skip_errors {
                    return Err(miette::miette!("CSV parse error at row {}: {}", row_num, e));
                }
                continue;
            }
        };

        let Some(name) = get_field(&record, &header_map, "name") else {
            eprintln!(
                "{} Row {}: Missing required field 'name'",
                style("✗").red(),
                row_num
            );
            stats.errors += 1;
            if !args.skip_errors {
                return Err(miette::miette!("Missing required field at row {}", row_num));
            }
            continue;
        };

        let category = get_field(&record, &header_map, "category").unwrap_or_default();
        let mut product = Product::new(name, category, config.author());
        product.brand = get_field(&record, &header_map, "brand");
        product.variant = get_field(&record, &header_map, "variant");
        product.description = get_field(&record, &header_map, "description");
        product.gtin = get_field(&record, &header_map, "gtin");
        product.mpn = get_field(&record, &header_map, "mpn");
        product.price = get_field(&record, &header_map, "price")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);
        product.cost = get_field(&record, &header_map, "cost").and_then(|s| s.parse().ok());
        product.on_hand = get_field(&record, &header_map, "on_hand")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        if let Some(status) = get_field(&record, &header_map, "status") {
            match status.parse::<ProductStatus>() {
                Ok(parsed) => product.status = parsed,
                Err(e) => eprintln!("{} Row {}: {}", style("!").yellow(), row_num, e),
            }
        }
        if let Some(condition) = get_field(&record, &header_map, "condition") {
            match condition.parse::<Condition>() {
                Ok(parsed) => product.condition = Some(parsed),
                Err(e) => eprintln!("{} Row {}: {}", style("!").yellow(), row_num, e),
            }
        }
        if let Some(tags) = get_field(&record, &header_map, "tags") {
            product.tags = tags
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }

        // SKU from the file when given, generated otherwise; either way it is
        // de-duplicated against the catalog plus the rows imported so far.
        let base = get_field(&record, &header_map, "sku")
            .unwrap_or_else(|| product.generated_sku(dict));
        if !base.is_empty() {
            let chosen = if sku_exists(&overlay, &base, None).into_diagnostic()? {
                let alternate = suggest_alternate_sku(&overlay, &base).into_diagnostic()?;
                if !global.quiet {
                    println!(
                        "{} Row {}: SKU {} is taken; using {}",
                        style("!").yellow(),
                        row_num,
                        base,
                        alternate
                    );
                }
                alternate
            } else {
                base
            };
            overlay.reserve(chosen.clone());
            product.sku = Some(chosen);
        }

        if args.dry_run {
            println!(
                "{} Would create {} ({})",
                style("→").blue(),
                truncate_str(&product.name, 40),
                product.sku.as_deref().unwrap_or("-")
            );
            stats.products_created += 1;
            continue;
        }

        let path = project.product_path(&product.id);
        let write_result = serde_yml::to_string(&product)
            .map_err(|e| e.to_string())
            .and_then(|yaml| std::fs::write(&path, yaml).map_err(|e| e.to_string()));
        match write_result {
            Ok(()) => stats.products_created += 1,
            Err(e) => {
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                stats.errors += 1;
                if !args.skip_errors {
                    return Err(miette::miette!("failed to write product at row {}", row_num));
                }
            }
        }
    }

    println!();
    println!("{} Import complete.", style("✓").green());
    println!("  Rows processed: {}", stats.rows_processed);
    println!("  Created:        {}", style(stats.products_created).green());
    if stats.errors > 0 {
        println!("  Errors:         {}", style(stats.errors).red());
    }
    if args.dry_run {
        println!("  (dry run - no files written)");
    }

    Ok(())
}
