//! Integration tests for the carton CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a carton command
fn carton() -> Command {
    Command::cargo_bin("carton").unwrap()
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    carton()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Helper to create a test product, returning its full ID
fn create_test_product(
    tmp: &TempDir,
    name: &str,
    brand: &str,
    category: &str,
    extra: &[&str],
) -> String {
    let mut args = vec![
        "product", "new", "--name", name, "--brand", brand, "--category", category,
    ];
    args.extend_from_slice(extra);

    let output = carton()
        .current_dir(tmp.path())
        .args(&args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "product new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Output format: "✓ Created product PROD-01ABC..."
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find(|l| l.contains("PROD-"))
        .and_then(|l| l.split_whitespace().find(|w| w.starts_with("PROD-")))
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Helper to write a raw product file, bypassing the CLI
fn write_raw_product(tmp: &TempDir, ulid: &str, name: &str, sku: &str) {
    let id = format!("PROD-{}", ulid);
    let yaml = format!(
        "id: {id}\nname: {name}\ncategory: Electronics\nsku: {sku}\nprice: 1.0\non_hand: 0\nstatus: active\ncreated: 2024-01-01T00:00:00Z\nauthor: test\n"
    );
    fs::write(
        tmp.path().join("products").join(format!("{id}.carton.yaml")),
        yaml,
    )
    .unwrap();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    carton()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("product catalog"));
}

#[test]
fn test_version_displays() {
    carton()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("carton"));
}

#[test]
fn test_unknown_command_fails() {
    carton()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = TempDir::new().unwrap();

    carton()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".carton/config.yaml").exists());
    assert!(tmp.path().join(".carton/.gitignore").exists());
    assert!(tmp.path().join("products").is_dir());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();

    carton()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Product Creation Tests
// ============================================================================

#[test]
fn test_product_new_generates_sku() {
    let tmp = setup_test_project();

    carton()
        .current_dir(tmp.path())
        .args([
            "product",
            "new",
            "--name",
            "WH-1000XM4",
            "--brand",
            "Sony",
            "--category",
            "Electronics",
            "--variant",
            "Black",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created product"))
        .stdout(predicate::str::contains("ELEC-SNY-WH1-BLC"));
}

#[test]
fn test_product_new_writes_yaml_file() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    let path = tmp
        .path()
        .join("products")
        .join(format!("{id}.carton.yaml"));
    assert!(path.exists());

    let content = fs::read_to_string(path).unwrap();
    assert!(content.contains("name: Hammer"));
    assert!(content.contains("sku: HDWR-ACM-HMR"));
    assert!(content.contains("status: draft"));
}

#[test]
fn test_product_new_deduplicates_generated_sku() {
    let tmp = setup_test_project();

    create_test_product(&tmp, "WH-1000XM4", "Sony", "Electronics", &["--variant", "Black"]);

    carton()
        .current_dir(tmp.path())
        .args([
            "product",
            "new",
            "--name",
            "WH-1000XM4",
            "--brand",
            "Sony",
            "--category",
            "Electronics",
            "--variant",
            "Black",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ELEC-SNY-WH1-BLC-001"));
}

#[test]
fn test_product_new_rejects_duplicate_explicit_sku() {
    let tmp = setup_test_project();

    create_test_product(&tmp, "First", "Acme", "Hardware", &["--sku", "TEST-1"]);

    carton()
        .current_dir(tmp.path())
        .args([
            "product", "new", "--name", "Second", "--sku", "TEST-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already in use"))
        .stderr(predicate::str::contains("TEST-002"));
}

#[test]
fn test_product_new_no_sku_flag() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Widget", "Acme", "Hardware", &["--no-sku"]);

    let content = fs::read_to_string(
        tmp.path()
            .join("products")
            .join(format!("{id}.carton.yaml")),
    )
    .unwrap();
    assert!(!content.contains("sku:"));
}

#[test]
fn test_product_new_requires_name() {
    let tmp = setup_test_project();

    carton()
        .current_dir(tmp.path())
        .args(["product", "new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name is required"));
}

#[test]
fn test_product_new_outside_project_fails() {
    let tmp = TempDir::new().unwrap();

    carton()
        .current_dir(tmp.path())
        .args(["product", "new", "--name", "Widget"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a catalog project"));
}

// ============================================================================
// Product List Tests
// ============================================================================

#[test]
fn test_product_list_shows_products() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hammer"))
        .stdout(predicate::str::contains("HDWR-ACM-HMR"));
}

#[test]
fn test_product_list_count() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);
    create_test_product(&tmp, "Wrench", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn test_product_list_csv_format() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("short_id,id,sku,name"))
        .stdout(predicate::str::contains("Hammer"));
}

#[test]
fn test_product_list_id_format_prints_full_ids() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&id));
}

#[test]
fn test_product_list_missing_sku_filter() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);
    create_test_product(&tmp, "Widget", "Acme", "Hardware", &["--no-sku"]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--missing-sku", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_product_list_status_filter() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &["--status", "active"]);
    create_test_product(&tmp, "Widget", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--status", "active", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

// ============================================================================
// Product Show / Edit Tests
// ============================================================================

#[test]
fn test_product_show_by_full_id() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hammer"))
        .stdout(predicate::str::contains("HDWR-ACM-HMR"));
}

#[test]
fn test_product_show_yaml_format() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["product", "show", &id, "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: Hammer"));
}

#[test]
fn test_product_show_unknown_id_fails() {
    let tmp = setup_test_project();

    carton()
        .current_dir(tmp.path())
        .args(["product", "show", "PROD-DOESNOTEXIST"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no product matching"));
}

// ============================================================================
// SKU Generate Tests
// ============================================================================

#[test]
fn test_sku_generate_is_pure_and_needs_no_project() {
    let tmp = TempDir::new().unwrap();

    carton()
        .current_dir(tmp.path())
        .args([
            "sku",
            "generate",
            "--category",
            "Books > Fiction",
            "--brand",
            "Penguin",
            "--name",
            "1984",
            "--variant",
            "Hardcover",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("FICT-PNG-198-HRD"));
}

#[test]
fn test_sku_generate_empty_input_fails() {
    carton()
        .args(["sku", "generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no SKU could be generated"));
}

#[test]
fn test_sku_generate_is_deterministic() {
    let first = carton()
        .args(["sku", "generate", "--category", "Electronics", "--name", "WH-1000XM4"])
        .output()
        .unwrap();
    let second = carton()
        .args(["sku", "generate", "--category", "Electronics", "--name", "WH-1000XM4"])
        .output()
        .unwrap();
    assert_eq!(first.stdout, second.stdout);
}

// ============================================================================
// SKU Suggest Tests
// ============================================================================

#[test]
fn test_sku_suggest_returns_next_free_variant() {
    let tmp = setup_test_project();
    create_test_product(
        &tmp,
        "WH-1000XM4",
        "Sony",
        "Electronics",
        &["--sku", "ELEC-SNY-WH1"],
    );

    carton()
        .current_dir(tmp.path())
        .args(["sku", "suggest", "ELEC-SNY-WH1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ELEC-SNY-WH1-001"));
}

#[test]
fn test_sku_suggest_continues_numeric_suffix() {
    let tmp = setup_test_project();

    carton()
        .current_dir(tmp.path())
        .args(["sku", "suggest", "ITEM-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ITEM-002"));
}

// ============================================================================
// SKU Assign Tests
// ============================================================================

#[test]
fn test_sku_assign_fills_missing_sku() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Hammer", "Acme", "Hardware", &["--no-sku"]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "assign", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned SKU"))
        .stdout(predicate::str::contains("HDWR-ACM-HMR"));

    carton()
        .current_dir(tmp.path())
        .args(["product", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("HDWR-ACM-HMR"));
}

#[test]
fn test_sku_assign_keeps_existing_without_regenerate() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "assign", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("already has SKU"));
}

#[test]
fn test_sku_assign_regenerate_keeps_own_sku_stable() {
    let tmp = setup_test_project();
    let id = create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    // Re-assigning the product's own unchanged SKU is not a collision.
    carton()
        .current_dir(tmp.path())
        .args(["sku", "assign", &id, "--regenerate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned SKU"))
        .stdout(predicate::str::contains("HDWR-ACM-HMR"));
}

// ============================================================================
// SKU Backfill Tests
// ============================================================================

#[test]
fn test_sku_backfill_fills_missing_skus() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &["--no-sku"]);
    create_test_product(&tmp, "Wrench", "Acme", "Hardware", &["--no-sku"]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "backfill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated: 2"));

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--missing-sku", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}

#[test]
fn test_sku_backfill_deduplicates_within_run() {
    let tmp = setup_test_project();
    // Identical fields would derive identical SKUs; the run must suffix them.
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &["--no-sku"]);
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &["--no-sku"]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "backfill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated: 2"));

    carton()
        .current_dir(tmp.path())
        .args(["sku", "check"])
        .assert()
        .success();
}

#[test]
fn test_sku_backfill_dry_run_writes_nothing() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &["--no-sku"]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "backfill", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--missing-sku", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_sku_backfill_skips_existing_without_overwrite() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "backfill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated: 0"))
        .stdout(predicate::str::contains("Skipped: 1"));
}

// ============================================================================
// SKU Check Tests
// ============================================================================

#[test]
fn test_sku_check_passes_on_clean_catalog() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No duplicate SKUs"));
}

#[test]
fn test_sku_check_reports_duplicates_and_fails() {
    let tmp = setup_test_project();
    write_raw_product(&tmp, "01ARZ3NDEKTSV4RRFFQ69G5FAV", "First", "DUP-001");
    write_raw_product(&tmp, "01BX5ZZKBKACTAV9WEVGEMMVRZ", "Second", "DUP-001");

    carton()
        .current_dir(tmp.path())
        .args(["sku", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("DUP-001"))
        .stdout(predicate::str::contains("shared by multiple"));
}

#[test]
fn test_sku_check_warns_about_missing_skus() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Widget", "Acme", "Hardware", &["--no-sku"]);

    carton()
        .current_dir(tmp.path())
        .args(["sku", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing a SKU"));
}

// ============================================================================
// Import Tests
// ============================================================================

#[test]
fn test_product_import_from_csv() {
    let tmp = setup_test_project();
    let csv_path = tmp.path().join("import.csv");
    fs::write(
        &csv_path,
        "name,brand,category,variant,price\n\
         WH-1000XM4,Sony,Electronics,Black,349.99\n\
         Hammer,Acme,Hardware,,12.50\n",
    )
    .unwrap();

    carton()
        .current_dir(tmp.path())
        .args(["product", "import", "import.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Import complete"));

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn test_product_import_dry_run_writes_nothing() {
    let tmp = setup_test_project();
    fs::write(
        tmp.path().join("import.csv"),
        "name,brand,category\nHammer,Acme,Hardware\n",
    )
    .unwrap();

    carton()
        .current_dir(tmp.path())
        .args(["product", "import", "import.csv", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));

    carton()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0"));
}

#[test]
fn test_product_import_deduplicates_against_catalog() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    fs::write(
        tmp.path().join("import.csv"),
        "name,brand,category\nHammer,Acme,Hardware\n",
    )
    .unwrap();

    carton()
        .current_dir(tmp.path())
        .args(["product", "import", "import.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HDWR-ACM-HMR-001"));

    carton()
        .current_dir(tmp.path())
        .args(["sku", "check"])
        .assert()
        .success();
}

// ============================================================================
// Cache Command Tests
// ============================================================================

#[test]
fn test_cache_rebuild_and_status() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["cache", "rebuild"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache rebuilt"));

    carton()
        .current_dir(tmp.path())
        .args(["cache", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Products:"));
}

#[test]
fn test_cache_clear() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    carton()
        .current_dir(tmp.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache cleared"));
}

#[test]
fn test_cache_sync_reports_up_to_date() {
    let tmp = setup_test_project();
    create_test_product(&tmp, "Hammer", "Acme", "Hardware", &[]);

    // product new does not touch the cache; first sync picks the file up
    carton()
        .current_dir(tmp.path())
        .args(["cache", "sync"])
        .assert()
        .success();

    carton()
        .current_dir(tmp.path())
        .args(["cache", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

// ============================================================================
// Misc Command Tests
// ============================================================================

#[test]
fn test_config_show() {
    let tmp = setup_test_project();

    carton()
        .current_dir(tmp.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Author"));
}

#[test]
fn test_completions_bash() {
    carton()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("carton"));
}
