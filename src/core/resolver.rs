//! SKU uniqueness resolution against the product catalog
//!
//! Collision handling is check-then-act: callers probe for an existing owner
//! before writing a SKU, with no transactional guarantee. Two writers racing
//! on the same root can both pass the check; `carton sku check` detects the
//! aftermath rather than preventing it.

use std::collections::HashSet;

use thiserror::Error;

/// Cutoff for numbered-suffix probing
const MAX_SUFFIX_ATTEMPTS: u64 = 1000;

/// Width of the zero-padded numeric suffix
const SUFFIX_WIDTH: usize = 3;

/// Read access to the product catalog, as needed for collision checks
pub trait CatalogQuery {
    /// Ids of products whose SKU equals `sku`, optionally excluding one record
    fn find_by_sku(&self, sku: &str, exclude_id: Option<&str>) -> Result<Vec<String>, LookupError>;
}

/// Errors surfaced while querying the catalog
#[derive(Debug, Error)]
pub enum LookupError {
    /// The underlying catalog query failed; whether the SKU exists is unknown
    #[error("SKU lookup failed: {0}")]
    LookupFailure(String),
}

/// Whether any product already carries `sku`
///
/// An empty SKU never exists and is not queried. Query failures propagate:
/// treating them as "not found" would let duplicate SKUs through silently.
pub fn sku_exists(
    catalog: &impl CatalogQuery,
    sku: &str,
    exclude_id: Option<&str>,
) -> Result<bool, LookupError> {
    if sku.is_empty() {
        return Ok(false);
    }
    Ok(!catalog.find_by_sku(sku, exclude_id)?.is_empty())
}

/// The next free numbered variant of `base`
///
/// `ELEC-SNY-WH1` probes `ELEC-SNY-WH1-001`, `-002`, ... and returns the
/// first candidate without an owner. A base that already ends in `-<digits>`
/// continues counting from there: `ITEM-1` probes `ITEM-002` first. Probing
/// stops after 1000 attempts and returns the last candidate unchecked, so
/// callers in adversarial conditions should re-validate before trusting it.
pub fn suggest_alternate_sku(
    catalog: &impl CatalogQuery,
    base: &str,
) -> Result<String, LookupError> {
    if base.is_empty() {
        return Ok(String::new());
    }

    let (root, suffix) = split_numeric_suffix(base);
    let mut counter = suffix.map_or(1, |n| n.saturating_add(1));
    let mut candidate = format_numbered(root, counter);

    while sku_exists(catalog, &candidate, None)? {
        counter += 1;
        candidate = format_numbered(root, counter);
        if counter > MAX_SUFFIX_ATTEMPTS {
            break;
        }
    }

    Ok(candidate)
}

fn format_numbered(root: &str, n: u64) -> String {
    format!("{}-{:0width$}", root, n, width = SUFFIX_WIDTH)
}

/// Split a trailing `-<digits>` suffix off a SKU
///
/// Returns the root and the parsed suffix value, or the whole SKU and `None`
/// when there is no all-digit suffix (including suffixes too large for u64).
fn split_numeric_suffix(sku: &str) -> (&str, Option<u64>) {
    match sku.rsplit_once('-') {
        Some((root, digits))
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            match digits.parse::<u64>() {
                Ok(n) => (root, Some(n)),
                Err(_) => (sku, None),
            }
        }
        _ => (sku, None),
    }
}

/// A catalog view that also treats a set of pending SKUs as taken
///
/// Batch flows (backfill, CSV import) assign many SKUs before any file
/// reaches the cache; layering the in-flight set over the base catalog keeps
/// a single run from handing out the same suffix twice.
pub struct OverlayCatalog<'a, C: CatalogQuery> {
    base: &'a C,
    pending: HashSet<String>,
}

impl<'a, C: CatalogQuery> OverlayCatalog<'a, C> {
    pub fn new(base: &'a C) -> Self {
        Self {
            base,
            pending: HashSet::new(),
        }
    }

    /// Mark a SKU as taken for the remainder of this run
    pub fn reserve(&mut self, sku: impl Into<String>) {
        self.pending.insert(sku.into());
    }

    /// Number of SKUs reserved so far
    pub fn reserved(&self) -> usize {
        self.pending.len()
    }
}

impl<C: CatalogQuery> CatalogQuery for OverlayCatalog<'_, C> {
    fn find_by_sku(&self, sku: &str, exclude_id: Option<&str>) -> Result<Vec<String>, LookupError> {
        if self.pending.contains(sku) {
            return Ok(vec![String::from("(pending)")]);
        }
        self.base.find_by_sku(sku, exclude_id)
    }
}
