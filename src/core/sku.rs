//! SKU assembly from product fields
//!
//! SKUs follow the hierarchical pattern `CATEGORY-BRAND-MODEL[-VARIANT]`:
//! the leaf of the category path, the brand, the first word of the product
//! name, and the optional variant, each abbreviated and joined with dashes.

use crate::core::abbrev::AbbreviationDictionary;

/// Separator between segments of a hierarchical category path
const CATEGORY_SEPARATOR: char = '>';

/// Separator between SKU segments
const SEGMENT_SEPARATOR: &str = "-";

/// Compose a SKU from a product's category, brand, name, and optional variant
///
/// Segments that abbreviate to nothing are dropped rather than left as empty
/// placeholders, so partial input degrades to a shorter SKU and fully empty
/// input yields an empty string. Deterministic for a fixed dictionary.
pub fn generate_sku(
    dict: &AbbreviationDictionary,
    category: &str,
    brand: &str,
    name: &str,
    variant: Option<&str>,
) -> String {
    let category_part = dict.abbreviate(first_word(leaf_category(category)));
    let brand_part = dict.abbreviate(brand);
    let model_part = dict.abbreviate(first_word(name));
    let variant_part = variant.map(|v| dict.abbreviate(v)).unwrap_or_default();

    let mut parts = vec![category_part, brand_part, model_part, variant_part];
    parts.retain(|p| !p.is_empty());
    parts.join(SEGMENT_SEPARATOR)
}

/// The most specific (rightmost) segment of a hierarchical category path
fn leaf_category(category: &str) -> &str {
    category
        .rsplit(CATEGORY_SEPARATOR)
        .next()
        .unwrap_or("")
        .trim()
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sku_full() {
        let dict = AbbreviationDictionary::bundled();
        assert_eq!(
            generate_sku(dict, "Electronics", "Sony", "WH-1000XM4", Some("Black")),
            "ELEC-SNY-WH1-BLC"
        );
    }

    #[test]
    fn test_generate_sku_uses_leaf_category() {
        let dict = AbbreviationDictionary::bundled();
        // "Fiction" is the leaf, not "Books".
        assert_eq!(
            generate_sku(dict, "Books > Fiction", "Penguin", "1984", Some("Hardcover")),
            "FICT-PNG-198-HRD"
        );
    }

    #[test]
    fn test_generate_sku_first_word_of_multiword_category_leaf() {
        let dict = AbbreviationDictionary::bundled();
        assert_eq!(
            generate_sku(dict, "Office Supplies", "Staples", "Copy Paper", None),
            "OFC-STP-CPY"
        );
    }

    #[test]
    fn test_generate_sku_without_variant() {
        let dict = AbbreviationDictionary::bundled();
        assert_eq!(
            generate_sku(dict, "Hardware", "Acme", "Hammer", None),
            "HDWR-ACM-HMR"
        );
        assert_eq!(
            generate_sku(dict, "Hardware", "Acme", "Hammer", Some("")),
            "HDWR-ACM-HMR"
        );
    }

    #[test]
    fn test_generate_sku_drops_empty_segments() {
        let dict = AbbreviationDictionary::bundled();
        assert_eq!(generate_sku(dict, "Electronics", "", "", None), "ELEC");
        assert_eq!(generate_sku(dict, "", "Sony", "", None), "SNY");
        assert_eq!(generate_sku(dict, "", "", "", None), "");
        assert_eq!(generate_sku(dict, "...", "!!", "??", Some("--")), "");
    }

    #[test]
    fn test_generate_sku_is_deterministic() {
        let dict = AbbreviationDictionary::bundled();
        let a = generate_sku(dict, "Electronics", "Sony", "WH-1000XM4", Some("Black"));
        let b = generate_sku(dict, "Electronics", "Sony", "WH-1000XM4", Some("Black"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_sku_segment_shape() {
        let dict = AbbreviationDictionary::bundled();
        let sku = generate_sku(dict, "Electronics", "Sony", "WH-1000XM4", Some("Black"));
        let segments: Vec<&str> = sku.split('-').collect();
        assert_eq!(segments.len(), 4);
        for seg in segments {
            assert!(!seg.is_empty());
            assert!(seg.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
