//! Word abbreviation for SKU segments
//!
//! Known words resolve through a curated editorial abbreviation list bundled
//! into the binary; unknown words fall back to a consonant skeleton (first
//! character kept, vowels dropped from the rest, adjacent duplicate
//! consonants collapsed, truncated to three characters).

use std::collections::HashMap;
use std::sync::OnceLock;

use rust_embed::Embed;

#[derive(Embed)]
#[folder = "assets/"]
struct Assets;

/// Bundled abbreviation list: lowercase word -> abbreviation (may contain periods)
const DICTIONARY_ASSET: &str = "abbreviations.json";

/// Maximum length of a fallback abbreviation
const FALLBACK_LEN: usize = 3;

/// An immutable word -> abbreviation mapping
///
/// Constructed once and never mutated. The bundled dictionary is shared
/// process-wide; tests and embedders can build their own instances.
#[derive(Debug, Clone, Default)]
pub struct AbbreviationDictionary {
    entries: HashMap<String, String>,
}

impl AbbreviationDictionary {
    /// The dictionary bundled into the binary, parsed once per process
    pub fn bundled() -> &'static Self {
        static BUNDLED: OnceLock<AbbreviationDictionary> = OnceLock::new();
        BUNDLED.get_or_init(|| {
            let asset = Assets::get(DICTIONARY_ASSET)
                .expect("abbreviation dictionary is embedded at build time");
            let entries: HashMap<String, String> = serde_json::from_slice(&asset.data)
                .expect("bundled abbreviation dictionary is valid JSON");
            Self::from_entries(entries)
        })
    }

    /// Build a dictionary from explicit entries (keys are normalized to lowercase)
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into().trim().to_lowercase(), v.into()))
            .collect();
        Self { entries }
    }

    /// An empty dictionary: every word takes the fallback path
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of entries in the dictionary
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the dictionary has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the listed abbreviation for a word, as written (with periods)
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.entries
            .get(&word.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Abbreviate a single word
    ///
    /// Dictionary hits return the listed abbreviation uppercased with
    /// periods stripped, at whatever length the list carries. Unknown words
    /// get a consonant skeleton capped at three characters. Empty input, and
    /// input with no alphanumeric characters at all, yield an empty string.
    pub fn abbreviate(&self, word: &str) -> String {
        let clean = word.trim().to_lowercase();
        if clean.is_empty() {
            return String::new();
        }

        if let Some(abbr) = self.entries.get(&clean) {
            return abbr.replace('.', "").to_uppercase();
        }

        consonant_skeleton(&clean)
    }
}

/// Consonant-skeleton fallback for words the dictionary does not know
///
/// The first alphanumeric character is always kept, vowel or not. From the
/// remainder, vowels are removed and runs of identical consonants collapse to
/// one occurrence; non-adjacent repeats survive. Digits count as consonants.
fn consonant_skeleton(clean: &str) -> String {
    let alphanumeric: Vec<char> = clean
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let Some((&first, rest)) = alphanumeric.split_first() else {
        return String::new();
    };

    let mut out = String::with_capacity(FALLBACK_LEN);
    out.push(first);

    let mut prev = None;
    for &c in rest {
        if matches!(c, 'A' | 'E' | 'I' | 'O' | 'U') {
            continue;
        }
        if prev == Some(c) {
            continue;
        }
        out.push(c);
        prev = Some(c);
        if out.len() == FALLBACK_LEN {
            break;
        }
    }

    out
}
