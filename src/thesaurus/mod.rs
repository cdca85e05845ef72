//! Lexical thesaurus: synsets of words linked by typed pointers.
//!
//! Built from four word-class data files (noun, verb, adverb, adjective).
//! A synset may point at a synset that has not been read yet, so
//! construction is two-phase: the [`SynsetIndexer`] hands out a dense index
//! for any `(offset, word class)` pair on first sight, and the record that
//! defines the synset fills it in later.
//!
//! The main query is the shortest ancestral path between two sets of
//! synsets ([`sap`]), used to measure how related two words are.

pub mod graph;
pub mod indexer;
pub mod records;
pub mod sap;

use serde::{Deserialize, Serialize};

pub use graph::ThesaurusGraph;
pub use indexer::SynsetIndexer;
pub use sap::AncestralPath;

/// License lines at the top of each data file.
pub const DEFAULT_HEADER_LINES: usize = 29;

/// Pointer symbols followed by default: hypernym, instance hypernym,
/// similar to, also see, verb group, entailment, cause, attribute.
pub const DEFAULT_POINTER_SYMBOLS: &[&str] = &["@", "@i", "&", "^", "$", "*", ">", "="];

/// Syntactic category a synset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordClass {
    Noun,
    Verb,
    Adverb,
    Adjective,
}

impl WordClass {
    /// File load order.
    pub const ALL: [WordClass; 4] = [
        WordClass::Noun,
        WordClass::Verb,
        WordClass::Adverb,
        WordClass::Adjective,
    ];

    /// Word class of a pointer target's part-of-speech marker.
    ///
    /// Satellite adjectives (`s`) share the adjective index space.
    pub fn from_pos_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(Self::Noun),
            'v' => Some(Self::Verb),
            'r' => Some(Self::Adverb),
            'a' | 's' => Some(Self::Adjective),
            _ => None,
        }
    }
}

impl std::fmt::Display for WordClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Noun => "noun",
            Self::Verb => "verb",
            Self::Adverb => "adverb",
            Self::Adjective => "adjective",
        };
        f.write_str(s)
    }
}

/// Dense synset index, unique across all word classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynsetIndex(u32);

impl SynsetIndex {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SynsetIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of synonymous words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synset {
    pub index: SynsetIndex,
    pub word_class: WordClass,
    /// Byte offset of the record in its data file.
    pub offset: u32,
    /// Member words as written in the data file (multi-word entries use `_`).
    /// Empty for a synset that was referenced but never defined.
    pub words: Vec<String>,
}

/// Thesaurus loading options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThesaurusConfig {
    /// Lines skipped at the top of each data file.
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,
    /// Pointer symbols that become graph edges; all others are ignored.
    #[serde(default = "default_pointer_symbols")]
    pub pointer_symbols: Vec<String>,
}

fn default_header_lines() -> usize {
    DEFAULT_HEADER_LINES
}

fn default_pointer_symbols() -> Vec<String> {
    DEFAULT_POINTER_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

impl Default for ThesaurusConfig {
    fn default() -> Self {
        Self {
            header_lines: default_header_lines(),
            pointer_symbols: default_pointer_symbols(),
        }
    }
}

impl ThesaurusConfig {
    pub fn follows(&self, symbol: &str) -> bool {
        self.pointer_symbols.iter().any(|s| s == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satellite_adjectives_map_to_adjective() {
        assert_eq!(WordClass::from_pos_char('s'), Some(WordClass::Adjective));
        assert_eq!(WordClass::from_pos_char('a'), Some(WordClass::Adjective));
        assert_eq!(WordClass::from_pos_char('r'), Some(WordClass::Adverb));
        assert_eq!(WordClass::from_pos_char('x'), None);
    }

    #[test]
    fn default_config_follows_hypernyms_only_from_the_list() {
        let config = ThesaurusConfig::default();
        assert!(config.follows("@"));
        assert!(config.follows("@i"));
        assert!(!config.follows("~"));
        assert!(!config.follows("!"));
        assert_eq!(config.header_lines, 29);
    }

    #[test]
    fn config_overrides_from_toml() {
        let config: ThesaurusConfig = toml::from_str("pointer_symbols = [\"@\"]").unwrap();
        assert_eq!(config.pointer_symbols, vec!["@".to_string()]);
        assert_eq!(config.header_lines, DEFAULT_HEADER_LINES);
    }
}
