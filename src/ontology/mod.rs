//! Clinical ontology graph: concepts connected by typed relationships.
//!
//! The ontology is loaded once from three tab-delimited record streams
//! (concepts, relationships, names) and is read-only afterwards:
//!
//! - **Records** ([`records`]): row parsers for the release files
//! - **Graph** ([`OntologyGraph`]): `petgraph` arena of concepts with typed edges,
//!   ancestor queries over the multi-parent is-a hierarchy
//! - **Search** ([`search`]): fuzzy (edit-distance tolerant) concept lookup by name
//!
//! The is-a hierarchy is a multi-parent graph that may contain cycles in the
//! data, so every traversal carries an explicit visited set.

pub mod graph;
pub mod records;
pub mod search;

use serde::{Deserialize, Serialize};

pub use graph::{Neighbor, OntologyGraph};
pub use search::SearchMethod;

/// Relationship type id marking an "is-a" (subtype) edge.
pub const IS_A_TYPE_ID: u64 = 116_680_003;

/// Name kind id of a fully specified (preferred) name.
pub const PREFERRED_NAME_TYPE_ID: u64 = 900_000_000_000_003_001;

/// Name kind id of a synonym.
pub const SYNONYM_TYPE_ID: u64 = 900_000_000_000_013_009;

/// Default maximum normalized edit distance for a fuzzy name hit.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.1;

/// Identifier of a concept (or relationship type) in the ontology release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(u64);

impl ConceptId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying `u64` value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ConceptId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for ConceptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the ontology graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: ConceptId,
    pub active: bool,
}

/// Edge data stored on petgraph edges: one typed relationship.
///
/// The edge's target concept is the petgraph edge target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    /// Relationship id in the release.
    pub id: u64,
    /// Relationship type (is-a, finding site, ...).
    pub type_id: u64,
    /// Role group the relationship belongs to.
    pub group: u64,
}

/// Preferred name plus synonyms of a concept or relationship type.
///
/// Data completeness is not guaranteed: many concepts have no names at all,
/// and some have synonyms without a preferred name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nomenclature {
    pub preferred_name: Option<String>,
    pub synonyms: Vec<String>,
}

impl Nomenclature {
    /// Preferred name first (when present), then every synonym.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.preferred_name
            .as_deref()
            .into_iter()
            .chain(self.synonyms.iter().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.preferred_name.is_none() && self.synonyms.is_empty()
    }
}

/// Tuning knobs for ontology construction and lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OntologyConfig {
    /// A name is a fuzzy hit when its normalized edit distance is below this.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Relationship type treated as the hierarchy relation.
    #[serde(default = "default_is_a_type_id")]
    pub is_a_type_id: u64,
    /// Name kind treated as the preferred name; every other kind is a synonym.
    #[serde(default = "default_preferred_name_type_id")]
    pub preferred_name_type_id: u64,
    /// Reject name records whose owner is neither a loaded concept nor a
    /// relationship type, instead of skipping them.
    #[serde(default)]
    pub strict_name_owners: bool,
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}
fn default_is_a_type_id() -> u64 {
    IS_A_TYPE_ID
}
fn default_preferred_name_type_id() -> u64 {
    PREFERRED_NAME_TYPE_ID
}

impl Default for OntologyConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            is_a_type_id: default_is_a_type_id(),
            preferred_name_type_id: default_preferred_name_type_id(),
            strict_name_owners: false,
        }
    }
}
