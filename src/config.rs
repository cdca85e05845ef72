//! Interpreter configuration, persisted as TOML.
//!
//! ```toml
//! [resources]
//! concepts = "snomed/sct2_Concept_Snapshot.txt"
//! relationships = "snomed/sct2_Relationship_Snapshot.txt"
//! descriptions = "snomed/sct2_Description_Snapshot.txt"
//! nouns = "wordnet/data.noun"
//! verbs = "wordnet/data.verb"
//! adverbs = "wordnet/data.adv"
//! adjectives = "wordnet/data.adj"
//! patterns = "patterns.txt"
//! bindings = "bindings.txt"
//!
//! [reasoning]
//! threshold = 0.75
//! ```
//!
//! Relative resource paths are resolved against the directory holding the
//! configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ontology::OntologyConfig;
use crate::reasoning::ReasoningConfig;
use crate::thesaurus::{ThesaurusConfig, WordClass};

/// Locations of every resource file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePaths {
    /// Ontology concept records.
    pub concepts: PathBuf,
    /// Ontology relationship records.
    pub relationships: PathBuf,
    /// Ontology name records.
    pub descriptions: PathBuf,
    pub nouns: PathBuf,
    pub verbs: PathBuf,
    pub adverbs: PathBuf,
    pub adjectives: PathBuf,
    pub patterns: PathBuf,
    pub bindings: PathBuf,
    /// Optional `MRCONSO.RRF` for concept id to CUI mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crosswalk: Option<PathBuf>,
}

impl ResourcePaths {
    /// Thesaurus data files in load order.
    pub fn thesaurus_files(&self) -> [(WordClass, &Path); 4] {
        [
            (WordClass::Noun, self.nouns.as_path()),
            (WordClass::Verb, self.verbs.as_path()),
            (WordClass::Adverb, self.adverbs.as_path()),
            (WordClass::Adjective, self.adjectives.as_path()),
        ]
    }

    /// Prefix every relative path with `base`.
    pub fn resolve_against(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for path in [
            &mut self.concepts,
            &mut self.relationships,
            &mut self.descriptions,
            &mut self.nouns,
            &mut self.verbs,
            &mut self.adverbs,
            &mut self.adjectives,
            &mut self.patterns,
            &mut self.bindings,
        ] {
            resolve(path);
        }
        if let Some(crosswalk) = self.crosswalk.as_mut() {
            resolve(crosswalk);
        }
    }
}

/// Everything needed to build an [`Interpreter`](crate::interpreter::Interpreter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    pub resources: ResourcePaths,
    #[serde(default)]
    pub ontology: OntologyConfig,
    #[serde(default)]
    pub thesaurus: ThesaurusConfig,
    #[serde(default)]
    pub reasoning: ReasoningConfig,
}

impl InterpreterConfig {
    /// Config with default tuning for the given resources.
    pub fn new(resources: ResourcePaths) -> Self {
        Self {
            resources,
            ontology: OntologyConfig::default(),
            thesaurus: ThesaurusConfig::default(),
            reasoning: ReasoningConfig::default(),
        }
    }

    /// Load from a TOML file, resolving relative resource paths against the
    /// file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config = Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })?;
        if let Some(base) = path.parent() {
            config.resources.resolve_against(base);
        }
        Ok(config)
    }

    fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
