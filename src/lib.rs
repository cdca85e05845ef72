// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # medinterp
//!
//! Interprets short medical narratives: extracts (subject, predicate, object)
//! assertions from constituency parse trees and validates each one against a
//! clinical ontology and a general-language thesaurus.
//!
//! ## Architecture
//!
//! - **Ontology** (`ontology`): concept graph over petgraph with is-a ancestor
//!   search and fuzzy multi-word name lookup
//! - **Thesaurus** (`thesaurus`): synset graph with shortest ancestral path
//! - **Patterns** (`pattern`): tree-shaped patterns and a backtracking matcher
//!   that extracts triplets from parse trees
//! - **Reasoning** (`reasoning`): slot bindings, triplet scoring and the
//!   per-document interpretation model
//! - **Interpreter** (`interpreter`): facade owning every loaded resource
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//! use medinterp::config::InterpreterConfig;
//! use medinterp::interpreter::Interpreter;
//! use medinterp::pattern::ParseTree;
//!
//! let config = InterpreterConfig::load(Path::new("medinterp.toml")).unwrap();
//! let interpreter = Interpreter::from_config(&config).unwrap();
//! let tree = ParseTree::from_bracketed(
//!     "(ROOT (S (NP (NN patient)) (VP (VBZ has) (NP (NN fever)))))",
//! )
//! .unwrap();
//! let interpretation = interpreter.interpret(&[tree]).unwrap();
//! println!("{}", serde_json::to_string_pretty(&interpretation).unwrap());
//! ```

pub mod config;
pub mod crosswalk;
pub mod edit_distance;
pub mod error;
pub mod interpreter;
pub mod ontology;
pub mod pattern;
pub mod reasoning;
pub mod thesaurus;
