//! Syntactical patterns and the triplets they extract.
//!
//! A pattern line names three meta-model slots and a tree shape:
//!
//! ```text
//! PERSON SUFFER SYMPTOM (S(NP(PERSON_SUBJECT))(VP(VBP(SUFFER_RELATIONSHIP))(PP(SYMPTOM_OBJECT))))
//! ```
//!
//! Leaves ending in `_SUBJECT`, `_RELATIONSHIP` or `_OBJECT` capture the
//! words under the aligned parse-tree subtree; other leaves only constrain
//! the tree shape.

pub mod db;
pub mod error;
pub mod matcher;
pub mod parse_tree;
pub mod tree;
pub mod triplet;

pub use db::{MatchedPattern, PatternSet, RejectedPattern};
pub use error::{PatternError, PatternResult, TripletError};
pub use matcher::SyntacticalPattern;
pub use parse_tree::{NodeId, ParseTree, ParseTreeBuilder};
pub use tree::{MAX_PATTERN_DEPTH, PatternTree, SlotRole};
pub use triplet::Triplet;
