//! Rich diagnostic error types for the pattern subsystem.
//!
//! Compilation errors are local to one pattern line: the pattern set logs
//! them and keeps loading the remaining lines.

use miette::Diagnostic;
use thiserror::Error;

use super::tree::SlotRole;

/// Errors produced while compiling patterns or reading parse trees.
#[derive(Debug, Error, Diagnostic)]
pub enum PatternError {
    #[error("malformed pattern \"{line}\": {reason}")]
    #[diagnostic(
        code(medinterp::pattern::malformed),
        help(
            "A pattern line has exactly four space-separated fields: \
             SUBJECT_SLOT PREDICATE_SLOT OBJECT_SLOT (TREE). \
             The tree is a nested list without spaces, e.g. \
             (S(NP(PERSON_SUBJECT))(VP(VBP(SUFFER_RELATIONSHIP))(PP(SYMPTOM_OBJECT))))."
        )
    )]
    Malformed { line: String, reason: String },

    #[error("pattern nests {depth} levels deep (limit {limit})")]
    #[diagnostic(
        code(medinterp::pattern::too_deep),
        help("Split the pattern into shallower patterns; real constituency patterns stay a few levels deep.")
    )]
    TooDeep { depth: usize, limit: usize },

    #[error("pattern marks the {role} role more than once")]
    #[diagnostic(
        code(medinterp::pattern::duplicate_role),
        help(
            "Each of _SUBJECT, _RELATIONSHIP and _OBJECT may label at most one leaf; \
             two leaves of the same role could never be merged into one triplet."
        )
    )]
    DuplicateRole { role: SlotRole },

    #[error("malformed parse tree at byte {position}: {reason}")]
    #[diagnostic(
        code(medinterp::pattern::malformed_parse_tree),
        help(
            "Parse trees use the bracketed form printed by constituency parsers: \
             (ROOT (S (NP (NN patient)) (VP (VBZ has) (NP (NN fever)))))."
        )
    )]
    MalformedParseTree { position: usize, reason: String },

    #[error("failed to read pattern source {path}")]
    #[diagnostic(
        code(medinterp::pattern::io),
        help("Check that the path in the configuration exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced when combining partial triplets.
#[derive(Debug, Error, Diagnostic, PartialEq)]
pub enum TripletError {
    #[error("merge conflict on {role}: \"{left}\" vs \"{right}\"")]
    #[diagnostic(
        code(medinterp::triplet::merge_conflict),
        help(
            "Two partial triplets both populate the same role. \
             Partial triplets must cover disjoint roles to be merged."
        )
    )]
    MergeConflict {
        role: SlotRole,
        left: String,
        right: String,
    },
}

/// Result type for pattern operations.
pub type PatternResult<T> = std::result::Result<T, PatternError>;
