//! Rich diagnostic error types for the medinterp crate.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly
//! which resource file or query went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

pub use crate::pattern::error::{PatternError, TripletError};

/// Top-level error type for the medinterp crate.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum InterpError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Thesaurus(#[from] ThesaurusError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Triplet(#[from] TripletError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reason(#[from] ReasonError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Crosswalk(#[from] CrosswalkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Argument errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("missing required argument: {argument}")]
    #[diagnostic(
        code(medinterp::argument::missing),
        help(
            "A required string argument was absent. \
             Edit distance and triplet construction need a concrete value for every input."
        )
    )]
    Missing { argument: &'static str },

    #[error("empty argument: {argument}")]
    #[diagnostic(
        code(medinterp::argument::empty),
        help("The argument was present but held no words. Provide at least one non-empty word.")
    )]
    Empty { argument: &'static str },
}

// ---------------------------------------------------------------------------
// Ontology errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OntologyError {
    #[error("{record} record {record_id} references unknown id {referenced}")]
    #[diagnostic(
        code(medinterp::ontology::missing_reference),
        help(
            "Every relationship must connect two active concepts. \
             Check that the concept file and relationship file come from the same release, \
             and that the referenced concept is marked active."
        )
    )]
    MissingReference {
        record: &'static str,
        record_id: u64,
        referenced: u64,
    },

    #[error("malformed {file} record at line {line}: {message}")]
    #[diagnostic(
        code(medinterp::ontology::malformed_record),
        help(
            "Ontology files are tab-delimited with a fixed column count. \
             Check that the file was not re-encoded or truncated."
        )
    )]
    MalformedRecord {
        file: &'static str,
        line: usize,
        message: String,
    },

    #[error("duplicate concept id {id}")]
    #[diagnostic(
        code(medinterp::ontology::duplicate_concept),
        help("Each active concept id must appear once in the concept file (use a snapshot release).")
    )]
    DuplicateConcept { id: u64 },

    #[error("unknown concept id {id}")]
    #[diagnostic(
        code(medinterp::ontology::unknown_concept),
        help("The concept is not part of the loaded ontology, or it was inactive in the release.")
    )]
    UnknownConcept { id: u64 },

    #[error("failed to read ontology file {path}")]
    #[diagnostic(
        code(medinterp::ontology::io),
        help("Check that the path in the configuration exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for ontology operations.
pub type OntologyResult<T> = std::result::Result<T, OntologyError>;

// ---------------------------------------------------------------------------
// Thesaurus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ThesaurusError {
    #[error("malformed {word_class} synset record at line {line}: {message}")]
    #[diagnostic(
        code(medinterp::thesaurus::malformed_record),
        help(
            "Thesaurus data lines read `offset lex_file pos w_cnt (word lex_id)* p_cnt \
             (symbol offset pos src/tgt)* ...`. If the file still starts with license text, \
             adjust `thesaurus.header_lines`."
        )
    )]
    MalformedRecord {
        word_class: String,
        line: usize,
        message: String,
    },

    #[error("unknown synset index {index} (graph holds {size} synsets)")]
    #[diagnostic(
        code(medinterp::thesaurus::unknown_synset),
        help("Synset indices are dense and assigned at load time; the index is out of range.")
    )]
    UnknownSynset { index: u32, size: usize },

    #[error("word not in thesaurus: \"{word}\"")]
    #[diagnostic(
        code(medinterp::thesaurus::unknown_word),
        help("Word lookup is case sensitive and uses underscores for multi-word entries.")
    )]
    UnknownWord { word: String },

    #[error("invalid word search \"{query}\": {message}")]
    #[diagnostic(
        code(medinterp::thesaurus::invalid_query),
        help("The search fragment is matched literally; shorten it if it exceeds the matcher's size limit.")
    )]
    InvalidQuery { query: String, message: String },

    #[error("failed to read thesaurus file {path}")]
    #[diagnostic(
        code(medinterp::thesaurus::io),
        help("Check that the path in the configuration exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for thesaurus operations.
pub type ThesaurusResult<T> = std::result::Result<T, ThesaurusError>;

// ---------------------------------------------------------------------------
// Binding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum BindingError {
    #[error("unknown slot: \"{slot}\"")]
    #[diagnostic(
        code(medinterp::binding::unknown_slot),
        help(
            "The pattern names a slot that has no `mm_{slot}` block in the binding file. \
             Add the block, or fix the slot name in the pattern file."
        )
    )]
    UnknownSlot { slot: String },

    #[error("malformed binding line {line}: \"{content}\": {message}")]
    #[diagnostic(
        code(medinterp::binding::malformed),
        help(
            "Binding lines start with `mm_`, `wn_`, `sn_`, `ow_` or `nl_`. \
             Attribute lines must follow an `mm_` block header."
        )
    )]
    Malformed {
        line: usize,
        content: String,
        message: String,
    },

    #[error("failed to read binding file {path}")]
    #[diagnostic(
        code(medinterp::binding::io),
        help("Check that the path in the configuration exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for binding operations.
pub type BindingResult<T> = std::result::Result<T, BindingError>;

// ---------------------------------------------------------------------------
// Reasoning errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ReasonError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error("threshold {threshold} outside [0, 1]")]
    #[diagnostic(
        code(medinterp::reason::invalid_threshold),
        help("Triplet scores live in [0, 1]; pick a retention threshold in that range.")
    )]
    InvalidThreshold { threshold: f64 },
}

/// Result type for reasoning operations.
pub type ReasonResult<T> = std::result::Result<T, ReasonError>;

// ---------------------------------------------------------------------------
// Crosswalk errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum CrosswalkError {
    #[error("malformed crosswalk row at line {line}: expected at least {expected} fields, got {actual}")]
    #[diagnostic(
        code(medinterp::crosswalk::malformed),
        help("Crosswalk rows are pipe-delimited MRCONSO.RRF records.")
    )]
    Malformed {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("failed to read crosswalk file {path}")]
    #[diagnostic(
        code(medinterp::crosswalk::io),
        help("Check that the path in the configuration exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(medinterp::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(medinterp::config::parse),
        help("Check the TOML syntax and that every resource path is a string.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(medinterp::config::write),
        help("Check that the parent directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning medinterp results.
pub type InterpResult<T> = std::result::Result<T, InterpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ontology_error_converts_to_interp_error() {
        let err = OntologyError::MissingReference {
            record: "relationship",
            record_id: 7,
            referenced: 42,
        };
        let top: InterpError = err.into();
        assert!(matches!(
            top,
            InterpError::Ontology(OntologyError::MissingReference { .. })
        ));
    }

    #[test]
    fn reason_error_wraps_binding_error() {
        let err: ReasonError = BindingError::UnknownSlot {
            slot: "PERSON".into(),
        }
        .into();
        assert!(matches!(
            err,
            ReasonError::Binding(BindingError::UnknownSlot { .. })
        ));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = OntologyError::MissingReference {
            record: "relationship",
            record_id: 7,
            referenced: 42,
        };
        let msg = format!("{err}");
        assert!(msg.contains("relationship"));
        assert!(msg.contains("42"));
    }
}
