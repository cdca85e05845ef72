//! Resource-aware acceptance of extracted triplets.
//!
//! [`ResourceBindings`] tie each meta-model slot name to the words,
//! thesaurus senses and ontology concepts that may fill it. The
//! [`ReasoningEngine`] scores triplets against those bindings and the
//! [`InterpretationModel`] keeps the patterns whose triplets pass the
//! configured threshold.

pub mod bindings;
pub mod engine;
pub mod model;

pub use bindings::{ResourceBindings, SlotBinding};
pub use engine::{Evaluation, ReasoningEngine};
pub use model::{DEFAULT_THRESHOLD, InterpretationModel, ReasoningConfig};
