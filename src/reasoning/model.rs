//! Accumulating the interpretation of one document.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ReasonError, ReasonResult};
use crate::ontology::ConceptId;
use crate::pattern::MatchedPattern;

use super::engine::{Evaluation, ReasoningEngine};

/// Default minimum score for a triplet to be retained.
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// Reasoning tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Triplets scoring at or above this value are retained.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl ReasoningConfig {
    pub fn validate(&self) -> ReasonResult<()> {
        if (0.0..=1.0).contains(&self.threshold) {
            Ok(())
        } else {
            Err(ReasonError::InvalidThreshold {
                threshold: self.threshold,
            })
        }
    }
}

/// The instantiated meta-model: matched patterns reduced to the triplets
/// the reasoning engine accepts, plus every ontology concept that justified
/// an accepted triplet.
#[derive(Debug, Clone)]
pub struct InterpretationModel {
    config: ReasoningConfig,
    retained: Vec<MatchedPattern>,
    found_concepts: Vec<ConceptId>,
}

impl InterpretationModel {
    pub fn new(config: ReasoningConfig) -> ReasonResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            retained: Vec::new(),
            found_concepts: Vec::new(),
        })
    }

    pub fn config(&self) -> &ReasoningConfig {
        &self.config
    }

    /// Evaluate every triplet of every pattern and keep the accepted ones.
    ///
    /// A pattern is retained, with its triplet list replaced by the accepted
    /// triplets, when at least one triplet scores at or above the threshold.
    /// Concepts found for accepted triplets are appended without
    /// deduplication. Returns the number of patterns retained by this call.
    pub fn add_matched_patterns(
        &mut self,
        engine: &ReasoningEngine<'_>,
        matched: Vec<MatchedPattern>,
    ) -> ReasonResult<usize> {
        let threshold = self.config.threshold;
        let before = self.retained.len();

        for mut pattern in matched {
            let evaluations = pattern
                .triplets()
                .par_iter()
                .map(|triplet| engine.evaluate(pattern.pattern(), triplet))
                .collect::<ReasonResult<Vec<Evaluation>>>()?;

            let mut accepted = Vec::new();
            for (triplet, eval) in pattern.triplets().iter().zip(evaluations) {
                if eval.score >= threshold {
                    accepted.push(triplet.clone());
                    self.found_concepts.extend(eval.found_concepts);
                }
            }

            if accepted.is_empty() {
                tracing::debug!(pattern = %pattern.pattern(), "no triplet retained");
                continue;
            }
            pattern.replace_triplets(accepted);
            self.retained.push(pattern);
        }

        Ok(self.retained.len() - before)
    }

    pub fn patterns(&self) -> &[MatchedPattern] {
        &self.retained
    }

    pub fn found_concepts(&self) -> &[ConceptId] {
        &self.found_concepts
    }

    pub fn into_parts(self) -> (Vec<MatchedPattern>, Vec<ConceptId>) {
        (self.retained, self.found_concepts)
    }
}
