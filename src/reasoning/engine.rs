//! Scoring extracted triplets against the resource bindings.

use serde::Serialize;

use crate::error::ReasonResult;
use crate::ontology::{ConceptId, OntologyGraph};
use crate::pattern::{SlotRole, SyntacticalPattern, Triplet};
use crate::thesaurus::ThesaurusGraph;

use super::bindings::{ResourceBindings, SlotBinding};

/// Outcome of evaluating one triplet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Product of the three slot scores.
    pub score: f64,
    /// Subject, predicate and object scores, in that order.
    pub slot_scores: [f64; 3],
    /// Ontology concepts that justified a slot, across all three slots.
    pub found_concepts: Vec<ConceptId>,
}

impl Evaluation {
    pub fn slot_score(&self, role: SlotRole) -> f64 {
        match role {
            SlotRole::Subject => self.slot_scores[0],
            SlotRole::Predicate => self.slot_scores[1],
            SlotRole::Object => self.slot_scores[2],
        }
    }
}

/// Decides whether the words of each slot are admissible instances of the
/// meta-model entity the pattern expects there.
///
/// Holds shared references only; one engine can evaluate from many threads.
#[derive(Clone, Copy)]
pub struct ReasoningEngine<'r> {
    ontology: &'r OntologyGraph,
    thesaurus: &'r ThesaurusGraph,
    bindings: &'r ResourceBindings,
}

impl<'r> ReasoningEngine<'r> {
    pub fn new(
        ontology: &'r OntologyGraph,
        thesaurus: &'r ThesaurusGraph,
        bindings: &'r ResourceBindings,
    ) -> Self {
        Self {
            ontology,
            thesaurus,
            bindings,
        }
    }

    /// Score `triplet` against the slots of `pattern`.
    ///
    /// Fails with an unknown-slot error when the pattern names a slot that
    /// has no binding.
    pub fn evaluate(
        &self,
        pattern: &SyntacticalPattern,
        triplet: &Triplet,
    ) -> ReasonResult<Evaluation> {
        let mut found_concepts = Vec::new();
        let mut slot_scores = [0.0; 3];

        for (i, role) in SlotRole::ALL.into_iter().enumerate() {
            slot_scores[i] =
                self.evaluate_slot(pattern.slot(role), triplet.words(role), &mut found_concepts)?;
        }

        let score: f64 = slot_scores.iter().product();
        tracing::debug!(
            pattern = %pattern,
            subject = slot_scores[0],
            predicate = slot_scores[1],
            object = slot_scores[2],
            score,
            found = found_concepts.len(),
            "evaluated triplet"
        );

        Ok(Evaluation {
            score,
            slot_scores,
            found_concepts,
        })
    }

    /// Score one slot: 1.0 when any kind of evidence admits `words`,
    /// 0.0 otherwise.
    ///
    /// Evidence is tried in order: nullability, explicit words, thesaurus
    /// senses, ontology concepts. Concepts that justified the slot are
    /// appended to `found`.
    pub fn evaluate_slot(
        &self,
        slot: &str,
        words: Option<&[String]>,
        found: &mut Vec<ConceptId>,
    ) -> ReasonResult<f64> {
        let binding = self.bindings.get(slot)?;

        let Some(words) = words else {
            return Ok(if binding.nullable { 1.0 } else { 0.0 });
        };

        if explicit_match(binding, words) {
            return Ok(1.0);
        }

        // single letters are noise, not evidence
        if let [word] = words {
            if word.chars().count() == 1 {
                return Ok(0.0);
            }
        }

        if self.thesaurus_match(binding, words) {
            return Ok(1.0);
        }

        let Some(expected) = binding.ontology_concepts.as_deref() else {
            return Ok(0.0);
        };

        let mut admitted = Vec::new();
        for candidate in self.ontology.fuzzy_concept_search(words) {
            if self.ontology.is_subsumed_by_any(candidate, expected)? {
                admitted.push(candidate);
            }
        }

        if admitted.is_empty() {
            return Ok(0.0);
        }
        found.extend(admitted);
        Ok(1.0)
    }

    /// Every word has at least one sense among the bound senses.
    fn thesaurus_match(&self, binding: &SlotBinding, words: &[String]) -> bool {
        let Some(senses) = binding.thesaurus_senses.as_deref() else {
            return false;
        };
        words.iter().all(|word| {
            self.thesaurus
                .synsets_of(&word.to_lowercase())
                .iter()
                .any(|s| senses.contains(s))
        })
    }
}

/// Every word equals some bound word, ignoring case.
fn explicit_match(binding: &SlotBinding, words: &[String]) -> bool {
    let Some(explicit) = binding.explicit_words.as_deref() else {
        return false;
    };
    words.iter().all(|word| {
        let word = word.to_lowercase();
        explicit.iter().any(|e| e.to_lowercase() == word)
    })
}
