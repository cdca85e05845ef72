//! Extracted (subject, predicate, object) word triplets.

use serde::Serialize;

use crate::error::ArgumentError;

use super::error::TripletError;
use super::tree::SlotRole;

/// Words extracted for each role of a pattern, plus an acceptance score.
///
/// A role is `None` when the matched pattern did not populate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triplet {
    pub subject: Option<Vec<String>>,
    pub predicate: Option<Vec<String>>,
    pub object: Option<Vec<String>>,
    pub accuracy: f64,
}

impl Default for Triplet {
    fn default() -> Self {
        Self::empty()
    }
}

impl Triplet {
    /// A triplet with no role populated and full accuracy.
    pub fn empty() -> Self {
        Self {
            subject: None,
            predicate: None,
            object: None,
            accuracy: 1.0,
        }
    }

    /// A triplet populating only `role`.
    pub fn partial(role: SlotRole, words: Vec<String>) -> Result<Self, ArgumentError> {
        if words.is_empty() {
            return Err(ArgumentError::Empty { argument: "words" });
        }
        let mut triplet = Self::empty();
        *triplet.role_mut(role) = Some(words);
        Ok(triplet)
    }

    pub fn words(&self, role: SlotRole) -> Option<&[String]> {
        match role {
            SlotRole::Subject => self.subject.as_deref(),
            SlotRole::Predicate => self.predicate.as_deref(),
            SlotRole::Object => self.object.as_deref(),
        }
    }

    fn role_mut(&mut self, role: SlotRole) -> &mut Option<Vec<String>> {
        match role {
            SlotRole::Subject => &mut self.subject,
            SlotRole::Predicate => &mut self.predicate,
            SlotRole::Object => &mut self.object,
        }
    }

    /// Combine two triplets populating disjoint roles.
    ///
    /// The result's accuracy is the mean of both inputs. Fails with
    /// [`TripletError::MergeConflict`] when both populate the same role.
    pub fn merge(&self, other: &Triplet) -> Result<Triplet, TripletError> {
        let mut merged = self.clone();
        for role in SlotRole::ALL {
            let Some(words) = other.words(role) else {
                continue;
            };
            if let Some(existing) = self.words(role) {
                return Err(TripletError::MergeConflict {
                    role,
                    left: existing.join(" "),
                    right: words.join(" "),
                });
            }
            *merged.role_mut(role) = Some(words.to_vec());
        }
        merged.accuracy = (self.accuracy + other.accuracy) / 2.0;
        Ok(merged)
    }
}

impl std::fmt::Display for Triplet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |words: &Option<Vec<String>>| match words {
            Some(w) => w.join(" "),
            None => "null".to_string(),
        };
        write!(
            f,
            "{}({},{}) Accuracy: {:3.0}%",
            show(&self.predicate),
            show(&self.subject),
            show(&self.object),
            self.accuracy * 100.0
        )
    }
}
