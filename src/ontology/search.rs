//! Name-based concept lookup.
//!
//! Every query is a full scan over the lowercased names of every named
//! concept. Scans run in parallel with rayon and prune candidates whose
//! length alone rules them out.

use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;

use crate::edit_distance;

use super::graph::OntologyGraph;
use super::{ConceptId, Nomenclature};

/// How a single word is compared against concept names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMethod {
    /// Case-insensitive substring of the preferred name or a synonym.
    Substring,
    /// Normalized edit distance below the configured fuzzy threshold.
    Levenshtein,
}

/// Precomputed search key of one concept.
#[derive(Debug, Clone)]
pub(crate) struct SearchEntry {
    pub(crate) concept: ConceptId,
    /// Lowercased names with their character counts.
    names: Vec<(String, usize)>,
}

impl SearchEntry {
    pub(crate) fn build_all(names: &HashMap<ConceptId, Nomenclature>) -> Vec<Self> {
        let mut entries: Vec<Self> = names
            .iter()
            .filter(|(_, n)| !n.is_empty())
            .map(|(&concept, n)| Self {
                concept,
                names: n
                    .names()
                    .map(|name| {
                        let lower = name.to_lowercase();
                        let len = lower.chars().count();
                        (lower, len)
                    })
                    .collect(),
            })
            .collect();
        entries.sort_unstable_by_key(|e| e.concept);
        entries
    }

    /// Whether any name lies within `threshold` of `query`.
    fn is_fuzzy_hit(&self, query: &str, query_len: usize, threshold: f64) -> bool {
        self.names.iter().any(|(name, len)| {
            edit_distance::normalized_lower_bound(query_len, *len) < threshold
                && edit_distance::normalized(query, name) < threshold
        })
    }

    fn contains(&self, fragment: &str) -> bool {
        self.names.iter().any(|(name, _)| name.contains(fragment))
    }
}

impl OntologyGraph {
    /// Concepts whose preferred name or any synonym is within the fuzzy
    /// threshold of the words joined by spaces.
    ///
    /// Comparison is case-insensitive. Every qualifying concept is returned,
    /// sorted by id.
    pub fn fuzzy_concept_search<S: AsRef<str>>(&self, words: &[S]) -> Vec<ConceptId> {
        let query = join_lower(words);
        let hits = self.fuzzy_scan(&query);
        tracing::debug!(query = %query, hits = hits.len(), "fuzzy concept search");
        hits
    }

    fn fuzzy_scan(&self, query: &str) -> Vec<ConceptId> {
        if query.is_empty() {
            return Vec::new();
        }
        let threshold = self.config.fuzzy_threshold;
        let query_len = query.chars().count();
        // entries are sorted by id and collect preserves order
        self.search_entries
            .par_iter()
            .filter(|entry| entry.is_fuzzy_hit(query, query_len, threshold))
            .map(|entry| entry.concept)
            .collect()
    }

    /// Concepts matching every word individually.
    ///
    /// Each word is searched on its own with `method`, and the per-word hit
    /// sets are intersected. Returns an empty list for no words.
    pub fn matches_for_words<S: AsRef<str>>(
        &self,
        words: &[S],
        method: SearchMethod,
    ) -> Vec<ConceptId> {
        let mut result: Option<BTreeSet<ConceptId>> = None;

        for word in words {
            let word = word.as_ref().to_lowercase();
            let hits: BTreeSet<ConceptId> = match method {
                SearchMethod::Levenshtein => self.fuzzy_scan(&word).into_iter().collect(),
                SearchMethod::Substring => self
                    .search_entries
                    .par_iter()
                    .filter(|entry| entry.contains(&word))
                    .map(|entry| entry.concept)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .collect(),
            };

            let narrowed = match result {
                Some(previous) => previous.intersection(&hits).copied().collect(),
                None => hits,
            };
            if narrowed.is_empty() {
                return Vec::new();
            }
            result = Some(narrowed);
        }

        result.map(|set| set.into_iter().collect()).unwrap_or_default()
    }

    /// Segment a word sequence into concept mentions, left to right.
    ///
    /// From each start position the chain of consecutive words is extended
    /// while the fuzzy search keeps returning hits. The hits of the longest
    /// productive chain are kept and scanning resumes right after it; a
    /// start word with no hits on its own is skipped.
    pub fn sweep_search<S: AsRef<str>>(&self, words: &[S]) -> Vec<ConceptId> {
        let mut found = BTreeSet::new();
        let mut start = 0;

        while start < words.len() {
            let mut productive: Option<(usize, Vec<ConceptId>)> = None;
            for end in start + 1..=words.len() {
                let hits = self.fuzzy_scan(&join_lower(&words[start..end]));
                if hits.is_empty() {
                    break;
                }
                productive = Some((end, hits));
            }

            match productive {
                Some((end, hits)) => {
                    found.extend(hits);
                    start = end;
                }
                None => start += 1,
            }
        }

        found.into_iter().collect()
    }
}

fn join_lower<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::graph::tests::{concept, name, relation, sample_graph};
    use crate::ontology::{IS_A_TYPE_ID, OntologyConfig};

    fn ids(raw: &[u64]) -> Vec<ConceptId> {
        raw.iter().copied().map(ConceptId::new).collect()
    }

    #[test]
    fn exact_name_is_found_case_insensitively() {
        let g = sample_graph();
        assert_eq!(g.fuzzy_concept_search(&["FEVER"]), ids(&[3]));
        assert_eq!(g.fuzzy_concept_search(&["pyrexia"]), ids(&[3]));
    }

    #[test]
    fn misspelling_within_threshold_is_found() {
        let g = sample_graph();
        // 1 edit over 11 characters
        assert_eq!(g.fuzzy_concept_search(&["palptation"]), ids(&[4]));
        // 3 edits over 8 characters is too far
        assert!(g.fuzzy_concept_search(&["feverish"]).is_empty());
    }

    #[test]
    fn words_are_joined_with_spaces() {
        let g = sample_graph();
        assert_eq!(g.fuzzy_concept_search(&["clinical", "finding"]), ids(&[1]));
        assert!(g.fuzzy_concept_search(&["clinical"]).is_empty());
    }

    #[test]
    fn every_qualifying_concept_is_returned() {
        let g = OntologyGraph::from_records(
            OntologyConfig::default(),
            vec![concept(1, true), concept(2, true), concept(3, true)],
            vec![relation(10, 2, 1, IS_A_TYPE_ID)],
            vec![
                name(20, 1, "Palpitation", true),
                name(21, 2, "Palpitations", false),
                name(22, 3, "Backache", true),
            ],
        )
        .unwrap();
        assert_eq!(g.fuzzy_concept_search(&["palpitation"]), ids(&[1, 2]));
    }

    #[test]
    fn empty_query_finds_nothing() {
        let g = sample_graph();
        let none: [&str; 0] = [];
        assert!(g.fuzzy_concept_search(&none).is_empty());
    }

    #[test]
    fn relation_type_names_are_not_searched() {
        let g = sample_graph();
        assert!(g.fuzzy_concept_search(&["is a"]).is_empty());
    }

    #[test]
    fn substring_search_intersects_words() {
        let g = sample_graph();
        assert_eq!(
            g.matches_for_words(&["body"], SearchMethod::Substring),
            ids(&[2, 5])
        );
        assert_eq!(
            g.matches_for_words(&["body", "TEMPERATURE"], SearchMethod::Substring),
            ids(&[2])
        );
        assert!(g.matches_for_words(&["body", "fever"], SearchMethod::Substring).is_empty());
    }

    #[test]
    fn levenshtein_search_per_word() {
        let g = sample_graph();
        assert_eq!(
            g.matches_for_words(&["palpitatoin"], SearchMethod::Levenshtein),
            Vec::<ConceptId>::new()
        );
        assert_eq!(
            g.matches_for_words(&["Palpitation"], SearchMethod::Levenshtein),
            ids(&[4])
        );
    }

    #[test]
    fn sweep_segments_longest_chains() {
        let g = sample_graph();
        let words = ["the", "clinical", "finding", "was", "fever", "and", "body"];
        // "clinical" alone has no hit, so the chain starting there is skipped;
        // "finding" alone has no hit either.
        assert_eq!(g.sweep_search(&words), ids(&[3, 5]));

        let words = ["fever", "clinical", "finding"];
        assert_eq!(g.sweep_search(&words), ids(&[3]));
    }
}
