//! Interpreter facade: top-level API for medinterp.
//!
//! The [`Interpreter`] owns every loaded resource and turns parse trees
//! into an [`Interpretation`]: the assertions that survived reasoning and
//! the ontology concepts that justified them.

use std::sync::Arc;

use serde::Serialize;

use crate::config::InterpreterConfig;
use crate::crosswalk::ConceptCrosswalk;
use crate::error::InterpResult;
use crate::ontology::{ConceptId, OntologyGraph};
use crate::pattern::{ParseTree, PatternSet, Triplet};
use crate::reasoning::{InterpretationModel, ReasoningConfig, ReasoningEngine, ResourceBindings};
use crate::thesaurus::ThesaurusGraph;

/// Read-only resources shared by every interpretation.
#[derive(Clone)]
pub struct Resources {
    pub ontology: Arc<OntologyGraph>,
    pub thesaurus: Arc<ThesaurusGraph>,
    pub patterns: Arc<PatternSet>,
    pub bindings: Arc<ResourceBindings>,
    pub crosswalk: Option<Arc<ConceptCrosswalk>>,
}

impl Resources {
    /// Load every resource named by `config`. Any load error aborts.
    pub fn load(config: &InterpreterConfig) -> InterpResult<Self> {
        let paths = &config.resources;
        tracing::info!("loading interpreter resources");

        let ontology = OntologyGraph::load(
            config.ontology.clone(),
            &paths.concepts,
            &paths.relationships,
            &paths.descriptions,
        )?;
        let thesaurus = ThesaurusGraph::load(config.thesaurus.clone(), paths.thesaurus_files())?;
        let patterns = PatternSet::load(&paths.patterns)?;
        let bindings = ResourceBindings::load(&paths.bindings)?;
        let crosswalk = match &paths.crosswalk {
            Some(path) => Some(Arc::new(ConceptCrosswalk::load(path)?)),
            None => None,
        };

        Ok(Self {
            ontology: Arc::new(ontology),
            thesaurus: Arc::new(thesaurus),
            patterns: Arc::new(patterns),
            bindings: Arc::new(bindings),
            crosswalk,
        })
    }
}

/// One accepted triplet and the pattern that extracted it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assertion {
    /// Index of the input tree the triplet came from.
    pub sentence: usize,
    pub pattern: String,
    pub subject_slot: String,
    pub predicate_slot: String,
    pub object_slot: String,
    pub triplet: Triplet,
}

/// Interpretation of one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Interpretation {
    pub assertions: Vec<Assertion>,
    /// Concepts that justified accepted triplets, duplicates included.
    pub concepts: Vec<ConceptId>,
    /// CUIs of `concepts` that have a crosswalk entry, in the same order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cuis: Vec<String>,
}

/// A concept hit for a word sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptHit {
    pub id: ConceptId,
    pub preferred_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cui: Option<String>,
}

/// The medical narrative interpreter.
pub struct Interpreter {
    reasoning: ReasoningConfig,
    resources: Resources,
}

impl Interpreter {
    pub fn new(resources: Resources, reasoning: ReasoningConfig) -> InterpResult<Self> {
        reasoning.validate()?;
        tracing::info!(
            concepts = resources.ontology.concept_count(),
            synsets = resources.thesaurus.synset_count(),
            patterns = resources.patterns.len(),
            slots = resources.bindings.len(),
            threshold = reasoning.threshold,
            "interpreter ready"
        );
        Ok(Self {
            reasoning,
            resources,
        })
    }

    /// Load resources and build the interpreter in one step.
    pub fn from_config(config: &InterpreterConfig) -> InterpResult<Self> {
        let resources = Resources::load(config)?;
        Self::new(resources, config.reasoning.clone())
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn reasoning_config(&self) -> &ReasoningConfig {
        &self.reasoning
    }

    pub fn engine(&self) -> ReasoningEngine<'_> {
        ReasoningEngine::new(
            &self.resources.ontology,
            &self.resources.thesaurus,
            &self.resources.bindings,
        )
    }

    /// Match every pattern against every tree and keep what the reasoning
    /// engine accepts.
    pub fn interpret(&self, trees: &[ParseTree]) -> InterpResult<Interpretation> {
        let engine = self.engine();
        let mut model = InterpretationModel::new(self.reasoning.clone())?;
        let mut sentences = Vec::new();

        for (sentence, tree) in trees.iter().enumerate() {
            let matched = self.resources.patterns.matching_patterns(tree)?;
            let retained = model.add_matched_patterns(&engine, matched)?;
            sentences.extend(std::iter::repeat_n(sentence, retained));
        }

        let (patterns, concepts) = model.into_parts();
        let mut assertions = Vec::new();
        for (matched, sentence) in patterns.iter().zip(sentences) {
            let pattern = matched.pattern();
            for triplet in matched.triplets() {
                assertions.push(Assertion {
                    sentence,
                    pattern: pattern.to_string(),
                    subject_slot: pattern.subject_slot.clone(),
                    predicate_slot: pattern.predicate_slot.clone(),
                    object_slot: pattern.object_slot.clone(),
                    triplet: triplet.clone(),
                });
            }
        }

        let cuis = match &self.resources.crosswalk {
            Some(crosswalk) => concepts
                .iter()
                .filter_map(|&id| crosswalk.cui_of(id).map(str::to_string))
                .collect(),
            None => Vec::new(),
        };

        tracing::info!(
            sentences = trees.len(),
            assertions = assertions.len(),
            concepts = concepts.len(),
            "interpretation complete"
        );
        Ok(Interpretation {
            assertions,
            concepts,
            cuis,
        })
    }

    /// Fuzzy concept lookup for a word sequence.
    pub fn concepts<S: AsRef<str>>(&self, words: &[S]) -> Vec<ConceptHit> {
        let ontology = &self.resources.ontology;
        ontology
            .fuzzy_concept_search(words)
            .into_iter()
            .map(|id| ConceptHit {
                id,
                preferred_name: ontology
                    .concept_names(id)
                    .and_then(|n| n.preferred_name.clone()),
                cui: self
                    .resources
                    .crosswalk
                    .as_ref()
                    .and_then(|c| c.cui_of(id))
                    .map(str::to_string),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::graph::tests::sample_graph;
    use crate::reasoning::engine::tests::sample_bindings;
    use crate::thesaurus::graph::tests::sample_thesaurus;

    const PATTERNS: &str = "\
PERSON SUFFER TEMPERATURE (S(NP(A_SUBJECT))(VP(VBZ(B_RELATIONSHIP))(NP(C_OBJECT))))
";

    fn interpreter(crosswalk: Option<ConceptCrosswalk>) -> Interpreter {
        let thesaurus = sample_thesaurus();
        let bindings = sample_bindings(&thesaurus);
        let resources = Resources {
            ontology: Arc::new(sample_graph()),
            thesaurus: Arc::new(thesaurus),
            patterns: Arc::new(PatternSet::from_reader(PATTERNS.as_bytes(), "test").unwrap()),
            bindings: Arc::new(bindings),
            crosswalk: crosswalk.map(Arc::new),
        };
        Interpreter::new(resources, ReasoningConfig::default()).unwrap()
    }

    fn trees(lines: &[&str]) -> Vec<ParseTree> {
        lines
            .iter()
            .map(|l| ParseTree::from_bracketed(l).unwrap())
            .collect()
    }

    #[test]
    fn assertions_record_their_sentence() {
        let interp = interpreter(None);
        let result = interp
            .interpret(&trees(&[
                "(S (NP (NN doctor)) (VP (VBZ has) (NP (NN fever))))",
                "(S (NP (NN patient)) (VP (VBZ has) (NP (NN fever))))",
            ]))
            .unwrap();
        assert_eq!(result.assertions.len(), 1);
        let a = &result.assertions[0];
        assert_eq!(a.sentence, 1);
        assert_eq!(a.object_slot, "TEMPERATURE");
        assert_eq!(a.triplet.subject, Some(vec!["patient".to_string()]));
        assert_eq!(result.concepts, vec![ConceptId::new(3)]);
        assert!(result.cuis.is_empty());
    }

    #[test]
    fn crosswalk_maps_found_concepts() {
        let rows = "C0015967|ENG|S|L1|PF|S1|Y|A1|1|3||SNOMEDCT_US|PT|3|Fever|9|N|256|\n";
        let crosswalk = ConceptCrosswalk::from_reader(rows.as_bytes(), "test").unwrap();
        let interp = interpreter(Some(crosswalk));
        let result = interp
            .interpret(&trees(&["(S (NP (NN he)) (VP (VBZ has) (NP (NN fever))))"]))
            .unwrap();
        assert_eq!(result.cuis, vec!["C0015967".to_string()]);

        let hits = interp.concepts(&["fever"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].preferred_name.as_deref(), Some("Fever"));
        assert_eq!(hits[0].cui.as_deref(), Some("C0015967"));
    }

    #[test]
    fn interpretation_serializes_to_json() {
        let interp = interpreter(None);
        let result = interp
            .interpret(&trees(&["(S (NP (NN I)) (VP (VBZ has) (NP (NN pyrexia))))"]))
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["assertions"][0]["triplet"]["object"][0], "pyrexia");
        assert_eq!(json["concepts"][0], 3);
        assert!(json.get("cuis").is_none());
    }

    #[test]
    fn empty_input_gives_empty_interpretation() {
        let interp = interpreter(None);
        assert_eq!(interp.interpret(&[]).unwrap(), Interpretation::default());
    }
}
