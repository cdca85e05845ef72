//! The concept graph: petgraph arena plus id and name indexes.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::error::{OntologyError, OntologyResult};

use super::records::{ConceptRecord, NameRecord, RelationshipRecord, Rf2Records};
use super::search::SearchEntry;
use super::{Concept, ConceptId, Nomenclature, OntologyConfig, RelationEdge};

/// A typed edge leaving a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub relation: RelationEdge,
    pub target: ConceptId,
}

/// Directed graph of active concepts with typed relationship edges.
///
/// Nodes are stored densely (petgraph `NodeIndex` is the concept's dense
/// index); a reverse map gives O(1) lookup by concept id. Immutable after
/// construction, so shared `&OntologyGraph` queries need no locking.
pub struct OntologyGraph {
    pub(super) config: OntologyConfig,
    graph: DiGraph<Concept, RelationEdge>,
    index_of: HashMap<ConceptId, NodeIndex>,
    concept_names: HashMap<ConceptId, Nomenclature>,
    relation_names: HashMap<u64, Nomenclature>,
    relation_types: HashSet<u64>,
    /// Lowercased names per named concept, scanned by fuzzy search.
    pub(super) search_entries: Vec<SearchEntry>,
    skipped_names: usize,
}

impl OntologyGraph {
    /// Build the graph from three record streams, in order: concepts,
    /// relationships, names.
    ///
    /// Inactive rows are dropped. A relationship touching a concept that is
    /// not active fails with [`OntologyError::MissingReference`]. Names owned
    /// by a relationship type go to the relation nomenclature; names whose
    /// owner is unknown are skipped unless `strict_name_owners` is set.
    pub fn from_records<C, R, N>(
        config: OntologyConfig,
        concepts: C,
        relationships: R,
        names: N,
    ) -> OntologyResult<Self>
    where
        C: IntoIterator<Item = OntologyResult<ConceptRecord>>,
        R: IntoIterator<Item = OntologyResult<RelationshipRecord>>,
        N: IntoIterator<Item = OntologyResult<NameRecord>>,
    {
        let mut this = Self {
            config,
            graph: DiGraph::new(),
            index_of: HashMap::new(),
            concept_names: HashMap::new(),
            relation_names: HashMap::new(),
            relation_types: HashSet::new(),
            search_entries: Vec::new(),
            skipped_names: 0,
        };

        for record in concepts {
            let record = record?;
            if record.active {
                this.insert_concept(record.id)?;
            }
        }
        for record in relationships {
            let record = record?;
            if record.active {
                this.insert_relationship(&record)?;
            }
        }
        for record in names {
            let record = record?;
            if record.active {
                this.insert_name(record)?;
            }
        }

        this.search_entries = SearchEntry::build_all(&this.concept_names);

        tracing::info!(
            concepts = this.concept_count(),
            relationships = this.relationship_count(),
            named_concepts = this.concept_names.len(),
            relation_types = this.relation_types.len(),
            skipped_names = this.skipped_names,
            "ontology graph built"
        );
        Ok(this)
    }

    /// Build the graph from buffered readers over the three release files.
    pub fn from_readers<C: BufRead, R: BufRead, N: BufRead>(
        config: OntologyConfig,
        concepts: C,
        relationships: R,
        names: N,
    ) -> OntologyResult<Self> {
        Self::from_records(
            config,
            Rf2Records::<_, ConceptRecord>::new(concepts, "concepts"),
            Rf2Records::<_, RelationshipRecord>::new(relationships, "relationships"),
            Rf2Records::<_, NameRecord>::new(names, "names"),
        )
    }

    /// Open and load the three release files.
    pub fn load(
        config: OntologyConfig,
        concepts: &Path,
        relationships: &Path,
        names: &Path,
    ) -> OntologyResult<Self> {
        Self::from_records(
            config,
            Rf2Records::<_, ConceptRecord>::new(open(concepts)?, concepts.display().to_string()),
            Rf2Records::<_, RelationshipRecord>::new(
                open(relationships)?,
                relationships.display().to_string(),
            ),
            Rf2Records::<_, NameRecord>::new(open(names)?, names.display().to_string()),
        )
    }

    fn insert_concept(&mut self, raw: u64) -> OntologyResult<()> {
        let id = ConceptId::new(raw);
        if self.index_of.contains_key(&id) {
            return Err(OntologyError::DuplicateConcept { id: raw });
        }
        let idx = self.graph.add_node(Concept { id, active: true });
        self.index_of.insert(id, idx);
        Ok(())
    }

    fn insert_relationship(&mut self, record: &RelationshipRecord) -> OntologyResult<()> {
        let missing = |referenced| OntologyError::MissingReference {
            record: "relationship",
            record_id: record.id,
            referenced,
        };
        let source = *self
            .index_of
            .get(&ConceptId::new(record.source_id))
            .ok_or_else(|| missing(record.source_id))?;
        let target = *self
            .index_of
            .get(&ConceptId::new(record.destination_id))
            .ok_or_else(|| missing(record.destination_id))?;

        self.graph.add_edge(
            source,
            target,
            RelationEdge {
                id: record.id,
                type_id: record.type_id,
                group: record.relationship_group,
            },
        );
        self.relation_types.insert(record.type_id);
        Ok(())
    }

    fn insert_name(&mut self, record: NameRecord) -> OntologyResult<()> {
        let preferred = record.type_id == self.config.preferred_name_type_id;
        let owner = ConceptId::new(record.owner_id);

        // Relation types are checked first: a type id can also be a concept.
        let nomenclature = if self.relation_types.contains(&record.owner_id) {
            self.relation_names.entry(record.owner_id).or_default()
        } else if self.index_of.contains_key(&owner) {
            self.concept_names.entry(owner).or_default()
        } else if self.config.strict_name_owners {
            return Err(OntologyError::MissingReference {
                record: "name",
                record_id: record.id,
                referenced: record.owner_id,
            });
        } else {
            self.skipped_names += 1;
            tracing::warn!(
                name_id = record.id,
                owner = record.owner_id,
                "skipping name record with unknown owner"
            );
            return Ok(());
        };

        if preferred {
            nomenclature.preferred_name = Some(record.term);
        } else {
            nomenclature.synonyms.push(record.term);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &OntologyConfig {
        &self.config
    }

    /// Number of active concepts.
    pub fn concept_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of active relationships.
    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Name records skipped during construction for lack of an owner.
    pub fn skipped_name_count(&self) -> usize {
        self.skipped_names
    }

    pub fn contains(&self, id: ConceptId) -> bool {
        self.index_of.contains_key(&id)
    }

    pub fn concept(&self, id: ConceptId) -> Option<&Concept> {
        let idx = self.index_of.get(&id)?;
        self.graph.node_weight(*idx)
    }

    /// Dense index of a concept within this graph instance.
    pub fn dense_index(&self, id: ConceptId) -> Option<usize> {
        self.index_of.get(&id).map(|idx| idx.index())
    }

    pub fn concept_names(&self, id: ConceptId) -> Option<&Nomenclature> {
        self.concept_names.get(&id)
    }

    pub fn relation_type_names(&self, type_id: u64) -> Option<&Nomenclature> {
        self.relation_names.get(&type_id)
    }

    /// Every relationship type id seen on an active relationship.
    pub fn relation_types(&self) -> &HashSet<u64> {
        &self.relation_types
    }

    fn node(&self, id: ConceptId) -> OntologyResult<NodeIndex> {
        self.index_of
            .get(&id)
            .copied()
            .ok_or(OntologyError::UnknownConcept { id: id.get() })
    }

    /// All typed edges leaving a concept.
    pub fn out_neighbors(&self, id: ConceptId) -> OntologyResult<Vec<Neighbor>> {
        let idx = self.node(id)?;
        Ok(self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| Neighbor {
                relation: *e.weight(),
                target: self.graph[e.target()].id,
            })
            .collect())
    }

    /// Direct is-a parents of a concept.
    pub fn parents(&self, id: ConceptId) -> OntologyResult<Vec<ConceptId>> {
        let idx = self.node(id)?;
        let is_a = self.config.is_a_type_id;
        Ok(self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().type_id == is_a)
            .map(|e| self.graph[e.target()].id)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Every concept reachable from `id` over is-a edges, including `id`.
    ///
    /// Depth-first with an explicit stack; the visited set makes it
    /// terminate on cyclic data.
    pub fn ancestors_via_hierarchy(&self, id: ConceptId) -> OntologyResult<HashSet<ConceptId>> {
        let start = self.node(id)?;
        let is_a = self.config.is_a_type_id;

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(current) = stack.pop() {
            for edge in self.graph.edges_directed(current, Direction::Outgoing) {
                if edge.weight().type_id != is_a {
                    continue;
                }
                if visited.insert(edge.target()) {
                    stack.push(edge.target());
                }
            }
        }

        Ok(visited.into_iter().map(|idx| self.graph[idx].id).collect())
    }

    /// Whether `id` is equal to, or a descendant of, any of `ancestors`.
    pub fn is_subsumed_by_any(
        &self,
        id: ConceptId,
        ancestors: &[ConceptId],
    ) -> OntologyResult<bool> {
        let reachable = self.ancestors_via_hierarchy(id)?;
        Ok(ancestors.iter().any(|a| reachable.contains(a)))
    }
}

fn open(path: &Path) -> OntologyResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| OntologyError::Io {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ontology::{IS_A_TYPE_ID, PREFERRED_NAME_TYPE_ID, SYNONYM_TYPE_ID};

    const FINDING_SITE: u64 = 363_698_007;

    pub(crate) fn concept(id: u64, active: bool) -> OntologyResult<ConceptRecord> {
        Ok(ConceptRecord {
            id,
            effective_time: "20200131".into(),
            active,
            module_id: 0,
            definition_status_id: 0,
        })
    }

    pub(crate) fn relation(id: u64, source: u64, dest: u64, type_id: u64) -> OntologyResult<RelationshipRecord> {
        Ok(RelationshipRecord {
            id,
            effective_time: "20200131".into(),
            active: true,
            module_id: 0,
            source_id: source,
            destination_id: dest,
            relationship_group: 0,
            type_id,
            characteristic_type_id: 0,
            modifier_id: 0,
        })
    }

    pub(crate) fn name(id: u64, owner: u64, term: &str, preferred: bool) -> OntologyResult<NameRecord> {
        Ok(NameRecord {
            id,
            effective_time: "20200131".into(),
            active: true,
            module_id: 0,
            owner_id: owner,
            language_code: "en".into(),
            type_id: if preferred { PREFERRED_NAME_TYPE_ID } else { SYNONYM_TYPE_ID },
            term: term.into(),
            case_significance_id: 0,
        })
    }

    /// Small clinical hierarchy:
    ///
    /// ```text
    /// 1 clinical finding
    /// ├── 2 disorder of body temperature
    /// │   └── 3 fever ──finding site──▶ 5 body
    /// └── 4 palpitation
    /// ```
    pub(crate) fn sample_graph() -> OntologyGraph {
        OntologyGraph::from_records(
            OntologyConfig::default(),
            vec![
                concept(1, true),
                concept(2, true),
                concept(3, true),
                concept(4, true),
                concept(5, true),
                concept(6, false),
                concept(IS_A_TYPE_ID, true),
            ],
            vec![
                relation(10, 2, 1, IS_A_TYPE_ID),
                relation(11, 3, 2, IS_A_TYPE_ID),
                relation(12, 4, 1, IS_A_TYPE_ID),
                relation(13, 3, 5, FINDING_SITE),
            ],
            vec![
                name(20, 1, "Clinical finding", true),
                name(21, 2, "Disorder of body temperature", true),
                name(22, 3, "Fever", true),
                name(23, 3, "Pyrexia", false),
                name(24, 4, "Palpitation", true),
                name(25, 5, "Body", true),
                name(26, IS_A_TYPE_ID, "Is a", true),
                name(27, 999, "Orphan", true),
            ],
        )
        .unwrap()
    }

    #[test]
    fn builds_active_concepts_only() {
        let g = sample_graph();
        assert_eq!(g.concept_count(), 6);
        assert_eq!(g.relationship_count(), 4);
        assert!(!g.contains(ConceptId::new(6)));
        assert_eq!(g.skipped_name_count(), 1);
    }

    #[test]
    fn relation_type_names_are_separate() {
        let g = sample_graph();
        let names = g.relation_type_names(IS_A_TYPE_ID).unwrap();
        assert_eq!(names.preferred_name.as_deref(), Some("Is a"));
        assert!(g.concept_names(ConceptId::new(IS_A_TYPE_ID)).is_none());
        assert!(g.relation_types().contains(&FINDING_SITE));
    }

    #[test]
    fn names_split_into_preferred_and_synonyms() {
        let g = sample_graph();
        let fever = g.concept_names(ConceptId::new(3)).unwrap();
        assert_eq!(fever.preferred_name.as_deref(), Some("Fever"));
        assert_eq!(fever.synonyms, vec!["Pyrexia".to_string()]);
    }

    #[test]
    fn missing_reference_aborts_construction() {
        let result = OntologyGraph::from_records(
            OntologyConfig::default(),
            vec![concept(1, true), concept(2, false)],
            vec![relation(10, 1, 2, IS_A_TYPE_ID)],
            Vec::new(),
        );
        assert!(matches!(
            result,
            Err(OntologyError::MissingReference { record: "relationship", referenced: 2, .. })
        ));
    }

    #[test]
    fn strict_name_owners_rejects_orphans() {
        let config = OntologyConfig {
            strict_name_owners: true,
            ..OntologyConfig::default()
        };
        let result = OntologyGraph::from_records(
            config,
            vec![concept(1, true)],
            Vec::new(),
            vec![name(20, 42, "Nobody", true)],
        );
        assert!(matches!(
            result,
            Err(OntologyError::MissingReference { record: "name", referenced: 42, .. })
        ));
    }

    #[test]
    fn duplicate_concepts_are_rejected() {
        let result = OntologyGraph::from_records(
            OntologyConfig::default(),
            vec![concept(1, true), concept(1, true)],
            Vec::new(),
            Vec::new(),
        );
        assert!(matches!(result, Err(OntologyError::DuplicateConcept { id: 1 })));
    }

    #[test]
    fn ancestors_include_self_and_follow_is_a_only() {
        let g = sample_graph();
        let ancestors = g.ancestors_via_hierarchy(ConceptId::new(3)).unwrap();
        let expected: HashSet<ConceptId> = [3, 2, 1].into_iter().map(ConceptId::new).collect();
        assert_eq!(ancestors, expected);
        // finding-site edge to 5 is not a hierarchy edge
        assert!(!ancestors.contains(&ConceptId::new(5)));
    }

    #[test]
    fn ancestors_terminate_on_cycles() {
        let g = OntologyGraph::from_records(
            OntologyConfig::default(),
            vec![concept(1, true), concept(2, true), concept(3, true)],
            vec![
                relation(10, 1, 2, IS_A_TYPE_ID),
                relation(11, 2, 3, IS_A_TYPE_ID),
                relation(12, 3, 1, IS_A_TYPE_ID),
            ],
            Vec::new(),
        )
        .unwrap();
        for id in 1..=3 {
            let a = g.ancestors_via_hierarchy(ConceptId::new(id)).unwrap();
            assert_eq!(a.len(), 3);
            assert!(a.contains(&ConceptId::new(id)));
        }
    }

    #[test]
    fn subsumption_check() {
        let g = sample_graph();
        let fever = ConceptId::new(3);
        assert!(g.is_subsumed_by_any(fever, &[ConceptId::new(1)]).unwrap());
        assert!(g.is_subsumed_by_any(fever, &[fever]).unwrap());
        assert!(!g.is_subsumed_by_any(fever, &[ConceptId::new(4)]).unwrap());
    }

    #[test]
    fn neighbors_and_parents() {
        let g = sample_graph();
        let fever = ConceptId::new(3);
        let neighbors = g.out_neighbors(fever).unwrap();
        assert_eq!(neighbors.len(), 2);
        assert!(neighbors
            .iter()
            .any(|n| n.target == ConceptId::new(5) && n.relation.type_id == FINDING_SITE));
        assert_eq!(g.parents(fever).unwrap(), vec![ConceptId::new(2)]);
    }

    #[test]
    fn unknown_concept_queries_fail() {
        let g = sample_graph();
        assert!(matches!(
            g.ancestors_via_hierarchy(ConceptId::new(777)),
            Err(OntologyError::UnknownConcept { id: 777 })
        ));
    }

    #[test]
    fn dense_indices_are_unique() {
        let g = sample_graph();
        let mut seen = HashSet::new();
        for id in [1, 2, 3, 4, 5] {
            assert!(seen.insert(g.dense_index(ConceptId::new(id)).unwrap()));
        }
    }

    #[test]
    fn loads_from_readers() {
        let concepts = "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId\n\
                        1\t2020\t1\t0\t0\n2\t2020\t1\t0\t0\n";
        let relationships = "id\teffectiveTime\tactive\tmoduleId\tsourceId\tdestinationId\trelationshipGroup\ttypeId\tcharacteristicTypeId\tmodifierId\n\
                             10\t2020\t1\t0\t2\t1\t0\t116680003\t0\t0\n";
        let names = "id\teffectiveTime\tactive\tmoduleId\tconceptId\tlanguageCode\ttypeId\tterm\tcaseSignificanceId\n\
                     20\t2020\t1\t0\t2\ten\t900000000000003001\tFever\t0\n";
        let g = OntologyGraph::from_readers(
            OntologyConfig::default(),
            concepts.as_bytes(),
            relationships.as_bytes(),
            names.as_bytes(),
        )
        .unwrap();
        assert_eq!(g.parents(ConceptId::new(2)).unwrap(), vec![ConceptId::new(1)]);
    }
}
