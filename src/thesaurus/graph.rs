//! The synset graph and its word index.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use regex::RegexBuilder;

use crate::error::{ThesaurusError, ThesaurusResult};

use super::indexer::SynsetIndexer;
use super::records::{SynsetRecord, read_records};
use super::{Synset, SynsetIndex, ThesaurusConfig, WordClass};

/// Directed graph of synsets; edges follow the configured pointer symbols.
///
/// A synset's petgraph `NodeIndex` equals its dense [`SynsetIndex`]: nodes
/// are created exactly when the indexer allocates, including placeholders
/// for pointer targets that are defined later in the load order.
pub struct ThesaurusGraph {
    graph: DiGraph<Synset, String>,
    words: HashMap<String, Vec<SynsetIndex>>,
    indexer: SynsetIndexer,
    config: ThesaurusConfig,
}

impl ThesaurusGraph {
    /// Build from parsed records, one batch per word class in load order.
    pub fn from_records<I>(config: ThesaurusConfig, batches: I) -> ThesaurusResult<Self>
    where
        I: IntoIterator<Item = (WordClass, Vec<SynsetRecord>)>,
    {
        let mut this = Self {
            graph: DiGraph::new(),
            words: HashMap::new(),
            indexer: SynsetIndexer::new(),
            config,
        };
        let mut defined: HashSet<SynsetIndex> = HashSet::new();

        for (class, records) in batches {
            let count = records.len();
            for record in records {
                let source = this.allocate(record.offset, class);
                if !defined.insert(source) {
                    return Err(ThesaurusError::MalformedRecord {
                        word_class: class.to_string(),
                        line: 0,
                        message: format!("synset offset {} defined twice", record.offset),
                    });
                }

                for word in &record.words {
                    this.words.entry(word.clone()).or_default().push(source);
                }
                this.graph[NodeIndex::new(source.as_usize())].words = record.words;

                for pointer in record.pointers {
                    if !this.config.follows(&pointer.symbol) {
                        continue;
                    }
                    let target = this.allocate(pointer.target_offset, pointer.target_class);
                    this.graph.add_edge(
                        NodeIndex::new(source.as_usize()),
                        NodeIndex::new(target.as_usize()),
                        pointer.symbol,
                    );
                }
            }
            tracing::debug!(word_class = %class, synsets = count, "thesaurus file loaded");
        }

        tracing::info!(
            synsets = this.synset_count(),
            undefined = this.synset_count() - defined.len(),
            edges = this.graph.edge_count(),
            words = this.words.len(),
            "thesaurus graph built"
        );
        Ok(this)
    }

    /// Build from one reader per word class.
    pub fn from_readers<R, I>(config: ThesaurusConfig, sources: I) -> ThesaurusResult<Self>
    where
        R: BufRead,
        I: IntoIterator<Item = (WordClass, R)>,
    {
        let header_lines = config.header_lines;
        let mut batches = Vec::new();
        for (class, reader) in sources {
            let label = class.to_string();
            batches.push((class, read_records(reader, class, header_lines, &label)?));
        }
        Self::from_records(config, batches)
    }

    /// Open and load one data file per word class.
    pub fn load<'p, I>(config: ThesaurusConfig, files: I) -> ThesaurusResult<Self>
    where
        I: IntoIterator<Item = (WordClass, &'p Path)>,
    {
        let header_lines = config.header_lines;
        let mut batches = Vec::new();
        for (class, path) in files {
            let label = path.display().to_string();
            batches.push((class, read_records(open(path)?, class, header_lines, &label)?));
        }
        Self::from_records(config, batches)
    }

    fn allocate(&mut self, offset: u32, class: WordClass) -> SynsetIndex {
        let (index, is_new) = self.indexer.index_of(offset, class);
        if is_new {
            let node = self.graph.add_node(Synset {
                index,
                word_class: class,
                offset,
                words: Vec::new(),
            });
            debug_assert_eq!(node.index(), index.as_usize());
        }
        index
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &ThesaurusConfig {
        &self.config
    }

    pub fn synset_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn synset(&self, index: SynsetIndex) -> Option<&Synset> {
        self.graph.node_weight(NodeIndex::new(index.as_usize()))
    }

    /// Index of the synset at `offset` in the `class` file.
    pub fn index_of(&self, offset: u32, class: WordClass) -> Option<SynsetIndex> {
        self.indexer.get(offset, class)
    }

    pub(crate) fn node(&self, index: SynsetIndex) -> ThesaurusResult<NodeIndex> {
        if index.as_usize() < self.graph.node_count() {
            Ok(NodeIndex::new(index.as_usize()))
        } else {
            Err(ThesaurusError::UnknownSynset {
                index: index.get(),
                size: self.graph.node_count(),
            })
        }
    }

    pub(crate) fn petgraph(&self) -> &DiGraph<Synset, String> {
        &self.graph
    }

    /// Member words of a synset joined by spaces.
    pub fn synset_name(&self, index: SynsetIndex) -> ThesaurusResult<String> {
        let node = self.node(index)?;
        Ok(self.graph[node].words.join(" "))
    }

    /// Synsets the word belongs to. Case sensitive; empty when unknown.
    pub fn synsets_of(&self, word: &str) -> &[SynsetIndex] {
        self.words.get(word).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_word(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Every distinct word in the thesaurus, in no particular order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// Synsets directly pointed at from `index`.
    pub fn parents(&self, index: SynsetIndex) -> ThesaurusResult<Vec<SynsetIndex>> {
        let node = self.node(index)?;
        Ok(self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| self.graph[e.target()].index)
            .collect())
    }

    /// Every path from `index` up to a synset without parents.
    ///
    /// A path never revisits a synset, so cyclic pointer chains end where
    /// they would loop. A synset without parents yields the single path
    /// `[index]`.
    pub fn paths_to_root(&self, index: SynsetIndex) -> ThesaurusResult<Vec<Vec<SynsetIndex>>> {
        let start = self.node(index)?;
        let mut paths = Vec::new();
        let mut stack: Vec<Vec<NodeIndex>> = vec![vec![start]];

        while let Some(path) = stack.pop() {
            let Some(&tip) = path.last() else { continue };
            let mut extended = false;
            for edge in self.graph.edges_directed(tip, Direction::Outgoing) {
                let next = edge.target();
                if path.contains(&next) {
                    continue;
                }
                let mut longer = path.clone();
                longer.push(next);
                stack.push(longer);
                extended = true;
            }
            if !extended {
                paths.push(path.iter().map(|n| self.graph[*n].index).collect());
            }
        }

        paths.sort();
        Ok(paths)
    }

    /// Words containing `fragment`, case-insensitively.
    ///
    /// Words of exactly the fragment's length (case-insensitive equals) win:
    /// when there are any, only they are returned. Otherwise every word
    /// containing the fragment is returned. Results are sorted.
    pub fn search_keys(&self, fragment: &str) -> ThesaurusResult<Vec<&str>> {
        let pattern = RegexBuilder::new(&regex::escape(fragment))
            .case_insensitive(true)
            .build()
            .map_err(|e| ThesaurusError::InvalidQuery {
                query: fragment.to_string(),
                message: e.to_string(),
            })?;

        let fragment_len = fragment.chars().count();
        let mut complete = Vec::new();
        let mut derivative = Vec::new();
        for word in self.words() {
            if !pattern.is_match(word) {
                continue;
            }
            if word.chars().count() == fragment_len {
                complete.push(word);
            } else {
                derivative.push(word);
            }
        }

        let mut hits = if complete.is_empty() { derivative } else { complete };
        hits.sort_unstable();
        Ok(hits)
    }

    fn senses(&self, word: &str) -> ThesaurusResult<&[SynsetIndex]> {
        self.words
            .get(word)
            .map(Vec::as_slice)
            .ok_or_else(|| ThesaurusError::UnknownWord {
                word: word.to_string(),
            })
    }

    /// Shortest ancestral path length between any sense of `a` and any
    /// sense of `b`.
    pub fn distance(&self, a: &str, b: &str) -> ThesaurusResult<Option<u32>> {
        let path = self.shortest_ancestral_path(self.senses(a)?, self.senses(b)?)?;
        Ok(path.map(|p| p.length))
    }

    /// Common ancestor of a shortest ancestral path between the senses of
    /// `a` and `b`.
    pub fn sap(&self, a: &str, b: &str) -> ThesaurusResult<Option<super::AncestralPath>> {
        self.shortest_ancestral_path(self.senses(a)?, self.senses(b)?)
    }
}

fn open(path: &Path) -> ThesaurusResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ThesaurusError::Io {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn no_header() -> ThesaurusConfig {
        ThesaurusConfig {
            header_lines: 0,
            ..ThesaurusConfig::default()
        }
    }

    /// ```text
    /// entity(100) <- condition(200) <- illness(300) <- fever(400)
    ///                               <- symptom(500) <- ache(600)
    /// verb: have(100,v) -> possess(200,v)
    /// adj:  feverish(100,a) -& ill(200,s)
    /// ```
    /// fever's record appears before its hypernym illness is defined.
    pub(crate) const NOUNS: &str = "\
400 26 n 02 fever 0 pyrexia 0 002 @ 300 n 0000 ~ 900 n 0000 | body temperature
100 03 n 01 entity 0 000 | that which exists
200 26 n 01 condition 0 001 @ 100 n 0000 | a state
300 26 n 02 illness 0 unwellness 0 001 @ 200 n 0000 | impairment of health
500 26 n 01 symptom 0 001 @ 200 n 0000 | evidence of disease
600 26 n 02 ache 0 fever 0 001 @ 500 n 0000 | a dull pain
";
    pub(crate) const VERBS: &str = "\
100 40 v 01 have 0 001 @ 200 v 0000 01 + 02 00 | have or possess
200 40 v 01 possess 0 000 01 + 02 00 | own
";
    pub(crate) const ADVERBS: &str = "";
    pub(crate) const ADJECTIVES: &str = "\
100 00 a 01 feverish 0 001 & 200 s 0000 | having a fever
200 00 s 01 ill 0 000 | not well
";

    pub(crate) fn sample_thesaurus() -> ThesaurusGraph {
        ThesaurusGraph::from_readers(
            no_header(),
            [
                (WordClass::Noun, NOUNS.as_bytes()),
                (WordClass::Verb, VERBS.as_bytes()),
                (WordClass::Adverb, ADVERBS.as_bytes()),
                (WordClass::Adjective, ADJECTIVES.as_bytes()),
            ],
        )
        .unwrap()
    }

    fn idx(g: &ThesaurusGraph, offset: u32, class: WordClass) -> SynsetIndex {
        g.index_of(offset, class).unwrap()
    }

    #[test]
    fn forward_references_are_resolved() {
        let g = sample_thesaurus();
        let fever = idx(&g, 400, WordClass::Noun);
        let illness = idx(&g, 300, WordClass::Noun);
        assert_eq!(g.parents(fever).unwrap(), vec![illness]);
        assert_eq!(g.synset(illness).unwrap().words, vec!["illness", "unwellness"]);
    }

    #[test]
    fn indices_are_dense_and_match_nodes() {
        let g = sample_thesaurus();
        for i in 0..g.synset_count() as u32 {
            assert_eq!(g.synset(SynsetIndex::new(i)).unwrap().index.get(), i);
        }
        // six nouns, two verbs, two adjectives; the `~` target is ignored
        assert_eq!(g.synset_count(), 10);
    }

    #[test]
    fn same_offset_in_different_classes_are_distinct() {
        let g = sample_thesaurus();
        assert_ne!(idx(&g, 100, WordClass::Noun), idx(&g, 100, WordClass::Verb));
        assert_eq!(g.synset_name(idx(&g, 100, WordClass::Verb)).unwrap(), "have");
    }

    #[test]
    fn word_index_lists_every_sense() {
        let g = sample_thesaurus();
        let senses = g.synsets_of("fever");
        assert_eq!(senses.len(), 2);
        assert!(g.is_word("pyrexia"));
        assert!(!g.is_word("Fever"));
        assert!(g.synsets_of("nothing").is_empty());
    }

    #[test]
    fn satellite_target_shares_adjective_space() {
        let g = sample_thesaurus();
        let feverish = idx(&g, 100, WordClass::Adjective);
        let ill = idx(&g, 200, WordClass::Adjective);
        assert_eq!(g.parents(feverish).unwrap(), vec![ill]);
    }

    #[test]
    fn paths_to_root_follow_every_parent() {
        let g = sample_thesaurus();
        let fever = idx(&g, 400, WordClass::Noun);
        let names: Vec<Vec<String>> = g
            .paths_to_root(fever)
            .unwrap()
            .into_iter()
            .map(|p| p.into_iter().map(|i| g.synset_name(i).unwrap()).collect())
            .collect();
        assert_eq!(
            names,
            vec![vec![
                "fever pyrexia".to_string(),
                "illness unwellness".into(),
                "condition".into(),
                "entity".into(),
            ]]
        );
        let root = idx(&g, 100, WordClass::Noun);
        assert_eq!(g.paths_to_root(root).unwrap(), vec![vec![root]]);
    }

    #[test]
    fn search_keys_prefers_complete_matches() {
        let g = sample_thesaurus();
        assert_eq!(g.search_keys("FEVER").unwrap(), vec!["fever"]);
        assert_eq!(g.search_keys("ill").unwrap(), vec!["ill"]);
        assert_eq!(g.search_keys("ness").unwrap(), vec!["illness", "unwellness"]);
        assert!(g.search_keys("zzz").unwrap().is_empty());
    }

    #[test]
    fn unknown_synset_is_reported() {
        let g = sample_thesaurus();
        assert!(matches!(
            g.synset_name(SynsetIndex::new(99)),
            Err(ThesaurusError::UnknownSynset { index: 99, size: 10 })
        ));
    }

    #[test]
    fn duplicate_offsets_are_rejected() {
        let nouns = "100 03 n 01 a 0 000 | x\n100 03 n 01 b 0 000 | y\n";
        let result = ThesaurusGraph::from_readers(no_header(), [(WordClass::Noun, nouns.as_bytes())]);
        assert!(matches!(result, Err(ThesaurusError::MalformedRecord { .. })));
    }
}
