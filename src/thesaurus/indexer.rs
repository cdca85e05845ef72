//! Offset to dense index mapping, scoped per word class.

use std::collections::HashMap;

use super::{SynsetIndex, WordClass};

/// Assigns dense synset indices to `(offset, word class)` pairs.
///
/// The same offset in two word classes names two different synsets. Indices
/// come from one counter shared by all classes, so they are unique and
/// contiguous across the whole thesaurus.
#[derive(Debug, Default)]
pub struct SynsetIndexer {
    by_class: HashMap<WordClass, HashMap<u32, SynsetIndex>>,
    next: u32,
}

impl SynsetIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the pair, allocating one on first sight.
    ///
    /// The flag is `true` when the index was allocated by this call.
    pub fn index_of(&mut self, offset: u32, class: WordClass) -> (SynsetIndex, bool) {
        let map = self.by_class.entry(class).or_default();
        if let Some(&idx) = map.get(&offset) {
            return (idx, false);
        }
        let idx = SynsetIndex::new(self.next);
        self.next += 1;
        map.insert(offset, idx);
        (idx, true)
    }

    /// Index of the pair, if already allocated.
    pub fn get(&self, offset: u32, class: WordClass) -> Option<SynsetIndex> {
        self.by_class.get(&class)?.get(&offset).copied()
    }

    /// Total indices allocated.
    pub fn len(&self) -> usize {
        self.next as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }
}
