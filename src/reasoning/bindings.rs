//! Meta-model slot bindings to lexical and ontological resources.
//!
//! The binding file is a list of blocks. Each block starts with a slot
//! header and lists the resources admissible for that slot:
//!
//! ```text
//! # who can suffer
//! mm_PERSON
//! ow_i
//! ow_he
//! wn_4021
//! sn_125676002
//!
//! mm_SUFFER
//! nl_
//! ow_has
//! ```
//!
//! `mm_` opens a slot, `wn_` adds a thesaurus synset index, `sn_` an
//! ontology concept id, `ow_` an explicit word, and `nl_` marks the slot as
//! allowed to be absent.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use crate::error::{BindingError, BindingResult};
use crate::ontology::ConceptId;
use crate::thesaurus::SynsetIndex;

/// Admissibility criteria of one meta-model slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotBinding {
    /// An absent word list satisfies the slot.
    pub nullable: bool,
    pub explicit_words: Option<Vec<String>>,
    pub thesaurus_senses: Option<Vec<SynsetIndex>>,
    pub ontology_concepts: Option<Vec<ConceptId>>,
}

/// Slot name to binding table. Read-only after loading.
#[derive(Debug, Clone, Default)]
pub struct ResourceBindings {
    slots: HashMap<String, SlotBinding>,
}

impl ResourceBindings {
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> BindingResult<Self> {
        let mut slots: HashMap<String, SlotBinding> = HashMap::new();
        let mut current: Option<String> = None;

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| BindingError::Io {
                path: source.to_string(),
                source: e,
            })?;
            let line_no = i + 1;
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            let malformed = |message: &str| BindingError::Malformed {
                line: line_no,
                content: entry.to_string(),
                message: message.to_string(),
            };

            let (prefix, value) = match (entry.get(..3), entry.get(3..)) {
                (Some(prefix), Some(value)) => (prefix, value.trim()),
                _ => return Err(malformed("line too short for a prefix")),
            };

            if prefix == "mm_" {
                if value.is_empty() {
                    return Err(malformed("empty slot name"));
                }
                if slots.contains_key(value) {
                    return Err(malformed("slot defined twice"));
                }
                slots.insert(value.to_string(), SlotBinding::default());
                current = Some(value.to_string());
                continue;
            }

            let binding = current
                .as_ref()
                .and_then(|slot| slots.get_mut(slot))
                .ok_or_else(|| malformed("resource line before any mm_ slot header"))?;

            match prefix {
                "nl_" => binding.nullable = true,
                "ow_" => {
                    if value.is_empty() {
                        return Err(malformed("empty explicit word"));
                    }
                    binding
                        .explicit_words
                        .get_or_insert_with(Vec::new)
                        .push(value.to_string());
                }
                "wn_" => {
                    let index: u32 = value
                        .parse()
                        .map_err(|_| malformed("synset index must be an unsigned integer"))?;
                    binding
                        .thesaurus_senses
                        .get_or_insert_with(Vec::new)
                        .push(SynsetIndex::new(index));
                }
                "sn_" => {
                    let id: u64 = value
                        .parse()
                        .map_err(|_| malformed("concept id must be an unsigned integer"))?;
                    binding
                        .ontology_concepts
                        .get_or_insert_with(Vec::new)
                        .push(ConceptId::new(id));
                }
                _ => return Err(malformed("unknown resource prefix")),
            }
        }

        tracing::info!(slots = slots.len(), source, "resource bindings loaded");
        Ok(Self { slots })
    }

    pub fn load(path: &Path) -> BindingResult<Self> {
        let label = path.display().to_string();
        let file = File::open(path).map_err(|source| BindingError::Io {
            path: label.clone(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), &label)
    }

    /// Binding of `slot`, or [`BindingError::UnknownSlot`].
    pub fn get(&self, slot: &str) -> BindingResult<&SlotBinding> {
        self.slots.get(slot).ok_or_else(|| BindingError::UnknownSlot {
            slot: slot.to_string(),
        })
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

impl FromIterator<(String, SlotBinding)> for ResourceBindings {
    fn from_iter<I: IntoIterator<Item = (String, SlotBinding)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}
