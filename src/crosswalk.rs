//! Ontology concept id to UMLS concept unique identifier (CUI) mapping.
//!
//! Built from the pipe-delimited `MRCONSO.RRF` distribution file:
//!
//! ```text
//! C0015967|ENG|S|L0016426|PF|S0040542|Y|A2881389|...|386661006||SNOMEDCT_US|PT|386661006|Fever|9|N|256|
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::CrosswalkError;
use crate::ontology::ConceptId;

const CUI: usize = 0;
const TERM_STATUS: usize = 2;
const IS_PREFERRED: usize = 6;
const SOURCE_CONCEPT_ID: usize = 9;
const MIN_FIELDS: usize = SOURCE_CONCEPT_ID + 1;

/// Concept id to CUI lookup table.
#[derive(Debug, Clone, Default)]
pub struct ConceptCrosswalk {
    cuis: HashMap<ConceptId, String>,
    /// Concept ids seen with more than one CUI; the last row wins.
    conflicts: usize,
}

impl ConceptCrosswalk {
    /// Rows flagged non-preferred (`N`) or with term status `P` are
    /// skipped, as are rows whose source concept id is not numeric.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> Result<Self, CrosswalkError> {
        let mut crosswalk = Self::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| CrosswalkError::Io {
                path: source.to_string(),
                source: e,
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() < MIN_FIELDS {
                return Err(CrosswalkError::Malformed {
                    line: i + 1,
                    expected: MIN_FIELDS,
                    actual: fields.len(),
                });
            }
            if fields[IS_PREFERRED] == "N" || fields[TERM_STATUS] == "P" {
                continue;
            }

            let cui = fields[CUI];
            let Ok(id) = fields[SOURCE_CONCEPT_ID].parse::<u64>() else {
                continue;
            };
            if cui.is_empty() {
                continue;
            }

            if let Some(previous) = crosswalk.cuis.insert(ConceptId::new(id), cui.to_string()) {
                if previous != cui {
                    crosswalk.conflicts += 1;
                }
            }
        }

        tracing::info!(
            mappings = crosswalk.cuis.len(),
            conflicts = crosswalk.conflicts,
            source,
            "concept crosswalk loaded"
        );
        Ok(crosswalk)
    }

    pub fn load(path: &Path) -> Result<Self, CrosswalkError> {
        let label = path.display().to_string();
        let file = File::open(path).map_err(|source| CrosswalkError::Io {
            path: label.clone(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), &label)
    }

    pub fn cui_of(&self, id: ConceptId) -> Option<&str> {
        self.cuis.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cuis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuis.is_empty()
    }

    pub fn conflicts(&self) -> usize {
        self.conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROWS: &str = "\
C0015967|ENG|S|L0016426|PF|S0040542|Y|A2881389|1|386661006||SNOMEDCT_US|PT|386661006|Fever|9|N|256|
C0015967|ENG|P|L0016426|PF|S0040542|Y|A2881390|1|11111||SNOMEDCT_US|PT|11111|Fever|9|N|256|
C0030252|ENG|S|L0030252|PF|S0071355|N|A2881391|1|80313002||SNOMEDCT_US|PT|80313002|Palpitations|9|N|256|

C0018681|ENG|S|L0018681|PF|S0046854|Y|A2881392|1|25064002||SNOMEDCT_US|PT|25064002|Headache|9|N|256|
C9999999|ENG|S|L0018681|PF|S0046854|Y|A2881393|1|25064002||SNOMEDCT_US|SY|25064002|Head ache|9|N|256|
C0018681|ENG|S|L0018681|PF|S0046854|Y|A2881394|1|MTHU000||MTH|PT|X|Headache|9|N|256|
";

    #[test]
    fn maps_preferred_rows() {
        let c = ConceptCrosswalk::from_reader(ROWS.as_bytes(), "test").unwrap();
        assert_eq!(c.cui_of(ConceptId::new(386_661_006)), Some("C0015967"));
        // term status P
        assert_eq!(c.cui_of(ConceptId::new(11_111)), None);
        // not preferred
        assert_eq!(c.cui_of(ConceptId::new(80_313_002)), None);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn last_row_wins_on_conflict() {
        let c = ConceptCrosswalk::from_reader(ROWS.as_bytes(), "test").unwrap();
        assert_eq!(c.cui_of(ConceptId::new(25_064_002)), Some("C9999999"));
        assert_eq!(c.conflicts(), 1);
    }

    #[test]
    fn short_rows_are_malformed() {
        let err = ConceptCrosswalk::from_reader("C1|ENG|S\n".as_bytes(), "test").unwrap_err();
        assert!(matches!(
            err,
            CrosswalkError::Malformed {
                line: 1,
                expected: 10,
                actual: 3
            }
        ));
    }
}
