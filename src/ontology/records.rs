//! Row parsers for the tab-delimited ontology release files.
//!
//! Each release file starts with a column header line (`id\teffectiveTime\t...`),
//! which is skipped. Rows are parsed into typed records; filtering of inactive
//! rows happens at graph construction so that readers stay loss-free.

use std::io::BufRead;
use std::marker::PhantomData;

use crate::error::{OntologyError, OntologyResult};

/// A record type of one of the release files.
pub trait Rf2Record: Sized {
    /// File kind used in diagnostics.
    const FILE: &'static str;
    /// Minimum number of tab-separated columns.
    const COLUMNS: usize;

    /// Parse one row already split on tabs.
    fn from_fields(fields: &[&str], line: usize) -> OntologyResult<Self>;

    fn is_active(&self) -> bool;
}

/// `id, effectiveTime, active, moduleId, definitionStatusId`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptRecord {
    pub id: u64,
    pub effective_time: String,
    pub active: bool,
    pub module_id: u64,
    pub definition_status_id: u64,
}

/// `id, effectiveTime, active, moduleId, sourceId, destinationId,
/// relationshipGroup, typeId, characteristicTypeId, modifierId`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipRecord {
    pub id: u64,
    pub effective_time: String,
    pub active: bool,
    pub module_id: u64,
    pub source_id: u64,
    pub destination_id: u64,
    pub relationship_group: u64,
    pub type_id: u64,
    pub characteristic_type_id: u64,
    pub modifier_id: u64,
}

/// `id, effectiveTime, active, moduleId, conceptId, languageCode, typeId,
/// term, caseSignificanceId`
///
/// `owner_id` may name a concept or a relationship type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    pub id: u64,
    pub effective_time: String,
    pub active: bool,
    pub module_id: u64,
    pub owner_id: u64,
    pub language_code: String,
    pub type_id: u64,
    pub term: String,
    pub case_significance_id: u64,
}

impl Rf2Record for ConceptRecord {
    const FILE: &'static str = "concept";
    const COLUMNS: usize = 5;

    fn from_fields(f: &[&str], line: usize) -> OntologyResult<Self> {
        let p = FieldParser::<Self>::new(f, line)?;
        Ok(Self {
            id: p.u64(0, "id")?,
            effective_time: f[1].to_string(),
            active: p.active(2)?,
            module_id: p.u64(3, "moduleId")?,
            definition_status_id: p.u64(4, "definitionStatusId")?,
        })
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Rf2Record for RelationshipRecord {
    const FILE: &'static str = "relationship";
    const COLUMNS: usize = 10;

    fn from_fields(f: &[&str], line: usize) -> OntologyResult<Self> {
        let p = FieldParser::<Self>::new(f, line)?;
        Ok(Self {
            id: p.u64(0, "id")?,
            effective_time: f[1].to_string(),
            active: p.active(2)?,
            module_id: p.u64(3, "moduleId")?,
            source_id: p.u64(4, "sourceId")?,
            destination_id: p.u64(5, "destinationId")?,
            relationship_group: p.u64(6, "relationshipGroup")?,
            type_id: p.u64(7, "typeId")?,
            characteristic_type_id: p.u64(8, "characteristicTypeId")?,
            modifier_id: p.u64(9, "modifierId")?,
        })
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Rf2Record for NameRecord {
    const FILE: &'static str = "name";
    const COLUMNS: usize = 9;

    fn from_fields(f: &[&str], line: usize) -> OntologyResult<Self> {
        let p = FieldParser::<Self>::new(f, line)?;
        Ok(Self {
            id: p.u64(0, "id")?,
            effective_time: f[1].to_string(),
            active: p.active(2)?,
            module_id: p.u64(3, "moduleId")?,
            owner_id: p.u64(4, "conceptId")?,
            language_code: f[5].to_string(),
            type_id: p.u64(6, "typeId")?,
            term: f[7].to_string(),
            case_significance_id: p.u64(8, "caseSignificanceId")?,
        })
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

struct FieldParser<'a, T> {
    fields: &'a [&'a str],
    line: usize,
    _record: PhantomData<T>,
}

impl<'a, T: Rf2Record> FieldParser<'a, T> {
    fn new(fields: &'a [&'a str], line: usize) -> OntologyResult<Self> {
        if fields.len() < T::COLUMNS {
            return Err(malformed::<T>(
                line,
                format!("expected {} columns, found {}", T::COLUMNS, fields.len()),
            ));
        }
        Ok(Self {
            fields,
            line,
            _record: PhantomData,
        })
    }

    fn u64(&self, col: usize, name: &str) -> OntologyResult<u64> {
        let raw = self.fields[col].trim();
        raw.parse().map_err(|_| {
            malformed::<T>(self.line, format!("column {name}: \"{raw}\" is not an id"))
        })
    }

    fn active(&self, col: usize) -> OntologyResult<bool> {
        match self.fields[col].trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(malformed::<T>(
                self.line,
                format!("active flag must be 0 or 1, found \"{other}\""),
            )),
        }
    }
}

fn malformed<T: Rf2Record>(line: usize, message: String) -> OntologyError {
    OntologyError::MalformedRecord {
        file: T::FILE,
        line,
        message,
    }
}

/// Streaming reader over the rows of one release file.
///
/// Yields every data row (active or not). Blank lines and the leading
/// column header are skipped; line numbers in errors are 1-based.
pub struct Rf2Records<R, T> {
    lines: std::io::Lines<R>,
    source: String,
    line_no: usize,
    _record: PhantomData<T>,
}

impl<R: BufRead, T: Rf2Record> Rf2Records<R, T> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            source: source.into(),
            line_no: 0,
            _record: PhantomData,
        }
    }
}

impl<R: BufRead, T: Rf2Record> Iterator for Rf2Records<R, T> {
    type Item = OntologyResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(OntologyError::Io {
                        path: self.source.clone(),
                        source,
                    }));
                }
            };
            self.line_no += 1;

            let row = line.trim_end_matches('\r');
            if row.trim().is_empty() {
                continue;
            }
            if self.line_no == 1 && row.starts_with("id\t") {
                continue;
            }

            let fields: Vec<&str> = row.split('\t').collect();
            return Some(T::from_fields(&fields, self.line_no));
        }
    }
}
