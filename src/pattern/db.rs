//! The loaded set of syntactical patterns.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use super::error::{PatternError, PatternResult, TripletError};
use super::matcher::SyntacticalPattern;
use super::parse_tree::ParseTree;
use super::triplet::Triplet;

/// A pattern line that failed to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedPattern {
    /// 1-based line number in the pattern source.
    pub line: usize,
    pub content: String,
    pub reason: String,
}

/// A pattern together with the triplets it extracted from one tree.
///
/// The triplet list can only be replaced wholesale, which is how the
/// reasoning stage keeps just the accepted triplets.
#[derive(Debug, Clone)]
pub struct MatchedPattern {
    pattern: Arc<SyntacticalPattern>,
    triplets: Vec<Triplet>,
}

impl MatchedPattern {
    pub fn new(pattern: Arc<SyntacticalPattern>, triplets: Vec<Triplet>) -> Self {
        Self { pattern, triplets }
    }

    pub fn pattern(&self) -> &SyntacticalPattern {
        &self.pattern
    }

    pub fn triplets(&self) -> &[Triplet] {
        &self.triplets
    }

    pub fn replace_triplets(&mut self, triplets: Vec<Triplet>) {
        self.triplets = triplets;
    }
}

/// Every pattern loaded from the pattern file. Read-only after loading.
#[derive(Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Arc<SyntacticalPattern>>,
    rejected: Vec<RejectedPattern>,
}

impl PatternSet {
    /// Read one pattern per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. A line that does
    /// not compile is logged and recorded in [`rejected`](Self::rejected);
    /// loading continues with the next line.
    pub fn from_reader<R: BufRead>(reader: R, source: &str) -> PatternResult<Self> {
        let mut set = Self::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| PatternError::Io {
                path: source.to_string(),
                source: e,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            match SyntacticalPattern::parse(trimmed) {
                Ok(pattern) => set.patterns.push(Arc::new(pattern)),
                Err(err) => {
                    tracing::warn!(line = i + 1, error = %err, "skipping malformed pattern");
                    set.rejected.push(RejectedPattern {
                        line: i + 1,
                        content: trimmed.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            patterns = set.patterns.len(),
            rejected = set.rejected.len(),
            source,
            "pattern set loaded"
        );
        Ok(set)
    }

    pub fn load(path: &Path) -> PatternResult<Self> {
        let label = path.display().to_string();
        let file = File::open(path).map_err(|source| PatternError::Io {
            path: label.clone(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), &label)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SyntacticalPattern> {
        self.patterns.iter().map(Arc::as_ref)
    }

    pub fn rejected(&self) -> &[RejectedPattern] {
        &self.rejected
    }

    /// Run every pattern against `tree`; keep those that extracted at
    /// least one triplet, in pattern file order.
    pub fn matching_patterns(&self, tree: &ParseTree) -> Result<Vec<MatchedPattern>, TripletError> {
        let matched = self
            .patterns
            .par_iter()
            .map(|pattern| -> Result<Option<MatchedPattern>, TripletError> {
                let triplets = pattern.match_tree(tree)?;
                Ok((!triplets.is_empty())
                    .then(|| MatchedPattern::new(Arc::clone(pattern), triplets)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(matched.into_iter().flatten().collect())
    }
}
