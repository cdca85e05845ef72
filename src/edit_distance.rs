//! Levenshtein edit distance with unit costs.
//!
//! Used by the ontology's fuzzy concept lookup to tolerate misspellings in
//! lay-person narratives ("palptation" vs "palpitation"). Distances are
//! computed over Unicode scalar values with the two-row Wagner-Fischer
//! dynamic program: O(m) memory, O(mn) time.

use crate::error::ArgumentError;

/// Raw edit distance between two strings.
///
/// Counts the minimum number of single-character insertions, deletions and
/// substitutions turning `a` into `b`.
pub fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    distance_chars(&a, &b)
}

/// Edit distance normalized by the longer input's length, in `[0, 1]`.
///
/// `0.0` means identical, `1.0` means nothing could be kept.
pub fn normalized(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    distance_chars(&a, &b) as f64 / longest as f64
}

/// Raw edit distance for callers holding optional inputs.
pub fn try_distance(a: Option<&str>, b: Option<&str>) -> Result<usize, ArgumentError> {
    let (a, b) = require_both(a, b)?;
    Ok(distance(a, b))
}

/// Normalized edit distance for callers holding optional inputs.
pub fn try_normalized(a: Option<&str>, b: Option<&str>) -> Result<f64, ArgumentError> {
    let (a, b) = require_both(a, b)?;
    Ok(normalized(a, b))
}

/// Cheap lower bound on [`normalized`]: the length difference alone.
///
/// Lets full scans skip candidates that can never fall under a threshold.
pub(crate) fn normalized_lower_bound(a_len: usize, b_len: usize) -> f64 {
    let longest = a_len.max(b_len);
    if longest == 0 {
        return 0.0;
    }
    a_len.abs_diff(b_len) as f64 / longest as f64
}

fn require_both<'a>(
    a: Option<&'a str>,
    b: Option<&'a str>,
) -> Result<(&'a str, &'a str), ArgumentError> {
    let a = a.ok_or(ArgumentError::Missing { argument: "s1" })?;
    let b = b.ok_or(ArgumentError::Missing { argument: "s2" })?;
    Ok((a, b))
}

fn distance_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // prev[j]: distance between a[..i] and b[..j]
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let insertion = curr[j] + 1;
            let deletion = prev[j + 1] + 1;
            curr[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
