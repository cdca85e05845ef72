//! Data-line parser for synset records.
//!
//! ```text
//! offset lex_filenum ss_type w_cnt word lex_id [word lex_id...] p_cnt
//!     [ptr_symbol target_offset pos source/target...] [frames...] | gloss
//! ```
//!
//! `w_cnt` is hexadecimal, `p_cnt` decimal. Verb frames and the gloss are
//! not needed and are not parsed.

use std::io::BufRead;

use crate::error::{ThesaurusError, ThesaurusResult};

use super::WordClass;

/// One parsed data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynsetRecord {
    pub offset: u32,
    pub words: Vec<String>,
    pub pointers: Vec<PointerRecord>,
}

/// A typed pointer to another synset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerRecord {
    pub symbol: String,
    pub target_offset: u32,
    pub target_class: WordClass,
}

impl SynsetRecord {
    /// Parse one data line of the `class` file.
    pub fn parse(line: &str, class: WordClass, line_no: usize) -> ThesaurusResult<Self> {
        let body = line.split('|').next().unwrap_or_default();
        let mut tokens = Tokens {
            inner: body.split_whitespace(),
            class,
            line: line_no,
        };

        let offset = tokens.decimal("synset offset")?;
        tokens.next("lexicographer file")?;
        tokens.next("synset type")?;
        let word_count = tokens.hex("word count")?;

        let mut words = Vec::with_capacity(word_count);
        for _ in 0..word_count {
            words.push(tokens.next("word")?.to_string());
            tokens.next("lex id")?;
        }

        let pointer_count: usize = tokens.decimal("pointer count")?;
        let mut pointers = Vec::with_capacity(pointer_count);
        for _ in 0..pointer_count {
            let symbol = tokens.next("pointer symbol")?.to_string();
            let target_offset = tokens.decimal("pointer target offset")?;
            let pos = tokens.next("pointer part of speech")?;
            let target_class = pos
                .chars()
                .next()
                .and_then(WordClass::from_pos_char)
                .ok_or_else(|| tokens.malformed(format!("unknown part of speech \"{pos}\"")))?;
            tokens.next("pointer source/target")?;
            pointers.push(PointerRecord {
                symbol,
                target_offset,
                target_class,
            });
        }

        Ok(Self {
            offset,
            words,
            pointers,
        })
    }
}

struct Tokens<'a> {
    inner: std::str::SplitWhitespace<'a>,
    class: WordClass,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn malformed(&self, message: String) -> ThesaurusError {
        ThesaurusError::MalformedRecord {
            word_class: self.class.to_string(),
            line: self.line,
            message,
        }
    }

    fn next(&mut self, what: &str) -> ThesaurusResult<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| self.malformed(format!("missing {what}")))
    }

    fn decimal<T: std::str::FromStr>(&mut self, what: &str) -> ThesaurusResult<T> {
        let raw = self.next(what)?;
        raw.parse()
            .map_err(|_| self.malformed(format!("{what} \"{raw}\" is not a number")))
    }

    fn hex(&mut self, what: &str) -> ThesaurusResult<usize> {
        let raw = self.next(what)?;
        usize::from_str_radix(raw, 16)
            .map_err(|_| self.malformed(format!("{what} \"{raw}\" is not hexadecimal")))
    }
}

/// Read every record of one data file, skipping `header_lines` lines first.
pub fn read_records<R: BufRead>(
    reader: R,
    class: WordClass,
    header_lines: usize,
    source: &str,
) -> ThesaurusResult<Vec<SynsetRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source_err| ThesaurusError::Io {
            path: source.to_string(),
            source: source_err,
        })?;
        if i < header_lines || line.trim().is_empty() {
            continue;
        }
        records.push(SynsetRecord::parse(&line, class, i + 1)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEVER: &str = "14381305 26 n 03 fever 0 febrility 0 pyrexia 0 002 @ 14034177 n 0000 \
                         ~ 14381802 n 0000 | a rise in the temperature of the body";

    #[test]
    fn parses_words_and_pointers() {
        let r = SynsetRecord::parse(FEVER, WordClass::Noun, 30).unwrap();
        assert_eq!(r.offset, 14_381_305);
        assert_eq!(r.words, vec!["fever", "febrility", "pyrexia"]);
        assert_eq!(r.pointers.len(), 2);
        assert_eq!(r.pointers[0].symbol, "@");
        assert_eq!(r.pointers[0].target_offset, 14_034_177);
        assert_eq!(r.pointers[0].target_class, WordClass::Noun);
    }

    #[test]
    fn word_count_is_hexadecimal() {
        let words: Vec<String> = (0..10).map(|i| format!("w{i} 0")).collect();
        let line = format!("100 00 n 0a {} 000 | gloss", words.join(" "));
        let r = SynsetRecord::parse(&line, WordClass::Noun, 1).unwrap();
        assert_eq!(r.words.len(), 10);
        assert!(r.pointers.is_empty());
    }

    #[test]
    fn satellite_pointer_targets_adjectives() {
        let line = "200 00 s 01 hot 0 001 & 300 a 0000 | gloss";
        let r = SynsetRecord::parse(line, WordClass::Adjective, 1).unwrap();
        assert_eq!(r.pointers[0].target_class, WordClass::Adjective);
    }

    #[test]
    fn truncated_line_is_malformed() {
        let err = SynsetRecord::parse("100 00 n 02 fever 0", WordClass::Noun, 7).unwrap_err();
        match err {
            ThesaurusError::MalformedRecord { line, word_class, .. } => {
                assert_eq!(line, 7);
                assert_eq!(word_class, "noun");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_lines_are_skipped() {
        let text = "  license line one\n  license line two\n100 00 n 01 fever 0 000 | x\n";
        let records = read_records(text.as_bytes(), WordClass::Noun, 2, "test").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].words, vec!["fever"]);
    }
}
