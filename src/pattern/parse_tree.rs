//! Constituency parse trees delivered by an external parser.
//!
//! A [`ParseTree`] is an arena of labeled nodes. Internal nodes carry
//! phrase or part-of-speech labels (`S`, `NP`, `NN`); leaves carry the
//! surface words of the sentence.

use super::error::{PatternError, PatternResult};

/// Index of a node within its [`ParseTree`].
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParseNode {
    label: String,
    children: Vec<NodeId>,
}

/// A labeled, ordered tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
}

impl ParseTree {
    /// Read the bracketed form printed by constituency parsers:
    ///
    /// ```text
    /// (ROOT (S (NP (NN patient)) (VP (VBZ has) (NP (NN fever)))))
    /// ```
    ///
    /// A bare token inside brackets becomes a leaf. A bracket without a
    /// label, as in Penn Treebank files (`( (S ...) )`), is labeled `ROOT`.
    pub fn from_bracketed(text: &str) -> PatternResult<Self> {
        let malformed = |position: usize, reason: &str| PatternError::MalformedParseTree {
            position,
            reason: reason.to_string(),
        };

        let mut builder: Option<ParseTreeBuilder> = None;
        let mut open: Vec<NodeId> = Vec::new();
        let mut closed_root = false;
        let mut tokens = Tokenizer::new(text).peekable();

        while let Some((position, token)) = tokens.next() {
            if closed_root {
                return Err(malformed(position, "content after the root node"));
            }
            match token {
                Token::Open => {
                    let label = match tokens.peek() {
                        Some((_, Token::Atom(label))) => {
                            let label = label.to_string();
                            tokens.next();
                            label
                        }
                        _ => "ROOT".to_string(),
                    };
                    let id = match (&mut builder, open.last()) {
                        (None, _) => {
                            builder = Some(ParseTreeBuilder::new(label));
                            0
                        }
                        (Some(b), Some(&parent)) => b.add_child(parent, label),
                        (Some(_), None) => {
                            return Err(malformed(position, "more than one root node"));
                        }
                    };
                    open.push(id);
                }
                Token::Close => {
                    if open.pop().is_none() {
                        return Err(malformed(position, "unbalanced ')'"));
                    }
                    closed_root = open.is_empty();
                }
                Token::Atom(word) => match (&mut builder, open.last()) {
                    (Some(b), Some(&parent)) => {
                        b.add_child(parent, word);
                    }
                    _ => return Err(malformed(position, "word outside of brackets")),
                },
            }
        }

        if !open.is_empty() {
            return Err(malformed(text.len(), "unclosed '('"));
        }
        builder
            .map(ParseTreeBuilder::build)
            .ok_or_else(|| malformed(0, "empty input"))
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn label(&self, node: NodeId) -> &str {
        &self.nodes[node].label
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node].children
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node].children.is_empty()
    }

    /// Words of every leaf under `node`, left to right.
    ///
    /// A leaf's own word list is itself.
    pub fn leaf_words(&self, node: NodeId) -> Vec<String> {
        let mut words = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let children = &self.nodes[current].children;
            if children.is_empty() {
                words.push(self.nodes[current].label.clone());
            }
            // reversed so the leftmost child is popped first
            stack.extend(children.iter().rev());
        }
        words
    }

    /// All words of the sentence, left to right.
    pub fn sentence(&self) -> Vec<String> {
        self.leaf_words(self.root())
    }
}

impl std::fmt::Display for ParseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // (node, closing) pairs; iterative so deep trees cannot overflow
        let mut stack = vec![(self.root(), false)];
        let mut first = true;
        while let Some((node, closing)) = stack.pop() {
            if closing {
                f.write_str(")")?;
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if self.is_leaf(node) && node != self.root() {
                f.write_str(self.label(node))?;
                continue;
            }
            write!(f, "({}", self.label(node))?;
            stack.push((node, true));
            for &child in self.children(node).iter().rev() {
                stack.push((child, false));
            }
        }
        Ok(())
    }
}

/// Node-by-node construction of a [`ParseTree`].
#[derive(Debug)]
pub struct ParseTreeBuilder {
    nodes: Vec<ParseNode>,
}

impl ParseTreeBuilder {
    /// Start a tree whose root carries `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            nodes: vec![ParseNode {
                label: label.into(),
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// Append a child under `parent`, returning the child's id.
    ///
    /// # Panics
    ///
    /// If `parent` was not returned by this builder.
    pub fn add_child(&mut self, parent: NodeId, label: impl Into<String>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ParseNode {
            label: label.into(),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Append a preterminal with a single word leaf, e.g. `(NN fever)`.
    pub fn add_word(&mut self, parent: NodeId, tag: impl Into<String>, word: impl Into<String>) -> NodeId {
        let tag_node = self.add_child(parent, tag);
        self.add_child(tag_node, word);
        tag_node
    }

    pub fn build(self) -> ParseTree {
        ParseTree { nodes: self.nodes }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    Atom(&'a str),
}

struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (usize, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
        let rest = &self.text[self.pos..];
        let start = self.pos;

        let c = rest.chars().next()?;
        match c {
            '(' => {
                self.pos += 1;
                Some((start, Token::Open))
            }
            ')' => {
                self.pos += 1;
                Some((start, Token::Close))
            }
            _ => {
                let len = rest
                    .find(|ch: char| ch.is_whitespace() || ch == '(' || ch == ')')
                    .unwrap_or(rest.len());
                self.pos += len;
                Some((start, Token::Atom(&rest[..len])))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENT: &str = "(ROOT (S (NP (NN patient)) (VP (VBZ has) (NP (NN fever)))))";

    #[test]
    fn reads_bracketed_form() {
        let t = ParseTree::from_bracketed(PATIENT).unwrap();
        assert_eq!(t.label(t.root()), "ROOT");
        assert_eq!(t.sentence(), vec!["patient", "has", "fever"]);
        assert_eq!(t.len(), 11);
    }

    #[test]
    fn display_round_trips() {
        let t = ParseTree::from_bracketed(PATIENT).unwrap();
        assert_eq!(t.to_string(), PATIENT);
    }

    #[test]
    fn unlabeled_outer_bracket_is_root() {
        let t = ParseTree::from_bracketed("( (S (NN fever)) )").unwrap();
        assert_eq!(t.label(0), "ROOT");
        assert_eq!(t.label(t.children(0)[0]), "S");
    }

    #[test]
    fn leaf_words_keep_left_to_right_order() {
        let mut b = ParseTreeBuilder::new("NP");
        let root = b.root();
        b.add_word(root, "JJ", "high");
        b.add_word(root, "NN", "body");
        b.add_word(root, "NN", "temperature");
        let t = b.build();
        assert_eq!(t.leaf_words(t.root()), vec!["high", "body", "temperature"]);
        // a leaf is its own word
        let leaf = t.children(t.children(0)[0])[0];
        assert_eq!(t.leaf_words(leaf), vec!["high"]);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for bad in ["", "(S (NN fever)", "(S (NN fever)))", "fever", "(S) (S)", "(A) x"] {
            assert!(
                matches!(
                    ParseTree::from_bracketed(bad),
                    Err(PatternError::MalformedParseTree { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn deep_trees_do_not_recurse() {
        let depth = 10_000;
        let text = "(X ".repeat(depth) + "w" + &")".repeat(depth);
        let t = ParseTree::from_bracketed(&text).unwrap();
        assert_eq!(t.sentence(), vec!["w"]);
        assert_eq!(t.to_string().len(), text.len());
    }
}
