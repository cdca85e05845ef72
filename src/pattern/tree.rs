//! Compiled pattern trees.

use serde::{Deserialize, Serialize};

use super::error::{PatternError, PatternResult};

/// Deepest nesting a pattern may have. Matching recurses once per pattern
/// level, so this bounds the matcher's stack use.
pub const MAX_PATTERN_DEPTH: usize = 32;

/// Triplet position an extraction leaf fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotRole {
    Subject,
    Predicate,
    Object,
}

impl SlotRole {
    pub const ALL: [SlotRole; 3] = [SlotRole::Subject, SlotRole::Predicate, SlotRole::Object];

    /// Role marked by a leaf label's last `_` segment.
    ///
    /// `PERSON_SUBJECT` is a subject, `SUFFER_RELATIONSHIP` a predicate,
    /// `SYMPTOM_OBJECT` an object.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.rsplit('_').next()? {
            "SUBJECT" => Some(Self::Subject),
            "RELATIONSHIP" => Some(Self::Predicate),
            "OBJECT" => Some(Self::Object),
            _ => None,
        }
    }

    fn position(self) -> usize {
        match self {
            Self::Subject => 0,
            Self::Predicate => 1,
            Self::Object => 2,
        }
    }
}

impl std::fmt::Display for SlotRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Object => "object",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PatternNode {
    label: String,
    children: Vec<usize>,
    /// Set on leaves whose label carries a role suffix.
    role: Option<SlotRole>,
}

/// A rooted tree of labels compiled from the nested-list form.
///
/// Nodes live in an arena; index 0 is the root. Immutable once compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTree {
    nodes: Vec<PatternNode>,
    depth: usize,
}

impl PatternTree {
    /// Compile `(S(NP(PERSON_SUBJECT))(VP(...)))`.
    ///
    /// Rejects unbalanced parentheses, empty labels, stray characters,
    /// more than one top-level node, nesting deeper than
    /// [`MAX_PATTERN_DEPTH`], and a role marked on two leaves.
    pub fn compile(text: &str) -> PatternResult<Self> {
        let malformed = |reason: &str| PatternError::Malformed {
            line: text.to_string(),
            reason: reason.to_string(),
        };

        let chars: Vec<char> = text.chars().collect();
        let mut nodes: Vec<PatternNode> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut top_level = 0usize;
        let mut depth = 0usize;
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '(' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end] != '(' && chars[end] != ')' {
                        end += 1;
                    }
                    let label: String = chars[start..end].iter().collect();
                    if label.is_empty() {
                        return Err(malformed("empty node label"));
                    }
                    if label.chars().any(char::is_whitespace) {
                        return Err(malformed("whitespace inside a node label"));
                    }

                    nodes.push(PatternNode {
                        label,
                        children: Vec::new(),
                        role: None,
                    });
                    let id = nodes.len() - 1;
                    match open.last() {
                        Some(&parent) => nodes[parent].children.push(id),
                        None => top_level += 1,
                    }
                    open.push(id);
                    depth = depth.max(open.len());
                    if depth > MAX_PATTERN_DEPTH {
                        return Err(PatternError::TooDeep {
                            depth,
                            limit: MAX_PATTERN_DEPTH,
                        });
                    }
                    i = end;
                }
                ')' => {
                    if open.pop().is_none() {
                        return Err(malformed("unbalanced parentheses"));
                    }
                    i += 1;
                }
                c => {
                    return Err(malformed(&format!("unexpected character '{c}'")));
                }
            }
        }

        if !open.is_empty() {
            return Err(malformed("unbalanced parentheses"));
        }
        match top_level {
            0 => return Err(malformed("empty pattern tree")),
            1 => {}
            _ => return Err(malformed("more than one root node")),
        }

        let mut seen = [false; 3];
        for node in nodes.iter_mut().filter(|n| n.children.is_empty()) {
            node.role = SlotRole::from_label(&node.label);
            if let Some(role) = node.role {
                if std::mem::replace(&mut seen[role.position()], true) {
                    return Err(PatternError::DuplicateRole { role });
                }
            }
        }

        Ok(Self { nodes, depth })
    }

    pub fn root(&self) -> usize {
        0
    }

    pub fn label(&self, node: usize) -> &str {
        &self.nodes[node].label
    }

    pub fn children(&self, node: usize) -> &[usize] {
        &self.nodes[node].children
    }

    pub fn is_leaf(&self, node: usize) -> bool {
        self.nodes[node].children.is_empty()
    }

    /// Role of an extraction leaf; `None` for internal and anchor nodes.
    pub fn role(&self, node: usize) -> Option<SlotRole> {
        self.nodes[node].role
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Levels from the root to the deepest leaf, counting both.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Roles marked anywhere in the tree.
    pub fn roles(&self) -> impl Iterator<Item = SlotRole> + '_ {
        self.nodes.iter().filter_map(|n| n.role)
    }

    fn write_node(&self, f: &mut std::fmt::Formatter<'_>, node: usize) -> std::fmt::Result {
        write!(f, "({}", self.nodes[node].label)?;
        for &child in &self.nodes[node].children {
            self.write_node(f, child)?;
        }
        f.write_str(")")
    }
}

impl std::fmt::Display for PatternTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_node(f, self.root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUFFER: &str = "(S(NP(PERSON_SUBJECT))(VP(VBP(SUFFER_RELATIONSHIP))(PP(SYMPTOM_OBJECT))))";

    #[test]
    fn compiles_nested_list() {
        let t = PatternTree::compile(SUFFER).unwrap();
        assert_eq!(t.label(t.root()), "S");
        assert_eq!(t.children(t.root()).len(), 2);
        assert_eq!(t.len(), 8);
        assert_eq!(t.depth(), 4);
        let roles: Vec<SlotRole> = t.roles().collect();
        assert_eq!(roles, vec![SlotRole::Subject, SlotRole::Predicate, SlotRole::Object]);
    }

    #[test]
    fn renders_back_to_source_form() {
        let t = PatternTree::compile(SUFFER).unwrap();
        assert_eq!(t.to_string(), SUFFER);
    }

    #[test]
    fn anchor_leaves_have_no_role() {
        let t = PatternTree::compile("(NP(DT)(X_SUBJECT))").unwrap();
        let dt = t.children(0)[0];
        assert!(t.is_leaf(dt));
        assert_eq!(t.role(dt), None);
        assert_eq!(t.role(t.children(0)[1]), Some(SlotRole::Subject));
    }

    #[test]
    fn role_suffix_on_internal_node_is_ignored() {
        let t = PatternTree::compile("(A_SUBJECT(B_SUBJECT))").unwrap();
        assert_eq!(t.roles().count(), 1);
    }

    #[test]
    fn rejects_malformed_trees() {
        for bad in [
            "(S(NP)",
            "(S))",
            "()",
            "(S()(NP))",
            "",
            "(S)(NP)",
            "S(NP)",
            "(S (NP))",
        ] {
            assert!(
                matches!(PatternTree::compile(bad), Err(PatternError::Malformed { .. })),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_duplicate_roles() {
        assert!(matches!(
            PatternTree::compile("(S(A_SUBJECT)(B_SUBJECT))"),
            Err(PatternError::DuplicateRole {
                role: SlotRole::Subject
            })
        ));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let deep = "(X".repeat(MAX_PATTERN_DEPTH + 1) + &")".repeat(MAX_PATTERN_DEPTH + 1);
        assert!(matches!(
            PatternTree::compile(&deep),
            Err(PatternError::TooDeep { .. })
        ));
        let ok = "(X".repeat(MAX_PATTERN_DEPTH) + &")".repeat(MAX_PATTERN_DEPTH);
        assert!(PatternTree::compile(&ok).is_ok());
    }

    #[test]
    fn suffix_detection() {
        assert_eq!(SlotRole::from_label("PERSON_SUBJECT"), Some(SlotRole::Subject));
        assert_eq!(SlotRole::from_label("SUFFER_RELATIONSHIP"), Some(SlotRole::Predicate));
        assert_eq!(SlotRole::from_label("OBJECT"), Some(SlotRole::Object));
        assert_eq!(SlotRole::from_label("NN"), None);
    }
}
