//! Matching compiled patterns against parse trees.
//!
//! A pattern matches at any node of the parse tree. At an internal pattern
//! node the labels must be equal, and the pattern's children must align with
//! a subsequence of the tree node's children in order; tree children between
//! aligned ones are skipped. Every alignment is explored with an explicit
//! backtracking stack, and each complete alignment yields one triplet.

use std::collections::HashMap;

use super::error::{PatternError, PatternResult, TripletError};
use super::parse_tree::{NodeId, ParseTree};
use super::tree::{PatternTree, SlotRole};
use super::triplet::Triplet;

/// A pattern line: three meta-model slot names and the tree shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntacticalPattern {
    pub subject_slot: String,
    pub predicate_slot: String,
    pub object_slot: String,
    pub tree: PatternTree,
}

impl SyntacticalPattern {
    /// Parse `SUBJECT_SLOT PREDICATE_SLOT OBJECT_SLOT (TREE)`.
    pub fn parse(line: &str) -> PatternResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [subject, predicate, object, tree] = fields[..] else {
            return Err(PatternError::Malformed {
                line: line.to_string(),
                reason: format!("expected 4 fields, found {}", fields.len()),
            });
        };

        let tree = PatternTree::compile(tree).map_err(|err| match err {
            PatternError::Malformed { reason, .. } => PatternError::Malformed {
                line: line.to_string(),
                reason,
            },
            other => other,
        })?;

        Ok(Self {
            subject_slot: subject.to_string(),
            predicate_slot: predicate.to_string(),
            object_slot: object.to_string(),
            tree,
        })
    }

    /// Meta-model slot bound to `role`.
    pub fn slot(&self, role: SlotRole) -> &str {
        match role {
            SlotRole::Subject => &self.subject_slot,
            SlotRole::Predicate => &self.predicate_slot,
            SlotRole::Object => &self.object_slot,
        }
    }

    /// Every triplet this pattern extracts from `tree`, trying each tree
    /// node as the pattern root.
    pub fn match_tree(&self, tree: &ParseTree) -> Result<Vec<Triplet>, TripletError> {
        let mut triplets = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            triplets.extend(self.match_node(tree, node, self.tree.root())?);
            stack.extend_from_slice(tree.children(node));
        }
        Ok(triplets)
    }

    fn match_node(
        &self,
        tree: &ParseTree,
        t: NodeId,
        p: usize,
    ) -> Result<Vec<Triplet>, TripletError> {
        if self.tree.is_leaf(p) {
            return Ok(self.match_leaf(tree, t, p));
        }
        if tree.label(t) != self.tree.label(p) {
            return Ok(Vec::new());
        }

        let t_children = tree.children(t);
        let p_children = self.tree.children(p);

        // sub-matches of (pattern child, tree child), computed once
        let mut memo: HashMap<(usize, usize), Vec<Triplet>> = HashMap::new();
        let mut found = Vec::new();
        let mut stack = vec![(0usize, 0usize, Triplet::empty())];

        while let Some((pi, ti, partial)) = stack.pop() {
            if pi == p_children.len() {
                found.push(partial);
                continue;
            }
            for tj in ti..t_children.len() {
                if !memo.contains_key(&(pi, tj)) {
                    let subs = self.match_node(tree, t_children[tj], p_children[pi])?;
                    memo.insert((pi, tj), subs);
                }
                for sub in &memo[&(pi, tj)] {
                    stack.push((pi + 1, tj + 1, partial.merge(sub)?));
                }
            }
        }

        Ok(found)
    }

    fn match_leaf(&self, tree: &ParseTree, t: NodeId, p: usize) -> Vec<Triplet> {
        if tree.label(t) == self.tree.label(p) {
            return vec![Triplet::empty()];
        }
        // a subtree always has at least one leaf, so `partial` cannot fail
        self.tree
            .role(p)
            .and_then(|role| Triplet::partial(role, tree.leaf_words(t)).ok())
            .into_iter()
            .collect()
    }
}

impl std::fmt::Display for SyntacticalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.subject_slot, self.predicate_slot, self.object_slot, self.tree
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_tree::ParseTreeBuilder;

    const SUFFER: &str = "PERSON SUFFER SYMPTOM \
        (S(NP(PERSON_SUBJECT))(VP(VBP(SUFFER_RELATIONSHIP))(PP(SYMPTOM_OBJECT))))";

    fn words(w: &[&str]) -> Option<Vec<String>> {
        Some(w.iter().map(|s| s.to_string()).collect())
    }

    fn patient_has_fever() -> ParseTree {
        let mut b = ParseTreeBuilder::new("S");
        let s = b.root();
        let np = b.add_child(s, "NP");
        b.add_word(np, "NN", "patient");
        let vp = b.add_child(s, "VP");
        let vbp = b.add_child(vp, "VBP");
        b.add_child(vbp, "has");
        let pp = b.add_child(vp, "PP");
        b.add_word(pp, "NN", "fever");
        b.build()
    }

    #[test]
    fn parses_four_fields() {
        let p = SyntacticalPattern::parse(SUFFER).unwrap();
        assert_eq!(p.slot(SlotRole::Subject), "PERSON");
        assert_eq!(p.slot(SlotRole::Predicate), "SUFFER");
        assert_eq!(p.slot(SlotRole::Object), "SYMPTOM");
        assert_eq!(SyntacticalPattern::parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        for bad in ["A B (S(X_SUBJECT))", "A B C D (S(X_SUBJECT))", ""] {
            assert!(matches!(
                SyntacticalPattern::parse(bad),
                Err(PatternError::Malformed { .. })
            ));
        }
    }

    #[test]
    fn malformed_tree_reports_whole_line() {
        match SyntacticalPattern::parse("A B C (S(NP)") {
            Err(PatternError::Malformed { line, .. }) => assert_eq!(line, "A B C (S(NP)"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn extracts_single_triplet() {
        let p = SyntacticalPattern::parse(SUFFER).unwrap();
        let triplets = p.match_tree(&patient_has_fever()).unwrap();
        assert_eq!(triplets.len(), 1);
        assert_eq!(triplets[0].subject, words(&["patient"]));
        assert_eq!(triplets[0].predicate, words(&["has"]));
        assert_eq!(triplets[0].object, words(&["fever"]));
        assert_eq!(triplets[0].accuracy, 1.0);
    }

    #[test]
    fn matches_below_the_tree_root() {
        let p = SyntacticalPattern::parse(SUFFER).unwrap();
        let tree = ParseTree::from_bracketed(
            "(ROOT (S (NP (NN patient)) (VP (VBP has) (PP (NN fever)))))",
        )
        .unwrap();
        let triplets = p.match_tree(&tree).unwrap();
        assert_eq!(triplets.len(), 1);
        assert_eq!(triplets[0].object, words(&["fever"]));
    }

    #[test]
    fn intervening_children_are_skipped() {
        let p = SyntacticalPattern::parse("X Y Z (NP(DT)(OBJ_OBJECT))").unwrap();
        let tree =
            ParseTree::from_bracketed("(NP (DT the) (JJ high) (NN fever))").unwrap();
        let mut objects: Vec<_> = p
            .match_tree(&tree)
            .unwrap()
            .into_iter()
            .map(|t| t.object.unwrap().join(" "))
            .collect();
        objects.sort();
        // DT anchors, then the object may align with either later child
        assert_eq!(objects, vec!["fever", "high"]);
    }

    #[test]
    fn order_of_pattern_children_is_enforced() {
        let p = SyntacticalPattern::parse("X Y Z (NP(NN)(DT))").unwrap();
        let tree = ParseTree::from_bracketed("(NP (DT the) (NN fever))").unwrap();
        assert!(p.match_tree(&tree).unwrap().is_empty());
    }

    #[test]
    fn subject_spans_all_leaf_words() {
        let p = SyntacticalPattern::parse("P S O (S(NP_SUBJECT)(VP))").unwrap();
        let tree = ParseTree::from_bracketed(
            "(S (NP (DT my) (JJ old) (NN father)) (VP (VBZ coughs)))",
        )
        .unwrap();
        let triplets = p.match_tree(&tree).unwrap();
        assert_eq!(triplets.len(), 1);
        // NP_SUBJECT equals no tree label, so the NP subtree is extracted
        assert_eq!(triplets[0].subject, words(&["my", "old", "father"]));
        assert_eq!(triplets[0].predicate, None);
    }

    #[test]
    fn non_role_leaf_without_label_match_fails() {
        let p = SyntacticalPattern::parse("P S O (S(NP(NNS)))").unwrap();
        assert!(p.match_tree(&patient_has_fever()).unwrap().is_empty());
    }
}
