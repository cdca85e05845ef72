//! Shortest ancestral path between two sets of synsets.
//!
//! One bidirectional breadth-first search is seeded with every synset of
//! both sets. The side whose frontier is closer is expanded first; a synset
//! reached by both sides is a common ancestor candidate whose path length
//! is the sum of both distances. A side stops as soon as its frontier is no
//! closer than the best candidate, since nothing it reaches later can beat it.

use std::collections::{HashMap, VecDeque};

use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::error::ThesaurusResult;

use super::graph::ThesaurusGraph;
use super::SynsetIndex;

/// Result of a shortest ancestral path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AncestralPath {
    /// Edges from the nearer member of V plus edges from the nearer member of W.
    pub length: u32,
    /// The synset where the two paths meet.
    pub ancestor: SynsetIndex,
}

struct Side {
    dist: HashMap<NodeIndex, u32>,
    queue: VecDeque<NodeIndex>,
}

impl Side {
    fn seeded(seeds: &[NodeIndex]) -> Self {
        let mut dist = HashMap::new();
        let mut queue = VecDeque::new();
        for &seed in seeds {
            if dist.insert(seed, 0).is_none() {
                queue.push_back(seed);
            }
        }
        Self { dist, queue }
    }

    fn front(&self) -> Option<u32> {
        self.queue.front().map(|n| self.dist[n])
    }
}

impl ThesaurusGraph {
    /// Length and meeting synset of the shortest ancestral path between
    /// any `v` in `v_set` and any `w` in `w_set`.
    ///
    /// `None` when no synset is reachable from both sets, including when a
    /// set is empty. Fails on indices outside the graph.
    pub fn shortest_ancestral_path(
        &self,
        v_set: &[SynsetIndex],
        w_set: &[SynsetIndex],
    ) -> ThesaurusResult<Option<AncestralPath>> {
        let v_nodes = v_set
            .iter()
            .map(|&i| self.node(i))
            .collect::<ThesaurusResult<Vec<_>>>()?;
        let w_nodes = w_set
            .iter()
            .map(|&i| self.node(i))
            .collect::<ThesaurusResult<Vec<_>>>()?;
        if v_nodes.is_empty() || w_nodes.is_empty() {
            return Ok(None);
        }

        let graph = self.petgraph();
        let mut sides = [Side::seeded(&v_nodes), Side::seeded(&w_nodes)];
        let mut best: Option<(u32, NodeIndex)> = None;

        // a synset in both sets is its own ancestor at distance zero
        for node in &w_nodes {
            if sides[0].dist.contains_key(node) {
                best = Some((0, *node));
                break;
            }
        }

        loop {
            let side = match (sides[0].front(), sides[1].front()) {
                (None, None) => break,
                (Some(_), None) => 0,
                (None, Some(_)) => 1,
                (Some(dv), Some(dw)) => usize::from(dw < dv),
            };
            let other = 1 - side;

            let Some(current) = sides[side].queue.pop_front() else {
                break;
            };
            let d = sides[side].dist[&current];
            if best.is_some_and(|(len, _)| len <= d) {
                sides[side].queue.clear();
                continue;
            }

            for edge in graph.edges_directed(current, Direction::Outgoing) {
                let next = edge.target();
                if sides[side].dist.contains_key(&next) {
                    continue;
                }
                sides[side].dist.insert(next, d + 1);
                sides[side].queue.push_back(next);

                if let Some(&od) = sides[other].dist.get(&next) {
                    let total = d + 1 + od;
                    if best.is_none_or(|(len, _)| total < len) {
                        best = Some((total, next));
                    }
                }
            }
        }

        Ok(best.map(|(length, node)| AncestralPath {
            length,
            ancestor: graph[node].index,
        }))
    }

    /// Length of the shortest ancestral path, if the sets are connected.
    pub fn shortest_ancestral_path_length(
        &self,
        v_set: &[SynsetIndex],
        w_set: &[SynsetIndex],
    ) -> ThesaurusResult<Option<u32>> {
        Ok(self
            .shortest_ancestral_path(v_set, w_set)?
            .map(|p| p.length))
    }

    /// Common ancestor on a shortest ancestral path, if the sets are connected.
    pub fn shortest_common_ancestor(
        &self,
        v_set: &[SynsetIndex],
        w_set: &[SynsetIndex],
    ) -> ThesaurusResult<Option<SynsetIndex>> {
        Ok(self
            .shortest_ancestral_path(v_set, w_set)?
            .map(|p| p.ancestor))
    }
}
