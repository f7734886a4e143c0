//! Range decomposition
//!
//! Splits a selection into leaf-bounded segments. Each range is resolved
//! against its common ancestor: boundary points are mapped to positions in
//! the ancestor's ordered list of text leaves, the first and last leaf are
//! clipped, and interior leaves are taken whole.

use super::selection::{Anchor, Selection, TextRange};
use super::tree::TextTree;
use crate::models::{NodeId, Segment};
use std::collections::HashMap;

/// Boundary point expressed as (leaf index, character offset) within one walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct LeafPosition {
    leaf: usize,
    offset: usize,
}

/// Text leaves under one subtree, with the leaf count before and after each node
struct LeafWalk {
    leaves: Vec<NodeId>,
    entry: HashMap<NodeId, usize>,
    exit: HashMap<NodeId, usize>,
}

impl LeafWalk {
    fn new<T: TextTree + ?Sized>(tree: &T, root: NodeId) -> Self {
        let mut walk = Self {
            leaves: Vec::new(),
            entry: HashMap::new(),
            exit: HashMap::new(),
        };
        walk.visit(tree, root);
        walk
    }

    fn visit<T: TextTree + ?Sized>(&mut self, tree: &T, node: NodeId) {
        self.entry.insert(node, self.leaves.len());
        if tree.leaf_text(node).is_some() {
            self.leaves.push(node);
        } else {
            for &child in tree.children(node) {
                self.visit(tree, child);
            }
        }
        self.exit.insert(node, self.leaves.len());
    }

    fn position<T: TextTree + ?Sized>(&self, tree: &T, anchor: Anchor) -> Option<LeafPosition> {
        if let Some(len) = tree.leaf_len(anchor.node) {
            return Some(LeafPosition {
                leaf: *self.entry.get(&anchor.node)?,
                offset: anchor.offset.min(len),
            });
        }

        let leaf = match tree.children(anchor.node).get(anchor.offset) {
            Some(child) => *self.entry.get(child)?,
            None => *self.exit.get(&anchor.node)?,
        };
        Some(LeafPosition { leaf, offset: 0 })
    }
}

/// Segments for every range of `selection`, range by range.
///
/// Each range's segments are in document order and disjoint. Ranges are
/// decomposed independently, so overlapping ranges yield overlapping
/// segments; the markup synchronizer skips the ones it can no longer wrap.
pub fn decompose<T: TextTree + ?Sized>(tree: &T, selection: &Selection) -> Vec<Segment> {
    selection
        .ranges
        .iter()
        .flat_map(|range| decompose_range(tree, range))
        .collect()
}

/// Segments covered by a single range
pub fn decompose_range<T: TextTree + ?Sized>(tree: &T, range: &TextRange) -> Vec<Segment> {
    if range.is_collapsed() {
        return Vec::new();
    }
    if !tree.contains_node(range.start.node) || !tree.contains_node(range.end.node) {
        log::warn!(
            "Skipping range with unknown anchor: {} -> {}",
            range.start.node,
            range.end.node
        );
        return Vec::new();
    }
    let Some(ancestor) = tree.common_ancestor(range.start.node, range.end.node) else {
        log::warn!("Range anchors {} and {} share no ancestor", range.start.node, range.end.node);
        return Vec::new();
    };

    let walk = LeafWalk::new(tree, ancestor);
    let (Some(a), Some(b)) = (walk.position(tree, range.start), walk.position(tree, range.end)) else {
        return Vec::new();
    };
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    if from == to {
        return Vec::new();
    }

    let last = to.leaf.min(walk.leaves.len().saturating_sub(1));
    let mut segments = Vec::new();
    for index in from.leaf..=last {
        let Some(&leaf) = walk.leaves.get(index) else {
            break;
        };
        let Some(len) = tree.leaf_len(leaf) else {
            continue;
        };
        let start = if index == from.leaf { from.offset.min(len) } else { 0 };
        let end = if index == to.leaf { to.offset.min(len) } else { len };
        if start < end {
            segments.push(Segment::new(leaf, start, end));
        }
    }

    log::debug!("Decomposed range under {} into {} segment(s)", ancestor, segments.len());
    segments
}
