//! Selection ranges over the document tree
//!
//! Boundary points follow the DOM convention: inside a text leaf the offset
//! counts characters, inside a container it counts children.

use crate::models::NodeId;
use serde::{Deserialize, Serialize};

/// One boundary point of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub node: NodeId,
    pub offset: usize,
}

impl Anchor {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A range between two boundary points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Anchor,
    pub end: Anchor,
}

impl TextRange {
    pub fn new(start: Anchor, end: Anchor) -> Self {
        Self { start, end }
    }

    /// Range inside a single leaf
    pub fn within(leaf: NodeId, start: usize, end: usize) -> Self {
        Self {
            start: Anchor::new(leaf, start),
            end: Anchor::new(leaf, end),
        }
    }

    /// Check if this range is empty (start == end)
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// The user's current selection: zero or more ranges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    pub ranges: Vec<TextRange>,
}

impl Selection {
    pub fn new(ranges: Vec<TextRange>) -> Self {
        Self { ranges }
    }

    pub fn single(range: TextRange) -> Self {
        Self {
            ranges: vec![range],
        }
    }

    /// True when there is nothing to mark
    pub fn is_collapsed(&self) -> bool {
        self.ranges.iter().all(TextRange::is_collapsed)
    }

    /// Where the selection started
    pub fn anchor(&self) -> Option<Anchor> {
        self.ranges.first().map(|r| r.start)
    }

    /// Where the selection ended
    pub fn focus(&self) -> Option<Anchor> {
        self.ranges.last().map(|r| r.end)
    }
}

/// Source of the user's selection (the browser, a test double, ...)
pub trait SelectionSource {
    fn selection(&self) -> Selection;

    /// Drop the native selection so no highlighting lingers
    fn clear(&mut self);
}

/// Selection handed over as a value, remembering whether it was cleared
#[derive(Debug, Clone, Default)]
pub struct StaticSelection {
    selection: Selection,
    cleared: bool,
}

impl StaticSelection {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            cleared: false,
        }
    }

    pub fn was_cleared(&self) -> bool {
        self.cleared
    }
}

impl SelectionSource for StaticSelection {
    fn selection(&self) -> Selection {
        if self.cleared {
            Selection::default()
        } else {
            self.selection.clone()
        }
    }

    fn clear(&mut self) {
        self.cleared = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_selection() {
        let leaf = NodeId(2);
        assert!(Selection::default().is_collapsed());
        assert!(Selection::single(TextRange::within(leaf, 3, 3)).is_collapsed());
        assert!(!Selection::single(TextRange::within(leaf, 3, 4)).is_collapsed());
    }

    #[test]
    fn test_anchor_and_focus() {
        let sel = Selection::new(vec![
            TextRange::within(NodeId(2), 0, 3),
            TextRange::within(NodeId(5), 1, 4),
        ]);
        assert_eq!(sel.anchor(), Some(Anchor::new(NodeId(2), 0)));
        assert_eq!(sel.focus(), Some(Anchor::new(NodeId(5), 4)));
    }

    #[test]
    fn test_static_selection_clear() {
        let mut source = StaticSelection::new(Selection::single(TextRange::within(NodeId(1), 0, 2)));
        assert!(!source.selection().is_collapsed());
        source.clear();
        assert!(source.was_cleared());
        assert!(source.selection().is_collapsed());
    }

    #[test]
    fn test_selection_deserializes_from_range_list() {
        let json = r#"[{"start":{"node":2,"offset":0},"end":{"node":4,"offset":3}}]"#;
        let sel: Selection = serde_json::from_str(json).unwrap();
        assert_eq!(sel.ranges[0].end, Anchor::new(NodeId(4), 3));
    }
}
