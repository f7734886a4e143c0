//! Segments and annotations

use super::node::NodeId;
use crate::text::tree::MarkupTree;
use serde::{Deserialize, Serialize};

/// The part of one text leaf covered by a selection, `start..end` in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub leaf: NodeId,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(leaf: NodeId, start: usize, end: usize) -> Self {
        Self { leaf, start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether two segments share at least one character
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.leaf == other.leaf && self.start < other.end && other.start < self.end
    }
}

/// Handle from an annotation to its mark in the live tree.
///
/// Holds only the mark id and is resolved again on every use, so a mark that
/// was removed behind the engine's back resolves to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkupHandle(String);

impl MarkupHandle {
    pub fn new(mark_id: impl Into<String>) -> Self {
        Self(mark_id.into())
    }

    pub fn mark_id(&self) -> &str {
        &self.0
    }

    pub fn resolve<T: MarkupTree + ?Sized>(&self, tree: &T) -> Option<NodeId> {
        tree.find_mark(&self.0)
            .filter(|&node| tree.mark_id(node) == Some(self.0.as_str()))
    }
}

/// A completed mark as tracked by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    /// Text at the time the mark was made
    pub text: String,
    /// Segment the mark was made from (the leaf itself no longer exists)
    pub segment: Segment,
    #[serde(rename = "markup")]
    pub markup: MarkupHandle,
}

impl Annotation {
    pub fn new(id: impl Into<String>, text: impl Into<String>, segment: Segment) -> Self {
        let id = id.into();
        Self {
            markup: MarkupHandle::new(id.clone()),
            id,
            text: text.into(),
            segment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_overlap() {
        let a = Segment::new(NodeId(1), 0, 4);
        let b = Segment::new(NodeId(1), 3, 6);
        let c = Segment::new(NodeId(1), 4, 6);
        let d = Segment::new(NodeId(2), 0, 4);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // Exclusive end
        assert!(!a.overlaps(&d));
    }

    #[test]
    fn test_annotation_handle_uses_id() {
        let annotation = Annotation::new("h1", "quick", Segment::new(NodeId(3), 4, 9));
        assert_eq!(annotation.markup.mark_id(), "h1");
        assert_eq!(annotation.segment.len(), 5);
    }
}
