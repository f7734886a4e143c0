//! Document text model
//!
//! `TextTree` is the read-only view the range decomposer walks;
//! `MarkupTree` adds the splice primitives the markup synchronizer needs.
//! Different implementations can back these with different stores (an arena,
//! a mirrored DOM, ...). All offsets are counted in characters.

use crate::errors::TreeError;
use crate::models::NodeId;

/// Read-only traversal over a tree of containers and text leaves
pub trait TextTree {
    /// Root container of the document
    fn root(&self) -> NodeId;

    /// Whether `node` is currently part of the document
    fn contains_node(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in document order (empty for leaves and unknown nodes)
    fn children(&self, node: NodeId) -> &[NodeId];

    /// Text of a leaf, `None` if `node` is not a text leaf
    fn leaf_text(&self, node: NodeId) -> Option<&str>;

    /// Id of a mark node, `None` for anything else
    fn mark_id(&self, node: NodeId) -> Option<&str>;

    /// HTML id attribute of an element node
    fn element_id(&self, node: NodeId) -> Option<&str>;

    /// Length of a leaf in characters
    fn leaf_len(&self, node: NodeId) -> Option<usize> {
        self.leaf_text(node).map(|text| text.chars().count())
    }

    /// True if `ancestor` is `node` or one of its ancestors
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Nearest node that contains both `a` and `b`
    fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(a);
        while let Some(n) = current {
            chain.push(n);
            current = self.parent(n);
        }

        let mut current = Some(b);
        while let Some(n) = current {
            if chain.contains(&n) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Nearest enclosing mark of `node` (including `node` itself)
    fn enclosing_mark(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.mark_id(n).is_some() {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// Text leaves under `node` in document order
    fn text_leaves(&self, node: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if self.leaf_text(n).is_some() {
                leaves.push(n);
            } else {
                stack.extend(self.children(n).iter().rev());
            }
        }
        leaves
    }

    /// Mark nodes under `node` in document order
    fn marks(&self, node: NodeId) -> Vec<NodeId> {
        let mut marks = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if self.mark_id(n).is_some() {
                marks.push(n);
            }
            stack.extend(self.children(n).iter().rev());
        }
        marks
    }

    /// Concatenated text of every leaf under `node`
    fn text_content(&self, node: NodeId) -> String {
        self.text_leaves(node)
            .into_iter()
            .filter_map(|leaf| self.leaf_text(leaf))
            .collect()
    }

    /// First element carrying the given HTML id
    fn find_element(&self, element_id: &str) -> Option<NodeId> {
        let mut stack = vec![self.root()];
        while let Some(n) = stack.pop() {
            if self.element_id(n) == Some(element_id) {
                return Some(n);
            }
            stack.extend(self.children(n).iter().rev());
        }
        None
    }
}

/// Tree mutations needed to apply and revert marks
pub trait MarkupTree: TextTree {
    /// Replace `leaf` with `[pre][mark(slice)][post]` where the slice is
    /// `start..end` of the leaf's text. Empty `pre`/`post` pieces are omitted.
    /// Returns the new mark node.
    fn splice_mark(
        &mut self,
        leaf: NodeId,
        start: usize,
        end: usize,
        mark_id: &str,
        class: &str,
    ) -> Result<NodeId, TreeError>;

    /// Live mark node carrying `mark_id`
    fn find_mark(&self, mark_id: &str) -> Option<NodeId>;

    /// Replace a mark with a single text leaf holding the same text.
    /// Returns the new leaf, or `None` when the mark held no text and was
    /// simply removed.
    fn replace_with_text(&mut self, mark: NodeId) -> Result<Option<NodeId>, TreeError>;

    /// Fold text-leaf siblings abutting `leaf` into one leaf.
    /// Returns the surviving leaf.
    fn merge_adjacent_text(&mut self, leaf: NodeId) -> Result<NodeId, TreeError>;
}
