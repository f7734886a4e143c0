//! Arena-backed document tree
//!
//! `DocumentTree` mirrors the displayed document: elements, text leaves and
//! the marks inserted by the engine. Removed nodes leave an empty slot so a
//! `NodeId` is never reused within one tree. Marks are indexed by id so a
//! stale handle can be detected instead of followed.

use super::node::{Node, NodeId, NodeKind};
use crate::errors::TreeError;
use crate::text::tree::{MarkupTree, TextTree};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Serialized form of a subtree, exchanged with the JavaScript glue
///
/// When a tree is built from a snapshot, node ids are assigned in preorder
/// starting at 0 for the root. Snapshots produced by the tree carry the ids
/// in `node`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocNode {
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
        #[serde(default)]
        children: Vec<DocNode>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
    },
    Mark {
        id: String,
        class: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        node: Option<NodeId>,
        #[serde(default)]
        children: Vec<DocNode>,
    },
}

#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    marks: HashMap<String, NodeId>,
    /// Containers whose child list changed since the last `take_dirty`
    dirty: BTreeSet<NodeId>,
}

impl DocumentTree {
    /// Create a tree holding a single empty root element
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![Some(Node::element(root_tag, None))],
            root: NodeId(0),
            marks: HashMap::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Build a tree from a snapshot. The root must be an element.
    pub fn from_snapshot(snapshot: &DocNode) -> Result<Self, TreeError> {
        let DocNode::Element { tag, id, children, .. } = snapshot else {
            return Err(TreeError::NotContainer(NodeId(0)));
        };

        let mut tree = Self::new(tag);
        if let Some(id) = id {
            tree.set_element_id(tree.root, id)?;
        }
        for child in children {
            tree.insert_snapshot(tree.root, child)?;
        }
        tree.dirty.clear();
        Ok(tree)
    }

    fn insert_snapshot(&mut self, parent: NodeId, snapshot: &DocNode) -> Result<NodeId, TreeError> {
        match snapshot {
            DocNode::Element { tag, id, children, .. } => {
                let node = self.append_element(parent, tag)?;
                if let Some(id) = id {
                    self.set_element_id(node, id)?;
                }
                for child in children {
                    self.insert_snapshot(node, child)?;
                }
                Ok(node)
            }
            DocNode::Text { text, .. } => self.append_text(parent, text),
            DocNode::Mark { id, class, children, .. } => {
                if self.marks.contains_key(id) {
                    return Err(TreeError::DuplicateMark(id.clone()));
                }
                let node = self.attach_child(parent, Node::mark(id, class, Some(parent)))?;
                self.marks.insert(id.clone(), node);
                for child in children {
                    self.insert_snapshot(node, child)?;
                }
                Ok(node)
            }
        }
    }

    /// Serialize the subtree under `node`
    pub fn snapshot(&self, node: NodeId) -> Result<DocNode, TreeError> {
        let current = self.node(node)?;
        let children = current
            .children
            .iter()
            .map(|&child| self.snapshot(child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match &current.kind {
            NodeKind::Element { tag, element_id } => DocNode::Element {
                tag: tag.clone(),
                id: element_id.clone(),
                node: Some(node),
                children,
            },
            NodeKind::Text(text) => DocNode::Text {
                text: text.clone(),
                node: Some(node),
            },
            NodeKind::Mark { id, class } => DocNode::Mark {
                id: id.clone(),
                class: class.clone(),
                node: Some(node),
                children,
            },
        })
    }

    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    fn node(&self, node: NodeId) -> Result<&Node, TreeError> {
        self.get(node).ok_or(TreeError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes
            .get_mut(node.index())
            .and_then(Option::as_mut)
            .ok_or(TreeError::UnknownNode(node))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(node));
        id
    }

    fn attach_child(&mut self, parent: NodeId, child: Node) -> Result<NodeId, TreeError> {
        if self.node(parent)?.is_text() {
            return Err(TreeError::NotContainer(parent));
        }
        let id = self.alloc(child);
        self.node_mut(parent)?.children.push(id);
        self.dirty.insert(parent);
        Ok(id)
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, TreeError> {
        self.attach_child(parent, Node::element(tag, Some(parent)))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.attach_child(parent, Node::text(text, Some(parent)))
    }

    pub fn set_element_id(&mut self, node: NodeId, id: &str) -> Result<(), TreeError> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Element { element_id, .. } => {
                *element_id = Some(id.to_string());
                Ok(())
            }
            _ => Err(TreeError::NotContainer(node)),
        }
    }

    /// Remove `node` and its subtree from the document.
    ///
    /// Models a mutation made outside the engine, e.g. a script deleting part
    /// of the page. Marks inside the subtree disappear from the mark index.
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.node(node)?.parent.ok_or(TreeError::Detached(node))?;
        self.node_mut(parent)?.children.retain(|&c| c != node);
        self.dirty.insert(parent);
        self.free_subtree(node);
        Ok(())
    }

    fn free_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(removed) = self.nodes.get_mut(n.index()).and_then(Option::take) {
                if let NodeKind::Mark { id, .. } = &removed.kind {
                    if self.marks.get(id) == Some(&n) {
                        self.marks.remove(id);
                    }
                }
                stack.extend(removed.children);
            }
        }
    }

    /// Position of `node` among its parent's children
    fn child_index(&self, node: NodeId) -> Result<(NodeId, usize), TreeError> {
        let parent = self.node(node)?.parent.ok_or(TreeError::Detached(node))?;
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == node)
            .ok_or(TreeError::Detached(node))?;
        Ok((parent, index))
    }

    /// Text of the whole document
    pub fn text(&self) -> String {
        self.text_content(self.root)
    }

    /// Number of live text leaves in the document
    pub fn leaf_count(&self) -> usize {
        self.text_leaves(self.root).len()
    }

    /// Number of live marks in the document
    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    /// Drain the containers whose children changed, skipping removed ones
    pub fn take_dirty(&mut self) -> Vec<NodeId> {
        let dirty = std::mem::take(&mut self.dirty);
        dirty.into_iter().filter(|&n| self.get(n).is_some()).collect()
    }
}

/// Byte index of the `char_idx`-th character (or the end of `s`)
fn byte_offset(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

impl TextTree for DocumentTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    fn leaf_text(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(Node::text_value)
    }

    fn mark_id(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(Node::mark_id)
    }

    fn element_id(&self, node: NodeId) -> Option<&str> {
        self.get(node).and_then(Node::element_id)
    }
}

impl MarkupTree for DocumentTree {
    fn splice_mark(
        &mut self,
        leaf: NodeId,
        start: usize,
        end: usize,
        mark_id: &str,
        class: &str,
    ) -> Result<NodeId, TreeError> {
        let text = self.leaf_text(leaf).ok_or(TreeError::NotText(leaf))?.to_string();
        let len = text.chars().count();
        if start > end || end > len {
            return Err(TreeError::OffsetOutOfBounds {
                node: leaf,
                start,
                end,
                len,
            });
        }
        if self.marks.contains_key(mark_id) {
            return Err(TreeError::DuplicateMark(mark_id.to_string()));
        }

        let (parent, index) = self.child_index(leaf)?;
        let (start_byte, end_byte) = (byte_offset(&text, start), byte_offset(&text, end));

        let mut replacement = Vec::with_capacity(3);
        if start > 0 {
            replacement.push(self.alloc(Node::text(&text[..start_byte], Some(parent))));
        }
        let mark = self.alloc(Node::mark(mark_id, class, Some(parent)));
        let slice = self.alloc(Node::text(&text[start_byte..end_byte], Some(mark)));
        self.node_mut(mark)?.children.push(slice);
        replacement.push(mark);
        if end < len {
            replacement.push(self.alloc(Node::text(&text[end_byte..], Some(parent))));
        }

        self.node_mut(parent)?
            .children
            .splice(index..=index, replacement);
        self.nodes[leaf.index()] = None;
        self.marks.insert(mark_id.to_string(), mark);
        self.dirty.insert(parent);
        Ok(mark)
    }

    fn find_mark(&self, mark_id: &str) -> Option<NodeId> {
        self.marks
            .get(mark_id)
            .copied()
            .filter(|&n| self.mark_id(n) == Some(mark_id))
    }

    fn replace_with_text(&mut self, mark: NodeId) -> Result<Option<NodeId>, TreeError> {
        if self.mark_id(mark).is_none() {
            return Err(TreeError::NotMark(mark));
        }
        let (parent, index) = self.child_index(mark)?;
        let text = self.text_content(mark);

        let leaf = if text.is_empty() {
            self.node_mut(parent)?.children.remove(index);
            None
        } else {
            let leaf = self.alloc(Node::text(text, Some(parent)));
            self.node_mut(parent)?.children[index] = leaf;
            Some(leaf)
        };
        self.free_subtree(mark);
        self.dirty.insert(parent);
        Ok(leaf)
    }

    fn merge_adjacent_text(&mut self, leaf: NodeId) -> Result<NodeId, TreeError> {
        if self.leaf_text(leaf).is_none() {
            return Err(TreeError::NotText(leaf));
        }
        let (parent, mut index) = self.child_index(leaf)?;
        let mut survivor = leaf;

        if index > 0 {
            let prev = self.node(parent)?.children[index - 1];
            if let Some(prev_text) = self.leaf_text(prev).map(str::to_string) {
                let own = self.leaf_text(survivor).unwrap_or_default().to_string();
                if let NodeKind::Text(text) = &mut self.node_mut(prev)?.kind {
                    *text = prev_text + &own;
                }
                self.node_mut(parent)?.children.remove(index);
                self.nodes[survivor.index()] = None;
                survivor = prev;
                index -= 1;
            }
        }

        if let Some(&next) = self.node(parent)?.children.get(index + 1) {
            if let Some(next_text) = self.leaf_text(next).map(str::to_string) {
                if let NodeKind::Text(text) = &mut self.node_mut(survivor)?.kind {
                    text.push_str(&next_text);
                }
                self.node_mut(parent)?.children.remove(index + 1);
                self.nodes[next.index()] = None;
            }
        }

        self.dirty.insert(parent);
        Ok(survivor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> (DocumentTree, NodeId, NodeId) {
        let mut tree = DocumentTree::new("body");
        let p = tree.append_element(tree.root(), "p").unwrap();
        let leaf = tree.append_text(p, text).unwrap();
        (tree, p, leaf)
    }

    #[test]
    fn test_splice_mark_middle() {
        let (mut tree, p, leaf) = paragraph("The quick brown fox.");
        let mark = tree.splice_mark(leaf, 4, 15, "h1", "highlighted-text").unwrap();

        assert_eq!(tree.children(p).len(), 3);
        assert_eq!(tree.text_content(mark), "quick brown");
        assert_eq!(tree.text(), "The quick brown fox.");
        assert!(!tree.contains_node(leaf));
        assert_eq!(tree.find_mark("h1"), Some(mark));
    }

    #[test]
    fn test_splice_mark_whole_leaf_has_no_empty_pieces() {
        let (mut tree, p, leaf) = paragraph("fox");
        tree.splice_mark(leaf, 0, 3, "h1", "hl").unwrap();
        assert_eq!(tree.children(p).len(), 1);
    }

    #[test]
    fn test_splice_mark_multibyte() {
        let (mut tree, _, leaf) = paragraph("Olá, mundo");
        let mark = tree.splice_mark(leaf, 2, 5, "h1", "hl").unwrap();
        assert_eq!(tree.text_content(mark), "á, ");
        assert_eq!(tree.text(), "Olá, mundo");
    }

    #[test]
    fn test_splice_mark_rejects_out_of_bounds() {
        let (mut tree, _, leaf) = paragraph("abc");
        let err = tree.splice_mark(leaf, 1, 9, "h1", "hl").unwrap_err();
        assert!(matches!(err, TreeError::OffsetOutOfBounds { len: 3, .. }));
    }

    #[test]
    fn test_replace_and_merge_restores_single_leaf() {
        let (mut tree, p, leaf) = paragraph("The quick brown fox.");
        let mark = tree.splice_mark(leaf, 4, 9, "h1", "hl").unwrap();
        let restored = tree.replace_with_text(mark).unwrap().unwrap();
        let merged = tree.merge_adjacent_text(restored).unwrap();

        assert_eq!(tree.children(p), &[merged]);
        assert_eq!(tree.leaf_text(merged), Some("The quick brown fox."));
        assert_eq!(tree.find_mark("h1"), None);
    }

    #[test]
    fn test_detach_drops_marks_from_index() {
        let (mut tree, p, leaf) = paragraph("abc");
        let mark = tree.splice_mark(leaf, 0, 1, "h1", "hl").unwrap();
        tree.detach(mark).unwrap();

        assert_eq!(tree.find_mark("h1"), None);
        assert_eq!(tree.text(), "bc");
        assert_eq!(tree.children(p).len(), 1);
    }

    #[test]
    fn test_snapshot_roundtrip_keeps_structure() {
        let json = r#"{"type":"element","tag":"body","children":[
            {"type":"element","tag":"p","id":"intro","children":[{"type":"text","text":"Hello "},
            {"type":"mark","id":"h9","class":"hl","children":[{"type":"text","text":"world"}]}]}]}"#;
        let snapshot: DocNode = serde_json::from_str(json).unwrap();
        let tree = DocumentTree::from_snapshot(&snapshot).unwrap();

        assert_eq!(tree.text(), "Hello world");
        assert_eq!(tree.find_element("intro"), Some(NodeId(1)));
        assert_eq!(tree.find_mark("h9"), Some(NodeId(3)));

        let again = DocumentTree::from_snapshot(&tree.snapshot(tree.root()).unwrap()).unwrap();
        assert_eq!(again.text(), "Hello world");
    }

    #[test]
    fn test_take_dirty_reports_touched_parents() {
        let (mut tree, p, leaf) = paragraph("abc");
        tree.take_dirty();
        tree.splice_mark(leaf, 0, 1, "h1", "hl").unwrap();
        assert_eq!(tree.take_dirty(), vec![p]);
        assert!(tree.take_dirty().is_empty());
    }

    #[test]
    fn test_replace_empty_mark_removes_it() {
        let json = r#"{"type":"element","tag":"body","children":[
            {"type":"element","tag":"p","children":[
            {"type":"mark","id":"h1","class":"hl","children":[]}]}]}"#;
        let snapshot: DocNode = serde_json::from_str(json).unwrap();
        let mut tree = DocumentTree::from_snapshot(&snapshot).unwrap();
        let mark = tree.find_mark("h1").unwrap();

        assert_eq!(tree.replace_with_text(mark).unwrap(), None);
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.mark_count(), 0);
        assert!(tree.children(NodeId(1)).is_empty());
    }
}
