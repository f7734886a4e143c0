//! Document nodes
//!
//! A node is an element (plain container), a text leaf, or a mark: the
//! highlight wrapper the engine inserts around a selected slice of text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside a `DocumentTree` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Container element (`p`, `div`, ...). `element_id` mirrors the HTML `id` attribute.
    Element {
        tag: String,
        element_id: Option<String>,
    },
    /// Text-bearing leaf
    Text(String),
    /// Highlight wrapper inserted by the engine
    Mark { id: String, class: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn element(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                element_id: None,
            },
            parent,
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
            parent,
            children: Vec::new(),
        }
    }

    pub fn mark(id: &str, class: &str, parent: Option<NodeId>) -> Self {
        Self {
            kind: NodeKind::Mark {
                id: id.to_string(),
                class: class.to_string(),
            },
            parent,
            children: Vec::new(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Text of a leaf, `None` for elements and marks
    pub fn text_value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn mark_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Mark { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn element_id(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { element_id, .. } => element_id.as_deref(),
            _ => None,
        }
    }
}
