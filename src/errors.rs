//! Error types for the annotation engine
//!
//! Tree errors come from the document model itself. Markup and registry
//! errors describe the engine's own failure modes: a `WrapConflict` or
//! `StaleReference` is recoverable and only skips one item, while a
//! `DuplicateId` indicates a bug in id generation.

use crate::models::NodeId;
use thiserror::Error;

/// Structural errors raised by a document tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Node {0} is not a text leaf")]
    NotText(NodeId),

    #[error("Node {0} cannot hold children")]
    NotContainer(NodeId),

    #[error("Node {0} is not a mark")]
    NotMark(NodeId),

    #[error("Node {0} has no parent")]
    Detached(NodeId),

    #[error("Offsets {start}..{end} out of bounds for node {node} (length {len})")]
    OffsetOutOfBounds {
        node: NodeId,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Mark id '{0}' is already present in the document")]
    DuplicateMark(String),
}

/// Failures of the markup synchronizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// The segment's leaf was consumed by an earlier wrap, or already sits inside a mark
    #[error("Leaf {leaf} is already marked or was consumed by an earlier wrap")]
    WrapConflict { leaf: NodeId },

    /// The mark behind an annotation is gone from the document
    #[error("Mark '{0}' no longer exists in the document")]
    StaleReference(String),

    #[error("Segment {start}..{end} is empty or exceeds leaf {leaf}")]
    InvalidSegment {
        leaf: NodeId,
        start: usize,
        end: usize,
    },

    #[error("Document error: {0}")]
    Tree(#[from] TreeError),
}

/// Registry bookkeeping errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Annotation id '{0}' is already registered")]
    DuplicateId(String),
}

/// Failures on the export / summarize path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("Nothing marked")]
    NothingMarked,

    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Unexpected server response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Serialization(e.to_string())
    }
}

/// Top-level engine error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),
}
