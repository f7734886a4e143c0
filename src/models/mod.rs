//! Data models for the annotation engine
//!
//! This module contains the document tree the engine operates on and the
//! records it keeps about marked text.

pub mod annotation;
pub mod document;
pub mod node;

// Re-export commonly used types
pub use annotation::{Annotation, MarkupHandle, Segment};
pub use document::{DocNode, DocumentTree};
pub use node::{Node, NodeId, NodeKind};
