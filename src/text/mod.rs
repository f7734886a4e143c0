//! Annotation core
//!
//! Everything that turns a user selection into marks and back, with no
//! knowledge of panels, buttons or the summarization service.
//!
//! ## Modules
//!
//! - `tree`: document text model traits (traversal and splice primitives)
//! - `selection`: boundary points, ranges and the selection source
//! - `decompose`: range decomposition into leaf-bounded segments
//! - `markup`: applying and reverting mark nodes
//! - `annotations`: the annotation registry

pub mod annotations;
pub mod decompose;
pub mod markup;
pub mod selection;
pub mod tree;

// Re-exports for convenience
pub use annotations::AnnotationRegistry;
pub use decompose::{decompose, decompose_range};
pub use markup::MarkupSynchronizer;
pub use selection::{Anchor, Selection, SelectionSource, StaticSelection, TextRange};
pub use tree::{MarkupTree, TextTree};
