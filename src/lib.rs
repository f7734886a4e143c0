//! Text Highlighter WASM Module
//!
//! Lets a reader mark arbitrary spans of a rendered document, keeps an
//! ordered registry of what was marked, and hands the joined text to a
//! summarizing service.

pub mod api;
pub mod engine;
pub mod errors;
pub mod models;
pub mod text;

// Re-export commonly used types
pub use engine::{Engine, EngineConfig, PanelStatus, PenState};
pub use errors::{EngineError, ExportError, MarkupError, RegistryError, TreeError};
pub use models::{Annotation, DocNode, DocumentTree, MarkupHandle, NodeId, Segment};
pub use text::{AnnotationRegistry, MarkupSynchronizer, Selection, TextRange};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if console_log::init_with_level(log::Level::Debug).is_err() {
            crate::wasm_warn!("Logger already initialized");
        }
    }

    log::info!("Text highlighter WASM module initialized");
}
