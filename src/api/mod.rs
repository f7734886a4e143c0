//! Highlighter WASM API
//!
//! The JavaScript-facing surface of the engine. The glue owns the live page
//! and the network; this side owns the document mirror and every decision.
//!
//! # Module Structure
//!
//! - `helpers`: console logging macros, serde conversion, error conversion
//! - `types`: result objects returned to JavaScript
//! - `session`: the `HighlightSession` handle

pub mod helpers;
pub mod types;
pub mod session;

pub use session::HighlightSession;
