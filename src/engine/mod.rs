//! Highlight engine
//!
//! Ties the annotation core to the gestures of the panel: the pen toggle,
//! committed selections, click-to-remove, clear-all, export and teardown.
//!
//! # Module Structure
//!
//! - `state`: the per-document `Engine` context
//! - `controller`: armed/disarmed gate for committed selections
//! - `config`: engine configuration
//! - `ids`: mark id generation
//! - `export`: summarize payload, wire format and reply parsing
//! - `status`: panel status messages

pub mod config;
pub mod controller;
pub mod export;
pub mod ids;
pub mod state;
pub mod status;

pub use config::{EngineConfig, IdStrategy};
pub use controller::{PenState, SelectionController, SelectionGate};
pub use export::{ExportPayload, Summarizer, Summary, SummaryRequest};
pub use state::{Engine, MarkOutcome, Removal, SkippedSegment};
pub use status::PanelStatus;
