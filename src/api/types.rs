//! Shared types for the WASM API
//!
//! Every mutating call reports the containers whose children changed so the
//! glue can patch just those parts of the live page.

use crate::engine::{PanelStatus, PenState, SelectionGate, SkippedSegment};
use crate::models::{DocNode, NodeId};

/// A container whose child list changed, with its new children
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct DirtyContainer {
    pub node: NodeId,
    pub children: Vec<DocNode>,
}

/// Panel status, both structured and as display text
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct StatusInfo {
    pub status: PanelStatus,
    pub message: String,
}

impl From<&PanelStatus> for StatusInfo {
    fn from(status: &PanelStatus) -> Self {
        Self {
            status: status.clone(),
            message: status.to_string(),
        }
    }
}

/// Result of an edit operation (mutation primitive)
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct EditResult {
    pub dirty: Vec<DirtyContainer>,
    pub status: StatusInfo,
    pub total: usize,
}

/// Result of a committed selection
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct MarkResult {
    pub gate: SelectionGate,
    pub created: Vec<String>,
    pub skipped: Vec<SkippedSegment>,
    /// The glue must drop the native selection
    pub clear_selection: bool,
    pub edit: EditResult,
}

/// Result of a single removal
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct RemoveResult {
    pub unwrapped: usize,
    pub edit: EditResult,
}

/// Result of the pen toggle
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct ToggleResult {
    pub pen: PenState,
    pub status: StatusInfo,
}

/// Summary reply split for display
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct SummaryResult {
    pub paragraphs: Vec<String>,
    pub status: StatusInfo,
}
