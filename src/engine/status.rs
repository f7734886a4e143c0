//! Panel status messages
//!
//! One status per gesture, shown by the glue in the panel's output area.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelStatus {
    Idle,
    PenEnabled,
    PenDisabled,
    Marked { total: usize },
    Removed { remaining: usize },
    Cleared,
    NothingMarked,
    Generating,
    Summarized,
    UnexpectedResponse,
    ConnectionError { message: String },
    Closed,
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelStatus::Idle => write!(f, "No text marked."),
            PanelStatus::PenEnabled => write!(f, "Pen enabled. Select text."),
            PanelStatus::PenDisabled => write!(f, "Pen disabled."),
            PanelStatus::Marked { total } => write!(f, "Text marked! Total: {} passages.", total),
            PanelStatus::Removed { remaining } => {
                write!(f, "Mark removed! {} passages remaining.", remaining)
            }
            PanelStatus::Cleared => write!(f, "All marks were removed."),
            PanelStatus::NothingMarked => write!(f, "No text marked!"),
            PanelStatus::Generating => write!(f, "Generating summary..."),
            PanelStatus::Summarized => write!(f, "Summary ready."),
            PanelStatus::UnexpectedResponse => write!(f, "Error: unexpected server response."),
            PanelStatus::ConnectionError { message } => write!(f, "Connection error: {}", message),
            PanelStatus::Closed => write!(f, "Panel closed."),
        }
    }
}
