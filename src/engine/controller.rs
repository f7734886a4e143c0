//! Selection controller
//!
//! The pen toggle. Only an armed controller lets a committed selection
//! through, and never one that starts or ends inside the panel subtree.

use crate::models::NodeId;
use crate::text::{Selection, TextTree};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum PenState {
    #[default]
    Disarmed = 0,
    Armed = 1,
}

/// Why a committed selection was or was not processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionGate {
    Accepted,
    Disarmed,
    /// Nothing selected; not an error
    Collapsed,
    InsidePanel,
    /// The panel was closed and the engine torn down
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: PenState,
    excluded_root: Option<NodeId>,
}

impl SelectionController {
    pub fn new(excluded_root: Option<NodeId>) -> Self {
        Self {
            state: PenState::Disarmed,
            excluded_root,
        }
    }

    pub fn state(&self) -> PenState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == PenState::Armed
    }

    /// Flip between armed and disarmed
    pub fn toggle(&mut self) -> PenState {
        self.state = match self.state {
            PenState::Disarmed => PenState::Armed,
            PenState::Armed => PenState::Disarmed,
        };
        log::info!("Pen {:?}", self.state);
        self.state
    }

    pub fn disarm(&mut self) {
        self.state = PenState::Disarmed;
    }

    /// Decide whether `selection` should be decomposed and marked
    pub fn gate<T: TextTree + ?Sized>(&self, tree: &T, selection: &Selection) -> SelectionGate {
        if !self.is_armed() {
            return SelectionGate::Disarmed;
        }
        if selection.is_collapsed() {
            return SelectionGate::Collapsed;
        }
        if let Some(panel) = self.excluded_root {
            let inside = |anchor: Option<crate::text::Anchor>| {
                anchor.is_some_and(|a| tree.is_ancestor(panel, a.node))
            };
            if inside(selection.anchor()) || inside(selection.focus()) {
                return SelectionGate::InsidePanel;
            }
        }
        SelectionGate::Accepted
    }
}
