//! Engine state management
//!
//! `Engine` is the per-document context every gesture runs against: the
//! document tree, the pen toggle, the annotation registry and the panel
//! status. Nothing is global; attaching to a second document creates a
//! second engine.
//!
//! The registry and the markup are kept in step: a mark exists in the tree
//! exactly when its annotation is registered, except in the middle of a
//! single operation.

use super::config::EngineConfig;
use super::controller::{PenState, SelectionController, SelectionGate};
use super::export::{ExportPayload, Summarizer, Summary, SummaryRequest};
use super::ids::MarkIdGenerator;
use super::status::PanelStatus;
use crate::errors::{EngineError, ExportError, MarkupError};
use crate::models::{Annotation, DocumentTree, MarkupHandle, Segment};
use crate::text::{
    decompose, AnnotationRegistry, MarkupSynchronizer, MarkupTree, Selection, SelectionSource,
    TextTree,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// A segment that could not be marked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSegment {
    pub segment: Segment,
    pub reason: String,
}

/// Result of committing a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkOutcome {
    pub gate: SelectionGate,
    /// Ids of the annotations created, in creation order
    pub created: Vec<String>,
    pub skipped: Vec<SkippedSegment>,
    /// Whether the native selection was cleared
    pub selection_cleared: bool,
}

impl MarkOutcome {
    fn ignored(gate: SelectionGate) -> Self {
        Self {
            gate,
            created: Vec::new(),
            skipped: Vec::new(),
            selection_cleared: false,
        }
    }
}

/// Result of removing a single mark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    /// Mark nodes actually reverted in the document (0 or 1)
    pub unwrapped: usize,
    /// Whether a registry entry was dropped
    pub unregistered: bool,
    pub remaining: usize,
}

pub struct Engine<T: MarkupTree = DocumentTree> {
    tree: T,
    config: EngineConfig,
    controller: SelectionController,
    registry: AnnotationRegistry,
    markup: MarkupSynchronizer,
    ids: MarkIdGenerator,
    panel_open: bool,
    status: PanelStatus,
}

impl<T: MarkupTree> Engine<T> {
    /// Attach to a document.
    ///
    /// Marks already present in the tree are adopted into the registry in
    /// document order.
    pub fn attach(tree: T, config: EngineConfig) -> Result<Self, EngineError> {
        let config = config.validate()?;
        let excluded_root = config
            .panel_element_id
            .as_deref()
            .and_then(|id| tree.find_element(id));
        if excluded_root.is_none() && config.panel_element_id.is_some() {
            log::debug!("No panel element in document; every selection is eligible");
        }

        let mut engine = Self {
            controller: SelectionController::new(excluded_root),
            registry: AnnotationRegistry::new(),
            markup: MarkupSynchronizer::new(config.mark_class.clone()),
            ids: MarkIdGenerator::new(&config.id_prefix, config.id_strategy),
            panel_open: true,
            status: PanelStatus::Idle,
            tree,
            config,
        };
        engine.adopt_existing_marks()?;
        log::info!("Engine attached ({} existing marks)", engine.registry.len());
        Ok(engine)
    }

    fn adopt_existing_marks(&mut self) -> Result<(), EngineError> {
        for mark in self.tree.marks(self.tree.root()) {
            let Some(id) = self.tree.mark_id(mark).map(str::to_string) else {
                continue;
            };
            let text = self.tree.text_content(mark);
            let leaf = self.tree.text_leaves(mark).first().copied().unwrap_or(mark);
            let segment = Segment::new(leaf, 0, text.chars().count());
            self.registry.add(Annotation::new(id, text, segment))?;
        }
        Ok(())
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Mutable access for changes made outside the engine
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn into_tree(self) -> T {
        self.tree
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn annotations(&self) -> &AnnotationRegistry {
        &self.registry
    }

    pub fn status(&self) -> &PanelStatus {
        &self.status
    }

    pub fn pen_state(&self) -> PenState {
        self.controller.state()
    }

    pub fn is_armed(&self) -> bool {
        self.controller.is_armed()
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Flip the pen
    pub fn toggle(&mut self) -> PenState {
        if !self.panel_open {
            return self.controller.state();
        }
        let state = self.controller.toggle();
        self.status = match state {
            PenState::Armed => PanelStatus::PenEnabled,
            PenState::Disarmed => PanelStatus::PenDisabled,
        };
        state
    }

    /// Handle a committed selection (mouse-up).
    ///
    /// Ignored unless the pen is armed, the selection is not collapsed and it
    /// does not touch the panel. Once processed, the selection is cleared
    /// whatever the outcome.
    pub fn commit_selection<S: SelectionSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<MarkOutcome, EngineError> {
        if !self.panel_open {
            return Ok(MarkOutcome::ignored(SelectionGate::Closed));
        }

        let selection = source.selection();
        let gate = self.controller.gate(&self.tree, &selection);
        if gate != SelectionGate::Accepted {
            log::debug!("Selection ignored: {:?}", gate);
            return Ok(MarkOutcome::ignored(gate));
        }

        let result = self.mark_selection(&selection);
        source.clear();
        result.map(|mut outcome| {
            outcome.selection_cleared = true;
            outcome
        })
    }

    /// Decompose `selection` and mark every segment that can be wrapped.
    ///
    /// Segments that cannot be wrapped are skipped and reported; the rest of
    /// the batch still goes through.
    pub fn mark_selection(&mut self, selection: &Selection) -> Result<MarkOutcome, EngineError> {
        let mut pending: VecDeque<Segment> = decompose(&self.tree, selection).into();
        let mut outcome = MarkOutcome::ignored(SelectionGate::Accepted);

        while let Some(segment) = pending.pop_front() {
            let id = {
                let tree = &self.tree;
                let registry = &self.registry;
                self.ids.next_id(|candidate| {
                    tree.find_mark(candidate).is_some() || registry.contains(candidate)
                })
            };

            let annotation = match self.markup.wrap(&mut self.tree, &segment, &id) {
                Ok(annotation) => annotation,
                Err(e) => {
                    log::warn!("Skipping segment {:?}: {}", segment, e);
                    outcome.skipped.push(SkippedSegment {
                        segment,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(e) = self.registry.add(annotation.clone()) {
                log::error!("Registry rejected '{}': {}", annotation.id, e);
                if let Err(undo) = self.markup.unwrap(&mut self.tree, &annotation) {
                    log::error!("Could not revert mark '{}': {}", annotation.id, undo);
                }
                return Err(e.into());
            }

            // Later segments on the split leaf follow it onto its pieces
            for later in pending.iter_mut() {
                *later = self.markup.rebase(&self.tree, &segment, &annotation.id, *later);
            }
            outcome.created.push(annotation.id);
        }

        if !outcome.created.is_empty() {
            self.status = PanelStatus::Marked {
                total: self.registry.len(),
            };
        }
        log::info!(
            "Marked {} segment(s), skipped {}",
            outcome.created.len(),
            outcome.skipped.len()
        );
        Ok(outcome)
    }

    /// Remove one mark (click on an existing mark). Works armed or disarmed.
    ///
    /// The registry entry is dropped even when the mark is already gone from
    /// the document. Marks nested inside the removed one disappear with it
    /// and lose their entries too.
    pub fn remove_mark(&mut self, id: &str) -> Removal {
        if !self.panel_open {
            return Removal {
                unwrapped: 0,
                unregistered: false,
                remaining: self.registry.len(),
            };
        }

        let handle = self
            .registry
            .get(id)
            .map(|a| a.markup.clone())
            .unwrap_or_else(|| MarkupHandle::new(id));
        let nested: Vec<String> = handle
            .resolve(&self.tree)
            .map(|mark| {
                self.tree
                    .marks(mark)
                    .into_iter()
                    .filter(|&m| m != mark)
                    .filter_map(|m| self.tree.mark_id(m).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let unwrapped = match self.markup.unwrap_handle(&mut self.tree, &handle) {
            Ok(()) => {
                for inner in &nested {
                    if self.registry.remove_by_id(inner).is_some() {
                        log::warn!("Mark '{}' was nested in '{}' and went with it", inner, id);
                    }
                }
                1
            }
            Err(MarkupError::StaleReference(_)) => {
                log::warn!("Mark '{}' was already gone from the document", id);
                0
            }
            Err(e) => {
                log::error!("Failed to remove mark '{}': {}", id, e);
                0
            }
        };
        let unregistered = self.registry.remove_by_id(id).is_some();

        let remaining = self.registry.len();
        if unwrapped > 0 || unregistered {
            self.status = PanelStatus::Removed { remaining };
        }
        Removal {
            unwrapped,
            unregistered,
            remaining,
        }
    }

    /// Remove every mark, newest first. Returns how many marks were reverted.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.markup.unwrap_all(&mut self.tree, self.registry.iter());
        let dropped = self.registry.remove_all().len();
        if dropped != removed {
            log::warn!("{} registry entries had no mark left", dropped - removed);
        }
        if self.panel_open {
            self.status = PanelStatus::Cleared;
        }
        removed
    }

    /// Snapshot the registry into the summarize payload
    pub fn export_payload(&self) -> Result<ExportPayload, ExportError> {
        ExportPayload::new(
            &self.registry.snapshot_all_text(),
            &self.config.separator,
            &self.config.summarize_endpoint,
        )
    }

    /// Summarize the current annotations.
    ///
    /// The summarizer is not called when nothing is marked. Failures only
    /// change the panel status, never the annotations.
    pub fn summarize<S: Summarizer + ?Sized>(&mut self, summarizer: &S) -> Result<Summary, ExportError> {
        let request = self.prepare_summary()?;
        let result = summarizer.summarize(&request);
        self.record_summary(result)
    }

    /// Build the request for a summary sent by the glue.
    ///
    /// Marks the panel as generating, or as nothing-marked when the registry
    /// is empty.
    pub fn prepare_summary(&mut self) -> Result<SummaryRequest, ExportError> {
        match self.export_payload() {
            Ok(payload) => {
                self.status = PanelStatus::Generating;
                Ok(payload.request())
            }
            Err(e) => {
                self.status = PanelStatus::NothingMarked;
                Err(e)
            }
        }
    }

    /// Interpret a reply that arrived asynchronously through the glue
    pub fn apply_summary_response(&mut self, body: &str) -> Result<Summary, ExportError> {
        self.record_summary(Summary::from_response(body))
    }

    /// Record a request failure reported by the glue
    pub fn summary_failed(&mut self, message: &str) {
        self.status = PanelStatus::ConnectionError {
            message: message.to_string(),
        };
    }

    fn record_summary(&mut self, result: Result<Summary, ExportError>) -> Result<Summary, ExportError> {
        self.status = match &result {
            Ok(_) => PanelStatus::Summarized,
            Err(ExportError::Transport(message)) => PanelStatus::ConnectionError {
                message: message.clone(),
            },
            Err(ExportError::NothingMarked) => PanelStatus::NothingMarked,
            Err(_) => PanelStatus::UnexpectedResponse,
        };
        if let Err(e) = &result {
            log::warn!("Summary failed: {}", e);
        }
        result
    }

    /// Tear down: revert every mark, disarm, and close the panel.
    /// Safe to call repeatedly.
    pub fn close_panel(&mut self) -> usize {
        let removed = self.clear_all();
        self.controller.disarm();
        self.panel_open = false;
        self.status = PanelStatus::Closed;
        log::info!("Engine detached, {} marks reverted", removed);
        removed
    }

    /// Registry ids and mark ids in the document are the same set
    pub fn is_consistent(&self) -> bool {
        let in_tree: BTreeSet<&str> = self
            .tree
            .marks(self.tree.root())
            .into_iter()
            .filter_map(|m| self.tree.mark_id(m))
            .collect();
        let in_registry: BTreeSet<&str> = self.registry.iter().map(|a| a.id.as_str()).collect();
        in_tree == in_registry
    }
}
