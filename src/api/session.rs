//! JavaScript-facing highlight session
//!
//! One `HighlightSession` per attached page. The glue mirrors the page into
//! a `DocNode` snapshot (node ids assigned in preorder), forwards gestures,
//! and patches the page from the dirty containers each call reports. The
//! summarize request itself is issued by the glue with the body built here.

use super::helpers::{deserialize, deserialize_or_default, serialize, to_js_error};
use super::types::{
    DirtyContainer, EditResult, MarkResult, RemoveResult, StatusInfo, SummaryResult, ToggleResult,
};
use crate::engine::{Engine, EngineConfig};
use crate::models::{DocNode, DocumentTree};
use crate::text::{Selection, StaticSelection, TextTree};
use crate::{wasm_info, wasm_warn};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct HighlightSession {
    engine: Engine<DocumentTree>,
}

impl HighlightSession {
    fn edit_result(&mut self) -> EditResult {
        let dirty_nodes = self.engine.tree_mut().take_dirty();
        let tree = self.engine.tree();
        let dirty = dirty_nodes
            .into_iter()
            .filter_map(|node| {
                let children = tree
                    .children(node)
                    .iter()
                    .map(|&child| tree.snapshot(child))
                    .collect::<Result<Vec<_>, _>>()
                    .ok()?;
                Some(DirtyContainer { node, children })
            })
            .collect();

        EditResult {
            dirty,
            status: StatusInfo::from(self.engine.status()),
            total: self.engine.annotations().len(),
        }
    }
}

#[wasm_bindgen]
impl HighlightSession {
    /// Attach to a document snapshot. `config` may be `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn attach(document: JsValue, config: JsValue) -> Result<HighlightSession, JsValue> {
        let snapshot: DocNode = deserialize(document, "Failed to deserialize document")?;
        let config: EngineConfig = deserialize_or_default(config, "Failed to deserialize config")?;

        let tree = DocumentTree::from_snapshot(&snapshot)
            .map_err(|e| to_js_error("Invalid document", e))?;
        let engine = Engine::attach(tree, config).map_err(|e| to_js_error("Attach failed", e))?;

        wasm_info!("Highlight session attached ({} leaves)", engine.tree().leaf_count());
        Ok(HighlightSession { engine })
    }

    /// Flip the pen
    pub fn toggle(&mut self) -> Result<JsValue, JsValue> {
        let pen = self.engine.toggle();
        serialize(
            &ToggleResult {
                pen,
                status: StatusInfo::from(self.engine.status()),
            },
            "Failed to serialize toggle result",
        )
    }

    #[wasm_bindgen(js_name = isArmed)]
    pub fn is_armed(&self) -> bool {
        self.engine.is_armed()
    }

    /// Handle a mouse-up; `ranges` is the list of selection ranges
    #[wasm_bindgen(js_name = commitSelection)]
    pub fn commit_selection(&mut self, ranges: JsValue) -> Result<JsValue, JsValue> {
        let selection: Selection = deserialize(ranges, "Failed to deserialize selection")?;
        let mut source = StaticSelection::new(selection);

        let outcome = self
            .engine
            .commit_selection(&mut source)
            .map_err(|e| to_js_error("Marking failed", e))?;
        if !outcome.skipped.is_empty() {
            wasm_warn!("{} segment(s) could not be marked", outcome.skipped.len());
        }

        let result = MarkResult {
            gate: outcome.gate,
            created: outcome.created,
            skipped: outcome.skipped,
            clear_selection: source.was_cleared(),
            edit: self.edit_result(),
        };
        serialize(&result, "Failed to serialize mark result")
    }

    /// Click on an existing mark
    #[wasm_bindgen(js_name = removeMark)]
    pub fn remove_mark(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let removal = self.engine.remove_mark(id);
        let result = RemoveResult {
            unwrapped: removal.unwrapped,
            edit: self.edit_result(),
        };
        serialize(&result, "Failed to serialize removal result")
    }

    #[wasm_bindgen(js_name = clearAll)]
    pub fn clear_all(&mut self) -> Result<JsValue, JsValue> {
        let removed = self.engine.clear_all();
        wasm_info!("Cleared {} marks", removed);
        serialize(&self.edit_result(), "Failed to serialize clear result")
    }

    /// Joined annotation text, or an error when nothing is marked
    #[wasm_bindgen(js_name = exportPayload)]
    pub fn export_payload(&self) -> Result<String, JsValue> {
        self.engine
            .export_payload()
            .map(|payload| payload.text)
            .map_err(|e| to_js_error("Export failed", e))
    }

    /// JSON body for the summarize request
    #[wasm_bindgen(js_name = summaryRequestBody)]
    pub fn summary_request_body(&mut self) -> Result<String, JsValue> {
        self.engine
            .prepare_summary()
            .and_then(|request| request.to_json())
            .map_err(|e| to_js_error("Export failed", e))
    }

    #[wasm_bindgen(js_name = summarizeEndpoint)]
    pub fn summarize_endpoint(&self) -> String {
        self.engine.config().summarize_endpoint.clone()
    }

    /// Interpret the service's reply body
    #[wasm_bindgen(js_name = applySummaryResponse)]
    pub fn apply_summary_response(&mut self, body: &str) -> Result<JsValue, JsValue> {
        let paragraphs = match self.engine.apply_summary_response(body) {
            Ok(summary) => summary.paragraphs(),
            Err(e) => {
                wasm_warn!("Summary reply rejected: {}", e);
                Vec::new()
            }
        };
        serialize(
            &SummaryResult {
                paragraphs,
                status: StatusInfo::from(self.engine.status()),
            },
            "Failed to serialize summary",
        )
    }

    /// The request could not be sent or completed
    #[wasm_bindgen(js_name = summaryFailed)]
    pub fn summary_failed(&mut self, message: &str) -> Result<JsValue, JsValue> {
        self.engine.summary_failed(message);
        serialize(
            &StatusInfo::from(self.engine.status()),
            "Failed to serialize status",
        )
    }

    /// Current annotations in creation order
    pub fn annotations(&self) -> Result<JsValue, JsValue> {
        let annotations: Vec<_> = self.engine.annotations().iter().cloned().collect();
        serialize(&annotations, "Failed to serialize annotations")
    }

    /// Ids of the current marks in creation order
    #[wasm_bindgen(js_name = markIds)]
    pub fn mark_ids(&self) -> js_sys::Array {
        let ids = js_sys::Array::new();
        for annotation in self.engine.annotations().iter() {
            ids.push(&JsValue::from_str(&annotation.id));
        }
        ids
    }

    /// Revert every mark and detach
    #[wasm_bindgen(js_name = closePanel)]
    pub fn close_panel(&mut self) -> Result<JsValue, JsValue> {
        self.engine.close_panel();
        serialize(&self.edit_result(), "Failed to serialize close result")
    }

    #[wasm_bindgen(js_name = documentText)]
    pub fn document_text(&self) -> String {
        self.engine.tree().text()
    }
}
