//! WASM build test
//!
//! Drives a `HighlightSession` through the JavaScript boundary.

#![cfg(target_arch = "wasm32")]

use marker_wasm::api::HighlightSession;
use marker_wasm::engine::EngineConfig;
use marker_wasm::models::{DocNode, NodeId};
use marker_wasm::text::{Selection, TextRange};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn page() -> JsValue {
    let snapshot = DocNode::Element {
        tag: "body".into(),
        id: None,
        node: None,
        children: vec![DocNode::Element {
            tag: "p".into(),
            id: None,
            node: None,
            children: vec![DocNode::Text {
                text: "The quick brown fox.".into(),
                node: None,
            }],
        }],
    };
    serde_wasm_bindgen::to_value(&snapshot).unwrap()
}

/// Selection over the paragraph's leaf (preorder id 2)
fn selection(start: usize, end: usize) -> JsValue {
    let ranges = Selection::single(TextRange::within(NodeId(2), start, end));
    serde_wasm_bindgen::to_value(&ranges).unwrap()
}

#[wasm_bindgen_test]
fn test_session_creation() {
    let session = HighlightSession::attach(page(), JsValue::UNDEFINED);
    assert!(session.is_ok());
}

#[wasm_bindgen_test]
fn test_bad_config_is_rejected() {
    let config = EngineConfig {
        mark_class: String::new(),
        ..EngineConfig::default()
    };
    let config = serde_wasm_bindgen::to_value(&config).unwrap();
    assert!(HighlightSession::attach(page(), config).is_err());
}

#[wasm_bindgen_test]
fn test_mark_and_export() {
    let mut session = HighlightSession::attach(page(), JsValue::UNDEFINED).unwrap();
    session.toggle().unwrap();
    assert!(session.is_armed());

    session.commit_selection(selection(4, 15)).unwrap();
    assert_eq!(session.mark_ids().length(), 1);
    assert_eq!(session.export_payload().unwrap(), "quick brown");
    assert_eq!(
        session.summary_request_body().unwrap(),
        r#"{"html":"quick brown"}"#
    );
    assert_eq!(session.document_text(), "The quick brown fox.");
}

#[wasm_bindgen_test]
fn test_export_without_marks_fails() {
    let mut session = HighlightSession::attach(page(), JsValue::UNDEFINED).unwrap();
    assert!(session.summary_request_body().is_err());
}

#[wasm_bindgen_test]
fn test_close_panel_reverts_marks() {
    let mut session = HighlightSession::attach(page(), JsValue::UNDEFINED).unwrap();
    session.toggle().unwrap();
    session.commit_selection(selection(0, 3)).unwrap();
    session.close_panel().unwrap();

    assert!(!session.is_armed());
    assert!(session.export_payload().is_err());
    assert_eq!(session.document_text(), "The quick brown fox.");
}
