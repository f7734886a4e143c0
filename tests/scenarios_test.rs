// End-to-end highlight sessions against an in-memory document

use marker_wasm::engine::{
    Engine, EngineConfig, PanelStatus, SelectionGate, Summarizer, Summary, SummaryRequest,
};
use marker_wasm::errors::{ExportError, MarkupError};
use marker_wasm::models::{DocNode, DocumentTree, NodeId};
use marker_wasm::text::{
    Anchor, MarkupSynchronizer, MarkupTree, Selection, StaticSelection, TextRange, TextTree,
};
use std::cell::Cell;

/// `<body><p>{text}</p></body>`, returning the paragraph's only leaf
fn single_paragraph(text: &str) -> (DocumentTree, NodeId) {
    let mut tree = DocumentTree::new("body");
    let p = tree.append_element(tree.root(), "p").unwrap();
    let leaf = tree.append_text(p, text).unwrap();
    (tree, leaf)
}

/// Leaf of the tree whose text is exactly `text`
fn leaf_with_text(tree: &DocumentTree, text: &str) -> NodeId {
    tree.text_leaves(tree.root())
        .into_iter()
        .find(|&leaf| tree.leaf_text(leaf) == Some(text))
        .unwrap()
}

struct CountingSummarizer {
    calls: Cell<usize>,
}

impl Summarizer for CountingSummarizer {
    fn summarize(&self, request: &SummaryRequest) -> Result<Summary, ExportError> {
        self.calls.set(self.calls.get() + 1);
        Ok(Summary {
            text: request.html.clone(),
        })
    }
}

#[test]
fn test_select_phrase_creates_one_annotation() {
    let (tree, leaf) = single_paragraph("The quick brown fox.");
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();
    engine.toggle();

    let mut source = StaticSelection::new(Selection::single(TextRange::within(leaf, 4, 15)));
    let outcome = engine.commit_selection(&mut source).unwrap();

    assert_eq!(outcome.gate, SelectionGate::Accepted);
    assert_eq!(outcome.created.len(), 1);
    assert!(outcome.skipped.is_empty());
    assert_eq!(engine.annotations().len(), 1);
    assert_eq!(engine.annotations().snapshot_all_text(), vec!["quick brown"]);
    assert_eq!(engine.tree().text(), "The quick brown fox.");
    assert_eq!(engine.tree().mark_count(), 1);
}

#[test]
fn test_clear_all_restores_text_exactly() {
    let (tree, leaf) = single_paragraph("The quick brown fox.");
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();

    engine
        .mark_selection(&Selection::single(TextRange::within(leaf, 0, 3)))
        .unwrap();
    let rest = leaf_with_text(engine.tree(), " quick brown fox.");
    engine
        .mark_selection(&Selection::single(TextRange::within(rest, 13, 16)))
        .unwrap();
    assert_eq!(engine.annotations().snapshot_all_text(), vec!["The", "fox"]);

    assert_eq!(engine.clear_all(), 2);
    assert!(engine.annotations().is_empty());
    assert_eq!(engine.tree().mark_count(), 0);
    assert_eq!(engine.tree().text(), "The quick brown fox.");
    assert_eq!(engine.tree().leaf_count(), 1);
    assert_eq!(engine.status(), &PanelStatus::Cleared);
}

#[test]
fn test_remove_after_external_deletion_drops_entry() {
    let (tree, leaf) = single_paragraph("The quick brown fox.");
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();
    let outcome = engine
        .mark_selection(&Selection::single(TextRange::within(leaf, 4, 9)))
        .unwrap();
    let id = outcome.created[0].clone();

    let mark = engine.tree().find_mark(&id).unwrap();
    engine.tree_mut().detach(mark).unwrap();

    let removal = engine.remove_mark(&id);
    assert_eq!(removal.unwrapped, 0);
    assert!(removal.unregistered);
    assert_eq!(removal.remaining, 0);
    assert!(engine.annotations().is_empty());
    assert_eq!(engine.tree().text(), "The  brown fox.");
}

#[test]
fn test_export_with_nothing_marked_skips_summarizer() {
    let (tree, _) = single_paragraph("The quick brown fox.");
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();
    let summarizer = CountingSummarizer {
        calls: Cell::new(0),
    };

    let result = engine.summarize(&summarizer);
    assert_eq!(result, Err(ExportError::NothingMarked));
    assert_eq!(summarizer.calls.get(), 0);
    assert_eq!(engine.status(), &PanelStatus::NothingMarked);
}

#[test]
fn test_export_joins_annotations_in_creation_order() {
    let (tree, leaf) = single_paragraph("The quick brown fox.");
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();

    // Mark the later word first
    engine
        .mark_selection(&Selection::single(TextRange::within(leaf, 16, 19)))
        .unwrap();
    let head = leaf_with_text(engine.tree(), "The quick brown ");
    engine
        .mark_selection(&Selection::single(TextRange::within(head, 0, 3)))
        .unwrap();

    let summarizer = CountingSummarizer {
        calls: Cell::new(0),
    };
    let summary = engine.summarize(&summarizer).unwrap();
    assert_eq!(summarizer.calls.get(), 1);
    assert_eq!(summary.text, "fox\nThe");
    assert_eq!(engine.status(), &PanelStatus::Summarized);
}

#[test]
fn test_selection_across_paragraphs_marks_each_piece() {
    let mut tree = DocumentTree::new("body");
    let first = tree.append_element(tree.root(), "p").unwrap();
    let a = tree.append_text(first, "The quick ").unwrap();
    let second = tree.append_element(tree.root(), "p").unwrap();
    let b = tree.append_text(second, "brown fox.").unwrap();

    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();
    let selection = Selection::single(TextRange::new(Anchor::new(a, 4), Anchor::new(b, 5)));
    let outcome = engine.mark_selection(&selection).unwrap();

    assert_eq!(outcome.created.len(), 2);
    assert_eq!(
        engine.annotations().snapshot_all_text(),
        vec!["quick ", "brown"]
    );
    assert!(engine.is_consistent());
}

#[test]
fn test_second_unwrap_is_stale() {
    let (mut tree, leaf) = single_paragraph("The quick brown fox.");
    let markup = MarkupSynchronizer::new("highlighted-text");
    let annotation = markup
        .wrap(&mut tree, &marker_wasm::models::Segment::new(leaf, 4, 9), "h1")
        .unwrap();

    markup.unwrap(&mut tree, &annotation).unwrap();
    let second = markup.unwrap(&mut tree, &annotation);
    assert_eq!(second, Err(MarkupError::StaleReference("h1".into())));
    assert_eq!(tree.text(), "The quick brown fox.");
}

#[test]
fn test_snapshot_attach_and_report() {
    let snapshot: DocNode = serde_json::from_value(serde_json::json!({
        "type": "element",
        "tag": "body",
        "children": [
            {"type": "element", "tag": "p", "children": [
                {"type": "text", "text": "Already "},
                {"type": "mark", "id": "h1", "class": "highlighted-text", "children": [
                    {"type": "text", "text": "marked"}
                ]},
                {"type": "text", "text": " words."}
            ]},
            {"type": "element", "tag": "div", "id": "resumo-panel", "children": [
                {"type": "text", "text": "Summary"}
            ]}
        ]
    }))
    .unwrap();

    let tree = DocumentTree::from_snapshot(&snapshot).unwrap();
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();
    assert_eq!(engine.annotations().text_of("h1"), Some("marked"));

    engine.toggle();
    let tail = leaf_with_text(engine.tree(), " words.");
    let mut source = StaticSelection::new(Selection::single(TextRange::within(tail, 1, 6)));
    let outcome = engine.commit_selection(&mut source).unwrap();
    assert_eq!(outcome.created, vec!["h2"]);

    let dirty = engine.tree_mut().take_dirty();
    assert_eq!(dirty.len(), 1);
    assert!(engine.tree_mut().take_dirty().is_empty());

    assert_eq!(engine.close_panel(), 2);
    assert_eq!(engine.tree().text(), "Already marked words.Summary");
}

#[test]
fn test_two_ranges_in_one_leaf_mark_both() {
    let (tree, leaf) = single_paragraph("The quick brown fox.");
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();
    engine.toggle();

    let mut source = StaticSelection::new(Selection::new(vec![
        TextRange::within(leaf, 0, 3),
        TextRange::within(leaf, 16, 19),
    ]));
    let outcome = engine.commit_selection(&mut source).unwrap();

    assert_eq!(outcome.created.len(), 2);
    assert!(outcome.skipped.is_empty());
    assert_eq!(engine.annotations().snapshot_all_text(), vec!["The", "fox"]);
    assert!(engine.is_consistent());
}

#[test]
fn test_removing_adopted_outer_mark_keeps_registry_in_step() {
    let snapshot: DocNode = serde_json::from_value(serde_json::json!({
        "type": "element",
        "tag": "body",
        "children": [
            {"type": "element", "tag": "p", "children": [
                {"type": "mark", "id": "a", "class": "highlighted-text", "children": [
                    {"type": "text", "text": "x "},
                    {"type": "mark", "id": "b", "class": "highlighted-text", "children": [
                        {"type": "text", "text": "y"}
                    ]}
                ]}
            ]}
        ]
    }))
    .unwrap();

    let tree = DocumentTree::from_snapshot(&snapshot).unwrap();
    let mut engine = Engine::attach(tree, EngineConfig::default()).unwrap();
    assert_eq!(engine.annotations().snapshot_all_text(), vec!["x y", "y"]);

    let removal = engine.remove_mark("a");
    assert_eq!(removal.unwrapped, 1);
    assert_eq!(removal.remaining, 0);
    assert!(engine.annotations().is_empty());
    assert!(engine.is_consistent());
    assert_eq!(engine.tree().text(), "x y");
}
