//! Document fixtures: editor states and serialized block arrays.

use quillpad_core::document::{Block, BlockKind, DocNode, EditorState, ListType, blocks_to_json};

/// Heading plus paragraph, as a serialized block array.
pub const HEADING_AND_PARAGRAPH: &str =
    r#"[{"kind":"heading","content":"Title"},{"kind":"paragraph","content":"Body text"}]"#;

/// An editor state exercising every extractor rule.
pub fn sample_editor_state() -> EditorState {
    EditorState::new(vec![
        DocNode::heading("Release notes"),
        DocNode::paragraph(""),
        DocNode::paragraph("This release reworks caching."),
        DocNode::list(ListType::Number, &["Faster", "Smaller"]),
        DocNode::collapsible("Details", &["line1", "line2"]),
        DocNode::quote(&["first", "second"]),
        DocNode::element("code", vec![DocNode::text("cargo test")]),
        DocNode::element("poll", vec![DocNode::text("ignored")]),
    ])
}

/// `count` top-level paragraphs of `width` characters each.
pub fn wide_document(count: usize, width: usize) -> Vec<Block> {
    (0..count)
        .map(|i| {
            let ch = char::from(b'a' + u8::try_from(i % 26).unwrap_or(0));
            Block::leaf(BlockKind::Paragraph, ch.to_string().repeat(width))
        })
        .collect()
}

/// [`wide_document`] serialized.
pub fn wide_document_json(count: usize, width: usize) -> String {
    blocks_to_json(&wide_document(count, width)).expect("blocks always serialize")
}
