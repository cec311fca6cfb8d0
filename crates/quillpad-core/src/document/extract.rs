//! Tree extraction: live editor document to [`Block`] values.
//!
//! Only the root's direct children are dispatched on; lists, collapsibles and
//! quotes are the only kinds recursed into. A child that fails inspection is
//! logged and skipped, never aborting the walk. The document is only read.

use tracing::{debug, warn};

use super::block::{Block, BlockKind, ListType, blocks_to_json};
use super::editor::{EditorNode, NodeError, NodeType};

/// Extract the top-level blocks of a document.
pub fn extract_blocks(root: &dyn EditorNode) -> Vec<Block> {
    let children = match root.children() {
        Ok(children) => children,
        Err(e) => {
            warn!(error = %e, "failed to read document root");
            return Vec::new();
        }
    };

    let mut blocks = Vec::with_capacity(children.len());
    for (index, node) in children.into_iter().enumerate() {
        match extract_node(node) {
            Ok(Some(block)) => blocks.push(block),
            Ok(None) => {}
            Err(e) => warn!(index, error = %e, "skipping node that failed extraction"),
        }
    }

    debug!(blocks = blocks.len(), "document extracted");
    blocks
}

/// Extract a document and serialize it for transport to the pipeline.
pub fn extract_json(root: &dyn EditorNode) -> Result<String, serde_json::Error> {
    blocks_to_json(&extract_blocks(root))
}

fn extract_node(node: &dyn EditorNode) -> Result<Option<Block>, NodeError> {
    let block = match node.node_type() {
        NodeType::Heading => Block::leaf(BlockKind::Heading, node.text_content()?),
        NodeType::Table => Block::leaf(BlockKind::Table, node.text_content()?),
        NodeType::List => Block::with_children(BlockKind::List, "", extract_list(node)?),
        NodeType::CollapsibleContainer => extract_collapsible(node)?,
        NodeType::CollapsibleTitle => collapsible_block(node.text_content()?, String::new()),
        NodeType::Paragraph => {
            let text = node.text_content()?;
            if text.is_empty() {
                return Ok(None);
            }
            Block::leaf(BlockKind::Paragraph, text)
        }
        NodeType::Code => Block::leaf(BlockKind::Code, node.text_content()?),
        NodeType::Quote => extract_quote(node)?,
        NodeType::Text | NodeType::Tab => Block::leaf(BlockKind::Text, node.text_content()?),
        other => {
            debug!(node_type = ?other, "skipping unsupported node");
            return Ok(None);
        }
    };
    Ok(Some(block))
}

fn extract_list(list: &dyn EditorNode) -> Result<Vec<Block>, NodeError> {
    let list_type = list.list_type();
    list.children()?
        .into_iter()
        .map(|item| extract_list_item(item, list_type))
        .collect()
}

/// A list item's own text plus the items of any nested list, hoisted one
/// level into its children.
fn extract_list_item(item: &dyn EditorNode, list_type: Option<ListType>) -> Result<Block, NodeError> {
    let mut content = String::new();
    let mut children = Vec::new();

    for child in item.children()? {
        let child_type = child.node_type();
        if child_type.is_text() {
            content.push_str(&child.text_content()?);
        } else if child_type.is_element() {
            content.push_str(&direct_text(child)?);
        }

        if child_type == NodeType::List {
            children.extend(extract_list(child)?);
        }
    }

    let block = Block::with_children(BlockKind::ListItem, content.trim(), children);
    Ok(match list_type {
        Some(list_type) => block.with_list_type(list_type),
        None => block,
    })
}

/// Text of an element's direct text children, space-joined.
fn direct_text(element: &dyn EditorNode) -> Result<String, NodeError> {
    let mut parts = Vec::new();
    for child in element.children()? {
        if child.node_type().is_text() {
            parts.push(child.text_content()?);
        }
    }
    Ok(parts.join(" "))
}

fn extract_collapsible(container: &dyn EditorNode) -> Result<Block, NodeError> {
    let mut title = None;
    let mut body = Vec::new();

    for child in container.children()? {
        if child.node_type() == NodeType::CollapsibleTitle {
            // The first title wins, even when it is blank.
            if title.is_none() {
                title = Some(child.text_content()?);
            }
        } else {
            body.push(child.text_content()?);
        }
    }

    Ok(collapsible_block(title.unwrap_or_default(), body.join("\n")))
}

/// A collapsible always carries exactly one content child, empty for a bare
/// title, so it flattens as `title + "\n" + body`.
fn collapsible_block(title: String, body: String) -> Block {
    Block {
        kind: BlockKind::Collapsible,
        content: title,
        children: Some(vec![Block::leaf(BlockKind::CollapsibleContent, body)]),
        attributes: None,
    }
}

/// Quotes with two or more direct children keep one text block per child so
/// soft line breaks survive.
fn extract_quote(quote: &dyn EditorNode) -> Result<Block, NodeError> {
    let content = quote.text_content()?;
    let children = quote.children()?;
    if children.len() < 2 {
        return Ok(Block::leaf(BlockKind::Quote, content));
    }

    let lines = children
        .into_iter()
        .map(|child| Ok(Block::leaf(BlockKind::Text, child.text_content()?)))
        .collect::<Result<Vec<_>, NodeError>>()?;
    Ok(Block::with_children(BlockKind::Quote, content, lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::editor::{DocNode, EditorState};
    use crate::document::parse_blocks;
    use pretty_assertions::assert_eq;

    /// A node whose inspection always fails.
    struct BrokenNode;

    impl EditorNode for BrokenNode {
        fn node_type(&self) -> NodeType {
            NodeType::Heading
        }

        fn text_content(&self) -> Result<String, NodeError> {
            Err(NodeError::Detached)
        }

        fn children(&self) -> Result<Vec<&dyn EditorNode>, NodeError> {
            Err(NodeError::Detached)
        }
    }

    /// A root mixing healthy nodes with a broken one.
    struct MixedRoot {
        before: DocNode,
        broken: BrokenNode,
        after: DocNode,
    }

    impl EditorNode for MixedRoot {
        fn node_type(&self) -> NodeType {
            NodeType::Root
        }

        fn text_content(&self) -> Result<String, NodeError> {
            Ok(String::new())
        }

        fn children(&self) -> Result<Vec<&dyn EditorNode>, NodeError> {
            Ok(vec![&self.before as &dyn EditorNode, &self.broken, &self.after])
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let state = EditorState::new(vec![
            DocNode::heading("Title"),
            DocNode::paragraph("Body text"),
        ]);
        assert_eq!(
            extract_blocks(state.root()),
            vec![
                Block::leaf(BlockKind::Heading, "Title"),
                Block::leaf(BlockKind::Paragraph, "Body text"),
            ]
        );
    }

    #[test]
    fn test_empty_paragraph_elided() {
        let state = EditorState::new(vec![DocNode::paragraph(""), DocNode::paragraph("kept")]);
        let blocks = extract_blocks(state.root());
        assert_eq!(blocks, vec![Block::leaf(BlockKind::Paragraph, "kept")]);
    }

    #[test]
    fn test_collapsible_merge() {
        let state = EditorState::new(vec![DocNode::collapsible("Details", &["line1", "line2"])]);
        let blocks = extract_blocks(state.root());
        assert_eq!(
            blocks,
            vec![Block::with_children(
                BlockKind::Collapsible,
                "Details",
                vec![Block::leaf(BlockKind::CollapsibleContent, "line1\nline2")],
            )]
        );
    }

    #[test]
    fn test_bare_collapsible_title() {
        let state = EditorState::new(vec![DocNode::element(
            "collapsible-title",
            vec![DocNode::text("Orphan")],
        )]);
        let blocks = extract_blocks(state.root());
        assert_eq!(
            blocks,
            vec![Block::with_children(
                BlockKind::Collapsible,
                "Orphan",
                vec![Block::leaf(BlockKind::CollapsibleContent, "")],
            )]
        );
        assert_eq!(crate::context::flatten(&blocks), "Orphan\n");
    }

    #[test]
    fn test_first_collapsible_title_wins_even_blank() {
        let container = DocNode::element(
            "collapsible-container",
            vec![
                DocNode::element("collapsible-title", Vec::new()),
                DocNode::element("collapsible-title", vec![DocNode::text("Later")]),
                DocNode::paragraph("body"),
            ],
        );
        let blocks = extract_blocks(EditorState::new(vec![container]).root());
        assert_eq!(blocks[0].content, "");
        assert_eq!(blocks[0].children()[0].content, "body");
    }

    #[test]
    fn test_tabs_count_as_text() {
        let tab = || DocNode::element("tab", Vec::new());
        let list = DocNode::element(
            "list",
            vec![DocNode::element(
                "listitem",
                vec![
                    DocNode::text("a"),
                    tab(),
                    DocNode::text("b "),
                    DocNode::element("link", vec![DocNode::text("c"), tab(), DocNode::text("d")]),
                ],
            )],
        );
        let blocks = extract_blocks(EditorState::new(vec![list, tab()]).root());
        assert_eq!(blocks[0].children()[0].content, "a\tb c \t d");
        assert_eq!(blocks[1], Block::leaf(BlockKind::Text, "\t"));
    }

    #[test]
    fn test_list_items() {
        let state = EditorState::new(vec![DocNode::list(ListType::Bullet, &["A", "B"])]);
        let blocks = extract_blocks(state.root());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::List);
        assert_eq!(blocks[0].content, "");
        let items: Vec<_> = blocks[0].children().iter().map(|b| b.content.as_str()).collect();
        assert_eq!(items, vec!["A", "B"]);
        assert_eq!(
            blocks[0].children()[0].attributes.as_ref().and_then(|a| a.list_type),
            Some(ListType::Bullet)
        );
    }

    #[test]
    fn test_nested_list_hoisted_into_item_children() {
        let nested = DocNode::list(ListType::Bullet, &["inner 1", "inner 2"]);
        let outer = DocNode {
            list_type: Some(ListType::Number),
            ..DocNode::element(
                "list",
                vec![DocNode::element(
                    "listitem",
                    vec![DocNode::text("  outer  "), nested],
                )],
            )
        };
        let blocks = extract_blocks(EditorState::new(vec![outer]).root());

        let item = &blocks[0].children()[0];
        assert_eq!(item.content, "outer");
        assert_eq!(item.attributes.as_ref().and_then(|a| a.list_type), Some(ListType::Number));
        let inner: Vec<_> = item.children().iter().map(|b| b.content.as_str()).collect();
        assert_eq!(inner, vec!["inner 1", "inner 2"]);
        assert!(item.children().iter().all(|b| b.kind == BlockKind::ListItem));
    }

    #[test]
    fn test_list_item_link_text() {
        let list = DocNode::element(
            "list",
            vec![DocNode::element(
                "listitem",
                vec![
                    DocNode::text("see "),
                    DocNode::element("link", vec![DocNode::text("the"), DocNode::text("docs")]),
                ],
            )],
        );
        let blocks = extract_blocks(EditorState::new(vec![list]).root());
        assert_eq!(blocks[0].children()[0].content, "see the docs");
    }

    #[test]
    fn test_quote_children() {
        let multi = DocNode::quote(&["first", "second"]);
        let single = DocNode::quote(&["only"]);
        let blocks = extract_blocks(EditorState::new(vec![multi, single]).root());

        assert_eq!(blocks[0].kind, BlockKind::Quote);
        assert_eq!(blocks[0].content, "first\nsecond");
        assert_eq!(
            blocks[0].children(),
            &[
                Block::leaf(BlockKind::Text, "first"),
                Block::leaf(BlockKind::Text, "\n"),
                Block::leaf(BlockKind::Text, "second"),
            ]
        );
        assert!(blocks[1].children.is_none());
        assert_eq!(blocks[1].content, "only");
    }

    #[test]
    fn test_table_and_code_are_leaves() {
        let table = DocNode::element(
            "table",
            vec![DocNode::element(
                "tablerow",
                vec![
                    DocNode::element("tablecell", vec![DocNode::text("x")]),
                    DocNode::element("tablecell", vec![DocNode::text("y")]),
                ],
            )],
        );
        let code = DocNode::element("code", vec![DocNode::text("fn main() {}")]);
        let blocks = extract_blocks(EditorState::new(vec![table, code]).root());
        assert_eq!(
            blocks,
            vec![
                Block::leaf(BlockKind::Table, "x\n\ny"),
                Block::leaf(BlockKind::Code, "fn main() {}"),
            ]
        );
    }

    #[test]
    fn test_bare_text_and_unknown_nodes() {
        let blocks = extract_blocks(
            EditorState::new(vec![
                DocNode::text("loose"),
                DocNode::element("poll", vec![DocNode::text("vote?")]),
                DocNode::element("image", Vec::new()),
            ])
            .root(),
        );
        assert_eq!(blocks, vec![Block::leaf(BlockKind::Text, "loose")]);
    }

    #[test_log::test]
    fn test_failing_node_skipped() {
        let root = MixedRoot {
            before: DocNode::heading("before"),
            broken: BrokenNode,
            after: DocNode::paragraph("after"),
        };
        let blocks = extract_blocks(&root);
        assert_eq!(
            blocks,
            vec![
                Block::leaf(BlockKind::Heading, "before"),
                Block::leaf(BlockKind::Paragraph, "after"),
            ]
        );
    }

    #[test]
    fn test_unreadable_root_yields_nothing() {
        assert!(extract_blocks(&BrokenNode).is_empty());
    }

    #[test]
    fn test_extraction_does_not_mutate() {
        let state = EditorState::new(vec![DocNode::collapsible("T", &["a"])]);
        let before = state.clone();
        let _ = extract_blocks(state.root());
        assert_eq!(state, before);
    }

    #[test]
    fn test_json_round_trips_through_pipeline_parser() {
        let state = EditorState::new(vec![
            DocNode::heading("Title"),
            DocNode::list(ListType::Bullet, &["A"]),
        ]);
        let json = extract_json(state.root()).unwrap();
        assert_eq!(parse_blocks(&json).unwrap(), extract_blocks(state.root()));
    }
}
