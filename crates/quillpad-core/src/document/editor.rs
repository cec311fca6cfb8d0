//! The editable-document seam.
//!
//! Extraction reads a live document owned by the editor through the
//! [`EditorNode`] trait. Inspecting a node may fail (a detached node, a
//! decorator that cannot render its text), so every accessor is fallible.
//!
//! [`EditorState`] is the concrete, serializable tree the editor exports
//! (`{"root": {"type": "root", "children": [...]}}`). It backs the CLI and
//! the tests; any other document implementation only needs the trait.

use serde::{Deserialize, Serialize};

use super::block::ListType;

/// Errors raised while inspecting a single editor node.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("malformed {node_type} node: {reason}")]
    Malformed { node_type: String, reason: String },

    #[error("node is no longer attached to the document")]
    Detached,

    #[error("node inspection failed: {0}")]
    Inspect(String),
}

/// Node types known to the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    Root,
    Heading,
    Paragraph,
    Text,
    LineBreak,
    Tab,
    Link,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    Code,
    Quote,
    CollapsibleContainer,
    CollapsibleTitle,
    CollapsibleContent,
    /// Anything else the editor registers (images, polls, embeds, ...).
    Other(String),
}

impl NodeType {
    /// Map an exported `type` name to a node type.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "root" => NodeType::Root,
            "heading" => NodeType::Heading,
            "paragraph" => NodeType::Paragraph,
            "text" => NodeType::Text,
            "linebreak" => NodeType::LineBreak,
            "tab" => NodeType::Tab,
            "link" | "autolink" => NodeType::Link,
            "list" => NodeType::List,
            "listitem" => NodeType::ListItem,
            "table" => NodeType::Table,
            "tablerow" => NodeType::TableRow,
            "tablecell" => NodeType::TableCell,
            "code" => NodeType::Code,
            "quote" => NodeType::Quote,
            "collapsible-container" => NodeType::CollapsibleContainer,
            "collapsible-title" => NodeType::CollapsibleTitle,
            "collapsible-content" => NodeType::CollapsibleContent,
            other => NodeType::Other(other.to_string()),
        }
    }

    /// Leaf nodes that carry text directly.
    pub fn is_inline_leaf(&self) -> bool {
        matches!(self, NodeType::Text | NodeType::LineBreak | NodeType::Tab)
    }

    /// Text-bearing leaves: plain text and tabs, which are text with a fixed
    /// payload. Line breaks are not text.
    pub fn is_text(&self) -> bool {
        matches!(self, NodeType::Text | NodeType::Tab)
    }

    /// Element nodes flowing inside a line rather than starting a new block.
    pub fn is_inline_element(&self) -> bool {
        matches!(self, NodeType::Link)
    }

    /// Whether the node may own children.
    pub fn is_element(&self) -> bool {
        !self.is_inline_leaf()
    }
}

/// Read access to one node of a live editable document.
pub trait EditorNode {
    /// The node's concrete type.
    fn node_type(&self) -> NodeType;

    /// The node's full text, including all descendants.
    fn text_content(&self) -> Result<String, NodeError>;

    /// Direct children in document order.
    fn children(&self) -> Result<Vec<&dyn EditorNode>, NodeError>;

    /// Marker style, for list nodes.
    fn list_type(&self) -> Option<ListType> {
        None
    }
}

/// A node of an exported editor state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocNode {
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocNode>,
}

impl DocNode {
    /// An element node with the given children.
    pub fn element(node_type: &str, children: Vec<DocNode>) -> Self {
        Self {
            node_type: node_type.to_string(),
            text: None,
            list_type: None,
            children,
        }
    }

    /// A text leaf.
    pub fn text(text: &str) -> Self {
        Self {
            node_type: "text".to_string(),
            text: Some(text.to_string()),
            list_type: None,
            children: Vec::new(),
        }
    }

    /// A soft line break.
    pub fn line_break() -> Self {
        Self::element("linebreak", Vec::new())
    }

    pub fn heading(text: &str) -> Self {
        Self::element("heading", vec![Self::text(text)])
    }

    /// A paragraph; an empty string yields a paragraph with no children.
    pub fn paragraph(text: &str) -> Self {
        if text.is_empty() {
            return Self::element("paragraph", Vec::new());
        }
        Self::element("paragraph", vec![Self::text(text)])
    }

    /// A list with one text-only item per entry.
    pub fn list(list_type: ListType, items: &[&str]) -> Self {
        let items = items
            .iter()
            .map(|item| Self::element("listitem", vec![Self::text(item)]))
            .collect();
        Self {
            list_type: Some(list_type),
            ..Self::element("list", items)
        }
    }

    /// A collapsible container with a title and one paragraph per body line.
    pub fn collapsible(title: &str, lines: &[&str]) -> Self {
        let mut children = vec![Self::element("collapsible-title", vec![Self::text(title)])];
        children.extend(lines.iter().map(|line| Self::paragraph(line)));
        Self::element("collapsible-container", children)
    }

    /// A quote whose lines are separated by soft line breaks.
    pub fn quote(lines: &[&str]) -> Self {
        let mut children = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                children.push(Self::line_break());
            }
            children.push(Self::text(line));
        }
        Self::element("quote", children)
    }

    fn malformed(&self, reason: &str) -> NodeError {
        NodeError::Malformed {
            node_type: self.node_type.clone(),
            reason: reason.to_string(),
        }
    }
}

impl EditorNode for DocNode {
    fn node_type(&self) -> NodeType {
        NodeType::from_type_name(&self.node_type)
    }

    fn text_content(&self) -> Result<String, NodeError> {
        let node_type = self.node_type();
        match node_type {
            NodeType::Text => {
                if !self.children.is_empty() {
                    return Err(self.malformed("text nodes cannot have children"));
                }
                self.text
                    .clone()
                    .ok_or_else(|| self.malformed("missing text"))
            }
            NodeType::LineBreak => Ok("\n".to_string()),
            NodeType::Tab => Ok("\t".to_string()),
            _ => {
                // Block-level element children are separated by a blank line,
                // inline content is concatenated.
                let mut out = String::new();
                let last = self.children.len().saturating_sub(1);
                for (i, child) in self.children.iter().enumerate() {
                    out.push_str(&child.text_content()?);
                    let child_type = child.node_type();
                    if child_type.is_element() && !child_type.is_inline_element() && i != last {
                        out.push_str("\n\n");
                    }
                }
                Ok(out)
            }
        }
    }

    fn children(&self) -> Result<Vec<&dyn EditorNode>, NodeError> {
        Ok(self
            .children
            .iter()
            .map(|c| c as &dyn EditorNode)
            .collect())
    }

    fn list_type(&self) -> Option<ListType> {
        self.list_type
    }
}

/// An exported editor document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorState {
    pub root: DocNode,
}

impl EditorState {
    /// Wrap top-level nodes in a root.
    pub fn new(children: Vec<DocNode>) -> Self {
        Self {
            root: DocNode::element("root", children),
        }
    }

    /// Parse an exported editor state.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn root(&self) -> &dyn EditorNode {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_names() {
        assert_eq!(NodeType::from_type_name("listitem"), NodeType::ListItem);
        assert_eq!(
            NodeType::from_type_name("collapsible-title"),
            NodeType::CollapsibleTitle
        );
        assert_eq!(
            NodeType::from_type_name("poll"),
            NodeType::Other("poll".to_string())
        );
    }

    #[test]
    fn test_paragraph_text_concatenates_inline() {
        let p = DocNode::element(
            "paragraph",
            vec![
                DocNode::text("Hello "),
                DocNode::element("link", vec![DocNode::text("world")]),
                DocNode::line_break(),
                DocNode::text("again"),
            ],
        );
        assert_eq!(p.text_content().unwrap(), "Hello world\nagain");
    }

    #[test]
    fn test_block_children_separated() {
        let table = DocNode::element(
            "table",
            vec![
                DocNode::element(
                    "tablerow",
                    vec![
                        DocNode::element("tablecell", vec![DocNode::text("a")]),
                        DocNode::element("tablecell", vec![DocNode::text("b")]),
                    ],
                ),
                DocNode::element(
                    "tablerow",
                    vec![DocNode::element("tablecell", vec![DocNode::text("c")])],
                ),
            ],
        );
        assert_eq!(table.text_content().unwrap(), "a\n\nb\n\nc");
    }

    #[test]
    fn test_text_with_children_is_malformed() {
        let mut bad = DocNode::text("x");
        bad.children.push(DocNode::text("y"));
        assert!(matches!(
            bad.text_content(),
            Err(NodeError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_editor_state() {
        let state = EditorState::parse(
            r#"{"root":{"type":"root","children":[
                {"type":"list","listType":"bullet","children":[
                    {"type":"listitem","children":[{"type":"text","text":"A"}]}
                ]}
            ]}}"#,
        )
        .unwrap();
        let top = state.root().children().unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].node_type(), NodeType::List);
        assert_eq!(top[0].list_type(), Some(ListType::Bullet));
    }
}
