//! The document tree model: a tagged union of block kinds.
//!
//! A [`Block`] is a plain value: produced fresh by extraction (or parsed from
//! the wire), never mutated afterwards. Structure lives only in `children`;
//! `content` is the block's own text.

use serde::{Deserialize, Serialize};

/// The closed set of block kinds the pipeline understands.
///
/// Serialized in kebab-case (`"list-item"`, `"collapsible-content"`). The
/// capitalised tags emitted by older editor builds (`"Table"`,
/// `"Collapsible"`, `"CollapsibleContent"`) are accepted on input. Any other
/// tag deserializes to [`BlockKind::Other`] so that a single unfamiliar block
/// does not invalidate the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading,
    Paragraph,
    Text,
    List,
    ListItem,
    #[serde(alias = "Table")]
    Table,
    Code,
    Quote,
    #[serde(alias = "Collapsible")]
    Collapsible,
    #[serde(alias = "CollapsibleContent")]
    CollapsibleContent,
    #[serde(other)]
    Other,
}

impl BlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Text => "text",
            BlockKind::List => "list",
            BlockKind::ListItem => "list-item",
            BlockKind::Table => "table",
            BlockKind::Code => "code",
            BlockKind::Quote => "quote",
            BlockKind::Collapsible => "collapsible",
            BlockKind::CollapsibleContent => "collapsible-content",
            BlockKind::Other => "other",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker style of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Bullet,
    Number,
    Check,
}

/// Optional presentation metadata carried by a block. Ignored by flattening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,
}

/// A node in the document tree model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(alias = "blockType")]
    pub kind: BlockKind,

    #[serde(default)]
    pub content: String,

    /// Ordered children. Presence is significant to flattening even when the
    /// list is empty, so blocks built here never carry `Some(vec![])`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Block>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BlockAttributes>,
}

impl Block {
    /// A block without children.
    pub fn leaf(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            children: None,
            attributes: None,
        }
    }

    /// A block with children; an empty child list is stored as absent.
    pub fn with_children(kind: BlockKind, content: impl Into<String>, children: Vec<Block>) -> Self {
        Self {
            kind,
            content: content.into(),
            children: if children.is_empty() {
                None
            } else {
                Some(children)
            },
            attributes: None,
        }
    }

    /// Attach a list marker style.
    pub fn with_list_type(mut self, list_type: ListType) -> Self {
        self.attributes = Some(BlockAttributes {
            list_type: Some(list_type),
        });
        self
    }

    /// Children as a slice (empty when absent).
    pub fn children(&self) -> &[Block] {
        self.children.as_deref().unwrap_or_default()
    }
}

/// Parse the serialized block-array form.
pub fn parse_blocks(raw: &str) -> Result<Vec<Block>, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Serialize blocks to the JSON array form consumed by the pipeline.
pub fn blocks_to_json(blocks: &[Block]) -> Result<String, serde_json::Error> {
    serde_json::to_string(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_kebab_case_kinds() {
        let blocks = parse_blocks(
            r#"[{"kind":"list","content":"","children":[{"kind":"list-item","content":"A"}]},
                {"kind":"collapsible-content","content":"x"}]"#,
        )
        .unwrap();
        assert_eq!(blocks[0].kind, BlockKind::List);
        assert_eq!(blocks[0].children()[0].kind, BlockKind::ListItem);
        assert_eq!(blocks[1].kind, BlockKind::CollapsibleContent);
    }

    #[test]
    fn test_parse_editor_payload_aliases() {
        let blocks = parse_blocks(
            r#"[{"blockType":"Table","content":"a b"},
                {"blockType":"Collapsible","content":"Details",
                 "children":[{"blockType":"CollapsibleContent","content":"body"}]}]"#,
        )
        .unwrap();
        assert_eq!(blocks[0].kind, BlockKind::Table);
        assert_eq!(blocks[1].kind, BlockKind::Collapsible);
        assert_eq!(blocks[1].children()[0].kind, BlockKind::CollapsibleContent);
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let blocks = parse_blocks(r#"[{"kind":"Hint","content":"psst"}]"#).unwrap();
        assert_eq!(blocks[0].kind, BlockKind::Other);
        assert_eq!(blocks[0].content, "psst");
    }

    #[test]
    fn test_list_type_attribute() {
        let blocks =
            parse_blocks(r#"[{"kind":"list-item","content":"A","attributes":{"listType":"number"}}]"#)
                .unwrap();
        assert_eq!(
            blocks[0].attributes.as_ref().and_then(|a| a.list_type),
            Some(ListType::Number)
        );
    }

    #[test]
    fn test_rejects_non_array() {
        assert!(parse_blocks(r#"{"kind":"heading"}"#).is_err());
        assert!(parse_blocks("not json").is_err());
    }

    #[test]
    fn test_serialize_omits_absent_children() {
        let json = blocks_to_json(&[Block::leaf(BlockKind::Heading, "Title")]).unwrap();
        assert_eq!(json, r#"[{"kind":"heading","content":"Title"}]"#);
    }

    #[test]
    fn test_with_children_normalizes_empty() {
        let block = Block::with_children(BlockKind::List, "", Vec::new());
        assert!(block.children.is_none());
        assert!(block.children().is_empty());
    }
}
