//! Document tree model and extraction.
//!
//! The editor owns a live, mutable document. [`extract_blocks`] walks it
//! through the [`EditorNode`] seam and produces [`Block`] values, the plain
//! serializable model consumed by the context pipeline.

pub mod block;
pub mod editor;
pub mod extract;

pub use block::{Block, BlockAttributes, BlockKind, ListType, blocks_to_json, parse_blocks};
pub use editor::{DocNode, EditorNode, EditorState, NodeError, NodeType};
pub use extract::{extract_blocks, extract_json};
