//! Flattening a block tree into one newline-delimited text blob.
//!
//! `flatten(blocks)` joins each block's rendering with `"\n\n"`, where a
//! block renders as its content followed, when children are present, by
//! `"\n"` and the flattened children. Separators are kept verbatim even when
//! the content is empty.
//!
//! The walk uses an explicit stack so deeply nested lists and collapsibles
//! cannot exhaust the call stack.

use crate::document::Block;

const SIBLING_SEPARATOR: &str = "\n\n";
const CHILDREN_SEPARATOR: &str = "\n";

enum Work<'a> {
    Block(&'a Block),
    Text(&'static str),
}

/// Flatten a block list.
pub fn flatten(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut stack = Vec::new();
    push_siblings(&mut stack, blocks);

    while let Some(work) = stack.pop() {
        match work {
            Work::Text(separator) => out.push_str(separator),
            Work::Block(block) => {
                out.push_str(&block.content);
                if let Some(children) = &block.children {
                    out.push_str(CHILDREN_SEPARATOR);
                    push_siblings(&mut stack, children);
                }
            }
        }
    }

    out
}

/// Flatten a single block: its content plus its flattened children.
pub fn flatten_block(block: &Block) -> String {
    flatten(std::slice::from_ref(block))
}

/// Queue siblings so they pop in document order with separators between.
fn push_siblings<'a>(stack: &mut Vec<Work<'a>>, blocks: &'a [Block]) {
    for (i, block) in blocks.iter().enumerate().rev() {
        stack.push(Work::Block(block));
        if i > 0 {
            stack.push(Work::Text(SIBLING_SEPARATOR));
        }
    }
}
