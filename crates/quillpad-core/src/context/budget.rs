//! Token budget enforcement: importance filtering and hard truncation.
//!
//! Token counts are estimated, not tokenized: `ceil(len / chars_per_token)`.
//! Lengths are measured in UTF-16 code units, the unit the editor measures
//! strings in, so budgets line up with what the client sees.
//!
//! When the flattened text exceeds the budget, the text is re-derived from
//! the top-level blocks:
//!
//! 1. blocks of an *important* kind render fully (content plus flattened
//!    children), joined with `"\n\n"`;
//! 2. blocks of any kind except heading, quote, table and paragraph
//!    contribute their bare content, joined with `"\n"`;
//! 3. the two sections are joined with `"\n\n"` and cut to
//!    `max_tokens * chars_per_token` code units.
//!
//! The two kind sets are distinct and must stay that way: other consumers
//! compare this output byte for byte.

use quillpad_config::ContextConfig;
use tracing::debug;

use super::flatten::{flatten, flatten_block};
use crate::document::{Block, BlockKind};

/// Kinds rendered in full by the importance filter.
pub fn is_important(kind: BlockKind) -> bool {
    matches!(
        kind,
        BlockKind::Heading
            | BlockKind::Collapsible
            | BlockKind::Table
            | BlockKind::Text
            | BlockKind::Paragraph
            | BlockKind::List
            | BlockKind::Quote
            | BlockKind::Code
            | BlockKind::CollapsibleContent
            | BlockKind::ListItem
    )
}

/// Kinds whose bare content is appended after the important section.
pub fn contributes_remainder(kind: BlockKind) -> bool {
    !matches!(
        kind,
        BlockKind::Heading | BlockKind::Quote | BlockKind::Table | BlockKind::Paragraph
    )
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// The longest prefix of `text` spanning at most `max_units` UTF-16 code
/// units. A surrogate pair straddling the limit is dropped whole.
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &text[..idx];
        }
    }
    text
}

/// A token budget with its estimation divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    max_tokens: usize,
    chars_per_token: usize,
}

impl TokenBudget {
    /// Create a budget. `chars_per_token` is clamped to at least 1.
    pub fn new(max_tokens: usize, chars_per_token: usize) -> Self {
        Self {
            max_tokens,
            chars_per_token: chars_per_token.max(1),
        }
    }

    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.max_tokens, config.chars_per_token)
    }

    /// Token budget threshold.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Hard character budget applied by truncation.
    pub fn char_budget(&self) -> usize {
        self.max_tokens.saturating_mul(self.chars_per_token)
    }

    /// Estimate the token count of `text`.
    pub fn estimate_tokens(&self, text: &str) -> usize {
        utf16_len(text).div_ceil(self.chars_per_token)
    }

    /// Whether `text` is estimated above the budget.
    pub fn exceeds(&self, text: &str) -> bool {
        self.estimate_tokens(text) > self.max_tokens
    }

    /// Cut `text` to the character budget.
    pub fn truncate<'a>(&self, text: &'a str) -> &'a str {
        truncate_utf16(text, self.char_budget())
    }

    /// Flatten `blocks` and enforce the budget on the result.
    pub fn bound(&self, blocks: &[Block]) -> BoundedText {
        let flattened = flatten(blocks);
        if !self.exceeds(&flattened) {
            return BoundedText {
                text: flattened,
                enforced: false,
            };
        }

        debug!(
            estimated_tokens = self.estimate_tokens(&flattened),
            max_tokens = self.max_tokens,
            "flattened context over budget, applying importance filter"
        );
        BoundedText {
            text: self.enforce(blocks),
            enforced: true,
        }
    }

    /// Re-derive the text from `blocks` by importance and truncate it.
    pub fn enforce(&self, blocks: &[Block]) -> String {
        let important = blocks
            .iter()
            .filter(|b| is_important(b.kind))
            .map(flatten_block)
            .collect::<Vec<_>>()
            .join("\n\n");

        let remainder = blocks
            .iter()
            .filter(|b| contributes_remainder(b.kind))
            .map(|b| b.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let combined = format!("{important}\n\n{remainder}");
        self.truncate(&combined).to_string()
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}

/// Output of [`TokenBudget::bound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText {
    pub text: String,
    /// Whether the importance filter ran.
    pub enforced: bool,
}
