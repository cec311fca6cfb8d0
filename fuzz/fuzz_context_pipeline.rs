//! Fuzz target for the synchronous half of the context pipeline.
//!
//! Run with: cargo +nightly fuzz run fuzz_context_pipeline
//!
//! The first two bytes pick a small budget so truncation paths are hit; the
//! rest is treated as a serialized block array.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quillpad_core::context::budget::{TokenBudget, utf16_len};
use quillpad_core::context::fingerprint;
use quillpad_core::document::parse_blocks;

fuzz_target!(|data: &[u8]| {
    let [max_tokens, chars_per_token, rest @ ..] = data else {
        return;
    };
    let Ok(raw) = std::str::from_utf8(rest) else {
        return;
    };

    let budget = TokenBudget::new(usize::from(*max_tokens), usize::from(*chars_per_token));
    let _ = fingerprint(raw);

    let text = match parse_blocks(raw) {
        Ok(blocks) => budget.bound(&blocks).text,
        Err(_) => budget.truncate(raw).to_string(),
    };
    assert!(utf16_len(&text) <= budget.char_budget());
});
