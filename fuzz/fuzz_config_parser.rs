//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = quillpad_config::AppConfig::parse(s) {
            let _ = config.context.char_budget();
            let _ = config.llm.resolve_api_key();
        }
    }
});
