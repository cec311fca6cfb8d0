#![deny(unsafe_code)]

//! Shared test utilities for the Quillpad workspace.
//!
//! Provides reusable document fixtures, config builders, a socket-backed test
//! daemon and tracing helpers so that individual crate tests stay concise.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! quillpad-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod daemon;
pub mod fixtures;
pub mod tracing_setup;
