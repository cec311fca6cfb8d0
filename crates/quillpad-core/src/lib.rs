#![deny(unsafe_code)]

//! Quillpad core: document extraction, the context pipeline and the daemon.
//!
//! An editor hands its document tree to [`document::extract_blocks`]; the
//! serialized blocks go through [`context::ContextPipeline`], which returns
//! bounded grounding text for a text-generation request built by
//! [`assist`]. The [`daemon`] serves all of it over a Unix socket.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`, boxed future.
///
/// Traits used as `dyn Trait` ([`cache::CacheStore`], [`llm::LlmProvider`])
/// cannot use native `async fn`; they return this instead.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Editor actions and chat-request construction.
pub mod assist;
/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Cache stores and the clock they expire against.
pub mod cache;
/// Flattening, budget enforcement, fingerprinting and the pipeline.
pub mod context;
/// Daemon runtime.
pub mod daemon;
/// Block model, editor node seam and extractor.
pub mod document;
/// Unix socket HTTP/JSON server and client.
pub mod ipc;
/// Text-generation providers.
pub mod llm;
/// In-memory log collector.
pub mod logging;

pub use assist::{AiAction, AssistRequest, Assistant};
pub use context::{ContextOutcome, ContextPipeline, ProcessedContext};
pub use daemon::Daemon;
pub use document::{Block, BlockKind};
pub use logging::{LogCollector, LogReader};
