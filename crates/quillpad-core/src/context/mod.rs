//! Context engine: turns a serialized block tree into bounded grounding text.
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                ContextPipeline                 │
//! │                                                │
//! │  ┌─────────────┐  ┌──────────┐  ┌────────────┐ │
//! │  │ Fingerprint │  │ Flatten  │  │   Budget   │ │
//! │  │             │  │          │  │            │ │
//! │  │ ·hash32     │  │ ·join    │  │ ·estimate  │ │
//! │  │ ·cache key  │  │ ·nesting │  │ ·importance│ │
//! │  │             │  │          │  │ ·truncate  │ │
//! │  └─────────────┘  └──────────┘  └────────────┘ │
//! └───────────────────────┬────────────────────────┘
//!                         ▼
//!                    CacheStore
//! ```

pub mod budget;
pub mod fingerprint;
pub mod flatten;
pub mod pipeline;

pub use budget::{BoundedText, TokenBudget};
pub use fingerprint::{cache_key, fingerprint};
pub use flatten::{flatten, flatten_block};
pub use pipeline::{ContextOutcome, ContextPipeline, ProcessedContext};
