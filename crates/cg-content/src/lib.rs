//! Content generation adapter.
//!
//! Wraps an external generative text provider behind a synchronous,
//! timeout-bounded call. Every response is validated against a strict schema
//! and normalized before it reaches an engine; anything else is an
//! [`AdapterError`]. The adapter never retries: engines own the deterministic
//! fallback. A keyed [`ContentBuffer`] amortizes batch calls across plays.

pub mod adapter;
pub mod buffer;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod schema;

pub use adapter::{ContentAdapter, DEFAULT_TIMEOUT};
pub use buffer::ContentBuffer;
pub use error::{AdapterError, AdapterResult};
pub use prompt::{
    ContentRequest, MemoryRequest, PerformanceSummary, TrainRequest, Trend, WalkRequest,
    WordBatchRequest,
};
pub use provider::{CommandProvider, ScriptedProvider, TextProvider};
pub use schema::{
    ChallengeItem, MemoryBounds, MemoryRecommendation, TrainRecommendation, WalkRecommendation,
};
