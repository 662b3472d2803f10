//! Adaptive difficulty engines for the cognitive games.
//!
//! Each game has a pure transition (history or last session in, next tier
//! out) and a pure mapping from tier to parameter bundle. The content
//! generator is consulted only where it adds something; every such call has
//! a named deterministic fallback, and the [`Explanation`] returned with each
//! decision records which path ran. [`DifficultyService`] ties the engines to
//! a [`cg_core::ProgressStore`] under optimistic concurrency.

pub mod config;
pub mod decision;
pub mod error;
pub mod memory;
pub mod service;
pub mod train;
pub mod walk;
pub mod words;

pub use config::{EngineConfig, MemoryRules, TrainRules, WalkRules, WordRules};
pub use decision::{DecisionSource, Explanation};
pub use error::{EngineError, EngineResult};
pub use memory::{MemoryEngine, MemorySessionResult};
pub use service::{DifficultyService, Outcome, UserStats, WordAttempt};
pub use train::{TrainCompletion, TrainEngine, TrainSessionResult};
pub use walk::{SessionPlan, WalkEngine, WalkSessionResult};
pub use words::{WordChallenge, WordEngine, WordPool};
