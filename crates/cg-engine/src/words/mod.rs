//! Word-progression engine.
//!
//! The tier is derived from attempt history alone: a new day or a new user
//! starts at easy, a frustration pattern demotes, and a run of successes at
//! the current tier promotes. Easy and medium words come from a local pool;
//! hard words come from generated batches held in a shared buffer.

pub mod engine;
pub mod pool;
pub mod summary;
pub mod transition;

pub use engine::{WordChallenge, WordEngine};
pub use pool::WordPool;
pub use summary::summarize;
pub use transition::{WordProgress, decide_next_tier, progress};
