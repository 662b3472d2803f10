//! Core types for adaptive difficulty in the cognitive games.
//!
//! This crate defines the data model the engines operate on: the four games
//! and their ordered tiers, immutable [`AttemptRecord`]s, the derived
//! [`ProgressionState`], the per-user [`DifficultyConfig`] row, and the
//! persistence boundary ([`ProgressStore`]). It contains no decision logic.

/// Append-only records of played items and sessions.
pub mod attempt;
/// Direction of a difficulty change.
pub mod decision;
/// The persisted per-user, per-game parameter bundle.
pub mod difficulty;
/// Error types used throughout the crate.
pub mod error;
/// Game identifiers and user identifiers.
pub mod game;
/// Progression state derived from attempt history.
pub mod progression;
/// Persistence boundary and the in-memory store.
pub mod store;
/// Ordered tier enums, one per game.
pub mod tier;

/// Re-export attempt types.
pub use attempt::{AttemptId, AttemptRecord};
/// Re-export the adjustment direction.
pub use decision::Adjustment;
/// Re-export config types.
pub use difficulty::{
    DifficultyConfig, GameParams, GridShape, MemoryParams, TrainParams, WalkParams, WordParams,
};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export game identifiers.
pub use game::{Game, UserId};
/// Re-export progression state.
pub use progression::ProgressionState;
/// Re-export store types.
pub use store::{Commit, MemoryStore, ProgressStore, StoreSnapshot};
/// Re-export tier types.
pub use tier::{GameTier, MemoryTier, Tier, TrainTier, WalkTier, WordTier};
