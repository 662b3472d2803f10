//! Error types for the engines.

use thiserror::Error;

use cg_content::AdapterError;
use cg_core::{CoreError, Game, GameTier, UserId};

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures the engines surface to callers.
///
/// Provider trouble is normally absorbed into a fallback; it only appears
/// here when a hard word draw has no fallback item.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input was missing or malformed. Nothing was persisted.
    #[error("validation error: {0}")]
    Validation(String),

    /// No item could be produced for a tier.
    #[error("no content available for {tier}: {source}")]
    ContentUnavailable {
        /// The tier the item was for.
        tier: GameTier,
        /// Why generation failed.
        source: AdapterError,
    },

    /// Concurrent writers kept winning the optimistic race.
    #[error("gave up updating {game} for user {user} after {attempts} conflicting writes")]
    Contention {
        /// The user.
        user: UserId,
        /// The game.
        game: Game,
        /// Writes attempted.
        attempts: u32,
    },

    /// The store failed.
    #[error("store error: {0}")]
    Store(CoreError),
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::WrongGame { .. } => Self::Validation(err.to_string()),
            other => Self::Store(other),
        }
    }
}
