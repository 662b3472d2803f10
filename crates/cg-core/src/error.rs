use crate::game::{Game, UserId};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the data model and the persistence boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required input field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record belongs to a different game than the operation expects.
    #[error("expected a {expected} record, got {found}")]
    WrongGame {
        /// The game the operation works on.
        expected: Game,
        /// The game the record belongs to.
        found: Game,
    },

    /// An optimistic write lost a race with a concurrent writer.
    #[error("config for user {user} in {game} changed concurrently (expected version {expected:?}, found {found:?})")]
    VersionConflict {
        /// The user whose config was written.
        user: UserId,
        /// The game whose config was written.
        game: Game,
        /// The version the writer read.
        expected: Option<u64>,
        /// The version currently stored.
        found: Option<u64>,
    },

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(String),
}
