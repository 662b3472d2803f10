//! Persistence boundary.
//!
//! Engines never touch storage directly; the service reads through
//! [`ProgressStore`] and writes through [`ProgressStore::commit`], which is
//! the transaction: the version check, the config write, and the attempt
//! append happen together or not at all.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::attempt::AttemptRecord;
use crate::difficulty::DifficultyConfig;
use crate::error::{CoreError, CoreResult};
use crate::game::{Game, UserId};

/// A config write, optionally together with the attempt that caused it.
#[derive(Debug, Clone)]
pub struct Commit {
    /// The new config.
    pub config: DifficultyConfig,
    /// Version read before deciding, `None` when the row did not exist.
    pub expected_version: Option<u64>,
    /// Attempt to append in the same transaction.
    pub attempt: Option<AttemptRecord>,
}

/// Storage for configs and attempt history.
pub trait ProgressStore: Send + Sync {
    /// Load the config row for a user and game.
    fn load_config(&self, user: UserId, game: Game) -> CoreResult<Option<DifficultyConfig>>;

    /// Write a config (and optional attempt) if the stored version still
    /// matches. Returns the stored config with its new version.
    fn commit(&self, commit: Commit) -> CoreResult<DifficultyConfig>;

    /// Delete a config row. Returns true if one existed.
    fn delete_config(&self, user: UserId, game: Game) -> CoreResult<bool>;

    /// Most recent attempts for a user and game, newest first.
    fn recent_attempts(
        &self,
        user: UserId,
        game: Game,
        limit: usize,
    ) -> CoreResult<Vec<AttemptRecord>>;

    /// Write a config unconditionally.
    fn save_config(&self, config: DifficultyConfig) -> CoreResult<DifficultyConfig> {
        let expected_version = self
            .load_config(config.user_id, config.game())?
            .map(|c| c.version);
        self.commit(Commit {
            config,
            expected_version,
            attempt: None,
        })
    }
}

/// Serializable contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// All config rows.
    #[serde(default)]
    pub configs: Vec<DifficultyConfig>,
    /// All attempts, oldest first.
    #[serde(default)]
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Default)]
struct State {
    configs: HashMap<(UserId, Game), DifficultyConfig>,
    attempts: Vec<AttemptRecord>,
}

/// In-process store guarded by a single mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let configs = snapshot
            .configs
            .into_iter()
            .map(|c| ((c.user_id, c.game()), c))
            .collect();
        Self {
            state: Mutex::new(State {
                configs,
                attempts: snapshot.attempts,
            }),
        }
    }

    /// Copy the current contents out.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.lock();
        let mut configs: Vec<_> = state.configs.values().cloned().collect();
        configs.sort_by_key(|c| (c.user_id, c.game()));
        StoreSnapshot {
            configs,
            attempts: state.attempts.clone(),
        }
    }

    /// Number of stored attempts across all users.
    pub fn attempt_count(&self) -> usize {
        self.lock().attempts.len()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressStore for MemoryStore {
    fn load_config(&self, user: UserId, game: Game) -> CoreResult<Option<DifficultyConfig>> {
        Ok(self.lock().configs.get(&(user, game)).cloned())
    }

    fn commit(&self, commit: Commit) -> CoreResult<DifficultyConfig> {
        let Commit {
            mut config,
            expected_version,
            attempt,
        } = commit;
        let user = config.user_id;
        let game = config.game();

        if let Some(attempt) = &attempt {
            if attempt.user_id != user {
                return Err(CoreError::Validation(format!(
                    "attempt belongs to user {}, config to user {user}",
                    attempt.user_id
                )));
            }
            attempt.expect_game(game)?;
        }

        let mut state = self.lock();
        let found = state.configs.get(&(user, game)).map(|c| c.version);
        if found != expected_version {
            return Err(CoreError::VersionConflict {
                user,
                game,
                expected: expected_version,
                found,
            });
        }

        config.version = found.map_or(1, |v| v + 1);
        config.updated_at = Utc::now();
        state.configs.insert((user, game), config.clone());
        if let Some(attempt) = attempt {
            state.attempts.push(attempt);
        }
        Ok(config)
    }

    fn delete_config(&self, user: UserId, game: Game) -> CoreResult<bool> {
        Ok(self.lock().configs.remove(&(user, game)).is_some())
    }

    fn recent_attempts(
        &self,
        user: UserId,
        game: Game,
        limit: usize,
    ) -> CoreResult<Vec<AttemptRecord>> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .rev()
            .filter(|a| a.user_id == user && a.game() == game)
            .take(limit)
            .cloned()
            .collect())
    }
}
