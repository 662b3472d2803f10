//! The per-user, per-game configuration row.
//!
//! Exactly one [`DifficultyConfig`] exists per (user, game). It is created
//! lazily with a default tier, rewritten after every attempt or session, and
//! removed only by an explicit reset. Each game has its own parameter record,
//! so a config is valid by construction rather than by key lookups.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::game::{Game, UserId};
use crate::tier::{GameTier, MemoryTier, TrainTier, WalkTier, WordTier};

/// Card grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    /// Rows of cards.
    pub rows: u32,
    /// Columns of cards.
    pub cols: u32,
}

impl GridShape {
    /// Create a grid shape.
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Total number of cards.
    pub fn cells(self) -> u32 {
        self.rows * self.cols
    }

    /// Number of pairs the grid holds, `None` if the cell count is odd or zero.
    pub fn pairs(self) -> Option<u32> {
        let cells = self.cells();
        (cells > 0 && cells % 2 == 0).then_some(cells / 2)
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for GridShape {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rows, cols) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| CoreError::Validation(format!("grid must look like 3x4, got '{s}'")))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| CoreError::Validation(format!("invalid grid dimension '{v}'")))
        };
        Ok(Self::new(parse(rows)?, parse(cols)?))
    }
}

/// Word-game parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordParams {
    /// Tier the next word is drawn from.
    pub tier: WordTier,
}

/// Walk-game parameters for the most recently planned session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkParams {
    /// Session tier.
    pub tier: WalkTier,
    /// Session length in seconds.
    pub duration_secs: u32,
    /// Correct catches needed to win.
    pub target_hits: u32,
    /// Ball speed.
    pub ball_speed: f64,
    /// Seconds between spawned balls.
    pub spawn_interval_secs: f64,
}

/// Memory-card parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryParams {
    /// Current tier.
    pub tier: MemoryTier,
    /// Pairs on the board.
    pub total_pairs: u32,
    /// Board layout.
    pub grid: GridShape,
    /// Seconds allowed to finish.
    pub time_limit_secs: u32,
    /// Seconds the cards are shown face up before play.
    pub memorization_secs: u32,
    /// Consecutive sessions that ended in "maintain". Informational only.
    #[serde(default)]
    pub consecutive_maintains: u32,
}

/// Train-game parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    /// Tier derived from `speed`.
    pub tier: TrainTier,
    /// Train speed.
    pub speed: f64,
    /// Seconds between spawned trains.
    pub spawn_rate: f64,
    /// Trains per session, fixed by tier.
    pub train_count: u32,
    /// Distinct colours, fixed by tier.
    pub color_count: u32,
    /// Session length in seconds.
    pub time_limit_secs: u32,
}

/// One parameter bundle per game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameParams {
    /// Word-game bundle.
    Words(WordParams),
    /// Walk-game bundle.
    Walk(WalkParams),
    /// Memory-card bundle.
    Memory(MemoryParams),
    /// Train-game bundle.
    Train(TrainParams),
}

impl GameParams {
    /// The game this bundle configures.
    pub fn game(&self) -> Game {
        match self {
            Self::Words(_) => Game::Words,
            Self::Walk(_) => Game::Walk,
            Self::Memory(_) => Game::Memory,
            Self::Train(_) => Game::Train,
        }
    }

    /// The tier in effect.
    pub fn tier(&self) -> GameTier {
        match self {
            Self::Words(p) => p.tier.into(),
            Self::Walk(p) => p.tier.into(),
            Self::Memory(p) => p.tier.into(),
            Self::Train(p) => p.tier.into(),
        }
    }
}

/// The parameter bundle currently in effect for one user in one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Owner.
    pub user_id: UserId,
    /// Optimistic-concurrency version, bumped by every successful write.
    #[serde(default)]
    pub version: u64,
    /// Time of the last write.
    pub updated_at: DateTime<Utc>,
    /// The bundle.
    pub params: GameParams,
}

impl DifficultyConfig {
    /// A fresh, not yet persisted config.
    pub fn new(user_id: UserId, params: GameParams) -> Self {
        Self {
            user_id,
            version: 0,
            updated_at: Utc::now(),
            params,
        }
    }

    /// The game this config belongs to.
    pub fn game(&self) -> Game {
        self.params.game()
    }

    /// The tier in effect.
    pub fn tier(&self) -> GameTier {
        self.params.tier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_parse_and_display() {
        let g: GridShape = "3x4".parse().unwrap();
        assert_eq!(g, GridShape::new(3, 4));
        assert_eq!(g.to_string(), "3x4");
        assert_eq!(g.pairs(), Some(6));
        assert!("3-4".parse::<GridShape>().is_err());
        assert!("ax4".parse::<GridShape>().is_err());
    }

    #[test]
    fn odd_grid_has_no_pairs() {
        assert_eq!(GridShape::new(3, 3).pairs(), None);
        assert_eq!(GridShape::new(0, 4).pairs(), None);
    }

    #[test]
    fn params_are_tagged_by_game() {
        let params = GameParams::Words(WordParams { tier: WordTier::Medium });
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({"game": "words", "tier": "medium"}));
        assert_eq!(params.game(), Game::Words);
        assert_eq!(params.tier(), GameTier::Words(WordTier::Medium));
    }

    #[test]
    fn stale_tier_label_heals_on_load() {
        let json = serde_json::json!({
            "game": "train",
            "tier": "ludicrous",
            "speed": 4.0,
            "spawn_rate": 8.0,
            "train_count": 8,
            "color_count": 4,
            "time_limit_secs": 90
        });
        let params: GameParams = serde_json::from_value(json).unwrap();
        assert_eq!(params.tier(), GameTier::Train(TrainTier::Easy));
    }
}
