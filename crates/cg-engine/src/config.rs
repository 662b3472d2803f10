//! Tuned constants for every engine.
//!
//! The defaults are the values the games shipped with. None of them has a
//! derivation behind it, so they are all overridable from a config file.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Word-progression constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordRules {
    /// Successes in the current run that promote.
    pub promote_after: u32,
    /// Attempts examined by the demotion rule.
    pub demotion_window: usize,
    /// Failures within the window that demote.
    pub demotion_failures: usize,
    /// Recent items excluded from the next draw.
    pub recent_exclusion: usize,
    /// Items requested per hard-tier batch.
    pub hard_batch_size: usize,
    /// Attempts summarized for the generator.
    pub summary_window: usize,
}

impl Default for WordRules {
    fn default() -> Self {
        Self {
            promote_after: 5,
            demotion_window: 5,
            demotion_failures: 4,
            recent_exclusion: 10,
            hard_batch_size: 20,
            summary_window: 10,
        }
    }
}

/// Walk-game constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkRules {
    /// Hard-tier sessions examined after a hard loss.
    pub hard_window: usize,
    /// Average precision below which a hard loss drops to easy.
    pub severe_below: f64,
    /// Average precision below which a hard loss drops to medium.
    pub moderate_below: f64,
    /// Lowest speed the generator may recommend.
    pub min_speed: f64,
    /// Highest speed the generator may recommend.
    pub max_speed: f64,
}

impl Default for WalkRules {
    fn default() -> Self {
        Self {
            hard_window: 3,
            severe_below: 30.0,
            moderate_below: 60.0,
            min_speed: 2.0,
            max_speed: 6.0,
        }
    }
}

/// Memory-card constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryRules {
    /// Scores at or above this increase difficulty.
    pub increase_at: f64,
    /// Scores at or below this decrease difficulty.
    pub decrease_at: f64,
    /// Fixed score for an unfinished session.
    pub incomplete_score: f64,
    /// Share of the 0-10 scale given to accuracy.
    pub accuracy_weight: f64,
    /// Share of the 0-10 scale given to speed.
    pub speed_weight: f64,
    /// Inclusive time-limit bounds for generated bundles.
    pub time_limit_bounds: (u32, u32),
    /// Inclusive memorization bounds for generated bundles.
    pub memorization_bounds: (u32, u32),
}

impl Default for MemoryRules {
    fn default() -> Self {
        Self {
            increase_at: 8.0,
            decrease_at: 4.0,
            incomplete_score: 2.0,
            accuracy_weight: 7.0,
            speed_weight: 3.0,
            time_limit_bounds: (45, 300),
            memorization_bounds: (1, 10),
        }
    }
}

/// Train-routing constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainRules {
    /// Slowest speed.
    pub min_speed: f64,
    /// Fastest speed.
    pub max_speed: f64,
    /// Speed added when difficulty increases.
    pub speed_increment: f64,
    /// Speed removed when difficulty decreases.
    pub speed_decrement: f64,
    /// Shortest spawn interval.
    pub min_spawn: f64,
    /// Longest spawn interval.
    pub max_spawn: f64,
    /// Spawn-interval change per step.
    pub spawn_step: f64,
    /// Accuracy (percent) below which difficulty decreases.
    pub accuracy_low: f64,
    /// Accuracy (percent) at or above which difficulty increases.
    pub accuracy_high: f64,
    /// Speeds up to this are easy.
    pub easy_max_speed: f64,
    /// Speeds up to this are medium; faster is hard.
    pub medium_max_speed: f64,
    /// Session length in seconds.
    pub time_limit_secs: u32,
}

impl Default for TrainRules {
    fn default() -> Self {
        Self {
            min_speed: 3.0,
            max_speed: 6.0,
            speed_increment: 0.3,
            speed_decrement: 0.5,
            min_spawn: 5.0,
            max_spawn: 10.0,
            spawn_step: 0.5,
            accuracy_low: 50.0,
            accuracy_high: 85.0,
            easy_max_speed: 3.5,
            medium_max_speed: 5.0,
            time_limit_secs: 90,
        }
    }
}

/// Configuration for the engines and the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RNG seed for item draws; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Deadline for one generative call, in seconds.
    pub adapter_timeout_secs: f64,
    /// Attempts at an optimistic write before giving up.
    pub store_retries: u32,
    /// Word-game constants.
    pub words: WordRules,
    /// Walk-game constants.
    pub walk: WalkRules,
    /// Memory-card constants.
    pub memory: MemoryRules,
    /// Train-routing constants.
    pub train: TrainRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            adapter_timeout_secs: 8.0,
            store_retries: 3,
            words: WordRules::default(),
            walk: WalkRules::default(),
            memory: MemoryRules::default(),
            train: TrainRules::default(),
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the adapter deadline (clamped to 0.1-120 seconds).
    pub fn with_adapter_timeout(mut self, secs: f64) -> Self {
        self.adapter_timeout_secs = if secs.is_finite() {
            secs.clamp(0.1, 120.0)
        } else {
            8.0
        };
        self
    }

    /// Set the optimistic retry limit (at least 1).
    pub fn with_store_retries(mut self, retries: u32) -> Self {
        self.store_retries = retries.max(1);
        self
    }

    /// Replace the word-game constants.
    pub fn with_words(mut self, words: WordRules) -> Self {
        self.words = words;
        self
    }

    /// Replace the train-game constants.
    pub fn with_train(mut self, train: TrainRules) -> Self {
        self.train = train;
        self
    }

    /// The adapter deadline as a [`Duration`].
    pub fn adapter_timeout(&self) -> Duration {
        let secs = if self.adapter_timeout_secs.is_finite() {
            self.adapter_timeout_secs
        } else {
            8.0
        };
        Duration::from_secs_f64(secs.clamp(0.1, 120.0))
    }

    /// Reject constants the engines cannot run with.
    ///
    /// Every range must be ordered and every threshold pair must leave room
    /// between its ends.
    pub fn validate(&self) -> EngineResult<()> {
        ordered("train.min_speed", self.train.min_speed, "train.max_speed", self.train.max_speed)?;
        ordered("train.min_spawn", self.train.min_spawn, "train.max_spawn", self.train.max_spawn)?;
        ordered(
            "train.easy_max_speed",
            self.train.easy_max_speed,
            "train.medium_max_speed",
            self.train.medium_max_speed,
        )?;
        let (low, high) = (self.train.accuracy_low, self.train.accuracy_high);
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(EngineError::Validation(format!(
                "train.accuracy_low ({low}) must be below train.accuracy_high ({high})"
            )));
        }
        ordered("walk.min_speed", self.walk.min_speed, "walk.max_speed", self.walk.max_speed)?;
        if self.walk.min_speed <= 0.0 {
            return Err(EngineError::Validation(format!(
                "walk.min_speed must be positive, got {}",
                self.walk.min_speed
            )));
        }

        let (low, high) = self.memory.time_limit_bounds;
        if low > high {
            return Err(EngineError::Validation(format!(
                "memory.time_limit_bounds ({low}, {high}) are inverted"
            )));
        }
        let (low, high) = self.memory.memorization_bounds;
        if low > high {
            return Err(EngineError::Validation(format!(
                "memory.memorization_bounds ({low}, {high}) are inverted"
            )));
        }

        for (name, weight) in [
            ("memory.accuracy_weight", self.memory.accuracy_weight),
            ("memory.speed_weight", self.memory.speed_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::Validation(format!(
                    "{name} must be non-negative, got {weight}"
                )));
            }
        }

        let words = &self.words;
        if words.demotion_failures > words.demotion_window {
            return Err(EngineError::Validation(format!(
                "words.demotion_failures ({}) exceeds words.demotion_window ({})",
                words.demotion_failures, words.demotion_window
            )));
        }
        Ok(())
    }
}

fn ordered(low_name: &str, low: f64, high_name: &str, high: f64) -> EngineResult<()> {
    if !low.is_finite() || !high.is_finite() {
        return Err(EngineError::Validation(format!(
            "{low_name} and {high_name} must be finite"
        )));
    }
    if low > high {
        return Err(EngineError::Validation(format!(
            "{low_name} ({low}) exceeds {high_name} ({high})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.words.promote_after, 5);
        assert_eq!(cfg.words.demotion_failures, 4);
        assert_eq!(cfg.walk.hard_window, 3);
        assert_eq!(cfg.memory.increase_at, 8.0);
        assert_eq!(cfg.train.speed_decrement, 0.5);
        assert_eq!(cfg.adapter_timeout(), Duration::from_secs(8));
    }

    #[test]
    fn builder_methods_clamp() {
        let cfg = EngineConfig::default()
            .with_seed(7)
            .with_adapter_timeout(0.0)
            .with_store_retries(0);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.adapter_timeout_secs, 0.1);
        assert_eq!(cfg.store_retries, 1);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"train": {"max_speed": 7.5}, "store_retries": 5}"#).unwrap();
        assert_eq!(cfg.train.max_speed, 7.5);
        assert_eq!(cfg.train.min_speed, 3.0);
        assert_eq!(cfg.store_retries, 5);
        assert_eq!(cfg.words, WordRules::default());
    }

    #[test]
    fn defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_train_speed_is_rejected() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"train": {"max_speed": 2.5}}"#).unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(&err, EngineError::Validation(msg) if msg.contains("train.max_speed")));
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let bad = [
            r#"{"train": {"min_spawn": 12.0}}"#,
            r#"{"train": {"easy_max_speed": 5.5}}"#,
            r#"{"train": {"accuracy_low": 85.0}}"#,
            r#"{"walk": {"min_speed": 7.0}}"#,
            r#"{"walk": {"min_speed": 0.0}}"#,
            r#"{"memory": {"time_limit_bounds": [300, 45]}}"#,
            r#"{"memory": {"memorization_bounds": [10, 1]}}"#,
            r#"{"memory": {"accuracy_weight": -1.0}}"#,
            r#"{"words": {"demotion_failures": 6}}"#,
        ];
        for text in bad {
            let cfg: EngineConfig = serde_json::from_str(text).unwrap();
            assert!(
                matches!(cfg.validate(), Err(EngineError::Validation(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn equal_bounds_are_allowed() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{"train": {"min_speed": 4.0, "max_speed": 4.0}, "memory": {"time_limit_bounds": [60, 60]}}"#,
        )
        .unwrap();
        assert!(cfg.validate().is_ok());
    }
}
