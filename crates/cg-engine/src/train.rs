//! Train-routing engine.
//!
//! Speed and spawn interval move continuously within bounds: harder means
//! faster trains arriving more often. Train and colour counts only change in
//! lockstep with the tier derived from speed.

use serde::{Deserialize, Serialize};

use cg_content::{ContentAdapter, TrainRequest};
use cg_core::{Adjustment, TrainParams, TrainTier};

use crate::config::TrainRules;
use crate::decision::{DecisionSource, Explanation};
use crate::error::{EngineError, EngineResult};

/// How a train session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainCompletion {
    /// Every train was routed.
    Completed,
    /// The clock ran out.
    Timeout,
}

/// A finished train session as reported by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSessionResult {
    /// Trains routed to the right station.
    pub correct: u32,
    /// Trains routed to the wrong station.
    pub wrong: u32,
    /// Trains that appeared, if the game counted them.
    #[serde(default)]
    pub total_spawned: Option<u32>,
    /// How the session ended.
    pub completion: TrainCompletion,
    /// Seconds played.
    #[serde(default)]
    pub elapsed_secs: f64,
}

impl TrainSessionResult {
    /// Reject impossible counters.
    pub fn validate(&self) -> EngineResult<()> {
        let Some(routed) = self.correct.checked_add(self.wrong) else {
            return Err(EngineError::Validation(format!(
                "routed counts out of range: {} correct, {} wrong",
                self.correct, self.wrong
            )));
        };
        if let Some(total) = self.total_spawned
            && routed > total
        {
            return Err(EngineError::Validation(format!(
                "{routed} routed trains exceed {total} spawned"
            )));
        }
        if !self.elapsed_secs.is_finite() || self.elapsed_secs < 0.0 {
            return Err(EngineError::Validation(format!(
                "elapsed time must be non-negative, got {}",
                self.elapsed_secs
            )));
        }
        Ok(())
    }

    /// Correct routings over attempts, as a percentage (0 with no attempts).
    pub fn accuracy(&self) -> f64 {
        let total = match self.total_spawned {
            Some(n) if n > 0 => f64::from(n),
            _ => f64::from(self.correct) + f64::from(self.wrong),
        };
        if total == 0.0 {
            0.0
        } else {
            f64::from(self.correct) / total * 100.0
        }
    }
}

/// Rules verdict before any generator vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Settled by the rules.
    Settled(Adjustment),
    /// Accuracy fell between the cut-points.
    Ambiguous,
}

/// Apply the accuracy and timeout rules.
pub fn classify(result: &TrainSessionResult, rules: &TrainRules) -> Verdict {
    let accuracy = result.accuracy();
    if result.completion == TrainCompletion::Timeout || accuracy < rules.accuracy_low {
        Verdict::Settled(Adjustment::Decrease)
    } else if accuracy >= rules.accuracy_high {
        Verdict::Settled(Adjustment::Increase)
    } else {
        Verdict::Ambiguous
    }
}

/// Tier for a speed.
pub fn tier_for_speed(speed: f64, rules: &TrainRules) -> TrainTier {
    if speed <= rules.easy_max_speed {
        TrainTier::Easy
    } else if speed <= rules.medium_max_speed {
        TrainTier::Medium
    } else {
        TrainTier::Hard
    }
}

/// Trains per session and distinct colours for a tier.
pub fn fixed_counts(tier: TrainTier) -> (u32, u32) {
    match tier {
        TrainTier::Easy => (6, 3),
        TrainTier::Medium => (8, 4),
        TrainTier::Hard => (10, 5),
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Build a full bundle from a speed and spawn interval, clamping both.
pub fn params_for(speed: f64, spawn_rate: f64, rules: &TrainRules) -> TrainParams {
    let speed = if speed.is_finite() { speed } else { rules.min_speed };
    let spawn_rate = if spawn_rate.is_finite() { spawn_rate } else { rules.max_spawn };
    let speed = round1(speed).clamp(rules.min_speed, rules.max_speed);
    let spawn_rate = round1(spawn_rate).clamp(rules.min_spawn, rules.max_spawn);
    let tier = tier_for_speed(speed, rules);
    let (train_count, color_count) = fixed_counts(tier);
    TrainParams {
        tier,
        speed,
        spawn_rate,
        train_count,
        color_count,
        time_limit_secs: rules.time_limit_secs,
    }
}

/// The bundle for a new user: slowest trains, longest interval.
pub fn initial_params(rules: &TrainRules) -> TrainParams {
    params_for(rules.min_speed, rules.max_spawn, rules)
}

/// Move `current` one step in `adjustment`'s direction.
pub fn apply(current: &TrainParams, adjustment: Adjustment, rules: &TrainRules) -> TrainParams {
    let (speed, spawn) = match adjustment {
        Adjustment::Increase => (
            current.speed + rules.speed_increment,
            current.spawn_rate - rules.spawn_step,
        ),
        Adjustment::Decrease => (
            current.speed - rules.speed_decrement,
            current.spawn_rate + rules.spawn_step,
        ),
        Adjustment::Maintain => (current.speed, current.spawn_rate),
    };
    params_for(speed, spawn, rules)
}

/// Decides the next train bundle.
#[derive(Debug, Clone)]
pub struct TrainEngine {
    rules: TrainRules,
    adapter: ContentAdapter,
}

impl TrainEngine {
    /// Create an engine.
    pub fn new(rules: TrainRules, adapter: ContentAdapter) -> Self {
        Self { rules, adapter }
    }

    /// The bundle for a new user.
    pub fn initial_params(&self) -> TrainParams {
        initial_params(&self.rules)
    }

    /// The next bundle after `result`, played with `current`.
    pub fn next_params(
        &self,
        result: &TrainSessionResult,
        current: &TrainParams,
    ) -> EngineResult<(TrainParams, Explanation)> {
        result.validate()?;
        // stored values may be stale; heal them before stepping
        let current = params_for(current.speed, current.spawn_rate, &self.rules);
        let accuracy = result.accuracy();

        let (adjustment, reason, source) = match classify(result, &self.rules) {
            Verdict::Settled(adj) => {
                let reason = if result.completion == TrainCompletion::Timeout {
                    "session timed out".to_string()
                } else {
                    format!("accuracy {accuracy:.0}%")
                };
                (adj, reason, DecisionSource::Rules)
            }
            Verdict::Ambiguous => self.vote(&current, accuracy),
        };

        let next = apply(&current, adjustment, &self.rules);
        if next.tier != current.tier {
            tracing::info!(from = %current.tier, to = %next.tier, speed = next.speed, "train tier changed");
        }
        let explanation = Explanation::new(Some(current.tier.into()), next.tier.into(), reason)
            .with_decision(adjustment)
            .with_metric("accuracy", accuracy)
            .with_metric("speed", next.speed)
            .with_metric("spawn_rate", next.spawn_rate)
            .with_source(source);
        Ok((next, explanation))
    }

    fn vote(&self, current: &TrainParams, accuracy: f64) -> (Adjustment, String, DecisionSource) {
        let request = TrainRequest {
            tier: current.tier,
            accuracy,
            speed: current.speed,
            speed_range: (self.rules.min_speed, self.rules.max_speed),
        };
        match self.adapter.request(&request) {
            Ok(rec) => {
                let reason = if rec.reason.is_empty() {
                    format!("generator vote at {accuracy:.0}% accuracy")
                } else {
                    rec.reason
                };
                (rec.adjustment, reason, DecisionSource::Ai)
            }
            Err(e) => {
                let source = if self.adapter.is_enabled() {
                    tracing::warn!(error = %e, "train vote failed; keeping difficulty");
                    DecisionSource::Fallback
                } else {
                    DecisionSource::Rules
                };
                (
                    Adjustment::Maintain,
                    format!("accuracy {accuracy:.0}% is between the cut-points"),
                    source,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use cg_content::ScriptedProvider;
    use proptest::prelude::*;

    fn result(correct: u32, wrong: u32, completion: TrainCompletion) -> TrainSessionResult {
        TrainSessionResult {
            correct,
            wrong,
            total_spawned: None,
            completion,
            elapsed_secs: 60.0,
        }
    }

    fn engine() -> TrainEngine {
        TrainEngine::new(TrainRules::default(), ContentAdapter::disabled())
    }

    #[test]
    fn initial_config() {
        let p = initial_params(&TrainRules::default());
        assert_eq!(p.speed, 3.0);
        assert_eq!(p.spawn_rate, 10.0);
        assert_eq!(p.tier, TrainTier::Easy);
        assert_eq!((p.train_count, p.color_count), (6, 3));
        assert_eq!(p.time_limit_secs, 90);
    }

    #[test]
    fn timeout_always_decreases() {
        let rules = TrainRules::default();
        let current = params_for(4.5, 7.0, &rules);
        let (next, why) = engine()
            .next_params(&result(10, 0, TrainCompletion::Timeout), &current)
            .unwrap();
        assert_eq!(why.decision, Adjustment::Decrease);
        assert_eq!(next.speed, 4.0);
        assert_eq!(next.spawn_rate, 7.5);
    }

    #[test]
    fn high_accuracy_increases() {
        let rules = TrainRules::default();
        let current = params_for(4.9, 6.0, &rules);
        let (next, _) = engine()
            .next_params(&result(9, 1, TrainCompletion::Completed), &current)
            .unwrap();
        assert_eq!(next.speed, 5.2);
        assert_eq!(next.spawn_rate, 5.5);
        assert_eq!(next.tier, TrainTier::Hard);
        assert_eq!(next.train_count, 10);
    }

    #[test]
    fn speed_is_clamped_at_floor() {
        let rules = TrainRules::default();
        let (next, _) = engine()
            .next_params(&result(1, 9, TrainCompletion::Completed), &initial_params(&rules))
            .unwrap();
        assert_eq!(next.speed, 3.0);
        assert_eq!(next.spawn_rate, 10.0);
    }

    #[test]
    fn ambiguous_band_keeps_without_generator() {
        let rules = TrainRules::default();
        let current = params_for(4.0, 8.0, &rules);
        let (next, why) = engine()
            .next_params(&result(7, 3, TrainCompletion::Completed), &current)
            .unwrap();
        assert_eq!(why.decision, Adjustment::Maintain);
        assert_eq!(why.source, DecisionSource::Rules);
        assert_eq!(next, current);
    }

    #[test]
    fn ambiguous_band_follows_generator_vote() {
        let provider = Arc::new(ScriptedProvider::new().with_response(r#"{"d": "up", "r": "steady"}"#));
        let e = TrainEngine::new(TrainRules::default(), ContentAdapter::new(provider));
        let current = params_for(4.0, 8.0, &TrainRules::default());
        let (next, why) = e
            .next_params(&result(7, 3, TrainCompletion::Completed), &current)
            .unwrap();
        assert_eq!(why.source, DecisionSource::Ai);
        assert_eq!(next.speed, 4.3);
        assert_eq!(next.spawn_rate, 7.5);
    }

    #[test]
    fn accuracy_prefers_spawned_count() {
        let mut r = result(5, 0, TrainCompletion::Completed);
        r.total_spawned = Some(10);
        assert_eq!(r.accuracy(), 50.0);
        assert_eq!(result(0, 0, TrainCompletion::Completed).accuracy(), 0.0);
    }

    #[test]
    fn overflowing_routed_counts_are_rejected() {
        let huge = result(u32::MAX, 1, TrainCompletion::Completed);
        assert!(matches!(
            engine().next_params(&huge, &initial_params(&TrainRules::default())),
            Err(EngineError::Validation(msg)) if msg.contains("out of range")
        ));
        assert!(huge.accuracy() > 99.9 && huge.accuracy() <= 100.0);
    }

    #[test]
    fn tier_cut_points() {
        let rules = TrainRules::default();
        assert_eq!(tier_for_speed(3.5, &rules), TrainTier::Easy);
        assert_eq!(tier_for_speed(3.6, &rules), TrainTier::Medium);
        assert_eq!(tier_for_speed(5.0, &rules), TrainTier::Medium);
        assert_eq!(tier_for_speed(5.1, &rules), TrainTier::Hard);
    }

    proptest! {
        #[test]
        fn bundle_stays_in_bounds(
            speed in -10.0f64..20.0,
            spawn in -10.0f64..30.0,
            correct in 0u32..50,
            wrong in 0u32..50,
            timeout in any::<bool>(),
        ) {
            let rules = TrainRules::default();
            let current = TrainParams {
                tier: TrainTier::Easy,
                speed,
                spawn_rate: spawn,
                train_count: 0,
                color_count: 0,
                time_limit_secs: 0,
            };
            let completion = if timeout { TrainCompletion::Timeout } else { TrainCompletion::Completed };
            let (next, _) = engine().next_params(&result(correct, wrong, completion), &current).unwrap();
            prop_assert!(next.speed >= rules.min_speed && next.speed <= rules.max_speed);
            prop_assert!(next.spawn_rate >= rules.min_spawn && next.spawn_rate <= rules.max_spawn);
            prop_assert_eq!(next.tier, tier_for_speed(next.speed, &rules));
        }
    }
}
