//! Memory-card engine.
//!
//! One finished session is scored on a 0-10 scale, the score picks a
//! direction, and the direction moves one step along the tier ladder. Each
//! tier carries a fixed bundle. The generator is asked first for the same
//! decision and bundle; anything it gets wrong falls back to the scoring
//! rules, and both paths produce the same [`MemoryParams`] shape.

use serde::{Deserialize, Serialize};

use cg_content::{ContentAdapter, MemoryRequest};
use cg_core::{Adjustment, GridShape, MemoryParams, MemoryTier, Tier};

use crate::config::MemoryRules;
use crate::decision::{DecisionSource, Explanation};
use crate::error::{EngineError, EngineResult};

/// A finished memory-card session as reported by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySessionResult {
    /// Whether every pair was found before the time ran out.
    pub completed: bool,
    /// Pairs found.
    pub pairs_found: u32,
    /// Pairs on the board.
    pub total_pairs: u32,
    /// Cards turned over.
    pub total_flips: u32,
    /// Seconds used.
    pub elapsed_secs: f64,
    /// Seconds allowed.
    pub time_limit_secs: u32,
}

impl MemorySessionResult {
    /// Reject impossible counters.
    pub fn validate(&self) -> EngineResult<()> {
        let fail = |msg: String| Err(EngineError::Validation(msg));
        if self.total_pairs == 0 {
            return fail("total_pairs must be positive".into());
        }
        if self.pairs_found > self.total_pairs {
            return fail(format!(
                "pairs_found {} exceeds total_pairs {}",
                self.pairs_found, self.total_pairs
            ));
        }
        let Some(needed) = self.pairs_found.checked_mul(2) else {
            return fail(format!("pairs_found {} is out of range", self.pairs_found));
        };
        if self.total_flips < needed {
            return fail(format!(
                "{} pairs need at least {needed} flips, got {}",
                self.pairs_found, self.total_flips
            ));
        }
        if !self.elapsed_secs.is_finite() || self.elapsed_secs < 0.0 {
            return fail(format!("elapsed time must be non-negative, got {}", self.elapsed_secs));
        }
        if self.time_limit_secs == 0 {
            return fail("time_limit_secs must be positive".into());
        }
        Ok(())
    }

    /// Share of flips that completed a match, as a percentage.
    pub fn accuracy(&self) -> f64 {
        if self.total_flips == 0 {
            0.0
        } else {
            (f64::from(self.pairs_found) * 2.0 / f64::from(self.total_flips) * 100.0).min(100.0)
        }
    }

    /// Flipped pairs that did not match.
    pub fn mistakes(&self) -> u32 {
        self.total_flips.saturating_sub(self.pairs_found.saturating_mul(2)) / 2
    }

    /// Elapsed time over the time limit.
    pub fn time_ratio(&self) -> f64 {
        self.elapsed_secs / f64::from(self.time_limit_secs.max(1))
    }
}

/// Fixed bundle for a tier.
pub fn tier_bundle(tier: MemoryTier) -> MemoryParams {
    let (grid, time_limit_secs, memorization_secs) = match tier {
        MemoryTier::Tutorial => (GridShape::new(2, 3), 60, 5),
        MemoryTier::Easy => (GridShape::new(2, 4), 90, 4),
        MemoryTier::Medium => (GridShape::new(3, 4), 120, 3),
        MemoryTier::Hard => (GridShape::new(4, 4), 180, 2),
        MemoryTier::Expert => (GridShape::new(4, 5), 210, 2),
        MemoryTier::Master => (GridShape::new(4, 6), 240, 1),
    };
    MemoryParams {
        tier,
        total_pairs: grid.cells() / 2,
        grid,
        time_limit_secs,
        memorization_secs,
        consecutive_maintains: 0,
    }
}

/// Stepped speed bonus as a fraction of the speed share.
fn speed_fraction(time_ratio: f64) -> f64 {
    if time_ratio < 0.5 {
        1.0
    } else if time_ratio < 0.75 {
        2.0 / 3.0
    } else if time_ratio < 1.0 {
        1.0 / 3.0
    } else {
        0.0
    }
}

/// Score from already-derived metrics. `accuracy` is a percentage.
pub fn score_from_metrics(completed: bool, accuracy: f64, time_ratio: f64, rules: &MemoryRules) -> f64 {
    if !completed {
        return rules.incomplete_score;
    }
    let accuracy_part = (accuracy.clamp(0.0, 100.0) / 100.0 * rules.accuracy_weight)
        .clamp(0.0, rules.accuracy_weight);
    let speed_part = speed_fraction(time_ratio) * rules.speed_weight;
    (accuracy_part + speed_part).clamp(0.0, 10.0)
}

/// Score a session on a 0-10 scale.
pub fn score_session(session: &MemorySessionResult, rules: &MemoryRules) -> f64 {
    score_from_metrics(session.completed, session.accuracy(), session.time_ratio(), rules)
}

/// Map a score to a direction.
pub fn decide_adjustment(score: f64, rules: &MemoryRules) -> Adjustment {
    if score >= rules.increase_at {
        Adjustment::Increase
    } else if score <= rules.decrease_at {
        Adjustment::Decrease
    } else {
        Adjustment::Maintain
    }
}

/// The bundle after moving `adjustment` from `tier`. Steps past either end
/// are no-ops.
pub fn next_config(tier: MemoryTier, adjustment: Adjustment) -> MemoryParams {
    let next = match adjustment {
        Adjustment::Increase => tier.step_up(),
        Adjustment::Decrease => tier.step_down(),
        Adjustment::Maintain => tier,
    };
    tier_bundle(next)
}

/// Decides the next memory-card bundle.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    rules: MemoryRules,
    adapter: ContentAdapter,
}

impl MemoryEngine {
    /// Create an engine.
    pub fn new(rules: MemoryRules, adapter: ContentAdapter) -> Self {
        Self { rules, adapter }
    }

    /// The bundle for a new user.
    pub fn initial_params(&self) -> MemoryParams {
        tier_bundle(MemoryTier::lowest())
    }

    /// Analyze a finished session played with `current` and return the
    /// next bundle.
    pub fn analyze(
        &self,
        current: &MemoryParams,
        session: &MemorySessionResult,
    ) -> EngineResult<(MemoryParams, Explanation)> {
        session.validate()?;
        let score = score_session(session, &self.rules);
        let accuracy = session.accuracy();
        tracing::debug!(tier = %current.tier, score, accuracy, "memory session scored");

        let request = MemoryRequest {
            tier: current.tier,
            completed: session.completed,
            elapsed_secs: session.elapsed_secs,
            time_limit_secs: session.time_limit_secs,
            mistakes: session.mistakes(),
            pairs_found: session.pairs_found,
            total_pairs: session.total_pairs,
            score,
            ladder: MemoryTier::ALL
                .iter()
                .map(|t| (*t, tier_bundle(*t).grid))
                .collect(),
            time_limit_range: self.rules.time_limit_bounds,
            memorization_range: self.rules.memorization_bounds,
        };

        let (mut next, decision, reason, source) = match self.adapter.request(&request) {
            Ok(rec) => (
                MemoryParams {
                    tier: rec.tier,
                    total_pairs: rec.total_pairs,
                    grid: rec.grid,
                    time_limit_secs: rec.time_limit_secs,
                    memorization_secs: rec.memorization_secs,
                    consecutive_maintains: 0,
                },
                rec.adjustment,
                if rec.reason.is_empty() {
                    "generator recommendation".to_string()
                } else {
                    rec.reason
                },
                DecisionSource::Ai,
            ),
            Err(e) => {
                let source = if self.adapter.is_enabled() {
                    tracing::warn!(error = %e, "memory analysis failed; using fallback");
                    DecisionSource::Fallback
                } else {
                    DecisionSource::Rules
                };
                let decision = decide_adjustment(score, &self.rules);
                (
                    next_config(current.tier, decision),
                    decision,
                    format!("score {score:.1}/10 -> {decision}"),
                    source,
                )
            }
        };

        next.consecutive_maintains = if next.tier == current.tier && decision == Adjustment::Maintain {
            current.consecutive_maintains + 1
        } else {
            0
        };
        if next.tier != current.tier {
            tracing::info!(from = %current.tier, to = %next.tier, %source, "memory tier changed");
        }

        let explanation = Explanation::new(Some(current.tier.into()), next.tier.into(), reason)
            .with_decision(decision)
            .with_metric("score", score)
            .with_metric("accuracy", accuracy)
            .with_metric("time_ratio", session.time_ratio())
            .with_metric("consecutive_maintains", f64::from(next.consecutive_maintains))
            .with_source(source);
        Ok((next, explanation))
    }
}
