//! The explanation returned alongside every new config.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use cg_core::{Adjustment, GameTier};

/// Which code path produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Deterministic rules; no generator involved.
    Rules,
    /// The content generator's answer was used.
    Ai,
    /// The generator was asked and failed; rules answered instead.
    Fallback,
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rules => "rules",
            Self::Ai => "ai",
            Self::Fallback => "fallback",
        })
    }
}

/// Why the next config looks the way it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Direction of the change.
    pub decision: Adjustment,
    /// Human-readable reason.
    pub reason: String,
    /// Tier before the decision, if there was one.
    pub previous_tier: Option<GameTier>,
    /// Tier after the decision.
    pub tier: GameTier,
    /// Scores and metrics the decision was based on.
    pub metrics: BTreeMap<String, f64>,
    /// Which path produced it.
    pub source: DecisionSource,
}

impl Explanation {
    /// Build an explanation from the rules path; the direction is inferred
    /// from the tier change.
    pub fn new(previous_tier: Option<GameTier>, tier: GameTier, reason: impl Into<String>) -> Self {
        Self {
            decision: direction(previous_tier, tier),
            reason: reason.into(),
            previous_tier,
            tier,
            metrics: BTreeMap::new(),
            source: DecisionSource::Rules,
        }
    }

    /// Override the direction.
    pub fn with_decision(mut self, decision: Adjustment) -> Self {
        self.decision = decision;
        self
    }

    /// Record a metric.
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }

    /// Set the source.
    pub fn with_source(mut self, source: DecisionSource) -> Self {
        self.source = source;
        self
    }

    /// Whether the tier moved.
    pub fn tier_changed(&self) -> bool {
        self.previous_tier.is_some_and(|t| t != self.tier)
    }
}

fn direction(previous: Option<GameTier>, next: GameTier) -> Adjustment {
    match previous {
        Some(prev) if prev.game() == next.game() => {
            match tier_rank(next).cmp(&tier_rank(prev)) {
                std::cmp::Ordering::Greater => Adjustment::Increase,
                std::cmp::Ordering::Less => Adjustment::Decrease,
                std::cmp::Ordering::Equal => Adjustment::Maintain,
            }
        }
        _ => Adjustment::Maintain,
    }
}

fn tier_rank(tier: GameTier) -> usize {
    use cg_core::Tier;
    match tier {
        GameTier::Words(t) => t.index(),
        GameTier::Walk(t) => t.index(),
        GameTier::Memory(t) => t.index(),
        GameTier::Train(t) => t.index(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::{WalkTier, WordTier};

    #[test]
    fn direction_follows_tier_order() {
        let up = Explanation::new(Some(WordTier::Easy.into()), WordTier::Medium.into(), "x");
        assert_eq!(up.decision, Adjustment::Increase);
        assert!(up.tier_changed());
        let down = Explanation::new(Some(WalkTier::Hard.into()), WalkTier::Easy.into(), "x");
        assert_eq!(down.decision, Adjustment::Decrease);
        let first = Explanation::new(None, WalkTier::Tutorial.into(), "x");
        assert_eq!(first.decision, Adjustment::Maintain);
        assert!(!first.tier_changed());
    }

    #[test]
    fn serializes_source_in_snake_case() {
        let e = Explanation::new(None, WordTier::Easy.into(), "new user")
            .with_source(DecisionSource::Fallback)
            .with_metric("score", 3.5);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["metrics"]["score"], 3.5);
    }
}
