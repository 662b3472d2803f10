//! The walk engine: session-level tier choice with a generator step on
//! hard losses.

use std::sync::Mutex;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;

use cg_content::{ContentAdapter, WalkRequest};
use cg_core::{Adjustment, AttemptRecord, GameTier, WalkTier};

use crate::config::WalkRules;
use crate::decision::{DecisionSource, Explanation};
use crate::walk::plan::{SessionPlan, baseline, plan_session};
use crate::walk::transition::{Transition, fallback_tier, transition};

/// The tier for the next session and an optional one-off speed.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkDecision {
    /// Next tier.
    pub tier: WalkTier,
    /// Speed recommended for the next session only.
    pub speed_override: Option<f64>,
    /// Why.
    pub explanation: Explanation,
}

/// Decides walk tiers and plans sessions.
pub struct WalkEngine {
    rules: WalkRules,
    adapter: ContentAdapter,
    rng: Mutex<StdRng>,
}

impl WalkEngine {
    /// Create an engine.
    pub fn new(rules: WalkRules, adapter: ContentAdapter, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rules,
            adapter,
            rng: Mutex::new(rng),
        }
    }

    /// Decide the tier of the next session from history (newest first).
    pub fn decide_initial_tier(
        &self,
        history: &[AttemptRecord],
        today: NaiveDate,
    ) -> WalkDecision {
        let last = history.iter().find_map(|a| match a.tier {
            GameTier::Walk(t) => Some((t, a)),
            _ => None,
        });
        let previous = last.map(|(t, a)| (t, a.success));
        let new_day = last.is_some_and(|(_, a)| a.date < today);
        let previous_tier = previous.map(|(t, _)| GameTier::from(t));

        match transition(previous, new_day) {
            Transition::Settled(tier, reason) => WalkDecision {
                tier,
                speed_override: None,
                explanation: Explanation::new(previous_tier, tier.into(), reason),
            },
            Transition::HardLoss => self.analyze_hard_loss(history, last.map(|(_, a)| a)),
        }
    }

    fn analyze_hard_loss(
        &self,
        history: &[AttemptRecord],
        last: Option<&AttemptRecord>,
    ) -> WalkDecision {
        let hard: Vec<&AttemptRecord> = history
            .iter()
            .filter(|a| a.tier == GameTier::Walk(WalkTier::Hard))
            .take(self.rules.hard_window)
            .collect();
        let avg_precision = if hard.is_empty() {
            0.0
        } else {
            hard.iter().map(|a| a.precision()).sum::<f64>() / hard.len() as f64
        };
        let previous_tier = Some(GameTier::Walk(WalkTier::Hard));

        let request = WalkRequest {
            tier: WalkTier::Hard,
            last_hits: last.map_or(0, |a| a.hits),
            last_target: baseline(WalkTier::Hard).target_hits,
            hard_attempts: hard.len() as u32,
            avg_precision,
            speed_range: (self.rules.min_speed, self.rules.max_speed),
        };

        let source = match self.adapter.request(&request) {
            Ok(rec) => {
                let speed = rec.speed.clamp(self.rules.min_speed, self.rules.max_speed);
                tracing::info!(tier = %rec.tier, speed, "walk tier recommended after hard loss");
                let reason = if rec.reasoning.is_empty() {
                    "generator analysis of a hard loss".to_string()
                } else {
                    rec.reasoning
                };
                return WalkDecision {
                    tier: rec.tier,
                    speed_override: Some(speed),
                    explanation: Explanation::new(previous_tier, rec.tier.into(), reason)
                        .with_metric("avg_precision", avg_precision)
                        .with_metric("speed", speed)
                        .with_source(DecisionSource::Ai),
                };
            }
            Err(e) if self.adapter.is_enabled() => {
                tracing::warn!(error = %e, "walk analysis failed; using fallback");
                DecisionSource::Fallback
            }
            Err(_) => DecisionSource::Rules,
        };

        let tier = fallback_tier(avg_precision, &self.rules);
        WalkDecision {
            tier,
            speed_override: None,
            explanation: Explanation::new(
                previous_tier,
                tier.into(),
                format!(
                    "lost at hard with {avg_precision:.0}% average precision over {} sessions",
                    hard.len()
                ),
            )
            .with_decision(if tier == WalkTier::Hard {
                Adjustment::Maintain
            } else {
                Adjustment::Decrease
            })
            .with_metric("avg_precision", avg_precision)
            .with_source(source),
        }
    }

    /// Plan a session at `tier`.
    pub fn plan_session(&self, tier: WalkTier, speed_override: Option<f64>) -> SessionPlan {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        plan_session(tier, speed_override, &mut *rng)
    }

    /// Decide the tier and plan the session, consuming any speed override.
    pub fn start_session(
        &self,
        history: &[AttemptRecord],
        today: NaiveDate,
    ) -> (SessionPlan, Explanation) {
        let decision = self.decide_initial_tier(history, today);
        let plan = self.plan_session(decision.tier, decision.speed_override);
        tracing::debug!(tier = %plan.tier, speed = plan.ball_speed, "walk session planned");
        (plan, decision.explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Days;
    use cg_content::{AdapterError, ScriptedProvider};
    use cg_core::UserId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn session(tier: WalkTier, won: bool, hits: u32, errors: u32) -> AttemptRecord {
        AttemptRecord::new(UserId(1), tier, won)
            .on(today())
            .with_hits(hits)
            .with_errors(errors)
    }

    fn engine(adapter: ContentAdapter) -> WalkEngine {
        WalkEngine::new(WalkRules::default(), adapter, Some(7))
    }

    #[test]
    fn empty_history_is_tutorial() {
        let d = engine(ContentAdapter::disabled()).decide_initial_tier(&[], today());
        assert_eq!(d.tier, WalkTier::Tutorial);
    }

    #[test]
    fn new_day_resets_to_easy() {
        let h = vec![session(WalkTier::Hard, true, 7, 0)];
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let d = engine(ContentAdapter::disabled()).decide_initial_tier(&h, tomorrow);
        assert_eq!(d.tier, WalkTier::Easy);
    }

    #[test]
    fn hard_loss_fallback_uses_average_precision() {
        // newest first: 2/10, 1/10, 3/10 -> 20% average
        let h = vec![
            session(WalkTier::Hard, false, 2, 8),
            session(WalkTier::Hard, false, 1, 9),
            session(WalkTier::Hard, false, 3, 7),
        ];
        let provider = Arc::new(
            ScriptedProvider::new().with_failure(AdapterError::RateLimited("quota".into())),
        );
        let d = engine(ContentAdapter::new(provider)).decide_initial_tier(&h, today());
        assert_eq!(d.tier, WalkTier::Easy);
        assert_eq!(d.speed_override, None);
        assert_eq!(d.explanation.source, DecisionSource::Fallback);
    }

    #[test]
    fn hard_loss_close_call_stays_hard() {
        let h = vec![session(WalkTier::Hard, false, 6, 2)];
        let d = engine(ContentAdapter::disabled()).decide_initial_tier(&h, today());
        assert_eq!(d.tier, WalkTier::Hard);
        assert_eq!(d.explanation.source, DecisionSource::Rules);
    }

    #[test]
    fn generator_recommendation_overrides_speed_once() {
        let h = vec![session(WalkTier::Hard, false, 4, 6)];
        let reply = r#"{"nivel_recomendado": "intermedio", "razonamiento_breve": "close", "velocidad_ajustada": 9.0}"#;
        let provider = Arc::new(ScriptedProvider::new().with_response(reply).with_response(reply));
        let e = engine(ContentAdapter::new(provider));
        let d = e.decide_initial_tier(&h, today());
        assert_eq!(d.tier, WalkTier::Medium);
        assert_eq!(d.speed_override, Some(6.0));
        assert_eq!(d.explanation.source, DecisionSource::Ai);

        let (plan, _) = e.start_session(&h, today());
        assert!(plan.speed_overridden);
        assert_eq!(plan.ball_speed, 6.0);
        // the override is not remembered by a later plan
        assert_eq!(e.plan_session(WalkTier::Medium, None).ball_speed, 4.0);
    }
}
