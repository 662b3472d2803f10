//! Pure tier transitions for the word game.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cg_core::{Adjustment, AttemptRecord, Game, ProgressionState, Tier, WordTier};

use crate::config::WordRules;
use crate::decision::Explanation;

/// Progress toward the next promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordProgress {
    /// Successes counted so far, capped at `required`.
    pub completed: u32,
    /// Successes needed to promote.
    pub required: u32,
}

impl WordProgress {
    /// Completion as a percentage.
    pub fn percent(&self) -> f64 {
        if self.required == 0 {
            100.0
        } else {
            f64::from(self.completed) / f64::from(self.required) * 100.0
        }
    }
}

/// Decide the tier of the next word from history (newest first).
///
/// Demotion is checked before promotion. Records of other games are ignored.
pub fn decide_next_tier(
    history: &[AttemptRecord],
    today: NaiveDate,
    rules: &WordRules,
) -> (WordTier, Explanation) {
    let state = ProgressionState::<WordTier>::from_history(history, today);
    let lowest = WordTier::lowest();

    let Some(current) = state.tier else {
        return (
            lowest,
            Explanation::new(None, lowest.into(), "first session starts at the easiest tier"),
        );
    };

    if state.is_new_day {
        return (
            lowest,
            Explanation::new(Some(current.into()), lowest.into(), "new day restarts at the easiest tier"),
        );
    }

    let own: Vec<&AttemptRecord> = history.iter().filter(|a| a.game() == Game::Words).collect();
    if own.len() >= rules.demotion_window {
        let failures = own
            .iter()
            .take(rules.demotion_window)
            .filter(|a| !a.success)
            .count();
        if failures >= rules.demotion_failures {
            let next = current.step_down();
            return (
                next,
                Explanation::new(
                    Some(current.into()),
                    next.into(),
                    format!(
                        "{failures} of the last {} attempts failed",
                        rules.demotion_window
                    ),
                )
                .with_decision(Adjustment::Decrease)
                .with_metric("recent_failures", failures as f64),
            );
        }
    }

    let successes = state.consecutive_successes;
    if successes >= rules.promote_after {
        let next = current.step_up();
        return (
            next,
            Explanation::new(
                Some(current.into()),
                next.into(),
                format!("{successes} successes at {current}"),
            )
            .with_decision(Adjustment::Increase)
            .with_metric("run_successes", f64::from(successes)),
        );
    }

    (
        current,
        Explanation::new(
            Some(current.into()),
            current.into(),
            format!("{successes}/{} successes at {current}", rules.promote_after),
        )
        .with_metric("run_successes", f64::from(successes)),
    )
}

/// Progress toward promotion at `tier`.
///
/// Counts the current run only when it is at `tier`; a freshly decided tier
/// has no progress yet.
pub fn progress(
    history: &[AttemptRecord],
    today: NaiveDate,
    tier: WordTier,
    rules: &WordRules,
) -> WordProgress {
    let state = ProgressionState::<WordTier>::from_history(history, today);
    let completed = if state.tier == Some(tier) && !state.is_new_day {
        state.consecutive_successes.min(rules.promote_after)
    } else {
        0
    };
    WordProgress {
        completed,
        required: rules.promote_after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use cg_core::UserId;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    /// Build history newest-first from outcomes listed oldest-first, all on
    /// `today`, flagging tier changes the way the store does.
    fn history(plays: &[(WordTier, bool)]) -> Vec<AttemptRecord> {
        let mut out: Vec<AttemptRecord> = Vec::new();
        for (i, (tier, success)) in plays.iter().enumerate() {
            let mut a = AttemptRecord::new(UserId(1), *tier, *success)
                .on(today())
                .with_item(format!("W{i}"));
            a.mark_tier_change(out.last());
            out.push(a);
        }
        out.reverse();
        out
    }

    #[test]
    fn new_user_starts_easy() {
        let (tier, why) = decide_next_tier(&[], today(), &WordRules::default());
        assert_eq!(tier, WordTier::Easy);
        assert_eq!(why.previous_tier, None);
    }

    #[test]
    fn five_successes_promote() {
        let h = history(&[(WordTier::Easy, true); 5]);
        let (tier, why) = decide_next_tier(&h, today(), &WordRules::default());
        assert_eq!(tier, WordTier::Medium);
        assert_eq!(why.decision, Adjustment::Increase);
    }

    #[test]
    fn four_successes_stay() {
        let h = history(&[(WordTier::Medium, true); 4]);
        let (tier, _) = decide_next_tier(&h, today(), &WordRules::default());
        assert_eq!(tier, WordTier::Medium);
    }

    #[test]
    fn promotion_counts_only_since_tier_change() {
        let mut plays = vec![(WordTier::Easy, true); 5];
        plays.extend([(WordTier::Medium, true); 3]);
        let (tier, _) = decide_next_tier(&history(&plays), today(), &WordRules::default());
        assert_eq!(tier, WordTier::Medium);
        assert_eq!(
            progress(&history(&plays), today(), WordTier::Medium, &WordRules::default()).completed,
            3
        );
    }

    #[test]
    fn frustration_demotes_before_promotion() {
        let h = history(&[
            (WordTier::Medium, false),
            (WordTier::Medium, false),
            (WordTier::Medium, true),
            (WordTier::Medium, false),
            (WordTier::Medium, false),
        ]);
        let (tier, why) = decide_next_tier(&h, today(), &WordRules::default());
        assert_eq!(tier, WordTier::Easy);
        assert_eq!(why.decision, Adjustment::Decrease);
    }

    #[test]
    fn short_history_never_demotes() {
        let h = history(&[(WordTier::Easy, false); 4]);
        let (tier, _) = decide_next_tier(&h, today(), &WordRules::default());
        assert_eq!(tier, WordTier::Easy);
    }

    #[test]
    fn hard_is_the_ceiling() {
        let h = history(&[(WordTier::Hard, true); 6]);
        let (tier, _) = decide_next_tier(&h, today(), &WordRules::default());
        assert_eq!(tier, WordTier::Hard);
    }

    #[test]
    fn new_day_resets_to_easy() {
        let h = history(&[(WordTier::Hard, true); 3]);
        let tomorrow = today().checked_add_days(Days::new(1)).unwrap();
        let (tier, why) = decide_next_tier(&h, tomorrow, &WordRules::default());
        assert_eq!(tier, WordTier::Easy);
        assert_eq!(why.previous_tier, Some(WordTier::Hard.into()));
        assert_eq!(progress(&h, tomorrow, WordTier::Easy, &WordRules::default()).completed, 0);
    }

    #[test]
    fn progress_is_capped() {
        let h = history(&[(WordTier::Hard, true); 8]);
        let p = progress(&h, today(), WordTier::Hard, &WordRules::default());
        assert_eq!(p.completed, 5);
        assert_eq!(p.percent(), 100.0);
    }

    fn arb_plays() -> impl Strategy<Value = Vec<(WordTier, bool)>> {
        prop::collection::vec(
            (prop::sample::select(WordTier::ALL.to_vec()), any::<bool>()),
            0..30,
        )
    }

    proptest! {
        #[test]
        fn decision_is_idempotent(plays in arb_plays()) {
            let h = history(&plays);
            let rules = WordRules::default();
            prop_assert_eq!(
                decide_next_tier(&h, today(), &rules).0,
                decide_next_tier(&h, today(), &rules).0
            );
        }

        #[test]
        fn frustration_never_promotes(
            prefix in arb_plays(),
            tier in prop::sample::select(WordTier::ALL.to_vec()),
            lucky in 0usize..6,
        ) {
            // five newest plays at one tier, at most one of them (index `lucky`) a success
            let mut plays = prefix;
            plays.extend((0..5).map(|i| (tier, i == lucky)));
            let h = history(&plays);
            prop_assert!(h.iter().take(5).filter(|a| !a.success).count() >= 4);
            let (next, _) = decide_next_tier(&h, today(), &WordRules::default());
            prop_assert!(next <= tier);
        }

        #[test]
        fn five_run_successes_promote(prefix in arb_plays()) {
            let mut plays = prefix;
            let current = plays.last().map_or(WordTier::Easy, |p| p.0);
            // force a tier change so the run starts fresh
            let start = if current == WordTier::Easy { WordTier::Medium } else { WordTier::Easy };
            plays.extend([(start, true); 5]);
            let (next, _) = decide_next_tier(&history(&plays), today(), &WordRules::default());
            prop_assert!(next > start);
        }
    }
}
