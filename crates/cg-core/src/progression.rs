use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::attempt::AttemptRecord;
use crate::tier::Tier;

/// Where a user stands in one game, recovered from attempt history.
///
/// Never stored on its own. The current run starts at the most recent
/// attempt flagged `tier_changed` (inclusive) and never crosses a tier or a
/// calendar-day boundary, so `consecutive_successes` is zero on a new day and
/// right after a tier change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState<T> {
    /// Tier of the most recent attempt, `None` for a new user.
    pub tier: Option<T>,
    /// Successful attempts in the current run.
    pub consecutive_successes: u32,
    /// Attempts in the current run.
    pub run_length: u32,
    /// Date of the most recent attempt.
    pub last_played: Option<NaiveDate>,
    /// True when the most recent attempt was before `today`.
    pub is_new_day: bool,
}

impl<T: Tier> ProgressionState<T> {
    /// Derive the state from history ordered newest-first.
    ///
    /// Records of other games are ignored.
    pub fn from_history(history: &[AttemptRecord], today: NaiveDate) -> Self {
        let mut own = history
            .iter()
            .filter_map(|a| T::from_game_tier(a.tier).map(|tier| (tier, a)));

        let Some((tier, newest)) = own.next() else {
            return Self {
                tier: None,
                consecutive_successes: 0,
                run_length: 0,
                last_played: None,
                is_new_day: false,
            };
        };

        let is_new_day = newest.date < today;
        let last_played = Some(newest.date);
        if is_new_day {
            return Self {
                tier: Some(tier),
                consecutive_successes: 0,
                run_length: 0,
                last_played,
                is_new_day,
            };
        }

        let mut successes = u32::from(newest.success);
        let mut run_length = 1;
        if !newest.tier_changed {
            for (t, attempt) in own {
                if t != tier || attempt.date != newest.date {
                    break;
                }
                run_length += 1;
                successes += u32::from(attempt.success);
                if attempt.tier_changed {
                    break;
                }
            }
        }

        Self {
            tier: Some(tier),
            consecutive_successes: successes,
            run_length,
            last_played,
            is_new_day,
        }
    }
}
