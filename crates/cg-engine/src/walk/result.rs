//! A finished walk session as reported by the game.

use serde::{Deserialize, Serialize};

use cg_core::{AttemptRecord, UserId, WalkParams, WalkTier};

use crate::error::{EngineError, EngineResult};

/// Raw counters from one walk session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkSessionResult {
    /// Tier the session was played at.
    pub tier: WalkTier,
    /// Balls of the correct colour caught.
    pub hits: u32,
    /// Balls of another colour caught.
    pub wrong: u32,
    /// Correct balls that got away.
    pub missed: u32,
    /// Whether the session ran to its end rather than being abandoned.
    pub completed: bool,
    /// Seconds played.
    pub duration_secs: f64,
}

impl WalkSessionResult {
    /// `hits / (hits + wrong + missed)` as a percentage.
    pub fn precision(&self) -> f64 {
        let total = f64::from(self.hits) + f64::from(self.wrong) + f64::from(self.missed);
        if total == 0.0 {
            0.0
        } else {
            f64::from(self.hits) / total * 100.0
        }
    }

    /// Won iff the session completed and the target was reached.
    pub fn is_victory(&self, target_hits: u32) -> bool {
        self.completed && self.hits >= target_hits
    }

    /// Check the result against the session that was planned.
    pub fn validate(&self, planned: &WalkParams) -> EngineResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(EngineError::Validation(format!(
                "duration must be a non-negative number, got {}",
                self.duration_secs
            )));
        }
        if self
            .hits
            .checked_add(self.wrong)
            .and_then(|n| n.checked_add(self.missed))
            .is_none()
        {
            return Err(EngineError::Validation(format!(
                "ball counts out of range: {} hits, {} wrong, {} missed",
                self.hits, self.wrong, self.missed
            )));
        }
        if self.tier != planned.tier {
            return Err(EngineError::Validation(format!(
                "session was planned at {}, reported at {}",
                planned.tier, self.tier
            )));
        }
        Ok(())
    }

    /// The attempt record for this session.
    pub fn to_attempt(&self, user: UserId, target_hits: u32) -> AttemptRecord {
        AttemptRecord::new(user, self.tier, self.is_victory(target_hits))
            .with_hits(self.hits)
            .with_errors(self.wrong.saturating_add(self.missed))
            .with_time(self.duration_secs)
    }
}
