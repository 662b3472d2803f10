use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::game::{Game, UserId};
use crate::tier::GameTier;

/// Unique identifier of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub Uuid);

impl AttemptId {
    /// Generate a new random attempt ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// One played unit: a word, a walk segment, a memory round, or a train round.
///
/// Records are immutable once appended. `hits` counts correct actions (balls
/// caught, pairs found, trains routed); `errors` counts wrong ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Unique identifier.
    pub id: AttemptId,
    /// The player.
    pub user_id: UserId,
    /// When the attempt finished.
    pub timestamp: DateTime<Utc>,
    /// Calendar day the attempt counts toward.
    pub date: NaiveDate,
    /// Game and tier the attempt was played at.
    pub tier: GameTier,
    /// Whether the attempt was won/completed.
    pub success: bool,
    /// Correct actions.
    #[serde(default)]
    pub hits: u32,
    /// Wrong actions.
    #[serde(default)]
    pub errors: u32,
    /// Seconds spent.
    #[serde(default)]
    pub time_taken_secs: f64,
    /// Hints or assists used.
    #[serde(default)]
    pub hints: u32,
    /// The item played, e.g. the target word.
    #[serde(default)]
    pub item: Option<String>,
    /// Set when this attempt starts a new run: first play, a different tier
    /// than the previous attempt, or a new calendar day.
    #[serde(default)]
    pub tier_changed: bool,
}

impl AttemptRecord {
    /// Create an attempt finishing now.
    pub fn new(user_id: UserId, tier: impl Into<GameTier>, success: bool) -> Self {
        let timestamp = Utc::now();
        Self {
            id: AttemptId::new(),
            user_id,
            timestamp,
            date: timestamp.date_naive(),
            tier: tier.into(),
            success,
            hits: 0,
            errors: 0,
            time_taken_secs: 0.0,
            hints: 0,
            item: None,
            tier_changed: false,
        }
    }

    /// Set the finishing time; the calendar date follows it.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self.date = timestamp.date_naive();
        self
    }

    /// Override the calendar date only.
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Set the correct-action count.
    pub fn with_hits(mut self, hits: u32) -> Self {
        self.hits = hits;
        self
    }

    /// Set the error count.
    pub fn with_errors(mut self, errors: u32) -> Self {
        self.errors = errors;
        self
    }

    /// Set the time taken in seconds.
    pub fn with_time(mut self, secs: f64) -> Self {
        self.time_taken_secs = secs;
        self
    }

    /// Set the hint count.
    pub fn with_hints(mut self, hints: u32) -> Self {
        self.hints = hints;
        self
    }

    /// Set the played item.
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// The game this attempt belongs to.
    pub fn game(&self) -> Game {
        self.tier.game()
    }

    /// `hits / (hits + errors)` as a percentage, 0 when nothing happened.
    pub fn precision(&self) -> f64 {
        let total = f64::from(self.hits) + f64::from(self.errors);
        if total == 0.0 {
            0.0
        } else {
            f64::from(self.hits) / total * 100.0
        }
    }

    /// Compute `tier_changed` against the previous attempt in the same game.
    pub fn mark_tier_change(&mut self, previous: Option<&AttemptRecord>) {
        self.tier_changed = match previous {
            None => true,
            Some(prev) => prev.tier != self.tier || prev.date < self.date,
        };
    }

    /// Reject records with missing or malformed fields.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.time_taken_secs.is_finite() || self.time_taken_secs < 0.0 {
            return Err(CoreError::Validation(format!(
                "time_taken_secs must be a non-negative number, got {}",
                self.time_taken_secs
            )));
        }
        if let Some(item) = &self.item
            && item.trim().is_empty()
        {
            return Err(CoreError::Validation("item must not be blank".into()));
        }
        if self.game() == Game::Words && self.item.is_none() {
            return Err(CoreError::Validation(
                "word attempts must name the target word".into(),
            ));
        }
        Ok(())
    }

    /// Fail unless this record belongs to `game`.
    pub fn expect_game(&self, game: Game) -> CoreResult<()> {
        if self.game() == game {
            Ok(())
        } else {
            Err(CoreError::WrongGame {
                expected: game,
                found: self.game(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::{WalkTier, WordTier};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn precision_percent() {
        let a = AttemptRecord::new(UserId(1), WalkTier::Hard, false)
            .with_hits(3)
            .with_errors(1);
        assert!((a.precision() - 75.0).abs() < 1e-9);
        let empty = AttemptRecord::new(UserId(1), WalkTier::Hard, false);
        assert_eq!(empty.precision(), 0.0);
        let saturated = AttemptRecord::new(UserId(1), WalkTier::Hard, false)
            .with_hits(u32::MAX)
            .with_errors(u32::MAX);
        assert!((saturated.precision() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn first_attempt_is_a_tier_change() {
        let mut a = AttemptRecord::new(UserId(1), WordTier::Easy, true).with_item("CASA");
        a.mark_tier_change(None);
        assert!(a.tier_changed);
    }

    #[test]
    fn same_tier_same_day_is_not_a_change() {
        let prev = AttemptRecord::new(UserId(1), WordTier::Easy, true).on(day(4));
        let mut next = AttemptRecord::new(UserId(1), WordTier::Easy, true).on(day(4));
        next.mark_tier_change(Some(&prev));
        assert!(!next.tier_changed);
    }

    #[test]
    fn new_day_or_new_tier_is_a_change() {
        let prev = AttemptRecord::new(UserId(1), WordTier::Easy, true).on(day(4));
        let mut next_day = AttemptRecord::new(UserId(1), WordTier::Easy, true).on(day(5));
        next_day.mark_tier_change(Some(&prev));
        assert!(next_day.tier_changed);

        let mut promoted = AttemptRecord::new(UserId(1), WordTier::Medium, true).on(day(4));
        promoted.mark_tier_change(Some(&prev));
        assert!(promoted.tier_changed);
    }

    #[test]
    fn word_attempt_requires_item() {
        let a = AttemptRecord::new(UserId(1), WordTier::Easy, true);
        assert!(matches!(a.validate(), Err(CoreError::Validation(_))));
        let ok = a.with_item("SOL");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn negative_time_rejected() {
        let a = AttemptRecord::new(UserId(1), WalkTier::Easy, true).with_time(-1.0);
        assert!(a.validate().is_err());
        let nan = AttemptRecord::new(UserId(1), WalkTier::Easy, true).with_time(f64::NAN);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn expect_game_reports_mismatch() {
        let a = AttemptRecord::new(UserId(1), WalkTier::Easy, true);
        assert!(a.expect_game(Game::Walk).is_ok());
        assert!(matches!(
            a.expect_game(Game::Words),
            Err(CoreError::WrongGame { expected: Game::Words, found: Game::Walk })
        ));
    }

    #[test]
    fn at_sets_date_from_timestamp() {
        let ts = DateTime::parse_from_rfc3339("2024-03-09T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = AttemptRecord::new(UserId(1), WalkTier::Easy, true).at(ts);
        assert_eq!(a.date, day(9));
    }
}
