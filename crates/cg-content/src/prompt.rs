//! Typed requests: each knows how to phrase its prompt and how to parse
//! the answer.
//!
//! Prompts always state the current tier and the numeric bounds the answer
//! must respect, and ask for a single JSON object. The parser for each
//! request enforces the same bounds.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use cg_core::{GridShape, MemoryTier, TrainTier, WalkTier, WordTier};

use crate::error::AdapterResult;
use crate::schema::{
    self, ChallengeItem, MemoryBounds, MemoryRecommendation, TrainRecommendation,
    WalkRecommendation,
};

/// A typed call to the content generator.
pub trait ContentRequest {
    /// The validated answer.
    type Response;

    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    /// Render the prompt text.
    fn prompt(&self) -> String;

    /// Validate and normalize the raw completion.
    fn parse(&self, raw: &str) -> AdapterResult<Self::Response>;
}

/// Direction of recent word performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Later attempts are clearly better than earlier ones.
    Improving,
    /// Later attempts are clearly worse.
    Worsening,
    /// No clear change.
    Stable,
    /// Too few attempts to tell.
    #[default]
    InsufficientData,
}

impl Trend {
    /// Stable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Worsening => "worsening",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Aggregate of a user's recent word attempts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Attempts considered.
    pub attempts: u32,
    /// Percentage of successful attempts.
    pub success_rate: f64,
    /// Mean errors per attempt.
    pub avg_errors: f64,
    /// Mean seconds per attempt.
    pub avg_time_secs: f64,
    /// Mean hints per attempt.
    pub avg_hints: f64,
    /// Direction of recent performance.
    pub trend: Trend,
}

/// Ask for a batch of word challenges.
#[derive(Debug, Clone)]
pub struct WordBatchRequest {
    /// Tier the words are for.
    pub tier: WordTier,
    /// How many items to ask for.
    pub count: usize,
    /// Inclusive word-length range to suggest.
    pub word_length: (usize, usize),
    /// Maximum distractor letters per item.
    pub max_distractors: usize,
    /// Recent words not to repeat.
    pub avoid: Vec<String>,
    /// Recent performance, for tailoring.
    pub performance: PerformanceSummary,
}

impl ContentRequest for WordBatchRequest {
    type Response = Vec<ChallengeItem>;

    fn kind(&self) -> &'static str {
        "word_batch"
    }

    fn prompt(&self) -> String {
        let p = &self.performance;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Generate {} Spanish word-building challenges for an older adult.",
            self.count
        );
        let _ = writeln!(out, "Current tier: {}.", self.tier);
        let _ = writeln!(
            out,
            "Each word: one common noun, {} to {} letters, uppercase, at most {} distractor letters.",
            self.word_length.0, self.word_length.1, self.max_distractors
        );
        let _ = writeln!(
            out,
            "Recent performance: {} attempts, {:.0}% success, {:.1} errors, {:.1}s, {:.1} hints, trend {}.",
            p.attempts, p.success_rate, p.avg_errors, p.avg_time_secs, p.avg_hints, p.trend
        );
        if !self.avoid.is_empty() {
            let _ = writeln!(out, "Do not use: {}.", self.avoid.join(", "));
        }
        out.push_str(
            "The hint must not contain the word.\n\
             Reply with only JSON: {\"items\": [{\"target\": \"...\", \"distractors\": [\"...\"], \"hint\": \"...\"}]}",
        );
        out
    }

    fn parse(&self, raw: &str) -> AdapterResult<Self::Response> {
        schema::parse_batch(raw, &self.avoid)
    }
}

/// Ask for a walk tier after a loss at the hardest tier.
#[derive(Debug, Clone)]
pub struct WalkRequest {
    /// Tier of the session just lost.
    pub tier: WalkTier,
    /// Hits in the session just lost.
    pub last_hits: u32,
    /// Hits needed to win it.
    pub last_target: u32,
    /// Recent sessions at the hardest tier.
    pub hard_attempts: u32,
    /// Their mean precision, percent.
    pub avg_precision: f64,
    /// Allowed ball speed range.
    pub speed_range: (f64, f64),
}

impl ContentRequest for WalkRequest {
    type Response = WalkRecommendation;

    fn kind(&self) -> &'static str {
        "walk_tier"
    }

    fn prompt(&self) -> String {
        format!(
            "An older adult lost a ball-tapping walk session at tier {tier} \
             ({hits}/{target} hits).\n\
             Over the last {n} sessions at this tier their precision averaged {avg:.0}%.\n\
             Choose the next tier: easy, medium, or hard.\n\
             Choose a ball speed between {lo:.1} and {hi:.1}.\n\
             Reply with only JSON: {{\"tier\": \"easy|medium|hard\", \"speed\": 0.0, \"reasoning\": \"...\"}}",
            tier = self.tier,
            hits = self.last_hits,
            target = self.last_target,
            n = self.hard_attempts,
            avg = self.avg_precision,
            lo = self.speed_range.0,
            hi = self.speed_range.1,
        )
    }

    fn parse(&self, raw: &str) -> AdapterResult<Self::Response> {
        schema::parse_walk(raw)
    }
}

/// Ask for the next memory bundle after a session.
#[derive(Debug, Clone)]
pub struct MemoryRequest {
    /// Tier of the session just played.
    pub tier: MemoryTier,
    /// Whether every pair was found.
    pub completed: bool,
    /// Seconds used.
    pub elapsed_secs: f64,
    /// Seconds allowed.
    pub time_limit_secs: u32,
    /// Mismatched flips.
    pub mistakes: u32,
    /// Pairs found.
    pub pairs_found: u32,
    /// Pairs on the board.
    pub total_pairs: u32,
    /// Rule-based score, 0 to 10.
    pub score: f64,
    /// Tier ladder with each tier's layout.
    pub ladder: Vec<(MemoryTier, GridShape)>,
    /// Inclusive time-limit range in seconds.
    pub time_limit_range: (u32, u32),
    /// Inclusive memorization range in seconds.
    pub memorization_range: (u32, u32),
}

impl ContentRequest for MemoryRequest {
    type Response = MemoryRecommendation;

    fn kind(&self) -> &'static str {
        "memory_bundle"
    }

    fn prompt(&self) -> String {
        let ladder = self
            .ladder
            .iter()
            .map(|(tier, grid)| format!("{tier} ({grid})"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "An older adult played a card-matching memory game at tier {tier}.\n\
             Completed: {completed}. Time: {elapsed:.0}s of {limit}s. Mistakes: {mistakes}. \
             Pairs: {found}/{total}. Score: {score:.1}/10.\n\
             Tiers and layouts: {ladder}.\n\
             Decide LEVEL_UP, MAINTAIN, or LEVEL_DOWN and propose the next session.\n\
             time_limit must be between {tl_lo} and {tl_hi}; memorization_time between {mz_lo} and {mz_hi}; \
             the grid must be one of the layouts above.\n\
             Reply with only JSON: {{\"ai_decision\": \"...\", \"reason\": \"...\", \"next_config\": \
             {{\"difficulty_level\": \"...\", \"grid_rows\": 0, \"grid_cols\": 0, \"time_limit\": 0, \"memorization_time\": 0}}}}",
            tier = self.tier,
            completed = self.completed,
            elapsed = self.elapsed_secs,
            limit = self.time_limit_secs,
            mistakes = self.mistakes,
            found = self.pairs_found,
            total = self.total_pairs,
            score = self.score,
            tl_lo = self.time_limit_range.0,
            tl_hi = self.time_limit_range.1,
            mz_lo = self.memorization_range.0,
            mz_hi = self.memorization_range.1,
        )
    }

    fn parse(&self, raw: &str) -> AdapterResult<Self::Response> {
        let bounds = MemoryBounds {
            ladder: self.ladder.clone(),
            time_limit_secs: self.time_limit_range,
            memorization_secs: self.memorization_range,
        };
        schema::parse_memory(raw, &bounds)
    }
}

/// Ask whether an ambiguous train session should move the difficulty.
#[derive(Debug, Clone)]
pub struct TrainRequest {
    /// Tier implied by the current speed.
    pub tier: TrainTier,
    /// Session accuracy, percent.
    pub accuracy: f64,
    /// Current train speed.
    pub speed: f64,
    /// Allowed speed range.
    pub speed_range: (f64, f64),
}

impl ContentRequest for TrainRequest {
    type Response = TrainRecommendation;

    fn kind(&self) -> &'static str {
        "train_vote"
    }

    fn prompt(&self) -> String {
        format!(
            "Train routing game at tier {tier}. Accuracy {acc:.0}%, speed {speed:.1} (range {lo:.1}-{hi:.1}).\n\
             Should difficulty go up, down, or keep?\n\
             Reply with only JSON: {{\"d\": \"up|down|keep\", \"r\": \"...\"}}",
            tier = self.tier,
            acc = self.accuracy,
            speed = self.speed,
            lo = self.speed_range.0,
            hi = self.speed_range.1,
        )
    }

    fn parse(&self, raw: &str) -> AdapterResult<Self::Response> {
        schema::parse_train(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_prompt_names_tier_bounds_and_exclusions() {
        let req = WordBatchRequest {
            tier: WordTier::Hard,
            count: 20,
            word_length: (7, 10),
            max_distractors: 2,
            avoid: vec!["CASA".into(), "PERRO".into()],
            performance: PerformanceSummary::default(),
        };
        let prompt = req.prompt();
        assert!(prompt.contains("Generate 20"));
        assert!(prompt.contains("tier: hard"));
        assert!(prompt.contains("7 to 10 letters"));
        assert!(prompt.contains("Do not use: CASA, PERRO."));
        assert!(prompt.contains("insufficient_data"));
    }

    #[test]
    fn word_parse_drops_avoided_words() {
        let req = WordBatchRequest {
            tier: WordTier::Hard,
            count: 2,
            word_length: (7, 10),
            max_distractors: 2,
            avoid: vec!["CASA".into()],
            performance: PerformanceSummary::default(),
        };
        let items = req
            .parse(r#"{"items": [{"target": "casa", "distractors": [], "hint": "home"},
                                  {"target": "ventana", "distractors": [], "hint": "glass"}]}"#)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].target, "VENTANA");
    }

    #[test]
    fn memory_request_enforces_its_ladder() {
        let req = MemoryRequest {
            tier: MemoryTier::Easy,
            completed: true,
            elapsed_secs: 30.0,
            time_limit_secs: 90,
            mistakes: 0,
            pairs_found: 4,
            total_pairs: 4,
            score: 10.0,
            ladder: vec![(MemoryTier::Easy, GridShape::new(2, 4))],
            time_limit_range: (45, 300),
            memorization_range: (1, 10),
        };
        assert!(req.prompt().contains("between 45 and 300"));
        let raw = r#"{"ai_decision": "LEVEL_UP", "next_config": {"difficulty_level": "medium",
            "grid_rows": 3, "grid_cols": 4, "time_limit": 120, "memorization_time": 3}}"#;
        assert!(req.parse(raw).is_err());
    }

    #[test]
    fn train_prompt_mentions_range() {
        let req = TrainRequest {
            tier: TrainTier::Medium,
            accuracy: 70.0,
            speed: 4.2,
            speed_range: (3.0, 6.0),
        };
        assert!(req.prompt().contains("range 3.0-6.0"));
        assert_eq!(req.kind(), "train_vote");
    }
}
