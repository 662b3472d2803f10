//! Strict response schemas.
//!
//! Provider output is untrusted text. Each call type has a raw, all-optional
//! shape that is deserialized first and then converted field by field, so a
//! missing field is reported by name. Normalization (uppercase words,
//! trimmed text) happens here so callers only ever see canonical data.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use cg_core::{Adjustment, GridShape, MemoryTier, Tier, WalkTier};

use crate::error::{AdapterError, AdapterResult};

/// One word challenge: build `target`, ignoring `distractors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeItem {
    /// The word to build, uppercase.
    pub target: String,
    /// Extra letters mixed in, uppercase.
    pub distractors: Vec<String>,
    /// A clue that does not reveal the word.
    pub hint: String,
}

impl ChallengeItem {
    /// Build an item, normalizing case and whitespace.
    pub fn new(target: &str, distractors: &[&str], hint: &str) -> Self {
        Self {
            target: normalize_word(target),
            distractors: distractors.iter().map(|d| normalize_word(d)).collect(),
            hint: hint.trim().to_string(),
        }
    }
}

/// The generator's verdict after a loss at the hardest walk tier.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkRecommendation {
    /// Tier for the next session (never the tutorial).
    pub tier: WalkTier,
    /// Ball speed for the next session, not yet clamped.
    pub speed: f64,
    /// Short justification.
    pub reasoning: String,
}

/// The generator's decision and bundle for the next memory session.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecommendation {
    /// Direction of the change.
    pub adjustment: Adjustment,
    /// Short justification.
    pub reason: String,
    /// Tier of the proposed bundle.
    pub tier: MemoryTier,
    /// Board layout.
    pub grid: GridShape,
    /// Pairs implied by the grid.
    pub total_pairs: u32,
    /// Seconds allowed.
    pub time_limit_secs: u32,
    /// Seconds of face-up memorization.
    pub memorization_secs: u32,
}

/// The generator's one-word vote for an ambiguous train session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRecommendation {
    /// Direction of the change.
    pub adjustment: Adjustment,
    /// Short justification.
    pub reason: String,
}

/// Return the JSON object embedded in a completion, skipping prose and fences.
pub fn extract_json(raw: &str) -> AdapterResult<&str> {
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&raw[start..=end]),
        _ => Err(AdapterError::Malformed("no JSON object in response".into())),
    }
}

fn parse_json<T: DeserializeOwned>(raw: &str) -> AdapterResult<T> {
    serde_json::from_str(extract_json(raw)?).map_err(|e| AdapterError::Malformed(e.to_string()))
}

/// Uppercase and trim a word, keeping accents and Ñ.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_uppercase()
}

fn required<T>(value: Option<T>, field: &'static str) -> AdapterResult<T> {
    value.ok_or(AdapterError::MissingField(field))
}

fn invalid(field: &'static str, reason: impl Into<String>) -> AdapterError {
    AdapterError::InvalidField {
        field,
        reason: reason.into(),
    }
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(alias = "palabra_objetivo", alias = "word")]
    target: Option<String>,
    #[serde(alias = "letras_distractoras")]
    distractors: Option<Vec<String>>,
    #[serde(alias = "pista_contextual", alias = "clue")]
    hint: Option<String>,
}

fn item_from_raw(raw: RawItem) -> AdapterResult<ChallengeItem> {
    let target = normalize_word(&required(raw.target, "target")?);
    if target.is_empty() || !target.chars().all(char::is_alphabetic) {
        return Err(invalid("target", format!("'{target}' is not a single word")));
    }
    let distractors = required(raw.distractors, "distractors")?
        .iter()
        .map(|d| normalize_word(d))
        .collect::<Vec<_>>();
    if distractors
        .iter()
        .any(|d| d.is_empty() || !d.chars().all(char::is_alphabetic))
    {
        return Err(invalid("distractors", "distractors must be letters"));
    }
    let hint = required(raw.hint, "hint")?.trim().to_string();
    if hint.is_empty() {
        return Err(invalid("hint", "hint must not be blank"));
    }
    Ok(ChallengeItem {
        target,
        distractors,
        hint,
    })
}

#[derive(Deserialize)]
struct RawBatch {
    #[serde(alias = "palabras", alias = "words")]
    items: Option<Vec<serde_json::Value>>,
}

/// Parse a batch response.
///
/// Individual invalid items, duplicates, and words in `avoid` are dropped;
/// the batch fails only when nothing usable remains.
pub fn parse_batch(raw: &str, avoid: &[String]) -> AdapterResult<Vec<ChallengeItem>> {
    let batch: RawBatch = parse_json(raw)?;
    let values = required(batch.items, "items")?;
    let mut seen: HashSet<String> = avoid.iter().map(|w| normalize_word(w)).collect();
    let mut items = Vec::with_capacity(values.len());
    for value in values {
        let parsed = serde_json::from_value::<RawItem>(value)
            .map_err(|e| AdapterError::Malformed(e.to_string()))
            .and_then(item_from_raw);
        match parsed {
            Ok(item) if seen.insert(item.target.clone()) => items.push(item),
            Ok(item) => tracing::debug!(target_word = %item.target, "dropping repeated word"),
            Err(e) => tracing::debug!(error = %e, "dropping invalid batch item"),
        }
    }
    if items.is_empty() {
        return Err(invalid("items", "no valid items in batch"));
    }
    Ok(items)
}

#[derive(Deserialize)]
struct RawWalk {
    #[serde(alias = "nivel_recomendado", alias = "level")]
    tier: Option<String>,
    #[serde(alias = "velocidad_ajustada")]
    speed: Option<f64>,
    #[serde(alias = "razonamiento_breve", alias = "reason")]
    reasoning: Option<String>,
}

/// Parse a walk recommendation.
pub fn parse_walk(raw: &str) -> AdapterResult<WalkRecommendation> {
    let raw: RawWalk = parse_json(raw)?;
    let label = required(raw.tier, "tier")?;
    let tier = WalkTier::parse(&label)
        .filter(|t| *t != WalkTier::Tutorial)
        .ok_or_else(|| invalid("tier", format!("'{label}' is not easy, medium, or hard")))?;
    let speed = required(raw.speed, "speed")?;
    if !speed.is_finite() || speed <= 0.0 {
        return Err(invalid("speed", format!("{speed} is not a positive speed")));
    }
    Ok(WalkRecommendation {
        tier,
        speed,
        reasoning: raw.reasoning.unwrap_or_default().trim().to_string(),
    })
}

#[derive(Deserialize)]
struct RawMemoryConfig {
    #[serde(alias = "difficulty_label", alias = "tier")]
    difficulty_level: Option<String>,
    grid_rows: Option<u32>,
    grid_cols: Option<u32>,
    time_limit: Option<u32>,
    memorization_time: Option<u32>,
}

#[derive(Deserialize)]
struct RawMemory {
    #[serde(alias = "ai_decision", alias = "adjustment_decision")]
    decision: Option<String>,
    reason: Option<String>,
    #[serde(alias = "next_session_config")]
    next_config: Option<RawMemoryConfig>,
}

/// Bounds a memory recommendation must respect.
#[derive(Debug, Clone)]
pub struct MemoryBounds {
    /// Each tier with the one board layout it plays on.
    pub ladder: Vec<(MemoryTier, GridShape)>,
    /// Inclusive time-limit range in seconds.
    pub time_limit_secs: (u32, u32),
    /// Inclusive memorization range in seconds.
    pub memorization_secs: (u32, u32),
}

/// Parse a memory recommendation and check it against `bounds`.
pub fn parse_memory(raw: &str, bounds: &MemoryBounds) -> AdapterResult<MemoryRecommendation> {
    let raw: RawMemory = parse_json(raw)?;
    let label = required(raw.decision, "decision")?;
    let adjustment = Adjustment::parse(&label)
        .ok_or_else(|| invalid("decision", format!("unknown decision '{label}'")))?;
    let next = required(raw.next_config, "next_config")?;

    let tier_label = required(next.difficulty_level, "difficulty_level")?;
    let tier = MemoryTier::parse(&tier_label)
        .ok_or_else(|| invalid("difficulty_level", format!("unknown tier '{tier_label}'")))?;
    let grid = GridShape::new(
        required(next.grid_rows, "grid_rows")?,
        required(next.grid_cols, "grid_cols")?,
    );
    let expected = bounds
        .ladder
        .iter()
        .find(|(t, _)| *t == tier)
        .map(|(_, g)| *g)
        .ok_or_else(|| invalid("difficulty_level", format!("{tier} is not on the ladder")))?;
    if grid != expected {
        return Err(invalid("grid", format!("{tier} plays on {expected}, not {grid}")));
    }
    let total_pairs = grid
        .pairs()
        .ok_or_else(|| invalid("grid", format!("{grid} has an odd number of cards")))?;

    let time_limit_secs = required(next.time_limit, "time_limit")?;
    let (lo, hi) = bounds.time_limit_secs;
    if !(lo..=hi).contains(&time_limit_secs) {
        return Err(invalid("time_limit", format!("{time_limit_secs} outside {lo}..={hi}")));
    }
    let memorization_secs = required(next.memorization_time, "memorization_time")?;
    let (lo, hi) = bounds.memorization_secs;
    if !(lo..=hi).contains(&memorization_secs) {
        return Err(invalid(
            "memorization_time",
            format!("{memorization_secs} outside {lo}..={hi}"),
        ));
    }

    Ok(MemoryRecommendation {
        adjustment,
        reason: raw.reason.unwrap_or_default().trim().to_string(),
        tier,
        grid,
        total_pairs,
        time_limit_secs,
        memorization_secs,
    })
}

#[derive(Deserialize)]
struct RawTrain {
    #[serde(alias = "decision")]
    d: Option<String>,
    #[serde(alias = "reason")]
    r: Option<String>,
}

/// Parse a train vote (`{"d": "up"|"down"|"keep", "r": "..."}`).
pub fn parse_train(raw: &str) -> AdapterResult<TrainRecommendation> {
    let raw: RawTrain = parse_json(raw)?;
    let label = required(raw.d, "d")?;
    let adjustment = Adjustment::parse(&label)
        .ok_or_else(|| invalid("d", format!("expected up, down, or keep, got '{label}'")))?;
    Ok(TrainRecommendation {
        adjustment,
        reason: raw.r.unwrap_or_default().trim().to_string(),
    })
}
