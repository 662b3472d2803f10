//! The word engine: tier decision plus item selection.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use cg_content::schema::normalize_word;
use cg_content::{
    AdapterError, ChallengeItem, ContentAdapter, ContentBuffer, PerformanceSummary,
    WordBatchRequest,
};
use cg_core::{AttemptRecord, Game, GameTier, WordTier};

use crate::config::WordRules;
use crate::decision::{DecisionSource, Explanation};
use crate::error::{EngineError, EngineResult};
use crate::words::pool::WordPool;
use crate::words::summary::summarize;
use crate::words::transition::{WordProgress, decide_next_tier, progress};

/// Word-length range requested for generated hard words.
const HARD_WORD_LENGTH: (usize, usize) = (5, 7);

/// Distractor letters allowed per generated hard word.
const HARD_MAX_DISTRACTORS: usize = 1;

/// Shared buffer of generated items, keyed by game and tier.
pub type ItemBuffer = ContentBuffer<GameTier, ChallengeItem>;

/// The next word to play, with its progression context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChallenge {
    /// The item.
    pub item: ChallengeItem,
    /// Tier it was drawn for.
    pub tier: WordTier,
    /// Tier of the previous attempt.
    pub previous_tier: Option<WordTier>,
    /// Whether the tier differs from the previous attempt's (or this is the
    /// first attempt).
    pub tier_changed: bool,
    /// Progress toward promotion.
    pub progress: WordProgress,
    /// Where the item came from.
    pub source: DecisionSource,
    /// Why this tier.
    pub explanation: Explanation,
}

/// Decides word tiers and draws items.
pub struct WordEngine {
    rules: WordRules,
    pool: WordPool,
    buffer: Arc<ItemBuffer>,
    adapter: ContentAdapter,
    rng: Mutex<StdRng>,
}

impl WordEngine {
    /// Create an engine. The buffer is shared with any other engine
    /// instance that should draw from the same batches.
    pub fn new(
        rules: WordRules,
        pool: WordPool,
        adapter: ContentAdapter,
        buffer: Arc<ItemBuffer>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rules,
            pool,
            buffer,
            adapter,
            rng: Mutex::new(rng),
        }
    }

    /// The rules in effect.
    pub fn rules(&self) -> &WordRules {
        &self.rules
    }

    /// The shared item buffer.
    pub fn buffer(&self) -> &Arc<ItemBuffer> {
        &self.buffer
    }

    /// Decide the tier of the next word from history (newest first).
    pub fn decide_next_tier(
        &self,
        history: &[AttemptRecord],
        today: NaiveDate,
    ) -> (WordTier, Explanation) {
        decide_next_tier(history, today, &self.rules)
    }

    /// Draw an item for `tier`, avoiding `recent` words.
    ///
    /// Easy and medium draw from the pool. Hard pops the shared buffer,
    /// refilling it with one batch call when it runs dry; if that fails the
    /// pool's hard fallback is used, and if there is none the failure is
    /// returned.
    pub fn decide_next_item(
        &self,
        tier: WordTier,
        recent: &[String],
        performance: &PerformanceSummary,
    ) -> EngineResult<(ChallengeItem, DecisionSource)> {
        if tier != WordTier::Hard {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            return self
                .pool
                .draw(tier, recent, &mut *rng)
                .map(|item| (item, DecisionSource::Rules))
                .ok_or_else(|| EngineError::ContentUnavailable {
                    tier: tier.into(),
                    source: AdapterError::Unavailable,
                });
        }

        let key = GameTier::from(tier);
        let avoid: Vec<String> = recent.iter().map(|w| normalize_word(w)).collect();
        let request = WordBatchRequest {
            tier,
            count: self.rules.hard_batch_size,
            word_length: HARD_WORD_LENGTH,
            max_distractors: HARD_MAX_DISTRACTORS,
            avoid: avoid.clone(),
            performance: performance.clone(),
        };
        let popped = self.buffer.pop_or_refill(
            &key,
            |item| !avoid.contains(&item.target),
            || {
                let batch = self.adapter.request(&request)?;
                tracing::info!(%tier, items = batch.len(), "refilled word buffer");
                Ok::<_, AdapterError>(batch)
            },
        );

        let err = match popped {
            Ok(Some(item)) => return Ok((item, DecisionSource::Ai)),
            Ok(None) => AdapterError::InvalidField {
                field: "items",
                reason: "batch held only recently played words".into(),
            },
            Err(e) => e,
        };

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        match self.pool.draw(tier, recent, &mut *rng) {
            Some(item) => {
                tracing::warn!(error = %err, "hard word generation failed; using fallback pool");
                Ok((item, DecisionSource::Fallback))
            }
            None => {
                tracing::warn!(error = %err, "hard word generation failed with no fallback");
                Err(EngineError::ContentUnavailable {
                    tier: key,
                    source: err,
                })
            }
        }
    }

    /// Decide the tier and draw the next challenge.
    pub fn next_challenge(
        &self,
        history: &[AttemptRecord],
        today: NaiveDate,
    ) -> EngineResult<WordChallenge> {
        let (tier, explanation) = self.decide_next_tier(history, today);
        let previous_tier = history
            .iter()
            .find(|a| a.game() == Game::Words)
            .and_then(|a| match a.tier {
                GameTier::Words(t) => Some(t),
                _ => None,
            });
        let recent: Vec<String> = history
            .iter()
            .filter(|a| a.game() == Game::Words)
            .filter_map(|a| a.item.clone())
            .take(self.rules.recent_exclusion)
            .collect();
        let performance = summarize(history, self.rules.summary_window);
        let (item, source) = self.decide_next_item(tier, &recent, &performance)?;
        tracing::debug!(%tier, word = %item.target, %source, "next word");

        Ok(WordChallenge {
            item,
            tier,
            previous_tier,
            tier_changed: previous_tier != Some(tier),
            progress: progress(history, today, tier, &self.rules),
            source,
            explanation,
        })
    }
}
