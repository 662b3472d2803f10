//! The service façade: engines plus persistence.
//!
//! Every write goes through one optimistic loop: read the config version
//! and history, decide, then commit the new config together with the
//! attempt. A conflicting concurrent writer forces a re-read and a fresh
//! decision, so two submissions from the same user can never both advance
//! from the same stale state.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cg_content::ContentAdapter;
use cg_core::{
    AttemptRecord, Commit, CoreError, DifficultyConfig, Game, GameParams, GameTier, MemoryParams,
    ProgressStore, TrainParams, UserId, WalkTier, WordParams, WordTier,
};

use crate::config::EngineConfig;
use crate::decision::Explanation;
use crate::error::{EngineError, EngineResult};
use crate::memory::{MemoryEngine, MemorySessionResult, tier_bundle};
use crate::train::{TrainCompletion, TrainEngine, TrainSessionResult, params_for};
use crate::walk::{SessionPlan, WalkEngine, WalkSessionResult, baseline};
use crate::words::engine::ItemBuffer;
use crate::words::{WordChallenge, WordEngine, WordPool};

/// History read per decision.
const HISTORY_LIMIT: usize = 200;

/// A played word as reported by the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordAttempt {
    /// The target word.
    pub word: String,
    /// Whether the word was built correctly.
    pub success: bool,
    /// Wrong letters placed.
    #[serde(default)]
    pub errors: u32,
    /// Seconds taken.
    #[serde(default)]
    pub time_secs: f64,
    /// Hints used.
    #[serde(default)]
    pub hints: u32,
}

/// Read-only aggregate of a user's history in one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    /// The user.
    pub user_id: UserId,
    /// The game.
    pub game: Game,
    /// Attempts recorded.
    pub attempts: usize,
    /// Successful attempts.
    pub successes: usize,
    /// Percentage of successful attempts.
    pub success_rate: f64,
    /// Date of the latest attempt.
    pub last_played: Option<NaiveDate>,
    /// Tier currently configured, if a config row exists.
    pub current_tier: Option<GameTier>,
}

/// Result of a decision that produced a new config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// The stored config.
    pub config: DifficultyConfig,
    /// Why it looks the way it does.
    pub explanation: Explanation,
}

/// What a decision closure hands back to the optimistic loop.
struct Decided<T> {
    params: GameParams,
    attempt: Option<AttemptRecord>,
    extra: T,
}

/// Engines wired to a store.
pub struct DifficultyService<S> {
    store: S,
    config: EngineConfig,
    words: WordEngine,
    walk: WalkEngine,
    memory: MemoryEngine,
    train: TrainEngine,
}

impl<S: ProgressStore> DifficultyService<S> {
    /// Build a service with the bundled word pool and a private buffer.
    pub fn new(store: S, config: EngineConfig, adapter: ContentAdapter) -> EngineResult<Self> {
        let buffer = Arc::new(ItemBuffer::new());
        Self::with_parts(store, config, adapter, WordPool::builtin(), buffer)
    }

    /// Build a service with an explicit word pool and shared item buffer.
    ///
    /// Fails with [`EngineError::Validation`] if `config` has inverted ranges.
    pub fn with_parts(
        store: S,
        config: EngineConfig,
        adapter: ContentAdapter,
        pool: WordPool,
        buffer: Arc<ItemBuffer>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let adapter = adapter.with_timeout(config.adapter_timeout());
        Ok(Self {
            words: WordEngine::new(config.words.clone(), pool, adapter.clone(), buffer, config.seed),
            walk: WalkEngine::new(config.walk.clone(), adapter.clone(), config.seed),
            memory: MemoryEngine::new(config.memory.clone(), adapter.clone()),
            train: TrainEngine::new(config.train.clone(), adapter),
            store,
            config,
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The engine configuration.
    pub fn engine_config(&self) -> &EngineConfig {
        &self.config
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn default_params(&self, game: Game) -> GameParams {
        match game {
            Game::Words => GameParams::Words(WordParams { tier: WordTier::Easy }),
            Game::Walk => GameParams::Walk(baseline(WalkTier::Tutorial)),
            Game::Memory => GameParams::Memory(self.memory.initial_params()),
            Game::Train => GameParams::Train(self.train.initial_params()),
        }
    }

    /// Clamp stored numbers back into range.
    fn heal(&self, params: GameParams) -> GameParams {
        match params {
            GameParams::Train(p) => {
                let healed = params_for(p.speed, p.spawn_rate, &self.config.train);
                if healed != p {
                    tracing::warn!(speed = p.speed, spawn = p.spawn_rate, "healed train config");
                }
                GameParams::Train(healed)
            }
            GameParams::Memory(p) if p.grid.pairs() != Some(p.total_pairs) => {
                tracing::warn!(tier = %p.tier, grid = %p.grid, "healed memory config");
                GameParams::Memory(MemoryParams {
                    consecutive_maintains: p.consecutive_maintains,
                    ..tier_bundle(p.tier)
                })
            }
            GameParams::Walk(p) if !p.ball_speed.is_finite() || p.ball_speed <= 0.0 => {
                tracing::warn!(tier = %p.tier, "healed walk config");
                GameParams::Walk(baseline(p.tier))
            }
            other => other,
        }
    }

    fn history(&self, user: UserId, game: Game) -> EngineResult<Vec<AttemptRecord>> {
        Ok(self.store.recent_attempts(user, game, HISTORY_LIMIT)?)
    }

    /// The config in effect, created with the default tier on first access.
    pub fn config(&self, user: UserId, game: Game) -> EngineResult<DifficultyConfig> {
        if let Some(stored) = self.store.load_config(user, game)? {
            let params = self.heal(stored.params.clone());
            return Ok(DifficultyConfig { params, ..stored });
        }
        let fresh = DifficultyConfig::new(user, self.default_params(game));
        match self.store.commit(Commit {
            config: fresh,
            expected_version: None,
            attempt: None,
        }) {
            Ok(created) => {
                tracing::debug!(%user, %game, "created default config");
                Ok(created)
            }
            Err(CoreError::VersionConflict { .. }) => self
                .store
                .load_config(user, game)?
                .ok_or_else(|| EngineError::Store(CoreError::Store("config vanished".into()))),
            Err(e) => Err(e.into()),
        }
    }

    /// Run `decide` under the optimistic loop and commit its result.
    fn update<T>(
        &self,
        user: UserId,
        game: Game,
        mut decide: impl FnMut(&DifficultyConfig, Vec<AttemptRecord>) -> EngineResult<Decided<T>>,
    ) -> EngineResult<(DifficultyConfig, T)> {
        let attempts = self.config.store_retries.max(1);
        for round in 1..=attempts {
            let stored = self.store.load_config(user, game)?;
            let expected_version = stored.as_ref().map(|c| c.version);
            let current = match stored {
                Some(c) => DifficultyConfig {
                    params: self.heal(c.params.clone()),
                    ..c
                },
                None => DifficultyConfig::new(user, self.default_params(game)),
            };
            let history = self.history(user, game)?;
            let decided = decide(&current, history)?;

            let config = DifficultyConfig {
                params: decided.params,
                ..current
            };
            match self.store.commit(Commit {
                config,
                expected_version,
                attempt: decided.attempt,
            }) {
                Ok(saved) => return Ok((saved, decided.extra)),
                Err(CoreError::VersionConflict { .. }) => {
                    tracing::debug!(%user, %game, round, "config changed concurrently; retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(EngineError::Contention {
            user,
            game,
            attempts,
        })
    }

    /// Prepend a freshly marked attempt to newest-first history.
    fn with_attempt(
        history: Vec<AttemptRecord>,
        mut attempt: AttemptRecord,
    ) -> (AttemptRecord, Vec<AttemptRecord>) {
        attempt.mark_tier_change(history.first());
        let mut all = Vec::with_capacity(history.len() + 1);
        all.push(attempt.clone());
        all.extend(history);
        (attempt, all)
    }

    // --- word game ---

    /// Decide the next word tier and draw a challenge.
    pub fn next_word(&self, user: UserId) -> EngineResult<WordChallenge> {
        let today = Self::today();
        let (_, challenge) = self.update(user, Game::Words, |_, history| {
            let challenge = self.words.next_challenge(&history, today)?;
            Ok(Decided {
                params: GameParams::Words(WordParams { tier: challenge.tier }),
                attempt: None,
                extra: challenge,
            })
        })?;
        Ok(challenge)
    }

    /// Record a played word and decide the tier for the next one.
    pub fn submit_word(&self, user: UserId, played: &WordAttempt) -> EngineResult<Outcome> {
        let today = Self::today();
        let (config, explanation) = self.update(user, Game::Words, |current, history| {
            let tier = match &current.params {
                GameParams::Words(p) => p.tier,
                _ => WordTier::Easy,
            };
            let attempt = AttemptRecord::new(user, tier, played.success)
                .with_item(played.word.trim().to_uppercase())
                .with_errors(played.errors)
                .with_time(played.time_secs)
                .with_hints(played.hints);
            attempt.validate()?;
            let (attempt, history) = Self::with_attempt(history, attempt);
            let (next, explanation) = self.words.decide_next_tier(&history, today);
            Ok(Decided {
                params: GameParams::Words(WordParams { tier: next }),
                attempt: Some(attempt),
                extra: explanation,
            })
        })?;
        log_change(&explanation);
        Ok(Outcome {
            config,
            explanation,
        })
    }

    // --- walk game ---

    /// Plan the next walk session.
    ///
    /// A plan written by [`Self::submit_walk`] earlier today is reused, so a
    /// one-off speed recommendation reaches exactly the session after the
    /// loss that produced it. Otherwise the tier is decided from history.
    pub fn start_walk(&self, user: UserId) -> EngineResult<(SessionPlan, Explanation)> {
        let today = Self::today();
        let (_, planned) = self.update(user, Game::Walk, |current, history| {
            let pending = current.version > 0
                && current.updated_at.date_naive() == today
                && history.first().is_none_or(|a| a.timestamp <= current.updated_at);
            let (plan, explanation) = match (&current.params, pending) {
                (GameParams::Walk(p), true) => {
                    let base = baseline(p.tier);
                    let speed = (p.ball_speed != base.ball_speed).then_some(p.ball_speed);
                    let plan = self.walk.plan_session(p.tier, speed);
                    let previous = history.first().map(|a| a.tier);
                    let why = Explanation::new(previous, p.tier.into(), "planned after the last session");
                    (plan, why)
                }
                _ => self.walk.start_session(&history, today),
            };
            Ok(Decided {
                params: GameParams::Walk(plan.params()),
                attempt: None,
                extra: (plan, explanation),
            })
        })?;
        Ok(planned)
    }

    /// Record a finished walk session and plan the next one.
    pub fn submit_walk(
        &self,
        user: UserId,
        result: &WalkSessionResult,
    ) -> EngineResult<(SessionPlan, Explanation)> {
        let today = Self::today();
        let (_, planned) = self.update(user, Game::Walk, |current, history| {
            let planned = match &current.params {
                GameParams::Walk(p) => p.clone(),
                _ => baseline(WalkTier::Tutorial),
            };
            result.validate(&planned)?;
            let attempt = result.to_attempt(user, planned.target_hits);
            attempt.validate()?;
            let (attempt, history) = Self::with_attempt(history, attempt);
            let (plan, explanation) = self.walk.start_session(&history, today);
            Ok(Decided {
                params: GameParams::Walk(plan.params()),
                attempt: Some(attempt),
                extra: (
                    plan,
                    explanation
                        .with_metric("precision", result.precision())
                        .with_metric("hits", f64::from(result.hits)),
                ),
            })
        })?;
        log_change(&planned.1);
        Ok(planned)
    }

    // --- memory game ---

    /// Record a finished memory session and decide the next bundle.
    pub fn submit_memory(
        &self,
        user: UserId,
        result: &MemorySessionResult,
    ) -> EngineResult<Outcome> {
        let (config, explanation) = self.update(user, Game::Memory, |current, _| {
            let params = match &current.params {
                GameParams::Memory(p) => p.clone(),
                _ => self.memory.initial_params(),
            };
            let (next, explanation) = self.memory.analyze(&params, result)?;
            let attempt = AttemptRecord::new(user, params.tier, result.completed)
                .with_hits(result.pairs_found)
                .with_errors(result.mistakes())
                .with_time(result.elapsed_secs);
            attempt.validate()?;
            Ok(Decided {
                params: GameParams::Memory(next),
                attempt: Some(attempt),
                extra: explanation,
            })
        })?;
        log_change(&explanation);
        Ok(Outcome {
            config,
            explanation,
        })
    }

    // --- train game ---

    /// Record a finished train session and decide the next bundle.
    pub fn submit_train(
        &self,
        user: UserId,
        result: &TrainSessionResult,
    ) -> EngineResult<Outcome> {
        let (config, explanation) = self.update(user, Game::Train, |current, _| {
            let params: TrainParams = match &current.params {
                GameParams::Train(p) => p.clone(),
                _ => self.train.initial_params(),
            };
            let (next, explanation) = self.train.next_params(result, &params)?;
            let attempt = AttemptRecord::new(
                user,
                params.tier,
                result.completion == TrainCompletion::Completed,
            )
            .with_hits(result.correct)
            .with_errors(result.wrong)
            .with_time(result.elapsed_secs);
            attempt.validate()?;
            Ok(Decided {
                params: GameParams::Train(next),
                attempt: Some(attempt),
                extra: explanation,
            })
        })?;
        log_change(&explanation);
        Ok(Outcome {
            config,
            explanation,
        })
    }

    // --- maintenance ---

    /// Delete the config row; the next access recreates the default.
    /// Attempt history is kept.
    pub fn reset(&self, user: UserId, game: Game) -> EngineResult<bool> {
        let existed = self.store.delete_config(user, game)?;
        if existed {
            tracing::info!(%user, %game, "config reset");
        }
        Ok(existed)
    }

    /// Aggregate a user's full history in one game.
    pub fn stats(&self, user: UserId, game: Game) -> EngineResult<UserStats> {
        let history = self.store.recent_attempts(user, game, usize::MAX)?;
        let successes = history.iter().filter(|a| a.success).count();
        let success_rate = if history.is_empty() {
            0.0
        } else {
            successes as f64 / history.len() as f64 * 100.0
        };
        Ok(UserStats {
            user_id: user,
            game,
            attempts: history.len(),
            successes,
            success_rate,
            last_played: history.first().map(|a| a.date),
            current_tier: self.store.load_config(user, game)?.map(|c| c.tier()),
        })
    }
}

fn log_change(explanation: &Explanation) {
    if explanation.tier_changed() {
        tracing::info!(
            from = ?explanation.previous_tier,
            to = %explanation.tier,
            source = %explanation.source,
            "tier changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use chrono::Days;
    use cg_content::ScriptedProvider;
    use cg_core::{Adjustment, MemoryStore, MemoryTier, TrainTier, WordTier};

    use crate::decision::DecisionSource;

    const USER: UserId = UserId(7);

    fn service() -> DifficultyService<MemoryStore> {
        DifficultyService::new(
            MemoryStore::new(),
            EngineConfig::default().with_seed(42),
            ContentAdapter::disabled(),
        )
        .unwrap()
    }

    fn word(w: &str, success: bool) -> WordAttempt {
        WordAttempt {
            word: w.into(),
            success,
            errors: u32::from(!success),
            time_secs: 12.0,
            hints: 0,
        }
    }

    #[test]
    fn inverted_config_is_refused_at_construction() {
        let mut config = EngineConfig::default();
        config.train.max_speed = 2.5;
        let built = DifficultyService::new(MemoryStore::new(), config, ContentAdapter::disabled());
        assert!(matches!(
            built,
            Err(EngineError::Validation(msg)) if msg.contains("train.max_speed")
        ));
    }

    #[test]
    fn config_is_created_lazily_once() {
        let svc = service();
        let first = svc.config(USER, Game::Memory).unwrap();
        assert_eq!(first.tier(), GameTier::Memory(MemoryTier::Tutorial));
        assert_eq!(first.version, 1);
        let again = svc.config(USER, Game::Memory).unwrap();
        assert_eq!(again.version, 1);
        assert_eq!(svc.store().snapshot().configs.len(), 1);
    }

    #[test]
    fn five_words_promote_and_are_recorded() {
        let svc = service();
        let mut last = None;
        for i in 0..5 {
            let challenge = svc.next_word(USER).unwrap();
            assert_eq!(challenge.tier, WordTier::Easy);
            last = Some(svc.submit_word(USER, &word(&format!("w{i}"), true)).unwrap());
        }
        let outcome = last.unwrap();
        assert_eq!(outcome.config.tier(), GameTier::Words(WordTier::Medium));
        assert_eq!(outcome.explanation.decision, Adjustment::Increase);
        assert_eq!(svc.store().attempt_count(), 5);

        let next = svc.next_word(USER).unwrap();
        assert_eq!(next.tier, WordTier::Medium);
        assert!(next.tier_changed);
        assert_eq!(next.progress.completed, 0);
    }

    #[test]
    fn invalid_word_attempt_persists_nothing() {
        let svc = service();
        let err = svc.submit_word(USER, &word("   ", true)).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(svc.store().attempt_count(), 0);
        assert!(svc.store().load_config(USER, Game::Words).unwrap().is_none());
    }

    #[test]
    fn words_played_yesterday_restart_at_easy() {
        let store = MemoryStore::new();
        let yesterday = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .unwrap();
        let mut attempt = AttemptRecord::new(USER, WordTier::Hard, true)
            .on(yesterday)
            .with_item("VENTANA");
        attempt.mark_tier_change(None);
        store
            .commit(Commit {
                config: DifficultyConfig::new(USER, GameParams::Words(WordParams { tier: WordTier::Hard })),
                expected_version: None,
                attempt: Some(attempt),
            })
            .unwrap();
        let svc = DifficultyService::new(store, EngineConfig::default(), ContentAdapter::disabled())
            .unwrap();
        let challenge = svc.next_word(USER).unwrap();
        assert_eq!(challenge.tier, WordTier::Easy);
    }

    #[test]
    fn walk_flow_tutorial_then_easy() {
        let svc = service();
        let (plan, _) = svc.start_walk(USER).unwrap();
        assert_eq!(plan.tier, WalkTier::Tutorial);
        let (next, why) = svc
            .submit_walk(
                USER,
                &WalkSessionResult {
                    tier: WalkTier::Tutorial,
                    hits: 2,
                    wrong: 0,
                    missed: 1,
                    completed: true,
                    duration_secs: 60.0,
                },
            )
            .unwrap();
        assert_eq!(next.tier, WalkTier::Easy);
        assert_eq!(why.tier, GameTier::Walk(WalkTier::Easy));
        let (again, _) = svc.start_walk(USER).unwrap();
        assert_eq!(again.tier, WalkTier::Easy);
    }

    #[test]
    fn walk_result_for_unplanned_tier_is_rejected() {
        let svc = service();
        svc.start_walk(USER).unwrap();
        let err = svc
            .submit_walk(
                USER,
                &WalkSessionResult {
                    tier: WalkTier::Hard,
                    hits: 7,
                    wrong: 0,
                    missed: 0,
                    completed: true,
                    duration_secs: 120.0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn walk_speed_recommendation_reaches_one_session() {
        let provider = Arc::new(ScriptedProvider::new().with_response(
            r#"{"tier": "medium", "speed": 3.2, "reasoning": "frustrated"}"#,
        ));
        let store = MemoryStore::new();
        store
            .commit(Commit {
                config: DifficultyConfig::new(USER, GameParams::Walk(baseline(WalkTier::Hard))),
                expected_version: None,
                attempt: None,
            })
            .unwrap();
        let svc = DifficultyService::new(store, EngineConfig::default(), ContentAdapter::new(provider))
            .unwrap();
        let lost = WalkSessionResult {
            tier: WalkTier::Hard,
            hits: 3,
            wrong: 2,
            missed: 4,
            completed: true,
            duration_secs: 120.0,
        };
        let (plan, why) = svc.submit_walk(USER, &lost).unwrap();
        assert_eq!(why.source, DecisionSource::Ai);
        assert_eq!(plan.tier, WalkTier::Medium);
        assert_eq!(plan.ball_speed, 3.2);

        let (started, _) = svc.start_walk(USER).unwrap();
        assert_eq!(started.ball_speed, 3.2);

        let won = WalkSessionResult {
            tier: WalkTier::Medium,
            hits: 8,
            ..lost
        };
        let (after, _) = svc.submit_walk(USER, &won).unwrap();
        assert_eq!(after.tier, WalkTier::Hard);
        assert_eq!(after.ball_speed, 5.0);
        assert!(!after.speed_overridden);
    }

    #[test]
    fn memory_session_updates_bundle() {
        let svc = service();
        let perfect = MemorySessionResult {
            completed: true,
            pairs_found: 3,
            total_pairs: 3,
            total_flips: 6,
            elapsed_secs: 10.0,
            time_limit_secs: 60,
        };
        let outcome = svc.submit_memory(USER, &perfect).unwrap();
        assert_eq!(outcome.config.tier(), GameTier::Memory(MemoryTier::Easy));
        assert_eq!(outcome.explanation.decision, Adjustment::Increase);
        match outcome.config.params {
            GameParams::Memory(p) => assert_eq!(p.total_pairs, 4),
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn train_timeout_decreases() {
        let svc = service();
        let result = TrainSessionResult {
            correct: 4,
            wrong: 0,
            total_spawned: Some(6),
            completion: TrainCompletion::Timeout,
            elapsed_secs: 90.0,
        };
        let outcome = svc.submit_train(USER, &result).unwrap();
        assert_eq!(outcome.explanation.decision, Adjustment::Decrease);
        assert_eq!(outcome.config.tier(), GameTier::Train(TrainTier::Easy));
    }

    #[test]
    fn stale_train_config_is_healed() {
        let store = MemoryStore::new();
        let mut wild = crate::train::initial_params(&Default::default());
        wild.speed = 42.0;
        store
            .commit(Commit {
                config: DifficultyConfig::new(USER, GameParams::Train(wild)),
                expected_version: None,
                attempt: None,
            })
            .unwrap();
        let svc = DifficultyService::new(store, EngineConfig::default(), ContentAdapter::disabled())
            .unwrap();
        match svc.config(USER, Game::Train).unwrap().params {
            GameParams::Train(p) => {
                assert_eq!(p.speed, 6.0);
                assert_eq!(p.tier, TrainTier::Hard);
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn reset_deletes_config_but_keeps_history() {
        let svc = service();
        for i in 0..5 {
            svc.submit_word(USER, &word(&format!("w{i}"), true)).unwrap();
        }
        assert!(svc.reset(USER, Game::Words).unwrap());
        assert!(!svc.reset(USER, Game::Words).unwrap());
        assert_eq!(
            svc.config(USER, Game::Words).unwrap().tier(),
            GameTier::Words(WordTier::Easy)
        );
        assert_eq!(svc.stats(USER, Game::Words).unwrap().attempts, 5);
    }

    #[test]
    fn stats_summarize_history() {
        let svc = service();
        svc.submit_word(USER, &word("casa", true)).unwrap();
        svc.submit_word(USER, &word("perro", false)).unwrap();
        let stats = svc.stats(USER, Game::Words).unwrap();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.success_rate, 50.0);
        assert_eq!(stats.last_played, Some(Utc::now().date_naive()));
    }

    #[test]
    fn concurrent_submissions_never_double_advance() {
        let svc = Arc::new(DifficultyService::new(
            MemoryStore::new(),
            EngineConfig::default().with_store_retries(50),
            ContentAdapter::disabled(),
        )
        .unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || {
                    svc.submit_word(USER, &word(&format!("w{i}"), true)).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let snapshot = svc.store().snapshot();
        assert_eq!(snapshot.attempts.len(), 8);
        assert_eq!(snapshot.configs[0].version, 8);
        // 5 easy successes promote once; the remaining 3 are at medium
        let medium = snapshot
            .attempts
            .iter()
            .filter(|a| a.tier == GameTier::Words(WordTier::Medium))
            .count();
        assert_eq!(medium, 3);
        assert_eq!(snapshot.configs[0].tier(), GameTier::Words(WordTier::Medium));
    }
}
