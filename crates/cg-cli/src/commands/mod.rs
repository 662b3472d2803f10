pub mod config;
pub mod memory;
pub mod reset;
pub mod stats;
pub mod train;
pub mod walk;
pub mod word;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use cg_content::{CommandProvider, ContentAdapter};
use cg_core::{Game, GameParams, MemoryStore, StoreSnapshot};
use cg_engine::{DifficultyService, EngineConfig, Explanation, Outcome};

/// A service over the state file, written back by [`Session::save`].
pub struct Session {
    path: PathBuf,
    service: DifficultyService<MemoryStore>,
}

impl Session {
    pub fn open(
        state: &Path,
        config: Option<&Path>,
        provider_cmd: Option<&str>,
        timeout_secs: Option<f64>,
    ) -> Result<Self, String> {
        let mut engine_config = match config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
                serde_json::from_str::<EngineConfig>(&text)
                    .map_err(|e| format!("invalid config {}: {e}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        if let Some(secs) = timeout_secs {
            engine_config = engine_config.with_adapter_timeout(secs);
        }

        let adapter = match provider_cmd {
            Some(line) => {
                let provider = CommandProvider::from_command_line(line)
                    .ok_or("--provider-cmd must name a program")?;
                ContentAdapter::new(Arc::new(provider))
            }
            None => ContentAdapter::disabled(),
        };

        let snapshot = if state.exists() {
            let text = std::fs::read_to_string(state)
                .map_err(|e| format!("cannot read {}: {e}", state.display()))?;
            serde_json::from_str::<StoreSnapshot>(&text)
                .map_err(|e| format!("corrupt state file {}: {e}", state.display()))?
        } else {
            StoreSnapshot::default()
        };
        tracing::debug!(
            path = %state.display(),
            configs = snapshot.configs.len(),
            attempts = snapshot.attempts.len(),
            "loaded state"
        );

        let store = MemoryStore::from_snapshot(snapshot);
        let service = DifficultyService::new(store, engine_config, adapter).map_err(|e| match config {
            Some(path) => format!("invalid config {}: {e}", path.display()),
            None => e.to_string(),
        })?;

        Ok(Self {
            path: state.to_path_buf(),
            service,
        })
    }

    pub fn service(&self) -> &DifficultyService<MemoryStore> {
        &self.service
    }

    /// Write the store back to the state file.
    pub fn save(&self) -> Result<(), String> {
        let snapshot = self.service.store().snapshot();
        let text = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        std::fs::write(&self.path, text)
            .map_err(|e| format!("cannot write {}: {e}", self.path.display()))
    }
}

fn parse_game(name: &str) -> Result<Game, String> {
    Game::parse(name).ok_or_else(|| {
        format!("unknown game \"{name}\" (expected words, walk, memory or train)")
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

/// Print a parameter bundle as a two-column table.
fn print_params(params: &GameParams) {
    let rows: Vec<(&str, String)> = match params {
        GameParams::Words(p) => vec![("tier", p.tier.to_string())],
        GameParams::Walk(p) => vec![
            ("tier", p.tier.to_string()),
            ("duration", format!("{} s", p.duration_secs)),
            ("target hits", p.target_hits.to_string()),
            ("ball speed", format!("{:.1}", p.ball_speed)),
            ("spawn interval", format!("{:.1} s", p.spawn_interval_secs)),
        ],
        GameParams::Memory(p) => vec![
            ("tier", p.tier.to_string()),
            ("grid", p.grid.to_string()),
            ("pairs", p.total_pairs.to_string()),
            ("time limit", format!("{} s", p.time_limit_secs)),
            ("memorization", format!("{} s", p.memorization_secs)),
            ("maintained", p.consecutive_maintains.to_string()),
        ],
        GameParams::Train(p) => vec![
            ("tier", p.tier.to_string()),
            ("speed", format!("{:.1}", p.speed)),
            ("spawn rate", format!("{:.1}", p.spawn_rate)),
            ("trains", p.train_count.to_string()),
            ("colours", p.color_count.to_string()),
            ("time limit", format!("{} s", p.time_limit_secs)),
        ],
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Setting", "Value"]);
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    println!("{table}");
}

/// Print the decision line, reason and metrics.
fn print_explanation(explanation: &Explanation) {
    let tier = explanation.tier.to_string();
    let tier = if explanation.tier_changed() {
        tier.bold().green()
    } else {
        tier.bold()
    };
    match explanation.previous_tier {
        Some(previous) if explanation.tier_changed() => {
            println!("  {tier} (was {previous})");
        }
        _ => println!("  {tier}"),
    }
    println!(
        "  {} {}",
        explanation.decision.to_string().cyan(),
        format!("[{}]", explanation.source).dimmed()
    );
    println!("  {}", explanation.reason);

    if !explanation.metrics.is_empty() {
        let metrics: Vec<String> = explanation
            .metrics
            .iter()
            .map(|(name, value)| format!("{name}={value:.1}"))
            .collect();
        println!("  {}", metrics.join(", ").dimmed());
    }
}

fn print_outcome(outcome: &Outcome, json: bool) -> Result<(), String> {
    if json {
        return print_json(outcome);
    }
    print_explanation(&outcome.explanation);
    println!();
    print_params(&outcome.config.params);
    Ok(())
}
