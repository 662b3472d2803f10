//! Recent-performance summary sent to the generator with each batch request.

use cg_content::{PerformanceSummary, Trend};
use cg_core::{AttemptRecord, Game};

/// Attempts needed before a trend is reported.
const MIN_TREND_ATTEMPTS: usize = 4;

/// Relative change in mean time that counts as a trend.
const TREND_MARGIN: f64 = 0.10;

/// Summarize up to `window` recent word attempts (history newest first).
pub fn summarize(history: &[AttemptRecord], window: usize) -> PerformanceSummary {
    let recent: Vec<&AttemptRecord> = history
        .iter()
        .filter(|a| a.game() == Game::Words)
        .take(window)
        .collect();
    if recent.is_empty() {
        return PerformanceSummary::default();
    }

    let n = recent.len() as f64;
    let successes = recent.iter().filter(|a| a.success).count() as f64;
    PerformanceSummary {
        attempts: recent.len() as u32,
        success_rate: successes / n * 100.0,
        avg_errors: recent.iter().map(|a| f64::from(a.errors)).sum::<f64>() / n,
        avg_time_secs: mean_time(&recent),
        avg_hints: recent.iter().map(|a| f64::from(a.hints)).sum::<f64>() / n,
        trend: trend(&recent),
    }
}

fn mean_time(attempts: &[&AttemptRecord]) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    attempts.iter().map(|a| a.time_taken_secs).sum::<f64>() / attempts.len() as f64
}

/// Compare mean solve time of the newer half against the older half.
fn trend(recent: &[&AttemptRecord]) -> Trend {
    if recent.len() < MIN_TREND_ATTEMPTS {
        return Trend::InsufficientData;
    }
    let (newer, older) = recent.split_at(recent.len() / 2);
    let newer = mean_time(newer);
    let older = mean_time(older);
    if older <= 0.0 {
        return Trend::Stable;
    }
    if newer < older * (1.0 - TREND_MARGIN) {
        Trend::Improving
    } else if newer > older * (1.0 + TREND_MARGIN) {
        Trend::Worsening
    } else {
        Trend::Stable
    }
}
