//! Session plans: the fixed per-tier baseline plus colour selection.

use std::fmt;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};

use cg_core::{WalkParams, WalkTier};

/// Ball colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallColor {
    /// Red.
    Red,
    /// Blue.
    Blue,
    /// Yellow.
    Yellow,
}

impl BallColor {
    /// The full palette.
    pub const PALETTE: [BallColor; 3] = [BallColor::Red, BallColor::Blue, BallColor::Yellow];

    /// Lowercase name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
        }
    }
}

impl fmt::Display for BallColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the game needs to run one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Session tier.
    pub tier: WalkTier,
    /// Session length in seconds.
    pub duration_secs: u32,
    /// Correct catches needed to win.
    pub target_hits: u32,
    /// Colours that appear.
    pub active_colors: Vec<BallColor>,
    /// The colour that counts.
    pub correct_color: BallColor,
    /// Ball speed.
    pub ball_speed: f64,
    /// Seconds between spawned balls.
    pub spawn_interval_secs: f64,
    /// Text shown to the player.
    pub objective: String,
    /// Whether `ball_speed` came from a one-off recommendation.
    pub speed_overridden: bool,
}

impl SessionPlan {
    /// The parameter bundle to persist.
    pub fn params(&self) -> WalkParams {
        WalkParams {
            tier: self.tier,
            duration_secs: self.duration_secs,
            target_hits: self.target_hits,
            ball_speed: self.ball_speed,
            spawn_interval_secs: self.spawn_interval_secs,
        }
    }
}

/// Fixed values for a tier: (duration, target, speed, interval, colours).
pub fn baseline(tier: WalkTier) -> WalkParams {
    let (duration_secs, target_hits, ball_speed, spawn_interval_secs) = match tier {
        WalkTier::Tutorial => (60, 5, 2.0, 3.0),
        WalkTier::Easy => (60, 5, 3.0, 2.0),
        WalkTier::Medium => (90, 8, 4.0, 1.5),
        WalkTier::Hard => (120, 7, 5.0, 1.0),
    };
    WalkParams {
        tier,
        duration_secs,
        target_hits,
        ball_speed,
        spawn_interval_secs,
    }
}

fn color_count(tier: WalkTier) -> usize {
    match tier {
        WalkTier::Tutorial | WalkTier::Easy => 1,
        WalkTier::Medium => 2,
        WalkTier::Hard => 3,
    }
}

fn objective(tier: WalkTier, color: BallColor, target: u32) -> String {
    let color = color.label().to_uppercase();
    match tier {
        WalkTier::Tutorial => "Tutorial: learn the controls".to_string(),
        WalkTier::Easy => format!("Goal: catch {target} {color} balls"),
        WalkTier::Medium => format!("Goal: catch {target} {color} balls, dodge the others"),
        WalkTier::Hard => format!("Goal: catch {target} {color} balls among 3 colours"),
    }
}

/// Plan a session at `tier`. `speed_override` replaces the baseline speed
/// for this plan only.
pub fn plan_session<R: Rng + ?Sized>(
    tier: WalkTier,
    speed_override: Option<f64>,
    rng: &mut R,
) -> SessionPlan {
    let base = baseline(tier);
    let mut palette = BallColor::PALETTE;
    palette.shuffle(rng);
    let active_colors = palette[..color_count(tier)].to_vec();
    let correct_color = active_colors.choose(rng).copied().unwrap_or(BallColor::Red);

    SessionPlan {
        tier,
        duration_secs: base.duration_secs,
        target_hits: base.target_hits,
        objective: objective(tier, correct_color, base.target_hits),
        active_colors,
        correct_color,
        ball_speed: speed_override.unwrap_or(base.ball_speed),
        spawn_interval_secs: base.spawn_interval_secs,
        speed_overridden: speed_override.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cg_core::Tier;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn baselines() {
        let hard = baseline(WalkTier::Hard);
        assert_eq!(hard.duration_secs, 120);
        assert_eq!(hard.target_hits, 7);
        assert_eq!(hard.ball_speed, 5.0);
        assert_eq!(baseline(WalkTier::Medium).target_hits, 8);
    }

    #[test]
    fn colours_scale_with_tier() {
        let mut rng = StdRng::seed_from_u64(42);
        for tier in WalkTier::ALL {
            let plan = plan_session(*tier, None, &mut rng);
            assert_eq!(plan.active_colors.len(), color_count(*tier));
            assert!(plan.active_colors.contains(&plan.correct_color));
            assert!(!plan.objective.is_empty());
            assert!(!plan.speed_overridden);
        }
    }

    #[test]
    fn override_replaces_speed_only() {
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_session(WalkTier::Medium, Some(3.2), &mut rng);
        assert_eq!(plan.ball_speed, 3.2);
        assert!(plan.speed_overridden);
        assert_eq!(plan.spawn_interval_secs, 1.5);
        assert!(plan.objective.contains("dodge"));
        assert_eq!(plan.params().ball_speed, 3.2);
    }
}
