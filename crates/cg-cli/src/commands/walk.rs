use colored::Colorize;
use serde::Serialize;

use cg_core::{Tier, UserId, WalkTier};
use cg_engine::{Explanation, SessionPlan, WalkSessionResult};

use super::Session;

/// Walk counters as typed on the command line.
pub struct Played {
    pub tier: String,
    pub hits: u32,
    pub wrong: u32,
    pub missed: u32,
    pub completed: bool,
    pub duration_secs: f64,
}

#[derive(Serialize)]
struct Planned<'a> {
    plan: &'a SessionPlan,
    explanation: &'a Explanation,
}

pub fn start(session: &Session, user: UserId, json: bool) -> Result<(), String> {
    let (plan, explanation) = session
        .service()
        .start_walk(user)
        .map_err(|e| e.to_string())?;
    print_plan(&plan, &explanation, json)
}

pub fn submit(session: &Session, user: UserId, played: &Played, json: bool) -> Result<(), String> {
    let tier = WalkTier::parse(&played.tier).ok_or_else(|| {
        format!(
            "unknown walk tier \"{}\" (expected tutorial, easy, medium or hard)",
            played.tier
        )
    })?;
    let result = WalkSessionResult {
        tier,
        hits: played.hits,
        wrong: played.wrong,
        missed: played.missed,
        completed: played.completed,
        duration_secs: played.duration_secs,
    };
    let (plan, explanation) = session
        .service()
        .submit_walk(user, &result)
        .map_err(|e| e.to_string())?;
    print_plan(&plan, &explanation, json)
}

fn print_plan(plan: &SessionPlan, explanation: &Explanation, json: bool) -> Result<(), String> {
    if json {
        return super::print_json(&Planned { plan, explanation });
    }

    super::print_explanation(explanation);
    println!();
    println!("  {}", plan.objective.bold());
    let colors: Vec<&str> = plan.active_colors.iter().map(|c| c.label()).collect();
    println!("  colours:  {} (catch {})", colors.join(", "), plan.correct_color);
    println!("  duration: {} s", plan.duration_secs);
    println!("  target:   {} hits", plan.target_hits);
    let speed = format!("{:.1}", plan.ball_speed);
    if plan.speed_overridden {
        println!("  speed:    {} {}", speed.yellow(), "(recommended)".dimmed());
    } else {
        println!("  speed:    {speed}");
    }
    println!("  spawn:    every {:.1} s", plan.spawn_interval_secs);
    Ok(())
}
