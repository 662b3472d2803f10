use colored::Colorize;

use cg_core::UserId;
use cg_engine::WordAttempt;

use super::Session;

pub fn next(session: &Session, user: UserId, json: bool) -> Result<(), String> {
    let challenge = session
        .service()
        .next_word(user)
        .map_err(|e| e.to_string())?;

    if json {
        return super::print_json(&challenge);
    }

    println!(
        "  {} [{}]",
        challenge.item.target.bold(),
        challenge.tier.to_string().dimmed()
    );
    if !challenge.item.hint.is_empty() {
        println!("  hint:        {}", challenge.item.hint);
    }
    if !challenge.item.distractors.is_empty() {
        println!("  distractors: {}", challenge.item.distractors.join(" "));
    }
    println!(
        "  progress:    {}/{} ({:.0}%)",
        challenge.progress.completed,
        challenge.progress.required,
        challenge.progress.percent()
    );
    println!("  source:      {}", challenge.source);
    if challenge.tier_changed
        && let Some(previous) = challenge.previous_tier
    {
        println!("  {} {previous} -> {}", "tier changed:".yellow(), challenge.tier);
    }

    Ok(())
}

pub fn submit(
    session: &Session,
    user: UserId,
    played: &WordAttempt,
    json: bool,
) -> Result<(), String> {
    let outcome = session
        .service()
        .submit_word(user, played)
        .map_err(|e| e.to_string())?;
    super::print_outcome(&outcome, json)
}
