use colored::Colorize;

use cg_core::UserId;

use super::Session;

pub fn run(session: &Session, user: UserId, game: &str, json: bool) -> Result<(), String> {
    let game = super::parse_game(game)?;
    let config = session
        .service()
        .config(user, game)
        .map_err(|e| e.to_string())?;

    if json {
        return super::print_json(&config);
    }

    let stamp = format!(
        "(v{}, updated {})",
        config.version,
        config.updated_at.format("%Y-%m-%d %H:%M")
    );
    println!("  {} {}", format!("{game} for user {user}").bold(), stamp.dimmed());
    println!();
    super::print_params(&config.params);
    Ok(())
}
