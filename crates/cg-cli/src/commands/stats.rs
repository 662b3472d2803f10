use comfy_table::{ContentArrangement, Table};

use cg_core::{Game, UserId};

use super::Session;

pub fn run(session: &Session, user: UserId, game: Option<&str>, json: bool) -> Result<(), String> {
    let games = match game {
        Some(name) => vec![super::parse_game(name)?],
        None => Game::ALL.to_vec(),
    };

    let stats = games
        .into_iter()
        .map(|game| session.service().stats(user, game))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    if json {
        return super::print_json(&stats);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Game", "Attempts", "Successes", "Rate", "Last played", "Tier"]);

    for s in &stats {
        table.add_row(vec![
            s.game.to_string(),
            s.attempts.to_string(),
            s.successes.to_string(),
            format!("{:.0}%", s.success_rate),
            s.last_played
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            s.current_tier
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{table}");
    Ok(())
}
