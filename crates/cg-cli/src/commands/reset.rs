use cg_core::UserId;

use super::Session;

pub fn run(session: &Session, user: UserId, game: &str) -> Result<(), String> {
    let game = super::parse_game(game)?;
    let existed = session
        .service()
        .reset(user, game)
        .map_err(|e| e.to_string())?;

    if existed {
        println!("  Reset {game} for user {user}.");
    } else {
        println!("  No {game} config for user {user}; nothing to reset.");
    }
    Ok(())
}
