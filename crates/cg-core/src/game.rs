use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// The four cognitive games whose difficulty is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    /// Letter/word game: build the target word from shuffled letters.
    Words,
    /// Walk game: catch balls of the correct colour while walking.
    Walk,
    /// Memory cards: find all matching pairs.
    Memory,
    /// Train routing: switch tracks so each train reaches its station.
    Train,
}

impl Game {
    /// All games in declaration order.
    pub const ALL: [Game; 4] = [Game::Words, Game::Walk, Game::Memory, Game::Train];

    /// Stable lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Words => "words",
            Self::Walk => "walk",
            Self::Memory => "memory",
            Self::Train => "train",
        }
    }

    /// Parse a game from a user-supplied string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "words" | "word" | "abecedario" | "letters" => Some(Self::Words),
            "walk" | "paseo" => Some(Self::Walk),
            "memory" | "memory_cards" | "cards" => Some(Self::Memory),
            "train" | "trains" | "train_game" => Some(Self::Train),
            _ => None,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
