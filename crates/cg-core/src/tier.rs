//! Ordered difficulty tiers.
//!
//! Every game has its own closed set of tiers. Tiers are ordered from easiest
//! to hardest; stepping past either end is a no-op. Labels coming back from
//! storage are parsed leniently: an unknown label is healed to the nearest
//! valid tier instead of failing, so a stale row can never wedge a user.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::game::Game;

/// Behaviour shared by every game's tier enum.
pub trait Tier:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Into<GameTier> + 'static
{
    /// The game these tiers belong to.
    const GAME: Game;

    /// All tiers, easiest first.
    const ALL: &'static [Self];

    /// Stable lowercase label used in storage and prompts.
    fn label(self) -> &'static str;

    /// Parse a label or one of its aliases (case-insensitive).
    fn parse(s: &str) -> Option<Self>;

    /// Extract this game's tier from a tagged tier, if it belongs to this game.
    fn from_game_tier(tier: GameTier) -> Option<Self>;

    /// Position in [`Tier::ALL`].
    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or_default()
    }

    /// The easiest tier.
    fn lowest() -> Self {
        Self::ALL[0]
    }

    /// The hardest tier.
    fn highest() -> Self {
        Self::ALL[Self::ALL.len() - 1]
    }

    /// The tier at `index`, clamped into range.
    fn from_index_clamped(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// One tier harder, saturating at the top.
    fn step_up(self) -> Self {
        Self::from_index_clamped(self.index() + 1)
    }

    /// One tier easier, saturating at the bottom.
    fn step_down(self) -> Self {
        Self::from_index_clamped(self.index().saturating_sub(1))
    }

    /// Parse a label, healing anything unknown to the nearest valid tier.
    ///
    /// Numeric labels are treated as indices and clamped; any other unknown
    /// label falls back to the lowest tier.
    fn from_label_lossy(label: &str) -> Self {
        if let Some(tier) = Self::parse(label) {
            return tier;
        }
        let healed = match label.trim().parse::<i64>() {
            Ok(n) => Self::from_index_clamped(usize::try_from(n.max(0)).unwrap_or(usize::MAX)),
            Err(_) => Self::lowest(),
        };
        tracing::warn!(
            game = %Self::GAME,
            label,
            healed = %healed,
            "unknown tier label, clamped to nearest valid tier"
        );
        healed
    }
}

macro_rules! tier_enum {
    (
        $(#[$outer:meta])*
        $name:ident for $game:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl Tier for $name {
            const GAME: Game = Game::$game;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            fn parse(s: &str) -> Option<Self> {
                match s.trim().to_lowercase().as_str() {
                    $( $label $(| $alias)* => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn from_game_tier(tier: GameTier) -> Option<Self> {
                match tier {
                    GameTier::$game(t) => Some(t),
                    _ => None,
                }
            }
        }

        impl From<$name> for GameTier {
            fn from(tier: $name) -> Self {
                GameTier::$game(tier)
            }
        }

        impl From<String> for $name {
            fn from(label: String) -> Self {
                <$name as Tier>::from_label_lossy(&label)
            }
        }

        impl From<$name> for String {
            fn from(tier: $name) -> Self {
                tier.label().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

tier_enum! {
    /// Word-game tiers.
    WordTier for Words {
        /// Short, very common words.
        Easy => "easy" | "facil" | "fácil",
        /// Everyday words with slight complexity.
        Medium => "medium" | "intermedio",
        /// Longer words served from generated batches.
        Hard => "hard" | "dificil" | "difícil",
    }
}

tier_enum! {
    /// Walk-game tiers.
    WalkTier for Walk {
        /// Control walkthrough, played once.
        Tutorial => "tutorial",
        /// One colour, slow balls.
        Easy => "easy" | "facil" | "fácil",
        /// Two colours.
        Medium => "medium" | "intermedio",
        /// Three colours, fast balls.
        Hard => "hard" | "dificil" | "difícil",
    }
}

tier_enum! {
    /// Memory-card tiers.
    MemoryTier for Memory {
        /// Three pairs.
        Tutorial => "tutorial",
        /// Four pairs.
        Easy => "easy" | "facil" | "fácil",
        /// Six pairs.
        Medium => "medium" | "intermedio",
        /// Eight pairs.
        Hard => "hard" | "dificil" | "difícil",
        /// Ten pairs.
        Expert => "expert" | "experto",
        /// Twelve pairs.
        Master => "master" | "maestro",
    }
}

tier_enum! {
    /// Train-game tiers, derived from train speed.
    TrainTier for Train {
        /// Slow trains.
        Easy => "easy" | "facil" | "fácil",
        /// Moderate trains.
        Medium => "medium" | "intermedio",
        /// Fast trains.
        Hard => "hard" | "dificil" | "difícil",
    }
}

/// A tier tagged with the game it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "game", content = "tier", rename_all = "snake_case")]
pub enum GameTier {
    /// A word-game tier.
    Words(WordTier),
    /// A walk-game tier.
    Walk(WalkTier),
    /// A memory-card tier.
    Memory(MemoryTier),
    /// A train-game tier.
    Train(TrainTier),
}

impl GameTier {
    /// The game this tier belongs to.
    pub fn game(self) -> Game {
        match self {
            Self::Words(_) => Game::Words,
            Self::Walk(_) => Game::Walk,
            Self::Memory(_) => Game::Memory,
            Self::Train(_) => Game::Train,
        }
    }

    /// The tier's own label, without the game.
    pub fn label(self) -> &'static str {
        match self {
            Self::Words(t) => t.label(),
            Self::Walk(t) => t.label(),
            Self::Memory(t) => t.label(),
            Self::Train(t) => t.label(),
        }
    }
}

impl fmt::Display for GameTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.game(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ordering_follows_declaration() {
        assert!(WordTier::Easy < WordTier::Medium);
        assert!(WalkTier::Tutorial < WalkTier::Easy);
        assert!(MemoryTier::Expert < MemoryTier::Master);
    }

    #[test]
    fn steps_saturate() {
        assert_eq!(WordTier::Hard.step_up(), WordTier::Hard);
        assert_eq!(WordTier::Easy.step_down(), WordTier::Easy);
        assert_eq!(MemoryTier::Tutorial.step_up(), MemoryTier::Easy);
        assert_eq!(MemoryTier::Master.step_down(), MemoryTier::Expert);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(WordTier::parse("Intermedio"), Some(WordTier::Medium));
        assert_eq!(WalkTier::parse("DIFICIL"), Some(WalkTier::Hard));
        assert_eq!(MemoryTier::parse("maestro"), Some(MemoryTier::Master));
        assert_eq!(TrainTier::parse("tutorial"), None);
    }

    #[test]
    fn lossy_parse_heals_unknown_labels() {
        assert_eq!(WordTier::from_label_lossy("legendary"), WordTier::Easy);
        assert_eq!(MemoryTier::from_label_lossy("99"), MemoryTier::Master);
        assert_eq!(MemoryTier::from_label_lossy("-3"), MemoryTier::Tutorial);
        assert_eq!(TrainTier::from_label_lossy("1"), TrainTier::Medium);
    }

    #[test]
    fn serde_uses_labels_and_heals() {
        assert_eq!(serde_json::to_string(&WalkTier::Medium).unwrap(), "\"medium\"");
        let healed: WalkTier = serde_json::from_str("\"impossible\"").unwrap();
        assert_eq!(healed, WalkTier::Tutorial);
    }

    #[test]
    fn game_tier_json_shape() {
        let tier = GameTier::Train(TrainTier::Hard);
        let json = serde_json::to_value(tier).unwrap();
        assert_eq!(json, serde_json::json!({"game": "train", "tier": "hard"}));
        let back: GameTier = serde_json::from_value(json).unwrap();
        assert_eq!(back, tier);
        assert_eq!(tier.to_string(), "train/hard");
    }

    #[test]
    fn from_game_tier_filters_other_games() {
        assert_eq!(WordTier::from_game_tier(GameTier::Words(WordTier::Hard)), Some(WordTier::Hard));
        assert_eq!(WordTier::from_game_tier(GameTier::Train(TrainTier::Hard)), None);
    }

    proptest! {
        #[test]
        fn clamped_index_is_always_a_member(index in 0usize..1000) {
            prop_assert!(MemoryTier::ALL.contains(&MemoryTier::from_index_clamped(index)));
            prop_assert!(WalkTier::ALL.contains(&WalkTier::from_index_clamped(index)));
        }

        #[test]
        fn lossy_parse_is_always_a_member(label in ".{0,12}") {
            prop_assert!(WordTier::ALL.contains(&WordTier::from_label_lossy(&label)));
        }
    }
}
