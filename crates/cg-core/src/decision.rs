use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a difficulty change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    /// Make the next session harder.
    Increase,
    /// Make the next session easier.
    Decrease,
    /// Keep the current difficulty.
    Maintain,
}

impl Adjustment {
    /// Parse the labels generators and older clients use.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "increase" | "increase_difficulty" | "level_up" | "up" => Some(Self::Increase),
            "decrease" | "decrease_difficulty" | "level_down" | "down" => Some(Self::Decrease),
            "maintain" | "keep" | "stay" => Some(Self::Maintain),
            _ => None,
        }
    }

    /// Stable lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Maintain => "maintain",
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_generator_labels() {
        assert_eq!(Adjustment::parse("LEVEL_UP"), Some(Adjustment::Increase));
        assert_eq!(Adjustment::parse("down"), Some(Adjustment::Decrease));
        assert_eq!(Adjustment::parse("keep"), Some(Adjustment::Maintain));
        assert_eq!(Adjustment::parse("increase difficulty"), Some(Adjustment::Increase));
        assert_eq!(Adjustment::parse("sideways"), None);
    }
}
