//! Sync direction

use super::BunError;
use std::fmt;
use std::str::FromStr;

/// Which physical side is the source of a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Unset. Never valid for a sync run.
    #[default]
    None,

    /// Local tree is the source, remote zone is the base
    Up,

    /// Remote zone is the source, local tree is the base
    Down,
}

impl FromStr for Direction {
    type Err = BunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("up") {
            Ok(Direction::Up)
        } else if s.eq_ignore_ascii_case("down") {
            Ok(Direction::Down)
        } else {
            Err(BunError::Config(format!(
                "Invalid sync direction '{}': expected 'up' or 'down'",
                s
            )))
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::None => write!(f, "none"),
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}
