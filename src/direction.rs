//! The four-way navigation direction.

use clap::ValueEnum;
use std::fmt;

/// A single navigation direction, as typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// The direction a WM move in `self` would need to be reversed by, to
    /// land the cursor on the entry edge of whatever split/pane it bubbled
    /// into. Left↔Right, Up↔Down.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The vim motion letter used in `wincmd <letter>` / `winnr('<letter>')`.
    pub fn to_vim_key(self) -> char {
        match self {
            Direction::Left => 'h',
            Direction::Right => 'l',
            Direction::Up => 'k',
            Direction::Down => 'j',
        }
    }

    /// Exact lowercase-name parse, as accepted on the CLI.
    pub fn from_string(s: &str) -> Option<Direction> {
        match s {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            _ => None,
        }
    }

    /// Lowercase name, the inverse of [Direction::from_string].
    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    #[test]
    fn opposite_is_involution() {
        for d in ALL {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn opposite_pairs() {
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::Right.opposite(), Direction::Left);
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Down.opposite(), Direction::Up);
    }

    #[test]
    fn to_vim_key_is_injective() {
        let mut keys: Vec<char> = ALL.iter().map(|d| d.to_vim_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ALL.len());
    }

    #[test]
    fn from_string_roundtrips_name() {
        for d in ALL {
            assert_eq!(Direction::from_string(d.name()), Some(d));
        }
    }

    #[test]
    fn from_string_rejects_unknown_and_case() {
        assert_eq!(Direction::from_string("Left"), None);
        assert_eq!(Direction::from_string("LEFT"), None);
        assert_eq!(Direction::from_string("sideways"), None);
        assert_eq!(Direction::from_string(""), None);
    }
}
