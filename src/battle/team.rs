//! Team sides and their opening formations

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    One,
    Two,
}

impl Team {
    pub fn all() -> [Team; 2] {
        [Team::One, Team::Two]
    }

    pub fn opponent(&self) -> Self {
        match self {
            Team::One => Team::Two,
            Team::Two => Team::One,
        }
    }

    /// Three-hex line formation, left to right
    ///
    /// The lines face each other six hexes apart, so melee range closes in a
    /// couple of turns.
    pub fn start_positions(&self) -> [HexPosition; 3] {
        let row = match self {
            Team::One => 3,
            Team::Two => -3,
        };
        [
            HexPosition::new(-2, row),
            HexPosition::new(0, row),
            HexPosition::new(2, row),
        ]
    }
}
