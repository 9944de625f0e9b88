use thiserror::Error;

use crate::battle::hex::HexPosition;
use crate::battle::team::Team;
use crate::core::types::CombatantId;

#[derive(Error, Debug)]
pub enum TacticsError {
    #[error("Invalid hex key: {0}")]
    InvalidHexKey(#[from] HexKeyError),

    #[error("Combatant not on grid: {0}")]
    CombatantNotFound(CombatantId),

    #[error("Combatant {0} is already placed on the grid")]
    AlreadyPlaced(CombatantId),

    #[error("Cannot place {id} at {position}: {reason}")]
    InvalidPlacement {
        id: CombatantId,
        position: HexPosition,
        reason: String,
    },

    #[error("{team:?} formation only has {slots} slots")]
    FormationFull { team: Team, slots: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Failure to parse a `"q,r"` hex key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexKeyError {
    #[error("expected \"q,r\", got {0:?}")]
    Malformed(String),

    #[error("axis {axis} is not an integer in {key:?}")]
    NotAnInteger { axis: char, key: String },
}

pub type Result<T> = std::result::Result<T, TacticsError>;
