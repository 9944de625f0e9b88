//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a combatant, assigned by the turn orchestrator
///
/// Ordered so grid mappings iterate identically on every runtime.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(pub String);

impl CombatantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CombatantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CombatantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Action points; the per-turn budget is small and never negative
pub type ActionPoints = u32;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combatant_id_display() {
        let id = CombatantId::new("achilles");
        assert_eq!(id.to_string(), "achilles");
        assert_eq!(id.as_str(), "achilles");
    }

    #[test]
    fn test_combatant_id_serializes_as_plain_string() {
        let id = CombatantId::from("merlin");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"merlin\"");
    }
}
