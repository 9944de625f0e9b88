//! Engine configuration with documented defaults
//!
//! Every tunable of the grid factory and the action economy lives here.
//! Configuration is always passed explicitly; there is no process-wide
//! instance, so an authoritative server can run battles with different
//! settings side by side.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{BASE_ACTION_POINTS, DEFAULT_GRID_RADIUS, DEFAULT_HEX_PIXEL_SIZE};
use crate::battle::hex::HexPosition;
use crate::battle::team::Team;
use crate::core::error::{Result, TacticsError};

/// Configuration for building battles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === GRID ===
    /// Cube radius of the battle grid
    ///
    /// Hexes with max(|q|, |r|, |s|) == radius form the hazard ring.
    /// Must leave room for both team formations (which sit 3 rows from center)
    /// inside the ring, so the minimum is 4.
    pub grid_radius: i32,

    /// Hexes marked as obstacle terrain when the grid is built
    ///
    /// Written in TOML as `"q,r"` key strings.
    pub obstacle_hexes: Vec<HexPosition>,

    // === ACTION ECONOMY ===
    /// Action points granted at the start of every turn (before buffs)
    pub base_action_points: u32,

    // === RENDERING ===
    /// Hex size in pixels used by `to_pixel` / `from_pixel` callers
    pub hex_pixel_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_radius: DEFAULT_GRID_RADIUS,
            obstacle_hexes: vec![
                HexPosition::new(0, 0),
                HexPosition::new(1, -1),
                HexPosition::new(0, 1),
            ],
            base_action_points: BASE_ACTION_POINTS,
            hex_pixel_size: DEFAULT_HEX_PIXEL_SIZE,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate().map_err(TacticsError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.grid_radius < 4 {
            return Err(format!(
                "grid_radius ({}) must be at least 4 to fit both team formations",
                self.grid_radius
            ));
        }

        if self.base_action_points == 0 {
            return Err("base_action_points must be positive".into());
        }

        if !(self.hex_pixel_size > 0.0) {
            return Err(format!(
                "hex_pixel_size ({}) must be positive",
                self.hex_pixel_size
            ));
        }

        let starts: Vec<HexPosition> = Team::all()
            .iter()
            .flat_map(|team| team.start_positions())
            .collect();

        for hex in &self.obstacle_hexes {
            if hex.magnitude() >= self.grid_radius {
                return Err(format!(
                    "obstacle {} must lie strictly inside the hazard ring",
                    hex
                ));
            }
            if starts.contains(hex) {
                return Err(format!("obstacle {} covers a team start position", hex));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("base_action_points = 4\n").unwrap();
        assert_eq!(config.base_action_points, 4);
        assert_eq!(config.grid_radius, DEFAULT_GRID_RADIUS);
        assert_eq!(config.obstacle_hexes.len(), 3);
    }

    #[test]
    fn test_obstacles_parse_from_key_strings() {
        let toml_str = r#"
            grid_radius = 8
            obstacle_hexes = ["2,-1", "-3,1"]
        "#;
        let config = EngineConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(
            config.obstacle_hexes,
            vec![HexPosition::new(2, -1), HexPosition::new(-3, 1)]
        );
    }

    #[test]
    fn test_small_radius_rejected() {
        let err = EngineConfig::from_toml_str("grid_radius = 3\n").unwrap_err();
        assert!(matches!(err, TacticsError::InvalidConfig(_)));
    }

    #[test]
    fn test_obstacle_on_start_position_rejected() {
        let config = EngineConfig {
            obstacle_hexes: vec![HexPosition::new(0, 3)],
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_obstacle_on_hazard_ring_rejected() {
        let config = EngineConfig {
            obstacle_hexes: vec![HexPosition::new(6, 0)],
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("grid_radius = \"wide\"").unwrap_err();
        assert!(matches!(err, TacticsError::TomlError(_)));
    }
}
