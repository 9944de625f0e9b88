//! Battle terrain types and hazard status effects
//!
//! Terrain only answers legality questions. What a hazard actually inflicts is
//! decided by combat resolution; the grid just stores the resulting effect.

use serde::{Deserialize, Serialize};

use crate::battle::constants::MAX_MOVEMENT_PENALTY_PERCENT;

/// Primary terrain type for a battle hex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    #[default]
    Open,     // No restrictions
    Obstacle, // Impassable, blocks LOS
    Hazard,   // Passable, triggers a status effect on entry
}

impl TerrainType {
    /// Can a combatant stand on or walk through this terrain?
    pub fn is_passable(&self) -> bool {
        !matches!(self, TerrainType::Obstacle)
    }

    /// Does entering this terrain trigger a hazard?
    pub fn triggers_hazard(&self) -> bool {
        matches!(self, TerrainType::Hazard)
    }

    /// Does this terrain block line of sight?
    pub fn blocks_los(&self) -> bool {
        matches!(self, TerrainType::Obstacle)
    }
}

/// Kind of status inflicted by the hazard ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardStatus {
    Bitten,
    Bleeding,
    Mauled,
}

impl HazardStatus {
    /// Only impairing statuses contribute to the movement penalty
    pub fn impairs_movement(&self) -> bool {
        matches!(self, HazardStatus::Mauled)
    }
}

/// Movement cost surcharge in whole percent (50 = moves cost 1.5x)
///
/// Kept integral so cost scaling is bit-identical on every runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementPenalty(u32);

impl MovementPenalty {
    pub const NONE: MovementPenalty = MovementPenalty(0);
    pub const MAX: MovementPenalty = MovementPenalty(MAX_MOVEMENT_PENALTY_PERCENT);

    /// Penalty from a whole percent, capped at `MAX`
    pub fn from_percent(percent: u32) -> Self {
        Self(percent.min(MAX_MOVEMENT_PENALTY_PERCENT))
    }

    pub fn percent(&self) -> u32 {
        self.0
    }

    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_active(&self) -> bool {
        self.0 > 0
    }

    /// Scale a base AP cost, rounding up; saturates at `u32::MAX`
    pub fn apply(&self, base_cost: u32) -> u32 {
        if !self.is_active() {
            return base_cost;
        }
        let scaled = (base_cost as u64 * (100 + self.0 as u64)).div_ceil(100);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }
}

/// Status effect left by a hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardStatusEffect {
    pub status: HazardStatus,
    pub turns_remaining: u32,
    pub damage_per_turn: Option<u32>,
    pub movement_penalty: Option<MovementPenalty>,
}

impl HazardStatusEffect {
    pub fn new(status: HazardStatus, turns_remaining: u32) -> Self {
        Self {
            status,
            turns_remaining,
            damage_per_turn: None,
            movement_penalty: None,
        }
    }

    pub fn with_damage(mut self, damage_per_turn: u32) -> Self {
        self.damage_per_turn = Some(damage_per_turn);
        self
    }

    pub fn with_movement_penalty(mut self, penalty: MovementPenalty) -> Self {
        self.movement_penalty = Some(penalty);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.turns_remaining == 0
    }

    /// Consume one turn of the effect
    pub fn tick(&mut self) {
        self.turns_remaining = self.turns_remaining.saturating_sub(1);
    }

    /// Penalty this effect contributes to movement
    pub fn movement_contribution(&self) -> MovementPenalty {
        if self.is_expired() || !self.status.impairs_movement() {
            return MovementPenalty::NONE;
        }
        self.movement_penalty.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_terrain_passable() {
        assert!(TerrainType::Open.is_passable());
        assert!(!TerrainType::Open.triggers_hazard());
    }

    #[test]
    fn test_obstacle_blocks_everything() {
        assert!(!TerrainType::Obstacle.is_passable());
        assert!(TerrainType::Obstacle.blocks_los());
    }

    #[test]
    fn test_hazard_passable_but_triggers() {
        assert!(TerrainType::Hazard.is_passable());
        assert!(TerrainType::Hazard.triggers_hazard());
        assert!(!TerrainType::Hazard.blocks_los());
    }

    #[test]
    fn test_penalty_rounds_cost_up() {
        let half = MovementPenalty::from_percent(50);
        assert_eq!(half.apply(1), 2);
        assert_eq!(half.apply(2), 3);
        assert_eq!(MovementPenalty::from_percent(10).apply(10), 11);
        assert_eq!(MovementPenalty::NONE.apply(3), 3);
    }

    #[test]
    fn test_penalty_saturates_on_huge_costs() {
        let half = MovementPenalty::from_percent(50);
        assert_eq!(half.apply(30_000_000), 45_000_000);
        assert_eq!(half.apply(u32::MAX), u32::MAX);
        assert_eq!(MovementPenalty::MAX.apply(u32::MAX / 2), u32::MAX);
    }

    #[test]
    fn test_penalty_capped() {
        assert_eq!(MovementPenalty::from_percent(250), MovementPenalty::MAX);
        assert_eq!(MovementPenalty::MAX.as_fraction(), 0.9);
    }

    #[test]
    fn test_only_mauled_impairs_movement() {
        let penalty = MovementPenalty::from_percent(50);
        let bleeding =
            HazardStatusEffect::new(HazardStatus::Bleeding, 2).with_movement_penalty(penalty);
        let mauled =
            HazardStatusEffect::new(HazardStatus::Mauled, 2).with_movement_penalty(penalty);
        assert_eq!(bleeding.movement_contribution(), MovementPenalty::NONE);
        assert_eq!(mauled.movement_contribution(), penalty);
    }

    #[test]
    fn test_effect_expires_after_ticks() {
        let mut effect = HazardStatusEffect::new(HazardStatus::Bitten, 1).with_damage(3);
        assert!(!effect.is_expired());
        effect.tick();
        assert!(effect.is_expired());
        effect.tick();
        assert_eq!(effect.turns_remaining, 0);
    }
}
