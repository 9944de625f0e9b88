//! Battle grid: terrain, occupancy and hazard bookkeeping
//!
//! The grid is a radius-bounded hexagon of cube coordinates (sometimes called
//! "12x12" in design notes; the radius is what counts). All mappings are keyed
//! by position or combatant and ordered, so two runtimes holding the same grid
//! iterate and serialize it identically.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::battle::hex::HexPosition;
use crate::battle::team::Team;
use crate::battle::terrain::{HazardStatusEffect, TerrainType};
use crate::core::config::EngineConfig;
use crate::core::error::{Result, TacticsError};
use crate::core::types::CombatantId;

/// The full battle grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleGrid {
    radius: i32,
    /// Position -> occupant; at most one combatant per hex
    occupants: BTreeMap<HexPosition, CombatantId>,
    /// Only non-open terrain is stored
    terrain: BTreeMap<HexPosition, TerrainType>,
    hazard_attempts: BTreeMap<CombatantId, u32>,
    hazard_effects: BTreeMap<CombatantId, HazardStatusEffect>,
}

impl BattleGrid {
    /// Create an empty grid with open terrain everywhere
    ///
    /// A negative radius is treated as 0.
    pub fn new(radius: i32) -> Self {
        Self {
            radius: radius.max(0),
            occupants: BTreeMap::new(),
            terrain: BTreeMap::new(),
            hazard_attempts: BTreeMap::new(),
            hazard_effects: BTreeMap::new(),
        }
    }

    /// Standard battle grid: radius 6, central obstacle cluster, hazard ring
    pub fn initialize() -> Self {
        Self::build(&EngineConfig::default())
    }

    /// Build a grid from config: obstacles plus the hazard ring at the radius
    ///
    /// The config is validated first; a grid is only built from a config
    /// that passes `EngineConfig::validate`.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate().map_err(TacticsError::InvalidConfig)?;
        Ok(Self::build(config))
    }

    fn build(config: &EngineConfig) -> Self {
        let mut grid = Self::new(config.grid_radius);

        for hex in &config.obstacle_hexes {
            grid.set_terrain(*hex, TerrainType::Obstacle);
        }

        let ring = HexPosition::ORIGIN.ring(grid.radius as u32);
        for hex in &ring {
            grid.set_terrain(*hex, TerrainType::Hazard);
        }

        tracing::info!(
            "Initialized battle grid: radius {}, {} obstacle hexes, {} hazard hexes",
            grid.radius,
            config.obstacle_hexes.len(),
            ring.len()
        );
        grid
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Check if a hex is within the playable grid
    pub fn is_in_bounds(&self, hex: HexPosition) -> bool {
        hex.magnitude() <= self.radius
    }

    /// Check if a hex sits on the outermost ring
    pub fn is_perimeter(&self, hex: HexPosition) -> bool {
        hex.magnitude() == self.radius
    }

    /// All hexes of the grid, q-major order
    pub fn hexes(&self) -> Vec<HexPosition> {
        HexPosition::ORIGIN.hexes_in_range(self.radius.max(0) as u32)
    }

    // === TERRAIN ===

    pub fn terrain_at(&self, hex: HexPosition) -> TerrainType {
        self.terrain.get(&hex).copied().unwrap_or_default()
    }

    /// Set terrain at an in-bounds hex; out-of-bounds hexes are ignored
    pub fn set_terrain(&mut self, hex: HexPosition, terrain: TerrainType) {
        if !self.is_in_bounds(hex) {
            return;
        }
        match terrain {
            TerrainType::Open => {
                self.terrain.remove(&hex);
            }
            _ => {
                self.terrain.insert(hex, terrain);
            }
        }
    }

    /// Non-open terrain by position
    pub fn terrain(&self) -> &BTreeMap<HexPosition, TerrainType> {
        &self.terrain
    }

    // === OCCUPANCY ===

    pub fn occupant_at(&self, hex: HexPosition) -> Option<&CombatantId> {
        self.occupants.get(&hex)
    }

    /// Is the hex held by someone other than `id`?
    pub fn is_occupied_by_other(&self, hex: HexPosition, id: &CombatantId) -> bool {
        self.occupants.get(&hex).is_some_and(|occupant| occupant != id)
    }

    pub fn position_of(&self, id: &CombatantId) -> Option<HexPosition> {
        self.occupants
            .iter()
            .find(|(_, occupant)| *occupant == id)
            .map(|(hex, _)| *hex)
    }

    pub fn occupants(&self) -> &BTreeMap<HexPosition, CombatantId> {
        &self.occupants
    }

    /// Why `id` may not stand on `hex`, if anything
    fn placement_problem(&self, id: &CombatantId, hex: HexPosition) -> Option<String> {
        if !self.is_in_bounds(hex) {
            return Some("out of bounds".to_string());
        }
        if !self.terrain_at(hex).is_passable() {
            return Some("blocked terrain".to_string());
        }
        match self.occupants.get(&hex) {
            Some(occupant) if occupant != id => Some(format!("occupied by {}", occupant)),
            _ => None,
        }
    }

    /// Put a combatant on the grid for the first time
    pub fn place(&mut self, id: CombatantId, hex: HexPosition) -> Result<()> {
        if self.position_of(&id).is_some() {
            return Err(TacticsError::AlreadyPlaced(id));
        }
        if let Some(reason) = self.placement_problem(&id, hex) {
            return Err(TacticsError::InvalidPlacement {
                id,
                position: hex,
                reason,
            });
        }
        self.occupants.insert(hex, id);
        Ok(())
    }

    /// Move a placed combatant, returning where it came from
    ///
    /// Only occupancy and terrain are checked; AP is the caller's concern.
    pub fn relocate(&mut self, id: &CombatantId, to: HexPosition) -> Result<HexPosition> {
        let from = self
            .position_of(id)
            .ok_or_else(|| TacticsError::CombatantNotFound(id.clone()))?;

        if let Some(reason) = self.placement_problem(id, to) {
            return Err(TacticsError::InvalidPlacement {
                id: id.clone(),
                position: to,
                reason,
            });
        }

        self.occupants.remove(&from);
        self.occupants.insert(to, id.clone());
        Ok(from)
    }

    /// Take a combatant off the grid (defeated, withdrawn)
    pub fn remove(&mut self, id: &CombatantId) -> Option<HexPosition> {
        let hex = self.position_of(id)?;
        self.occupants.remove(&hex);
        Some(hex)
    }

    /// Place combatants on a team's start formation, left to right
    pub fn deploy_team(&mut self, team: Team, ids: &[CombatantId]) -> Result<()> {
        let slots = team.start_positions();
        if ids.len() > slots.len() {
            return Err(TacticsError::FormationFull {
                team,
                slots: slots.len(),
            });
        }

        for (id, hex) in ids.iter().zip(slots) {
            self.place(id.clone(), hex)?;
        }

        tracing::info!("Deployed {} combatants for {:?}", ids.len(), team);
        Ok(())
    }

    /// Knock a combatant `distance` hexes toward the center
    ///
    /// Returns the landing hex, or `None` when it is blocked or taken and the
    /// combatant stays put.
    pub fn push_toward_center(
        &mut self,
        id: &CombatantId,
        distance: u32,
    ) -> Result<Option<HexPosition>> {
        let from = self
            .position_of(id)
            .ok_or_else(|| TacticsError::CombatantNotFound(id.clone()))?;

        let target = from.nearest_center_hex(distance);
        if target == from || self.placement_problem(id, target).is_some() {
            return Ok(None);
        }

        self.relocate(id, target)?;
        Ok(Some(target))
    }

    // === HAZARDS ===

    /// Count another hazard entry, returning the new total
    pub fn record_hazard_attempt(&mut self, id: &CombatantId) -> u32 {
        let attempts = self.hazard_attempts.entry(id.clone()).or_insert(0);
        *attempts += 1;
        *attempts
    }

    pub fn hazard_attempts(&self, id: &CombatantId) -> u32 {
        self.hazard_attempts.get(id).copied().unwrap_or(0)
    }

    /// Store the effect decided by combat resolution, replacing any previous one
    pub fn apply_hazard_effect(&mut self, id: &CombatantId, effect: HazardStatusEffect) {
        self.hazard_effects.insert(id.clone(), effect);
    }

    pub fn hazard_effect(&self, id: &CombatantId) -> Option<&HazardStatusEffect> {
        self.hazard_effects.get(id)
    }

    pub fn clear_hazard_effect(&mut self, id: &CombatantId) -> Option<HazardStatusEffect> {
        self.hazard_effects.remove(id)
    }

    /// Advance every effect by one turn and drop the expired ones
    ///
    /// Returns the combatants whose effect ran out.
    pub fn tick_hazard_effects(&mut self) -> Vec<CombatantId> {
        let mut expired = Vec::new();
        self.hazard_effects.retain(|id, effect| {
            effect.tick();
            if effect.is_expired() {
                expired.push(id.clone());
                false
            } else {
                true
            }
        });
        expired
    }
}
