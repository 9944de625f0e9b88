//! Line of sight over the battle grid
//!
//! A ray is the straight hex line between two positions. Only the hexes
//! strictly between the ends can block it: obstacle terrain and any combatant
//! not explicitly ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::battle::battle_grid::BattleGrid;
use crate::battle::hex::HexPosition;
use crate::battle::terrain::TerrainType;
use crate::core::types::CombatantId;

/// Something standing in the way of a ray
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Blocker {
    Terrain {
        position: HexPosition,
        terrain: TerrainType,
    },
    Combatant {
        position: HexPosition,
        id: CombatantId,
    },
}

impl Blocker {
    pub fn position(&self) -> HexPosition {
        match self {
            Blocker::Terrain { position, .. } | Blocker::Combatant { position, .. } => *position,
        }
    }
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::Terrain { terrain, .. } => match terrain {
                TerrainType::Obstacle => write!(f, "obstacle"),
                _ => write!(f, "terrain"),
            },
            Blocker::Combatant { id, .. } => write!(f, "combatant {}", id),
        }
    }
}

/// Result of tracing a ray
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOfSight {
    pub path: Vec<HexPosition>,
    pub blocked_by: Vec<Blocker>,
}

impl LineOfSight {
    pub fn is_clear(&self) -> bool {
        self.blocked_by.is_empty()
    }
}

impl fmt::Display for LineOfSight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.blocked_by.as_slice() {
            [] => write!(f, "Clear line of sight"),
            [only] => write!(f, "Blocked by {}", only),
            [rest @ .., last] => {
                let rest: Vec<String> = rest.iter().map(ToString::to_string).collect();
                write!(f, "Blocked by {} and {}", rest.join(", "), last)
            }
        }
    }
}

/// Hexes a ray passes through, both ends included
pub fn trace_path(from: HexPosition, to: HexPosition) -> Vec<HexPosition> {
    from.line_to(&to)
}

/// Trace a ray and collect everything blocking it
pub fn check_line_of_sight(
    from: HexPosition,
    to: HexPosition,
    grid: &BattleGrid,
    ignore: &[CombatantId],
) -> LineOfSight {
    let path = trace_path(from, to);
    let mut blocked_by = Vec::new();

    let interior = path.len().saturating_sub(2);
    for hex in path.iter().skip(1).take(interior) {
        let terrain = grid.terrain_at(*hex);
        if terrain.blocks_los() {
            blocked_by.push(Blocker::Terrain {
                position: *hex,
                terrain,
            });
        }

        if let Some(occupant) = grid.occupant_at(*hex) {
            if !ignore.contains(occupant) {
                blocked_by.push(Blocker::Combatant {
                    position: *hex,
                    id: occupant.clone(),
                });
            }
        }
    }

    LineOfSight { path, blocked_by }
}

pub fn has_line_of_sight(
    from: HexPosition,
    to: HexPosition,
    grid: &BattleGrid,
    ignore: &[CombatantId],
) -> bool {
    check_line_of_sight(from, to, grid, ignore).is_clear()
}

/// In-bounds hexes within `max_range` that `from` can see
pub fn visible_hexes(
    from: HexPosition,
    max_range: u32,
    grid: &BattleGrid,
    ignore: &[CombatantId],
) -> Vec<HexPosition> {
    from.hexes_in_range(max_range)
        .into_iter()
        .filter(|hex| *hex != from && grid.is_in_bounds(*hex))
        .filter(|hex| has_line_of_sight(from, *hex, grid, ignore))
        .collect()
}

/// A combatant seen from some position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleCombatant {
    pub id: CombatantId,
    pub position: HexPosition,
    pub distance: u32,
}

/// Combatants in range with a clear ray, nearest first
pub fn visible_combatants(
    from: HexPosition,
    max_range: u32,
    grid: &BattleGrid,
    ignore: &[CombatantId],
) -> Vec<VisibleCombatant> {
    let mut visible: Vec<VisibleCombatant> = grid
        .occupants()
        .iter()
        .filter(|(hex, id)| **hex != from && !ignore.contains(*id))
        .map(|(hex, id)| VisibleCombatant {
            id: id.clone(),
            position: *hex,
            distance: from.distance(hex),
        })
        .filter(|seen| seen.distance <= max_range)
        .filter(|seen| has_line_of_sight(from, seen.position, grid, ignore))
        .collect();

    visible.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));
    visible
}

/// Blast area of an area-of-effect ability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaOfEffect {
    pub can_hit: bool,
    /// In-bounds hexes inside the blast radius; empty when it cannot hit
    pub affected_hexes: Vec<HexPosition>,
}

pub fn area_of_effect(
    origin: HexPosition,
    target: HexPosition,
    radius: u32,
    grid: &BattleGrid,
    requires_los: bool,
) -> AreaOfEffect {
    if requires_los && !has_line_of_sight(origin, target, grid, &[]) {
        return AreaOfEffect {
            can_hit: false,
            affected_hexes: Vec::new(),
        };
    }

    AreaOfEffect {
        can_hit: true,
        affected_hexes: target
            .hexes_in_range(radius)
            .into_iter()
            .filter(|hex| grid.is_in_bounds(*hex))
            .collect(),
    }
}

/// Closest hex within `max_range` of `target` from which `combatant` could
/// attack it
///
/// Candidates must be open ground, free of other combatants and have a clear
/// ray to the target. Equal distances resolve to the lowest (q, r).
pub fn best_attack_position(
    target: HexPosition,
    max_range: u32,
    grid: &BattleGrid,
    combatant: &CombatantId,
) -> Option<HexPosition> {
    let ignore = std::slice::from_ref(combatant);

    target
        .hexes_in_range(max_range)
        .into_iter()
        .filter(|hex| *hex != target && grid.is_in_bounds(*hex))
        .filter(|hex| grid.terrain_at(*hex) == TerrainType::Open)
        .filter(|hex| !grid.is_occupied_by_other(*hex, combatant))
        .filter(|hex| has_line_of_sight(*hex, target, grid, ignore))
        .min_by_key(|hex| (hex.distance(&target), *hex))
}

/// A hex adjacent to a target and who, if anyone, holds it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlankingPosition {
    pub position: HexPosition,
    pub occupant: Option<CombatantId>,
}

impl FlankingPosition {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

/// In-bounds neighbors of `target` with their occupants
pub fn flanking_positions(target: HexPosition, grid: &BattleGrid) -> Vec<FlankingPosition> {
    target
        .neighbors()
        .into_iter()
        .filter(|hex| grid.is_in_bounds(*hex))
        .map(|hex| FlankingPosition {
            position: hex,
            occupant: grid.occupant_at(hex).cloned(),
        })
        .collect()
}
