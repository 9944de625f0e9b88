//! A* pathfinding for battle grids
//!
//! Uniform step cost with the hex-distance heuristic, which is admissible and
//! consistent here. Frontier ties are broken on (f, h, position) so every
//! runtime returns the same path, not just the same cost.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::battle_grid::BattleGrid;
use crate::battle::constants::MOVE_AP_PER_HEX;
use crate::battle::hex::HexPosition;
use crate::core::types::{ActionPoints, CombatantId};

/// A found path and its AP cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// Start and destination included
    pub path: Vec<HexPosition>,
    pub cost: ActionPoints,
}

/// Node in the A* open set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PathNode {
    coord: HexPosition,
    g_cost: ActionPoints,
    h_cost: ActionPoints,
}

impl PathNode {
    fn f_cost(&self) -> ActionPoints {
        self.g_cost.saturating_add(self.h_cost)
    }
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .f_cost()
            .cmp(&self.f_cost())
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: HexPosition, goal: HexPosition) -> ActionPoints {
    from.distance(&goal).saturating_mul(MOVE_AP_PER_HEX)
}

/// Shortest path from `from` to `to` that fits in `max_cost`
///
/// Obstacles and hexes held by other combatants are avoided. The destination's
/// own occupant is excused so the search can path up to a target. Returns
/// `None` when no path fits the budget.
pub fn find_path_around_obstacles(
    from: HexPosition,
    to: HexPosition,
    grid: &BattleGrid,
    combatant: &CombatantId,
    max_cost: ActionPoints,
) -> Option<PathResult> {
    if from == to {
        return Some(PathResult {
            path: vec![from],
            cost: 0,
        });
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: AHashMap<HexPosition, HexPosition> = AHashMap::new();
    let mut g_scores: AHashMap<HexPosition, ActionPoints> = AHashMap::new();

    g_scores.insert(from, 0);
    open_set.push(PathNode {
        coord: from,
        g_cost: 0,
        h_cost: heuristic(from, to),
    });

    while let Some(current) = open_set.pop() {
        let best_g = g_scores.get(&current.coord).copied().unwrap_or(ActionPoints::MAX);
        if current.g_cost > best_g {
            continue; // stale entry
        }

        if current.coord == to {
            let path = reconstruct_path(&came_from, current.coord);
            tracing::debug!(
                "A* {} -> {}: {} steps, cost {}",
                from,
                to,
                path.len() - 1,
                current.g_cost
            );
            return Some(PathResult {
                path,
                cost: current.g_cost,
            });
        }

        for neighbor in current.coord.neighbors() {
            if !grid.is_in_bounds(neighbor) {
                continue;
            }

            if !grid.terrain_at(neighbor).is_passable() {
                continue;
            }

            if neighbor != to && grid.is_occupied_by_other(neighbor, combatant) {
                continue;
            }

            let tentative_g = current.g_cost.saturating_add(MOVE_AP_PER_HEX);
            if tentative_g > max_cost {
                continue;
            }

            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(ActionPoints::MAX);
            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.coord);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    coord: neighbor,
                    g_cost: tentative_g,
                    h_cost: heuristic(neighbor, to),
                });
            }
        }
    }

    tracing::debug!("A* {} -> {}: no path within {} AP", from, to, max_cost);
    None
}

/// Reconstruct path from came_from map
fn reconstruct_path(
    came_from: &AHashMap<HexPosition, HexPosition>,
    mut current: HexPosition,
) -> Vec<HexPosition> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// AP cost of walking a path step by step
pub fn path_cost(path: &[HexPosition]) -> ActionPoints {
    path.len().saturating_sub(1) as ActionPoints * MOVE_AP_PER_HEX
}
