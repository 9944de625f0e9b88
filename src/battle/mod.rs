//! Battle engine - hex grid, movement and the action economy
//!
//! Everything here is a pure function of its inputs. A client can run the same
//! rules for previews that the server runs to decide what actually happened.
//!
//! Layers, bottom up:
//! - `hex`: cube coordinates, distance, lines, rings, pixel conversion
//! - `battle_grid`: bounds, terrain, occupancy and hazard bookkeeping
//! - `movement` / `pathfinding`: move validation, reachability, A*
//! - `action_economy`: per-turn action points
//! - `line_of_sight`: rays, visibility and targeting helpers

pub mod action_economy;
pub mod battle_grid;
pub mod constants;
pub mod hex;
pub mod line_of_sight;
pub mod movement;
pub mod pathfinding;
pub mod team;
pub mod terrain;

// Re-exports for convenient access
pub use action_economy::{
    execute_action, get_available_actions, initialize_action_state, validate_action_sequence,
    ActionKind, ActionRejection, ActionState, ExecutedAction,
};
pub use battle_grid::BattleGrid;
pub use constants::*;
pub use hex::{FractionalHex, HexDirection, HexPosition};
pub use line_of_sight::{
    area_of_effect, best_attack_position, check_line_of_sight, flanking_positions,
    has_line_of_sight, trace_path, visible_combatants, visible_hexes, AreaOfEffect, Blocker,
    FlankingPosition, LineOfSight, VisibleCombatant,
};
pub use movement::{
    can_move_to, execute_move, find_straight_path, get_movement_penalty, get_reachable_hexes,
    max_move_distance, movement_cost, MoveRejection, MoveReport, MoveValidation,
};
pub use pathfinding::{find_path_around_obstacles, path_cost, PathResult};
pub use team::Team;
pub use terrain::{HazardStatus, HazardStatusEffect, MovementPenalty, TerrainType};
