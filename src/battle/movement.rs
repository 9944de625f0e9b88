//! Move validation, reachability and move execution
//!
//! `can_move_to` is the single gate every move goes through. Reachability is
//! defined in terms of it, so anything highlighted as reachable is a move the
//! engine will accept.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battle::action_economy::{ActionKind, ActionRejection, ActionState, ExecutedAction};
use crate::battle::battle_grid::BattleGrid;
use crate::battle::constants::MOVE_AP_PER_HEX;
use crate::battle::hex::HexPosition;
use crate::battle::terrain::{HazardStatusEffect, MovementPenalty};
use crate::core::types::{ActionPoints, CombatantId};

/// Why a move was refused
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveRejection {
    #[error("Not enough action points (need {needed}, have {available})")]
    InsufficientActionPoints {
        needed: ActionPoints,
        available: ActionPoints,
    },

    #[error("Destination out of bounds")]
    OutOfBounds,

    #[error("Hex occupied by {0}")]
    Occupied(CombatantId),

    #[error("Cannot move into blocked terrain")]
    BlockedTerrain,

    #[error("Already standing on the destination")]
    NoMovement,

    #[error("{0} is not on the grid")]
    NotOnGrid(CombatantId),

    #[error("{0}")]
    Action(#[from] ActionRejection),

    #[error("{0}")]
    Placement(String),
}

/// Outcome of checking a single move
///
/// The cost is reported even for refused moves so a UI can show it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveValidation {
    pub ap_cost: ActionPoints,
    pub rejection: Option<MoveRejection>,
    pub will_trigger_perimeter: bool,
    /// Straight-line path, start and destination included; empty when refused
    pub path: Vec<HexPosition>,
}

impl MoveValidation {
    fn rejected(ap_cost: ActionPoints, rejection: MoveRejection) -> Self {
        Self {
            ap_cost,
            rejection: Some(rejection),
            will_trigger_perimeter: false,
            path: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }

    /// Human-readable refusal reason
    pub fn reason(&self) -> Option<String> {
        self.rejection.as_ref().map(ToString::to_string)
    }
}

/// AP cost of moving in a straight line, penalty applied
pub fn movement_cost(from: HexPosition, to: HexPosition, penalty: MovementPenalty) -> ActionPoints {
    penalty.apply(from.distance(&to).saturating_mul(MOVE_AP_PER_HEX))
}

/// Farthest a combatant can move on `ap_available`
pub fn max_move_distance(ap_available: ActionPoints, penalty: MovementPenalty) -> u32 {
    let distance =
        (ap_available as u64 * 100) / (MOVE_AP_PER_HEX as u64 * (100 + penalty.percent() as u64));
    u32::try_from(distance).unwrap_or(u32::MAX)
}

/// Check whether `combatant` can move from `from` to `to`
///
/// Checks run in a fixed order: budget, bounds, occupancy, terrain. A hazard
/// destination is legal but flagged.
pub fn can_move_to(
    combatant: &CombatantId,
    from: HexPosition,
    to: HexPosition,
    grid: &BattleGrid,
    ap_available: ActionPoints,
    movement_penalty: MovementPenalty,
) -> MoveValidation {
    let ap_cost = movement_cost(from, to, movement_penalty);

    if ap_cost > ap_available {
        return MoveValidation::rejected(
            ap_cost,
            MoveRejection::InsufficientActionPoints {
                needed: ap_cost,
                available: ap_available,
            },
        );
    }

    if !grid.is_in_bounds(to) {
        return MoveValidation::rejected(ap_cost, MoveRejection::OutOfBounds);
    }

    if let Some(occupant) = grid.occupant_at(to) {
        if occupant != combatant {
            return MoveValidation::rejected(ap_cost, MoveRejection::Occupied(occupant.clone()));
        }
    }

    let terrain = grid.terrain_at(to);
    if !terrain.is_passable() {
        return MoveValidation::rejected(ap_cost, MoveRejection::BlockedTerrain);
    }

    MoveValidation {
        ap_cost,
        rejection: None,
        will_trigger_perimeter: terrain.triggers_hazard(),
        path: find_straight_path(from, to),
    }
}

/// Every hex `combatant` could legally move to from `from`
///
/// Candidates come from the hex area the budget allows and each one must pass
/// `can_move_to`; the starting hex is never included.
pub fn get_reachable_hexes(
    combatant: &CombatantId,
    from: HexPosition,
    ap_available: ActionPoints,
    grid: &BattleGrid,
    movement_penalty: MovementPenalty,
) -> Vec<HexPosition> {
    // Nothing in bounds lies farther than this, whatever the budget
    let grid_reach = from.magnitude() as i64 + grid.radius() as i64;
    let max_distance = max_move_distance(ap_available, movement_penalty)
        .min(u32::try_from(grid_reach).unwrap_or(u32::MAX));

    from.hexes_in_range(max_distance)
        .into_iter()
        .filter(|hex| *hex != from)
        .filter(|hex| {
            let validation =
                can_move_to(combatant, from, *hex, grid, ap_available, movement_penalty);
            if let Some(rejection) = &validation.rejection {
                tracing::trace!("{} cannot reach {}: {}", combatant, hex, rejection);
            }
            validation.is_valid()
        })
        .collect()
}

/// Straight-line path through cube space, both ends included
///
/// Ignores obstacles; used for animation when nothing needs to be negotiated.
pub fn find_straight_path(from: HexPosition, to: HexPosition) -> Vec<HexPosition> {
    from.line_to(&to)
}

/// Combined movement penalty of active effects, capped at 90%
pub fn get_movement_penalty<'a>(
    effects: impl IntoIterator<Item = &'a HazardStatusEffect>,
) -> MovementPenalty {
    let total = effects
        .into_iter()
        .map(|effect| effect.movement_contribution().percent())
        .fold(0u32, u32::saturating_add);
    MovementPenalty::from_percent(total)
}

/// What happened when a move was carried out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveReport {
    pub from: HexPosition,
    pub to: HexPosition,
    pub path: Vec<HexPosition>,
    pub ap_cost: ActionPoints,
    pub will_trigger_perimeter: bool,
    /// Hazard entries so far, including this one when it triggered
    pub hazard_attempts: u32,
}

/// Validate and apply a move for the combatant owning `state`
///
/// On success the grid is updated, a hazard entry is recorded when the
/// destination is hazardous, and the spent-AP state is returned. On rejection
/// neither the grid nor `state` change.
pub fn execute_move(
    grid: &mut BattleGrid,
    state: &ActionState,
    to: HexPosition,
    movement_penalty: MovementPenalty,
) -> Result<(ActionState, MoveReport), MoveRejection> {
    let combatant = state.combatant_id();
    let from = grid
        .position_of(combatant)
        .ok_or_else(|| MoveRejection::NotOnGrid(combatant.clone()))?;

    if from == to {
        return Err(MoveRejection::NoMovement);
    }

    let validation = can_move_to(
        combatant,
        from,
        to,
        grid,
        state.action_points_remaining(),
        movement_penalty,
    );
    if let Some(rejection) = validation.rejection {
        tracing::debug!("Move {} -> {} refused for {}: {}", from, to, combatant, rejection);
        return Err(rejection);
    }

    let action = ExecutedAction::new(ActionKind::Move, validation.ap_cost).with_target_hex(to);
    let next_state = state.execute(action)?;

    grid.relocate(combatant, to)
        .map_err(|e| MoveRejection::Placement(e.to_string()))?;

    let hazard_attempts = if validation.will_trigger_perimeter {
        grid.record_hazard_attempt(combatant)
    } else {
        grid.hazard_attempts(combatant)
    };

    tracing::debug!(
        "{} moved {} -> {} for {} AP ({} left)",
        combatant,
        from,
        to,
        validation.ap_cost,
        next_state.action_points_remaining()
    );

    Ok((
        next_state,
        MoveReport {
            from,
            to,
            path: validation.path,
            ap_cost: validation.ap_cost,
            will_trigger_perimeter: validation.will_trigger_perimeter,
            hazard_attempts,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::terrain::{HazardStatus, TerrainType};

    fn id(name: &str) -> CombatantId {
        CombatantId::from(name)
    }

    #[test]
    fn test_cost_is_distance() {
        let from = HexPosition::new(0, 3);
        let to = HexPosition::new(0, 1);
        assert_eq!(movement_cost(from, to, MovementPenalty::NONE), 2);
        assert_eq!(movement_cost(from, to, MovementPenalty::from_percent(50)), 3);
    }

    #[test]
    fn test_max_distance_with_penalty() {
        assert_eq!(max_move_distance(3, MovementPenalty::NONE), 3);
        assert_eq!(max_move_distance(3, MovementPenalty::from_percent(50)), 2);
        assert_eq!(max_move_distance(3, MovementPenalty::MAX), 1);
        assert_eq!(max_move_distance(0, MovementPenalty::NONE), 0);
    }

    #[test]
    fn test_far_destination_is_insufficient_ap() {
        let grid = BattleGrid::new(6);
        let result = can_move_to(
            &id("a"),
            HexPosition::new(0, 3),
            HexPosition::new(30_000_000, 0),
            &grid,
            3,
            MovementPenalty::from_percent(50),
        );
        assert_eq!(
            result.rejection,
            Some(MoveRejection::InsufficientActionPoints {
                needed: 45_000_000,
                available: 3
            })
        );

        let corner = can_move_to(
            &id("a"),
            HexPosition::new(i32::MIN, 0),
            HexPosition::new(i32::MAX, 0),
            &grid,
            3,
            MovementPenalty::MAX,
        );
        assert_eq!(corner.ap_cost, u32::MAX);
        assert!(!corner.is_valid());
    }

    #[test]
    fn test_huge_budget_does_not_overflow() {
        assert_eq!(max_move_distance(u32::MAX, MovementPenalty::NONE), u32::MAX);
        assert_eq!(
            max_move_distance(u32::MAX, MovementPenalty::MAX),
            (u32::MAX as u64 * 100 / 190) as u32
        );

        let grid = BattleGrid::new(2);
        for ap in [1_000, u32::MAX] {
            let reachable = get_reachable_hexes(
                &id("a"),
                HexPosition::ORIGIN,
                ap,
                &grid,
                MovementPenalty::NONE,
            );
            assert_eq!(reachable.len(), 18);
        }
    }

    #[test]
    fn test_open_move_valid() {
        let grid = BattleGrid::new(6);
        let result = can_move_to(
            &id("a"),
            HexPosition::new(0, 3),
            HexPosition::new(0, 1),
            &grid,
            3,
            MovementPenalty::NONE,
        );
        assert!(result.is_valid());
        assert_eq!(result.ap_cost, 2);
        assert!(!result.will_trigger_perimeter);
        assert_eq!(
            result.path,
            vec![
                HexPosition::new(0, 3),
                HexPosition::new(0, 2),
                HexPosition::new(0, 1)
            ]
        );
    }

    #[test]
    fn test_budget_checked_before_bounds() {
        let grid = BattleGrid::new(6);
        let result = can_move_to(
            &id("a"),
            HexPosition::new(5, 0),
            HexPosition::new(9, 0),
            &grid,
            2,
            MovementPenalty::NONE,
        );
        assert_eq!(
            result.rejection,
            Some(MoveRejection::InsufficientActionPoints {
                needed: 4,
                available: 2
            })
        );
        assert!(result.path.is_empty());
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let grid = BattleGrid::new(6);
        let result = can_move_to(
            &id("a"),
            HexPosition::new(6, 0),
            HexPosition::new(7, 0),
            &grid,
            3,
            MovementPenalty::NONE,
        );
        assert_eq!(result.rejection, Some(MoveRejection::OutOfBounds));
        assert_eq!(result.reason().unwrap(), "Destination out of bounds");
    }

    #[test]
    fn test_own_hex_is_not_occupied_for_self() {
        let mut grid = BattleGrid::new(6);
        grid.place(id("a"), HexPosition::new(2, 0)).unwrap();

        let own = can_move_to(
            &id("a"),
            HexPosition::new(2, 0),
            HexPosition::new(2, 0),
            &grid,
            3,
            MovementPenalty::NONE,
        );
        assert!(own.is_valid());
        assert_eq!(own.ap_cost, 0);

        let other = can_move_to(
            &id("b"),
            HexPosition::new(1, 0),
            HexPosition::new(2, 0),
            &grid,
            3,
            MovementPenalty::NONE,
        );
        assert_eq!(other.rejection, Some(MoveRejection::Occupied(id("a"))));
    }

    #[test]
    fn test_reachable_excludes_start_and_blocked() {
        let mut grid = BattleGrid::new(6);
        grid.set_terrain(HexPosition::new(1, 0), TerrainType::Obstacle);
        grid.place(id("b"), HexPosition::new(0, 1)).unwrap();

        let from = HexPosition::ORIGIN;
        let reachable = get_reachable_hexes(&id("a"), from, 1, &grid, MovementPenalty::NONE);
        assert_eq!(reachable.len(), 4);
        assert!(!reachable.contains(&from));
        assert!(!reachable.contains(&HexPosition::new(1, 0)));
        assert!(!reachable.contains(&HexPosition::new(0, 1)));
    }

    #[test]
    fn test_reachable_respects_penalty() {
        let grid = BattleGrid::new(6);
        let reachable = get_reachable_hexes(
            &id("a"),
            HexPosition::ORIGIN,
            3,
            &grid,
            MovementPenalty::from_percent(50),
        );
        // distance 2 costs ceil(2 * 1.5) = 3
        assert_eq!(reachable.len(), 18);
        assert!(reachable.iter().all(|hex| hex.distance(&HexPosition::ORIGIN) <= 2));
    }

    #[test]
    fn test_movement_penalty_sums_and_caps() {
        let mauled = |pct| {
            HazardStatusEffect::new(HazardStatus::Mauled, 2)
                .with_movement_penalty(MovementPenalty::from_percent(pct))
        };
        let effects = vec![mauled(50), mauled(30)];
        assert_eq!(get_movement_penalty(&effects).percent(), 80);

        let effects = vec![mauled(50), mauled(50), mauled(50)];
        assert_eq!(get_movement_penalty(&effects), MovementPenalty::MAX);

        let bleeding = HazardStatusEffect::new(HazardStatus::Bleeding, 2).with_damage(4);
        assert_eq!(get_movement_penalty([&bleeding]), MovementPenalty::NONE);
        assert_eq!(get_movement_penalty(&Vec::<HazardStatusEffect>::new()), MovementPenalty::NONE);
    }

    #[test]
    fn test_execute_move_updates_grid_and_state() {
        let mut grid = BattleGrid::initialize();
        grid.place(id("a"), HexPosition::new(2, 3)).unwrap();
        let state = ActionState::new(id("a"));

        let (state, report) =
            execute_move(&mut grid, &state, HexPosition::new(3, 2), MovementPenalty::NONE).unwrap();

        assert_eq!(state.action_points_remaining(), 2);
        assert_eq!(report.ap_cost, 1);
        assert_eq!(report.from, HexPosition::new(2, 3));
        assert_eq!(grid.position_of(&id("a")), Some(HexPosition::new(3, 2)));
        assert_eq!(state.actions_this_turn()[0].target_hex, Some(HexPosition::new(3, 2)));
    }

    #[test]
    fn test_execute_move_records_hazard_entry() {
        let mut grid = BattleGrid::initialize();
        grid.place(id("a"), HexPosition::new(4, 0)).unwrap();
        let state = ActionState::new(id("a"));

        let (_, report) =
            execute_move(&mut grid, &state, HexPosition::new(6, 0), MovementPenalty::NONE).unwrap();

        assert!(report.will_trigger_perimeter);
        assert_eq!(report.hazard_attempts, 1);
        assert_eq!(grid.hazard_attempts(&id("a")), 1);
    }

    #[test]
    fn test_execute_move_rejection_leaves_grid() {
        let mut grid = BattleGrid::initialize();
        grid.place(id("a"), HexPosition::new(0, 3)).unwrap();
        let state = ActionState::new(id("a"));
        let before = grid.clone();

        let err = execute_move(&mut grid, &state, HexPosition::new(0, 1), MovementPenalty::NONE)
            .unwrap_err();
        assert_eq!(err, MoveRejection::BlockedTerrain);
        assert_eq!(grid, before);

        let err = execute_move(&mut grid, &state, HexPosition::new(0, 3), MovementPenalty::NONE)
            .unwrap_err();
        assert_eq!(err, MoveRejection::NoMovement);

        let stranger = ActionState::new(id("ghost"));
        let err = execute_move(&mut grid, &stranger, HexPosition::new(1, 3), MovementPenalty::NONE)
            .unwrap_err();
        assert_eq!(err, MoveRejection::NotOnGrid(id("ghost")));
    }

    #[test]
    fn test_execute_move_zero_ap_refused() {
        let mut grid = BattleGrid::new(6);
        grid.place(id("a"), HexPosition::ORIGIN).unwrap();
        let state = ActionState::with_max_ap(id("a"), 0);

        let err = execute_move(&mut grid, &state, HexPosition::new(1, 0), MovementPenalty::NONE)
            .unwrap_err();
        assert!(matches!(err, MoveRejection::InsufficientActionPoints { .. }));
    }
}
