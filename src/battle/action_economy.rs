//! Per-turn action point bookkeeping
//!
//! Every combatant gets a fresh [`ActionState`] at the start of its turn. The
//! economy is purely budget based: any mix of actions is legal as long as the
//! AP sum fits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battle::constants::{
    ATTACK_AP_COST, BASE_ACTION_POINTS, DEFEND_AP_COST, ITEM_AP_COST, MOVE_AP_PER_HEX,
    POWER_AP_COST, SPELL_AP_COST, WEAPON_SWAP_AP_COST,
};
use crate::battle::hex::HexPosition;
use crate::core::types::{ActionPoints, CombatantId};

/// Category of a turn action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Attack,
    Defend,
    Power,
    Spell,
    Item,
    WeaponSwap,
}

impl ActionKind {
    /// Cheapest possible AP cost; for moves this is one hex
    pub fn min_cost(&self) -> ActionPoints {
        match self {
            ActionKind::Move => MOVE_AP_PER_HEX,
            ActionKind::Attack => ATTACK_AP_COST,
            ActionKind::Defend => DEFEND_AP_COST,
            ActionKind::Power => POWER_AP_COST,
            ActionKind::Spell => SPELL_AP_COST,
            ActionKind::Item => ITEM_AP_COST,
            ActionKind::WeaponSwap => WEAPON_SWAP_AP_COST,
        }
    }

    pub fn all() -> [ActionKind; 7] {
        [
            ActionKind::Move,
            ActionKind::Attack,
            ActionKind::Defend,
            ActionKind::Power,
            ActionKind::Spell,
            ActionKind::Item,
            ActionKind::WeaponSwap,
        ]
    }
}

/// An action spent (or proposed) during a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedAction {
    pub kind: ActionKind,
    pub ap_cost: ActionPoints,
    pub target_hex: Option<HexPosition>,
    pub target_combatant: Option<CombatantId>,
    /// Power, spell or item identifier
    pub ability_id: Option<String>,
}

impl ExecutedAction {
    pub fn new(kind: ActionKind, ap_cost: ActionPoints) -> Self {
        Self {
            kind,
            ap_cost,
            target_hex: None,
            target_combatant: None,
            ability_id: None,
        }
    }

    /// Move across `hexes` hexes ending at `target`
    pub fn movement(target: HexPosition, hexes: u32) -> Self {
        Self::new(ActionKind::Move, hexes.saturating_mul(MOVE_AP_PER_HEX)).with_target_hex(target)
    }

    pub fn attack(target: CombatantId) -> Self {
        Self::new(ActionKind::Attack, ATTACK_AP_COST).with_target_combatant(target)
    }

    pub fn defend() -> Self {
        Self::new(ActionKind::Defend, DEFEND_AP_COST)
    }

    /// Rank-based cost from combat resolution, never below the minimum
    pub fn power(ability_id: impl Into<String>, ap_cost: ActionPoints) -> Self {
        Self::new(ActionKind::Power, ap_cost.max(POWER_AP_COST)).with_ability(ability_id)
    }

    /// Rank-based cost from combat resolution, never below the minimum
    pub fn spell(ability_id: impl Into<String>, ap_cost: ActionPoints) -> Self {
        Self::new(ActionKind::Spell, ap_cost.max(SPELL_AP_COST)).with_ability(ability_id)
    }

    pub fn item(item_id: impl Into<String>) -> Self {
        Self::new(ActionKind::Item, ITEM_AP_COST).with_ability(item_id)
    }

    pub fn weapon_swap() -> Self {
        Self::new(ActionKind::WeaponSwap, WEAPON_SWAP_AP_COST)
    }

    pub fn with_target_hex(mut self, hex: HexPosition) -> Self {
        self.target_hex = Some(hex);
        self
    }

    pub fn with_target_combatant(mut self, target: CombatantId) -> Self {
        self.target_combatant = Some(target);
        self
    }

    pub fn with_ability(mut self, ability_id: impl Into<String>) -> Self {
        self.ability_id = Some(ability_id.into());
        self
    }
}

/// Why an action (or a planned sequence) was refused
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionRejection {
    #[error("Not enough action points (need {needed}, have {available})")]
    InsufficientActionPoints {
        needed: ActionPoints,
        available: ActionPoints,
    },

    #[error("Cannot move this turn")]
    MoveNotAllowed,

    #[error("Cannot attack this turn")]
    AttackNotAllowed,

    #[error("Action sequence costs {total} AP, but only {max} available")]
    SequenceOverBudget {
        total: ActionPoints,
        max: ActionPoints,
    },
}

/// One combatant's resources for the current turn
///
/// The capability flags are a cache of what the remaining AP allows. They are
/// recomputed after every mutation and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionState {
    combatant_id: CombatantId,
    max_action_points: ActionPoints,
    action_points_remaining: ActionPoints,
    actions_this_turn: Vec<ExecutedAction>,
    can_move: bool,
    can_attack: bool,
    can_defend: bool,
}

impl ActionState {
    /// Fresh state with the baseline budget
    pub fn new(combatant_id: CombatantId) -> Self {
        Self::with_max_ap(combatant_id, BASE_ACTION_POINTS)
    }

    /// Fresh state with a buffed or debuffed budget
    pub fn with_max_ap(combatant_id: CombatantId, max_ap: ActionPoints) -> Self {
        let mut state = Self {
            combatant_id,
            max_action_points: max_ap,
            action_points_remaining: max_ap,
            actions_this_turn: Vec::new(),
            can_move: false,
            can_attack: false,
            can_defend: false,
        };
        state.refresh_capabilities();
        state
    }

    pub fn combatant_id(&self) -> &CombatantId {
        &self.combatant_id
    }

    pub fn max_action_points(&self) -> ActionPoints {
        self.max_action_points
    }

    pub fn action_points_remaining(&self) -> ActionPoints {
        self.action_points_remaining
    }

    pub fn actions_this_turn(&self) -> &[ExecutedAction] {
        &self.actions_this_turn
    }

    pub fn can_move(&self) -> bool {
        self.can_move
    }

    pub fn can_attack(&self) -> bool {
        self.can_attack
    }

    pub fn can_defend(&self) -> bool {
        self.can_defend
    }

    pub fn is_exhausted(&self) -> bool {
        self.action_points_remaining == 0
    }

    fn refresh_capabilities(&mut self) {
        let remaining = self.action_points_remaining;
        self.can_move = remaining >= MOVE_AP_PER_HEX;
        self.can_attack = remaining >= ATTACK_AP_COST;
        self.can_defend = remaining >= DEFEND_AP_COST;
    }

    /// Spend AP on an action, producing the next state
    ///
    /// `self` is left untouched, so a rejected action needs no rollback.
    pub fn execute(&self, action: ExecutedAction) -> Result<ActionState, ActionRejection> {
        if action.ap_cost > self.action_points_remaining {
            return Err(ActionRejection::InsufficientActionPoints {
                needed: action.ap_cost,
                available: self.action_points_remaining,
            });
        }

        if action.kind == ActionKind::Move && !self.can_move {
            return Err(ActionRejection::MoveNotAllowed);
        }

        if action.kind == ActionKind::Attack && !self.can_attack {
            return Err(ActionRejection::AttackNotAllowed);
        }

        let mut next = self.clone();
        next.action_points_remaining -= action.ap_cost;
        next.actions_this_turn.push(action);
        next.refresh_capabilities();
        Ok(next)
    }

    /// Action categories currently affordable and permitted
    pub fn available_actions(&self) -> Vec<ActionKind> {
        ActionKind::all()
            .into_iter()
            .filter(|kind| self.action_points_remaining >= kind.min_cost())
            .filter(|kind| match kind {
                ActionKind::Move => self.can_move,
                ActionKind::Attack => self.can_attack,
                ActionKind::Defend => self.can_defend,
                _ => true,
            })
            .collect()
    }
}

/// Start-of-turn state for a combatant
pub fn initialize_action_state(combatant_id: CombatantId, max_ap: ActionPoints) -> ActionState {
    ActionState::with_max_ap(combatant_id, max_ap)
}

/// Execute an action against a state, logging refusals
pub fn execute_action(
    state: &ActionState,
    action: ExecutedAction,
) -> Result<ActionState, ActionRejection> {
    let kind = action.kind;
    state.execute(action).inspect_err(|rejection| {
        tracing::debug!(
            "Rejected {:?} for {}: {}",
            kind,
            state.combatant_id(),
            rejection
        );
    })
}

pub fn get_available_actions(state: &ActionState) -> Vec<ActionKind> {
    state.available_actions()
}

/// Check a planned action list against a budget, returning its total cost
///
/// Only the AP sum matters; there are no composition rules. A sum past
/// `ActionPoints::MAX` is reported as over budget at `ActionPoints::MAX`.
pub fn validate_action_sequence(
    actions: &[ExecutedAction],
    max_ap: ActionPoints,
) -> Result<ActionPoints, ActionRejection> {
    let total = actions
        .iter()
        .try_fold(0, |sum: ActionPoints, action| sum.checked_add(action.ap_cost));

    match total {
        Some(total) if total <= max_ap => Ok(total),
        Some(total) => Err(ActionRejection::SequenceOverBudget { total, max: max_ap }),
        None => Err(ActionRejection::SequenceOverBudget {
            total: ActionPoints::MAX,
            max: max_ap,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> ActionState {
        ActionState::new(CombatantId::from("achilles"))
    }

    #[test]
    fn test_initial_state_full() {
        let state = fresh();
        assert_eq!(state.max_action_points(), 3);
        assert_eq!(state.action_points_remaining(), 3);
        assert!(state.actions_this_turn().is_empty());
        assert!(state.can_move() && state.can_attack() && state.can_defend());
    }

    #[test]
    fn test_execute_decrements_and_logs() {
        let state = fresh();
        let next = state.execute(ExecutedAction::defend()).unwrap();
        assert_eq!(next.action_points_remaining(), 2);
        assert_eq!(next.actions_this_turn().len(), 1);
        // The input state is untouched
        assert_eq!(state.action_points_remaining(), 3);
    }

    #[test]
    fn test_attack_flag_drops_below_two() {
        let state = fresh()
            .execute(ExecutedAction::movement(HexPosition::new(0, 1), 2))
            .unwrap();
        assert_eq!(state.action_points_remaining(), 1);
        assert!(!state.can_attack());
        assert!(state.can_move());

        let err = state
            .execute(ExecutedAction::attack(CombatantId::from("hector")))
            .unwrap_err();
        assert_eq!(
            err,
            ActionRejection::InsufficientActionPoints {
                needed: 2,
                available: 1
            }
        );
    }

    #[test]
    fn test_zero_cost_move_refused_when_exhausted() {
        let state = fresh()
            .execute(ExecutedAction::movement(HexPosition::new(0, 0), 3))
            .unwrap();
        assert!(state.is_exhausted());
        assert!(!state.can_move());

        let err = state
            .execute(ExecutedAction::movement(HexPosition::new(0, 0), 0))
            .unwrap_err();
        assert_eq!(err, ActionRejection::MoveNotAllowed);
    }

    #[test]
    fn test_available_actions_shrink_with_ap() {
        let state = fresh();
        assert_eq!(state.available_actions(), ActionKind::all().to_vec());

        let state = state.execute(ExecutedAction::spell("fireball", 2)).unwrap();
        let available = state.available_actions();
        assert!(!available.contains(&ActionKind::Attack));
        assert!(available.contains(&ActionKind::Move));
        assert!(available.contains(&ActionKind::Item));

        let state = state.execute(ExecutedAction::weapon_swap()).unwrap();
        assert!(get_available_actions(&state).is_empty());
    }

    #[test]
    fn test_ability_cost_clamped_to_minimum() {
        assert_eq!(ExecutedAction::power("rage", 0).ap_cost, POWER_AP_COST);
        assert_eq!(ExecutedAction::spell("heal", 3).ap_cost, 3);
    }

    #[test]
    fn test_buffed_max_ap() {
        let state = initialize_action_state(CombatantId::from("tesla"), 5);
        let state = execute_action(&state, ExecutedAction::attack(CombatantId::from("x"))).unwrap();
        let state = execute_action(&state, ExecutedAction::attack(CombatantId::from("y"))).unwrap();
        assert_eq!(state.action_points_remaining(), 1);
        assert_eq!(state.actions_this_turn().len(), 2);
    }

    #[test]
    fn test_sequence_budget_only() {
        let power_and_spell = [
            ExecutedAction::power("rage", 1),
            ExecutedAction::spell("heal", 1),
            ExecutedAction::item("potion"),
        ];
        assert_eq!(validate_action_sequence(&power_and_spell, 3), Ok(3));

        let move_then_attack = [
            ExecutedAction::movement(HexPosition::new(1, 0), 2),
            ExecutedAction::attack(CombatantId::from("hector")),
        ];
        assert_eq!(
            validate_action_sequence(&move_then_attack, BASE_ACTION_POINTS),
            Err(ActionRejection::SequenceOverBudget { total: 4, max: 3 })
        );
        assert_eq!(validate_action_sequence(&[], 0), Ok(0));
    }

    #[test]
    fn test_sequence_overflow_is_over_budget() {
        let oversized = [ExecutedAction::power("big", u32::MAX), ExecutedAction::defend()];
        assert_eq!(
            validate_action_sequence(&oversized, 3),
            Err(ActionRejection::SequenceOverBudget {
                total: u32::MAX,
                max: 3
            })
        );

        let exact = [ExecutedAction::power("big", u32::MAX - 1), ExecutedAction::defend()];
        assert_eq!(validate_action_sequence(&exact, u32::MAX), Ok(u32::MAX));
    }

    #[test]
    fn test_single_ap_budget_flags() {
        let state = initialize_action_state(CombatantId::from("squire"), 1);
        assert_eq!(state.action_points_remaining(), 1);
        assert!(state.can_move());
        assert!(state.can_defend());
        assert!(!state.can_attack());
        assert!(!state.available_actions().contains(&ActionKind::Attack));

        let err = execute_action(&state, ExecutedAction::attack(CombatantId::from("x")))
            .unwrap_err();
        assert_eq!(
            err,
            ActionRejection::InsufficientActionPoints {
                needed: 2,
                available: 1
            }
        );

        let next = execute_action(&state, ExecutedAction::defend()).unwrap();
        assert!(next.is_exhausted());
    }

    #[test]
    fn test_rejection_messages() {
        let err = ActionRejection::InsufficientActionPoints {
            needed: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "Not enough action points (need 2, have 1)");
    }
}
