//! Battle system constants - all tunable values in one place
//!
//! Costs are whole action points so every runtime computes them identically.

// Grid geometry
pub const DEFAULT_GRID_RADIUS: i32 = 6;
pub const DEFAULT_HEX_PIXEL_SIZE: f64 = 32.0;

// Action economy
pub const BASE_ACTION_POINTS: u32 = 3;

pub const MOVE_AP_PER_HEX: u32 = 1;
pub const ATTACK_AP_COST: u32 = 2;
pub const DEFEND_AP_COST: u32 = 1;
/// Minimum; rank surcharges are added by combat resolution
pub const POWER_AP_COST: u32 = 1;
/// Minimum; rank surcharges are added by combat resolution
pub const SPELL_AP_COST: u32 = 1;
pub const ITEM_AP_COST: u32 = 1;
pub const WEAPON_SWAP_AP_COST: u32 = 1;

// Hazard effects, in whole percent
pub const MAX_MOVEMENT_PENALTY_PERCENT: u32 = 90;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_costs_more_than_a_step() {
        assert!(ATTACK_AP_COST > MOVE_AP_PER_HEX);
    }

    #[test]
    fn test_base_budget_affords_an_attack() {
        assert!(BASE_ACTION_POINTS >= ATTACK_AP_COST);
    }

    #[test]
    fn test_penalty_cap_never_immobilizes() {
        assert!(MAX_MOVEMENT_PENALTY_PERCENT < 100);
    }
}
