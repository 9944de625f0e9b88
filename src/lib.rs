//! Hex Tactics - deterministic hex-grid spatial and action-economy engine

pub mod battle;
pub mod core;
