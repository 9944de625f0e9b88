//! Hex Inspect
//!
//! Builds a battle grid, deploys both teams and reports what one combatant can
//! do: reachable hexes, a path and sight line to a target, available actions.

use std::path::PathBuf;

use clap::Parser;
use hex_tactics::battle::{
    can_move_to, check_line_of_sight, find_path_around_obstacles, get_reachable_hexes,
    initialize_action_state, ActionKind, BattleGrid, HexPosition, MovementPenalty, PathResult,
    Team,
};
use hex_tactics::core::{CombatantId, EngineConfig, Result, TacticsError};
use serde::Serialize;

/// Hex Inspect - movement and actions on a battle grid
#[derive(Parser, Debug)]
#[command(name = "hex_inspect")]
#[command(about = "Report reachable hexes, paths and available actions for one combatant")]
struct Args {
    /// Engine config TOML (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Combatant to inspect; teams deploy as one-1..one-3 and two-1..two-3
    #[arg(long, default_value = "one-2")]
    combatant: String,

    /// Target hex as "q,r"
    #[arg(long, allow_hyphen_values = true)]
    to: Option<HexPosition>,

    /// Action points available (config base when omitted)
    #[arg(long)]
    ap: Option<u32>,

    /// Movement penalty in percent, capped at 90
    #[arg(long, default_value_t = 0)]
    penalty: u32,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct TargetReport {
    hex: HexPosition,
    move_cost: u32,
    move_refusal: Option<String>,
    path: Option<PathResult>,
    line_of_sight: String,
}

#[derive(Serialize)]
struct InspectReport {
    combatant: CombatantId,
    position: HexPosition,
    action_points: u32,
    penalty_percent: u32,
    reachable: Vec<HexPosition>,
    available_actions: Vec<ActionKind>,
    target: Option<TargetReport>,
}

fn deploy(grid: &mut BattleGrid) -> Result<()> {
    for (team, prefix) in [(Team::One, "one"), (Team::Two, "two")] {
        let ids: Vec<CombatantId> = (1..=3)
            .map(|i| CombatantId::new(format!("{}-{}", prefix, i)))
            .collect();
        grid.deploy_team(team, &ids)?;
    }
    Ok(())
}

fn inspect(args: &Args) -> Result<InspectReport> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut grid = BattleGrid::from_config(&config)?;
    deploy(&mut grid)?;

    let combatant = CombatantId::new(args.combatant.as_str());
    let position = grid
        .position_of(&combatant)
        .ok_or_else(|| TacticsError::CombatantNotFound(combatant.clone()))?;

    let action_points = args.ap.unwrap_or(config.base_action_points);
    let penalty = MovementPenalty::from_percent(args.penalty);
    let state = initialize_action_state(combatant.clone(), action_points);

    let target = args.to.map(|hex| {
        let validation = can_move_to(&combatant, position, hex, &grid, action_points, penalty);
        TargetReport {
            hex,
            move_cost: validation.ap_cost,
            move_refusal: validation.reason(),
            path: find_path_around_obstacles(position, hex, &grid, &combatant, action_points),
            line_of_sight: check_line_of_sight(position, hex, &grid, &[combatant.clone()])
                .to_string(),
        }
    });

    Ok(InspectReport {
        reachable: get_reachable_hexes(&combatant, position, action_points, &grid, penalty),
        available_actions: state.available_actions(),
        combatant,
        position,
        action_points,
        penalty_percent: penalty.percent(),
        target,
    })
}

fn print_text(report: &InspectReport) {
    println!("Hex Inspect");
    println!("=========");
    println!("Combatant: {} at {}", report.combatant, report.position);
    println!(
        "Action points: {} (movement penalty {}%)",
        report.action_points, report.penalty_percent
    );
    let reachable: Vec<String> = report.reachable.iter().map(ToString::to_string).collect();
    println!("Reachable ({}): {}", reachable.len(), reachable.join(" "));
    println!("Available actions: {:?}", report.available_actions);

    if let Some(target) = &report.target {
        println!();
        println!("Target {}", target.hex);
        match &target.move_refusal {
            Some(reason) => println!(
                "  Straight move: refused ({}), cost {} AP",
                reason, target.move_cost
            ),
            None => println!("  Straight move: allowed, cost {} AP", target.move_cost),
        }
        match &target.path {
            Some(found) => {
                let steps: Vec<String> = found.path.iter().map(ToString::to_string).collect();
                println!("  Path ({} AP): {}", found.cost, steps.join(" -> "));
            }
            None => println!("  Path: none within budget"),
        }
        println!("  {}", target.line_of_sight);
    }
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        "hex_tactics=debug"
    } else {
        "hex_tactics=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let report = match inspect(&args) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match args.format.as_str() {
        "json" => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", TacticsError::from(e));
                std::process::exit(1);
            }
        },
        _ => print_text(&report),
    }
}
