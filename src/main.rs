//! Tick Commander - command-line driver
//!
//! `check` validates a strategy file. `simulate` replays recorded snapshots
//! through a bot session and prints the commands of every tick as JSON.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use tick_commander::bot::{Bot, StepReport};
use tick_commander::core::config::BotConfig;
use tick_commander::core::error::Result;
use tick_commander::order::OrderRegistry;
use tick_commander::sim::command::Command;
use tick_commander::sim::location::StaticLocations;
use tick_commander::sim::snapshot::WorldSnapshot;
use tick_commander::strategy::presets::protoss_gateway_opening;
use tick_commander::strategy::RuleSet;

/// Order dispatch and strategy engine for RTS bots
#[derive(Parser, Debug)]
#[command(name = "tick-commander")]
#[command(about = "Validate strategies and replay snapshots through a bot session")]
struct Args {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Parse a strategy file and list its rules
    Check {
        #[arg(long)]
        strategy: PathBuf,
    },
    /// Replay snapshots through a bot and print the issued commands
    Simulate {
        /// JSON file holding one snapshot or a list of snapshots
        #[arg(long)]
        snapshot: PathBuf,

        /// Strategy file; the built-in gateway opening is used when absent
        #[arg(long)]
        strategy: Option<PathBuf>,

        /// Base layout (TOML); a single base at the first townhall otherwise
        #[arg(long)]
        locations: Option<PathBuf>,

        /// Bot configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Replay {
    Many(Vec<WorldSnapshot>),
    One(Box<WorldSnapshot>),
}

#[derive(Serialize)]
struct TickOutput<'a> {
    report: StepReport,
    commands: &'a [Command],
}

fn check(path: &Path) -> Result<()> {
    let mut orders = OrderRegistry::new();
    let strategy = RuleSet::load(path, &mut orders, BotConfig::default().default_radius)?;
    println!("{}: {} rules, {} orders", strategy.name, strategy.len(), orders.len());
    for rule in strategy.rules() {
        println!("  {} -> {} ({} triggers)", rule.name, rule.order(), rule.triggers().len());
    }
    Ok(())
}

fn simulate(
    snapshot: &Path,
    strategy: Option<&Path>,
    locations: Option<&Path>,
    config: Option<&Path>,
) -> Result<()> {
    let content = std::fs::read_to_string(snapshot)?;
    let snapshots = match serde_json::from_str::<Replay>(&content)? {
        Replay::Many(list) => list,
        Replay::One(single) => vec![*single],
    };
    let Some(first) = snapshots.first() else {
        tracing::warn!("no snapshots to replay");
        return Ok(());
    };

    let config = match config {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::default(),
    };
    let layout = match locations {
        Some(path) => StaticLocations::load(path)?,
        None => {
            let start = first
                .own_units()
                .find(|u| tick_commander::sim::catalog::is_townhall(u.unit_type))
                .map(|u| u.pos)
                .unwrap_or_default();
            StaticLocations::single_base(start)
        }
    };

    let mut bot = Bot::new(config, Box::new(layout));
    match strategy {
        Some(path) => {
            bot.load_strategy(path)?;
        }
        None => {
            let preset = protoss_gateway_opening(bot.orders_mut())?;
            bot.set_strategy(preset);
        }
    }

    let mut commands: Vec<Command> = Vec::new();
    bot.on_game_start(first, &mut commands);
    for snapshot in &snapshots {
        let report = bot.on_step(snapshot, &mut commands);
        let line = serde_json::to_string(&TickOutput { report, commands: &commands })?;
        println!("{}", line);
        commands.clear();
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tick_commander=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let outcome = match &args.command {
        Mode::Check { strategy } => check(strategy),
        Mode::Simulate {
            snapshot,
            strategy,
            locations,
            config,
        } => simulate(snapshot, strategy.as_deref(), locations.as_deref(), config.as_deref()),
    };

    if let Err(e) = outcome {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
