//! poolgate - Multi-category resource admission simulator
//!
//! Loads the pool and simulation settings, runs the requested number of
//! concurrent clients against one shared pool and reports how they fared.

mod cli;
mod display;
mod error;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use clap::Parser;
use poolgate_config::Config;
use poolgate_driver::{
    CategorySelector, RandomOccupancy, RandomSelector, RoundRobin, Simulation, SimulationReport,
};
use poolgate_resources::ResourcePool;
use poolgate_types::SelectionMode;
use std::process;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    // Run the application and handle errors
    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        OutputRenderer::new(json_mode).render_error(&e);
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting poolgate v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.command);
    config.validate()?;

    let renderer = OutputRenderer::new(cli.global.json);

    match cli.command {
        Commands::Run { .. } => {
            // Clients block on OS threads, keep them off the async workers
            let report = tokio::task::spawn_blocking(move || run_simulation(&config)).await??;
            renderer.render_report(&report)?;
        }
        Commands::Config => renderer.render_config(&config)?,
    }

    info!("Command completed successfully");
    Ok(())
}

/// Build the pool and driver strategies from configuration and run it
fn run_simulation(config: &Config) -> Result<SimulationReport, CliError> {
    let pool = ResourcePool::new(config.pool_config()?, config.pool.strategy);
    let sim = &config.simulation;
    let categories = pool.config().category_ids();

    let selector: Box<dyn CategorySelector> = match sim.selection {
        SelectionMode::Random => Box::new(RandomSelector::new(categories, sim.seed)?),
        SelectionMode::RoundRobin => Box::new(RoundRobin::new(categories)?),
    };
    // offset so hold times are not drawn from the same stream as categories
    let occupancy = RandomOccupancy::new(
        Duration::from_millis(sim.min_hold_ms),
        Duration::from_millis(sim.max_hold_ms),
        sim.seed.map(|seed| seed.wrapping_add(1)),
    )?;

    let report = Simulation::new(&pool, sim.clients)
        .with_selector(selector)
        .with_occupancy(occupancy)
        .run()?;
    Ok(report)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, command: &Commands) {
    if let Commands::Run {
        clients,
        seed,
        strategy,
        selection,
        min_hold_ms,
        max_hold_ms,
    } = command
    {
        if let Some(clients) = clients {
            config.simulation.clients = *clients;
        }
        if let Some(seed) = seed {
            config.simulation.seed = Some(*seed);
        }
        if let Some(strategy) = strategy {
            config.pool.strategy = *strategy;
        }
        if let Some(selection) = selection {
            config.simulation.selection = *selection;
        }
        if let Some(min_hold_ms) = min_hold_ms {
            config.simulation.min_hold_ms = *min_hold_ms;
        }
        if let Some(max_hold_ms) = max_hold_ms {
            config.simulation.max_hold_ms = *max_hold_ms;
        }
    }
}

fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,poolgate=debug,poolgate_resources=debug,poolgate_driver=debug"
    } else if json_mode {
        "warn"
    } else {
        "info,poolgate_driver=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        // JSON mode: keep stdout clean for the report, logs go to stderr
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}
