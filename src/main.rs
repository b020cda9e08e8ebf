use anyhow::Result;
use log::{debug, info};
use std::path::Path;

use cryo_cell_common::SimulationConfig;
use cryo_cell_sim::output::{write_final_state, write_snapshots};
use cryo_cell_sim::GrowthSimulation;

const CONFIG_ENV: &str = "CRYO_CELL_CONFIG";

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Cryo Cell Simulation...");

    // --- Load Configuration ---
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let config = SimulationConfig::load(&config_path)?;
    info!("Loaded configuration from {}.", config_path);
    info!("Using {} Rayon threads.", rayon::current_num_threads());

    // --- Initialize Simulation ---
    let mut sim = GrowthSimulation::new(config)?;
    info!("Initialized {} agents.", sim.population().len());
    debug!("Simulation Parameters: {:#?}", sim.params());

    // --- Simulation Loop ---
    sim.run();

    // --- Save Recorded Data ---
    let output = &sim.config().output;
    let out_dir = Path::new(".");
    if output.save_stats {
        write_snapshots(out_dir, output, sim.recorded_snapshots())?;
    } else {
        info!("Skipping saving snapshots as per config (save_stats is false).");
    }
    if output.save_final_state {
        write_final_state(out_dir, output, sim.population().agents())?;
    } else {
        info!("Skipping saving final state as per config.");
    }

    info!("Simulation Complete.");
    Ok(())
}
