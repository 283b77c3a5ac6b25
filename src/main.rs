use activation_forge::config::Config;
use activation_forge::export::{write_export_to_json, RunExport};
use activation_forge::simulation::Simulation;
use std::env;
use std::path::Path;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    env_logger::init();
    log::info!("Booting Activation Forge...");

    // 1. Load and Validate Configuration
    let config_path = env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = match Config::load(Path::new(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to load configuration '{}': {}", config_path, e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        process::exit(1);
    }
    log::info!("Configuration loaded and validated.");

    // 2. Run the Simulation, one generation per tick
    let tick = Duration::from_millis(config.simulation.tick_rate_ms);
    let export_path = config.simulation.export_path.clone();
    let mut simulation = Simulation::new(config);

    log::info!("--- Starting Evolution ---");
    simulation.start();
    while simulation.is_running() {
        thread::sleep(tick);
        simulation.tick();
    }

    // 3. Report the Leaderboard
    log::info!("--- Evolution Complete ---");
    println!("Top formulas:");
    for (i, candidate) in simulation.leaderboard().entries().iter().enumerate() {
        println!(
            "[Rank {:>2}] {:<40} score {:.4}  accuracy {:.4}  loss {:.4}  ({})",
            i + 1,
            candidate.expression(),
            candidate.score(),
            candidate.accuracy(),
            candidate.loss(),
            candidate.id()
        );
    }

    // 4. Export
    if let Some(path) = export_path {
        let export = RunExport::from_simulation(&simulation);
        match write_export_to_json(&export, Path::new(&path)) {
            Ok(()) => log::info!("Run exported to '{}'.", path),
            Err(e) => {
                log::error!("Failed to export run: {}", e);
                process::exit(1);
            }
        }
    }
}
