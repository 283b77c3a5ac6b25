//! Run export for persisting the results of a simulation.
//!
//! An export carries the configuration that produced the run, the final generation,
//! the leaderboard and the per-generation statistics, so a run can be inspected or
//! charted after the process exits.

use crate::candidate::Candidate;
use crate::config::Config;
use crate::population::{Generation, GenerationStats};
use crate::simulation::Simulation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to access export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to (de)serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunExport {
    /// Schema version for forward/backward compatibility
    pub schema_version: String,
    /// Unix timestamp when export was generated
    pub generated_at: u64,
    /// Configuration the run was made with
    pub config: Config,
    pub final_generation: Generation,
    /// Best unique formulas, best first
    pub leaderboard: Vec<Candidate>,
    /// One entry per generation, Generation 1 first
    pub stats: Vec<GenerationStats>,
}

impl RunExport {
    /// Captures the current state of `simulation`.
    ///
    /// # Arguments
    /// * `simulation` - The simulation to snapshot, finished or not
    ///
    /// # Returns
    /// A new `RunExport` instance ready for serialization.
    pub fn from_simulation(simulation: &Simulation) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().timestamp() as u64,
            config: simulation.config().clone(),
            final_generation: simulation.current().clone(),
            leaderboard: simulation.leaderboard().entries().to_vec(),
            stats: simulation.history().stats(),
        }
    }
}

/// Writes a run export to a JSON file.
pub fn write_export_to_json(export: &RunExport, output_path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(export)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// Reads a run export from a JSON file.
///
/// Candidate identifiers allocated after loading are kept clear of the loaded ones.
pub fn read_export_from_json(input_path: &Path) -> Result<RunExport, ExportError> {
    let content = std::fs::read_to_string(input_path)?;
    let export: RunExport = serde_json::from_str(&content)?;
    export
        .leaderboard
        .iter()
        .chain(export.final_generation.population())
        .for_each(|c| c.id().reserve());
    Ok(export)
}
