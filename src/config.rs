use crate::expression::Vocabulary;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Dataset identifier that earns no scoring bonus.
pub const DEFAULT_DATASET: &str = "MNIST (Default)";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Parameters of the evolutionary search, handed to the engine on every call.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    /// Generation number at which a run is finished
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    /// Number of top candidates copied unchanged into the next generation
    pub elitism: usize,
    /// Maximum nesting depth of freshly generated expressions
    pub max_complexity: usize,
    /// Opaque dataset name, only its identity affects scoring
    pub dataset: String,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 15,
            mutation_rate: 0.3,
            crossover_rate: 0.5,
            elitism: 3,
            max_complexity: 4,
            dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

/// Settings of the driver loop around the engine.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay between two generation transitions
    pub tick_rate_ms: u64,
    /// Maximum number of retained log entries
    pub log_capacity: usize,
    pub leaderboard_size: usize,
    /// Seed for a reproducible run, a random one is used when absent
    pub seed: Option<u64>,
    /// Where to write the JSON run export, if anywhere
    pub export_path: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 1200,
            log_capacity: 101,
            leaderboard_size: 10,
            seed: None,
            export_path: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub evolution: EvolutionConfig,
    pub vocabulary: Vocabulary,
    pub simulation: SimulationConfig,
}

impl Config {
    /// Loads a configuration from a TOML file, missing tables and keys take their defaults.
    ///
    /// # Arguments
    /// * `path` - Path to the TOML file
    ///
    /// # Returns
    /// * `Result<Self, ConfigError>`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Checks the ranges the engine relies on its driver to enforce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let evo = &self.evolution;
        if evo.population_size < 1 {
            return invalid("population_size must be at least 1");
        }
        if evo.generations < 1 {
            return invalid("generations must be at least 1");
        }
        if !(0.0..=1.0).contains(&evo.mutation_rate) {
            return invalid(format!("mutation_rate {} is outside [0, 1]", evo.mutation_rate));
        }
        if !(0.0..=1.0).contains(&evo.crossover_rate) {
            return invalid(format!(
                "crossover_rate {} is outside [0, 1]",
                evo.crossover_rate
            ));
        }
        if evo.elitism > evo.population_size {
            return invalid(format!(
                "elitism ({}) cannot exceed population_size ({})",
                evo.elitism, evo.population_size
            ));
        }
        if evo.max_complexity < 1 {
            return invalid("max_complexity must be at least 1");
        }

        let vocab = &self.vocabulary;
        if vocab.functions.is_empty() {
            return invalid("vocabulary needs at least one function");
        }
        let names = vocab
            .functions
            .iter()
            .chain(&vocab.parameters)
            .chain(std::iter::once(&vocab.variable));
        for name in names {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
                return invalid(format!(
                    "vocabulary symbol '{}' must consist of ASCII letters only",
                    name
                ));
            }
        }
        if vocab.parameters.contains(&vocab.variable) {
            return invalid(format!(
                "variable '{}' is also declared as a parameter",
                vocab.variable
            ));
        }
        if vocab
            .functions
            .iter()
            .any(|f| *f == vocab.variable || vocab.parameters.contains(f))
        {
            return invalid("function names must differ from terminal names");
        }

        let sim = &self.simulation;
        if sim.log_capacity < 1 {
            return invalid("log_capacity must be at least 1");
        }
        if sim.leaderboard_size < 1 {
            return invalid("leaderboard_size must be at least 1");
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::ValidationError(msg.into()))
}
