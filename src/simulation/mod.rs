//! Driver around the evolution engine.
//!
//! A `Simulation` owns one lineage and advances it by exactly one generation per
//! `tick`. It holds the only mutable state of a run: the random source, the current
//! generation, the history, the leaderboard and the event log. Timing is left to the
//! caller, which is expected to call `tick` from a single loop or timer.

pub mod console;

use crate::config::Config;
use crate::evolution::EvolutionEngine;
use crate::population::{Generation, History, Leaderboard};
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

pub use console::{LogConsole, LogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationState {
    /// Initialised or paused, ticks are ignored
    Idle,
    /// Each tick performs one generation transition
    Running,
    /// The generation limit was reached
    Finished,
}

pub struct Simulation {
    config: Config,
    rng: StdRng,
    state: SimulationState,
    current: Generation,
    history: History,
    leaderboard: Leaderboard,
    console: LogConsole,
}

impl Simulation {
    /// Creates an idle simulation with Generation 1 already in place.
    ///
    /// The random source is seeded from `config.simulation.seed` when present, and is
    /// kept across resets.
    pub fn new(config: Config) -> Self {
        let rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut simulation = Self {
            rng,
            state: SimulationState::Idle,
            current: Generation::new(1, Vec::new()),
            history: History::new(),
            leaderboard: Leaderboard::new(config.simulation.leaderboard_size),
            console: LogConsole::new(config.simulation.log_capacity),
            config,
        };
        simulation.warn_on_tolerated_settings();
        simulation.initialize();
        simulation
    }

    /// Starts or resumes the run. A finished run starts over from Generation 1.
    pub fn start(&mut self) {
        if self.state == SimulationState::Running {
            return;
        }
        if self.state == SimulationState::Finished || self.at_generation_limit() {
            self.console.push("Starting new simulation run...");
            self.reset();
        } else {
            self.console.push("Simulation resumed.");
        }
        self.state = SimulationState::Running;
    }

    /// Pauses a running simulation, the current generation is kept as is.
    pub fn pause(&mut self) {
        if self.state != SimulationState::Running {
            return;
        }
        self.state = SimulationState::Idle;
        self.console.push("Simulation paused.");
    }

    /// Discards the current lineage and starts again from a fresh Generation 1.
    pub fn reset(&mut self) {
        self.console.push("Simulation reset.");
        self.state = SimulationState::Idle;
        self.initialize();
    }

    /// Performs one generation transition if the simulation is running.
    ///
    /// # Returns
    /// * `Option<usize>` - The number of the generation just produced, `None` when nothing
    ///   was done because the simulation is idle or finished
    pub fn tick(&mut self) -> Option<usize> {
        if self.state != SimulationState::Running {
            return None;
        }
        if self.at_generation_limit() {
            self.finish();
            return None;
        }

        let engine = EvolutionEngine::new(&self.config.evolution, &self.config.vocabulary);
        let next = engine.advance(&self.current, &mut self.rng);

        if let Some(best) = next.best() {
            self.console.push(format!(
                "Gen {}: Best score {:.3}",
                next.number(),
                best.score()
            ));
        }
        self.leaderboard.merge(next.population());
        self.history.push(next.clone());
        self.current = next;

        if self.at_generation_limit() {
            self.finish();
        }
        Some(self.current.number())
    }

    /// Starts the simulation and ticks until the generation limit is reached.
    pub fn run_to_completion(&mut self) {
        self.start();
        while self.tick().is_some() {}
    }

    /// Replaces the configuration. Changing the population size, the maximum
    /// complexity or the dataset invalidates the lineage and resets the run.
    pub fn set_config(&mut self, config: Config) {
        let old = &self.config.evolution;
        let new = &config.evolution;
        let needs_reset = old.population_size != new.population_size
            || old.max_complexity != new.max_complexity
            || old.dataset != new.dataset;

        self.console.set_capacity(config.simulation.log_capacity);
        self.config = config;
        self.warn_on_tolerated_settings();
        if needs_reset {
            self.reset();
        } else if self.state == SimulationState::Finished && !self.at_generation_limit() {
            // A raised generation limit makes a finished run resumable
            self.state = SimulationState::Idle;
        }
    }

    /// Switches to another dataset identifier and resets the run.
    pub fn set_dataset(&mut self, name: &str) {
        self.config.evolution.dataset = name.to_string();
        self.console.push(format!("Loaded dataset: {}", name));
        self.reset();
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current(&self) -> &Generation {
        &self.current
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn console(&self) -> &LogConsole {
        &self.console
    }

    fn initialize(&mut self) {
        let engine = EvolutionEngine::new(&self.config.evolution, &self.config.vocabulary);
        let first = engine.initial_generation(&mut self.rng);

        self.history = History::new();
        self.history.push(first.clone());
        self.leaderboard = Leaderboard::new(self.config.simulation.leaderboard_size);
        self.leaderboard.merge(first.population());
        self.current = first;

        self.console.push(format!(
            "Initialized Gen 1 on \"{}\" with {} formulas.",
            self.config.evolution.dataset, self.config.evolution.population_size
        ));
    }

    fn warn_on_tolerated_settings(&self) {
        let evolution = &self.config.evolution;
        if evolution.elitism >= evolution.population_size {
            warn!(
                "Elitism {} covers the whole population of {}, no offspring will be bred",
                evolution.elitism, evolution.population_size
            );
        }
        if self.config.simulation.leaderboard_size == 0 {
            warn!("Leaderboard size is 0, no formulas will be ranked");
        }
    }

    fn at_generation_limit(&self) -> bool {
        self.current.number() >= self.config.evolution.generations
    }

    fn finish(&mut self) {
        self.state = SimulationState::Finished;
        self.console
            .push("Maximum generations reached. Simulation finished.");
    }
}
