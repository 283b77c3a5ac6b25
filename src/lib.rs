//! Genetic-programming search over symbolic activation functions.
//!
//! Candidates are unary function chains such as `tanh(sin(x))`. A population of them
//! is evolved with tournament selection, subtree crossover, point mutation and
//! elitism, and every candidate receives a simulated fitness score.

pub mod candidate;
pub mod config;
pub mod evaluation;
pub mod evolution;
pub mod export;
pub mod expression;
pub mod population;
pub mod simulation;
