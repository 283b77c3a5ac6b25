//! Generation snapshots, run history and the cross-generation leaderboard.

use crate::candidate::{by_score_desc, Candidate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of leaderboard entries.
pub const LEADERBOARD_SIZE: usize = 10;

/// One population snapshot and its sequence number, starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    generation_number: usize,
    population: Vec<Candidate>,
}

impl Generation {
    pub fn new(generation_number: usize, population: Vec<Candidate>) -> Self {
        Self {
            generation_number,
            population,
        }
    }

    pub fn number(&self) -> usize {
        self.generation_number
    }

    pub fn population(&self) -> &[Candidate] {
        &self.population
    }

    /// Highest scoring candidate, the first one on ties.
    pub fn best(&self) -> Option<&Candidate> {
        self.population
            .iter()
            .reduce(|best, c| if c.score() > best.score() { c } else { best })
    }

    /// Population sorted best score first.
    pub fn ranked(&self) -> Vec<&Candidate> {
        let mut ranked: Vec<&Candidate> = self.population.iter().collect();
        ranked.sort_by(|a, b| by_score_desc(a, b));
        ranked
    }

    pub fn stats(&self) -> GenerationStats {
        let avg_score = if self.population.is_empty() {
            0.0
        } else {
            self.population.iter().map(Candidate::score).sum::<f64>() / self.population.len() as f64
        };
        let best_accuracy = self
            .population
            .iter()
            .map(Candidate::accuracy)
            .reduce(f64::max)
            .unwrap_or(0.0);
        GenerationStats {
            generation: self.generation_number,
            best_score: self.best().map_or(0.0, Candidate::score),
            avg_score,
            best_accuracy,
        }
    }
}

/// Summary of one generation, the data series behind progress charts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: usize,
    pub best_score: f64,
    pub avg_score: f64,
    /// Highest accuracy in the population, whatever the score of its holder
    pub best_accuracy: f64,
}

/// Append-only list of every generation of a run, Generation 1 included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    generations: Vec<Generation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, generation: Generation) {
        self.generations.push(generation);
    }

    pub fn generations(&self) -> &[Generation] {
        &self.generations
    }

    pub fn latest(&self) -> Option<&Generation> {
        self.generations.last()
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn stats(&self) -> Vec<GenerationStats> {
        self.generations.iter().map(Generation::stats).collect()
    }
}

/// Best unique expressions seen across all merged generations.
///
/// Entries are keyed by expression text; when the same text shows up again the
/// higher scoring candidate is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    capacity: usize,
    entries: Vec<Candidate>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(LEADERBOARD_SIZE)
    }
}

impl Leaderboard {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Folds a population into the board.
    pub fn merge(&mut self, population: &[Candidate]) {
        let mut by_expression: HashMap<&str, &Candidate> = HashMap::new();
        for candidate in self.entries.iter().chain(population) {
            by_expression
                .entry(candidate.expression())
                .and_modify(|kept| {
                    if candidate.score() > kept.score() {
                        *kept = candidate;
                    }
                })
                .or_insert(candidate);
        }

        let mut merged: Vec<Candidate> = by_expression.into_values().cloned().collect();
        // Expression text breaks ties so the order does not depend on hashing
        merged.sort_by(|a, b| by_score_desc(a, b).then_with(|| a.expression().cmp(b.expression())));
        merged.truncate(self.capacity);
        self.entries = merged;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, best first.
    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::fixture;
    use crate::evaluation::PENALTY_SCORE;
    use std::collections::{BTreeMap, HashSet};

    #[test]
    fn test_best_and_ranked() {
        let generation = Generation::new(
            1,
            vec![fixture("sin(x)", 0.2), fixture("cos(x)", 0.9), fixture("a", -1.0)],
        );
        assert_eq!(generation.best().unwrap().expression(), "cos(x)");
        let ranked: Vec<&str> = generation.ranked().iter().map(|c| c.expression()).collect();
        assert_eq!(ranked, vec!["cos(x)", "sin(x)", "a"]);
    }

    #[test]
    fn test_stats() {
        let generation = Generation::new(
            3,
            vec![fixture("sin(x)", 0.5), fixture("cos(x)", 1.0), fixture("a", -1.0)],
        );
        let stats = generation.stats();
        assert_eq!(stats.generation, 3);
        assert_eq!(stats.best_score, 1.0);
        assert!((stats.avg_score - 0.5 / 3.0).abs() < 1e-12);
        assert_eq!(stats.best_accuracy, 0.9);
    }

    #[test]
    fn test_best_accuracy_ignores_score() {
        let penalised = Candidate::new("a".to_string(), 0.98, 0.1, 1, PENALTY_SCORE, BTreeMap::new());
        let valid = Candidate::new("sin(x)".to_string(), 0.86, 0.3, 2, 0.9, BTreeMap::new());

        let stats = Generation::new(2, vec![penalised, valid]).stats();
        assert_eq!(stats.best_score, 0.9);
        assert_eq!(stats.best_accuracy, 0.98);
    }

    #[test]
    fn test_stats_of_empty_generation() {
        let stats = Generation::new(1, vec![]).stats();
        assert_eq!(stats.avg_score, 0.0);
        assert_eq!(stats.best_score, 0.0);
    }

    #[test]
    fn test_history_is_append_only() {
        let mut history = History::new();
        assert!(history.is_empty());
        history.push(Generation::new(1, vec![fixture("sin(x)", 0.1)]));
        history.push(Generation::new(2, vec![fixture("cos(x)", 0.3)]));
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().number(), 2);
        let best: Vec<f64> = history.stats().iter().map(|s| s.best_score).collect();
        assert_eq!(best, vec![0.1, 0.3]);
    }

    #[test]
    fn test_leaderboard_deduplicates_keeping_best() {
        let mut board = Leaderboard::new(10);
        board.merge(&[fixture("sin(x)", 0.4), fixture("cos(x)", 0.3)]);
        board.merge(&[fixture("sin(x)", 0.2), fixture("sin(x)", 0.6)]);
        assert_eq!(board.len(), 2);
        assert_eq!(board.entries()[0].expression(), "sin(x)");
        assert_eq!(board.entries()[0].score(), 0.6);
        assert_eq!(board.entries()[1].expression(), "cos(x)");
    }

    #[test]
    fn test_leaderboard_is_capped_and_dominant() {
        let mut board = Leaderboard::new(10);
        let mut seen: Vec<Candidate> = Vec::new();
        for round in 0..5 {
            let population: Vec<Candidate> = (0..8)
                .map(|i| {
                    let depth = (round * 8 + i) % 13;
                    let expr = format!("{}x{}", "sin(".repeat(depth + 1), ")".repeat(depth + 1));
                    fixture(&expr, ((round * 31 + i * 17) % 23) as f64 / 10.0)
                })
                .collect();
            seen.extend(population.iter().cloned());
            board.merge(&population);

            assert!(board.len() <= 10);
            let unique: HashSet<&str> = board.entries().iter().map(|c| c.expression()).collect();
            assert_eq!(unique.len(), board.len());

            let worst_entry = board.entries().last().unwrap().score();
            for c in &seen {
                if !unique.contains(c.expression()) {
                    assert!(worst_entry >= c.score());
                }
            }
        }
    }

    #[test]
    fn test_leaderboard_clear() {
        let mut board = Leaderboard::default();
        board.merge(&[fixture("sin(x)", 0.4)]);
        board.clear();
        assert!(board.is_empty());
        assert_eq!(board.capacity(), LEADERBOARD_SIZE);
    }
}
