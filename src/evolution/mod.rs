pub mod operators;
pub mod selection;

use crate::candidate::{by_score_desc, Candidate};
use crate::config::EvolutionConfig;
use crate::evaluation::{random_candidate, score};
use crate::evolution::operators::{crossover, mutate};
use crate::evolution::selection::tournament_select;
use crate::expression::Vocabulary;
use crate::population::Generation;
use log::debug;
use rand::prelude::*;

/// Orchestrates generation transitions.
///
/// The engine only borrows the configuration and vocabulary it was built with and
/// keeps no state of its own, so building one per call is cheap and any number of
/// lineages can be driven from the same settings.
#[derive(Clone, Copy)]
pub struct EvolutionEngine<'a> {
    /// Settings of the run
    config: &'a EvolutionConfig,
    /// Symbols expressions are built from
    vocabulary: &'a Vocabulary,
}

impl<'a> EvolutionEngine<'a> {
    pub fn new(config: &'a EvolutionConfig, vocabulary: &'a Vocabulary) -> Self {
        Self { config, vocabulary }
    }

    /// Builds Generation 1 from `population_size` freshly generated candidates.
    ///
    /// # Arguments
    /// * `&self` - The engine
    /// * `rng` - Random source
    ///
    /// # Returns
    /// * `Generation` - Generation number 1
    pub fn initial_generation<R: Rng + ?Sized>(&self, rng: &mut R) -> Generation {
        let population = (0..self.config.population_size)
            .map(|_| self.fresh_candidate(rng))
            .collect();
        Generation::new(1, population)
    }

    /// Produces the generation following `current`.
    ///
    /// The top `elitism` candidates by score are carried over untouched, the remaining
    /// slots are filled with offspring bred from `current` by tournament selection,
    /// crossover and mutation.
    ///
    /// # Arguments
    /// * `&self` - The engine
    /// * `current` - The generation to breed from, left untouched
    /// * `rng` - Random source
    ///
    /// # Returns
    /// * `Generation` - Exactly `population_size` candidates, numbered one past `current`
    pub fn advance<R: Rng + ?Sized>(&self, current: &Generation, rng: &mut R) -> Generation {
        let population = current.population();
        let mut ranked: Vec<&Candidate> = population.iter().collect();
        ranked.sort_by(|a, b| by_score_desc(a, b));

        let mut next: Vec<Candidate> = ranked
            .iter()
            .take(self.config.elitism)
            .map(|elite| (*elite).clone())
            .collect();

        while next.len() < self.config.population_size {
            next.push(self.breed(population, rng));
        }
        next.truncate(self.config.population_size);

        let next = Generation::new(current.number() + 1, next);
        debug!(
            "Gen {} -> {}: {} elites carried, best score {:.4}",
            current.number(),
            next.number(),
            self.config.elitism.min(population.len()),
            next.best().map_or(f64::NAN, Candidate::score)
        );
        next
    }

    /// Breeds a single offspring from `population`.
    fn breed<R: Rng + ?Sized>(&self, population: &[Candidate], rng: &mut R) -> Candidate {
        let Some(parent1) = tournament_select(population, rng) else {
            return self.fresh_candidate(rng);
        };

        let mut child = if rng.random::<f64>() < self.config.crossover_rate
            && population.iter().any(|c| c.id() != parent1.id())
        {
            let parent2 = loop {
                match tournament_select(population, rng) {
                    Some(p) if p.id() != parent1.id() => break p,
                    _ => continue,
                }
            };
            crossover(parent1, parent2, self.config, self.vocabulary, rng)
        } else {
            // Re-scored copy, its metrics are sampled anew
            score(
                parent1.expression(),
                &self.config.dataset,
                self.vocabulary,
                rng,
            )
        };

        if rng.random::<f64>() < self.config.mutation_rate {
            child = mutate(&child, self.config, self.vocabulary, rng);
        }
        child
    }

    fn fresh_candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> Candidate {
        random_candidate(
            self.config.max_complexity,
            &self.config.dataset,
            self.vocabulary,
            rng,
        )
    }
}

/// Creates Generation 1 for `config`.
pub fn create_initial_population<R: Rng + ?Sized>(
    config: &EvolutionConfig,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Generation {
    EvolutionEngine::new(config, vocabulary).initial_generation(rng)
}

/// Performs one generation transition for `config`.
pub fn advance_generation<R: Rng + ?Sized>(
    current: &Generation,
    config: &EvolutionConfig,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Generation {
    EvolutionEngine::new(config, vocabulary).advance(current, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::fixture;
    use crate::config::DEFAULT_DATASET;
    use crate::evaluation::PENALTY_SCORE;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    // Helper to create the default run configuration
    fn get_test_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 20,
            generations: 15,
            mutation_rate: 0.3,
            crossover_rate: 0.5,
            elitism: 3,
            max_complexity: 4,
            dataset: DEFAULT_DATASET.to_string(),
        }
    }

    #[test]
    fn test_initial_population() {
        let config = get_test_config();
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(1);

        let generation = create_initial_population(&config, &vocab, &mut rng);

        assert_eq!(generation.number(), 1);
        assert_eq!(generation.population().len(), config.population_size);
        for candidate in generation.population() {
            assert!(candidate.complexity() >= 2);
            assert!(candidate.complexity() <= 2 * config.max_complexity);
            assert!(candidate.expression().contains('('));
        }
        let ids: HashSet<_> = generation.population().iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), config.population_size);
    }

    #[test]
    fn test_advance_keeps_size_and_numbering() {
        let config = get_test_config();
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(2);

        let mut generation = create_initial_population(&config, &vocab, &mut rng);
        for expected in 2..=6 {
            let next = advance_generation(&generation, &config, &vocab, &mut rng);
            assert_eq!(next.number(), expected);
            assert_eq!(next.population().len(), config.population_size);
            generation = next;
        }
    }

    #[test]
    fn test_elitism_preservation() {
        let config = get_test_config();
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(3);

        let current = create_initial_population(&config, &vocab, &mut rng);
        let elites: Vec<Candidate> = current
            .ranked()
            .into_iter()
            .take(config.elitism)
            .cloned()
            .collect();

        let next = advance_generation(&current, &config, &vocab, &mut rng);

        for elite in &elites {
            let survivor = next
                .population()
                .iter()
                .find(|c| c.id() == elite.id())
                .expect("elite should survive");
            assert_eq!(survivor, elite);
        }
        // Elites lead the new population in rank order
        for (elite, head) in elites.iter().zip(next.population()) {
            assert_eq!(elite.id(), head.id());
        }
    }

    #[test]
    fn test_elitism_larger_than_population_is_truncated() {
        let mut config = get_test_config();
        config.population_size = 4;
        config.elitism = 4;
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(4);

        let current = create_initial_population(&config, &vocab, &mut rng);
        let next = advance_generation(&current, &config, &vocab, &mut rng);
        let before: HashSet<_> = current.population().iter().map(|c| c.id()).collect();
        let after: HashSet<_> = next.population().iter().map(|c| c.id()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_zero_elitism_renews_every_candidate() {
        let mut config = get_test_config();
        config.elitism = 0;
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(5);

        let current = create_initial_population(&config, &vocab, &mut rng);
        let next = advance_generation(&current, &config, &vocab, &mut rng);
        let before: HashSet<_> = current.population().iter().map(|c| c.id()).collect();
        assert!(next.population().iter().all(|c| !before.contains(&c.id())));
    }

    #[test]
    fn test_single_candidate_population_never_crosses_over() {
        let mut config = get_test_config();
        config.population_size = 1;
        config.elitism = 0;
        config.crossover_rate = 1.0;
        config.mutation_rate = 0.0;
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(6);

        let current = Generation::new(1, vec![fixture("sin(x)", 0.5)]);
        for _ in 0..20 {
            let next = advance_generation(&current, &config, &vocab, &mut rng);
            assert_eq!(next.population().len(), 1);
            // Without a second parent the child is a re-scored copy
            assert_eq!(next.population()[0].expression(), "sin(x)");
            assert_ne!(next.population()[0].id(), current.population()[0].id());
        }
    }

    #[test]
    fn test_no_operators_means_rescored_copies() {
        let mut config = get_test_config();
        config.crossover_rate = 0.0;
        config.mutation_rate = 0.0;
        config.elitism = 0;
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(7);

        let current = create_initial_population(&config, &vocab, &mut rng);
        let parents: HashSet<&str> = current.population().iter().map(|c| c.expression()).collect();
        let next = advance_generation(&current, &config, &vocab, &mut rng);
        for child in next.population() {
            assert!(parents.contains(child.expression()));
        }
    }

    #[test]
    fn test_empty_population_is_refilled() {
        let config = get_test_config();
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(8);

        let next = advance_generation(&Generation::new(4, vec![]), &config, &vocab, &mut rng);
        assert_eq!(next.number(), 5);
        assert_eq!(next.population().len(), config.population_size);
    }

    #[test]
    fn test_penalised_candidates_keep_penalty() {
        let config = get_test_config();
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(9);

        let mut generation = create_initial_population(&config, &vocab, &mut rng);
        for _ in 0..10 {
            generation = advance_generation(&generation, &config, &vocab, &mut rng);
            for c in generation.population() {
                let text = c.expression();
                if !text.contains('x') || !text.contains('(') {
                    assert_eq!(c.score(), PENALTY_SCORE);
                } else {
                    // `exp(a)` and friends are scored by the formula
                    assert_ne!(c.score(), PENALTY_SCORE, "{}", text);
                }
            }
        }
    }

    #[test]
    fn test_full_run_matches_default_scenario() {
        let config = get_test_config();
        let vocab = Vocabulary::default();
        let mut rng = StdRng::seed_from_u64(10);

        let mut generation = create_initial_population(&config, &vocab, &mut rng);
        assert_eq!(generation.population().len(), 20);
        for _ in 0..14 {
            generation = advance_generation(&generation, &config, &vocab, &mut rng);
        }
        assert_eq!(generation.number(), 15);
        assert_eq!(generation.population().len(), 20);
        for c in generation.population() {
            assert!(c.complexity() >= 2);
            assert!(c.expression().contains('('));
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let config = get_test_config();
        let vocab = Vocabulary::default();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut generation = create_initial_population(&config, &vocab, &mut rng);
            for _ in 0..5 {
                generation = advance_generation(&generation, &config, &vocab, &mut rng);
            }
            generation
                .population()
                .iter()
                .map(|c| (c.expression().to_string(), c.score()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}
