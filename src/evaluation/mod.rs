//! Mock fitness evaluation.
//!
//! No training happens here: accuracy and loss are sampled around a fixed shape that
//! penalises complexity, and only the identity of the dataset (default or not) nudges
//! the result. The formula is fixed, the sampled values come from the supplied
//! random source.

use crate::candidate::Candidate;
use crate::config::DEFAULT_DATASET;
use crate::expression::{self, Vocabulary};
use log::trace;
use rand::prelude::*;
use std::collections::BTreeMap;

/// Score assigned to expressions lacking the input variable or any function call.
pub const PENALTY_SCORE: f64 = -1.0;

const BASE_ACCURACY: f64 = 0.85;
const ACCURACY_SPREAD: f64 = 0.14;
const ACCURACY_COST_PER_TOKEN: f64 = 0.005;
const DATASET_BONUS_SPREAD: f64 = 0.01;
const LOSS_SPREAD: f64 = 0.1;
const ACCURACY_WEIGHT: f64 = 1.5;
const LOSS_WEIGHT: f64 = 0.8;
const COMPLEXITY_WEIGHT: f64 = 0.01;

/// Builds a candidate for `expression`, computing every metric from scratch.
///
/// # Arguments
/// * `expression` - Expression text, not required to be well-formed
/// * `dataset` - Dataset identifier, anything but the default earns a small random bonus
/// * `vocabulary` - Supplies the input variable and the parameter names
/// * `rng` - Random source for the sampled metrics and parameters
///
/// # Returns
/// * `Candidate` - A new candidate with a fresh identifier
pub fn score<R: Rng + ?Sized>(
    expression: &str,
    dataset: &str,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Candidate {
    let complexity = expression::complexity(expression);

    let dataset_bonus = if dataset != DEFAULT_DATASET {
        rng.random::<f64>() * DATASET_BONUS_SPREAD
    } else {
        0.0
    };
    let accuracy = BASE_ACCURACY + rng.random::<f64>() * ACCURACY_SPREAD
        - complexity as f64 * ACCURACY_COST_PER_TOKEN
        + dataset_bonus;
    let loss = (1.0 - accuracy) * 2.0 + rng.random::<f64>() * LOSS_SPREAD;

    let score = if is_valid(expression, vocabulary) {
        accuracy * ACCURACY_WEIGHT - loss * LOSS_WEIGHT - complexity as f64 * COMPLEXITY_WEIGHT
    } else {
        PENALTY_SCORE
    };

    let params: BTreeMap<String, f64> = vocabulary
        .parameters
        .iter()
        .map(|name| (name.clone(), rng.random::<f64>()))
        .collect();

    trace!(
        "Scored '{}': accuracy={:.4}, loss={:.4}, complexity={}, score={:.4}",
        expression,
        accuracy,
        loss,
        complexity,
        score
    );

    Candidate::new(
        expression.to_string(),
        round4(accuracy),
        round4(loss),
        complexity,
        round4(score),
        params,
    )
}

/// Generates and scores a brand-new random candidate.
pub fn random_candidate<R: Rng + ?Sized>(
    max_depth: usize,
    dataset: &str,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Candidate {
    let expr = expression::generate(max_depth, vocabulary, rng);
    score(&expr.to_string(), dataset, vocabulary, rng)
}

/// An expression may compete only if its text mentions the input variable and it
/// applies at least one function.
///
/// The variable check is a plain substring match, so a function name containing the
/// variable letter (`exp` for `x`) satisfies it.
pub fn is_valid(expression: &str, vocabulary: &Vocabulary) -> bool {
    expression.contains('(') && expression.contains(vocabulary.variable.as_str())
}

/// Rounds to four decimal digits.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
