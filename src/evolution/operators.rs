use crate::candidate::Candidate;
use crate::config::EvolutionConfig;
use crate::evaluation::{random_candidate, score};
use crate::expression::{self, Expr, Vocabulary};
use log::debug;
use rand::prelude::*;

/// Children whose text grows beyond this many characters are discarded.
pub const MAX_EXPRESSION_LENGTH: usize = 50;

/// Subtree crossover.
///
/// Picks one function-application subtree of each parent and puts the one from
/// `parent2` in place of the first occurrence of the one from `parent1`. When either
/// parent has no subtree, or the child text would exceed `MAX_EXPRESSION_LENGTH`, a
/// fresh random candidate is returned instead, so crossover never fails.
///
/// # Arguments
/// * `parent1` - Receives the donated subtree
/// * `parent2` - Donates a subtree
/// * `config` - Supplies the generation depth for fallbacks and the dataset
/// * `vocabulary` - Symbols for fallbacks and scoring
/// * `rng` - Random source
///
/// # Returns
/// * `Candidate` - A newly scored child
pub fn crossover<R: Rng + ?Sized>(
    parent1: &Candidate,
    parent2: &Candidate,
    config: &EvolutionConfig,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Candidate {
    let (tree1, tree2) = match (
        Expr::parse(parent1.expression()),
        Expr::parse(parent2.expression()),
    ) {
        (Ok(t1), Ok(t2)) => (t1, t2),
        (r1, r2) => {
            debug!(
                "Crossover parent does not parse ({:?}, {:?}), generating a fresh formula",
                r1.err(),
                r2.err()
            );
            return fresh(config, vocabulary, rng);
        }
    };

    let subtrees1 = tree1.subtrees();
    let subtrees2 = tree2.subtrees();
    let (Some(&target), Some(&donor)) = (subtrees1.choose(rng), subtrees2.choose(rng)) else {
        debug!(
            "No subtree to swap between '{}' and '{}', generating a fresh formula",
            parent1.expression(),
            parent2.expression()
        );
        return fresh(config, vocabulary, rng);
    };

    let Some(child) = tree1.replace_first(target, donor) else {
        return fresh(config, vocabulary, rng);
    };
    let text = child.to_string();
    if text.len() > MAX_EXPRESSION_LENGTH {
        debug!(
            "Crossover child '{}' exceeds {} characters, generating a fresh formula",
            text, MAX_EXPRESSION_LENGTH
        );
        return fresh(config, vocabulary, rng);
    }

    score(&text, &config.dataset, vocabulary, rng)
}

/// Single-token mutation.
///
/// Picks one token position uniformly and replaces the token there with a different
/// member of the same category (function or terminal). Only that position changes,
/// other occurrences of the same symbol are kept. If the category has no other member,
/// or the symbol is not part of the vocabulary, the text is kept unchanged and simply
/// re-scored. Text without any token yields a fresh random candidate.
///
/// # Arguments
/// * `candidate` - The candidate to derive from, left untouched
/// * `config` - Supplies the generation depth for fallbacks and the dataset
/// * `vocabulary` - Symbol categories and replacements
/// * `rng` - Random source
///
/// # Returns
/// * `Candidate` - A newly scored candidate
pub fn mutate<R: Rng + ?Sized>(
    candidate: &Candidate,
    config: &EvolutionConfig,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Candidate {
    let text = candidate.expression();
    let tokens = expression::alphabetic_tokens(text);
    if tokens.is_empty() {
        debug!("Nothing to mutate in '{}', generating a fresh formula", text);
        return fresh(config, vocabulary, rng);
    }

    let point = rng.random_range(0..tokens.len());
    let current = tokens[point];
    let replacement = vocabulary
        .kind_of(current)
        .and_then(|kind| vocabulary.alternatives(kind, current).choose(rng).copied())
        .unwrap_or(current);

    let mutated = match Expr::parse(text) {
        Ok(tree) => tree
            .with_token_at(point, replacement)
            .map(|t| t.to_string()),
        Err(_) => expression::replace_nth_token(text, point, replacement),
    }
    .unwrap_or_else(|| text.to_string());

    score(&mutated, &config.dataset, vocabulary, rng)
}

fn fresh<R: Rng + ?Sized>(
    config: &EvolutionConfig,
    vocabulary: &Vocabulary,
    rng: &mut R,
) -> Candidate {
    random_candidate(config.max_complexity, &config.dataset, vocabulary, rng)
}
