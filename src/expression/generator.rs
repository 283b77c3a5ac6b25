use crate::expression::{Expr, Vocabulary};
use rand::prelude::*;

/// Probability that a non-final level stops growing and emits a terminal.
pub const TERMINAL_PROBABILITY: f64 = 0.4;

/// Generates a random expression whose root is always a function application.
///
/// The argument of the root starts at depth 1; each deeper level either stops with a
/// uniformly drawn terminal (forced once `max_depth` is reached) or wraps another
/// random function around a fresh argument. The result has between 2 and
/// `max(max_depth, 1) + 1` tokens.
///
/// # Arguments
/// * `max_depth` - Depth at which argument growth is forced to terminate
/// * `vocabulary` - Symbols to draw functions and terminals from
/// * `rng` - Random source
///
/// The vocabulary must list at least one function, which `Config::validate` enforces.
/// Release builds given an empty function list fall back to the variable name as the
/// function symbol (`x(x)`), debug builds panic.
///
/// # Returns
/// * `Expr` - A well-formed expression containing at least one function call
pub fn generate<R: Rng + ?Sized>(max_depth: usize, vocabulary: &Vocabulary, rng: &mut R) -> Expr {
    debug_assert!(
        !vocabulary.functions.is_empty(),
        "cannot generate expressions without functions"
    );
    let arg = grow(1, max_depth, vocabulary, rng);
    Expr::call(random_function(vocabulary, rng), arg)
}

fn grow<R: Rng + ?Sized>(depth: usize, max_depth: usize, vocabulary: &Vocabulary, rng: &mut R) -> Expr {
    if depth >= max_depth || rng.random::<f64>() < TERMINAL_PROBABILITY {
        return Expr::terminal(random_terminal(vocabulary, rng));
    }
    let func = random_function(vocabulary, rng);
    Expr::call(func, grow(depth + 1, max_depth, vocabulary, rng))
}

fn random_function<R: Rng + ?Sized>(vocabulary: &Vocabulary, rng: &mut R) -> String {
    vocabulary
        .functions
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| vocabulary.variable.clone())
}

fn random_terminal<R: Rng + ?Sized>(vocabulary: &Vocabulary, rng: &mut R) -> String {
    let terminals = vocabulary.terminals();
    terminals[rng.random_range(0..terminals.len())].to_string()
}
