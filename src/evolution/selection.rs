use crate::candidate::Candidate;
use rand::prelude::*;

/// Number of contestants drawn per tournament.
pub const TOURNAMENT_SIZE: usize = 3;

/// Picks a parent by tournament.
///
/// Draws `TOURNAMENT_SIZE` candidates uniformly with replacement and returns the one
/// with the highest score. On ties the earliest drawn contestant wins.
///
/// # Arguments
/// * `population` - The population to draw from
/// * `rng` - Random source
///
/// # Returns
/// * `Option<&Candidate>` - The winner, `None` only for an empty population
pub fn tournament_select<'p, R: Rng + ?Sized>(
    population: &'p [Candidate],
    rng: &mut R,
) -> Option<&'p Candidate> {
    let mut best: Option<&Candidate> = None;
    for _ in 0..TOURNAMENT_SIZE {
        let contestant = population.choose(rng)?;
        if best.map_or(true, |b| contestant.score() > b.score()) {
            best = Some(contestant);
        }
    }
    best
}
