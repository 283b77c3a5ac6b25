use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a candidate, unique for the lifetime of the process.
///
/// Identifiers are drawn from a process-wide counter. Candidates deserialized from an
/// export keep their stored identifiers, so loaders call [`CandidateId::reserve`] to
/// keep later allocations clear of them. Identity across processes is not meaningful,
/// compare expression text instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(u64);

impl CandidateId {
    /// Allocates a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Ensures identifiers allocated from now on are greater than `self`.
    pub fn reserve(self) {
        NEXT_ID.fetch_max(self.0.saturating_add(1), Ordering::Relaxed);
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f-{:x}", self.0)
    }
}

/// One evolved formula together with the metrics computed when it was created.
///
/// Candidates are never edited. Genetic operators derive a new expression and build a
/// new candidate from it through the scorer, which is the only constructor outside of
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    id: CandidateId,
    expression: String,
    accuracy: f64,
    loss: f64,
    complexity: usize,
    score: f64,
    params: BTreeMap<String, f64>,
}

impl Candidate {
    pub(crate) fn new(
        expression: String,
        accuracy: f64,
        loss: f64,
        complexity: usize,
        score: f64,
        params: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            id: CandidateId::next(),
            expression,
            accuracy,
            loss,
            complexity,
            score,
            params,
        }
    }

    pub fn id(&self) -> CandidateId {
        self.id
    }

    /// Canonical expression text
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn loss(&self) -> f64 {
        self.loss
    }

    pub fn complexity(&self) -> usize {
        self.complexity
    }

    /// Composite fitness, the only ranking key
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Sampled placeholder parameter values, not used by evaluation
    pub fn params(&self) -> &BTreeMap<String, f64> {
        &self.params
    }
}

/// Orders candidates best score first, treating incomparable scores as equal.
pub fn by_score_desc(a: &Candidate, b: &Candidate) -> std::cmp::Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
pub(crate) fn fixture(expression: &str, score: f64) -> Candidate {
    Candidate::new(
        expression.to_string(),
        0.9,
        0.2,
        crate::expression::complexity(expression),
        score,
        BTreeMap::new(),
    )
}
