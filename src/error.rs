//! Error type shared by every operator and engine.

use thiserror::Error;

/// Errors raised when an operator contract or configuration is violated.
///
/// None of these are retried: the failing step is abandoned and the engine
/// state is left as it was before the step began.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Two arrays that must be row- or column-aligned are not.
    #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The population has no individuals or no variables.
    #[error("population must have at least one individual and one variable")]
    EmptyPopulation,

    /// Roulette weights cannot form a probability distribution.
    #[error("degenerate fitness for roulette selection: {0}")]
    DegenerateFitness(String),

    /// A GA generation did not reproduce the population size exactly.
    #[error(
        "partition violated: {elites} elites + {crossed} crossed + {mutated} mutated != {population}"
    )]
    PartitionViolation {
        elites: usize,
        crossed: usize,
        mutated: usize,
        population: usize,
    },

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
