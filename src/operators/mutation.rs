//! Polynomial mutation.
//!
//! # References
//!
//! - Deb & Agrawal (1995), "Simulated Binary Crossover for Continuous
//!   Search Space"
//! - Deb & Goyal (1996), "A Combined Genetic Adaptive Search (GeneAS) for
//!   Engineering Design"

use super::MutationOperator;
use crate::error::Result;
use ndarray::Array2;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absorbs rounding noise in `rate * n * m` before taking the floor.
const COUNT_TOLERANCE: f64 = 1e-9;

/// Number of gene mutations for an `individuals × variables` matrix:
/// `floor(rate · N · M)`.
pub fn mutation_count(rate: f64, individuals: usize, variables: usize) -> usize {
    let raw = rate * (individuals * variables) as f64 + COUNT_TOLERANCE;
    raw.floor().max(0.0) as usize
}

/// Polynomial perturbation of one normalized gene `p` for a uniform draw `u`.
///
/// ```text
/// u <= 0.5:  δ = (2u)^(1/(1+η)) − 1        p' = p + δ·p
/// u >  0.5:  δ = 1 − (2(1−u))^(1/(1+η))    p' = p + δ·(1 − p)
/// ```
///
/// Larger `eta` concentrates `δ` around zero.
pub fn polynomial_perturbation(p: f64, u: f64, eta: f64) -> f64 {
    let exponent = 1.0 / (1.0 + eta);
    if u <= 0.5 {
        let delta = (2.0 * u).powf(exponent) - 1.0;
        p + delta * p
    } else {
        let delta = 1.0 - (2.0 * (1.0 - u)).powf(exponent);
        p + delta * (1.0 - p)
    }
}

/// Polynomial mutation over a fixed share of all genes.
///
/// `rate` is a fraction of the total gene count, not a per-row probability:
/// `floor(rate · N · M)` flat gene positions are drawn uniformly (with
/// replacement) and each is perturbed by [`polynomial_perturbation`].
/// Results are not clamped; see [`BoundPolicy`](crate::BoundPolicy).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolynomialMutation {
    /// Fraction of all genes mutated per call (0.0–1.0).
    pub rate: f64,
    /// Distribution index `η > 0`, usually 20–100.
    pub eta: f64,
}

impl PolynomialMutation {
    /// Creates the operator, clamping `rate` into `[0, 1]`.
    pub fn new(rate: f64, eta: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
            eta,
        }
    }
}

impl MutationOperator for PolynomialMutation {
    fn mutate_in_place<R: Rng + ?Sized>(
        &self,
        population: &mut Array2<f64>,
        rng: &mut R,
    ) -> Result<()> {
        let (n, m) = population.dim();
        let total = n * m;
        if total == 0 {
            return Ok(());
        }
        let count = mutation_count(self.rate, n, m);
        for _ in 0..count {
            let flat = rng.random_range(0..total);
            let (row, col) = (flat / m, flat % m);
            let u = rng.random::<f64>();
            let gene = &mut population[[row, col]];
            *gene = polynomial_perturbation(*gene, u, self.eta);
        }
        tracing::trace!(count, individuals = n, "polynomial mutation applied");
        Ok(())
    }
}
