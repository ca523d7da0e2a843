//! Single-gene arithmetic crossover.

use super::CrossoverOperator;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Blend weight between the two parents.
const ALPHA: f64 = 0.5;

/// Inclusion probability for `rate`; NaN and infinities count as 0.
fn inclusion_probability(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Arithmetic blend on one random gene per pair.
///
/// 1. Each pool row joins the crossover set independently with probability
///    `rate`.
/// 2. The set is shuffled and paired consecutively; an odd trailing row is
///    dropped.
/// 3. For each pair one column `j` is drawn and blended:
///    `c1[j] = α·p2[j] + (1−α)·p1[j]`, `c2[j] = α·p1[j] + (1−α)·p2[j]`
///    with `α = 0.5`. All other genes pass through unchanged.
///
/// Only the recombined rows are returned.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArithmeticCrossover {
    /// Per-row inclusion probability (0.0–1.0).
    pub rate: f64,
}

impl ArithmeticCrossover {
    /// Creates the operator, clamping `rate` into `[0, 1]`. A non-finite
    /// rate disables crossover.
    pub fn new(rate: f64) -> Self {
        Self {
            rate: inclusion_probability(rate),
        }
    }
}

impl CrossoverOperator for ArithmeticCrossover {
    fn crossover<R: Rng + ?Sized>(
        &self,
        pool: ArrayView2<'_, f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        let rate = inclusion_probability(self.rate);
        let mut included: Vec<usize> = (0..pool.nrows())
            .filter(|_| rng.random_bool(rate))
            .collect();
        included.shuffle(rng);
        included.truncate(included.len() - included.len() % 2);

        if !included.is_empty() && pool.ncols() == 0 {
            return Err(Error::EmptyPopulation);
        }

        let mut out = pool.select(Axis(0), &included);
        let m = out.ncols();
        for pair in 0..out.nrows() / 2 {
            let (a, b) = (2 * pair, 2 * pair + 1);
            let j = rng.random_range(0..m);
            let (p1, p2) = (out[[a, j]], out[[b, j]]);
            out[[a, j]] = ALPHA * p2 + (1.0 - ALPHA) * p1;
            out[[b, j]] = ALPHA * p1 + (1.0 - ALPHA) * p2;
        }
        Ok(out)
    }
}
