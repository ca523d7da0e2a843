//! Shared data model: population matrices, optimization direction, and the
//! gene bound policy.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Population matrix: one individual per row, one variable per column.
pub type Population = Array2<f64>;

/// Fitness vector, row-aligned with a [`Population`].
pub type FitnessVector = Array1<f64>;

/// Optimization direction.
///
/// One direction is set per engine and consumed by every operator of the
/// pipeline, so selection, elitism and archive updates always agree on what
/// "better" means.
///
/// # Examples
///
/// ```
/// use u_swarm::Direction;
///
/// assert!(Direction::Minimize.is_better(1.0, 2.0));
/// assert!(Direction::Maximize.is_better(2.0, 1.0));
/// assert!(!Direction::Minimize.is_better(1.0, 1.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Lower fitness is better.
    #[default]
    Minimize,
    /// Higher fitness is better.
    Maximize,
}

impl Direction {
    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    ///
    /// NaN is never better than anything.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }

    /// The value every finite fitness improves upon.
    pub fn worst(self) -> f64 {
        match self {
            Direction::Minimize => f64::INFINITY,
            Direction::Maximize => f64::NEG_INFINITY,
        }
    }

    /// Orders two fitness values best-first.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        match self {
            Direction::Minimize => ord,
            Direction::Maximize => ord.reverse(),
        }
    }

    /// Index of the best entry. Ties resolve to the lowest index.
    ///
    /// Returns `None` for an empty vector.
    pub fn best_index(self, fitness: ArrayView1<'_, f64>) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, &f) in fitness.iter().enumerate() {
            match best {
                None => best = Some(i),
                Some(b) if self.is_better(f, fitness[b]) => best = Some(i),
                _ => {}
            }
        }
        best
    }

    /// Best fitness value, or `None` for an empty vector.
    pub fn best_value(self, fitness: ArrayView1<'_, f64>) -> Option<f64> {
        self.best_index(fitness).map(|i| fitness[i])
    }

    /// Row indices sorted best-first; ties keep ascending index order.
    pub fn ranked_indices(self, fitness: ArrayView1<'_, f64>) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..fitness.len()).collect();
        // sort_by is stable
        indices.sort_by(|&a, &b| self.compare(fitness[a], fitness[b]));
        indices
    }
}

/// What happens to genes that leave `[0, 1]`.
///
/// Crossover blends stay inside the parents' hull, but polynomial mutation
/// applied to an already out-of-range gene and every PSO position step can
/// leave the unit box. The default keeps the raw dynamics; objectives are
/// expected to tolerate small excursions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundPolicy {
    /// Genes are never modified after an operator runs.
    #[default]
    Unbounded,
    /// Genes are clamped into `[0, 1]` after every variation step.
    Clamp,
}

impl BoundPolicy {
    /// Applies the policy to a matrix in place.
    pub fn apply(self, genes: &mut Array2<f64>) {
        if self == BoundPolicy::Clamp {
            genes.mapv_inplace(|g| g.clamp(0.0, 1.0));
        }
    }
}

/// Rejects populations with no rows or no columns.
pub(crate) fn ensure_population(population: ArrayView2<'_, f64>) -> Result<()> {
    if population.nrows() == 0 || population.ncols() == 0 {
        return Err(Error::EmptyPopulation);
    }
    Ok(())
}

/// Checks that a fitness vector is row-aligned with its population.
pub(crate) fn ensure_fitness(
    population: ArrayView2<'_, f64>,
    fitness: ArrayView1<'_, f64>,
    context: &'static str,
) -> Result<()> {
    ensure_population(population)?;
    if fitness.len() != population.nrows() {
        return Err(Error::ShapeMismatch {
            context,
            expected: population.nrows(),
            actual: fitness.len(),
        });
    }
    Ok(())
}

/// Checks that two matrices have identical shapes.
pub(crate) fn ensure_same_shape(
    reference: ArrayView2<'_, f64>,
    other: ArrayView2<'_, f64>,
    context: &'static str,
) -> Result<()> {
    if reference.nrows() != other.nrows() {
        return Err(Error::ShapeMismatch {
            context,
            expected: reference.nrows(),
            actual: other.nrows(),
        });
    }
    if reference.ncols() != other.ncols() {
        return Err(Error::ShapeMismatch {
            context,
            expected: reference.ncols(),
            actual: other.ncols(),
        });
    }
    Ok(())
}
