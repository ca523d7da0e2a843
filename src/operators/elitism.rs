//! Top-k elitism.

use super::ElitismOperator;
use crate::error::Result;
use crate::types::{ensure_fitness, Direction};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absorbs rounding noise in `rate * n` before taking the ceiling.
const COUNT_TOLERANCE: f64 = 1e-9;

/// Number of elites for a population: `ceil(rate · n)`, capped at `n`.
///
/// # Examples
///
/// ```
/// use u_swarm::operators::elite_count;
///
/// assert_eq!(elite_count(0.3, 10), 3);
/// assert_eq!(elite_count(0.05, 40), 2);
/// assert_eq!(elite_count(0.01, 40), 1);
/// assert_eq!(elite_count(0.0, 40), 0);
/// ```
pub fn elite_count(rate: f64, individuals: usize) -> usize {
    let raw = rate * individuals as f64 - COUNT_TOLERANCE;
    let count = raw.ceil().max(0.0) as usize;
    count.min(individuals)
}

/// Copies the best `ceil(rate · N)` rows, best first.
///
/// Ties are broken by ascending original row index. The input is never
/// modified.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopKElitism {
    /// Fraction of the population kept (0.0–1.0).
    pub rate: f64,
}

impl TopKElitism {
    /// Creates the operator, clamping `rate` into `[0, 1]`.
    pub fn new(rate: f64) -> Self {
        Self {
            rate: rate.clamp(0.0, 1.0),
        }
    }
}

impl ElitismOperator for TopKElitism {
    fn elites(
        &self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
        direction: Direction,
    ) -> Result<Array2<f64>> {
        ensure_fitness(population, fitness, "elitism")?;
        let k = elite_count(self.rate, population.nrows());
        let ranked = direction.ranked_indices(fitness);
        Ok(population.select(Axis(0), &ranked[..k]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn ten_rows() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i * 10 + j) as f64);
        let y = array![0.3, 0.9, 0.1, 0.7, 0.5, 0.8, 0.2, 0.6, 0.4, 0.0];
        (x, y)
    }

    #[test]
    fn test_top_three_maximize() {
        let (x, y) = ten_rows();
        let elites = TopKElitism::new(0.3)
            .elites(x.view(), y.view(), Direction::Maximize)
            .unwrap();
        assert_eq!(elites.nrows(), 3);
        assert_eq!(elites.row(0), x.row(1));
        assert_eq!(elites.row(1), x.row(5));
        assert_eq!(elites.row(2), x.row(3));
    }

    #[test]
    fn test_top_three_minimize() {
        let (x, y) = ten_rows();
        let elites = TopKElitism::new(0.3)
            .elites(x.view(), y.view(), Direction::Minimize)
            .unwrap();
        assert_eq!(elites.nrows(), 3);
        assert_eq!(elites.row(0), x.row(9));
        assert_eq!(elites.row(1), x.row(2));
        assert_eq!(elites.row(2), x.row(6));
    }

    #[test]
    fn test_ties_break_by_index() {
        let x = Array2::from_shape_fn((4, 1), |(i, _)| i as f64);
        let y = array![1.0, 2.0, 2.0, 2.0];
        let elites = TopKElitism::new(0.5)
            .elites(x.view(), y.view(), Direction::Maximize)
            .unwrap();
        assert_eq!(elites, array![[1.0], [2.0]]);
    }

    #[test]
    fn test_inputs_untouched() {
        let (x, y) = ten_rows();
        let (x0, y0) = (x.clone(), y.clone());
        let _ = TopKElitism::new(0.5).elites(x.view(), y.view(), Direction::Maximize);
        assert_eq!(x, x0);
        assert_eq!(y, y0);
    }

    #[test]
    fn test_count_rounds_up() {
        assert_eq!(elite_count(0.25, 10), 3);
        assert_eq!(elite_count(1.0, 7), 7);
        assert_eq!(elite_count(0.5, 0), 0);
    }
}
