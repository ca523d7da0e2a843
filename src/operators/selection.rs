//! Selection strategies.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, ch. 1 (roulette wheel)
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::SelectionOperator;
use crate::error::{Error, Result};
use crate::types::{ensure_fitness, Direction};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Floor added to inverted weights so the worst individual keeps a chance.
const INVERSION_EPSILON: f64 = 1e-10;

/// Fitness-proportionate (roulette wheel) selection.
///
/// Individuals are sorted by weight descending and the cumulative
/// distribution of normalized weights is inverted: each output slot draws
/// `u ~ U(0, 1)` and takes the first sorted individual whose cumulative
/// value is `>= u`.
///
/// Under [`Direction::Maximize`] the raw fitness is the weight and must be
/// nonnegative with a positive sum. Under [`Direction::Minimize`] the weight
/// is `max(y) − y + ε`, so the lowest fitness receives the largest share.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use u_swarm::operators::{RouletteSelection, SelectionOperator};
/// use u_swarm::random::create_rng;
/// use u_swarm::Direction;
///
/// let x = array![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]];
/// let y = array![1.0, 2.0, 3.0];
/// let mut rng = create_rng(42);
/// let out = RouletteSelection
///     .select(x.view(), y.view(), Direction::Maximize, &mut rng)
///     .unwrap();
/// assert_eq!(out.dim(), (3, 2));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouletteSelection;

/// Selection weights for a direction.
///
/// Fails with [`Error::DegenerateFitness`] when any weight is negative or
/// non-finite, or when the weights sum to zero.
pub fn roulette_weights(fitness: ArrayView1<'_, f64>, direction: Direction) -> Result<Array1<f64>> {
    let weights = match direction {
        Direction::Maximize => fitness.to_owned(),
        Direction::Minimize => {
            let max = fitness.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            fitness.mapv(|y| max - y + INVERSION_EPSILON)
        }
    };
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::DegenerateFitness(format!(
            "weight {bad} is negative or not finite"
        )));
    }
    let total = weights.sum();
    if total <= 0.0 {
        return Err(Error::DegenerateFitness(format!(
            "weights sum to {total}, expected a positive total"
        )));
    }
    Ok(weights)
}

/// First index whose cumulative value is `>= u`, saturating at the end.
fn first_exceeding(cumulative: &[f64], u: f64) -> usize {
    let idx = cumulative.partition_point(|&c| c < u);
    idx.min(cumulative.len() - 1)
}

impl SelectionOperator for RouletteSelection {
    fn select<R: Rng + ?Sized>(
        &self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
        direction: Direction,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        ensure_fitness(population, fitness, "roulette selection")?;
        let weights = roulette_weights(fitness, direction)?;
        let total = weights.sum();

        let order = Direction::Maximize.ranked_indices(weights.view());
        let mut cumulative = Vec::with_capacity(order.len());
        let mut running = 0.0;
        for &i in &order {
            running += weights[i] / total;
            cumulative.push(running);
        }

        let picks: Vec<usize> = (0..population.nrows())
            .map(|_| order[first_exceeding(&cumulative, rng.random::<f64>())])
            .collect();
        Ok(population.select(Axis(0), &picks))
    }
}

/// Tournament selection: each slot takes the best of `size` uniform draws.
///
/// Needs no transformation of the fitness, so it works with any sign and
/// either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TournamentSelection {
    /// Number of contestants per slot (at least 1).
    pub size: usize,
}

impl TournamentSelection {
    /// Creates a tournament of `size` contestants.
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::new(3)
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng + ?Sized>(
        &self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
        direction: Direction,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        ensure_fitness(population, fitness, "tournament selection")?;
        let n = population.nrows();
        let picks: Vec<usize> = (0..n)
            .map(|_| {
                let mut best = rng.random_range(0..n);
                for _ in 1..self.size.max(1) {
                    let idx = rng.random_range(0..n);
                    if direction.is_better(fitness[idx], fitness[best]) {
                        best = idx;
                    }
                }
                best
            })
            .collect();
        Ok(population.select(Axis(0), &picks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use ndarray::{array, Array2};

    fn labelled(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 2), |(i, _)| i as f64)
    }

    fn count_labels(out: &Array2<f64>, counts: &mut [u32]) {
        for row in out.rows() {
            counts[row[0] as usize] += 1;
        }
    }

    #[test]
    fn test_roulette_preserves_shape() {
        let x = labelled(7);
        let y = array![1.0, 0.5, 2.0, 0.1, 3.0, 0.0, 1.0];
        let mut rng = create_rng(3);
        let out = RouletteSelection
            .select(x.view(), y.view(), Direction::Maximize, &mut rng)
            .unwrap();
        assert_eq!(out.dim(), (7, 2));
    }

    #[test]
    fn test_roulette_frequencies_match_weights() {
        let x = labelled(4);
        let y = array![1.0, 2.0, 3.0, 4.0];
        let mut rng = create_rng(42);
        let mut counts = [0u32; 4];
        let rounds = 2500; // 10,000 draws
        for _ in 0..rounds {
            let out = RouletteSelection
                .select(x.view(), y.view(), Direction::Maximize, &mut rng)
                .unwrap();
            count_labels(&out, &mut counts);
        }
        let draws = (rounds * 4) as f64;
        for (i, &c) in counts.iter().enumerate() {
            let expected = y[i] / 10.0;
            let observed = c as f64 / draws;
            assert!(
                (observed - expected).abs() < 0.02,
                "row {i}: observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_roulette_zero_weight_never_drawn() {
        let x = labelled(3);
        let y = array![0.0, 1.0, 1.0];
        let mut rng = create_rng(9);
        let mut counts = [0u32; 3];
        for _ in 0..500 {
            let out = RouletteSelection
                .select(x.view(), y.view(), Direction::Maximize, &mut rng)
                .unwrap();
            count_labels(&out, &mut counts);
        }
        assert_eq!(counts[0], 0);
    }

    #[test]
    fn test_roulette_minimize_favors_lowest() {
        let x = labelled(4);
        let y = array![100.0, 50.0, 1.0, 80.0];
        let mut rng = create_rng(42);
        let mut counts = [0u32; 4];
        for _ in 0..1000 {
            let out = RouletteSelection
                .select(x.view(), y.view(), Direction::Minimize, &mut rng)
                .unwrap();
            count_labels(&out, &mut counts);
        }
        assert!(counts[2] > counts[1] && counts[1] > counts[3] && counts[3] > counts[0]);
    }

    #[test]
    fn test_roulette_degenerate_sum_fails() {
        let x = labelled(3);
        let y = array![0.0, 0.0, 0.0];
        let mut rng = create_rng(1);
        let err = RouletteSelection
            .select(x.view(), y.view(), Direction::Maximize, &mut rng)
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateFitness(_)));
    }

    #[test]
    fn test_roulette_negative_weight_fails() {
        let y = array![1.0, -0.5];
        assert!(roulette_weights(y.view(), Direction::Maximize).is_err());
        // the same values are fine once inverted
        assert!(roulette_weights(y.view(), Direction::Minimize).is_ok());
    }

    #[test]
    fn test_roulette_shape_mismatch() {
        let x = labelled(3);
        let y = array![1.0, 2.0];
        let mut rng = create_rng(1);
        assert!(matches!(
            RouletteSelection.select(x.view(), y.view(), Direction::Maximize, &mut rng),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_first_exceeding_edges() {
        let cum = [0.4, 0.7, 0.9, 1.0];
        assert_eq!(first_exceeding(&cum, 0.0), 0);
        assert_eq!(first_exceeding(&cum, 0.4), 0);
        assert_eq!(first_exceeding(&cum, 0.41), 1);
        assert_eq!(first_exceeding(&cum, 1.5), 3);
    }

    #[test]
    fn test_tournament_favors_best() {
        let x = labelled(4);
        let y = array![10.0, 5.0, 1.0, 8.0];
        let mut rng = create_rng(42);
        let mut counts = [0u32; 4];
        for _ in 0..2500 {
            let out = TournamentSelection::new(4)
                .select(x.view(), y.view(), Direction::Minimize, &mut rng)
                .unwrap();
            count_labels(&out, &mut counts);
        }
        assert!(counts[2] > 6000, "best selected {}/10000", counts[2]);
    }

    #[test]
    fn test_tournament_size_clamped() {
        assert_eq!(TournamentSelection::new(0).size, 1);
    }
}
