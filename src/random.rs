//! Random source construction and population initialization.
//!
//! Engines own exactly one [`StdRng`]; nothing in the crate creates a
//! generator on its own. Functions here take the generator by `&mut` so a
//! caller driving operators directly can share the same stream.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a deterministic generator from a seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Seeded generator when `seed` is set, entropy-seeded otherwise.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}

/// Uniform population with genes drawn from `[0, 1)`.
///
/// # Examples
///
/// ```
/// use u_swarm::random::{create_rng, uniform_population};
///
/// let mut rng = create_rng(7);
/// let x = uniform_population(20, 3, &mut rng);
/// assert_eq!(x.dim(), (20, 3));
/// assert!(x.iter().all(|&g| (0.0..1.0).contains(&g)));
/// ```
pub fn uniform_population<R: Rng + ?Sized>(
    individuals: usize,
    variables: usize,
    rng: &mut R,
) -> Array2<f64> {
    Array2::from_shape_simple_fn((individuals, variables), || rng.random::<f64>())
}

/// All-zero velocity matrix.
pub fn zero_velocity(individuals: usize, variables: usize) -> Array2<f64> {
    Array2::zeros((individuals, variables))
}

/// One uniform `[0, 1)` scalar per row.
pub(crate) fn row_coefficients<R: Rng + ?Sized>(rows: usize, rng: &mut R) -> Array1<f64> {
    Array1::from_shape_simple_fn(rows, || rng.random::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let a = uniform_population(5, 4, &mut create_rng(42));
        let b = uniform_population(5, 4, &mut create_rng(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_population_not_degenerate() {
        let mut rng = create_rng(1);
        let x = uniform_population(20, 2, &mut rng);
        for row in x.rows() {
            let magnitude = row.dot(&row).sqrt();
            assert!(magnitude >= 1e-15);
        }
    }

    #[test]
    fn test_zero_velocity() {
        let v = zero_velocity(20, 2);
        assert_eq!(v.dim(), (20, 2));
        assert!(v.iter().all(|&g| g == 0.0));
    }
}
