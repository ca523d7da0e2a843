//! Hybrid PSO-GA configuration.

use crate::error::{Error, Result};
use crate::pso::{CLERC_ACCELERATION, CLERC_INERTIA};
use crate::types::{BoundPolicy, Direction};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the hybrid PSO-GA.
///
/// # Examples
///
/// ```
/// use u_swarm::hybrid::HybridConfig;
///
/// let config = HybridConfig::default()
///     .with_coefficients(0.5, 2.1, 2.1)
///     .with_half_width(2)
///     .with_mutation(0.05, 50.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HybridConfig {
    /// Number of particles.
    pub swarm_size: usize,

    /// Maximum number of iterations run by
    /// [`HybridEngine::run`](super::HybridEngine::run).
    pub max_iterations: usize,

    /// Optimization direction.
    pub direction: Direction,

    /// Weight `w` of the previous displacement `X − Xm1`.
    pub inertia: f64,

    /// Attraction `c1` toward the particle's archived position.
    pub cognitive: f64,

    /// Attraction `c2` toward the ring-neighborhood best.
    pub social: f64,

    /// Neighbors considered on each side of a particle.
    pub half_width: usize,

    /// Fraction of all genes mutated per iteration (0.0–1.0).
    pub mutation_rate: f64,

    /// Polynomial mutation distribution index (η > 0).
    pub distribution_index: f64,

    /// What happens to positions pushed outside `[0, 1]`.
    pub bound_policy: BoundPolicy,

    /// Quiet iterations before a run stops (0 to disable).
    pub stall_iterations: usize,

    /// Largest change of the archive best still counted as a stall.
    pub stall_tolerance: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            swarm_size: 30,
            max_iterations: 200,
            direction: Direction::Minimize,
            inertia: CLERC_INERTIA,
            cognitive: CLERC_ACCELERATION,
            social: CLERC_ACCELERATION,
            half_width: 1,
            mutation_rate: 0.1,
            distribution_index: 50.0,
            bound_policy: BoundPolicy::Unbounded,
            stall_iterations: 0,
            stall_tolerance: 1e-12,
            seed: None,
        }
    }
}

impl HybridConfig {
    /// Sets the number of particles.
    pub fn with_swarm_size(mut self, n: usize) -> Self {
        self.swarm_size = n;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the optimization direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets `w`, `c1` and `c2`.
    pub fn with_coefficients(mut self, inertia: f64, cognitive: f64, social: f64) -> Self {
        self.inertia = inertia;
        self.cognitive = cognitive;
        self.social = social;
        self
    }

    /// Sets the ring half-width.
    pub fn with_half_width(mut self, half_width: usize) -> Self {
        self.half_width = half_width;
        self
    }

    /// Sets the mutation rate and distribution index together.
    pub fn with_mutation(mut self, rate: f64, distribution_index: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self.distribution_index = distribution_index;
        self
    }

    /// Sets the bound policy.
    pub fn with_bound_policy(mut self, policy: BoundPolicy) -> Self {
        self.bound_policy = policy;
        self
    }

    /// Stops a run after `iterations` quiet iterations (0 to disable).
    pub fn with_stall(mut self, iterations: usize, tolerance: f64) -> Self {
        self.stall_iterations = iterations;
        self.stall_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.swarm_size == 0 {
            return Err(Error::InvalidConfig("swarm_size must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("inertia", self.inertia),
            ("cognitive", self.cognitive),
            ("social", self.social),
        ] {
            if !value.is_finite() {
                return Err(Error::InvalidConfig(format!("{name} must be finite")));
            }
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidConfig(
                "mutation_rate must lie in [0, 1]".into(),
            ));
        }
        if !(self.distribution_index.is_finite() && self.distribution_index > 0.0) {
            return Err(Error::InvalidConfig(
                "distribution_index must be positive and finite".into(),
            ));
        }
        if self.stall_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "stall_tolerance must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HybridConfig::default();
        assert_eq!(config.swarm_size, 30);
        assert_eq!(config.half_width, 1);
        assert!((config.inertia - 0.7298).abs() < 1e-12);
        assert!((config.mutation_rate - 0.1).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = HybridConfig::default()
            .with_swarm_size(12)
            .with_max_iterations(50)
            .with_direction(Direction::Maximize)
            .with_coefficients(0.5, 2.1, 2.1)
            .with_half_width(3)
            .with_mutation(1.5, 20.0)
            .with_bound_policy(BoundPolicy::Clamp)
            .with_seed(9);
        assert_eq!(config.swarm_size, 12);
        assert_eq!(config.max_iterations, 50);
        assert_eq!(config.direction, Direction::Maximize);
        assert_eq!(config.social, 2.1);
        assert_eq!(config.half_width, 3);
        assert_eq!(config.mutation_rate, 1.0);
        assert_eq!(config.bound_policy, BoundPolicy::Clamp);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(HybridConfig::default().with_swarm_size(0).validate().is_err());
        assert!(HybridConfig::default()
            .with_coefficients(f64::NAN, 1.0, 1.0)
            .validate()
            .is_err());
        assert!(HybridConfig::default()
            .with_mutation(0.1, -2.0)
            .validate()
            .is_err());
    }
}
