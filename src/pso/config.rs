//! PSO configuration.

use crate::error::{Error, Result};
use crate::types::{BoundPolicy, Direction};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for Particle Swarm Optimization.
///
/// Velocity coefficients belong to the velocity strategy
/// ([`GlobalBest`](super::GlobalBest), [`RingTopology`](super::RingTopology),
/// [`ConstrictionRing`](super::ConstrictionRing)); this struct only holds
/// what every strategy shares.
///
/// # Examples
///
/// ```
/// use u_swarm::pso::PsoConfig;
///
/// let config = PsoConfig::default().with_swarm_size(50).with_seed(1);
/// assert_eq!(config.swarm_size, 50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PsoConfig {
    /// Number of particles.
    pub swarm_size: usize,

    /// Maximum number of iterations run by [`PsoEngine::run`](super::PsoEngine::run).
    pub max_iterations: usize,

    /// Optimization direction for personal-best updates and neighbor search.
    pub direction: Direction,

    /// What happens to positions pushed outside `[0, 1]`.
    pub bound_policy: BoundPolicy,

    /// Iterations with no swarm-best change beyond
    /// [`stall_tolerance`](Self::stall_tolerance) before the run stops.
    ///
    /// Set to 0 to disable stall-based termination.
    pub stall_iterations: usize,

    /// Largest change of the swarm best still counted as a stall.
    pub stall_tolerance: f64,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            swarm_size: 30,
            max_iterations: 100,
            direction: Direction::Minimize,
            bound_policy: BoundPolicy::Unbounded,
            stall_iterations: 0,
            stall_tolerance: 1e-12,
            seed: None,
        }
    }
}

impl PsoConfig {
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
        if self.stall_tolerance < 0.0 {
            return Err(Error::InvalidConfig(
                "stall_tolerance must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
