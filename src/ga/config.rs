//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the generational step and
//! the run driver.

use crate::error::{Error, Result};
use crate::operators::elite_count;
use crate::types::{BoundPolicy, Direction};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use u_swarm::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 40);
/// assert_eq!(config.max_generations, 300);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_swarm::ga::GaConfig;
/// use u_swarm::Direction;
///
/// let config = GaConfig::default()
///     .with_population_size(60)
///     .with_direction(Direction::Maximize)
///     .with_elite_rate(0.1)
///     .with_mutation(0.2, 40.0)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Number of individuals in the population.
    pub population_size: usize,

    /// Maximum number of generations run by [`GaEngine::run`](super::GaEngine::run).
    pub max_generations: usize,

    /// Optimization direction shared by selection and elitism.
    pub direction: Direction,

    /// Fraction of the population carried over unchanged (0.0–1.0).
    ///
    /// The elite count is `ceil(elite_rate · N)`.
    pub elite_rate: f64,

    /// Per-row probability that a mating-pool row takes part in crossover.
    pub crossover_rate: f64,

    /// Fraction of the mutation pool's genes perturbed each generation.
    pub mutation_rate: f64,

    /// Polynomial mutation distribution index (η > 0).
    ///
    /// Typical range: 20–100. Larger values give smaller steps.
    pub distribution_index: f64,

    /// What happens to genes pushed outside `[0, 1]`.
    pub bound_policy: BoundPolicy,

    /// Generations with no best-fitness change beyond
    /// [`stall_tolerance`](Self::stall_tolerance) before the run stops.
    ///
    /// Set to 0 to disable stall-based termination.
    pub stall_generations: usize,

    /// Largest change of the best fitness still counted as a stall.
    pub stall_tolerance: f64,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 40,
            max_generations: 300,
            direction: Direction::Minimize,
            elite_rate: 0.05,
            crossover_rate: 0.8,
            mutation_rate: 0.5,
            distribution_index: 60.0,
            bound_policy: BoundPolicy::Unbounded,
            stall_generations: 0,
            stall_tolerance: 1e-6,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the optimization direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the elite rate.
    pub fn with_elite_rate(mut self, rate: f64) -> Self {
        self.elite_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
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

    /// Stops a run after `generations` quiet generations (0 to disable).
    pub fn with_stall(mut self, generations: usize, tolerance: f64) -> Self {
        self.stall_generations = generations;
        self.stall_tolerance = tolerance.max(0.0);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites this configuration keeps.
    pub fn elite_count(&self) -> usize {
        elite_count(self.elite_rate, self.population_size)
    }

    /// Validates the configuration.
    ///
    /// Returns [`Error::InvalidConfig`] describing the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if self.max_generations == 0 {
            return Err(Error::InvalidConfig(
                "max_generations must be at least 1".into(),
            ));
        }
        for (name, rate) in [
            ("elite_rate", self.elite_rate),
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::InvalidConfig(format!("{name} must lie in [0, 1]")));
            }
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
