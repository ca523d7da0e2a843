//! PSO iteration step and run driver.

use super::config::PsoConfig;
use super::velocity::{integrate_position, GlobalBest, VelocityUpdate};
use crate::error::{Error, Result};
use crate::objective::{evaluate_checked, Objective};
use crate::operators::{update_archive, GenerationCap, StallProbe, StallTracker};
use crate::random::{rng_from_seed, uniform_population, zero_velocity};
use crate::types::{ensure_population, Direction, FitnessVector, Population};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Swarm state: positions, velocities and the personal-best archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Swarm {
    /// Current positions `X`.
    pub position: Population,
    /// Current velocities `V`.
    pub velocity: Array2<f64>,
    /// Personal-best positions `XB`.
    pub best_position: Population,
    /// Personal-best fitness `YB`.
    pub best_fitness: FitnessVector,
}

impl Swarm {
    /// Index of the swarm-best particle, ties to the lowest index.
    pub fn best_index(&self, direction: Direction) -> Option<usize> {
        direction.best_index(self.best_fitness.view())
    }
}

/// Bookkeeping for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Personal bests improved in this iteration.
    pub improved: usize,
    /// Swarm-best fitness after the archive update.
    pub best_fitness: f64,
}

/// Result of a PSO run.
#[derive(Debug, Clone)]
pub struct PsoResult {
    /// Best position ever archived.
    pub best: Array1<f64>,
    /// Fitness of [`best`](Self::best).
    pub best_fitness: f64,
    /// Final swarm state.
    pub swarm: Swarm,
    /// Iterations executed.
    pub iterations: usize,
    /// Whether the run stopped because the swarm best stalled.
    pub stalled: bool,
    /// Swarm-best fitness after every iteration.
    pub fitness_history: Vec<f64>,
}

/// Particle Swarm Optimization engine, generic over the velocity strategy.
///
/// # Usage
///
/// ```
/// use u_swarm::benchmarks::Sphere;
/// use u_swarm::pso::{PsoConfig, PsoEngine, RingTopology};
///
/// let config = PsoConfig::default().with_max_iterations(50).with_seed(3);
/// let mut engine = PsoEngine::with_velocity(config, RingTopology::default()).unwrap();
/// let result = engine.run(&Sphere { dim: 2 }).unwrap();
/// assert!(result.best_fitness < 1e-2);
/// ```
pub struct PsoEngine<V = GlobalBest> {
    config: PsoConfig,
    velocity: V,
    rng: StdRng,
    iteration: usize,
}

impl PsoEngine {
    /// Creates a global-best engine with Clerc-Kennedy coefficients.
    pub fn new(config: PsoConfig) -> Result<Self> {
        Self::with_velocity(config, GlobalBest::default())
    }
}

impl<V: VelocityUpdate> PsoEngine<V> {
    /// Creates an engine with the given velocity strategy.
    pub fn with_velocity(config: PsoConfig, velocity: V) -> Result<Self> {
        config.validate()?;
        let rng = rng_from_seed(config.seed);
        Ok(Self {
            config,
            velocity,
            rng,
            iteration: 0,
        })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    /// Uniform positions, zero velocities, `XB = X` and `YB` at the worst
    /// value for the configured direction.
    pub fn initialise(&mut self, variables: usize) -> Swarm {
        self.iteration = 0;
        let n = self.config.swarm_size;
        let position = uniform_population(n, variables, &mut self.rng);
        Swarm {
            velocity: zero_velocity(n, variables),
            best_position: position.clone(),
            best_fitness: Array1::from_elem(n, self.config.direction.worst()),
            position,
        }
    }

    /// Advances the swarm by one iteration.
    ///
    /// Evaluates `X`, updates the personal bests where strictly improved,
    /// computes `V'` and moves `X' = X + V'`. The swarm is only modified
    /// once every check has passed.
    pub fn step<O: Objective + ?Sized>(
        &mut self,
        swarm: &mut Swarm,
        objective: &O,
    ) -> Result<IterationStats> {
        ensure_population(swarm.position.view())?;
        let direction = self.config.direction;
        let fitness = evaluate_checked(objective, swarm.position.view())?;

        let mut best_position = swarm.best_position.clone();
        let mut best_fitness = swarm.best_fitness.clone();
        let improved = update_archive(
            swarm.position.view(),
            fitness.view(),
            &mut best_position,
            &mut best_fitness,
            direction,
        )?;

        let mut velocity = swarm.velocity.clone();
        self.velocity.update(
            swarm.position.view(),
            best_position.view(),
            best_fitness.view(),
            &mut velocity,
            direction,
            &mut self.rng,
        )?;
        let mut position = swarm.position.clone();
        integrate_position(&mut position, velocity.view())?;
        self.config.bound_policy.apply(&mut position);

        let best = StallProbe.probe(best_fitness.view(), direction)?;
        *swarm = Swarm {
            position,
            velocity,
            best_position,
            best_fitness,
        };

        let stats = IterationStats {
            iteration: self.iteration,
            improved,
            best_fitness: best,
        };
        debug!(
            iteration = stats.iteration,
            improved,
            best,
            "pso iteration"
        );
        self.iteration += 1;
        Ok(stats)
    }

    /// Runs from a fresh swarm until the iteration cap or a stall.
    pub fn run<O: Objective + ?Sized>(&mut self, objective: &O) -> Result<PsoResult> {
        let (lower, _) = objective.bounds();
        let mut swarm = self.initialise(lower.len());

        let cap = GenerationCap::new(self.config.max_iterations);
        let mut tracker =
            StallTracker::new(self.config.stall_iterations, self.config.stall_tolerance);
        let mut fitness_history = Vec::with_capacity(self.config.max_iterations);
        let mut iterations = 0;
        let mut stalled = false;

        while cap.should_continue(iterations) {
            let stats = self.step(&mut swarm, objective)?;
            fitness_history.push(stats.best_fitness);
            iterations += 1;
            if tracker.observe(stats.best_fitness) {
                stalled = true;
                break;
            }
        }

        let best_idx = swarm
            .best_index(self.config.direction)
            .ok_or(Error::EmptyPopulation)?;
        let best_fitness = swarm.best_fitness[best_idx];
        info!(iterations, stalled, best = best_fitness, "pso run finished");

        Ok(PsoResult {
            best: swarm.best_position.row(best_idx).to_owned(),
            best_fitness,
            swarm,
            iterations,
            stalled,
            fitness_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::{Rastrigin, Sphere};
    use crate::pso::{ConstrictionRing, RingTopology};
    use crate::types::BoundPolicy;
    use ndarray::{Array1, ArrayView2};

    struct NegatedSphere;

    impl Objective for NegatedSphere {
        fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
            -Sphere { dim: population.ncols() }.evaluate(population)
        }

        fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
            Sphere { dim: 2 }.bounds()
        }
    }

    struct WrongLength;

    impl Objective for WrongLength {
        fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
            Array1::zeros(population.nrows() + 1)
        }

        fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
            (Array1::zeros(2), Array1::ones(2))
        }
    }

    #[test]
    fn test_initialise() {
        let mut engine = PsoEngine::new(PsoConfig::default().with_swarm_size(20).with_seed(1))
            .unwrap();
        let swarm = engine.initialise(2);
        assert_eq!(swarm.position.dim(), (20, 2));
        assert!(swarm.velocity.iter().all(|&v| v == 0.0));
        assert_eq!(swarm.best_position, swarm.position);
        assert!(swarm.best_fitness.iter().all(|&y| y == f64::INFINITY));
        for row in swarm.position.rows() {
            assert!(row.dot(&row).sqrt() >= 1e-15);
        }
    }

    #[test]
    fn test_first_step_fills_archive() {
        let objective = Sphere { dim: 2 };
        let mut engine = PsoEngine::new(PsoConfig::default().with_seed(2)).unwrap();
        let mut swarm = engine.initialise(2);
        let x0 = swarm.position.clone();
        let stats = engine.step(&mut swarm, &objective).unwrap();
        assert_eq!(stats.improved, 30);
        assert_eq!(swarm.best_position, x0);
        assert_eq!(swarm.best_fitness, objective.evaluate(x0.view()));
    }

    #[test]
    fn test_global_best_sphere_convergence() {
        let config = PsoConfig::default()
            .with_swarm_size(30)
            .with_max_iterations(100)
            .with_seed(42);
        let result = PsoEngine::new(config).unwrap().run(&Sphere { dim: 2 }).unwrap();
        assert_eq!(result.iterations, 100);
        assert!((result.best[0] - 0.5).abs() < 1e-6, "x1 = {}", result.best[0]);
        assert!((result.best[1] - 0.5).abs() < 1e-6, "x2 = {}", result.best[1]);
    }

    #[test]
    fn test_ring_topology_improves() {
        let config = PsoConfig::default().with_max_iterations(200).with_seed(8);
        let result = PsoEngine::with_velocity(config, RingTopology::default())
            .unwrap()
            .run(&Sphere { dim: 3 })
            .unwrap();
        assert!(result.best_fitness < 1e-4);
    }

    #[test]
    fn test_constriction_ring_improves() {
        let config = PsoConfig::default().with_max_iterations(200).with_seed(8);
        let result = PsoEngine::with_velocity(config, ConstrictionRing::default())
            .unwrap()
            .run(&Sphere { dim: 3 })
            .unwrap();
        assert!(result.best_fitness < 1e-4);
    }

    #[test]
    fn test_archive_never_regresses() {
        let objective = Rastrigin { dim: 2 };
        let mut engine = PsoEngine::new(PsoConfig::default().with_seed(6)).unwrap();
        let mut swarm = engine.initialise(2);
        engine.step(&mut swarm, &objective).unwrap();
        for _ in 0..40 {
            let before = swarm.best_fitness.clone();
            engine.step(&mut swarm, &objective).unwrap();
            for (new, old) in swarm.best_fitness.iter().zip(before.iter()) {
                assert!(new <= old);
            }
        }
    }

    #[test]
    fn test_history_is_monotone() {
        let config = PsoConfig::default().with_max_iterations(60).with_seed(12);
        let result = PsoEngine::new(config).unwrap().run(&Rastrigin { dim: 2 }).unwrap();
        for w in result.fitness_history.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn test_maximize_direction() {
        let config = PsoConfig::default()
            .with_direction(Direction::Maximize)
            .with_seed(4);
        let mut engine = PsoEngine::new(config).unwrap();
        let swarm = engine.initialise(2);
        assert!(swarm.best_fitness.iter().all(|&y| y == f64::NEG_INFINITY));
        let result = engine.run(&NegatedSphere).unwrap();
        assert!(result.best_fitness > -1e-6);
    }

    #[test]
    fn test_clamp_policy() {
        let config = PsoConfig::default()
            .with_bound_policy(BoundPolicy::Clamp)
            .with_seed(10);
        let mut engine = PsoEngine::new(config).unwrap();
        let mut swarm = engine.initialise(2);
        for _ in 0..20 {
            engine.step(&mut swarm, &Sphere { dim: 2 }).unwrap();
            assert!(swarm.position.iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn test_stall_stops_run() {
        let config = PsoConfig::default()
            .with_max_iterations(5000)
            .with_stall(20, 1e-12)
            .with_seed(21);
        let result = PsoEngine::new(config).unwrap().run(&Sphere { dim: 2 }).unwrap();
        assert!(result.stalled);
        assert!(result.iterations < 5000);
    }

    #[test]
    fn test_bad_objective_leaves_swarm_untouched() {
        let mut engine = PsoEngine::new(PsoConfig::default().with_seed(1)).unwrap();
        let mut swarm = engine.initialise(2);
        let before = swarm.clone();
        let err = engine.step(&mut swarm, &WrongLength).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(swarm, before);
    }

    #[test]
    fn test_same_seed_same_run() {
        let objective = Sphere { dim: 2 };
        let config = PsoConfig::default().with_max_iterations(30).with_seed(77);
        let a = PsoEngine::new(config.clone()).unwrap().run(&objective).unwrap();
        let b = PsoEngine::new(config).unwrap().run(&objective).unwrap();
        assert_eq!(a.swarm, b.swarm);
    }
}
