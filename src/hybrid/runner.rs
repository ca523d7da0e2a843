//! Hybrid PSO-GA iteration step and run driver.

use super::config::HybridConfig;
use crate::error::{Error, Result};
use crate::objective::{evaluate_checked, Objective};
use crate::operators::{
    ring_best_indices, update_archive, GenerationCap, MutationOperator, PolynomialMutation,
    StallProbe, StallTracker,
};
use crate::pso::Pull;
use crate::random::{rng_from_seed, uniform_population};
use crate::types::{ensure_fitness, ensure_same_shape, FitnessVector, Population};
use ndarray::Array1;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Hybrid state: current and previous positions plus the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct HybridState {
    /// Current positions `X`.
    pub position: Population,
    /// Positions one iteration back, taken before mutation (`Xm1`).
    pub previous: Population,
    /// Best position each particle has reached (`A`).
    pub archive: Population,
    /// Fitness of the archived positions (`YB`).
    pub archive_fitness: FitnessVector,
}

/// Bookkeeping for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridStats {
    /// Zero-based iteration index.
    pub iteration: usize,
    /// Archive rows improved in this iteration.
    pub improved: usize,
    /// Best archive fitness after the update.
    pub best_fitness: f64,
}

/// Result of a hybrid run.
#[derive(Debug, Clone)]
pub struct HybridResult {
    /// Best archived position.
    pub best: Array1<f64>,
    /// Fitness of [`best`](Self::best).
    pub best_fitness: f64,
    /// Final state.
    pub state: HybridState,
    /// Iterations executed.
    pub iterations: usize,
    /// Whether the run stopped because the archive best stalled.
    pub stalled: bool,
    /// Best archive fitness after every iteration.
    pub fitness_history: Vec<f64>,
}

/// Hybrid PSO-GA engine (Deb & Padhye, 2010).
///
/// Each iteration runs, in this order:
///
/// 1. `X ← X + w·(X − Xm1) + c1·r1·(A − X) + c2·r2·(nbest − X)`, where
///    `nbest` is the archive row with the best `YB` in the ring window
/// 2. `y = F(X)`
/// 3. archive rows are replaced wherever `y` strictly improves on `YB`
/// 4. the mutation operator perturbs the whole of `X`
/// 5. `Xm1` takes the value `X` had before step 4
///
/// # Usage
///
/// ```
/// use u_swarm::benchmarks::Sphere;
/// use u_swarm::hybrid::{HybridConfig, HybridEngine};
///
/// let config = HybridConfig::default().with_max_iterations(100).with_seed(5);
/// let result = HybridEngine::new(config).unwrap().run(&Sphere { dim: 2 }).unwrap();
/// assert!(result.best_fitness < 1e-2);
/// ```
pub struct HybridEngine<M = PolynomialMutation> {
    config: HybridConfig,
    mutation: M,
    rng: StdRng,
    iteration: usize,
}

impl HybridEngine {
    /// Creates an engine with polynomial mutation built from `config`.
    pub fn new(config: HybridConfig) -> Result<Self> {
        let mutation = PolynomialMutation::new(config.mutation_rate, config.distribution_index);
        Self::with_mutation(config, mutation)
    }
}

impl<M: MutationOperator> HybridEngine<M> {
    /// Creates an engine with a caller-supplied mutation operator.
    pub fn with_mutation(config: HybridConfig, mutation: M) -> Result<Self> {
        config.validate()?;
        let rng = rng_from_seed(config.seed);
        Ok(Self {
            config,
            mutation,
            rng,
            iteration: 0,
        })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &HybridConfig {
        &self.config
    }

    /// Uniform positions with `A = X`, `Xm1 = X` and `YB = F(X)`.
    pub fn initialise<O: Objective + ?Sized>(&mut self, objective: &O) -> Result<HybridState> {
        self.iteration = 0;
        let (lower, _) = objective.bounds();
        let position = uniform_population(self.config.swarm_size, lower.len(), &mut self.rng);
        let archive_fitness = evaluate_checked(objective, position.view())?;
        Ok(HybridState {
            previous: position.clone(),
            archive: position.clone(),
            archive_fitness,
            position,
        })
    }

    /// Advances the state by one iteration.
    ///
    /// The state is replaced only after all five stages succeed.
    pub fn step<O: Objective + ?Sized>(
        &mut self,
        state: &mut HybridState,
        objective: &O,
    ) -> Result<HybridStats> {
        let direction = self.config.direction;
        ensure_fitness(
            state.archive.view(),
            state.archive_fitness.view(),
            "archive fitness",
        )?;
        ensure_same_shape(state.archive.view(), state.position.view(), "position")?;
        ensure_same_shape(state.position.view(), state.previous.view(), "previous position")?;

        let guides = ring_best_indices(
            state.archive_fitness.view(),
            self.config.half_width,
            direction,
        );
        let mut displacement = &state.position - &state.previous;
        let pull = Pull {
            chi: 1.0,
            inertia: self.config.inertia,
            cognitive: self.config.cognitive,
            social: self.config.social,
        };
        pull.apply(
            state.position.view(),
            state.archive.view(),
            &guides,
            &mut displacement,
            &mut self.rng,
        );
        let mut position = &state.position + &displacement;
        self.config.bound_policy.apply(&mut position);

        let fitness = evaluate_checked(objective, position.view())?;

        let mut archive = state.archive.clone();
        let mut archive_fitness = state.archive_fitness.clone();
        let improved = update_archive(
            position.view(),
            fitness.view(),
            &mut archive,
            &mut archive_fitness,
            direction,
        )?;

        let previous = position.clone();
        self.mutation.mutate_in_place(&mut position, &mut self.rng)?;
        self.config.bound_policy.apply(&mut position);

        let best = StallProbe.probe(archive_fitness.view(), direction)?;
        *state = HybridState {
            position,
            previous,
            archive,
            archive_fitness,
        };

        let stats = HybridStats {
            iteration: self.iteration,
            improved,
            best_fitness: best,
        };
        debug!(
            iteration = stats.iteration,
            improved,
            best,
            "hybrid iteration"
        );
        self.iteration += 1;
        Ok(stats)
    }

    /// Runs from a fresh state until the iteration cap or a stall.
    pub fn run<O: Objective + ?Sized>(&mut self, objective: &O) -> Result<HybridResult> {
        let mut state = self.initialise(objective)?;

        let cap = GenerationCap::new(self.config.max_iterations);
        let mut tracker =
            StallTracker::new(self.config.stall_iterations, self.config.stall_tolerance);
        let mut fitness_history = Vec::with_capacity(self.config.max_iterations);
        let mut iterations = 0;
        let mut stalled = false;

        while cap.should_continue(iterations) {
            let stats = self.step(&mut state, objective)?;
            fitness_history.push(stats.best_fitness);
            iterations += 1;
            if tracker.observe(stats.best_fitness) {
                stalled = true;
                break;
            }
        }

        let best_idx = self
            .config
            .direction
            .best_index(state.archive_fitness.view())
            .ok_or(Error::EmptyPopulation)?;
        let best_fitness = state.archive_fitness[best_idx];
        info!(iterations, stalled, best = best_fitness, "hybrid run finished");

        Ok(HybridResult {
            best: state.archive.row(best_idx).to_owned(),
            best_fitness,
            state,
            iterations,
            stalled,
            fitness_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::{Branin, Rastrigin, Sphere};
    use crate::random::{create_rng, row_coefficients};
    use crate::types::{BoundPolicy, Direction};
    use ndarray::{Array2, ArrayView2};

    struct Nan;

    impl Objective for Nan {
        fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
            Array1::from_elem(population.nrows(), f64::NAN)
        }

        fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
            (Array1::zeros(2), Array1::ones(2))
        }
    }

    struct NegatedSphere;

    impl Objective for NegatedSphere {
        fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
            -Sphere { dim: population.ncols() }.evaluate(population)
        }

        fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
            Sphere { dim: 2 }.bounds()
        }
    }

    struct Truncating;

    impl Objective for Truncating {
        fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
            Array1::zeros(population.nrows().saturating_sub(1))
        }

        fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
            (Array1::zeros(2), Array1::ones(2))
        }
    }

    #[test]
    fn test_initialise_evaluates_archive() {
        let objective = Sphere { dim: 2 };
        let mut engine = HybridEngine::new(HybridConfig::default().with_seed(1)).unwrap();
        let state = engine.initialise(&objective).unwrap();
        assert_eq!(state.position.dim(), (30, 2));
        assert_eq!(state.previous, state.position);
        assert_eq!(state.archive, state.position);
        assert_eq!(state.archive_fitness, objective.evaluate(state.position.view()));
    }

    #[test]
    fn test_previous_is_pre_mutation_position() {
        let objective = Sphere { dim: 2 };
        let config = HybridConfig::default().with_mutation(0.5, 20.0).with_seed(2);
        let mut engine = HybridEngine::new(config).unwrap();
        let mut state = engine.initialise(&objective).unwrap();
        engine.step(&mut state, &objective).unwrap();

        // the archive holds exactly the pre-mutation rows that improved
        let y = objective.evaluate(state.previous.view());
        for i in 0..30 {
            if state.archive_fitness[i] == y[i] {
                assert_eq!(state.archive.row(i), state.previous.row(i));
            }
        }
        assert_ne!(state.position, state.previous);
    }

    #[test]
    fn test_no_mutation_keeps_previous_equal() {
        let objective = Sphere { dim: 3 };
        let config = HybridConfig::default().with_mutation(0.0, 20.0).with_seed(3);
        let mut engine = HybridEngine::new(config).unwrap();
        let mut state = engine.initialise(&objective).unwrap();
        for _ in 0..5 {
            engine.step(&mut state, &objective).unwrap();
            assert_eq!(state.position, state.previous);
        }
    }

    #[test]
    fn test_first_step_moves_only_by_attraction() {
        // with X = Xm1 = A the only pull is toward the neighborhood best
        let objective = Sphere { dim: 2 };
        let config = HybridConfig::default()
            .with_coefficients(0.7, 1.5, 1.5)
            .with_half_width(1)
            .with_mutation(0.0, 20.0)
            .with_seed(4);
        let mut engine = HybridEngine::new(config).unwrap();
        let mut state = engine.initialise(&objective).unwrap();
        let start = state.clone();
        engine.step(&mut state, &objective).unwrap();

        let guides = ring_best_indices(start.archive_fitness.view(), 1, Direction::Minimize);
        let mut twin = create_rng(4);
        let _ = uniform_population(30, 2, &mut twin);
        let _r1 = row_coefficients(30, &mut twin);
        let r2 = row_coefficients(30, &mut twin);
        for i in 0..30 {
            for j in 0..2 {
                let x = start.position[[i, j]];
                let expected = x + 1.5 * r2[i] * (start.archive[[guides[i], j]] - x);
                assert!((state.previous[[i, j]] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_archive_never_regresses() {
        let objective = Rastrigin { dim: 2 };
        let mut engine = HybridEngine::new(HybridConfig::default().with_seed(5)).unwrap();
        let mut state = engine.initialise(&objective).unwrap();
        for _ in 0..50 {
            let before = state.archive_fitness.clone();
            engine.step(&mut state, &objective).unwrap();
            for (new, old) in state.archive_fitness.iter().zip(before.iter()) {
                assert!(new <= old);
            }
        }
    }

    #[test]
    fn test_sphere_convergence_with_mutation() {
        let config = HybridConfig::default()
            .with_max_iterations(300)
            .with_mutation(0.1, 50.0)
            .with_seed(42);
        let result = HybridEngine::new(config)
            .unwrap()
            .run(&Sphere { dim: 2 })
            .unwrap();
        assert!((result.best[0] - 0.5).abs() < 1e-2, "x1 = {}", result.best[0]);
        assert!((result.best[1] - 0.5).abs() < 1e-2, "x2 = {}", result.best[1]);
    }

    #[test]
    fn test_sphere_convergence_without_mutation() {
        let converged = (0..10u64)
            .filter(|&seed| {
                let config = HybridConfig::default()
                    .with_coefficients(0.5, 2.1, 2.1)
                    .with_mutation(0.0, 50.0)
                    .with_max_iterations(200)
                    .with_seed(seed);
                let result = HybridEngine::new(config)
                    .unwrap()
                    .run(&Sphere { dim: 2 })
                    .unwrap();
                result.best.iter().all(|&g| (g - 0.5).abs() < 1e-6)
            })
            .count();
        assert!(converged >= 6, "{converged}/10 seeds within 1e-6");
    }

    #[test]
    fn test_branin_reaches_a_global_minimum() {
        let config = HybridConfig::default()
            .with_swarm_size(40)
            .with_max_iterations(300)
            .with_seed(17);
        let result = HybridEngine::new(config).unwrap().run(&Branin).unwrap();
        assert!((result.best_fitness - 0.397_887).abs() < 1e-2);
    }

    #[test]
    fn test_clamp_policy() {
        let config = HybridConfig::default()
            .with_bound_policy(BoundPolicy::Clamp)
            .with_mutation(1.0, 2.0)
            .with_seed(6);
        let objective = Sphere { dim: 2 };
        let mut engine = HybridEngine::new(config).unwrap();
        let mut state = engine.initialise(&objective).unwrap();
        for _ in 0..20 {
            engine.step(&mut state, &objective).unwrap();
            assert!(state.position.iter().all(|g| (0.0..=1.0).contains(g)));
            assert!(state.previous.iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn test_nan_fitness_never_enters_archive() {
        let objective = Sphere { dim: 2 };
        let mut engine = HybridEngine::new(HybridConfig::default().with_seed(7)).unwrap();
        let mut state = engine.initialise(&objective).unwrap();
        let before = state.archive.clone();
        let stats = engine.step(&mut state, &Nan).unwrap();
        assert_eq!(stats.improved, 0);
        assert_eq!(state.archive, before);
    }

    #[test]
    fn test_failed_step_leaves_state_untouched() {
        let objective = Sphere { dim: 2 };
        let mut engine = HybridEngine::new(HybridConfig::default().with_seed(8)).unwrap();
        let mut state = engine.initialise(&objective).unwrap();
        let before = state.clone();
        assert!(engine.step(&mut state, &Truncating).is_err());
        assert_eq!(state, before);

        let mut broken = state.clone();
        broken.previous = Array2::zeros((3, 2));
        assert!(matches!(
            engine.step(&mut broken, &objective),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_maximize_direction() {
        let config = HybridConfig::default()
            .with_direction(Direction::Maximize)
            .with_max_iterations(150)
            .with_seed(9);
        let result = HybridEngine::new(config).unwrap().run(&NegatedSphere).unwrap();
        assert_eq!(result.iterations, 150);
        for w in result.fitness_history.windows(2) {
            assert!(w[1] >= w[0]);
        }
        assert!(result.best_fitness > -1e-3);
    }
}
