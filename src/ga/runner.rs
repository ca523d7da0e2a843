//! GA generational step and run driver.
//!
//! [`GaEngine`] composes one generation as:
//! evaluation → selection → elitism → crossover → mutation → concatenation.

use super::config::GaConfig;
use crate::error::{Error, Result};
use crate::objective::{evaluate_checked, Objective};
use crate::operators::{
    ArithmeticCrossover, CrossoverOperator, ElitismOperator, GenerationCap, MutationOperator,
    PolynomialMutation, RouletteSelection, SelectionOperator, StallProbe, StallTracker,
    TopKElitism,
};
use crate::random::{rng_from_seed, uniform_population};
use crate::types::{ensure_population, FitnessVector, Population};
use ndarray::{concatenate, s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

/// Bookkeeping for one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    /// Zero-based index of the generation just produced.
    pub generation: usize,

    /// Rows carried over by elitism.
    pub elites: usize,

    /// Rows produced by crossover.
    pub crossed: usize,

    /// Rows produced by mutation.
    pub mutated: usize,

    /// Best fitness of the parent population evaluated in this step.
    pub best_fitness: f64,

    /// Mean fitness of the parent population.
    pub mean_fitness: f64,
}

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// Best individual of the final population.
    pub best: Array1<f64>,

    /// Fitness of [`best`](Self::best).
    pub best_fitness: f64,

    /// Final population.
    pub population: Population,

    /// Fitness of the final population.
    pub fitness: FitnessVector,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run stopped because the best fitness stalled.
    pub stalled: bool,

    /// Probed best fitness of every generation.
    pub fitness_history: Vec<f64>,
}

/// Genetic Algorithm engine with pluggable operators.
///
/// The default operator set is [`RouletteSelection`], [`TopKElitism`],
/// [`ArithmeticCrossover`] and [`PolynomialMutation`], parameterized from
/// [`GaConfig`]. Any of them can be replaced through
/// [`with_operators`](Self::with_operators).
///
/// # Usage
///
/// ```
/// use u_swarm::benchmarks::Sphere;
/// use u_swarm::ga::{GaConfig, GaEngine};
///
/// let config = GaConfig::default().with_max_generations(20).with_seed(42);
/// let mut engine = GaEngine::new(config).unwrap();
/// let result = engine.run(&Sphere { dim: 2 }).unwrap();
/// assert_eq!(result.generations, 20);
/// ```
pub struct GaEngine<
    S = RouletteSelection,
    E = TopKElitism,
    C = ArithmeticCrossover,
    M = PolynomialMutation,
> {
    config: GaConfig,
    selection: S,
    elitism: E,
    crossover: C,
    mutation: M,
    rng: StdRng,
    generation: usize,
}

impl GaEngine {
    /// Creates an engine with the default operators built from `config`.
    pub fn new(config: GaConfig) -> Result<Self> {
        let elitism = TopKElitism::new(config.elite_rate);
        let crossover = ArithmeticCrossover::new(config.crossover_rate);
        let mutation = PolynomialMutation::new(config.mutation_rate, config.distribution_index);
        Self::with_operators(config, RouletteSelection, elitism, crossover, mutation)
    }
}

impl<S, E, C, M> GaEngine<S, E, C, M>
where
    S: SelectionOperator,
    E: ElitismOperator,
    C: CrossoverOperator,
    M: MutationOperator,
{
    /// Creates an engine with caller-supplied operators.
    ///
    /// The operators carry their own parameters; the rate fields of
    /// `config` are only used by [`GaEngine::new`].
    pub fn with_operators(
        config: GaConfig,
        selection: S,
        elitism: E,
        crossover: C,
        mutation: M,
    ) -> Result<Self> {
        config.validate()?;
        let rng = rng_from_seed(config.seed);
        Ok(Self {
            config,
            selection,
            elitism,
            crossover,
            mutation,
            rng,
            generation: 0,
        })
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// The engine's random source, for callers composing operators by hand.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Uniform `[0, 1)` population of `config.population_size` rows.
    pub fn initialise(&mut self, variables: usize) -> Population {
        self.generation = 0;
        uniform_population(self.config.population_size, variables, &mut self.rng)
    }

    /// Replaces `population` with the next generation.
    ///
    /// Evaluates the objective once. On any error the population is left
    /// untouched; in particular a generation whose elite, crossover and
    /// mutation counts do not add up to the population size is rejected with
    /// [`Error::PartitionViolation`].
    pub fn step<O: Objective + ?Sized>(
        &mut self,
        population: &mut Population,
        objective: &O,
    ) -> Result<GenerationStats> {
        ensure_population(population.view())?;
        let n = population.nrows();
        let direction = self.config.direction;

        let fitness = evaluate_checked(objective, population.view())?;
        let selected =
            self.selection
                .select(population.view(), fitness.view(), direction, &mut self.rng)?;
        let elites = self
            .elitism
            .elites(population.view(), fitness.view(), direction)?;
        let k = elites.nrows();
        if selected.nrows() != n || k > n {
            return Err(self.partition_error(k, 0, selected.nrows().saturating_sub(k), n));
        }

        let crossed = self
            .crossover
            .crossover(selected.slice(s![k.., ..]), &mut self.rng)?;
        let c = crossed.nrows();
        if k + c > n {
            return Err(self.partition_error(k, c, 0, n));
        }

        let mutated = self
            .mutation
            .mutate(selected.slice(s![k + c.., ..]), &mut self.rng)?;
        let m = mutated.nrows();
        if k + c + m != n {
            return Err(self.partition_error(k, c, m, n));
        }

        let mut next = join_generation(population.ncols(), &elites, &crossed, &mutated)?;
        self.config.bound_policy.apply(&mut next);
        *population = next;

        let best_fitness = StallProbe.probe(fitness.view(), direction)?;
        let stats = GenerationStats {
            generation: self.generation,
            elites: k,
            crossed: c,
            mutated: m,
            best_fitness,
            mean_fitness: fitness.mean().unwrap_or(f64::NAN),
        };
        debug!(
            generation = stats.generation,
            elites = k,
            crossed = c,
            mutated = m,
            best = best_fitness,
            "ga generation"
        );
        self.generation += 1;
        Ok(stats)
    }

    /// Runs from a fresh population until the generation cap or a stall.
    ///
    /// The number of variables is taken from the objective's bounds. The
    /// final population is evaluated once more to report its best member.
    pub fn run<O: Objective + ?Sized>(&mut self, objective: &O) -> Result<GaResult> {
        let (lower, _) = objective.bounds();
        let mut population = self.initialise(lower.len());

        let cap = GenerationCap::new(self.config.max_generations);
        let mut tracker =
            StallTracker::new(self.config.stall_generations, self.config.stall_tolerance);
        let mut fitness_history = Vec::with_capacity(self.config.max_generations);
        let mut generations = 0;
        let mut stalled = false;

        while cap.should_continue(generations) {
            let stats = self.step(&mut population, objective)?;
            fitness_history.push(stats.best_fitness);
            generations += 1;
            if tracker.observe(stats.best_fitness) {
                stalled = true;
                break;
            }
        }

        let direction = self.config.direction;
        let fitness = evaluate_checked(objective, population.view())?;
        let best_idx = direction
            .best_index(fitness.view())
            .ok_or(Error::EmptyPopulation)?;
        info!(
            generations,
            stalled,
            best = fitness[best_idx],
            "ga run finished"
        );

        Ok(GaResult {
            best: population.row(best_idx).to_owned(),
            best_fitness: fitness[best_idx],
            population,
            fitness,
            generations,
            stalled,
            fitness_history,
        })
    }

    fn partition_error(
        &self,
        elites: usize,
        crossed: usize,
        mutated: usize,
        population: usize,
    ) -> Error {
        warn!(
            generation = self.generation,
            elites, crossed, mutated, population, "ga generation aborted"
        );
        Error::PartitionViolation {
            elites,
            crossed,
            mutated,
            population,
        }
    }
}

/// Stacks elites, crossed and mutated rows after checking their widths.
fn join_generation(
    variables: usize,
    elites: &Array2<f64>,
    crossed: &Array2<f64>,
    mutated: &Array2<f64>,
) -> Result<Population> {
    for part in [elites, crossed, mutated] {
        if part.ncols() != variables {
            return Err(Error::ShapeMismatch {
                context: "generation columns",
                expected: variables,
                actual: part.ncols(),
            });
        }
    }
    concatenate(Axis(0), &[elites.view(), crossed.view(), mutated.view()]).map_err(|_| {
        Error::ShapeMismatch {
            context: "generation rows",
            expected: variables,
            actual: variables,
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
