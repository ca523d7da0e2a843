//! Primitive population operators.
//!
//! Each stage of a pipeline is a trait with one or more concrete variants.
//! Engines take the variants as generic parameters, so any stage can be
//! replaced without touching the orchestration code.
//!
//! | Stage | Trait | Variants |
//! |-------|-------|----------|
//! | Selection | [`SelectionOperator`] | [`RouletteSelection`], [`TournamentSelection`] |
//! | Elitism | [`ElitismOperator`] | [`TopKElitism`] |
//! | Crossover | [`CrossoverOperator`] | [`ArithmeticCrossover`] |
//! | Mutation | [`MutationOperator`] | [`PolynomialMutation`] |
//!
//! Termination is not an operator stage: [`GenerationCap`] and
//! [`StallProbe`] are consulted by the driver loop, and [`StallTracker`]
//! holds the driver-side stall policy.
//!
//! All operators receive the random source by `&mut` from their engine and
//! never construct one themselves.

mod archive;
mod crossover;
mod elitism;
mod mutation;
mod selection;
mod termination;

pub use archive::{ring_best_indices, update_archive};
pub use crossover::ArithmeticCrossover;
pub use elitism::{elite_count, TopKElitism};
pub use mutation::{mutation_count, polynomial_perturbation, PolynomialMutation};
pub use selection::{roulette_weights, RouletteSelection, TournamentSelection};
pub use termination::{GenerationCap, StallProbe, StallTracker};

use crate::error::Result;
use crate::types::Direction;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

/// Samples a mating population of the same size as the input.
pub trait SelectionOperator {
    /// Returns an N×M matrix of rows drawn from `population`.
    fn select<R: Rng + ?Sized>(
        &self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
        direction: Direction,
        rng: &mut R,
    ) -> Result<Array2<f64>>;
}

/// Picks the individuals carried unchanged into the next generation.
pub trait ElitismOperator {
    /// Returns the elite rows, best first.
    fn elites(
        &self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
        direction: Direction,
    ) -> Result<Array2<f64>>;
}

/// Recombines part of a mating pool.
pub trait CrossoverOperator {
    /// Returns only the recombined rows; the count is even and never
    /// exceeds the pool size.
    fn crossover<R: Rng + ?Sized>(
        &self,
        pool: ArrayView2<'_, f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>>;
}

/// Perturbs genes of a population.
pub trait MutationOperator {
    /// Mutates `population` in place.
    fn mutate_in_place<R: Rng + ?Sized>(
        &self,
        population: &mut Array2<f64>,
        rng: &mut R,
    ) -> Result<()>;

    /// Returns a mutated copy, leaving the input untouched.
    fn mutate<R: Rng + ?Sized>(
        &self,
        population: ArrayView2<'_, f64>,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        let mut out = population.to_owned();
        self.mutate_in_place(&mut out, rng)?;
        Ok(out)
    }
}
