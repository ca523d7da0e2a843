//! Genetic Algorithm over a normalized real-valued population.
//!
//! One generation is a fixed pipeline of pluggable stages:
//! roulette selection, top-k elitism, arithmetic crossover and polynomial
//! mutation (see [`crate::operators`]). The next population is the
//! row-wise concatenation `[elites; crossed; mutated]`, whose sizes always
//! add up to the population size.
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population size, rates, direction)
//! - [`GaEngine`]: Runs single generations or a whole optimization
//! - [`GaResult`]: Final population and best individual
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Deb & Goyal (1996), "A Combined Genetic Adaptive Search (GeneAS) for
//!   Engineering Design"

mod config;
mod runner;

pub use config::GaConfig;
pub use runner::{GaEngine, GaResult, GenerationStats};
