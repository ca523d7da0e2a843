//! Population-based continuous optimization with pluggable operators.
//!
//! Provides three engines for bound-constrained, gradient-free search over
//! real vectors whose genes are normalized to `[0, 1]`:
//!
//! - **Genetic Algorithm (GA)**: roulette selection, top-k elitism,
//!   single-gene arithmetic crossover and polynomial mutation composed into a
//!   size-preserving generational step.
//! - **Particle Swarm Optimization (PSO)**: personal-best archives with
//!   global-best, ring-topology, or constriction-factor velocity updates.
//! - **Hybrid PSO-GA**: displacement-driven swarm motion followed by
//!   polynomial mutation and archive refresh.
//!
//! Every operator is a trait with concrete variants chosen at construction,
//! so any stage of a pipeline can be substituted. Each engine owns a single
//! seedable [`rand::rngs::StdRng`] that is threaded by reference into every
//! operator call; a fixed seed reproduces a run exactly.
//!
//! The objective is an injected collaborator implementing [`Objective`].
//! It receives the whole population matrix once per iteration and is
//! responsible for rescaling genes to the problem bounds.
//!
//! # Architecture
//!
//! The crate contains no domain-specific concepts; problems are defined by
//! consumers through [`Objective`].

pub mod benchmarks;
mod error;
pub mod ga;
pub mod hybrid;
mod objective;
pub mod operators;
pub mod pso;
pub mod random;
mod types;

pub use error::{Error, Result};
pub use objective::{denormalize, Objective};
pub use types::{BoundPolicy, Direction, FitnessVector, Population};
