//! Particle Swarm Optimization.
//!
//! Each iteration evaluates the swarm, refreshes the personal-best archive
//! wherever a particle strictly improved, computes new velocities with a
//! [`VelocityUpdate`] strategy and moves every particle by its velocity.
//!
//! # Velocity strategies
//!
//! - [`GlobalBest`]: attraction to the swarm-wide best
//! - [`RingTopology`]: attraction to the best of a circular neighborhood
//! - [`ConstrictionRing`]: ring neighborhood with Clerc's constriction factor
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"
//! - Clerc & Kennedy (2002), "The Particle Swarm: Explosion, Stability, and
//!   Convergence in a Multidimensional Complex Space"

mod config;
mod runner;
mod velocity;

pub use config::PsoConfig;
pub use runner::{IterationStats, PsoEngine, PsoResult, Swarm};
pub use velocity::{
    integrate_position, ConstrictionRing, GlobalBest, RingTopology, VelocityUpdate,
    CLERC_ACCELERATION, CLERC_INERTIA,
};
pub(crate) use velocity::Pull;
