//! Hybrid PSO-GA.
//!
//! A particle swarm whose inertia term is the previous displacement
//! `X − Xm1` rather than an explicit velocity, followed by a GA-style
//! polynomial mutation of every particle after the archive refresh.
//!
//! # References
//!
//! - Deb & Padhye (2010), "Development of Efficient Particle Swarm
//!   Optimizers by Using Concepts from Evolutionary Algorithms"

mod config;
mod runner;

pub use config::HybridConfig;
pub use runner::{HybridEngine, HybridResult, HybridState, HybridStats};
