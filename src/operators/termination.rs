//! Termination probes and the driver-side stall policy.
//!
//! [`GenerationCap`] answers "continue?" from an index alone. [`StallProbe`]
//! only reports the current best fitness; the decision is left to the driver,
//! typically via [`StallTracker`].

use crate::error::{Error, Result};
use crate::types::Direction;
use ndarray::ArrayView1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stops once a fixed number of generations has run.
///
/// # Examples
///
/// ```
/// use u_swarm::operators::GenerationCap;
///
/// let cap = GenerationCap::new(200);
/// assert!(cap.should_continue(199));
/// assert!(!cap.should_continue(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationCap {
    /// Number of generations allowed.
    pub max_generations: usize,
}

impl GenerationCap {
    /// Creates a cap of `max_generations`.
    pub fn new(max_generations: usize) -> Self {
        Self { max_generations }
    }

    /// `true` while `generation < max_generations`.
    pub fn should_continue(&self, generation: usize) -> bool {
        generation < self.max_generations
    }
}

/// Reports the best fitness of a generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StallProbe;

impl StallProbe {
    /// Best value of `fitness` under `direction`.
    pub fn probe(&self, fitness: ArrayView1<'_, f64>, direction: Direction) -> Result<f64> {
        direction.best_value(fitness).ok_or(Error::EmptyPopulation)
    }
}

/// Counts consecutive generations whose probed best moved by no more than
/// `tolerance`.
///
/// The first observation only records a baseline. Every later observation
/// compares against the previous one; a change `<= tolerance` extends the
/// stall streak, anything larger resets it.
#[derive(Debug, Clone, PartialEq)]
pub struct StallTracker {
    tolerance: f64,
    limit: usize,
    previous: Option<f64>,
    streak: usize,
}

impl StallTracker {
    /// Tracker that reports a stall after `limit` quiet generations.
    ///
    /// A `limit` of 0 never reports a stall.
    pub fn new(limit: usize, tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            limit,
            previous: None,
            streak: 0,
        }
    }

    /// Records a probed value; returns `true` once the streak reaches the
    /// limit.
    pub fn observe(&mut self, best: f64) -> bool {
        if let Some(prev) = self.previous {
            if (best - prev).abs() <= self.tolerance {
                self.streak += 1;
            } else {
                self.streak = 0;
            }
        }
        self.previous = Some(best);
        self.is_stalled()
    }

    /// Whether the stall limit has been reached.
    pub fn is_stalled(&self) -> bool {
        self.limit > 0 && self.streak >= self.limit
    }

    /// Current number of consecutive quiet generations.
    pub fn streak(&self) -> usize {
        self.streak
    }
}
