//! Velocity-update strategies and the position integrator.
//!
//! Every strategy follows the same shape
//!
//! ```text
//! V' = χ·(w·V + c1·r1·(XB − X) + c2·r2·(G − X))
//! ```
//!
//! and differs only in the social guide `G` and in which coefficients are
//! fixed: [`GlobalBest`] uses the swarm-wide best with `χ = 1`,
//! [`RingTopology`] uses the best of a circular neighborhood with `χ = 1`,
//! and [`ConstrictionRing`] uses the same neighborhood with `w = 1` and the
//! whole bracket scaled by `χ`. `r1`, `r2` are drawn once per particle and
//! shared across that particle's variables.
//!
//! # References
//!
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Clerc & Kennedy (2002), "The Particle Swarm: Explosion, Stability, and
//!   Convergence in a Multidimensional Complex Space"

use crate::error::{Error, Result};
use crate::operators::ring_best_indices;
use crate::random::row_coefficients;
use crate::types::{ensure_fitness, ensure_same_shape, Direction};
use ndarray::{Array2, ArrayView1, ArrayView2, Zip};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Clerc-Kennedy inertia weight, equal to the constriction factor for
/// `c1 = c2 = 2.05`.
pub const CLERC_INERTIA: f64 = 0.7298;

/// Acceleration coefficient paired with [`CLERC_INERTIA`].
pub const CLERC_ACCELERATION: f64 = 1.49618;

/// Computes the next velocity of every particle.
pub trait VelocityUpdate {
    /// Overwrites `velocity` with `V'`.
    ///
    /// `best_position` and `best_fitness` are the personal-best archive
    /// (XB, YB); neighborhood guides are derived from them under
    /// `direction`.
    fn update<R: Rng + ?Sized>(
        &self,
        position: ArrayView2<'_, f64>,
        best_position: ArrayView2<'_, f64>,
        best_fitness: ArrayView1<'_, f64>,
        velocity: &mut Array2<f64>,
        direction: Direction,
        rng: &mut R,
    ) -> Result<()>;
}

/// Global-best PSO: every particle is pulled toward the swarm-wide best.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalBest {
    /// Inertia weight `w`.
    pub inertia: f64,
    /// Cognitive coefficient `c1`.
    pub cognitive: f64,
    /// Social coefficient `c2`.
    pub social: f64,
}

impl Default for GlobalBest {
    fn default() -> Self {
        Self {
            inertia: CLERC_INERTIA,
            cognitive: CLERC_ACCELERATION,
            social: CLERC_ACCELERATION,
        }
    }
}

impl VelocityUpdate for GlobalBest {
    fn update<R: Rng + ?Sized>(
        &self,
        position: ArrayView2<'_, f64>,
        best_position: ArrayView2<'_, f64>,
        best_fitness: ArrayView1<'_, f64>,
        velocity: &mut Array2<f64>,
        direction: Direction,
        rng: &mut R,
    ) -> Result<()> {
        check_shapes(position, best_position, best_fitness, velocity)?;
        let g = direction
            .best_index(best_fitness)
            .ok_or(Error::EmptyPopulation)?;
        let guides = vec![g; position.nrows()];
        let pull = Pull {
            chi: 1.0,
            inertia: self.inertia,
            cognitive: self.cognitive,
            social: self.social,
        };
        pull.apply(position, best_position, &guides, velocity, rng);
        Ok(())
    }
}

/// Local-best PSO over a ring neighborhood of `half_width` particles on
/// each side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RingTopology {
    /// Inertia weight `w`.
    pub inertia: f64,
    /// Cognitive coefficient `c1`.
    pub cognitive: f64,
    /// Social coefficient `c2`.
    pub social: f64,
    /// Neighbors considered on each side of a particle.
    pub half_width: usize,
}

impl Default for RingTopology {
    fn default() -> Self {
        Self {
            inertia: CLERC_INERTIA,
            cognitive: CLERC_ACCELERATION,
            social: CLERC_ACCELERATION,
            half_width: 1,
        }
    }
}

impl VelocityUpdate for RingTopology {
    fn update<R: Rng + ?Sized>(
        &self,
        position: ArrayView2<'_, f64>,
        best_position: ArrayView2<'_, f64>,
        best_fitness: ArrayView1<'_, f64>,
        velocity: &mut Array2<f64>,
        direction: Direction,
        rng: &mut R,
    ) -> Result<()> {
        check_shapes(position, best_position, best_fitness, velocity)?;
        let guides = ring_best_indices(best_fitness, self.half_width, direction);
        let pull = Pull {
            chi: 1.0,
            inertia: self.inertia,
            cognitive: self.cognitive,
            social: self.social,
        };
        pull.apply(position, best_position, &guides, velocity, rng);
        Ok(())
    }
}

/// Ring-neighborhood PSO with Clerc's constriction factor.
///
/// # Examples
///
/// ```
/// use u_swarm::pso::ConstrictionRing;
///
/// let ring = ConstrictionRing::from_coefficients(2.05, 2.05, 1).unwrap();
/// assert!((ring.chi - 0.7298).abs() < 1e-4);
/// assert!(ConstrictionRing::from_coefficients(2.0, 2.0, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConstrictionRing {
    /// Constriction factor `χ` applied to the whole bracket.
    pub chi: f64,
    /// Cognitive coefficient `c1`.
    pub cognitive: f64,
    /// Social coefficient `c2`.
    pub social: f64,
    /// Neighbors considered on each side of a particle.
    pub half_width: usize,
}

impl ConstrictionRing {
    /// Derives `χ = 2 / |2 − φ − √(φ² − 4φ)|` from `φ = c1 + c2`.
    ///
    /// Requires `φ > 4`.
    pub fn from_coefficients(cognitive: f64, social: f64, half_width: usize) -> Result<Self> {
        let phi = cognitive + social;
        if !(phi.is_finite() && phi > 4.0) {
            return Err(Error::InvalidConfig(format!(
                "constriction requires c1 + c2 > 4, got {phi}"
            )));
        }
        Ok(Self {
            chi: clerc_chi(phi),
            cognitive,
            social,
            half_width,
        })
    }
}

impl Default for ConstrictionRing {
    fn default() -> Self {
        Self {
            chi: clerc_chi(4.1),
            cognitive: 2.05,
            social: 2.05,
            half_width: 1,
        }
    }
}

impl VelocityUpdate for ConstrictionRing {
    fn update<R: Rng + ?Sized>(
        &self,
        position: ArrayView2<'_, f64>,
        best_position: ArrayView2<'_, f64>,
        best_fitness: ArrayView1<'_, f64>,
        velocity: &mut Array2<f64>,
        direction: Direction,
        rng: &mut R,
    ) -> Result<()> {
        check_shapes(position, best_position, best_fitness, velocity)?;
        let guides = ring_best_indices(best_fitness, self.half_width, direction);
        let pull = Pull {
            chi: self.chi,
            inertia: 1.0,
            cognitive: self.cognitive,
            social: self.social,
        };
        pull.apply(position, best_position, &guides, velocity, rng);
        Ok(())
    }
}

/// Explicit Euler step `X' = X + V`.
pub fn integrate_position(position: &mut Array2<f64>, velocity: ArrayView2<'_, f64>) -> Result<()> {
    ensure_same_shape(position.view(), velocity, "position update velocity")?;
    *position += &velocity;
    Ok(())
}

fn clerc_chi(phi: f64) -> f64 {
    2.0 / (2.0 - phi - (phi * phi - 4.0 * phi).sqrt()).abs()
}

fn check_shapes(
    position: ArrayView2<'_, f64>,
    best_position: ArrayView2<'_, f64>,
    best_fitness: ArrayView1<'_, f64>,
    velocity: &Array2<f64>,
) -> Result<()> {
    ensure_same_shape(position, best_position, "personal best position")?;
    ensure_same_shape(position, velocity.view(), "velocity")?;
    ensure_fitness(best_position, best_fitness, "personal best fitness")
}

/// Coefficients of one velocity bracket.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pull {
    pub(crate) chi: f64,
    pub(crate) inertia: f64,
    pub(crate) cognitive: f64,
    pub(crate) social: f64,
}

impl Pull {
    /// `step ← χ·(w·step + c1·r1·(P − X) + c2·r2·(G − X))` row by row, where
    /// `G` is row `guides[i]` of `attractor`.
    ///
    /// Draws all `r1` before all `r2`.
    pub(crate) fn apply<R: Rng + ?Sized>(
        &self,
        position: ArrayView2<'_, f64>,
        attractor: ArrayView2<'_, f64>,
        guides: &[usize],
        step: &mut Array2<f64>,
        rng: &mut R,
    ) {
        let n = position.nrows();
        let r1 = row_coefficients(n, rng);
        let r2 = row_coefficients(n, rng);
        for (i, mut row) in step.rows_mut().into_iter().enumerate() {
            let (a, b) = (self.cognitive * r1[i], self.social * r2[i]);
            Zip::from(&mut row)
                .and(position.row(i))
                .and(attractor.row(i))
                .and(attractor.row(guides[i]))
                .for_each(|v, &x, &p, &g| {
                    *v = self.chi * (self.inertia * *v + a * (p - x) + b * (g - x));
                });
        }
    }
}
