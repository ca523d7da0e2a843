//! Analytical test functions implementing [`Objective`].
//!
//! These are collaborators for tests, benchmarks and examples; the engines
//! never depend on them. All take normalized genes and map them onto their
//! [`Objective::bounds`] with [`denormalize`]; a population whose width
//! differs from `dim` evaluates to NaN.
//!
//! | Function | Bounds | Minimum (normalized) |
//! |----------|--------|----------------------|
//! | [`Sphere`] | `[-1, 1]^M` | `0.5` in every gene |
//! | [`Rosenbrock`] | `[-3, 3]^M` | `2/3` in every gene |
//! | [`Rastrigin`] | `[-5, 5]^M` | `0.5` in every gene |
//! | [`Branin`] | `[-5, 10] × [0, 15]` | three global minima, f ≈ 0.398 |

use crate::objective::{denormalize, Objective};
use ndarray::{Array1, Array2, ArrayView2};
use std::f64::consts::PI;

/// Maps `population` into the objective's own box; a width that disagrees
/// with the bounds yields `None`.
fn to_domain<O: Objective + ?Sized>(
    objective: &O,
    population: ArrayView2<'_, f64>,
) -> Option<Array2<f64>> {
    let (lower, upper) = objective.bounds();
    denormalize(population, lower.view(), upper.view()).ok()
}

/// `f(x) = Σ x_i²` on `[-1, 1]^M`.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    /// Number of variables.
    pub dim: usize,
}

impl Objective for Sphere {
    fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
        let Some(x) = to_domain(self, population) else {
            return Array1::from_elem(population.nrows(), f64::NAN);
        };
        x.rows().into_iter().map(|r| r.dot(&r)).collect()
    }

    fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
        (Array1::from_elem(self.dim, -1.0), Array1::from_elem(self.dim, 1.0))
    }
}

/// Chained Rosenbrock valley on `[-3, 3]^M`.
///
/// `f(x) = Σ 100·(x_i² − x_{i+1})² + (1 − x_i)²`, minimum 0 at `x = 1`.
#[derive(Debug, Clone, Copy)]
pub struct Rosenbrock {
    /// Number of variables (at least 2).
    pub dim: usize,
}

impl Objective for Rosenbrock {
    fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
        let Some(x) = to_domain(self, population) else {
            return Array1::from_elem(population.nrows(), f64::NAN);
        };
        x.rows()
            .into_iter()
            .map(|r| {
                r.windows(2)
                    .into_iter()
                    .map(|w| 100.0 * (w[0] * w[0] - w[1]).powi(2) + (1.0 - w[0]).powi(2))
                    .sum::<f64>()
            })
            .collect()
    }

    fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
        (Array1::from_elem(self.dim, -3.0), Array1::from_elem(self.dim, 3.0))
    }
}

/// Rastrigin's multimodal function on `[-5, 5]^M`.
#[derive(Debug, Clone, Copy)]
pub struct Rastrigin {
    /// Number of variables.
    pub dim: usize,
}

impl Objective for Rastrigin {
    fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
        let Some(x) = to_domain(self, population) else {
            return Array1::from_elem(population.nrows(), f64::NAN);
        };
        x.rows()
            .into_iter()
            .map(|r| {
                10.0 * r.len() as f64
                    + r.iter().map(|&v| v * v - 10.0 * (2.0 * PI * v).cos()).sum::<f64>()
            })
            .collect()
    }

    fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
        (Array1::from_elem(self.dim, -5.0), Array1::from_elem(self.dim, 5.0))
    }
}

/// Branin-Hoo function, two variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Branin;

impl Objective for Branin {
    fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
        let Some(x) = to_domain(self, population) else {
            return Array1::from_elem(population.nrows(), f64::NAN);
        };
        let b = 5.1 / (4.0 * PI * PI);
        let c = 5.0 / PI;
        let f = 1.0 / (8.0 * PI);
        x.rows()
            .into_iter()
            .map(|r| {
                let (x1, x2) = (r[0], r[1]);
                (x2 - b * x1 * x1 + c * x1 - 6.0).powi(2) + 10.0 * (1.0 - f) * x1.cos() + 10.0
            })
            .collect()
    }

    fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
        (Array1::from(vec![-5.0, 0.0]), Array1::from(vec![10.0, 15.0]))
    }
}

/// Turns a nonnegative minimization objective into a maximization fitness
/// in `(0, 1]` suitable for roulette selection.
///
/// `g(x) = exp(−β · f(x) / max f)` over the evaluated population, so the
/// best individual scores close to 1 and the worst `e^{−β}`.
#[derive(Debug, Clone, Copy)]
pub struct ExpScaled<O> {
    /// The wrapped minimization objective.
    pub inner: O,
    /// Sharpness; larger values increase selection pressure.
    pub beta: f64,
}

impl<O> ExpScaled<O> {
    /// Wraps `inner` with the usual `β = 8`.
    pub fn new(inner: O) -> Self {
        Self { inner, beta: 8.0 }
    }
}

impl<O: Objective> Objective for ExpScaled<O> {
    fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
        let y = self.inner.evaluate(population);
        let y_max = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if y_max <= 0.0 || !y_max.is_finite() {
            return Array1::ones(y.len());
        }
        let factor = -self.beta / y_max;
        y.mapv(|v| (factor * v).exp())
    }

    fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
        self.inner.bounds()
    }
}
