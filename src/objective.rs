//! The objective collaborator boundary.

use crate::error::{Error, Result};
use crate::types::ensure_population;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// An optimization problem evaluated over a whole population at once.
///
/// Engines hand over genes normalized to `[0, 1]`; the implementation maps
/// them onto its own bounds (see [`denormalize`]). Every engine calls
/// [`evaluate`](Objective::evaluate) exactly once per iteration.
///
/// # Implementing
///
/// ```
/// use ndarray::{Array1, ArrayView2};
/// use u_swarm::{denormalize, Objective};
///
/// struct Parabola;
///
/// impl Objective for Parabola {
///     fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
///         let (lower, upper) = self.bounds();
///         let x = denormalize(population, lower.view(), upper.view()).unwrap();
///         x.rows().into_iter().map(|r| r.dot(&r)).collect()
///     }
///
///     fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
///         (Array1::from_elem(2, -1.0), Array1::from_elem(2, 1.0))
///     }
/// }
/// ```
pub trait Objective {
    /// Maps an N×M population to N fitness values.
    fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64>;

    /// Lower and upper bounds of every variable.
    fn bounds(&self) -> (Array1<f64>, Array1<f64>);
}

impl<O: Objective + ?Sized> Objective for &O {
    fn evaluate(&self, population: ArrayView2<'_, f64>) -> Array1<f64> {
        (**self).evaluate(population)
    }

    fn bounds(&self) -> (Array1<f64>, Array1<f64>) {
        (**self).bounds()
    }
}

/// Rescales normalized genes onto `[lower, upper]` column-wise.
pub fn denormalize(
    population: ArrayView2<'_, f64>,
    lower: ArrayView1<'_, f64>,
    upper: ArrayView1<'_, f64>,
) -> Result<Array2<f64>> {
    let m = population.ncols();
    for len in [lower.len(), upper.len()] {
        if len != m {
            return Err(Error::ShapeMismatch {
                context: "denormalize bounds",
                expected: m,
                actual: len,
            });
        }
    }
    let span = &upper - &lower;
    Ok(&population * &span.insert_axis(Axis(0)) + &lower.insert_axis(Axis(0)))
}

/// Evaluates and checks that one fitness value came back per individual.
pub(crate) fn evaluate_checked<O: Objective + ?Sized>(
    objective: &O,
    population: ArrayView2<'_, f64>,
) -> Result<Array1<f64>> {
    ensure_population(population)?;
    let fitness = objective.evaluate(population);
    if fitness.len() != population.nrows() {
        return Err(Error::ShapeMismatch {
            context: "objective output",
            expected: population.nrows(),
            actual: fitness.len(),
        });
    }
    Ok(fitness)
}
