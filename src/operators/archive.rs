//! Best-archive maintenance and ring-neighborhood search shared by the
//! swarm engines.

use crate::error::Result;
use crate::types::{ensure_fitness, ensure_same_shape, Direction};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Replaces archive rows wherever the new fitness is strictly better.
///
/// Returns the number of rows that improved. Archive values never regress.
pub fn update_archive(
    position: ArrayView2<'_, f64>,
    fitness: ArrayView1<'_, f64>,
    archive: &mut Array2<f64>,
    archive_fitness: &mut Array1<f64>,
    direction: Direction,
) -> Result<usize> {
    ensure_fitness(position, fitness, "archive update fitness")?;
    ensure_same_shape(position, archive.view(), "archive update position")?;
    ensure_fitness(archive.view(), archive_fitness.view(), "archive fitness")?;

    let mut improved = 0;
    for (i, &y) in fitness.iter().enumerate() {
        if direction.is_better(y, archive_fitness[i]) {
            archive_fitness[i] = y;
            archive.row_mut(i).assign(&position.row(i));
            improved += 1;
        }
    }
    Ok(improved)
}

/// Index of the best archived individual inside each ring window.
///
/// The window of individual `i` covers `i − half_width ..= i + half_width`
/// with wraparound and always contains `i`. Windows are scanned from the
/// lowest offset upward and ties keep the earliest scanned index.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use u_swarm::operators::ring_best_indices;
/// use u_swarm::Direction;
///
/// let y = array![5.0, 1.0, 4.0, 3.0, 2.0];
/// assert_eq!(
///     ring_best_indices(y.view(), 1, Direction::Minimize),
///     vec![1, 1, 1, 4, 4]
/// );
/// ```
pub fn ring_best_indices(
    fitness: ArrayView1<'_, f64>,
    half_width: usize,
    direction: Direction,
) -> Vec<usize> {
    let n = fitness.len();
    if n == 0 {
        return Vec::new();
    }
    let reach = half_width.min(n);
    (0..n)
        .map(|i| {
            let mut best = (i + n * reach - reach) % n;
            for offset in 1..=2 * reach {
                let idx = (i + n * reach - reach + offset) % n;
                if direction.is_better(fitness[idx], fitness[best]) {
                    best = idx;
                }
            }
            best
        })
        .collect()
}
