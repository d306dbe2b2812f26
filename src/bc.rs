use faer_core::{zipped, MatMut, MatRef};
use reborrow::*;

use crate::SimpleFloat;

pub trait BoundaryCondition<F: SimpleFloat> {
    /// Arguments are a partition of the padded state: left ghost rows, interior rows
    /// and right ghost rows. Every column is treated the same way.
    fn apply(&self, left: MatMut<F>, center: MatRef<F>, right: MatMut<F>);

    fn name(&self) -> &'static str;
}

/// Fills the first and last row of `q` from its interior rows.
pub fn apply_with_ghosts<F: SimpleFloat>(bc: &dyn BoundaryCondition<F>, q: MatMut<F>) {
    let nrows = q.nrows();
    assert!(nrows >= 3, "a padded state has at least one interior cell");

    let [left, rest] = q.split_at_row(1);
    let [center, right] = rest.split_at_row(nrows - 2);
    bc.apply(left, center.rb(), right);
}

fn copy_rows<F: SimpleFloat>(dst: MatMut<F>, src: MatRef<F>) {
    zipped!(dst, src).for_each(|mut d, s| d.write(s.read()));
}

/// Zero-gradient boundary: each ghost cell copies its nearest interior cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neumann;

impl<F: SimpleFloat> BoundaryCondition<F> for Neumann {
    fn apply(&self, left: MatMut<F>, center: MatRef<F>, right: MatMut<F>) {
        let (l, r) = (left.nrows(), right.nrows());
        copy_rows(left, center.subrows(0, l));
        copy_rows(right, center.subrows(center.nrows() - r, r));
    }

    fn name(&self) -> &'static str {
        "neumann"
    }
}

/// Wrap-around boundary: each ghost cell copies the interior cell at the opposite edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct Periodic;

impl<F: SimpleFloat> BoundaryCondition<F> for Periodic {
    fn apply(&self, left: MatMut<F>, center: MatRef<F>, right: MatMut<F>) {
        let (l, r) = (left.nrows(), right.nrows());
        copy_rows(left, center.subrows(center.nrows() - l, l));
        copy_rows(right, center.subrows(0, r));
    }

    fn name(&self) -> &'static str {
        "periodic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer_core::Mat;

    fn padded(values: &[[f64; 2]]) -> Mat<f64> {
        Mat::from_fn(values.len() + 2, 2, |i, j| {
            if i == 0 || i == values.len() + 1 {
                -7.0
            } else {
                values[i - 1][j]
            }
        })
    }

    fn rows(q: &Mat<f64>) -> Vec<[f64; 2]> {
        (0..q.nrows())
            .map(|i| [q.as_ref().read(i, 0), q.as_ref().read(i, 1)])
            .collect()
    }

    #[test]
    fn neumann_copies_nearest_interior_cell() {
        let mut q = padded(&[[1.0, -1.0], [2.0, -2.0], [3.0, -3.0]]);
        apply_with_ghosts(&Neumann, q.as_mut());

        assert_eq!(
            rows(&q),
            vec![[1.0, -1.0], [1.0, -1.0], [2.0, -2.0], [3.0, -3.0], [3.0, -3.0]]
        );
    }

    #[test]
    fn neumann_is_idempotent() {
        let mut q = padded(&[[0.5, 0.1], [1.5, 0.2], [0.7, -0.3], [0.9, 0.0]]);
        apply_with_ghosts(&Neumann, q.as_mut());
        let once = rows(&q);
        apply_with_ghosts(&Neumann, q.as_mut());
        assert_eq!(rows(&q), once);
    }

    #[test]
    fn periodic_wraps_around() {
        let mut q = padded(&[[1.0, -1.0], [2.0, -2.0], [3.0, -3.0]]);
        let before = rows(&q);
        apply_with_ghosts(&Periodic, q.as_mut());
        let after = rows(&q);

        let n = 3;
        assert_eq!(after[0], before[n]);
        assert_eq!(after[n + 1], before[1]);
        assert_eq!(&after[1..=n], &before[1..=n]);
    }

    #[test]
    fn single_interior_cell() {
        let mut q = padded(&[[4.0, 2.0]]);
        apply_with_ghosts(&Periodic, q.as_mut());
        assert_eq!(rows(&q), vec![[4.0, 2.0]; 3]);
    }
}
