use core::fmt;

use faer_core::{zipped, Mat, MatMut, MatRef};

use crate::{
    bc::{apply_with_ghosts, BoundaryCondition},
    mesh::Grid,
    problem::Problem,
    SimpleFloat,
};

pub const HEIGHT: usize = 0;
pub const MOMENTUM: usize = 1;

/// Pads `values` with one zero on each side.
pub fn add_ghost_cells<F: SimpleFloat>(values: &[F]) -> Vec<F> {
    let mut padded = Vec::with_capacity(values.len() + 2);
    padded.push(F::zero());
    padded.extend_from_slice(values);
    padded.push(F::zero());
    padded
}

/// Conserved variables `h` and `hu` on `n + 2` cells, ghost cells included.
///
/// Column [`HEIGHT`] holds `h`, column [`MOMENTUM`] holds `hu`; rows `0` and
/// `n + 1` are ghost cells.
#[derive(Clone)]
pub struct State<F: SimpleFloat> {
    inner: Mat<F>,
}

impl<F: SimpleFloat> fmt::Debug for State<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("h", &self.height())
            .field("hu", &self.momentum())
            .finish()
    }
}

impl<F: SimpleFloat> State<F> {
    pub fn from_interior(h: &[F], hu: &[F]) -> Self {
        assert_eq!(h.len(), hu.len(), "h and hu must cover the same cells");
        assert!(!h.is_empty(), "a state needs at least one interior cell");

        let (h, hu) = (add_ghost_cells(h), add_ghost_cells(hu));
        Self {
            inner: Mat::from_fn(h.len(), 2, |i, j| if j == HEIGHT { h[i] } else { hu[i] }),
        }
    }

    pub fn initial(problem: &Problem<F>, grid: &Grid<F>) -> Self {
        let (h, hu): (Vec<F>, Vec<F>) = grid
            .centers()
            .map(|x| {
                let [h, hu] = problem.initial_values(x);
                (h, hu)
            })
            .unzip();
        Self::from_interior(&h, &hu)
    }

    /// Number of interior cells.
    pub fn cells(&self) -> usize {
        self.inner.nrows() - 2
    }

    pub fn padded(&self) -> MatRef<'_, F> {
        self.inner.as_ref()
    }

    pub fn padded_mut(&mut self) -> MatMut<'_, F> {
        self.inner.as_mut()
    }

    /// Interior rows only.
    pub fn interior(&self) -> MatRef<'_, F> {
        self.inner.as_ref().subrows(1, self.cells())
    }

    pub fn height(&self) -> Vec<F> {
        self.column(HEIGHT)
    }

    pub fn momentum(&self) -> Vec<F> {
        self.column(MOMENTUM)
    }

    fn column(&self, j: usize) -> Vec<F> {
        let q = self.inner.as_ref();
        (0..q.nrows()).map(|i| q.read(i, j)).collect()
    }

    /// Sum of `h` over the interior cells.
    pub fn mass(&self) -> F {
        let q = self.interior();
        let mut sum = F::zero();
        for i in 0..q.nrows() {
            sum += q.read(i, HEIGHT);
        }
        sum
    }

    pub fn apply_boundary(&mut self, bc: &dyn BoundaryCondition<F>) {
        apply_with_ghosts(bc, self.inner.as_mut());
    }

    /// Conservative update of the interior cells from the `n + 1` interface fluxes `r`:
    /// `q[i] -= ratio * (r[i] - r[i - 1])`. Ghost cells are left untouched.
    pub fn update(&mut self, r: MatRef<F>, ratio: F) {
        let n = self.cells();
        assert_eq!(r.nrows(), n + 1);

        zipped!(
            self.inner.as_mut().subrows(1, n),
            r.subrows(1, n),
            r.subrows(0, n)
        )
        .for_each(|mut q, rp, rm| q.write(q.read() - ratio * (rp.read() - rm.read())));
    }
}
