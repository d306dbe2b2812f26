use std::marker::PhantomData;

use faer_core::{Mat, MatMut, MatRef};

use crate::SimpleFloat;

/// A numerical flux: turns the physical fluxes evaluated on the shifted views of
/// the padded state into one flux per cell interface.
pub trait Method<F: SimpleFloat> {
    /// Prepares scratch space for `cells` interior cells.
    fn init(&mut self, cells: usize);

    /// `q` is the padded state (`n + 2` rows), `fq_plus` and `fq_minus` the physical
    /// fluxes of `q[1..]` and `q[..n + 1]`, `ratio` the mesh ratio `dt / dx`.
    fn apply(&mut self, q: MatRef<F>, fq_plus: MatRef<F>, fq_minus: MatRef<F>, ratio: F);

    /// The `n + 1` interface fluxes computed by the last call to [`Method::apply`].
    fn fluxes(&self) -> MatRef<'_, F>;

    fn name(&self) -> &'static str;
}

/// Column-major scratch storage with `N` columns.
pub struct Buffers<F: SimpleFloat, const N: usize> {
    inner: Mat<F>,
    _marker: PhantomData<[(); N]>,
}

impl<F: SimpleFloat, const N: usize> Buffers<F, N> {
    pub fn new(size: usize) -> Self {
        Self {
            inner: Mat::from_fn(size, N, |_, _| F::zero()),
            _marker: PhantomData,
        }
    }

    pub fn resize(&mut self, size: usize) {
        if self.inner.nrows() != size {
            *self = Self::new(size);
        }
    }

    pub fn view(&self) -> MatRef<'_, F> {
        self.inner.as_ref()
    }

    pub fn view_mut(&mut self) -> MatMut<'_, F> {
        self.inner.as_mut()
    }
}

impl<F: SimpleFloat, const N: usize> Default for Buffers<F, N> {
    fn default() -> Self {
        Self::new(0)
    }
}
