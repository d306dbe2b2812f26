use faer_core::{zipped, MatMut, MatRef};

use crate::{method::Buffers, method::Method, SimpleFloat};

/// Lax-Friedrichs interface fluxes
///
/// `r[i] = 0.5 * ((fq_plus[i] + fq_minus[i]) - (q[i + 1] - q[i]) / ratio)`
///
/// The first term is the centered average of the neighbouring physical fluxes, the
/// second the dissipation proportional to the jump across the interface.
pub fn lax_friedrichs_flux<F: SimpleFloat>(
    q: MatRef<F>,
    fq_plus: MatRef<F>,
    fq_minus: MatRef<F>,
    ratio: F,
    r: MatMut<F>,
) {
    let n = r.nrows();
    assert_eq!(q.nrows(), n + 1);
    assert!(fq_plus.nrows() == n && fq_minus.nrows() == n);

    let half = F::from_f64(0.5);
    let inv_ratio = F::one() / ratio;

    zipped!(r, q.subrows(1, n), q.subrows(0, n), fq_plus, fq_minus).for_each(
        |mut r, qp, qm, fqp, fqm| {
            r.write(half * ((fqp.read() + fqm.read()) - inv_ratio * (qp.read() - qm.read())))
        },
    )
}

pub struct LaxFriedrichs<F: SimpleFloat> {
    buf: Buffers<F, 2>,
}

impl<F: SimpleFloat> Default for LaxFriedrichs<F> {
    fn default() -> Self {
        Self {
            buf: Buffers::default(),
        }
    }
}

impl<F: SimpleFloat> Method<F> for LaxFriedrichs<F> {
    fn init(&mut self, cells: usize) {
        self.buf.resize(cells + 1);
    }

    fn apply(&mut self, q: MatRef<F>, fq_plus: MatRef<F>, fq_minus: MatRef<F>, ratio: F) {
        lax_friedrichs_flux(q, fq_plus, fq_minus, ratio, self.buf.view_mut())
    }

    fn fluxes(&self) -> MatRef<'_, F> {
        self.buf.view()
    }

    fn name(&self) -> &'static str {
        "Lax-Friedrichs"
    }
}
