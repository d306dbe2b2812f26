//! Physical flux and characteristic speeds of the 1D shallow water equations
//!
//! ```text
//! h_t  + (hu)_x               = 0
//! hu_t + (hu² / h + g h² / 2)_x = 0
//! ```
//!
//! The height entering the velocity and the hydrostatic pressure is clamped
//! from below (`h_c = max(h_min, h)`) so that nearly dry cells do not blow up
//! `u = hu / h`. The celerity `c = sqrt(g h)` uses the raw height, so the
//! reported wave speed is not inflated by the clamp. The clamp is never
//! written back to the state.

use faer_core::{MatMut, MatRef};
use thiserror::Error;

use crate::{
    problem::Parameters,
    state::{HEIGHT, MOMENTUM},
    SimpleFloat,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstabilityError {
    #[error("negative water height {height:e} in cell {cell}")]
    NegativeHeight { cell: usize, height: f64 },
    #[error("non-finite wave speed in cell {cell}")]
    NonFiniteWaveSpeed { cell: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShallowWater<F> {
    gravity: F,
    min_height: F,
}

impl<F: SimpleFloat> ShallowWater<F> {
    pub fn new(gravity: F, min_height: F) -> Self {
        Self {
            gravity,
            min_height,
        }
    }

    pub fn from_parameters(parameters: &Parameters<F>) -> Self {
        Self::new(parameters.gravity, parameters.min_height)
    }

    #[inline]
    fn clamp(&self, h: F) -> F {
        self.min_height.max(h)
    }

    /// `[hu, hu u + g h_c² / 2]`
    #[inline]
    pub fn physical_flux(&self, h: F, hu: F) -> [F; 2] {
        let h = self.clamp(h);
        let u = hu / h;
        [hu, hu * u + F::from_f64(0.5) * self.gravity * h * h]
    }

    /// `[u + c, u - c]`, or `None` when the raw height is negative or NaN.
    #[inline]
    pub fn eigenvalues(&self, h: F, hu: F) -> Option<[F; 2]> {
        if !(h >= F::zero()) {
            return None;
        }
        let c = (self.gravity * h).sqrt();
        let u = hu / self.clamp(h);
        Some([u + c, u - c])
    }

    /// Writes the physical flux of every row of `q` (columns `h`, `hu`) into `fq`
    /// and returns the largest characteristic speed magnitude over all rows.
    pub fn evaluate(&self, q: MatRef<F>, mut fq: MatMut<F>) -> Result<F, InstabilityError> {
        assert_eq!(q.nrows(), fq.nrows());
        assert!(q.ncols() == 2 && fq.ncols() == 2);

        let mut max_speed = F::zero();
        for cell in 0..q.nrows() {
            let (h, hu) = (q.read(cell, HEIGHT), q.read(cell, MOMENTUM));

            let [l1, l2] = self
                .eigenvalues(h, hu)
                .ok_or(InstabilityError::NegativeHeight {
                    cell,
                    height: h.into(),
                })?;
            let speed = l1.abs().max(l2.abs());
            if !speed.is_finite() {
                return Err(InstabilityError::NonFiniteWaveSpeed { cell });
            }
            max_speed = max_speed.max(speed);

            let [fh, fhu] = self.physical_flux(h, hu);
            fq.write(cell, HEIGHT, fh);
            fq.write(cell, MOMENTUM, fhu);
        }

        Ok(max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{DEFAULT_MIN_HEIGHT, GRAVITY};
    use faer_core::Mat;

    fn law() -> ShallowWater<f64> {
        ShallowWater::new(GRAVITY, DEFAULT_MIN_HEIGHT)
    }

    #[test]
    fn lake_at_rest_has_only_pressure_flux() {
        let [fh, fhu] = law().physical_flux(2.0, 0.0);
        assert_eq!(fh, 0.0);
        assert!((fhu - 0.5 * GRAVITY * 4.0).abs() < 1e-12);

        let [l1, l2] = law().eigenvalues(2.0, 0.0).unwrap();
        let c = (GRAVITY * 2.0).sqrt();
        assert!((l1 - c).abs() < 1e-12);
        assert!((l2 + c).abs() < 1e-12);
    }

    #[test]
    fn moving_water() {
        let (h, hu) = (1.5, 3.0);
        let [fh, fhu] = law().physical_flux(h, hu);
        assert_eq!(fh, 3.0);
        assert!((fhu - (3.0 * 2.0 + 0.5 * GRAVITY * 2.25)).abs() < 1e-12);

        let [l1, l2] = law().eigenvalues(h, hu).unwrap();
        let c = (GRAVITY * h).sqrt();
        assert!((l1 - (2.0 + c)).abs() < 1e-12);
        assert!((l2 - (2.0 - c)).abs() < 1e-12);
    }

    #[test]
    fn clamp_affects_velocity_but_not_celerity() {
        let (h, hu) = (0.1, 0.2);
        let [fh, fhu] = law().physical_flux(h, hu);
        assert_eq!(fh, hu);
        // u = 0.2 / 0.5, pressure from the clamped height
        assert!((fhu - (0.2 * 0.4 + 0.5 * GRAVITY * 0.25)).abs() < 1e-12);

        let [l1, _] = law().eigenvalues(h, hu).unwrap();
        assert!((l1 - (0.4 + (GRAVITY * 0.1).sqrt())).abs() < 1e-12);
    }

    #[test]
    fn dry_cell_is_fine() {
        let [l1, l2] = law().eigenvalues(0.0, 0.0).unwrap();
        assert_eq!(l1, 0.0);
        assert_eq!(l2, 0.0);
    }

    #[test]
    fn evaluate_returns_max_speed() {
        let q = Mat::from_fn(3, 2, |i, j| match (i, j) {
            (0, 0) => 1.0,
            (1, 0) => 2.0,
            (2, 0) => 0.5,
            (1, 1) => -4.0,
            _ => 0.0,
        });
        let mut fq = Mat::from_fn(3, 2, |_, _| 0.0);

        let max_speed = law().evaluate(q.as_ref(), fq.as_mut()).unwrap();
        let expected = 2.0 + (GRAVITY * 2.0).sqrt();
        assert!((max_speed - expected).abs() < 1e-12);
        assert_eq!(fq.as_ref().read(1, 0), -4.0);
        assert!((fq.as_ref().read(2, 1) - 0.5 * GRAVITY * 0.25).abs() < 1e-12);
    }

    #[test]
    fn negative_height_is_reported() {
        let q = Mat::from_fn(4, 2, |i, j| if j == 0 && i == 2 { -1e-3 } else { 1.0 });
        let mut fq = Mat::from_fn(4, 2, |_, _| 0.0);

        let err = law().evaluate(q.as_ref(), fq.as_mut()).unwrap_err();
        assert_eq!(
            err,
            InstabilityError::NegativeHeight {
                cell: 2,
                height: -1e-3
            }
        );
    }

    #[test]
    fn nan_height_is_reported() {
        let q = Mat::from_fn(2, 2, |i, j| if j == 0 && i == 0 { f64::NAN } else { 1.0 });
        let mut fq = Mat::from_fn(2, 2, |_, _| 0.0);
        assert!(matches!(
            law().evaluate(q.as_ref(), fq.as_mut()),
            Err(InstabilityError::NegativeHeight { cell: 0, .. })
        ));
    }
}
