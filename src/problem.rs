use core::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::{bc::BoundaryCondition, flux::ShallowWater, Neumann, SimpleFloat};

/// Courant number used unless overridden.
pub const DEFAULT_CFL: f64 = 0.99;
/// Standard gravity, in m/s².
pub const GRAVITY: f64 = 9.80665;
/// Height below which the flux evaluator clamps `h` for velocity and pressure.
pub const DEFAULT_MIN_HEIGHT: f64 = 0.5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("the grid needs at least one cell")]
    NoCells,
    #[error("domain length must be positive and finite, got {0}")]
    DomainLength(f64),
    #[error("end time must be non-negative and finite, got {0}")]
    EndTime(f64),
    #[error("CFL number must lie in (0, 1), got {0}")]
    Cfl(f64),
    #[error("gravitational acceleration must be positive and finite, got {0}")]
    Gravity(f64),
    #[error("height clamp must be non-negative and finite, got {0}")]
    MinHeight(f64),
}

/// Run parameters of a shallow water simulation.
///
/// `end_time` is stored already scaled by the domain length, i.e. a run
/// configured with `TMAX = 0.045` on a domain of length `2` ends at `t = 0.09`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters<F> {
    pub(crate) cells: usize,
    pub(crate) length: F,
    pub(crate) end_time: F,
    pub(crate) cfl: F,
    pub(crate) gravity: F,
    pub(crate) min_height: F,
}

impl<F: SimpleFloat> Parameters<F> {
    pub fn new(cells: usize, length: F, tmax: F) -> Self {
        Self {
            cells,
            length,
            end_time: tmax * length,
            cfl: F::from_f64(DEFAULT_CFL),
            gravity: F::from_f64(GRAVITY),
            min_height: F::from_f64(DEFAULT_MIN_HEIGHT),
        }
    }

    pub fn with_cfl(mut self, cfl: F) -> Self {
        self.cfl = cfl;
        self
    }

    pub fn with_gravity(mut self, gravity: F) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_min_height(mut self, min_height: F) -> Self {
        self.min_height = min_height;
        self
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn length(&self) -> F {
        self.length
    }

    pub fn end_time(&self) -> F {
        self.end_time
    }

    pub fn cfl(&self) -> F {
        self.cfl
    }

    pub fn gravity(&self) -> F {
        self.gravity
    }

    pub fn min_height(&self) -> F {
        self.min_height
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cells == 0 {
            return Err(ConfigError::NoCells);
        }
        if !(self.length > F::zero()) || !self.length.is_finite() {
            return Err(ConfigError::DomainLength(self.length.into()));
        }
        if !(self.end_time >= F::zero()) || !self.end_time.is_finite() {
            return Err(ConfigError::EndTime(self.end_time.into()));
        }
        if !(self.cfl > F::zero() && self.cfl < F::one()) {
            return Err(ConfigError::Cfl(self.cfl.into()));
        }
        if !(self.gravity > F::zero()) || !self.gravity.is_finite() {
            return Err(ConfigError::Gravity(self.gravity.into()));
        }
        if !(self.min_height >= F::zero()) || !self.min_height.is_finite() {
            return Err(ConfigError::MinHeight(self.min_height.into()));
        }
        Ok(())
    }
}

/// Maps a cell center `x` and the domain length to the pair `[h, hu]`.
pub trait InitialCondition<F: SimpleFloat>: Fn(F, F) -> [F; 2] {}
impl<F: SimpleFloat, T> InitialCondition<F> for T where T: Fn(F, F) -> [F; 2] {}

/// Two Gaussian bumps in height at 40% and 60% of the domain, fluid at rest.
pub fn two_gaussians<F: SimpleFloat>(x: F, length: F) -> [F; 2] {
    // evaluated in f64
    let (x, length): (f64, f64) = (x.into(), length.into());
    let x = x / length;
    let c: f64 = 0.01;
    let bump = |center: f64| {
        let d = 2.0 * (x - center);
        (-(d * d) / (2.0 * c * c)).exp()
    };

    [F::from_f64(0.5 + 0.5 * bump(0.6) + bump(0.4)), F::zero()]
}

#[derive(Clone)]
pub struct Problem<'pb, F: SimpleFloat> {
    pub(crate) name: String,
    pub(crate) parameters: Parameters<F>,
    pub(crate) law: ShallowWater<F>,
    pub(crate) bc: Rc<dyn BoundaryCondition<F> + 'pb>,
    pub(crate) u0: Rc<dyn InitialCondition<F> + 'pb>,
}

impl<'pb, F: SimpleFloat> Problem<'pb, F> {
    pub fn new(
        name: impl AsRef<str>,
        parameters: Parameters<F>,
        bc: impl BoundaryCondition<F> + 'pb,
        u0: impl InitialCondition<F> + 'pb,
    ) -> Self {
        Self {
            name: name.as_ref().to_string(),
            law: ShallowWater::from_parameters(&parameters),
            parameters,
            bc: Rc::new(bc),
            u0: Rc::new(u0),
        }
    }

    /// The dam-free two-bump problem with closed (Neumann) boundaries.
    pub fn two_gaussians(parameters: Parameters<F>) -> Self {
        Self::new("two_gaussians", parameters, Neumann, two_gaussians::<F>)
    }

    pub fn with_boundary(mut self, bc: impl BoundaryCondition<F> + 'pb) -> Self {
        self.bc = Rc::new(bc);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Parameters<F> {
        &self.parameters
    }

    pub fn law(&self) -> &ShallowWater<F> {
        &self.law
    }

    pub fn boundary(&self) -> &dyn BoundaryCondition<F> {
        &*self.bc
    }

    pub fn initial_values(&self, x: F) -> [F; 2] {
        (self.u0)(x, self.parameters.length)
    }
}

impl<F: SimpleFloat> fmt::Debug for Problem<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("law", &self.law)
            .field("bc", &self.bc.name())
            .field("u0", &"<dyn InitialCondition<_>>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_time_is_scaled_by_length() {
        let p = Parameters::<f64>::new(100, 2.0, 0.045);
        assert!((p.end_time() - 0.09).abs() < 1e-15);
    }

    #[test]
    fn defaults_validate() {
        let p = Parameters::<f64>::new(1000, 1.0, 0.045);
        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.cfl(), DEFAULT_CFL);
        assert_eq!(p.gravity(), GRAVITY);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let p = Parameters::<f64>::new(0, 1.0, 0.045);
        assert_eq!(p.validate(), Err(ConfigError::NoCells));

        let p = Parameters::<f64>::new(10, -1.0, 0.045);
        assert!(matches!(p.validate(), Err(ConfigError::DomainLength(_))));

        let p = Parameters::<f64>::new(10, 1.0, -0.1);
        assert!(matches!(p.validate(), Err(ConfigError::EndTime(_))));

        let p = Parameters::<f64>::new(10, 1.0, 0.045).with_cfl(1.0);
        assert!(matches!(p.validate(), Err(ConfigError::Cfl(_))));

        let p = Parameters::<f64>::new(10, 1.0, 0.045).with_gravity(0.0);
        assert!(matches!(p.validate(), Err(ConfigError::Gravity(_))));
    }

    #[test]
    fn two_gaussians_profile() {
        // peaks sit exactly on the bump centers
        let [h, hu] = two_gaussians(0.4_f64, 1.0);
        assert!((h - 1.5).abs() < 1e-12);
        assert_eq!(hu, 0.0);

        let [h, _] = two_gaussians(0.6_f64, 1.0);
        assert!((h - 1.0).abs() < 1e-12);

        // far away from both bumps only the base level remains
        let [h, _] = two_gaussians(0.05_f64, 1.0);
        assert!((h - 0.5).abs() < 1e-12);

        // the profile scales with the domain length
        let [h, _] = two_gaussians(0.8_f64, 2.0);
        assert!((h - 1.5).abs() < 1e-12);
    }
}
