use std::{
    fmt,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub},
};

use faer_core::{RealField, SimpleEntity};

pub mod bc;
pub mod compare;
pub mod driver;
pub mod flux;
pub mod mesh;
pub mod method;
pub mod methods;
pub mod problem;
pub mod sim;
pub mod snapshot;
pub mod state;
pub mod timestep;

pub use bc::{BoundaryCondition, Neumann, Periodic};
pub use compare::{compare, compare_files, CompareError, ErrorReport};
pub use driver::{Driver, Logger, ObsCtx, Observer, Outcome, ProfileWriter, SimError, SnapshotWriter};
pub use flux::{InstabilityError, ShallowWater};
pub use mesh::Grid;
pub use method::Method;
pub use problem::{two_gaussians, ConfigError, InitialCondition, Parameters, Problem};
pub use sim::Simulation;
pub use snapshot::{SnapshotError, SnapshotSeries};
pub use state::{add_ghost_cells, State};
pub use timestep::{TimeStep, TimeStepController};

/// Real scalar the solver is generic over.
///
/// Arithmetic, `from_f64`, `sqrt`, `abs`, `is_finite`, `zero` and `one` come from faer's
/// [`RealField`].
pub trait SimpleFloat:
    RealField
    + SimpleEntity
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + fmt::LowerExp
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + Into<f64>
{
    /// Larger of the two, `self` when they are unordered.
    #[inline]
    fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }
}

impl<F> SimpleFloat for F where
    F: RealField
        + SimpleEntity
        + PartialOrd
        + fmt::Debug
        + fmt::Display
        + fmt::LowerExp
        + Add<Output = F>
        + Sub<Output = F>
        + Mul<Output = F>
        + Div<Output = F>
        + Neg<Output = F>
        + AddAssign
        + Into<f64>
{
}
