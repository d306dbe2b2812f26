use crate::{problem::ConfigError, SimpleFloat};

// cell i covers [i * delta, (i + 1) * delta), its center is at (i + 1/2) * delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid<F> {
    pub(crate) length: F,
    pub(crate) cells: usize,
    pub(crate) delta: F,
}

impl<F: SimpleFloat> Grid<F> {
    pub fn new(length: F, cells: usize) -> Result<Self, ConfigError> {
        if cells == 0 {
            return Err(ConfigError::NoCells);
        }
        if !(length > F::zero()) || !length.is_finite() {
            return Err(ConfigError::DomainLength(length.into()));
        }

        Ok(Self {
            length,
            cells,
            delta: length / F::from_f64(cells as f64),
        })
    }

    pub fn length(&self) -> F {
        self.length
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn delta(&self) -> F {
        self.delta
    }

    pub fn center(&self, i: usize) -> F {
        self.delta * (F::from_f64(i as f64) + F::from_f64(0.5))
    }

    pub fn centers(self) -> impl Iterator<Item = F> {
        (0..self.cells).map(move |i| self.center(i))
    }
}
