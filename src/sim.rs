use std::fmt;

use crate::{
    mesh::Grid,
    method::Method,
    methods,
    problem::{ConfigError, Problem},
    SimpleFloat,
};

#[derive(Debug)]
pub struct Simulation<'pb, F: SimpleFloat, M> {
    pub(crate) problem: Problem<'pb, F>,
    pub(crate) grid: Grid<F>,
    pub(crate) method: M,
}

impl<'pb, F: SimpleFloat> Simulation<'pb, F, methods::LaxFriedrichs<F>> {
    /// Validates the problem parameters and builds its grid.
    pub fn new(problem: Problem<'pb, F>) -> Result<Self, ConfigError> {
        problem.parameters.validate()?;
        let grid = Grid::new(problem.parameters.length, problem.parameters.cells)?;

        Ok(Self {
            problem,
            grid,
            method: methods::LaxFriedrichs::default(),
        })
    }
}

impl<'pb, F: SimpleFloat, M: Method<F>> Simulation<'pb, F, M> {
    pub fn with_method<N: Method<F> + Default>(self) -> Simulation<'pb, F, N> {
        Simulation {
            problem: self.problem,
            grid: self.grid,
            method: N::default(),
        }
    }

    pub fn problem(&self) -> &Problem<'pb, F> {
        &self.problem
    }

    pub fn grid(&self) -> &Grid<F> {
        &self.grid
    }

    pub fn method(&self) -> &M {
        &self.method
    }
}

impl<F: SimpleFloat, M: Method<F>> fmt::Display for Simulation<'_, F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation of `{}` problem:\n\t- `{}` method, `{}` boundaries\n\t- Δx = {:e} ({} cells)\n\t- t_end = {:e}, CFL = {}",
            self.problem.name,
            self.method.name(),
            self.problem.bc.name(),
            self.grid.delta,
            self.grid.cells,
            self.problem.parameters.end_time,
            self.problem.parameters.cfl,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parameters, Periodic};

    #[test]
    fn builds_grid_from_parameters() {
        let sim = Simulation::new(Problem::two_gaussians(Parameters::<f64>::new(50, 2.0, 0.045))).unwrap();
        assert_eq!(sim.grid().cells(), 50);
        assert!((sim.grid().delta() - 0.04).abs() < 1e-15);
        assert_eq!(sim.method().name(), "Lax-Friedrichs");
    }

    #[test]
    fn rejects_bad_parameters() {
        let problem = Problem::two_gaussians(Parameters::<f64>::new(0, 1.0, 0.045));
        assert!(matches!(Simulation::new(problem), Err(ConfigError::NoCells)));
    }

    #[test]
    fn display_mentions_setup() {
        let problem =
            Problem::two_gaussians(Parameters::new(10, 1.0, 0.045)).with_boundary(Periodic);
        let text = Simulation::new(problem).unwrap().to_string();
        assert!(text.contains("two_gaussians"));
        assert!(text.contains("Lax-Friedrichs"));
        assert!(text.contains("periodic"));
    }
}
