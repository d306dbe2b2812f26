use std::io::Write;

use faer_core::MatRef;
use thiserror::Error;

use crate::{
    flux::InstabilityError,
    mesh::Grid,
    method::{Buffers, Method},
    problem::{ConfigError, Problem},
    sim::Simulation,
    snapshot,
    state::{State, HEIGHT, MOMENTUM},
    timestep::TimeStepController,
    SimpleFloat,
};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("output error")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("scheme became unstable at step {step} (t = {time:e})")]
    Unstable {
        step: usize,
        time: f64,
        #[source]
        source: InstabilityError,
    },
}

pub struct ObsCtx<'pb, 'ctx, F: SimpleFloat> {
    // Meta
    problem: &'ctx Problem<'pb, F>,
    grid: &'ctx Grid<F>,
    method: &'ctx dyn Method<F>,

    // Iteration info
    iter: usize,
    time: F,
    dt: F,
    state: MatRef<'ctx, F>, // current solution *with* ghost cells
}

impl<'pb, 'ctx, F: SimpleFloat> ObsCtx<'pb, 'ctx, F> {
    pub fn problem(&self) -> &Problem<'pb, F> {
        self.problem
    }

    pub fn grid(&self) -> &Grid<F> {
        self.grid
    }

    pub fn method(&self) -> &dyn Method<F> {
        self.method
    }

    pub fn iter(&self) -> usize {
        self.iter
    }

    pub fn time(&self) -> F {
        self.time
    }

    /// Size of the step that led to [`ObsCtx::time`], zero at startup.
    pub fn dt(&self) -> F {
        self.dt
    }

    pub fn state(&self) -> MatRef<'_, F> {
        self.state
    }

    pub fn solution(&self) -> MatRef<'_, F> {
        self.state.subrows(1, self.grid.cells)
    }
}

#[allow(unused_variables)]
pub trait Observer<F: SimpleFloat> {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        Ok(())
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct Outcome<F: SimpleFloat> {
    pub state: State<F>,
    pub time: F,
    pub steps: usize,
    /// Steps whose wave speed fell below the CFL floor.
    pub floored_steps: usize,
}

pub struct Driver<'pb, 'd, F: SimpleFloat, M> {
    pub(crate) sim: Simulation<'pb, F, M>,
    pub(crate) observers: Vec<Box<dyn Observer<F> + 'd>>,
    pub(crate) time_sampling: Option<usize>,
}

impl<'pb, 'd, F: SimpleFloat, M: Method<F>> Driver<'pb, 'd, F, M> {
    pub fn new(sim: Simulation<'pb, F, M>) -> Self {
        Self {
            sim,
            observers: Vec::new(),
            time_sampling: None,
        }
    }

    /// Notify observers every `steps` steps on top of startup and cleanup.
    pub fn with_time_sampling(mut self, steps: usize) -> Self {
        self.time_sampling = Some(steps.max(1));
        self
    }

    pub fn with_observer(mut self, observer: impl Observer<F> + 'd) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn run(&mut self) -> Result<Outcome<F>, SimError> {
        let Simulation {
            problem,
            grid,
            method,
        } = &mut self.sim;
        let problem: &Problem<'pb, F> = problem;
        let grid: &Grid<F> = grid;

        let n = grid.cells;
        let dx = grid.delta;
        let end = problem.parameters.end_time;
        let controller = TimeStepController::new(problem.parameters.cfl);

        // physical fluxes of q[1..] and q[..n + 1]
        let mut plus = Buffers::<F, 2>::new(n + 1);
        let mut minus = Buffers::<F, 2>::new(n + 1);
        method.init(n);

        let mut state = State::initial(problem, grid);
        let mut time = F::zero();
        let mut iter = 0;
        let mut floored_steps = 0;

        for o in self.observers.iter_mut() {
            o.at_startup(ObsCtx {
                problem,
                grid,
                method: &*method,
                iter,
                time,
                dt: F::zero(),
                state: state.padded(),
            })?;
        }

        while time < end {
            state.apply_boundary(problem.boundary());

            let q = state.padded();
            let speed_plus = problem
                .law()
                .evaluate(q.subrows(1, n + 1), plus.view_mut())
                .map_err(unstable(iter, time))?;
            let speed_minus = problem
                .law()
                .evaluate(q.subrows(0, n + 1), minus.view_mut())
                .map_err(unstable(iter, time))?;
            let max_speed = speed_plus.max(speed_minus);

            let step = controller.next(dx, max_speed, time, end);
            if step.floored {
                floored_steps += 1;
                tracing::event!(
                    tracing::Level::WARN,
                    "problem `{}`: wave speed {:e} at t={:e} below CFL floor",
                    problem.name,
                    max_speed,
                    time
                );
            }
            time = if step.reaches_end {
                end
            } else {
                time + step.dt
            };
            let ratio = step.dt / dx;

            method.apply(q, plus.view(), minus.view(), ratio);
            state.update(method.fluxes(), ratio);
            iter += 1;

            tracing::event!(
                tracing::Level::TRACE,
                "problem `{}`: step {} t={:e} dt={:e} max|λ|={:e}",
                problem.name,
                iter,
                time,
                step.dt,
                max_speed
            );

            // the last step is reported by `at_cleanup`
            let sampled = matches!(self.time_sampling, Some(k) if iter % k == 0);
            if sampled && time < end {
                for o in self.observers.iter_mut() {
                    o.at_each_iteration(ObsCtx {
                        problem,
                        grid,
                        method: &*method,
                        iter,
                        time,
                        dt: step.dt,
                        state: state.padded(),
                    })?;
                }
            }
        }

        for o in self.observers.iter_mut() {
            o.at_cleanup(ObsCtx {
                problem,
                grid,
                method: &*method,
                iter,
                time,
                dt: F::zero(),
                state: state.padded(),
            })?;
        }

        Ok(Outcome {
            state,
            time,
            steps: iter,
            floored_steps,
        })
    }
}

fn unstable<F: SimpleFloat>(step: usize, time: F) -> impl Fn(InstabilityError) -> SimError {
    move |source| {
        tracing::event!(
            tracing::Level::ERROR,
            "step {} at t={:e} aborted: {}",
            step,
            time,
            source
        );
        SimError::Unstable {
            step,
            time: time.into(),
            source,
        }
    }
}

pub struct Logger;

impl<F: SimpleFloat> Observer<F> for Logger {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::INFO,
            "start of simulation of problem `{}` (`{}` method, `{}` boundaries, Δx={:e} ({} cells), t_end={:e}, CFL={})",
            ctx.problem().name,
            ctx.method().name(),
            ctx.problem().boundary().name(),
            ctx.grid().delta,
            ctx.grid().cells,
            ctx.problem().parameters.end_time,
            ctx.problem().parameters.cfl,
        );
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::DEBUG,
            "problem `{}`: step {} t={:e} dt={:e}",
            ctx.problem().name,
            ctx.iter(),
            ctx.time(),
            ctx.dt()
        );
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::INFO,
            "finished simulation of problem `{}` at t={:.5} after {} steps",
            ctx.problem().name,
            ctx.time(),
            ctx.iter()
        );
        Ok(())
    }
}

/// Writes `(h, hu)` snapshot records at startup, at every sampled step and at cleanup.
pub struct SnapshotWriter<W> {
    output: W,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    fn checkpoint<F: SimpleFloat>(&mut self, ctx: &ObsCtx<F>) -> Result<(), SimError> {
        let parameters = &ctx.problem().parameters;
        let q = ctx.state();
        for j in [HEIGHT, MOMENTUM] {
            let values: Vec<f64> = (0..q.nrows()).map(|i| q.read(i, j).into()).collect();
            snapshot::write_record(
                &mut self.output,
                ctx.time().into(),
                parameters.cfl.into(),
                parameters.gravity.into(),
                &values,
            )?;
        }
        Ok(())
    }
}

impl<F: SimpleFloat, W: Write> Observer<F> for SnapshotWriter<W> {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        self.checkpoint(&ctx)
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        self.checkpoint(&ctx)
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        self.checkpoint(&ctx)?;
        self.output.flush().map_err(SimError::from)
    }
}

/// Writes the final `x h hu` table of the interior cells, for plotting.
pub struct ProfileWriter<W> {
    output: W,
}

impl<W: Write> ProfileWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }
}

impl<F: SimpleFloat, W: Write> Observer<F> for ProfileWriter<W> {
    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        let time: f64 = ctx.time().into();
        writeln!(self.output, "# water height h and momentum hu (t={:.5})", time)?;
        writeln!(self.output, "# x h hu")?;

        let u = ctx.solution();
        for (i, x) in ctx.grid().centers().enumerate() {
            let (x, h, hu): (f64, f64, f64) =
                (x.into(), u.read(i, HEIGHT).into(), u.read(i, MOMENTUM).into());
            writeln!(self.output, "{:+.8e} {:+.8e} {:+.8e}", x, h, hu)?;
        }

        self.output.flush().map_err(SimError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parameters, Problem, SnapshotSeries};

    #[derive(Default)]
    struct Recorder {
        events: Vec<(&'static str, usize, f64)>,
    }

    impl Observer<f64> for &mut Recorder {
        fn at_startup(&mut self, ctx: ObsCtx<f64>) -> Result<(), SimError> {
            self.events.push(("startup", ctx.iter(), ctx.time()));
            Ok(())
        }

        fn at_each_iteration(&mut self, ctx: ObsCtx<f64>) -> Result<(), SimError> {
            self.events.push(("iteration", ctx.iter(), ctx.time()));
            Ok(())
        }

        fn at_cleanup(&mut self, ctx: ObsCtx<f64>) -> Result<(), SimError> {
            self.events.push(("cleanup", ctx.iter(), ctx.time()));
            Ok(())
        }
    }

    fn simulation(cells: usize) -> Simulation<'static, f64, crate::methods::LaxFriedrichs<f64>> {
        Simulation::new(Problem::two_gaussians(Parameters::new(cells, 1.0, 0.045))).unwrap()
    }

    #[test]
    fn run_reaches_end_time() {
        let outcome = Driver::new(simulation(100)).run().unwrap();
        assert_eq!(outcome.time, 0.045);
        assert!(outcome.steps > 1);
        assert_eq!(outcome.floored_steps, 0);
    }

    #[test]
    fn observers_see_startup_samples_and_cleanup() {
        let mut recorder = Recorder::default();
        let outcome = Driver::new(simulation(50))
            .with_time_sampling(2)
            .with_observer(&mut recorder)
            .run()
            .unwrap();

        let events = &recorder.events;
        assert_eq!(events.first(), Some(&("startup", 0, 0.0)));
        assert_eq!(events.last(), Some(&("cleanup", outcome.steps, 0.045)));
        for (kind, iter, time) in &events[1..events.len() - 1] {
            assert_eq!(*kind, "iteration");
            assert_eq!(iter % 2, 0);
            assert!(*time < 0.045);
        }
    }

    #[test]
    fn zero_end_time_only_reports_initial_state() {
        let sim = Simulation::new(Problem::two_gaussians(Parameters::new(10, 1.0, 0.0))).unwrap();
        let outcome = Driver::new(sim).run().unwrap();
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.time, 0.0);
    }

    #[test]
    fn snapshot_writer_produces_readable_series() {
        let mut bytes = Vec::<u8>::new();
        Driver::new(simulation(20))
            .with_observer(SnapshotWriter::new(&mut bytes))
            .run()
            .unwrap();

        let series = SnapshotSeries::from_bytes(&bytes).unwrap();
        assert_eq!(series.cells(), 20);
        assert_eq!(series.records().len(), 4);
        assert_eq!(series.records()[0].time, 0.0);
        assert_eq!(series.final_time(), 0.045);
        // ghost cells are zero before the first boundary application
        assert_eq!(series.records()[0].values[0], 0.0);
        assert!(series.records().iter().all(|r| r.cfl == 0.99));
    }

    #[test]
    fn profile_writer_labels_time() {
        let mut text = Vec::<u8>::new();
        Driver::new(simulation(10))
            .with_observer(ProfileWriter::new(&mut text))
            .run()
            .unwrap();

        let text = String::from_utf8(text).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("# water height h and momentum hu (t=0.04500)")
        );
        assert_eq!(lines.next(), Some("# x h hu"));
        assert_eq!(lines.count(), 10);
    }

    #[test]
    fn dry_bed_steps_straight_to_the_end() {
        let parameters = Parameters::new(8, 1.0, 0.045);
        let problem = Problem::new("dry", parameters, crate::Neumann, |_: f64, _: f64| {
            [0.0, 0.0]
        });
        let outcome = Driver::new(Simulation::new(problem).unwrap()).run().unwrap();

        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.floored_steps, 1);
        assert_eq!(outcome.time, 0.045);
        assert!(outcome.state.height().iter().all(|&h| h == 0.0));
    }
}
