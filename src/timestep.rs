use crate::SimpleFloat;

/// Smallest wave speed the CFL condition divides by.
pub const MIN_WAVE_SPEED: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep<F> {
    pub dt: F,
    /// The step was clipped so that it lands on the end time.
    pub reaches_end: bool,
    /// The wave speed was below [`MIN_WAVE_SPEED`] and got floored.
    pub floored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStepController<F> {
    cfl: F,
    min_wave_speed: F,
}

impl<F: SimpleFloat> TimeStepController<F> {
    pub fn new(cfl: F) -> Self {
        Self {
            cfl,
            min_wave_speed: F::from_f64(MIN_WAVE_SPEED),
        }
    }

    /// `dt = cfl * dx / max_speed`, clipped to `end - elapsed`.
    pub fn next(&self, dx: F, max_speed: F, elapsed: F, end: F) -> TimeStep<F> {
        let floored = !(max_speed >= self.min_wave_speed);
        let speed = if floored { self.min_wave_speed } else { max_speed };

        let dt = self.cfl * dx / speed;
        if elapsed + dt >= end {
            TimeStep {
                dt: end - elapsed,
                reaches_end: true,
                floored,
            }
        } else {
            TimeStep {
                dt,
                reaches_end: false,
                floored,
            }
        }
    }
}
