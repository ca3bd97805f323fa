//! Simulation calendar.
//!
//! A run covers a contiguous span of hours-of-year at a fixed (possibly
//! sub-hourly) step. Every component is queried "as of" the iteration value
//! yielded here; nothing else in the engine keeps its own clock.

use crate::error::CoreError;
use crate::numeric::Real;

pub const HOURS_PER_DAY: usize = 24;
pub const HOURS_PER_YEAR: usize = 8760;

// Cumulative hour-of-year at which each month starts (non-leap year),
// with a trailing sentinel for the end of December.
const MONTH_START_HOURS: [usize; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

/// Immutable bounds of a simulation run, in hours from the start of the year.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTime {
    start: Real,
    end: Real,
    step: Real,
}

impl SimulationTime {
    pub fn new(start: Real, end: Real, step: Real) -> Result<Self, CoreError> {
        if !(start.is_finite() && end.is_finite() && step.is_finite()) {
            return Err(CoreError::InvalidArg {
                what: "simulation time bounds must be finite",
            });
        }
        if step <= 0.0 {
            return Err(CoreError::InvalidArg {
                what: "simulation timestep must be positive",
            });
        }
        if end <= start {
            return Err(CoreError::InvalidArg {
                what: "simulation end must be after start",
            });
        }
        Ok(Self { start, end, step })
    }

    pub fn start(&self) -> Real {
        self.start
    }

    pub fn end(&self) -> Real {
        self.end
    }

    pub fn step(&self) -> Real {
        self.step
    }

    /// Number of timesteps in the run.
    pub fn total_steps(&self) -> usize {
        ((self.end - self.start) / self.step).round() as usize
    }

    /// Timesteps per hour (1 for hourly, 2 for half-hourly, ...).
    pub fn steps_per_hour(&self) -> usize {
        (1.0 / self.step).round() as usize
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator {
            time: *self,
            index: 0,
        }
    }
}

/// One timestep, as yielded by [`SimulationTimeIterator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTimeIteration {
    /// 0-based step index within the run.
    pub index: usize,
    /// Hour-of-year at the start of this step.
    pub current: Real,
    /// Step size in hours.
    pub timestep: Real,
}

impl SimulationTimeIteration {
    /// Whole hour-of-year containing this step.
    pub fn current_hour(&self) -> usize {
        self.current.floor() as usize
    }

    /// Day-of-year containing this step (0-based).
    pub fn current_day(&self) -> usize {
        self.current_hour() / HOURS_PER_DAY
    }

    /// Fractional hour within the day, [0, 24).
    pub fn hour_of_day(&self) -> Real {
        self.current - (self.current_day() * HOURS_PER_DAY) as Real
    }

    /// Index into an external time series recorded at `series_step` hours,
    /// starting at hour 0 of the run's first day.
    pub fn time_series_idx(&self, series_step: Real) -> usize {
        (self.current / series_step).floor() as usize
    }

    /// Calendar month containing this step (0 = January). Runs longer than a
    /// year wrap around.
    pub fn current_month(&self) -> usize {
        let hour = self.current_hour() % HOURS_PER_YEAR;
        MONTH_START_HOURS
            .windows(2)
            .position(|bounds| hour < bounds[1])
            .unwrap_or(11)
    }

    /// (start, end) hours of year spanned by the current month.
    pub fn current_month_start_end_hours(&self) -> (usize, usize) {
        let month = self.current_month();
        (MONTH_START_HOURS[month], MONTH_START_HOURS[month + 1])
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimulationTimeIterator {
    time: SimulationTime,
    index: usize,
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.time.total_steps() {
            return None;
        }
        let item = SimulationTimeIteration {
            index: self.index,
            current: self.time.start + self.index as Real * self.time.step,
            timestep: self.time.step,
        };
        self.index += 1;
        Some(item)
    }
}
