//! Boolean schedule control.

use ds_core::{Real, SimulationTimeIteration};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// An on/off control backed by a boolean time series.
///
/// The schedule is indexed from hour 0 of `start_day` at `schedule_step` hour
/// resolution and wraps if the simulation runs past its end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OnOffTimeControl {
    schedule: Vec<bool>,
    /// Day of the year (0-based) the first schedule entry applies to.
    start_day: u32,
    schedule_step: Real,
}

impl OnOffTimeControl {
    pub fn new(schedule: Vec<bool>, start_day: u32, schedule_step: Real) -> ControlResult<Self> {
        if schedule.is_empty() {
            return Err(ControlError::EmptySchedule);
        }
        if !(schedule_step > 0.0) {
            return Err(ControlError::InvalidStep {
                step: schedule_step,
            });
        }
        Ok(Self {
            schedule,
            start_day,
            schedule_step,
        })
    }

    /// A control that is always on.
    pub fn always_on() -> Self {
        Self {
            schedule: vec![true],
            start_day: 0,
            schedule_step: 1.0,
        }
    }

    fn entry_idx(&self, it: &SimulationTimeIteration) -> usize {
        let hours_since_start = it.current - self.start_day as Real * 24.0;
        let steps = (hours_since_start / self.schedule_step).floor() as isize;
        steps.rem_euclid(self.schedule.len() as isize) as usize
    }

    pub fn is_on(&self, it: &SimulationTimeIteration) -> bool {
        self.schedule[self.entry_idx(it)]
    }
}
