//! Setpoint schedule control.

use ds_core::{Real, SimulationTimeIteration};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// A temperature setpoint control backed by an `Option<Real>` time series.
///
/// `None` entries mark hours outside the required (scheduled) period; the
/// control can still report a fallback setback temperature for them via
/// `setpoint_min`/`setpoint_max`, and `advanced_start` pulls the upcoming
/// scheduled setpoint forward so the zone pre-conditions before the period
/// opens.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetpointTimeControl {
    schedule: Vec<Option<Real>>,
    /// Day of the year (0-based) the first schedule entry applies to.
    start_day: u32,
    schedule_step: Real,
    setpoint_min: Option<Real>,
    setpoint_max: Option<Real>,
    /// When both bounds exist and the schedule entry is None, fall back to
    /// the maximum instead of the minimum.
    default_to_max: bool,
    /// Hours before a scheduled period during which its setpoint already
    /// applies.
    advanced_start: Real,
}

impl SetpointTimeControl {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        schedule: Vec<Option<Real>>,
        start_day: u32,
        schedule_step: Real,
        setpoint_min: Option<Real>,
        setpoint_max: Option<Real>,
        default_to_max: bool,
        advanced_start: Real,
    ) -> ControlResult<Self> {
        if schedule.is_empty() {
            return Err(ControlError::EmptySchedule);
        }
        if !(schedule_step > 0.0) {
            return Err(ControlError::InvalidStep {
                step: schedule_step,
            });
        }
        if !(advanced_start >= 0.0) {
            return Err(ControlError::NegativeAdvancedStart {
                hours: advanced_start,
            });
        }
        if let (Some(min), Some(max)) = (setpoint_min, setpoint_max) {
            if min > max {
                return Err(ControlError::MinAboveMax { min, max });
            }
        }
        Ok(Self {
            schedule,
            start_day,
            schedule_step,
            setpoint_min,
            setpoint_max,
            default_to_max,
            advanced_start,
        })
    }

    fn entry_idx(&self, it: &SimulationTimeIteration) -> usize {
        let hours_since_start = it.current - self.start_day as Real * 24.0;
        let steps = (hours_since_start / self.schedule_step).floor() as isize;
        steps.rem_euclid(self.schedule.len() as isize) as usize
    }

    fn entry(&self, it: &SimulationTimeIteration) -> Option<Real> {
        self.schedule[self.entry_idx(it)]
    }

    /// The first scheduled setpoint inside the advanced-start window, when
    /// the current entry itself is unscheduled.
    fn upcoming_entry(&self, it: &SimulationTimeIteration) -> Option<Real> {
        let lookahead = (self.advanced_start / self.schedule_step).ceil() as usize;
        let idx = self.entry_idx(it);
        (1..=lookahead).find_map(|offset| self.schedule[(idx + offset) % self.schedule.len()])
    }

    /// Whether the control demands conditioning this timestep. True whenever
    /// a scheduled setpoint exists (or is about to, within the advanced-start
    /// window), or a setback bound keeps the control active outside the
    /// scheduled period.
    pub fn is_on(&self, it: &SimulationTimeIteration) -> bool {
        self.entry(it).is_some()
            || self.upcoming_entry(it).is_some()
            || self.setpoint_min.is_some()
            || self.setpoint_max.is_some()
    }

    /// Whether this timestep falls in the scheduled (required) period.
    pub fn in_required_period(&self, it: &SimulationTimeIteration) -> bool {
        self.entry(it).is_some()
    }

    /// The setpoint for this timestep, if any. Scheduled values are clamped
    /// to the configured bounds; unscheduled hours take the upcoming value
    /// inside the advanced-start window, then fall back to a bound when one
    /// exists.
    pub fn setpnt(&self, it: &SimulationTimeIteration) -> Option<Real> {
        match self.entry(it).or_else(|| self.upcoming_entry(it)) {
            Some(mut setpnt) => {
                if let Some(min) = self.setpoint_min {
                    setpnt = setpnt.max(min);
                }
                if let Some(max) = self.setpoint_max {
                    setpnt = setpnt.min(max);
                }
                Some(setpnt)
            }
            None => match (self.setpoint_min, self.setpoint_max) {
                (None, None) => None,
                (Some(min), None) => Some(min),
                (None, Some(max)) => Some(max),
                (Some(min), Some(max)) => Some(if self.default_to_max { max } else { min }),
            },
        }
    }
}
