use chrono::{DateTime, TimeDelta, Timelike, Utc};
use std::fmt;

/// A UTC recurrence in the spirit of a cron step field.
///
/// `EveryHours(6)` is `0 */6 * * *`: minute zero of hours 0, 6, 12 and 18.
/// A step of zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    EveryHours(u32),
    EveryMinutes(u32),
}

impl Schedule {
    /// First fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Schedule::EveryHours(step) => {
                let step = step.max(1);
                let mut next = next_boundary(after, 3600);
                // hour 0 always matches, so this stops within a day
                while next.hour() % step != 0 {
                    next += TimeDelta::hours(1);
                }
                next
            }
            Schedule::EveryMinutes(step) => {
                let step = step.max(1);
                let mut next = next_boundary(after, 60);
                while next.minute() % step != 0 {
                    next += TimeDelta::minutes(1);
                }
                next
            }
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::EveryHours(step) => write!(f, "0 */{} * * *", step.max(&1)),
            Schedule::EveryMinutes(step) => write!(f, "*/{} * * * *", step.max(&1)),
        }
    }
}

/// Next multiple of `step_secs` since the epoch, strictly after `after`.
fn next_boundary(after: DateTime<Utc>, step_secs: i64) -> DateTime<Utc> {
    let into_step = after.timestamp().rem_euclid(step_secs);
    let nanos = TimeDelta::nanoseconds(i64::from(after.timestamp_subsec_nanos()));
    after - nanos + TimeDelta::seconds(step_secs - into_step)
}
