//! Sampling frequency of a time index
//!
//! Inference looks for one calendar step shared by every gap in the index:
//! whole years, month-end anchored months, calendar months, then exact
//! durations. When no single step exists the resolver falls back to the last
//! observed gap, or to one day for indexes with fewer than two timestamps,
//! unless strict mode is on.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 604_800;

/// A calendar offset between consecutive observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Frequency {
    Years(u32),
    Months(u32),
    /// Months anchored on the last day of the month
    MonthEnd(u32),
    Weeks(u32),
    Days(u32),
    Hours(u32),
    Minutes(u32),
    Seconds(u32),
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Days(1)
    }
}

/// How a [`Frequency`] was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FrequencySource {
    /// Every gap in the index agreed on one step
    Inferred,
    /// Gaps disagreed; the last gap was used
    LastGap,
    /// Fewer than two timestamps; one day was assumed
    Default,
}

/// Result of resolving the step of a time index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrequencyResolution {
    pub frequency: Frequency,
    pub source: FrequencySource,
}

impl FrequencyResolution {
    /// True when the step is a guess rather than a property of the whole index
    pub fn is_fallback(&self) -> bool {
        self.source != FrequencySource::Inferred
    }
}

fn month_index(ts: &NaiveDateTime) -> i64 {
    ts.year() as i64 * 12 + ts.month0() as i64
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// The single positive value shared by every element, if there is one
fn common_step(steps: &[i64]) -> Option<u32> {
    let first = *steps.first()?;
    if first <= 0 || steps.iter().any(|&s| s != first) {
        return None;
    }
    u32::try_from(first).ok()
}

impl Frequency {
    /// Express an exact gap in the coarsest unit that divides it
    pub fn from_duration(gap: Duration) -> Option<Self> {
        let secs = gap.num_seconds();
        if secs <= 0 {
            return None;
        }
        let (unit, ctor): (i64, fn(u32) -> Frequency) = if secs % SECONDS_PER_WEEK == 0 {
            (SECONDS_PER_WEEK, Frequency::Weeks)
        } else if secs % SECONDS_PER_DAY == 0 {
            (SECONDS_PER_DAY, Frequency::Days)
        } else if secs % SECONDS_PER_HOUR == 0 {
            (SECONDS_PER_HOUR, Frequency::Hours)
        } else if secs % SECONDS_PER_MINUTE == 0 {
            (SECONDS_PER_MINUTE, Frequency::Minutes)
        } else {
            (1, Frequency::Seconds)
        };
        u32::try_from(secs / unit).ok().map(ctor)
    }

    /// Infer a single consistent step; `None` for irregular or too short indexes
    pub fn infer(index: &[NaiveDateTime]) -> Option<Self> {
        if index.len() < 2 {
            return None;
        }
        let first = index[0];

        let same_time = index.iter().all(|ts| ts.time() == first.time());
        let month_steps: Vec<i64> = index
            .windows(2)
            .map(|w| month_index(&w[1]) - month_index(&w[0]))
            .collect();

        if same_time
            && index
                .iter()
                .all(|ts| ts.month() == first.month() && ts.day() == first.day())
        {
            let year_steps: Vec<i64> = index
                .windows(2)
                .map(|w| (w[1].year() - w[0].year()) as i64)
                .collect();
            if let Some(step) = common_step(&year_steps) {
                return Some(Frequency::Years(step));
            }
        }

        if same_time && index.iter().all(|ts| is_month_end(ts.date())) {
            if let Some(step) = common_step(&month_steps) {
                return Some(Frequency::MonthEnd(step));
            }
        }

        if same_time && index.iter().all(|ts| ts.day() == first.day()) {
            if let Some(step) = common_step(&month_steps) {
                return Some(Frequency::Months(step));
            }
        }

        let gaps: Vec<i64> = index
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds())
            .collect();
        common_step(&gaps).and_then(|secs| Frequency::from_duration(Duration::seconds(secs as i64)))
    }

    /// Resolve the step of an index, falling back unless `strict` is set
    pub fn resolve(index: &[NaiveDateTime], strict: bool) -> Result<FrequencyResolution> {
        if let Some(frequency) = Self::infer(index) {
            debug!(%frequency, "inferred frequency");
            return Ok(FrequencyResolution {
                frequency,
                source: FrequencySource::Inferred,
            });
        }

        if strict {
            return Err(ForecastError::IrregularFrequency(if index.len() < 2 {
                format!("need at least 2 timestamps, got {}", index.len())
            } else {
                "gaps between timestamps are not all equal".to_string()
            }));
        }

        let last_gap = index
            .windows(2)
            .last()
            .and_then(|w| Frequency::from_duration(w[1] - w[0]));

        let resolution = match last_gap {
            Some(frequency) => FrequencyResolution {
                frequency,
                source: FrequencySource::LastGap,
            },
            None => FrequencyResolution {
                frequency: Frequency::default(),
                source: FrequencySource::Default,
            },
        };
        warn!(
            frequency = %resolution.frequency,
            source = ?resolution.source,
            "no consistent frequency, using fallback"
        );
        Ok(resolution)
    }

    /// Move `ts` by `periods` steps (negative moves backwards)
    pub fn shift(&self, ts: NaiveDateTime, periods: i64) -> Result<NaiveDateTime> {
        let out_of_range =
            || ForecastError::TimestampOutOfRange(format!("{} shifted by {} x {}", ts, periods, self));

        let shift_months = |months: i64| -> Option<NaiveDateTime> {
            let amount = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            if months >= 0 {
                ts.checked_add_months(amount)
            } else {
                ts.checked_sub_months(amount)
            }
        };

        let shifted = match *self {
            Frequency::Years(n) => (n as i64)
                .checked_mul(12)
                .and_then(|m| m.checked_mul(periods))
                .and_then(shift_months),
            Frequency::Months(n) => (n as i64).checked_mul(periods).and_then(shift_months),
            Frequency::MonthEnd(n) => (n as i64)
                .checked_mul(periods)
                .and_then(shift_months)
                .and_then(|moved| {
                    last_day_of_month(moved.date()).map(|date| date.and_time(ts.time()))
                }),
            _ => self
                .seconds()
                .and_then(|secs| secs.checked_mul(periods))
                .and_then(Duration::try_seconds)
                .and_then(|delta| ts.checked_add_signed(delta)),
        };

        shifted.ok_or_else(out_of_range)
    }

    /// The `horizon` timestamps that follow `last`
    pub fn future_timestamps(&self, last: NaiveDateTime, horizon: usize) -> Result<Vec<NaiveDateTime>> {
        (1..=horizon as i64).map(|k| self.shift(last, k)).collect()
    }

    /// Length in seconds for fixed-duration steps; `None` for calendar steps
    pub fn seconds(&self) -> Option<i64> {
        match *self {
            Frequency::Weeks(n) => Some(n as i64 * SECONDS_PER_WEEK),
            Frequency::Days(n) => Some(n as i64 * SECONDS_PER_DAY),
            Frequency::Hours(n) => Some(n as i64 * SECONDS_PER_HOUR),
            Frequency::Minutes(n) => Some(n as i64 * SECONDS_PER_MINUTE),
            Frequency::Seconds(n) => Some(n as i64),
            Frequency::Years(_) | Frequency::Months(_) | Frequency::MonthEnd(_) => None,
        }
    }

    /// Multiplier of the base unit
    pub fn multiple(&self) -> u32 {
        match *self {
            Frequency::Years(n)
            | Frequency::Months(n)
            | Frequency::MonthEnd(n)
            | Frequency::Weeks(n)
            | Frequency::Days(n)
            | Frequency::Hours(n)
            | Frequency::Minutes(n)
            | Frequency::Seconds(n) => n,
        }
    }

    /// Human label of the base unit, e.g. "annual" or "daily"
    pub fn label(&self) -> &'static str {
        match *self {
            Frequency::Years(_) => "annual",
            Frequency::Months(3) => "quarterly",
            Frequency::Months(_) => "monthly",
            Frequency::MonthEnd(_) => "month-end",
            Frequency::Weeks(_) => "weekly",
            Frequency::Days(_) => "daily",
            Frequency::Hours(_) => "hourly",
            Frequency::Minutes(_) => "minutely",
            Frequency::Seconds(_) => "secondly",
        }
    }

    /// pandas-style offset alias, e.g. "YS", "2MS" or "D"
    pub fn alias(&self) -> String {
        let (multiple, base) = match *self {
            Frequency::Years(n) => (n, "YS"),
            Frequency::Months(3) => (1, "QS"),
            Frequency::Months(n) => (n, "MS"),
            Frequency::MonthEnd(n) => (n, "ME"),
            Frequency::Weeks(n) => (n, "W"),
            Frequency::Days(n) => (n, "D"),
            Frequency::Hours(n) => (n, "h"),
            Frequency::Minutes(n) => (n, "min"),
            Frequency::Seconds(n) => (n, "s"),
        };
        if multiple == 1 {
            base.to_string()
        } else {
            format!("{}{}", multiple, base)
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (*self, self.multiple()) {
            (Frequency::Months(3), _) | (_, 1) => write!(f, "{} ({})", self.label(), self.alias()),
            (_, n) => {
                let unit = match *self {
                    Frequency::Years(_) => "years",
                    Frequency::Months(_) => "months",
                    Frequency::MonthEnd(_) => "month-ends",
                    Frequency::Weeks(_) => "weeks",
                    Frequency::Days(_) => "days",
                    Frequency::Hours(_) => "hours",
                    Frequency::Minutes(_) => "minutes",
                    Frequency::Seconds(_) => "seconds",
                };
                write!(f, "every {} {} ({})", n, unit, self.alias())
            }
        }
    }
}
