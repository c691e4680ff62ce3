//! Shared axis for history and forecast

use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Periods of padding after the last forecast point
pub const TRAILING_PERIODS: i64 = 2;

/// Historical and forecast timestamps on one monotonic axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTimeline {
    pub history: Vec<NaiveDateTime>,
    pub forecast: Vec<NaiveDateTime>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DisplayTimeline {
    /// Compose the axis; `end` is the last forecast timestamp plus two steps
    pub fn compose(
        history: &[NaiveDateTime],
        forecast: &[NaiveDateTime],
        frequency: Frequency,
    ) -> Result<Self> {
        let start = history
            .first()
            .or_else(|| forecast.first())
            .copied()
            .ok_or_else(|| {
                ForecastError::MalformedInput("Cannot compose an empty timeline".to_string())
            })?;
        let last = forecast
            .last()
            .or_else(|| history.last())
            .copied()
            .unwrap_or(start);

        if let (Some(h), Some(f)) = (history.last(), forecast.first()) {
            if f <= h {
                return Err(ForecastError::MalformedInput(format!(
                    "Forecast starts at {} which is not after the last observation {}",
                    f, h
                )));
            }
        }

        Ok(Self {
            history: history.to_vec(),
            forecast: forecast.to_vec(),
            start,
            end: frequency.shift(last, TRAILING_PERIODS)?,
        })
    }

    /// Every timestamp in order, history first
    pub fn points(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.history.iter().chain(self.forecast.iter())
    }

    /// Check if `ts` falls within the axis bounds
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}
