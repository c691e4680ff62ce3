//! Time series data handling for forecasting
//!
//! Loading happens in two steps. An adapter ([`DataLoader`]) turns a CSV file,
//! reader or polars `DataFrame` into a [`RawTable`] of strings. Validation
//! ([`TimeSeries::from_table`]) then picks the first two columns as
//! (time, value), parses the time column with one fixed format and rejects
//! anything it cannot trust. Validation performs no I/O.

use crate::error::{ForecastError, Result};
use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{NaiveDateTime, NaiveTime};
use polars::prelude::{DataFrame, DataType};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Tabular input as read from the source, every cell kept as text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a table from a header row and data rows
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Convenience constructor for string literals
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    /// Column names
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns declared by the header
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Data loader for tabular time series sources
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a raw table from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<RawTable> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading csv");
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::read_records(reader)
    }

    /// Load a raw table from any CSV byte stream with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<RawTable> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self::read_records(reader)
    }

    /// Create a raw table from an existing DataFrame
    ///
    /// Every column is cast to text; nulls become empty cells so that the
    /// validator reports them instead of silently dropping rows.
    pub fn from_dataframe(df: &DataFrame) -> Result<RawTable> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut columns: Vec<Vec<String>> = Vec::with_capacity(df.width());
        for series in df.get_columns() {
            let text = series.cast(&DataType::Utf8)?;
            let cells = text
                .utf8()?
                .into_iter()
                .map(|cell| cell.unwrap_or_default().to_string())
                .collect();
            columns.push(cells);
        }

        let rows = (0..df.height())
            .map(|i| columns.iter().map(|col| col[i].clone()).collect())
            .collect();

        Ok(RawTable::new(headers, rows))
    }

    fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<RawTable> {
        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.to_string()).collect());
        }
        Ok(RawTable::new(headers, rows))
    }
}

/// Parse a timestamp with a strftime-style format.
///
/// Formats that stop short of a full date (`%Y`, `%Y-%m`) resolve to the
/// start of the period. Missing minutes and seconds are zero, and a missing
/// time of day resolves to midnight.
pub fn parse_timestamp(raw: &str, format_str: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut parsed = Parsed::new();
    format::parse(&mut parsed, raw, StrftimeItems::new(format_str)).ok()?;

    let date = match parsed.to_naive_date() {
        Ok(date) => date,
        Err(_) => {
            // Fields already present keep their value; only absent ones are filled
            let _ = parsed.set_month(1);
            let _ = parsed.set_day(1);
            parsed.to_naive_date().ok()?
        }
    };
    // An hour without minutes or seconds keeps the hour; no hour at all is midnight
    let _ = parsed.set_minute(0);
    let _ = parsed.set_second(0);
    let time = parsed.to_naive_time().unwrap_or_else(|_| NaiveTime::default());

    Some(NaiveDateTime::new(date, time))
}

fn parse_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("na") || raw.eq_ignore_ascii_case("null") {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validated univariate series with a strictly increasing time index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
    time_column: String,
    value_column: String,
}

impl TimeSeries {
    /// Create a series from already ordered timestamps and values
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::MalformedInput(format!(
                "Index length ({}) doesn't match value length ({})",
                timestamps.len(),
                values.len()
            )));
        }
        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(ForecastError::DuplicateTimestamp {
                    timestamp: pair[1].to_string(),
                    first_row: i + 1,
                    second_row: i + 2,
                });
            }
            if pair[0] > pair[1] {
                return Err(ForecastError::MalformedInput(format!(
                    "Timestamps must be strictly increasing: {} follows {}",
                    pair[1], pair[0]
                )));
            }
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::MalformedInput(format!(
                "Missing or non-finite value at position {}",
                pos + 1
            )));
        }

        Ok(Self {
            timestamps,
            values,
            time_column: "time".to_string(),
            value_column: "value".to_string(),
        })
    }

    /// Validate a raw table into a series.
    ///
    /// The first column is the time column, the second the value column; any
    /// further columns are ignored. Row numbers in errors are 1-based and
    /// count data rows only.
    pub fn from_table(table: &RawTable, time_format: &str) -> Result<Self> {
        if table.column_count() < 2 {
            return Err(ForecastError::MalformedInput(format!(
                "Input must contain at least 2 columns, found {}",
                table.column_count()
            )));
        }

        let mut timestamps = Vec::with_capacity(table.len());
        for (i, row) in table.rows().iter().enumerate() {
            let raw = row.first().map(String::as_str).unwrap_or_default();
            let ts = parse_timestamp(raw, time_format).ok_or_else(|| {
                ForecastError::InvalidTimestamp {
                    row: i + 1,
                    value: raw.to_string(),
                    format: time_format.to_string(),
                }
            })?;
            timestamps.push(ts);
        }

        let mut seen: HashMap<NaiveDateTime, usize> = HashMap::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            if let Some(first) = seen.insert(*ts, i + 1) {
                return Err(ForecastError::DuplicateTimestamp {
                    timestamp: table.rows()[i][0].clone(),
                    first_row: first,
                    second_row: i + 1,
                });
            }
        }

        let mut values = Vec::with_capacity(table.len());
        for (i, row) in table.rows().iter().enumerate() {
            let raw = row.get(1).map(String::as_str).unwrap_or_default();
            let value = parse_value(raw).ok_or_else(|| {
                ForecastError::MalformedInput(format!(
                    "Missing or non-numeric value '{}' in row {} of column '{}'",
                    raw,
                    i + 1,
                    table.headers()[1]
                ))
            })?;
            values.push(value);
        }

        let mut pairs: Vec<(NaiveDateTime, f64)> = timestamps.into_iter().zip(values).collect();
        pairs.sort_by_key(|(ts, _)| *ts);
        let (timestamps, values) = pairs.into_iter().unzip();

        debug!(rows = table.len(), "validated time series");
        Ok(Self {
            timestamps,
            values,
            time_column: table.headers()[0].clone(),
            value_column: table.headers()[1].clone(),
        })
    }

    /// Get the timestamps
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Get the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Name of the source time column
    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    /// Name of the source value column
    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// First timestamp of the index
    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    /// Last timestamp of the index
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// Check if the time series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the length of the time series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// A series needs at least two observations to be forecast
    pub fn is_forecast_eligible(&self) -> bool {
        self.len() >= 2
    }

    /// Get a slice of the data from start to end index
    pub fn slice(&self, start: usize, end: Option<usize>) -> Result<Self> {
        let end = end.unwrap_or(self.len());
        if start > end || end > self.len() {
            return Err(ForecastError::MalformedInput(format!(
                "Slice {}..{} is outside a series of length {}",
                start,
                end,
                self.len()
            )));
        }

        Ok(Self {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            time_column: self.time_column.clone(),
            value_column: self.value_column.clone(),
        })
    }

    /// Calculate the mean of the values
    pub fn mean(&self) -> Result<f64> {
        Ok(series_math::stats::mean(&self.values)?)
    }

    /// Calculate the sample standard deviation of the values
    pub fn std_dev(&self) -> Result<f64> {
        Ok(series_math::stats::variance(&self.values)?.sqrt())
    }
}
