use chrono::{DateTime, Utc};
use domain::ValuationPoint;
use thiserror::Error;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("valuation at index {index} is not a finite number ({value})")]
    NonFiniteValue { index: usize, value: f64 },
}

/// Portfolio valuations in USD, ordered oldest first.
///
/// Built from timestamped points, the series is sorted by timestamp so the order the
/// caller supplied never matters. The elapsed span between the oldest and newest
/// observation is kept alongside the values for annualized statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValuationSeries {
    values: Vec<f64>,
    span_days: f64,
    first_timestamp: Option<DateTime<Utc>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl ValuationSeries {
    pub fn from_points<I>(points: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = ValuationPoint>,
    {
        let mut points: Vec<ValuationPoint> = points.into_iter().collect();
        check_finite(points.iter().map(|p| p.total_value_usd))?;
        // stable: equal timestamps keep caller order
        points.sort_by_key(|p| p.timestamp);

        let first_timestamp = points.first().map(|p| p.timestamp);
        let last_timestamp = points.last().map(|p| p.timestamp);
        let span_days = match (first_timestamp, last_timestamp) {
            (Some(first), Some(last)) => (last - first).num_seconds() as f64 / SECONDS_PER_DAY,
            _ => 0.0,
        };

        Ok(Self {
            values: points.into_iter().map(|p| p.total_value_usd).collect(),
            span_days,
            first_timestamp,
            last_timestamp,
        })
    }

    /// Values already ordered oldest first, covering `span_days` elapsed days.
    pub fn from_values(values: Vec<f64>, span_days: f64) -> Result<Self, SeriesError> {
        check_finite(values.iter().copied())?;
        Ok(Self {
            values,
            span_days: if span_days.is_finite() { span_days.max(0.0) } else { 0.0 },
            first_timestamp: None,
            last_timestamp: None,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn span_days(&self) -> f64 {
        self.span_days
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.first_timestamp
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }
}

fn check_finite(values: impl Iterator<Item = f64>) -> Result<(), SeriesError> {
    for (index, value) in values.enumerate() {
        if !value.is_finite() {
            return Err(SeriesError::NonFiniteValue { index, value });
        }
    }
    Ok(())
}
