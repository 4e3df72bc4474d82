//! Reduction of a statistic series to one scalar.
//!
//! Two policies exist and must stay separate: a float mean rounded to two
//! decimals, and a truncating integer mean for status code totals. An empty
//! series reduces to [`Reduced::NoData`] under both.

use ucdn_core::{ExporterError, Result};

pub const DECIMAL_PLACES: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reduced {
    Value(f64),
    NoData,
}

/// Round half away from zero to `places` decimal digits.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `round(sum / count, 2)`.
pub fn mean_rounded<I>(metric: &str, values: I) -> Result<Reduced>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return Ok(Reduced::NoData);
    }

    let rounded = round_to(sum / count as f64, DECIMAL_PLACES);
    if !rounded.is_finite() {
        return Err(ExporterError::NonFinite {
            metric: metric.to_string(),
        });
    }

    Ok(Reduced::Value(rounded))
}

/// `sum / count` with integer division, so `11 / 3` is `3`.
pub fn integer_mean<I>(metric: &str, values: I) -> Result<Reduced>
where
    I: IntoIterator<Item = u64>,
{
    let mut sum = 0u64;
    let mut count = 0u64;
    for v in values {
        sum = sum.checked_add(v).ok_or_else(|| ExporterError::Overflow {
            metric: metric.to_string(),
        })?;
        count += 1;
    }

    if count == 0 {
        return Ok(Reduced::NoData);
    }

    Ok(Reduced::Value((sum / count) as f64))
}

/// Values aggregated upstream are emitted untouched.
pub fn pass_through(metric: &str, value: f64) -> Result<Reduced> {
    if !value.is_finite() {
        return Err(ExporterError::NonFinite {
            metric: metric.to_string(),
        });
    }
    Ok(Reduced::Value(value))
}
