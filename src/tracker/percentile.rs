use crate::error::{AppError, Result};

/// Position of `value` within `[min, max]`, 0.0 at `min` and 1.0 at `max`.
pub fn norm(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min)
}

/// Inverse of `norm`: a 0..1 fraction back onto `[min, max]`.
pub fn lerp(norm: f64, min: f64, max: f64) -> f64 {
    (max - min) * norm + min
}

/// Linearly re-map `value` from `[src_min, src_max]` onto `[dst_min, dst_max]`.
/// Either range may be reversed. Not clamped.
pub fn map_range(value: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    lerp(norm(value, src_min, src_max), dst_min, dst_max)
}

/// Distance of the last price from the 24h high, 0 at the high and 100 at the low.
///
/// Rounds half to even. Prices outside `[low, high]` give values outside 0..=100.
/// A flat range (`high == low`) has no defined position and is an error.
pub fn distance_from_high(last: f64, low: f64, high: f64) -> Result<i64> {
    if high == low {
        return Err(AppError::DegenerateRange(high));
    }
    Ok(map_range(last, low, high, 100.0, 0.0).round_ties_even() as i64)
}
