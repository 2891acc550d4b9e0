//! Low-level numeric primitives shared by the forecasting and search code.

use crate::error::{EngineError, Result};

/// Smallest and largest value of a series, or `None` when it is empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some((min, max))
}

/// Min-max scale a series onto [0, 1].
///
/// A constant (or empty) series has no range to scale over and is reported as
/// `DegenerateRange` instead of producing NaN.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>> {
    let (min, max) = min_max(values).ok_or(EngineError::DegenerateRange)?;
    let span = max - min;
    if span == 0.0 {
        return Err(EngineError::DegenerateRange);
    }
    Ok(values.iter().map(|v| (v - min) / span).collect())
}

/// Inverse of [`normalize`] given the original series' min and max.
pub fn denormalize(values: &[f64], min: f64, max: f64) -> Vec<f64> {
    values.iter().map(|v| v * (max - min) + min).collect()
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |m, x| m.max(x.abs()))
}

/// Dot product over the product of magnitudes, clamped into [-1, 1].
///
/// Both vectors are first divided by their largest absolute component, so the
/// sums of squares stay within [1, len] whatever the input magnitude.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(EngineError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    if a.iter().chain(b).any(|x| !x.is_finite()) {
        return Err(EngineError::InvalidParameter(
            "vector components must be finite".into(),
        ));
    }

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return Err(EngineError::ZeroVector);
    }

    let mut dot = 0.0;
    let mut mag_a = 0.0;
    let mut mag_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    Ok((dot / (mag_a.sqrt() * mag_b.sqrt())).clamp(-1.0, 1.0))
}

/// Largest peak-to-trough decline of a value series, as a fraction of the peak.
pub fn max_drawdown(series: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &v in series {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            worst = worst.max((peak - v) / peak);
        }
    }
    worst
}
