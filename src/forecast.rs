//! Series forecasting around an opaque model.
//!
//! The model sees only the min-max normalized history and answers in the same
//! normalized space; [`forecast_series`] maps its answer back to price units
//! with the history's own min and max.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{EngineError, Result};
use crate::vector_math::{denormalize, min_max, normalize};

pub trait ForecastModel {
    fn name(&self) -> &str;

    /// Predict future values from a normalized history.
    fn predict(&self, normalized: &[f64]) -> Result<Vec<f64>>;
}

/// Extends the average step of the most recent points. A stand-in for a
/// trained sequence model.
#[derive(Debug, Clone, Copy)]
pub struct TrendExtrapolation {
    pub horizon: usize,
    pub lookback: usize,
}

impl TrendExtrapolation {
    pub fn new(horizon: usize, lookback: usize) -> Self {
        TrendExtrapolation { horizon, lookback }
    }
}

impl ForecastModel for TrendExtrapolation {
    fn name(&self) -> &str {
        "trend-extrapolation"
    }

    fn predict(&self, normalized: &[f64]) -> Result<Vec<f64>> {
        if self.horizon == 0 || self.lookback == 0 {
            return Err(EngineError::InvalidParameter(
                "horizon and lookback must be at least 1".into(),
            ));
        }
        if normalized.len() < 2 {
            return Err(EngineError::InsufficientData(format!(
                "need at least 2 points, got {}",
                normalized.len()
            )));
        }

        let window = &normalized[normalized.len().saturating_sub(self.lookback + 1)..];
        let step = (window[window.len() - 1] - window[0]) / (window.len() - 1) as f64;
        let last = normalized[normalized.len() - 1];

        Ok((1..=self.horizon).map(|i| last + step * i as f64).collect())
    }
}

/// Normalize `values`, run the model and denormalize its prediction.
pub fn forecast_series(values: &[f64], model: &dyn ForecastModel) -> Result<Vec<f64>> {
    let (min, max) = min_max(values).ok_or_else(|| EngineError::InsufficientData("empty series".into()))?;
    let normalized = normalize(values)?;
    let predicted = model.predict(&normalized)?;

    log::debug!("{} produced {} forecast points", model.name(), predicted.len());
    Ok(denormalize(&predicted, min, max))
}

/// Attach first-of-month dates to consecutive values, starting at `start`'s month.
pub fn label_monthly(start: NaiveDate, values: &[f64]) -> Vec<(NaiveDate, f64)> {
    let first = start.with_day0(0).unwrap_or(start);
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| first.checked_add_months(Months::new(i as u32)).map(|d| (d, *v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_history_continues_the_line() {
        let history = [100.0, 110.0, 120.0, 130.0, 140.0];
        let out = forecast_series(&history, &TrendExtrapolation::new(3, 4)).unwrap();
        let expected = [150.0, 160.0, 170.0];
        for (a, b) in out.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
        }
    }

    #[test]
    fn lookback_limits_the_window() {
        // Only the last step (130 -> 100) is visible with lookback 1
        let history = [100.0, 110.0, 120.0, 130.0, 100.0];
        let out = forecast_series(&history, &TrendExtrapolation::new(1, 1)).unwrap();
        assert!((out[0] - 70.0).abs() < 1e-9);
    }

    #[test]
    fn flat_history_cannot_be_normalized() {
        let err = forecast_series(&[5.0, 5.0, 5.0], &TrendExtrapolation::new(2, 2));
        assert!(matches!(err, Err(EngineError::DegenerateRange)));
    }

    #[test]
    fn model_rejects_zero_horizon_and_short_history() {
        assert!(matches!(
            TrendExtrapolation::new(0, 3).predict(&[0.0, 1.0]),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(matches!(
            TrendExtrapolation::new(2, 3).predict(&[0.5]),
            Err(EngineError::InsufficientData(_))
        ));
    }

    #[test]
    fn monthly_labels_start_on_the_first() {
        let start = NaiveDate::from_ymd_opt(2023, 7, 14).unwrap();
        let labelled = label_monthly(start, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(labelled[0].0, NaiveDate::from_ymd_opt(2023, 7, 1).unwrap());
        assert_eq!(labelled[5].0, NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
        assert_eq!(labelled[5].1, 6.0);
    }
}
