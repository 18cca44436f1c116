//! Monthly read forecasting.
//!
//! [`Forecaster`] is the seam for the prediction model. [`HoltLinear`] is
//! the default implementation: double exponential smoothing with a linear
//! trend.

use chrono::{Months, NaiveDate};
use serde::Serialize;
use tracing::info;

use crate::analyzers::types::MonthlyPoint;

/// Series shorter than this are not forecast.
pub const MIN_FORECAST_POINTS: usize = 6;

/// Default number of months to predict.
pub const DEFAULT_HORIZON: usize = 3;

/// A predicted total for one future month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub predicted: f64,
}

/// Predicts future values of an ordered monthly series.
pub trait Forecaster {
    /// Returns `periods` predictions for the months following the last
    /// point of `series`. `series` is never empty.
    fn predict(&self, series: &[MonthlyPoint], periods: usize) -> Vec<ForecastPoint>;
}

/// Holt's linear trend method.
#[derive(Debug, Clone, Copy)]
pub struct HoltLinear {
    pub alpha: f64,
    pub beta: f64,
}

impl Default for HoltLinear {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.3,
        }
    }
}

impl Forecaster for HoltLinear {
    fn predict(&self, series: &[MonthlyPoint], periods: usize) -> Vec<ForecastPoint> {
        let Some(last) = series.last() else {
            return Vec::new();
        };

        let values: Vec<f64> = series.iter().map(|p| p.total as f64).collect();
        let mut level = values[0];
        let mut trend = values.get(1).map_or(0.0, |second| second - values[0]);

        for &y in &values[1..] {
            let prev_level = level;
            level = self.alpha * y + (1.0 - self.alpha) * (level + trend);
            trend = self.beta * (level - prev_level) + (1.0 - self.beta) * trend;
        }

        (1..=periods)
            .filter_map(|h| {
                let month = last.month.checked_add_months(Months::new(h as u32))?;
                Some(ForecastPoint {
                    month,
                    predicted: (level + h as f64 * trend).max(0.0),
                })
            })
            .collect()
    }
}

/// Forecasts `periods` months ahead, or returns `None` when the series has
/// fewer than [`MIN_FORECAST_POINTS`] points.
pub fn forecast_monthly(
    series: &[MonthlyPoint],
    forecaster: &impl Forecaster,
    periods: usize,
) -> Option<Vec<ForecastPoint>> {
    if series.len() < MIN_FORECAST_POINTS {
        info!(
            points = series.len(),
            required = MIN_FORECAST_POINTS,
            "Not enough data to generate a forecast"
        );
        return None;
    }

    Some(forecaster.predict(series, periods))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[u64]) -> Vec<MonthlyPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &total)| MonthlyPoint {
                month: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_months(Months::new(i as u32))
                    .unwrap(),
                total,
            })
            .collect()
    }

    #[test]
    fn test_short_series_is_skipped() {
        let short = series(&[1, 2, 3, 4, 5]);
        assert!(forecast_monthly(&short, &HoltLinear::default(), 3).is_none());
        assert!(forecast_monthly(&[], &HoltLinear::default(), 3).is_none());
    }

    #[test]
    fn test_linear_series_extrapolates_trend() {
        let linear = series(&[10, 20, 30, 40, 50, 60]);
        let model = HoltLinear {
            alpha: 0.5,
            beta: 0.5,
        };

        let predicted = forecast_monthly(&linear, &model, 3).unwrap();

        assert_eq!(predicted.len(), 3);
        let values: Vec<f64> = predicted.iter().map(|p| p.predicted).collect();
        for (got, want) in values.iter().zip([70.0, 80.0, 90.0]) {
            assert!((got - want).abs() < 1e-9, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_predictions_follow_last_month() {
        let flat = series(&[5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5]);
        let predicted = forecast_monthly(&flat, &HoltLinear::default(), 2).unwrap();

        assert_eq!(predicted[0].month, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(predicted[1].month, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert!((predicted[0].predicted - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_predictions_never_negative() {
        let falling = series(&[100, 80, 60, 40, 20, 5]);
        let predicted = forecast_monthly(&falling, &HoltLinear::default(), 6).unwrap();
        assert!(predicted.iter().all(|p| p.predicted >= 0.0));
    }
}
