//! VaR backtesting against realized losses
//!
//! The loss realized over the `h` days ending at date `i` is
//! `v0 - v0 * p[i] / p[i + h]`. It is compared with the VaR forecast made
//! `h` days earlier, i.e. at date `i + h`.

use crate::error::{check_value, RiskError, Result};
use crate::series::PriceSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A VaR forecast next to the loss that followed it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestRow {
    /// Date the forecast was made
    pub date: NaiveDate,
    #[serde(rename = "VaR")]
    pub var: f64,
    #[serde(rename = "Loss")]
    pub loss: f64,
}

/// VaR backtesting result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarBacktestResult {
    /// Number of VaR predictions
    pub num_predictions: usize,

    /// Number of violations (actual loss exceeded VaR)
    pub num_violations: usize,

    /// Violation rate (num_violations / num_predictions)
    pub violation_rate: f64,

    /// Expected violation rate based on confidence level
    pub expected_violation_rate: f64,

    /// Whether the model is validated (violation rate within acceptable range)
    pub validated: bool,
}

/// Realized horizon losses, most recent first, `prices.len() - horizon_days` values
pub fn realized_losses(v0: f64, prices: &[f64], horizon_days: usize) -> Vec<f64> {
    prices
        .iter()
        .zip(prices.iter().skip(horizon_days))
        .map(|(now, then)| v0 - v0 * now / then)
        .collect()
}

/// Pair each VaR forecast with the loss realized over the following horizon
///
/// `var[k]` must be the forecast anchored at `prices.dates()[k]`. The output
/// is limited to forecasts within the first `display_len` dates.
pub fn compare(
    v0: f64,
    prices: &PriceSeries,
    var: &[f64],
    horizon_days: usize,
    display_len: usize,
) -> Result<Vec<BacktestRow>> {
    check_value(v0)?;
    if horizon_days == 0 {
        return Err(RiskError::InvalidInput(
            "horizon must be at least one day".to_string(),
        ));
    }

    let losses = realized_losses(v0, prices.prices(), horizon_days);
    let length = losses.len().min(var.len()).min(display_len);

    Ok((horizon_days..length)
        .map(|k| BacktestRow {
            date: prices.dates()[k],
            var: var[k],
            loss: losses[k - horizon_days],
        })
        .collect())
}

/// Count VaR violations and check the rate against `1 - var_prob`
///
/// Validation uses a 2-sigma band of the binomial violation count.
pub fn evaluate(rows: &[BacktestRow], var_prob: f64) -> Result<VarBacktestResult> {
    if rows.is_empty() {
        return Err(RiskError::InsufficientHistory {
            required: 1,
            available: 0,
        });
    }
    if var_prob <= 0.0 || var_prob >= 1.0 {
        return Err(RiskError::InvalidConfidenceLevel(var_prob));
    }

    let num_predictions = rows.len();
    let num_violations = rows.iter().filter(|r| r.loss > r.var).count();
    let violation_rate = num_violations as f64 / num_predictions as f64;

    let expected_violation_rate = 1.0 - var_prob;
    let std_error = (expected_violation_rate * (1.0 - expected_violation_rate)
        / num_predictions as f64)
        .sqrt();
    let lower_bound = (expected_violation_rate - 2.0 * std_error).max(0.0);
    let upper_bound = (expected_violation_rate + 2.0 * std_error).min(1.0);

    let validated = violation_rate >= lower_bound && violation_rate <= upper_bound;

    Ok(VarBacktestResult {
        num_predictions,
        num_violations,
        violation_rate,
        expected_violation_rate,
        validated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(var: f64, loss: f64) -> BacktestRow {
        BacktestRow {
            date: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            var,
            loss,
        }
    }

    #[test]
    fn test_realized_losses() {
        // Most recent first: 100 <- 80 is a gain, 80 <- 100 a loss
        let losses = realized_losses(1_000.0, &[100.0, 80.0, 100.0], 1);
        assert_eq!(losses.len(), 2);
        assert_relative_eq!(losses[0], -250.0);
        assert_relative_eq!(losses[1], 200.0);
    }

    #[test]
    fn test_compare_alignment() {
        let dates: Vec<NaiveDate> = (1..=6)
            .map(|d| NaiveDate::from_ymd_opt(2016, 3, d).unwrap())
            .collect();
        let prices =
            PriceSeries::from_columns("X", dates, vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0]).unwrap();
        // prices most recent first: 15, 14, 13, 12, 11, 10
        let var = vec![1.0, 2.0, 3.0, 4.0];

        let rows = compare(100.0, &prices, &var, 2, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, prices.dates()[2]);
        assert_eq!(rows[0].var, 3.0);
        assert_relative_eq!(rows[0].loss, 100.0 - 100.0 * 15.0 / 13.0);
        assert_eq!(rows[1].var, 4.0);

        let limited = compare(100.0, &prices, &var, 2, 3).unwrap();
        assert_eq!(limited.len(), 1);

        assert!(compare(100.0, &prices, &var, 0, 10).is_err());
    }

    #[test]
    fn test_var_backtest() {
        // Simulate ~5% violations (expected for 95% confidence)
        let mut rows = vec![row(100.0, 50.0); 100];
        for (i, loss) in [150.0, 120.0, 110.0, 105.0, 101.0].into_iter().enumerate() {
            rows[i].loss = loss;
        }

        let backtest = evaluate(&rows, 0.95).unwrap();
        assert_eq!(backtest.num_predictions, 100);
        assert_eq!(backtest.num_violations, 5);
        assert_eq!(backtest.violation_rate, 0.05);
        assert!((backtest.expected_violation_rate - 0.05).abs() < 1e-6);
        assert!(backtest.validated);
    }

    #[test]
    fn test_too_many_violations_fail_validation() {
        let rows: Vec<BacktestRow> = (0..100)
            .map(|i| row(10.0, if i % 4 == 0 { 20.0 } else { 0.0 }))
            .collect();
        let backtest = evaluate(&rows, 0.99).unwrap();
        assert_eq!(backtest.num_violations, 25);
        assert!(!backtest.validated);
    }

    #[test]
    fn test_evaluate_rejects_empty_and_bad_level() {
        assert!(evaluate(&[], 0.99).is_err());
        assert!(evaluate(&[row(1.0, 0.0)], 1.0).is_err());
    }
}
