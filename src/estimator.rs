//! Rolling-window GBM parameter estimation
//!
//! Log returns are taken over the most-recent-first price series as
//! `r[i] = ln(p[i] / p[i+1])`, so a rising market yields positive returns.
//! Windowed moments come from a sliding sum of returns and squared returns
//! (O(N) regardless of window size) and are annualized on a 252-day year:
//!
//! - `sigma = sigmabar * sqrt(252)`
//! - `mu = mubar * 252 + sigma^2 / 2`

use crate::error::{RiskError, Result};
use crate::series::PriceSeries;
use crate::TRADING_DAYS_PER_YEAR;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// GBM parameters of one rolling window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmParams {
    /// Sample mean of daily log returns
    pub mubar: f64,

    /// Sample standard deviation of daily log returns
    pub sigmabar: f64,

    /// Annualized drift including the Ito correction
    pub mu: f64,

    /// Annualized volatility
    pub sigma: f64,
}

impl GbmParams {
    /// Annualize daily log-return moments
    pub fn from_daily(mubar: f64, sigmabar: f64) -> Self {
        let sigma = sigmabar * TRADING_DAYS_PER_YEAR.sqrt();
        let mu = mubar * TRADING_DAYS_PER_YEAR + sigma * sigma / 2.0;
        Self {
            mubar,
            sigmabar,
            mu,
            sigma,
        }
    }

    /// Recover the daily (mean, standard deviation) from `mu` and `sigma`
    pub fn to_daily(mu: f64, sigma: f64) -> (f64, f64) {
        let sigmabar = sigma / TRADING_DAYS_PER_YEAR.sqrt();
        let mubar = (mu - sigma * sigma / 2.0) / TRADING_DAYS_PER_YEAR;
        (mubar, sigmabar)
    }
}

/// Rolling GBM estimates, most recent window first
///
/// Estimate `k` covers returns `k..k + window_days` and is anchored at the
/// k-th most recent date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingEstimate {
    pub window_days: usize,
    pub mubar: Vec<f64>,
    pub sigmabar: Vec<f64>,
    pub mu: Vec<f64>,
    pub sigma: Vec<f64>,
}

impl RollingEstimate {
    pub fn len(&self) -> usize {
        self.mu.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mu.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<GbmParams> {
        if index >= self.len() {
            return None;
        }
        Some(GbmParams {
            mubar: self.mubar[index],
            sigmabar: self.sigmabar[index],
            mu: self.mu[index],
            sigma: self.sigma[index],
        })
    }

    /// Estimate of the most recent window
    pub fn latest(&self) -> Option<GbmParams> {
        self.get(0)
    }
}

/// Log returns and rolling GBM estimates from a price series
pub struct ReturnEstimator;

impl ReturnEstimator {
    /// Daily log returns `ln(p[i] / p[i+1])`, length `prices.len() - 1`
    pub fn log_returns(prices: &[f64]) -> Vec<f64> {
        prices.windows(2).map(|w| (w[0] / w[1]).ln()).collect()
    }

    /// Rolling estimates over a series
    pub fn estimate(prices: &PriceSeries, window_days: usize) -> Result<RollingEstimate> {
        Self::estimate_prices(prices.prices(), window_days)
    }

    /// Rolling estimates over raw most-recent-first prices
    ///
    /// Produces `prices.len() - window_days` windows. A window longer than
    /// the return history is reported as insufficient history.
    pub fn estimate_prices(prices: &[f64], window_days: usize) -> Result<RollingEstimate> {
        if window_days == 0 {
            return Err(RiskError::InvalidInput(
                "rolling window must be at least one day".to_string(),
            ));
        }

        let returns = Self::log_returns(prices);
        if window_days > returns.len() {
            return Err(RiskError::InsufficientHistory {
                required: window_days + 1,
                available: prices.len(),
            });
        }

        let n = returns.len() - window_days + 1;
        let w = window_days as f64;
        let mut estimate = RollingEstimate {
            window_days,
            mubar: Vec::with_capacity(n),
            sigmabar: Vec::with_capacity(n),
            mu: Vec::with_capacity(n),
            sigma: Vec::with_capacity(n),
        };

        let mut sum: f64 = returns[..window_days].iter().sum();
        let mut sum_sq: f64 = returns[..window_days].iter().map(|r| r * r).sum();

        for k in 0..n {
            if k > 0 {
                let leaving = returns[k - 1];
                let entering = returns[k + window_days - 1];
                sum += entering - leaving;
                sum_sq += entering * entering - leaving * leaving;
            }

            let mubar = sum / w;
            // Cancellation can push the variance slightly below zero
            let var = (sum_sq / w - mubar * mubar).max(0.0);
            let params = GbmParams::from_daily(mubar, var.sqrt());

            estimate.mubar.push(params.mubar);
            estimate.sigmabar.push(params.sigmabar);
            estimate.mu.push(params.mu);
            estimate.sigma.push(params.sigma);
        }

        Ok(estimate)
    }
}

/// One row of the multi-window parameter table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRow {
    pub date: NaiveDate,
    /// Drift per window, in the order the windows were requested
    pub mu: Vec<f64>,
    /// Volatility per window, in the order the windows were requested
    pub sigma: Vec<f64>,
}

/// Rolling drift and volatility for several window lengths side by side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTable {
    pub windows_years: Vec<u32>,
    pub rows: Vec<ParameterRow>,
}

impl ParameterTable {
    /// Estimate every window and truncate to the shortest output
    pub fn build(prices: &PriceSeries, windows_years: &[u32]) -> Result<Self> {
        if windows_years.is_empty() {
            return Err(RiskError::InvalidInput(
                "at least one window is required".to_string(),
            ));
        }

        let estimates = windows_years
            .iter()
            .map(|years| {
                ReturnEstimator::estimate(prices, *years as usize * TRADING_DAYS_PER_YEAR as usize)
            })
            .collect::<Result<Vec<_>>>()?;

        let length = estimates.iter().map(RollingEstimate::len).min().unwrap_or(0);

        let rows = (0..length)
            .map(|i| ParameterRow {
                date: prices.dates()[i],
                mu: estimates.iter().map(|e| e.mu[i]).collect(),
                sigma: estimates.iter().map(|e| e.sigma[i]).collect(),
            })
            .collect();

        Ok(Self {
            windows_years: windows_years.to_vec(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_return_sign_convention() {
        // Most recent first: price rose from 100 to 110
        let returns = ReturnEstimator::log_returns(&[110.0, 100.0]);
        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns[0], 0.09531017980432493, epsilon = 1e-12);

        let returns = ReturnEstimator::log_returns(&[100.0, 110.0, 121.0]);
        assert_relative_eq!(returns[0], -(1.1f64).ln(), epsilon = 1e-12);
        assert_relative_eq!(returns[1], -(1.1f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_output_length() {
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        for window in [1, 5, 20, 49] {
            let est = ReturnEstimator::estimate_prices(&prices, window).unwrap();
            assert_eq!(est.len(), prices.len() - 1 - window + 1);
            assert_eq!(est.sigma.len(), est.len());
            assert_eq!(est.mubar.len(), est.len());
        }
    }

    #[test]
    fn test_window_too_long() {
        let prices = [100.0, 101.0, 102.0];
        let err = ReturnEstimator::estimate_prices(&prices, 3).unwrap_err();
        assert_eq!(
            err,
            RiskError::InsufficientHistory {
                required: 4,
                available: 3
            }
        );
        assert!(ReturnEstimator::estimate_prices(&prices, 0).is_err());
    }

    #[test]
    fn test_sliding_window_matches_direct_moments() {
        let prices: Vec<f64> = (0..40)
            .map(|i| 50.0 * (1.0 + 0.02 * ((i * 7 % 11) as f64 - 5.0) / 5.0))
            .collect();
        let returns = ReturnEstimator::log_returns(&prices);
        let window = 10;
        let est = ReturnEstimator::estimate_prices(&prices, window).unwrap();

        for k in 0..est.len() {
            let slice = &returns[k..k + window];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let var = slice.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / window as f64;
            assert_relative_eq!(est.mubar[k], mean, epsilon = 1e-12);
            assert_relative_eq!(est.sigmabar[k], var.sqrt(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_most_recent_window_first() {
        // Flat history followed by a recent rally
        let mut prices = vec![120.0, 110.0, 100.0];
        prices.extend(std::iter::repeat(100.0).take(5));
        let est = ReturnEstimator::estimate_prices(&prices, 2).unwrap();

        assert!(est.mubar[0] > 0.0);
        assert!(est.mubar[est.len() - 1].abs() < 1e-12);
        assert_eq!(est.latest(), est.get(0));
        assert!(est.get(est.len()).is_none());
    }

    #[test]
    fn test_constant_prices_clamp_variance() {
        let prices = vec![42.0; 30];
        let est = ReturnEstimator::estimate_prices(&prices, 10).unwrap();
        assert!(est.sigma.iter().all(|s| *s == 0.0));
        assert!(est.mu.iter().all(|m| *m == 0.0));
    }

    #[test]
    fn test_annualization_round_trip() {
        let params = GbmParams::from_daily(0.0004, 0.012);
        assert_relative_eq!(params.sigma, 0.012 * 252f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(
            params.mu,
            0.0004 * 252.0 + params.sigma * params.sigma / 2.0,
            epsilon = 1e-15
        );

        let (mubar, sigmabar) = GbmParams::to_daily(params.mu, params.sigma);
        assert_relative_eq!(mubar, 0.0004, epsilon = 1e-15);
        assert_relative_eq!(sigmabar, 0.012, epsilon = 1e-15);
    }

    #[test]
    fn test_parameter_table_truncates_to_shortest() {
        let dates: Vec<NaiveDate> = (0..(3 * 252 + 10))
            .map(|i| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Duration::days(i))
            .collect();
        let prices: Vec<f64> = (0..dates.len())
            .map(|i| 100.0 * (1.0 + 0.01 * (i as f64).sin()))
            .collect();
        let series = PriceSeries::from_columns("X", dates, prices).unwrap();

        let table = ParameterTable::build(&series, &[1, 3]).unwrap();
        assert_eq!(table.len(), series.len() - 3 * 252);
        assert_eq!(table.rows[0].date, series.dates()[0]);
        assert_eq!(table.rows[0].mu.len(), 2);

        let one_year = ReturnEstimator::estimate(&series, 252).unwrap();
        assert_eq!(table.rows[3].sigma[0], one_year.sigma[3]);

        assert!(ParameterTable::build(&series, &[5]).is_err());
        assert!(ParameterTable::build(&series, &[]).is_err());
    }
}
