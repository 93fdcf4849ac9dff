//! # gbm-risk: Market Risk Engines for Price Histories
//!
//! This library estimates Value-at-Risk (VaR) and Expected Shortfall (ES)
//! for a single asset, a weighted portfolio, or a stock plus protective put,
//! from daily adjusted close prices ordered most recent first.
//!
//! ## Core Components
//!
//! - **ReturnEstimator**: Rolling-window GBM drift/volatility estimates
//! - **ParametricRiskModel**: Closed-form log-normal VaR/ES
//! - **HistoricalRiskModel**: VaR/ES from realized overlapping returns
//! - **MonteCarloRiskModel**: VaR/ES from simulated GBM outcomes
//! - **OptionPricer**: Black-Scholes European put
//! - **OptionHedgeRiskModel** / **HedgeAnalysis**: Hedged vs. unhedged VaR
//! - **RiskFacade**: Method dispatch and display-window alignment
//!
//! All computations are synchronous and stateless; stochastic models own an
//! explicitly seeded or entropy-seeded random source.
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use gbm_risk::{PricePoint, PriceSeries, RiskConfig, RiskFacade, RiskMethod, RiskRequest};
//!
//! let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
//! let points = (0..300)
//!     .map(|i| {
//!         let price = 100.0 * (1.0 + 0.01 * ((i % 7) as f64 - 3.0));
//!         PricePoint::new(start + chrono::Duration::days(i), price)
//!     })
//!     .collect();
//! let prices = PriceSeries::new("DEMO", points).unwrap();
//!
//! let facade = RiskFacade::new(RiskConfig::default());
//! let request = RiskRequest {
//!     method: RiskMethod::Historical,
//!     v0: 10_000.0,
//!     var_prob: 0.99,
//!     es_prob: 0.975,
//!     window_years: 0.5,
//!     horizon_years: 5.0 / 252.0,
//!     display_len: Some(30),
//! };
//!
//! let report = facade.compute(&prices, &request).unwrap();
//! assert_eq!(report.len(), 30);
//! assert_eq!(report.dates[0], prices.dates()[0]);
//! ```

mod error;
mod config;
mod series;
mod estimator;
mod tail;
mod parametric;
mod historical;
mod monte_carlo;
mod option;
mod hedge;
mod facade;
pub mod portfolio;
pub mod backtest;

pub use error::{Result, RiskError};
pub use config::RiskConfig;
pub use series::{PricePoint, PriceSeries};
pub use estimator::{GbmParams, ParameterRow, ParameterTable, ReturnEstimator, RollingEstimate};
pub use parametric::ParametricRiskModel;
pub use historical::HistoricalRiskModel;
pub use monte_carlo::MonteCarloRiskModel;
pub use option::{OptionPosition, OptionPricer};
pub use hedge::{HedgeAnalysis, HedgeInputs, HedgeReport, HedgeRequest, OptionHedgeRiskModel};
pub use facade::{RiskFacade, RiskMethod, RiskReport, RiskRequest, RiskRow};

use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

/// Trading days per year used for every annualization
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// VaR and ES per anchor date, most recent first
///
/// Both are losses in the currency of the position value `v0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSeries {
    pub var: Vec<f64>,
    pub es: Vec<f64>,
}

impl RiskSeries {
    pub fn len(&self) -> usize {
        self.var.len()
    }

    pub fn is_empty(&self) -> bool {
        self.var.is_empty()
    }

    /// Keep only the `len` most recent values
    pub fn truncate(&mut self, len: usize) {
        self.var.truncate(len);
        self.es.truncate(len);
    }
}

pub(crate) fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| RiskError::Calculation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_series_truncate() {
        let mut series = RiskSeries {
            var: vec![1.0, 2.0, 3.0],
            es: vec![1.5, 2.5, 3.5],
        };
        series.truncate(2);
        assert_eq!(series.len(), 2);
        assert_eq!(series.es, vec![1.5, 2.5]);

        series.truncate(10);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_standard_normal() {
        use statrs::distribution::ContinuousCDF;
        let normal = standard_normal().unwrap();
        assert!((normal.cdf(0.0) - 0.5).abs() < 1e-12);
    }
}
