//! Single entry point dispatching to the three VaR/ES models
//!
//! The facade converts window and horizon lengths from years to trading
//! days, runs the selected model and truncates the result to the caller's
//! display window.

use crate::config::RiskConfig;
use crate::error::{RiskError, Result};
use crate::estimator::ReturnEstimator;
use crate::historical::HistoricalRiskModel;
use crate::monte_carlo::MonteCarloRiskModel;
use crate::parametric::ParametricRiskModel;
use crate::series::PriceSeries;
use crate::{RiskSeries, TRADING_DAYS_PER_YEAR};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// VaR/ES estimation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskMethod {
    Parametric,
    Historical,
    MonteCarlo,
}

impl RiskMethod {
    pub fn name(&self) -> &'static str {
        match self {
            RiskMethod::Parametric => "Parametric",
            RiskMethod::Historical => "Historical",
            RiskMethod::MonteCarlo => "Monte_Carlo",
        }
    }
}

impl fmt::Display for RiskMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RiskMethod {
    type Err = RiskError;

    /// Accepts "Parametric", "Historical VaR/ES", "monte carlo", "MonteCarlo", ...
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        let key: String = lowered
            .trim_end_matches("var/es")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        match key.as_str() {
            "parametric" => Ok(RiskMethod::Parametric),
            "historical" => Ok(RiskMethod::Historical),
            "montecarlo" => Ok(RiskMethod::MonteCarlo),
            _ => Err(RiskError::UnknownMethod(s.to_string())),
        }
    }
}

/// One VaR/ES calculation as requested by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRequest {
    pub method: RiskMethod,
    /// Position value
    pub v0: f64,
    pub var_prob: f64,
    pub es_prob: f64,
    /// Rolling estimation window in years
    pub window_years: f64,
    /// Holding horizon in years
    pub horizon_years: f64,
    /// Maximum number of most recent dates to report (None = all)
    #[serde(default)]
    pub display_len: Option<usize>,
}

impl RiskRequest {
    pub fn window_days(&self) -> usize {
        (self.window_years * TRADING_DAYS_PER_YEAR).round() as usize
    }

    pub fn horizon_days(&self) -> usize {
        (self.horizon_years * TRADING_DAYS_PER_YEAR).round() as usize
    }
}

/// One output row: risk figures anchored at a date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskRow {
    pub date: NaiveDate,
    #[serde(rename = "VaR")]
    pub var: f64,
    #[serde(rename = "ES")]
    pub es: f64,
}

/// VaR/ES series aligned to the most recent dates of a price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub method: RiskMethod,
    pub series_name: String,
    pub dates: Vec<NaiveDate>,
    pub var: Vec<f64>,
    pub es: Vec<f64>,
}

impl RiskReport {
    pub fn len(&self) -> usize {
        self.var.len()
    }

    pub fn is_empty(&self) -> bool {
        self.var.is_empty()
    }

    pub fn rows(&self) -> Vec<RiskRow> {
        self.dates
            .iter()
            .zip(self.var.iter().zip(&self.es))
            .map(|(date, (var, es))| RiskRow {
                date: *date,
                var: *var,
                es: *es,
            })
            .collect()
    }

    /// Suggested file stem, e.g. `Historical_AAPL_2000-12-01_2016-12-01`
    pub fn file_stem(&self) -> String {
        match (self.dates.last(), self.dates.first()) {
            (Some(first), Some(last)) => {
                format!("{}_{}_{}_{}", self.method, self.series_name, first, last)
            }
            _ => format!("{}_{}", self.method, self.series_name),
        }
    }
}

/// Dispatches VaR/ES requests to the matching model
pub struct RiskFacade {
    config: RiskConfig,
}

impl RiskFacade {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Run a request by method name, failing on unknown names
    pub fn compute_named(
        &self,
        method: &str,
        prices: &PriceSeries,
        mut request: RiskRequest,
    ) -> Result<RiskReport> {
        request.method = method.parse()?;
        self.compute(prices, &request)
    }

    /// Raw model output for a request, before display alignment
    pub fn series(&self, prices: &PriceSeries, request: &RiskRequest) -> Result<RiskSeries> {
        check_window(request)?;
        let window_days = request.window_days();

        match request.method {
            RiskMethod::Parametric => {
                let est = ReturnEstimator::estimate(prices, window_days)?;
                ParametricRiskModel::estimate(
                    request.v0,
                    &est.mu,
                    &est.sigma,
                    request.var_prob,
                    request.es_prob,
                    request.horizon_years,
                )
            }
            RiskMethod::Historical => HistoricalRiskModel::estimate(
                request.v0,
                prices.prices(),
                request.var_prob,
                request.es_prob,
                window_days,
                request.horizon_days(),
            ),
            RiskMethod::MonteCarlo => {
                let est = ReturnEstimator::estimate(prices, window_days)?;
                let mut model = MonteCarloRiskModel::from_config(&self.config);
                model.estimate(
                    request.v0,
                    prices.prices(),
                    &est.mu,
                    &est.sigma,
                    request.var_prob,
                    request.es_prob,
                    window_days,
                    request.horizon_years,
                )
            }
        }
    }

    /// VaR/ES series truncated to `min(model output, display_len)`
    pub fn compute(&self, prices: &PriceSeries, request: &RiskRequest) -> Result<RiskReport> {
        let mut series = self.series(prices, request)?;

        let length = request
            .display_len
            .map_or(series.len(), |d| d.min(series.len()));
        series.truncate(length);

        info!(
            method = %request.method,
            series = prices.name(),
            length,
            "risk series computed"
        );

        Ok(RiskReport {
            method: request.method,
            series_name: prices.name().to_string(),
            dates: prices.dates()[..length].to_vec(),
            var: series.var,
            es: series.es,
        })
    }
}

/// Simulation windows must outlast the horizon, checked before any estimation
fn check_window(request: &RiskRequest) -> Result<()> {
    let horizon_days = match request.method {
        RiskMethod::Parametric => return Ok(()),
        RiskMethod::Historical => request.horizon_days() as f64,
        RiskMethod::MonteCarlo => request.horizon_years * TRADING_DAYS_PER_YEAR,
    };
    let window_days = request.window_days();
    if window_days as f64 <= horizon_days {
        return Err(RiskError::InvalidInput(format!(
            "{} window of {} days must be longer than the {} day horizon",
            request.method, window_days, horizon_days
        )));
    }
    Ok(())
}
