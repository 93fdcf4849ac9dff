//! Stock plus protective put VaR
//!
//! `OptionHedgeRiskModel` simulates terminal stock prices under GBM, reprices
//! the put at each with the remaining maturity and reads VaR as a linearly
//! interpolated percentile of the portfolio loss. `HedgeAnalysis` sizes a
//! stock/put split from a liquidity ratio and compares the result against
//! the unhedged parametric VaR.

use crate::config::RiskConfig;
use crate::error::{check_probability, check_value, RiskError, Result};
use crate::estimator::ReturnEstimator;
use crate::option::OptionPosition;
use crate::parametric::{check_gbm_params, check_horizon, ParametricRiskModel};
use crate::series::PriceSeries;
use crate::tail::percentile;
use crate::TRADING_DAYS_PER_YEAR;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Inputs of one hedged-portfolio simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeInputs {
    /// Current stock price
    pub s0: f64,
    /// Annualized drift
    pub mu: f64,
    /// Annualized volatility
    pub sigma: f64,
    pub n_stocks: f64,
    /// Puts held; implied vol is held fixed over the horizon
    pub put: OptionPosition,
    pub var_prob: f64,
    pub horizon_years: f64,
}

/// Monte Carlo VaR of a stock + put portfolio
pub struct OptionHedgeRiskModel<R: Rng = StdRng> {
    rng: R,
    paths: usize,
}

impl OptionHedgeRiskModel<StdRng> {
    /// Model with `hedge_paths` and `random_seed` from the configuration
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.rng(), config.hedge_paths)
    }
}

impl<R: Rng> OptionHedgeRiskModel<R> {
    pub fn new(rng: R, paths: usize) -> Self {
        Self { rng, paths }
    }

    pub fn paths(&self) -> usize {
        self.paths
    }

    /// VaR of the hedged portfolio over `horizon_years`
    pub fn estimate(&mut self, inputs: &HedgeInputs) -> Result<f64> {
        check_probability(inputs.var_prob)?;
        check_horizon(inputs.horizon_years)?;
        if self.paths == 0 {
            return Err(RiskError::InvalidInput(
                "at least one simulation path is required".to_string(),
            ));
        }
        if !(inputs.s0 > 0.0) {
            return Err(RiskError::InvalidInput(format!(
                "stock price must be positive, got {}",
                inputs.s0
            )));
        }
        check_gbm_params(inputs.mu, inputs.sigma)?;

        let put = &inputs.put;
        let pricer = put.pricer()?;
        let v0 = inputs.n_stocks * inputs.s0 + put.value(inputs.s0)?;

        let t = inputs.horizon_years;
        let remaining = put.maturity - t;
        let drift = (inputs.mu - inputs.sigma * inputs.sigma / 2.0) * t;
        let diffusion = inputs.sigma * t.sqrt();

        debug!(npaths = self.paths, remaining_maturity = remaining, "hedged portfolio VaR");

        let mut losses: Vec<f64> = (0..self.paths)
            .map(|_| {
                let z: f64 = self.rng.sample(StandardNormal);
                let st = inputs.s0 * (diffusion * z + drift).exp();
                let vt = inputs.n_stocks * st + put.share_count * pricer.put_unchecked(st, remaining);
                v0 - vt
            })
            .collect();

        percentile(&mut losses, inputs.var_prob).ok_or_else(|| {
            RiskError::Calculation("empty loss sample".to_string())
        })
    }
}

/// Parameters of a liquidity-ratio hedge analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeRequest {
    /// Total capital split between stock and puts
    pub v0: f64,
    /// Fraction of capital spent on puts
    pub liquidity_ratio: f64,
    pub risk_free_rate: f64,
    /// Put maturity in years
    pub maturity: f64,
    pub implied_vol: f64,
    pub var_prob: f64,
    pub window_years: f64,
    pub horizon_years: f64,
}

/// Outcome of a hedge analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeReport {
    pub date: NaiveDate,
    pub stock_price: f64,
    pub stock_shares: f64,
    /// Price of one at-the-money put
    pub put_price: f64,
    pub put_shares: f64,
    pub var_unhedged: f64,
    /// Parametric ES of the unhedged position at `hedge_es_prob`
    pub es_unhedged: f64,
    pub var_hedged: f64,
    /// `100 * (1 - hedged / unhedged)`
    pub var_reduction_pct: f64,
}

impl HedgeReport {
    /// Labelled values for the caller's result sink
    pub fn rows(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Stock price", self.stock_price),
            ("Stock shares", self.stock_shares),
            ("Put price on one share", self.put_price),
            ("Put shares", self.put_shares),
            ("VaR without options", self.var_unhedged),
            ("ES without options", self.es_unhedged),
            ("VaR with options", self.var_hedged),
            ("VaR reduction (percentage)", self.var_reduction_pct),
        ]
    }
}

/// Compares unhedged parametric VaR with the VaR of a stock + ATM put split
pub struct HedgeAnalysis {
    config: RiskConfig,
}

impl HedgeAnalysis {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Run the analysis on the most recent window of `prices`
    pub fn run(&self, prices: &PriceSeries, request: &HedgeRequest) -> Result<HedgeReport> {
        let mut model = OptionHedgeRiskModel::from_config(&self.config);
        self.run_with(&mut model, prices, request)
    }

    /// Run the analysis with a caller-supplied simulation model
    pub fn run_with<R: Rng>(
        &self,
        model: &mut OptionHedgeRiskModel<R>,
        prices: &PriceSeries,
        request: &HedgeRequest,
    ) -> Result<HedgeReport> {
        check_value(request.v0)?;
        if !(0.0..=1.0).contains(&request.liquidity_ratio) {
            return Err(RiskError::InvalidInput(format!(
                "liquidity ratio must be in [0, 1], got {}",
                request.liquidity_ratio
            )));
        }
        if !(request.maturity > 0.0) {
            return Err(RiskError::InvalidInput(format!(
                "put maturity must be positive to size the hedge, got {}",
                request.maturity
            )));
        }

        let window_days = (request.window_years * TRADING_DAYS_PER_YEAR).round() as usize;
        let estimate = ReturnEstimator::estimate(prices, window_days)?;
        let params = estimate.latest().ok_or(RiskError::InsufficientHistory {
            required: window_days + 1,
            available: prices.len(),
        })?;

        let (var_unhedged, es_unhedged) = ParametricRiskModel::var_es(
            request.v0,
            params.mu,
            params.sigma,
            request.var_prob,
            self.config.hedge_es_prob,
            request.horizon_years,
        )?;

        let latest = prices.latest();
        let s0 = latest.price;
        let strike = s0;
        let stock_shares = request.v0 * (1.0 - request.liquidity_ratio) / s0;
        let mut put = OptionPosition {
            strike,
            maturity: request.maturity,
            implied_vol: request.implied_vol,
            risk_free_rate: request.risk_free_rate,
            share_count: 1.0,
        };
        let put_price = put.value(s0)?;
        let put_shares = request.v0 * request.liquidity_ratio / put_price;
        put.share_count = put_shares;

        let var_hedged = model.estimate(&HedgeInputs {
            s0,
            mu: params.mu,
            sigma: params.sigma,
            n_stocks: stock_shares,
            put,
            var_prob: request.var_prob,
            horizon_years: request.horizon_years,
        })?;

        let var_reduction_pct = if var_unhedged > 0.0 {
            100.0 * (1.0 - var_hedged / var_unhedged)
        } else {
            warn!(var_unhedged, "unhedged VaR is not positive, reduction undefined");
            f64::NAN
        };

        info!(
            series = prices.name(),
            var_unhedged, var_hedged, var_reduction_pct, "hedge analysis complete"
        );

        Ok(HedgeReport {
            date: latest.date,
            stock_price: s0,
            stock_shares,
            put_price,
            put_shares,
            var_unhedged,
            es_unhedged,
            var_hedged,
            var_reduction_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionPricer;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn inputs(n_puts: f64) -> HedgeInputs {
        HedgeInputs {
            s0: 100.0,
            mu: 0.08,
            sigma: 0.2,
            n_stocks: 100.0,
            put: OptionPosition {
                strike: 100.0,
                maturity: 0.5,
                implied_vol: 0.21,
                risk_free_rate: 0.005,
                share_count: n_puts,
            },
            var_prob: 0.99,
            horizon_years: 5.0 / 252.0,
        }
    }

    #[test]
    fn test_unhedged_matches_parametric() {
        let mut model = OptionHedgeRiskModel::new(StdRng::seed_from_u64(1), 200_000);
        let var = model.estimate(&inputs(0.0)).unwrap();
        let expected = ParametricRiskModel::var(10_000.0, 0.08, 0.2, 0.99, 5.0 / 252.0).unwrap();
        assert!((var - expected).abs() / expected < 0.03, "{} vs {}", var, expected);
    }

    #[test]
    fn test_puts_reduce_var() {
        let mut model = OptionHedgeRiskModel::new(StdRng::seed_from_u64(2), 50_000);
        let unhedged = model.estimate(&inputs(0.0)).unwrap();
        let hedged = model.estimate(&inputs(100.0)).unwrap();
        assert!(hedged < unhedged);
    }

    #[test]
    fn test_put_leg_priced_from_position() {
        // No stock move: the only loss is the put's time decay
        let mut flat = inputs(10.0);
        flat.mu = 0.0;
        flat.sigma = 0.0;
        let t = flat.horizon_years;

        let mut model = OptionHedgeRiskModel::new(StdRng::seed_from_u64(5), 100);
        let var = model.estimate(&flat).unwrap();

        let now = flat.put.value(100.0).unwrap();
        let later = 10.0 * OptionPricer::put_price(100.0, 0.005, 0.21, 100.0, 0.5 - t).unwrap();
        assert_relative_eq!(var, now - later, epsilon = 1e-9);
        assert!(var > 0.0);
    }

    #[test]
    fn test_horizon_past_maturity_uses_intrinsic() {
        let mut model = OptionHedgeRiskModel::new(StdRng::seed_from_u64(3), 10_000);
        let mut past = inputs(100.0);
        past.put.maturity = 1.0 / 252.0;
        let var = model.estimate(&past).unwrap();
        assert!(var.is_finite());
    }

    #[test]
    fn test_invalid_inputs() {
        let mut model = OptionHedgeRiskModel::new(StdRng::seed_from_u64(4), 100);
        let mut bad = inputs(1.0);
        bad.put.implied_vol = 0.0;
        assert!(matches!(
            model.estimate(&bad),
            Err(RiskError::NonPositiveVolatility(_))
        ));

        let mut bad = inputs(1.0);
        bad.var_prob = 1.0;
        assert!(model.estimate(&bad).is_err());

        let mut bad = inputs(1.0);
        bad.mu = f64::NAN;
        assert!(model.estimate(&bad).unwrap_err().is_invalid_input());

        let mut empty = OptionHedgeRiskModel::new(StdRng::seed_from_u64(4), 0);
        assert!(empty.estimate(&inputs(1.0)).is_err());
    }

    #[test]
    fn test_report_rows() {
        let report = HedgeReport {
            date: NaiveDate::from_ymd_opt(2016, 12, 21).unwrap(),
            stock_price: 116.0,
            stock_shares: 8534.0,
            put_price: 6.7,
            put_shares: 1492.0,
            var_unhedged: 60_000.0,
            es_unhedged: 68_000.0,
            var_hedged: 45_000.0,
            var_reduction_pct: 25.0,
        };
        let rows = report.rows();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0], ("Stock price", 116.0));
        assert_eq!(rows[5], ("ES without options", 68_000.0));
        assert_eq!(rows[7], ("VaR reduction (percentage)", 25.0));
    }
}
