//! Monte Carlo VaR and ES
//!
//! For every anchor date the terminal position value is simulated from the
//! GBM estimate of the window anchored there:
//! `V = v0 * exp(sigma * sqrt(t) * Z + (mu - sigma^2/2) * t)`,
//! and VaR/ES are read from the sorted sample exactly as in the historical
//! model.

use crate::config::RiskConfig;
use crate::error::{check_value, RiskError, Result};
use crate::parametric::{check_gbm_params, check_horizon};
use crate::tail::TailReader;
use crate::{RiskSeries, TRADING_DAYS_PER_YEAR};
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::debug;

/// Simulated VaR/ES per rolling window
///
/// Owns its random source; seed it for reproducible runs.
pub struct MonteCarloRiskModel<R: Rng = StdRng> {
    rng: R,
    paths: usize,
}

impl MonteCarloRiskModel<StdRng> {
    /// Model with `monte_carlo_paths` and `random_seed` from the configuration
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.rng(), config.monte_carlo_paths)
    }
}

impl<R: Rng> MonteCarloRiskModel<R> {
    pub fn new(rng: R, paths: usize) -> Self {
        Self { rng, paths }
    }

    /// Simulated outcomes per anchor date
    pub fn paths(&self) -> usize {
        self.paths
    }

    /// VaR and ES per anchor date, `prices.len() - window_days` values
    ///
    /// `mu[i]` and `sigma[i]` must be the estimate anchored at date `i`, as
    /// produced by `ReturnEstimator` with the same `window_days`.
    #[allow(clippy::too_many_arguments)]
    pub fn estimate(
        &mut self,
        v0: f64,
        prices: &[f64],
        mu: &[f64],
        sigma: &[f64],
        var_prob: f64,
        es_prob: f64,
        window_days: usize,
        horizon_years: f64,
    ) -> Result<RiskSeries> {
        check_value(v0)?;
        check_horizon(horizon_years)?;
        if self.paths == 0 {
            return Err(RiskError::InvalidInput(
                "at least one simulation path is required".to_string(),
            ));
        }
        if (window_days as f64) <= horizon_years * TRADING_DAYS_PER_YEAR {
            return Err(RiskError::InvalidInput(format!(
                "window of {} days must be longer than the {} year horizon",
                window_days, horizon_years
            )));
        }
        if prices.len() <= window_days {
            return Err(RiskError::InsufficientHistory {
                required: window_days + 1,
                available: prices.len(),
            });
        }

        let ntrials = prices.len() - window_days;
        if mu.len() < ntrials || sigma.len() < ntrials {
            return Err(RiskError::InvalidInput(format!(
                "need {} drift/volatility estimates, got {}/{}",
                ntrials,
                mu.len(),
                sigma.len()
            )));
        }

        for (m, s) in mu[..ntrials].iter().zip(&sigma[..ntrials]) {
            check_gbm_params(*m, *s)?;
        }

        let reader = TailReader::new(v0, var_prob, es_prob, self.paths)?;
        let sqrt_t = horizon_years.sqrt();

        debug!(ntrials, npaths = self.paths, horizon_years, "monte carlo VaR/ES");

        let mut var = Vec::with_capacity(ntrials);
        let mut es = Vec::with_capacity(ntrials);
        let mut column = vec![0.0; self.paths];

        for i in 0..ntrials {
            let (m, s) = (mu[i], sigma[i]);
            let drift = (m - s * s / 2.0) * horizon_years;
            let diffusion = s * sqrt_t;

            for value in column.iter_mut() {
                let z: f64 = self.rng.sample(StandardNormal);
                *value = v0 * (diffusion * z + drift).exp();
            }

            let (v, e) = reader.read(&mut column);
            var.push(v);
            es.push(e);
        }

        Ok(RiskSeries { var, es })
    }
}
