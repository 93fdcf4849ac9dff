//! Closed-form VaR and ES under geometric Brownian motion
//!
//! With terminal value `V_t = v0 * exp(sigma * sqrt(t) * Z + (mu - sigma^2/2) * t)`:
//!
//! - `VaR = v0 - v0 * exp(sigma * sqrt(t) * N^-1(1 - p) + (mu - sigma^2/2) * t)`
//! - `ES  = v0 * (1 - N(N^-1(1 - q) - sigma * sqrt(t)) * exp(mu * t) / (1 - q))`

use crate::error::{check_probability, check_value, RiskError, Result};
use crate::{standard_normal, RiskSeries};
use statrs::distribution::ContinuousCDF;
use tracing::debug;

/// Analytic VaR/ES from drift and volatility
pub struct ParametricRiskModel;

impl ParametricRiskModel {
    /// VaR and ES for a single (mu, sigma) pair
    pub fn var_es(
        v0: f64,
        mu: f64,
        sigma: f64,
        var_prob: f64,
        es_prob: f64,
        horizon_years: f64,
    ) -> Result<(f64, f64)> {
        let series = Self::estimate(v0, &[mu], &[sigma], var_prob, es_prob, horizon_years)?;
        Ok((series.var[0], series.es[0]))
    }

    /// VaR alone for a single (mu, sigma) pair
    pub fn var(v0: f64, mu: f64, sigma: f64, var_prob: f64, horizon_years: f64) -> Result<f64> {
        Self::var_es(v0, mu, sigma, var_prob, var_prob, horizon_years).map(|(var, _)| var)
    }

    /// VaR and ES elementwise over rolling drift/volatility estimates
    pub fn estimate(
        v0: f64,
        mu: &[f64],
        sigma: &[f64],
        var_prob: f64,
        es_prob: f64,
        horizon_years: f64,
    ) -> Result<RiskSeries> {
        check_value(v0)?;
        check_probability(var_prob)?;
        check_probability(es_prob)?;
        check_horizon(horizon_years)?;

        if mu.len() != sigma.len() {
            return Err(RiskError::InvalidInput(format!(
                "{} drift estimates but {} volatility estimates",
                mu.len(),
                sigma.len()
            )));
        }
        for (m, s) in mu.iter().zip(sigma) {
            check_gbm_params(*m, *s)?;
        }

        let normal = standard_normal()?;
        let z_var = normal.inverse_cdf(1.0 - var_prob);
        let z_es = normal.inverse_cdf(1.0 - es_prob);
        let t = horizon_years;
        let sqrt_t = t.sqrt();

        debug!(windows = mu.len(), var_prob, es_prob, horizon_years, "parametric VaR/ES");

        let (var, es) = mu
            .iter()
            .zip(sigma)
            .map(|(&m, &s)| {
                let var = v0 - v0 * (s * sqrt_t * z_var + (m - s * s / 2.0) * t).exp();
                let es = v0 * (1.0 - normal.cdf(z_es - sqrt_t * s) * (m * t).exp() / (1.0 - es_prob));
                (var, es)
            })
            .unzip();

        Ok(RiskSeries { var, es })
    }
}

/// Reject non-finite drift and negative or non-finite volatility
pub(crate) fn check_gbm_params(mu: f64, sigma: f64) -> Result<()> {
    if !mu.is_finite() {
        return Err(RiskError::InvalidInput(format!(
            "drift must be finite, got {}",
            mu
        )));
    }
    if !(sigma >= 0.0) || !sigma.is_finite() {
        return Err(RiskError::InvalidInput(format!(
            "volatility must be finite and non-negative, got {}",
            sigma
        )));
    }
    Ok(())
}

pub(crate) fn check_horizon(horizon_years: f64) -> Result<()> {
    if !(horizon_years > 0.0) || !horizon_years.is_finite() {
        return Err(RiskError::InvalidInput(format!(
            "horizon must be positive, got {} years",
            horizon_years
        )));
    }
    Ok(())
}
