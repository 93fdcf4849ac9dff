//! Historical-simulation VaR and ES
//!
//! Scenarios are realized `horizon_days` log-price moves taken straight from
//! the price history, applied to the current position value. For each anchor
//! date `i` (most recent first) the scenario set is the `window_days -
//! horizon_days` overlapping moves that start inside the window anchored
//! at `i`.

use crate::error::{check_value, RiskError, Result};
use crate::tail::TailReader;
use crate::RiskSeries;
use tracing::debug;

/// Empirical VaR/ES from overlapping realized returns
pub struct HistoricalRiskModel;

impl HistoricalRiskModel {
    /// VaR and ES per anchor date, `prices.len() - window_days` values
    ///
    /// `prices` are most recent first. Requires `window_days > horizon_days`
    /// and more than `window_days` prices.
    pub fn estimate(
        v0: f64,
        prices: &[f64],
        var_prob: f64,
        es_prob: f64,
        window_days: usize,
        horizon_days: usize,
    ) -> Result<RiskSeries> {
        check_value(v0)?;
        if horizon_days == 0 {
            return Err(RiskError::InvalidInput(
                "horizon must be at least one day".to_string(),
            ));
        }
        if window_days <= horizon_days {
            return Err(RiskError::InvalidInput(format!(
                "window of {} days must be longer than the {} day horizon",
                window_days, horizon_days
            )));
        }
        if prices.len() <= window_days {
            return Err(RiskError::InsufficientHistory {
                required: window_days + 1,
                available: prices.len(),
            });
        }

        let npaths = window_days - horizon_days;
        let ntrials = prices.len() - window_days;
        let reader = TailReader::new(v0, var_prob, es_prob, npaths)?;

        debug!(ntrials, npaths, horizon_days, "historical VaR/ES");

        // Position value after each realized horizon move ending at date j
        let outcomes: Vec<f64> = prices
            .iter()
            .zip(&prices[horizon_days..])
            .map(|(later, earlier)| v0 * (later.ln() - earlier.ln()).exp())
            .collect();

        let mut var = Vec::with_capacity(ntrials);
        let mut es = Vec::with_capacity(ntrials);
        let mut column = vec![0.0; npaths];

        for i in 0..ntrials {
            column.copy_from_slice(&outcomes[i..i + npaths]);
            let (v, e) = reader.read(&mut column);
            var.push(v);
            es.push(e);
        }

        Ok(RiskSeries { var, es })
    }
}
