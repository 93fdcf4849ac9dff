//! Empirical tail statistics shared by the simulation-based models

use crate::error::{check_probability, Result};

/// Number of worst outcomes that make up the `1 - prob` tail of `n` samples
///
/// `ceil((1 - prob) * n)`, never less than one. The product is nudged down
/// before rounding so that e.g. `(1 - 0.99) * 5000` counts 50, not 51.
pub(crate) fn tail_count(prob: f64, n: usize) -> usize {
    let exact = (1.0 - prob) * n as f64;
    ((exact - 1e-9).ceil() as usize).clamp(1, n.max(1))
}

/// Reads VaR and ES off columns of simulated terminal values
#[derive(Debug, Clone, Copy)]
pub(crate) struct TailReader {
    v0: f64,
    var_rank: usize,
    es_count: usize,
}

impl TailReader {
    pub(crate) fn new(v0: f64, var_prob: f64, es_prob: f64, paths: usize) -> Result<Self> {
        check_probability(var_prob)?;
        check_probability(es_prob)?;
        Ok(Self {
            v0,
            var_rank: tail_count(var_prob, paths),
            es_count: tail_count(es_prob, paths),
        })
    }

    /// Sort one column in place and return (VaR, ES)
    ///
    /// VaR is `v0` minus the outcome at rank `ceil((1 - p) * n)`; ES is `v0`
    /// minus the mean of the `ceil((1 - q) * n)` worst outcomes.
    pub(crate) fn read(&self, outcomes: &mut [f64]) -> (f64, f64) {
        outcomes.sort_by(|a, b| a.total_cmp(b));
        let var = self.v0 - outcomes[self.var_rank - 1];
        let tail = &outcomes[..self.es_count];
        let es = self.v0 - tail.iter().sum::<f64>() / tail.len() as f64;
        (var, es)
    }
}

/// Linearly interpolated percentile of a sample, `q` in [0, 1]
///
/// Sorts `values` in place. Position `q * (n - 1)` is interpolated between
/// its neighbouring order statistics.
pub(crate) fn percentile(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(values[lo] + (values[hi] - values[lo]) * frac)
}
