//! Weighted multi-asset portfolio series
//!
//! Turns comma-separated ticker and weight strings plus one price series per
//! ticker into a single portfolio value series that the risk models can
//! consume like any other instrument.

use crate::error::{check_value, RiskError, Result};
use crate::series::{PricePoint, PriceSeries};
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeSet;
use tracing::debug;

/// Split a ticker list such as `"AAPL, MSFT"` into symbols
pub fn parse_tickers(tickers: &str) -> Result<Vec<String>> {
    let compact: String = tickers.chars().filter(|c| !c.is_whitespace()).collect();
    let symbols: Vec<String> = compact.split(',').map(str::to_string).collect();

    if symbols.iter().any(|s| s.is_empty()) {
        return Err(RiskError::InvalidInput(format!(
            "malformed ticker list {:?}",
            tickers
        )));
    }
    Ok(symbols)
}

/// Parse a weight list such as `"0.5,0.5"`
pub fn parse_weights(weights: &str) -> Result<Vec<f64>> {
    weights
        .split(',')
        .map(|w| {
            let trimmed = w.trim();
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    RiskError::InvalidInput(format!("malformed weight {:?} in {:?}", trimmed, weights))
                })
        })
        .collect()
}

/// Share counts and value series of a weighted portfolio
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub tickers: Vec<String>,
    /// Whole shares held per ticker
    pub shares: Vec<f64>,
    /// Date the shares were sized on
    pub position_date: NaiveDate,
    pub series: PriceSeries,
}

/// Combine component series into a portfolio value series
///
/// Components are aligned on their common dates. Shares are
/// `round(v0 * w_i / price_i)` at the first common date on or after
/// `position_date`.
pub fn build_portfolio(
    components: &[PriceSeries],
    weights: &[f64],
    v0: f64,
    position_date: NaiveDate,
) -> Result<Portfolio> {
    check_value(v0)?;
    if components.is_empty() {
        return Err(RiskError::InvalidInput("no component series".to_string()));
    }
    if components.len() != weights.len() {
        return Err(RiskError::InvalidInput(format!(
            "{} series but {} weights",
            components.len(),
            weights.len()
        )));
    }

    let mut common: BTreeSet<NaiveDate> = components[0].dates().iter().copied().collect();
    for component in &components[1..] {
        let dates: BTreeSet<NaiveDate> = component.dates().iter().copied().collect();
        common = common.intersection(&dates).copied().collect();
    }
    // Most recent first, like every PriceSeries
    let dates: Vec<NaiveDate> = common.into_iter().rev().collect();
    if dates.is_empty() {
        return Err(RiskError::InvalidInput(
            "component series share no dates".to_string(),
        ));
    }

    let anchor = dates
        .iter()
        .rev()
        .find(|d| **d >= position_date)
        .copied()
        .ok_or_else(|| {
            RiskError::InvalidInput(format!("no prices on or after {}", position_date))
        })?;

    // Price matrix: one row per date, one column per component
    let mut matrix = DMatrix::<f64>::zeros(dates.len(), components.len());
    for (j, component) in components.iter().enumerate() {
        for (i, date) in dates.iter().enumerate() {
            matrix[(i, j)] = component.price_on(*date).ok_or_else(|| {
                RiskError::Calculation(format!("{} has no price on {}", component.name(), date))
            })?;
        }
    }

    let anchor_row = dates.iter().position(|d| *d == anchor).unwrap_or(0);
    let shares = DVector::from_iterator(
        components.len(),
        weights
            .iter()
            .enumerate()
            .map(|(j, w)| (v0 * w / matrix[(anchor_row, j)]).round()),
    );

    let values = &matrix * &shares;

    let tickers: Vec<String> = components.iter().map(|c| c.name().to_string()).collect();
    let name = format!("Portfolio_{}", tickers.join("_"));

    debug!(name = %name, dates = dates.len(), anchor = %anchor, "portfolio series built");

    let points = dates
        .iter()
        .zip(values.iter())
        .map(|(date, value)| PricePoint::new(*date, *value))
        .collect();

    Ok(Portfolio {
        tickers,
        shares: shares.iter().copied().collect(),
        position_date: anchor,
        series: PriceSeries::new(name, points)?,
    })
}
