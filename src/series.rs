//! Historical price series
//!
//! A `PriceSeries` is an immutable sequence of dated adjusted close prices,
//! always stored most recent first. All estimators borrow it read-only.

use crate::error::{RiskError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Price history of one instrument, most recent first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    name: String,
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    /// Build a series from points in ascending or descending date order
    ///
    /// The points are normalized to most-recent-first. Empty input,
    /// duplicate dates and non-positive prices are rejected.
    pub fn new(name: impl Into<String>, mut points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(RiskError::InvalidInput("price series is empty".to_string()));
        }

        if let Some(bad) = points.iter().find(|p| !p.price.is_finite() || p.price <= 0.0) {
            return Err(RiskError::InvalidInput(format!(
                "price on {} must be positive, got {}",
                bad.date, bad.price
            )));
        }

        points.sort_by(|a, b| b.date.cmp(&a.date));

        if let Some(dup) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(RiskError::InvalidInput(format!(
                "duplicate date {} in price series",
                dup[0].date
            )));
        }

        let (dates, prices) = points.into_iter().map(|p| (p.date, p.price)).unzip();

        Ok(Self {
            name: name.into(),
            dates,
            prices,
        })
    }

    /// Build a series from parallel date and price vectors
    pub fn from_columns(
        name: impl Into<String>,
        dates: Vec<NaiveDate>,
        prices: Vec<f64>,
    ) -> Result<Self> {
        if dates.len() != prices.len() {
            return Err(RiskError::InvalidInput(format!(
                "{} dates but {} prices",
                dates.len(),
                prices.len()
            )));
        }
        let points = dates
            .into_iter()
            .zip(prices)
            .map(|(date, price)| PricePoint::new(date, price))
            .collect();
        Self::new(name, points)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prices, most recent first
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Dates, most recent first
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Most recent observation
    pub fn latest(&self) -> PricePoint {
        PricePoint::new(self.dates[0], self.prices[0])
    }

    /// Price on an exact date
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search_by(|d| date.cmp(d))
            .ok()
            .map(|i| self.prices[i])
    }

    /// Number of observations dated on or after `position_date`
    ///
    /// This is the length of the caller's display window.
    pub fn display_len(&self, position_date: NaiveDate) -> usize {
        self.dates.partition_point(|d| *d >= position_date)
    }
}
