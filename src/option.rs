//! Black-Scholes European put pricing
//!
//! `d1 = (ln(S/K) + (r + sigma^2/2) T) / (sigma sqrt(T))`, `d2 = d1 - sigma sqrt(T)`
//!
//! `P = K e^(-rT) N(-d2) - S N(-d1)`
//!
//! At or past expiry the put is worth its intrinsic value `max(K - S, 0)`.

use crate::error::{RiskError, Result};
use crate::standard_normal;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Put option terms held against a stock position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionPosition {
    /// Strike price
    pub strike: f64,

    /// Time to expiration in years
    pub maturity: f64,

    /// Implied volatility used for pricing
    pub implied_vol: f64,

    /// Continuously compounded risk-free rate
    pub risk_free_rate: f64,

    /// Number of puts held
    pub share_count: f64,
}

impl OptionPosition {
    /// Pricer for one put of this position
    pub fn pricer(&self) -> Result<OptionPricer> {
        OptionPricer::new(self.risk_free_rate, self.implied_vol, self.strike)
    }

    /// Value of the position at `spot` with the full maturity remaining
    pub fn value(&self, spot: f64) -> Result<f64> {
        Ok(self.share_count * self.pricer()?.put(spot, self.maturity)?)
    }
}

/// Black-Scholes put pricer for a fixed rate, volatility and strike
#[derive(Debug, Clone)]
pub struct OptionPricer {
    rate: f64,
    vol: f64,
    strike: f64,
    normal: Normal,
}

impl OptionPricer {
    pub fn new(rate: f64, vol: f64, strike: f64) -> Result<Self> {
        if !(vol > 0.0) || !vol.is_finite() {
            return Err(RiskError::NonPositiveVolatility(vol));
        }
        if !(strike > 0.0) || !strike.is_finite() {
            return Err(RiskError::InvalidInput(format!(
                "strike must be positive, got {}",
                strike
            )));
        }
        if !rate.is_finite() {
            return Err(RiskError::InvalidInput(format!(
                "risk-free rate must be finite, got {}",
                rate
            )));
        }
        Ok(Self {
            rate,
            vol,
            strike,
            normal: standard_normal()?,
        })
    }

    /// Put price at `spot` with `maturity` years remaining
    pub fn put(&self, spot: f64, maturity: f64) -> Result<f64> {
        if !(spot > 0.0) || !spot.is_finite() {
            return Err(RiskError::InvalidInput(format!(
                "spot must be positive, got {}",
                spot
            )));
        }
        Ok(self.put_unchecked(spot, maturity))
    }

    /// Put prices for many spots sharing one maturity
    pub fn put_many(&self, spots: &[f64], maturity: f64) -> Result<Vec<f64>> {
        spots.iter().map(|s| self.put(*s, maturity)).collect()
    }

    pub(crate) fn put_unchecked(&self, spot: f64, maturity: f64) -> f64 {
        if maturity <= 0.0 {
            return (self.strike - spot).max(0.0);
        }

        let sig_rt = self.vol * maturity.sqrt();
        let d1 = ((spot / self.strike).ln() + (self.rate + self.vol * self.vol / 2.0) * maturity)
            / sig_rt;
        let d2 = d1 - sig_rt;
        let discounted_strike = self.strike * (-self.rate * maturity).exp();

        // Rounding can leave deep out-of-the-money puts a hair below zero
        (discounted_strike * self.normal.cdf(-d2) - spot * self.normal.cdf(-d1)).max(0.0)
    }

    /// One-shot put price
    pub fn put_price(
        spot: f64,
        risk_free_rate: f64,
        vol: f64,
        strike: f64,
        maturity_years: f64,
    ) -> Result<f64> {
        Self::new(risk_free_rate, vol, strike)?.put(spot, maturity_years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_textbook_put() {
        // Hull: S=100, K=100, r=5%, sigma=20%, T=1
        let price = OptionPricer::put_price(100.0, 0.05, 0.2, 100.0, 1.0).unwrap();
        assert_relative_eq!(price, 5.5735, epsilon = 1e-3);
    }

    #[test]
    fn test_put_call_parity() {
        let (s, k, r, v, t) = (95.0, 100.0, 0.03, 0.25, 0.5);
        let put = OptionPricer::put_price(s, r, v, k, t).unwrap();

        let normal = standard_normal().unwrap();
        let d1 = ((s / k).ln() + (r + v * v / 2.0) * t) / (v * t.sqrt());
        let d2 = d1 - v * t.sqrt();
        let call = s * normal.cdf(d1) - k * (-r * t).exp() * normal.cdf(d2);

        assert_relative_eq!(call - put, s - k * (-r * t).exp(), epsilon = 1e-10);
    }

    #[test]
    fn test_expiry_gives_intrinsic() {
        let pricer = OptionPricer::new(0.01, 0.3, 100.0).unwrap();
        assert_eq!(pricer.put(80.0, 0.0).unwrap(), 20.0);
        assert_eq!(pricer.put(120.0, 0.0).unwrap(), 0.0);
        assert_eq!(pricer.put(80.0, -0.1).unwrap(), 20.0);

        let near = pricer.put(80.0, 1e-10).unwrap();
        assert_relative_eq!(near, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_negative() {
        let pricer = OptionPricer::new(0.05, 0.1, 50.0).unwrap();
        let prices = pricer.put_many(&[1.0, 25.0, 50.0, 100.0, 1_000.0], 2.0).unwrap();
        assert!(prices.iter().all(|p| *p >= 0.0));
        assert!(prices[0] > prices[2]);
    }

    #[test]
    fn test_rejects_degenerate_inputs() {
        assert!(matches!(
            OptionPricer::put_price(100.0, 0.05, 0.0, 100.0, 1.0),
            Err(RiskError::NonPositiveVolatility(_))
        ));
        assert!(OptionPricer::put_price(100.0, 0.05, -0.2, 100.0, 1.0).is_err());
        assert!(OptionPricer::put_price(0.0, 0.05, 0.2, 100.0, 1.0).is_err());
        assert!(OptionPricer::put_price(100.0, 0.05, 0.2, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_position_value() {
        let position = OptionPosition {
            strike: 100.0,
            maturity: 1.0,
            implied_vol: 0.2,
            risk_free_rate: 0.05,
            share_count: 10.0,
        };
        assert_relative_eq!(position.value(100.0).unwrap(), 55.735, epsilon = 1e-2);
    }
}
