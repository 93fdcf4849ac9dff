//! Engine configuration
//!
//! Simulation sizes, seeding and defaults for the companion calculations,
//! typically loaded from YAML or JSON files.

use crate::error::{RiskError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Risk engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Simulated outcomes per anchor date in the Monte Carlo model
    pub monte_carlo_paths: usize,

    /// Simulated terminal prices in the option hedge model
    pub hedge_paths: usize,

    /// Random seed for reproducible Monte Carlo (None = random)
    pub random_seed: Option<u64>,

    /// ES probability used for the unhedged figure of a hedge analysis
    pub hedge_es_prob: f64,

    /// Rolling windows (in years) reported by the parameter table
    pub parameter_windows_years: Vec<u32>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            monte_carlo_paths: 5_000,
            hedge_paths: 1_000_000,
            random_seed: None,
            hedge_es_prob: 0.975,
            parameter_windows_years: vec![2, 5, 10],
        }
    }
}

impl RiskConfig {
    /// Load configuration from YAML string
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use gbm_risk::RiskConfig;
    ///
    /// let yaml = r#"
    /// monte_carlo_paths: 2000
    /// random_seed: 7
    /// "#;
    ///
    /// let config = RiskConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.monte_carlo_paths, 2000);
    /// assert_eq!(config.hedge_paths, 1_000_000);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: RiskConfig = serde_yaml::from_str(yaml)
            .map_err(|e| RiskError::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RiskConfig = serde_json::from_str(json)
            .map_err(|e| RiskError::Config(format!("Failed to parse JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that simulation sizes and probabilities are usable
    pub fn validate(&self) -> Result<()> {
        if self.monte_carlo_paths == 0 {
            return Err(RiskError::Config(
                "monte_carlo_paths must be positive".to_string(),
            ));
        }
        if self.hedge_paths == 0 {
            return Err(RiskError::Config("hedge_paths must be positive".to_string()));
        }
        if !(self.hedge_es_prob > 0.0 && self.hedge_es_prob < 1.0) {
            return Err(RiskError::Config(format!(
                "hedge_es_prob must be in (0, 1), got {}",
                self.hedge_es_prob
            )));
        }
        if self.parameter_windows_years.is_empty()
            || self.parameter_windows_years.contains(&0)
        {
            return Err(RiskError::Config(
                "parameter_windows_years must list positive window lengths".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the random source described by `random_seed`
    pub fn rng(&self) -> StdRng {
        match self.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
