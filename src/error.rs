//! Error types for the risk engines

use thiserror::Error;

/// Errors that can occur in risk calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    #[error("Volatility must be positive, got {0}")]
    NonPositiveVolatility(f64),

    #[error("Unknown risk method: {0:?}")]
    UnknownMethod(String),

    #[error("Insufficient history: need {required} observations, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RiskError {
    /// Whether the error was caused by a bad caller-supplied argument
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            RiskError::InvalidInput(_)
                | RiskError::InvalidConfidenceLevel(_)
                | RiskError::NonPositiveVolatility(_)
                | RiskError::UnknownMethod(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;

/// Reject probabilities outside the open interval (0, 1)
pub(crate) fn check_probability(p: f64) -> Result<()> {
    if !(p > 0.0 && p < 1.0) {
        return Err(RiskError::InvalidConfidenceLevel(p));
    }
    Ok(())
}

/// Reject negative or non-finite portfolio values
pub(crate) fn check_value(v0: f64) -> Result<()> {
    if !v0.is_finite() || v0 < 0.0 {
        return Err(RiskError::InvalidInput(format!(
            "portfolio value must be finite and non-negative, got {}",
            v0
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_grouping() {
        assert!(RiskError::UnknownMethod("foo".into()).is_invalid_input());
        assert!(RiskError::NonPositiveVolatility(0.0).is_invalid_input());
        assert!(!RiskError::InsufficientHistory { required: 10, available: 5 }.is_invalid_input());
        assert!(!RiskError::Config("bad".into()).is_invalid_input());
    }

    #[test]
    fn test_probability_bounds() {
        assert!(check_probability(0.99).is_ok());
        assert!(check_probability(0.0).is_err());
        assert!(check_probability(1.0).is_err());
        assert!(check_probability(f64::NAN).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = RiskError::InsufficientHistory { required: 504, available: 300 };
        assert_eq!(
            err.to_string(),
            "Insufficient history: need 504 observations, got 300"
        );
        assert_eq!(
            RiskError::UnknownMethod("Magic".into()).to_string(),
            "Unknown risk method: \"Magic\""
        );
    }
}
