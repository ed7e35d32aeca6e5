//! Error types for the uncertain-gum library.
//!
//! Every fallible operation in the crate reports one of these errors at the
//! point where it happens. Nothing is retried and nothing is silently
//! recovered, since a wrong uncertainty is worse than no uncertainty.

use thiserror::Error;

/// The main error type for the uncertain-gum library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UncertainError {
    /// An operation is undefined at the operand value (division by zero,
    /// logarithm of a non-positive value, fractional power of a negative base).
    #[error("Domain error in '{operation}' at {value}: {reason}")]
    Domain {
        /// The operation that was attempted
        operation: &'static str,
        /// The offending operand value
        value: f64,
        /// Why the operation is undefined there
        reason: &'static str,
    },

    /// A covariance or correlation declaration was rejected.
    #[error("Invalid correlation: {reason}")]
    InvalidCorrelation {
        /// The reason the declaration was rejected
        reason: String,
    },

    /// An uncertain number or identity outlived the session state it refers to.
    #[error("Stale reference: {reason}")]
    StaleReference {
        /// What made the reference stale
        reason: &'static str,
    },

    /// A correlation coefficient was requested for a number with zero uncertainty.
    #[error("Undefined correlation: standard uncertainty of an argument is zero")]
    UndefinedCorrelation,

    /// Error when an invalid parameter value is provided.
    #[error("Invalid parameter '{parameter}': value {value} {constraint}")]
    InvalidParameter {
        /// The name of the parameter
        parameter: &'static str,
        /// The invalid value
        value: f64,
        /// A description of the constraint that was violated
        constraint: &'static str,
    },

    /// Error when a parameter is not finite (NaN or infinite).
    #[error("Non-finite parameter '{parameter}': {value}")]
    NonFiniteParameter {
        /// The name of the parameter
        parameter: &'static str,
        /// The non-finite value
        value: f64,
    },

    /// Error when an empty collection is provided.
    #[error("Empty data: at least one element is required")]
    EmptyData,

    /// Error when too few observations are provided for a statistical estimate.
    #[error("Insufficient data: {required} observations required, got {actual}")]
    InsufficientData {
        /// The minimum number of observations
        required: usize,
        /// The number of observations provided
        actual: usize,
    },
}

/// A specialized `Result` type for uncertain operations.
///
/// This is a convenience type alias for `Result<T, UncertainError>`.
pub type Result<T> = std::result::Result<T, UncertainError>;

impl UncertainError {
    /// Create a domain error for an operation evaluated outside its domain.
    ///
    /// # Example
    /// ```
    /// use uncertain_gum::error::UncertainError;
    ///
    /// let error = UncertainError::domain("ln", -1.0, "argument must be positive");
    /// assert!(error.to_string().contains("ln"));
    /// ```
    pub fn domain(operation: &'static str, value: f64, reason: &'static str) -> Self {
        Self::Domain {
            operation,
            value,
            reason,
        }
    }

    /// Create an error for a rejected covariance declaration.
    ///
    /// # Example
    /// ```
    /// use uncertain_gum::error::UncertainError;
    ///
    /// let error = UncertainError::invalid_correlation("identities must differ");
    /// assert!(error.to_string().contains("identities must differ"));
    /// ```
    pub fn invalid_correlation(reason: impl Into<String>) -> Self {
        Self::InvalidCorrelation {
            reason: reason.into(),
        }
    }

    /// Create an error for a reference to reset or foreign session state.
    ///
    /// # Example
    /// ```
    /// use uncertain_gum::error::UncertainError;
    ///
    /// let error = UncertainError::stale("session was reset");
    /// assert!(error.to_string().contains("session was reset"));
    /// ```
    pub fn stale(reason: &'static str) -> Self {
        Self::StaleReference { reason }
    }

    /// Create an error for invalid parameter with constraint.
    ///
    /// # Example
    /// ```
    /// use uncertain_gum::error::UncertainError;
    ///
    /// let error = UncertainError::invalid_parameter("uncertainty", -1.0, "must be non-negative");
    /// assert!(error.to_string().contains("uncertainty"));
    /// ```
    pub fn invalid_parameter(
        parameter: &'static str,
        value: f64,
        constraint: &'static str,
    ) -> Self {
        Self::InvalidParameter {
            parameter,
            value,
            constraint,
        }
    }

    /// Create an error for non-finite parameter.
    ///
    /// # Example
    /// ```
    /// use uncertain_gum::error::UncertainError;
    ///
    /// let error = UncertainError::non_finite("value", f64::NAN);
    /// assert!(error.to_string().contains("value"));
    /// ```
    pub fn non_finite(parameter: &'static str, value: f64) -> Self {
        Self::NonFiniteParameter { parameter, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error() {
        let error = UncertainError::domain("div", 0.0, "division by zero");
        assert_eq!(
            error.to_string(),
            "Domain error in 'div' at 0: division by zero"
        );
    }

    #[test]
    fn test_invalid_correlation_error() {
        let error = UncertainError::invalid_correlation("diagonal entries are not settable");
        assert_eq!(
            error.to_string(),
            "Invalid correlation: diagonal entries are not settable"
        );
    }

    #[test]
    fn test_stale_reference_error() {
        let error = UncertainError::stale("session was reset");
        assert_eq!(error.to_string(), "Stale reference: session was reset");
    }

    #[test]
    fn test_undefined_correlation_error() {
        let error = UncertainError::UndefinedCorrelation;
        assert!(error.to_string().contains("zero"));
    }

    #[test]
    fn test_invalid_parameter_error() {
        let error = UncertainError::invalid_parameter("dof", -1.0, "must be positive");
        assert!(error.to_string().contains("dof"));
        assert!(error.to_string().contains("-1"));
        assert!(error.to_string().contains("must be positive"));
    }

    #[test]
    fn test_non_finite_error() {
        let error = UncertainError::non_finite("value", f64::NAN);
        assert!(error.to_string().contains("value"));
        assert!(error.to_string().contains("NaN"));
    }

    #[test]
    fn test_insufficient_data_error() {
        let error = UncertainError::InsufficientData {
            required: 2,
            actual: 1,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient data: 2 observations required, got 1"
        );
    }

    #[test]
    fn test_error_partial_eq() {
        let error1 = UncertainError::stale("a");
        let error2 = UncertainError::stale("a");
        let error3 = UncertainError::UndefinedCorrelation;

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }
}
