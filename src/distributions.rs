#![allow(clippy::cast_precision_loss)]

//! Type-A and Type-B evaluations of standard uncertainty.
//!
//! Type-B helpers convert the half-width of an assumed distribution, or a
//! stated expanded uncertainty, into a standard uncertainty suitable for
//! [`Session::ureal`]. [`Session::type_a`] declares an elementary quantity
//! from repeated observations.

use crate::error::{Result, UncertainError};
use crate::registry::Session;
use crate::uncertain::UncertainReal;

fn check_half_width(half_width: f64) -> Result<f64> {
    if !half_width.is_finite() {
        return Err(UncertainError::non_finite("half_width", half_width));
    }
    if half_width < 0.0 {
        return Err(UncertainError::invalid_parameter(
            "half_width",
            half_width,
            "must be non-negative",
        ));
    }
    Ok(half_width)
}

/// Standard uncertainty of a rectangular distribution of half-width `a`: `a / √3`.
///
/// # Errors
/// Returns an error if `half_width` is negative or not finite.
///
/// # Example
/// ```rust
/// use uncertain_gum::distributions::uniform;
///
/// let u = uniform(3.0_f64.sqrt()).unwrap();
/// assert!((u - 1.0).abs() < 1e-12);
/// ```
pub fn uniform(half_width: f64) -> Result<f64> {
    Ok(check_half_width(half_width)? / 3.0_f64.sqrt())
}

/// Standard uncertainty of a symmetric triangular distribution: `a / √6`.
///
/// # Errors
/// Returns an error if `half_width` is negative or not finite.
pub fn triangular(half_width: f64) -> Result<f64> {
    Ok(check_half_width(half_width)? / 6.0_f64.sqrt())
}

/// Standard uncertainty of an arcsine (U-shaped) distribution: `a / √2`.
///
/// # Errors
/// Returns an error if `half_width` is negative or not finite.
pub fn arcsine(half_width: f64) -> Result<f64> {
    Ok(check_half_width(half_width)? / 2.0_f64.sqrt())
}

/// Standard uncertainty from an expanded uncertainty and its coverage factor.
///
/// # Errors
/// Returns an error if `expanded` is negative or not finite, or the coverage
/// factor is not positive.
pub fn from_expanded(expanded: f64, coverage_factor: f64) -> Result<f64> {
    let expanded = check_half_width(expanded)?;
    if !coverage_factor.is_finite() || coverage_factor <= 0.0 {
        return Err(UncertainError::invalid_parameter(
            "coverage_factor",
            coverage_factor,
            "must be positive and finite",
        ));
    }
    Ok(expanded / coverage_factor)
}

impl Session {
    /// Declares an elementary quantity from repeated observations.
    ///
    /// The value is the sample mean, the standard uncertainty the
    /// experimental standard deviation of the mean, and the degrees of
    /// freedom `n - 1`.
    ///
    /// # Errors
    /// Returns `InsufficientData` for fewer than two observations and
    /// `NonFiniteParameter` if any observation is NaN or infinite.
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::Session;
    ///
    /// let session = Session::new();
    /// let x = session.type_a(&[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(x.value(), 2.0);
    /// assert_eq!(x.dof().unwrap(), 2.0);
    /// ```
    pub fn type_a(&self, observations: &[f64]) -> Result<UncertainReal> {
        let n = observations.len();
        if n < 2 {
            return Err(UncertainError::InsufficientData {
                required: 2,
                actual: n,
            });
        }
        if let Some(&bad) = observations.iter().find(|x| !x.is_finite()) {
            return Err(UncertainError::non_finite("observations", bad));
        }

        let count = n as f64;
        let mean = observations.iter().sum::<f64>() / count;
        let sum_squares: f64 = observations.iter().map(|x| (x - mean).powi(2)).sum();
        let variance = sum_squares / (count - 1.0);
        self.create(mean, (variance / count).sqrt(), count - 1.0, None)
    }
}
