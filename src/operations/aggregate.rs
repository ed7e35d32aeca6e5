#![allow(clippy::cast_precision_loss)]

use crate::error::{Result, UncertainError};
use crate::uncertain::UncertainReal;

/// Sum of a sequence of uncertain numbers.
///
/// # Errors
/// Returns `EmptyData` for an empty slice and the errors of addition otherwise.
///
/// # Example
/// ```rust
/// use uncertain_gum::{INF, Session, operations::sum};
///
/// let session = Session::new();
/// let parts: Vec<_> = (1..=3)
///     .map(|i| session.ureal(f64::from(i), 1.0, INF).unwrap())
///     .collect();
/// let total = sum(&parts).unwrap();
/// assert_eq!(total.value(), 6.0);
/// ```
pub fn sum(numbers: &[UncertainReal]) -> Result<UncertainReal> {
    let (first, rest) = numbers.split_first().ok_or(UncertainError::EmptyData)?;
    rest.iter()
        .try_fold(first.clone(), |total, number| total.try_add(number))
}

/// Arithmetic mean of a sequence of uncertain numbers.
///
/// # Errors
/// Returns `EmptyData` for an empty slice and the errors of the arithmetic otherwise.
///
/// # Example
/// ```rust
/// use uncertain_gum::{INF, Session, operations::mean};
///
/// let session = Session::new();
/// let readings: Vec<_> = (1..=3)
///     .map(|i| session.ureal(f64::from(i), 1.0, INF).unwrap())
///     .collect();
/// let average = mean(&readings).unwrap();
/// assert!((average.u().unwrap() - 1.0 / 3.0_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn mean(numbers: &[UncertainReal]) -> Result<UncertainReal> {
    sum(numbers)?.try_div(numbers.len() as f64)
}

/// Product of a sequence of uncertain numbers.
///
/// # Errors
/// Returns `EmptyData` for an empty slice and the errors of multiplication otherwise.
///
/// # Example
/// ```rust
/// use uncertain_gum::{INF, Session, operations::prod};
///
/// let session = Session::new();
/// let x = session.ureal(2.0, 0.1, INF).unwrap();
/// let y = session.ureal(3.0, 0.1, INF).unwrap();
/// let area = prod(&[x, y]).unwrap();
/// assert_eq!(area.value(), 6.0);
/// ```
pub fn prod(numbers: &[UncertainReal]) -> Result<UncertainReal> {
    let (first, rest) = numbers.split_first().ok_or(UncertainError::EmptyData)?;
    rest.iter()
        .try_fold(first.clone(), |total, number| total.try_mul(number))
}

/// The number with the smallest best estimate.
///
/// The selected number is returned as is, uncertainty included. Ties keep the
/// earliest element.
///
/// # Errors
/// Returns `EmptyData` for an empty slice.
pub fn min(numbers: &[UncertainReal]) -> Result<UncertainReal> {
    numbers
        .iter()
        .min_by(|a, b| a.value().total_cmp(&b.value()))
        .cloned()
        .ok_or(UncertainError::EmptyData)
}

/// The number with the largest best estimate.
///
/// # Errors
/// Returns `EmptyData` for an empty slice.
pub fn max(numbers: &[UncertainReal]) -> Result<UncertainReal> {
    numbers
        .iter()
        .rev()
        .max_by(|a, b| a.value().total_cmp(&b.value()))
        .cloned()
        .ok_or(UncertainError::EmptyData)
}
