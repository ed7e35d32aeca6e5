//! Combined standard uncertainty, covariance and correlation.
//!
//! All quantities here are evaluated from the sensitivity vectors of the
//! numbers involved and the covariance table of their session. The variance
//! of `y` is the full bilinear form
//!
//! ```text
//! u²(y) = Σᵢ Σⱼ cᵢ cⱼ cov(xᵢ, xⱼ)
//! ```
//!
//! over its elementary ancestors `xᵢ` with sensitivity coefficients `cᵢ`,
//! so declared correlations between ancestors are always taken into account.

use crate::error::{Result, UncertainError};
use crate::registry::{ElementaryId, Registry};
use crate::sensitivity::Sensitivity;
use crate::uncertain::UncertainReal;
use tracing::warn;

/// One row of an uncertainty budget.
#[derive(Debug, Clone, PartialEq)]
pub struct UncertaintyComponent {
    /// The elementary quantity contributing
    pub id: ElementaryId,
    /// Its label, if it was declared with one
    pub label: Option<String>,
    /// Partial derivative of the result with respect to it
    pub sensitivity: f64,
    /// Signed component of uncertainty: sensitivity times standard uncertainty
    pub u_component: f64,
}

/// Σᵢ Σⱼ aᵢ bⱼ cov(i, j), with the sum of term magnitudes for rounding checks.
fn bilinear(registry: &Registry, a: &Sensitivity, b: &Sensitivity) -> (f64, f64) {
    let mut total = 0.0;
    let mut magnitude = 0.0;
    for (i, ai) in a.iter() {
        let bi = b.get(i);
        if bi != 0.0 {
            let term = ai * bi * registry.variance_of(i);
            total += term;
            magnitude += term.abs();
        }
        for (j, covariance) in registry.partners(i) {
            let bj = b.get(j);
            if bj != 0.0 {
                let term = ai * bj * covariance;
                total += term;
                magnitude += term.abs();
            }
        }
    }
    (total, magnitude)
}

fn ensure_pair(x: &UncertainReal, y: &UncertainReal, registry: &Registry) -> Result<()> {
    if !x.session().same_as(y.session()) {
        return Err(UncertainError::stale(
            "uncertain numbers belong to different sessions",
        ));
    }
    x.ensure_live(registry)?;
    y.ensure_live(registry)
}

impl UncertainReal {
    pub(crate) fn variance_in(&self, registry: &Registry) -> Result<f64> {
        self.ensure_live(registry)?;
        if let Some(id) = self.elementary_id() {
            return Ok(registry.record(id)?.variance());
        }

        let (variance, magnitude) = bilinear(registry, self.sensitivities(), self.sensitivities());
        if variance >= 0.0 {
            return Ok(variance);
        }
        if -variance <= registry.config().tolerance * magnitude {
            warn!(variance, "clamping rounding-negative variance to zero");
            return Ok(0.0);
        }
        Err(UncertainError::invalid_correlation(format!(
            "declared covariances give a negative variance ({variance}); \
             the covariance table is not positive semi-definite"
        )))
    }

    pub(crate) fn uncertainty_in(&self, registry: &Registry) -> Result<f64> {
        self.ensure_live(registry)?;
        if let Some(id) = self.elementary_id() {
            return Ok(registry.record(id)?.uncertainty);
        }
        Ok(self.variance_in(registry)?.sqrt())
    }

    pub(crate) fn covariance_in(&self, other: &UncertainReal, registry: &Registry) -> Result<f64> {
        ensure_pair(self, other, registry)?;
        Ok(bilinear(registry, self.sensitivities(), other.sensitivities()).0)
    }

    pub(crate) fn correlation_in(&self, other: &UncertainReal, registry: &Registry) -> Result<f64> {
        let covariance = self.covariance_in(other, registry)?;
        let scale = self.uncertainty_in(registry)? * other.uncertainty_in(registry)?;
        if scale == 0.0 {
            return Err(UncertainError::UndefinedCorrelation);
        }
        Ok(covariance / scale)
    }

    /// Combined variance `u²`.
    ///
    /// # Errors
    /// Returns `StaleReference` if the session was reset, and
    /// `InvalidCorrelation` if the declared covariances are inconsistent
    /// enough to make the variance negative.
    pub fn variance(&self) -> Result<f64> {
        self.variance_in(&self.session().read())
    }

    /// Combined standard uncertainty.
    ///
    /// For an elementary number this is exactly the declared uncertainty.
    ///
    /// # Errors
    /// See [`UncertainReal::variance`].
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let v = session.ureal(0.1, 1e-3, INF).unwrap();
    /// let i = session.ureal(0.015, 0.5e-3, INF).unwrap();
    /// let r = (&v / &i).unwrap();
    /// assert!((r.u().unwrap() - 0.23).abs() < 0.01);
    /// ```
    pub fn u(&self) -> Result<f64> {
        self.uncertainty_in(&self.session().read())
    }

    /// Alias of [`UncertainReal::u`].
    ///
    /// # Errors
    /// See [`UncertainReal::variance`].
    pub fn standard_uncertainty(&self) -> Result<f64> {
        self.u()
    }

    /// Covariance between two uncertain numbers of the same session.
    ///
    /// # Errors
    /// Returns `StaleReference` if either number is stale or the numbers come
    /// from different sessions.
    pub fn covariance(&self, other: &UncertainReal) -> Result<f64> {
        self.covariance_in(other, &self.session().read())
    }

    /// Correlation coefficient between two uncertain numbers.
    ///
    /// # Errors
    /// Returns `UndefinedCorrelation` if either standard uncertainty is zero,
    /// plus the errors of [`UncertainReal::covariance`].
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let a = session.ureal(1.0, 0.1, INF).unwrap();
    /// let b = session.ureal(2.0, 0.1, INF).unwrap();
    /// let x = (&a + &b).unwrap();
    /// let y = (&a - &b).unwrap();
    /// assert!(x.correlation(&y).unwrap().abs() < 1e-12);
    /// ```
    pub fn correlation(&self, other: &UncertainReal) -> Result<f64> {
        self.correlation_in(other, &self.session().read())
    }

    fn sensitivity_in(&self, x: &UncertainReal, registry: &Registry) -> Result<f64> {
        ensure_pair(self, x, registry)?;
        if let Some(id) = x.elementary_id() {
            registry.record(id)?;
            return Ok(self.sensitivities().get(id));
        }
        if let Some(id) = x.intermediate_id() {
            registry.intermediate(id)?;
            return Ok(self.intermediate_sensitivities().get(id));
        }
        Err(UncertainError::invalid_parameter(
            "x",
            x.value(),
            "must be elementary or declared with Session::result",
        ))
    }

    /// Partial derivative with respect to `x`, an elementary number or an
    /// intermediate result; zero if `self` does not depend on it.
    ///
    /// For an intermediate result only the influence flowing through it is
    /// counted.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `x` is neither elementary nor a declared
    /// intermediate result, and `StaleReference` if either number is stale or
    /// they come from different sessions.
    pub fn sensitivity(&self, x: &UncertainReal) -> Result<f64> {
        self.sensitivity_in(x, &self.session().read())
    }

    /// Signed component of uncertainty due to `x`: the sensitivity times the
    /// standard uncertainty of `x`.
    ///
    /// # Errors
    /// See [`UncertainReal::sensitivity`].
    pub fn u_component(&self, x: &UncertainReal) -> Result<f64> {
        let registry = self.session().read();
        Ok(self.sensitivity_in(x, &registry)? * x.uncertainty_in(&registry)?)
    }

    /// Uncertainty budget: one component per ancestor, largest magnitude first.
    ///
    /// # Errors
    /// Returns `StaleReference` if the session was reset.
    pub fn components(&self) -> Result<Vec<UncertaintyComponent>> {
        let registry = self.session().read();
        self.ensure_live(&registry)?;
        let mut components = self
            .sensitivities()
            .iter()
            .map(|(id, sensitivity)| {
                let record = registry.record(id)?;
                Ok(UncertaintyComponent {
                    id,
                    label: record.label.clone(),
                    sensitivity,
                    u_component: sensitivity * record.uncertainty,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        components.sort_by(|a, b| b.u_component.abs().total_cmp(&a.u_component.abs()));
        Ok(components)
    }
}

/// Covariance matrix of a set of uncertain numbers from one session.
///
/// # Errors
/// Returns `StaleReference` if any number is stale or from another session.
pub fn covariance_matrix(numbers: &[UncertainReal]) -> Result<Vec<Vec<f64>>> {
    let Some(first) = numbers.first() else {
        return Ok(Vec::new());
    };
    let registry = first.session().read();
    numbers
        .iter()
        .map(|a| {
            numbers
                .iter()
                .map(|b| a.covariance_in(b, &registry))
                .collect()
        })
        .collect()
}

/// Correlation matrix of a set of uncertain numbers from one session.
///
/// # Errors
/// Returns `UndefinedCorrelation` if any number has zero uncertainty, plus the
/// errors of [`covariance_matrix`].
pub fn correlation_matrix(numbers: &[UncertainReal]) -> Result<Vec<Vec<f64>>> {
    let Some(first) = numbers.first() else {
        return Ok(Vec::new());
    };
    let registry = first.session().read();
    numbers
        .iter()
        .map(|a| {
            numbers
                .iter()
                .map(|b| a.correlation_in(b, &registry))
                .collect()
        })
        .collect()
}

/// Parallel covariance matrix, one row per rayon task.
///
/// # Errors
/// See [`covariance_matrix`].
#[cfg(feature = "parallel")]
pub fn covariance_matrix_par(numbers: &[UncertainReal]) -> Result<Vec<Vec<f64>>> {
    use rayon::prelude::*;

    let Some(first) = numbers.first() else {
        return Ok(Vec::new());
    };
    let registry = first.session().read();
    let registry = &*registry;
    numbers
        .par_iter()
        .map(|a| {
            numbers
                .iter()
                .map(|b| a.covariance_in(b, registry))
                .collect()
        })
        .collect()
}
