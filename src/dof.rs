//! Effective degrees of freedom by the Welch–Satterthwaite formula.
//!
//! ```text
//! ν_eff = u⁴(y) / Σᵢ (cᵢ² u²(xᵢ))² / νᵢ
//! ```
//!
//! `u²(y)` is the full combined variance, including declared correlations,
//! while the denominator treats the ancestors as independent. That is the
//! usual GUM approximation and is kept as is.

use crate::error::Result;
use crate::registry::{INF, Registry};
use crate::uncertain::UncertainReal;

/// Welch–Satterthwaite from a combined variance and `(variance contribution, dof)` pairs.
///
/// Contributions with infinite degrees of freedom vanish from the denominator.
/// A zero denominator gives [`INF`].
///
/// # Example
/// ```rust
/// use uncertain_gum::dof::welch_satterthwaite;
///
/// // two equal contributions with 4 degrees of freedom each
/// let nu = welch_satterthwaite(2.0, [(1.0, 4.0), (1.0, 4.0)]);
/// assert!((nu - 8.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn welch_satterthwaite<I>(combined_variance: f64, contributions: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let denominator: f64 = contributions
        .into_iter()
        .filter(|&(_, dof)| dof.is_finite())
        .map(|(variance, dof)| variance * variance / dof)
        .sum();

    if denominator == 0.0 {
        INF
    } else {
        combined_variance * combined_variance / denominator
    }
}

impl UncertainReal {
    pub(crate) fn dof_in(&self, registry: &Registry) -> Result<f64> {
        self.ensure_live(registry)?;
        if let Some(id) = self.elementary_id() {
            return Ok(registry.record(id)?.dof);
        }

        let variance = self.variance_in(registry)?;
        if variance == 0.0 {
            return Ok(INF);
        }
        let contributions = self
            .sensitivities()
            .iter()
            .map(|(id, coefficient)| {
                let record = registry.record(id)?;
                Ok((coefficient * coefficient * record.variance(), record.dof))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(welch_satterthwaite(variance, contributions))
    }

    /// Effective degrees of freedom; [`INF`] when every contributing input has
    /// infinite degrees of freedom or the uncertainty is zero.
    ///
    /// # Errors
    /// Returns `StaleReference` if the session was reset.
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let a = session.ureal(1.0, 0.1, 4.0).unwrap();
    /// let b = session.ureal(2.0, 0.1, INF).unwrap();
    /// let sum = (&a + &b).unwrap();
    /// // (0.02)² / (0.01² / 4)
    /// assert!((sum.dof().unwrap() - 16.0).abs() < 1e-9);
    /// ```
    pub fn dof(&self) -> Result<f64> {
        self.dof_in(&self.session().read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_elementary_dof_is_declared() {
        let session = Session::new();
        let x = session.ureal(1.0, 0.1, 7.0).unwrap();
        assert_eq!(x.dof().unwrap(), 7.0);

        let y = session.ureal(1.0, 0.1, INF).unwrap();
        assert!(y.dof().unwrap().is_infinite());
    }

    #[test]
    fn test_equal_contributions_add_dof() {
        let session = Session::new();
        let a = session.ureal(1.0, 0.2, 4.0).unwrap();
        let b = session.ureal(1.0, 0.2, 4.0).unwrap();
        let sum = (&a + &b).unwrap();
        assert!((sum.dof().unwrap() - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlated_inputs_use_full_variance_with_independent_denominator() {
        let session = Session::new();
        let a = session.ureal(1.0, 0.2, 4.0).unwrap();
        let b = session.ureal(1.0, 0.2, 4.0).unwrap();
        session.correlate(&a, &b, 0.5).unwrap();
        let total = (&a + &b).unwrap();

        let variance = total.variance().unwrap();
        assert!((variance - 0.12).abs() < 1e-12);

        // (0.12)² / (2 · 0.04² / 4)
        let dof = total.dof().unwrap();
        assert!((dof - 18.0).abs() < 1e-9, "dof = {dof}");
        assert!((dof - welch_satterthwaite(0.12, [(0.04, 4.0), (0.04, 4.0)])).abs() < 1e-9);
    }

    #[test]
    fn test_scaling_preserves_dof() {
        let session = Session::new();
        let a = session.ureal(3.0, 0.2, 5.0).unwrap();
        let scaled = (&a * 10.0).unwrap();
        assert!((scaled.dof().unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_infinite_gives_infinite() {
        let session = Session::new();
        let v = session.ureal(0.1, 1e-3, INF).unwrap();
        let i = session.ureal(0.015, 0.5e-3, INF).unwrap();
        let r = (&v / &i).unwrap();
        assert!(r.dof().unwrap().is_infinite());
    }

    #[test]
    fn test_zero_variance_gives_infinite() {
        let session = Session::new();
        let a = session.ureal(3.0, 0.2, 5.0).unwrap();
        let zero = (&a - &a).unwrap();
        assert!(zero.dof().unwrap().is_infinite());
    }

    #[test]
    fn test_large_finite_dof_is_summed() {
        let nu = welch_satterthwaite(1.0, [(1.0, 1e12)]);
        assert!((nu - 1e12).abs() < 1.0);
    }

    #[test]
    fn test_dof_after_reset_is_stale() {
        let session = Session::new();
        let a = session.ureal(3.0, 0.2, 5.0).unwrap();
        session.reset();
        assert!(a.dof().is_err());
    }
}
