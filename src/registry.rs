//! Elementary quantity registry and the session handle that owns it.
//!
//! A [`Session`] is the scope of one uncertainty calculation. It issues
//! identities for elementary quantities and keeps the covariance table between
//! them. Uncertain numbers remember the session epoch they were created in;
//! after [`Session::reset`] they are stale and every further use fails.

use crate::error::{Result, UncertainError};
use crate::sensitivity::Sensitivity;
use crate::uncertain::UncertainReal;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Degrees of freedom sentinel for Type-B evaluations and exactly known inputs.
pub const INF: f64 = f64::INFINITY;

// Process-wide so that identities from different sessions never collide.
static NEXT_INDEX: AtomicU64 = AtomicU64::new(0);

/// Identity of an elementary quantity. Never reused within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementaryId(u64);

impl ElementaryId {
    /// The sequence number of this identity.
    #[must_use]
    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// What the registry stores about one elementary quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementaryRecord {
    /// Best estimate
    pub value: f64,
    /// Standard uncertainty
    pub uncertainty: f64,
    /// Degrees of freedom, or [`INF`]
    pub dof: f64,
    /// Optional human-readable label
    pub label: Option<String>,
}

impl ElementaryRecord {
    /// The diagonal entry of the covariance table for this quantity.
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.uncertainty * self.uncertainty
    }
}

/// What the registry stores about a declared intermediate result.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermediateRecord {
    /// Best estimate at declaration
    pub value: f64,
    /// Optional human-readable label
    pub label: Option<String>,
    /// Sensitivities with respect to elementary quantities at declaration
    pub sensitivity: Sensitivity,
}

/// Numerical policy of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Relative tolerance used for the covariance bound check, cancellation of
    /// sensitivity coefficients and clamping of rounding-negative variances.
    pub tolerance: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { tolerance: 1e-12 }
    }
}

impl SessionConfig {
    /// Replace the relative tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() {
            return Err(UncertainError::non_finite("tolerance", self.tolerance));
        }
        if !(0.0..1.0).contains(&self.tolerance) {
            return Err(UncertainError::invalid_parameter(
                "tolerance",
                self.tolerance,
                "must be in range [0, 1)",
            ));
        }
        Ok(())
    }
}

/// Registry state: elementary records and the sparse, symmetric covariance table.
///
/// Diagonal entries are never stored; they are derived from each record's
/// uncertainty. Off-diagonal entries are stored in both directions.
#[derive(Debug)]
pub(crate) struct Registry {
    epoch: Uuid,
    config: SessionConfig,
    records: HashMap<ElementaryId, ElementaryRecord>,
    intermediates: HashMap<ElementaryId, IntermediateRecord>,
    covariances: HashMap<ElementaryId, HashMap<ElementaryId, f64>>,
}

impl Registry {
    fn new(config: SessionConfig) -> Self {
        Self {
            epoch: Uuid::new_v4(),
            config,
            records: HashMap::new(),
            intermediates: HashMap::new(),
            covariances: HashMap::new(),
        }
    }

    pub(crate) fn epoch(&self) -> Uuid {
        self.epoch
    }

    pub(crate) fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn record(&self, id: ElementaryId) -> Result<&ElementaryRecord> {
        self.records
            .get(&id)
            .ok_or_else(|| UncertainError::stale("elementary identity is not live in this session"))
    }

    pub(crate) fn intermediate(&self, id: ElementaryId) -> Result<&IntermediateRecord> {
        self.intermediates
            .get(&id)
            .ok_or_else(|| UncertainError::stale("intermediate result is not live in this session"))
    }

    /// Zero unless declared; the variance on the diagonal.
    pub(crate) fn covariance(&self, a: ElementaryId, b: ElementaryId) -> Result<f64> {
        let record_a = self.record(a)?;
        self.record(b)?;
        if a == b {
            return Ok(record_a.variance());
        }
        Ok(self.off_diagonal(a, b))
    }

    pub(crate) fn check_epoch(&self, epoch: Uuid) -> Result<()> {
        if epoch == self.epoch {
            Ok(())
        } else {
            Err(UncertainError::stale(
                "uncertain number was created before the session was reset",
            ))
        }
    }

    /// Diagonal entry for an identity already known to be live.
    pub(crate) fn variance_of(&self, id: ElementaryId) -> f64 {
        self.records.get(&id).map_or(0.0, ElementaryRecord::variance)
    }

    /// Declared off-diagonal covariances of `id`.
    pub(crate) fn partners(&self, id: ElementaryId) -> impl Iterator<Item = (ElementaryId, f64)> + '_ {
        self.covariances
            .get(&id)
            .into_iter()
            .flat_map(|row| row.iter().map(|(&other, &cov)| (other, cov)))
    }

    fn off_diagonal(&self, a: ElementaryId, b: ElementaryId) -> f64 {
        self.covariances
            .get(&a)
            .and_then(|row| row.get(&b))
            .copied()
            .unwrap_or(0.0)
    }

    fn declare(
        &mut self,
        value: f64,
        uncertainty: f64,
        dof: f64,
        label: Option<&str>,
    ) -> Result<ElementaryId> {
        if !value.is_finite() {
            return Err(UncertainError::non_finite("value", value));
        }
        if !uncertainty.is_finite() {
            return Err(UncertainError::non_finite("uncertainty", uncertainty));
        }
        if uncertainty < 0.0 {
            return Err(UncertainError::invalid_parameter(
                "uncertainty",
                uncertainty,
                "must be non-negative",
            ));
        }
        if dof.is_nan() {
            return Err(UncertainError::non_finite("dof", dof));
        }
        if dof <= 0.0 {
            return Err(UncertainError::invalid_parameter(
                "dof",
                dof,
                "must be positive or infinite",
            ));
        }

        let id = ElementaryId(NEXT_INDEX.fetch_add(1, Ordering::Relaxed));
        self.records.insert(
            id,
            ElementaryRecord {
                value,
                uncertainty,
                dof,
                label: label.map(str::to_owned),
            },
        );
        debug!(%id, value, uncertainty, dof, label, "declared elementary quantity");
        Ok(id)
    }

    fn declare_intermediate(
        &mut self,
        value: f64,
        sensitivity: Sensitivity,
        label: Option<&str>,
    ) -> ElementaryId {
        let id = ElementaryId(NEXT_INDEX.fetch_add(1, Ordering::Relaxed));
        debug!(%id, value, ancestors = sensitivity.len(), label, "declared intermediate result");
        self.intermediates.insert(
            id,
            IntermediateRecord {
                value,
                label: label.map(str::to_owned),
                sensitivity,
            },
        );
        id
    }

    fn set_covariance(&mut self, a: ElementaryId, b: ElementaryId, covariance: f64) -> Result<()> {
        if a == b {
            return Err(UncertainError::invalid_correlation(
                "the diagonal of the covariance table is the variance and cannot be set",
            ));
        }
        let bound = self.record(a)?.uncertainty * self.record(b)?.uncertainty;
        if !covariance.is_finite() {
            return Err(UncertainError::invalid_correlation(format!(
                "covariance between {a} and {b} is not finite: {covariance}"
            )));
        }
        if covariance.abs() > bound * (1.0 + self.config.tolerance) {
            return Err(UncertainError::invalid_correlation(format!(
                "|{covariance}| exceeds u({a})·u({b}) = {bound}"
            )));
        }

        if covariance == 0.0 {
            for (row, column) in [(a, b), (b, a)] {
                if let Some(entries) = self.covariances.get_mut(&row) {
                    entries.remove(&column);
                    if entries.is_empty() {
                        self.covariances.remove(&row);
                    }
                }
            }
        } else {
            self.covariances.entry(a).or_default().insert(b, covariance);
            self.covariances.entry(b).or_default().insert(a, covariance);
        }
        debug!(%a, %b, covariance, "set covariance");
        Ok(())
    }

    fn set_correlation(&mut self, a: ElementaryId, b: ElementaryId, r: f64) -> Result<()> {
        if a == b {
            return Err(UncertainError::invalid_correlation(
                "a quantity is always fully correlated with itself",
            ));
        }
        if !r.is_finite() || r.abs() > 1.0 + self.config.tolerance {
            return Err(UncertainError::invalid_correlation(format!(
                "correlation coefficient {r} is outside [-1, 1]"
            )));
        }
        let covariance = r.clamp(-1.0, 1.0) * self.record(a)?.uncertainty * self.record(b)?.uncertainty;
        self.set_covariance(a, b, covariance)
    }

    fn reset(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        self.intermediates.clear();
        self.covariances.clear();
        self.epoch = Uuid::new_v4();
        info!(dropped, epoch = %self.epoch, "session reset");
    }
}

/// Shared handle on a registry.
///
/// Cloning a session clones the handle, not the state. Mutations take the
/// write lock; evaluations take the read lock, so a declaration is visible to
/// every evaluation that starts after it returns.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<RwLock<Registry>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session with the default numerical policy.
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::Session;
    ///
    /// let session = Session::new();
    /// assert!(session.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::from_registry(Registry::new(SessionConfig::default()))
    }

    /// Creates an empty session with a custom numerical policy.
    ///
    /// # Errors
    /// Returns an error if the tolerance is negative, not finite or ≥ 1.
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_registry(Registry::new(config)))
    }

    fn from_registry(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    // Registry writes validate before mutating, so a poisoned lock still
    // guards consistent state.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles refer to the same registry.
    #[must_use]
    pub fn same_as(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn epoch(&self) -> Uuid {
        self.read().epoch()
    }

    #[must_use]
    pub fn config(&self) -> SessionConfig {
        *self.read().config()
    }

    /// Number of live elementary quantities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the stored record for an elementary quantity.
    ///
    /// # Errors
    /// Returns `StaleReference` if the identity is not live.
    pub fn record(&self, id: ElementaryId) -> Result<ElementaryRecord> {
        self.read().record(id).cloned()
    }

    /// Registers a new elementary quantity and returns its identity.
    ///
    /// # Errors
    /// Returns an error if the value or uncertainty is not finite, the
    /// uncertainty is negative, or the degrees of freedom are not positive.
    pub fn declare(&self, value: f64, uncertainty: f64, dof: f64) -> Result<ElementaryId> {
        self.write().declare(value, uncertainty, dof, None)
    }

    /// Like [`Session::declare`], attaching a label for uncertainty budgets.
    ///
    /// # Errors
    /// See [`Session::declare`].
    pub fn declare_labeled(
        &self,
        value: f64,
        uncertainty: f64,
        dof: f64,
        label: &str,
    ) -> Result<ElementaryId> {
        self.write().declare(value, uncertainty, dof, Some(label))
    }

    /// Creates an elementary uncertain number.
    ///
    /// # Errors
    /// See [`Session::declare`].
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let x = session.ureal(1.5, 0.1, INF).unwrap();
    /// assert_eq!(x.u().unwrap(), 0.1);
    /// ```
    pub fn ureal(&self, value: f64, uncertainty: f64, dof: f64) -> Result<UncertainReal> {
        self.create(value, uncertainty, dof, None)
    }

    /// Creates a labeled elementary uncertain number.
    ///
    /// # Errors
    /// See [`Session::declare`].
    pub fn ureal_labeled(
        &self,
        value: f64,
        uncertainty: f64,
        dof: f64,
        label: &str,
    ) -> Result<UncertainReal> {
        self.create(value, uncertainty, dof, Some(label))
    }

    pub(crate) fn create(
        &self,
        value: f64,
        uncertainty: f64,
        dof: f64,
        label: Option<&str>,
    ) -> Result<UncertainReal> {
        let (id, epoch) = {
            let mut registry = self.write();
            let id = registry.declare(value, uncertainty, dof, label)?;
            (id, registry.epoch())
        };
        Ok(UncertainReal::elementary(self.clone(), epoch, id, value, label))
    }

    /// An exactly known number. It is not registered and has no sensitivities.
    ///
    /// # Errors
    /// Returns `NonFiniteParameter` if `value` is NaN or infinite.
    pub fn constant(&self, value: f64) -> Result<UncertainReal> {
        if !value.is_finite() {
            return Err(UncertainError::non_finite("value", value));
        }
        let epoch = self.epoch();
        Ok(UncertainReal::constant(self.clone(), epoch, value))
    }

    /// Declares a derived number as an intermediate result.
    ///
    /// The returned number is equal to `x` but carries an identity of its own,
    /// so later results can report their sensitivity to it and the component
    /// of uncertainty it contributes. Elementary numbers and numbers already
    /// declared are returned unchanged.
    ///
    /// # Errors
    /// Returns `StaleReference` if `x` is stale or belongs to another session.
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let a = session.ureal(2.0, 0.1, INF).unwrap();
    /// let b = session.ureal(3.0, 0.2, INF).unwrap();
    /// let x = session.result(&(&a * &b).unwrap()).unwrap();
    /// let y = (&x * 10.0).unwrap();
    ///
    /// assert!((y.sensitivity(&x).unwrap() - 10.0).abs() < 1e-12);
    /// assert!((y.u_component(&x).unwrap() - y.u().unwrap()).abs() < 1e-12);
    /// ```
    pub fn result(&self, x: &UncertainReal) -> Result<UncertainReal> {
        self.declare_result(x, None)
    }

    /// Like [`Session::result`], attaching a label.
    ///
    /// # Errors
    /// See [`Session::result`].
    pub fn result_labeled(&self, x: &UncertainReal, label: &str) -> Result<UncertainReal> {
        self.declare_result(x, Some(label))
    }

    fn declare_result(&self, x: &UncertainReal, label: Option<&str>) -> Result<UncertainReal> {
        if !x.session().same_as(self) {
            return Err(UncertainError::stale(
                "uncertain number belongs to a different session",
            ));
        }
        let mut registry = self.write();
        x.ensure_live(&registry)?;
        if x.is_elementary() || x.is_intermediate() {
            return Ok(label.map_or_else(|| x.clone(), |label| x.clone().with_label(label)));
        }
        let id = registry.declare_intermediate(x.value(), x.sensitivities().clone(), label);
        Ok(x.as_intermediate(id, label))
    }

    /// Look up a declared intermediate result.
    ///
    /// # Errors
    /// Returns `StaleReference` if the identity is not live.
    pub fn intermediate(&self, id: ElementaryId) -> Result<IntermediateRecord> {
        self.read().intermediate(id).cloned()
    }

    /// Declares the covariance between two elementary quantities.
    ///
    /// # Errors
    /// Returns `InvalidCorrelation` if `a == b` or `|covariance| > u(a)·u(b)`,
    /// and `StaleReference` if an identity is not live.
    pub fn set_covariance(&self, a: ElementaryId, b: ElementaryId, covariance: f64) -> Result<()> {
        self.write().set_covariance(a, b, covariance)
    }

    /// Declares the correlation coefficient between two elementary quantities.
    ///
    /// # Errors
    /// Returns `InvalidCorrelation` if `a == b` or `|r| > 1`, and
    /// `StaleReference` if an identity is not live.
    pub fn set_correlation(&self, a: ElementaryId, b: ElementaryId, r: f64) -> Result<()> {
        self.write().set_correlation(a, b, r)
    }

    /// Declares the correlation coefficient between two elementary numbers.
    ///
    /// # Errors
    /// Returns `InvalidCorrelation` if either number is not elementary, plus
    /// the errors of [`Session::set_correlation`].
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let a = session.ureal(1.0, 0.1, INF).unwrap();
    /// let b = session.ureal(2.0, 0.2, INF).unwrap();
    /// session.correlate(&a, &b, 0.5).unwrap();
    /// assert!((a.correlation(&b).unwrap() - 0.5).abs() < 1e-12);
    /// ```
    pub fn correlate(&self, x: &UncertainReal, y: &UncertainReal, r: f64) -> Result<()> {
        let (a, b) = self.elementary_pair(x, y)?;
        self.write().set_correlation(a, b, r)
    }

    /// Declares the covariance between two elementary numbers.
    ///
    /// # Errors
    /// Returns `InvalidCorrelation` if either number is not elementary, plus
    /// the errors of [`Session::set_covariance`].
    pub fn set_covariance_between(
        &self,
        x: &UncertainReal,
        y: &UncertainReal,
        covariance: f64,
    ) -> Result<()> {
        let (a, b) = self.elementary_pair(x, y)?;
        self.write().set_covariance(a, b, covariance)
    }

    fn elementary_pair(
        &self,
        x: &UncertainReal,
        y: &UncertainReal,
    ) -> Result<(ElementaryId, ElementaryId)> {
        if !x.session().same_as(self) || !y.session().same_as(self) {
            return Err(UncertainError::stale(
                "uncertain number belongs to a different session",
            ));
        }
        match (x.elementary_id(), y.elementary_id()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(UncertainError::invalid_correlation(
                "correlation can only be declared between elementary uncertain numbers",
            )),
        }
    }

    /// Covariance between two elementary quantities.
    ///
    /// # Errors
    /// Returns `StaleReference` if an identity is not live.
    pub fn covariance(&self, a: ElementaryId, b: ElementaryId) -> Result<f64> {
        self.read().covariance(a, b)
    }

    /// Correlation coefficient between two elementary quantities.
    ///
    /// # Errors
    /// Returns `UndefinedCorrelation` if either uncertainty is zero and
    /// `StaleReference` if an identity is not live.
    pub fn correlation(&self, a: ElementaryId, b: ElementaryId) -> Result<f64> {
        let registry = self.read();
        let scale = registry.record(a)?.uncertainty * registry.record(b)?.uncertainty;
        if scale == 0.0 {
            return Err(UncertainError::UndefinedCorrelation);
        }
        Ok(registry.covariance(a, b)? / scale)
    }

    /// Clears every elementary quantity and covariance entry.
    ///
    /// Identities are never reused, so old ones stay unknown after the reset.
    /// Numbers created before the reset fail with `StaleReference` afterwards.
    pub fn reset(&self) {
        self.write().reset();
    }
}
