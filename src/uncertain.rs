use crate::computation::ComputationNode;
use crate::error::Result;
use crate::registry::{ElementaryId, Registry, Session};
use crate::sensitivity::Sensitivity;
use std::sync::Arc;
use uuid::Uuid;

/// A real-valued measured quantity together with its uncertainty.
///
/// An `UncertainReal` is either elementary (declared through a [`Session`])
/// or derived (the result of an operation). It is immutable: every operation
/// returns a new number. The value is the best estimate; the uncertainty is
/// evaluated on demand from the sensitivity vector and the session's
/// covariance table.
#[derive(Clone)]
pub struct UncertainReal {
    value: f64,
    sensitivity: Arc<Sensitivity>,
    // partial derivatives with respect to declared intermediate results
    intermediates: Arc<Sensitivity>,
    intermediate_id: Option<ElementaryId>,
    node: Arc<ComputationNode>,
    label: Option<Arc<str>>,
    session: Session,
    epoch: Uuid,
}

impl UncertainReal {
    pub(crate) fn elementary(
        session: Session,
        epoch: Uuid,
        id: ElementaryId,
        value: f64,
        label: Option<&str>,
    ) -> Self {
        Self {
            value,
            sensitivity: Arc::new(Sensitivity::unit(id)),
            intermediates: Arc::new(Sensitivity::new()),
            intermediate_id: None,
            node: Arc::new(ComputationNode::elementary(id)),
            label: label.map(Arc::from),
            session,
            epoch,
        }
    }

    pub(crate) fn constant(session: Session, epoch: Uuid, value: f64) -> Self {
        Self {
            value,
            sensitivity: Arc::new(Sensitivity::new()),
            intermediates: Arc::new(Sensitivity::new()),
            intermediate_id: None,
            node: Arc::new(ComputationNode::constant(value)),
            label: None,
            session,
            epoch,
        }
    }

    /// Internal constructor used by the propagator
    pub(crate) fn derived(
        session: Session,
        epoch: Uuid,
        value: f64,
        sensitivity: Sensitivity,
        intermediates: Sensitivity,
        node: ComputationNode,
    ) -> Self {
        Self {
            value,
            sensitivity: Arc::new(sensitivity),
            intermediates: Arc::new(intermediates),
            intermediate_id: None,
            node: Arc::new(node),
            label: None,
            session,
            epoch,
        }
    }

    /// The same number registered as the intermediate result `id`.
    pub(crate) fn as_intermediate(&self, id: ElementaryId, label: Option<&str>) -> Self {
        let mut number = self.clone();
        number.intermediates = Arc::new(self.intermediates.with_unit(id));
        number.intermediate_id = Some(id);
        if let Some(label) = label {
            number.label = Some(Arc::from(label));
        }
        number
    }

    /// The best estimate.
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let x = session.ureal(2.5, 0.1, INF).unwrap();
    /// assert_eq!(x.value(), 2.5);
    /// ```
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Attaches a display label.
    ///
    /// Only this number carries the label; the registry is not touched. Use
    /// [`Session::result_labeled`] to make the number available to budgets.
    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(Arc::from(label));
        self
    }

    #[must_use]
    pub fn is_elementary(&self) -> bool {
        matches!(*self.node, ComputationNode::Elementary { .. })
    }

    /// Whether this number was built from constants only.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.node.elementary_ids().is_empty()
    }

    /// Identity of an elementary number, `None` for derived numbers.
    #[must_use]
    pub fn elementary_id(&self) -> Option<ElementaryId> {
        match *self.node {
            ComputationNode::Elementary { id } => Some(id),
            _ => None,
        }
    }

    /// Read-only view of the partial derivatives with respect to elementary ancestors.
    #[must_use]
    pub fn sensitivities(&self) -> &Sensitivity {
        &self.sensitivity
    }

    /// Partial derivatives with respect to the intermediate results this
    /// number was computed from.
    #[must_use]
    pub fn intermediate_sensitivities(&self) -> &Sensitivity {
        &self.intermediates
    }

    /// Whether this number was declared with [`Session::result`].
    #[must_use]
    pub fn is_intermediate(&self) -> bool {
        self.intermediate_id.is_some()
    }

    #[must_use]
    pub fn intermediate_id(&self) -> Option<ElementaryId> {
        self.intermediate_id
    }

    /// How this number was produced.
    #[must_use]
    pub fn node(&self) -> &ComputationNode {
        &self.node
    }

    pub(crate) fn node_arc(&self) -> Arc<ComputationNode> {
        Arc::clone(&self.node)
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn epoch(&self) -> Uuid {
        self.epoch
    }

    /// Whether the owning session was reset after this number was created.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.session.epoch() != self.epoch
    }

    /// Whether any declared input, elementary or intermediate, influences this number.
    pub(crate) fn varies(&self) -> bool {
        !self.sensitivity.is_empty() || !self.intermediates.is_empty()
    }

    pub(crate) fn ensure_live(&self, registry: &Registry) -> Result<()> {
        registry.check_epoch(self.epoch)
    }
}

impl std::fmt::Debug for UncertainReal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UncertainReal")
            .field("value", &self.value)
            .field("label", &self.label)
            .field("sensitivity", &self.sensitivity)
            .field("intermediate_id", &self.intermediate_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{INF, Session};

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_elementary_number() {
        let session = Session::new();
        let x = session.ureal_labeled(1.5, 0.2, 9.0, "x").unwrap();

        assert_eq!(x.value(), 1.5);
        assert_eq!(x.label(), Some("x"));
        assert!(x.is_elementary());
        assert!(!x.is_constant());

        let id = x.elementary_id().unwrap();
        assert_eq!(x.sensitivities().len(), 1);
        assert_eq!(x.sensitivities().get(id), 1.0);
        assert_eq!(session.record(id).unwrap().label.as_deref(), Some("x"));
    }

    #[test]
    fn test_constant_number() {
        let session = Session::new();
        let c = session.constant(3.0).unwrap();

        assert!(c.is_constant());
        assert!(!c.is_elementary());
        assert!(c.sensitivities().is_empty());
        assert!(session.is_empty());
        assert!(session.constant(f64::INFINITY).is_err());
    }

    #[test]
    fn test_derived_number_is_not_elementary() {
        let session = Session::new();
        let x = session.ureal(1.5, 0.2, INF).unwrap();
        let y = (&x * 2.0).unwrap().with_label("y");

        assert!(!y.is_elementary());
        assert_eq!(y.elementary_id(), None);
        assert_eq!(y.label(), Some("y"));
        assert_eq!(y.node().name(), "Mul");
    }

    #[test]
    fn test_stale_after_reset() {
        let session = Session::new();
        let x = session.ureal(1.5, 0.2, INF).unwrap();
        assert!(!x.is_stale());

        session.reset();
        assert!(x.is_stale());
    }

    #[test]
    fn test_debug_output() {
        let session = Session::new();
        let x = session.ureal(1.5, 0.2, INF).unwrap();
        let debug_str = format!("{x:?}");
        assert!(debug_str.contains("UncertainReal"));
        assert!(debug_str.contains("1.5"));
    }
}
