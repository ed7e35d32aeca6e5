//! Sensitivity propagation.
//!
//! Every operation is a variant of [`BinaryOperation`] or [`UnaryOperation`]
//! that knows its forward value and its local partial derivatives. The
//! functions here check operand liveness, apply the rule and combine the
//! operands' sensitivity vectors by the chain rule.

pub mod aggregate;
pub mod arithmetic;
pub mod comparison;
pub mod functions;

pub use aggregate::{max, mean, min, prod, sum};
pub use arithmetic::BinaryOperation;
pub use functions::UnaryOperation;

use crate::computation::ComputationNode;
use crate::error::{Result, UncertainError};
use crate::sensitivity::Sensitivity;
use crate::uncertain::UncertainReal;
use std::sync::Arc;

/// Either side of a binary operation.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// An uncertain number
    Number(&'a UncertainReal),
    /// An exact real with zero sensitivity
    Constant(f64),
}

impl Operand<'_> {
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            Operand::Number(number) => number.value(),
            Operand::Constant(value) => *value,
        }
    }

    fn number(&self) -> Option<&UncertainReal> {
        match self {
            Operand::Number(number) => Some(number),
            Operand::Constant(_) => None,
        }
    }

    fn varies(&self) -> bool {
        self.number().is_some_and(UncertainReal::varies)
    }

    fn node(&self) -> Arc<ComputationNode> {
        match self {
            Operand::Number(number) => number.node_arc(),
            Operand::Constant(value) => Arc::new(ComputationNode::constant(*value)),
        }
    }
}

impl<'a> From<&'a UncertainReal> for Operand<'a> {
    fn from(number: &'a UncertainReal) -> Self {
        Operand::Number(number)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Constant(value)
    }
}

pub(crate) fn propagate_unary(x: &UncertainReal, operation: UnaryOperation) -> Result<UncertainReal> {
    x.ensure_live(&x.session().read())?;

    let (value, derivative) = operation.evaluate(x.value())?;
    if x.varies() && !derivative.is_finite() {
        return Err(UncertainError::domain(
            operation.name(),
            x.value(),
            "derivative is not finite",
        ));
    }

    let sensitivity = Sensitivity::chain(&[(derivative, x.sensitivities())], 0.0);
    let intermediates = Sensitivity::chain(&[(derivative, x.intermediate_sensitivities())], 0.0);
    let node = ComputationNode::unary_op(x.node_arc(), operation);
    Ok(UncertainReal::derived(
        x.session().clone(),
        x.epoch(),
        value,
        sensitivity,
        intermediates,
        node,
    ))
}

pub(crate) fn propagate_binary(
    operation: BinaryOperation,
    left: Operand<'_>,
    right: Operand<'_>,
) -> Result<UncertainReal> {
    let anchor = match (left.number(), right.number()) {
        (Some(a), Some(b)) => {
            if !a.session().same_as(b.session()) {
                return Err(UncertainError::stale(
                    "operands belong to different sessions",
                ));
            }
            a
        }
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => {
            return Err(UncertainError::invalid_parameter(
                "operand",
                left.value(),
                "at least one operand must be an uncertain number",
            ));
        }
    };

    let tolerance = {
        let registry = anchor.session().read();
        for number in [left.number(), right.number()].into_iter().flatten() {
            number.ensure_live(&registry)?;
        }
        registry.config().tolerance
    };

    let (x, y) = (left.value(), right.value());
    let evaluation = operation.evaluate(x, y)?;
    for (operand, derivative, at) in [
        (&left, evaluation.d_left, x),
        (&right, evaluation.d_right, y),
    ] {
        if operand.varies() && !derivative.is_finite() {
            return Err(UncertainError::domain(
                operation.name(),
                at,
                "derivative is not finite",
            ));
        }
    }

    let empty = Sensitivity::new();
    let chain = |select: fn(&UncertainReal) -> &Sensitivity| {
        Sensitivity::chain(
            &[
                (evaluation.d_left, left.number().map_or(&empty, select)),
                (evaluation.d_right, right.number().map_or(&empty, select)),
            ],
            tolerance,
        )
    };
    let sensitivity = chain(UncertainReal::sensitivities);
    let intermediates = chain(UncertainReal::intermediate_sensitivities);
    let node = ComputationNode::binary_op(left.node(), right.node(), operation);
    Ok(UncertainReal::derived(
        anchor.session().clone(),
        anchor.epoch(),
        evaluation.value,
        sensitivity,
        intermediates,
        node,
    ))
}
