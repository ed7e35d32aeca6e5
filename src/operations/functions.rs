use crate::error::{Result, UncertainError};
use crate::operations::propagate_unary;
use crate::uncertain::UncertainReal;
use std::f64::consts::LN_10;

/// Unary operation types for computation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperation {
    Neg,
    Abs,
    Square,
    Reciprocal,
    Sqrt,
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
}

impl UnaryOperation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            UnaryOperation::Neg => "Neg",
            UnaryOperation::Abs => "Abs",
            UnaryOperation::Square => "Square",
            UnaryOperation::Reciprocal => "Reciprocal",
            UnaryOperation::Sqrt => "Sqrt",
            UnaryOperation::Exp => "Exp",
            UnaryOperation::Ln => "Ln",
            UnaryOperation::Log10 => "Log10",
            UnaryOperation::Sin => "Sin",
            UnaryOperation::Cos => "Cos",
            UnaryOperation::Tan => "Tan",
            UnaryOperation::Asin => "Asin",
            UnaryOperation::Acos => "Acos",
            UnaryOperation::Atan => "Atan",
            UnaryOperation::Sinh => "Sinh",
            UnaryOperation::Cosh => "Cosh",
            UnaryOperation::Tanh => "Tanh",
            UnaryOperation::Asinh => "Asinh",
            UnaryOperation::Acosh => "Acosh",
            UnaryOperation::Atanh => "Atanh",
        }
    }

    /// Evaluates the function and its derivative at `x`.
    ///
    /// The derivative of `asin`, `acos` and `acosh` is infinite at the edge of
    /// their domain; that is reported by the propagator, not here, so an exact
    /// operand at the edge is still accepted.
    ///
    /// # Errors
    /// Returns `Domain` when `x` is outside the function's domain or the result
    /// is not finite.
    pub fn evaluate(&self, x: f64) -> Result<(f64, f64)> {
        let name = self.name();
        let (value, derivative) = match self {
            UnaryOperation::Neg => (-x, -1.0),
            UnaryOperation::Abs => (x.abs(), if x >= 0.0 { 1.0 } else { -1.0 }),
            UnaryOperation::Square => (x * x, 2.0 * x),
            UnaryOperation::Reciprocal => {
                if x == 0.0 {
                    return Err(UncertainError::domain(name, x, "division by zero"));
                }
                (1.0 / x, -1.0 / (x * x))
            }
            UnaryOperation::Sqrt => {
                if x <= 0.0 {
                    return Err(UncertainError::domain(name, x, "argument must be positive"));
                }
                let root = x.sqrt();
                (root, 0.5 / root)
            }
            UnaryOperation::Exp => {
                let e = x.exp();
                (e, e)
            }
            UnaryOperation::Ln => {
                if x <= 0.0 {
                    return Err(UncertainError::domain(name, x, "argument must be positive"));
                }
                (x.ln(), 1.0 / x)
            }
            UnaryOperation::Log10 => {
                if x <= 0.0 {
                    return Err(UncertainError::domain(name, x, "argument must be positive"));
                }
                (x.log10(), 1.0 / (x * LN_10))
            }
            UnaryOperation::Sin => (x.sin(), x.cos()),
            UnaryOperation::Cos => (x.cos(), -x.sin()),
            UnaryOperation::Tan => {
                let c = x.cos();
                (x.tan(), 1.0 / (c * c))
            }
            UnaryOperation::Asin => {
                if x.abs() > 1.0 {
                    return Err(UncertainError::domain(name, x, "argument must be in [-1, 1]"));
                }
                (x.asin(), 1.0 / (1.0 - x * x).sqrt())
            }
            UnaryOperation::Acos => {
                if x.abs() > 1.0 {
                    return Err(UncertainError::domain(name, x, "argument must be in [-1, 1]"));
                }
                (x.acos(), -1.0 / (1.0 - x * x).sqrt())
            }
            UnaryOperation::Atan => (x.atan(), 1.0 / (1.0 + x * x)),
            UnaryOperation::Sinh => (x.sinh(), x.cosh()),
            UnaryOperation::Cosh => (x.cosh(), x.sinh()),
            UnaryOperation::Tanh => {
                let c = x.cosh();
                (x.tanh(), 1.0 / (c * c))
            }
            UnaryOperation::Asinh => (x.asinh(), 1.0 / (x * x + 1.0).sqrt()),
            UnaryOperation::Acosh => {
                if x < 1.0 {
                    return Err(UncertainError::domain(name, x, "argument must be at least 1"));
                }
                (x.acosh(), 1.0 / (x * x - 1.0).sqrt())
            }
            UnaryOperation::Atanh => {
                if x.abs() >= 1.0 {
                    return Err(UncertainError::domain(name, x, "argument must be in (-1, 1)"));
                }
                (x.atanh(), 1.0 / (1.0 - x * x))
            }
        };

        if !value.is_finite() {
            return Err(UncertainError::domain(name, x, "result is not finite"));
        }
        Ok((value, derivative))
    }
}

macro_rules! unary_methods {
    ($($(#[$doc:meta])* $method:ident => $operation:ident;)*) => {
        impl UncertainReal {
            $(
                $(#[$doc])*
                ///
                /// # Errors
                /// Returns `Domain` outside the function's domain and
                /// `StaleReference` if the session was reset.
                pub fn $method(&self) -> Result<UncertainReal> {
                    self.apply_unary(UnaryOperation::$operation)
                }
            )*
        }
    };
}

impl UncertainReal {
    /// Applies a unary operation.
    ///
    /// # Errors
    /// Returns `Domain` if the operation is undefined at the value and
    /// `StaleReference` if the session was reset.
    pub fn apply_unary(&self, operation: UnaryOperation) -> Result<UncertainReal> {
        propagate_unary(self, operation)
    }
}

unary_methods! {
    /// Negation
    try_neg => Neg;
    /// Absolute value; the derivative at zero is taken as +1
    abs => Abs;
    /// Square
    square => Square;
    /// Reciprocal `1 / x`
    reciprocal => Reciprocal;
    /// Square root of a positive value
    sqrt => Sqrt;
    /// Exponential
    exp => Exp;
    /// Natural logarithm of a positive value
    ln => Ln;
    /// Base-10 logarithm of a positive value
    log10 => Log10;
    /// Sine
    sin => Sin;
    /// Cosine
    cos => Cos;
    /// Tangent
    tan => Tan;
    /// Arcsine
    asin => Asin;
    /// Arccosine
    acos => Acos;
    /// Arctangent
    atan => Atan;
    /// Hyperbolic sine
    sinh => Sinh;
    /// Hyperbolic cosine
    cosh => Cosh;
    /// Hyperbolic tangent
    tanh => Tanh;
    /// Inverse hyperbolic sine
    asinh => Asinh;
    /// Inverse hyperbolic cosine
    acosh => Acosh;
    /// Inverse hyperbolic tangent
    atanh => Atanh;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{INF, Session};

    const ALL: [UnaryOperation; 20] = [
        UnaryOperation::Neg,
        UnaryOperation::Abs,
        UnaryOperation::Square,
        UnaryOperation::Reciprocal,
        UnaryOperation::Sqrt,
        UnaryOperation::Exp,
        UnaryOperation::Ln,
        UnaryOperation::Log10,
        UnaryOperation::Sin,
        UnaryOperation::Cos,
        UnaryOperation::Tan,
        UnaryOperation::Asin,
        UnaryOperation::Acos,
        UnaryOperation::Atan,
        UnaryOperation::Sinh,
        UnaryOperation::Cosh,
        UnaryOperation::Tanh,
        UnaryOperation::Asinh,
        UnaryOperation::Acosh,
        UnaryOperation::Atanh,
    ];

    #[test]
    fn test_derivatives_match_central_differences() {
        let h = 1e-6;
        for operation in ALL {
            // inside every domain
            let x = if operation == UnaryOperation::Acosh { 1.7 } else { 0.4 };
            let (_, derivative) = operation.evaluate(x).unwrap();
            let (forward, _) = operation.evaluate(x + h).unwrap();
            let (backward, _) = operation.evaluate(x - h).unwrap();
            let numeric = (forward - backward) / (2.0 * h);
            assert!(
                (derivative - numeric).abs() < 1e-6,
                "{}: analytic {derivative}, numeric {numeric}",
                operation.name()
            );
        }
    }

    #[test]
    fn test_mathematical_functions() {
        let session = Session::new();
        let x = session.ureal(4.0, 0.2, INF).unwrap();

        let root = x.sqrt().unwrap();
        assert!((root.value() - 2.0).abs() < 1e-12);
        assert!((root.u().unwrap() - 0.05).abs() < 1e-12);

        let log = x.ln().unwrap();
        assert!((log.u().unwrap() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_domain_errors() {
        let session = Session::new();
        let negative = session.ureal(-1.0, 0.1, INF).unwrap();
        let zero = session.ureal(0.0, 0.1, INF).unwrap();
        let two = session.ureal(2.0, 0.1, INF).unwrap();

        for result in [
            negative.ln(),
            negative.log10(),
            negative.sqrt(),
            zero.ln(),
            zero.sqrt(),
            zero.reciprocal(),
            two.asin(),
            two.acos(),
            zero.acosh(),
            two.atanh(),
        ] {
            assert!(matches!(result, Err(UncertainError::Domain { .. })));
        }
    }

    #[test]
    fn test_infinite_derivative_only_rejected_for_uncertain_operands() {
        let session = Session::new();
        let edge = session.ureal(1.0, 0.01, INF).unwrap();
        assert!(matches!(edge.asin(), Err(UncertainError::Domain { .. })));

        let exact_edge = session.constant(1.0).unwrap();
        let angle = exact_edge.asin().unwrap();
        assert!((angle.value() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(angle.sensitivities().is_empty());
    }

    #[test]
    fn test_zero_derivative_prunes_ancestor() {
        let session = Session::new();
        let x = session.ureal(0.0, 0.1, INF).unwrap();
        let c = x.cos().unwrap();

        assert!((c.value() - 1.0).abs() < 1e-12);
        assert!(c.sensitivities().is_empty());
        assert_eq!(c.u().unwrap(), 0.0);
        assert_eq!(c.node().elementary_ids().len(), 1);
    }

    #[test]
    fn test_overflow_is_domain_error() {
        let session = Session::new();
        let big = session.ureal(1000.0, 1.0, INF).unwrap();
        assert!(matches!(big.exp(), Err(UncertainError::Domain { .. })));
    }
}
