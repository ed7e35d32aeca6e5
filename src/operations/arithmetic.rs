use crate::error::{Result, UncertainError};
use crate::operations::{Operand, propagate_binary};
use crate::uncertain::UncertainReal;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Binary operation types for computation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    Add,
    Sub,
    Mul,
    Div,
    /// `left` raised to the power `right`
    Pow,
    /// Four-quadrant arctangent of `left / right`
    Atan2,
}

/// Value and local partial derivatives of a binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryEvaluation {
    pub value: f64,
    /// ∂f/∂left
    pub d_left: f64,
    /// ∂f/∂right
    pub d_right: f64,
}

impl BinaryOperation {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOperation::Add => "Add",
            BinaryOperation::Sub => "Sub",
            BinaryOperation::Mul => "Mul",
            BinaryOperation::Div => "Div",
            BinaryOperation::Pow => "Pow",
            BinaryOperation::Atan2 => "Atan2",
        }
    }

    /// Evaluates the operation and its partial derivatives at `(x, y)`.
    ///
    /// A derivative may be non-finite where the value itself is defined
    /// (e.g. `∂(x^y)/∂y` for a negative base); the propagator rejects it only
    /// if that operand actually carries uncertainty.
    ///
    /// # Errors
    /// Returns `Domain` for division by zero, a fractional power of a negative
    /// base, `atan2(0, 0)`, or a non-finite result.
    pub fn evaluate(&self, x: f64, y: f64) -> Result<BinaryEvaluation> {
        let (value, d_left, d_right) = match self {
            BinaryOperation::Add => (x + y, 1.0, 1.0),
            BinaryOperation::Sub => (x - y, 1.0, -1.0),
            BinaryOperation::Mul => (x * y, y, x),
            BinaryOperation::Div => {
                if y == 0.0 {
                    return Err(UncertainError::domain("Div", y, "division by zero"));
                }
                (x / y, 1.0 / y, -x / (y * y))
            }
            BinaryOperation::Pow => {
                if x < 0.0 && y.fract() != 0.0 {
                    return Err(UncertainError::domain(
                        "Pow",
                        x,
                        "fractional power of a negative base",
                    ));
                }
                let value = x.powf(y);
                let d_left = if y == 0.0 { 0.0 } else { y * x.powf(y - 1.0) };
                let d_right = if x > 0.0 {
                    value * x.ln()
                } else if x == 0.0 && y > 0.0 {
                    0.0
                } else {
                    f64::NAN
                };
                (value, d_left, d_right)
            }
            BinaryOperation::Atan2 => {
                let r2 = x * x + y * y;
                if r2 == 0.0 {
                    return Err(UncertainError::domain("Atan2", x, "atan2(0, 0) is undefined"));
                }
                (x.atan2(y), y / r2, -x / r2)
            }
        };

        if !value.is_finite() {
            return Err(UncertainError::domain(self.name(), x, "result is not finite"));
        }
        Ok(BinaryEvaluation {
            value,
            d_left,
            d_right,
        })
    }
}

impl UncertainReal {
    /// Applies a binary operation with `self` as the left operand.
    ///
    /// # Errors
    /// Returns `Domain` if the operation is undefined at the operand values and
    /// `StaleReference` if an operand's session was reset or the operands come
    /// from different sessions.
    pub fn apply_binary<'a>(
        &self,
        operation: BinaryOperation,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<UncertainReal> {
        propagate_binary(operation, Operand::Number(self), rhs.into())
    }

    /// Sum of `self` and `rhs`.
    ///
    /// # Errors
    /// See [`UncertainReal::apply_binary`].
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let a = session.ureal(1.0, 0.3, INF).unwrap();
    /// let b = session.ureal(2.0, 0.4, INF).unwrap();
    /// let sum = a.try_add(&b).unwrap();
    /// assert!((sum.u().unwrap() - 0.5).abs() < 1e-12);
    /// ```
    pub fn try_add<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<UncertainReal> {
        self.apply_binary(BinaryOperation::Add, rhs)
    }

    /// Difference of `self` and `rhs`.
    ///
    /// # Errors
    /// See [`UncertainReal::apply_binary`].
    pub fn try_sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<UncertainReal> {
        self.apply_binary(BinaryOperation::Sub, rhs)
    }

    /// Product of `self` and `rhs`.
    ///
    /// # Errors
    /// See [`UncertainReal::apply_binary`].
    pub fn try_mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<UncertainReal> {
        self.apply_binary(BinaryOperation::Mul, rhs)
    }

    /// Quotient of `self` and `rhs`.
    ///
    /// # Errors
    /// Returns `Domain` if the value of `rhs` is exactly zero, otherwise see
    /// [`UncertainReal::apply_binary`].
    pub fn try_div<'a>(&self, rhs: impl Into<Operand<'a>>) -> Result<UncertainReal> {
        self.apply_binary(BinaryOperation::Div, rhs)
    }

    /// Raises the uncertain value to a power
    ///
    /// The exponent may itself be uncertain.
    ///
    /// # Errors
    /// Returns `Domain` for a fractional power of a negative base, and for an
    /// uncertain exponent applied to a non-positive base.
    ///
    /// # Example
    /// ```rust
    /// use uncertain_gum::{INF, Session};
    ///
    /// let session = Session::new();
    /// let base = session.ureal(2.0, 0.1, INF).unwrap();
    /// let squared = base.pow(2.0).unwrap();
    /// assert!((squared.u().unwrap() - 0.4).abs() < 1e-12);
    /// ```
    pub fn pow<'a>(&self, exponent: impl Into<Operand<'a>>) -> Result<UncertainReal> {
        self.apply_binary(BinaryOperation::Pow, exponent)
    }

    /// Four-quadrant arctangent of `self / x`.
    ///
    /// # Errors
    /// Returns `Domain` when both values are zero.
    pub fn atan2<'a>(&self, x: impl Into<Operand<'a>>) -> Result<UncertainReal> {
        self.apply_binary(BinaryOperation::Atan2, x)
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $operation:expr) => {
        impl $trait<&UncertainReal> for &UncertainReal {
            type Output = Result<UncertainReal>;

            fn $method(self, rhs: &UncertainReal) -> Self::Output {
                propagate_binary($operation, Operand::Number(self), Operand::Number(rhs))
            }
        }

        impl $trait for UncertainReal {
            type Output = Result<UncertainReal>;

            fn $method(self, rhs: Self) -> Self::Output {
                propagate_binary($operation, Operand::Number(&self), Operand::Number(&rhs))
            }
        }

        impl $trait<f64> for &UncertainReal {
            type Output = Result<UncertainReal>;

            fn $method(self, rhs: f64) -> Self::Output {
                propagate_binary($operation, Operand::Number(self), Operand::Constant(rhs))
            }
        }

        impl $trait<f64> for UncertainReal {
            type Output = Result<UncertainReal>;

            fn $method(self, rhs: f64) -> Self::Output {
                propagate_binary($operation, Operand::Number(&self), Operand::Constant(rhs))
            }
        }

        impl $trait<&UncertainReal> for f64 {
            type Output = Result<UncertainReal>;

            fn $method(self, rhs: &UncertainReal) -> Self::Output {
                propagate_binary($operation, Operand::Constant(self), Operand::Number(rhs))
            }
        }

        impl $trait<UncertainReal> for f64 {
            type Output = Result<UncertainReal>;

            fn $method(self, rhs: UncertainReal) -> Self::Output {
                propagate_binary($operation, Operand::Constant(self), Operand::Number(&rhs))
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOperation::Add);
impl_binary_operator!(Sub, sub, BinaryOperation::Sub);
impl_binary_operator!(Mul, mul, BinaryOperation::Mul);
impl_binary_operator!(Div, div, BinaryOperation::Div);

// Negation
impl Neg for &UncertainReal {
    type Output = Result<UncertainReal>;

    fn neg(self) -> Self::Output {
        self.try_neg()
    }
}

impl Neg for UncertainReal {
    type Output = Result<UncertainReal>;

    fn neg(self) -> Self::Output {
        self.try_neg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{INF, Session};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_addition() {
        let session = Session::new();
        let x = session.ureal(5.0, 0.3, INF).unwrap();
        let y = session.ureal(3.0, 0.4, INF).unwrap();
        let sum = (&x + &y).unwrap();

        assert!(close(sum.value(), 8.0));
        assert!(close(sum.u().unwrap(), 0.5));
    }

    #[test]
    fn test_scalar_operands() {
        let session = Session::new();
        let x = session.ureal(5.0, 0.2, INF).unwrap();

        let shifted = (&x + 3.0).unwrap();
        assert!(close(shifted.value(), 8.0));
        assert!(close(shifted.u().unwrap(), 0.2));

        let reflected = (10.0 - &x).unwrap();
        assert!(close(reflected.value(), 5.0));
        let id = x.elementary_id().unwrap();
        assert!(close(reflected.sensitivities().get(id), -1.0));

        let scaled = (3.0 * x).unwrap();
        assert!(close(scaled.u().unwrap(), 0.6));
    }

    #[test]
    fn test_multiplication_sensitivities() {
        let session = Session::new();
        let x = session.ureal(4.0, 0.1, INF).unwrap();
        let y = session.ureal(3.0, 0.2, INF).unwrap();
        let product = (&x * &y).unwrap();

        assert!(close(product.value(), 12.0));
        assert!(close(product.sensitivities().get(x.elementary_id().unwrap()), 3.0));
        assert!(close(product.sensitivities().get(y.elementary_id().unwrap()), 4.0));
    }

    #[test]
    fn test_quotient_rule() {
        let session = Session::new();
        let v = session.ureal(0.1, 1e-3, INF).unwrap();
        let i = session.ureal(0.015, 0.5e-3, INF).unwrap();
        let r = (&v / &i).unwrap();

        let dv = r.sensitivities().get(v.elementary_id().unwrap());
        let di = r.sensitivities().get(i.elementary_id().unwrap());
        assert!(close(dv, 1.0 / 0.015));
        assert!((di + 0.1 / (0.015 * 0.015)).abs() < 1e-9);
    }

    #[test]
    fn test_division_by_zero_is_domain_error() {
        let session = Session::new();
        let x = session.ureal(1.0, 0.1, INF).unwrap();
        let zero = session.ureal(0.0, 0.1, INF).unwrap();

        assert!(matches!(&x / &zero, Err(UncertainError::Domain { .. })));
        assert!(matches!(&x / 0.0, Err(UncertainError::Domain { .. })));
    }

    #[test]
    fn test_complex_expression() {
        let session = Session::new();
        let x = session.constant(2.0).unwrap();
        let y = session.constant(3.0).unwrap();
        let result = (((&x + &y).unwrap() * 2.0).unwrap() - 1.0).unwrap();
        assert!(close(result.value(), 9.0)); // (2 + 3) * 2 - 1 = 9
        assert!(result.sensitivities().is_empty());
    }

    #[test]
    fn test_pow_rules() {
        let session = Session::new();
        let x = session.ureal(2.0, 0.1, INF).unwrap();
        let n = session.ureal(3.0, 0.01, INF).unwrap();
        let cubed = x.pow(&n).unwrap();

        assert!(close(cubed.value(), 8.0));
        assert!(close(cubed.sensitivities().get(x.elementary_id().unwrap()), 12.0));
        assert!(close(
            cubed.sensitivities().get(n.elementary_id().unwrap()),
            8.0 * 2.0_f64.ln()
        ));
    }

    #[test]
    fn test_pow_negative_base() {
        let session = Session::new();
        let x = session.ureal(-2.0, 0.1, INF).unwrap();

        assert!(matches!(x.pow(0.5), Err(UncertainError::Domain { .. })));

        let squared = x.pow(2.0).unwrap();
        assert!(close(squared.value(), 4.0));
        assert!(close(squared.sensitivities().get(x.elementary_id().unwrap()), -4.0));

        let uncertain_exponent = session.ureal(2.0, 0.1, INF).unwrap();
        assert!(matches!(
            x.pow(&uncertain_exponent),
            Err(UncertainError::Domain { .. })
        ));
    }

    #[test]
    fn test_atan2() {
        let session = Session::new();
        let y = session.ureal(1.0, 0.1, INF).unwrap();
        let angle = y.atan2(1.0).unwrap();

        assert!(close(angle.value(), std::f64::consts::FRAC_PI_4));
        assert!(close(angle.sensitivities().get(y.elementary_id().unwrap()), 0.5));

        let zero = session.ureal(0.0, 0.1, INF).unwrap();
        assert!(zero.atan2(0.0).is_err());
    }

    #[test]
    fn test_negation() {
        let session = Session::new();
        let x = session.ureal(1.5, 0.1, INF).unwrap();
        let negated = (-&x).unwrap();

        assert!(close(negated.value(), -1.5));
        assert!(close(negated.u().unwrap(), 0.1));
    }

    #[test]
    fn test_evaluation_table() {
        let div = BinaryOperation::Div.evaluate(6.0, 3.0).unwrap();
        assert!(close(div.value, 2.0));
        assert!(close(div.d_left, 1.0 / 3.0));
        assert!(close(div.d_right, -6.0 / 9.0));

        let zero_pow = BinaryOperation::Pow.evaluate(0.0, 2.0).unwrap();
        assert!(close(zero_pow.d_left, 0.0));
        assert!(close(zero_pow.d_right, 0.0));

        assert!(BinaryOperation::Pow.evaluate(0.0, -1.0).is_err());
    }
}
