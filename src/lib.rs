//! # uncertain-gum
//!
//! A Rust library for measurement uncertainty, implementing the first-order
//! propagation of the *Guide to the Expression of Uncertainty in Measurement*
//! (GUM).
//!
//! ## Core Concept: Uncertain Numbers
//!
//! An uncertain number carries a best estimate together with its sensitivity
//! to every elementary input it was computed from. Arithmetic propagates
//! sensitivities by the chain rule, and standard uncertainty, covariance and
//! effective degrees of freedom are evaluated on demand:
//!
//! ```rust
//! use uncertain_gum::{INF, Session};
//!
//! let session = Session::new();
//! let v = session.ureal(0.1, 1e-3, INF)?; // voltage, V
//! let i = session.ureal(0.015, 0.5e-3, INF)?; // current, A
//!
//! let r = (&v / &i)?;
//! assert!((r.value() - 6.666_666_666_666_667).abs() < 1e-12);
//! assert!((r.u()? - 0.232_006_811_309_123).abs() < 1e-9);
//! assert!(r.dof()?.is_infinite());
//! # Ok::<(), uncertain_gum::UncertainError>(())
//! ```
//!
//! ## Features
//!
//! - **Sessions**: each [`Session`] owns a registry of elementary quantities
//!   and the covariances declared between them
//! - **Exact sensitivities**: sparse partial derivatives for arithmetic,
//!   powers and the elementary transcendental functions
//! - **Correlation aware**: combined variance uses the full bilinear form over
//!   declared covariances
//! - **Degrees of freedom**: Welch–Satterthwaite effective degrees of freedom
//! - **Uncertainty budgets**: per-input components of uncertainty, also with
//!   respect to intermediate results declared with [`Session::result`]
//! - **Type-A and Type-B helpers**: estimates from repeated observations and
//!   from assumed distributions
//! - **Computation graphs**: every result records the expression that produced
//!   it, for inspection and rendering
//!
//! Numerical failures never panic. Domain errors, stale references and
//! inconsistent correlations are reported through [`UncertainError`].

pub mod computation;
pub mod distributions;
pub mod dof;
pub mod error;
pub mod operations;
pub mod registry;
pub mod sensitivity;
pub mod statistics;
pub mod uncertain;

pub use error::{Result, UncertainError};
pub use registry::{
    ElementaryId, ElementaryRecord, INF, IntermediateRecord, Session, SessionConfig,
};
pub use sensitivity::Sensitivity;
pub use statistics::{UncertaintyComponent, correlation_matrix, covariance_matrix};
pub use uncertain::UncertainReal;

pub use operations::{BinaryOperation, Operand, UnaryOperation, max, mean, min, prod, sum};
