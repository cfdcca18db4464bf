//! Quadrature rules for the reference domains used in mortar integration.
//!
//! All rules are given in `f64` and consist of a list of weights and a list of points.
//! The reference domains are
//!
//! - the interval `[-1, 1]`,
//! - the quadrilateral `[-1, 1]^2`,
//! - the triangle with vertices `(0, 0)`, `(1, 0)` and `(0, 1)`.
//!
//! Consequently the weights of a rule sum to `2`, `4` and `1/2`, respectively.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod tensor;
pub mod triangle;
pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that a rule satisfying the given requirements is not available.
    NoRuleAvailable,
    /// The iterative computation of a rule failed to converge.
    NotConverged { num_points: usize },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable => {
                write!(f, "There is no quadrature rule satisfying the requirements available")
            }
            Self::NotConverged { num_points } => {
                write!(f, "Computation of the {num_points}-point rule did not converge")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A two-dimensional point.
pub type Point2 = Point<2>;

/// A D-dimensional rule.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// A one-dimensional quadrature rule.
pub type Rule1d = Rule<1>;

/// A two-dimensional quadrature rule.
pub type Rule2d = Rule<2>;

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights
        .iter()
        .zip(points)
        .map(|(w, p)| w * f(p))
        .sum()
}
