//! Errors reported by the integration routines.
use crate::element::ElementShape;
use crate::quadrature::QuadratureError;
use fenris_optimize::newton::NewtonError;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Error type shared by all integration and projection routines.
///
/// Every variant is fatal for the current integration pass. The caller decides whether to
/// adjust the contact search, re-mesh or abort.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum IntegrationError {
    /// The integrator settings or the roles of the given elements are inconsistent.
    Configuration(String),
    /// The geometric input is infeasible, e.g. segment bounds outside of `[-1, 1]`.
    InfeasibleInput(String),
    /// The geometry is degenerate, e.g. a vanishing interpolated normal or a singular
    /// projection system.
    DegenerateGeometry(String),
    /// A projected point landed outside the parametric domain of the target element.
    ProjectionOutOfRange {
        element_id: usize,
        shape: ElementShape,
        xi: [f64; 2],
    },
    /// Newton's method failed to find a projection.
    ProjectionFailed { element_id: usize, error: NewtonError },
    /// No quadrature rule with the requested properties is available.
    Quadrature(QuadratureError),
}

impl IntegrationError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn infeasible(message: impl Into<String>) -> Self {
        Self::InfeasibleInput(message.into())
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry(message.into())
    }
}

impl From<QuadratureError> for IntegrationError {
    fn from(error: QuadratureError) -> Self {
        Self::Quadrature(error)
    }
}

impl Display for IntegrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "Invalid integrator configuration: {message}"),
            Self::InfeasibleInput(message) => write!(f, "Infeasible geometric input: {message}"),
            Self::DegenerateGeometry(message) => write!(f, "Degenerate geometry: {message}"),
            Self::ProjectionOutOfRange { element_id, shape, xi } => write!(
                f,
                "Projection onto element {element_id} ({shape:?}) out of range: xi = [{}, {}]",
                xi[0], xi[1]
            ),
            Self::ProjectionFailed { element_id, error } => {
                write!(f, "Projection onto element {element_id} failed: {error}")
            }
            Self::Quadrature(error) => write!(f, "Quadrature error: {error}"),
        }
    }
}

impl std::error::Error for IntegrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ProjectionFailed { error, .. } => Some(error),
            Self::Quadrature(error) => Some(error),
            _ => None,
        }
    }
}
