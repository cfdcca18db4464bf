//! Quadrature rules in parametric coordinates of mortar elements and integration cells.
//!
//! Points are always returned as two-component vectors. Rules on lines leave the second
//! component at zero.
use crate::element::ElementShape;
use crate::Real;
use fenris_quadrature::{tensor, triangle, univariate, Rule};
use nalgebra::{convert, Vector2};

/// Errors returned by quadrature methods.
pub use fenris_quadrature::Error as QuadratureError;

pub type QuadraturePair<T> = (Vec<T>, Vec<Vector2<T>>);

fn convert_rule<T: Real, const D: usize>((weights, points): Rule<D>) -> QuadraturePair<T> {
    let weights = weights.into_iter().map(convert).collect();
    let points = points
        .into_iter()
        .map(|p| {
            let mut xi = Vector2::zeros();
            for (i, coord) in p.into_iter().enumerate() {
                xi[i] = convert(coord);
            }
            xi
        })
        .collect();
    (weights, points)
}

/// Gauss rule on `[-1, 1]`.
pub fn line_gauss<T: Real>(num_points: usize) -> Result<QuadraturePair<T>, QuadratureError> {
    univariate::try_gauss(num_points).map(convert_rule)
}

/// Symmetric rule on the reference triangle.
pub fn triangle_gauss<T: Real>(num_points: usize) -> Result<QuadraturePair<T>, QuadratureError> {
    triangle::triangle_gauss(num_points).map(convert_rule)
}

/// Tensor product Gauss rule on `[-1, 1]^2`.
pub fn quadrilateral_gauss<T: Real>(num_points_per_dim: usize) -> Result<QuadraturePair<T>, QuadratureError> {
    tensor::quadrilateral_gauss(num_points_per_dim).map(convert_rule)
}

/// A rule on the reference domain of the element that integrates products of two shape
/// functions and the Jacobian of an undistorted element exactly.
pub fn element_rule<T: Real>(shape: ElementShape) -> Result<QuadraturePair<T>, QuadratureError> {
    use ElementShape::*;
    match shape {
        Line2 | Line3 => line_gauss(5),
        Tri3 => triangle_gauss(7),
        Tri6 => triangle_gauss(12),
        Quad4 => quadrilateral_gauss(3),
        Quad8 | Quad9 => quadrilateral_gauss(4),
    }
}
