//! Proptest strategies for parametric points, element shapes and unit vectors.
use crate::derivative::DerivativeMap;
use crate::element::ElementShape;
use ::proptest::prelude::*;
use nalgebra::{Vector2, Vector3};

pub fn element_shape() -> impl Strategy<Value = ElementShape> {
    use ElementShape::*;
    prop_oneof![
        Just(Line2),
        Just(Line3),
        Just(Tri3),
        Just(Tri6),
        Just(Quad4),
        Just(Quad8),
        Just(Quad9)
    ]
}

/// Points in the parametric domain of the given shape.
pub fn parametric_point(shape: ElementShape) -> BoxedStrategy<Vector2<f64>> {
    if shape.is_line() {
        (-1.0..=1.0).prop_map(|r| Vector2::new(r, 0.0)).boxed()
    } else if shape.is_triangle() {
        // Fold the unit square onto the reference triangle
        (0.0..=1.0, 0.0..=1.0)
            .prop_map(|(r, s): (f64, f64)| {
                if r + s > 1.0 {
                    Vector2::new(1.0 - r, 1.0 - s)
                } else {
                    Vector2::new(r, s)
                }
            })
            .boxed()
    } else {
        [-1.0..=1.0, -1.0..=1.0]
            .prop_map(|[r, s]| Vector2::new(r, s))
            .boxed()
    }
}

/// A shape together with a point in its parametric domain.
pub fn shape_and_point() -> impl Strategy<Value = (ElementShape, Vector2<f64>)> {
    element_shape().prop_flat_map(|shape| (Just(shape), parametric_point(shape)))
}

pub fn unit_vector3() -> impl Strategy<Value = Vector3<f64>> {
    let range = -1.0..1.0;
    [range.clone(), range.clone(), range]
        .prop_map(|[x, y, z]| Vector3::new(x, y, z))
        .prop_filter("vector must not vanish", |v| v.norm() > 1e-3)
        .prop_map(|v| v.normalize())
}

/// Sparse derivative maps over the DOFs `0..num_dofs`.
pub fn derivative_map(num_dofs: usize) -> impl Strategy<Value = DerivativeMap<f64>> {
    ::proptest::collection::vec((0..num_dofs, -10.0..10.0), 0..8)
        .prop_map(|entries: Vec<(usize, f64)>| entries.into_iter().collect())
}
