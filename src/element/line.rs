use super::NodalShape;
use crate::Real;
use numeric_literals::replace_float_literals;

/// Quadratic Lagrange polynomial on `[-1, 1]` of the node at `node` (one of -1, 0, 1).
///
/// Returns the value and the first and second derivative at `r`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn quadratic_lagrange<T: Real>(node: i8, r: T) -> (T, T, T) {
    match node {
        -1 => (0.5 * r * (r - 1.0), r - 0.5, 1.0),
        1 => (0.5 * r * (r + 1.0), r + 0.5, 1.0),
        _ => (1.0 - r * r, -2.0 * r, -2.0),
    }
}

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn line2<T: Real>(r: T) -> Vec<NodalShape<T>> {
    vec![
        NodalShape::new(0.5 * (1.0 - r), [-0.5, 0.0], [0.0; 3]),
        NodalShape::new(0.5 * (1.0 + r), [0.5, 0.0], [0.0; 3]),
    ]
}

/// Nodes are ordered as `-1`, `1`, `0`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn line3<T: Real>(r: T) -> Vec<NodalShape<T>> {
    [-1, 1, 0]
        .into_iter()
        .map(|node| {
            let (l, dl, ddl) = quadratic_lagrange(node, r);
            NodalShape::new(l, [dl, 0.0], [ddl, 0.0, 0.0])
        })
        .collect()
}
