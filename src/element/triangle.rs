use super::NodalShape;
use crate::Real;
use numeric_literals::replace_float_literals;

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn tri3<T: Real>(r: T, s: T) -> Vec<NodalShape<T>> {
    vec![
        NodalShape::new(1.0 - r - s, [-1.0, -1.0], [0.0; 3]),
        NodalShape::new(r, [1.0, 0.0], [0.0; 3]),
        NodalShape::new(s, [0.0, 1.0], [0.0; 3]),
    ]
}

/// Corner nodes first, then the edge midpoints of the edges (0, 1), (1, 2) and (2, 0).
#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn tri6<T: Real>(r: T, s: T) -> Vec<NodalShape<T>> {
    let t = 1.0 - r - s;
    vec![
        NodalShape::new(t * (2.0 * t - 1.0), [1.0 - 4.0 * t, 1.0 - 4.0 * t], [4.0, 4.0, 4.0]),
        NodalShape::new(r * (2.0 * r - 1.0), [4.0 * r - 1.0, 0.0], [4.0, 0.0, 0.0]),
        NodalShape::new(s * (2.0 * s - 1.0), [0.0, 4.0 * s - 1.0], [0.0, 4.0, 0.0]),
        NodalShape::new(4.0 * r * t, [4.0 * (t - r), -4.0 * r], [-8.0, 0.0, -4.0]),
        NodalShape::new(4.0 * r * s, [4.0 * s, 4.0 * r], [0.0, 0.0, 4.0]),
        NodalShape::new(4.0 * s * t, [-4.0 * s, 4.0 * (t - s)], [0.0, -8.0, -4.0]),
    ]
}
