use super::line::quadratic_lagrange;
use super::NodalShape;
use crate::Real;
use numeric_literals::replace_float_literals;

/// Corner nodes in counter-clockwise order starting at `(-1, -1)`.
const CORNERS: [(i8, i8); 4] = [(-1, -1), (1, -1), (1, 1), (-1, 1)];

/// Edge midpoints of the edges (0, 1), (1, 2), (2, 3) and (3, 0).
const MIDPOINTS: [(i8, i8); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn quad4<T: Real>(r: T, s: T) -> Vec<NodalShape<T>> {
    CORNERS
        .iter()
        .map(|&(a, b)| {
            let (a, b): (T, T) = (sign(a), sign(b));
            NodalShape::new(
                0.25 * (1.0 + a * r) * (1.0 + b * s),
                [0.25 * a * (1.0 + b * s), 0.25 * b * (1.0 + a * r)],
                [0.0, 0.0, 0.25 * a * b],
            )
        })
        .collect()
}

/// Serendipity element: corner nodes followed by edge midpoints.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(super) fn quad8<T: Real>(r: T, s: T) -> Vec<NodalShape<T>> {
    let corners = CORNERS.iter().map(|&(a, b)| {
        let (a, b): (T, T) = (sign(a), sign(b));
        NodalShape::new(
            0.25 * (1.0 + a * r) * (1.0 + b * s) * (a * r + b * s - 1.0),
            [
                0.25 * a * (1.0 + b * s) * (2.0 * a * r + b * s),
                0.25 * b * (1.0 + a * r) * (a * r + 2.0 * b * s),
            ],
            [
                0.5 * (1.0 + b * s),
                0.5 * (1.0 + a * r),
                0.25 * a * b * (2.0 * a * r + 2.0 * b * s + 1.0),
            ],
        )
    });
    let midpoints = MIDPOINTS.iter().map(|&(a, b)| {
        let (a, b): (T, T) = (sign(a), sign(b));
        if a == 0.0 {
            NodalShape::new(
                0.5 * (1.0 - r * r) * (1.0 + b * s),
                [-r * (1.0 + b * s), 0.5 * b * (1.0 - r * r)],
                [-(1.0 + b * s), 0.0, -r * b],
            )
        } else {
            NodalShape::new(
                0.5 * (1.0 + a * r) * (1.0 - s * s),
                [0.5 * a * (1.0 - s * s), -s * (1.0 + a * r)],
                [0.0, -(1.0 + a * r), -a * s],
            )
        }
    });
    corners.chain(midpoints).collect()
}

fn sign<T: Real>(a: i8) -> T {
    nalgebra::convert(f64::from(a))
}

/// Lagrangian element: corners, edge midpoints and the center node.
pub(super) fn quad9<T: Real>(r: T, s: T) -> Vec<NodalShape<T>> {
    CORNERS
        .iter()
        .chain(MIDPOINTS.iter())
        .chain(std::iter::once(&(0, 0)))
        .map(|&(a, b)| {
            let (lr, dlr, ddlr) = quadratic_lagrange(a, r);
            let (ls, dls, ddls) = quadratic_lagrange(b, s);
            NodalShape::new(lr * ls, [dlr * ls, lr * dls], [ddlr * ls, lr * ddls, dlr * dls])
        })
        .collect()
}
