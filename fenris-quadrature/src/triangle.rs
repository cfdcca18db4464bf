//! Symmetric quadrature rules for the reference triangle with vertices `(0, 0)`, `(1, 0)`
//! and `(0, 1)`.
//!
//! The rules are the classical symmetric rules tabulated by Strang and Fix and by Dunavant
//! (1985). Weights are scaled so that they sum to the area `1/2` of the reference triangle.

use crate::{Error, Point2, Rule};

/// Returns the symmetric rule with the given number of points.
///
/// Available rules and the polynomial degree they integrate exactly:
///
/// | points | degree |
/// |--------|--------|
/// | 1      | 1      |
/// | 3      | 2      |
/// | 6      | 4      |
/// | 7      | 5      |
/// | 12     | 6      |
pub fn triangle_gauss(num_points: usize) -> Result<Rule<2>, Error> {
    let mut rule = Vec::new();
    match num_points {
        1 => rule.push((1.0, [1.0 / 3.0, 1.0 / 3.0])),
        3 => push_orbit_3(&mut rule, 1.0 / 3.0, 1.0 / 6.0),
        6 => {
            push_orbit_3(&mut rule, 0.223381589678011, 0.445948490915965);
            push_orbit_3(&mut rule, 0.109951743655322, 0.091576213509771);
        }
        7 => {
            rule.push((0.225, [1.0 / 3.0, 1.0 / 3.0]));
            push_orbit_3(&mut rule, 0.132394152788506, 0.470142064105115);
            push_orbit_3(&mut rule, 0.125939180544827, 0.101286507323456);
        }
        12 => {
            push_orbit_3(&mut rule, 0.116786275726379, 0.249286745170910);
            push_orbit_3(&mut rule, 0.050844906370207, 0.063089014491502);
            push_orbit_6(&mut rule, 0.082851075618374, 0.310352451033784, 0.053145049844817);
        }
        _ => return Err(Error::NoRuleAvailable),
    }

    // Tabulated weights are normalized to the unit measure
    Ok(rule.into_iter().map(|(w, p)| (0.5 * w, p)).unzip())
}

/// Pushes the three points with barycentric coordinates `(1 - 2a, a, a)` and permutations.
fn push_orbit_3(rule: &mut Vec<(f64, Point2)>, weight: f64, a: f64) {
    let b = 1.0 - 2.0 * a;
    rule.extend([(weight, [a, a]), (weight, [b, a]), (weight, [a, b])]);
}

/// Pushes the six points with barycentric coordinates `(a, b, 1 - a - b)` and permutations.
fn push_orbit_6(rule: &mut Vec<(f64, Point2)>, weight: f64, a: f64, b: f64) {
    let c = 1.0 - a - b;
    rule.extend(
        [[a, b], [b, a], [a, c], [c, a], [b, c], [c, b]]
            .into_iter()
            .map(|p| (weight, p)),
    );
}
