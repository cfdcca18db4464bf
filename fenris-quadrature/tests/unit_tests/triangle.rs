use fenris_quadrature::triangle::triangle_gauss;
use fenris_quadrature::{integrate, Error};
use matrixcompare::assert_scalar_eq;

fn factorial(n: i32) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Exact integral of x^a y^b over the reference triangle.
fn monomial_integral(a: i32, b: i32) -> f64 {
    factorial(a) * factorial(b) / factorial(a + b + 2)
}

#[test]
fn triangle_rules_satisfy_expected_accuracy() {
    for (num_points, degree) in [(1, 1), (3, 2), (6, 4), (7, 5), (12, 6)] {
        let rule = triangle_gauss(num_points).unwrap();
        assert_eq!(rule.0.len(), num_points);
        assert!(rule.0.iter().all(|&w| w > 0.0));
        assert!(rule.1.iter().all(|&[x, y]| x >= 0.0 && y >= 0.0 && x + y <= 1.0));

        for a in 0..=degree {
            for b in 0..=(degree - a) {
                let estimated = integrate(&rule, |&[x, y]| x.powi(a) * y.powi(b));
                assert_scalar_eq!(estimated, monomial_integral(a, b), comp = abs, tol = 1e-12);
            }
        }
    }
}

#[test]
fn unavailable_triangle_rule_is_reported() {
    assert_eq!(triangle_gauss(4), Err(Error::NoRuleAvailable));
}
