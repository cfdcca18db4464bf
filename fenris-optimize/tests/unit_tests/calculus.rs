use fenris_optimize::calculus::*;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, DVector};

#[test]
fn approximate_jacobian_simple_function() {
    let f = |x: &DVector<f64>| {
        let (x1, x2) = (x[0], x[1]);
        DVector::from_column_slice(&[x1 * x2 + 3.0, x1 * x1 + x2 * x2 + x1 + 5.0])
    };

    let h = 1e-6;
    let x = DVector::from_column_slice(&[3.0, 4.0]);
    let j = approximate_jacobian_fd(f, &x, h);

    // J = [   x2           x1 ]
    //     [ 2 x1 + 1     2 x2 ]
    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(2, 2,
        &[4.0, 3.0,
          7.0, 8.0]);

    assert_matrix_eq!(j, expected, comp = abs, tol = 1e-8);
}

#[test]
fn approximate_gradient_and_derivative_agree_with_analytic() {
    let x = DVector::from_column_slice(&[0.5, -1.5, 2.0]);
    let g = approximate_gradient_fd(|x| x[0] * x[1] * x[2], &x, 1e-6);
    let expected = DVector::from_column_slice(&[-3.0, 1.0, -0.75]);
    assert_matrix_eq!(g, expected, comp = abs, tol = 1e-8);

    let d = approximate_derivative_fd(|t: f64| t.sin(), 0.3, 1e-6);
    assert_scalar_eq!(d, 0.3f64.cos(), comp = abs, tol = 1e-9);
}
