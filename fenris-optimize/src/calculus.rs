use nalgebra::{DMatrix, DVector, RealField};
use numeric_literals::replace_float_literals;

/// Approximates the derivative of a scalar function with a central difference.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn approximate_derivative_fd<T, F>(mut f: F, x: T, h: T) -> T
where
    T: RealField + Copy,
    F: FnMut(T) -> T,
{
    (f(x + h) - f(x - h)) / (2.0 * h)
}

/// Approximates the gradient of a scalar function `f: R^n -> R` with central differences.
pub fn approximate_gradient_fd<T, F>(mut f: F, x: &DVector<T>, h: T) -> DVector<T>
where
    T: RealField + Copy,
    F: FnMut(&DVector<T>) -> T,
{
    let jacobian = approximate_jacobian_fd(|x| DVector::from_element(1, f(x)), x, h);
    jacobian.row(0).transpose()
}

/// Approximates the Jacobian of a vector function `f: R^n -> R^m` with central differences.
///
/// Column `j` of the result is the derivative of `f` with respect to `x[j]`. The dimension `m`
/// is determined by the output at the first perturbation, and all outputs must agree with it.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub fn approximate_jacobian_fd<T, F>(mut f: F, x: &DVector<T>, h: T) -> DMatrix<T>
where
    T: RealField + Copy,
    F: FnMut(&DVector<T>) -> DVector<T>,
{
    let n = x.len();
    let mut columns = Vec::with_capacity(n);
    let mut x_perturbed = x.clone();

    for j in 0..n {
        x_perturbed[j] = x[j] + h;
        let f_plus = f(&x_perturbed);
        x_perturbed[j] = x[j] - h;
        let f_minus = f(&x_perturbed);
        x_perturbed[j] = x[j];

        assert_eq!(f_plus.len(), f_minus.len(), "Function output dimension must be constant");
        columns.push((f_plus - f_minus) / (2.0 * h));
    }

    let m = columns.first().map(|c| c.len()).unwrap_or(0);
    let mut jacobian = DMatrix::zeros(m, n);
    for (j, column) in columns.into_iter().enumerate() {
        assert_eq!(column.len(), m, "Function output dimension must be constant");
        jacobian.set_column(j, &column);
    }
    jacobian
}
