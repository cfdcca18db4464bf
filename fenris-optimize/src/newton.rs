use log::trace;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OMatrix, OVector, RealField};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// A square nonlinear system `F(x) = 0` of small, statically known size.
pub trait NonlinearSystem<T, D>
where
    T: RealField,
    D: DimName,
    DefaultAllocator: Allocator<T, D> + Allocator<T, D, D>,
{
    /// Evaluates the residual `F(x)` and the Jacobian `dF/dx` at `x`.
    fn evaluate(&self, x: &OVector<T, D>) -> (OVector<T, D>, OMatrix<T, D, D>);
}

#[derive(Debug, Clone)]
pub struct NewtonResult<T, D>
where
    T: RealField,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub solution: OVector<T, D>,
    pub iterations: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewtonSettings<T> {
    pub max_iterations: Option<usize>,
    /// The iteration has converged once the residual norm or the norm of the last
    /// correction falls below this value.
    pub tolerance: T,
}

impl<T: RealField + Copy> Default for NewtonSettings<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn default() -> Self {
        Self {
            max_iterations: Some(20),
            tolerance: 1e-12,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewtonError {
    /// The procedure failed because the maximum number of iterations was reached.
    MaximumIterationsReached(usize),
    /// The Jacobian was singular at the given iteration.
    SingularJacobian(usize),
    /// The residual was not finite at the given iteration.
    NonFiniteResidual(usize),
}

impl Display for NewtonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            &NewtonError::MaximumIterationsReached(maxit) => {
                write!(f, "Failed to converge within maximum number of iterations ({}).", maxit)
            }
            &NewtonError::SingularJacobian(iter) => {
                write!(f, "Jacobian is singular at iteration {}.", iter)
            }
            &NewtonError::NonFiniteResidual(iter) => {
                write!(f, "Residual is not finite at iteration {}.", iter)
            }
        }
    }
}

impl Error for NewtonError {}

/// Attempts to solve the nonlinear equation `F(x) = 0`, starting from `x0`.
///
/// Full Newton steps are taken. The Jacobian is inverted directly, which is appropriate
/// for the very small systems this function is meant for.
pub fn newton<T, D, F>(
    system: &F,
    x0: OVector<T, D>,
    settings: &NewtonSettings<T>,
) -> Result<NewtonResult<T, D>, NewtonError>
where
    T: RealField + Copy,
    D: DimName,
    F: NonlinearSystem<T, D>,
    DefaultAllocator: Allocator<T, D> + Allocator<T, D, D>,
{
    let mut x = x0;
    let mut iter = 0;

    loop {
        let (f, jacobian) = system.evaluate(&x);
        let residual_norm = f.norm();
        if !residual_norm.is_finite() {
            return Err(NewtonError::NonFiniteResidual(iter));
        }
        if residual_norm <= settings.tolerance {
            break;
        }
        if settings
            .max_iterations
            .map(|max_iter| iter == max_iter)
            .unwrap_or(false)
        {
            return Err(NewtonError::MaximumIterationsReached(iter));
        }

        let jacobian_inv = jacobian
            .try_inverse()
            .ok_or(NewtonError::SingularJacobian(iter))?;
        let dx = -(jacobian_inv * f);
        x += &dx;
        iter += 1;

        if dx.norm() <= settings.tolerance {
            break;
        }
    }

    trace!("Newton converged after {} iterations", iter);
    Ok(NewtonResult { solution: x, iterations: iter })
}
