use super::{ElementShape, MortarElement, ShapeValues};
use crate::derivative::DerivativeMap;
use crate::error::IntegrationError;
use crate::quadrature::element_rule;
use crate::Real;
use nalgebra::{DMatrix, DVector, Vector2};
use numeric_literals::replace_float_literals;

/// Dual (biorthogonal) shape functions of a slave element.
///
/// The dual functions are linear combinations `phi = A b` of a base `b`. Without
/// modification the base consists of the standard shape functions. With boundary
/// modification, line elements with nodes on the boundary use a reduced base in which the
/// multipliers of boundary nodes vanish. The coefficients are
///
/// ```text
/// A = D_e M_e^{-1},   M_e[j, k] = int b_j N_k J,   D_e = diag(int N_j J),
/// ```
///
/// restricted to the nodes that keep a multiplier, so that `int phi_j N_k J = delta_jk D_e[j, j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DualBasis<T> {
    shape: ElementShape,
    base: Base,
    coefficients: DMatrix<T>,
    coefficient_derivatives: Option<Vec<Vec<DerivativeMap<T>>>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Base {
    Standard,
    /// Line2 with the given boundary node.
    Line2Edge { boundary: usize },
    /// Line3 with the given boundary end node.
    Line3Edge { boundary: usize },
}

impl Base {
    fn is_active(&self, node: usize) -> bool {
        match *self {
            Base::Standard => true,
            Base::Line2Edge { boundary } | Base::Line3Edge { boundary } => node != boundary,
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate<T: Real>(&self, shape: ElementShape, xi: &Vector2<T>) -> ShapeValues<T> {
        let r = xi[0];
        let (values, derivatives): (Vec<T>, Vec<T>) = match *self {
            Base::Standard => return shape.evaluate(xi),
            Base::Line2Edge { boundary: 0 } => (vec![0.0, 1.0], vec![0.0, 0.0]),
            Base::Line2Edge { .. } => (vec![1.0, 0.0], vec![0.0, 0.0]),
            Base::Line3Edge { boundary: 0 } => (vec![0.0, r, 1.0 - r], vec![0.0, 1.0, -1.0]),
            Base::Line3Edge { .. } => (vec![-r, 0.0, 1.0 + r], vec![-1.0, 0.0, 1.0]),
        };
        let n = values.len();
        ShapeValues {
            values: DVector::from_vec(values),
            derivatives: DMatrix::from_fn(n, 2, |i, d| if d == 0 { derivatives[i] } else { T::zero() }),
        }
    }
}

impl<T: Real> DualBasis<T> {
    /// Builds the dual basis of the element.
    ///
    /// With `boundary_modification`, line elements with boundary nodes use the modified base.
    /// Derivatives of the coefficients are computed if `with_derivatives` is set and the basis
    /// depends on the geometry.
    pub fn new(
        element: &MortarElement<T>,
        boundary_modification: bool,
        with_derivatives: bool,
    ) -> Result<Self, IntegrationError> {
        let shape = element.shape();
        let base = if boundary_modification && element.has_boundary_nodes() {
            edge_base(element)?
        } else {
            Base::Standard
        };

        let n = shape.num_nodes();
        let active: Vec<usize> = (0..n).filter(|&j| base.is_active(j)).collect();
        let na = active.len();

        let (weights, points) = element_rule(shape)?;
        let mut me = DMatrix::<T>::zeros(na, na);
        let mut de = DVector::<T>::zeros(na);
        let compute_derivatives = with_derivatives && shape.has_deformation_dependent_dual();
        let mut deriv_me = vec![vec![DerivativeMap::new(); na]; na];
        let mut deriv_de = vec![DerivativeMap::new(); na];

        for (&w, xi) in weights.iter().zip(&points) {
            let standard = shape.evaluate(xi);
            let b = base.evaluate(shape, xi);
            let jac = element.jacobian(xi);
            let deriv_jac = if compute_derivatives {
                Some(element.deriv_jacobian(xi)?)
            } else {
                None
            };

            for (a, &j) in active.iter().enumerate() {
                de[a] += w * standard.values[j] * jac;
                for (c, &k) in active.iter().enumerate() {
                    me[(a, c)] += w * b.values[j] * standard.values[k] * jac;
                }
                if let Some(deriv_jac) = &deriv_jac {
                    deriv_de[a].add_scaled(deriv_jac, w * standard.values[j]);
                    for (c, &k) in active.iter().enumerate() {
                        deriv_me[a][c].add_scaled(deriv_jac, w * b.values[j] * standard.values[k]);
                    }
                }
            }
        }

        let me_inv = me.try_inverse().ok_or_else(|| {
            IntegrationError::degenerate(format!("singular dual basis mass matrix of element {}", element.id()))
        })?;
        let active_coefficients = DMatrix::from_diagonal(&de) * &me_inv;

        let mut coefficients = DMatrix::zeros(n, n);
        for (a, &j) in active.iter().enumerate() {
            for (c, &k) in active.iter().enumerate() {
                coefficients[(j, k)] = active_coefficients[(a, c)];
            }
        }

        // dA = (dD_e - A dM_e) M_e^{-1}
        let coefficient_derivatives = compute_derivatives.then(|| {
            let mut rhs = vec![vec![DerivativeMap::new(); na]; na];
            for a in 0..na {
                rhs[a][a].merge(&deriv_de[a]);
                for c in 0..na {
                    for m in 0..na {
                        rhs[a][c].add_scaled(&deriv_me[m][c], -active_coefficients[(a, m)]);
                    }
                }
            }
            let mut derivatives = vec![vec![DerivativeMap::new(); n]; n];
            for (a, &j) in active.iter().enumerate() {
                for (c, &k) in active.iter().enumerate() {
                    for l in 0..na {
                        derivatives[j][k].add_scaled(&rhs[a][l], me_inv[(l, c)]);
                    }
                }
            }
            derivatives
        });

        Ok(Self {
            shape,
            base,
            coefficients,
            coefficient_derivatives,
        })
    }

    /// Whether the base was modified because of boundary nodes.
    pub fn is_modified(&self) -> bool {
        self.base != Base::Standard
    }

    /// The coefficient matrix `A`.
    pub fn coefficients(&self) -> &DMatrix<T> {
        &self.coefficients
    }

    /// Derivatives `dA[j][m]` of the coefficients, if the basis depends on the geometry and
    /// derivatives were requested.
    pub fn coefficient_derivatives(&self) -> Option<&[Vec<DerivativeMap<T>>]> {
        self.coefficient_derivatives.as_deref()
    }

    /// Values and derivatives of the base functions `b` at `xi`.
    pub fn evaluate_base(&self, xi: &Vector2<T>) -> ShapeValues<T> {
        self.base.evaluate(self.shape, xi)
    }

    /// Values and derivatives of the dual shape functions at `xi`.
    pub fn evaluate(&self, xi: &Vector2<T>) -> ShapeValues<T> {
        let base = self.evaluate_base(xi);
        ShapeValues {
            values: &self.coefficients * base.values,
            derivatives: &self.coefficients * base.derivatives,
        }
    }
}

fn edge_base<T: Real>(element: &MortarElement<T>) -> Result<Base, IntegrationError> {
    let boundary: Vec<usize> = element
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_on_boundary())
        .map(|(i, _)| i)
        .collect();

    match (element.shape(), boundary.as_slice()) {
        (ElementShape::Line2, &[b]) => Ok(Base::Line2Edge { boundary: b }),
        (ElementShape::Line3, &[b]) if b < 2 => Ok(Base::Line3Edge { boundary: b }),
        (shape, _) if shape.is_line() => Err(IntegrationError::infeasible(format!(
            "element {} has an unsupported set of boundary nodes {:?}",
            element.id(),
            boundary
        ))),
        (shape, _) => Err(IntegrationError::configuration(format!(
            "boundary modification is not supported for {shape:?} elements"
        ))),
    }
}
