//! Mortar elements, their shape functions and geometric services.
use crate::derivative::{linearize_unit_vector, spatial_zero, DerivativeMap, ParametricDerivative, SpatialDerivative};
use crate::error::IntegrationError;
use crate::node::ContactNode;
use crate::Real;
use nalgebra::{convert, try_convert, DMatrix, DVector, Vector2, Vector3};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

mod dual;
mod line;
mod quadrilateral;
mod subelement;
mod triangle;

pub use dual::DualBasis;
pub use subelement::IntElement;

/// Topology of a mortar element.
///
/// Line elements live in 2D problems, triangles and quadrilaterals in 3D problems.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementShape {
    Line2,
    Line3,
    Tri3,
    Tri6,
    Quad4,
    Quad8,
    Quad9,
}

/// Value, gradient and Hessian (`xi xi`, `eta eta`, `xi eta`) of a single shape function.
#[derive(Debug, Copy, Clone)]
pub(crate) struct NodalShape<T> {
    value: T,
    gradient: [T; 2],
    hessian: [T; 3],
}

impl<T> NodalShape<T> {
    fn new(value: T, gradient: [T; 2], hessian: [T; 3]) -> Self {
        Self {
            value,
            gradient,
            hessian,
        }
    }
}

#[rustfmt::skip]
const LINE3_NODES: [[f64; 2]; 3] = [[-1.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
#[rustfmt::skip]
const TRI6_NODES: [[f64; 2]; 6] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.5, 0.0], [0.5, 0.5], [0.0, 0.5]];
#[rustfmt::skip]
const QUAD9_NODES: [[f64; 2]; 9] = [
    [-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0],
    [0.0, -1.0], [1.0, 0.0], [0.0, 1.0], [-1.0, 0.0],
    [0.0, 0.0],
];

impl ElementShape {
    pub fn num_nodes(&self) -> usize {
        use ElementShape::*;
        match self {
            Line2 => 2,
            Line3 => 3,
            Tri3 => 3,
            Tri6 => 6,
            Quad4 => 4,
            Quad8 => 8,
            Quad9 => 9,
        }
    }

    /// The dimension of the parametric domain.
    pub fn parametric_dim(&self) -> usize {
        if self.is_line() {
            1
        } else {
            2
        }
    }

    /// The spatial dimension of problems this shape is used in.
    pub fn spatial_dim(&self) -> usize {
        self.parametric_dim() + 1
    }

    pub fn is_line(&self) -> bool {
        matches!(self, ElementShape::Line2 | ElementShape::Line3)
    }

    pub fn is_triangle(&self) -> bool {
        matches!(self, ElementShape::Tri3 | ElementShape::Tri6)
    }

    /// Whether the dual basis of an element of this shape depends on its geometry.
    ///
    /// The Jacobian of undistorted linear lines and triangles is constant, so their dual
    /// coefficients are the same for every configuration.
    pub fn has_deformation_dependent_dual(&self) -> bool {
        !matches!(self, ElementShape::Line2 | ElementShape::Tri3)
    }

    /// Parametric coordinates of the given node.
    ///
    /// # Panics
    ///
    /// Panics if the node index is out of bounds.
    pub fn node_coords<T: Real>(&self, node: usize) -> Vector2<T> {
        use ElementShape::*;
        assert!(node < self.num_nodes(), "Node index out of bounds");
        let [r, s] = match self {
            Line2 | Line3 => LINE3_NODES[node],
            Tri3 | Tri6 => TRI6_NODES[node],
            Quad4 | Quad8 | Quad9 => QUAD9_NODES[node],
        };
        Vector2::new(convert(r), convert(s))
    }

    /// The parametric coordinates of the element center.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn center<T: Real>(&self) -> Vector2<T> {
        if self.is_triangle() {
            Vector2::new(1.0 / 3.0, 1.0 / 3.0)
        } else {
            Vector2::zeros()
        }
    }

    /// Checks whether `xi` lies in the parametric domain, enlarged by `tol`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn is_in_domain<T: Real>(&self, xi: &Vector2<T>, tol: T) -> bool {
        let in_interval = |x: T| x >= -1.0 - tol && x <= 1.0 + tol;
        if self.is_line() {
            in_interval(xi[0])
        } else if self.is_triangle() {
            xi[0] >= -tol
                && xi[1] >= -tol
                && xi[0] <= 1.0 + tol
                && xi[1] <= 1.0 + tol
                && xi[0] + xi[1] <= 1.0 + 2.0 * tol
        } else {
            in_interval(xi[0]) && in_interval(xi[1])
        }
    }

    fn nodal_shapes<T: Real>(&self, xi: &Vector2<T>) -> Vec<NodalShape<T>> {
        use ElementShape::*;
        let (r, s) = (xi[0], xi[1]);
        match self {
            Line2 => line::line2(r),
            Line3 => line::line3(r),
            Tri3 => triangle::tri3(r, s),
            Tri6 => triangle::tri6(r, s),
            Quad4 => quadrilateral::quad4(r, s),
            Quad8 => quadrilateral::quad8(r, s),
            Quad9 => quadrilateral::quad9(r, s),
        }
    }

    /// Evaluates the shape functions and their first derivatives at `xi`.
    pub fn evaluate<T: Real>(&self, xi: &Vector2<T>) -> ShapeValues<T> {
        let shapes = self.nodal_shapes(xi);
        let n = shapes.len();
        ShapeValues {
            values: DVector::from_iterator(n, shapes.iter().map(|shape| shape.value)),
            derivatives: DMatrix::from_fn(n, 2, |i, d| shapes[i].gradient[d]),
        }
    }

    /// Second derivatives of the shape functions at `xi`, one row per node with columns
    /// `xi xi`, `eta eta` and `xi eta`.
    pub fn second_derivatives<T: Real>(&self, xi: &Vector2<T>) -> DMatrix<T> {
        let shapes = self.nodal_shapes(xi);
        DMatrix::from_fn(shapes.len(), 3, |i, d| shapes[i].hessian[d])
    }
}

/// Shape function values and first parametric derivatives at a point.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeValues<T> {
    pub values: DVector<T>,
    /// One row per node, one column per parametric direction.
    pub derivatives: DMatrix<T>,
}

impl<T: Real> ShapeValues<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub(crate) fn to_f64<T: Real>(x: T) -> f64 {
    try_convert(x).unwrap_or(f64::NAN)
}

/// An element on the slave or master side of a contact interface.
///
/// The element owns copies of its nodes. Nodes shared between elements must be kept
/// consistent by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct MortarElement<T> {
    id: usize,
    shape: ElementShape,
    nodes: Vec<ContactNode<T>>,
    is_slave: bool,
}

impl<T: Real> MortarElement<T> {
    pub fn new(
        id: usize,
        shape: ElementShape,
        nodes: Vec<ContactNode<T>>,
        is_slave: bool,
    ) -> Result<Self, IntegrationError> {
        if nodes.len() != shape.num_nodes() {
            return Err(IntegrationError::infeasible(format!(
                "element {id} of shape {shape:?} needs {} nodes, got {}",
                shape.num_nodes(),
                nodes.len()
            )));
        }
        if nodes.iter().any(|node| node.dim() != shape.spatial_dim()) {
            return Err(IntegrationError::infeasible(format!(
                "nodes of element {id} ({shape:?}) must have {} DOFs",
                shape.spatial_dim()
            )));
        }
        Ok(Self {
            id,
            shape,
            nodes,
            is_slave,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn shape(&self) -> ElementShape {
        self.shape
    }

    pub fn is_slave(&self) -> bool {
        self.is_slave
    }

    /// The spatial dimension of the problem the element belongs to.
    pub fn dim(&self) -> usize {
        self.shape.spatial_dim()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[ContactNode<T>] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [ContactNode<T>] {
        &mut self.nodes
    }

    pub fn has_boundary_nodes(&self) -> bool {
        self.nodes.iter().any(ContactNode::is_on_boundary)
    }

    pub fn evaluate_shape(&self, xi: &Vector2<T>) -> ShapeValues<T> {
        self.shape.evaluate(xi)
    }

    /// Interpolates the nodal positions with the given shape function values.
    pub fn interpolate_position(&self, values: &DVector<T>) -> Vector3<T> {
        self.nodes
            .iter()
            .zip(values.iter())
            .fold(Vector3::zeros(), |x, (node, &n)| x + node.position() * n)
    }

    /// Interpolates the nodal unit normals. The result is in general not of unit length.
    pub fn interpolate_normal(&self, values: &DVector<T>) -> Vector3<T> {
        self.nodes
            .iter()
            .zip(values.iter())
            .fold(Vector3::zeros(), |n, (node, &phi)| n + node.normal() * phi)
    }

    pub fn position_at(&self, xi: &Vector2<T>) -> Vector3<T> {
        self.interpolate_position(&self.evaluate_shape(xi).values)
    }

    /// The parametric derivative of the position in direction `d`.
    pub fn position_gradient(&self, shapes: &ShapeValues<T>, d: usize) -> Vector3<T> {
        self.nodes
            .iter()
            .enumerate()
            .fold(Vector3::zeros(), |x, (i, node)| x + node.position() * shapes.derivatives[(i, d)])
    }

    /// The parametric derivative of the interpolated normal in direction `d`.
    pub fn normal_gradient(&self, shapes: &ShapeValues<T>, d: usize) -> Vector3<T> {
        self.nodes
            .iter()
            .enumerate()
            .fold(Vector3::zeros(), |n, (i, node)| n + node.normal() * shapes.derivatives[(i, d)])
    }

    /// The covariant tangent vectors. For lines the second tangent is the unit vector `e_z`.
    pub fn tangents(&self, shapes: &ShapeValues<T>) -> (Vector3<T>, Vector3<T>) {
        let gxi = self.position_gradient(shapes, 0);
        let geta = if self.shape.is_line() {
            Vector3::z()
        } else {
            self.position_gradient(shapes, 1)
        };
        (gxi, geta)
    }

    /// The (non-unit) element normal `g_xi x g_eta` at `xi`.
    pub fn normal_at(&self, xi: &Vector2<T>) -> Vector3<T> {
        let (gxi, geta) = self.tangents(&self.evaluate_shape(xi));
        gxi.cross(&geta)
    }

    /// The Jacobian determinant of the map from the parametric domain to the element.
    pub fn jacobian(&self, xi: &Vector2<T>) -> T {
        self.normal_at(xi).norm()
    }

    fn checked_jacobian(&self, normal: &Vector3<T>) -> Result<T, IntegrationError> {
        let jac = normal.norm();
        if jac > T::zero() {
            Ok(jac)
        } else {
            Err(IntegrationError::degenerate(format!(
                "element {} has vanishing Jacobian",
                self.id
            )))
        }
    }

    /// The derivative of the Jacobian at `xi` with respect to the nodal coordinates.
    pub fn deriv_jacobian(&self, xi: &Vector2<T>) -> Result<DerivativeMap<T>, IntegrationError> {
        let shapes = self.evaluate_shape(xi);
        let (gxi, geta) = self.tangents(&shapes);
        let c = gxi.cross(&geta);
        let jac = self.checked_jacobian(&c)?;

        let dxi_factor = geta.cross(&c) / jac;
        let deta_factor = c.cross(&gxi) / jac;
        let mut deriv = DerivativeMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            let (d0, d1) = (shapes.derivatives[(i, 0)], shapes.derivatives[(i, 1)]);
            for (k, &dof) in node.dofs().iter().enumerate() {
                deriv.accumulate(dof, d0 * dxi_factor[k] + d1 * deta_factor[k]);
            }
        }
        Ok(deriv)
    }

    /// The parametric gradient of the Jacobian at `xi`.
    pub fn jacobian_gradient(&self, xi: &Vector2<T>) -> Result<[T; 2], IntegrationError> {
        let shapes = self.evaluate_shape(xi);
        let second = self.shape.second_derivatives(xi);
        let (gxi, geta) = self.tangents(&shapes);
        let c = gxi.cross(&geta);
        let jac = self.checked_jacobian(&c)?;

        let mut gxi_xi = Vector3::zeros();
        let mut gxi_eta = Vector3::zeros();
        let mut geta_eta = Vector3::zeros();
        for (i, node) in self.nodes.iter().enumerate() {
            gxi_xi += node.position() * second[(i, 0)];
            geta_eta += node.position() * second[(i, 1)];
            gxi_eta += node.position() * second[(i, 2)];
        }
        if self.shape.is_line() {
            geta_eta = Vector3::zeros();
        }
        let geta_xi = if self.shape.is_line() { Vector3::zeros() } else { gxi_eta };

        let dc_xi = gxi_xi.cross(&geta) + gxi.cross(&geta_xi);
        let dc_eta = gxi_eta.cross(&geta) + gxi.cross(&geta_eta);
        Ok([c.dot(&dc_xi) / jac, c.dot(&dc_eta) / jac])
    }

    /// The unit element normal at `xi` and the derivatives of its components.
    pub fn deriv_unit_normal_at(
        &self,
        xi: &Vector2<T>,
    ) -> Result<(Vector3<T>, SpatialDerivative<T>), IntegrationError> {
        let shapes = self.evaluate_shape(xi);
        let (gxi, geta) = self.tangents(&shapes);
        let c = gxi.cross(&geta);
        let length = self.checked_jacobian(&c)?;

        let mut deriv_c = spatial_zero();
        for (i, node) in self.nodes.iter().enumerate() {
            let (d0, d1) = (shapes.derivatives[(i, 0)], shapes.derivatives[(i, 1)]);
            for (k, &dof) in node.dofs().iter().enumerate() {
                let e_k = Vector3::ith(k, T::one());
                let dc = e_k.cross(&geta) * d0 + gxi.cross(&e_k) * d1;
                for (m, deriv) in deriv_c.iter_mut().enumerate() {
                    deriv.accumulate(dof, dc[m]);
                }
            }
        }

        let unit = c / length;
        Ok((unit, linearize_unit_vector(&unit, length, &deriv_c)))
    }

    /// Derivatives of the interpolated (non-unit) normal at a point whose parametric
    /// coordinates have the derivatives `dxi`.
    pub fn deriv_interpolated_normal(
        &self,
        shapes: &ShapeValues<T>,
        dxi: &ParametricDerivative<T>,
    ) -> SpatialDerivative<T> {
        let mut deriv = spatial_zero();
        for (i, node) in self.nodes.iter().enumerate() {
            for (c, deriv_c) in deriv.iter_mut().enumerate() {
                deriv_c.add_scaled(&node.deriv_normal()[c], shapes.values[i]);
                for d in 0..self.shape.parametric_dim() {
                    deriv_c.add_scaled(&dxi[d], shapes.derivatives[(i, d)] * node.normal()[c]);
                }
            }
        }
        deriv
    }

    /// Derivatives of the interpolated position at a point whose parametric coordinates
    /// have the derivatives `dxi`.
    pub fn deriv_interpolated_position(
        &self,
        shapes: &ShapeValues<T>,
        dxi: &ParametricDerivative<T>,
    ) -> SpatialDerivative<T> {
        let mut deriv = spatial_zero();
        for (i, node) in self.nodes.iter().enumerate() {
            for (k, &dof) in node.dofs().iter().enumerate() {
                deriv[k].accumulate(dof, shapes.values[i]);
            }
        }
        for d in 0..self.shape.parametric_dim() {
            let tangent = self.position_gradient(shapes, d);
            for (c, deriv_c) in deriv.iter_mut().enumerate() {
                deriv_c.add_scaled(&dxi[d], tangent[c]);
            }
        }
        deriv
    }

    pub(crate) fn out_of_range(&self, xi: &Vector2<T>) -> IntegrationError {
        IntegrationError::ProjectionOutOfRange {
            element_id: self.id,
            shape: self.shape,
            xi: [to_f64(xi[0]), to_f64(xi[1])],
        }
    }
}
