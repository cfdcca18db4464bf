//! Triangular integration cells for 3D mortar coupling.
use crate::derivative::{spatial_zero, DerivativeMap, SpatialDerivative};
use crate::error::IntegrationError;
use crate::Real;
use nalgebra::{Vector2, Vector3};
use numeric_literals::replace_float_literals;

/// A flat triangle over which mortar integrals are evaluated.
///
/// For direct 3D coupling the vertices are given in the parametric space of the slave
/// element (third component zero). For auxiliary plane coupling they are points in the
/// auxiliary plane in global coordinates. Each vertex carries the derivatives of its
/// coordinates, and the cell carries the auxiliary plane normal and its derivatives.
#[derive(Debug, Clone, PartialEq)]
pub struct Intcell<T> {
    vertices: [Vector3<T>; 3],
    deriv_vertices: [SpatialDerivative<T>; 3],
    auxn: Vector3<T>,
    deriv_auxn: SpatialDerivative<T>,
}

impl<T: Real> Intcell<T> {
    /// A cell with vertices that do not depend on the configuration.
    pub fn new(vertices: [Vector3<T>; 3]) -> Self {
        Self {
            vertices,
            deriv_vertices: [spatial_zero(), spatial_zero(), spatial_zero()],
            auxn: Vector3::zeros(),
            deriv_auxn: spatial_zero(),
        }
    }

    /// A cell in the parametric space of a slave element.
    pub fn in_parameter_space(vertices: [Vector2<T>; 3]) -> Self {
        Self::new(vertices.map(|v| Vector3::new(v[0], v[1], T::zero())))
    }

    pub fn with_vertex_derivatives(mut self, deriv_vertices: [SpatialDerivative<T>; 3]) -> Self {
        self.deriv_vertices = deriv_vertices;
        self
    }

    pub fn with_auxiliary_normal(mut self, auxn: Vector3<T>, deriv_auxn: SpatialDerivative<T>) -> Self {
        self.auxn = auxn;
        self.deriv_auxn = deriv_auxn;
        self
    }

    pub fn vertices(&self) -> &[Vector3<T>; 3] {
        &self.vertices
    }

    pub fn deriv_vertices(&self) -> &[SpatialDerivative<T>; 3] {
        &self.deriv_vertices
    }

    pub fn auxn(&self) -> &Vector3<T> {
        &self.auxn
    }

    pub fn deriv_auxn(&self) -> &SpatialDerivative<T> {
        &self.deriv_auxn
    }

    /// Linear shape functions of the cell at the cell coordinates `eta`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn shape_values(&self, eta: &Vector2<T>) -> [T; 3] {
        [1.0 - eta[0] - eta[1], eta[0], eta[1]]
    }

    pub fn local_to_global(&self, eta: &Vector2<T>) -> Vector3<T> {
        let values = self.shape_values(eta);
        self.vertices
            .iter()
            .zip(values)
            .fold(Vector3::zeros(), |x, (v, n)| x + v * n)
    }

    /// Derivatives of the point at cell coordinates `eta`.
    pub fn deriv_local_to_global(&self, eta: &Vector2<T>) -> SpatialDerivative<T> {
        let values = self.shape_values(eta);
        let mut deriv = spatial_zero();
        for (deriv_vertex, n) in self.deriv_vertices.iter().zip(values) {
            for (deriv_c, deriv_vertex_c) in deriv.iter_mut().zip(deriv_vertex) {
                deriv_c.add_scaled(deriv_vertex_c, n);
            }
        }
        deriv
    }

    fn edges(&self) -> (Vector3<T>, Vector3<T>, Vector3<T>) {
        let a = self.vertices[1] - self.vertices[0];
        let b = self.vertices[2] - self.vertices[0];
        (a, b, a.cross(&b))
    }

    /// The Jacobian of the map from the reference triangle, i.e. twice the area.
    pub fn jacobian(&self) -> T {
        self.edges().2.norm()
    }

    /// Partial derivatives of the Jacobian with respect to the vertex coordinates.
    ///
    /// Entry `[v][c]` is the derivative with respect to component `c` of vertex `v`.
    pub fn deriv_jacobian_prefactors(&self) -> Result<[Vector3<T>; 3], IntegrationError> {
        let (a, b, c) = self.edges();
        let jac = c.norm();
        if jac <= T::zero() {
            return Err(IntegrationError::degenerate("integration cell has zero area"));
        }
        let da = b.cross(&c) / jac;
        let db = c.cross(&a) / jac;
        Ok([-(da + db), da, db])
    }

    /// The derivative of the Jacobian with respect to the nodal DOFs.
    pub fn deriv_jacobian(&self) -> Result<DerivativeMap<T>, IntegrationError> {
        let prefactors = self.deriv_jacobian_prefactors()?;
        let mut deriv = DerivativeMap::new();
        for (prefactor, deriv_vertex) in prefactors.iter().zip(&self.deriv_vertices) {
            for (c, deriv_vertex_c) in deriv_vertex.iter().enumerate() {
                deriv.add_scaled(deriv_vertex_c, prefactor[c]);
            }
        }
        Ok(deriv)
    }
}
