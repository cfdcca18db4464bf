//! Contact nodes.
use crate::derivative::{spatial_zero, SpatialDerivative};
use crate::error::IntegrationError;
use crate::Real;
use nalgebra::Vector3;

/// A node on the contact surface.
///
/// Positions and normals are always stored with three components. In two dimensions the
/// third component is zero and the node has two DOFs.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactNode<T> {
    id: usize,
    dofs: Vec<usize>,
    position: Vector3<T>,
    normal: Vector3<T>,
    deriv_normal: SpatialDerivative<T>,
    on_boundary: bool,
}

impl<T: Real> ContactNode<T> {
    /// Creates a node with zero normal that is not on the boundary.
    ///
    /// Fails unless the node has 2 or 3 DOFs.
    pub fn new(id: usize, dofs: Vec<usize>, position: Vector3<T>) -> Result<Self, IntegrationError> {
        if !(2..=3).contains(&dofs.len()) {
            return Err(IntegrationError::configuration(format!(
                "contact node {id} has {} DOFs, expected 2 or 3",
                dofs.len()
            )));
        }
        Ok(Self {
            id,
            dofs,
            position,
            normal: Vector3::zeros(),
            deriv_normal: spatial_zero(),
            on_boundary: false,
        })
    }

    /// Creates a node whose DOFs are numbered consecutively from `dim * id`.
    pub fn with_consecutive_dofs(id: usize, dim: usize, position: Vector3<T>) -> Result<Self, IntegrationError> {
        Self::new(id, (dim * id..dim * (id + 1)).collect(), position)
    }

    pub fn with_boundary(mut self, on_boundary: bool) -> Self {
        self.on_boundary = on_boundary;
        self
    }

    pub fn with_normal(mut self, normal: Vector3<T>, deriv_normal: SpatialDerivative<T>) -> Self {
        self.set_normal(normal, deriv_normal);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn dofs(&self) -> &[usize] {
        &self.dofs
    }

    /// The spatial dimension of the node, i.e. its number of DOFs.
    pub fn dim(&self) -> usize {
        self.dofs.len()
    }

    pub fn position(&self) -> &Vector3<T> {
        &self.position
    }

    pub fn set_position(&mut self, position: Vector3<T>) {
        self.position = position;
    }

    /// The unit normal of the node.
    pub fn normal(&self) -> &Vector3<T> {
        &self.normal
    }

    /// Derivatives of the components of the unit normal.
    pub fn deriv_normal(&self) -> &SpatialDerivative<T> {
        &self.deriv_normal
    }

    pub fn set_normal(&mut self, normal: Vector3<T>, deriv_normal: SpatialDerivative<T>) {
        self.normal = normal;
        self.deriv_normal = deriv_normal;
    }

    pub fn is_on_boundary(&self) -> bool {
        self.on_boundary
    }
}
