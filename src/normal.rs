//! Nodal normals and auxiliary planes of slave elements.
//!
//! The integrator consumes nodal unit normals together with their derivatives. This module
//! computes them by averaging the unit element normals at each node, and builds the
//! auxiliary plane used by the auxiliary plane coupling in 3D.
use crate::derivative::{linearize_unit_vector, spatial_zero, DerivativeMap, SpatialDerivative};
use crate::element::MortarElement;
use crate::error::IntegrationError;
use crate::Real;
use nalgebra::Vector3;
use rustc_hash::FxHashMap;

/// Sets the normals of all nodes of the given elements to the normalized average of the
/// unit element normals at the node, and their derivatives accordingly.
///
/// Nodes are identified by id, so nodes shared between elements receive identical data.
pub fn average_nodal_normals<T: Real>(
    elements: &mut [MortarElement<T>],
    length_floor: T,
) -> Result<(), IntegrationError> {
    let mut sums: FxHashMap<usize, (Vector3<T>, SpatialDerivative<T>)> = FxHashMap::default();
    for element in elements.iter() {
        for (i, node) in element.nodes().iter().enumerate() {
            let xi = element.shape().node_coords(i);
            let (unit, deriv_unit) = element.deriv_unit_normal_at(&xi)?;
            let (sum, deriv_sum) = sums
                .entry(node.id())
                .or_insert_with(|| (Vector3::zeros(), spatial_zero()));
            *sum += unit;
            for (deriv_sum_c, deriv_unit_c) in deriv_sum.iter_mut().zip(&deriv_unit) {
                deriv_sum_c.merge(deriv_unit_c);
            }
        }
    }

    let mut normals = FxHashMap::default();
    for (id, (sum, deriv_sum)) in sums {
        let length = sum.norm();
        if length < length_floor {
            return Err(IntegrationError::degenerate(format!(
                "averaged normal of node {id} vanishes"
            )));
        }
        let unit = sum / length;
        let deriv_unit = linearize_unit_vector(&unit, length, &deriv_sum);
        normals.insert(id, (unit, deriv_unit));
    }

    for element in elements.iter_mut() {
        for node in element.nodes_mut() {
            if let Some((unit, deriv_unit)) = normals.get(&node.id()) {
                node.set_normal(*unit, deriv_unit.clone());
            }
        }
    }
    Ok(())
}

/// A plane through the center of a slave element, orthogonal to the element normal there.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryPlane<T> {
    center: Vector3<T>,
    deriv_center: SpatialDerivative<T>,
    normal: Vector3<T>,
    deriv_normal: SpatialDerivative<T>,
}

impl<T: Real> AuxiliaryPlane<T> {
    pub fn of_slave_element(element: &MortarElement<T>) -> Result<Self, IntegrationError> {
        if element.shape().is_line() {
            return Err(IntegrationError::configuration(
                "auxiliary planes are only defined for surface elements",
            ));
        }
        let xi = element.shape().center();
        let shapes = element.evaluate_shape(&xi);
        let center = element.interpolate_position(&shapes.values);
        let mut deriv_center = spatial_zero();
        for (i, node) in element.nodes().iter().enumerate() {
            for (k, &dof) in node.dofs().iter().enumerate() {
                deriv_center[k].accumulate(dof, shapes.values[i]);
            }
        }
        let (normal, deriv_normal) = element.deriv_unit_normal_at(&xi)?;
        Ok(Self {
            center,
            deriv_center,
            normal,
            deriv_normal,
        })
    }

    pub fn center(&self) -> &Vector3<T> {
        &self.center
    }

    pub fn normal(&self) -> &Vector3<T> {
        &self.normal
    }

    pub fn deriv_normal(&self) -> &SpatialDerivative<T> {
        &self.deriv_normal
    }

    /// Projects the point `x` with derivatives `deriv_x` onto the plane along its normal.
    pub fn project(&self, x: &Vector3<T>, deriv_x: &SpatialDerivative<T>) -> (Vector3<T>, SpatialDerivative<T>) {
        let n = &self.normal;
        let offset = x - self.center;
        let distance = offset.dot(n);
        let projected = x - n * distance;

        // d(distance) = (dx - dc) . n + (x - c) . dn
        let mut deriv_distance = DerivativeMap::new();
        for c in 0..3 {
            deriv_distance.add_scaled(&deriv_x[c], n[c]);
            deriv_distance.add_scaled(&self.deriv_center[c], -n[c]);
            deriv_distance.add_scaled(&self.deriv_normal[c], offset[c]);
        }

        let mut deriv = deriv_x.clone();
        for (c, deriv_c) in deriv.iter_mut().enumerate() {
            deriv_c.add_scaled(&deriv_distance, -n[c]);
            deriv_c.add_scaled(&self.deriv_normal[c], -distance);
        }
        (projected, deriv)
    }
}
