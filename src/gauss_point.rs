//! Physical quantities at a Gauss point and their derivatives.
use crate::derivative::{linearize_unit_vector, DerivativeMap, ParametricDerivative, SpatialDerivative};
use crate::element::{MortarElement, ShapeValues};
use crate::error::IntegrationError;
use crate::Real;
use nalgebra::{Vector2, Vector3};

/// The slave side of a Gauss point.
///
/// Holds the slave position and the interpolated normal at the slave coordinate `xi`,
/// together with their derivatives. The derivatives include the dependence of `xi` itself
/// on the nodal coordinates, given by `dxi` at construction.
#[derive(Debug, Clone)]
pub struct SlavePoint<T> {
    pub xi: Vector2<T>,
    pub shapes: ShapeValues<T>,
    pub position: Vector3<T>,
    pub deriv_position: SpatialDerivative<T>,
    /// The interpolated nodal normal before normalization.
    pub raw_normal: Vector3<T>,
    pub deriv_raw_normal: SpatialDerivative<T>,
    pub normal: Vector3<T>,
    pub deriv_normal: SpatialDerivative<T>,
}

impl<T: Real> SlavePoint<T> {
    pub fn evaluate(
        slave: &MortarElement<T>,
        xi: &Vector2<T>,
        dxi: &ParametricDerivative<T>,
        normal_length_floor: T,
    ) -> Result<Self, IntegrationError> {
        let shapes = slave.evaluate_shape(xi);
        let position = slave.interpolate_position(&shapes.values);
        let raw_normal = slave.interpolate_normal(&shapes.values);
        let length = raw_normal.norm();
        if length < normal_length_floor {
            return Err(IntegrationError::degenerate(format!(
                "interpolated normal of slave element {} has length {length}",
                slave.id()
            )));
        }
        let normal = raw_normal / length;

        let deriv_position = slave.deriv_interpolated_position(&shapes, dxi);
        let deriv_raw_normal = slave.deriv_interpolated_normal(&shapes, dxi);
        let deriv_normal = linearize_unit_vector(&normal, length, &deriv_raw_normal);

        Ok(Self {
            xi: *xi,
            shapes,
            position,
            deriv_position,
            raw_normal,
            deriv_raw_normal,
            normal,
            deriv_normal,
        })
    }
}

/// The scalar gap `g = (x_m - x_s) . n` at a Gauss point and its derivative.
#[derive(Debug, Clone)]
pub struct GapPoint<T> {
    pub gap: T,
    pub deriv_gap: DerivativeMap<T>,
}

impl<T: Real> GapPoint<T> {
    /// Evaluates the gap between the slave point and the master point with the given shape
    /// values, whose coordinates have the derivatives `dmxi`.
    pub fn evaluate(
        slave_point: &SlavePoint<T>,
        master: &MortarElement<T>,
        master_shapes: &ShapeValues<T>,
        dmxi: &ParametricDerivative<T>,
    ) -> Self {
        let master_position = master.interpolate_position(&master_shapes.values);
        let deriv_master_position = master.deriv_interpolated_position(master_shapes, dmxi);
        let diff = master_position - slave_point.position;
        let n = &slave_point.normal;

        let mut deriv_gap = DerivativeMap::new();
        for k in 0..master.dim() {
            deriv_gap.add_scaled(&slave_point.deriv_normal[k], diff[k]);
            deriv_gap.add_scaled(&deriv_master_position[k], n[k]);
            deriv_gap.add_scaled(&slave_point.deriv_position[k], -n[k]);
        }

        Self {
            gap: diff.dot(n),
            deriv_gap,
        }
    }
}
