//! Projections between mortar elements.
//!
//! All projections are posed as small nonlinear systems and solved with Newton's method.
//! In 2D a point is projected along a normal by requiring the connecting vector to be
//! parallel to the normal, `(x(xi) - p) x n = 0`. In 3D the projection parameter `alpha`
//! is an additional unknown, `x(xi) - p - alpha n = 0`.
use crate::element::MortarElement;
use crate::error::IntegrationError;
use crate::Real;
use fenris_optimize::newton::{newton, NewtonError, NewtonSettings, NonlinearSystem};
use log::trace;
use nalgebra::{Matrix1, Matrix3, Vector1, Vector2, Vector3, U1, U3};

/// The scalar 2D cross product `a_x b_y - a_y b_x`.
pub(crate) fn cross_2d<T: Real>(a: &Vector3<T>, b: &Vector3<T>) -> T {
    a[0] * b[1] - a[1] * b[0]
}

/// Projection of a fixed point along a fixed normal onto a line element.
struct AlongNormal2d<'a, T> {
    target: &'a MortarElement<T>,
    point: Vector3<T>,
    normal: Vector3<T>,
}

impl<'a, T: Real> NonlinearSystem<T, U1> for AlongNormal2d<'a, T> {
    fn evaluate(&self, xi: &Vector1<T>) -> (Vector1<T>, Matrix1<T>) {
        let shapes = self.target.evaluate_shape(&Vector2::new(xi[0], T::zero()));
        let x = self.target.interpolate_position(&shapes.values);
        let tangent = self.target.position_gradient(&shapes, 0);
        let f = cross_2d(&(x - self.point), &self.normal);
        let df = cross_2d(&tangent, &self.normal);
        (Vector1::new(f), Matrix1::new(df))
    }
}

/// Projection of a fixed point onto a slave line element along the interpolated slave normal.
struct OntoSlave2d<'a, T> {
    slave: &'a MortarElement<T>,
    point: Vector3<T>,
}

impl<'a, T: Real> NonlinearSystem<T, U1> for OntoSlave2d<'a, T> {
    fn evaluate(&self, xi: &Vector1<T>) -> (Vector1<T>, Matrix1<T>) {
        let shapes = self.slave.evaluate_shape(&Vector2::new(xi[0], T::zero()));
        let x = self.slave.interpolate_position(&shapes.values);
        let n = self.slave.interpolate_normal(&shapes.values);
        let tangent = self.slave.position_gradient(&shapes, 0);
        let dn = self.slave.normal_gradient(&shapes, 0);
        let diff = x - self.point;
        let f = cross_2d(&diff, &n);
        let df = cross_2d(&tangent, &n) + cross_2d(&diff, &dn);
        (Vector1::new(f), Matrix1::new(df))
    }
}

/// Projection of a fixed point along a fixed direction onto a surface element.
struct AlongDirection3d<'a, T> {
    target: &'a MortarElement<T>,
    point: Vector3<T>,
    direction: Vector3<T>,
}

impl<'a, T: Real> NonlinearSystem<T, U3> for AlongDirection3d<'a, T> {
    fn evaluate(&self, u: &Vector3<T>) -> (Vector3<T>, Matrix3<T>) {
        let shapes = self.target.evaluate_shape(&Vector2::new(u[0], u[1]));
        let x = self.target.interpolate_position(&shapes.values);
        let f = x - self.point - self.direction * u[2];
        let jacobian = Matrix3::from_columns(&[
            self.target.position_gradient(&shapes, 0),
            self.target.position_gradient(&shapes, 1),
            -self.direction,
        ]);
        (f, jacobian)
    }
}

fn projection_failed<T: Real>(target: &MortarElement<T>, error: NewtonError) -> IntegrationError {
    IntegrationError::ProjectionFailed {
        element_id: target.id(),
        error,
    }
}

/// Projects `point` along `normal` onto the line element `target`.
pub fn project_along_normal_2d<T: Real>(
    point: &Vector3<T>,
    normal: &Vector3<T>,
    target: &MortarElement<T>,
    settings: &NewtonSettings<T>,
) -> Result<T, IntegrationError> {
    let system = AlongNormal2d {
        target,
        point: *point,
        normal: *normal,
    };
    let result = newton(&system, Vector1::zeros(), settings).map_err(|e| projection_failed(target, e))?;
    Ok(result.solution[0])
}

/// Projects the node at `point` onto the slave line element along the interpolated slave normal.
pub fn project_onto_slave_2d<T: Real>(
    point: &Vector3<T>,
    slave: &MortarElement<T>,
    settings: &NewtonSettings<T>,
) -> Result<T, IntegrationError> {
    let system = OntoSlave2d { slave, point: *point };
    let result = newton(&system, Vector1::zeros(), settings).map_err(|e| projection_failed(slave, e))?;
    Ok(result.solution[0])
}

/// Projects the slave point at `sxi` along the interpolated slave normal onto the master line.
pub fn project_gauss_point_2d<T: Real>(
    slave: &MortarElement<T>,
    sxi: T,
    master: &MortarElement<T>,
    settings: &NewtonSettings<T>,
) -> Result<T, IntegrationError> {
    let shapes = slave.evaluate_shape(&Vector2::new(sxi, T::zero()));
    let point = slave.interpolate_position(&shapes.values);
    let normal = slave.interpolate_normal(&shapes.values);
    let mxi = project_along_normal_2d(&point, &normal, master, settings)?;
    trace!("Projected slave point {sxi} of element {} to {mxi} on element {}", slave.id(), master.id());
    Ok(mxi)
}

/// Projects `point` along `direction` onto the surface element `target`.
///
/// Returns the parametric coordinates of the projection and the projection parameter
/// `alpha`, such that `x(xi) = point + alpha * direction`.
pub fn project_along_direction_3d<T: Real>(
    point: &Vector3<T>,
    direction: &Vector3<T>,
    target: &MortarElement<T>,
    settings: &NewtonSettings<T>,
) -> Result<(Vector2<T>, T), IntegrationError> {
    let system = AlongDirection3d {
        target,
        point: *point,
        direction: *direction,
    };
    let center = target.shape().center();
    let x0 = Vector3::new(center[0], center[1], T::zero());
    let result = newton(&system, x0, settings).map_err(|e| projection_failed(target, e))?;
    let u = result.solution;
    Ok((Vector2::new(u[0], u[1]), u[2]))
}

/// Projects the slave point at `sxi` along the interpolated (non-unit) slave normal onto the
/// master surface.
pub fn project_gauss_point_3d<T: Real>(
    slave: &MortarElement<T>,
    sxi: &Vector2<T>,
    master: &MortarElement<T>,
    settings: &NewtonSettings<T>,
) -> Result<(Vector2<T>, T), IntegrationError> {
    let shapes = slave.evaluate_shape(sxi);
    let point = slave.interpolate_position(&shapes.values);
    let normal = slave.interpolate_normal(&shapes.values);
    project_along_direction_3d(&point, &normal, master, settings)
}

/// Fails with [`IntegrationError::ProjectionOutOfRange`] if `xi` is outside the parametric
/// domain of the element enlarged by `tol`.
pub fn check_in_domain<T: Real>(element: &MortarElement<T>, xi: &Vector2<T>, tol: T) -> Result<(), IntegrationError> {
    if element.shape().is_in_domain(xi, tol) {
        Ok(())
    } else {
        Err(element.out_of_range(xi))
    }
}
