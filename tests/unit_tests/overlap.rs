use super::{dof_vector, element_2d, element_3d, one_loop_settings, with_positions};
use fenris_contact::accumulator::LinearizationAccumulator;
use fenris_contact::element::{ElementShape, MortarElement};
use fenris_contact::error::IntegrationError;
use fenris_contact::integrator::{ContactIntegrator, MortarMatrices};
use fenris_contact::linearize::deriv_xi_ab_2d;
use fenris_contact::normal::average_nodal_normals;
use fenris_contact::optimize::calculus::approximate_jacobian_fd;
use fenris_contact::optimize::newton::NewtonSettings;
use fenris_contact::overlap::{SegmentBounds, SegmentOverlap};
use fenris_contact::settings::ShapeFamily;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, DVector};
use std::slice;
use util::assert_derivative_eq;

fn newton() -> NewtonSettings<f64> {
    NewtonSettings {
        tolerance: 1e-13,
        ..NewtonSettings::default()
    }
}

fn with_normals(slave: &MortarElement<f64>) -> MortarElement<f64> {
    let mut slave = slave.clone();
    average_nodal_normals(slice::from_mut(&mut slave), 1e-12).unwrap();
    slave
}

fn slave() -> MortarElement<f64> {
    element_2d(0, ElementShape::Line2, &[(0, [1.0, 0.05]), (1, [0.0, -0.02])], true)
}

fn master(start: [f64; 2], end: [f64; 2]) -> MortarElement<f64> {
    element_2d(1, ElementShape::Line2, &[(2, start), (3, end)], false)
}

/// Slave coordinate of the orthogonal projection of `point` onto the line through the nodes
/// of [`slave`].
fn orthogonal_slave_xi([x, y]: [f64; 2]) -> f64 {
    let (start, end) = ([1.0, 0.05], [0.0, -0.02]);
    let direction = [end[0] - start[0], end[1] - start[1]];
    let length_squared = direction[0] * direction[0] + direction[1] * direction[1];
    let t = ((x - start[0]) * direction[0] + (y - start[1]) * direction[1]) / length_squared;
    2.0 * t - 1.0
}

fn bounds_of(slave: &MortarElement<f64>, master: &MortarElement<f64>) -> Option<SegmentBounds<f64>> {
    SegmentOverlap::compute(&with_normals(slave), master, &newton()).unwrap()
}

#[test]
fn coincident_segments_overlap_completely() {
    let slave = element_2d(0, ElementShape::Line2, &[(0, [1.0, 0.0]), (1, [0.0, 0.0])], true);
    let master = master([0.0, 0.5], [1.0, 0.5]);
    let bounds = bounds_of(&slave, &master).unwrap();
    let full = SegmentBounds::<f64>::full();
    assert_scalar_eq!(bounds.sxia, full.sxia);
    assert_scalar_eq!(bounds.sxib, full.sxib);
    assert_scalar_eq!(bounds.mxia, full.mxia, comp = abs, tol = 1e-12);
    assert_scalar_eq!(bounds.mxib, full.mxib, comp = abs, tol = 1e-12);
}

#[test]
fn longer_master_is_bounded_by_slave_nodes() {
    let bounds = bounds_of(&slave(), &master([-0.2, 0.3], [1.3, 0.22])).unwrap();
    assert_eq!(bounds.endpoint_sides().unwrap(), (true, true));
    assert_eq!((bounds.sxia, bounds.sxib), (-1.0, 1.0));
    assert!(bounds.mxia > -1.0 && bounds.mxia < bounds.mxib && bounds.mxib < 1.0);
}

#[test]
fn shorter_master_is_bounded_by_master_nodes() {
    let bounds = bounds_of(&slave(), &master([0.25, 0.3], [0.8, 0.22])).unwrap();
    assert_eq!(bounds.endpoint_sides().unwrap(), (false, false));
    assert_eq!((bounds.mxia, bounds.mxib), (-1.0, 1.0));
    // The normal of a straight slave is constant, so master nodes are projected orthogonally
    assert_scalar_eq!(bounds.sxia, orthogonal_slave_xi([0.8, 0.22]), comp = abs, tol = 1e-10);
    assert_scalar_eq!(bounds.sxib, orthogonal_slave_xi([0.25, 0.3]), comp = abs, tol = 1e-10);
}

#[test]
fn shifted_master_is_bounded_by_one_node_of_each() {
    let bounds = bounds_of(&slave(), &master([0.5, 0.3], [1.5, 0.22])).unwrap();
    assert_eq!(bounds.endpoint_sides().unwrap(), (true, false));
    assert_eq!((bounds.sxia, bounds.mxia), (-1.0, -1.0));
    assert_scalar_eq!(bounds.sxib, orthogonal_slave_xi([0.5, 0.3]), comp = abs, tol = 1e-10);
}

#[test]
fn separated_segments_do_not_overlap() {
    assert!(bounds_of(&slave(), &master([2.0, 0.1], [3.0, 0.1])).is_none());
}

#[test]
fn laterally_offset_curved_segments_do_not_overlap() {
    let curved = element_2d(0, ElementShape::Line3, &[(0, [1.0, 0.0]), (1, [0.0, 0.0]), (2, [0.5, 0.05])], true);
    let result = SegmentOverlap::compute(&with_normals(&curved), &master([3.0, 0.1], [4.0, 0.1]), &newton());
    assert!(matches!(result, Ok(None)));
    let result = SegmentOverlap::compute(&with_normals(&curved), &master([-4.0, 0.1], [-3.0, 0.1]), &newton());
    assert!(matches!(result, Ok(None)));
}

#[test]
fn overlap_requires_line_elements() {
    let slave = element_3d(
        0,
        ElementShape::Tri3,
        &[(0, [0.0, 0.0, 0.0]), (1, [1.0, 0.0, 0.0]), (2, [0.0, 1.0, 0.0])],
        true,
    );
    let master = master([0.0, 0.0], [1.0, 0.0]);
    let result = SegmentOverlap::compute(&slave, &master, &newton());
    assert!(matches!(result, Err(IntegrationError::Configuration(_))));
}

#[test]
fn bounds_check_rejects_infeasible_bounds() {
    assert!(SegmentBounds::<f64>::full().check().is_ok());
    let outside = SegmentBounds::new(-1.2, 1.0, -1.0, 1.0);
    assert!(matches!(outside.check(), Err(IntegrationError::InfeasibleInput(_))));
    let empty = SegmentBounds::new(0.5, 0.5, -1.0, 1.0);
    assert!(matches!(empty.check(), Err(IntegrationError::InfeasibleInput(_))));
    let floating = SegmentBounds::new(-0.5, 1.0, -1.0, 0.5);
    assert!(matches!(floating.endpoint_sides(), Err(IntegrationError::InfeasibleInput(_))));
}

#[test]
fn segment_integration_rejects_bounds_outside_of_elements() {
    let slave = with_normals(&slave());
    let master = master([-0.2, 0.3], [1.3, 0.22]);
    let integrator = ContactIntegrator::new(one_loop_settings(ShapeFamily::Dual)).unwrap();
    let mut out = MortarMatrices::for_pair(&slave, &master);
    let bounds = SegmentBounds::new(-1.0, 1.0, -1.5, 0.5);
    let result =
        integrator.integrate_deriv_segment_2d(&slave, &master, &bounds, &mut out, &mut LinearizationAccumulator::new());
    assert!(matches!(result, Err(IntegrationError::InfeasibleInput(_))));
}

fn check_bounds_linearization(slave: &MortarElement<f64>, master: &MortarElement<f64>) {
    let x0 = dof_vector(&[slave, master]);
    let bounds_at = |x: &DVector<f64>| {
        let bounds = bounds_of(&with_positions(slave, x), &with_positions(master, x)).unwrap();
        DVector::from_vec(vec![bounds.sxia, bounds.sxib, bounds.mxia, bounds.mxib])
    };
    let fd: DMatrix<f64> = approximate_jacobian_fd(bounds_at, &x0, 1e-6);

    let slave = with_normals(slave);
    let bounds = SegmentOverlap::compute(&slave, master, &newton()).unwrap().unwrap();
    let ximaps = deriv_xi_ab_2d(&slave, master, &bounds).unwrap();
    for (b, map) in ximaps.iter().enumerate() {
        let analytic = map.to_dense(x0.len());
        for dof in 0..x0.len() {
            assert_derivative_eq!(analytic[dof], fd[(b, dof)], tol = 1e-6, "bound {b}, dof {dof}");
        }
    }
}

#[test]
fn bound_linearization_matches_fd() {
    check_bounds_linearization(&slave(), &master([-0.2, 0.3], [1.3, 0.22]));
    check_bounds_linearization(&slave(), &master([0.25, 0.3], [0.8, 0.22]));
    check_bounds_linearization(&slave(), &master([0.5, 0.3], [1.5, 0.22]));

    let curved = element_2d(0, ElementShape::Line3, &[(0, [1.0, 0.05]), (1, [0.0, -0.02]), (2, [0.48, 0.08])], true);
    let master = element_2d(1, ElementShape::Line2, &[(3, [0.25, 0.3]), (4, [0.8, 0.22])], false);
    check_bounds_linearization(&curved, &master);
}

#[test]
fn fixed_bounds_have_empty_linearization() {
    let slave = with_normals(&slave());
    let master = master([-0.2, 0.3], [1.3, 0.22]);
    let bounds = SegmentOverlap::compute(&slave, &master, &newton()).unwrap().unwrap();
    let ximaps = deriv_xi_ab_2d(&slave, &master, &bounds).unwrap();
    assert!(ximaps[0].is_empty() && ximaps[1].is_empty());
    assert!(!ximaps[2].is_empty() && !ximaps[3].is_empty());
    let dense = DVector::from_iterator(4, ximaps.iter().map(|map| map.len() as f64));
    assert_matrix_eq!(dense, DVector::from_vec(vec![0.0, 0.0, 8.0, 8.0]));
}
