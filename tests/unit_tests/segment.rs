use super::{assert_linearization_matches_fd, dof_vector, element_2d, one_loop_settings, with_positions, Layout};
use fenris_contact::accumulator::LinearizationAccumulator;
use fenris_contact::element::{ElementShape, MortarElement};
use fenris_contact::integrator::{ContactIntegrator, MortarMatrices};
use fenris_contact::normal::average_nodal_normals;
use fenris_contact::overlap::SegmentOverlap;
use fenris_contact::settings::{IntegratorSettings, ShapeFamily};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DMatrix, DVector};
use paste::paste;
use std::slice;

/// Slave and master unit segments on the x-axis, the master lifted by `gap`. The slave runs
/// from (1, 0) to (0, 0) and thus has the normal (0, 1).
fn unit_segments(gap: f64) -> (MortarElement<f64>, MortarElement<f64>) {
    let slave = element_2d(0, ElementShape::Line2, &[(0, [1.0, 0.0]), (1, [0.0, 0.0])], true);
    let master = element_2d(1, ElementShape::Line2, &[(2, [0.0, gap]), (3, [1.0, gap])], false);
    (slave, master)
}

fn integrate(
    settings: IntegratorSettings<f64>,
    slave: &MortarElement<f64>,
    master: &MortarElement<f64>,
    acc: &mut LinearizationAccumulator<f64>,
) -> MortarMatrices<f64> {
    let mut slave = slave.clone();
    average_nodal_normals(slice::from_mut(&mut slave), 1e-12).unwrap();
    let integrator = ContactIntegrator::new(settings).unwrap();
    let bounds = SegmentOverlap::compute(&slave, master, &settings.newton)
        .unwrap()
        .expect("segments must overlap");
    let mut out = MortarMatrices::for_pair(&slave, master);
    integrator
        .integrate_deriv_segment_2d(&slave, master, &bounds, &mut out, acc)
        .unwrap();
    out
}

/// Block matrix with the 2x2 node matrix `nodal` repeated on the diagonal of each block.
fn expand_blocks(nodal: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(2 * nodal.nrows(), 2 * nodal.ncols(), |r, c| {
        if r % 2 == c % 2 {
            nodal[(r / 2, c / 2)]
        } else {
            0.0
        }
    })
}

#[test]
fn coincident_unit_segments_with_dual_shapes() {
    let (slave, master) = unit_segments(0.0);
    let settings = one_loop_settings(ShapeFamily::Dual).with_gauss_points_line(2);
    let out = integrate(settings, &slave, &master, &mut LinearizationAccumulator::new());

    // Slave node 0 coincides with master node 3 and vice versa
    let m = DMatrix::from_row_slice(2, 2, &[0.0, 0.5, 0.5, 0.0]);
    let d = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, 0.5]);
    assert_matrix_eq!(out.m.unwrap(), expand_blocks(&m), comp = abs, tol = 1e-12);
    assert_matrix_eq!(out.d.unwrap(), expand_blocks(&d), comp = abs, tol = 1e-12);
    assert_matrix_eq!(out.gap.unwrap(), DVector::<f64>::zeros(2), comp = abs, tol = 1e-12);
}

#[test]
fn separated_unit_segments_with_dual_shapes() {
    let g = 0.3;
    let (slave, master) = unit_segments(g);
    let settings = one_loop_settings(ShapeFamily::Dual).with_gauss_points_line(2);
    let out = integrate(settings, &slave, &master, &mut LinearizationAccumulator::new());

    let m = DMatrix::from_row_slice(2, 2, &[0.0, 0.5, 0.5, 0.0]);
    let d = DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, 0.5]);
    assert_matrix_eq!(out.m.unwrap(), expand_blocks(&m), comp = abs, tol = 1e-12);
    assert_matrix_eq!(out.d.unwrap(), expand_blocks(&d), comp = abs, tol = 1e-12);
    let expected_gap = DVector::from_element(2, 0.5 * g);
    assert_matrix_eq!(out.gap.unwrap(), expected_gap, comp = abs, tol = 1e-12);
}

#[test]
fn coincident_unit_segments_with_standard_shapes() {
    let (slave, master) = unit_segments(0.0);
    let settings = one_loop_settings(ShapeFamily::Standard);
    let out = integrate(settings, &slave, &master, &mut LinearizationAccumulator::new());

    let d = DMatrix::from_row_slice(2, 2, &[1.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0, 1.0 / 3.0]);
    let m = DMatrix::from_row_slice(2, 2, &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0]);
    assert_matrix_eq!(out.d.unwrap(), expand_blocks(&d), comp = abs, tol = 1e-12);
    assert_matrix_eq!(out.m.unwrap(), expand_blocks(&m), comp = abs, tol = 1e-12);
    assert_matrix_eq!(out.gap.unwrap(), DVector::<f64>::zeros(2), comp = abs, tol = 1e-12);
}

#[test]
fn boundary_modification_moves_boundary_coupling() {
    let (mut slave, master) = unit_segments(0.0);
    let boundary = slave.nodes()[1].clone().with_boundary(true);
    slave.nodes_mut()[1] = boundary;
    let settings = one_loop_settings(ShapeFamily::Dual).with_boundary_modification(true);
    let mut acc = LinearizationAccumulator::new();
    let out = integrate(settings, &slave, &master, &mut acc);

    // The multiplier of the interior node is constant, that of the boundary node vanishes
    let d = DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 0.0, 0.0]);
    let m = DMatrix::from_row_slice(2, 2, &[0.5, 0.5, 0.0, 0.0]);
    assert_matrix_eq!(out.d.unwrap(), expand_blocks(&d), comp = abs, tol = 1e-12);
    assert_matrix_eq!(out.m.unwrap(), expand_blocks(&m), comp = abs, tol = 1e-12);
    assert_scalar_eq!(out.gap.unwrap()[1], 0.0, comp = abs, tol = 1e-12);

    assert!(acc.deriv_d(0, 1).is_none());
    assert!(acc.deriv_m(0, 1).is_some());
}

/// A tilted slave with a master crossing it, such that both ends of the overlap are slave
/// nodes.
fn crossing_pair(slave_shape: ElementShape, master_shape: ElementShape) -> (MortarElement<f64>, MortarElement<f64>) {
    let slave_nodes: &[(usize, [f64; 2])] = match slave_shape {
        ElementShape::Line2 => &[(0, [1.0, 0.05]), (1, [0.0, -0.02])],
        _ => &[(0, [1.0, 0.05]), (1, [0.0, -0.02]), (2, [0.48, 0.06])],
    };
    let first_master = slave_nodes.len();
    let master_nodes: Vec<(usize, [f64; 2])> = match master_shape {
        ElementShape::Line2 => vec![(first_master, [-0.2, 0.3]), (first_master + 1, [1.3, 0.22])],
        _ => vec![
            (first_master, [-0.2, 0.3]),
            (first_master + 1, [1.3, 0.22]),
            (first_master + 2, [0.55, 0.3]),
        ],
    };
    (
        element_2d(0, slave_shape, slave_nodes, true),
        element_2d(1, master_shape, &master_nodes, false),
    )
}

/// A master shorter than the slave, such that both ends of the overlap are master nodes.
fn contained_pair() -> (MortarElement<f64>, MortarElement<f64>) {
    let slave = element_2d(0, ElementShape::Line2, &[(0, [1.0, 0.05]), (1, [0.0, -0.02])], true);
    let master = element_2d(1, ElementShape::Line2, &[(2, [0.25, 0.3]), (3, [0.8, 0.22])], false);
    (slave, master)
}

fn check_fd(settings: IntegratorSettings<f64>, slave: &MortarElement<f64>, master: &MortarElement<f64>) {
    let x0 = dof_vector(&[slave, master]);
    let layout = Layout::new(slave, master);
    assert_linearization_matches_fd(&x0, &layout, |x, acc| {
        integrate(settings, &with_positions(slave, x), &with_positions(master, x), acc)
    });
}

macro_rules! segment_fd_test {
    ($name:ident, $family:ident, $slave:ident, $master:ident) => {
        paste! {
            #[test]
            fn [<segment_linearization_ $name _matches_fd>]() {
                let (slave, master) = crossing_pair(ElementShape::$slave, ElementShape::$master);
                check_fd(one_loop_settings(ShapeFamily::$family), &slave, &master);
            }
        }
    };
}

segment_fd_test!(dual_line2, Dual, Line2, Line2);
segment_fd_test!(standard_line2, Standard, Line2, Line2);
segment_fd_test!(dual_line3, Dual, Line3, Line2);
segment_fd_test!(standard_line3, Standard, Line3, Line3);

#[test]
fn segment_linearization_with_master_bounds_matches_fd() {
    let (slave, master) = contained_pair();
    check_fd(one_loop_settings(ShapeFamily::Dual), &slave, &master);
    check_fd(one_loop_settings(ShapeFamily::Standard), &slave, &master);
}

#[test]
fn segment_linearization_with_petrov_galerkin_gap_matches_fd() {
    let (slave, master) = crossing_pair(ElementShape::Line3, ElementShape::Line2);
    check_fd(one_loop_settings(ShapeFamily::Dual).with_petrov_galerkin(true), &slave, &master);
}

#[test]
fn segment_linearization_with_boundary_modification_matches_fd() {
    for boundary_node in [0, 1] {
        let (mut slave, master) = crossing_pair(ElementShape::Line3, ElementShape::Line2);
        let node = slave.nodes()[boundary_node].clone().with_boundary(true);
        slave.nodes_mut()[boundary_node] = node;
        let settings = one_loop_settings(ShapeFamily::Dual).with_boundary_modification(true);
        check_fd(settings, &slave, &master);
    }
}

#[test]
fn dual_row_sum_holds_for_values_and_derivatives() {
    let (slave, master) = crossing_pair(ElementShape::Line3, ElementShape::Line3);
    let mut acc = LinearizationAccumulator::new();
    let out = integrate(one_loop_settings(ShapeFamily::Dual), &slave, &master, &mut acc);
    let (d, m) = (out.d.unwrap(), out.m.unwrap());
    let num_dofs = dof_vector(&[&slave, &master]).len();

    for (j, slave_node) in slave.nodes().iter().enumerate() {
        let row_sum: f64 = (0..master.num_nodes()).map(|k| m[(2 * j, 2 * k)]).sum();
        assert_scalar_eq!(d[(2 * j, 2 * j)], row_sum, comp = abs, tol = 1e-14);

        let deriv_d = acc.deriv_d(slave_node.id(), slave_node.id()).unwrap().to_dense(num_dofs);
        let deriv_row_sum = master
            .nodes()
            .iter()
            .map(|master_node| acc.deriv_m(slave_node.id(), master_node.id()).unwrap().to_dense(num_dofs))
            .fold(DVector::zeros(num_dofs), |sum, row| sum + row);
        assert_matrix_eq!(deriv_d, deriv_row_sum, comp = abs, tol = 1e-12);
    }
}

#[test]
fn gap_of_curved_coincident_segments_vanishes() {
    for family in [ShapeFamily::Dual, ShapeFamily::Standard] {
        let slave = element_2d(
            0,
            ElementShape::Line3,
            &[(0, [1.0, 0.0]), (1, [0.0, 0.0]), (2, [0.5, 0.1])],
            true,
        );
        let master = element_2d(
            1,
            ElementShape::Line3,
            &[(3, [0.0, 0.0]), (4, [1.0, 0.0]), (5, [0.5, 0.1])],
            false,
        );
        let out = integrate(one_loop_settings(family), &slave, &master, &mut LinearizationAccumulator::new());
        assert_matrix_eq!(out.gap.unwrap(), DVector::<f64>::zeros(3), comp = abs, tol = 1e-10);
    }
}
