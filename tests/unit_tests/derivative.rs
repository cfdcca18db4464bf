use fenris_contact::accumulator::LinearizationAccumulator;
use fenris_contact::derivative::{linearize_unit_vector, spatial_zero, unit_vector_cross_terms, DerivativeMap};
use fenris_contact::optimize::calculus::approximate_jacobian_fd;
use fenris_contact::proptest::{derivative_map, unit_vector3};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{DVector, Vector3};
use proptest::prelude::*;

const NUM_DOFS: usize = 12;

proptest! {
    #[test]
    fn add_scaled_is_linear_in_dense_form(
        a in derivative_map(NUM_DOFS),
        b in derivative_map(NUM_DOFS),
        factor in -5.0..5.0,
    ) {
        let mut sum = a.clone();
        sum.add_scaled(&b, factor);
        let expected = a.to_dense(NUM_DOFS) + b.to_dense(NUM_DOFS) * factor;
        prop_assert!((sum.to_dense(NUM_DOFS) - expected).amax() < 1e-12);
    }

    #[test]
    fn merge_is_commutative(a in derivative_map(NUM_DOFS), b in derivative_map(NUM_DOFS)) {
        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        prop_assert!((ab.to_dense(NUM_DOFS) - ba.to_dense(NUM_DOFS)).amax() < 1e-12);
    }

    #[test]
    fn cross_terms_project_onto_normal(n in unit_vector3()) {
        let p = unit_vector_cross_terms(&n);
        prop_assert!((p - p.transpose()).amax() < 1e-14);
        prop_assert!((p * p - p).amax() < 1e-12);
        prop_assert!((p * n - n).amax() < 1e-12);
    }

    #[test]
    fn unit_vector_linearization_is_tangential(n in unit_vector3(), length in 0.5..2.0) {
        // Arbitrary derivatives of the non-unit vector with respect to three DOFs
        let mut deriv = spatial_zero();
        for (c, deriv_c) in deriv.iter_mut().enumerate() {
            deriv_c.accumulate(c, 1.0);
            deriv_c.accumulate((c + 1) % 3, 0.5);
        }
        let deriv_unit = linearize_unit_vector(&n, length, &deriv);
        for dof in 0..3 {
            let d = Vector3::new(deriv_unit[0].get(dof), deriv_unit[1].get(dof), deriv_unit[2].get(dof));
            prop_assert!(d.dot(&n).abs() < 1e-12);
        }
    }
}

#[test]
fn collecting_accumulates_duplicates() {
    let map: DerivativeMap<f64> = [(2, 1.0), (5, -1.0), (2, 0.5)].into_iter().collect();
    assert_scalar_eq!(map.get(2), 1.5);
    assert_scalar_eq!(map.get(5), -1.0);
    assert_eq!(map.len(), 2);
    assert_eq!(map.sorted_dofs(), vec![2, 5]);
}

#[test]
fn unit_vector_linearization_matches_fd() {
    // The vector (x0 + x1, x1 * x2, 1 - x0) of three DOFs
    let vector = |x: &DVector<f64>| Vector3::new(x[0] + x[1], x[1] * x[2], 1.0 - x[0]);
    let x0 = DVector::from_vec(vec![0.3, -0.7, 1.2]);
    let v = vector(&x0);

    let mut deriv = spatial_zero();
    deriv[0].accumulate(0, 1.0);
    deriv[0].accumulate(1, 1.0);
    deriv[1].accumulate(1, x0[2]);
    deriv[1].accumulate(2, x0[1]);
    deriv[2].accumulate(0, -1.0);
    let deriv_unit = linearize_unit_vector(&v.normalize(), v.norm(), &deriv);

    let fd = approximate_jacobian_fd(|x| DVector::from_column_slice(vector(x).normalize().as_slice()), &x0, 1e-6);
    for c in 0..3 {
        assert_matrix_eq!(
            deriv_unit[c].to_dense(3).transpose(),
            fd.row(c).into_owned(),
            comp = abs,
            tol = 1e-8
        );
    }
}

#[test]
fn merged_accumulators_equal_sequential_accumulation() {
    let entries = [(0, 1, 3, 0.5), (0, 2, 4, -1.0), (1, 1, 3, 2.0), (0, 1, 5, 0.25)];

    let mut sequential = LinearizationAccumulator::new();
    for &(node, neighbor, dof, value) in &entries {
        sequential.deriv_m_mut(node, neighbor).accumulate(dof, value);
        sequential.deriv_g_mut(node).accumulate(dof, value);
    }

    let (first, second) = entries.split_at(2);
    let mut merged = LinearizationAccumulator::new();
    for part in [first, second] {
        let mut partial = LinearizationAccumulator::new();
        for &(node, neighbor, dof, value) in part {
            partial.deriv_m_mut(node, neighbor).accumulate(dof, value);
            partial.deriv_g_mut(node).accumulate(dof, value);
        }
        merged.merge(&partial);
    }

    assert_eq!(merged, sequential);
    assert_eq!(merged.node_ids(), vec![0, 1]);
    assert_scalar_eq!(merged.deriv_g(0).unwrap().get(3), 0.5);

    merged.reset();
    assert!(merged.is_empty());
    assert!(merged.deriv_g(0).is_none());
}
