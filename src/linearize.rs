//! Derivatives of local coordinates defined implicitly by projections.
//!
//! Every projection is a small equation `F(xi, x) = 0` relating a local coordinate `xi` to
//! the nodal coordinates `x` and normals. Differentiating it gives
//! `dF/dxi dxi = -dF/dx dx`, which is solved in closed form in 2D (the scalar leading
//! constant `c = -1 / (dF/dxi)`) and by inverting the 3x3 matrix `L = [x_,0 | x_,1 | -n]`
//! in 3D.
use crate::derivative::{parametric_zero, DerivativeMap, ParametricDerivative, SpatialDerivative};
use crate::element::{MortarElement, ShapeValues};
use crate::error::IntegrationError;
use crate::gauss_point::SlavePoint;
use crate::node::ContactNode;
use crate::overlap::SegmentBounds;
use crate::projector::cross_2d;
use crate::Real;
use nalgebra::{Matrix3, Vector2, Vector3};

fn leading_constant<T: Real>(coefficient: T, what: &str) -> Result<T, IntegrationError> {
    if coefficient.abs() <= T::default_epsilon() {
        Err(IntegrationError::degenerate(format!(
            "vanishing leading constant in the linearization of {what}"
        )))
    } else {
        Ok(-T::one() / coefficient)
    }
}

fn inverse_l_matrix<T: Real>(
    element: &MortarElement<T>,
    shapes: &ShapeValues<T>,
    direction: &Vector3<T>,
) -> Result<Matrix3<T>, IntegrationError> {
    let l = Matrix3::from_columns(&[
        element.position_gradient(shapes, 0),
        element.position_gradient(shapes, 1),
        -direction,
    ]);
    l.try_inverse().ok_or_else(|| {
        IntegrationError::degenerate(format!(
            "singular projection matrix on element {}",
            element.id()
        ))
    })
}

/// Derivative of the master coordinate `xi` of a node projected along its own normal onto
/// the line element `target`.
///
/// The defining equation is `(x_m(xi) - x_s) x n_s = 0`.
pub fn deriv_node_projection_2d<T: Real>(
    node: &ContactNode<T>,
    target: &MortarElement<T>,
    xi: T,
) -> Result<DerivativeMap<T>, IntegrationError> {
    let shapes = target.evaluate_shape(&Vector2::new(xi, T::zero()));
    let tangent = target.position_gradient(&shapes, 0);
    let n = node.normal();
    let c = leading_constant(cross_2d(&tangent, n), "a slave node projection")?;
    let diff = target.interpolate_position(&shapes.values) - node.position();

    let mut deriv = DerivativeMap::new();
    deriv.accumulate(node.dofs()[0], -n[1]);
    deriv.accumulate(node.dofs()[1], n[0]);
    for (target_node, &phi) in target.nodes().iter().zip(shapes.values.iter()) {
        deriv.accumulate(target_node.dofs()[0], phi * n[1]);
        deriv.accumulate(target_node.dofs()[1], -phi * n[0]);
    }
    deriv.add_scaled(&node.deriv_normal()[1], diff[0]);
    deriv.add_scaled(&node.deriv_normal()[0], -diff[1]);
    deriv.scale(c);
    Ok(deriv)
}

/// Derivative of the slave coordinate `sxi` of a master node projected onto the slave along
/// the interpolated slave normal.
///
/// The defining equation is `(x_s(sxi) - x_m) x n(sxi) = 0` with the non-unit normal
/// `n = sum_i N_i n_i`.
pub fn deriv_projection_onto_slave_2d<T: Real>(
    node: &ContactNode<T>,
    slave: &MortarElement<T>,
    sxi: T,
) -> Result<DerivativeMap<T>, IntegrationError> {
    let shapes = slave.evaluate_shape(&Vector2::new(sxi, T::zero()));
    let n = slave.interpolate_normal(&shapes.values);
    let dn = slave.normal_gradient(&shapes, 0);
    let tangent = slave.position_gradient(&shapes, 0);
    let diff = slave.interpolate_position(&shapes.values) - node.position();
    let c = leading_constant(
        cross_2d(&tangent, &n) + cross_2d(&diff, &dn),
        "a master node projection",
    )?;

    let mut deriv = DerivativeMap::new();
    deriv.accumulate(node.dofs()[0], -n[1]);
    deriv.accumulate(node.dofs()[1], n[0]);
    for (slave_node, &phi) in slave.nodes().iter().zip(shapes.values.iter()) {
        deriv.accumulate(slave_node.dofs()[0], phi * n[1]);
        deriv.accumulate(slave_node.dofs()[1], -phi * n[0]);
        deriv.add_scaled(&slave_node.deriv_normal()[1], phi * diff[0]);
        deriv.add_scaled(&slave_node.deriv_normal()[0], -phi * diff[1]);
    }
    deriv.scale(c);
    Ok(deriv)
}

/// Derivatives of the four segment bounds `[sxia, sxib, mxia, mxib]`.
///
/// Only the two free bounds get non-empty maps: `mxib` if the segment starts at the slave
/// start, otherwise `sxia`, and `mxia` if it ends at the slave end, otherwise `sxib`.
pub fn deriv_xi_ab_2d<T: Real>(
    slave: &MortarElement<T>,
    master: &MortarElement<T>,
    bounds: &SegmentBounds<T>,
) -> Result<[DerivativeMap<T>; 4], IntegrationError> {
    let (start_on_slave, end_on_slave) = bounds.endpoint_sides()?;
    let mut ximaps = [
        DerivativeMap::new(),
        DerivativeMap::new(),
        DerivativeMap::new(),
        DerivativeMap::new(),
    ];
    let (slave_nodes, master_nodes) = (slave.nodes(), master.nodes());

    if start_on_slave {
        ximaps[3] = deriv_node_projection_2d(&slave_nodes[0], master, bounds.mxib)?;
    } else {
        ximaps[0] = deriv_projection_onto_slave_2d(&master_nodes[1], slave, bounds.sxia)?;
    }
    if end_on_slave {
        ximaps[2] = deriv_node_projection_2d(&slave_nodes[1], master, bounds.mxia)?;
    } else {
        ximaps[1] = deriv_projection_onto_slave_2d(&master_nodes[0], slave, bounds.sxib)?;
    }
    Ok(ximaps)
}

/// Derivative of the master coordinate of a 2D Gauss point projected along the unit slave
/// normal.
///
/// The defining equation is `(x_m(mxi) - x_s) x n = 0`, where both `x_s` and `n` depend on
/// the nodal data and on the slave coordinate, as captured by `slave_point`.
pub fn deriv_xi_gp_2d<T: Real>(
    slave_point: &SlavePoint<T>,
    master: &MortarElement<T>,
    master_shapes: &ShapeValues<T>,
) -> Result<ParametricDerivative<T>, IntegrationError> {
    let n = &slave_point.normal;
    let tangent = master.position_gradient(master_shapes, 0);
    let c = leading_constant(cross_2d(&tangent, n), "a Gauss point projection")?;
    let diff = master.interpolate_position(&master_shapes.values) - slave_point.position;

    let mut deriv = DerivativeMap::new();
    deriv.add_scaled(&slave_point.deriv_position[0], -n[1]);
    deriv.add_scaled(&slave_point.deriv_position[1], n[0]);
    for (master_node, &phi) in master.nodes().iter().zip(master_shapes.values.iter()) {
        deriv.accumulate(master_node.dofs()[0], phi * n[1]);
        deriv.accumulate(master_node.dofs()[1], -phi * n[0]);
    }
    deriv.add_scaled(&slave_point.deriv_normal[1], diff[0]);
    deriv.add_scaled(&slave_point.deriv_normal[0], -diff[1]);
    deriv.scale(c);

    let mut dmxi = parametric_zero();
    dmxi[0] = deriv;
    Ok(dmxi)
}

fn solve_l_system<T: Real>(
    l_inv: &Matrix3<T>,
    element: &MortarElement<T>,
    shapes: &ShapeValues<T>,
    deriv_point: &SpatialDerivative<T>,
    alpha: T,
    deriv_direction: &SpatialDerivative<T>,
) -> ParametricDerivative<T> {
    let nodal = element.deriv_interpolated_position(shapes, &parametric_zero());
    let mut dxi = parametric_zero();
    for (a, dxi_a) in dxi.iter_mut().enumerate() {
        for k in 0..3 {
            let l = l_inv[(a, k)];
            dxi_a.add_scaled(&nodal[k], -l);
            dxi_a.add_scaled(&deriv_point[k], l);
            dxi_a.add_scaled(&deriv_direction[k], l * alpha);
        }
    }
    dxi
}

/// Derivatives of the master coordinates of a 3D Gauss point projected along the
/// interpolated (non-unit) slave normal.
///
/// The defining equation is `x_m(mxi) - x_s - alpha n = 0`.
pub fn deriv_xi_gp_3d<T: Real>(
    slave_point: &SlavePoint<T>,
    master: &MortarElement<T>,
    master_shapes: &ShapeValues<T>,
    alpha: T,
) -> Result<ParametricDerivative<T>, IntegrationError> {
    let l_inv = inverse_l_matrix(master, master_shapes, &slave_point.raw_normal)?;
    Ok(solve_l_system(
        &l_inv,
        master,
        master_shapes,
        &slave_point.deriv_position,
        alpha,
        &slave_point.deriv_raw_normal,
    ))
}

/// Derivatives of the coordinates of a point on the auxiliary plane projected along the
/// auxiliary normal onto `element`, which may be either the slave or the master.
///
/// The defining equation is `x(xi) - x_gp - alpha n_aux = 0`.
pub fn deriv_xi_gp_3d_aux_plane<T: Real>(
    element: &MortarElement<T>,
    shapes: &ShapeValues<T>,
    deriv_gp: &SpatialDerivative<T>,
    alpha: T,
    auxn: &Vector3<T>,
    deriv_auxn: &SpatialDerivative<T>,
) -> Result<ParametricDerivative<T>, IntegrationError> {
    let l_inv = inverse_l_matrix(element, shapes, auxn)?;
    Ok(solve_l_system(&l_inv, element, shapes, deriv_gp, alpha, deriv_auxn))
}
