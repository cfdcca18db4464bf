use super::factor::Factor;
use super::{trial_factors, ContactIntegrator, GaussPointTerms, MortarMatrices, TestBasis};
use crate::accumulator::LinearizationAccumulator;
use crate::derivative::{ParametricDerivative, SpatialDerivative};
use crate::element::{DualBasis, ElementShape, IntElement, MortarElement, ShapeValues};
use crate::error::IntegrationError;
use crate::gauss_point::{GapPoint, SlavePoint};
use crate::intcell::Intcell;
use crate::linearize::deriv_xi_gp_3d_aux_plane;
use crate::projector::{check_in_domain, project_along_direction_3d};
use crate::quadrature::triangle_gauss;
use crate::Real;
use log::{debug, trace};
use nalgebra::{Vector2, Vector3};

/// A point of the auxiliary plane projected onto an element.
struct PlaneProjection<T> {
    xi: Vector2<T>,
    shapes: ShapeValues<T>,
    dxi: ParametricDerivative<T>,
}

impl<T: Real> ContactIntegrator<T> {
    fn project_from_plane(
        &self,
        point: &Vector3<T>,
        deriv_point: &SpatialDerivative<T>,
        cell: &Intcell<T>,
        element: &MortarElement<T>,
    ) -> Result<PlaneProjection<T>, IntegrationError> {
        let (xi, alpha) = project_along_direction_3d(point, cell.auxn(), element, &self.settings.newton)?;
        check_in_domain(element, &xi, self.settings.projection_tolerance)?;
        let shapes = element.evaluate_shape(&xi);
        let dxi = deriv_xi_gp_3d_aux_plane(element, &shapes, deriv_point, alpha, cell.auxn(), cell.deriv_auxn())?;
        Ok(PlaneProjection { xi, shapes, dxi })
    }

    fn check_auxiliary_normal(&self, cell: &Intcell<T>) -> Result<(), IntegrationError> {
        if cell.auxn().norm() < self.settings.normal_length_floor {
            Err(IntegrationError::infeasible("integration cell has no auxiliary normal"))
        } else {
            Ok(())
        }
    }

    /// Integrates `M`, the weighted gap and, in the single-loop scheme, `D` over a 3D
    /// integration cell lying in an auxiliary plane.
    ///
    /// Gauss points of the cell are projected along the auxiliary normal onto both the slave
    /// and the master element. Integration takes place on the plane, so the only Jacobian
    /// involved is that of the cell.
    pub fn integrate_deriv_cell_3d_aux_plane(
        &self,
        slave: &MortarElement<T>,
        master: &MortarElement<T>,
        cell: &Intcell<T>,
        out: &mut MortarMatrices<T>,
        acc: &mut LinearizationAccumulator<T>,
    ) -> Result<(), IntegrationError> {
        self.check_pair(slave, master, 3)?;
        self.check_auxiliary_normal(cell)?;
        out.check_size(slave.num_nodes() * 3, master.num_nodes() * 3, slave.num_nodes())?;
        debug!(
            "Integrating slave {} and master {} over an auxiliary plane cell of size {}",
            slave.id(),
            master.id(),
            cell.jacobian()
        );

        let boundary_branch = self.uses_boundary_branch(slave);
        let basis = self.test_basis(slave)?;
        let (weights, points) = triangle_gauss(self.settings.triangle_rule_points)?;
        let deriv_cell_jacobian = cell.deriv_jacobian()?;
        let cell_jacobian = Factor::new(cell.jacobian()).with_variation(T::one(), &deriv_cell_jacobian);

        for (&w, eta) in weights.iter().zip(&points) {
            let point = cell.local_to_global(eta);
            let deriv_point = cell.deriv_local_to_global(eta);
            let on_slave = self.project_from_plane(&point, &deriv_point, cell, slave)?;
            let on_master = self.project_from_plane(&point, &deriv_point, cell, master)?;
            trace!(
                "Gauss point {point:?} projects to {:?} on slave {} and {:?} on master {}",
                on_slave.xi,
                slave.id(),
                on_master.xi,
                master.id()
            );

            let slave_point =
                SlavePoint::evaluate(slave, &on_slave.xi, &on_slave.dxi, self.settings.normal_length_floor)?;
            let gap = GapPoint::evaluate(&slave_point, master, &on_master.shapes, &on_master.dxi);

            let test_values = basis.evaluate(slave, &on_slave.xi);
            let test = basis.factors(&test_values, &on_slave.dxi, 2);
            let terms = GaussPointTerms {
                weight: w,
                measure: cell_jacobian.clone(),
                gap_test: self.gap_test_factors(&test, slave, &on_slave.xi, &on_slave.dxi),
                test,
                slave_trial: trial_factors(&on_slave.shapes, &on_slave.dxi, 2),
                master_trial: trial_factors(&on_master.shapes, &on_master.dxi, 2),
                gap: Factor::new(gap.gap).with_variation(T::one(), &gap.deriv_gap),
            };
            self.assemble_gauss_point(
                &terms,
                slave.nodes(),
                master.nodes(),
                slave.nodes(),
                boundary_branch,
                out,
                acc,
            );
        }
        Ok(())
    }

    /// Variant of [`integrate_deriv_cell_3d_aux_plane`](Self::integrate_deriv_cell_3d_aux_plane)
    /// for cells built from linear integration sub-elements of quadratic elements.
    ///
    /// Gauss points are projected onto the sub-elements and mapped to the parent elements,
    /// where `D`, `M` and the gap are evaluated. With the Petrov-Galerkin option the weighted
    /// gap is tested with the dual functions of the slave sub-element, and the gap target
    /// has one entry per sub-element node. Without it, slave Tri6 and Quad8 elements are
    /// rejected since their dual bases are not suitable for the gap.
    #[allow(clippy::too_many_arguments)]
    pub fn integrate_deriv_cell_3d_aux_plane_quad(
        &self,
        slave: &MortarElement<T>,
        master: &MortarElement<T>,
        slave_sub: &IntElement<T>,
        master_sub: &IntElement<T>,
        cell: &Intcell<T>,
        out: &mut MortarMatrices<T>,
        acc: &mut LinearizationAccumulator<T>,
    ) -> Result<(), IntegrationError> {
        self.check_pair(slave, master, 3)?;
        self.check_auxiliary_normal(cell)?;
        if slave_sub.parent_id() != slave.id() || master_sub.parent_id() != master.id() {
            return Err(IntegrationError::infeasible(format!(
                "integration sub-elements of {} and {} do not belong to slave {} and master {}",
                slave_sub.parent_id(),
                master_sub.parent_id(),
                slave.id(),
                master.id()
            )));
        }
        let petrov_galerkin = self.settings.petrov_galerkin;
        if !petrov_galerkin && matches!(slave.shape(), ElementShape::Tri6 | ElementShape::Quad8) {
            return Err(IntegrationError::configuration(format!(
                "{:?} slave elements require the Petrov-Galerkin gap",
                slave.shape()
            )));
        }
        let gap_nodes = if petrov_galerkin {
            slave_sub.element().nodes()
        } else {
            slave.nodes()
        };
        out.check_size(slave.num_nodes() * 3, master.num_nodes() * 3, gap_nodes.len())?;
        debug!(
            "Integrating slave {} and master {} over an auxiliary plane cell of sub-elements",
            slave.id(),
            master.id()
        );

        let boundary_branch = self.uses_boundary_branch(slave);
        let basis = self.test_basis(slave)?;
        let gap_basis = if petrov_galerkin {
            Some(TestBasis::Dual(DualBasis::new(slave_sub.element(), false, true)?))
        } else {
            None
        };
        let (weights, points) = triangle_gauss(self.settings.triangle_rule_points)?;
        let deriv_cell_jacobian = cell.deriv_jacobian()?;
        let cell_jacobian = Factor::new(cell.jacobian()).with_variation(T::one(), &deriv_cell_jacobian);

        for (&w, eta) in weights.iter().zip(&points) {
            let point = cell.local_to_global(eta);
            let deriv_point = cell.deriv_local_to_global(eta);
            let on_slave_sub = self.project_from_plane(&point, &deriv_point, cell, slave_sub.element())?;
            let on_master_sub = self.project_from_plane(&point, &deriv_point, cell, master_sub.element())?;

            let psxi = slave_sub.map_to_parent(&on_slave_sub.xi);
            let dpsxi = slave_sub.map_derivative_to_parent(&on_slave_sub.xi, &on_slave_sub.dxi);
            let pmxi = master_sub.map_to_parent(&on_master_sub.xi);
            let dpmxi = master_sub.map_derivative_to_parent(&on_master_sub.xi, &on_master_sub.dxi);
            trace!("Gauss point {point:?} maps to {psxi:?} on slave {} and {pmxi:?} on master {}", slave.id(), master.id());

            let slave_point = SlavePoint::evaluate(slave, &psxi, &dpsxi, self.settings.normal_length_floor)?;
            let master_shapes = master.evaluate_shape(&pmxi);
            let gap = GapPoint::evaluate(&slave_point, master, &master_shapes, &dpmxi);

            let test_values = basis.evaluate(slave, &psxi);
            let test = basis.factors(&test_values, &dpsxi, 2);
            let gap_values = gap_basis
                .as_ref()
                .map(|gap_basis| gap_basis.evaluate(slave_sub.element(), &on_slave_sub.xi));
            let gap_test = match (&gap_basis, &gap_values) {
                (Some(gap_basis), Some(values)) => gap_basis.factors(values, &on_slave_sub.dxi, 2),
                _ => test.clone(),
            };
            let terms = GaussPointTerms {
                weight: w,
                measure: cell_jacobian.clone(),
                gap_test,
                test,
                slave_trial: trial_factors(&slave_point.shapes, &dpsxi, 2),
                master_trial: trial_factors(&master_shapes, &dpmxi, 2),
                gap: Factor::new(gap.gap).with_variation(T::one(), &gap.deriv_gap),
            };
            self.assemble_gauss_point(
                &terms,
                slave.nodes(),
                master.nodes(),
                gap_nodes,
                boundary_branch,
                out,
                acc,
            );
        }
        Ok(())
    }
}
