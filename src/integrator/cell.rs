use super::factor::Factor;
use super::{jacobian_factor, trial_factors, ContactIntegrator, GaussPointTerms, MortarMatrices};
use crate::accumulator::LinearizationAccumulator;
use crate::element::MortarElement;
use crate::error::IntegrationError;
use crate::gauss_point::{GapPoint, SlavePoint};
use crate::intcell::Intcell;
use crate::linearize::deriv_xi_gp_3d;
use crate::projector::{check_in_domain, project_gauss_point_3d};
use crate::quadrature::triangle_gauss;
use crate::Real;
use log::{debug, trace};
use nalgebra::Vector2;

impl<T: Real> ContactIntegrator<T> {
    /// Integrates `M`, the weighted gap and, in the single-loop scheme, `D` over a 3D
    /// integration cell given in the parameter space of the slave element.
    ///
    /// The cell vertices are slave coordinates (third component zero). Their derivatives are
    /// those of the slave coordinates of the polygon clipping points. Gauss points are
    /// projected along the interpolated slave normal onto the master.
    pub fn integrate_deriv_cell_3d(
        &self,
        slave: &MortarElement<T>,
        master: &MortarElement<T>,
        cell: &Intcell<T>,
        out: &mut MortarMatrices<T>,
        acc: &mut LinearizationAccumulator<T>,
    ) -> Result<(), IntegrationError> {
        self.check_pair(slave, master, 3)?;
        out.check_size(slave.num_nodes() * 3, master.num_nodes() * 3, slave.num_nodes())?;
        let tol = self.settings.projection_tolerance;
        for vertex in cell.vertices() {
            let xi = Vector2::new(vertex[0], vertex[1]);
            if !slave.shape().is_in_domain(&xi, tol) {
                return Err(IntegrationError::infeasible(format!(
                    "integration cell vertex {xi:?} outside of slave element {}",
                    slave.id()
                )));
            }
        }
        debug!(
            "Integrating slave {} and master {} over a cell of size {}",
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
            let x = cell.local_to_global(eta);
            let sxi = Vector2::new(x[0], x[1]);
            let [dsxi_0, dsxi_1, _] = cell.deriv_local_to_global(eta);
            let dsxi = [dsxi_0, dsxi_1];

            let slave_point = SlavePoint::evaluate(slave, &sxi, &dsxi, self.settings.normal_length_floor)?;
            let (mxi, alpha) = project_gauss_point_3d(slave, &sxi, master, &self.settings.newton)?;
            check_in_domain(master, &mxi, tol)?;
            trace!("Gauss point {sxi:?} on slave {} projects to {mxi:?}", slave.id());
            let master_shapes = master.evaluate_shape(&mxi);
            let dmxi = deriv_xi_gp_3d(&slave_point, master, &master_shapes, alpha)?;
            let gap = GapPoint::evaluate(&slave_point, master, &master_shapes, &dmxi);

            let deriv_jacobian = slave.deriv_jacobian(&sxi)?;
            let jacobian = jacobian_factor(
                slave.jacobian(&sxi),
                &deriv_jacobian,
                slave.jacobian_gradient(&sxi)?,
                &dsxi,
                2,
            );

            let test_values = basis.evaluate(slave, &sxi);
            let test = basis.factors(&test_values, &dsxi, 2);
            let terms = GaussPointTerms {
                weight: w,
                measure: Factor::product_of(&[cell_jacobian.clone(), jacobian]),
                gap_test: self.gap_test_factors(&test, slave, &sxi, &dsxi),
                test,
                slave_trial: trial_factors(&slave_point.shapes, &dsxi, 2),
                master_trial: trial_factors(&master_shapes, &dmxi, 2),
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
}
