use super::factor::{accumulate_product_derivative, product, Factor};
use super::{add_block, trial_factors, ContactIntegrator, MortarMatrices};
use crate::accumulator::LinearizationAccumulator;
use crate::derivative::parametric_zero;
use crate::element::{ElementShape, MortarElement};
use crate::error::IntegrationError;
use crate::quadrature::{line_gauss, quadrilateral_gauss, triangle_gauss, QuadraturePair};
use crate::Real;
use itertools::izip;
use log::debug;

impl<T: Real> ContactIntegrator<T> {
    /// The rule used to integrate over a whole element.
    fn element_rule(&self, shape: ElementShape) -> Result<QuadraturePair<T>, IntegrationError> {
        let rule = if shape.is_line() {
            line_gauss(self.settings.gauss_points_line)?
        } else if shape.is_triangle() {
            triangle_gauss(self.settings.triangle_rule_points)?
        } else {
            quadrilateral_gauss(self.settings.gauss_points_quad)?
        };
        Ok(rule)
    }

    /// Integrates `D` over the slave element alone, as needed by the two-loop scheme.
    ///
    /// `D_jk = int phi_j N_k J` is filled for all node pairs. The coordinates of the Gauss
    /// points are fixed, so `D` varies only with the Jacobian and the dual coefficients. `M` and
    /// the gap targets are ignored.
    pub fn integrate_deriv_slave(
        &self,
        slave: &MortarElement<T>,
        out: &mut MortarMatrices<T>,
        acc: &mut LinearizationAccumulator<T>,
    ) -> Result<(), IntegrationError> {
        self.check_slave(slave, slave.dim())?;
        let nd = slave.dim();
        let slave_dofs = slave.num_nodes() * nd;
        if out.d.as_ref().map_or(false, |d| d.shape() != (slave_dofs, slave_dofs)) {
            return Err(IntegrationError::infeasible(format!(
                "D must be {slave_dofs} x {slave_dofs} for slave element {}",
                slave.id()
            )));
        }
        debug!("Integrating D over slave element {} ({:?})", slave.id(), slave.shape());

        let boundary_branch = self.uses_boundary_branch(slave);
        let basis = self.test_basis(slave)?;
        let pdim = slave.shape().parametric_dim();
        let fixed = parametric_zero();
        let (weights, points) = self.element_rule(slave.shape())?;

        for (&w, xi) in weights.iter().zip(&points) {
            let values = basis.evaluate(slave, xi);
            let test = basis.factors(&values, &fixed, pdim);
            let trial = trial_factors(&slave.evaluate_shape(xi), &fixed, pdim);
            let deriv_jacobian = slave.deriv_jacobian(xi)?;
            let jacobian = Factor::new(slave.jacobian(xi)).with_variation(T::one(), &deriv_jacobian);

            for (j, node_j, test_j) in izip!(0.., slave.nodes(), &test) {
                for (k, node_k, trial_k) in izip!(0.., slave.nodes(), &trial) {
                    let factors = [test_j, trial_k, &jacobian];
                    if let Some(d) = out.d.as_mut() {
                        add_block(d, j, k, nd, product(w, &factors));
                    }
                    if boundary_branch && node_k.is_on_boundary() && !node_j.is_on_boundary() {
                        accumulate_product_derivative(acc.deriv_m_mut(node_j.id(), node_k.id()), -w, &factors);
                    } else {
                        accumulate_product_derivative(acc.deriv_d_mut(node_j.id(), node_k.id()), w, &factors);
                    }
                }
            }
        }
        Ok(())
    }
}
