use super::factor::Factor;
use super::{jacobian_factor, trial_factors, ContactIntegrator, GaussPointTerms, MortarMatrices};
use crate::accumulator::LinearizationAccumulator;
use crate::derivative::{DerivativeMap, ParametricDerivative};
use crate::element::MortarElement;
use crate::error::IntegrationError;
use crate::gauss_point::{GapPoint, SlavePoint};
use crate::linearize::{deriv_xi_ab_2d, deriv_xi_gp_2d};
use crate::overlap::SegmentBounds;
use crate::projector::project_gauss_point_2d;
use crate::quadrature::line_gauss;
use crate::Real;
use log::{debug, trace};
use nalgebra::Vector2;
use numeric_literals::replace_float_literals;

impl<T: Real> ContactIntegrator<T> {
    /// Integrates `M`, the weighted gap and, in the single-loop scheme, `D` over the overlap
    /// of a 2D slave and master segment.
    ///
    /// Gauss points are distributed on `[sxia, sxib]` and projected along the slave normal onto
    /// the master. The free segment bounds move with the nodes, which enters the derivatives
    /// through the slave coordinates of the Gauss points and the length of the segment.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn integrate_deriv_segment_2d(
        &self,
        slave: &MortarElement<T>,
        master: &MortarElement<T>,
        bounds: &SegmentBounds<T>,
        out: &mut MortarMatrices<T>,
        acc: &mut LinearizationAccumulator<T>,
    ) -> Result<(), IntegrationError> {
        self.check_pair(slave, master, 2)?;
        bounds.check()?;
        out.check_size(slave.num_nodes() * 2, master.num_nodes() * 2, slave.num_nodes())?;
        debug!(
            "Integrating slave {} and master {} over segment [{}, {}]",
            slave.id(),
            master.id(),
            bounds.sxia,
            bounds.sxib
        );

        let ximaps = deriv_xi_ab_2d(slave, master, bounds)?;
        let boundary_branch = self.uses_boundary_branch(slave);
        let basis = self.test_basis(slave)?;
        let (weights, points) = line_gauss(self.settings.gauss_points_line)?;

        let transformation = Factor::new(bounds.transformation_factor())
            .with_variation(-0.5, &ximaps[0])
            .with_variation(0.5, &ximaps[1]);

        for (&w, eta) in weights.iter().zip(&points) {
            let eta = eta[0];
            let sxi = Vector2::new(bounds.slave_xi(eta), 0.0);
            let mut dsxi: ParametricDerivative<T> = [DerivativeMap::new(), DerivativeMap::new()];
            dsxi[0].add_scaled(&ximaps[0], 0.5 * (1.0 - eta));
            dsxi[0].add_scaled(&ximaps[1], 0.5 * (1.0 + eta));

            let slave_point = SlavePoint::evaluate(slave, &sxi, &dsxi, self.settings.normal_length_floor)?;
            let mxi = project_gauss_point_2d(slave, sxi[0], master, &self.settings.newton)?;
            if mxi < bounds.mxia || mxi > bounds.mxib {
                return Err(master.out_of_range(&Vector2::new(mxi, 0.0)));
            }
            trace!("Gauss point {} on slave {} projects to {mxi}", sxi[0], slave.id());
            let mxi = Vector2::new(mxi, 0.0);
            let master_shapes = master.evaluate_shape(&mxi);
            let dmxi = deriv_xi_gp_2d(&slave_point, master, &master_shapes)?;
            let gap = GapPoint::evaluate(&slave_point, master, &master_shapes, &dmxi);

            let deriv_jacobian = slave.deriv_jacobian(&sxi)?;
            let jacobian = jacobian_factor(
                slave.jacobian(&sxi),
                &deriv_jacobian,
                slave.jacobian_gradient(&sxi)?,
                &dsxi,
                1,
            );

            let test_values = basis.evaluate(slave, &sxi);
            let test = basis.factors(&test_values, &dsxi, 1);
            let terms = GaussPointTerms {
                weight: w,
                measure: Factor::product_of(&[transformation.clone(), jacobian]),
                gap_test: self.gap_test_factors(&test, slave, &sxi, &dsxi),
                test,
                slave_trial: trial_factors(&slave_point.shapes, &dsxi, 1),
                master_trial: trial_factors(&master_shapes, &dmxi, 1),
                gap: Factor::new(gap.gap).with_variation(1.0, &gap.deriv_gap),
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
