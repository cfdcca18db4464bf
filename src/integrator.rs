//! Mortar integration with simultaneous linearization.
//!
//! [`ContactIntegrator`] integrates the mortar matrices `D` and `M` and the weighted gap `g`
//! of a slave element paired with a master element, over
//!
//! - the slave element alone (`D` only, for the two-loop scheme),
//! - a 2D overlap segment,
//! - a 3D integration cell in the slave parameter space,
//! - a 3D integration cell on an auxiliary plane, optionally using linear integration
//!   sub-elements of quadratic elements.
//!
//! All routines share the same structure. At each Gauss point the local coordinates on the
//! slave and the master are found together with their derivatives, and the integrands are
//! expressed as products of factors, each knowing its own derivative. Values go into the
//! dense per-pair matrices of [`MortarMatrices`], derivatives into a
//! [`LinearizationAccumulator`].
//!
//! With dual shape functions the `D` matrix of the single-loop scheme is not integrated but
//! obtained by summing the rows of `M`, which is exact by biorthogonality. This does not hold
//! for 2D slave elements with nodes on the boundary of the contact zone if boundary
//! modification is active. `D` is then integrated explicitly, and the couplings of interior
//! nodes to boundary nodes are moved from `D` to `M`.
use crate::accumulator::LinearizationAccumulator;
use crate::derivative::{DerivativeMap, ParametricDerivative};
use crate::element::{DualBasis, MortarElement, ShapeValues};
use crate::error::IntegrationError;
use crate::node::ContactNode;
use crate::settings::IntegratorSettings;
use crate::Real;
use itertools::izip;
use nalgebra::{DMatrix, DVector, Vector2};

mod aux_plane;
mod cell;
mod factor;
mod segment;
mod slave;

use factor::{accumulate_product_derivative, product, Factor};

/// Dense mortar matrices of a single element pair.
///
/// Rows of `d` and `m` belong to the slave DOFs, columns to the slave and master DOFs
/// respectively, ordered node by node. The gap has one entry per slave node (or per node
/// of the slave integration sub-element for the Petrov-Galerkin variant of the auxiliary
/// plane routine). Absent targets are skipped, linearizations are accumulated regardless.
#[derive(Debug, Clone, PartialEq)]
pub struct MortarMatrices<T> {
    pub d: Option<DMatrix<T>>,
    pub m: Option<DMatrix<T>>,
    pub gap: Option<DVector<T>>,
}

impl<T: Real> MortarMatrices<T> {
    /// No dense targets at all, only linearizations are computed.
    pub fn none() -> Self {
        Self {
            d: None,
            m: None,
            gap: None,
        }
    }

    /// Zero-initialized `D`, `M` and gap for the given pair.
    pub fn for_pair(slave: &MortarElement<T>, master: &MortarElement<T>) -> Self {
        let ns = slave.num_nodes() * slave.dim();
        let nm = master.num_nodes() * master.dim();
        Self {
            d: Some(DMatrix::zeros(ns, ns)),
            m: Some(DMatrix::zeros(ns, nm)),
            gap: Some(DVector::zeros(slave.num_nodes())),
        }
    }

    /// Zero-initialized `D` of the given slave element.
    pub fn for_slave(slave: &MortarElement<T>) -> Self {
        let ns = slave.num_nodes() * slave.dim();
        Self {
            d: Some(DMatrix::zeros(ns, ns)),
            m: None,
            gap: None,
        }
    }

    fn check_size(&self, slave_dofs: usize, master_dofs: usize, gap_rows: usize) -> Result<(), IntegrationError> {
        let d_ok = self
            .d
            .as_ref()
            .map_or(true, |d| d.shape() == (slave_dofs, slave_dofs));
        let m_ok = self
            .m
            .as_ref()
            .map_or(true, |m| m.shape() == (slave_dofs, master_dofs));
        let gap_ok = self.gap.as_ref().map_or(true, |g| g.len() == gap_rows);
        if d_ok && m_ok && gap_ok {
            Ok(())
        } else {
            Err(IntegrationError::infeasible(format!(
                "dense targets do not match {slave_dofs} slave DOFs, {master_dofs} master DOFs \
                 and {gap_rows} gap rows"
            )))
        }
    }
}

/// Integrates mortar matrices and their linearizations for element pairs.
#[derive(Debug, Clone)]
pub struct ContactIntegrator<T> {
    settings: IntegratorSettings<T>,
}

impl<T: Real> ContactIntegrator<T> {
    /// Creates an integrator, rejecting inconsistent settings.
    pub fn new(settings: IntegratorSettings<T>) -> Result<Self, IntegrationError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &IntegratorSettings<T> {
        &self.settings
    }

    fn check_slave(&self, slave: &MortarElement<T>, dim: usize) -> Result<(), IntegrationError> {
        if !slave.is_slave() {
            return Err(IntegrationError::configuration(format!(
                "element {} is passed as slave but is a master element",
                slave.id()
            )));
        }
        if slave.dim() != dim {
            return Err(IntegrationError::configuration(format!(
                "routine requires {dim}D elements, slave element {} is {}D",
                slave.id(),
                slave.dim()
            )));
        }
        if dim == 3 && self.settings.boundary_modification && slave.has_boundary_nodes() {
            return Err(IntegrationError::configuration(
                "boundary modification is not supported for 3D slave elements",
            ));
        }
        Ok(())
    }

    fn check_pair(
        &self,
        slave: &MortarElement<T>,
        master: &MortarElement<T>,
        dim: usize,
    ) -> Result<(), IntegrationError> {
        self.check_slave(slave, dim)?;
        if master.is_slave() {
            return Err(IntegrationError::configuration(format!(
                "element {} is passed as master but is a slave element",
                master.id()
            )));
        }
        if master.dim() != dim {
            return Err(IntegrationError::configuration(format!(
                "routine requires {dim}D elements, master element {} is {}D",
                master.id(),
                master.dim()
            )));
        }
        Ok(())
    }

    /// Whether the explicit boundary treatment of `D` applies to this slave element.
    fn uses_boundary_branch(&self, slave: &MortarElement<T>) -> bool {
        self.settings.is_dual()
            && self.settings.boundary_modification
            && slave.shape().is_line()
            && slave.has_boundary_nodes()
    }

    fn test_basis(&self, slave: &MortarElement<T>) -> Result<TestBasis<T>, IntegrationError> {
        if self.settings.is_dual() {
            Ok(TestBasis::Dual(DualBasis::new(
                slave,
                self.settings.boundary_modification,
                true,
            )?))
        } else {
            Ok(TestBasis::Standard)
        }
    }

    /// Test functions of the weighted gap.
    fn gap_test_factors<'a>(
        &self,
        test: &[Factor<'a, T>],
        slave: &MortarElement<T>,
        sxi: &Vector2<T>,
        dsxi: &'a ParametricDerivative<T>,
    ) -> Vec<Factor<'a, T>> {
        if self.settings.petrov_galerkin {
            let values = TestBasis::Standard.evaluate(slave, sxi);
            trial_factors(&values.shapes, dsxi, slave.shape().parametric_dim())
        } else {
            test.to_vec()
        }
    }

    /// Accumulates the contributions of one Gauss point to `M`, the single-loop `D` and the
    /// weighted gap.
    #[allow(clippy::too_many_arguments)]
    fn assemble_gauss_point(
        &self,
        terms: &GaussPointTerms<'_, T>,
        slave_nodes: &[ContactNode<T>],
        master_nodes: &[ContactNode<T>],
        gap_nodes: &[ContactNode<T>],
        boundary_branch: bool,
        out: &mut MortarMatrices<T>,
        acc: &mut LinearizationAccumulator<T>,
    ) {
        let nd = slave_nodes[0].dim();
        let w = terms.weight;
        let measure = &terms.measure;

        for (j, slave_node, test) in izip!(0.., slave_nodes, &terms.test) {
            for (k, master_node, trial) in izip!(0.., master_nodes, &terms.master_trial) {
                let factors = [test, trial, measure];
                let value = product(w, &factors);
                if let Some(m) = out.m.as_mut() {
                    add_block(m, j, k, nd, value);
                }
                accumulate_product_derivative(acc.deriv_m_mut(slave_node.id(), master_node.id()), w, &factors);

                // Row sum of M
                if self.settings.one_loop && self.settings.is_dual() && !boundary_branch {
                    if let Some(d) = out.d.as_mut() {
                        add_block(d, j, j, nd, value);
                    }
                    accumulate_product_derivative(acc.deriv_d_mut(slave_node.id(), slave_node.id()), w, &factors);
                }
            }
        }

        if self.settings.one_loop && (!self.settings.is_dual() || boundary_branch) {
            for (j, node_j, test) in izip!(0.., slave_nodes, &terms.test) {
                for (k, node_k, trial) in izip!(0.., slave_nodes, &terms.slave_trial) {
                    let factors = [test, trial, measure];
                    if boundary_branch {
                        self.add_boundary_d_entry(node_j, node_k, j, k, w, &factors, out, acc);
                    } else {
                        if let Some(d) = out.d.as_mut() {
                            add_block(d, j, k, nd, product(w, &factors));
                        }
                        accumulate_product_derivative(acc.deriv_d_mut(node_j.id(), node_k.id()), w, &factors);
                    }
                }
            }
        }

        for (j, node, test) in izip!(0.., gap_nodes, &terms.gap_test) {
            let factors = [test, &terms.gap, measure];
            if let Some(gap) = out.gap.as_mut() {
                gap[j] += product(w, &factors);
            }
            accumulate_product_derivative(acc.deriv_g_mut(node.id()), w, &factors);
        }
    }

    /// `D_jk` of a slave element with boundary modification.
    ///
    /// Couplings between two distinct interior nodes vanish and are skipped. The derivative
    /// of the coupling of interior node `j` to boundary node `k` is moved to `M` with
    /// opposite sign, since the boundary node acts like a master node.
    #[allow(clippy::too_many_arguments)]
    fn add_boundary_d_entry(
        &self,
        node_j: &ContactNode<T>,
        node_k: &ContactNode<T>,
        j: usize,
        k: usize,
        scale: T,
        factors: &[&Factor<'_, T>],
        out: &mut MortarMatrices<T>,
        acc: &mut LinearizationAccumulator<T>,
    ) {
        let (bound_j, bound_k) = (node_j.is_on_boundary(), node_k.is_on_boundary());
        if j != k && !bound_j && !bound_k {
            return;
        }
        if let Some(d) = out.d.as_mut() {
            add_block(d, j, k, node_j.dim(), product(scale, factors));
        }
        if j == k && !bound_j {
            accumulate_product_derivative(acc.deriv_d_mut(node_j.id(), node_j.id()), scale, factors);
        } else if bound_k && !bound_j {
            accumulate_product_derivative(acc.deriv_m_mut(node_j.id(), node_k.id()), -scale, factors);
        }
    }
}

/// Factors of all integrands at one Gauss point.
struct GaussPointTerms<'a, T> {
    weight: T,
    /// Product of all Jacobians and transformation factors.
    measure: Factor<'a, T>,
    /// Test functions of the slave nodes for `D` and `M`.
    test: Vec<Factor<'a, T>>,
    /// Standard shape functions of the slave nodes.
    slave_trial: Vec<Factor<'a, T>>,
    master_trial: Vec<Factor<'a, T>>,
    gap: Factor<'a, T>,
    gap_test: Vec<Factor<'a, T>>,
}

/// The Lagrange multiplier basis of a slave element.
enum TestBasis<T> {
    Standard,
    Dual(DualBasis<T>),
}

struct TestValues<T> {
    shapes: ShapeValues<T>,
    /// Values of the base of a dual basis.
    base: Option<ShapeValues<T>>,
}

impl<T: Real> TestBasis<T> {
    fn evaluate(&self, element: &MortarElement<T>, xi: &Vector2<T>) -> TestValues<T> {
        match self {
            TestBasis::Standard => TestValues {
                shapes: element.evaluate_shape(xi),
                base: None,
            },
            TestBasis::Dual(dual) => TestValues {
                shapes: dual.evaluate(xi),
                base: Some(dual.evaluate_base(xi)),
            },
        }
    }

    /// Test function factors at a point whose coordinates have the derivatives `dxi`.
    ///
    /// The derivative of a dual function `phi_j = sum_m A_jm b_m` has a part from the
    /// coordinates and a part `sum_m b_m dA_jm` from the coefficients.
    fn factors<'a>(
        &'a self,
        values: &TestValues<T>,
        dxi: &'a ParametricDerivative<T>,
        parametric_dim: usize,
    ) -> Vec<Factor<'a, T>> {
        let mut factors = trial_factors(&values.shapes, dxi, parametric_dim);
        let coefficient_derivatives = match self {
            TestBasis::Dual(dual) => dual.coefficient_derivatives(),
            TestBasis::Standard => None,
        };
        if let (Some(deriv_a), Some(base)) = (coefficient_derivatives, &values.base) {
            for (factor, deriv_a_j) in factors.iter_mut().zip(deriv_a) {
                for (&b_m, deriv_a_jm) in base.values.iter().zip(deriv_a_j) {
                    factor.push_variation(b_m, deriv_a_jm);
                }
            }
        }
        factors
    }
}

/// Shape function factors at a point whose coordinates have the derivatives `dxi`.
fn trial_factors<'a, T: Real>(
    shapes: &ShapeValues<T>,
    dxi: &'a ParametricDerivative<T>,
    parametric_dim: usize,
) -> Vec<Factor<'a, T>> {
    (0..shapes.len())
        .map(|i| {
            let mut factor = Factor::new(shapes.values[i]);
            for (d, dxi_d) in dxi.iter().enumerate().take(parametric_dim) {
                factor.push_variation(shapes.derivatives[(i, d)], dxi_d);
            }
            factor
        })
        .collect()
}

/// The element Jacobian at a point whose coordinates have the derivatives `dxi`.
///
/// Varies with the nodal coordinates directly and through the coordinates of the point.
fn jacobian_factor<'a, T: Real>(
    jacobian: T,
    deriv_jacobian: &'a DerivativeMap<T>,
    jacobian_gradient: [T; 2],
    dxi: &'a ParametricDerivative<T>,
    parametric_dim: usize,
) -> Factor<'a, T> {
    let mut factor = Factor::new(jacobian).with_variation(T::one(), deriv_jacobian);
    for (d, dxi_d) in dxi.iter().enumerate().take(parametric_dim) {
        factor.push_variation(jacobian_gradient[d], dxi_d);
    }
    factor
}

/// Adds `value` to the diagonal of the `(j, k)` block of size `nd`.
fn add_block<T: Real>(matrix: &mut DMatrix<T>, j: usize, k: usize, nd: usize, value: T) {
    for d in 0..nd {
        matrix[(j * nd + d, k * nd + d)] += value;
    }
}
