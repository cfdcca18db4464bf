use fenris_contact::accumulator::LinearizationAccumulator;
use fenris_contact::element::{ElementShape, MortarElement};
use fenris_contact::integrator::MortarMatrices;
use fenris_contact::node::ContactNode;
use fenris_contact::optimize::calculus::approximate_jacobian_fd;
use fenris_contact::settings::{IntegratorSettings, ShapeFamily};
use nalgebra::{DVector, Vector3};
use util::assert_derivative_eq;

mod derivative;
mod overlap;
mod segment;

/// Settings for the single-loop scheme with tight projections, as needed for finite
/// difference checks.
pub fn one_loop_settings(family: ShapeFamily) -> IntegratorSettings<f64> {
    let mut settings = IntegratorSettings::default()
        .with_shape_family(family)
        .with_one_loop(true);
    settings.newton.tolerance = 1e-13;
    settings
}

pub fn element_2d(id: usize, shape: ElementShape, nodes: &[(usize, [f64; 2])], is_slave: bool) -> MortarElement<f64> {
    let nodes = nodes
        .iter()
        .map(|&(node_id, [x, y])| ContactNode::with_consecutive_dofs(node_id, 2, Vector3::new(x, y, 0.0)))
        .collect::<Result<_, _>>()
        .unwrap();
    MortarElement::new(id, shape, nodes, is_slave).unwrap()
}

pub fn element_3d(id: usize, shape: ElementShape, nodes: &[(usize, [f64; 3])], is_slave: bool) -> MortarElement<f64> {
    let nodes = nodes
        .iter()
        .map(|&(node_id, p)| ContactNode::with_consecutive_dofs(node_id, 3, Vector3::from(p)))
        .collect::<Result<_, _>>()
        .unwrap();
    MortarElement::new(id, shape, nodes, is_slave).unwrap()
}

/// Gathers the nodal coordinates of the elements into a global DOF vector.
pub fn dof_vector(elements: &[&MortarElement<f64>]) -> DVector<f64> {
    let num_dofs = elements
        .iter()
        .flat_map(|e| e.nodes())
        .flat_map(|node| node.dofs().iter().copied())
        .max()
        .map_or(0, |max| max + 1);
    let mut x = DVector::zeros(num_dofs);
    for node in elements.iter().flat_map(|e| e.nodes()) {
        for (k, &dof) in node.dofs().iter().enumerate() {
            x[dof] = node.position()[k];
        }
    }
    x
}

/// A copy of the element with nodal coordinates taken from the global DOF vector.
pub fn with_positions(element: &MortarElement<f64>, x: &DVector<f64>) -> MortarElement<f64> {
    let mut element = element.clone();
    for node in element.nodes_mut() {
        let mut position = Vector3::zeros();
        for (k, &dof) in node.dofs().iter().enumerate() {
            position[k] = x[dof];
        }
        node.set_position(position);
    }
    element
}

pub fn node_ids(element: &MortarElement<f64>) -> Vec<usize> {
    element.nodes().iter().map(ContactNode::id).collect()
}

/// Node ids of the rows and columns of the dense mortar matrices.
pub struct Layout {
    pub dim: usize,
    pub slave: Vec<usize>,
    pub master: Vec<usize>,
    pub gap: Vec<usize>,
}

impl Layout {
    pub fn new(slave: &MortarElement<f64>, master: &MortarElement<f64>) -> Self {
        Self {
            dim: slave.dim(),
            slave: node_ids(slave),
            master: node_ids(master),
            gap: node_ids(slave),
        }
    }

    pub fn with_gap_nodes(self, gap: Vec<usize>) -> Self {
        Self { gap, ..self }
    }
}

fn sampled_entries(out: &MortarMatrices<f64>, layout: &Layout) -> DVector<f64> {
    let nd = layout.dim;
    let mut values = Vec::new();
    if let Some(d) = &out.d {
        for j in 0..layout.slave.len() {
            for k in 0..layout.slave.len() {
                values.push(d[(j * nd, k * nd)]);
            }
        }
    }
    if let Some(m) = &out.m {
        for j in 0..layout.slave.len() {
            for k in 0..layout.master.len() {
                values.push(m[(j * nd, k * nd)]);
            }
        }
    }
    if let Some(gap) = &out.gap {
        values.extend(gap.iter().copied());
    }
    DVector::from_vec(values)
}

fn analytic_entries(
    out: &MortarMatrices<f64>,
    acc: &LinearizationAccumulator<f64>,
    layout: &Layout,
    num_dofs: usize,
) -> Vec<(String, DVector<f64>)> {
    let dense = |map: Option<&fenris_contact::derivative::DerivativeMap<f64>>| {
        map.map_or_else(|| DVector::zeros(num_dofs), |map| map.to_dense(num_dofs))
    };
    let mut rows = Vec::new();
    if out.d.is_some() {
        for &j in &layout.slave {
            for &k in &layout.slave {
                // Couplings to boundary nodes are stored in M with opposite sign
                let row = dense(acc.deriv_d(j, k)) - dense(acc.deriv_m(j, k));
                rows.push((format!("D[{j}][{k}]"), row));
            }
        }
    }
    if out.m.is_some() {
        for &j in &layout.slave {
            for &k in &layout.master {
                rows.push((format!("M[{j}][{k}]"), dense(acc.deriv_m(j, k))));
            }
        }
    }
    if out.gap.is_some() {
        for &j in &layout.gap {
            rows.push((format!("g[{j}]"), dense(acc.deriv_g(j))));
        }
    }
    rows
}

/// Compares the accumulated linearizations of all dense outputs with central differences
/// with respect to every DOF of `x0`.
pub fn assert_linearization_matches_fd<F>(x0: &DVector<f64>, layout: &Layout, evaluate: F)
where
    F: Fn(&DVector<f64>, &mut LinearizationAccumulator<f64>) -> MortarMatrices<f64>,
{
    let mut acc = LinearizationAccumulator::new();
    let out = evaluate(x0, &mut acc);
    let analytic = analytic_entries(&out, &acc, layout, x0.len());

    let fd = approximate_jacobian_fd(
        |x| {
            let mut scratch = LinearizationAccumulator::new();
            sampled_entries(&evaluate(x, &mut scratch), layout)
        },
        x0,
        1e-6,
    );
    assert_eq!(fd.nrows(), analytic.len());

    for (row, (label, derivative)) in analytic.iter().enumerate() {
        for dof in 0..x0.len() {
            assert_derivative_eq!(derivative[dof], fd[(row, dof)], tol = 1e-6, "{label}, dof {dof}");
        }
    }
}
