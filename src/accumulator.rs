//! Accumulation of mortar linearizations over an evaluation pass.
//!
//! Every integration call adds its contributions to a [`LinearizationAccumulator`]. The
//! lifecycle is explicit: [`reset`](LinearizationAccumulator::reset) before the pass,
//! integrate all element pairs, then read. Accumulation is purely additive, so the result
//! does not depend on the order in which element pairs are processed, and accumulators
//! filled independently can be combined with [`merge`](LinearizationAccumulator::merge).
use crate::derivative::{DerivativeMap, DerivativeMapMatrix};
use crate::Real;
use rustc_hash::FxHashMap;

/// The linearizations owned by a single slave node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLinearization<T> {
    /// Derivatives of `D_jk`, keyed by the id of the slave node `k`.
    pub deriv_d: DerivativeMapMatrix<T>,
    /// Derivatives of `M_jk`, keyed by the id of the master node `k` (or of a slave
    /// boundary node, see boundary modification).
    pub deriv_m: DerivativeMapMatrix<T>,
    /// Derivative of the weighted gap of the node.
    pub deriv_g: DerivativeMap<T>,
}

impl<T> Default for NodeLinearization<T> {
    fn default() -> Self {
        Self {
            deriv_d: DerivativeMapMatrix::default(),
            deriv_m: DerivativeMapMatrix::default(),
            deriv_g: DerivativeMap::default(),
        }
    }
}

impl<T: Real> NodeLinearization<T> {
    pub fn merge(&mut self, other: &NodeLinearization<T>) {
        self.deriv_d.merge(&other.deriv_d);
        self.deriv_m.merge(&other.deriv_m);
        self.deriv_g.merge(&other.deriv_g);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearizationAccumulator<T> {
    nodes: FxHashMap<usize, NodeLinearization<T>>,
}

impl<T> Default for LinearizationAccumulator<T> {
    fn default() -> Self {
        Self {
            nodes: FxHashMap::default(),
        }
    }
}

impl<T: Real> LinearizationAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all accumulated derivatives.
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    pub fn node_mut(&mut self, node_id: usize) -> &mut NodeLinearization<T> {
        self.nodes.entry(node_id).or_default()
    }

    pub fn node(&self, node_id: usize) -> Option<&NodeLinearization<T>> {
        self.nodes.get(&node_id)
    }

    pub fn deriv_d_mut(&mut self, node_id: usize, neighbor_id: usize) -> &mut DerivativeMap<T> {
        self.node_mut(node_id).deriv_d.entry_mut(neighbor_id)
    }

    pub fn deriv_m_mut(&mut self, node_id: usize, neighbor_id: usize) -> &mut DerivativeMap<T> {
        self.node_mut(node_id).deriv_m.entry_mut(neighbor_id)
    }

    pub fn deriv_g_mut(&mut self, node_id: usize) -> &mut DerivativeMap<T> {
        &mut self.node_mut(node_id).deriv_g
    }

    pub fn deriv_d(&self, node_id: usize, neighbor_id: usize) -> Option<&DerivativeMap<T>> {
        self.node(node_id)
            .and_then(|node| node.deriv_d.get(neighbor_id))
    }

    pub fn deriv_m(&self, node_id: usize, neighbor_id: usize) -> Option<&DerivativeMap<T>> {
        self.node(node_id)
            .and_then(|node| node.deriv_m.get(neighbor_id))
    }

    pub fn deriv_g(&self, node_id: usize) -> Option<&DerivativeMap<T>> {
        self.node(node_id).map(|node| &node.deriv_g)
    }

    /// Ids of all nodes with accumulated derivatives, sorted in ascending order.
    pub fn node_ids(&self) -> Vec<usize> {
        let mut ids: Vec<_> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds all derivatives accumulated in `other`.
    pub fn merge(&mut self, other: &LinearizationAccumulator<T>) {
        for (&node_id, node) in &other.nodes {
            self.node_mut(node_id).merge(node);
        }
    }
}
