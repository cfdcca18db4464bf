//! Sparse derivative maps keyed by global degree of freedom.
//!
//! A [`DerivativeMap`] represents the directional derivative of a scalar quantity: the entry
//! for a DOF is the partial derivative of the quantity with respect to that DOF. Entries are
//! created lazily and zero entries are harmless.
use crate::Real;
use nalgebra::{DVector, Vector3};
use rustc_hash::FxHashMap;
use std::iter::FromIterator;

#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeMap<T> {
    entries: FxHashMap<usize, T>,
}

/// Derivatives of the (up to) two parametric coordinates of a point.
pub type ParametricDerivative<T> = [DerivativeMap<T>; 2];

/// Derivatives of the three spatial components of a vector.
pub type SpatialDerivative<T> = [DerivativeMap<T>; 3];

impl<T> Default for DerivativeMap<T> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<T: Real> DerivativeMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the entry of `dof`.
    pub fn accumulate(&mut self, dof: usize, value: T) {
        *self.entries.entry(dof).or_insert_with(T::zero) += value;
    }

    /// Adds `factor * other` to this map.
    pub fn add_scaled(&mut self, other: &DerivativeMap<T>, factor: T) {
        for (&dof, &value) in &other.entries {
            self.accumulate(dof, factor * value);
        }
    }

    /// Adds all entries of `other` to this map.
    pub fn merge(&mut self, other: &DerivativeMap<T>) {
        self.add_scaled(other, T::one());
    }

    pub fn scale(&mut self, factor: T) {
        for value in self.entries.values_mut() {
            *value *= factor;
        }
    }

    /// The entry of `dof`, or zero if there is none.
    pub fn get(&self, dof: usize) -> T {
        self.entries.get(&dof).copied().unwrap_or_else(T::zero)
    }

    /// Iterates over `(dof, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.entries.iter().map(|(&dof, &value)| (dof, value))
    }

    /// The DOFs with an entry, sorted in ascending order.
    pub fn sorted_dofs(&self) -> Vec<usize> {
        let mut dofs: Vec<_> = self.entries.keys().copied().collect();
        dofs.sort_unstable();
        dofs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Writes the map into a dense vector of the given length.
    ///
    /// # Panics
    ///
    /// Panics if a DOF is not smaller than `num_dofs`.
    pub fn to_dense(&self, num_dofs: usize) -> DVector<T> {
        let mut dense = DVector::zeros(num_dofs);
        for (dof, value) in self.iter() {
            assert!(dof < num_dofs, "DOF {dof} out of bounds for {num_dofs} DOFs");
            dense[dof] += value;
        }
        dense
    }
}

impl<T: Real> FromIterator<(usize, T)> for DerivativeMap<T> {
    fn from_iter<I: IntoIterator<Item = (usize, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (dof, value) in iter {
            map.accumulate(dof, value);
        }
        map
    }
}

/// Derivative maps of the entries of one row of a mortar matrix, keyed by the id of the
/// neighbouring node that identifies the column block.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeMapMatrix<T> {
    rows: FxHashMap<usize, DerivativeMap<T>>,
}

impl<T> Default for DerivativeMapMatrix<T> {
    fn default() -> Self {
        Self {
            rows: FxHashMap::default(),
        }
    }
}

impl<T: Real> DerivativeMapMatrix<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The derivative map associated with `neighbor`, created if it does not exist.
    pub fn entry_mut(&mut self, neighbor: usize) -> &mut DerivativeMap<T> {
        self.rows.entry(neighbor).or_default()
    }

    pub fn get(&self, neighbor: usize) -> Option<&DerivativeMap<T>> {
        self.rows.get(&neighbor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &DerivativeMap<T>)> + '_ {
        self.rows.iter().map(|(&neighbor, map)| (neighbor, map))
    }

    pub fn merge(&mut self, other: &DerivativeMapMatrix<T>) {
        for (neighbor, map) in other.iter() {
            self.entry_mut(neighbor).merge(map);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

pub fn parametric_zero<T: Real>() -> ParametricDerivative<T> {
    [DerivativeMap::new(), DerivativeMap::new()]
}

pub fn spatial_zero<T: Real>() -> SpatialDerivative<T> {
    [DerivativeMap::new(), DerivativeMap::new(), DerivativeMap::new()]
}

/// Linearizes the normalization `n / |n|` of a vector `n`.
///
/// Given the unit vector `n_unit = n / |n|`, the length `|n|` and the derivatives `dn` of the
/// non-unit vector, returns the derivatives of the unit vector,
///
/// ```text
/// d(n_unit)_a = (dn_a - sum_b n_unit_a n_unit_b dn_b) / |n|
/// ```
pub fn linearize_unit_vector<T: Real>(
    unit: &Vector3<T>,
    length: T,
    deriv: &SpatialDerivative<T>,
) -> SpatialDerivative<T> {
    let cross_terms = unit_vector_cross_terms(unit);
    let inv_length = T::one() / length;
    let mut result = spatial_zero();
    for a in 0..3 {
        result[a].add_scaled(&deriv[a], inv_length);
        for b in 0..3 {
            result[a].add_scaled(&deriv[b], -inv_length * cross_terms[(a, b)]);
        }
    }
    result
}

/// The symmetric coefficient matrix `n_unit n_unit^T` of the unit vector linearization.
pub fn unit_vector_cross_terms<T: Real>(unit: &Vector3<T>) -> nalgebra::Matrix3<T> {
    unit * unit.transpose()
}
