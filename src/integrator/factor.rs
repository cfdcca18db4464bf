//! Product rule for the integrands of the mortar matrices.
//!
//! Every integrand is a product `w f_1 f_2 ... f_n` of scalar factors, e.g. a test
//! function, a trial function and the Jacobians of the involved maps. Each factor knows its
//! value and its variation as a linear combination of derivative maps. The derivative of the
//! product is then assembled by the product rule.
use crate::derivative::DerivativeMap;
use crate::Real;

/// A scalar factor with derivative `sum_i c_i dmap_i`.
#[derive(Debug, Clone)]
pub(crate) struct Factor<'a, T> {
    value: T,
    variations: Vec<(T, &'a DerivativeMap<T>)>,
}

impl<'a, T: Real> Factor<'a, T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            variations: Vec::new(),
        }
    }

    pub fn with_variation(mut self, coefficient: T, map: &'a DerivativeMap<T>) -> Self {
        self.push_variation(coefficient, map);
        self
    }

    pub fn push_variation(&mut self, coefficient: T, map: &'a DerivativeMap<T>) {
        if !map.is_empty() {
            self.variations.push((coefficient, map));
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    /// Combines several factors into a single factor representing their product.
    pub fn product_of(factors: &[Factor<'a, T>]) -> Self {
        let mut product = Factor::new(factors.iter().fold(T::one(), |p, f| p * f.value()));
        for (i, factor) in factors.iter().enumerate() {
            let others = product_except(factors.iter(), i);
            for &(coefficient, map) in &factor.variations {
                product.variations.push((others * coefficient, map));
            }
        }
        product
    }
}

fn product_except<'b, 'a: 'b, T: Real>(factors: impl Iterator<Item = &'b Factor<'a, T>>, skip: usize) -> T {
    factors
        .enumerate()
        .filter(|&(i, _)| i != skip)
        .fold(T::one(), |p, (_, f)| p * f.value())
}

/// The value of `scale * prod_i f_i`.
pub(crate) fn product<T: Real>(scale: T, factors: &[&Factor<'_, T>]) -> T {
    factors.iter().fold(scale, |p, f| p * f.value())
}

/// Adds the derivative of `scale * prod_i f_i` to `target`.
pub(crate) fn accumulate_product_derivative<T: Real>(
    target: &mut DerivativeMap<T>,
    scale: T,
    factors: &[&Factor<'_, T>],
) {
    for (i, factor) in factors.iter().enumerate() {
        let others = scale * product_except(factors.iter().copied(), i);
        for &(coefficient, map) in &factor.variations {
            target.add_scaled(map, others * coefficient);
        }
    }
}
