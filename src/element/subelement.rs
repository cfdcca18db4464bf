use super::{ElementShape, MortarElement};
use crate::derivative::{parametric_zero, ParametricDerivative};
use crate::error::IntegrationError;
use crate::Real;
use nalgebra::Vector2;

/// A linear integration sub-element of a (possibly quadratic) parent element.
///
/// The sub-element is spanned by a subset of the parent's nodes. Its parametric domain is
/// mapped affinely (or bilinearly) into the parent's parametric domain.
#[derive(Debug, Clone, PartialEq)]
pub struct IntElement<T> {
    element: MortarElement<T>,
    parent_id: usize,
    parent_coords: Vec<Vector2<T>>,
}

impl<T: Real> IntElement<T> {
    /// Creates the sub-element of `parent` with the given shape spanned by the parent's
    /// local nodes `local_nodes`.
    pub fn new(
        parent: &MortarElement<T>,
        shape: ElementShape,
        local_nodes: &[usize],
    ) -> Result<Self, IntegrationError> {
        if !matches!(shape, ElementShape::Tri3 | ElementShape::Quad4) {
            return Err(IntegrationError::configuration(format!(
                "integration sub-elements must be linear surface elements, got {shape:?}"
            )));
        }
        if local_nodes.iter().any(|&i| i >= parent.num_nodes()) {
            return Err(IntegrationError::infeasible(format!(
                "sub-element nodes {local_nodes:?} out of bounds for element {}",
                parent.id()
            )));
        }
        let nodes = local_nodes
            .iter()
            .map(|&i| parent.nodes()[i].clone())
            .collect();
        let parent_coords = local_nodes
            .iter()
            .map(|&i| parent.shape().node_coords(i))
            .collect();
        Ok(Self {
            element: MortarElement::new(parent.id(), shape, nodes, parent.is_slave())?,
            parent_id: parent.id(),
            parent_coords,
        })
    }

    /// Splits a surface element into linear integration sub-elements.
    ///
    /// Linear elements are their own single sub-element. Tri6 is split into four Tri3,
    /// Quad8 into a central Quad4 and four corner Tri3, and Quad9 into four Quad4.
    pub fn split(parent: &MortarElement<T>) -> Result<Vec<Self>, IntegrationError> {
        use ElementShape::*;
        let parts: &[(ElementShape, &[usize])] = match parent.shape() {
            Tri3 => &[(Tri3, &[0, 1, 2])],
            Quad4 => &[(Quad4, &[0, 1, 2, 3])],
            Tri6 => &[
                (Tri3, &[0, 3, 5]),
                (Tri3, &[3, 1, 4]),
                (Tri3, &[5, 4, 2]),
                (Tri3, &[3, 4, 5]),
            ],
            Quad8 => &[
                (Tri3, &[0, 4, 7]),
                (Tri3, &[1, 5, 4]),
                (Tri3, &[2, 6, 5]),
                (Tri3, &[3, 7, 6]),
                (Quad4, &[4, 5, 6, 7]),
            ],
            Quad9 => &[
                (Quad4, &[0, 4, 8, 7]),
                (Quad4, &[4, 1, 5, 8]),
                (Quad4, &[8, 5, 2, 6]),
                (Quad4, &[7, 8, 6, 3]),
            ],
            shape => {
                return Err(IntegrationError::configuration(format!(
                    "{shape:?} elements cannot be split into integration sub-elements"
                )))
            }
        };
        parts
            .iter()
            .map(|(shape, nodes)| Self::new(parent, *shape, nodes))
            .collect()
    }

    /// The sub-element as a mortar element in its own right.
    pub fn element(&self) -> &MortarElement<T> {
        &self.element
    }

    pub fn parent_id(&self) -> usize {
        self.parent_id
    }

    /// Parametric coordinates in the parent element of the given sub-element coordinates.
    pub fn map_to_parent(&self, xi: &Vector2<T>) -> Vector2<T> {
        let values = self.element.evaluate_shape(xi).values;
        self.parent_coords
            .iter()
            .zip(values.iter())
            .fold(Vector2::zeros(), |p, (coords, &n)| p + coords * n)
    }

    /// Pushes derivatives of sub-element coordinates at `xi` forward to the parent.
    pub fn map_derivative_to_parent(
        &self,
        xi: &Vector2<T>,
        dxi: &ParametricDerivative<T>,
    ) -> ParametricDerivative<T> {
        let shapes = self.element.evaluate_shape(xi);
        let mut dparent = parametric_zero();
        for (i, coords) in self.parent_coords.iter().enumerate() {
            for (a, dparent_a) in dparent.iter_mut().enumerate() {
                for (e, dxi_e) in dxi.iter().enumerate() {
                    dparent_a.add_scaled(dxi_e, coords[a] * shapes.derivatives[(i, e)]);
                }
            }
        }
        dparent
    }
}
