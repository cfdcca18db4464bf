//! Overlap of a 2D slave and master segment pair.
use crate::element::MortarElement;
use crate::error::IntegrationError;
use crate::projector::{project_along_normal_2d, project_onto_slave_2d};
use crate::Real;
use fenris_optimize::newton::NewtonSettings;
use log::{debug, warn};
use numeric_literals::replace_float_literals;

/// Local coordinates bounding the overlap of a slave and a master line element.
///
/// The master runs in the opposite direction of the slave, so the slave start `sxia` pairs
/// with the master end `mxib` and the slave end `sxib` with the master start `mxia`. Each
/// end of the overlap is either a slave node (`sxia = -1` or `sxib = 1`) projected onto the
/// master, or a master node (`mxib = 1` or `mxia = -1`) projected onto the slave.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SegmentBounds<T> {
    pub sxia: T,
    pub sxib: T,
    pub mxia: T,
    pub mxib: T,
}

impl<T: Real> SegmentBounds<T> {
    pub fn new(sxia: T, sxib: T, mxia: T, mxib: T) -> Self {
        Self { sxia, sxib, mxia, mxib }
    }

    /// The bounds of two elements that overlap completely.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn full() -> Self {
        Self::new(-1.0, 1.0, -1.0, 1.0)
    }

    /// Fails unless all bounds lie in `[-1, 1]` and both intervals are non-empty.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn check(&self) -> Result<(), IntegrationError> {
        let in_range = |xi: T| xi >= -1.0 && xi <= 1.0;
        if !(in_range(self.sxia) && in_range(self.sxib) && in_range(self.mxia) && in_range(self.mxib)) {
            return Err(IntegrationError::infeasible(format!(
                "segment bounds {:?} outside of [-1, 1]",
                self
            )));
        }
        if self.sxia >= self.sxib || self.mxia >= self.mxib {
            return Err(IntegrationError::infeasible(format!("segment bounds {:?} are empty", self)));
        }
        Ok(())
    }

    /// Determines which element supplies each end of the overlap.
    ///
    /// Returns `(start_on_slave, end_on_slave)`. The start lies on the slave when
    /// `sxia = -1`, in which case `mxib` is free, otherwise `mxib` must equal 1 and `sxia` is
    /// free. The same holds for the end with `sxib` and `mxia`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn endpoint_sides(&self) -> Result<(bool, bool), IntegrationError> {
        if self.sxia != -1.0 && self.mxib != 1.0 {
            return Err(IntegrationError::infeasible(
                "neither sxia = -1 nor mxib = 1 at the start of the segment",
            ));
        }
        if self.sxib != 1.0 && self.mxia != -1.0 {
            return Err(IntegrationError::infeasible(
                "neither sxib = 1 nor mxia = -1 at the end of the segment",
            ));
        }
        Ok((self.sxia == -1.0, self.sxib == 1.0))
    }

    /// Maps the Gauss coordinate `eta` in `[-1, 1]` to the slave coordinate in `[sxia, sxib]`.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn slave_xi(&self, eta: T) -> T {
        0.5 * (1.0 - eta) * self.sxia + 0.5 * (1.0 + eta) * self.sxib
    }

    /// The Jacobian `d sxi / d eta` of the map from the Gauss domain to the slave segment.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn transformation_factor(&self) -> T {
        0.5 * (self.sxib - self.sxia)
    }
}

/// Computes the overlap of 2D slave and master line elements.
pub struct SegmentOverlap;

/// Slack allowed when deciding whether a projected node lies inside the opposite element.
/// Projections landing in the slack are clamped to the element end.
const INSIDE_SLACK: f64 = 1e-10;

impl SegmentOverlap {
    /// Projects the end nodes of both elements onto each other and returns the bounds of the
    /// common segment, or `None` if the elements do not overlap.
    ///
    /// Slave nodes are projected along their nodal normals, master nodes along the
    /// interpolated slave normal, so the nodal normals must be set. A node whose projection
    /// fails to converge counts as lying outside the opposite element.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn compute<T: Real>(
        slave: &MortarElement<T>,
        master: &MortarElement<T>,
        settings: &NewtonSettings<T>,
    ) -> Result<Option<SegmentBounds<T>>, IntegrationError> {
        if slave.dim() != 2 || master.dim() != 2 {
            return Err(IntegrationError::configuration("segment overlap requires 2D line elements"));
        }
        let slack: T = nalgebra::convert(INSIDE_SLACK);
        let inside = |xi: Option<T>| {
            xi.filter(|&xi| xi >= -1.0 - slack && xi <= 1.0 + slack)
                .map(|xi| xi.max(-1.0).min(1.0))
        };

        let slave_nodes = slave.nodes();
        let master_nodes = master.nodes();
        let project_slave_node = |k: usize| {
            let node = &slave_nodes[k];
            let projection = project_along_normal_2d(node.position(), node.normal(), master, settings);
            unless_failed(projection, node.id())
        };
        let project_master_node = |k: usize| {
            let node = &master_nodes[k];
            unless_failed(project_onto_slave_2d(node.position(), slave, settings), node.id())
        };
        let mxi_of_slave_start = project_slave_node(0)?;
        let mxi_of_slave_end = project_slave_node(1)?;
        let sxi_of_master_start = project_master_node(0)?;
        let sxi_of_master_end = project_master_node(1)?;

        let (sxia, mxib) = if let Some(mxib) = inside(mxi_of_slave_start) {
            (-1.0, mxib)
        } else if let Some(sxia) = inside(sxi_of_master_end) {
            (sxia, 1.0)
        } else {
            return Ok(Self::empty(slave, master));
        };
        let (sxib, mxia) = if let Some(mxia) = inside(mxi_of_slave_end) {
            (1.0, mxia)
        } else if let Some(sxib) = inside(sxi_of_master_start) {
            (sxib, -1.0)
        } else {
            return Ok(Self::empty(slave, master));
        };

        let bounds = SegmentBounds::new(sxia, sxib, mxia, mxib);
        if sxia >= sxib || mxia >= mxib {
            return Ok(Self::empty(slave, master));
        }
        debug!(
            "Overlap of slave {} and master {}: slave [{sxia}, {sxib}], master [{mxia}, {mxib}]",
            slave.id(),
            master.id()
        );
        Ok(Some(bounds))
    }

    fn empty<T: Real>(slave: &MortarElement<T>, master: &MortarElement<T>) -> Option<SegmentBounds<T>> {
        warn!("Slave {} and master {} do not overlap", slave.id(), master.id());
        None
    }
}

/// A node whose projection does not converge has no image on the opposite element.
fn unless_failed<T: Real>(
    projection: Result<T, IntegrationError>,
    node_id: usize,
) -> Result<Option<T>, IntegrationError> {
    match projection {
        Ok(xi) => Ok(Some(xi)),
        Err(IntegrationError::ProjectionFailed { element_id, error }) => {
            warn!("Projection of node {node_id} onto element {element_id} failed ({error}), treating it as outside");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
