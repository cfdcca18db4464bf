//! Configuration of the mortar integrator.
use crate::error::IntegrationError;
use crate::Real;
use fenris_optimize::newton::NewtonSettings;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// Shape function family of the Lagrange multiplier space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeFamily {
    /// Not chosen. Every integration routine rejects this value.
    Undefined,
    /// Lagrange multipliers interpolated with the displacement trace shape functions.
    Standard,
    /// Lagrange multipliers interpolated with dual (biorthogonal) shape functions.
    Dual,
}

/// Settings shared by all integration routines.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct IntegratorSettings<T> {
    pub shape_family: ShapeFamily,
    /// Integrate `D` together with `M` in the same pass.
    pub one_loop: bool,
    /// Modify the dual basis of slave elements with nodes on the boundary of the contact zone.
    pub boundary_modification: bool,
    /// Use standard shape functions (or those of integration sub-elements) as test functions
    /// of the weighted gap, regardless of the multiplier family.
    pub petrov_galerkin: bool,
    /// Number of Gauss points on line segments.
    pub gauss_points_line: usize,
    /// Number of points of the symmetric rule on triangular cells and elements.
    pub triangle_rule_points: usize,
    /// Number of Gauss points per direction on quadrilateral elements.
    pub gauss_points_quad: usize,
    /// Tolerance of the parametric domain check for 3D projections.
    pub projection_tolerance: T,
    /// Smallest admissible length of an interpolated normal.
    pub normal_length_floor: T,
    /// Newton settings of all projections.
    pub newton: NewtonSettings<T>,
}

impl<T: Real> Default for IntegratorSettings<T> {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn default() -> Self {
        Self {
            shape_family: ShapeFamily::Undefined,
            one_loop: false,
            boundary_modification: false,
            petrov_galerkin: false,
            gauss_points_line: 5,
            triangle_rule_points: 7,
            gauss_points_quad: 3,
            projection_tolerance: 0.01,
            normal_length_floor: 1e-12,
            newton: NewtonSettings::default(),
        }
    }
}

impl<T: Real> IntegratorSettings<T> {
    pub fn with_shape_family(self, shape_family: ShapeFamily) -> Self {
        Self { shape_family, ..self }
    }

    pub fn with_one_loop(self, one_loop: bool) -> Self {
        Self { one_loop, ..self }
    }

    pub fn with_boundary_modification(self, boundary_modification: bool) -> Self {
        Self {
            boundary_modification,
            ..self
        }
    }

    pub fn with_petrov_galerkin(self, petrov_galerkin: bool) -> Self {
        Self {
            petrov_galerkin,
            ..self
        }
    }

    pub fn with_gauss_points_line(self, gauss_points_line: usize) -> Self {
        Self {
            gauss_points_line,
            ..self
        }
    }

    /// Checks the combination of options for consistency.
    ///
    /// Called before any numerical work is done.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        match self.shape_family {
            ShapeFamily::Undefined => {
                return Err(IntegrationError::configuration("shape function family is undefined"));
            }
            ShapeFamily::Standard if self.petrov_galerkin => {
                return Err(IntegrationError::configuration(
                    "Petrov-Galerkin gap requires dual shape functions",
                ));
            }
            ShapeFamily::Standard if self.boundary_modification => {
                return Err(IntegrationError::configuration(
                    "boundary modification requires dual shape functions",
                ));
            }
            _ => {}
        }

        if self.gauss_points_line == 0 || self.gauss_points_quad == 0 {
            return Err(IntegrationError::configuration("number of Gauss points must be positive"));
        }
        if self.projection_tolerance < T::zero() || self.normal_length_floor <= T::zero() {
            return Err(IntegrationError::configuration("tolerances must be positive"));
        }
        Ok(())
    }

    pub fn is_dual(&self) -> bool {
        self.shape_family == ShapeFamily::Dual
    }
}
