//! Mortar contact integration with consistent linearization.
//!
//! The crate integrates the mortar coupling matrices `D` and `M` and the weighted gap for a
//! pair of contact elements, and simultaneously accumulates their directional derivatives
//! with respect to all nodal displacement degrees of freedom that influence them.
//!
//! The central entry point is [`integrator::ContactIntegrator`]. Derivatives are collected in
//! a [`accumulator::LinearizationAccumulator`], and [`pass::MortarPass`] drives a whole batch
//! of element pairs, optionally in parallel.
use nalgebra::RealField;

pub mod accumulator;
pub mod derivative;
pub mod element;
pub mod error;
pub mod gauss_point;
pub mod integrator;
pub mod intcell;
pub mod linearize;
pub mod node;
pub mod normal;
pub mod overlap;
pub mod pass;
pub mod projector;
pub mod quadrature;
pub mod settings;

#[cfg(feature = "proptest")]
pub mod proptest;

pub mod optimize {
    pub use fenris_optimize::*;
}

pub extern crate nalgebra;

/// The scalar type used throughout the crate.
///
/// Used as a trait alias for the traits needed by generic routines.
pub trait Real: RealField + Copy {}

impl<T> Real for T where T: RealField + Copy {}
