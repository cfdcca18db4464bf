//! Small nonlinear solvers and numerical differentiation helpers.

/// Finite-difference approximations of derivatives
pub mod calculus;
/// Newton's method for small dense nonlinear systems
pub mod newton;
