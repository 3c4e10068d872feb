//! Special functions and numerical integration routines.
//!
//! All routines operate on `f64`, the response functions are evaluated far into their tails
//! where single precision is not sufficient.
//!
//! # Leaky Aquifer Integral
//!
//! The Hantush, Polder and four parameter response functions share the incomplete integral
//!
//! `J(ν, b, τ) = ∫_0^τ y^(ν-1) exp(-y - b/y) dy`
//!
//! which is evaluated by [`leaky_integral`] using two convergent series in terms of the
//! generalized exponential integral [`expn`]. Both series are alternating and cancel by about
//! `exp(2√b)`, for large leakage factors `b` the integral is computed by adaptive quadrature
//! instead. The gamma and error functions are taken from [`statrs`].

mod bessel;
mod expint;
mod quad;

pub use bessel::{bessel_i0, bessel_k0};
pub use expint::{MAX_LEAKAGE, expn, leaky_integral, leaky_integral_total};
pub use quad::*;

/// Euler-Mascheroni constant.
pub(crate) const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Smallest representable number used as a guard in continued fraction evaluations.
pub(crate) const FPMIN: f64 = f64::MIN_POSITIVE / f64::EPSILON;

/// Maximum number of iterations for series and continued fraction evaluations.
pub(crate) const MAX_ITERATIONS: usize = 500;
