//! # Validation methods.
//!
//! The response integrator checks the analytic step response of a
//! [`ResponseFunction`](`crate::rfunc::ResponseFunction`) against the adaptive quadrature of its
//! impulse response:
//!
//! 1. The time horizon `tmax` is determined from the family's
//!    [`get_tmax`](`crate::rfunc::Response::get_tmax`) with the configured cutoff.
//! 2. The impulse response is integrated over the successive windows `[t_(k-1), t_k]` of the
//!    regular grid `t_k = k dt < tmax`, and the window integrals are accumulated into the
//!    numerical step response.
//! 3. Families whose impulse response is only known for a unit gain have the numerical step
//!    response rescaled by `gain / ∫_0^∞ impulse`.
//!
//! Windows whose quadrature fails to converge are recorded as [`QuadratureWarning`]s, they
//! never abort a validation. All settings are gathered in [`ValidationSettings`].

mod validate;

pub use validate::*;
