//! Responses of leaky aquifer systems.
//!
//! All three families are built upon the integrand `t^(ν-1) exp(-t/a - ab/t)` and their step
//! responses are expressed through the incomplete leaky aquifer integral
//! [`leaky_integral`](`crate::math::leaky_integral`) `J(ν, b, t/a)`.

use crate::{
    math::{MAX_LEAKAGE, bessel_k0, leaky_integral, leaky_integral_total},
    rfunc::{Response, ResponseError, ensure},
};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use std::f64::consts::PI;

/// Hantush well function response with parameters `A, a, b`.
///
/// The impulse response is `A / (2 K0(2√b) t) · exp(-t/a - ab/t)`, the step response is the
/// normalized incomplete leaky aquifer integral `A J(0, b, t/a) / (2 K0(2√b))`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Hantush;

impl Hantush {
    fn total(b: f64) -> f64 {
        2.0 * bessel_k0(2.0 * b.sqrt())
    }
}

impl Response for Hantush {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        ensure(self.name(), "a", params[1], params[1] > 0.0)?;
        ensure(
            self.name(),
            "b",
            params[2],
            (params[2] > 0.0) && (params[2] <= MAX_LEAKAGE),
        )
    }

    fn default_params(&self) -> Vec<f64> {
        vec![1.0, 10.0, 1.0]
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a, b] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            return 0.0;
        }

        scale / (t * Self::total(b)) * (-t / a - a * b / t).exp()
    }

    fn name(&self) -> &'static str {
        "Hantush"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["A", "a", "b"]
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a, b] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            return 0.0;
        }

        scale * leaky_integral(0.0, b, t / a) / Self::total(b)
    }
}

/// Polder response for a river in contact with a leaky aquifer, with parameters `A, a, b`.
///
/// The gain is reduced by the leakage to `A exp(-2√b)`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Polder;

impl Response for Polder {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        ensure(self.name(), "a", params[1], params[1] > 0.0)?;
        ensure(self.name(), "b", params[2], params[2] > 0.0)
    }

    fn default_params(&self) -> Vec<f64> {
        vec![1.0, 10.0, 1.0]
    }

    fn gain(&self, params: &[f64]) -> f64 {
        params[0] * (-2.0 * params[2].sqrt()).exp()
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a, b] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            return 0.0;
        }

        scale * (a * b / PI).sqrt() * t.powf(-1.5) * (-t / a - a * b / t).exp()
    }

    fn name(&self) -> &'static str {
        "Polder"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["A", "a", "b"]
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a, b] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            return 0.0;
        }

        let x = b.sqrt();
        let y = (t / a).sqrt();

        // Closed form of √(b/π) J(-1/2, b, t/a).
        0.5 * scale * ((2.0 * x).exp() * erfc(x / y + y) + (-2.0 * x).exp() * erfc(x / y - y))
    }
}

/// Four parameter response with parameters `A, n, a, b`.
///
/// Generalizes both the [`Gamma`](`crate::rfunc::Gamma`) (`b = 0`) and the [`Hantush`] (`n = 0`)
/// responses. The impulse response `t^(n-1) exp(-t/a - ab/t)` is only known up to its
/// normalization, the step response is normalized to the gain `A`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FourParam;

impl Response for FourParam {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        ensure(self.name(), "a", params[2], params[2] > 0.0)?;
        ensure(
            self.name(),
            "b",
            params[3],
            (params[3] >= 0.0) && (params[3] <= MAX_LEAKAGE),
        )?;

        // Without leakage the integrand is only integrable for a positive shape.
        if params[3] == 0.0 {
            ensure(self.name(), "n", params[1], params[1] > 0.0)?;
        }

        Ok(())
    }

    fn default_params(&self) -> Vec<f64> {
        vec![1.0, 1.0, 10.0, 1.0]
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        let [n, a, b] = [params[1], params[2], params[3]];

        if t <= 0.0 {
            return 0.0;
        }

        ((n - 1.0) * t.ln() - t / a - a * b / t).exp()
    }

    fn name(&self) -> &'static str {
        "FourParam"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["A", "n", "a", "b"]
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, n, a, b] = [params[0], params[1], params[2], params[3]];

        if t <= 0.0 {
            return 0.0;
        }

        scale * leaky_integral(n, b, t / a) / leaky_integral_total(n, b)
    }

    fn unit_gain_impulse(&self) -> bool {
        true
    }
}
