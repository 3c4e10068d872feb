use crate::rfunc::{Response, ResponseError, ensure};
use serde::{Deserialize, Serialize};
use statrs::function::gamma::{gamma_lr, ln_gamma};

/// Exponential response with parameters `A, a`.
///
/// The impulse response is `A / a · exp(-t / a)`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Exponential;

impl Response for Exponential {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        ensure(self.name(), "a", params[1], params[1] > 0.0)
    }

    fn default_params(&self) -> Vec<f64> {
        vec![1.0, 10.0]
    }

    fn get_tmax(&self, params: &[f64], cutoff: f64) -> Result<f64, ResponseError> {
        self.validate(params)?;

        if !((cutoff > 0.0) && (cutoff < 1.0)) {
            return Err(ResponseError::InvalidCutoff(cutoff));
        }

        Ok(-params[1] * (1.0 - cutoff).ln())
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a] = [params[0], params[1]];

        if t < 0.0 {
            0.0
        } else {
            scale / a * (-t / a).exp()
        }
    }

    fn name(&self) -> &'static str {
        "Exponential"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["A", "a"]
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a] = [params[0], params[1]];

        if t <= 0.0 {
            0.0
        } else {
            -scale * (-t / a).exp_m1()
        }
    }
}

/// Gamma response with parameters `A, n, a`.
///
/// The impulse response is the gamma density with shape `n` and scale `a`, scaled by `A`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Gamma;

impl Response for Gamma {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        ensure(self.name(), "n", params[1], params[1] > 0.0)?;
        ensure(self.name(), "a", params[2], params[2] > 0.0)
    }

    fn default_params(&self) -> Vec<f64> {
        vec![1.0, 1.5, 10.0]
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, n, a] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            return 0.0;
        }

        scale * ((n - 1.0) * t.ln() - t / a - n * a.ln() - ln_gamma(n)).exp()
    }

    fn name(&self) -> &'static str {
        "Gamma"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["A", "n", "a"]
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, n, a] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            0.0
        } else {
            scale * gamma_lr(n, t / a)
        }
    }
}

/// Sum of two exponential responses with parameters `A, alpha, a1, a2`.
///
/// The fraction `alpha` of the gain is assigned to the response with time scale `a2`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DoubleExponential;

impl Response for DoubleExponential {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        ensure(
            self.name(),
            "alpha",
            params[1],
            (0.0..=1.0).contains(&params[1]),
        )?;
        ensure(self.name(), "a1", params[2], params[2] > 0.0)?;
        ensure(self.name(), "a2", params[3], params[3] > 0.0)
    }

    fn default_params(&self) -> Vec<f64> {
        vec![1.0, 0.1, 10.0, 100.0]
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, alpha, a1, a2] = [params[0], params[1], params[2], params[3]];

        if t < 0.0 {
            return 0.0;
        }

        scale * ((1.0 - alpha) / a1 * (-t / a1).exp() + alpha / a2 * (-t / a2).exp())
    }

    fn name(&self) -> &'static str {
        "DoubleExponential"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["A", "alpha", "a1", "a2"]
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, alpha, a1, a2] = [params[0], params[1], params[2], params[3]];

        if t <= 0.0 {
            return 0.0;
        }

        -scale * ((1.0 - alpha) * (-t / a1).exp_m1() + alpha * (-t / a2).exp_m1())
    }
}
