use crate::{
    base::SeriesError,
    math::{QuadratureSettings, integrate, integrate_to_infinity},
    rfunc::{Response, ResponseError, ResponseFunction},
    stats::{max_abs_error, rmse},
};
use derive_builder::Builder;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::{io::Write, path::Path, time::Instant};
use thiserror::Error;

/// Errors associated with response validation.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid validation setting {name}={value}")]
    InvalidSetting { name: &'static str, value: f64 },
    #[error("failed to read or write file")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize json5")]
    Json5(#[from] serde_json5::Error),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// Settings of the response integrator.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Absolute error tolerance of the quadrature on each window.
    #[builder(default = 1e-10)]
    pub abs_tol: f64,

    /// Fraction of the gain that determines the time horizon `tmax`.
    #[builder(default = 0.999)]
    pub cutoff: f64,

    /// Time step of the comparison grid.
    #[builder(default = 1.0)]
    pub dt: f64,

    /// Maximum number of interval bisections of the quadrature on each window.
    #[builder(default = 100)]
    pub max_depth: usize,

    /// Relative error tolerance of the quadrature on each window.
    #[builder(default = 1e-8)]
    pub rel_tol: f64,

    /// Lower integration bound of the windows, the impulse response is assumed to vanish below.
    /// Unit gain impulse responses are still normalized over `[0, ∞)`.
    #[builder(default = 0.0)]
    pub t_min: f64,

    /// Accepted maximum deviation, relative to the largest absolute step response value.
    #[builder(default = 1e-3)]
    pub tolerance: f64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            abs_tol: 1e-10,
            cutoff: 0.999,
            dt: 1.0,
            max_depth: 100,
            rel_tol: 1e-8,
            t_min: 0.0,
            tolerance: 1e-3,
        }
    }
}

impl ValidationSettings {
    /// Check the settings for consistency.
    pub fn check(&self) -> Result<(), ValidationError> {
        let checks = [
            ("abs_tol", self.abs_tol, self.abs_tol >= 0.0),
            ("dt", self.dt, self.dt > 0.0),
            ("rel_tol", self.rel_tol, self.rel_tol >= 0.0),
            ("t_min", self.t_min, self.t_min >= 0.0),
            ("tolerance", self.tolerance, self.tolerance > 0.0),
        ];

        for (name, value, valid) in checks {
            if !(valid && value.is_finite()) {
                return Err(ValidationError::InvalidSetting { name, value });
            }
        }

        if !((self.cutoff > 0.0) && (self.cutoff < 1.0)) {
            return Err(ResponseError::InvalidCutoff(self.cutoff).into());
        }

        Ok(())
    }

    /// Load settings from a JSON5 file, missing fields take their default values.
    pub fn from_json5<P: AsRef<Path>>(path: P) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)?;

        Ok(serde_json5::from_str(&content)?)
    }

    /// The quadrature settings for a single window.
    pub fn quadrature(&self) -> QuadratureSettings {
        QuadratureSettings {
            abs_tol: self.abs_tol,
            rel_tol: self.rel_tol,
            max_subdivisions: self.max_depth,
        }
    }
}

/// A non-fatal record of a quadrature that did not reach the requested tolerance.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct QuadratureWarning {
    /// Lower integration bound.
    pub lower: f64,

    /// Upper integration bound, infinite for the normalization integral.
    pub upper: f64,

    /// The best available estimate of the integral.
    pub estimate: f64,

    /// The estimated absolute error.
    pub abs_error: f64,
}

/// The analytic and the numerically integrated step response of a family on a common grid.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResponseComparison {
    /// Name of the response family.
    pub family: String,

    /// Parameter vector.
    pub params: Vec<f64>,

    /// The comparison grid `t_k = k dt`.
    pub time: Vec<f64>,

    /// Analytic step response.
    pub analytic: Vec<f64>,

    /// Numerically integrated step response.
    pub numerical: Vec<f64>,

    /// Windows whose quadrature has not converged.
    pub warnings: Vec<QuadratureWarning>,
}

impl ResponseComparison {
    /// Returns `true` if the relative error does not exceed `tolerance`.
    pub fn passes(&self, tolerance: f64) -> bool {
        matches!(self.relative_error(), Ok(error) if error <= tolerance)
    }

    /// The largest absolute deviation between the numerical and the analytic step response.
    pub fn max_abs_error(&self) -> Result<f64, SeriesError> {
        max_abs_error(&self.numerical, &self.analytic)
    }

    /// The largest absolute deviation relative to the largest absolute analytic step response.
    ///
    /// Falls back to the absolute deviation if the analytic step response vanishes.
    pub fn relative_error(&self) -> Result<f64, SeriesError> {
        let error = self.max_abs_error()?;
        let scale = self
            .analytic
            .iter()
            .fold(0.0f64, |acc, value| acc.max(value.abs()));

        if scale > 0.0 {
            Ok(error / scale)
        } else {
            Ok(error)
        }
    }

    /// The root mean square deviation between the numerical and the analytic step response.
    pub fn rmse(&self) -> Result<f64, SeriesError> {
        rmse(&self.numerical, &self.analytic)
    }

    /// Serialize the comparison to a JSON5 file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ValidationError> {
        let mut file = std::fs::File::create(path)?;

        file.write_all(serde_json5::to_string(&self)?.as_bytes())?;

        Ok(())
    }
}

/// Compare the analytic step response of `rfunc` with the cumulative adaptive quadrature of its
/// impulse response.
pub fn validate_response(
    rfunc: &ResponseFunction,
    params: &[f64],
    settings: &ValidationSettings,
) -> Result<ResponseComparison, ValidationError> {
    let start = Instant::now();

    settings.check()?;

    let tmax = rfunc.get_tmax(params, settings.cutoff)?;
    let quadrature = settings.quadrature();

    let length = ((tmax / settings.dt).ceil() as usize).max(1);
    let time = (0..length)
        .map(|idx| idx as f64 * settings.dt)
        .collect::<Vec<f64>>();

    let analytic = time
        .iter()
        .map(|t| rfunc.step(*t, params))
        .collect::<Vec<f64>>();

    let mut warnings = Vec::new();
    let mut evaluations = 0;

    // Unit gain impulse responses are normalized over their whole support, with a purely
    // relative tolerance as their scale is arbitrary.
    let scale = if rfunc.unit_gain_impulse() {
        let result = integrate_to_infinity(
            |t| rfunc.impulse(t, params),
            0.0,
            &QuadratureSettings {
                abs_tol: 0.0,
                ..quadrature
            },
        );

        if !result.converged {
            warn!(
                "validate_response: {} normalization has not converged (abs_error={:.3e})",
                rfunc.name(),
                result.abs_error
            );

            warnings.push(QuadratureWarning {
                lower: 0.0,
                upper: f64::INFINITY,
                estimate: result.value,
                abs_error: result.abs_error,
            });
        }

        evaluations += result.evaluations;

        rfunc.gain(params) / result.value
    } else {
        1.0
    };

    let mut cumulative = 0.0;

    let mut numerical = Vec::with_capacity(length);
    numerical.push(0.0);

    for window in time.windows(2) {
        let lower = window[0].max(settings.t_min);
        let upper = window[1];

        if upper > lower {
            let result = integrate(
                |t| scale * rfunc.impulse(t, params),
                lower,
                upper,
                &quadrature,
            );

            if !result.converged {
                warn!(
                    "validate_response: {} quadrature has not converged on [{:.3}, {:.3}] (abs_error={:.3e})",
                    rfunc.name(),
                    lower,
                    upper,
                    result.abs_error
                );

                warnings.push(QuadratureWarning {
                    lower,
                    upper,
                    estimate: result.value,
                    abs_error: result.abs_error,
                });
            }

            evaluations += result.evaluations;
            cumulative += result.value;
        }

        numerical.push(cumulative);
    }

    debug!(
        "validate_response: {} over {} windows ({} evaluations) in {:.2} sec",
        rfunc.name(),
        length,
        evaluations,
        start.elapsed().as_millis() as f64 / 1e3
    );

    Ok(ResponseComparison {
        family: rfunc.name().to_string(),
        params: params.to_vec(),
        time,
        analytic,
        numerical,
        warnings,
    })
}

/// Validate several response families in parallel, each one independently.
///
/// The results are returned in the order of `cases`.
pub fn validate_all(
    cases: &[(ResponseFunction, Vec<f64>)],
    settings: &ValidationSettings,
) -> Vec<Result<ResponseComparison, ValidationError>> {
    let start = Instant::now();

    let results = cases
        .par_iter()
        .map(|(rfunc, params)| validate_response(rfunc, params, settings))
        .collect::<Vec<_>>();

    debug!(
        "validate_all: {} families in {:.2} sec",
        cases.len(),
        start.elapsed().as_millis() as f64 / 1e3
    );

    results
}
