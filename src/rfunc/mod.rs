//! # Response function families.
//!
//! Every family implements the [`Response`] trait, which provides the impulse response, the
//! analytic step response, the gain and the effective time horizon (`tmax`) for a positional
//! parameter vector. All families are summarized within the [`ResponseFunction`] ADT.
//!
//! Parameters are interpreted positionally, the first parameter is always the scaling factor `A`:
//!
//! | Family | Parameters |
//! |---|---|
//! | [`Exponential`] | `A, a` |
//! | [`Gamma`] | `A, n, a` |
//! | [`DoubleExponential`] | `A, alpha, a1, a2` |
//! | [`Hantush`] | `A, a, b` |
//! | [`Polder`] | `A, a, b` |
//! | [`FourParam`] | `A, n, a, b` |
//! | [`Kraijenhoff`] | `A, a, b` |
//!
//! The pointwise functions [`impulse`](`Response::impulse`) and [`step`](`Response::step`) do not
//! validate their parameters, use [`validate`](`Response::validate`) once beforehand.

mod kraijenhoff;
mod leaky;
mod simple;

pub use kraijenhoff::*;
pub use leaky::*;
pub use simple::*;

use crate::base::{SeriesError, TimeIndex, TimeSeries};
use log::error;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors associated with response functions.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("cutoff must be within (0, 1), found {0}")]
    InvalidCutoff(f64),
    #[error("invalid value for parameter {name} of the {family} response: {value}")]
    InvalidParameter {
        family: &'static str,
        name: &'static str,
        value: f64,
    },
    #[error("the {family} response expects {expected} parameters but {found} were given")]
    ParameterCount {
        family: &'static str,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error("failed to find tmax for the {family} response below t={limit:.3e}")]
    TmaxNotFound { family: &'static str, limit: f64 },
}

/// Largest time horizon that is searched for by [`Response::get_tmax`].
const TMAX_LIMIT: f64 = 1e12;

/// Returns an error if the condition `valid` does not hold for the parameter `name`.
pub(crate) fn ensure(
    family: &'static str,
    name: &'static str,
    value: f64,
    valid: bool,
) -> Result<(), ResponseError> {
    if valid {
        Ok(())
    } else {
        Err(ResponseError::InvalidParameter {
            family,
            name,
            value,
        })
    }
}

/// A trait that is shared by all response function families.
pub trait Response {
    /// Check family specific parameter constraints, the parameter count is already validated.
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError>;

    /// Returns a typical parameter vector.
    fn default_params(&self) -> Vec<f64>;

    /// Returns the steady state value of the step response.
    fn gain(&self, params: &[f64]) -> f64 {
        params[0]
    }

    /// Returns the time after which the step response has reached the fraction `cutoff` of
    /// its gain.
    fn get_tmax(&self, params: &[f64], cutoff: f64) -> Result<f64, ResponseError> {
        self.validate(params)?;

        if !((cutoff > 0.0) && (cutoff < 1.0)) {
            return Err(ResponseError::InvalidCutoff(cutoff));
        }

        // The step response is linear in the scaling factor.
        let mut unit = params.to_vec();
        unit[0] = 1.0;

        let gain = self.gain(&unit);
        let fraction = |t: f64| self.step(t, &unit) / gain;

        let mut upper = 1.0;

        while fraction(upper) < cutoff {
            upper *= 2.0;

            if upper > TMAX_LIMIT {
                error!(
                    "{}::get_tmax has failed to bracket the cutoff {} for params={:?}",
                    self.name(),
                    cutoff,
                    params
                );

                return Err(ResponseError::TmaxNotFound {
                    family: self.name(),
                    limit: TMAX_LIMIT,
                });
            }
        }

        let mut lower = 0.0;

        while (upper - lower) > 1e-10 * upper {
            let center = 0.5 * (lower + upper);

            if fraction(center) < cutoff {
                lower = center;
            } else {
                upper = center;
            }
        }

        Ok(upper)
    }

    /// Evaluate the impulse response at time `t`.
    fn impulse(&self, t: f64, params: &[f64]) -> f64;

    /// Returns the name of the family.
    fn name(&self) -> &'static str;

    /// Returns the names of the parameters, in positional order.
    fn param_names(&self) -> &'static [&'static str];

    /// Evaluate the analytic step response at time `t`.
    fn step(&self, t: f64, params: &[f64]) -> f64;

    /// Evaluate the step response on the regular grid `0, dt, 2 dt, ...` up to (excluding) `tmax`.
    fn step_series(
        &self,
        params: &[f64],
        dt: f64,
        cutoff: f64,
    ) -> Result<TimeSeries<f64>, ResponseError> {
        let tmax = self.get_tmax(params, cutoff)?;

        if !(dt > 0.0) {
            return Err(ResponseError::InvalidParameter {
                family: self.name(),
                name: "dt",
                value: dt,
            });
        }

        let index = TimeIndex::regular(0.0, dt, (tmax / dt).ceil() as usize)?;
        let values = DVector::from_iterator(
            index.len(),
            index.iter().map(|t| self.step(*t, params)),
        );

        Ok(TimeSeries::new(index, values)?)
    }

    /// Returns `true` if the impulse response is only defined for a unit gain, its integral then
    /// has to be normalized by the total integral over `[0, ∞)`.
    fn unit_gain_impulse(&self) -> bool {
        false
    }

    /// Validate a parameter vector.
    fn validate(&self, params: &[f64]) -> Result<(), ResponseError> {
        let names = self.param_names();

        if params.len() != names.len() {
            return Err(ResponseError::ParameterCount {
                family: self.name(),
                expected: names.len(),
                found: params.len(),
            });
        }

        for (name, value) in names.iter().zip(params) {
            ensure(self.name(), *name, *value, value.is_finite())?;
        }

        self.check_domain(params)
    }
}

/// An algebraic data type for response function families.
#[allow(missing_docs)]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "content")]
pub enum ResponseFunction {
    DoubleExponential(DoubleExponential),
    Exponential(Exponential),
    FourParam(FourParam),
    Gamma(Gamma),
    Hantush(Hantush),
    Kraijenhoff(Kraijenhoff),
    Polder(Polder),
}

impl ResponseFunction {
    /// Returns all response function families with their default settings.
    pub fn all() -> Vec<Self> {
        vec![
            ResponseFunction::DoubleExponential(DoubleExponential),
            ResponseFunction::Exponential(Exponential),
            ResponseFunction::FourParam(FourParam),
            ResponseFunction::Gamma(Gamma),
            ResponseFunction::Hantush(Hantush),
            ResponseFunction::Kraijenhoff(Kraijenhoff::default()),
            ResponseFunction::Polder(Polder),
        ]
    }
}

/// Forwards a [`Response`] method call to the wrapped family.
macro_rules! dispatch {
    ($self: expr, $rfunc: ident => $call: expr) => {
        match $self {
            ResponseFunction::DoubleExponential($rfunc) => $call,
            ResponseFunction::Exponential($rfunc) => $call,
            ResponseFunction::FourParam($rfunc) => $call,
            ResponseFunction::Gamma($rfunc) => $call,
            ResponseFunction::Hantush($rfunc) => $call,
            ResponseFunction::Kraijenhoff($rfunc) => $call,
            ResponseFunction::Polder($rfunc) => $call,
        }
    };
}

impl Response for ResponseFunction {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        dispatch!(self, rfunc => rfunc.check_domain(params))
    }

    fn default_params(&self) -> Vec<f64> {
        dispatch!(self, rfunc => rfunc.default_params())
    }

    fn gain(&self, params: &[f64]) -> f64 {
        dispatch!(self, rfunc => rfunc.gain(params))
    }

    fn get_tmax(&self, params: &[f64], cutoff: f64) -> Result<f64, ResponseError> {
        dispatch!(self, rfunc => rfunc.get_tmax(params, cutoff))
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        dispatch!(self, rfunc => rfunc.impulse(t, params))
    }

    fn name(&self) -> &'static str {
        dispatch!(self, rfunc => rfunc.name())
    }

    fn param_names(&self) -> &'static [&'static str] {
        dispatch!(self, rfunc => rfunc.param_names())
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        dispatch!(self, rfunc => rfunc.step(t, params))
    }

    fn unit_gain_impulse(&self) -> bool {
        dispatch!(self, rfunc => rfunc.unit_gain_impulse())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::relative_eq;

    #[test]
    fn test_validate() {
        let rfunc = ResponseFunction::Gamma(Gamma);

        assert!(rfunc.validate(&[1.0, 1.5, 10.0]).is_ok());
        assert!(
            rfunc.validate(&[1.0, 1.5]).unwrap_err()
                == ResponseError::ParameterCount {
                    family: "Gamma",
                    expected: 3,
                    found: 2
                }
        );
        assert!(
            rfunc.validate(&[1.0, 1.5, -10.0]).unwrap_err()
                == ResponseError::InvalidParameter {
                    family: "Gamma",
                    name: "a",
                    value: -10.0
                }
        );
        assert!(matches!(
            rfunc.validate(&[f64::NAN, 1.5, 10.0]),
            Err(ResponseError::InvalidParameter { name: "A", .. })
        ));

        for rfunc in ResponseFunction::all() {
            assert!(rfunc.validate(&rfunc.default_params()).is_ok());
            assert!(rfunc.param_names().len() == rfunc.default_params().len());
        }
    }

    #[test]
    fn test_get_tmax() {
        let rfunc = ResponseFunction::Gamma(Gamma);
        let params = [2.0, 1.5, 10.0];

        let tmax = rfunc.get_tmax(&params, 0.99).unwrap();

        assert!(relative_eq!(
            rfunc.step(tmax, &params) / rfunc.gain(&params),
            0.99,
            max_relative = 1e-8
        ));

        assert!(rfunc.get_tmax(&params, 1.0).unwrap_err() == ResponseError::InvalidCutoff(1.0));

        for rfunc in ResponseFunction::all() {
            let params = rfunc.default_params();
            let tmax = rfunc.get_tmax(&params, 0.999).unwrap();

            assert!(tmax > 0.0);
            assert!(rfunc.step(tmax, &params) / rfunc.gain(&params) >= 0.999 - 1e-6);
        }
    }

    #[test]
    fn test_step_series() {
        let rfunc = ResponseFunction::Exponential(Exponential);
        let params = [1.0, 10.0];

        let series = rfunc.step_series(&params, 1.0, 0.99).unwrap();
        let tmax = rfunc.get_tmax(&params, 0.99).unwrap();

        assert!(series.len() == tmax.ceil() as usize);
        assert!(series.values()[0] == 0.0);
        assert!(relative_eq!(
            series.values()[10],
            1.0 - (-1.0f64).exp(),
            max_relative = 1e-12
        ));

        assert!(matches!(
            rfunc.step_series(&params, 0.0, 0.99),
            Err(ResponseError::InvalidParameter { name: "dt", .. })
        ));
    }

    #[test]
    fn test_serde() {
        let rfunc = ResponseFunction::Kraijenhoff(Kraijenhoff { terms: 20 });

        let json = serde_json5::to_string(&rfunc).unwrap();
        let other = serde_json5::from_str::<ResponseFunction>(&json).unwrap();

        assert!(rfunc == other);
    }
}
