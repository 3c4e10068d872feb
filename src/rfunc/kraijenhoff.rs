use crate::rfunc::{Response, ResponseError, ensure};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Kraijenhoff van de Leur response for a strip shaped aquifer between two parallel drains,
/// with parameters `A, a, b`.
///
/// `a` is the drainage resistance time scale and `b` the relative distance of the observation
/// point from the center of the strip, `0 <= b < 0.5`. Both responses are evaluated as a
/// truncated Fourier series with at least `terms` terms. Close to the drains the series converges
/// slowly, the number of terms is raised until the truncation error of the step response is
/// below [`TRUNCATION_ERROR`] times the gain.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Kraijenhoff {
    /// Minimum number of series terms.
    #[serde(default = "default_terms")]
    pub terms: usize,
}

/// Upper bound of the truncation error of the step response, relative to the gain.
pub const TRUNCATION_ERROR: f64 = 1e-4;

/// Exponents `m² t / a` beyond which the remaining series terms are negligible.
const DECAY_LIMIT: f64 = 50.0;

fn default_terms() -> usize {
    10
}

impl Default for Kraijenhoff {
    fn default() -> Self {
        Self {
            terms: default_terms(),
        }
    }
}

impl Kraijenhoff {
    /// Evaluates `Σ (-1)^k cos((2k+1)πb) exp(-(2k+1)² t/a) / (2k+1)^power`.
    fn series(&self, t: f64, a: f64, b: f64, power: i32) -> f64 {
        (0..self.terms_for(b))
            .map(|k| (2 * k + 1) as f64)
            .take_while(|m| m * m * t / a <= DECAY_LIMIT)
            .enumerate()
            .map(|(k, m)| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };

                sign * (m * PI * b).cos() * (-m * m * t / a).exp() / m.powi(power)
            })
            .sum()
    }

    /// Number of terms such that the truncated tail of the step series stays below
    /// [`TRUNCATION_ERROR`].
    ///
    /// The tail `Σ_(k>=K) |cos(mπb)| / m³` is bounded by `1 / (16 K²)` and, using
    /// `|cos(mπb)| <= mπ (1/2 - b)`, by `π (1/2 - b) / (4K)`.
    fn terms_for(&self, b: f64) -> usize {
        let prefactor = Self::prefactor(b);

        let cubic = (prefactor / (16.0 * TRUNCATION_ERROR)).sqrt();
        let linear = prefactor * PI * (0.5 - b) / (4.0 * TRUNCATION_ERROR);

        self.terms.max(cubic.min(linear).ceil() as usize)
    }

    fn prefactor(b: f64) -> f64 {
        8.0 / (PI.powi(3) * (0.25 - b * b))
    }
}

impl Response for Kraijenhoff {
    fn check_domain(&self, params: &[f64]) -> Result<(), ResponseError> {
        ensure(self.name(), "a", params[1], params[1] > 0.0)?;
        ensure(
            self.name(),
            "b",
            params[2],
            (0.0..0.5).contains(&params[2]),
        )
    }

    fn default_params(&self) -> Vec<f64> {
        vec![1.0, 10.0, 0.1]
    }

    fn impulse(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a, b] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            return 0.0;
        }

        scale * Self::prefactor(b) / a * self.series(t, a, b, 1)
    }

    fn name(&self) -> &'static str {
        "Kraijenhoff"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["A", "a", "b"]
    }

    fn step(&self, t: f64, params: &[f64]) -> f64 {
        let [scale, a, b] = [params[0], params[1], params[2]];

        if t <= 0.0 {
            return 0.0;
        }

        scale * (1.0 - Self::prefactor(b) * self.series(t, a, b, 3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{abs_diff_eq, relative_eq};

    #[test]
    fn test_kraijenhoff() {
        let rfunc = Kraijenhoff::default();
        let params = [5.0, 10.0, 0.25];

        assert!(rfunc.terms == 10);
        assert!(rfunc.step(0.0, &params) == 0.0);
        assert!(rfunc.impulse(0.0, &params) == 0.0);

        // The truncated series nearly vanishes at the start.
        assert!(abs_diff_eq!(
            rfunc.step(1e-12, &params),
            0.0,
            epsilon = 5.0 * TRUNCATION_ERROR
        ));

        assert!(relative_eq!(
            rfunc.step(1e3, &params),
            5.0,
            max_relative = 1e-12
        ));

        // Late time behaviour is dominated by the first term.
        let t = 20.0;
        let first = 5.0 * Kraijenhoff::prefactor(0.25) / 10.0 * (0.25 * PI).cos() * (-2.0f64).exp();

        assert!(relative_eq!(rfunc.impulse(t, &params), first, max_relative = 1e-6));

        let precise = Kraijenhoff { terms: 200 };

        assert!(abs_diff_eq!(precise.step(1e-12, &params), 0.0, epsilon = 1e-4));

        assert!(rfunc.validate(&[1.0, 10.0, 0.5]).is_err());
    }

    #[test]
    fn test_kraijenhoff_near_drain() {
        let rfunc = Kraijenhoff::default();

        assert!(rfunc.terms_for(0.25) >= rfunc.terms);
        assert!(rfunc.terms_for(0.49) > rfunc.terms_for(0.25));
        assert!(rfunc.terms_for(0.4999) < 3000);

        for b in [0.45, 0.49, 0.4999] {
            let params = [1.0, 10.0, b];

            assert!(abs_diff_eq!(rfunc.step(1e-12, &params), 0.0, epsilon = TRUNCATION_ERROR));
            assert!(relative_eq!(rfunc.step(1e3, &params), 1.0, max_relative = 1e-12));
        }
    }
}
