use derive_builder::Builder;
use log::debug;
use serde::{Deserialize, Serialize};

/// Gauss-Kronrod 15-point abscissae on [-1, 1] (non-negative half, descending).
#[allow(clippy::excessive_precision)]
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

/// Gauss-Kronrod 15-point weights.
#[allow(clippy::excessive_precision)]
const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

/// Gauss 7-point weights, belonging to the odd entries of [`XGK`].
#[allow(clippy::excessive_precision)]
const WG: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

/// Settings for the adaptive quadrature routines.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct QuadratureSettings {
    /// Absolute error tolerance.
    #[builder(default = 1e-10)]
    pub abs_tol: f64,

    /// Relative error tolerance.
    #[builder(default = 1e-10)]
    pub rel_tol: f64,

    /// Maximum number of interval bisections.
    #[builder(default = 500)]
    pub max_subdivisions: usize,
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self {
            abs_tol: 1e-10,
            rel_tol: 1e-10,
            max_subdivisions: 500,
        }
    }
}

/// The result of an adaptive quadrature.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Quadrature {
    /// Estimated value of the integral.
    pub value: f64,

    /// Estimated absolute error.
    pub abs_error: f64,

    /// Number of integrand evaluations.
    pub evaluations: usize,

    /// `true` if the requested tolerance was reached.
    pub converged: bool,
}

/// A sub-interval of an adaptive quadrature together with its local estimate.
#[derive(Clone, Copy, Debug)]
struct Segment {
    lower: f64,
    upper: f64,
    value: f64,
    error: f64,
}

/// Apply the 15-point Kronrod rule on `[lower, upper]`, returns the estimate and the difference
/// to the embedded 7-point Gauss rule.
fn gauss_kronrod<F>(func: &F, lower: f64, upper: f64) -> Segment
where
    F: Fn(f64) -> f64,
{
    let center = 0.5 * (lower + upper);
    let half = 0.5 * (upper - lower);

    let fc = func(center);

    let mut kronrod = fc * WGK[7];
    let mut gauss = fc * WG[3];

    for idx in 0..7 {
        let dx = half * XGK[idx];
        let pair = func(center - dx) + func(center + dx);

        kronrod += WGK[idx] * pair;

        if idx % 2 == 1 {
            gauss += WG[idx / 2] * pair;
        }
    }

    Segment {
        lower,
        upper,
        value: kronrod * half,
        error: ((kronrod - gauss) * half).abs(),
    }
}

/// Adaptively integrate `func` over the finite interval `[lower, upper]`.
///
/// The interval with the largest error estimate is repeatedly bisected until the total error
/// falls below `max(abs_tol, rel_tol * |value|)` or the subdivision limit is reached. The
/// integrand is never evaluated at the interval end points, so integrable end point
/// singularities are allowed.
pub fn integrate<F>(func: F, lower: f64, upper: f64, settings: &QuadratureSettings) -> Quadrature
where
    F: Fn(f64) -> f64,
{
    if upper == lower {
        return Quadrature {
            value: 0.0,
            abs_error: 0.0,
            evaluations: 0,
            converged: true,
        };
    }

    if upper < lower {
        let result = integrate(func, upper, lower, settings);

        return Quadrature {
            value: -result.value,
            ..result
        };
    }

    let mut segments = vec![gauss_kronrod(&func, lower, upper)];
    let mut evaluations = 15;

    let tolerance = |value: f64| settings.abs_tol.max(settings.rel_tol * value.abs());

    for _ in 0..settings.max_subdivisions {
        let value = segments.iter().map(|seg| seg.value).sum::<f64>();
        let error = segments.iter().map(|seg| seg.error).sum::<f64>();

        if error <= tolerance(value) {
            return Quadrature {
                value,
                abs_error: error,
                evaluations,
                converged: true,
            };
        }

        // Bisect the segment with the largest error estimate.
        let (worst, _) = segments
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |acc, (idx, seg)| {
                if seg.error > acc.1 {
                    (idx, seg.error)
                } else {
                    acc
                }
            });

        let seg = segments.swap_remove(worst);
        let center = 0.5 * (seg.lower + seg.upper);

        // The interval can no longer be split in floating point arithmetic.
        if (center <= seg.lower) || (center >= seg.upper) {
            segments.push(seg);
            break;
        }

        segments.push(gauss_kronrod(&func, seg.lower, center));
        segments.push(gauss_kronrod(&func, center, seg.upper));

        evaluations += 30;
    }

    let value = segments.iter().map(|seg| seg.value).sum::<f64>();
    let error = segments.iter().map(|seg| seg.error).sum::<f64>();

    debug!(
        "integrate: [{:.3e}, {:.3e}] stopped after {} evaluations (err={:.3e})",
        lower, upper, evaluations, error
    );

    Quadrature {
        value,
        abs_error: error,
        evaluations,
        converged: error <= tolerance(value),
    }
}

/// Adaptively integrate `func` over the semi-infinite interval `[lower, ∞)`.
///
/// Uses the substitution `t = lower + s / (1 - s)` which maps the interval onto `[0, 1)`.
pub fn integrate_to_infinity<F>(func: F, lower: f64, settings: &QuadratureSettings) -> Quadrature
where
    F: Fn(f64) -> f64,
{
    integrate(
        |s: f64| {
            let denom = 1.0 - s;
            let value = func(lower + s / denom) / (denom * denom);

            // The transformed integrand must vanish at the end of the mapped interval.
            if value.is_finite() { value } else { 0.0 }
        },
        0.0,
        1.0,
        settings,
    )
}
