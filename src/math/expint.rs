use crate::math::{
    EULER_GAMMA, FPMIN, MAX_ITERATIONS, QuadratureSettings, integrate, integrate_to_infinity,
};
use log::error;
use statrs::function::gamma::gamma;

/// Distance to the nearest integer below which an order is treated as an integer.
const INTEGER_TOL: f64 = 1e-12;

/// Distance to the nearest positive integer below which the pole of `Γ(1-p)` is removed
/// analytically from the power series.
const NEAR_INTEGER: f64 = 1e-2;

/// Riemann zeta function values `ζ(2), ..., ζ(8)`.
#[allow(clippy::excessive_precision)]
const ZETA: [f64; 7] = [
    1.644_934_066_848_226_4,
    1.202_056_903_159_594_2,
    1.082_323_233_711_138_2,
    1.036_927_755_143_369_9,
    1.017_343_061_984_449_1,
    1.008_349_277_381_922_8,
    1.004_077_356_197_944_3,
];

/// Leakage factors above which the series expansions of [`leaky_integral`] lose too many digits
/// to cancellation and adaptive quadrature is used instead.
const LARGE_LEAKAGE: f64 = 25.0;

/// Largest leakage factor `b` supported by [`leaky_integral`] and [`leaky_integral_total`],
/// `J` approaches the underflow limit of `f64` beyond.
pub const MAX_LEAKAGE: f64 = 1e4;

/// The generalized exponential integral `E_p(x) = ∫_1^∞ exp(-x t) / t^p dt` for real orders `p`
/// and non-negative arguments `x`.
///
/// For `x > 1` a continued fraction is used, otherwise a power series. `E_p(0)` is finite only
/// for `p > 1`.
pub fn expn(p: f64, x: f64) -> f64 {
    if x.is_nan() || (x < 0.0) {
        return f64::NAN;
    }

    if x == 0.0 {
        return if p > 1.0 {
            1.0 / (p - 1.0)
        } else {
            f64::INFINITY
        };
    }

    if x > 1.0 {
        return expn_continued_fraction(p, x);
    }

    let rounded = p.round();
    let offset = p - rounded;

    if (rounded >= 1.0) && (offset.abs() < INTEGER_TOL) {
        expn_series_integer(rounded as usize, x)
    } else if (rounded >= 1.0) && (offset.abs() < NEAR_INTEGER) {
        expn_series_near_integer(rounded as usize, offset, x)
    } else {
        expn_series(p, x)
    }
}

/// Continued fraction for `E_p(x)` (modified Lentz), valid for any real `p` and `x > 0`.
fn expn_continued_fraction(p: f64, x: f64) -> f64 {
    let mut b = x + p;

    if b.abs() < FPMIN {
        b = FPMIN;
    }

    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;

    for idx in 1..MAX_ITERATIONS {
        let an = -(idx as f64) * (p - 1.0 + idx as f64);

        b += 2.0;
        d = an * d + b;

        if d.abs() < FPMIN {
            d = FPMIN;
        }

        c = b + an / c;

        if c.abs() < FPMIN {
            c = FPMIN;
        }

        d = 1.0 / d;

        let del = c * d;
        h *= del;

        if (del - 1.0).abs() < f64::EPSILON {
            return h * (-x).exp();
        }
    }

    error!(
        "expn_continued_fraction has failed to converge for p={}, x={}",
        p, x
    );

    h * (-x).exp()
}

/// Power series for `E_n(x)` with a positive integer order `n`.
fn expn_series_integer(n: usize, x: f64) -> f64 {
    let nm1 = n - 1;

    let mut ans = if nm1 != 0 {
        1.0 / nm1 as f64
    } else {
        -x.ln() - EULER_GAMMA
    };

    let mut fact = 1.0;

    for idx in 1..MAX_ITERATIONS {
        fact *= -x / idx as f64;

        let del = if idx != nm1 {
            -fact / (idx as f64 - nm1 as f64)
        } else {
            let psi = (1..=nm1).fold(-EULER_GAMMA, |acc, ii| acc + 1.0 / ii as f64);

            fact * (-x.ln() + psi)
        };

        ans += del;

        if del.abs() < ans.abs() * f64::EPSILON {
            return ans;
        }
    }

    ans
}

/// Power series for `E_p(x)` with a non-integer (or non-positive) order `p`,
/// using `E_p(x) = x^(p-1) Γ(1-p) - Σ (-x)^k / (k! (1 - p + k))`.
fn expn_series(p: f64, x: f64) -> f64 {
    let mut term = 1.0;
    let mut sum = 0.0;

    for idx in 0..MAX_ITERATIONS {
        let del = term / (1.0 - p + idx as f64);
        sum += del;

        if (idx > 0) && (del.abs() < sum.abs() * f64::EPSILON) {
            break;
        }

        term *= -x / (idx + 1) as f64;
    }

    x.powf(p - 1.0) * gamma(1.0 - p) - sum
}

/// Power series for `E_p(x)` with `p = n + ε` close to a positive integer `n`.
///
/// `x^(p-1) Γ(1-p)` and the `k = n - 1` term of the series both diverge for `ε → 0`, their sum
/// `-(-x)^(n-1) / (n-1)! · expm1(ε r) / ε` with
/// `r = ln x + ln Γ(1-ε) / ε - Σ_(j=1)^(n-1) ln(1 + ε/j) / ε` does not.
fn expn_series_near_integer(n: usize, eps: f64, x: f64) -> f64 {
    let nm1 = n - 1;
    let p = n as f64 + eps;

    let mut fact = 1.0;
    let mut pole = 0.0;
    let mut sum = 0.0;

    for idx in 0..MAX_ITERATIONS {
        if idx == nm1 {
            pole = fact;
        } else {
            let del = fact / (1.0 - p + idx as f64);
            sum += del;

            if (idx > nm1) && (del.abs() < sum.abs() * f64::EPSILON) {
                break;
            }
        }

        fact *= -x / (idx + 1) as f64;
    }

    // ln Γ(1-ε) / ε = γ + Σ_(k>=2) ζ(k) ε^(k-1) / k
    let log_gamma = EULER_GAMMA
        + ZETA
            .iter()
            .enumerate()
            .rev()
            .fold(0.0, |acc, (idx, zeta)| (acc + zeta / (idx + 2) as f64) * eps);

    let harmonic = (1..=nm1)
        .map(|jdx| (eps / jdx as f64).ln_1p() / eps)
        .sum::<f64>();
    let rate = x.ln() + log_gamma - harmonic;

    -pole * (eps * rate).exp_m1() / eps - sum
}

/// Integrand of `J(ν, b, ·)` scaled by `exp(2√b)`, i.e. `y^(ν-1) exp(-(√y - √(b/y))²)`.
fn scaled_integrand(nu: f64, b: f64, y: f64) -> f64 {
    if y <= 0.0 {
        return 0.0;
    }

    let gap = y.sqrt() - (b / y).sqrt();

    ((nu - 1.0) * y.ln() - gap * gap).exp()
}

/// Location of the maximum of the integrand of `J(ν, b, ·)`.
fn integrand_mode(nu: f64, b: f64) -> f64 {
    let half = 0.5 * (nu - 1.0);

    half + (half * half + b).sqrt()
}

fn quadrature_settings() -> QuadratureSettings {
    QuadratureSettings {
        abs_tol: 0.0,
        rel_tol: 1e-12,
        max_subdivisions: 500,
    }
}

/// Evaluate `J(ν, b, τ)` (or the complete integral for `τ = ∞`) by adaptive quadrature.
///
/// Past the maximum of the integrand the complete integral minus the upper tail is used, so that
/// the peak is never lost within a single wide interval.
fn leaky_quadrature(nu: f64, b: f64, tau: f64) -> f64 {
    let settings = quadrature_settings();
    let func = |y: f64| scaled_integrand(nu, b, y);
    let mode = integrand_mode(nu, b);

    let value = if tau <= mode {
        integrate(func, 0.0, tau, &settings).value
    } else {
        let total = integrate(func, 0.0, mode, &settings).value
            + integrate_to_infinity(func, mode, &settings).value;

        if tau.is_infinite() {
            total
        } else {
            total - integrate_to_infinity(func, tau, &settings).value
        }
    };

    value * (-2.0 * b.sqrt()).exp()
}

/// The split point between the lower and upper series of [`leaky_integral`].
fn split_point(b: f64) -> f64 {
    b.sqrt().max(1.0)
}

/// `∫_0^τ y^(ν-1) exp(-y - b/y) dy` by expanding `exp(-y)`, converges well for small `τ`.
fn lower_series(nu: f64, b: f64, tau: f64) -> f64 {
    let x = b / tau;

    let mut coeff = tau.powf(nu);
    let mut sum = 0.0;

    for idx in 0..MAX_ITERATIONS {
        let del = coeff * expn(nu + idx as f64 + 1.0, x);
        sum += del;

        if (idx as f64 > tau) && (del.abs() <= sum.abs() * f64::EPSILON) {
            return sum;
        }

        coeff *= -tau / (idx + 1) as f64;
    }

    error!(
        "lower_series has failed to converge for nu={}, b={}, tau={}",
        nu, b, tau
    );

    sum
}

/// `∫_τ^∞ y^(ν-1) exp(-y - b/y) dy` by expanding `exp(-b/y)`, converges well for small `b/τ`.
fn upper_series(nu: f64, b: f64, tau: f64) -> f64 {
    let mut coeff = tau.powf(nu);
    let mut sum = 0.0;

    for idx in 0..MAX_ITERATIONS {
        let del = coeff * expn(idx as f64 + 1.0 - nu, tau);
        sum += del;

        if (idx as f64 > b / tau) && (del.abs() <= sum.abs() * f64::EPSILON) {
            return sum;
        }

        coeff *= -b / (tau * (idx + 1) as f64);
    }

    error!(
        "upper_series has failed to converge for nu={}, b={}, tau={}",
        nu, b, tau
    );

    sum
}

/// The incomplete leaky aquifer integral `J(ν, b, τ) = ∫_0^τ y^(ν-1) exp(-y - b/y) dy`.
///
/// Requires `0 < b <= MAX_LEAKAGE`, or `b = 0` together with `ν > 0` (where `J` reduces to the
/// lower incomplete gamma function). Returns zero for `τ <= 0`.
pub fn leaky_integral(nu: f64, b: f64, tau: f64) -> f64 {
    if tau <= 0.0 {
        return 0.0;
    }

    if b > LARGE_LEAKAGE {
        return leaky_quadrature(nu, b, tau);
    }

    let split = split_point(b);

    if tau <= split {
        lower_series(nu, b, tau)
    } else {
        lower_series(nu, b, split) + upper_series(nu, b, split) - upper_series(nu, b, tau)
    }
}

/// The complete leaky aquifer integral `J(ν, b, ∞) = 2 b^(ν/2) K_ν(2√b)`.
pub fn leaky_integral_total(nu: f64, b: f64) -> f64 {
    if b > LARGE_LEAKAGE {
        return leaky_quadrature(nu, b, f64::INFINITY);
    }

    let split = split_point(b);

    lower_series(nu, b, split) + upper_series(nu, b, split)
}
