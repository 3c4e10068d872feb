/// Modified Bessel function of the first kind of order zero.
///
/// Polynomial approximation with a relative error below `2e-7`.
#[allow(clippy::excessive_precision)]
pub fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 3.75 {
        let y = (x / 3.75).powi(2);

        1.0 + y
            * (3.5156229
                + y * (3.0899424
                    + y * (1.2067492 + y * (0.2659732 + y * (0.0360768 + y * 0.0045813)))))
    } else {
        let y = 3.75 / ax;

        (ax.exp() / ax.sqrt())
            * (0.39894228
                + y * (0.01328592
                    + y * (0.00225319
                        + y * (-0.00157565
                            + y * (0.00916281
                                + y * (-0.02057706
                                    + y * (0.02635537 + y * (-0.01647633 + y * 0.00392377))))))))
    }
}

/// Modified Bessel function of the second kind of order zero.
///
/// Polynomial approximation with a relative error below `2e-7`. Returns NaN for non-positive
/// arguments.
#[allow(clippy::excessive_precision)]
pub fn bessel_k0(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::NAN;
    }

    if x <= 2.0 {
        let y = x * x / 4.0;

        (-(x / 2.0).ln() * bessel_i0(x))
            + (-0.57721566
                + y * (0.42278420
                    + y * (0.23069756
                        + y * (0.3488590e-1
                            + y * (0.262698e-2 + y * (0.10750e-3 + y * 0.74e-5))))))
    } else {
        let y = 2.0 / x;

        ((-x).exp() / x.sqrt())
            * (1.25331414
                + y * (-0.7832358e-1
                    + y * (0.2189568e-1
                        + y * (-0.1062446e-1
                            + y * (0.587872e-2 + y * (-0.251540e-2 + y * 0.53208e-3))))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::relative_eq;

    #[test]
    fn test_bessel() {
        assert!(relative_eq!(bessel_i0(0.0), 1.0, max_relative = 1e-7));
        assert!(relative_eq!(bessel_i0(1.0), 1.2660658778, max_relative = 1e-6));
        assert!(relative_eq!(bessel_i0(5.0), 27.239871823, max_relative = 1e-6));

        assert!(relative_eq!(bessel_k0(0.1), 2.4270690247, max_relative = 1e-6));
        assert!(relative_eq!(bessel_k0(1.0), 0.4210244382, max_relative = 1e-6));
        assert!(relative_eq!(bessel_k0(2.0), 0.1138938727, max_relative = 1e-6));
        assert!(relative_eq!(bessel_k0(5.0), 0.0036910983, max_relative = 1e-6));
        assert!(bessel_k0(0.0).is_nan());
    }
}
