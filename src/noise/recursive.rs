use crate::base::SeriesError;
use itertools::zip_eq;
use log::warn;
use nalgebra::{DVector, RealField};

/// The autoregressive decay factor `exp(-Δt / α)` for an elapsed time `Δt`.
///
/// A decay time scale of zero yields a factor of zero (white noise).
fn decay<T>(step: T, alpha: T) -> T
where
    T: Copy + RealField,
{
    if alpha == T::zero() {
        T::zero()
    } else {
        (-step / alpha).exp()
    }
}

/// The moving average weight `sign(β) exp(-Δt / |β|)` for an elapsed time `Δt`.
fn ma_weight<T>(step: T, beta: T) -> T
where
    T: Copy + RealField,
{
    if beta == T::zero() {
        T::zero()
    } else {
        beta.signum() * (-step / beta.abs()).exp()
    }
}

fn check_steps<T>(noise: &[T], steps: &[T]) -> Result<(), SeriesError> {
    if noise.len() != steps.len() {
        return Err(SeriesError::ShapeMismatch {
            expected: noise.len(),
            found: steps.len(),
        });
    }

    Ok(())
}

/// Generic first order recursion `r[i] = noise[i] + ma[i] + ar[i] r[i-1]`, with `r[0] = noise[0] + ma[0]`.
fn recursion<T>(
    noise: impl ExactSizeIterator<Item = T>,
    ma_terms: impl ExactSizeIterator<Item = T>,
    ar_factors: impl ExactSizeIterator<Item = T>,
) -> DVector<T>
where
    T: Copy + RealField,
{
    let mut previous: Option<T> = None;

    let values = zip_eq(zip_eq(noise, ma_terms), ar_factors)
        .map(|((innovation, ma), ar)| {
            let value = match previous {
                Some(prev) => innovation + ma + ar * prev,
                None => innovation + ma,
            };

            previous = Some(value);

            value
        })
        .collect::<Vec<T>>();

    DVector::from_vec(values)
}

/// Generate AR(1) noise for a regular time step with the per-step coefficient `phi`.
///
/// `r[0] = noise[0]` and `r[i] = noise[i] + phi · r[i-1]`. A coefficient of zero returns the
/// base noise unchanged. `|phi| >= 1` yields a non-stationary series and is not guarded against.
pub fn ar1<T>(noise: &[T], phi: T) -> DVector<T>
where
    T: Copy + RealField,
{
    recursion(
        noise.iter().copied(),
        std::iter::repeat_n(T::zero(), noise.len()),
        std::iter::repeat_n(phi, noise.len()),
    )
}

/// Generate AR(1) noise for irregular time steps with the decay time scale `alpha`.
///
/// `r[i] = noise[i] + exp(-Δt_i / α) · r[i-1]`, where `steps[i]` is the elapsed time between
/// sample `i - 1` and `i` (`steps[0]` is ignored, see [`TimeIndex::time_steps`](`crate::base::TimeIndex::time_steps`)).
/// With unit steps this equals [`ar1`] with `phi = exp(-1 / α)`.
pub fn ar1_irregular<T>(noise: &[T], steps: &[T], alpha: T) -> Result<DVector<T>, SeriesError>
where
    T: Copy + RealField,
{
    check_steps(noise, steps)?;

    Ok(ar1_steps(noise, steps, alpha))
}

/// Unchecked variant of [`ar1_irregular`], panics if the lengths of `noise` and `steps` differ.
pub(crate) fn ar1_steps<T>(noise: &[T], steps: &[T], alpha: T) -> DVector<T>
where
    T: Copy + RealField,
{
    recursion(
        noise.iter().copied(),
        std::iter::repeat_n(T::zero(), noise.len()),
        steps.iter().map(|step| decay(*step, alpha)),
    )
}

/// Generate ARMA(1,1) noise for a regular time step.
///
/// `r[0] = noise[0]` and `r[i] = noise[i] + theta · noise[i-1] + phi · r[i-1]`. With
/// `theta = 0` this reduces to [`ar1`].
pub fn arma11<T>(noise: &[T], phi: T, theta: T) -> DVector<T>
where
    T: Copy + RealField,
{
    let ma_terms = std::iter::once(T::zero()).chain(noise.iter().map(|value| theta * *value));

    recursion(
        noise.iter().copied(),
        ma_terms.take(noise.len()).collect::<Vec<T>>().into_iter(),
        std::iter::repeat_n(phi, noise.len()),
    )
}

/// Generate ARMA(1,1) noise from a base sequence of length `n + 1`.
///
/// The first entry of `noise` is the pre-sample innovation that only enters through the moving
/// average term of the first output, i.e. `r[0] = noise[1] + theta · noise[0]`. Returns `n` values.
pub fn arma11_presample<T>(noise: &[T], phi: T, theta: T) -> DVector<T>
where
    T: Copy + RealField,
{
    if noise.is_empty() {
        return DVector::from_vec(Vec::new());
    }

    let length = noise.len() - 1;

    recursion(
        noise[1..].iter().copied(),
        noise[..length].iter().map(|value| theta * *value),
        std::iter::repeat_n(phi, length),
    )
}

/// Generate ARMA(1,1) noise for irregular time steps.
///
/// The autoregressive weight is `exp(-Δt_i / α)` and the moving average weight is
/// `sign(β) exp(-Δt_i / |β|)`. The moving average weighting has not been validated for
/// non-uniform sampling, a warning is logged when the steps are not uniform.
pub fn arma11_irregular<T>(
    noise: &[T],
    steps: &[T],
    alpha: T,
    beta: T,
) -> Result<DVector<T>, SeriesError>
where
    T: Copy + RealField,
{
    check_steps(noise, steps)?;

    if let Some(first) = steps.get(1) {
        let tolerance = T::from_f64(1e-9).unwrap() * first.abs();

        if steps[1..]
            .iter()
            .any(|step| (*step - *first).abs() > tolerance)
        {
            warn!(
                "arma11_irregular: moving average weighting is not validated for non-uniform time steps"
            );
        }
    }

    Ok(arma11_steps(noise, steps, alpha, beta))
}

/// Unchecked variant of [`arma11_irregular`], panics if the lengths of `noise` and `steps` differ.
pub(crate) fn arma11_steps<T>(noise: &[T], steps: &[T], alpha: T, beta: T) -> DVector<T>
where
    T: Copy + RealField,
{
    let ma_terms = std::iter::once(T::zero()).chain(
        zip_eq(
            noise[..noise.len().saturating_sub(1)].iter(),
            steps.iter().skip(1),
        )
        .map(|(value, step)| ma_weight(*step, beta) * *value),
    );

    recursion(
        noise.iter().copied(),
        ma_terms.take(noise.len()).collect::<Vec<T>>().into_iter(),
        steps.iter().map(|step| decay(*step, alpha)),
    )
}
