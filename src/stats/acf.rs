use crate::base::{SeriesError, TimeSeries};
use log::debug;

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn check_finite(data: &[f64]) -> Result<(), SeriesError> {
    if data.is_empty() {
        return Err(SeriesError::Empty);
    }

    match data.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(SeriesError::NonFinite { index }),
        None => Ok(()),
    }
}

/// The sample autocorrelation function of a regularly sampled sequence for the lags
/// `0, 1, ..., max_lag`.
///
/// Uses the biased estimator `c_j = 1/n Σ (x_t - m)(x_(t-j) - m)` and returns `c_j / c_0`.
/// Lags beyond the length of the sequence are omitted. A constant sequence has a vanishing
/// autocorrelation for all positive lags.
pub fn acf(data: &[f64], max_lag: usize) -> Result<Vec<f64>, SeriesError> {
    check_finite(data)?;

    let n = data.len();
    let m = mean(data);

    let autocov = (0..=max_lag.min(n - 1))
        .map(|lag| {
            data[lag..]
                .iter()
                .zip(data)
                .map(|(x_t, x_t_min_j)| (x_t - m) * (x_t_min_j - m))
                .sum::<f64>()
                / n as f64
        })
        .collect::<Vec<f64>>();

    let variance = autocov[0];

    Ok(autocov
        .iter()
        .enumerate()
        .map(|(lag, value)| match (lag, variance > 0.0) {
            (0, _) => 1.0,
            (_, true) => value / variance,
            (_, false) => 0.0,
        })
        .collect())
}

/// The autocorrelation function of an irregularly sampled series at the given `lags`.
///
/// The series is standardized and, for every lag, the products of all pairs of samples whose time
/// difference lies within `lag ± bin_width / 2` are averaged. A lag of zero always yields one,
/// lags without any matching pair yield NaN.
pub fn binned_acf(
    series: &TimeSeries<f64>,
    lags: &[f64],
    bin_width: f64,
) -> Result<Vec<f64>, SeriesError> {
    let values = series.values().as_slice();

    check_finite(values)?;

    let m = mean(values);
    let std = (values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt();

    let standardized = values
        .iter()
        .map(|x| if std > 0.0 { (x - m) / std } else { 0.0 })
        .collect::<Vec<f64>>();

    let timestamps = series.index().as_slice();
    let half = 0.5 * bin_width;
    let reach = lags.iter().fold(0.0f64, |acc, lag| acc.max(*lag)) + half;

    let mut sums = vec![0.0; lags.len()];
    let mut counts = vec![0usize; lags.len()];

    for (idx, (t_i, x_i)) in timestamps.iter().zip(&standardized).enumerate() {
        // Timestamps are strictly increasing, so the pairs can be cut off at the largest lag.
        for (t_j, x_j) in timestamps[idx + 1..]
            .iter()
            .zip(&standardized[idx + 1..])
            .take_while(|(t_j, _)| *t_j - t_i <= reach)
        {
            let delta = t_j - t_i;

            for (ldx, lag) in lags.iter().enumerate() {
                if (delta - lag).abs() <= half {
                    sums[ldx] += x_i * x_j;
                    counts[ldx] += 1;
                }
            }
        }
    }

    debug!(
        "binned_acf: {} samples, {} lags, {} pairs",
        values.len(),
        lags.len(),
        counts.iter().sum::<usize>()
    );

    Ok(lags
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(lag, (sum, count))| {
            if *lag == 0.0 {
                1.0
            } else if *count == 0 {
                f64::NAN
            } else {
                sum / *count as f64
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        base::TimeIndex,
        noise::{Ar1Noise, NoiseModel, ar1},
    };
    use approx::{abs_diff_eq, ulps_eq};
    use nalgebra::DVector;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_acf() {
        let result = acf(&[1.0, 2.0, 3.0, 4.0], 10).unwrap();

        assert!(result.len() == 4);
        assert!(result[0] == 1.0);
        assert!(ulps_eq!(result[1], 0.25));

        assert!(acf(&[2.0; 5], 2).unwrap() == vec![1.0, 0.0, 0.0]);
        assert!(acf(&[], 2).unwrap_err() == SeriesError::Empty);
        assert!(acf(&[1.0, f64::NAN], 2).unwrap_err() == SeriesError::NonFinite { index: 1 });
    }

    #[test]
    fn test_acf_ar1() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let noise = (0..20000)
            .map(|_| rng.sample(StandardNormal))
            .collect::<Vec<f64>>();

        let phi = 0.8;
        let result = acf(ar1(&noise, phi).as_slice(), 3).unwrap();

        assert!(abs_diff_eq!(result[1], phi, epsilon = 0.05));
        assert!(abs_diff_eq!(result[2], phi * phi, epsilon = 0.05));
    }

    #[test]
    fn test_binned_acf() {
        // Irregular sampling with gaps of 0.5 and 1.5 days.
        let timestamps = (0..40000)
            .scan(0.0, |t, idx| {
                *t += if idx % 2 == 0 { 0.5 } else { 1.5 };

                Some(*t)
            })
            .collect::<Vec<f64>>();

        let index = TimeIndex::new(timestamps).unwrap();

        let model = Ar1Noise {
            alpha: 5.0,
            sigma: 1.0,
            seed: 21,
        };

        let series = TimeSeries::new(index.clone(), model.sample(&index)).unwrap();
        let result = binned_acf(&series, &[0.0, 2.0, 4.0, 101.0], 0.5).unwrap();

        assert!(result[0] == 1.0);
        assert!(abs_diff_eq!(result[1], (-2.0f64 / 5.0).exp(), epsilon = 0.05));
        assert!(abs_diff_eq!(result[2], (-4.0f64 / 5.0).exp(), epsilon = 0.05));

        // Time differences of odd integers are never sampled.
        assert!(result[3].is_nan());

        let constant = TimeSeries::new(
            TimeIndex::regular(0.0, 1.0, 4).unwrap(),
            DVector::from_element(4, 1.0),
        )
        .unwrap();

        assert!(binned_acf(&constant, &[1.0], 0.5).unwrap() == vec![0.0]);
    }
}
