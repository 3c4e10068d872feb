use crate::base::SeriesError;
use itertools::zip_eq;

fn check_pair(a: &[f64], b: &[f64]) -> Result<(), SeriesError> {
    if a.is_empty() {
        return Err(SeriesError::Empty);
    }

    if a.len() != b.len() {
        return Err(SeriesError::ShapeMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    Ok(())
}

/// The root mean square difference between two sequences.
pub fn rmse(a: &[f64], b: &[f64]) -> Result<f64, SeriesError> {
    check_pair(a, b)?;

    let sum = zip_eq(a, b).map(|(x, y)| (x - y).powi(2)).sum::<f64>();

    Ok((sum / a.len() as f64).sqrt())
}

/// The largest absolute difference between two sequences.
pub fn max_abs_error(a: &[f64], b: &[f64]) -> Result<f64, SeriesError> {
    check_pair(a, b)?;

    Ok(zip_eq(a, b).fold(0.0f64, |acc, (x, y)| acc.max((x - y).abs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::ulps_eq;

    #[test]
    fn test_metrics() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [1.0, 2.5, 3.0, 3.5];

        assert!(ulps_eq!(rmse(&a, &b).unwrap(), (0.5f64 / 4.0).sqrt()));
        assert!(ulps_eq!(max_abs_error(&a, &b).unwrap(), 0.5));
        assert!(rmse(&a, &a).unwrap() == 0.0);

        assert!(rmse(&[], &[]).unwrap_err() == SeriesError::Empty);
        assert!(
            max_abs_error(&a, &b[..2]).unwrap_err()
                == SeriesError::ShapeMismatch {
                    expected: 4,
                    found: 2
                }
        );
    }
}
