use chrono::NaiveDateTime;
use derive_more::{Deref, IntoIterator};
use itertools::{Itertools, zip_eq};
use log::debug;
use nalgebra::{DVector, RealField, Scalar};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, ops::Add};
use thiserror::Error;

/// Errors associated with time indices and time series.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("time series contains no elements")]
    Empty,
    #[error("time indices of both series do not match")]
    IndexMismatch,
    #[error("time step of a regular index must be positive and finite")]
    InvalidStep,
    #[error("non-finite timestamp at position {index}")]
    NonFinite { index: usize },
    #[error("time index is not strictly increasing at position {index}")]
    NonMonotonic { index: usize },
    #[error("invalid array shape: found {found} but expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },
}

/// An ordered sequence of strictly increasing timestamps.
///
/// Timestamps are measured in days. Regular and irregular spacing are both allowed.
#[derive(Clone, Debug, Default, Deref, Deserialize, IntoIterator, PartialEq, Serialize)]
#[serde(try_from = "Vec<T>")]
#[serde(bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
pub struct TimeIndex<T>(#[into_iterator(owned, ref)] Vec<T>);

impl<T> TimeIndex<T>
where
    T: Copy + RealField,
{
    /// Returns the first timestamp.
    pub fn first_timestamp(&self) -> Option<T> {
        self.0.first().copied()
    }

    /// Create a [`TimeIndex`] from an unordered collection of timestamps.
    ///
    /// The timestamps are sorted and duplicates are removed.
    pub fn from_unsorted<I: IntoIterator<Item = T>>(iter: I) -> Result<Self, SeriesError> {
        let timestamps = iter.into_iter().collect::<Vec<T>>();
        let length = timestamps.len();

        if let Some(index) = timestamps.iter().position(|value| !value.is_finite()) {
            return Err(SeriesError::NonFinite { index });
        }

        let timestamps = timestamps
            .into_iter()
            .sorted_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .dedup()
            .collect::<Vec<T>>();

        if timestamps.len() != length {
            debug!(
                "TimeIndex::from_unsorted removed {} duplicate timestamps",
                length - timestamps.len()
            );
        }

        Ok(Self(timestamps))
    }

    /// Returns `true` if all time steps are equal within a relative tolerance.
    pub fn is_regular(&self, rel_tol: T) -> bool {
        let steps = self.0.windows(2).map(|w| w[1] - w[0]).collect::<Vec<T>>();

        match steps.first() {
            Some(first) => steps
                .iter()
                .all(|step| (*step - *first).abs() <= rel_tol * first.abs()),
            None => true,
        }
    }

    /// Returns the last timestamp.
    pub fn last_timestamp(&self) -> Option<T> {
        self.0.last().copied()
    }

    /// Create a new [`TimeIndex`], the timestamps must be finite and strictly increasing.
    pub fn new(timestamps: Vec<T>) -> Result<Self, SeriesError> {
        if let Some(index) = timestamps.iter().position(|value| !value.is_finite()) {
            return Err(SeriesError::NonFinite { index });
        }

        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SeriesError::NonMonotonic { index: index + 1 });
        }

        Ok(Self(timestamps))
    }

    /// Create a regularly spaced [`TimeIndex`] with `length` entries, the `step` must be
    /// positive.
    pub fn regular(start: T, step: T, length: usize) -> Result<Self, SeriesError> {
        if !step.is_finite() || (step <= T::zero()) {
            return Err(SeriesError::InvalidStep);
        }

        Self::new(
            (0..length)
                .map(|idx| start + step * T::from_usize(idx).unwrap())
                .collect(),
        )
    }

    /// Returns the elapsed time between consecutive timestamps.
    ///
    /// The first entry has no predecessor and is set to zero.
    pub fn time_steps(&self) -> Vec<T> {
        let mut steps = Vec::with_capacity(self.0.len());

        if !self.0.is_empty() {
            steps.push(T::zero());
        }

        steps.extend(self.0.windows(2).map(|w| w[1] - w[0]));

        steps
    }
}

impl TimeIndex<f64> {
    /// Create a [`TimeIndex`] from calendar timestamps.
    ///
    /// Timestamps are converted to fractional days since the first entry.
    pub fn from_datetimes(datetimes: &[NaiveDateTime]) -> Result<Self, SeriesError> {
        let origin = match datetimes.first() {
            Some(origin) => *origin,
            None => return Ok(Self(Vec::new())),
        };

        Self::new(
            datetimes
                .iter()
                .map(|dt| (*dt - origin).num_milliseconds() as f64 / 86_400_000.0)
                .collect(),
        )
    }
}

impl<T> TryFrom<Vec<T>> for TimeIndex<T>
where
    T: Copy + RealField,
{
    type Error = SeriesError;

    fn try_from(timestamps: Vec<T>) -> Result<Self, Self::Error> {
        Self::new(timestamps)
    }
}

/// A signal, i.e. a mapping from each timestamp of a [`TimeIndex`] to a scalar value.
///
/// A [`TimeSeries`] is never modified in place, derived signals are new series.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "RawTimeSeries<T>")]
#[serde(bound(serialize = "T: Scalar + Serialize"))]
#[serde(bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
pub struct TimeSeries<T>
where
    T: Scalar,
{
    index: TimeIndex<T>,
    values: DVector<T>,
}

impl<T> TimeSeries<T>
where
    T: Copy + RealField,
{
    /// Returns a new series where `noise` is added to the values of `self`.
    pub fn add_noise(&self, noise: &DVector<T>) -> Result<Self, SeriesError> {
        if noise.len() != self.len() {
            return Err(SeriesError::ShapeMismatch {
                expected: self.len(),
                found: noise.len(),
            });
        }

        Ok(Self {
            index: self.index.clone(),
            values: &self.values + noise,
        })
    }

    /// Returns a new series with the sum of two series that share the same time index.
    pub fn checked_add(&self, other: &Self) -> Result<Self, SeriesError> {
        if other.len() != self.len() {
            return Err(SeriesError::ShapeMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }

        if self.index != other.index {
            return Err(SeriesError::IndexMismatch);
        }

        Ok(Self {
            index: self.index.clone(),
            values: &self.values + &other.values,
        })
    }

    /// Create a [`TimeSeries`] from unordered `(timestamp, value)` pairs.
    ///
    /// Pairs are sorted by their timestamp, for duplicate timestamps only the first occurrence
    /// is kept.
    pub fn from_unsorted<I: IntoIterator<Item = (T, T)>>(iter: I) -> Result<Self, SeriesError> {
        let pairs = iter.into_iter().collect::<Vec<(T, T)>>();

        if let Some(index) = pairs.iter().position(|(t, _)| !t.is_finite()) {
            return Err(SeriesError::NonFinite { index });
        }

        let pairs = pairs
            .into_iter()
            .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
            .dedup_by(|a, b| a.0 == b.0)
            .collect::<Vec<(T, T)>>();

        let (timestamps, values): (Vec<T>, Vec<T>) = pairs.into_iter().unzip();

        Self::new(TimeIndex::new(timestamps)?, DVector::from_vec(values))
    }

    /// Returns a reference to the underlying [`TimeIndex`].
    pub fn index(&self) -> &TimeIndex<T> {
        &self.index
    }

    /// Returns `true` if the series contains no elements.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (T, T)> + '_ {
        zip_eq(self.index.iter().copied(), self.values.iter().copied())
    }

    /// Returns the number of elements in the series.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Create a new [`TimeSeries`].
    pub fn new(index: TimeIndex<T>, values: DVector<T>) -> Result<Self, SeriesError> {
        if index.len() != values.len() {
            return Err(SeriesError::ShapeMismatch {
                expected: index.len(),
                found: values.len(),
            });
        }

        Ok(Self { index, values })
    }

    /// Returns a reference to the underlying values.
    pub fn values(&self) -> &DVector<T> {
        &self.values
    }
}

/// Unchecked serialized form of a [`TimeSeries`].
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Copy + RealField + Deserialize<'de>"))]
struct RawTimeSeries<T>
where
    T: Scalar,
{
    index: TimeIndex<T>,
    values: DVector<T>,
}

impl<T> TryFrom<RawTimeSeries<T>> for TimeSeries<T>
where
    T: Copy + RealField,
{
    type Error = SeriesError;

    fn try_from(raw: RawTimeSeries<T>) -> Result<Self, Self::Error> {
        Self::new(raw.index, raw.values)
    }
}

impl<T> Add for &TimeSeries<T>
where
    T: Copy + RealField,
{
    type Output = Result<TimeSeries<T>, SeriesError>;

    fn add(self, other: Self) -> Self::Output {
        self.checked_add(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::ulps_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_time_index() {
        let index = TimeIndex::new(vec![0.0, 1.0, 2.5, 4.0]).unwrap();

        assert!(index.len() == 4);
        assert!(index.first_timestamp() == Some(0.0));
        assert!(index.last_timestamp() == Some(4.0));
        assert!(index.time_steps() == vec![0.0, 1.0, 1.5, 1.5]);
        assert!(!index.is_regular(1e-9));

        assert!(
            TimeIndex::new(vec![0.0, 1.0, 1.0]).unwrap_err()
                == SeriesError::NonMonotonic { index: 2 }
        );
        assert!(
            TimeIndex::new(vec![0.0, f64::NAN]).unwrap_err() == SeriesError::NonFinite { index: 1 }
        );

        let regular = TimeIndex::<f64>::regular(10.0, 0.5, 5).unwrap();

        assert!(regular.is_regular(1e-9));
        assert!(ulps_eq!(regular.last_timestamp().unwrap(), 12.0));

        assert!(TimeIndex::<f64>::regular(0.0, -1.0, 3).unwrap_err() == SeriesError::InvalidStep);
        assert!(TimeIndex::<f64>::regular(0.0, 0.0, 3).unwrap_err() == SeriesError::InvalidStep);
        assert!(TimeIndex::regular(0.0, f64::NAN, 3).unwrap_err() == SeriesError::InvalidStep);
        assert!(
            TimeIndex::regular(f64::INFINITY, 1.0, 3).unwrap_err()
                == SeriesError::NonFinite { index: 0 }
        );

        let unsorted = TimeIndex::from_unsorted([3.0, 1.0, 2.0, 1.0]).unwrap();

        assert!(*unsorted == vec![1.0, 2.0, 3.0]);
        assert!(TimeIndex::<f64>::new(Vec::new()).unwrap().time_steps().is_empty());
    }

    #[test]
    fn test_time_index_from_datetimes() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let datetimes = [
            start,
            start + chrono::Duration::hours(12),
            start + chrono::Duration::days(3),
        ];

        let index = TimeIndex::from_datetimes(&datetimes).unwrap();

        assert!(*index == vec![0.0, 0.5, 3.0]);
        assert!(TimeIndex::from_datetimes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_time_series() {
        let index = TimeIndex::regular(0.0, 1.0, 4).unwrap();
        let head = TimeSeries::new(index, DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0])).unwrap();

        let noisy = head
            .add_noise(&DVector::from_vec(vec![0.5, -0.5, 0.0, 1.0]))
            .unwrap();

        assert!(noisy.values().as_slice() == [1.5, 1.5, 3.0, 5.0]);
        assert!(head.values().as_slice() == [1.0, 2.0, 3.0, 4.0]);

        assert!(
            head.add_noise(&DVector::zeros(3)).unwrap_err()
                == SeriesError::ShapeMismatch {
                    expected: 4,
                    found: 3
                }
        );

        let doubled = head.checked_add(&head).unwrap();

        assert!(doubled.values()[3] == 8.0);
        assert!((&head + &head).unwrap() == doubled);

        let shifted = TimeSeries::new(
            TimeIndex::regular(1.0, 1.0, 4).unwrap(),
            DVector::from_vec(vec![0.0; 4]),
        )
        .unwrap();

        assert!(head.checked_add(&shifted).unwrap_err() == SeriesError::IndexMismatch);

        let series = TimeSeries::from_unsorted([(2.0, 20.0), (0.0, 0.0), (1.0, 10.0), (1.0, 11.0)])
            .unwrap();

        assert!(series.len() == 3);
        assert!(series.iter().collect::<Vec<_>>() == vec![(0.0, 0.0), (1.0, 10.0), (2.0, 20.0)]);
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let index = TimeIndex::<f64>::regular(0.0, 1.0, 3).unwrap();
        let values = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let series = TimeSeries::new(index.clone(), values).unwrap();

        let json = serde_json5::to_string(&series).unwrap();

        assert!(serde_json5::from_str::<TimeSeries<f64>>(&json).unwrap() == series);
        assert!(
            serde_json5::from_str::<TimeIndex<f64>>(&serde_json5::to_string(&index).unwrap())
                .unwrap()
                == index
        );

        assert!(serde_json5::from_str::<TimeIndex<f64>>("[3, 1, 1]").is_err());
        assert!(serde_json5::from_str::<TimeIndex<f64>>("[0, 1, 1]").is_err());

        // Three timestamps but only two values.
        let json = format!(
            "{{index: [0, 1, 2], values: {}}}",
            serde_json5::to_string(&DVector::from_vec(vec![1.0, 2.0])).unwrap()
        );

        assert!(serde_json5::from_str::<TimeSeries<f64>>(&json).is_err());
    }
}
