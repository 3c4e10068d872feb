//! # Core building blocks of the **aquitard** crate.
//!
//! # Time Series
//!
//! Timestamps are gathered in a [`TimeIndex`], an ordered sequence of strictly increasing
//! timestamps (in days) with regular or irregular spacing. A [`TimeIndex`] can be created
//! from raw timestamps, from unordered data (which is sorted and de-duplicated) or from
//! calendar timestamps.
//!
//! A [`TimeSeries`] maps each timestamp to a scalar value (e.g. head, noise or rainfall).
//! Series are immutable, combining a signal with noise via [`add_noise`](`TimeSeries::add_noise`)
//! or [`checked_add`](`TimeSeries::checked_add`) yields a new series.

mod series;

pub use series::*;
