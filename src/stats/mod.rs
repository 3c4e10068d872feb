//! # Statistics for validating synthetic series.
//!
//! - [`acf`] The sample autocorrelation function of a regularly sampled series.
//! - [`binned_acf`] The autocorrelation function of an irregularly sampled series, estimated by
//!   collecting all pairs of samples whose time difference falls within a rectangular bin around
//!   each lag.
//! - [`rmse`] and [`max_abs_error`] compare two equally long sequences.

mod acf;
mod metrics;

pub use acf::*;
pub use metrics::*;
