#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

pub mod base;
pub mod math;
pub mod methods;
pub mod noise;
pub mod rfunc;
pub mod stats;
