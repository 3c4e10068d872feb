//! # Synthetic correlated noise.
//!
//! The deterministic recursions [`ar1`], [`ar1_irregular`], [`arma11`], [`arma11_presample`]
//! and [`arma11_irregular`] turn a supplied i.i.d. base noise sequence into correlated residuals.
//! They contain no randomness of their own.
//!
//! #### Noise Models
//!
//! The [`NoiseModel`] trait is shared for all noise models, which are types that draw their own
//! base noise from a seeded random number generator and apply one of the recursions according
//! to the actual time steps of a [`TimeIndex`]:
//! - [`NullNoise`] A noise model that does nothing.
//! - [`WhiteNoise`] Uncorrelated Gaussian noise.
//! - [`Ar1Noise`] Exponentially decaying AR(1) noise.
//! - [`ArmaNoise`] ARMA(1,1) noise.

mod models;
mod recursive;

pub use models::*;
pub use recursive::*;

use crate::base::{SeriesError, TimeIndex, TimeSeries};
use nalgebra::{DVector, RealField};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// A trait that is shared by all noise models.
pub trait NoiseModel<T>
where
    T: Copy + RealField,
{
    /// Returns a new series with noise added to the values of `series`.
    fn apply(
        &self,
        series: &TimeSeries<T>,
        rng: &mut impl Rng,
    ) -> Result<TimeSeries<T>, SeriesError> {
        series.add_noise(&self.generate_noise(series.index(), rng))
    }

    /// Generate a random noise time-series.
    fn generate_noise(&self, index: &TimeIndex<T>, rng: &mut impl Rng) -> DVector<T>;

    /// Get random number seed.
    fn get_random_seed(&self) -> u64;

    /// Increment random number seed.
    fn increment_random_seed(&mut self);

    /// Initialize a new random number generator using the base seed.
    fn initialize_rng(&self, multiplier: u64, offset: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(self.get_random_seed() * multiplier + offset)
    }

    /// Generate a noise time-series using a random number generator initialized from the base seed.
    fn sample(&self, index: &TimeIndex<T>) -> DVector<T> {
        let mut rng = self.initialize_rng(1, 0);

        self.generate_noise(index, &mut rng)
    }
}
