use crate::{
    base::TimeIndex,
    noise::{NoiseModel, ar1_steps, arma11_steps},
};
use nalgebra::{DVector, RealField, Scalar};
use num_traits::Zero;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Draw `size` i.i.d. zero-mean Gaussian values with standard deviation `sigma`.
fn gaussian<T>(size: usize, sigma: T, rng: &mut impl Rng) -> Vec<T>
where
    T: Copy + RealField,
    StandardNormal: Distribution<T>,
{
    let normal = StandardNormal;

    (0..size).map(|_| rng.sample(normal) * sigma).collect()
}

/// A noise model that does nothing.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NullNoise<T> {
    _data: PhantomData<T>,
}

impl<T> NoiseModel<T> for NullNoise<T>
where
    T: Copy + RealField + Scalar + Zero,
{
    fn generate_noise(&self, index: &TimeIndex<T>, _rng: &mut impl Rng) -> DVector<T> {
        DVector::zeros(index.len())
    }

    fn get_random_seed(&self) -> u64 {
        0
    }

    fn increment_random_seed(&mut self) {}
}

/// Uncorrelated zero-mean Gaussian noise.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WhiteNoise<T> {
    /// Standard deviation of the noise.
    pub sigma: T,

    /// Random seed.
    pub seed: u64,
}

impl<T> NoiseModel<T> for WhiteNoise<T>
where
    T: Copy + RealField,
    StandardNormal: Distribution<T>,
{
    fn generate_noise(&self, index: &TimeIndex<T>, rng: &mut impl Rng) -> DVector<T> {
        DVector::from_vec(gaussian(index.len(), self.sigma, rng))
    }

    fn get_random_seed(&self) -> u64 {
        self.seed
    }

    fn increment_random_seed(&mut self) {
        self.seed += 1;
    }
}

/// Exponentially correlated AR(1) noise with decay time scale `alpha` (in days).
///
/// The decay factor between two samples is `exp(-Δt / α)`, where `Δt` is the actual elapsed
/// time, so that the model is valid for irregular time indices.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Ar1Noise<T> {
    /// Decay time scale.
    pub alpha: T,

    /// Standard deviation of the base noise.
    pub sigma: T,

    /// Random seed.
    pub seed: u64,
}

impl<T> NoiseModel<T> for Ar1Noise<T>
where
    T: Copy + RealField,
    StandardNormal: Distribution<T>,
{
    fn generate_noise(&self, index: &TimeIndex<T>, rng: &mut impl Rng) -> DVector<T> {
        let base = gaussian(index.len(), self.sigma, rng);

        // Both sequences are derived from the same time index.
        ar1_steps(&base, &index.time_steps(), self.alpha)
    }

    fn get_random_seed(&self) -> u64 {
        self.seed
    }

    fn increment_random_seed(&mut self) {
        self.seed += 1;
    }
}

/// ARMA(1,1) noise with autoregressive decay time scale `alpha` and moving average time scale `beta`.
///
/// See [`arma11_irregular`](`crate::noise::arma11_irregular`) for the limitations of the moving average weighting on irregular
/// time indices.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ArmaNoise<T> {
    /// Autoregressive decay time scale.
    pub alpha: T,

    /// Moving average time scale, its sign determines the sign of the moving average weight.
    pub beta: T,

    /// Standard deviation of the base noise.
    pub sigma: T,

    /// Random seed.
    pub seed: u64,
}

impl<T> NoiseModel<T> for ArmaNoise<T>
where
    T: Copy + RealField,
    StandardNormal: Distribution<T>,
{
    fn generate_noise(&self, index: &TimeIndex<T>, rng: &mut impl Rng) -> DVector<T> {
        let base = gaussian(index.len(), self.sigma, rng);

        arma11_steps(&base, &index.time_steps(), self.alpha, self.beta)
    }

    fn get_random_seed(&self) -> u64 {
        self.seed
    }

    fn increment_random_seed(&mut self) {
        self.seed += 1;
    }
}
