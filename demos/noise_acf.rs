use aquitard::{
    base::{TimeIndex, TimeSeries},
    noise::{Ar1Noise, ArmaNoise, NoiseModel, WhiteNoise},
    stats::{acf, binned_acf},
};
use chrono::Local;
use env_logger::Builder;
use log::info;
use nalgebra::DVector;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::io::prelude::*;

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S.%f"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    const SIZE: usize = 10_000;

    let alpha = 10.0;

    // Regular daily sampling.
    let index = TimeIndex::regular(0.0, 1.0, SIZE).unwrap();

    let ar1 = Ar1Noise {
        alpha,
        sigma: 0.1,
        seed: 42,
    };

    let values = ar1.sample(&index);
    let sample_acf = acf(values.as_slice(), 5).unwrap();

    for (lag, value) in sample_acf.iter().enumerate() {
        info!(
            "ar1 regular: lag={} acf={:.3} expected={:.3}",
            lag,
            value,
            (-(lag as f64) / alpha).exp()
        );
    }

    // Irregular sampling with random gaps between 0.25 and 2 days.
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let timestamps = (0..SIZE)
        .scan(0.0, |t, _| {
            *t += rng.random_range(0.25..2.0);

            Some(*t)
        })
        .collect::<Vec<f64>>();

    let index = TimeIndex::new(timestamps).unwrap();
    let lags = [0.0, 1.0, 2.0, 5.0, 10.0];

    let head = TimeSeries::new(index.clone(), DVector::from_element(SIZE, 5.0)).unwrap();
    let series = ar1.apply(&head, &mut ar1.initialize_rng(1, 0)).unwrap();

    for (lag, value) in lags
        .iter()
        .zip(binned_acf(&series, &lags, 0.5).unwrap())
    {
        info!(
            "ar1 irregular: lag={} acf={:.3} expected={:.3}",
            lag,
            value,
            (-lag / alpha).exp()
        );
    }

    let arma = ArmaNoise {
        alpha,
        beta: 2.0,
        sigma: 0.1,
        seed: 42,
    };

    let series = TimeSeries::new(index.clone(), arma.sample(&index)).unwrap();

    info!(
        "arma irregular: acf={:?}",
        binned_acf(&series, &lags, 0.5).unwrap()
    );

    let white = WhiteNoise {
        sigma: 0.1,
        seed: 42,
    };

    let series = TimeSeries::new(index.clone(), white.sample(&index)).unwrap();

    info!(
        "white irregular: acf={:?}",
        binned_acf(&series, &lags, 0.5).unwrap()
    );
}
