use aquitard::{
    base::{TimeIndex, TimeSeries},
    methods::{
        ResponseComparison, ValidationSettings, ValidationSettingsBuilder, validate_all,
        validate_response,
    },
    noise::{Ar1Noise, ArmaNoise, NoiseModel, ar1, ar1_irregular, arma11, arma11_irregular},
    rfunc::{
        DoubleExponential, Exponential, FourParam, Gamma, Hantush, Kraijenhoff, Polder, Response,
        ResponseFunction,
    },
    stats::acf,
};
use approx::{abs_diff_eq, ulps_eq};
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;

fn base_noise(size: usize, seed: u64) -> Vec<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    (0..size).map(|_| rng.sample(StandardNormal)).collect()
}

#[test]
fn test_all_families_match_their_step_response() {
    let settings = ValidationSettings::default();

    let cases = vec![
        (ResponseFunction::Exponential(Exponential), vec![2.0, 25.0]),
        (ResponseFunction::Gamma(Gamma), vec![1.0, 2.5, 20.0]),
        (ResponseFunction::Gamma(Gamma), vec![-0.5, 0.6, 30.0]),
        (
            ResponseFunction::DoubleExponential(DoubleExponential),
            vec![1.0, 0.3, 5.0, 80.0],
        ),
        (ResponseFunction::Hantush(Hantush), vec![1.0, 100.0, 0.5]),
        (ResponseFunction::Polder(Polder), vec![2.0, 50.0, 0.2]),
        (ResponseFunction::FourParam(FourParam), vec![1.0, 1.5, 50.0, 10.0]),
        (
            ResponseFunction::Kraijenhoff(Kraijenhoff::default()),
            vec![5.0, 10.0, 0.25],
        ),
    ];

    for ((rfunc, params), result) in cases.iter().zip(validate_all(&cases, &settings)) {
        let comparison = result.unwrap();

        assert!(
            comparison.passes(1e-3),
            "{} {:?}: relative error {:?}",
            rfunc.name(),
            params,
            comparison.relative_error()
        );
    }
}

#[test]
fn test_four_param_normalization() {
    let comparison = validate_response(
        &ResponseFunction::FourParam(FourParam),
        &[1.0, 1.5, 50.0, 10.0],
        &ValidationSettings::default(),
    )
    .unwrap();

    // The normalized numerical step approaches the unit gain.
    assert!(abs_diff_eq!(
        *comparison.numerical.last().unwrap(),
        0.999,
        epsilon = 2e-3
    ));
    assert!(comparison.max_abs_error().unwrap() < 1e-3);
}

#[test]
fn test_leaky_families_at_difficult_parameters() {
    let settings = ValidationSettings::default();

    let cases = vec![
        (ResponseFunction::FourParam(FourParam), vec![1.0, 1.0 + 1e-7, 10.0, 1.0]),
        (ResponseFunction::FourParam(FourParam), vec![1.0, 1.0 - 1e-7, 10.0, 1.0]),
        (ResponseFunction::FourParam(FourParam), vec![1.0, 2.0 - 1e-10, 10.0, 1.0]),
        (ResponseFunction::FourParam(FourParam), vec![1.0, 1.5, 10.0, 400.0]),
        (ResponseFunction::Hantush(Hantush), vec![1.0, 1.0, 400.0]),
        (
            ResponseFunction::Kraijenhoff(Kraijenhoff::default()),
            vec![1.0, 10.0, 0.49],
        ),
    ];

    for ((rfunc, params), result) in cases.iter().zip(validate_all(&cases, &settings)) {
        let comparison = result.unwrap();

        assert!(
            comparison.passes(1e-3),
            "{} {:?}: relative error {:?}",
            rfunc.name(),
            params,
            comparison.relative_error()
        );
    }
}

#[test]
fn test_kraijenhoff_reference_case() {
    let rfunc = ResponseFunction::Kraijenhoff(Kraijenhoff::default());
    let params = [5.0, 10.0, 0.25];

    let comparison =
        validate_response(&rfunc, &params, &ValidationSettings::default()).unwrap();

    assert!(comparison.max_abs_error().unwrap() <= 1e-3 * 5.0);
}

#[test]
fn test_comparison_json5_roundtrip() {
    let settings = ValidationSettingsBuilder::default()
        .dt(2.0)
        .cutoff(0.99)
        .build()
        .unwrap();

    let comparison =
        validate_response(&ResponseFunction::Gamma(Gamma), &[1.0, 2.0, 10.0], &settings).unwrap();

    let path = std::env::temp_dir().join("aquitard_comparison.json5");
    comparison.save(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let loaded = serde_json5::from_str::<ResponseComparison>(&content).unwrap();

    assert!(loaded.family == "Gamma");
    assert!(loaded.time == comparison.time);
    assert!(
        loaded
            .numerical
            .iter()
            .zip(&comparison.numerical)
            .all(|(a, b)| ulps_eq!(*a, *b, max_ulps = 4))
    );

    let settings_path = std::env::temp_dir().join("aquitard_settings.json5");
    std::fs::write(&settings_path, "{\n  // coarse grid\n  dt: 2.0,\n  cutoff: 0.99,\n}").unwrap();

    assert!(ValidationSettings::from_json5(&settings_path).unwrap() == settings);
}

#[test]
fn test_noise_recursions() {
    let noise = base_noise(512, 1);

    assert!(ar1(&noise, 0.0).as_slice() == noise.as_slice());
    assert!(ar1(&[1.0, 0.0, 0.0, 0.0], 0.5).as_slice() == [1.0, 0.5, 0.25, 0.125]);

    let alpha = 3.0;
    let steps = vec![1.0; noise.len()];

    assert!(ulps_eq!(
        ar1(&noise, (-1.0f64 / alpha).exp()),
        ar1_irregular(&noise, &steps, alpha).unwrap(),
        max_ulps = 8
    ));

    assert!(arma11(&noise, 0.6, 0.0) == ar1(&noise, 0.6));
    assert!(
        arma11_irregular(&noise, &steps, alpha, 0.0).unwrap()
            == ar1_irregular(&noise, &steps, alpha).unwrap()
    );
}

#[test]
fn test_noise_models_on_irregular_index() {
    let index = TimeIndex::from_unsorted([5.0, 0.0, 1.0, 1.5, 3.0, 3.0, 10.0]).unwrap();

    assert!(index.len() == 6);

    let model = ArmaNoise {
        alpha: 4.0,
        beta: -2.0,
        sigma: 0.5,
        seed: 5,
    };

    let noise = model.sample(&index);
    let mut rng = model.initialize_rng(1, 0);
    let base = (0..index.len())
        .map(|_| rng.sample::<f64, _>(StandardNormal) * 0.5)
        .collect::<Vec<f64>>();

    assert!(ulps_eq!(
        noise,
        arma11_irregular(&base, &index.time_steps(), 4.0, -2.0).unwrap(),
        max_ulps = 8
    ));

    let head = TimeSeries::new(index.clone(), nalgebra::DVector::from_element(6, 1.0)).unwrap();
    let noisy = model.apply(&head, &mut model.initialize_rng(1, 0)).unwrap();

    assert!(ulps_eq!(
        noisy.values().clone(),
        noise.add_scalar(1.0),
        max_ulps = 8
    ));
}

#[test]
fn test_ar1_noise_autocorrelation() {
    let model = Ar1Noise {
        alpha: 10.0,
        sigma: 1.0,
        seed: 99,
    };

    let index = TimeIndex::regular(0.0, 1.0, 20000).unwrap();
    let result = acf(model.sample(&index).as_slice(), 2).unwrap();

    assert!(abs_diff_eq!(result[1], (-0.1f64).exp(), epsilon = 0.05));
}
