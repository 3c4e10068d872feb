use aquitard::{
    methods::{ValidationSettings, validate_all},
    rfunc::{FourParam, Kraijenhoff, Response, ResponseFunction},
};
use chrono::Local;
use env_logger::Builder;
use log::{error, info, warn};
use std::{fs::create_dir_all, io::prelude::*, path::Path};

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

    // An optional JSON5 settings file may be passed as the first argument.
    let settings = match std::env::args().nth(1) {
        Some(path) => ValidationSettings::from_json5(path).unwrap(),
        None => ValidationSettings::default(),
    };

    let mut cases = ResponseFunction::all()
        .into_iter()
        .map(|rfunc| {
            let params = rfunc.default_params();

            (rfunc, params)
        })
        .collect::<Vec<_>>();

    cases.push((
        ResponseFunction::FourParam(FourParam),
        vec![1.0, 1.5, 50.0, 10.0],
    ));
    cases.push((
        ResponseFunction::Kraijenhoff(Kraijenhoff::default()),
        vec![5.0, 10.0, 0.25],
    ));

    let path = Path::new("output/validate_responses");

    if !path.exists() {
        create_dir_all(path).unwrap();
    }

    for (idx, ((rfunc, params), result)) in cases
        .iter()
        .zip(validate_all(&cases, &settings))
        .enumerate()
    {
        match result {
            Ok(comparison) => {
                let relative_error = comparison.relative_error().unwrap();

                if comparison.passes(settings.tolerance) {
                    info!(
                        "{} {:?}: rmse={:.3e} relative_error={:.3e}",
                        rfunc.name(),
                        params,
                        comparison.rmse().unwrap(),
                        relative_error
                    );
                } else {
                    warn!(
                        "{} {:?}: relative_error={:.3e} exceeds tolerance {:.1e}",
                        rfunc.name(),
                        params,
                        relative_error,
                        settings.tolerance
                    );
                }

                if !comparison.warnings.is_empty() {
                    warn!(
                        "{}: {} windows have not converged",
                        rfunc.name(),
                        comparison.warnings.len()
                    );
                }

                comparison
                    .save(path.join(format!("{:02}_{}.json", idx, rfunc.name().to_lowercase())))
                    .unwrap();
            }
            Err(err) => error!("{} {:?}: {}", rfunc.name(), params, err),
        }
    }
}
