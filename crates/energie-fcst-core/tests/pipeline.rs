//! End-to-end tests: dataset rows to dated forecasts.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use energie_fcst_core::{
    available_cutoffs, month_ends_after, read_csv, run_request, select, spawn_forecast, CsvSchema,
    EngineOptions, ForecastEngine, ForecastError, ForecastRequest, ObservedSeries, Record,
    SeriesRepository, MIN_HISTORY,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Monthly consumption with a winter peak, mild growth and irregular noise.
fn consumption(n: usize, seed: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            let winter = 900.0 * (2.0 * std::f64::consts::PI * t / 12.0).cos();
            let noise = (((t + seed) * 12.9898).sin() * 43758.5453).fract();
            6000.0 + 4.0 * t + winter + 50.0 * noise
        })
        .collect()
}

fn repository() -> SeriesRepository {
    let start = date(2016, 1, 31);
    let series = vec![
        ObservedSeries::from_values("Normandie", start, &consumption(60, 0.0)).unwrap(),
        ObservedSeries::from_values("Corse", start, &consumption(30, 7.0)).unwrap(),
    ];
    SeriesRepository::from_series(series).unwrap()
}

#[test]
fn twenty_four_observations_horizon_twelve() {
    let values = consumption(24, 3.0);
    let series = ObservedSeries::from_values("Bretagne", date(2020, 1, 31), &values).unwrap();
    let cutoff = date(2021, 12, 31);

    let history = select(&series, cutoff).unwrap();
    assert_eq!(history.len(), MIN_HISTORY);

    let result = ForecastEngine::default().forecast(&history, 12).unwrap();
    assert_eq!(result.len(), 12);
    assert_eq!(result.first_date(), Some(date(2022, 1, 31)));
    assert_eq!(result.last_date(), Some(date(2022, 12, 31)));
    assert_eq!(result.dates[1], date(2022, 2, 28));
    for row in result.iter() {
        assert!(row.lower <= row.point && row.point <= row.upper);
    }
}

#[test]
fn twenty_three_observations_is_insufficient() {
    let repo = repository();
    // Corse starts 2016-01; 23 observations end at 2017-11
    let req = ForecastRequest::new("Corse", date(2017, 11, 30), 12);
    let err = run_request(&repo, &ForecastEngine::default(), &req).unwrap_err();
    assert_eq!(
        err,
        ForecastError::InsufficientHistory {
            needed: 24,
            got: 23
        }
    );
    assert!(err.is_user_correctable());
}

#[test]
fn unknown_region_is_not_found() {
    let req = ForecastRequest::new("Guadeloupe", date(2019, 12, 31), 12);
    let err = run_request(&repository(), &ForecastEngine::default(), &req).unwrap_err();
    assert_eq!(err, ForecastError::NotFound("Guadeloupe".into()));
}

#[test]
fn non_positive_horizon_is_invalid() {
    let repo = repository();
    let engine = ForecastEngine::default();
    for horizon in [0, -1, -12] {
        let req = ForecastRequest::new("Normandie", date(2019, 12, 31), horizon);
        assert_eq!(
            run_request(&repo, &engine, &req).unwrap_err(),
            ForecastError::InvalidHorizon(horizon)
        );
    }
}

#[test]
fn repeated_requests_are_identical() {
    let repo = repository();
    let engine = ForecastEngine::default();
    let req = ForecastRequest::new("Normandie", date(2019, 6, 30), 18);
    let a = run_request(&repo, &engine, &req).unwrap();
    let b = run_request(&repo, &engine, &req).unwrap();
    assert_eq!(a, b);
}

#[test]
fn forecast_ignores_data_after_cutoff() {
    let start = date(2016, 1, 31);
    let mut values = consumption(48, 1.0);
    let original = ObservedSeries::from_values("Normandie", start, &values).unwrap();
    for v in values.iter_mut().skip(36) {
        *v *= 3.0;
    }
    let altered = ObservedSeries::from_values("Normandie", start, &values).unwrap();

    let engine = ForecastEngine::default();
    let cutoff = date(2018, 12, 31);
    let a = engine.forecast(&select(&original, cutoff).unwrap(), 6).unwrap();
    let b = engine.forecast(&select(&altered, cutoff).unwrap(), 6).unwrap();
    assert_eq!(a, b);
}

#[test]
fn every_offered_cutoff_is_accepted() {
    let repo = repository();
    let corse = repo.series_for("Corse").unwrap();
    let cutoffs = available_cutoffs(corse);
    assert_eq!(cutoffs.len(), 30 - MIN_HISTORY + 1);
    assert_eq!(cutoffs[0], date(2017, 12, 31));
    for cutoff in cutoffs {
        assert!(select(corse, cutoff).is_ok());
    }
}

#[test]
fn only_offered_cutoffs_are_accepted() {
    let repo = repository();
    let engine = ForecastEngine::default();
    // Corse runs 2016-01 to 2018-06
    let corse = repo.series_for("Corse").unwrap();
    let offered = available_cutoffs(corse);
    for cutoff in month_ends_after(date(2015, 12, 31), 48).unwrap() {
        assert_eq!(select(corse, cutoff).is_ok(), offered.contains(&cutoff));
    }

    let req = ForecastRequest::new("Corse", date(2030, 6, 30), 6);
    assert!(matches!(
        run_request(&repo, &engine, &req).unwrap_err(),
        ForecastError::InvalidInput(_)
    ));
}

#[test]
fn mid_month_cutoff_forecasts_from_next_month() {
    let req = ForecastRequest::new("Normandie", date(2019, 12, 15), 3);
    let resp = run_request(&repository(), &ForecastEngine::default(), &req).unwrap();
    assert_eq!(resp.history.last_date(), Some(date(2019, 12, 31)));
    assert_eq!(resp.forecast.first_date(), Some(date(2020, 1, 31)));
}

#[test]
fn csv_dataset_to_forecast() {
    let mut text = String::from("Territoire;Mois;Consommation totale\n");
    for (i, v) in consumption(36, 2.0).iter().enumerate() {
        let year = 2019 + i / 12;
        let month = i % 12 + 1;
        text.push_str(&format!("Pays de la Loire;{}-{:02};{:.3}\n", year, month, v));
    }
    let repo = read_csv(text.as_bytes(), &CsvSchema::default()).unwrap();
    let req = ForecastRequest::new("Pays de la Loire", date(2021, 12, 31), 6);
    let resp = run_request(&repo, &ForecastEngine::default(), &req).unwrap();
    assert_eq!(resp.history.len(), 36);
    assert_eq!(resp.forecast.first_date(), Some(date(2022, 1, 31)));
}

#[test]
fn records_with_gap_are_rejected() {
    let records = vec![
        Record::new("Centre-Val de Loire", date(2020, 1, 1), 1.0),
        Record::new("Centre-Val de Loire", date(2020, 3, 1), 1.0),
    ];
    assert!(SeriesRepository::from_records(records).is_err());
}

#[test]
fn custom_confidence_level_is_reported() {
    let engine = ForecastEngine::new(EngineOptions {
        confidence_level: 0.8,
        ..EngineOptions::default()
    })
    .unwrap();
    let req = ForecastRequest::new("Normandie", date(2019, 12, 31), 3);
    let resp = run_request(&repository(), &engine, &req).unwrap();
    assert_eq!(resp.forecast.confidence_level, 0.8);
}

#[test]
fn worker_shares_repository() {
    let repo = Arc::new(repository());
    let engine = ForecastEngine::default();
    let handles: Vec<_> = ["Normandie", "Corse"]
        .iter()
        .map(|r| {
            spawn_forecast(
                Arc::clone(&repo),
                engine.clone(),
                ForecastRequest::new(*r, date(2018, 6, 30), 6),
            )
        })
        .collect();
    for handle in handles {
        let resp = handle.wait(Duration::from_secs(300)).unwrap();
        assert_eq!(resp.forecast.len(), 6);
        assert_eq!(resp.history.last_date(), Some(date(2018, 6, 30)));
    }
}
