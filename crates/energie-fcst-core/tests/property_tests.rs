//! Property-based tests for window selection and forecasting.

use chrono::NaiveDate;
use energie_fcst_core::{
    available_cutoffs, month_ends_after, select, ForecastEngine, ForecastError, ObservedSeries,
    MIN_HISTORY,
};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;

fn series(values: &[f64]) -> ObservedSeries {
    let start = NaiveDate::from_ymd_opt(2015, 1, 31).unwrap();
    ObservedSeries::from_values("Ile-de-France", start, values).unwrap()
}

/// Strategy for monthly consumption: seasonal level plus bounded noise.
fn monthly_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (
            1000.0..10000.0_f64,
            50.0..1000.0_f64,
            prop::collection::vec(-1.0..1.0_f64, len),
        )
            .prop_map(|(level, amplitude, noise)| {
                noise
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        let t = i as f64;
                        level
                            + amplitude * (2.0 * std::f64::consts::PI * t / 12.0).sin()
                            + 0.05 * amplitude * e
                    })
                    .collect::<Vec<f64>>()
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn select_respects_minimum_history(len in 0usize..60, cut in 0usize..60) {
        let values: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
        let s = series(&values);
        let cutoff = month_ends_after(NaiveDate::from_ymd_opt(2014, 12, 31).unwrap(), cut + 1)
            .unwrap()[cut];
        let kept = len.min(cut + 1);

        let outcome = select(&s, cutoff);
        prop_assert_eq!(outcome.is_ok(), available_cutoffs(&s).contains(&cutoff));
        match outcome {
            Ok(t) => {
                prop_assert!(kept >= MIN_HISTORY && cut < len);
                prop_assert_eq!(t.len(), kept);
                prop_assert_eq!(t.last_date(), Some(cutoff));
            }
            Err(ForecastError::InsufficientHistory { needed, got }) => {
                prop_assert!(kept < MIN_HISTORY);
                prop_assert_eq!((needed, got), (MIN_HISTORY, kept));
            }
            Err(e) => {
                prop_assert!(kept >= MIN_HISTORY && cut >= len);
                prop_assert!(matches!(e, ForecastError::InvalidInput(_)), "unexpected {:?}", e);
            }
        }
    }

    #[test]
    fn non_positive_horizon_always_rejected(horizon in i64::MIN..=0) {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let err = ForecastEngine::default().forecast(&series(&values), horizon).unwrap_err();
        prop_assert_eq!(err, ForecastError::InvalidHorizon(horizon));
    }
}

/// Forecasts over generated seasonal series are dated after the last
/// observation and keep `lower <= point <= upper`. Convergence failures are
/// tolerated only as a small share of the cases.
#[test]
fn forecasts_are_dated_and_ordered() {
    const CASES: usize = 16;
    let strategy = (monthly_strategy(24, 48), 1i64..24);
    let mut runner = TestRunner::deterministic();
    let mut converged = 0;

    for _ in 0..CASES {
        let (values, horizon) = strategy.new_tree(&mut runner).unwrap().current();
        let s = series(&values);
        let last = s.last_date().unwrap();

        match ForecastEngine::default().forecast(&s, horizon) {
            Ok(result) => {
                converged += 1;
                assert_eq!(result.len(), horizon as usize);
                assert_eq!(result.dates, month_ends_after(last, horizon as usize).unwrap());
                for row in result.iter() {
                    assert!(row.lower <= row.point, "{:?}", row);
                    assert!(row.point <= row.upper, "{:?}", row);
                }
            }
            Err(e) => assert!(matches!(e, ForecastError::Convergence(_)), "unexpected {:?}", e),
        }
    }

    assert!(
        converged * 4 >= CASES * 3,
        "only {} of {} fits converged",
        converged,
        CASES
    );
}
