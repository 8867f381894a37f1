use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use price_forecast::{
    DecompositionForecaster, ForecastError, ForecastMethod, ForecastOutput, Forecaster,
    LagRegressionForecaster, MonteCarloSimulator, PriceSeries,
};
use rstest::rstest;
use std::str::FromStr;

fn create_test_data() -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let closes = (0..120)
        .map(|i| 30_000.0 + 50.0 * i as f64 + 400.0 * (i as f64 / 5.0).sin())
        .collect();
    PriceSeries::daily(start, closes).unwrap()
}

fn forecaster_for(method: ForecastMethod) -> Forecaster {
    match method {
        ForecastMethod::Decomposition => Forecaster::Decomposition(DecompositionForecaster::new()),
        ForecastMethod::LagRegression => {
            Forecaster::LagRegression(LagRegressionForecaster::new().with_seed(1))
        }
        ForecastMethod::MonteCarlo => Forecaster::MonteCarlo {
            simulator: MonteCarloSimulator::with_seed(1),
            path_count: 20,
        },
    }
}

#[rstest]
#[case("decomposition", ForecastMethod::Decomposition)]
#[case("lag-regression", ForecastMethod::LagRegression)]
#[case("Lag_Regression", ForecastMethod::LagRegression)]
#[case(" monte-carlo ", ForecastMethod::MonteCarlo)]
fn test_method_from_str(#[case] input: &str, #[case] expected: ForecastMethod) {
    assert_eq!(ForecastMethod::from_str(input).unwrap(), expected);
}

#[test]
fn test_method_round_trips_through_display() {
    for method in [
        ForecastMethod::Decomposition,
        ForecastMethod::LagRegression,
        ForecastMethod::MonteCarlo,
    ] {
        assert_eq!(method.to_string().parse::<ForecastMethod>().unwrap(), method);
    }

    let result = "prophet".parse::<ForecastMethod>();
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[rstest]
#[case(ForecastMethod::Decomposition)]
#[case(ForecastMethod::LagRegression)]
#[case(ForecastMethod::MonteCarlo)]
fn test_run_each_method(#[case] method: ForecastMethod) {
    let data = create_test_data();
    let forecaster = forecaster_for(method);
    assert_eq!(forecaster.method(), method);

    let output = forecaster.run(&data, 14).unwrap();
    match (method, output) {
        (ForecastMethod::Decomposition, ForecastOutput::Forecast(result)) => {
            assert_eq!(result.len(), data.len() + 14);
            assert_eq!(result.after(data.last().date).len(), 14);
        }
        (ForecastMethod::LagRegression, ForecastOutput::Forecast(result)) => {
            assert_eq!(result.len(), 14);
            assert!(result.points()[0].date > data.last().date);
        }
        (ForecastMethod::MonteCarlo, ForecastOutput::Simulation(bundle)) => {
            assert_eq!(bundle.path_count(), 20);
            assert_eq!(bundle.horizon(), 14);
        }
        (method, output) => panic!("{} produced unexpected output {:?}", method, output),
    }
}

#[test]
fn test_runs_do_not_share_state() {
    let data = create_test_data();
    let forecaster = forecaster_for(ForecastMethod::LagRegression);

    let first = forecaster.run(&data, 7).unwrap();
    let second = forecaster.run(&data, 7).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_output_serializes_with_kind_tag() {
    let data = create_test_data();
    let output = forecaster_for(ForecastMethod::LagRegression)
        .run(&data, 2)
        .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["kind"], "forecast");
    assert_eq!(json["data"]["points"].as_array().unwrap().len(), 2);
}

#[test]
fn test_zero_horizon_rejected_by_every_method() {
    let data = create_test_data();
    for method in [
        ForecastMethod::Decomposition,
        ForecastMethod::LagRegression,
        ForecastMethod::MonteCarlo,
    ] {
        let result = forecaster_for(method).run(&data, 0);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }
}
