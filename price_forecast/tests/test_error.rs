use price_forecast::ForecastError;
use trade_math::MathError;

#[test]
fn test_math_error_conversion() {
    let err = ForecastError::from(MathError::InsufficientData("2 returns".to_string()));
    assert!(matches!(err, ForecastError::InsufficientData(_)));

    let err = ForecastError::from(MathError::InvalidInput("bad width".to_string()));
    assert!(matches!(err, ForecastError::InvalidParameter(_)));

    let err = ForecastError::from(MathError::CalculationError("singular".to_string()));
    assert!(matches!(err, ForecastError::Forecasting(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("horizon_days must be at least 1".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid parameter: horizon_days must be at least 1"
    );

    let error = ForecastError::DataUnavailable("Unknown ticker FOO".to_string());
    assert!(error.to_string().contains("Unknown ticker FOO"));
}

#[test]
fn test_conversion_keeps_message() {
    let err: ForecastError = MathError::CalculationError("no pivot".to_string()).into();

    if let ForecastError::Forecasting(msg) = err {
        assert_eq!(msg, "no pivot");
    } else {
        panic!("Wrong error variant");
    }
}
