use chrono::NaiveDate;
use price_forecast::{
    DecompositionForecaster, ForecastModel, LagRegressionForecaster, MonteCarloSimulator,
    PriceSeries,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Price Forecast: Basic Forecasting Example");
    println!("=========================================\n");

    let data = create_sample_daily_data()?;
    println!(
        "Sample data created: {} daily closes from {} to {}\n",
        data.len(),
        data.first().date,
        data.last().date
    );

    // Trend + seasonality with an 80% interval
    let decomposition = DecompositionForecaster::new().fit_predict(&data, 7)?;
    println!("Decomposition forecast (7 days):");
    for point in decomposition.after(data.last().date) {
        println!(
            "  {}: {:.2} ({:.2} .. {:.2})",
            point.date,
            point.value,
            point.lower_bound.unwrap_or(f64::NAN),
            point.upper_bound.unwrap_or(f64::NAN)
        );
    }

    // Random forest on the last five closes
    let lag = LagRegressionForecaster::new().with_seed(7).fit_predict(&data, 7)?;
    println!("\nLag regression forecast (7 days):");
    for point in lag.points() {
        println!("  {}: {:.2}", point.date, point.value);
    }

    // 500 price paths with a fixed seed
    let bundle = MonteCarloSimulator::with_seed(7).simulate(&data, 7, 500)?;
    let mean = bundle.mean_path()?;
    let lower = bundle.quantile_path(0.1)?;
    let upper = bundle.quantile_path(0.9)?;
    println!(
        "\nMonte Carlo (500 paths, drift {:.4}, volatility {:.4}):",
        bundle.drift(),
        bundle.volatility()
    );
    for (i, date) in bundle.dates().iter().enumerate().skip(1) {
        println!(
            "  {}: mean {:.2}, 10%-90% {:.2} .. {:.2}",
            date, mean[i], lower[i], upper[i]
        );
    }

    Ok(())
}

/// Create sample daily data with a trend and a weekly cycle
fn create_sample_daily_data() -> Result<PriceSeries, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let closes = (0..120)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.3 * t + 2.0 * (2.0 * std::f64::consts::PI * t / 7.0).sin()
        })
        .collect();

    Ok(PriceSeries::daily(start, closes)?)
}
