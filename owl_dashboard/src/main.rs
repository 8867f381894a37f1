mod cli;
mod config;
mod error;
mod render;

use chrono::Local;
use clap::Parser;
use price_forecast::models::decomposition::{ComponentPoint, DecompositionForecaster};
use price_forecast::provider::{
    CachedProvider, CsvPriceProvider, PriceCache, PriceSeriesProvider, YahooChartProvider,
};
use price_forecast::{
    FittedModel, ForecastMethod, ForecastModel, ForecastOutput, Forecaster,
    LagRegressionForecaster, MonteCarloSimulator, PriceSeries,
};
use std::io;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::render::Report;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = DashboardConfig::from_env()?;
    cli.apply(&mut config);
    config.validate()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.list_tickers {
        return render::render_ticker_menu(&mut out, &config.tickers);
    }

    let ticker = config.resolve_ticker(cli.ticker.as_deref())?;
    let end = cli.end.unwrap_or_else(|| Local::now().date_naive());
    let method = ForecastMethod::from(cli.method);
    check_components_flag(method, cli.components)?;

    let provider = build_provider(&config)?;
    let series = provider.fetch(&ticker, config.start_date, end)?;
    info!(
        %ticker,
        rows = series.len(),
        first = %series.first().date,
        last = %series.last().date,
        "history loaded"
    );

    let (output, components) = if cli.components {
        let (output, components) = forecast_with_components(&series, config.horizon_days)?;
        (output, Some(components))
    } else {
        let output = build_forecaster(method, &config)?.run(&series, config.horizon_days)?;
        (output, None)
    };

    let report = Report {
        ticker: &ticker,
        method,
        history: series.tail(cli.tail),
        output: &output,
        components: components.as_deref(),
    };
    render::render(&mut out, &report, cli.format, cli.tail)
}

fn build_provider(
    config: &DashboardConfig,
) -> Result<CachedProvider<Box<dyn PriceSeriesProvider>>> {
    let inner: Box<dyn PriceSeriesProvider> = match &config.csv_dir {
        Some(dir) => Box::new(CsvPriceProvider::new(dir.clone())),
        None => Box::new(YahooChartProvider::new(config.http_timeout())?),
    };
    Ok(CachedProvider::new(inner, PriceCache::new(config.cache_ttl())))
}

fn build_forecaster(method: ForecastMethod, config: &DashboardConfig) -> Result<Forecaster> {
    let forecaster = match method {
        ForecastMethod::Decomposition => Forecaster::Decomposition(DecompositionForecaster::new()),
        ForecastMethod::LagRegression => {
            let model = LagRegressionForecaster::with_lags(config.lag_count)?;
            Forecaster::LagRegression(match config.seed {
                Some(seed) => model.with_seed(seed),
                None => model,
            })
        }
        ForecastMethod::MonteCarlo => Forecaster::MonteCarlo {
            simulator: config
                .seed
                .map_or_else(MonteCarloSimulator::new, MonteCarloSimulator::with_seed),
            path_count: config.path_count,
        },
    };
    Ok(forecaster)
}

/// Components are only defined for the decomposition model
fn check_components_flag(method: ForecastMethod, components: bool) -> Result<()> {
    if components && method != ForecastMethod::Decomposition {
        return Err(DashboardError::Config(format!(
            "--components requires --method decomposition, got {}",
            method
        )));
    }
    Ok(())
}

/// Forecast and component breakdown from a single decomposition fit
fn forecast_with_components(
    series: &PriceSeries,
    horizon_days: usize,
) -> Result<(ForecastOutput, Vec<ComponentPoint>)> {
    let fitted = DecompositionForecaster::new().fit(series)?;
    let forecast = fitted.predict(horizon_days)?;
    let components = fitted.components(horizon_days)?;
    Ok((ForecastOutput::Forecast(forecast), components))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecaster_follows_method_and_seed() {
        let config = DashboardConfig {
            seed: Some(11),
            path_count: 40,
            ..DashboardConfig::default()
        };

        let forecaster = build_forecaster(ForecastMethod::MonteCarlo, &config).unwrap();
        match forecaster {
            Forecaster::MonteCarlo {
                simulator,
                path_count,
            } => {
                assert_eq!(simulator.seed(), Some(11));
                assert_eq!(path_count, 40);
            }
            other => panic!("unexpected forecaster {:?}", other),
        }

        let lag = build_forecaster(ForecastMethod::LagRegression, &config).unwrap();
        assert_eq!(lag.name(), "Lag Regression (lags=5)");
    }

    #[test]
    fn components_flag_needs_decomposition() {
        assert!(check_components_flag(ForecastMethod::Decomposition, true).is_ok());
        assert!(check_components_flag(ForecastMethod::MonteCarlo, false).is_ok());

        let err = check_components_flag(ForecastMethod::LagRegression, true).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn components_align_with_forecast() {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let closes = (0..40).map(|i| 100.0 + i as f64 + (i % 4) as f64).collect();
        let series = PriceSeries::daily(start, closes).unwrap();

        let (output, components) = forecast_with_components(&series, 5).unwrap();
        let ForecastOutput::Forecast(forecast) = output else {
            panic!("decomposition must produce a forecast");
        };

        assert_eq!(forecast.len(), 45);
        assert_eq!(
            forecast.dates(),
            components.iter().map(|c| c.date).collect::<Vec<_>>()
        );
        for (point, c) in forecast.points().iter().zip(&components) {
            assert!((point.value - (c.trend + c.yearly + c.weekly)).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_lags_is_rejected() {
        let config = DashboardConfig {
            lag_count: 0,
            ..DashboardConfig::default()
        };
        let err = build_forecaster(ForecastMethod::LagRegression, &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
