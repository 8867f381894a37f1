//! Table and JSON rendering of a dashboard run

use crate::cli::OutputFormat;
use crate::error::Result;
use price_forecast::models::decomposition::ComponentPoint;
use price_forecast::{
    ForecastMethod, ForecastOutput, ForecastResult, PricePoint, SimulationBundle,
};
use serde::Serialize;
use std::io::Write;

const DISCLAIMER: &str = "For experimentation only. Not investment advice.";

/// Everything one dashboard run shows
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub ticker: &'a str,
    pub method: ForecastMethod,
    pub history: &'a [PricePoint],
    pub output: &'a ForecastOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<&'a [ComponentPoint]>,
}

pub fn render<W: Write>(
    out: &mut W,
    report: &Report<'_>,
    format: OutputFormat,
    tail: usize,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Table => render_table(out, report, tail)?,
    }
    Ok(())
}

pub fn render_ticker_menu<W: Write>(out: &mut W, tickers: &[String]) -> Result<()> {
    for ticker in tickers {
        writeln!(out, "{}", ticker)?;
    }
    Ok(())
}

fn tail_of<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

fn render_table<W: Write>(out: &mut W, report: &Report<'_>, tail: usize) -> Result<()> {
    writeln!(out, "{} ({})", report.ticker, report.method)?;
    writeln!(out, "{}", DISCLAIMER)?;

    writeln!(
        out,
        "\nHistory ({} rows, last {})",
        report.history.len(),
        tail.min(report.history.len())
    )?;
    writeln!(out, "{:<12} {:>14} {:>14}", "Date", "Open", "Close")?;
    for point in tail_of(report.history, tail) {
        writeln!(
            out,
            "{:<12} {:>14.2} {:>14.2}",
            point.date, point.open, point.close
        )?;
    }

    match report.output {
        ForecastOutput::Forecast(result) => render_forecast(out, result, tail)?,
        ForecastOutput::Simulation(bundle) => render_simulation(out, bundle, tail)?,
    }

    if let Some(components) = report.components {
        writeln!(out, "\nComponents")?;
        writeln!(
            out,
            "{:<12} {:>14} {:>14} {:>14}",
            "Date", "Trend", "Yearly", "Weekly"
        )?;
        for c in tail_of(components, tail) {
            writeln!(
                out,
                "{:<12} {:>14.2} {:>14.2} {:>14.2}",
                c.date, c.trend, c.yearly, c.weekly
            )?;
        }
    }

    Ok(())
}

fn render_forecast<W: Write>(out: &mut W, result: &ForecastResult, tail: usize) -> Result<()> {
    writeln!(out, "\nForecast: {} ({} points)", result.model(), result.len())?;
    writeln!(
        out,
        "{:<12} {:>14} {:>14} {:>14}",
        "Date", "Value", "Lower", "Upper"
    )?;

    let bound = |b: Option<f64>| b.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    for point in result.tail(tail) {
        writeln!(
            out,
            "{:<12} {:>14.2} {:>14} {:>14}",
            point.date,
            point.value,
            bound(point.lower_bound),
            bound(point.upper_bound)
        )?;
    }
    Ok(())
}

fn render_simulation<W: Write>(
    out: &mut W,
    bundle: &SimulationBundle,
    tail: usize,
) -> Result<()> {
    writeln!(
        out,
        "\nMonte Carlo: {} paths over {} days (drift {:.5}, volatility {:.5})",
        bundle.path_count(),
        bundle.horizon(),
        bundle.drift(),
        bundle.volatility()
    )?;

    let mean = bundle.mean_path()?;
    let lower = bundle.quantile_path(0.1)?;
    let upper = bundle.quantile_path(0.9)?;

    writeln!(
        out,
        "{:<12} {:>14} {:>14} {:>14}",
        "Date", "Mean", "P10", "P90"
    )?;
    let first = bundle.dates().len().saturating_sub(tail);
    for (i, date) in bundle.dates().iter().enumerate().skip(first) {
        writeln!(
            out,
            "{:<12} {:>14.2} {:>14.2} {:>14.2}",
            date, mean[i], lower[i], upper[i]
        )?;
    }

    let terminal = bundle.terminal_prices();
    let (min, max) = terminal
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    writeln!(out, "Terminal range: {:.2} .. {:.2}", min, max)?;
    Ok(())
}
