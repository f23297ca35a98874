use std::io::Write;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::report::SymbolReport;

pub fn render(
    out: &mut impl Write,
    reports: &[SymbolReport],
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for report in reports {
                render_text(out, report)?;
            }
        }
    }
    Ok(())
}

fn render_text(out: &mut impl Write, report: &SymbolReport) -> Result<(), CliError> {
    writeln!(out, "\n=== {} ===", report.symbol)?;
    match report.current_price {
        Some(price) => writeln!(out, "Current Price: {price:.2}")?,
        None => writeln!(out, "Current Price: unavailable")?,
    }
    match report.predicted_close {
        Some(prediction) => writeln!(out, "AI Predicted Next Close: {prediction:.2}")?,
        None => writeln!(out, "AI Predicted Next Close: prediction unavailable")?,
    }

    let Some(insights) = &report.insights else {
        writeln!(out, "\nAI Insights: insights unavailable")?;
        return Ok(());
    };

    writeln!(out, "\nAI Insights:")?;
    writeln!(out, "  Breakout Confirmation: {}", insights.breakout_confirmation)?;
    writeln!(out, "  Breakout Prediction: {}", insights.breakout_prediction)?;
    writeln!(out, "  Near Breakout: {}", insights.near_breakout)?;
    writeln!(
        out,
        "  Direction: {} {}",
        insights.direction.as_str(),
        insights.direction_symbol
    )?;
    writeln!(out, "  Forecast: {}", insights.forecast)?;
    writeln!(out, "  Chart Pattern: {}", insights.chart_pattern)?;

    writeln!(out, "\nLatest News:")?;
    for news in &insights.news {
        writeln!(out, "  - {}: {}", news.title, news.summary)?;
    }
    writeln!(out, "\nUpcoming Events:")?;
    for event in &insights.events {
        writeln!(out, "  - {} on {}", event.event, event.date)?;
    }
    Ok(())
}
