mod cli;
mod error;
mod render;
mod report;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use stocksense_core::{
    logging, AcquisitionConfig, HttpClient, MarketData, NoopHttpClient, ReqwestHttpClient,
};
use stocksense_ml::PredictorConfig;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    logging::init(&cli.log_dir, logging::DEFAULT_FILTER).map_err(CliError::Logging)?;

    let symbols = cli.resolve_symbols(&mut io::stdin().lock(), &mut io::stdout())?;

    let http_client: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    let acquisition =
        AcquisitionConfig::default().with_timeout(Duration::from_millis(cli.timeout_ms));
    let market = MarketData::from_config(http_client, &acquisition);
    let config = PredictorConfig::default().with_model_dir(&cli.model_dir);

    let handles: Vec<_> = symbols
        .into_iter()
        .map(|symbol| {
            tokio::spawn(report::build_report(
                market.clone(),
                config.clone(),
                symbol,
            ))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(error) => tracing::error!(%error, "symbol task aborted"),
        }
    }

    render::render(&mut io::stdout().lock(), &reports, cli.format)?;

    if reports.iter().any(|report| report.predicted_close.is_none()) {
        return Ok(ExitCode::from(3));
    }
    Ok(ExitCode::SUCCESS)
}
