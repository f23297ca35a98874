use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use stocksense_core::{
    logging, AcquisitionConfig, HttpClient, MarketData, NoopHttpClient, ReqwestHttpClient,
};
use stocksense_ml::{Predictor, PredictorConfig, DEFAULT_RETRAIN_WORKERS};
use stocksense_web::{serve, AppState};

const WEB_LOG_FILTER: &str = "stocksense=info,tower_http=debug";

/// StockSense web dashboard.
#[derive(Debug, Parser)]
#[command(name = "stocksense-web", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Directory holding `{SYMBOL}_model` artifacts.
    #[arg(long, default_value = stocksense_ml::config::DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,

    /// Request timeout budget in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Use deterministic offline data instead of the live providers.
    #[arg(long, default_value_t = false)]
    mock: bool,

    #[arg(long, default_value = logging::DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Maximum concurrent background retrains.
    #[arg(long, default_value_t = DEFAULT_RETRAIN_WORKERS)]
    retrain_workers: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(1)
        }
    }
}

async fn run() -> std::io::Result<()> {
    let args = Args::parse();
    logging::init(&args.log_dir, WEB_LOG_FILTER)?;

    let http_client: Arc<dyn HttpClient> = if args.mock {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    let acquisition =
        AcquisitionConfig::default().with_timeout(Duration::from_millis(args.timeout_ms));
    let market = MarketData::from_config(http_client, &acquisition);
    let predictor = Predictor::new(
        market,
        PredictorConfig::default().with_model_dir(&args.model_dir),
    );
    let state = AppState::new(predictor, args.retrain_workers);

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(addr = %args.bind, mock = args.mock, "listening");
    serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
