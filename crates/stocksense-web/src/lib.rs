//! # StockSense Web
//!
//! axum dashboard and JSON API over the StockSense predictor.
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /` | Dashboard for the default symbol |
//! | `POST /` | Dashboard for the submitted `symbol`, `period` and `theme` |
//! | `GET /table` | History table fragment for `symbol` and `period` |
//! | `GET /api/insights?symbols=A,B` | Predictions and insights as JSON |
//! | `POST /api/retrain/:symbol` | Schedule a background refit |

pub mod error;
pub mod render;
pub mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use stocksense_ml::{Predictor, RetrainPool};
use tower_http::trace::TraceLayer;

/// Shared handler state. Cloning shares the predictor and pool.
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub retrain: Arc<RetrainPool>,
}

impl AppState {
    pub fn new(predictor: Predictor, retrain_workers: usize) -> Self {
        let predictor = Arc::new(predictor);
        let retrain = Arc::new(RetrainPool::new(Arc::clone(&predictor), retrain_workers));
        Self { predictor, retrain }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index).post(routes::index_submit))
        .route("/table", get(routes::history_table))
        .route("/api/insights", get(routes::insights))
        .route("/api/retrain/:symbol", post(routes::retrain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then wait for scheduled retrains to finish.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!(pending = state.retrain.in_flight(), "draining retrains");
    state.retrain.drain().await;
    Ok(())
}
