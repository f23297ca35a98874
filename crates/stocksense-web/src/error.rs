use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stocksense_core::{SourceError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("missing parameter '{0}'")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("upstream data unavailable: {0}")]
    Upstream(#[from] SourceError),
}

impl WebError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
