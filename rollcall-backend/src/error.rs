use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;

/// API error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub error: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<String>,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>) -> Self {
    Self {
      error: error.into(),
      details: None,
    }
  }

  pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
    Self {
      error: error.into(),
      details: Some(details.into()),
    }
  }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
  /// No snapshot has been published yet.
  NotReady,
  /// The active snapshot has no usable data for the requested path.
  NotFound(&'static str),
  ValidationError(String),
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::NotReady => {
        tracing::debug!("query before first snapshot");
        let error_response = ErrorResponse::with_details(
          "Snapshot not available yet",
          "The first refresh has not completed. Please try again later.",
        );
        (StatusCode::SERVICE_UNAVAILABLE, Json(error_response)).into_response()
      }
      AppError::NotFound(what) => {
        tracing::debug!(what, "no data in snapshot");
        let error_response = ErrorResponse::new(format!("No data for this {what}"));
        (StatusCode::NOT_FOUND, Json(error_response)).into_response()
      }
      AppError::ValidationError(msg) => {
        tracing::warn!(validation_error = %msg, "Validation failed");
        let error_response = ErrorResponse::new(msg);
        (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
      }
    }
  }
}

impl From<crate::validation::ValidationError> for AppError {
  fn from(err: crate::validation::ValidationError) -> Self {
    AppError::ValidationError(err.to_string())
  }
}
