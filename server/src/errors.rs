// threadmint_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use threadmint::SyncError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Chain Error: {0}")]
  Chain(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<SyncError> for AppError {
  fn from(err: SyncError) -> Self {
    match err {
      SyncError::NotFound(m) => AppError::NotFound(m),
      SyncError::InvalidInput(m) => AppError::Validation(m),
      SyncError::Configuration(m) => AppError::Config(m),
      SyncError::Database(e) => AppError::Sqlx(e),
      e if e.is_chain_failure() => AppError::Chain(e.to_string()),
      e => AppError::Internal(e.to_string()),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"message": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"message": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"message": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(e) => HttpResponse::InternalServerError()
        .json(json!({"message": "Database operation failed", "detail": e.to_string()})),
      AppError::Chain(m) => {
        HttpResponse::InternalServerError().json(json!({"message": "Blockchain operation failed", "detail": m}))
      }
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"message": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
