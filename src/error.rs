//! API error taxonomy and JSON rendering.
//!
//! Every error leaving a handler becomes a `{"success": false, "error": ...}`
//! body with the matching status code. Domain errors raised inside the
//! checkout transaction abort it wholesale; nothing partial persists.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, details: Vec<String> },

    #[error("{0}")]
    NotFound(String),

    #[error("Insufficient stock for {product}. Available: {available}")]
    InsufficientStock { product: String, available: i32 },

    #[error("{0}")]
    Conflict(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("database error")]
    Database(sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Validation { details: vec![message.clone()], message }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return Self::Conflict("Duplicate value for a unique field".to_string());
            }
        }
        Self::Database(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: invalid value"),
                })
            })
            .collect();
        let message = details
            .first()
            .cloned()
            .unwrap_or_else(|| "Invalid request".to_string());
        Self::Validation { message, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                Self::Database(e) => tracing::error!(error = %e, "database failure"),
                Self::Internal(e) => tracing::error!(error = %e, "unhandled failure"),
                _ => {}
            }
        }
        let mut body = serde_json::json!({
            "success": false,
            "error": match &self {
                Self::Database(_) | Self::Internal(_) => "Server error".to_string(),
                other => other.to_string(),
            },
        });
        match &self {
            Self::Validation { details, .. } if details.len() > 1 => {
                body["details"] = serde_json::json!(details);
            }
            Self::InsufficientStock { available, .. } => {
                body["available"] = serde_json::json!(available);
            }
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_product_and_quantity() {
        let err = ApiError::InsufficientStock { product: "Velvet Lipstick".into(), available: 2 };
        assert_eq!(err.to_string(), "Insufficient stock for Velvet Lipstick. Available: 2");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn insufficient_stock_body_reports_available_quantity() {
        let err = ApiError::InsufficientStock { product: "Velvet Lipstick".into(), available: 2 };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["available"], 2);
    }

    #[test]
    fn validation_keeps_first_rule_as_primary_message() {
        let err = ApiError::validation("No items in order");
        assert_eq!(err.to_string(), "No items in order");
    }
}
