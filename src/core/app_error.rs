use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{domain::errors::OrderError, notifications::NotificationError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-readable kind carried in every error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Order(OrderError::Validation { .. }) => "validation_error",
            AppError::Order(OrderError::NotFound(_)) => "not_found",
            AppError::Order(OrderError::InvalidTransition { .. }) => "invalid_transition",
            AppError::Order(OrderError::FeedbackNotAllowed(_)) => "feedback_not_allowed",
            AppError::Notification(_) => "notification_error",
            AppError::Order(OrderError::Persistence(_)) | AppError::Other(_) => {
                "persistence_error"
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Order(OrderError::Validation { .. }) => StatusCode::BAD_REQUEST,
            AppError::Order(OrderError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Order(OrderError::InvalidTransition { .. })
            | AppError::Order(OrderError::FeedbackNotAllowed(_)) => StatusCode::CONFLICT,
            AppError::Notification(_) => StatusCode::BAD_GATEWAY,
            AppError::Order(OrderError::Persistence(_)) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (message, field) = match &self {
            AppError::Order(OrderError::Validation { field, message }) => {
                (message.clone(), Some(field.clone()))
            }
            AppError::Order(OrderError::Persistence(err)) => {
                tracing::error!("Persistence failure: {:#}", err);
                ("Internal persistence failure".to_string(), None)
            }
            AppError::Other(err) => {
                tracing::error!("Internal failure: {:#}", err);
                ("Internal persistence failure".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                kind: self.kind().to_string(),
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Success envelope: `{ "success": true, "data": ..., "message": ... }`.
#[derive(Serialize, ToSchema)]
pub struct StdResponse<T, M> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<M>,
}

#[derive(Serialize)]
struct Envelope<'a, T, M> {
    success: bool,
    #[serde(flatten)]
    body: &'a StdResponse<T, M>,
}

impl<T: Serialize, M: Serialize> IntoResponse for StdResponse<T, M> {
    fn into_response(self) -> Response {
        Json(Envelope {
            success: true,
            body: &self,
        })
        .into_response()
    }
}
