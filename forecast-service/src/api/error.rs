use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Request rejected before any aggregation runs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Content-Type must be application/json")]
    NotJson,
    #[error("Request body is empty")]
    EmptyBody,
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("appliances must be a non-empty list")]
    Appliances,
    #[error("range must be 'month' or 'year'")]
    Range,
    #[error("{0} must be an integer")]
    NotInteger(&'static str),
    #[error("predictionMonth must be between 1 and 12")]
    MonthOutOfRange,
    #[error("{field} is out of range")]
    OutOfRange { field: &'static str },
    #[error("Unknown appliance: {0}")]
    UnknownAppliance(String),
    #[error("Malformed request body: {0}")]
    Body(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(e) => {
                metrics::counter!("api_validation_errors_total").increment(1);
                tracing::debug!(error = %e, "request rejected");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
