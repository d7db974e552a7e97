use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use levelsmith_core::RelayError;
use serde::{Deserialize, Serialize};
use tracing::error;

// The request body is `levelsmith_core::GenerationRequest`; the success body
// is the model's level JSON as-is, so only the error and health shapes live here.

pub const GENERATION_FAILED: &str = "Failed to generate level";

// Output: what the game gets back when generation fails
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthBody {
    pub status: String,
}

impl HealthBody {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Every relay failure is logged and reported as a 500 with the error text.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(kind = self.0.kind(), error = %self.0, "Error generating level");
        let body = ErrorBody {
            error: GENERATION_FAILED.to_string(),
            message: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
