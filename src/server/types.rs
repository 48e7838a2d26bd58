use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::chat::ResponseUsage;
use crate::error::Error;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub agent_name: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(status: &'static str) -> Self {
        Self {
            status,
            agent_name: "BlockchainBuddy",
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatApiRequest {
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatApiResponse {
    pub response: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub usage: ResponseUsage,
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub status: &'static str,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateAddressParams {
    pub address: String,
    pub chain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertParams {
    pub amount: Decimal,
    pub from_unit: String,
    pub to_unit: String,
}

/// JSON error envelope with the HTTP status it maps to.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Error::ModelProvider(_) | Error::CircuitBreakerOpen | Error::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let err = ApiError::from(Error::validation("bad input"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::from(Error::SessionNotFound("abc".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = ApiError::from(Error::model_provider("upstream down"));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err = ApiError::from(Error::CircuitBreakerOpen);
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err = ApiError::from(Error::chat("limit"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_chat_request_validation() {
        let request = ChatApiRequest {
            message: String::new(),
            session_id: None,
        };
        assert!(request.validate().is_err());

        let request = ChatApiRequest {
            message: "What is gas?".to_string(),
            session_id: Some("abc".to_string()),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_health_response_shape() {
        let value = serde_json::to_value(HealthResponse::new("online")).unwrap();
        assert_eq!(value["status"], "online");
        assert_eq!(value["agent_name"], "BlockchainBuddy");
        assert!(value["version"].is_string());
    }
}
