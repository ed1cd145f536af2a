// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use crate::api::response::{envelope, Meta};
use crate::auth::TokenError;
use crate::database::DatabaseError;
use crate::services::{CampaignError, UserError};

/// HTTP API error rendered as the `{meta, data}` error envelope
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest { message: String, detail: Value },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound { message: String, detail: Value },

    // 422 Unprocessable Entity
    UnprocessableEntity { message: String, errors: Vec<String> },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe message placed in `meta.message`
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound { message, .. } => message,
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Payload placed in `data`
    pub fn detail(&self) -> Value {
        match self {
            ApiError::BadRequest { detail, .. } | ApiError::NotFound { detail, .. } => detail.clone(),
            ApiError::UnprocessableEntity { errors, .. } => Value::from(errors.clone()),
            _ => Value::Null,
        }
    }

    pub fn to_json(&self) -> Value {
        let meta = Meta::error(self.message(), self.status_code());
        envelope(&meta, self.detail())
    }

    /// Replaces the headline message; the previous one becomes the detail if none was set.
    /// Server-side errors keep their generic message.
    pub fn context(self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self {
            ApiError::BadRequest { message: previous, detail } => ApiError::BadRequest {
                detail: or_previous(detail, previous),
                message,
            },
            ApiError::NotFound { message: previous, detail } => ApiError::NotFound {
                detail: or_previous(detail, previous),
                message,
            },
            ApiError::UnprocessableEntity { errors, .. } => ApiError::UnprocessableEntity { message, errors },
            other => other,
        }
    }
}

fn or_previous(detail: Value, previous: String) -> Value {
    if detail.is_null() {
        Value::String(previous)
    } else {
        detail
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, detail: impl Into<Value>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            detail: Value::Null,
        }
    }

    pub fn unprocessable_entity(message: impl Into<String>, errors: Vec<String>) -> Self {
        ApiError::UnprocessableEntity {
            message: message.into(),
            errors,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailTaken | UserError::InvalidCredentials => {
                ApiError::bad_request(err.to_string(), Value::Null)
            }
            UserError::NotFound(_) => ApiError::not_found(err.to_string()),
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hashing failed: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            UserError::Database(db) => db.into(),
        }
    }
}

impl From<CampaignError> for ApiError {
    fn from(err: CampaignError) -> Self {
        match err {
            CampaignError::NotFound(_) => ApiError::not_found(err.to_string()),
            CampaignError::NotOwner | CampaignError::UpdateFailed => {
                ApiError::bad_request(err.to_string(), Value::Null)
            }
            CampaignError::Database(db) => db.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Generation(msg) => {
                tracing::error!("Token generation failed: {}", msg);
                ApiError::internal_server_error("Failed to issue token")
            }
            _ => ApiError::unauthorized(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
