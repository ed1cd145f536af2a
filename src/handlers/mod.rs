// Request handlers: decode and validate input, call services, shape envelopes.
//
// Public:    /api/v1/users, /api/v1/sessions, /api/v1/email_checkers,
//            GET /api/v1/campaigns[/:id]
// Protected: /api/v1/avatars, POST/PUT /api/v1/campaigns, /api/v1/campaign-images
//            (bearer token resolved by middleware::require_auth)

pub mod campaigns;
pub mod uploads;
pub mod users;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::api::response::{envelope, Meta};
use crate::api::{ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::server::AppState;

/// Unwraps a JSON body, reporting decode failures under `context`
pub(crate) fn decode_json<T>(payload: Result<Json<T>, JsonRejection>, context: &str) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => {
            Err(ApiError::bad_request(context, "Content Type must be application/json"))
        }
        Err(rejection) => Err(ApiError::bad_request(context, rejection.body_text())),
    }
}

/// GET /api/v1 - service banner
pub async fn root() -> ApiResult<Value> {
    Ok(ApiResponse::success(
        "Crowdfund API",
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "users": "POST /api/v1/users",
                "sessions": "POST /api/v1/sessions",
                "email_checkers": "POST /api/v1/email_checkers",
                "avatars": "POST /api/v1/avatars (bearer)",
                "campaigns": "GET /api/v1/campaigns[?user_id=], GET /api/v1/campaigns/:id, POST|PUT (bearer)",
                "campaign_images": "POST /api/v1/campaign-images (bearer)",
            }
        }),
    ))
}

/// GET /health - database ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(database) = state.database.as_ref() else {
        let meta = Meta::success("ok", StatusCode::OK);
        return (
            StatusCode::OK,
            Json(envelope(&meta, json!({ "status": "ok", "timestamp": now, "database": "not configured" }))),
        );
    };

    match database.health_check().await {
        Ok(_) => {
            let meta = Meta::success("ok", StatusCode::OK);
            (
                StatusCode::OK,
                Json(envelope(&meta, json!({ "status": "ok", "timestamp": now, "database": "ok" }))),
            )
        }
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            let meta = Meta::error("database unavailable", StatusCode::SERVICE_UNAVAILABLE);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(envelope(&meta, json!({ "status": "degraded", "timestamp": now }))),
            )
        }
    }
}
