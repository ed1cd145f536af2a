use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// `meta` block carried by every response, success or error
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub message: String,
    pub code: u16,
    pub status: &'static str,
}

impl Meta {
    pub fn success(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            code: status_code.as_u16(),
            status: "success",
        }
    }

    pub fn error(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            code: status_code.as_u16(),
            status: "error",
        }
    }
}

/// Builds the `{meta, data}` envelope
pub fn envelope(meta: &Meta, data: Value) -> Value {
    json!({
        "meta": meta,
        "data": data,
    })
}

/// Successful response wrapped in the `{meta, data}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, data, StatusCode::OK)
    }

    pub fn with_status(message: impl Into<String>, data: T, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            data,
            status_code,
        }
    }

    /// 201 Created
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                let meta = Meta::error("Failed to serialize response data", StatusCode::INTERNAL_SERVER_ERROR);
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope(&meta, Value::Null))).into_response();
            }
        };

        let meta = Meta::success(self.message, self.status_code);
        (self.status_code, Json(envelope(&meta, data_value))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_has_meta_and_data() {
        let meta = Meta::success("List of campaigns", StatusCode::OK);
        let value = envelope(&meta, json!([1, 2]));
        assert_eq!(
            value,
            json!({
                "meta": { "message": "List of campaigns", "code": 200, "status": "success" },
                "data": [1, 2]
            })
        );
    }

    #[test]
    fn created_response_uses_201() {
        let response = ApiResponse::created("Account has been created", json!({})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
