use axum::{
    extract::{rejection::JsonRejection, multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};

use super::decode_json;
use super::uploads::{avatar_file_name, read_form, store};
use crate::api::format::{format_user, UserFormatter};
use crate::api::{ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::services::{CheckEmailInput, LoginUserInput, RegisterUserInput};

/// POST /api/v1/users
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterUserInput>, JsonRejection>,
) -> ApiResult<UserFormatter> {
    const CONTEXT: &str = "Failed register user";

    let input = decode_json(payload, CONTEXT)?;
    input
        .validate()
        .map_err(|errors| ApiError::unprocessable_entity(CONTEXT, errors))?;

    let user = state
        .users
        .register(input)
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    let token = state.tokens.issue(user.id).map_err(|e| ApiError::from(e).context(CONTEXT))?;

    Ok(ApiResponse::created("Account has been created", format_user(&user, token)))
}

/// POST /api/v1/sessions
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginUserInput>, JsonRejection>,
) -> ApiResult<UserFormatter> {
    const CONTEXT: &str = "Failed login user";

    let input = decode_json(payload, CONTEXT)?;
    input
        .validate()
        .map_err(|errors| ApiError::unprocessable_entity(CONTEXT, errors))?;

    let user = state
        .users
        .login(input)
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    let token = state.tokens.issue(user.id).map_err(|e| ApiError::from(e).context(CONTEXT))?;

    Ok(ApiResponse::created("Login Successfully", format_user(&user, token)))
}

/// POST /api/v1/email_checkers
pub async fn check_email(
    State(state): State<AppState>,
    payload: Result<Json<CheckEmailInput>, JsonRejection>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed check email";

    let input = decode_json(payload, CONTEXT)?;
    input
        .validate()
        .map_err(|errors| ApiError::unprocessable_entity(CONTEXT, errors))?;

    let is_available = state
        .users
        .is_email_available(&input.email)
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    Ok(ApiResponse::success(
        "Success check available email",
        json!({ "is_available": is_available }),
    ))
}

/// POST /api/v1/avatars (multipart: `avatar` file, optional `alias`)
///
/// The avatar name is recorded before the file is written; a failed write
/// leaves the record pointing at a file that does not exist.
pub async fn upload_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to upload avatar";

    let form = read_form(multipart, "avatar", CONTEXT).await?;
    let Some(file) = form.file.as_ref().filter(|f| !f.file_name.is_empty()) else {
        return Err(ApiError::unprocessable_entity(CONTEXT, vec!["avatar is required".to_string()]));
    };

    let file_name = avatar_file_name(user.id, &file.file_name, form.field("alias"));

    state
        .users
        .save_avatar(user.id, &file_name)
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    if let Err(e) = store(&state.upload_dir, &file_name, &file.bytes).await {
        tracing::error!("Failed to write avatar {} for user {}: {}", file_name, user.id, e);
        return Err(ApiError::bad_request(CONTEXT, json!({ "is_uploaded": false })));
    }

    tracing::info!("User {} uploaded avatar {}", user.id, file_name);
    Ok(ApiResponse::with_status(
        "Avatar successfully uploaded",
        json!({ "is_uploaded": true }),
        StatusCode::CREATED,
    ))
}
