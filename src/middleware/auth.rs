use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::models::User;
use crate::error::ApiError;
use crate::server::AppState;

/// Authenticated caller resolved by [`require_auth`]
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

/// Stage at which bearer authentication gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingBearer,
    InvalidToken,
    UnknownUser,
    LookupFailed,
}

/// Bearer authentication middleware: header → token → claims → user.
/// Any failed step answers 401 with the error envelope.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await.map_err(|failure| {
        tracing::debug!("Rejected {} {}: {:?}", request.method(), request.uri().path(), failure);
        ApiError::unauthorized()
    })?;

    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, AuthFailure> {
    let token = extract_bearer_token(headers)?;

    let claims = state.tokens.validate(&token).map_err(|_| AuthFailure::InvalidToken)?;

    match state.users.get_user_by_id(claims.user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthFailure::UnknownUser),
        Err(e) => {
            tracing::warn!("User lookup failed during authentication: {}", e);
            Err(AuthFailure::LookupFailed)
        }
    }
}

/// The header must mention `Bearer`; the token is the second of exactly two space-separated parts
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthFailure> {
    let auth_str = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !auth_str.contains("Bearer") {
        return Err(AuthFailure::MissingBearer);
    }

    let parts: Vec<&str> = auth_str.split(' ').collect();
    let token = if parts.len() == 2 { parts[1] } else { "" };
    Ok(token.to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_second_part_of_bearer_header() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_header_is_rejected_before_token_checks() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Err(AuthFailure::MissingBearer));
        assert_eq!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")), Err(AuthFailure::MissingBearer));
    }

    #[test]
    fn extra_parts_yield_empty_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer a b")).unwrap(), "");
        assert_eq!(extract_bearer_token(&headers("Bearer")).unwrap(), "");
    }
}
