use axum::{
    extract::{rejection::JsonRejection, multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::decode_json;
use super::uploads::{campaign_image_file_name, read_form, store};
use crate::api::format::{
    format_campaign, format_campaign_detail, format_campaigns, CampaignDetailFormatter, CampaignFormatter,
};
use crate::api::{ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::server::AppState;
use crate::services::{CampaignImageInput, CampaignInput};

#[derive(Debug, Default, Deserialize)]
pub struct ListCampaignsQuery {
    pub user_id: Option<String>,
}

impl ListCampaignsQuery {
    /// Missing, non-numeric and zero ids all mean "every campaign"
    pub fn owner_filter(&self) -> Option<i64> {
        self.user_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|id| *id != 0)
    }
}

fn parse_campaign_id(raw: &str, context: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|e| ApiError::bad_request(context, format!("invalid campaign id {:?}: {}", raw, e)))
}

/// GET /api/v1/campaigns[?user_id=]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListCampaignsQuery>,
) -> ApiResult<Vec<CampaignFormatter>> {
    let campaigns = state
        .campaigns
        .get_campaigns(query.owner_filter())
        .await
        .map_err(|e| ApiError::from(e).context("Failed to get campaigns"))?;

    Ok(ApiResponse::success("List of campaigns", format_campaigns(&campaigns)))
}

/// GET /api/v1/campaigns/:id
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CampaignDetailFormatter> {
    const CONTEXT: &str = "Failed to get detail campaign";

    let id = parse_campaign_id(&id, CONTEXT)?;
    let campaign = state
        .campaigns
        .get_campaign_detail(id)
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    Ok(ApiResponse::success("Detail Campaign", format_campaign_detail(&campaign)))
}

/// POST /api/v1/campaigns
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CampaignInput>, JsonRejection>,
) -> ApiResult<CampaignFormatter> {
    const CONTEXT: &str = "Failed to create campaign";

    let input = decode_json(payload, CONTEXT)?;
    input
        .validate()
        .map_err(|errors| ApiError::unprocessable_entity(CONTEXT, errors))?;

    let campaign = state
        .campaigns
        .create(input, &user)
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    Ok(ApiResponse::created("Success to create campaign", format_campaign(&campaign)))
}

/// PUT /api/v1/campaigns/:id
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<CampaignInput>, JsonRejection>,
) -> ApiResult<CampaignFormatter> {
    const CONTEXT: &str = "Failed to update campaign";

    let id = parse_campaign_id(&id, CONTEXT)?;
    let input = decode_json(payload, CONTEXT)?;
    input
        .validate()
        .map_err(|errors| ApiError::unprocessable_entity(CONTEXT, errors))?;

    let campaign = state
        .campaigns
        .update(id, input, &user)
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    Ok(ApiResponse::success("Success to update campaign", format_campaign(&campaign)))
}

/// POST /api/v1/campaign-images (multipart: `campaign_id`, `is_primary`, `file`)
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Value> {
    const CONTEXT: &str = "Failed to upload campaign image";

    let form = read_form(multipart, "file", CONTEXT).await?;

    let mut errors = Vec::new();
    let campaign_id = form
        .field("campaign_id")
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0);
    if campaign_id.is_none() {
        errors.push("campaign_id is required".to_string());
    }
    let file = form.file.as_ref().filter(|f| !f.file_name.is_empty());
    if file.is_none() {
        errors.push("file is required".to_string());
    }

    let (Some(campaign_id), Some(file)) = (campaign_id, file) else {
        return Err(ApiError::unprocessable_entity(CONTEXT, errors));
    };
    let is_primary = matches!(form.field("is_primary"), Some("true") | Some("1"));

    let file_name = campaign_image_file_name(campaign_id, user.id, &file.file_name);

    state
        .campaigns
        .save_image(
            CampaignImageInput {
                campaign_id,
                file_name: file_name.clone(),
                is_primary,
            },
            &user,
        )
        .await
        .map_err(|e| ApiError::from(e).context(CONTEXT))?;

    if let Err(e) = store(&state.upload_dir, &file_name, &file.bytes).await {
        tracing::error!("Failed to write campaign image {}: {}", file_name, e);
        return Err(ApiError::bad_request(CONTEXT, json!({ "is_uploaded": false })));
    }

    Ok(ApiResponse::with_status(
        "Campaign image successfully uploaded",
        json!({ "is_uploaded": true }),
        StatusCode::CREATED,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(user_id: Option<&str>) -> ListCampaignsQuery {
        ListCampaignsQuery {
            user_id: user_id.map(str::to_string),
        }
    }

    #[test]
    fn owner_filter_ignores_missing_zero_and_garbage() {
        assert_eq!(query(None).owner_filter(), None);
        assert_eq!(query(Some("")).owner_filter(), None);
        assert_eq!(query(Some("0")).owner_filter(), None);
        assert_eq!(query(Some("abc")).owner_filter(), None);
        assert_eq!(query(Some("12")).owner_filter(), Some(12));
    }

    #[test]
    fn non_numeric_campaign_id_is_bad_request() {
        let err = parse_campaign_id("abc", "Failed to get detail campaign").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Failed to get detail campaign");
    }
}
