use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub perks: String,
    pub backer_count: i64,
    pub goal_amount: i64,
    pub current_amount: i64,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub images: Vec<CampaignImage>,
    #[sqlx(skip)]
    pub owner: Option<CampaignOwner>,
}

/// Owner columns joined in by the detail query
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampaignOwner {
    pub name: String,
    pub avatar_file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampaignImage {
    pub id: i64,
    pub campaign_id: i64,
    pub file_name: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub user_id: i64,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub perks: String,
    pub goal_amount: i64,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewCampaignImage {
    pub campaign_id: i64,
    pub file_name: String,
    pub is_primary: bool,
}
