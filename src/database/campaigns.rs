use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{Campaign, CampaignImage, CampaignOwner, NewCampaign, NewCampaignImage};
use crate::database::repository::CampaignRepository;

const CAMPAIGN_COLUMNS: &str = "campaigns.id, campaigns.user_id, campaigns.name, campaigns.short_description, \
     campaigns.description, campaigns.perks, campaigns.backer_count, campaigns.goal_amount, \
     campaigns.current_amount, campaigns.slug, campaigns.created_at, campaigns.updated_at";

const IMAGE_COLUMNS: &str = "id, campaign_id, file_name, is_primary, created_at, updated_at";

#[derive(FromRow)]
struct CampaignWithOwnerRow {
    #[sqlx(flatten)]
    campaign: Campaign,
    owner_name: String,
    owner_avatar_file_name: Option<String>,
}

pub struct PgCampaignRepository {
    pool: PgPool,
}

impl PgCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads images for all given campaigns in one round trip
    async fn attach_images(&self, mut campaigns: Vec<Campaign>) -> Result<Vec<Campaign>, DatabaseError> {
        if campaigns.is_empty() {
            return Ok(campaigns);
        }

        let ids: Vec<i64> = campaigns.iter().map(|c| c.id).collect();
        let query = format!("SELECT {IMAGE_COLUMNS} FROM campaign_images WHERE campaign_id = ANY($1) ORDER BY id");
        let images = sqlx::query_as::<_, CampaignImage>(&query)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut by_campaign: HashMap<i64, Vec<CampaignImage>> = HashMap::new();
        for image in images {
            by_campaign.entry(image.campaign_id).or_default().push(image);
        }
        for campaign in &mut campaigns {
            campaign.images = by_campaign.remove(&campaign.id).unwrap_or_default();
        }

        Ok(campaigns)
    }
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    async fn save(&self, campaign: NewCampaign) -> Result<Campaign, DatabaseError> {
        let id: (i64,) = sqlx::query_as(
            "INSERT INTO campaigns \
             (user_id, name, short_description, description, perks, backer_count, goal_amount, current_amount, slug, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 0, $6, 0, $7, now(), now()) \
             RETURNING id",
        )
        .bind(campaign.user_id)
        .bind(&campaign.name)
        .bind(&campaign.short_description)
        .bind(&campaign.description)
        .bind(&campaign.perks)
        .bind(campaign.goal_amount)
        .bind(&campaign.slug)
        .fetch_one(&self.pool)
        .await?;

        self.find_by_id(id.0)
            .await?
            .ok_or_else(|| DatabaseError::QueryError(format!("campaign {} vanished after insert", id.0)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>, DatabaseError> {
        let query = format!(
            "SELECT {CAMPAIGN_COLUMNS}, users.name AS owner_name, users.avatar_file_name AS owner_avatar_file_name \
             FROM campaigns JOIN users ON users.id = campaigns.user_id \
             WHERE campaigns.id = $1"
        );

        let row = sqlx::query_as::<_, CampaignWithOwnerRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut campaign = row.campaign;
        campaign.owner = Some(CampaignOwner {
            name: row.owner_name,
            avatar_file_name: row.owner_avatar_file_name,
        });
        campaign.images = self.find_images(campaign.id).await?;
        Ok(Some(campaign))
    }

    async fn find_all(&self) -> Result<Vec<Campaign>, DatabaseError> {
        let query = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY campaigns.id");
        let campaigns = sqlx::query_as::<_, Campaign>(&query).fetch_all(&self.pool).await?;
        self.attach_images(campaigns).await
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Campaign>, DatabaseError> {
        let query = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE campaigns.user_id = $1 ORDER BY campaigns.id");
        let campaigns = sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_images(campaigns).await
    }

    async fn find_images(&self, campaign_id: i64) -> Result<Vec<CampaignImage>, DatabaseError> {
        let query = format!("SELECT {IMAGE_COLUMNS} FROM campaign_images WHERE campaign_id = $1 ORDER BY id");
        let images = sqlx::query_as::<_, CampaignImage>(&query)
            .bind(campaign_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(images)
    }

    async fn update(&self, campaign: &Campaign) -> Result<Option<Campaign>, DatabaseError> {
        let result = sqlx::query(
            "UPDATE campaigns SET \
             name = $1, short_description = $2, description = $3, perks = $4, \
             backer_count = $5, goal_amount = $6, current_amount = $7, slug = $8, updated_at = now() \
             WHERE id = $9",
        )
        .bind(&campaign.name)
        .bind(&campaign.short_description)
        .bind(&campaign.description)
        .bind(&campaign.perks)
        .bind(campaign.backer_count)
        .bind(campaign.goal_amount)
        .bind(campaign.current_amount)
        .bind(&campaign.slug)
        .bind(campaign.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(campaign.id).await
    }

    async fn save_image(&self, image: NewCampaignImage) -> Result<CampaignImage, DatabaseError> {
        let query = format!(
            "INSERT INTO campaign_images (campaign_id, file_name, is_primary, created_at, updated_at) \
             VALUES ($1, $2, $3, now(), now()) RETURNING {IMAGE_COLUMNS}"
        );
        let saved = sqlx::query_as::<_, CampaignImage>(&query)
            .bind(image.campaign_id)
            .bind(&image.file_name)
            .bind(image.is_primary)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn mark_all_images_non_primary(&self, campaign_id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            "UPDATE campaign_images SET is_primary = false, updated_at = now() WHERE campaign_id = $1 AND is_primary",
        )
        .bind(campaign_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
