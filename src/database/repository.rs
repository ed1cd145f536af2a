use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Campaign, CampaignImage, NewCampaign, NewCampaignImage, NewUser, User};

/// Persistence contract for the `users` table
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Returns `None` when no row matched `id`
    async fn update_avatar(&self, id: i64, file_name: &str) -> Result<Option<User>, DatabaseError>;
}

/// Persistence contract for `campaigns` and `campaign_images`
///
/// Every campaign returned carries its images in insertion order.
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn save(&self, campaign: NewCampaign) -> Result<Campaign, DatabaseError>;

    /// Loads the campaign together with its owner's name and avatar
    async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>, DatabaseError>;

    async fn find_all(&self) -> Result<Vec<Campaign>, DatabaseError>;

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Campaign>, DatabaseError>;

    async fn find_images(&self, campaign_id: i64) -> Result<Vec<CampaignImage>, DatabaseError>;

    /// Conditional update matched by `campaign.id`; `None` when zero rows were affected
    async fn update(&self, campaign: &Campaign) -> Result<Option<Campaign>, DatabaseError>;

    async fn save_image(&self, image: NewCampaignImage) -> Result<CampaignImage, DatabaseError>;

    async fn mark_all_images_non_primary(&self, campaign_id: i64) -> Result<u64, DatabaseError>;
}
