use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::models::{Campaign, CampaignImage, NewCampaign, NewCampaignImage, User};
use crate::database::{CampaignRepository, DatabaseError};
use crate::services::validation::Validator;

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("campaign {0} not found")]
    NotFound(i64),

    #[error("not an owner of the campaign")]
    NotOwner,

    #[error("failed to update campaign")]
    UpdateFailed,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Body of campaign create and update requests
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CampaignInput {
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub perks: String,
    pub goal_amount: i64,
}

impl CampaignInput {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        Validator::new()
            .required("name", &self.name)
            .required("short_description", &self.short_description)
            .required("description", &self.description)
            .required("perks", &self.perks)
            .positive_amount("goal_amount", self.goal_amount)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CampaignImageInput {
    pub campaign_id: i64,
    pub file_name: String,
    pub is_primary: bool,
}

/// Lowercases the name and joins its space-separated words with hyphens
pub fn slugify(name: &str) -> String {
    name.split(' ').collect::<Vec<_>>().join("-").to_lowercase()
}

pub struct CampaignService {
    campaigns: Arc<dyn CampaignRepository>,
}

impl CampaignService {
    pub fn new(campaigns: Arc<dyn CampaignRepository>) -> Self {
        Self { campaigns }
    }

    /// All campaigns, or only those owned by `user_id`
    pub async fn get_campaigns(&self, user_id: Option<i64>) -> Result<Vec<Campaign>, CampaignError> {
        let campaigns = match user_id {
            Some(user_id) => self.campaigns.find_by_user_id(user_id).await?,
            None => self.campaigns.find_all().await?,
        };
        Ok(campaigns)
    }

    pub async fn get_campaign_detail(&self, id: i64) -> Result<Campaign, CampaignError> {
        self.campaigns.find_by_id(id).await?.ok_or(CampaignError::NotFound(id))
    }

    pub async fn create(&self, input: CampaignInput, owner: &User) -> Result<Campaign, CampaignError> {
        let campaign = NewCampaign {
            user_id: owner.id,
            slug: slugify(&input.name),
            name: input.name,
            short_description: input.short_description,
            description: input.description,
            perks: input.perks,
            goal_amount: input.goal_amount,
        };

        let saved = self.campaigns.save(campaign).await?;
        info!("User {} created campaign {} ({})", owner.id, saved.id, saved.slug);
        Ok(saved)
    }

    /// Ownership-checked update. The read and the write are not transactional.
    pub async fn update(&self, id: i64, input: CampaignInput, caller: &User) -> Result<Campaign, CampaignError> {
        let mut campaign = self.campaigns.find_by_id(id).await?.ok_or(CampaignError::NotFound(id))?;

        if campaign.user_id != caller.id {
            warn!("User {} attempted to update campaign {} owned by {}", caller.id, id, campaign.user_id);
            return Err(CampaignError::NotOwner);
        }

        campaign.name = input.name;
        campaign.short_description = input.short_description;
        campaign.description = input.description;
        campaign.perks = input.perks;
        campaign.goal_amount = input.goal_amount;
        campaign.slug = slugify(&campaign.name);

        match self.campaigns.update(&campaign).await? {
            Some(updated) => Ok(updated),
            None => {
                warn!("Update of campaign {} matched no rows", id);
                Err(CampaignError::UpdateFailed)
            }
        }
    }

    /// A new primary image demotes every existing image of the campaign first
    pub async fn save_image(&self, input: CampaignImageInput, caller: &User) -> Result<CampaignImage, CampaignError> {
        let campaign = self
            .campaigns
            .find_by_id(input.campaign_id)
            .await?
            .ok_or(CampaignError::NotFound(input.campaign_id))?;

        if campaign.user_id != caller.id {
            warn!(
                "User {} attempted to add an image to campaign {} owned by {}",
                caller.id, campaign.id, campaign.user_id
            );
            return Err(CampaignError::NotOwner);
        }

        if input.is_primary {
            self.campaigns.mark_all_images_non_primary(campaign.id).await?;
        }

        let image = self
            .campaigns
            .save_image(NewCampaignImage {
                campaign_id: campaign.id,
                file_name: input.file_name,
                is_primary: input.is_primary,
            })
            .await?;

        Ok(image)
    }
}
