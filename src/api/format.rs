use serde::Serialize;

use crate::database::models::{Campaign, CampaignImage, User};

/// Public view of an account; the password hash never leaves the service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserFormatter {
    pub id: i64,
    pub name: String,
    pub occupation: String,
    pub email: String,
    pub token: String,
    pub image_url: String,
}

pub fn format_user(user: &User, token: String) -> UserFormatter {
    UserFormatter {
        id: user.id,
        name: user.name.clone(),
        occupation: user.occupation.clone(),
        email: user.email.clone(),
        token,
        image_url: user.avatar_file_name.clone().unwrap_or_default(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignFormatter {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub image_url: String,
    pub goal_amount: i64,
    pub current_amount: i64,
    pub slug: String,
}

pub fn format_campaign(campaign: &Campaign) -> CampaignFormatter {
    CampaignFormatter {
        id: campaign.id,
        user_id: campaign.user_id,
        name: campaign.name.clone(),
        short_description: campaign.short_description.clone(),
        description: campaign.description.clone(),
        image_url: primary_image_url(&campaign.images),
        goal_amount: campaign.goal_amount,
        current_amount: campaign.current_amount,
        slug: campaign.slug.clone(),
    }
}

pub fn format_campaigns(campaigns: &[Campaign]) -> Vec<CampaignFormatter> {
    campaigns.iter().map(format_campaign).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignDetailFormatter {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub short_description: String,
    pub description: String,
    pub image_url: String,
    pub goal_amount: i64,
    pub current_amount: i64,
    pub backer_count: i64,
    pub slug: String,
    pub perks: Vec<String>,
    pub user: CampaignUserFormatter,
    pub images: Vec<CampaignImageFormatter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignUserFormatter {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignImageFormatter {
    pub image_url: String,
    pub is_primary: bool,
}

pub fn format_campaign_detail(campaign: &Campaign) -> CampaignDetailFormatter {
    let user = campaign
        .owner
        .as_ref()
        .map(|owner| CampaignUserFormatter {
            name: owner.name.clone(),
            image_url: owner.avatar_file_name.clone().unwrap_or_default(),
        })
        .unwrap_or(CampaignUserFormatter {
            name: String::new(),
            image_url: String::new(),
        });

    CampaignDetailFormatter {
        id: campaign.id,
        user_id: campaign.user_id,
        name: campaign.name.clone(),
        short_description: campaign.short_description.clone(),
        description: campaign.description.clone(),
        image_url: primary_image_url(&campaign.images),
        goal_amount: campaign.goal_amount,
        current_amount: campaign.current_amount,
        backer_count: campaign.backer_count,
        slug: campaign.slug.clone(),
        perks: split_perks(&campaign.perks),
        user,
        images: campaign
            .images
            .iter()
            .map(|image| CampaignImageFormatter {
                image_url: image.file_name.clone(),
                is_primary: image.is_primary,
            })
            .collect(),
    }
}

/// First image by default; each image flagged primary overrides, so the last flagged wins
pub fn primary_image_url(images: &[CampaignImage]) -> String {
    let first = images.first().map(|image| image.file_name.clone()).unwrap_or_default();
    images
        .iter()
        .filter(|image| image.is_primary)
        .last()
        .map(|image| image.file_name.clone())
        .unwrap_or(first)
}

/// Splits on commas and trims each perk; an empty string yields one empty perk
pub fn split_perks(perks: &str) -> Vec<String> {
    perks.split(',').map(|perk| perk.trim().to_string()).collect()
}
