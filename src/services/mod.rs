pub mod campaign_service;
pub mod user_service;
pub mod validation;

pub use campaign_service::{slugify, CampaignError, CampaignImageInput, CampaignInput, CampaignService};
pub use user_service::{CheckEmailInput, LoginUserInput, RegisterUserInput, UserError, UserService};
