pub mod campaign;
pub mod user;

pub use campaign::{Campaign, CampaignImage, CampaignOwner, NewCampaign, NewCampaignImage};
pub use user::{NewUser, User, DEFAULT_ROLE};
