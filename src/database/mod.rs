pub mod campaigns;
pub mod manager;
pub mod models;
pub mod repository;
pub mod users;

pub use campaigns::PgCampaignRepository;
pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{CampaignRepository, UserRepository};
pub use users::PgUserRepository;
