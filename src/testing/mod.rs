//! In-memory repositories and router helpers for tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::config::AppConfig;
use crate::database::models::{
    Campaign, CampaignImage, CampaignOwner, NewCampaign, NewCampaignImage, NewUser, User,
};
use crate::database::{CampaignRepository, DatabaseError, UserRepository};
use crate::server::{app, AppState};

pub fn sample_user(id: i64) -> User {
    let now = Utc::now();
    User {
        id,
        name: format!("User {}", id),
        occupation: "Tester".to_string(),
        email: format!("user{}@example.com", id),
        password_hash: String::new(),
        avatar_file_name: None,
        role: "user".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    /// Inserts a fully-formed user, bypassing registration
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    fn lookup(&self, id: i64) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn save(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        let now = Utc::now();
        let saved = User {
            id: users.iter().map(|u| u.id).max().unwrap_or(0) + 1,
            name: user.name,
            occupation: user.occupation,
            email: user.email,
            password_hash: user.password_hash,
            avatar_file_name: None,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.lookup(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn update_avatar(&self, id: i64, file_name: &str) -> Result<Option<User>, DatabaseError> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.avatar_file_name = Some(file_name.to_string());
            u.updated_at = Utc::now();
            u.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryCampaignRepository {
    campaigns: Mutex<Vec<Campaign>>,
    images: Mutex<Vec<CampaignImage>>,
    users: Option<Arc<MemoryUserRepository>>,
    update_calls: AtomicUsize,
    fail_next_update: AtomicBool,
}

impl MemoryCampaignRepository {
    /// Resolves campaign owners against `users` on detail lookups
    pub fn linked(users: Arc<MemoryUserRepository>) -> Self {
        Self {
            users: Some(users),
            ..Self::default()
        }
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Makes the next update behave as if the row disappeared concurrently
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    fn with_images(&self, mut campaign: Campaign) -> Campaign {
        campaign.images = self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.campaign_id == campaign.id)
            .cloned()
            .collect();
        campaign
    }
}

#[async_trait]
impl CampaignRepository for MemoryCampaignRepository {
    async fn save(&self, campaign: NewCampaign) -> Result<Campaign, DatabaseError> {
        let id = {
            let mut campaigns = self.campaigns.lock().unwrap();
            let now = Utc::now();
            let id = campaigns.iter().map(|c| c.id).max().unwrap_or(0) + 1;
            campaigns.push(Campaign {
                id,
                user_id: campaign.user_id,
                name: campaign.name,
                short_description: campaign.short_description,
                description: campaign.description,
                perks: campaign.perks,
                backer_count: 0,
                goal_amount: campaign.goal_amount,
                current_amount: 0,
                slug: campaign.slug,
                created_at: now,
                updated_at: now,
                images: Vec::new(),
                owner: None,
            });
            id
        };

        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::QueryError(format!("campaign {} vanished after insert", id)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Campaign>, DatabaseError> {
        let found = self.campaigns.lock().unwrap().iter().find(|c| c.id == id).cloned();
        Ok(found.map(|campaign| {
            let mut campaign = self.with_images(campaign);
            campaign.owner = self
                .users
                .as_ref()
                .and_then(|users| users.lookup(campaign.user_id))
                .map(|u| CampaignOwner {
                    name: u.name,
                    avatar_file_name: u.avatar_file_name,
                });
            campaign
        }))
    }

    async fn find_all(&self) -> Result<Vec<Campaign>, DatabaseError> {
        let all = self.campaigns.lock().unwrap().clone();
        Ok(all.into_iter().map(|c| self.with_images(c)).collect())
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Campaign>, DatabaseError> {
        let all = self.campaigns.lock().unwrap().clone();
        Ok(all
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| self.with_images(c))
            .collect())
    }

    async fn find_images(&self, campaign_id: i64) -> Result<Vec<CampaignImage>, DatabaseError> {
        Ok(self
            .images
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn update(&self, campaign: &Campaign) -> Result<Option<Campaign>, DatabaseError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }

        let matched = {
            let mut campaigns = self.campaigns.lock().unwrap();
            match campaigns.iter_mut().find(|c| c.id == campaign.id) {
                Some(stored) => {
                    stored.name = campaign.name.clone();
                    stored.short_description = campaign.short_description.clone();
                    stored.description = campaign.description.clone();
                    stored.perks = campaign.perks.clone();
                    stored.backer_count = campaign.backer_count;
                    stored.goal_amount = campaign.goal_amount;
                    stored.current_amount = campaign.current_amount;
                    stored.slug = campaign.slug.clone();
                    stored.updated_at = Utc::now();
                    true
                }
                None => false,
            }
        };

        if !matched {
            return Ok(None);
        }
        self.find_by_id(campaign.id).await
    }

    async fn save_image(&self, image: NewCampaignImage) -> Result<CampaignImage, DatabaseError> {
        let mut images = self.images.lock().unwrap();
        let now = Utc::now();
        let saved = CampaignImage {
            id: images.iter().map(|i| i.id).max().unwrap_or(0) + 1,
            campaign_id: image.campaign_id,
            file_name: image.file_name,
            is_primary: image.is_primary,
            created_at: now,
            updated_at: now,
        };
        images.push(saved.clone());
        Ok(saved)
    }

    async fn mark_all_images_non_primary(&self, campaign_id: i64) -> Result<u64, DatabaseError> {
        let mut images = self.images.lock().unwrap();
        let mut changed = 0;
        for image in images.iter_mut().filter(|i| i.campaign_id == campaign_id && i.is_primary) {
            image.is_primary = false;
            changed += 1;
        }
        Ok(changed)
    }
}

/// Application state over linked in-memory repositories
pub struct TestContext {
    pub config: AppConfig,
    pub state: AppState,
    pub users: Arc<MemoryUserRepository>,
    pub campaigns: Arc<MemoryCampaignRepository>,
}

impl TestContext {
    pub fn new(upload_dir: std::path::PathBuf) -> Self {
        let mut config = AppConfig::development();
        config.server.upload_dir = upload_dir;

        let users = Arc::new(MemoryUserRepository::default());
        let campaigns = Arc::new(MemoryCampaignRepository::linked(users.clone()));
        let state = AppState::new(&config, users.clone(), campaigns.clone(), None)
            .expect("development config builds state");

        Self {
            config,
            state,
            users,
            campaigns,
        }
    }

    pub fn router(&self) -> axum::Router {
        app(self.state.clone(), &self.config)
    }
}
