use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::{
    CampaignRepository, DatabaseManager, PgCampaignRepository, PgUserRepository, UserRepository,
};
use crate::handlers::{self, campaigns, users};
use crate::middleware::require_auth;
use crate::services::{CampaignService, UserService};

/// Shared request state; every field is cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub campaigns: Arc<CampaignService>,
    pub tokens: Arc<TokenService>,
    pub upload_dir: Arc<PathBuf>,
    pub database: Option<DatabaseManager>,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        user_repository: Arc<dyn UserRepository>,
        campaign_repository: Arc<dyn CampaignRepository>,
        database: Option<DatabaseManager>,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            users: Arc::new(UserService::new(user_repository, &config.security)),
            campaigns: Arc::new(CampaignService::new(campaign_repository)),
            tokens: Arc::new(TokenService::new(&config.security.jwt_secret)?),
            upload_dir: Arc::new(config.server.upload_dir.clone()),
            database,
        })
    }

    /// State backed by the Postgres repositories sharing one pool
    pub fn from_database(config: &AppConfig, database: DatabaseManager) -> Result<Self, TokenError> {
        let pool = database.pool().clone();
        Self::new(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgCampaignRepository::new(pool)),
            Some(database),
        )
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let api = Router::new()
        .route("/", get(handlers::root))
        .merge(public_routes())
        .merge(protected_routes(state.clone()));

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::register))
        .route("/sessions", post(users::login))
        .route("/email_checkers", post(users::check_email))
        .route("/campaigns", get(campaigns::list))
        .route("/campaigns/:id", get(campaigns::detail))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/avatars", post(users::upload_avatar))
        .route("/campaigns", post(campaigns::create))
        .route("/campaigns/:id", put(campaigns::update))
        .route("/campaign-images", post(campaigns::upload_image))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(allowed)
}
