use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::password;
use crate::config::SecurityConfig;
use crate::database::models::{NewUser, User, DEFAULT_ROLE};
use crate::database::{DatabaseError, UserRepository};
use crate::services::validation::Validator;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("email has been registered")]
    EmailTaken,

    #[error("email or password not match")]
    InvalidCredentials,

    #[error("user {0} not found")]
    NotFound(i64),

    #[error("failed to hash password: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterUserInput {
    pub name: String,
    pub occupation: String,
    pub email: String,
    pub password: String,
}

impl RegisterUserInput {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        Validator::new()
            .required("name", &self.name)
            .required("occupation", &self.occupation)
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginUserInput {
    pub email: String,
    pub password: String,
}

impl LoginUserInput {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        Validator::new()
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckEmailInput {
    pub email: String,
}

impl CheckEmailInput {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        Validator::new()
            .required("email", &self.email)
            .email("email", &self.email)
            .finish()
    }
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, security: &SecurityConfig) -> Self {
        Self {
            users,
            bcrypt_cost: security.bcrypt_cost,
        }
    }

    /// Stores a new account with the default role, whatever the caller sent
    pub async fn register(&self, input: RegisterUserInput) -> Result<User, UserError> {
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let cost = self.bcrypt_cost;
        let plain = input.password;
        let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain, cost))
            .await
            .map_err(|e| UserError::PasswordHash(e.to_string()))?
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;

        let new_user = NewUser {
            name: input.name,
            occupation: input.occupation,
            email: input.email,
            password_hash,
            role: DEFAULT_ROLE.to_string(),
        };

        let user = self.users.save(new_user).await.map_err(|e| match e {
            DatabaseError::Sqlx(sqlx::Error::Database(db)) if db.is_unique_violation() => UserError::EmailTaken,
            other => UserError::Database(other),
        })?;

        info!("Registered user {} <{}>", user.id, user.email);
        Ok(user)
    }

    pub async fn is_email_available(&self, email: &str) -> Result<bool, UserError> {
        Ok(self.users.find_by_email(email).await?.is_none())
    }

    /// Unknown email and wrong password are indistinguishable to the caller
    pub async fn login(&self, input: LoginUserInput) -> Result<User, UserError> {
        let Some(user) = self.users.find_by_email(&input.email).await? else {
            debug!("Login rejected: no account for {}", input.email);
            return Err(UserError::InvalidCredentials);
        };

        let plain = input.password;
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || password::verify_password(&plain, &stored))
            .await
            .map_err(|e| UserError::PasswordHash(e.to_string()))?;

        if !matches {
            debug!("Login rejected: password mismatch for user {}", user.id);
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Option<User>, UserError> {
        Ok(self.users.find_by_id(user_id).await?)
    }

    pub async fn save_avatar(&self, user_id: i64, file_name: &str) -> Result<User, UserError> {
        self.users
            .update_avatar(user_id, file_name)
            .await?
            .ok_or(UserError::NotFound(user_id))
    }
}
