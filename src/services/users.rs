//! Domain service for user self-service.
//!
//! Handles registration, login, and profile management for regular users.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::db::repositories::user::{compare_password, is_duplicate_email};
use crate::db::{NewUser, Store, User, UserPatch};
use crate::services::token::TokenService;

/// Errors specific to user-facing operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User already exists")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

pub struct UserService {
    store: Store,
    tokens: Arc<TokenService>,
}

impl UserService {
    #[must_use]
    pub fn new(store: Store, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Register a new (non-admin) user account.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::EmailTaken`] when the email is already
    /// registered. The pre-check keeps the common case cheap; the
    /// unique index on email is the authoritative guard under
    /// concurrent registration.
    pub async fn register(&self, name: String, email: String, password: String) -> Result<User, UserError> {
        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let result = self
            .store
            .create_user(NewUser {
                name,
                email: email.clone(),
                password,
                is_admin: false,
                image_url: None,
            })
            .await;

        match result {
            Ok(user) => {
                info!("Registered user {} ({})", user.id, user.email);
                Ok(user)
            }
            Err(e) if is_duplicate_email(&e) => Err(UserError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown email and wrong password produce the same error so the
    /// response does not reveal which accounts exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), UserError> {
        let Some((user, password_hash)) = self.store.get_user_by_email_with_hash(email).await?
        else {
            return Err(UserError::InvalidCredentials);
        };

        if !compare_password(password, &password_hash).await? {
            return Err(UserError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_session(user.id, user.is_admin)
            .map_err(|e| UserError::Internal(e.to_string()))?;

        info!("User {} logged in", user.id);
        Ok((user, token))
    }

    /// Apply a partial profile update. Privilege level cannot be
    /// changed through this path.
    pub async fn edit_profile(&self, user_id: i32, mut patch: UserPatch) -> Result<User, UserError> {
        patch.is_admin = None;

        if let Some(ref email) = patch.email
            && let Some(existing) = self.store.get_user_by_email(email).await?
            && existing.id != user_id
        {
            return Err(UserError::EmailTaken);
        }

        let result = self.store.update_user(user_id, patch).await;

        match result {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(UserError::UserNotFound),
            Err(e) if is_duplicate_email(&e) => Err(UserError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }
}
