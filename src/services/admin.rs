//! Domain service for the admin dashboard.
//!
//! Admin login plus full CRUD over the user collection.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::db::repositories::user::{compare_password, is_duplicate_email};
use crate::db::{NewUser, Store, User, UserPatch};
use crate::services::token::TokenService;

/// Errors specific to admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Admin not found")]
    AdminNotFound,

    #[error("Access denied. Not an admin.")]
    NotAdmin,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

pub struct AdminService {
    store: Store,
    tokens: Arc<TokenService>,
}

impl AdminService {
    #[must_use]
    pub fn new(store: Store, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Admin login. Checks run in a fixed order: account exists, account
    /// is an admin, password matches. Each failure is reported
    /// distinctly, unlike the user login path.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AdminError> {
        let Some((user, password_hash)) = self.store.get_user_by_email_with_hash(email).await?
        else {
            return Err(AdminError::AdminNotFound);
        };

        if !user.is_admin {
            return Err(AdminError::NotAdmin);
        }

        if !compare_password(password, &password_hash).await? {
            return Err(AdminError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_admin(user.id)
            .map_err(|e| AdminError::Internal(e.to_string()))?;

        info!("Admin {} logged in", user.id);
        Ok(token)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AdminError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn get_user(&self, id: i32) -> Result<User, AdminError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(AdminError::UserNotFound)
    }

    pub async fn create_user(&self, input: NewUser) -> Result<User, AdminError> {
        if self.store.get_user_by_email(&input.email).await?.is_some() {
            return Err(AdminError::EmailTaken);
        }

        match self.store.create_user(input).await {
            Ok(user) => {
                info!("Admin created user {} ({})", user.id, user.email);
                Ok(user)
            }
            Err(e) if is_duplicate_email(&e) => Err(AdminError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, AdminError> {
        if let Some(ref email) = patch.email
            && let Some(existing) = self.store.get_user_by_email(email).await?
            && existing.id != id
        {
            return Err(AdminError::EmailTaken);
        }

        match self.store.update_user(id, patch).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AdminError::UserNotFound),
            Err(e) if is_duplicate_email(&e) => Err(AdminError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a user record. Any session tokens the user still holds
    /// become useless since every authenticated request re-loads the
    /// record.
    pub async fn delete_user(&self, id: i32) -> Result<(), AdminError> {
        if self.store.delete_user(id).await? {
            info!("Admin deleted user {}", id);
            Ok(())
        } else {
            Err(AdminError::UserNotFound)
        }
    }
}
