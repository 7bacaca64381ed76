use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::models::{AppUser, NewProfile, ProfileUpdate, Session, UserProfile};

/// Errors from the remote auth service. `Display` is the user-visible message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("You are not signed in")]
    NotAuthenticated,

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// Whether the backend rejected the credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Api { status: 401 | 403, .. })
    }
}

/// Result of account creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignUpResponse {
    pub user: AppUser,
    /// Absent when the backend requires email confirmation first.
    pub session: Option<Session>,
}

/// Calls the session manager makes against the hosted backend.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpResponse, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    async fn get_user(&self, access_token: &str) -> Result<AppUser, AuthError>;

    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, AuthError>;

    /// Inserts a profile; without a token the request uses the public key.
    async fn insert_profile(
        &self,
        access_token: Option<&str>,
        profile: &NewProfile,
    ) -> Result<UserProfile, AuthError>;

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AuthError>;
}
