//! Session manager and persisted-session stores.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex as StdMutex;

use tokio::sync::{Mutex, watch};

use crate::auth::backend::{AuthBackend, AuthError};
use crate::auth::models::{AppUser, NewProfile, ProfileUpdate, Session, SubscriptionTier, UserProfile};
use crate::domain::types::EmailAddress;

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Snapshot published to observers after every auth call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub user: Option<AppUser>,
    pub profile: Option<UserProfile>,
    pub error_message: Option<String>,
}

/// How a successful sign-up ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpStatus {
    SignedIn,
    /// The account exists but must be confirmed by email before signing in.
    ConfirmationRequired,
}

/// Persists the token pair between launches.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, AuthError>;
    fn save(&self, session: &Session) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Session stored as JSON in a file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Storage(err.to_string())),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|err| AuthError::Storage(err.to_string()))
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        let contents =
            serde_json::to_string(session).map_err(|err| AuthError::Storage(err.to_string()))?;
        fs::write(&self.path, contents).map_err(|err| AuthError::Storage(err.to_string()))
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Storage(err.to_string())),
        }
    }
}

/// In-process session store.
#[derive(Default)]
pub struct MemorySessionStore {
    session: StdMutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: StdMutex::new(Some(session)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Session>>, AuthError> {
        self.session
            .lock()
            .map_err(|_| AuthError::Storage("session store lock poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.lock()? = None;
        Ok(())
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<EmailAddress, AuthError> {
    let email = EmailAddress::new(email)
        .map_err(|_| AuthError::Validation("Please enter a valid email address".to_string()))?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(email)
}

/// Session manager gating the app behind the remote auth service.
///
/// Every operation marks the state as loading, then publishes exactly one
/// outcome: the updated signed-in/signed-out state on success, or the
/// previous state with `error_message` set on failure.
pub struct AuthSession<B, S> {
    backend: B,
    store: S,
    session: Mutex<Option<Session>>,
    state: watch::Sender<AuthState>,
}

impl<B, S> AuthSession<B, S>
where
    B: AuthBackend,
    S: SessionStore,
{
    pub fn new(backend: B, store: S) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            backend,
            store,
            session: Mutex::new(None),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn start_loading(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error_message = None;
        });
    }

    fn fail<T>(&self, err: AuthError) -> Result<T, AuthError> {
        log::error!("Auth request failed: {err}");
        let message = err.to_string();
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error_message = Some(message);
        });
        Err(err)
    }

    fn finish(&self) {
        self.state.send_modify(|state| state.is_loading = false);
    }

    async fn establish(&self, session: Session, profile: Option<UserProfile>) {
        if let Err(err) = self.store.save(&session) {
            log::error!("Failed to persist session: {err}");
        }
        let user = session.user.clone();
        *self.session.lock().await = Some(session);
        self.state.send_replace(AuthState {
            is_authenticated: true,
            is_loading: false,
            user: Some(user),
            profile,
            error_message: None,
        });
    }

    async fn reset(&self, error_message: Option<String>) {
        if let Err(err) = self.store.clear() {
            log::error!("Failed to clear persisted session: {err}");
        }
        self.sign_out_locally(error_message).await;
    }

    /// Publishes the signed-out state but leaves the persisted session in
    /// place for the next check.
    async fn sign_out_locally(&self, error_message: Option<String>) {
        *self.session.lock().await = None;
        self.state.send_replace(AuthState {
            error_message,
            ..AuthState::default()
        });
    }

    /// Creates the account and its profile, signing in when the backend
    /// returns a session right away.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
        business_name: Option<&str>,
    ) -> Result<SignUpStatus, AuthError> {
        self.start_loading();

        let email = match validate_credentials(email, password) {
            Ok(email) => email,
            Err(err) => return self.fail(err),
        };
        let name = name.trim();
        if name.is_empty() {
            return self.fail(AuthError::Validation("Please enter your name".to_string()));
        }

        let created = match self.backend.sign_up(email.as_str(), password, name).await {
            Ok(created) => created,
            Err(err) => return self.fail(err),
        };

        let new_profile = NewProfile {
            id: created.user.id,
            email: email.into_inner(),
            name: name.to_string(),
            business_name: business_name
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
            subscription_tier: SubscriptionTier::Free,
        };
        let access_token = created.session.as_ref().map(|s| s.access_token.as_str());
        let profile = match self.backend.insert_profile(access_token, &new_profile).await {
            Ok(profile) => profile,
            Err(err) => return self.fail(err),
        };

        match created.session {
            Some(session) => {
                log::info!("Signed up {}", session.user.id);
                self.establish(session, Some(profile)).await;
                Ok(SignUpStatus::SignedIn)
            }
            None => {
                log::info!("Signed up {}, awaiting email confirmation", created.user.id);
                self.finish();
                Ok(SignUpStatus::ConfirmationRequired)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.start_loading();

        let email = match EmailAddress::new(email) {
            Ok(email) => email,
            Err(_) => {
                return self.fail(AuthError::Validation(
                    "Please enter a valid email address".to_string(),
                ));
            }
        };
        if password.is_empty() {
            return self.fail(AuthError::Validation("Please enter your password".to_string()));
        }

        let session = match self.backend.sign_in(email.as_str(), password).await {
            Ok(session) => session,
            Err(err) => return self.fail(err),
        };
        let profile = match self
            .backend
            .fetch_profile(&session.access_token, session.user.id)
            .await
        {
            Ok(profile) => profile,
            Err(err) => return self.fail(err),
        };

        log::info!("Signed in {}", session.user.id);
        self.establish(session, profile).await;
        Ok(())
    }

    /// Signs out locally; a failed remote revocation is only logged.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.start_loading();

        let current = self.session.lock().await.clone();
        if let Some(session) = current {
            if let Err(err) = self.backend.sign_out(&session.access_token).await {
                log::warn!("Remote sign-out failed: {err}");
            }
        }

        self.reset(None).await;
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.start_loading();

        let email = match EmailAddress::new(email) {
            Ok(email) => email,
            Err(_) => {
                return self.fail(AuthError::Validation(
                    "Please enter a valid email address".to_string(),
                ));
            }
        };
        if let Err(err) = self.backend.reset_password(email.as_str()).await {
            return self.fail(err);
        }

        self.finish();
        Ok(())
    }

    /// Restores a persisted session at launch. Returns whether the user is
    /// signed in; a stale session is discarded without an error message.
    /// When the backend cannot be reached the persisted session is kept.
    pub async fn check_auth_status(&self) -> Result<bool, AuthError> {
        self.start_loading();

        let persisted = match self.store.load() {
            Ok(persisted) => persisted,
            Err(err) => {
                log::warn!("Ignoring unreadable persisted session: {err}");
                None
            }
        };
        let Some(mut session) = persisted else {
            self.reset(None).await;
            return Ok(false);
        };

        match self.backend.get_user(&session.access_token).await {
            Ok(user) => session.user = user,
            Err(err) if err.is_unauthorized() => {
                match self.backend.refresh(&session.refresh_token).await {
                    Ok(refreshed) => session = refreshed,
                    Err(err) => {
                        log::info!("Persisted session expired: {err}");
                        self.reset(None).await;
                        return Ok(false);
                    }
                }
            }
            Err(err) => {
                log::warn!("Could not verify persisted session: {err}");
                self.sign_out_locally(None).await;
                return Ok(false);
            }
        }

        let profile = match self
            .backend
            .fetch_profile(&session.access_token, session.user.id)
            .await
        {
            Ok(profile) => profile,
            Err(err) => {
                log::warn!("Failed to fetch profile: {err}");
                None
            }
        };

        self.establish(session, profile).await;
        Ok(true)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, AuthError> {
        self.start_loading();

        let current = self.session.lock().await.clone();
        let Some(session) = current else {
            return self.fail(AuthError::NotAuthenticated);
        };

        match self
            .backend
            .update_profile(&session.access_token, session.user.id, update)
            .await
        {
            Ok(profile) => {
                let published = profile.clone();
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.profile = Some(published);
                });
                Ok(profile)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Dismisses the current error banner.
    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error_message = None);
    }
}
