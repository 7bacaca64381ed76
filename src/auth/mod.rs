//! Remote authentication: backend seam, HTTPS client and session manager.
//!
//! [`AuthSession`] is created once by the composition root and handed to the
//! screens that need it. Its state is published on a watch channel so views
//! re-render on every change.

pub mod backend;
pub mod http;
pub mod models;
pub mod session;

pub use backend::{AuthBackend, AuthError};
pub use http::HttpAuthBackend;
pub use models::{AppUser, NewProfile, ProfileUpdate, Session, SubscriptionTier, UserProfile};
pub use session::{
    AuthSession, AuthState, FileSessionStore, MemorySessionStore, SessionStore, SignUpStatus,
};
