use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account record returned by the auth backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
    Business,
}

/// Row of the `profiles` table, keyed by the account id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Profile inserted right after the account is created.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub business_name: Option<String>,
    pub subscription_tier: SubscriptionTier,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// Token pair for a signed-in account, persisted between launches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp after which the access token is rejected.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AppUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults_missing_columns() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"id":"6f1c2c7e-0d7c-4b8a-9a51-3f2a1c9b8e11","name":"Sam"}"#,
        )
        .unwrap();
        assert_eq!(profile.subscription_tier, SubscriptionTier::Free);
        assert_eq!(profile.name.as_deref(), Some("Sam"));
        assert_eq!(profile.business_name, None);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SubscriptionTier::Business).unwrap(),
            r#""business""#
        );
    }

    #[test]
    fn update_skips_unset_fields() {
        let update = ProfileUpdate {
            business_name: Some("Green Co".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&update).unwrap(),
            r#"{"business_name":"Green Co"}"#
        );
    }
}
