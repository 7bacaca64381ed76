//! HTTPS implementation of [`AuthBackend`] for a Supabase-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::auth::backend::{AuthBackend, AuthError, SignUpResponse};
use crate::auth::models::{AppUser, NewProfile, ProfileUpdate, Session, UserProfile};
use crate::models::config::AuthConfig;

/// Keys checked, in order, for a human-readable error in a failed response.
const ERROR_MESSAGE_KEYS: [&str; 4] = ["error_description", "msg", "message", "error"];

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Decode(err.to_string())
        } else {
            AuthError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AppUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        }
    }
}

/// Picks the error text out of a failed response body.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ERROR_MESSAGE_KEYS.iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|message| !message.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

/// Sign-up answers with a full session, or with the bare user when email
/// confirmation is pending.
fn parse_sign_up(value: Value) -> Result<SignUpResponse, AuthError> {
    let decode = |err: serde_json::Error| AuthError::Decode(err.to_string());

    if value.get("access_token").is_some() {
        let session: Session = serde_json::from_value::<TokenResponse>(value)
            .map_err(decode)?
            .into();
        return Ok(SignUpResponse {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    let user_value = value.get("user").cloned().unwrap_or(value);
    let user: AppUser = serde_json::from_value(user_value).map_err(decode)?;
    Ok(SignUpResponse {
        user,
        session: None,
    })
}

async fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    Ok(check_status(response).await?.json::<T>().await?)
}

/// Auth and profile client talking to the hosted backend.
#[derive(Clone)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpAuthBackend {
    pub fn new(config: &AuthConfig, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method, path: &str, access_token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key);
        match access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, AuthError> {
        let response = self
            .request(
                Method::POST,
                &format!("/auth/v1/token?grant_type={grant_type}"),
                None,
            )
            .json(&body)
            .send()
            .await?;
        Ok(parse_json::<TokenResponse>(response).await?.into())
    }
}

fn first_profile(mut rows: Vec<UserProfile>) -> Result<UserProfile, AuthError> {
    if rows.is_empty() {
        return Err(AuthError::Decode("no profile row returned".to_string()));
    }
    Ok(rows.swap_remove(0))
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpResponse, AuthError> {
        let response = self
            .request(Method::POST, "/auth/v1/signup", None)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await?;
        parse_sign_up(parse_json::<Value>(response).await?)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .request(Method::POST, "/auth/v1/logout", Some(access_token))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .request(Method::POST, "/auth/v1/recover", None)
            .json(&json!({ "email": email }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AppUser, AuthError> {
        let response = self
            .request(Method::GET, "/auth/v1/user", Some(access_token))
            .send()
            .await?;
        parse_json(response).await
    }

    async fn fetch_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, AuthError> {
        let response = self
            .request(
                Method::GET,
                &format!("/rest/v1/profiles?id=eq.{user_id}&select=*"),
                Some(access_token),
            )
            .send()
            .await?;
        let rows: Vec<UserProfile> = parse_json(response).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(
        &self,
        access_token: Option<&str>,
        profile: &NewProfile,
    ) -> Result<UserProfile, AuthError> {
        let token = access_token.unwrap_or(&self.api_key);
        let response = self
            .request(Method::POST, "/rest/v1/profiles", Some(token))
            .header("Prefer", "return=representation")
            .json(profile)
            .send()
            .await?;
        first_profile(parse_json(response).await?)
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AuthError> {
        let response = self
            .request(
                Method::PATCH,
                &format!("/rest/v1/profiles?id=eq.{user_id}"),
                Some(access_token),
            )
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await?;
        first_profile(parse_json(response).await?)
    }
}
