//! Authenticated platform session
//!
//! The `Session` trait is the seam between the publisher and the platform:
//! production code talks REST through `PlatformSession`, tests substitute a
//! mock. The wire-level gateway protocol is deliberately not implemented;
//! the REST session satisfies the same contract.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::payload::PresenceUpdate;
use crate::config::PlatformSettings;
use crate::error::{AppError, Result};

/// Account identity carried by the ready signal
#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
}

/// An authenticated session that can publish presence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
    /// Wait until the session is usable
    ///
    /// Resolves with the logged-in account; the publisher treats this as
    /// the signal to start its schedule.
    async fn ready(&self) -> Result<SessionUser>;

    /// Publish the presence for this session's account
    async fn set_presence(&self, update: &PresenceUpdate) -> Result<()>;
}

/// REST-backed session
pub struct PlatformSession {
    http_client: Arc<reqwest::Client>,
    api_base_url: String,
    token: String,
    user: SessionUser,
}

impl PlatformSession {
    /// Authenticate against the platform and build a session
    ///
    /// # Arguments
    /// * `http_client` - Shared HTTP client
    /// * `settings` - Platform endpoint settings
    /// * `token` - Account token, sent as the raw Authorization header
    ///
    /// # Errors
    /// `AppError::Authentication` when the platform rejects the token
    /// (401/403); `AppError::Platform` for any other non-success response.
    pub async fn login(
        http_client: Arc<reqwest::Client>,
        settings: &PlatformSettings,
        token: &str,
    ) -> Result<Self> {
        let api_base_url = settings.api_base_url.trim_end_matches('/').to_string();

        // 1. Verify the token by fetching the account it belongs to
        let url = format!("{api_base_url}/users/@me");
        let response = http_client
            .get(&url)
            .header("Authorization", token)
            .send()
            .await
            .map_err(|e| AppError::Platform(format!("Login request failed: {e}")))?;

        // 2. Handle response
        let status = response.status();
        use crate::metrics::PLATFORM_REQUESTS_TOTAL;
        PLATFORM_REQUESTS_TOTAL
            .with_label_values(&["login", status.as_str()])
            .inc();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Authentication(format!(
                "Platform rejected the token: HTTP {status}"
            )));
        }
        if !status.is_success() {
            return Err(AppError::Platform(format!("Login failed: HTTP {status}")));
        }

        let user: SessionUser = response.json().await?;
        tracing::debug!(user_id = %user.id, "Token verified");

        Ok(Self {
            http_client,
            api_base_url,
            token: token.to_string(),
            user,
        })
    }

    /// The account this session is logged in as.
    pub fn user(&self) -> &SessionUser {
        &self.user
    }
}

#[async_trait]
impl Session for PlatformSession {
    async fn ready(&self) -> Result<SessionUser> {
        // Login already authenticated; the session is immediately usable.
        Ok(self.user.clone())
    }

    async fn set_presence(&self, update: &PresenceUpdate) -> Result<()> {
        let url = format!("{}/users/@me/presence", self.api_base_url);
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", &self.token)
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::Platform(format!("Presence update request failed: {e}")))?;

        let status = response.status();
        use crate::metrics::PLATFORM_REQUESTS_TOTAL;
        PLATFORM_REQUESTS_TOTAL
            .with_label_values(&["set_presence", status.as_str()])
            .inc();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Platform(format!(
                "Presence update rejected: HTTP {status} {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_user_ignores_extra_account_fields() {
        let user: SessionUser = serde_json::from_str(
            r#"{"id": "42", "username": "tester", "discriminator": "0", "flags": 256}"#,
        )
        .unwrap();

        assert_eq!(user.id, "42");
        assert_eq!(user.username, "tester");
    }
}
