//! External asset resolution endpoint
//!
//! Externally hosted images cannot go on the wire as-is; the platform
//! exchanges them for `mp:external/…` asset paths scoped to an application.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PlatformSettings;
use crate::error::{AppError, Result};

/// One resolved external asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalAsset {
    pub external_asset_path: String,
}

/// Exchanges external image URLs for platform asset paths
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExternalAssetResolver: Send + Sync {
    /// Register `url` under the application and return its asset paths
    ///
    /// An empty vector means the platform had nothing for the URL; that is
    /// not an error.
    async fn resolve_external(
        &self,
        application_id: &str,
        url: &str,
    ) -> Result<Vec<ExternalAsset>>;
}

/// REST-backed resolver
pub struct HttpAssetResolver {
    http_client: Arc<reqwest::Client>,
    api_base_url: String,
    token: String,
}

impl HttpAssetResolver {
    pub fn new(http_client: Arc<reqwest::Client>, settings: &PlatformSettings, token: &str) -> Self {
        Self {
            http_client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }
}

#[async_trait]
impl ExternalAssetResolver for HttpAssetResolver {
    async fn resolve_external(
        &self,
        application_id: &str,
        url: &str,
    ) -> Result<Vec<ExternalAsset>> {
        let endpoint = format!(
            "{}/applications/{}/external-assets",
            self.api_base_url, application_id
        );

        let response = self
            .http_client
            .post(&endpoint)
            .header("Authorization", &self.token)
            .json(&serde_json::json!({ "urls": [url] }))
            .send()
            .await
            .map_err(|e| AppError::Platform(format!("External asset request failed: {e}")))?;

        let status = response.status();
        use crate::metrics::PLATFORM_REQUESTS_TOTAL;
        PLATFORM_REQUESTS_TOTAL
            .with_label_values(&["resolve_external", status.as_str()])
            .inc();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Platform(format!(
                "External asset resolution rejected: HTTP {status} {body}"
            )));
        }

        Ok(response.json().await?)
    }
}
