//! Image reference mapping
//!
//! Turns raw image references into values the presence protocol accepts:
//! plain asset keys pass through, platform-hosted URLs pass through, other
//! http(s) URLs are exchanged for external asset paths via the resolver
//! (memoized in the cache), and everything else is dropped.

use std::sync::Arc;

use url::Url;

use super::cache::{AssetCache, AssetKey};
use crate::error::Result;
use crate::platform::ExternalAssetResolver;

/// Hosts whose URLs the protocol accepts directly, without resolution.
const PLATFORM_MEDIA_HOSTS: [&str; 2] = ["cdn.discordapp.com", "media.discordapp.net"];

/// Resolves image references to protocol-acceptable asset strings
pub struct AssetMapper {
    resolver: Arc<dyn ExternalAssetResolver>,
    cache: Arc<AssetCache>,
}

impl AssetMapper {
    /// Create a new mapper
    ///
    /// # Arguments
    /// * `resolver` - Exchanges external URLs for asset paths
    /// * `cache` - Shared resolution cache; inject a fresh one in tests
    pub fn new(resolver: Arc<dyn ExternalAssetResolver>, cache: Arc<AssetCache>) -> Self {
        Self { resolver, cache }
    }

    /// Resolve one image reference
    ///
    /// # Arguments
    /// * `application_id` - Application the asset is registered under
    /// * `reference` - Raw value from the descriptor
    ///
    /// # Returns
    /// The string to put on the wire, or `None` when the reference is
    /// absent or unusable.
    ///
    /// # Errors
    /// Propagates resolver failures; the publisher catches them per image.
    pub async fn resolve_image(
        &self,
        application_id: &str,
        reference: Option<&str>,
    ) -> Result<Option<String>> {
        use crate::metrics::EXTERNAL_RESOLUTIONS_TOTAL;

        // 1. Absent or blank references resolve to nothing
        let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };

        // 2. Non-URL values are plain asset keys/ids, used as-is
        let Ok(parsed) = Url::parse(reference) else {
            return Ok(Some(reference.to_string()));
        };

        // 3. Only http(s) URLs can be carried or resolved
        if !matches!(parsed.scheme(), "http" | "https") {
            tracing::debug!(
                reference,
                scheme = parsed.scheme(),
                "Dropping image reference with unsupported scheme"
            );
            return Ok(None);
        }

        // 4. Platform-hosted URLs are accepted directly by the protocol
        if parsed
            .host_str()
            .is_some_and(|host| PLATFORM_MEDIA_HOSTS.contains(&host))
        {
            return Ok(Some(reference.to_string()));
        }

        // 5. Third-party URL: check the cache before going to the network
        let key = AssetKey::new(application_id, reference);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(Some(cached));
        }

        let assets = match self
            .resolver
            .resolve_external(application_id, reference)
            .await
        {
            Ok(assets) => assets,
            Err(e) => {
                EXTERNAL_RESOLUTIONS_TOTAL
                    .with_label_values(&["error"])
                    .inc();
                return Err(e);
            }
        };

        let path = assets
            .into_iter()
            .next()
            .map(|asset| asset.external_asset_path)
            .filter(|path| !path.is_empty());

        let Some(path) = path else {
            EXTERNAL_RESOLUTIONS_TOTAL
                .with_label_values(&["empty"])
                .inc();
            tracing::warn!(reference, "External asset resolution returned no usable path");
            return Ok(None);
        };

        EXTERNAL_RESOLUTIONS_TOTAL.with_label_values(&["ok"]).inc();

        // 6. Memoize; failures above were not cached, so they retry next cycle
        self.cache.insert(key, path.clone()).await;
        Ok(Some(path))
    }
}
