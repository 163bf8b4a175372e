//! Periodic presence publishing
//!
//! Drives the whole pipeline: wait for the session's ready signal, publish
//! once immediately, then republish on a fixed interval until cancelled.
//! A failed cycle is logged and counted; the schedule is never abandoned.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::assets::AssetMapper;
use crate::config::RawPresenceConfig;
use crate::error::Result;
use crate::platform::{PresenceUpdate, Session};
use crate::presence::{PresenceDefaults, PresenceDescriptor};

/// Publisher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    /// Waiting for the session's ready signal
    AwaitingReady,
    /// Publishing on schedule
    Active,
}

/// Drives periodic presence publication over a session
pub struct PresencePublisher {
    session: Arc<dyn Session>,
    mapper: AssetMapper,
    raw: RawPresenceConfig,
    defaults: PresenceDefaults,
    refresh_interval: Duration,
    state: PublisherState,
}

impl PresencePublisher {
    /// Create a new publisher
    ///
    /// # Arguments
    /// * `session` - Authenticated session to publish through
    /// * `mapper` - Image reference resolver
    /// * `raw` - The document's `rpc` object, normalized anew every cycle
    /// * `defaults` - Fallbacks applied during normalization
    /// * `refresh_interval` - Time between publishes (must be non-zero)
    pub fn new(
        session: Arc<dyn Session>,
        mapper: AssetMapper,
        raw: RawPresenceConfig,
        defaults: PresenceDefaults,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            session,
            mapper,
            raw,
            defaults,
            refresh_interval,
            state: PublisherState::AwaitingReady,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PublisherState {
        self.state
    }

    /// Run until cancelled
    ///
    /// # Errors
    /// Only a failed ready signal is fatal. Once active, per-cycle failures
    /// are contained and the next scheduled cycle still runs.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        // 1. Wait for the session
        let user = tokio::select! {
            result = self.session.ready() => result?,
            _ = cancel.cancelled() => {
                tracing::info!("Publisher stopped before the session became ready");
                return Ok(());
            }
        };
        tracing::info!("Logged in as {} ({})", user.username, user.id);
        self.state = PublisherState::Active;

        // 2. Publish on every tick; the first tick fires immediately, so the
        //    presence goes out as soon as the session is ready
        let mut interval = tokio::time::interval(self.refresh_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = cancel.cancelled() => {
                    tracing::info!("Publisher stopped");
                    return Ok(());
                }
            }

            // In-flight cycles are not cancelled; a slow network call only
            // delays this cycle's publish.
            self.publish_once().await;
        }
    }

    /// One publish cycle; failures end here, not the schedule
    async fn publish_once(&self) {
        use crate::metrics::{ERRORS_TOTAL, PUBLISH_CYCLES_TOTAL, PUBLISH_DURATION_SECONDS};

        let started = Instant::now();
        let outcome = match self.try_publish().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::error!(error = %e, "Failed to publish presence");
                ERRORS_TOTAL
                    .with_label_values(&[e.error_type(), "publish"])
                    .inc();
                "error"
            }
        };

        PUBLISH_CYCLES_TOTAL.with_label_values(&[outcome]).inc();
        PUBLISH_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());
    }

    /// Build and send one presence update
    async fn try_publish(&self) -> Result<()> {
        // 1. Normalize the document
        let descriptor = PresenceDescriptor::normalize(&self.raw, &self.defaults);

        // 2. Resolve both images concurrently; a failure in one never
        //    affects the other
        let (large_image, small_image) = tokio::join!(
            self.resolve_image_safe(
                "large image",
                &descriptor.application_id,
                descriptor.large_image.as_deref(),
            ),
            self.resolve_image_safe(
                "small image",
                &descriptor.application_id,
                descriptor.small_image.as_deref(),
            ),
        );

        // 3. Assemble and publish
        let update = PresenceUpdate::from_parts(&descriptor, large_image, small_image);
        self.session.set_presence(&update).await?;

        tracing::info!(status = %descriptor.online_status, "Presence updated");
        Ok(())
    }

    /// Resolve one image, degrading failures to an absent image
    async fn resolve_image_safe(
        &self,
        label: &str,
        application_id: &str,
        reference: Option<&str>,
    ) -> Option<String> {
        match self.mapper.resolve_image(application_id, reference).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::error!(error = %e, image = label, "Failed to resolve image");
                use crate::metrics::ERRORS_TOTAL;
                ERRORS_TOTAL
                    .with_label_values(&[e.error_type(), "resolve_image"])
                    .inc();
                None
            }
        }
    }
}
