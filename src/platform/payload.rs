//! Wire payloads for presence updates
//!
//! Absence propagates: optional fields are omitted from the JSON entirely,
//! and empty timestamp/asset blocks are dropped rather than serialized as
//! empty objects.

use serde::{Deserialize, Serialize};

use crate::presence::{ActivityType, OnlineStatus, PresenceDescriptor};

/// Body of a presence update call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub status: OnlineStatus,
    pub activities: Vec<Activity>,
}

/// One activity slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub application_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<ActivityTimestamps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<ActivityAssets>,
}

/// Activity start/end, milliseconds since the epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityTimestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

/// Activity images and tooltips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_text: Option<String>,
}

impl ActivityAssets {
    fn is_empty(&self) -> bool {
        self.large_image.is_none()
            && self.large_text.is_none()
            && self.small_image.is_none()
            && self.small_text.is_none()
    }
}

impl PresenceUpdate {
    /// Assemble the wire payload from a descriptor and its resolved images
    ///
    /// Image references come pre-resolved (the descriptor's raw values are
    /// not wire-safe); tooltips are carried whenever present, even when the
    /// matching image failed to resolve.
    pub fn from_parts(
        descriptor: &PresenceDescriptor,
        large_image: Option<String>,
        small_image: Option<String>,
    ) -> Self {
        let timestamps = (descriptor.start_timestamp.is_some()
            || descriptor.end_timestamp.is_some())
        .then(|| ActivityTimestamps {
            start: descriptor.start_timestamp,
            end: descriptor.end_timestamp,
        });

        let assets = ActivityAssets {
            large_image,
            large_text: descriptor.large_text.clone(),
            small_image,
            small_text: descriptor.small_text.clone(),
        };
        let assets = (!assets.is_empty()).then_some(assets);

        Self {
            status: descriptor.online_status,
            activities: vec![Activity {
                application_id: descriptor.application_id.clone(),
                name: descriptor.name.clone(),
                activity_type: descriptor.activity_type,
                details: descriptor.details.clone(),
                state: descriptor.state.clone(),
                timestamps,
                assets,
            }],
        }
    }
}
