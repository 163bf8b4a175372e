//! Normalized presence model
//!
//! The descriptor is the typed, fully-populated form of the user's `rpc`
//! object: required protocol fields are non-optional by construction, so a
//! descriptor is always publishable.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::AppError;

/// Application identifier used when the document does not provide one.
pub const DEFAULT_APPLICATION_ID: &str = "876078579698520065";

lazy_static! {
    // Captured once so every refresh cycle reports the same elapsed-time
    // origin instead of resetting the activity clock.
    static ref PROCESS_START_MILLIS: i64 = chrono::Utc::now().timestamp_millis();
}

/// Activity type, carried on the wire as the protocol's numeric discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ActivityType {
    Playing = 0,
    Streaming = 1,
    Listening = 2,
    Watching = 3,
    Custom = 4,
    Competing = 5,
}

impl ActivityType {
    /// Uppercase protocol name, as users write it in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Playing => "PLAYING",
            ActivityType::Streaming => "STREAMING",
            ActivityType::Listening => "LISTENING",
            ActivityType::Watching => "WATCHING",
            ActivityType::Custom => "CUSTOM",
            ActivityType::Competing => "COMPETING",
        }
    }
}

impl FromStr for ActivityType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLAYING" => Ok(ActivityType::Playing),
            "STREAMING" => Ok(ActivityType::Streaming),
            "LISTENING" => Ok(ActivityType::Listening),
            "WATCHING" => Ok(ActivityType::Watching),
            "CUSTOM" => Ok(ActivityType::Custom),
            "COMPETING" => Ok(ActivityType::Competing),
            other => Err(AppError::Config(format!("Unknown activity type '{other}'"))),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Online status, serialized as the protocol's lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnlineStatus {
    Online,
    Idle,
    Dnd,
    Invisible,
}

impl OnlineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnlineStatus::Online => "online",
            OnlineStatus::Idle => "idle",
            OnlineStatus::Dnd => "dnd",
            OnlineStatus::Invisible => "invisible",
        }
    }
}

impl FromStr for OnlineStatus {
    type Err = AppError;

    // Deliberately no trimming: a padded status is not a valid status.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "online" => Ok(OnlineStatus::Online),
            "idle" => Ok(OnlineStatus::Idle),
            "dnd" => Ok(OnlineStatus::Dnd),
            "invisible" => Ok(OnlineStatus::Invisible),
            other => Err(AppError::Config(format!("Unknown online status '{other}'"))),
        }
    }
}

impl fmt::Display for OnlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully normalized presence, rebuilt from the document every cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceDescriptor {
    /// Protocol application identifier; never empty
    pub application_id: String,
    pub activity_type: ActivityType,
    pub name: Option<String>,
    pub details: Option<String>,
    pub state: Option<String>,
    /// Milliseconds since the epoch
    pub start_timestamp: Option<i64>,
    /// Milliseconds since the epoch
    pub end_timestamp: Option<i64>,
    pub online_status: OnlineStatus,
    /// Raw image reference; resolved to an asset path by the mapper
    pub large_image: Option<String>,
    pub large_text: Option<String>,
    /// Raw image reference; resolved to an asset path by the mapper
    pub small_image: Option<String>,
    pub small_text: Option<String>,
}

/// Fallback values applied when the document omits or mangles a field
///
/// The small image deliberately has no fallback: an unconfigured small image
/// stays absent rather than echoing the large one.
#[derive(Debug, Clone)]
pub struct PresenceDefaults {
    pub application_id: String,
    pub activity_type: ActivityType,
    pub name: Option<String>,
    pub details: Option<String>,
    pub state: Option<String>,
    pub start_timestamp: Option<i64>,
    pub end_timestamp: Option<i64>,
    pub online_status: OnlineStatus,
    pub large_image: Option<String>,
    pub large_text: Option<String>,
}

impl PresenceDefaults {
    /// Built-in fallbacks
    ///
    /// The start timestamp is the process start, captured once, so a
    /// default-configured activity shows a stable elapsed time.
    pub fn builtin() -> Self {
        Self {
            application_id: DEFAULT_APPLICATION_ID.to_string(),
            activity_type: ActivityType::Watching,
            name: Some("rustpresence".to_string()),
            details: None,
            state: None,
            start_timestamp: Some(*PROCESS_START_MILLIS),
            end_timestamp: None,
            online_status: OnlineStatus::Idle,
            large_image: None,
            large_text: None,
        }
    }
}
