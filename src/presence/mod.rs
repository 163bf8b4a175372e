//! Presence normalization
//!
//! Handles:
//! - The normalized presence descriptor and its closed enums
//! - Built-in fallback values
//! - Document-to-descriptor normalization

mod descriptor;
mod normalize;

pub use descriptor::{
    ActivityType, DEFAULT_APPLICATION_ID, OnlineStatus, PresenceDefaults, PresenceDescriptor,
};
