//! Platform REST integration
//!
//! Handles:
//! - The authenticated session (login, presence publishing)
//! - External asset resolution
//! - Wire payload shapes
//!
//! The `Session` and `ExternalAssetResolver` traits keep transport out of
//! the core; everything above this module works against them.

mod payload;
mod resolver;
mod session;

pub use payload::{Activity, ActivityAssets, ActivityTimestamps, PresenceUpdate};
pub use resolver::{ExternalAsset, ExternalAssetResolver, HttpAssetResolver};
pub use session::{PlatformSession, Session, SessionUser};

#[cfg(test)]
pub use resolver::MockExternalAssetResolver;
#[cfg(test)]
pub use session::MockSession;
