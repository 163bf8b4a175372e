//! External asset mapping
//!
//! Handles:
//! - Classifying raw image references (asset keys, platform URLs, external URLs)
//! - Exchanging external URLs for protocol asset paths
//! - Memoizing successful resolutions for the process lifetime

mod cache;
mod mapper;

pub use cache::{AssetCache, AssetKey};
pub use mapper::AssetMapper;
