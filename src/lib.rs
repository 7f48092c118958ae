//! # Admincache
//!
//! An in-memory admin and permission cache, usable both as a library and
//! through the `admincache` inspection binary.
//!
//! The cache holds admins, groups, command overrides and identity lookups in
//! one [`cache::AdminCache`] value. Records are addressed by plain integer
//! handles that stay stable until the record is invalidated. Rebuilds are
//! coordinated through [`listener::AdminListener`] callbacks, which receive
//! the cache back so they can repopulate it.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! admincache = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use admincache::config::CacheSettings;
//! use admincache::types::CachePart;
//!
//! let mut cache = CacheSettings::new("./admins.toml").build_cache()?;
//! let admin = cache.find_admin_by_identity("steam", "STEAM_0:1:1234");
//!
//! // Reload admins from the same definitions later on.
//! cache.dump_admin_cache(CachePart::Admins, true);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod listener;
pub mod store;
pub mod types;
