mod access;
mod check;
mod commands;
mod dump;
mod target;

pub use access::run_access;
pub use check::run_check;
pub use commands::{AdminSelector, CacheArgs};
pub use dump::run_dump;
pub use target::run_target;

use std::path::PathBuf;

use anyhow::{Context, bail};

use crate::cache::AdminCache;
use crate::config::CacheSettings;
use crate::types::{AdminId, FlagBits};

/// Build a populated cache from the command line paths, checking they exist
pub fn init_cache(args: &CacheArgs) -> anyhow::Result<AdminCache> {
    let definitions_path = PathBuf::from(&args.config);
    if !definitions_path.exists() {
        bail!("Definitions file not found at {}", definitions_path.display());
    }

    CacheSettings::new(&definitions_path)
        .with_levels_path(args.levels.as_ref().map(PathBuf::from))
        .build_cache()
        .with_context(|| format!("Failed to load {}", definitions_path.display()))
}

pub fn find_admin_by_name(cache: &AdminCache, name: &str) -> anyhow::Result<AdminId> {
    cache
        .admins()
        .into_iter()
        .find(|id| cache.get_admin_name(*id) == Some(name))
        .with_context(|| format!("Admin '{name}' not found"))
}

pub fn select_admin(cache: &AdminCache, selector: &AdminSelector) -> anyhow::Result<AdminId> {
    match (&selector.admin, &selector.auth, &selector.identity) {
        (Some(name), _, _) => find_admin_by_name(cache, name),
        (None, Some(auth), Some(identity)) => {
            if cache.find_auth_method(auth).is_none() {
                bail!("Unknown auth method '{auth}'");
            }
            cache
                .find_admin_by_identity(auth, identity)
                .with_context(|| format!("No admin bound to {auth} identity '{identity}'"))
        }
        _ => bail!("Specify --admin or both --auth and --identity"),
    }
}

/// Parse a letter string with the cache's letter table, rejecting unknown letters
pub fn parse_flags(cache: &AdminCache, letters: &str) -> anyhow::Result<FlagBits> {
    let (bits, consumed) = cache.flag_letters().read_flag_string(letters);
    if consumed < letters.len() {
        bail!("Unknown flag letters '{}'", &letters[consumed..]);
    }
    Ok(bits)
}
