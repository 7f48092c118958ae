use std::path::PathBuf;

use tracing::warn;

use crate::cache::AdminCache;
use crate::error::Result;
use crate::types::{CachePart, FlagLetters};

use super::definitions::{Definitions, DefinitionsLoader};
use super::levels::load_flag_letters;

#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// TOML document with overrides, groups and admins.
    pub definitions_path: PathBuf,
    /// Flag letter file. The default letters are used when unset.
    pub levels_path: Option<PathBuf>,
    /// Auth methods registered in addition to `steam`, `name` and `ip`.
    pub auth_methods: Vec<String>,
}

impl CacheSettings {
    pub fn new(definitions_path: impl Into<PathBuf>) -> Self {
        Self {
            definitions_path: definitions_path.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_levels_path(mut self, levels_path: Option<PathBuf>) -> Self {
        self.levels_path = levels_path;
        self
    }

    pub fn flag_letters(&self) -> FlagLetters {
        self.levels_path
            .as_deref()
            .map(|path| load_flag_letters(path).letters)
            .unwrap_or_default()
    }

    /// Builds a populated cache.
    ///
    /// The definitions are registered as a rebuild listener and loaded
    /// through a full rebuild, so later `dump_admin_cache` calls reload them.
    pub fn build_cache(&self) -> Result<AdminCache> {
        let definitions = Definitions::load(&self.definitions_path)?;

        let mut cache = AdminCache::new().with_flag_letters(self.flag_letters());
        for method in &self.auth_methods {
            if !cache.register_auth_method(method) {
                warn!("Auth method \"{}\" is already registered", method);
            }
        }
        cache.add_listener(DefinitionsLoader::new(definitions));
        cache.dump_admin_cache(CachePart::Overrides, true);
        cache.dump_admin_cache(CachePart::Groups, true);
        Ok(cache)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            definitions_path: PathBuf::from("./admins.toml"),
            levels_path: None,
            auth_methods: Vec::new(),
        }
    }
}
