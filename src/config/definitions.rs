//! TOML admin definitions: global overrides, groups and admins.
//!
//! ```toml
//! [overrides]
//! sm_ban = "d"
//! "@fun" = "f"            # leading '@' names a command group
//!
//! [[groups]]
//! name = "Moderators"
//! flags = "cdj"
//! immune_default = true
//! immune_from = ["Helpers"]
//! overrides = { sm_map = "allow", "@fun" = "deny" }
//!
//! [[admins]]
//! name = "alice"
//! auth = "steam"
//! identity = "STEAM_0:1:1234"
//! flags = "b"
//! groups = ["Moderators"]
//! ```
//!
//! Problems inside a document (unknown groups, letters or auth methods) are
//! logged and skipped. Only unreadable or malformed TOML is an error.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::AdminCache;
use crate::error::Result;
use crate::listener::AdminListener;
use crate::types::{AccessMode, FlagBits, ImmunityKind, OverrideKind, OverrideRule};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Definitions {
    pub overrides: BTreeMap<String, String>,
    pub groups: Vec<GroupDefinition>,
    pub admins: Vec<AdminDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupDefinition {
    pub name: String,
    pub flags: String,
    pub immune_default: bool,
    pub immune_global: bool,
    pub immune_from: Vec<String>,
    pub overrides: BTreeMap<String, OverrideRule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdminDefinition {
    pub name: Option<String>,
    pub auth: Option<String>,
    pub identity: Option<String>,
    pub flags: String,
    pub groups: Vec<String>,
    pub password: Option<String>,
    pub immune_default: bool,
    pub immune_global: bool,
}

/// Counts of what a pass created, and how many entries were skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub overrides: usize,
    pub groups: usize,
    pub admins: usize,
    pub skipped: usize,
}

/// Splits an override key into its target and kind. `@name` is a command group.
pub fn parse_override_target(key: &str) -> (&str, OverrideKind) {
    match key.strip_prefix('@') {
        Some(group) => (group, OverrideKind::CommandGroup),
        None => (key, OverrideKind::Command),
    }
}

/// Reads a letter string, warning about the unrecognized tail.
fn read_flags(cache: &AdminCache, flags: &str, owner: &str, report: &mut ApplyReport) -> FlagBits {
    let (bits, consumed) = cache.flag_letters().read_flag_string(flags);
    if consumed < flags.len() {
        warn!(
            "Unrecognized flag letters \"{}\" for {}; keeping \"{}\"",
            &flags[consumed..],
            owner,
            &flags[..consumed]
        );
        report.skipped += 1;
    }
    bits
}

impl Definitions {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Applies every section: overrides, then groups, then admins.
    pub fn apply(&self, cache: &mut AdminCache) -> ApplyReport {
        let mut report = ApplyReport::default();
        self.apply_overrides(cache, &mut report);
        self.apply_groups(cache, &mut report);
        self.apply_admins(cache, &mut report);
        info!(
            "Applied definitions: {} overrides, {} groups, {} admins ({} skipped)",
            report.overrides, report.groups, report.admins, report.skipped
        );
        report
    }

    pub fn apply_overrides(&self, cache: &mut AdminCache, report: &mut ApplyReport) {
        for (key, flags) in &self.overrides {
            let (target, kind) = parse_override_target(key);
            if target.is_empty() {
                warn!("Skipping override with an empty name");
                report.skipped += 1;
                continue;
            }
            let bits = read_flags(cache, flags, &format!("override \"{key}\""), report);
            cache.add_command_override(target, kind, bits);
            report.overrides += 1;
        }
    }

    /// Creates groups in two passes so immunity lists may name groups
    /// defined later in the document.
    pub fn apply_groups(&self, cache: &mut AdminCache, report: &mut ApplyReport) {
        let mut created = Vec::with_capacity(self.groups.len());
        for definition in &self.groups {
            let Some(id) = cache.add_group(&definition.name) else {
                warn!("Skipping duplicate group \"{}\"", definition.name);
                report.skipped += 1;
                continue;
            };

            let owner = format!("group \"{}\"", definition.name);
            let bits = read_flags(cache, &definition.flags, &owner, report);
            for flag in bits.iter() {
                cache.set_group_add_flag(id, flag, true);
            }
            if definition.immune_default {
                cache.set_group_generic_immunity(id, ImmunityKind::Default, true);
            }
            if definition.immune_global {
                cache.set_group_generic_immunity(id, ImmunityKind::Global, true);
            }
            for (key, rule) in &definition.overrides {
                let (target, kind) = parse_override_target(key);
                cache.add_group_command_override(id, target, kind, *rule);
            }

            created.push((id, definition));
            report.groups += 1;
        }

        for (id, definition) in created {
            for other in &definition.immune_from {
                match cache.find_group_by_name(other) {
                    Some(other_id) => {
                        cache.add_group_immunity(id, other_id);
                    }
                    None => {
                        warn!(
                            "Group \"{}\" is immune from unknown group \"{}\"",
                            definition.name, other
                        );
                        report.skipped += 1;
                    }
                }
            }
        }
    }

    pub fn apply_admins(&self, cache: &mut AdminCache, report: &mut ApplyReport) {
        for (position, definition) in self.admins.iter().enumerate() {
            let owner = match &definition.name {
                Some(name) => format!("admin \"{name}\""),
                None => format!("admin #{position}"),
            };

            let id = cache.create_admin(definition.name.as_deref());
            let bits = read_flags(cache, &definition.flags, &owner, report);
            cache.set_admin_flags(id, AccessMode::Real, bits);

            for group in &definition.groups {
                match cache.find_group_by_name(group) {
                    Some(group_id) => {
                        cache.admin_inherit_group(id, group_id);
                    }
                    None => {
                        warn!("{} references unknown group \"{}\"", owner, group);
                        report.skipped += 1;
                    }
                }
            }

            if definition.immune_default {
                cache.set_admin_generic_immunity(id, ImmunityKind::Default, true);
            }
            if definition.immune_global {
                cache.set_admin_generic_immunity(id, ImmunityKind::Global, true);
            }
            if let Some(password) = &definition.password {
                cache.set_admin_password(id, Some(password));
            }

            match (&definition.auth, &definition.identity) {
                (Some(auth), Some(identity)) => {
                    if cache.find_auth_method(auth).is_none() {
                        warn!("{} uses unknown auth method \"{}\"", owner, auth);
                        report.skipped += 1;
                    } else if !cache.bind_admin_identity(id, auth, identity) {
                        warn!("{}: identity \"{}\" is already bound", owner, identity);
                        report.skipped += 1;
                    }
                }
                (None, None) => {}
                _ => {
                    warn!("{} needs both auth and identity to be bound", owner);
                    report.skipped += 1;
                }
            }

            report.admins += 1;
        }
    }
}

/// Rebuild listener that repopulates each cache partition from a
/// [`Definitions`] document.
#[derive(Debug, Clone)]
pub struct DefinitionsLoader {
    definitions: Definitions,
}

impl DefinitionsLoader {
    pub fn new(definitions: Definitions) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }
}

impl AdminListener for DefinitionsLoader {
    fn on_overrides_rebuilt(&mut self, cache: &mut AdminCache) {
        let mut report = ApplyReport::default();
        self.definitions.apply_overrides(cache, &mut report);
        info!("Reloaded {} overrides", report.overrides);
    }

    fn on_groups_rebuilt(&mut self, cache: &mut AdminCache) {
        let mut report = ApplyReport::default();
        self.definitions.apply_groups(cache, &mut report);
        info!("Reloaded {} groups ({} skipped)", report.groups, report.skipped);
    }

    fn on_admins_rebuilt(&mut self, cache: &mut AdminCache, _groups_also_rebuilt: bool) {
        let mut report = ApplyReport::default();
        self.definitions.apply_admins(cache, &mut report);
        info!("Reloaded {} admins ({} skipped)", report.admins, report.skipped);
    }
}
