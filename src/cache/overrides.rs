use std::collections::BTreeMap;

use tracing::debug;

use super::AdminCache;
use crate::types::{FlagBits, OverrideKind};

/// Global command and command-group permission overrides.
#[derive(Debug, Default)]
pub(super) struct OverrideIndex {
    commands: BTreeMap<String, FlagBits>,
    command_groups: BTreeMap<String, FlagBits>,
}

impl OverrideIndex {
    fn table(&self, kind: OverrideKind) -> &BTreeMap<String, FlagBits> {
        match kind {
            OverrideKind::Command => &self.commands,
            OverrideKind::CommandGroup => &self.command_groups,
        }
    }

    fn table_mut(&mut self, kind: OverrideKind) -> &mut BTreeMap<String, FlagBits> {
        match kind {
            OverrideKind::Command => &mut self.commands,
            OverrideKind::CommandGroup => &mut self.command_groups,
        }
    }

    pub(super) fn get(&self, target: &str, kind: OverrideKind) -> Option<FlagBits> {
        self.table(kind).get(target).copied()
    }
}

impl AdminCache {
    /// Sets the bits required to run `target`, replacing any previous override.
    pub fn add_command_override(&mut self, target: &str, kind: OverrideKind, bits: FlagBits) {
        self.overrides
            .table_mut(kind)
            .insert(target.to_string(), bits);
        self.dispatcher.on_override_changed(target, kind, Some(bits));
    }

    pub fn get_command_override(&self, target: &str, kind: OverrideKind) -> Option<FlagBits> {
        self.overrides.get(target, kind)
    }

    pub fn unset_command_override(&mut self, target: &str, kind: OverrideKind) {
        if self.overrides.table_mut(kind).remove(target).is_some() {
            self.dispatcher.on_override_changed(target, kind, None);
        }
    }

    /// Removes every override of `kind`, announcing each removal.
    pub fn clear_command_overrides(&mut self, kind: OverrideKind) {
        let removed = std::mem::take(self.overrides.table_mut(kind));
        debug!("Cleared {} {:?} overrides", removed.len(), kind);
        for target in removed.keys() {
            self.dispatcher.on_override_changed(target, kind, None);
        }
    }

    pub fn command_overrides(&self, kind: OverrideKind) -> impl Iterator<Item = (&str, FlagBits)> {
        self.overrides
            .table(kind)
            .iter()
            .map(|(target, bits)| (target.as_str(), *bits))
    }
}
