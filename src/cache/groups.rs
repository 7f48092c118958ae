use std::collections::HashMap;

use tracing::{debug, info};

use super::{AdminCache, GroupRecord};
use crate::types::{
    AdminFlag, AdminId, FlagBits, GroupId, GroupSummary, ImmunityKind, OverrideKind, OverrideRule,
};

impl AdminCache {
    /// Creates a group. Returns `None` if a live group already has `name`.
    pub fn add_group(&mut self, name: &str) -> Option<GroupId> {
        if self.group_names.contains_key(name) {
            return None;
        }

        let handle = self.strings.intern(name);
        let id = GroupId::new(self.groups.insert(GroupRecord::new(handle)));
        self.group_names.insert(name.to_string(), id);
        debug!("Created group {} ({})", name, id);
        Some(id)
    }

    pub fn find_group_by_name(&self, name: &str) -> Option<GroupId> {
        self.group_names.get(name).copied()
    }

    pub fn is_valid_group(&self, id: GroupId) -> bool {
        self.groups.is_live(id.index())
    }

    pub fn get_group_name(&self, id: GroupId) -> Option<&str> {
        let handle = self.groups.get(id.index())?.name;
        self.resolve_str(handle)
    }

    /// Live groups in creation order.
    pub fn groups(&self) -> Vec<GroupId> {
        self.groups.indices().into_iter().map(GroupId::new).collect()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Sets or clears one add-flag and carries the change to every admin
    /// inheriting the group.
    pub fn set_group_add_flag(&mut self, id: GroupId, flag: AdminFlag, enabled: bool) {
        let Some(group) = self.groups.get_mut(id.index()) else {
            return;
        };
        group.add_flags = if enabled {
            group.add_flags.with(flag)
        } else {
            group.add_flags.without(flag)
        };

        for index in self.admins_in_group(id) {
            if enabled {
                if let Some(admin) = self.admins.get_mut(index) {
                    admin.effective_flags = admin.effective_flags.with(flag);
                }
            } else {
                self.recompute_effective(index);
            }
        }
    }

    pub fn get_group_add_flag(&self, id: GroupId, flag: AdminFlag) -> bool {
        self.get_group_add_flags(id).contains_flag(flag)
    }

    pub fn get_group_add_flags(&self, id: GroupId) -> FlagBits {
        self.groups
            .get(id.index())
            .map_or(FlagBits::NONE, |group| group.add_flags)
    }

    /// Sets generic immunity on a group. Enabling it also marks every admin
    /// already inheriting the group.
    pub fn set_group_generic_immunity(&mut self, id: GroupId, kind: ImmunityKind, enabled: bool) {
        let Some(group) = self.groups.get_mut(id.index()) else {
            return;
        };
        match kind {
            ImmunityKind::Default => group.immune_default = enabled,
            ImmunityKind::Global => group.immune_global = enabled,
        }
        if !enabled {
            return;
        }

        for index in self.admins_in_group(id) {
            self.set_admin_generic_immunity(AdminId::new(index), kind, true);
        }
    }

    pub fn get_group_generic_immunity(&self, id: GroupId, kind: ImmunityKind) -> bool {
        self.groups.get(id.index()).is_some_and(|group| match kind {
            ImmunityKind::Default => group.immune_default,
            ImmunityKind::Global => group.immune_global,
        })
    }

    /// Makes members of `id` immune from being targeted by members of `other_id`.
    ///
    /// Returns false if either group is not live. Adding an entry twice is a no-op.
    pub fn add_group_immunity(&mut self, id: GroupId, other_id: GroupId) -> bool {
        if !self.groups.is_live(other_id.index()) {
            return false;
        }
        let Some(group) = self.groups.get_mut(id.index()) else {
            return false;
        };
        if !group.immunity.contains(&other_id) {
            group.immunity.reserve_exact(1);
            group.immunity.push(other_id);
        }
        true
    }

    pub fn get_group_immunity_count(&self, id: GroupId) -> usize {
        self.groups
            .get(id.index())
            .map_or(0, |group| group.immunity.len())
    }

    pub fn get_group_immunity(&self, id: GroupId, index: usize) -> Option<GroupId> {
        self.groups.get(id.index())?.immunity.get(index).copied()
    }

    /// Records an allow/deny rule for a command or command group inside one group.
    pub fn add_group_command_override(
        &mut self,
        id: GroupId,
        name: &str,
        kind: OverrideKind,
        rule: OverrideRule,
    ) -> bool {
        let Some(group) = self.groups.get_mut(id.index()) else {
            return false;
        };
        let table = match kind {
            OverrideKind::Command => &mut group.command_overrides,
            OverrideKind::CommandGroup => &mut group.command_group_overrides,
        };
        table
            .get_or_insert_with(HashMap::new)
            .insert(name.to_string(), rule);

        let bits = self.overrides.get(name, kind);
        self.dispatcher.on_override_changed(name, kind, bits);
        true
    }

    pub fn get_group_command_override(
        &self,
        id: GroupId,
        name: &str,
        kind: OverrideKind,
    ) -> Option<OverrideRule> {
        let group = self.groups.get(id.index())?;
        let table = match kind {
            OverrideKind::Command => group.command_overrides.as_ref(),
            OverrideKind::CommandGroup => group.command_group_overrides.as_ref(),
        };
        table?.get(name).copied()
    }

    /// Deletes a group and strips it from every admin and immunity list that
    /// referenced it. Affected admins get their effective flags recomputed.
    pub fn invalidate_group(&mut self, id: GroupId) -> bool {
        let Some(record) = self.groups.remove(id.index()) else {
            return false;
        };
        if let Some(name) = self.strings.resolve(record.name) {
            self.group_names.remove(name);
        }
        drop(record);

        for index in self.groups.indices() {
            if let Some(group) = self.groups.get_mut(index) {
                group.immunity.retain(|other| *other != id);
            }
        }

        for index in self.admins_in_group(id) {
            if let Some(admin) = self.admins.get_mut(index) {
                admin.groups.retain(|group| *group != id);
            }
            self.recompute_effective(index);
        }

        debug!("Invalidated group {}", id);
        true
    }

    /// Drops every group and bulk-resets every admin, then resets the string
    /// table. All previously issued handles become invalid.
    pub fn invalidate_all_groups(&mut self) {
        let count = self.groups.len();
        self.group_names.clear();
        self.groups.clear();
        self.invalidate_all_admins(false);
        self.strings.reset();
        info!("Group cache invalidated ({} groups dropped)", count);
    }

    pub fn group_summary(&self, id: GroupId) -> Option<GroupSummary> {
        let group = self.groups.get(id.index())?;
        let immune_from = group
            .immunity
            .iter()
            .filter_map(|other| self.get_group_name(*other))
            .map(str::to_string)
            .collect();
        let command_overrides = [&group.command_overrides, &group.command_group_overrides]
            .iter()
            .filter_map(|table| table.as_ref())
            .map(HashMap::len)
            .sum();

        Some(GroupSummary {
            id,
            name: self.resolve_str(group.name)?.to_string(),
            add_flags: group.add_flags,
            immune_default: group.immune_default,
            immune_global: group.immune_global,
            immune_from,
            command_overrides,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccessMode;

    #[test]
    fn test_add_group_rejects_duplicate_name() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("x");
        assert!(group.is_some());
        assert_eq!(cache.add_group("x"), None);
        assert!(cache.add_group("X").is_some());
        assert_eq!(cache.find_group_by_name("x"), group);
        assert_eq!(cache.get_group_name(group.unwrap()), Some("x"));
    }

    #[test]
    fn test_add_flags() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("mods").unwrap();
        cache.set_group_add_flag(group, AdminFlag::Slay, true);
        cache.set_group_add_flag(group, AdminFlag::Vote, true);
        cache.set_group_add_flag(group, AdminFlag::Vote, false);
        assert!(cache.get_group_add_flag(group, AdminFlag::Slay));
        assert!(!cache.get_group_add_flag(group, AdminFlag::Vote));
        assert_eq!(cache.get_group_add_flags(group), AdminFlag::Slay.bit());
        assert_eq!(cache.get_group_add_flags(GroupId::INVALID), FlagBits::NONE);
    }

    #[test]
    fn test_add_flag_change_reaches_members() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("mods").unwrap();
        let admin = cache.create_admin(None);
        cache.admin_inherit_group(admin, group);

        cache.set_group_add_flag(group, AdminFlag::Ban, true);
        assert!(cache.get_admin_flag(admin, AdminFlag::Ban, AccessMode::Effective));

        cache.set_group_add_flag(group, AdminFlag::Ban, false);
        assert!(!cache.get_admin_flag(admin, AdminFlag::Ban, AccessMode::Effective));
    }

    #[test]
    fn test_group_immunity_list() {
        let mut cache = AdminCache::new();
        let vips = cache.add_group("vips").unwrap();
        let mods = cache.add_group("mods").unwrap();

        assert!(cache.add_group_immunity(vips, mods));
        assert!(cache.add_group_immunity(vips, mods));
        assert!(!cache.add_group_immunity(vips, GroupId::INVALID));
        assert!(!cache.add_group_immunity(GroupId::INVALID, mods));

        assert_eq!(cache.get_group_immunity_count(vips), 1);
        assert_eq!(cache.get_group_immunity(vips, 0), Some(mods));
        assert_eq!(cache.get_group_immunity(vips, 1), None);
        assert_eq!(cache.get_group_immunity_count(mods), 0);
    }

    #[test]
    fn test_group_command_overrides() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("mods").unwrap();
        assert_eq!(
            cache.get_group_command_override(group, "sm_ban", OverrideKind::Command),
            None
        );

        cache.add_group_command_override(group, "sm_ban", OverrideKind::Command, OverrideRule::Deny);
        cache.add_group_command_override(
            group,
            "fun",
            OverrideKind::CommandGroup,
            OverrideRule::Allow,
        );

        assert_eq!(
            cache.get_group_command_override(group, "sm_ban", OverrideKind::Command),
            Some(OverrideRule::Deny)
        );
        assert_eq!(
            cache.get_group_command_override(group, "sm_ban", OverrideKind::CommandGroup),
            None
        );
        assert_eq!(
            cache.get_group_command_override(group, "fun", OverrideKind::CommandGroup),
            Some(OverrideRule::Allow)
        );
    }

    #[test]
    fn test_invalidate_group_cascades() {
        let mut cache = AdminCache::new();
        let kickers = cache.add_group("kickers").unwrap();
        let banners = cache.add_group("banners").unwrap();
        cache.set_group_add_flag(kickers, AdminFlag::Kick, true);
        cache.set_group_add_flag(banners, AdminFlag::Ban, true);
        cache.add_group_immunity(banners, kickers);

        let admin = cache.create_admin(None);
        cache.set_admin_flag(admin, AdminFlag::Chat, true);
        cache.admin_inherit_group(admin, kickers);
        cache.admin_inherit_group(admin, banners);

        assert!(cache.invalidate_group(kickers));
        assert!(!cache.invalidate_group(kickers));
        assert!(!cache.is_valid_group(kickers));
        assert_eq!(cache.find_group_by_name("kickers"), None);
        assert_eq!(cache.get_admin_group_count(admin), 1);
        assert_eq!(cache.get_admin_group(admin, 0), Some((banners, "banners")));
        assert_eq!(cache.get_group_immunity_count(banners), 0);
        assert_eq!(
            cache.get_admin_flags(admin, AccessMode::Effective),
            AdminFlag::Chat.bit().with(AdminFlag::Ban)
        );

        let again = cache.add_group("kickers").unwrap();
        assert_eq!(again, kickers);
        assert_eq!(cache.get_group_add_flags(again), FlagBits::NONE);
    }

    #[test]
    fn test_invalidate_all_groups() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("mods").unwrap();
        let admin = cache.create_admin(Some("alice"));
        cache.bind_admin_identity(admin, "name", "alice");
        cache.admin_inherit_group(admin, group);

        cache.invalidate_all_groups();

        assert_eq!(cache.group_count(), 0);
        assert_eq!(cache.admin_count(), 0);
        assert!(!cache.is_valid_group(group));
        assert!(!cache.is_valid_admin(admin));
        assert_eq!(cache.find_group_by_name("mods"), None);
        assert_eq!(cache.find_admin_by_identity("name", "alice"), None);
        assert_eq!(cache.create_admin(None), AdminId::new(0));
    }

    #[test]
    fn test_group_summary() {
        let mut cache = AdminCache::new();
        let vips = cache.add_group("vips").unwrap();
        let mods = cache.add_group("mods").unwrap();
        cache.add_group_immunity(vips, mods);
        cache.add_group_command_override(vips, "sm_slap", OverrideKind::Command, OverrideRule::Allow);

        let summary = cache.group_summary(vips).unwrap();
        assert_eq!(summary.name, "vips");
        assert_eq!(summary.immune_from, vec!["mods".to_string()]);
        assert_eq!(summary.command_overrides, 1);
    }
}
