use super::AdminCache;
use crate::types::{AdminId, FlagBits, OverrideKind, OverrideRule};

impl AdminCache {
    /// Decides whether admin `id` may run an administrative action on `target`.
    ///
    /// Rules, in order: a source that is not a live admin never targets; an
    /// invalid target or self is always targetable; a stale target fails;
    /// root targets anyone; global immunity blocks; default immunity blocks
    /// admins with no groups; a target group listing any of the source's
    /// groups in its immunity list blocks.
    pub fn can_admin_target(&self, id: AdminId, target: AdminId) -> bool {
        if !self.is_valid_admin(id) {
            return false;
        }
        if !target.is_valid() || id == target {
            return true;
        }

        let (Some(user), Some(victim)) = (self.admins.get(id.index()), self.admins.get(target.index()))
        else {
            return false;
        };

        if user.effective_flags.has(FlagBits::ROOT) {
            return true;
        }
        if victim.immune_global {
            return false;
        }
        if victim.immune_default && user.groups.is_empty() {
            return false;
        }

        let blocked = victim
            .groups
            .iter()
            .filter_map(|gid| self.groups.get(gid.index()))
            .flat_map(|group| group.immunity.iter())
            .any(|immune_from| user.groups.contains(immune_from));

        !blocked
    }

    /// Decides whether admin `id` may run `command`.
    ///
    /// The required bits come from the global command override, then the
    /// global override of `command_group`, then `default_bits`. Per-group
    /// allow/deny rules on the admin's groups are consulted before the flag
    /// check; within one group a command rule beats a command-group rule.
    pub fn check_command_access(
        &self,
        id: AdminId,
        command: &str,
        command_group: Option<&str>,
        default_bits: FlagBits,
    ) -> bool {
        let required = self
            .overrides
            .get(command, OverrideKind::Command)
            .or_else(|| command_group.and_then(|group| self.overrides.get(group, OverrideKind::CommandGroup)))
            .unwrap_or(default_bits);
        if required.is_empty() {
            return true;
        }

        let Some(admin) = self.admins.get(id.index()) else {
            return false;
        };
        if admin.effective_flags.has(FlagBits::ROOT) {
            return true;
        }

        for gid in &admin.groups {
            let rule = self
                .get_group_command_override(*gid, command, OverrideKind::Command)
                .or_else(|| {
                    command_group.and_then(|group| {
                        self.get_group_command_override(*gid, group, OverrideKind::CommandGroup)
                    })
                });
            match rule {
                Some(OverrideRule::Allow) => return true,
                Some(OverrideRule::Deny) => return false,
                None => {}
            }
        }

        admin.effective_flags.has(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessMode, AdminFlag, ImmunityKind};

    #[test]
    fn test_default_immunity_needs_a_group() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(None);
        let target = cache.create_admin(None);
        cache.set_admin_generic_immunity(target, ImmunityKind::Default, true);
        assert!(!cache.can_admin_target(admin, target));

        let group = cache.add_group("mods").unwrap();
        cache.admin_inherit_group(admin, group);
        assert!(cache.can_admin_target(admin, target));
    }

    #[test]
    fn test_root_ignores_immunity() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(None);
        let target = cache.create_admin(None);
        cache.set_admin_generic_immunity(target, ImmunityKind::Global, true);
        assert!(!cache.can_admin_target(admin, target));

        cache.set_admin_flag(admin, AdminFlag::Root, true);
        assert!(cache.get_admin_flag(admin, AdminFlag::Root, AccessMode::Effective));
        assert!(cache.can_admin_target(admin, target));
    }

    #[test]
    fn test_invalid_handles() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(None);
        let stale = cache.create_admin(None);
        cache.invalidate_admin(stale);

        assert!(cache.can_admin_target(admin, AdminId::INVALID));
        assert!(cache.can_admin_target(admin, admin));
        assert!(!cache.can_admin_target(AdminId::INVALID, admin));
        assert!(!cache.can_admin_target(AdminId::INVALID, AdminId::INVALID));
        assert!(!cache.can_admin_target(admin, stale));
        assert!(!cache.can_admin_target(stale, admin));
        assert!(!cache.can_admin_target(stale, AdminId::INVALID));
        assert!(!cache.can_admin_target(stale, stale));
    }

    #[test]
    fn test_group_specific_immunity() {
        let mut cache = AdminCache::new();
        let vips = cache.add_group("vips").unwrap();
        let mods = cache.add_group("mods").unwrap();
        let helpers = cache.add_group("helpers").unwrap();
        cache.add_group_immunity(vips, mods);

        let moderator = cache.create_admin(None);
        cache.admin_inherit_group(moderator, helpers);
        cache.admin_inherit_group(moderator, mods);
        let helper = cache.create_admin(None);
        cache.admin_inherit_group(helper, helpers);
        let vip = cache.create_admin(None);
        cache.admin_inherit_group(vip, helpers);
        cache.admin_inherit_group(vip, vips);

        assert!(!cache.can_admin_target(moderator, vip));
        assert!(cache.can_admin_target(helper, vip));
        assert!(cache.can_admin_target(vip, moderator));
    }

    #[test]
    fn test_command_access_uses_override_bits() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(None);
        cache.set_admin_flag(admin, AdminFlag::Kick, true);

        assert!(cache.check_command_access(admin, "sm_kick", None, AdminFlag::Kick.bit()));
        assert!(!cache.check_command_access(admin, "sm_ban", None, AdminFlag::Ban.bit()));
        assert!(cache.check_command_access(AdminId::INVALID, "sm_help", None, FlagBits::NONE));
        assert!(!cache.check_command_access(AdminId::INVALID, "sm_kick", None, AdminFlag::Kick.bit()));

        cache.add_command_override("sm_ban", OverrideKind::Command, AdminFlag::Kick.bit());
        assert!(cache.check_command_access(admin, "sm_ban", None, AdminFlag::Ban.bit()));

        cache.add_command_override("fun", OverrideKind::CommandGroup, AdminFlag::Cheats.bit());
        assert!(!cache.check_command_access(admin, "sm_slap", Some("fun"), AdminFlag::Kick.bit()));
    }

    #[test]
    fn test_command_access_group_rules() {
        let mut cache = AdminCache::new();
        let allowed = cache.add_group("allowed").unwrap();
        let denied = cache.add_group("denied").unwrap();
        cache.add_group_command_override(allowed, "sm_ban", OverrideKind::Command, OverrideRule::Allow);
        cache.add_group_command_override(denied, "sm_kick", OverrideKind::Command, OverrideRule::Deny);
        cache.add_group_command_override(denied, "fun", OverrideKind::CommandGroup, OverrideRule::Allow);

        let admin = cache.create_admin(None);
        cache.set_admin_flag(admin, AdminFlag::Kick, true);
        cache.admin_inherit_group(admin, allowed);
        cache.admin_inherit_group(admin, denied);

        assert!(cache.check_command_access(admin, "sm_ban", None, AdminFlag::Ban.bit()));
        assert!(!cache.check_command_access(admin, "sm_kick", None, AdminFlag::Kick.bit()));
        assert!(cache.check_command_access(admin, "sm_slap", Some("fun"), AdminFlag::Slay.bit()));

        let root = cache.create_admin(None);
        cache.set_admin_flag(root, AdminFlag::Root, true);
        cache.admin_inherit_group(root, denied);
        assert!(cache.check_command_access(root, "sm_kick", None, AdminFlag::Kick.bit()));
    }
}
