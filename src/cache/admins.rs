use tracing::debug;

use super::{AdminCache, AdminRecord};
use crate::types::{
    AccessMode, AdminFlag, AdminId, AdminSummary, CacheState, FlagBits, GroupId, IdentityBinding,
    ImmunityKind,
};

impl AdminCache {
    /// Creates an admin, reusing a released slot when one is available.
    pub fn create_admin(&mut self, name: Option<&str>) -> AdminId {
        let name = name.map(|name| self.strings.intern(name));
        let id = AdminId::new(self.admins.insert(AdminRecord::new(name)));
        debug!("Created admin {}", id);
        id
    }

    /// Releases an admin. Returns false if `id` is not a live admin.
    pub fn invalidate_admin(&mut self, id: AdminId) -> bool {
        if !self.admins.is_live(id.index()) {
            return false;
        }

        if self.state == CacheState::Idle {
            self.sessions.clear_admin_id(id);
        }

        let Some(record) = self.admins.remove(id.index()) else {
            return false;
        };
        if let Some(binding) = record.identity {
            self.remove_identity_entry(binding);
        }

        debug!("Invalidated admin {}", id);
        true
    }

    pub fn is_valid_admin(&self, id: AdminId) -> bool {
        self.admins.is_live(id.index())
    }

    /// Live admins in creation order.
    pub fn admins(&self) -> Vec<AdminId> {
        self.admins.indices().into_iter().map(AdminId::new).collect()
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    pub fn get_admin_name(&self, id: AdminId) -> Option<&str> {
        let handle = self.admins.get(id.index())?.name?;
        self.resolve_str(handle)
    }

    /// Sets or clears a real flag; effective flags follow.
    ///
    /// Clearing a flag keeps it effective if an inherited group still grants it.
    pub fn set_admin_flag(&mut self, id: AdminId, flag: AdminFlag, enabled: bool) {
        let Some(admin) = self.admins.get_mut(id.index()) else {
            return;
        };
        if enabled {
            admin.real_flags = admin.real_flags.with(flag);
            admin.effective_flags = admin.effective_flags.with(flag);
        } else {
            admin.real_flags = admin.real_flags.without(flag);
            self.recompute_effective(id.index());
        }
    }

    /// Reads one flag. In effective mode root implies every other capability.
    pub fn get_admin_flag(&self, id: AdminId, flag: AdminFlag, mode: AccessMode) -> bool {
        let Some(admin) = self.admins.get(id.index()) else {
            return false;
        };
        match mode {
            AccessMode::Real => admin.real_flags.contains_flag(flag),
            AccessMode::Effective => {
                admin.effective_flags.contains_flag(flag)
                    || (flag != AdminFlag::Root && admin.effective_flags.has(FlagBits::ROOT))
            }
        }
    }

    pub fn get_admin_flags(&self, id: AdminId, mode: AccessMode) -> FlagBits {
        match self.admins.get(id.index()) {
            Some(admin) => match mode {
                AccessMode::Real => admin.real_flags,
                AccessMode::Effective => admin.effective_flags,
            },
            None => FlagBits::NONE,
        }
    }

    /// Replaces a whole flag set.
    ///
    /// Writing real flags recomputes effective flags. Writing effective flags
    /// never drops bits granted by real flags or inherited groups.
    pub fn set_admin_flags(&mut self, id: AdminId, mode: AccessMode, bits: FlagBits) {
        let Some(admin) = self.admins.get_mut(id.index()) else {
            return;
        };
        if mode == AccessMode::Real {
            admin.real_flags = bits;
        }
        self.recompute_effective(id.index());
        if mode == AccessMode::Effective {
            if let Some(admin) = self.admins.get_mut(id.index()) {
                admin.effective_flags = admin.effective_flags.union(bits);
            }
        }
    }

    /// True if every bit of `required` is in the admin's effective flags.
    pub fn check_admin_flags(&self, id: AdminId, required: FlagBits) -> bool {
        self.admins
            .get(id.index())
            .is_some_and(|admin| admin.effective_flags.has(required))
    }

    /// Adds `group` to the admin's inherited groups.
    ///
    /// Fails on a stale admin or group, or when the group is already inherited.
    pub fn admin_inherit_group(&mut self, id: AdminId, group: GroupId) -> bool {
        let Some(record) = self.groups.get(group.index()) else {
            return false;
        };
        let (add_flags, immune_default, immune_global) =
            (record.add_flags, record.immune_default, record.immune_global);

        let Some(admin) = self.admins.get_mut(id.index()) else {
            return false;
        };
        if admin.groups.contains(&group) {
            return false;
        }

        admin.push_group(group);
        admin.effective_flags = admin.effective_flags.union(add_flags);
        admin.immune_default |= immune_default;
        admin.immune_global |= immune_global;
        true
    }

    pub fn get_admin_group_count(&self, id: AdminId) -> usize {
        self.admins
            .get(id.index())
            .map_or(0, |admin| admin.groups.len())
    }

    /// Returns the `index`-th inherited group and its name.
    pub fn get_admin_group(&self, id: AdminId, index: usize) -> Option<(GroupId, &str)> {
        let group = *self.admins.get(id.index())?.groups.get(index)?;
        Some((group, self.get_group_name(group)?))
    }

    pub fn set_admin_password(&mut self, id: AdminId, password: Option<&str>) {
        if !self.admins.is_live(id.index()) {
            return;
        }
        let handle = password.map(|password| self.strings.intern(password));
        if let Some(admin) = self.admins.get_mut(id.index()) {
            admin.password = handle;
        }
    }

    pub fn get_admin_password(&self, id: AdminId) -> Option<&str> {
        let handle = self.admins.get(id.index())?.password?;
        self.resolve_str(handle)
    }

    pub fn set_admin_generic_immunity(&mut self, id: AdminId, kind: ImmunityKind, enabled: bool) {
        if let Some(admin) = self.admins.get_mut(id.index()) {
            match kind {
                ImmunityKind::Default => admin.immune_default = enabled,
                ImmunityKind::Global => admin.immune_global = enabled,
            }
        }
    }

    pub fn get_admin_generic_immunity(&self, id: AdminId, kind: ImmunityKind) -> bool {
        self.admins.get(id.index()).is_some_and(|admin| match kind {
            ImmunityKind::Default => admin.immune_default,
            ImmunityKind::Global => admin.immune_global,
        })
    }

    pub fn admin_summary(&self, id: AdminId) -> Option<AdminSummary> {
        let admin = self.admins.get(id.index())?;
        let groups = admin
            .groups
            .iter()
            .filter_map(|group| self.get_group_name(*group))
            .map(str::to_string)
            .collect();
        let identity = self
            .get_admin_identity(id)
            .map(|(method, identity)| IdentityBinding {
                method: method.to_string(),
                identity: identity.to_string(),
            });

        Some(AdminSummary {
            id,
            name: self.get_admin_name(id).map(str::to_string),
            flags: admin.real_flags,
            effective_flags: admin.effective_flags,
            groups,
            identity,
            has_password: admin.password.is_some(),
            immune_default: admin.immune_default,
            immune_global: admin.immune_global,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_admin_defaults() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(Some("alice"));
        assert!(cache.is_valid_admin(admin));
        assert_eq!(cache.get_admin_name(admin), Some("alice"));
        assert_eq!(cache.get_admin_flags(admin, AccessMode::Real), FlagBits::NONE);
        assert_eq!(cache.get_admin_group_count(admin), 0);
        assert_eq!(cache.get_admin_password(admin), None);
        assert!(!cache.get_admin_generic_immunity(admin, ImmunityKind::Default));

        let anonymous = cache.create_admin(None);
        assert_eq!(cache.get_admin_name(anonymous), None);
        assert_eq!(cache.admins(), vec![admin, anonymous]);
    }

    #[test]
    fn test_invalidate_admin_reuses_slot() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(Some("alice"));
        cache.set_admin_flag(admin, AdminFlag::Ban, true);
        cache.set_admin_password(admin, Some("hunter2"));

        assert!(cache.invalidate_admin(admin));
        assert!(!cache.invalidate_admin(admin));
        assert!(!cache.is_valid_admin(admin));
        assert_eq!(cache.get_admin_name(admin), None);

        let reused = cache.create_admin(None);
        assert_eq!(reused, admin);
        assert_eq!(cache.get_admin_flags(reused, AccessMode::Effective), FlagBits::NONE);
        assert_eq!(cache.get_admin_password(reused), None);
    }

    #[test]
    fn test_set_flag_updates_real_and_effective() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(None);
        cache.set_admin_flag(admin, AdminFlag::Kick, true);
        assert!(cache.get_admin_flag(admin, AdminFlag::Kick, AccessMode::Real));
        assert!(cache.get_admin_flag(admin, AdminFlag::Kick, AccessMode::Effective));

        cache.set_admin_flag(admin, AdminFlag::Kick, false);
        assert!(!cache.get_admin_flag(admin, AdminFlag::Kick, AccessMode::Real));
        assert!(!cache.get_admin_flag(admin, AdminFlag::Kick, AccessMode::Effective));
    }

    #[test]
    fn test_clearing_real_flag_keeps_group_grant() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("kickers").unwrap();
        cache.set_group_add_flag(group, AdminFlag::Kick, true);
        let admin = cache.create_admin(None);
        cache.set_admin_flag(admin, AdminFlag::Kick, true);
        cache.admin_inherit_group(admin, group);

        cache.set_admin_flag(admin, AdminFlag::Kick, false);
        assert!(!cache.get_admin_flag(admin, AdminFlag::Kick, AccessMode::Real));
        assert!(cache.get_admin_flag(admin, AdminFlag::Kick, AccessMode::Effective));
    }

    #[test]
    fn test_root_implies_other_flags_when_effective() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(None);
        cache.set_admin_flag(admin, AdminFlag::Root, true);

        assert!(cache.get_admin_flag(admin, AdminFlag::Rcon, AccessMode::Effective));
        assert!(cache.get_admin_flag(admin, AdminFlag::Root, AccessMode::Effective));
        assert!(!cache.get_admin_flag(admin, AdminFlag::Rcon, AccessMode::Real));
        assert!(!cache.check_admin_flags(admin, AdminFlag::Rcon.bit()));
    }

    #[test]
    fn test_set_admin_flags_bulk() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("chat").unwrap();
        cache.set_group_add_flag(group, AdminFlag::Chat, true);
        let admin = cache.create_admin(None);
        cache.admin_inherit_group(admin, group);

        let real = AdminFlag::Kick.bit().with(AdminFlag::Ban);
        cache.set_admin_flags(admin, AccessMode::Real, real);
        assert_eq!(cache.get_admin_flags(admin, AccessMode::Real), real);
        assert_eq!(
            cache.get_admin_flags(admin, AccessMode::Effective),
            real.with(AdminFlag::Chat)
        );

        cache.set_admin_flags(admin, AccessMode::Effective, AdminFlag::Vote.bit());
        let effective = cache.get_admin_flags(admin, AccessMode::Effective);
        assert!(effective.contains_flag(AdminFlag::Vote));
        assert!(effective.has(real.with(AdminFlag::Chat)));
        assert_eq!(cache.get_admin_flags(admin, AccessMode::Real), real);
    }

    #[test]
    fn test_inherit_group_rejects_duplicates_and_stale() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("mods").unwrap();
        cache.set_group_generic_immunity(group, ImmunityKind::Global, true);
        let admin = cache.create_admin(None);

        assert!(cache.admin_inherit_group(admin, group));
        assert!(!cache.admin_inherit_group(admin, group));
        assert!(!cache.admin_inherit_group(admin, GroupId::INVALID));
        assert!(!cache.admin_inherit_group(AdminId::INVALID, group));
        assert_eq!(cache.get_admin_group_count(admin), 1);
        assert_eq!(cache.get_admin_group(admin, 0), Some((group, "mods")));
        assert_eq!(cache.get_admin_group(admin, 1), None);
        assert!(cache.get_admin_generic_immunity(admin, ImmunityKind::Global));
    }

    #[test]
    fn test_group_list_grows() {
        let mut cache = AdminCache::new();
        let admin = cache.create_admin(None);
        let groups: Vec<GroupId> = (0..5)
            .map(|i| cache.add_group(&format!("g{i}")).unwrap())
            .collect();
        for group in &groups {
            assert!(cache.admin_inherit_group(admin, *group));
        }
        assert_eq!(cache.get_admin_group_count(admin), 5);
        assert_eq!(cache.get_admin_group(admin, 4), Some((groups[4], "g4")));
    }

    #[test]
    fn test_admin_summary() {
        let mut cache = AdminCache::new();
        let group = cache.add_group("mods").unwrap();
        let admin = cache.create_admin(Some("alice"));
        cache.admin_inherit_group(admin, group);
        cache.bind_admin_identity(admin, "steam", "STEAM_0:0:7");
        cache.set_admin_password(admin, Some("pw"));

        let summary = cache.admin_summary(admin).unwrap();
        assert_eq!(summary.name.as_deref(), Some("alice"));
        assert_eq!(summary.groups, vec!["mods".to_string()]);
        assert_eq!(summary.identity.unwrap().identity, "STEAM_0:0:7");
        assert!(summary.has_password);
        assert!(cache.admin_summary(AdminId::INVALID).is_none());
    }
}
