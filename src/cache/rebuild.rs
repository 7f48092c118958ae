use tracing::info;

use super::AdminCache;
use crate::listener::{AdminListener, ListenerId};
use crate::types::{AdminId, CachePart, CacheState, OverrideKind};

impl AdminCache {
    /// Registers a rebuild listener. Listeners are called in registration order.
    pub fn add_listener(&mut self, listener: impl AdminListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Some(Box::new(listener))));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(position) = self.listeners.iter().position(|(other, _)| *other == id) else {
            return false;
        };
        self.listeners.remove(position);
        true
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Wipes one cache partition and, when `rebuild` is set, tells listeners
    /// so they can repopulate it.
    ///
    /// Groups always cascade into admins. Nothing is announced while the
    /// cache is being destroyed.
    pub fn dump_admin_cache(&mut self, part: CachePart, rebuild: bool) {
        let notify = rebuild && self.state != CacheState::Destroying;
        info!("Dumping admin cache ({:?}, rebuild: {})", part, rebuild);

        if part == CachePart::Overrides {
            self.clear_command_overrides(OverrideKind::Command);
            self.clear_command_overrides(OverrideKind::CommandGroup);
            if notify {
                self.dispatch(|listener, cache| listener.on_overrides_rebuilt(cache));
                self.forward.on_cache_rebuilt(CachePart::Overrides);
            }
            return;
        }

        if part == CachePart::Groups {
            self.invalidate_all_groups();
            if notify {
                self.dispatch(|listener, cache| listener.on_groups_rebuilt(cache));
                self.forward.on_cache_rebuilt(CachePart::Groups);
            }
        }

        self.invalidate_all_admins(true);
        if notify {
            let groups_also_rebuilt = part == CachePart::Groups;
            self.dispatch(|listener, cache| listener.on_admins_rebuilt(cache, groups_also_rebuilt));
            self.forward.on_cache_rebuilt(CachePart::Admins);
            self.sessions.recheck_all_admins();
        }
    }

    /// Drops every admin.
    ///
    /// With `unlink` each admin is released through [`invalidate_admin`];
    /// without it the admin table is reset in one step. Sessions are told once
    /// up front rather than per admin.
    ///
    /// [`invalidate_admin`]: AdminCache::invalidate_admin
    pub fn invalidate_all_admins(&mut self, unlink: bool) {
        let previous = self.state;
        if previous == CacheState::Idle {
            self.state = CacheState::InvalidatingAdmins;
        }
        if previous != CacheState::Destroying {
            self.sessions.clear_all_admins();
        }

        let count = self.admins.len();
        self.clear_identities();
        if unlink {
            while let Some(first) = self.admins.first() {
                self.invalidate_admin(AdminId::new(first));
            }
        } else {
            self.admins.clear();
        }

        self.state = previous;
        info!("Admin cache invalidated ({} admins dropped)", count);
    }

    /// Tears the cache down. Later rebuild requests still clear data but no
    /// longer notify anyone.
    pub fn shutdown(&mut self) {
        if self.state == CacheState::Destroying {
            return;
        }
        self.state = CacheState::Destroying;
        self.dump_admin_cache(CachePart::Overrides, false);
        self.dump_admin_cache(CachePart::Groups, false);
        self.listeners.clear();
        info!("Admin cache shut down");
    }

    /// Calls every registered listener with mutable access to the cache.
    ///
    /// Each listener is detached from its slot for the duration of its own
    /// call, so a nested dispatch skips it and a listener removed mid-call is
    /// dropped instead of restored.
    fn dispatch(&mut self, mut call: impl FnMut(&mut dyn AdminListener, &mut AdminCache)) {
        let ids: Vec<ListenerId> = self.listeners.iter().map(|(id, _)| *id).collect();
        for id in ids {
            let Some(slot) = self.listeners.iter_mut().find(|(other, _)| *other == id) else {
                continue;
            };
            let Some(mut listener) = slot.1.take() else {
                continue;
            };

            call(listener.as_mut(), self);

            if let Some(slot) = self.listeners.iter_mut().find(|(other, _)| *other == id) {
                slot.1 = Some(listener);
            }
        }
    }
}
