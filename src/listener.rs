//! Interfaces between the cache and the subsystems around it.
//!
//! The cache calls out through [`SessionTracker`], [`CommandDispatcher`] and
//! [`RebuildForward`], and other subsystems observe rebuilds by registering an
//! [`AdminListener`]. All calls are synchronous and made on the caller's thread.

use crate::cache::AdminCache;
use crate::types::{AdminId, CachePart, FlagBits, OverrideKind};

/// Tracks which connected session is bound to which admin.
pub trait SessionTracker: Send {
    /// `id` no longer refers to a live admin.
    fn clear_admin_id(&mut self, id: AdminId);

    /// Every admin is about to be dropped.
    fn clear_all_admins(&mut self);

    /// Admins were rebuilt; re-resolve every session's admin.
    fn recheck_all_admins(&mut self);
}

/// Receives command permission changes so cached per-command bits stay current.
pub trait CommandDispatcher: Send {
    /// `bits` is `None` when the override was removed.
    fn on_override_changed(&mut self, target: &str, kind: OverrideKind, bits: Option<FlagBits>);
}

/// Generic "cache rebuilt" notification fired after listener callbacks.
pub trait RebuildForward: Send {
    fn on_cache_rebuilt(&mut self, part: CachePart);
}

/// Observer notified after each rebuild pass.
///
/// The cache is handed back so the listener can repopulate it. Listeners may
/// be added or removed from inside a callback.
pub trait AdminListener: Send {
    fn on_overrides_rebuilt(&mut self, _cache: &mut AdminCache) {}

    fn on_groups_rebuilt(&mut self, _cache: &mut AdminCache) {}

    fn on_admins_rebuilt(&mut self, _cache: &mut AdminCache, _groups_also_rebuilt: bool) {}
}

/// Registration token returned by [`AdminCache::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Collaborator that ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl SessionTracker for Detached {
    fn clear_admin_id(&mut self, _id: AdminId) {}

    fn clear_all_admins(&mut self) {}

    fn recheck_all_admins(&mut self) {}
}

impl CommandDispatcher for Detached {
    fn on_override_changed(&mut self, _target: &str, _kind: OverrideKind, _bits: Option<FlagBits>) {}
}

impl RebuildForward for Detached {
    fn on_cache_rebuilt(&mut self, _part: CachePart) {}
}
