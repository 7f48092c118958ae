//! The admin cache: admins, groups, overrides and identity lookups held in
//! one context object.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use admincache::cache::AdminCache;
//! use admincache::types::{AccessMode, AdminFlag};
//!
//! let mut cache = AdminCache::new();
//! let group = cache.add_group("Moderators").unwrap();
//! cache.set_group_add_flag(group, AdminFlag::Kick, true);
//!
//! let admin = cache.create_admin(Some("alice"));
//! cache.admin_inherit_group(admin, group);
//! assert!(cache.get_admin_flag(admin, AdminFlag::Kick, AccessMode::Effective));
//! ```
//!
//! The cache is single-threaded by contract. Callers that share it between
//! threads wrap the whole value in one lock.

mod access;
mod admins;
mod auth;
mod groups;
mod overrides;
mod rebuild;

use std::collections::HashMap;

use tracing::debug;

pub use auth::{AUTHMETHOD_IP, AUTHMETHOD_NAME, AUTHMETHOD_STEAM};

use crate::listener::{
    AdminListener, CommandDispatcher, Detached, ListenerId, RebuildForward, SessionTracker,
};
use crate::store::{SlotTable, StringHandle, StringTable};
use crate::types::{AuthMethodId, CacheState, FlagBits, FlagLetters, GroupId, OverrideRule};

use auth::AuthMethod;
use overrides::OverrideIndex;

/// Initial capacity of an admin's group list. It doubles when full.
const GROUP_REFS_INITIAL_CAPACITY: usize = 2;

#[derive(Debug)]
struct AdminRecord {
    name: Option<StringHandle>,
    password: Option<StringHandle>,
    identity: Option<(AuthMethodId, StringHandle)>,
    real_flags: FlagBits,
    effective_flags: FlagBits,
    groups: Vec<GroupId>,
    immune_default: bool,
    immune_global: bool,
}

impl AdminRecord {
    fn new(name: Option<StringHandle>) -> Self {
        Self {
            name,
            password: None,
            identity: None,
            real_flags: FlagBits::NONE,
            effective_flags: FlagBits::NONE,
            groups: Vec::new(),
            immune_default: false,
            immune_global: false,
        }
    }

    fn push_group(&mut self, group: GroupId) {
        if self.groups.len() == self.groups.capacity() {
            let grow = self.groups.capacity().max(GROUP_REFS_INITIAL_CAPACITY);
            self.groups.reserve_exact(grow);
        }
        self.groups.push(group);
    }
}

#[derive(Debug)]
struct GroupRecord {
    name: StringHandle,
    add_flags: FlagBits,
    immune_default: bool,
    immune_global: bool,
    immunity: Vec<GroupId>,
    command_overrides: Option<HashMap<String, OverrideRule>>,
    command_group_overrides: Option<HashMap<String, OverrideRule>>,
}

impl GroupRecord {
    fn new(name: StringHandle) -> Self {
        Self {
            name,
            add_flags: FlagBits::NONE,
            immune_default: false,
            immune_global: false,
            immunity: Vec::new(),
            command_overrides: None,
            command_group_overrides: None,
        }
    }
}

/// In-memory admin and permission cache.
pub struct AdminCache {
    strings: StringTable,
    admins: SlotTable<AdminRecord>,
    groups: SlotTable<GroupRecord>,
    group_names: HashMap<String, GroupId>,
    auth_methods: Vec<AuthMethod>,
    overrides: OverrideIndex,
    letters: FlagLetters,
    state: CacheState,
    listeners: Vec<(ListenerId, Option<Box<dyn AdminListener>>)>,
    next_listener: u64,
    sessions: Box<dyn SessionTracker>,
    dispatcher: Box<dyn CommandDispatcher>,
    forward: Box<dyn RebuildForward>,
}

impl AdminCache {
    /// Creates an empty cache with the default auth methods registered and
    /// no collaborators attached.
    pub fn new() -> Self {
        let mut cache = Self {
            strings: StringTable::new(),
            admins: SlotTable::new(),
            groups: SlotTable::new(),
            group_names: HashMap::new(),
            auth_methods: Vec::new(),
            overrides: OverrideIndex::default(),
            letters: FlagLetters::default(),
            state: CacheState::Idle,
            listeners: Vec::new(),
            next_listener: 0,
            sessions: Box::new(Detached),
            dispatcher: Box::new(Detached),
            forward: Box::new(Detached),
        };
        for method in [AUTHMETHOD_STEAM, AUTHMETHOD_IP, AUTHMETHOD_NAME] {
            cache.register_auth_method(method);
        }
        debug!("Admin cache initialized");
        cache
    }

    #[must_use]
    pub fn with_session_tracker(mut self, tracker: impl SessionTracker + 'static) -> Self {
        self.sessions = Box::new(tracker);
        self
    }

    #[must_use]
    pub fn with_command_dispatcher(mut self, dispatcher: impl CommandDispatcher + 'static) -> Self {
        self.dispatcher = Box::new(dispatcher);
        self
    }

    #[must_use]
    pub fn with_rebuild_forward(mut self, forward: impl RebuildForward + 'static) -> Self {
        self.forward = Box::new(forward);
        self
    }

    #[must_use]
    pub fn with_flag_letters(mut self, letters: FlagLetters) -> Self {
        self.letters = letters;
        self
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn flag_letters(&self) -> &FlagLetters {
        &self.letters
    }

    /// Replaces the letter table, e.g. after the levels file was re-read.
    pub fn set_flag_letters(&mut self, letters: FlagLetters) {
        self.letters = letters;
    }

    fn resolve_str(&self, handle: StringHandle) -> Option<&str> {
        self.strings.resolve(handle)
    }

    /// Recomputes an admin's effective flags from its real flags and the
    /// add-flags of every group it still inherits.
    fn recompute_effective(&mut self, index: u32) {
        let Some(admin) = self.admins.get(index) else {
            return;
        };
        let groups = &self.groups;
        let effective = admin
            .groups
            .iter()
            .filter_map(|gid| groups.get(gid.index()))
            .fold(admin.real_flags, |bits, group| bits.union(group.add_flags));

        if let Some(admin) = self.admins.get_mut(index) {
            admin.effective_flags = effective;
        }
    }

    /// Live admins that inherit `group`.
    fn admins_in_group(&self, group: GroupId) -> Vec<u32> {
        self.admins
            .iter()
            .filter(|(_, admin)| admin.groups.contains(&group))
            .map(|(index, _)| index)
            .collect()
    }
}

impl Default for AdminCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AdminCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCache")
            .field("state", &self.state)
            .field("admins", &self.admins.len())
            .field("groups", &self.groups.len())
            .field("auth_methods", &self.auth_methods.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
