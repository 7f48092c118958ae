use std::collections::HashMap;

use tracing::debug;

use super::AdminCache;
use crate::store::StringHandle;
use crate::types::{AdminId, AuthMethodId};

pub const AUTHMETHOD_STEAM: &str = "steam";
pub const AUTHMETHOD_IP: &str = "ip";
pub const AUTHMETHOD_NAME: &str = "name";

/// A registered identity kind and its identity → admin index.
#[derive(Debug)]
pub(super) struct AuthMethod {
    pub(super) name: String,
    pub(super) identities: HashMap<String, AdminId>,
}

impl AdminCache {
    /// Registers a new identity kind. Returns false if the name is taken.
    pub fn register_auth_method(&mut self, name: &str) -> bool {
        if self.find_auth_method(name).is_some() {
            return false;
        }
        self.auth_methods.push(AuthMethod {
            name: name.to_string(),
            identities: HashMap::new(),
        });
        debug!("Registered auth method {}", name);
        true
    }

    pub fn find_auth_method(&self, name: &str) -> Option<AuthMethodId> {
        self.auth_methods
            .iter()
            .position(|method| method.name == name)
            .map(|index| AuthMethodId::new(index as u32))
    }

    pub fn auth_method_name(&self, method: AuthMethodId) -> Option<&str> {
        self.auth_methods
            .get(method.index() as usize)
            .map(|method| method.name.as_str())
    }

    /// Binds `identity` under `auth_method` to `id`.
    ///
    /// Fails if the method is unknown, the admin is not live, or the identity
    /// already belongs to another admin. A previous binding of `id` is dropped.
    pub fn bind_admin_identity(&mut self, id: AdminId, auth_method: &str, identity: &str) -> bool {
        let Some(method) = self.find_auth_method(auth_method) else {
            return false;
        };
        if !self.admins.is_live(id.index()) {
            return false;
        }

        let table = &self.auth_methods[method.index() as usize].identities;
        match table.get(identity) {
            Some(owner) if *owner == id => return true,
            Some(_) => return false,
            None => {}
        }

        self.unbind_identity(id);

        let handle = self.strings.intern(identity);
        if let Some(admin) = self.admins.get_mut(id.index()) {
            admin.identity = Some((method, handle));
        }
        self.auth_methods[method.index() as usize]
            .identities
            .insert(identity.to_string(), id);

        debug!("Bound admin {} to {}:{}", id, auth_method, identity);
        true
    }

    pub fn find_admin_by_identity(&self, auth_method: &str, identity: &str) -> Option<AdminId> {
        let method = self.find_auth_method(auth_method)?;
        self.auth_methods[method.index() as usize]
            .identities
            .get(identity)
            .copied()
    }

    /// Returns the admin's bound `(auth method, identity)` pair.
    pub fn get_admin_identity(&self, id: AdminId) -> Option<(&str, &str)> {
        let (method, handle) = self.admins.get(id.index())?.identity?;
        Some((self.auth_method_name(method)?, self.resolve_str(handle)?))
    }

    /// Removes the admin's current binding from its method's index.
    pub(super) fn unbind_identity(&mut self, id: AdminId) {
        let Some(admin) = self.admins.get_mut(id.index()) else {
            return;
        };
        if let Some(binding) = admin.identity.take() {
            self.remove_identity_entry(binding);
        }
    }

    pub(super) fn remove_identity_entry(&mut self, (method, handle): (AuthMethodId, StringHandle)) {
        let Some(identity) = self.strings.resolve(handle) else {
            return;
        };
        if let Some(method) = self.auth_methods.get_mut(method.index() as usize) {
            method.identities.remove(identity);
        }
    }

    /// Empties every method's identity index.
    pub(super) fn clear_identities(&mut self) {
        for method in &mut self.auth_methods {
            method.identities.clear();
        }
    }
}
