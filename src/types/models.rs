use serde::{Deserialize, Serialize};

use super::{AdminId, FlagBits, GroupId};

/// Which flag set an admin flag query or write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Real,
    Effective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImmunityKind {
    Default,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideKind {
    Command,
    CommandGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideRule {
    Allow,
    Deny,
}

/// Cache partition named in a rebuild request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePart {
    Overrides,
    Groups,
    Admins,
}

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    #[default]
    Idle,
    InvalidatingAdmins,
    Destroying,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdentityBinding {
    pub method: String,
    pub identity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSummary {
    pub id: AdminId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub flags: FlagBits,
    pub effective_flags: FlagBits,
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityBinding>,
    pub has_password: bool,
    pub immune_default: bool,
    pub immune_global: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub add_flags: FlagBits,
    pub immune_default: bool,
    pub immune_global: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub immune_from: Vec<String>,
    pub command_overrides: usize,
}
