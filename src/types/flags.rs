use std::fmt;

use serde::{Deserialize, Serialize};

/// A single admin capability.
///
/// The discriminant is the bit index inside [`FlagBits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminFlag {
    Reservation = 0,
    Generic,
    Kick,
    Ban,
    Unban,
    Slay,
    Changemap,
    Cvars,
    Config,
    Chat,
    Vote,
    Password,
    Rcon,
    Cheats,
    Root,
    Custom1,
    Custom2,
    Custom3,
    Custom4,
    Custom5,
    Custom6,
}

/// Number of defined capabilities.
pub const ADMIN_FLAG_COUNT: usize = 21;

impl AdminFlag {
    pub const ALL: [AdminFlag; ADMIN_FLAG_COUNT] = [
        AdminFlag::Reservation,
        AdminFlag::Generic,
        AdminFlag::Kick,
        AdminFlag::Ban,
        AdminFlag::Unban,
        AdminFlag::Slay,
        AdminFlag::Changemap,
        AdminFlag::Cvars,
        AdminFlag::Config,
        AdminFlag::Chat,
        AdminFlag::Vote,
        AdminFlag::Password,
        AdminFlag::Rcon,
        AdminFlag::Cheats,
        AdminFlag::Root,
        AdminFlag::Custom1,
        AdminFlag::Custom2,
        AdminFlag::Custom3,
        AdminFlag::Custom4,
        AdminFlag::Custom5,
        AdminFlag::Custom6,
    ];

    /// Returns the flag at bit index `index`, or `None` if out of range.
    pub fn from_index(index: usize) -> Option<AdminFlag> {
        Self::ALL.get(index).copied()
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn bit(self) -> FlagBits {
        FlagBits(1 << self as u32)
    }

    /// Name used for this capability in the levels file.
    pub const fn name(self) -> &'static str {
        match self {
            AdminFlag::Reservation => "reservation",
            AdminFlag::Generic => "generic",
            AdminFlag::Kick => "kick",
            AdminFlag::Ban => "ban",
            AdminFlag::Unban => "unban",
            AdminFlag::Slay => "slay",
            AdminFlag::Changemap => "changemap",
            AdminFlag::Cvars => "cvars",
            AdminFlag::Config => "config",
            AdminFlag::Chat => "chat",
            AdminFlag::Vote => "vote",
            AdminFlag::Password => "password",
            AdminFlag::Rcon => "rcon",
            AdminFlag::Cheats => "cheats",
            AdminFlag::Root => "root",
            AdminFlag::Custom1 => "custom1",
            AdminFlag::Custom2 => "custom2",
            AdminFlag::Custom3 => "custom3",
            AdminFlag::Custom4 => "custom4",
            AdminFlag::Custom5 => "custom5",
            AdminFlag::Custom6 => "custom6",
        }
    }

    /// Looks up a capability by its levels-file name. Case-insensitive.
    pub fn from_name(name: &str) -> Option<AdminFlag> {
        Self::ALL
            .iter()
            .copied()
            .find(|flag| flag.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for AdminFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// FlagBits is a bitmask of admin capabilities, one bit per [`AdminFlag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub struct FlagBits(u32);

impl FlagBits {
    pub const NONE: FlagBits = FlagBits(0);
    pub const ALL: FlagBits = FlagBits((1 << ADMIN_FLAG_COUNT as u32) - 1);
    pub const ROOT: FlagBits = AdminFlag::Root.bit();

    /// Bits outside the capability range are dropped.
    pub const fn new(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every bit of `required` is set.
    #[must_use]
    pub const fn has(self, required: FlagBits) -> bool {
        self.0 & required.0 == required.0
    }

    #[must_use]
    pub const fn contains_flag(self, flag: AdminFlag) -> bool {
        self.has(flag.bit())
    }

    #[must_use]
    pub const fn union(self, other: FlagBits) -> FlagBits {
        FlagBits(self.0 | other.0)
    }

    #[must_use]
    pub const fn difference(self, other: FlagBits) -> FlagBits {
        FlagBits(self.0 & !other.0)
    }

    #[must_use]
    pub const fn with(self, flag: AdminFlag) -> FlagBits {
        self.union(flag.bit())
    }

    #[must_use]
    pub const fn without(self, flag: AdminFlag) -> FlagBits {
        self.difference(flag.bit())
    }

    /// Iterates the set capabilities in bit order.
    pub fn iter(self) -> impl Iterator<Item = AdminFlag> {
        AdminFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains_flag(*flag))
    }

    /// Returns the capability names for this bitmask.
    #[must_use]
    pub fn to_strings(self) -> Vec<&'static str> {
        self.iter().map(AdminFlag::name).collect()
    }
}

impl fmt::Display for FlagBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_strings().join(", "))
    }
}

impl From<AdminFlag> for FlagBits {
    fn from(flag: AdminFlag) -> Self {
        flag.bit()
    }
}

impl From<u32> for FlagBits {
    fn from(bits: u32) -> Self {
        Self::new(bits)
    }
}

impl From<FlagBits> for u32 {
    fn from(bits: FlagBits) -> Self {
        bits.0
    }
}

impl FromIterator<AdminFlag> for FlagBits {
    fn from_iter<I: IntoIterator<Item = AdminFlag>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FlagBits::NONE, |bits, flag| bits.with(flag))
    }
}

/// Combines a list of capabilities into a bitmask.
pub fn array_to_bits(flags: &[AdminFlag]) -> FlagBits {
    flags.iter().copied().collect()
}

/// Expands a bitmask into the list of capabilities it holds.
pub fn bits_to_array(bits: FlagBits) -> Vec<AdminFlag> {
    bits.iter().collect()
}

/// Expands a bitmask into a per-capability boolean array.
pub fn bits_to_bit_array(bits: FlagBits) -> [bool; ADMIN_FLAG_COUNT] {
    let mut array = [false; ADMIN_FLAG_COUNT];
    for flag in bits.iter() {
        array[flag.index()] = true;
    }
    array
}

pub fn bit_array_to_bits(array: &[bool; ADMIN_FLAG_COUNT]) -> FlagBits {
    array
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .filter_map(|(index, _)| AdminFlag::from_index(index))
        .collect()
}
