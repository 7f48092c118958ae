use super::arena::{Arena, ArenaHandle};

/// Handle to an interned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringHandle(ArenaHandle);

/// Append-only string pool backed by an [`Arena`].
///
/// Strings are not deduplicated; every `intern` call stores a fresh copy.
#[derive(Debug, Default)]
pub struct StringTable {
    arena: Arena,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, value: &str) -> StringHandle {
        StringHandle(self.arena.allocate_from(value.as_bytes()))
    }

    pub fn resolve(&self, handle: StringHandle) -> Option<&str> {
        self.arena
            .resolve(handle.0)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    pub fn reset(&mut self) {
        self.arena.reset();
    }

    pub fn bytes_used(&self) -> usize {
        self.arena.used()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_resolve() {
        let mut strings = StringTable::new();
        let steam = strings.intern("STEAM_0:1:16");
        let name = strings.intern("Björn");
        assert_eq!(strings.resolve(steam), Some("STEAM_0:1:16"));
        assert_eq!(strings.resolve(name), Some("Björn"));
    }

    #[test]
    fn test_intern_appends() {
        let mut strings = StringTable::new();
        let first = strings.intern("admin");
        let second = strings.intern("admin");
        assert_ne!(first, second);
        assert_eq!(strings.resolve(second), Some("admin"));
    }

    #[test]
    fn test_reset_clears() {
        let mut strings = StringTable::new();
        let handle = strings.intern("gone");
        strings.reset();
        assert_eq!(strings.bytes_used(), 0);
        assert_eq!(strings.resolve(handle), None);
    }
}
