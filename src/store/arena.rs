//! Growable block store addressed by integer handles.
//!
//! Each block is stored behind a little-endian `u32` length header inside a
//! single byte buffer. Handles are offsets of that header, so they stay valid
//! across growth; slices borrowed from the arena do not survive the next
//! allocation.

const HEADER_LEN: usize = 4;

/// Offset of a block inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaHandle(u32);

impl ArenaHandle {
    pub const fn offset(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Arena {
    data: Vec<u8>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a zeroed block of `size` bytes.
    ///
    /// # Panics
    ///
    /// Panics if the block would end past the 4 GiB addressable by a handle.
    pub fn allocate(&mut self, size: usize) -> (ArenaHandle, &mut [u8]) {
        let offset = self.data.len();
        let Some((handle, len)) = block_header(offset, size) else {
            panic!("arena overflow: {size} byte block at offset {offset} exceeds u32 addressing");
        };
        self.data.extend_from_slice(&len.to_le_bytes());
        self.data.resize(offset + HEADER_LEN + size, 0);

        let block = &mut self.data[offset + HEADER_LEN..];
        (handle, block)
    }

    /// Appends a block holding a copy of `bytes`.
    pub fn allocate_from(&mut self, bytes: &[u8]) -> ArenaHandle {
        let (handle, block) = self.allocate(bytes.len());
        block.copy_from_slice(bytes);
        handle
    }

    pub fn resolve(&self, handle: ArenaHandle) -> Option<&[u8]> {
        let (start, end) = self.bounds(handle)?;
        Some(&self.data[start..end])
    }

    pub fn resolve_mut(&mut self, handle: ArenaHandle) -> Option<&mut [u8]> {
        let (start, end) = self.bounds(handle)?;
        Some(&mut self.data[start..end])
    }

    /// Discards every block. Handles issued before the reset must not be reused.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Bytes in use, headers included.
    pub fn used(&self) -> usize {
        self.data.len()
    }

    fn bounds(&self, handle: ArenaHandle) -> Option<(usize, usize)> {
        let offset = handle.0 as usize;
        let header = self.data.get(offset..offset + HEADER_LEN)?;
        let len = u32::from_le_bytes(header.try_into().ok()?) as usize;
        let start = offset + HEADER_LEN;
        let end = start.checked_add(len)?;
        (end <= self.data.len()).then_some((start, end))
    }
}

/// Handle and length header for a block of `size` bytes at `offset`, or
/// `None` when the block end does not fit in a `u32`.
fn block_header(offset: usize, size: usize) -> Option<(ArenaHandle, u32)> {
    let end = offset.checked_add(HEADER_LEN)?.checked_add(size)?;
    u32::try_from(end).ok()?;
    Some((ArenaHandle(u32::try_from(offset).ok()?), u32::try_from(size).ok()?))
}
