//! Host memory facade consumed by the device models.
//!
//! The devices never own guest RAM. They reach it through [`HostMemory`],
//! the single seam the embedding simulator implements. A resolved window is
//! borrowed for the duration of one call only; devices never retain a host
//! pointer across operations.
//!
//! [`FlatMemory`] is a reference implementation backed by a contiguous
//! zeroed allocation, suitable for tests and simple embedders.

use crate::addr::PhysAddr;

/// Access to simulator-backed guest physical memory.
///
/// Implemented by the embedding simulator. `addr_to_mem` is the only
/// required operation: it returns a mutable view of guest memory anchored
/// at `paddr` and running to the end of the backing region, or `None` when
/// the address is not backed by RAM.
pub trait HostMemory {
    /// Resolve a guest physical address to a mutable window of host memory.
    fn addr_to_mem(&mut self, paddr: PhysAddr) -> Option<&mut [u8]>;

    /// Resolve a window of exactly `len` bytes at `paddr`.
    ///
    /// Fails when the address is unbacked or the backing region ends before
    /// `len` bytes.
    fn window(&mut self, paddr: PhysAddr, len: usize) -> Option<&mut [u8]> {
        self.addr_to_mem(paddr).and_then(|mem| mem.get_mut(..len))
    }
}

/// Flat, contiguous guest physical memory.
///
/// Addresses `0..size` are valid; anything beyond is unbacked and resolves
/// to `None`.
pub struct FlatMemory {
    /// Backing storage.
    data: Vec<u8>,
}

impl FlatMemory {
    /// Allocate `size` bytes of zeroed guest RAM.
    pub fn new(size: usize) -> Self {
        FlatMemory {
            data: vec![0u8; size],
        }
    }

    /// Copy `src` into guest memory starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + src.len()` exceeds the memory size.
    pub fn load_at(&mut self, offset: usize, src: &[u8]) {
        let end = offset + src.len();
        assert!(
            end <= self.data.len(),
            "load_at: offset 0x{:X} + len 0x{:X} exceeds memory size 0x{:X}",
            offset,
            src.len(),
            self.data.len(),
        );
        self.data[offset..end].copy_from_slice(src);
    }

    /// Borrow the entire guest RAM as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the size of guest RAM in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl HostMemory for FlatMemory {
    fn addr_to_mem(&mut self, paddr: PhysAddr) -> Option<&mut [u8]> {
        let start = usize::try_from(paddr.as_u64()).ok()?;
        if start >= self.data.len() {
            return None;
        }
        Some(&mut self.data[start..])
    }
}
