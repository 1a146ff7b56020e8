//! Error types for the device models.
//!
//! [`DeviceError`] covers everything that can go wrong on the MMIO register
//! surface: protocol violations (bad offset, wrong width, wrong direction),
//! addressing faults against the host facade, and device-specific state
//! errors. [`FetchError`] is the separate taxonomy returned by
//! [`Pfa::fetch_page`](crate::pfa::Pfa::fetch_page), where the guest OS is
//! expected to recover from some outcomes (donate frames, drain the new-page
//! queue, raise a not-found exception) while others are fatal to the
//! faulting instruction.

use thiserror::Error;

use crate::page::PageId;

/// Errors returned from the MMIO load/store surface of either device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Access to an offset with no register behind it.
    #[error("access to unmapped register offset {0:#x}")]
    UnmappedOffset(u64),
    /// Access width does not match the register's required width.
    #[error("{len}-byte access at offset {offset:#x} (register is {expected} bytes)")]
    AccessWidth {
        offset: u64,
        len: usize,
        expected: usize,
    },
    /// Load from a write-only register.
    #[error("load from write-only register at offset {0:#x}")]
    WriteOnly(u64),
    /// Store to a read-only register.
    #[error("store to read-only register at offset {0:#x}")]
    ReadOnly(u64),
    /// The host facade could not resolve a guest physical address the
    /// device needed.
    #[error("guest physical address {0:#x} does not resolve to host memory")]
    BadAddress(u64),
    /// Free-frame donation while the queue already holds its maximum.
    #[error("free-frame queue is full")]
    FreeQueueFull,
    /// New-page pop while nothing is pending.
    #[error("new-page queue is empty")]
    NewQueueEmpty,
    /// Eviction submitted before the previous one was polled complete.
    #[error("an eviction is already in progress")]
    EvictBusy,
    /// Request executed with no opcode armed.
    #[error("no opcode armed")]
    OpcodeUnset,
    /// Opcode register written with a byte that names no operation.
    #[error("unknown opcode byte {0:#x}")]
    BadOpcode(u8),
    /// Word-granularity access whose `offset + size` crosses the page end.
    #[error("word access at offset {offset} with size {size} crosses the page end")]
    OutOfPage { offset: usize, size: usize },
    /// Response drained while none are pending.
    #[error("no responses pending")]
    NoResponse,
}

/// Convenience result alias for device operations.
pub type Result<T> = core::result::Result<T, DeviceError>;

/// Outcomes of a page fetch, returned by
/// [`Pfa::fetch_page`](crate::pfa::Pfa::fetch_page).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No donated frame is available to hold the page.
    #[error("no free frame available")]
    NoFreeFrame,
    /// The new-page notification queue is full; the guest must drain it.
    #[error("new-page queue is full")]
    NewQueueFull,
    /// The requested page id is not present in remote memory.
    #[error("page {0} is not in remote memory")]
    PageNotFound(PageId),
    /// The guest is fetching a page whose eviction it has not yet polled
    /// complete.
    #[error("page {0} has an eviction in progress")]
    EvictPending(PageId),
    /// The allocated frame's physical address did not resolve to host
    /// memory.
    #[error("frame paddr {0:#x} does not resolve to host memory")]
    BadAddress(u64),
}

impl FetchError {
    /// Returns `true` for outcomes the guest OS is expected to handle by
    /// donating frames, draining the new-page queue, or raising a
    /// page-not-found exception. The remaining outcomes are fatal to the
    /// faulting instruction.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FetchError::NoFreeFrame | FetchError::NewQueueFull | FetchError::PageNotFound(_)
        )
    }
}
