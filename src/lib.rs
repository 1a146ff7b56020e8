//! librmem — disaggregated-memory device models for a RISC-V functional
//! simulator.
//!
//! Provides two synchronous MMIO device models that let a simulated guest
//! kernel page out to, and demand-fault back in from, a remote memory tier:
//!
//! - **[`Pfa`]** — the Page-Fault Accelerator. Holds a pool of guest-donated
//!   free frames, a remote page store keyed by page id, and a new-page
//!   notification queue. The simulator's MMU fault path calls
//!   [`Pfa::fetch_page`] to pull an evicted page back into a local frame and
//!   rewrite the faulting PTE from remote to local form.
//! - **[`MemBlade`]** — the memory blade. An opcode-driven register file
//!   servicing page- and word-granularity operations (reads, writes, atomic
//!   add, compare-and-swap) against a remote page store keyed by page number.
//!
//! # Architecture
//!
//! The crate is organized into these layers:
//! - **Addresses** (`addr.rs`) — typed guest physical/virtual addresses
//! - **Host facade** (`host.rs`) — the [`HostMemory`] seam through which
//!   devices reach simulator-backed guest physical memory
//! - **MMIO** (`mmio.rs`) — the [`MmioDevice`] load/store entry points
//! - **Page store** (`page.rs`) — owned 4 KiB buffers keyed by page id
//! - **PTE helpers** (`pte.rs`) — remote-PTE encoding and the local rewrite
//! - **Devices** (`pfa.rs`, `memblade.rs`) — the two register files
//!
//! Both devices are pure request/response: every operation runs to
//! completion inside the simulator step that issued it. There is no
//! background work and no interrupt. Diagnostics are emitted through the
//! [`log`] facade; the embedding simulator installs whatever logger it
//! wants.

pub mod addr;
pub mod error;
pub mod host;
pub mod memblade;
pub mod mmio;
pub mod page;
pub mod pfa;
pub mod pte;

// ── Public re-exports ──

pub use addr::{PhysAddr, VirtAddr};
pub use error::{DeviceError, FetchError, Result};
pub use host::{FlatMemory, HostMemory};
pub use memblade::{MemBlade, Opcode};
pub use mmio::MmioDevice;
pub use page::{PageId, RemoteStore, PAGE_SIZE};
pub use pfa::Pfa;
