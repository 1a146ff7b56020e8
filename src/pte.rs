//! RISC-V page-table-entry layout and remote-PTE helpers.
//!
//! A *remote* PTE marks a page that has been evicted to the remote tier.
//! It is invalid to the hardware walker (`V = 0`) but carries the remote
//! marker bit plus enough information to bring the page back:
//!
//! ```text
//! bit 63                    12  11         2   1      0
//! +----------------------------+-------------+---+-----+
//! |        page id             | prot bits   | R | V=0 |
//! +----------------------------+-------------+---+-----+
//! ```
//!
//! The protection bits sit [`PFA_PROT_SHIFT`] above their native positions;
//! shifting the remote PTE right by that amount and installing a physical
//! page number yields an ordinary local PTE. The page id occupies the bits
//! where the PPN normally lives, starting at [`PFA_PAGEID_SHIFT`].

use crate::addr::PhysAddr;
use crate::page::PageId;

/// Valid bit of a local PTE.
pub const PTE_V: u64 = 1 << 0;
/// Low bit of the physical page number in a local PTE.
pub const PTE_PPN_SHIFT: u32 = 10;

/// Marker bit identifying a remote PTE (meaningful only when `V = 0`).
pub const PFA_REMOTE: u64 = 1 << 1;
/// Low bit of the page-id field in a remote PTE.
pub const PFA_PAGEID_SHIFT: u32 = 12;
/// Amount a remote PTE is right-shifted to bring its protection bits down
/// to their native positions.
pub const PFA_PROT_SHIFT: u32 = 2;

/// Returns `true` if `pte` refers to a remote page.
pub const fn is_remote(pte: u64) -> bool {
    pte & PTE_V == 0 && pte & PFA_REMOTE != 0
}

/// Extract the page id from a remote PTE.
pub const fn page_id(pte: u64) -> PageId {
    (pte >> PFA_PAGEID_SHIFT) as PageId
}

/// Build a local PTE out of a remote PTE and the frame that now holds the
/// page.
///
/// The protection bits move down to their native positions, the page id is
/// dropped, and the frame's physical page number is installed. Extract the
/// page id first if you still need it.
pub const fn make_local(remote_pte: u64, frame: PhysAddr) -> u64 {
    let pte = remote_pte >> PFA_PROT_SHIFT;
    (pte & !(!0u64 << PTE_PPN_SHIFT)) | (frame.page_number() << PTE_PPN_SHIFT)
}

/// Build a remote PTE from a page id and the low PTE bits (valid bit and
/// protection) the page should come back with.
///
/// This is the guest-kernel side of the encoding; the crate provides it so
/// drivers and tests construct remote PTEs the same way the device decodes
/// them.
pub const fn make_remote(pgid: PageId, prot: u64) -> u64 {
    ((pgid as u64) << PFA_PAGEID_SHIFT) | (prot << PFA_PROT_SHIFT) | PFA_REMOTE
}
