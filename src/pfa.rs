//! Page-Fault Accelerator (PFA) device model.
//!
//! The PFA lets a guest kernel page out to remote memory and fault pages
//! back in without taking a software page fault on the access path. The
//! guest donates free frames and polls notifications through a small MMIO
//! register window; the simulator's MMU calls [`Pfa::fetch_page`] when a
//! load or store touches a remote PTE.
//!
//! # Register window
//!
//! Every access is exactly one 8-byte machine word; any other length fails.
//!
//! | Offset | Name      | Load                        | Store            |
//! |--------|-----------|-----------------------------|------------------|
//! | 0      | FREEFRAME | —                           | donate frame     |
//! | 8      | FREESTAT  | free-queue spare capacity   | —                |
//! | 16     | EVICTPAGE | —                           | submit eviction  |
//! | 24     | EVICTSTAT | evict-queue spare capacity  | —                |
//! | 32     | NEWPGID   | pop fetched page id         | —                |
//! | 40     | NEWVADDR  | pop fetched vaddr           | —                |
//! | 48     | NEWSTAT   | pending new-page count      | —                |
//!
//! # Eviction
//!
//! A single 8-byte store to `EVICTPAGE` carries the whole operation, packing
//! the victim frame and the target page id into one word:
//!
//! ```text
//! bit 63                         36 35                  0
//! +----------------------------------+--------------------+
//! |            pgid (28 bits)        |  paddr field       |
//! +----------------------------------+--------------------+
//! ```
//!
//! The device copies the frame into its remote store and reports completion
//! on the next `EVICTSTAT` poll (the store itself completes synchronously;
//! the one-poll delay exercises the guest driver's completion path).

use std::collections::VecDeque;

use log::{debug, warn};

use crate::addr::{PhysAddr, VirtAddr};
use crate::error::{DeviceError, FetchError, Result};
use crate::host::HostMemory;
use crate::mmio::MmioDevice;
use crate::page::{zeroed_page, PageId, RemoteStore, PAGE_SIZE};
use crate::pte;

// ── Register offsets ──

/// Store: donate a free frame.
pub const PFA_FREEFRAME: u64 = 0;
/// Load: remaining free-queue capacity.
pub const PFA_FREESTAT: u64 = 8;
/// Store: submit an eviction.
pub const PFA_EVICTPAGE: u64 = 16;
/// Load: remaining evict-queue capacity (completion poll).
pub const PFA_EVICTSTAT: u64 = 24;
/// Load: pop the page id of the next fetched page.
pub const PFA_NEWPGID: u64 = 32;
/// Load: pop the faulting vaddr of the next fetched page.
pub const PFA_NEWVADDR: u64 = 40;
/// Load: number of fetched pages waiting to be observed.
pub const PFA_NEWSTAT: u64 = 48;

// ── Sizing ──

/// Capacity of the free-frame queue.
pub const PFA_FREE_MAX: usize = 64;
/// Capacity of the new-page queue.
pub const PFA_NEW_MAX: usize = PFA_FREE_MAX;
/// Depth of the eviction queue. Only one eviction can be outstanding.
pub const PFA_EVICT_MAX: u64 = 1;

/// Width of every PFA register access.
const REG_WIDTH: usize = 8;

/// Eviction progress.
///
/// `InProgress` is entered by a successful `EVICTPAGE` store and cleared by
/// the next `EVICTSTAT` load, so the guest observes exactly one busy poll
/// per eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum EvictState {
    #[default]
    Idle,
    InProgress {
        pgid: PageId,
    },
}

/// The Page-Fault Accelerator.
///
/// All state is empty at construction; the guest kernel populates the
/// free-frame pool before the first fetch can succeed.
#[derive(Debug, Default)]
pub struct Pfa {
    /// Guest-donated 4 KiB frames, consumed in FIFO order by fetches.
    free_frames: VecDeque<PhysAddr>,
    /// Page ids of fetched pages, awaiting guest observation.
    new_pgids: VecDeque<PageId>,
    /// Faulting vaddrs of fetched pages, parallel to `new_pgids`.
    new_vaddrs: VecDeque<VirtAddr>,
    /// Pages currently held by the remote tier.
    remote: RemoteStore<PageId>,
    evict: EvictState,
}

impl Pfa {
    /// Create a PFA with empty queues and an empty remote store.
    pub fn new() -> Self {
        Pfa::default()
    }

    /// Fetch the remote page behind a faulting access.
    ///
    /// Called from the MMU fault path when a load or store touches a PTE
    /// that is remote ([`pte::is_remote`]). On success the page's data has
    /// been copied into a donated frame, `pte` has been rewritten in place
    /// to its local form, and the page id and `vaddr` are queued for the
    /// guest to observe through `NEWPGID`/`NEWVADDR`.
    ///
    /// The recoverable outcomes ([`FetchError::is_recoverable`]) leave all
    /// device state untouched.
    pub fn fetch_page(
        &mut self,
        host: &mut dyn HostMemory,
        vaddr: VirtAddr,
        pte: &mut u64,
    ) -> core::result::Result<(), FetchError> {
        let vaddr = vaddr.page_align_down();

        // Feasibility checks before any state is touched.
        if self.free_frames.is_empty() {
            debug!("no free frame for vaddr {:#x}", vaddr.as_u64());
            return Err(FetchError::NoFreeFrame);
        }
        if self.new_pgids.len() == PFA_NEW_MAX {
            debug!("new-page queue full for vaddr {:#x}", vaddr.as_u64());
            return Err(FetchError::NewQueueFull);
        }

        let pgid = pte::page_id(*pte);
        if self.evict == (EvictState::InProgress { pgid }) {
            warn!("fetch of page {} with its eviction still pending", pgid);
            return Err(FetchError::EvictPending(pgid));
        }
        if !self.remote.contains(pgid) {
            warn!(
                "page {} (vaddr {:#x}) not in remote memory",
                pgid,
                vaddr.as_u64()
            );
            return Err(FetchError::PageNotFound(pgid));
        }

        let paddr = match self.free_frames.pop_front() {
            Some(frame) => frame,
            None => return Err(FetchError::NoFreeFrame),
        };
        self.new_pgids.push_back(pgid);
        self.new_vaddrs.push_back(vaddr);

        *pte = pte::make_local(*pte, paddr);
        debug!(
            "fetching vaddr {:#x} into paddr {:#x}, page {}, pte={:#x}",
            vaddr.as_u64(),
            paddr.as_u64(),
            pgid,
            pte
        );

        let frame = match host.window(paddr, PAGE_SIZE) {
            Some(frame) => frame,
            None => {
                warn!("bad physical address {:#x}", paddr.as_u64());
                return Err(FetchError::BadAddress(paddr.as_u64()));
            }
        };
        match self.remote.get(pgid) {
            Some(page) => frame.copy_from_slice(page),
            None => return Err(FetchError::PageNotFound(pgid)),
        }
        self.remote.remove(pgid);

        Ok(())
    }

    /// Number of pages currently held in the remote store. Exposed for the
    /// embedding simulator's statistics.
    pub fn remote_page_count(&self) -> usize {
        self.remote.len()
    }

    // ── Register handlers ──

    /// `FREEFRAME` store: enqueue a donated frame.
    ///
    /// A paddr the host cannot resolve is rejected and not enqueued.
    fn free_frame(&mut self, host: &mut dyn HostMemory, paddr: PhysAddr) -> Result<()> {
        if self.free_frames.len() >= PFA_FREE_MAX {
            warn!("free-frame donation to a full queue");
            return Err(DeviceError::FreeQueueFull);
        }
        if host.addr_to_mem(paddr).is_none() {
            warn!("invalid paddr {:#x} for free frame", paddr.as_u64());
            return Err(DeviceError::BadAddress(paddr.as_u64()));
        }
        debug!("adding paddr {:#x} to the free-frame pool", paddr.as_u64());
        self.free_frames.push_back(paddr);
        Ok(())
    }

    /// `FREESTAT` load: remaining free-queue capacity.
    fn free_check_size(&self) -> u64 {
        (PFA_FREE_MAX - self.free_frames.len()) as u64
    }

    /// `EVICTPAGE` store: evict a frame into the remote store.
    fn evict_page(&mut self, host: &mut dyn HostMemory, word: u64) -> Result<()> {
        if self.evict != EvictState::Idle {
            warn!("eviction submitted while another is in progress");
            return Err(DeviceError::EvictBusy);
        }

        // See the module docs for the packed word format.
        let paddr = PhysAddr::new((word << 28) >> 16);
        let pgid = (word >> 36) as PageId;

        let frame = match host.window(paddr, PAGE_SIZE) {
            Some(frame) => frame,
            None => {
                warn!("invalid paddr {:#x} for evicted page", paddr.as_u64());
                return Err(DeviceError::BadAddress(paddr.as_u64()));
            }
        };
        let mut page = zeroed_page();
        page.copy_from_slice(frame);
        self.remote.insert(pgid, page);

        debug!(
            "evicting page at paddr {:#x} (pgid {})",
            paddr.as_u64(),
            pgid
        );
        self.evict = EvictState::InProgress { pgid };
        Ok(())
    }

    /// `EVICTSTAT` load: remaining evict-queue capacity.
    ///
    /// A pending eviction is reported busy exactly once, then completes.
    fn evict_check_size(&mut self) -> u64 {
        match self.evict {
            EvictState::InProgress { .. } => {
                self.evict = EvictState::Idle;
                PFA_EVICT_MAX - 1
            }
            EvictState::Idle => PFA_EVICT_MAX,
        }
    }

    /// `NEWPGID` load: pop the next fetched page id.
    fn pop_new_pgid(&mut self) -> Result<u64> {
        match self.new_pgids.pop_front() {
            Some(pgid) => {
                debug!("reporting new page id {}", pgid);
                Ok(pgid as u64)
            }
            None => Err(DeviceError::NewQueueEmpty),
        }
    }

    /// `NEWVADDR` load: pop the next fetched vaddr.
    fn pop_new_vaddr(&mut self) -> Result<u64> {
        match self.new_vaddrs.pop_front() {
            Some(vaddr) => {
                debug!("reporting new page vaddr {:#x}", vaddr.as_u64());
                Ok(vaddr.as_u64())
            }
            None => Err(DeviceError::NewQueueEmpty),
        }
    }

    /// `NEWSTAT` load: number of pending new pages.
    fn check_newpage(&self) -> u64 {
        self.new_pgids.len() as u64
    }
}

impl MmioDevice for Pfa {
    fn load(&mut self, _host: &mut dyn HostMemory, offset: u64, out: &mut [u8]) -> Result<()> {
        if out.len() != REG_WIDTH {
            warn!("{}-byte load at offset {:#x}", out.len(), offset);
            return Err(DeviceError::AccessWidth {
                offset,
                len: out.len(),
                expected: REG_WIDTH,
            });
        }

        let val = match offset {
            PFA_FREESTAT => self.free_check_size(),
            PFA_EVICTSTAT => self.evict_check_size(),
            PFA_NEWPGID => self.pop_new_pgid()?,
            PFA_NEWVADDR => self.pop_new_vaddr()?,
            PFA_NEWSTAT => self.check_newpage(),
            PFA_FREEFRAME | PFA_EVICTPAGE => {
                warn!("load from write-only register at offset {:#x}", offset);
                return Err(DeviceError::WriteOnly(offset));
            }
            _ => {
                warn!("unrecognized load at offset {:#x}", offset);
                return Err(DeviceError::UnmappedOffset(offset));
            }
        };
        out.copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    fn store(&mut self, host: &mut dyn HostMemory, offset: u64, data: &[u8]) -> Result<()> {
        let word = match <[u8; REG_WIDTH]>::try_from(data) {
            Ok(bytes) => u64::from_le_bytes(bytes),
            Err(_) => {
                warn!("{}-byte store at offset {:#x}", data.len(), offset);
                return Err(DeviceError::AccessWidth {
                    offset,
                    len: data.len(),
                    expected: REG_WIDTH,
                });
            }
        };

        match offset {
            PFA_FREEFRAME => self.free_frame(host, PhysAddr::new(word)),
            PFA_EVICTPAGE => self.evict_page(host, word),
            PFA_FREESTAT | PFA_EVICTSTAT | PFA_NEWPGID | PFA_NEWVADDR | PFA_NEWSTAT => {
                warn!("store to read-only register at offset {:#x}", offset);
                Err(DeviceError::ReadOnly(offset))
            }
            _ => {
                warn!("unrecognized store at offset {:#x}", offset);
                Err(DeviceError::UnmappedOffset(offset))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::FlatMemory;
    use crate::pte::PTE_V;

    const MEM_SIZE: usize = 256 * 1024;

    fn setup() -> (Pfa, FlatMemory) {
        (Pfa::new(), FlatMemory::new(MEM_SIZE))
    }

    fn load_word(pfa: &mut Pfa, mem: &mut FlatMemory, offset: u64) -> Result<u64> {
        let mut out = [0u8; 8];
        pfa.load(mem, offset, &mut out)?;
        Ok(u64::from_le_bytes(out))
    }

    fn store_word(pfa: &mut Pfa, mem: &mut FlatMemory, offset: u64, val: u64) -> Result<()> {
        pfa.store(mem, offset, &val.to_le_bytes())
    }

    fn donate(pfa: &mut Pfa, mem: &mut FlatMemory, paddr: u64) {
        store_word(pfa, mem, PFA_FREEFRAME, paddr).unwrap();
    }

    /// Pack an eviction word from a page id and victim paddr.
    fn evict_word(pgid: PageId, paddr: u64) -> u64 {
        ((pgid as u64) << 36) | (paddr >> 12)
    }

    fn preload_remote(pfa: &mut Pfa, pgid: PageId, fill: u8) {
        let mut page = zeroed_page();
        page.fill(fill);
        pfa.remote.insert(pgid, page);
    }

    #[test]
    fn fetch_hit() {
        let (mut pfa, mut mem) = setup();
        preload_remote(&mut pfa, 7, 0xAA);
        donate(&mut pfa, &mut mem, 0x1000);

        let mut pte = pte::make_remote(7, PTE_V | 0xE);
        pfa.fetch_page(&mut mem, VirtAddr::new(0x2000), &mut pte)
            .unwrap();

        assert!(mem.as_slice()[0x1000..0x2000].iter().all(|&b| b == 0xAA));
        assert!(!pte::is_remote(pte));
        assert_eq!(pte >> pte::PTE_PPN_SHIFT, 0x1);
        assert_eq!(pfa.remote_page_count(), 0);

        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWSTAT).unwrap(), 1);
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWPGID).unwrap(), 7);
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWVADDR).unwrap(), 0x2000);
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWSTAT).unwrap(), 0);
    }

    #[test]
    fn fetch_miss_leaves_state_alone() {
        let (mut pfa, mut mem) = setup();
        donate(&mut pfa, &mut mem, 0x1000);

        let remote_pte = pte::make_remote(9, PTE_V);
        let mut pte = remote_pte;
        assert_eq!(
            pfa.fetch_page(&mut mem, VirtAddr::new(0x5000), &mut pte),
            Err(FetchError::PageNotFound(9))
        );
        assert!(FetchError::PageNotFound(9).is_recoverable());
        assert_eq!(pte, remote_pte);
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_FREESTAT).unwrap(),
            (PFA_FREE_MAX - 1) as u64
        );
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWSTAT).unwrap(), 0);
    }

    #[test]
    fn fetch_without_free_frame() {
        let (mut pfa, mut mem) = setup();
        preload_remote(&mut pfa, 3, 0x11);

        let mut pte = pte::make_remote(3, PTE_V);
        assert_eq!(
            pfa.fetch_page(&mut mem, VirtAddr::new(0x3000), &mut pte),
            Err(FetchError::NoFreeFrame)
        );
        assert_eq!(pfa.remote_page_count(), 1);
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWSTAT).unwrap(), 0);
    }

    #[test]
    fn fetch_with_full_new_queue() {
        let (mut pfa, mut mem) = setup();
        preload_remote(&mut pfa, 1, 0x22);
        donate(&mut pfa, &mut mem, 0x1000);
        for i in 0..PFA_NEW_MAX {
            pfa.new_pgids.push_back(i as PageId + 100);
            pfa.new_vaddrs.push_back(VirtAddr::new(0x10_0000 + (i as u64) * 4096));
        }

        let mut pte = pte::make_remote(1, PTE_V);
        assert_eq!(
            pfa.fetch_page(&mut mem, VirtAddr::new(0x3000), &mut pte),
            Err(FetchError::NewQueueFull)
        );
        assert_eq!(pfa.remote_page_count(), 1);
    }

    #[test]
    fn fetch_masks_vaddr_to_page_boundary() {
        let (mut pfa, mut mem) = setup();
        preload_remote(&mut pfa, 5, 0x5A);
        donate(&mut pfa, &mut mem, 0x4000);

        let mut pte = pte::make_remote(5, PTE_V);
        pfa.fetch_page(&mut mem, VirtAddr::new(0x2ABC), &mut pte)
            .unwrap();
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWPGID).unwrap(), 5);
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_NEWVADDR).unwrap(), 0x2000);
    }

    #[test]
    fn evict_then_refetch() {
        let (mut pfa, mut mem) = setup();
        mem.load_at(0x3000, &[0x5A; PAGE_SIZE]);

        store_word(&mut pfa, &mut mem, PFA_EVICTPAGE, evict_word(42, 0x3000)).unwrap();
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_EVICTSTAT).unwrap(),
            PFA_EVICT_MAX - 1
        );
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_EVICTSTAT).unwrap(),
            PFA_EVICT_MAX
        );

        donate(&mut pfa, &mut mem, 0x4000);
        let mut pte = pte::make_remote(42, PTE_V | 0xE);
        pfa.fetch_page(&mut mem, VirtAddr::new(0x9000), &mut pte)
            .unwrap();
        assert!(mem.as_slice()[0x4000..0x5000].iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn evict_while_busy_fails() {
        let (mut pfa, mut mem) = setup();
        mem.load_at(0x3000, &[0x11; PAGE_SIZE]);
        mem.load_at(0x5000, &[0x22; PAGE_SIZE]);

        store_word(&mut pfa, &mut mem, PFA_EVICTPAGE, evict_word(8, 0x3000)).unwrap();
        assert_eq!(
            store_word(&mut pfa, &mut mem, PFA_EVICTPAGE, evict_word(9, 0x5000)),
            Err(DeviceError::EvictBusy)
        );

        // The first eviction is intact and completes normally.
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_EVICTSTAT).unwrap(),
            PFA_EVICT_MAX - 1
        );
        assert_eq!(pfa.remote.get(8).map(|p| p[0]), Some(0x11));
        assert!(pfa.remote.get(9).is_none());
    }

    #[test]
    fn fetch_of_page_mid_eviction_is_fatal() {
        let (mut pfa, mut mem) = setup();
        mem.load_at(0x3000, &[0x33; PAGE_SIZE]);
        donate(&mut pfa, &mut mem, 0x6000);

        store_word(&mut pfa, &mut mem, PFA_EVICTPAGE, evict_word(4, 0x3000)).unwrap();
        let mut pte = pte::make_remote(4, PTE_V);
        let err = pfa
            .fetch_page(&mut mem, VirtAddr::new(0x7000), &mut pte)
            .unwrap_err();
        assert_eq!(err, FetchError::EvictPending(4));
        assert!(!err.is_recoverable());

        // Once the eviction is polled complete the fetch goes through.
        load_word(&mut pfa, &mut mem, PFA_EVICTSTAT).unwrap();
        pfa.fetch_page(&mut mem, VirtAddr::new(0x7000), &mut pte)
            .unwrap();
        assert!(mem.as_slice()[0x6000..0x7000].iter().all(|&b| b == 0x33));
    }

    #[test]
    fn evict_replaces_existing_page() {
        let (mut pfa, mut mem) = setup();
        mem.load_at(0x3000, &[0x11; PAGE_SIZE]);
        mem.load_at(0x5000, &[0x22; PAGE_SIZE]);

        store_word(&mut pfa, &mut mem, PFA_EVICTPAGE, evict_word(6, 0x3000)).unwrap();
        load_word(&mut pfa, &mut mem, PFA_EVICTSTAT).unwrap();
        store_word(&mut pfa, &mut mem, PFA_EVICTPAGE, evict_word(6, 0x5000)).unwrap();
        load_word(&mut pfa, &mut mem, PFA_EVICTSTAT).unwrap();

        assert_eq!(pfa.remote_page_count(), 1);
        assert_eq!(pfa.remote.get(6).map(|p| p[0]), Some(0x22));
    }

    #[test]
    fn evict_with_bad_paddr_fails() {
        let (mut pfa, mut mem) = setup();
        let unbacked = mem.size() as u64 + 0x1000;
        let err = store_word(&mut pfa, &mut mem, PFA_EVICTPAGE, evict_word(2, unbacked))
            .unwrap_err();
        assert!(matches!(err, DeviceError::BadAddress(_)));
        assert_eq!(pfa.remote_page_count(), 0);
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_EVICTSTAT).unwrap(),
            PFA_EVICT_MAX
        );
    }

    #[test]
    fn free_queue_capacity() {
        let (mut pfa, mut mem) = setup();
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_FREESTAT).unwrap(),
            PFA_FREE_MAX as u64
        );
        for i in 0..PFA_FREE_MAX {
            donate(&mut pfa, &mut mem, (i as u64) * 4096);
        }
        assert_eq!(load_word(&mut pfa, &mut mem, PFA_FREESTAT).unwrap(), 0);
        assert_eq!(
            store_word(&mut pfa, &mut mem, PFA_FREEFRAME, 0x1000),
            Err(DeviceError::FreeQueueFull)
        );
    }

    #[test]
    fn unbacked_free_frame_rejected() {
        let (mut pfa, mut mem) = setup();
        let unbacked = mem.size() as u64 + 0x1000;
        let err = store_word(&mut pfa, &mut mem, PFA_FREEFRAME, unbacked).unwrap_err();
        assert!(matches!(err, DeviceError::BadAddress(_)));
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_FREESTAT).unwrap(),
            PFA_FREE_MAX as u64
        );
    }

    #[test]
    fn new_queue_pops_fail_when_empty() {
        let (mut pfa, mut mem) = setup();
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_NEWPGID),
            Err(DeviceError::NewQueueEmpty)
        );
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_NEWVADDR),
            Err(DeviceError::NewQueueEmpty)
        );
    }

    #[test]
    fn register_protocol_violations() {
        let (mut pfa, mut mem) = setup();

        // Wrong width.
        let mut half = [0u8; 4];
        assert!(matches!(
            pfa.load(&mut mem, PFA_FREESTAT, &mut half),
            Err(DeviceError::AccessWidth { expected: 8, .. })
        ));
        assert!(matches!(
            pfa.store(&mut mem, PFA_FREEFRAME, &[0u8; 4]),
            Err(DeviceError::AccessWidth { expected: 8, .. })
        ));

        // Wrong direction.
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_FREEFRAME),
            Err(DeviceError::WriteOnly(PFA_FREEFRAME))
        );
        assert_eq!(
            load_word(&mut pfa, &mut mem, PFA_EVICTPAGE),
            Err(DeviceError::WriteOnly(PFA_EVICTPAGE))
        );
        assert_eq!(
            store_word(&mut pfa, &mut mem, PFA_FREESTAT, 1),
            Err(DeviceError::ReadOnly(PFA_FREESTAT))
        );
        assert_eq!(
            store_word(&mut pfa, &mut mem, PFA_NEWSTAT, 1),
            Err(DeviceError::ReadOnly(PFA_NEWSTAT))
        );

        // Nothing mapped there.
        assert_eq!(
            load_word(&mut pfa, &mut mem, 56),
            Err(DeviceError::UnmappedOffset(56))
        );
        assert_eq!(
            store_word(&mut pfa, &mut mem, 56, 1),
            Err(DeviceError::UnmappedOffset(56))
        );
    }
}
