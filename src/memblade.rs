//! Memory-blade (MB) device model.
//!
//! The memory blade services page- and word-granularity operations against
//! a remote page store keyed by a 64-bit page number. The guest arms a
//! command by writing the argument registers and the opcode, then executes
//! it with a single load from `REQ`, which returns the transaction id. Ids
//! of completed commands are drained in order through `RESP`.
//!
//! # Register window
//!
//! | Offset | Name     | Access        | Semantics                         |
//! |--------|----------|---------------|-----------------------------------|
//! | 0x00   | SRC_ADDR | store, 8 B    | source guest physical address     |
//! | 0x08   | DST_ADDR | store, 8 B    | destination guest physical address|
//! | 0x10   | DSTMAC   | store, 8 B    | accepted, ignored                 |
//! | 0x16   | OPCODE   | store, 1 B    | arm a command                     |
//! | 0x18   | PAGENO   | store, 8 B    | remote page key                   |
//! | 0x20   | REQ      | load, 4 B     | execute; yields the transaction id|
//! | 0x24   | RESP     | load, 4 B     | drain one completed id            |
//! | 0x28   | NREQ     | load, 4 B     | always 1 (device is synchronous)  |
//! | 0x2C   | NRESP    | load, 4 B     | completed ids not yet drained     |
//!
//! # Extended header
//!
//! Word-granularity commands read their parameters from guest memory at
//! `SRC_ADDR`, up to three 64-bit little-endian words:
//!
//! - word 0 — `size = 1 << bits[1:0]` (1/2/4/8 bytes) and
//!   `offset = bits[15:4]` (byte offset into the page)
//! - word 1 — operand value (WordWrite, AtomicAdd, CompSwap)
//! - word 2 — compare value (CompSwap only)

use log::{debug, warn};

use crate::addr::PhysAddr;
use crate::error::{DeviceError, Result};
use crate::host::HostMemory;
use crate::mmio::MmioDevice;
use crate::page::{RemoteStore, PAGE_SIZE};

// ── Register offsets ──

/// Store: source guest physical address.
pub const MB_SRC_ADDR: u64 = 0x00;
/// Store: destination guest physical address.
pub const MB_DST_ADDR: u64 = 0x08;
/// Store: destination MAC; accepted and ignored (no wire output).
pub const MB_DSTMAC: u64 = 0x10;
/// Store (1 byte): arm a command.
pub const MB_OPCODE: u64 = 0x16;
/// Store: remote page key.
pub const MB_PAGENO: u64 = 0x18;
/// Load: execute the armed command, yielding its transaction id.
pub const MB_REQ: u64 = 0x20;
/// Load: drain one completed transaction id.
pub const MB_RESP: u64 = 0x24;
/// Load: outstanding-request capacity; always 1.
pub const MB_NREQ: u64 = 0x28;
/// Load: completed transaction ids not yet drained.
pub const MB_NRESP: u64 = 0x2C;
/// One past the highest mapped byte.
pub const MB_LAST: u64 = 0x2D;

/// Width of every load and of the argument stores.
const LOAD_WIDTH: usize = 4;
const STORE_WIDTH: usize = 8;

/// Commands the blade executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Opcode {
    /// Copy a whole remote page to `dst` (zeros if never written).
    PageRead,
    /// Copy a whole page from `src` into the remote store.
    PageWrite,
    /// Copy `size` bytes at `offset` of the remote page to `dst`.
    WordRead,
    /// Write the low `size` bytes of the operand at `offset`.
    WordWrite,
    /// Fetch-and-add: old value to `dst`, sum back to the page.
    AtomicAdd,
    /// Compare-and-swap: 1 or 0 to `dst` for hit or miss.
    CompSwap,
    /// No command armed; a `REQ` load fails.
    #[default]
    Unset,
}

impl Opcode {
    /// Decode the opcode register byte.
    fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            0 => Some(Opcode::PageRead),
            1 => Some(Opcode::PageWrite),
            2 => Some(Opcode::WordRead),
            3 => Some(Opcode::WordWrite),
            4 => Some(Opcode::AtomicAdd),
            5 => Some(Opcode::CompSwap),
            _ => None,
        }
    }
}

/// Parsed extended header for word-granularity commands.
#[derive(Debug, Clone, Copy)]
struct ExtHeader {
    /// Access width in bytes: 1, 2, 4, or 8.
    size: usize,
    /// Byte offset into the remote page; `offset + size <= PAGE_SIZE`.
    offset: usize,
    /// Operand value (low `size` bytes significant).
    value: u64,
    /// Compare value for CompSwap.
    cmp_value: u64,
}

/// The memory-blade device. All registers are zero (opcode unarmed) at
/// construction.
#[derive(Debug, Default)]
pub struct MemBlade {
    src: PhysAddr,
    dst: PhysAddr,
    pageno: u64,
    opcode: Opcode,
    /// Next transaction id to hand out.
    txid: u32,
    /// Completed requests whose ids have not yet been drained via `RESP`.
    nresp: u32,
    /// Pages held by the blade, keyed by page number.
    remote: RemoteStore<u64>,
}

impl MemBlade {
    /// Create a memory blade with a cleared register file and empty store.
    pub fn new() -> Self {
        MemBlade::default()
    }

    /// Number of pages currently held by the blade. Exposed for the
    /// embedding simulator's statistics.
    pub fn remote_page_count(&self) -> usize {
        self.remote.len()
    }

    // ── Command execution ──

    /// Execute the armed command. On success the previous `txid` is
    /// returned and both counters advance; on any failure the counters are
    /// untouched.
    fn execute(&mut self, host: &mut dyn HostMemory) -> Result<u32> {
        match self.opcode {
            Opcode::PageRead => self.page_read(host)?,
            Opcode::PageWrite => self.page_write(host)?,
            Opcode::WordRead => self.word_read(host)?,
            Opcode::WordWrite => self.word_write(host)?,
            Opcode::AtomicAdd => self.atomic_add(host)?,
            Opcode::CompSwap => self.comp_swap(host)?,
            Opcode::Unset => {
                warn!("request executed with no opcode armed");
                return Err(DeviceError::OpcodeUnset);
            }
        }

        let id = self.txid;
        self.txid = self.txid.wrapping_add(1);
        self.nresp += 1;
        debug!("request {:?} completed, txid {}", self.opcode, id);
        Ok(id)
    }

    /// `RESP` load: drain the oldest completed transaction id.
    fn pop_response(&mut self) -> Result<u32> {
        if self.nresp == 0 {
            return Err(DeviceError::NoResponse);
        }
        let id = self.txid.wrapping_sub(self.nresp);
        self.nresp -= 1;
        Ok(id)
    }

    fn page_read(&mut self, host: &mut dyn HostMemory) -> Result<()> {
        let dst = resolve(host, self.dst, PAGE_SIZE)?;
        match self.remote.get(self.pageno) {
            Some(page) => dst.copy_from_slice(page),
            // Never-written remote pages read as zeros.
            None => dst.fill(0),
        }
        Ok(())
    }

    fn page_write(&mut self, host: &mut dyn HostMemory) -> Result<()> {
        let src = resolve(host, self.src, PAGE_SIZE)?;
        let page = self.remote.get_or_insert_zeroed(self.pageno);
        page.copy_from_slice(src);
        Ok(())
    }

    fn word_read(&mut self, host: &mut dyn HostMemory) -> Result<()> {
        let ext = self.read_ext_header(host, 1)?;
        let dst = resolve(host, self.dst, ext.size)?;
        let page = self.remote.get_or_insert_zeroed(self.pageno);
        dst.copy_from_slice(&page[ext.offset..ext.offset + ext.size]);
        Ok(())
    }

    fn word_write(&mut self, host: &mut dyn HostMemory) -> Result<()> {
        let ext = self.read_ext_header(host, 2)?;
        let page = self.remote.get_or_insert_zeroed(self.pageno);
        page[ext.offset..ext.offset + ext.size]
            .copy_from_slice(&ext.value.to_le_bytes()[..ext.size]);
        Ok(())
    }

    fn atomic_add(&mut self, host: &mut dyn HostMemory) -> Result<()> {
        let ext = self.read_ext_header(host, 2)?;
        let dst = resolve(host, self.dst, ext.size)?;
        let page = self.remote.get_or_insert_zeroed(self.pageno);

        // The read and the add both observe the pre-add state.
        let old = load_sized(&page[ext.offset..], ext.size);
        dst.copy_from_slice(&page[ext.offset..ext.offset + ext.size]);
        let sum = old.wrapping_add(ext.value);
        page[ext.offset..ext.offset + ext.size].copy_from_slice(&sum.to_le_bytes()[..ext.size]);
        Ok(())
    }

    fn comp_swap(&mut self, host: &mut dyn HostMemory) -> Result<()> {
        let ext = self.read_ext_header(host, 3)?;
        let dst = resolve(host, self.dst, ext.size)?;
        let page = self.remote.get_or_insert_zeroed(self.pageno);

        let current = load_sized(&page[ext.offset..], ext.size);
        let hit = current == truncate(ext.cmp_value, ext.size);
        if hit {
            page[ext.offset..ext.offset + ext.size]
                .copy_from_slice(&ext.value.to_le_bytes()[..ext.size]);
        }
        dst.copy_from_slice(&u64::from(hit).to_le_bytes()[..ext.size]);
        Ok(())
    }

    /// Read the first `words` extended-header words from guest memory at
    /// `src` and validate the access they describe.
    fn read_ext_header(&self, host: &mut dyn HostMemory, words: usize) -> Result<ExtHeader> {
        let mem = resolve(host, self.src, words * 8)?;

        let head = read_word(mem, 0);
        let size = 1usize << (head & 0x3);
        let offset = ((head >> 4) & 0xfff) as usize;
        if offset + size > PAGE_SIZE {
            warn!("word access at offset {} size {} crosses page end", offset, size);
            return Err(DeviceError::OutOfPage { offset, size });
        }

        Ok(ExtHeader {
            size,
            offset,
            value: if words > 1 { read_word(mem, 1) } else { 0 },
            cmp_value: if words > 2 { read_word(mem, 2) } else { 0 },
        })
    }
}

impl MmioDevice for MemBlade {
    fn load(&mut self, host: &mut dyn HostMemory, offset: u64, out: &mut [u8]) -> Result<()> {
        if out.len() != LOAD_WIDTH {
            warn!("{}-byte load at offset {:#x}", out.len(), offset);
            return Err(DeviceError::AccessWidth {
                offset,
                len: out.len(),
                expected: LOAD_WIDTH,
            });
        }

        let val = match offset {
            MB_REQ => self.execute(host)?,
            MB_RESP => self.pop_response()?,
            MB_NREQ => 1,
            MB_NRESP => self.nresp,
            MB_SRC_ADDR | MB_DST_ADDR | MB_DSTMAC | MB_OPCODE | MB_PAGENO => {
                warn!("load from write-only register at offset {:#x}", offset);
                return Err(DeviceError::WriteOnly(offset));
            }
            _ => {
                warn!("load from unmapped offset {:#x}", offset);
                return Err(DeviceError::UnmappedOffset(offset));
            }
        };
        out.copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    fn store(&mut self, _host: &mut dyn HostMemory, offset: u64, data: &[u8]) -> Result<()> {
        // The opcode register is the one byte-granular register.
        if offset == MB_OPCODE {
            let byte = match data {
                [byte] => *byte,
                _ => {
                    warn!("{}-byte store to the opcode register", data.len());
                    return Err(DeviceError::AccessWidth {
                        offset,
                        len: data.len(),
                        expected: 1,
                    });
                }
            };
            self.opcode = match Opcode::from_byte(byte) {
                Some(op) => op,
                None => {
                    warn!("unknown opcode byte {:#x}", byte);
                    return Err(DeviceError::BadOpcode(byte));
                }
            };
            debug!("armed {:?}", self.opcode);
            return Ok(());
        }

        let val = match <[u8; STORE_WIDTH]>::try_from(data) {
            Ok(bytes) => u64::from_le_bytes(bytes),
            Err(_) => {
                warn!("{}-byte store at offset {:#x}", data.len(), offset);
                return Err(DeviceError::AccessWidth {
                    offset,
                    len: data.len(),
                    expected: STORE_WIDTH,
                });
            }
        };

        match offset {
            MB_SRC_ADDR => self.src = PhysAddr::new(val),
            MB_DST_ADDR => self.dst = PhysAddr::new(val),
            MB_DSTMAC => {} // no wire output; the value is irrelevant
            MB_PAGENO => self.pageno = val,
            MB_REQ | MB_RESP | MB_NREQ | MB_NRESP => {
                warn!("store to read-only register at offset {:#x}", offset);
                return Err(DeviceError::ReadOnly(offset));
            }
            _ => {
                warn!("store to unmapped offset {:#x}", offset);
                return Err(DeviceError::UnmappedOffset(offset));
            }
        }
        Ok(())
    }
}

// ── Byte helpers ──

/// Resolve a window of `len` bytes at `paddr` or fail with an addressing
/// fault.
fn resolve<'a>(host: &'a mut dyn HostMemory, paddr: PhysAddr, len: usize) -> Result<&'a mut [u8]> {
    match host.window(paddr, len) {
        Some(mem) => Ok(mem),
        None => {
            warn!("bad guest physical address {:#x}", paddr.as_u64());
            Err(DeviceError::BadAddress(paddr.as_u64()))
        }
    }
}

/// Read the `idx`-th little-endian 64-bit word of `mem`.
fn read_word(mem: &[u8], idx: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&mem[idx * 8..idx * 8 + 8]);
    u64::from_le_bytes(bytes)
}

/// Read a `size`-byte little-endian value, zero-extended to 64 bits.
fn load_sized(mem: &[u8], size: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes[..size].copy_from_slice(&mem[..size]);
    u64::from_le_bytes(bytes)
}

/// Keep the low `size` bytes of `val`.
fn truncate(val: u64, size: usize) -> u64 {
    if size == 8 {
        val
    } else {
        val & ((1u64 << (size * 8)) - 1)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
