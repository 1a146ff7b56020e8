//! MMIO device entry points.
//!
//! Each device model exposes a small register window at device-local
//! offsets. The simulator's bus layer routes guest loads and stores landing
//! in a device's window here, passing the offset relative to the window
//! base. The access length is the slice length; each register accepts
//! exactly one width and anything else fails without side effects.

use crate::error::Result;
use crate::host::HostMemory;

/// Trait implemented by the device models.
///
/// Both operations are synchronous: they run to completion before returning
/// and never retain the host-memory handle. `offset` is relative to the
/// device's window base, not an absolute physical address.
pub trait MmioDevice {
    /// Service a guest load of `out.len()` bytes from `offset`, filling
    /// `out` with the register value on success.
    fn load(&mut self, host: &mut dyn HostMemory, offset: u64, out: &mut [u8]) -> Result<()>;

    /// Service a guest store of `data.len()` bytes to `offset`.
    fn store(&mut self, host: &mut dyn HostMemory, offset: u64, data: &[u8]) -> Result<()>;
}
