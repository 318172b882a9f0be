use bytes::Bytes;

use crate::error::Result;

/// A chip-select framed bus — the one primitive the storage layers need.
///
/// Each call to [`transact`](BusTransport::transact) is exactly one frame:
/// select is asserted, `out` is clocked to the device, then `read_len` bytes
/// are clocked back without releasing select, and finally select is released.
/// Implementations must never split one call across two frames or merge two
/// calls into one.
///
/// `read_len == 0` means write-only, in which case `Ok(None)` is returned.
pub trait BusTransport {
    /// Run one framed transaction.
    fn transact(&mut self, out: &[u8], read_len: usize) -> Result<Option<Bytes>>;
}

impl<T: BusTransport + ?Sized> BusTransport for &mut T {
    fn transact(&mut self, out: &[u8], read_len: usize) -> Result<Option<Bytes>> {
        (**self).transact(out, read_len)
    }
}

impl<T: BusTransport + ?Sized> BusTransport for Box<T> {
    fn transact(&mut self, out: &[u8], read_len: usize) -> Result<Option<Bytes>> {
        (**self).transact(out, read_len)
    }
}
