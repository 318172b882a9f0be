use std::path::Path;

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::opcode::{self, COMMAND_HEADER_SIZE, READ, WREN, WRITE};
use crate::storage::{FileStorage, MemoryStorage, Storage, ERASED_BYTE};
use crate::traits::BusTransport;

/// Default device size: 128 KiB, a 1-Mbit SPI FRAM.
pub const DEFAULT_CAPACITY: usize = 128 * 1024;

/// In-memory simulated FRAM.
pub type MemoryFram = SimulatedFram<MemoryStorage>;

/// Simulated FRAM persisted in an image file.
pub type FileFram = SimulatedFram<FileStorage>;

/// Device-side emulation of an SPI FRAM command set.
///
/// Each [`transact`](BusTransport::transact) call is handled as one
/// chip-select frame:
/// - `WREN` sets the write-enable latch
/// - `WRITE` stores the payload if the latch is set, then clears the latch
/// - `READ` clocks back `read_len` bytes
///
/// Addresses wrap modulo capacity like the real part. Frames the device does
/// not understand are ignored; any read-back requested for them is filled
/// with `0xFF`, matching an undriven MISO line.
#[derive(Debug)]
pub struct SimulatedFram<S> {
    storage: S,
    write_enabled: bool,
    transactions: u64,
}

impl MemoryFram {
    /// Create an erased in-memory device of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::with_storage(MemoryStorage::new(capacity))
    }
}

impl Default for MemoryFram {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl FileFram {
    /// Open (or create) a device image at `path`.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        Ok(Self::with_storage(FileStorage::open(path, capacity)?))
    }
}

impl<S: Storage> SimulatedFram<S> {
    /// Wrap existing storage. The write-enable latch starts cleared.
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            write_enabled: false,
            transactions: 0,
        }
    }

    /// Device size in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Whether the write-enable latch is currently set.
    pub fn write_enabled(&self) -> bool {
        self.write_enabled
    }

    /// Number of frames seen since creation.
    pub fn transactions(&self) -> u64 {
        self.transactions
    }

    /// Borrow the backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrow the backing storage, bypassing the command set.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn handle_write(&mut self, out: &[u8]) -> Result<()> {
        if out.len() < COMMAND_HEADER_SIZE {
            debug!(len = out.len(), "ignoring truncated WRITE frame");
            return Ok(());
        }
        if !self.write_enabled {
            debug!("ignoring WRITE frame: write-enable latch not set");
            return Ok(());
        }
        // Latch clears at the end of the write cycle whether or not it succeeds.
        self.write_enabled = false;

        let address = decode_address(&out[1..COMMAND_HEADER_SIZE]);
        let data = &out[COMMAND_HEADER_SIZE..];
        self.write_wrapping(address, data)
    }

    fn handle_read(&mut self, out: &[u8], read_len: usize) -> Result<Bytes> {
        if out.len() < COMMAND_HEADER_SIZE {
            debug!(len = out.len(), "truncated READ frame; returning filler");
            return Ok(filler(read_len));
        }
        let address = decode_address(&out[1..COMMAND_HEADER_SIZE]);
        self.read_wrapping(address, read_len)
    }

    fn write_wrapping(&mut self, address: usize, mut data: &[u8]) -> Result<()> {
        let capacity = self.storage.capacity();
        if capacity == 0 {
            return Ok(());
        }
        let mut offset = address % capacity;
        while !data.is_empty() {
            let chunk = data.len().min(capacity - offset);
            self.storage.write_at(offset, &data[..chunk])?;
            data = &data[chunk..];
            offset = 0;
        }
        Ok(())
    }

    fn read_wrapping(&mut self, address: usize, len: usize) -> Result<Bytes> {
        let capacity = self.storage.capacity();
        if capacity == 0 {
            return Ok(filler(len));
        }
        let mut buf = BytesMut::zeroed(len);
        let mut offset = address % capacity;
        let mut filled = 0usize;
        while filled < len {
            let chunk = (len - filled).min(capacity - offset);
            self.storage
                .read_at(offset, &mut buf[filled..filled + chunk])?;
            filled += chunk;
            offset = 0;
        }
        Ok(buf.freeze())
    }
}

impl<S: Storage> BusTransport for SimulatedFram<S> {
    fn transact(&mut self, out: &[u8], read_len: usize) -> Result<Option<Bytes>> {
        let Some(&op) = out.first() else {
            return Err(TransportError::EmptyTransaction);
        };
        self.transactions = self.transactions.saturating_add(1);
        trace!(op = opcode::name(op), out_len = out.len(), read_len, "frame");

        let read_back = match op {
            WREN => {
                self.write_enabled = true;
                None
            }
            WRITE => {
                self.handle_write(out)?;
                None
            }
            READ if read_len > 0 => Some(self.handle_read(out, read_len)?),
            _ => None,
        };

        if read_len == 0 {
            return Ok(None);
        }
        Ok(Some(read_back.unwrap_or_else(|| filler(read_len))))
    }
}

fn decode_address(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
}

fn filler(len: usize) -> Bytes {
    Bytes::from(vec![ERASED_BYTE; len])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_frame(address: u32, data: &[u8]) -> Vec<u8> {
        let mut out = vec![WRITE];
        out.extend_from_slice(&address.to_be_bytes()[1..]);
        out.extend_from_slice(data);
        out
    }

    fn read_frame(address: u32) -> Vec<u8> {
        let mut out = vec![READ];
        out.extend_from_slice(&address.to_be_bytes()[1..]);
        out
    }

    #[test]
    fn write_requires_write_enable() {
        let mut fram = MemoryFram::new(64);

        fram.transact(&write_frame(0x10, b"nope"), 0).unwrap();
        assert_eq!(&fram.storage().as_slice()[0x10..0x14], &[0xFF; 4]);

        fram.transact(&[WREN], 0).unwrap();
        assert!(fram.write_enabled());
        fram.transact(&write_frame(0x10, b"yes!"), 0).unwrap();
        assert_eq!(&fram.storage().as_slice()[0x10..0x14], b"yes!");
    }

    #[test]
    fn latch_clears_after_each_write() {
        let mut fram = MemoryFram::new(64);

        fram.transact(&[WREN], 0).unwrap();
        fram.transact(&write_frame(0, b"a"), 0).unwrap();
        assert!(!fram.write_enabled());

        fram.transact(&write_frame(1, b"b"), 0).unwrap();
        assert_eq!(fram.storage().as_slice()[1], 0xFF);
    }

    #[test]
    fn read_returns_stored_bytes() {
        let mut fram = MemoryFram::new(64);
        fram.transact(&[WREN], 0).unwrap();
        fram.transact(&write_frame(0x20, b"hello"), 0).unwrap();

        let data = fram.transact(&read_frame(0x20), 5).unwrap().unwrap();
        assert_eq!(data.as_ref(), b"hello");
    }

    #[test]
    fn addresses_wrap_modulo_capacity() {
        let mut fram = MemoryFram::new(16);
        fram.transact(&[WREN], 0).unwrap();
        fram.transact(&write_frame(14, b"wrap"), 0).unwrap();

        assert_eq!(&fram.storage().as_slice()[14..16], b"wr");
        assert_eq!(&fram.storage().as_slice()[0..2], b"ap");

        let data = fram.transact(&read_frame(14 + 16), 4).unwrap().unwrap();
        assert_eq!(data.as_ref(), b"wrap");
    }

    #[test]
    fn unknown_opcode_reads_back_filler() {
        let mut fram = MemoryFram::new(16);
        let data = fram.transact(&[0x9F], 3).unwrap().unwrap();
        assert_eq!(data.as_ref(), &[0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn truncated_frames_are_ignored() {
        let mut fram = MemoryFram::new(16);
        fram.transact(&[WREN], 0).unwrap();
        fram.transact(&[WRITE, 0x00], 0).unwrap();
        assert!(fram.write_enabled());

        let data = fram.transact(&[READ, 0x00], 2).unwrap().unwrap();
        assert_eq!(data.as_ref(), &[0xFF, 0xFF]);
    }

    #[test]
    fn write_only_frame_returns_none() {
        let mut fram = MemoryFram::new(16);
        assert!(fram.transact(&read_frame(0), 0).unwrap().is_none());
    }

    #[test]
    fn empty_transaction_rejected() {
        let mut fram = MemoryFram::new(16);
        let err = fram.transact(&[], 1).unwrap_err();
        assert!(matches!(err, TransportError::EmptyTransaction));
        assert_eq!(fram.transactions(), 0);
    }

    #[test]
    fn counts_transactions() {
        let mut fram = MemoryFram::default();
        assert_eq!(fram.capacity(), DEFAULT_CAPACITY);

        fram.transact(&[WREN], 0).unwrap();
        fram.transact(&write_frame(0, b"x"), 0).unwrap();
        fram.transact(&read_frame(0), 1).unwrap();
        assert_eq!(fram.transactions(), 3);
    }

    #[test]
    fn decode_address_is_big_endian() {
        assert_eq!(decode_address(&[0x01, 0x02, 0x03]), 0x010203);
        assert_eq!(decode_address(&[0xFF, 0xFF, 0xFF]), 0xFF_FFFF);
    }
}
