use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use framstore_transport::opcode::{COMMAND_HEADER_SIZE, READ, WREN, WRITE};
use framstore_transport::{BusTransport, TransportError};
use tracing::{debug, trace};

use crate::address::Address;
use crate::error::BlockError;

/// Post-transaction settle delays.
#[derive(Debug, Clone)]
pub struct BlockConfig {
    /// Pause after each write so the device finishes its write cycle. Default: 1 ms.
    pub write_settle: Duration,
    /// Pause after each read. Default: 1 µs.
    pub read_settle: Duration,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            write_settle: Duration::from_millis(1),
            read_settle: Duration::from_micros(1),
        }
    }
}

/// Fixed-address block reads and writes over a [`BusTransport`].
///
/// Stateless between calls: every operation is its own chip-select framed
/// command and makes exactly one attempt.
pub struct BlockStore<T> {
    transport: T,
    buf: BytesMut,
    config: BlockConfig,
}

impl<T: BusTransport> BlockStore<T> {
    /// Create a block store with default settle delays.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BlockConfig::default())
    }

    /// Create a block store with explicit configuration.
    pub fn with_config(transport: T, config: BlockConfig) -> Self {
        Self {
            transport,
            buf: BytesMut::with_capacity(COMMAND_HEADER_SIZE),
            config,
        }
    }

    /// Set the device's write-enable latch.
    ///
    /// The latch clears after every write cycle, so this runs before each
    /// [`write_block`](Self::write_block), not once per session.
    pub fn enable_write(&mut self) -> Result<(), TransportError> {
        trace!("write enable");
        self.transport.transact(&[WREN], 0).map(|_| ())
    }

    /// Write `data` starting at `address`.
    pub fn write_block(&mut self, address: Address, data: &[u8]) -> Result<(), BlockError> {
        if !address.fits(data.len()) {
            return Err(BlockError::OutOfRange {
                address,
                len: data.len(),
            });
        }

        let write_err = |source| BlockError::Write {
            address,
            len: data.len(),
            source,
        };

        self.enable_write().map_err(write_err)?;

        self.buf.clear();
        self.buf.reserve(COMMAND_HEADER_SIZE + data.len());
        self.buf.put_u8(WRITE);
        self.buf.put_slice(&address.to_be_bytes());
        self.buf.put_slice(data);

        debug!(%address, len = data.len(), "write block");
        self.transport.transact(&self.buf, 0).map_err(write_err)?;

        settle(self.config.write_settle);
        Ok(())
    }

    /// Read exactly `len` bytes starting at `address`.
    ///
    /// The address phase and the data phase share one chip-select frame.
    pub fn read_block(&mut self, address: Address, len: usize) -> Result<Bytes, BlockError> {
        if !address.fits(len) {
            return Err(BlockError::OutOfRange { address, len });
        }

        self.buf.clear();
        self.buf.put_u8(READ);
        self.buf.put_slice(&address.to_be_bytes());

        debug!(%address, len, "read block");
        let data = self
            .transport
            .transact(&self.buf, len)
            .map_err(|source| BlockError::Read {
                address,
                len,
                source,
            })?
            .unwrap_or_default();

        settle(self.config.read_settle);

        if data.len() < len {
            return Err(BlockError::ShortRead {
                address,
                expected: len,
                actual: data.len(),
            });
        }
        Ok(data.slice(..len))
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the block store and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Current block store configuration.
    pub fn config(&self) -> &BlockConfig {
        &self.config
    }
}

fn settle(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use framstore_transport::MemoryFram;

    use super::*;

    fn no_settle() -> BlockConfig {
        BlockConfig {
            write_settle: Duration::ZERO,
            read_settle: Duration::ZERO,
        }
    }

    fn addr(raw: u32) -> Address {
        Address::new(raw).unwrap()
    }

    /// Records every frame and answers reads from a fixed byte pattern.
    #[derive(Default)]
    struct RecordingBus {
        frames: Vec<(Vec<u8>, usize)>,
        reply: Vec<u8>,
    }

    impl BusTransport for RecordingBus {
        fn transact(
            &mut self,
            out: &[u8],
            read_len: usize,
        ) -> framstore_transport::Result<Option<Bytes>> {
            self.frames.push((out.to_vec(), read_len));
            if read_len == 0 {
                return Ok(None);
            }
            let n = read_len.min(self.reply.len());
            Ok(Some(Bytes::copy_from_slice(&self.reply[..n])))
        }
    }

    /// Fails every frame carrying the given opcode.
    struct FailingBus {
        opcode: u8,
    }

    impl BusTransport for FailingBus {
        fn transact(
            &mut self,
            out: &[u8],
            read_len: usize,
        ) -> framstore_transport::Result<Option<Bytes>> {
            if out.first() == Some(&self.opcode) {
                return Err(TransportError::Fault("injected".into()));
            }
            Ok((read_len > 0).then(|| Bytes::from(vec![0u8; read_len])))
        }
    }

    #[test]
    fn write_block_frames_wren_then_write() {
        let mut store = BlockStore::with_config(RecordingBus::default(), no_settle());
        store.write_block(addr(0x01_0203), b"hi").unwrap();

        let frames = &store.get_ref().frames;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], (vec![0x06], 0));
        assert_eq!(frames[1], (vec![0x02, 0x01, 0x02, 0x03, b'h', b'i'], 0));
    }

    #[test]
    fn every_write_gets_its_own_wren() {
        let mut store = BlockStore::with_config(RecordingBus::default(), no_settle());
        store.write_block(addr(0), b"a").unwrap();
        store.write_block(addr(1), b"b").unwrap();

        let opcodes: Vec<u8> = store.get_ref().frames.iter().map(|(f, _)| f[0]).collect();
        assert_eq!(opcodes, vec![WREN, WRITE, WREN, WRITE]);
    }

    #[test]
    fn read_block_sends_address_and_reads_in_one_frame() {
        let bus = RecordingBus {
            reply: b"abcd".to_vec(),
            ..RecordingBus::default()
        };
        let mut store = BlockStore::with_config(bus, no_settle());

        let data = store.read_block(addr(0x20), 4).unwrap();
        assert_eq!(data.as_ref(), b"abcd");
        assert_eq!(store.get_ref().frames, vec![(vec![0x03, 0x00, 0x00, 0x20], 4)]);
    }

    #[test]
    fn short_read_is_reported() {
        let bus = RecordingBus {
            reply: b"ab".to_vec(),
            ..RecordingBus::default()
        };
        let mut store = BlockStore::with_config(bus, no_settle());

        let err = store.read_block(addr(0), 4).unwrap_err();
        assert!(matches!(
            err,
            BlockError::ShortRead {
                expected: 4,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn zero_length_read_returns_empty_block() {
        let mut store = BlockStore::with_config(RecordingBus::default(), no_settle());
        let data = store.read_block(addr(0), 0).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn wren_fault_surfaces_as_write_failure() {
        let mut store = BlockStore::with_config(FailingBus { opcode: WREN }, no_settle());
        let err = store.write_block(addr(4), b"x").unwrap_err();
        assert!(matches!(err, BlockError::Write { len: 1, .. }));
    }

    #[test]
    fn write_fault_surfaces_as_write_failure() {
        let mut store = BlockStore::with_config(FailingBus { opcode: WRITE }, no_settle());
        let err = store.write_block(addr(4), b"xy").unwrap_err();
        assert!(matches!(
            err,
            BlockError::Write {
                source: TransportError::Fault(_),
                ..
            }
        ));
    }

    #[test]
    fn read_fault_surfaces_as_read_failure() {
        let mut store = BlockStore::with_config(FailingBus { opcode: READ }, no_settle());
        let err = store.read_block(addr(4), 2).unwrap_err();
        assert!(matches!(err, BlockError::Read { len: 2, .. }));
    }

    #[test]
    fn blocks_past_end_of_space_never_reach_the_bus() {
        let mut store = BlockStore::with_config(RecordingBus::default(), no_settle());

        let err = store.write_block(Address::MAX, b"ab").unwrap_err();
        assert!(matches!(err, BlockError::OutOfRange { len: 2, .. }));
        let err = store.read_block(Address::MAX, 2).unwrap_err();
        assert!(matches!(err, BlockError::OutOfRange { .. }));

        assert!(store.get_ref().frames.is_empty());
    }

    #[test]
    fn round_trip_through_simulated_device() {
        let mut store = BlockStore::with_config(MemoryFram::new(256), no_settle());
        store.write_block(addr(0x40), &[1, 2, 3]).unwrap();

        let data = store.read_block(addr(0x3F), 5).unwrap();
        assert_eq!(data.as_ref(), &[0xFF, 1, 2, 3, 0xFF]);
        assert_eq!(store.into_inner().transactions(), 3);
    }

    #[test]
    fn default_settle_delays() {
        let store = BlockStore::new(MemoryFram::new(16));
        assert_eq!(store.config().write_settle, Duration::from_millis(1));
        assert_eq!(store.config().read_settle, Duration::from_micros(1));
    }
}
