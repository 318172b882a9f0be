use bytes::Bytes;
use framstore_transport::BusTransport;
use tracing::{debug, info, warn};

use crate::address::Address;
use crate::block::{BlockConfig, BlockStore};
use crate::codec::{
    decode_length_prefix, encode_length_prefix, RecordConfig, LENGTH_PREFIX_SIZE, MAX_PAYLOAD,
};
use crate::error::{BlockError, RecordError, Result, WritePhase};

/// Stores UTF-8 strings behind a 2-byte big-endian length prefix.
///
/// A record at base address `A` occupies `[A, A+2)` for the prefix and
/// `[A+2, A+2+L)` for the payload. Writes are two device commands and are
/// not atomic: if the payload write fails after the prefix landed, the
/// region is torn until it is written again. Reads never return partial
/// data; a region that does not hold a complete record decodes to an error.
pub struct RecordStore<T> {
    blocks: BlockStore<T>,
    config: RecordConfig,
}

impl<T: BusTransport> RecordStore<T> {
    /// Create a record store with default block and record configuration.
    pub fn new(transport: T) -> Self {
        Self::from_block_store(BlockStore::new(transport), RecordConfig::default())
    }

    /// Create a record store with explicit configuration.
    pub fn with_config(transport: T, block: BlockConfig, config: RecordConfig) -> Self {
        Self::from_block_store(BlockStore::with_config(transport, block), config)
    }

    /// Layer records over an existing block store.
    pub fn from_block_store(blocks: BlockStore<T>, mut config: RecordConfig) -> Self {
        if config.max_payload > MAX_PAYLOAD {
            warn!(
                requested = config.max_payload,
                max = MAX_PAYLOAD,
                "payload ceiling exceeds 2-byte length prefix; clamping"
            );
            config.max_payload = MAX_PAYLOAD;
        }
        Self { blocks, config }
    }

    /// Encode `text` as UTF-8 and write it as a record at `address`.
    pub fn write_string(&mut self, address: Address, text: &str) -> Result<()> {
        self.write_record(address, text.as_bytes())
    }

    /// Read the record at `address` and decode it as UTF-8.
    pub fn read_string(&mut self, address: Address) -> Result<String> {
        let payload = self.read_record(address)?;
        match std::str::from_utf8(&payload) {
            Ok(text) => Ok(text.to_owned()),
            Err(source) => {
                warn!(%address, length = payload.len(), "record payload is not valid UTF-8");
                Err(RecordError::InvalidEncoding {
                    length: payload.len(),
                    source,
                })
            }
        }
    }

    /// Write raw `payload` bytes as a record at `address`.
    ///
    /// Nothing is sent to the device if the payload exceeds the ceiling or
    /// the record would run past the address space. If the prefix write fails
    /// nothing else is written; if the payload write fails the prefix is
    /// already committed and the returned error reports
    /// [`is_torn`](RecordError::is_torn).
    pub fn write_record(&mut self, address: Address, payload: &[u8]) -> Result<()> {
        let prefix = encode_length_prefix(payload.len(), self.config.max_payload)?;
        let payload_address = self.payload_address(address, payload.len())?;

        self.blocks
            .write_block(address, &prefix)
            .map_err(|source| RecordError::Write {
                phase: WritePhase::Length,
                source,
            })?;

        if let Err(source) = self.blocks.write_block(payload_address, payload) {
            warn!(
                %address,
                length = payload.len(),
                "payload write failed after length prefix was committed"
            );
            return Err(RecordError::Write {
                phase: WritePhase::Payload,
                source,
            });
        }

        info!(%address, length = payload.len(), "record written");
        Ok(())
    }

    /// Read the raw payload of the record at `address`.
    pub fn read_record(&mut self, address: Address) -> Result<Bytes> {
        let prefix = self
            .blocks
            .read_block(address, LENGTH_PREFIX_SIZE)
            .map_err(RecordError::MissingLength)?;
        let length = usize::from(decode_length_prefix(&prefix).ok_or_else(|| {
            RecordError::MissingLength(BlockError::ShortRead {
                address,
                expected: LENGTH_PREFIX_SIZE,
                actual: prefix.len(),
            })
        })?);
        debug!(%address, length, "read length prefix");

        if length > self.config.max_payload {
            warn!(
                %address,
                length,
                max = self.config.max_payload,
                "stored length out of range; treating region as corrupt"
            );
            return Err(RecordError::LengthOutOfRange {
                length,
                max: self.config.max_payload,
            });
        }

        let payload_address = address
            .checked_add(LENGTH_PREFIX_SIZE)
            .ok_or(RecordError::MissingPayload {
                length,
                source: BlockError::OutOfRange {
                    address,
                    len: LENGTH_PREFIX_SIZE + length,
                },
            })?;
        let payload = self
            .blocks
            .read_block(payload_address, length)
            .map_err(|source| RecordError::MissingPayload { length, source })?;

        Ok(payload)
    }

    fn payload_address(&self, address: Address, len: usize) -> Result<Address> {
        let overflow = RecordError::AddressOutOfRange {
            address,
            offset: LENGTH_PREFIX_SIZE + len,
        };
        match address.checked_add(LENGTH_PREFIX_SIZE) {
            Some(payload_address) if payload_address.fits(len) => Ok(payload_address),
            _ => Err(overflow),
        }
    }

    /// Borrow the block store.
    pub fn block_store(&self) -> &BlockStore<T> {
        &self.blocks
    }

    /// Mutably borrow the block store.
    pub fn block_store_mut(&mut self) -> &mut BlockStore<T> {
        &mut self.blocks
    }

    /// Consume the record store and return the block store.
    pub fn into_inner(self) -> BlockStore<T> {
        self.blocks
    }

    /// Current record configuration.
    pub fn config(&self) -> &RecordConfig {
        &self.config
    }
}
