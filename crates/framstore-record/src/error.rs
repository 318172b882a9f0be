use std::fmt;

use framstore_transport::TransportError;

use crate::address::Address;

/// Errors from a single block command against the device.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    /// The transport faulted while writing a block.
    #[error("write of {len} bytes at {address} failed: {source}")]
    Write {
        address: Address,
        len: usize,
        source: TransportError,
    },

    /// The transport faulted while reading a block.
    #[error("read of {len} bytes at {address} failed: {source}")]
    Read {
        address: Address,
        len: usize,
        source: TransportError,
    },

    /// The device returned fewer bytes than requested.
    #[error("short read at {address} ({actual} bytes, expected {expected})")]
    ShortRead {
        address: Address,
        expected: usize,
        actual: usize,
    },

    /// The block would run past the end of the 24-bit address space.
    #[error("block of {len} bytes at {address} exceeds the 24-bit address space")]
    OutOfRange { address: Address, len: usize },
}

/// Which half of a two-phase record write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePhase {
    /// Writing the 2-byte length prefix; nothing reached the device.
    Length,
    /// Writing the payload after the prefix was committed.
    Payload,
}

impl fmt::Display for WritePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePhase::Length => f.write_str("length prefix"),
            WritePhase::Payload => f.write_str("payload"),
        }
    }
}

/// Errors that can occur while encoding or decoding a framed record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// The payload exceeds the configured ceiling; the device was not touched.
    #[error("payload too long ({size} bytes, max {max})")]
    TooLong { size: usize, max: usize },

    /// The record would not fit in the 24-bit address space.
    #[error("record at {address} overflows the address space (needs {offset} bytes)")]
    AddressOutOfRange { address: Address, offset: usize },

    /// A block write failed during the given phase.
    #[error("{phase} write failed: {source}")]
    Write {
        phase: WritePhase,
        source: BlockError,
    },

    /// The length prefix could not be read.
    #[error("missing length prefix: {0}")]
    MissingLength(#[source] BlockError),

    /// The stored length exceeds the ceiling; the region holds no valid record.
    #[error("stored length {length} out of range (max {max})")]
    LengthOutOfRange { length: usize, max: usize },

    /// The payload described by the prefix could not be read.
    #[error("missing payload ({length} bytes): {source}")]
    MissingPayload { length: usize, source: BlockError },

    /// The payload was read but is not valid UTF-8.
    #[error("payload ({length} bytes) is not valid UTF-8: {source}")]
    InvalidEncoding {
        length: usize,
        source: std::str::Utf8Error,
    },
}

impl RecordError {
    /// Rejected before any device access.
    pub fn is_encode_failure(&self) -> bool {
        matches!(self, RecordError::TooLong { .. })
    }

    /// The stored bytes do not form a valid record.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            RecordError::MissingLength(_)
                | RecordError::LengthOutOfRange { .. }
                | RecordError::MissingPayload { .. }
                | RecordError::InvalidEncoding { .. }
        )
    }

    /// A length prefix was committed but its payload was not.
    ///
    /// The region now describes a payload that was never written; a later
    /// read may fail or may decode whatever bytes were already there.
    pub fn is_torn(&self) -> bool {
        matches!(
            self,
            RecordError::Write {
                phase: WritePhase::Payload,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
