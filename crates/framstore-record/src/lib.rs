//! Length-prefixed string records over fixed-address FRAM block commands.
//!
//! This is the core value-add layer of framstore. Every record is laid out as:
//! - A 2-byte big-endian payload length at the base address
//! - The UTF-8 payload immediately after it
//!
//! Writing a record is two device writes (length, then payload) and is not
//! atomic at the device level; see [`RecordError::is_torn`].

pub mod address;
pub mod block;
pub mod codec;
pub mod error;
pub mod record;

pub use address::{Address, AddressParseError};
pub use block::{BlockConfig, BlockStore};
pub use codec::{
    decode_length_prefix, encode_length_prefix, RecordConfig, LENGTH_PREFIX_SIZE, MAX_PAYLOAD,
};
pub use error::{BlockError, RecordError, Result, WritePhase};
pub use record::RecordStore;
