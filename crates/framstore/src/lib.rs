//! Length-prefixed string storage on SPI FRAM.
//!
//! framstore stores UTF-8 strings on a byte-addressable FRAM chip behind a
//! 2-byte big-endian length prefix, using nothing but the device's
//! write-enable, write and read commands.
//!
//! # Crate Structure
//!
//! - [`transport`] — Chip-select framed bus contract and a simulated FRAM device
//! - [`record`] — Block store and length-prefixed record codec
//!
//! # Example
//!
//! ```
//! use framstore::record::{Address, RecordStore};
//! use framstore::transport::MemoryFram;
//!
//! let mut store = RecordStore::new(MemoryFram::default());
//! let at = Address::new(0x20).unwrap();
//!
//! store.write_string(at, "hello").unwrap();
//! assert_eq!(store.read_string(at).unwrap(), "hello");
//! ```

/// Re-export transport types.
pub mod transport {
    pub use framstore_transport::*;
}

/// Re-export record types.
pub mod record {
    pub use framstore_record::*;
}
