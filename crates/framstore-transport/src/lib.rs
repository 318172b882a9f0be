//! Chip-select framed bus transport for SPI FRAM devices.
//!
//! Provides the single primitive every higher layer is built on:
//! - [`BusTransport::transact`] writes an outbound byte sequence and optionally
//!   clocks back N bytes, all inside one chip-select frame
//!
//! This is the lowest layer of framstore. A [`SimulatedFram`] implements the
//! device side of the protocol so the stack runs on a host without hardware.

pub mod error;
pub mod fram;
pub mod opcode;
pub mod storage;
pub mod traits;

pub use error::{Result, TransportError};
pub use fram::{FileFram, MemoryFram, SimulatedFram, DEFAULT_CAPACITY};
pub use storage::{FileStorage, MemoryStorage, Storage, ERASED_BYTE};
pub use traits::BusTransport;
