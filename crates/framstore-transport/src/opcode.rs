//! SPI FRAM command opcodes.

/// Set the write-enable latch. Cleared by the device after every write cycle.
pub const WREN: u8 = 0x06;

/// Write memory: opcode, 24-bit big-endian address, then payload.
pub const WRITE: u8 = 0x02;

/// Read memory: opcode, 24-bit big-endian address, then clock out data.
pub const READ: u8 = 0x03;

/// Number of address bytes following a `WRITE` or `READ` opcode.
pub const ADDRESS_BYTES: usize = 3;

/// Opcode plus address.
pub const COMMAND_HEADER_SIZE: usize = 1 + ADDRESS_BYTES;

/// Human-readable opcode name for logs.
pub fn name(opcode: u8) -> &'static str {
    match opcode {
        WREN => "WREN",
        WRITE => "WRITE",
        READ => "READ",
        _ => "UNKNOWN",
    }
}
