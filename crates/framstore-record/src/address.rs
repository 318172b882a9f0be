use std::fmt;
use std::str::FromStr;

/// A 24-bit offset into the device's linear address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u32);

impl Address {
    /// Highest addressable byte.
    pub const MAX: Address = Address(0x00FF_FFFF);

    /// Size of the address space in bytes.
    pub const SPACE: u64 = 1 << 24;

    /// Construct an address, or `None` if `raw` does not fit in 24 bits.
    pub const fn new(raw: u32) -> Option<Self> {
        if raw <= Self::MAX.0 {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// The raw offset.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// `self + offset`, or `None` past the end of the address space.
    pub fn checked_add(self, offset: usize) -> Option<Self> {
        let offset = u32::try_from(offset).ok()?;
        self.0.checked_add(offset).and_then(Self::new)
    }

    /// Whether `len` bytes starting here stay inside the address space.
    pub fn fits(self, len: usize) -> bool {
        u64::from(self.0) + len as u64 <= Self::SPACE
    }

    /// Big-endian wire encoding as sent after a command opcode.
    pub const fn to_be_bytes(self) -> [u8; 3] {
        let [_, hi, mid, lo] = self.0.to_be_bytes();
        [hi, mid, lo]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06X}", self.0)
    }
}

impl From<Address> for u32 {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl TryFrom<u32> for Address {
    type Error = AddressParseError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or(AddressParseError::OutOfRange(u64::from(raw)))
    }
}

/// Errors produced when parsing an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// The text is not a decimal or `0x`-prefixed hexadecimal number.
    #[error("invalid address: {0:?}")]
    Invalid(String),

    /// The value does not fit in 24 bits.
    #[error("address {0:#X} exceeds 24-bit range (max 0xFFFFFF)")]
    OutOfRange(u64),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
            None => trimmed.replace('_', "").parse::<u64>(),
        };
        let raw = parsed.map_err(|_| AddressParseError::Invalid(s.to_string()))?;
        let raw = u32::try_from(raw).map_err(|_| AddressParseError::OutOfRange(raw))?;
        Address::try_from(raw)
    }
}
