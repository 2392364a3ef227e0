//! RAK12035 register map
//!
//! One register selector byte is written, then the payload is written
//! (for setters) or read back after a settle delay (for getters).
//! Multi-byte values are big-endian.

/// Device registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Raw capacitance (r, 2 bytes)
    GetCapacitance = 0x01,
    /// Current bus address (r, 1 byte)
    GetI2cAddress = 0x02,
    /// New bus address, effective after reset (w, 1 byte)
    SetI2cAddress = 0x03,
    /// Firmware version (r, 1 byte)
    GetVersion = 0x04,
    /// Temperature in tenths of a degree (r, 2 bytes)
    GetTemperature = 0x05,
}

impl Register {
    /// Get the register selector byte
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Payload length in bytes
    pub const fn payload_len(self) -> usize {
        match self {
            Register::GetCapacitance | Register::GetTemperature => 2,
            Register::GetI2cAddress | Register::SetI2cAddress | Register::GetVersion => 1,
        }
    }

    /// Look up a register by selector byte
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Register::GetCapacitance),
            0x02 => Some(Register::GetI2cAddress),
            0x03 => Some(Register::SetI2cAddress),
            0x04 => Some(Register::GetVersion),
            0x05 => Some(Register::GetTemperature),
            _ => None,
        }
    }
}
