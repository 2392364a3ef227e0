//! Soil calibration data types
//!
//! Two capacitance endpoints map raw readings onto 0-100 %. The record is
//! persisted through an envelope that carries a magic, a format version
//! and a CRC so a torn or foreign blob is never mistaken for calibration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::moisture::moisture_percent;

/// Dry endpoint used when nothing has been calibrated yet
pub const DEFAULT_DRY_ENDPOINT: u16 = 200;

/// Wet endpoint used when nothing has been calibrated yet
pub const DEFAULT_WET_ENDPOINT: u16 = 500;

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x534F_494C; // "SOIL"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Two-point calibration: capacitance at 0 % and at 100 %
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationRecord {
    /// Capacitance of the probe in dry soil (0 %)
    pub dry_endpoint: u16,
    /// Capacitance of the probe in saturated soil (100 %)
    pub wet_endpoint: u16,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self::new(DEFAULT_DRY_ENDPOINT, DEFAULT_WET_ENDPOINT)
    }
}

impl CalibrationRecord {
    /// Create a record from both endpoints
    pub const fn new(dry_endpoint: u16, wet_endpoint: u16) -> Self {
        Self {
            dry_endpoint,
            wet_endpoint,
        }
    }

    /// Get the dry or wet endpoint
    pub const fn endpoint(&self, is_dry: bool) -> u16 {
        if is_dry {
            self.dry_endpoint
        } else {
            self.wet_endpoint
        }
    }

    /// Replace the dry or wet endpoint
    pub fn set_endpoint(&mut self, is_dry: bool, value: u16) {
        if is_dry {
            self.dry_endpoint = value;
        } else {
            self.wet_endpoint = value;
        }
    }

    /// Check if both endpoints are equal, which makes the mapping undefined
    pub const fn is_degenerate(&self) -> bool {
        self.dry_endpoint == self.wet_endpoint
    }

    /// Map a capacitance onto 0-100 % with these endpoints
    ///
    /// Returns `None` for a degenerate record.
    pub fn moisture_percent(&self, capacitance: u16) -> Option<u8> {
        moisture_percent(capacitance, self.dry_endpoint, self.wet_endpoint)
    }
}

/// Calibration record as it is written to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PersistedCalibration {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// The calibration itself
    pub record: CalibrationRecord,
    /// CRC32 checksum (calculated over magic..record)
    pub crc: u32,
}

impl PersistedCalibration {
    /// Wrap a record, computing its CRC
    pub fn new(record: CalibrationRecord) -> Self {
        let mut data = Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            record,
            crc: 0,
        };
        data.update_crc();
        data
    }

    /// Check if the data is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.record.dry_endpoint.to_le_bytes());
        crc = crc32_update(crc, &self.record.wet_endpoint.to_le_bytes());
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// The record, if header and CRC check out
    pub fn checked_record(&self) -> Option<CalibrationRecord> {
        (self.is_valid() && self.verify_crc()).then_some(self.record)
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
