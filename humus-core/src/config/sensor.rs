//! Sensor addressing and top-level configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::calibration::CalibrationRecord;
use super::timing::{SamplingConfig, Timing};

/// Factory bus address of the RAK12035
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Lowest address the device can be reprogrammed to
pub const MIN_ADDRESS: u8 = 1;

/// Highest address the device can be reprogrammed to
pub const MAX_ADDRESS: u8 = 127;

/// Check if an address is usable as a 7-bit device address
pub const fn is_valid_address(address: u8) -> bool {
    address >= MIN_ADDRESS && address <= MAX_ADDRESS
}

/// Everything needed to bring up one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SoilConfig {
    /// Bus address the session starts on
    pub address: u8,
    /// Bus and power timing
    pub timing: Timing,
    /// Sampling cadence
    pub sampling: SamplingConfig,
    /// Calibration written on first use
    pub defaults: CalibrationRecord,
}

impl Default for SoilConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            timing: Timing::default(),
            sampling: SamplingConfig::default(),
            defaults: CalibrationRecord::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_range() {
        assert!(!is_valid_address(0));
        assert!(is_valid_address(1));
        assert!(is_valid_address(DEFAULT_ADDRESS));
        assert!(is_valid_address(127));
        assert!(!is_valid_address(128));
        assert!(!is_valid_address(200));
    }

    #[test]
    fn test_default_config() {
        let config = SoilConfig::default();
        assert_eq!(config.address, 0x20);
        assert_eq!(config.defaults.dry_endpoint, 200);
        assert_eq!(config.defaults.wet_endpoint, 500);
    }
}
