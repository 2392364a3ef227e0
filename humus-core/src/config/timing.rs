//! Hardware timing contracts
//!
//! The RAK12035 needs time to prepare register data and to boot. These
//! delays are part of the device contract; they live here as data so
//! test doubles can compress them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Delay between the register-select write and the read request (ms)
pub const REGISTER_SETTLE_MS: u32 = 20;

/// Watchdog for collecting the bytes of one read (ms)
pub const READ_WATCHDOG_MS: u32 = 1000;

/// How long the reset line is held low (ms)
pub const RESET_HOLD_MS: u32 = 500;

/// Settle time after the device first answers (ms)
pub const BOOT_SETTLE_MS: u32 = 500;

/// Default deadline for the device to answer after power-up (ms)
pub const WAKE_TIMEOUT_MS: u32 = 5000;

/// Bus and power timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    /// Register preparation delay before a read (ms)
    pub settle_ms: u32,
    /// Read watchdog (ms)
    pub read_watchdog_ms: u32,
    /// Sleep between polls of the receive queue (ms)
    pub read_poll_ms: u32,
    /// Reset pulse width (ms)
    pub reset_hold_ms: u32,
    /// Delay after boot/wake before the device is used (ms)
    pub boot_settle_ms: u32,
    /// Deadline for the version query to answer after power-up (ms)
    pub wake_timeout_ms: u32,
    /// Back-off between version polls while waking (ms)
    pub wake_poll_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self::HARDWARE
    }
}

impl Timing {
    /// Timing the real device needs
    pub const HARDWARE: Self = Self {
        settle_ms: REGISTER_SETTLE_MS,
        read_watchdog_ms: READ_WATCHDOG_MS,
        read_poll_ms: 1,
        reset_hold_ms: RESET_HOLD_MS,
        boot_settle_ms: BOOT_SETTLE_MS,
        wake_timeout_ms: WAKE_TIMEOUT_MS,
        wake_poll_ms: 10,
    };

    /// Zero fixed delays, watchdogs kept
    ///
    /// For simulated devices: nothing sleeps unless it has to wait for
    /// data, but a silent device still trips the watchdogs.
    pub const fn compressed() -> Self {
        Self {
            settle_ms: 0,
            read_watchdog_ms: READ_WATCHDOG_MS,
            read_poll_ms: 1,
            reset_hold_ms: 0,
            boot_settle_ms: 0,
            wake_timeout_ms: WAKE_TIMEOUT_MS,
            wake_poll_ms: 1,
        }
    }
}

/// Sampling and calibration cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingConfig {
    /// Attempts to get the first valid reading
    pub attempts: u8,
    /// Extra smoothing rounds after the first valid reading
    pub smoothing_cycles: u32,
    /// Capacitance samples folded into a calibration endpoint
    pub calibration_samples: u32,
    /// Delay between calibration samples (ms)
    pub calibration_delay_ms: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            smoothing_cycles: 50,
            calibration_samples: 100,
            calibration_delay_ms: 250,
        }
    }
}
