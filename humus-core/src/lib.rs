//! Board-agnostic core logic for the soil moisture sensor firmware
//!
//! This crate contains everything that does not touch the bus or pins:
//!
//! - Configuration and hardware timing constants
//! - Two-point calibration record and its persisted envelope
//! - Capacitance to moisture percentage mapping
//! - Half-weight smoothing filter for noisy samples
//! - Readings and their uplink payload encoding
//! - Sensor power state machine

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod filter;
pub mod moisture;
pub mod power;
pub mod reading;

pub use config::{CalibrationRecord, SamplingConfig, SoilConfig, Timing};
pub use filter::HalfWeightFilter;
pub use moisture::moisture_percent;
pub use power::{PowerEvent, PowerState};
pub use reading::Reading;
