//! Hardware driver implementations
//!
//! This crate drives the RAK12035 capacitive soil moisture sensor over
//! the traits in humus-hal and the logic in humus-core:
//!
//! - Register transactions with settle delay and read watchdog
//! - Power and reset sequencing with bounded readiness polling
//! - Sensor session (version, capacitance, temperature, addressing)
//! - Calibration engine and persisted calibration store
//! - Monitor tying it together the way a sensor node uses it

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod soil;
