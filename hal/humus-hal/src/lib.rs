//! Humus Hardware Abstraction Layer
//!
//! This crate defines the narrow hardware interfaces the soil sensor
//! driver calls through. Board support code implements them (or uses the
//! embedded-hal adapters in [`embedded`]) so the same driver runs on any
//! MCU with a two-wire bus, two GPIO lines and somewhere to keep a blob.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (scheduler, uplink, ...)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  humus-drivers (RAK12035 session)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  humus-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │ board-specific│
//! │   adapters    │       │     impls     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::TwoWire`] - Wire-style two-wire bus transport
//! - [`gpio::OutputPin`] - Digital output (power and reset lines)
//! - [`clock::Clock`] - Monotonic milliseconds and blocking sleep
//! - [`flash::BlobStore`] - Persistent named blobs

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod clock;
pub mod embedded;
pub mod flash;
pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use flash::{BlobStore, FlashError};
pub use gpio::{OutputPin, PinMode};
pub use i2c::TwoWire;
