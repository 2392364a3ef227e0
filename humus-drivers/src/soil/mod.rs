//! RAK12035 soil moisture sensor
//!
//! Layers, leaf first:
//!
//! - [`bus`]: timed register read/write exchanges
//! - [`power`]: power-enable and reset lines, readiness polling
//! - [`session`]: the addressable device
//! - [`sampler`]: smoothed readings and calibration runs
//! - [`store`]: persisted calibration endpoints
//! - [`monitor`]: init/read/calibrate flow for a sensor node

pub mod bus;
pub mod monitor;
pub mod power;
pub mod probe;
pub mod registers;
pub mod retry;
pub mod sampler;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod mock;

pub use bus::{BusError, RegisterBus};
pub use monitor::SoilMonitor;
pub use power::{PowerError, PowerSequencer};
pub use probe::SoilProbe;
pub use registers::Register;
pub use retry::{Retry, RetryExhausted};
pub use sampler::{CalibrateError, CalibrationEngine, SampleError};
pub use session::{AddressError, SensorSession};
pub use store::{CalibrationStore, StoreError, CALIBRATION_BLOB};
