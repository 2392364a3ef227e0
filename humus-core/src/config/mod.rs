//! Configuration types
//!
//! Board-agnostic configuration structures. The calibration record is the
//! only piece that is persisted; everything else is fixed at build time
//! or supplied by the application.

pub mod calibration;
pub mod sensor;
pub mod timing;

pub use calibration::*;
pub use sensor::*;
pub use timing::*;
