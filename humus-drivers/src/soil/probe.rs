//! Soil probe trait
//!
//! The calibration engine samples through this trait rather than a
//! concrete session, so it can be driven by any device (or a scripted
//! double) that yields capacitance and temperature.

use humus_core::config::CalibrationRecord;

use super::bus::BusError;
use super::power::PowerError;

/// A capacitive soil probe with a temperature channel
pub trait SoilProbe {
    /// Read the raw capacitance
    fn capacitance(&mut self) -> Result<u16, BusError>;

    /// Read the temperature (°C × 10)
    fn temperature_x10(&mut self) -> Result<i16, BusError>;

    /// Calibration used to turn capacitance into moisture
    fn calibration(&self) -> CalibrationRecord;

    /// Power the probe and wait until it answers
    fn wake(&mut self) -> Result<(), PowerError>;

    /// Power the probe down
    fn sleep(&mut self);

    /// Map a capacitance with this probe's calibration
    fn moisture_for(&self, capacitance: u16) -> Result<u8, BusError> {
        self.calibration()
            .moisture_percent(capacitance)
            .ok_or(BusError::DivideByZero)
    }

    /// Read capacitance and map it to moisture
    ///
    /// Returns `(capacitance, moisture_pct)`. A degenerate calibration
    /// fails with [`BusError::DivideByZero`] before the probe is read.
    fn moisture(&mut self) -> Result<(u16, u8), BusError> {
        if self.calibration().is_degenerate() {
            return Err(BusError::DivideByZero);
        }
        let capacitance = self.capacitance()?;
        let moisture = self.moisture_for(capacitance)?;
        Ok((capacitance, moisture))
    }
}
