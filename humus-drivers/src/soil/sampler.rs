//! Smoothed sampling and calibration runs
//!
//! Both operations fold samples through a [`HalfWeightFilter`]. The result
//! follows the last few samples, not the mean of the run; that is the
//! low-pass behavior the sensor's bus noise calls for.
//!
//! Seeding: the first good sample becomes the filter value as-is, and
//! every later sample is folded against it with weight 1/2.

use humus_core::config::SamplingConfig;
use humus_core::{HalfWeightFilter, Reading};
use humus_hal::Clock;

use super::power::PowerError;
use super::probe::SoilProbe;

/// Sampling errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleError {
    /// Every attempt failed to produce a first reading
    NoValidReading,
}

/// Calibration run errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrateError {
    /// The probe did not wake
    Power(PowerError),
    /// No initial capacitance reading could be taken
    Sample(SampleError),
}

impl From<PowerError> for CalibrateError {
    fn from(e: PowerError) -> Self {
        CalibrateError::Power(e)
    }
}

impl From<SampleError> for CalibrateError {
    fn from(e: SampleError) -> Self {
        CalibrateError::Sample(e)
    }
}

/// Runs smoothed reads and calibration passes against a probe
pub struct CalibrationEngine<C> {
    clock: C,
    sampling: SamplingConfig,
}

impl<C: Clock> CalibrationEngine<C> {
    /// Create an engine
    pub fn new(clock: C, sampling: SamplingConfig) -> Self {
        Self { clock, sampling }
    }

    /// Sampling parameters in use
    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// Take one smoothed reading
    ///
    /// Makes up to `attempts` tries for a first (moisture, temperature)
    /// pair, then folds `cycles` more rounds of temperature and
    /// capacitance/moisture into it. A failed read inside a round keeps
    /// the previous value for that channel. The probe must already be
    /// awake.
    ///
    /// A degenerate calibration (dry == wet) can never yield a moisture
    /// value; it fails with [`SampleError::NoValidReading`] without
    /// reading the probe.
    pub fn sample_smoothed<P: SoilProbe>(
        &self,
        probe: &mut P,
        cycles: u32,
    ) -> Result<Reading, SampleError> {
        if probe.calibration().is_degenerate() {
            warn!("calibration endpoints are equal, moisture undefined");
            return Err(SampleError::NoValidReading);
        }

        let (capacitance, moisture, temperature) =
            first_reading(probe, self.sampling.attempts).ok_or(SampleError::NoValidReading)?;

        let mut capacitance = HalfWeightFilter::seeded(capacitance as i32);
        let mut moisture = HalfWeightFilter::seeded(moisture as i32);
        let mut temperature = HalfWeightFilter::seeded(temperature as i32);

        for _ in 0..cycles {
            if let Ok(t) = probe.temperature_x10() {
                temperature.update(t as i32);
            }
            if let Ok((c, m)) = probe.moisture() {
                capacitance.update(c as i32);
                moisture.update(m as i32);
            }
        }

        let reading = Reading::new(
            filtered(capacitance) as u16,
            filtered(temperature) as i16,
            filtered(moisture) as u8,
        );
        debug!(
            "sampled cap {} temp {} moist {}",
            reading.capacitance,
            reading.temperature_x10,
            reading.moisture_pct
        );
        Ok(reading)
    }

    /// Calibrate one endpoint with the configured sample count and cadence
    pub fn run_calibration<P: SoilProbe>(
        &self,
        probe: &mut P,
        is_dry: bool,
    ) -> Result<u16, CalibrateError> {
        self.run_calibration_with(
            probe,
            is_dry,
            self.sampling.calibration_samples,
            self.sampling.calibration_delay_ms,
        )
    }

    /// Calibrate one endpoint
    ///
    /// Wakes the probe, takes an initial capacitance reading, folds in
    /// `sample_count` more with `delay_ms` between them and puts the probe
    /// back to sleep. The smoothed value is returned; persisting it is up
    /// to the caller.
    pub fn run_calibration_with<P: SoilProbe>(
        &self,
        probe: &mut P,
        is_dry: bool,
        sample_count: u32,
        delay_ms: u32,
    ) -> Result<u16, CalibrateError> {
        let which = if is_dry { "dry" } else { "wet" };
        info!("calibrating {} endpoint, {} samples", which, sample_count);

        if let Err(e) = probe.wake() {
            warn!("calibration aborted, sensor did not wake");
            return Err(e.into());
        }

        let seed = (0..self.sampling.attempts.max(1)).find_map(|_| probe.capacitance().ok());
        let Some(seed) = seed else {
            probe.sleep();
            return Err(SampleError::NoValidReading.into());
        };

        let mut value = HalfWeightFilter::seeded(seed as i32);
        for _ in 0..sample_count {
            if let Ok(c) = probe.capacitance() {
                value.update(c as i32);
            }
            self.clock.sleep_ms(delay_ms as u64);
        }

        probe.sleep();

        let endpoint = filtered(value) as u16;
        info!("{} endpoint measured at {}", which, endpoint);
        Ok(endpoint)
    }
}

fn first_reading<P: SoilProbe>(probe: &mut P, attempts: u8) -> Option<(u16, u8, i16)> {
    (0..attempts.max(1)).find_map(|_| {
        let (capacitance, moisture) = probe.moisture().ok()?;
        let temperature = probe.temperature_x10().ok()?;
        Some((capacitance, moisture, temperature))
    })
}

fn filtered(filter: HalfWeightFilter) -> i32 {
    filter.value().unwrap_or_default()
}
