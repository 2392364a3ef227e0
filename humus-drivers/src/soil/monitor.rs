//! Sensor node flow
//!
//! Ties the session, calibration store and calibration engine together
//! the way a sensor node uses them:
//!
//! - `init` at boot: detect the sensor, load calibration, power down
//! - `read` per uplink cycle: wake, smoothed sample, power down
//! - `calibrate` on command: measure an endpoint, persist it if it moved
//!
//! The bus is opened and closed around every operation so it can be shared
//! with other peripherals between cycles.

use humus_core::config::{CalibrationRecord, SamplingConfig};
use humus_core::Reading;
use humus_hal::{BlobStore, Clock, OutputPin, TwoWire};

use super::probe::SoilProbe;
use super::sampler::{CalibrateError, CalibrationEngine};
use super::session::SensorSession;
use super::store::CalibrationStore;

/// One soil sensor with persisted calibration
pub struct SoilMonitor<B, P, R, C, S> {
    session: SensorSession<B, P, R, C>,
    store: CalibrationStore<S>,
    engine: CalibrationEngine<C>,
    found: bool,
}

impl<B, P, R, C, S> SoilMonitor<B, P, R, C, S>
where
    B: TwoWire,
    P: OutputPin,
    R: OutputPin,
    C: Clock + Clone,
    S: BlobStore,
{
    /// Create a monitor; nothing touches the hardware until [`Self::init`]
    pub fn new(
        session: SensorSession<B, P, R, C>,
        store: CalibrationStore<S>,
        sampling: SamplingConfig,
    ) -> Self {
        let engine = CalibrationEngine::new(session.clock().clone(), sampling);
        Self {
            session,
            store,
            engine,
            found: false,
        }
    }

    /// Whether the last [`Self::init`] found the sensor
    pub fn is_found(&self) -> bool {
        self.found
    }

    /// The underlying session
    pub fn session(&mut self) -> &mut SensorSession<B, P, R, C> {
        &mut self.session
    }

    /// Current calibration
    pub fn calibration(&self) -> CalibrationRecord {
        self.session.calibration()
    }

    /// Current dry or wet endpoint
    pub fn endpoint(&self, is_dry: bool) -> u16 {
        self.session.calibration().endpoint(is_dry)
    }

    /// Give the session and store back
    pub fn release(self) -> (SensorSession<B, P, R, C>, CalibrationStore<S>) {
        (self.session, self.store)
    }

    /// Detect the sensor and load its calibration
    ///
    /// Calibration is loaded even when no sensor answers, so a sensor that
    /// shows up later is read with the stored endpoints.
    pub fn init(&mut self) -> bool {
        self.session.open_bus();

        self.found = match self.session.begin() {
            Ok(()) => {
                match self.session.get_version() {
                    Ok(version) => info!("soil sensor found, firmware {}", version),
                    Err(_) => info!("soil sensor found"),
                }
                true
            }
            Err(_) => {
                warn!("no soil sensor found");
                false
            }
        };

        let record = self.store.load();
        self.session.set_calibration(record);

        self.session.power_down();
        self.session.close_bus();
        self.found
    }

    /// Take one smoothed reading
    ///
    /// Returns [`Reading::invalid`] when the sensor does not wake or no
    /// sample could be taken.
    pub fn read(&mut self) -> Reading {
        self.session.open_bus();

        let reading = match self.session.wake() {
            Ok(()) => {
                let cycles = self.engine.sampling().smoothing_cycles;
                match self.engine.sample_smoothed(&mut self.session, cycles) {
                    Ok(reading) => reading,
                    Err(e) => {
                        warn!("soil reading failed: {:?}", e);
                        Reading::invalid()
                    }
                }
            }
            Err(_) => {
                warn!("soil sensor did not wake");
                Reading::invalid()
            }
        };

        self.session.power_down();
        self.session.close_bus();
        reading
    }

    /// Calibrate the dry or wet endpoint
    ///
    /// The measured value replaces the endpoint in memory and in storage
    /// only if it differs from the current one. A failed save is logged;
    /// the in-memory endpoint stays updated. If the sensor cannot be read
    /// at all, the current endpoint is returned unchanged.
    pub fn calibrate(&mut self, is_dry: bool) -> u16 {
        let current = self.endpoint(is_dry);

        self.session.open_bus();
        let measured = self.engine.run_calibration(&mut self.session, is_dry);
        if measured.is_err() {
            self.session.power_down();
        }
        self.session.close_bus();

        let value = match measured {
            Ok(value) => value,
            Err(CalibrateError::Power(_)) => {
                warn!("calibration skipped, sensor did not wake");
                return current;
            }
            Err(CalibrateError::Sample(_)) => {
                warn!("calibration skipped, no reading");
                return current;
            }
        };

        if value != current {
            let mut record = self.session.calibration();
            record.set_endpoint(is_dry, value);
            self.session.set_calibration(record);

            if let Err(e) = self.store.save(record) {
                error!("failed to save calibration: {:?}", e);
            }
        } else {
            debug!("calibration unchanged at {}", value);
        }

        value
    }
}
