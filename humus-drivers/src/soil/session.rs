//! RAK12035 sensor session
//!
//! One session per physical sensor. It owns the sensor's bus address and
//! calibration endpoints and speaks the register protocol through a
//! [`RegisterBus`], with a [`PowerSequencer`] for the power lines.
//!
//! # Address changes
//!
//! [`SensorSession::set_bus_address`] reprograms the device. The new
//! address takes effect on the device after a reset, which the session
//! issues itself; the caller must then re-establish readiness with
//! [`SensorSession::power_up_and_wait`] before any other transaction.

use humus_core::config::{is_valid_address, CalibrationRecord, SoilConfig, Timing};
use humus_core::power::PowerState;
use humus_hal::{Clock, OutputPin, TwoWire};

use super::bus::{BusError, RegisterBus};
use super::power::{PowerError, PowerSequencer};
use super::probe::SoilProbe;
use super::registers::Register;

/// Address reprogramming errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressError {
    /// Address outside 1..=127
    OutOfRange(u8),
    /// The address write failed on the bus
    Bus(BusError),
}

impl From<BusError> for AddressError {
    fn from(e: BusError) -> Self {
        AddressError::Bus(e)
    }
}

/// Addressable RAK12035 device
pub struct SensorSession<B, P, R, C> {
    bus: RegisterBus<B, C>,
    power: PowerSequencer<P, R, C>,
    address: u8,
    calibration: CalibrationRecord,
}

impl<B, P, R, C> SensorSession<B, P, R, C>
where
    B: TwoWire,
    P: OutputPin,
    R: OutputPin,
    C: Clock + Clone,
{
    /// Create a session
    ///
    /// # Arguments
    /// - `bus`: Two-wire transport the sensor is on
    /// - `power_pin`: Primary power enable
    /// - `reset_pin`: Secondary enable / reset line
    /// - `clock`: Monotonic clock, shared by the bus and power layers
    /// - `config`: Address, timing and default calibration
    pub fn new(
        bus: B,
        power_pin: P,
        reset_pin: R,
        clock: C,
        config: &SoilConfig,
    ) -> Result<Self, AddressError> {
        if !is_valid_address(config.address) {
            return Err(AddressError::OutOfRange(config.address));
        }

        Ok(Self {
            bus: RegisterBus::new(bus, clock.clone(), config.timing),
            power: PowerSequencer::new(power_pin, reset_pin, clock, config.timing),
            address: config.address,
            calibration: config.defaults,
        })
    }

    /// Bus address the session talks to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Current calibration endpoints
    pub fn calibration(&self) -> CalibrationRecord {
        self.calibration
    }

    /// Replace both calibration endpoints
    pub fn set_calibration(&mut self, record: CalibrationRecord) {
        self.calibration = record;
    }

    /// Set the capacitance that maps to 0 %
    pub fn set_dry_endpoint(&mut self, value: u16) {
        self.calibration.dry_endpoint = value;
    }

    /// Set the capacitance that maps to 100 %
    pub fn set_wet_endpoint(&mut self, value: u16) {
        self.calibration.wet_endpoint = value;
    }

    /// Current power state
    pub fn power_state(&self) -> PowerState {
        self.power.state()
    }

    /// Timing in use
    pub fn timing(&self) -> &Timing {
        self.bus.timing()
    }

    /// Clock in use
    pub fn clock(&self) -> &C {
        self.bus.clock()
    }

    /// Bring up the bus peripheral
    pub fn open_bus(&mut self) {
        self.bus.open();
    }

    /// Release the bus peripheral
    pub fn close_bus(&mut self) {
        self.bus.close();
    }

    /// Give the transport, pins and clock back
    pub fn release(self) -> (B, P, R, C) {
        let (bus, clock) = self.bus.release();
        let (power, reset, _) = self.power.release();
        (bus, power, reset, clock)
    }

    /// Cold start: power, reset, boot wait, poll for readiness
    pub fn begin(&mut self) -> Result<(), PowerError> {
        let address = self.address;
        let bus = &mut self.bus;
        self.power
            .cold_start(|| bus.read_register::<1>(address, Register::GetVersion).is_ok())
    }

    /// Power the sensor and poll the version query until it answers
    pub fn power_up_and_wait(&mut self, timeout_ms: u32) -> Result<(), PowerError> {
        let address = self.address;
        let bus = &mut self.bus;
        self.power.power_up_and_wait(timeout_ms, || {
            bus.read_register::<1>(address, Register::GetVersion).is_ok()
        })
    }

    /// Power the sensor down
    pub fn power_down(&mut self) {
        self.power.power_down();
    }

    /// Pulse the reset line
    pub fn reset(&mut self) {
        self.power.reset();
    }

    /// Read the firmware version
    pub fn get_version(&mut self) -> Result<u8, BusError> {
        let [version] = self
            .bus
            .read_register::<1>(self.address, Register::GetVersion)?;
        Ok(version)
    }

    /// Read the raw capacitance
    pub fn get_capacitance(&mut self) -> Result<u16, BusError> {
        let data = self
            .bus
            .read_register::<2>(self.address, Register::GetCapacitance)?;
        Ok(u16::from_be_bytes(data))
    }

    /// Read the temperature (°C × 10)
    pub fn get_temperature(&mut self) -> Result<i16, BusError> {
        let data = self
            .bus
            .read_register::<2>(self.address, Register::GetTemperature)?;
        Ok(i16::from_be_bytes(data))
    }

    /// Read capacitance and map it to 0-100 % between `dry` and `wet`
    ///
    /// Equal endpoints fail with [`BusError::DivideByZero`] before any
    /// bus traffic.
    pub fn get_moisture_pct(&mut self, dry: u16, wet: u16) -> Result<u8, BusError> {
        if dry == wet {
            return Err(BusError::DivideByZero);
        }
        let capacitance = self.get_capacitance()?;
        CalibrationRecord::new(dry, wet)
            .moisture_percent(capacitance)
            .ok_or(BusError::DivideByZero)
    }

    /// Read moisture with the session's own endpoints
    pub fn get_moisture(&mut self) -> Result<u8, BusError> {
        let CalibrationRecord {
            dry_endpoint,
            wet_endpoint,
        } = self.calibration;
        self.get_moisture_pct(dry_endpoint, wet_endpoint)
    }

    /// Ask the device which address it answers on
    pub fn get_bus_address(&mut self) -> Result<u8, BusError> {
        let [address] = self
            .bus
            .read_register::<1>(self.address, Register::GetI2cAddress)?;
        Ok(address)
    }

    /// Reprogram the device address
    ///
    /// On success the session follows the device to the new address and
    /// resets it; readiness must be re-established before further use.
    /// Out-of-range addresses are rejected without touching the bus.
    pub fn set_bus_address(&mut self, new_address: u8) -> Result<(), AddressError> {
        if !is_valid_address(new_address) {
            return Err(AddressError::OutOfRange(new_address));
        }

        self.bus
            .write_register(self.address, Register::SetI2cAddress, new_address)?;

        info!("sensor address {} -> {}", self.address, new_address);
        self.address = new_address;
        self.power.reset();
        Ok(())
    }

    /// Talk to a different address without reprogramming the device
    pub fn use_bus_address(&mut self, address: u8) -> Result<(), AddressError> {
        if !is_valid_address(address) {
            return Err(AddressError::OutOfRange(address));
        }
        self.address = address;
        Ok(())
    }
}

impl<B, P, R, C> SoilProbe for SensorSession<B, P, R, C>
where
    B: TwoWire,
    P: OutputPin,
    R: OutputPin,
    C: Clock + Clone,
{
    fn capacitance(&mut self) -> Result<u16, BusError> {
        self.get_capacitance()
    }

    fn temperature_x10(&mut self) -> Result<i16, BusError> {
        self.get_temperature()
    }

    fn calibration(&self) -> CalibrationRecord {
        self.calibration
    }

    fn wake(&mut self) -> Result<(), PowerError> {
        let timeout_ms = self.timing().wake_timeout_ms;
        self.power_up_and_wait(timeout_ms)
    }

    fn sleep(&mut self) {
        self.power_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soil::mock::{SimClock, SimPin, SimSensor};
    use humus_core::config::DEFAULT_ADDRESS;
    use humus_hal::i2c::STATUS_ADDRESS_NACK;

    type TestSession<'a> = SensorSession<SimSensor, SimPin, SimPin, &'a SimClock>;

    fn session(sensor: SimSensor, clock: &SimClock) -> TestSession<'_> {
        SensorSession::new(
            sensor,
            SimPin::default(),
            SimPin::default(),
            clock,
            &SoilConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_start_address() {
        let clock = SimClock::new();
        let config = SoilConfig {
            address: 0,
            ..SoilConfig::default()
        };
        let result = SensorSession::new(
            SimSensor::new(),
            SimPin::default(),
            SimPin::default(),
            &clock,
            &config,
        );
        assert!(matches!(result, Err(AddressError::OutOfRange(0))));
    }

    #[test]
    fn test_version() {
        let clock = SimClock::new();
        let mut sensor = SimSensor::new();
        sensor.version = 7;
        let mut session = session(sensor, &clock);
        assert_eq!(session.get_version(), Ok(7));
    }

    #[test]
    fn test_capacitance_and_temperature() {
        let clock = SimClock::new();
        let mut sensor = SimSensor::with_capacitance(&[412]);
        sensor.temperature_x10 = -35;
        let mut session = session(sensor, &clock);

        assert_eq!(session.get_capacitance(), Ok(412));
        assert_eq!(session.get_temperature(), Ok(-35));
    }

    #[test]
    fn test_moisture_scenarios() {
        let clock = SimClock::new();
        let mut session = session(SimSensor::with_capacitance(&[300, 600, 100]), &clock);

        assert_eq!(session.get_moisture_pct(200, 500), Ok(33));
        assert_eq!(session.get_moisture_pct(200, 500), Ok(100));
        assert_eq!(session.get_moisture_pct(200, 500), Ok(0));
    }

    #[test]
    fn test_moisture_equal_endpoints() {
        let clock = SimClock::new();
        let mut session = session(SimSensor::new(), &clock);

        assert_eq!(
            session.get_moisture_pct(300, 300),
            Err(BusError::DivideByZero)
        );
        let (sensor, _, _, _) = session.release();
        assert_eq!(sensor.write_count(), 0);
    }

    #[test]
    fn test_moisture_uses_session_endpoints() {
        let clock = SimClock::new();
        let mut session = session(SimSensor::with_capacitance(&[175]), &clock);
        session.set_dry_endpoint(75);
        session.set_wet_endpoint(275);

        assert_eq!(session.get_moisture(), Ok(50));
        assert_eq!(session.calibration(), CalibrationRecord::new(75, 275));
    }

    #[test]
    fn test_read_failure_propagates() {
        let clock = SimClock::new();
        let mut sensor = SimSensor::new();
        sensor.nack_writes = vec![0];
        let mut session = session(sensor, &clock);

        assert_eq!(
            session.get_capacitance(),
            Err(BusError::TransmissionFailed(STATUS_ADDRESS_NACK))
        );
    }

    #[test]
    fn test_set_bus_address_out_of_range() {
        let clock = SimClock::new();
        let mut session = session(SimSensor::new(), &clock);

        assert_eq!(
            session.set_bus_address(200),
            Err(AddressError::OutOfRange(200))
        );
        assert_eq!(session.set_bus_address(0), Err(AddressError::OutOfRange(0)));
        assert_eq!(session.address(), DEFAULT_ADDRESS);

        let (sensor, _, _, _) = session.release();
        assert!(sensor.writes.is_empty());
    }

    #[test]
    fn test_set_bus_address_reprograms_and_resets() {
        let clock = SimClock::new();
        let mut session = session(SimSensor::new(), &clock);

        session.set_bus_address(0x21).unwrap();

        assert_eq!(session.address(), 0x21);
        assert_eq!(session.power_state(), PowerState::Unready);

        let (sensor, _, reset, _) = session.release();
        assert_eq!(sensor.programmed_address, Some(0x21));
        assert_eq!(reset.history, vec![false, true]);
    }

    #[test]
    fn test_set_bus_address_write_failure() {
        let clock = SimClock::new();
        let mut sensor = SimSensor::new();
        sensor.nack_writes = vec![0];
        let mut session = session(sensor, &clock);

        assert_eq!(
            session.set_bus_address(0x21),
            Err(AddressError::Bus(BusError::TransmissionFailed(
                STATUS_ADDRESS_NACK
            )))
        );
        assert_eq!(session.address(), DEFAULT_ADDRESS);
        assert_eq!(session.power_state(), PowerState::Off);
    }

    #[test]
    fn test_address_change_needs_device_to_follow() {
        let clock = SimClock::new();
        let mut session = session(SimSensor::new(), &clock);
        session.set_bus_address(0x21).unwrap();

        // The simulated device has not moved yet, so it no longer answers
        assert!(session.get_version().is_err());
    }

    #[test]
    fn test_use_bus_address() {
        let clock = SimClock::new();
        let mut sensor = SimSensor::new();
        sensor.address = 0x30;
        let mut session = session(sensor, &clock);

        assert!(session.get_version().is_err());
        session.use_bus_address(0x30).unwrap();
        assert_eq!(session.get_version(), Ok(3));
        assert_eq!(session.get_bus_address(), Ok(0x30));
        assert_eq!(
            session.use_bus_address(128),
            Err(AddressError::OutOfRange(128))
        );
    }

    #[test]
    fn test_power_up_polls_version() {
        let clock = SimClock::new();
        let mut sensor = SimSensor::new();
        // Device boots after two NACKed polls
        sensor.nack_writes = vec![0, 1];
        let mut session = session(sensor, &clock);

        assert_eq!(session.power_up_and_wait(5000), Ok(()));
        assert!(session.power_state().is_ready());

        let (sensor, power, reset, _) = session.release();
        assert_eq!(sensor.write_count(), 3);
        assert!(power.is_set_high());
        assert!(reset.is_set_high());
    }

    #[test]
    fn test_power_up_timeout() {
        let clock = SimClock::new();
        let mut sensor = SimSensor::new();
        sensor.silent = true;
        let mut session = session(sensor, &clock);

        assert_eq!(session.power_up_and_wait(5000), Err(PowerError::Timeout));
        assert!(!session.power_state().is_ready());
    }

    #[test]
    fn test_begin() {
        let clock = SimClock::new();
        let mut session = session(SimSensor::new(), &clock);

        assert_eq!(session.begin(), Ok(()));
        assert!(session.power_state().is_ready());

        session.power_down();
        assert_eq!(session.power_state(), PowerState::Off);
    }
}
