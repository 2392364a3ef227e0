//! Register transaction layer
//!
//! Every exchange with the sensor is one of two shapes:
//!
//! ```text
//! write:  START addr+W  REG  DATA  STOP            (status checked)
//! read:   START addr+W  REG  STOP                  (status checked)
//!         ... settle (>= 20 ms, device prepares data) ...
//!         START addr+R  D0 .. Dn-1  STOP           (1000 ms watchdog)
//! ```
//!
//! The settle delay and both failure checks are part of the device
//! contract. Without them reads intermittently return stale or torn data.

use humus_core::config::Timing;
use humus_hal::i2c::STATUS_OK;
use humus_hal::{Clock, TwoWire};

use super::registers::Register;

/// Bus transaction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The write phase reported a non-zero status
    TransmissionFailed(u8),
    /// The watchdog expired before all bytes arrived
    ShortRead {
        /// Bytes requested
        expected: u8,
        /// Bytes collected before the watchdog
        received: u8,
    },
    /// Moisture mapping with equal dry and wet endpoints
    DivideByZero,
}

/// Timed register access to devices on one bus
///
/// Holds the bus exclusively; a transaction runs to completion before
/// the next one starts.
pub struct RegisterBus<B, C> {
    bus: B,
    clock: C,
    timing: Timing,
}

impl<B: TwoWire, C: Clock> RegisterBus<B, C> {
    /// Create a register bus
    pub fn new(bus: B, clock: C, timing: Timing) -> Self {
        Self { bus, clock, timing }
    }

    /// Bring up the underlying bus
    pub fn open(&mut self) {
        self.bus.begin();
    }

    /// Release the underlying bus
    pub fn close(&mut self) {
        self.bus.end();
    }

    /// Get access to the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Get the timing in use
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Give the bus and clock back
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }

    /// Write one byte to a register
    pub fn write_register(
        &mut self,
        address: u8,
        register: Register,
        value: u8,
    ) -> Result<(), BusError> {
        self.bus.begin_write(address);
        self.bus.write_byte(register.code());
        self.bus.write_byte(value);
        self.finish_write(address, register)
    }

    /// Read `N` bytes from a register
    ///
    /// Selects the register, waits the settle delay, then collects bytes
    /// until `N` have arrived or the read watchdog expires.
    pub fn read_register<const N: usize>(
        &mut self,
        address: u8,
        register: Register,
    ) -> Result<[u8; N], BusError> {
        self.bus.begin_write(address);
        self.bus.write_byte(register.code());
        self.finish_write(address, register)?;

        self.clock.sleep_ms(self.timing.settle_ms as u64);
        self.bus.request_read(address, N);

        let mut data = [0u8; N];
        let mut received = 0;
        let start = self.clock.now_ms();
        let watchdog = self.timing.read_watchdog_ms as u64;
        let poll = self.timing.read_poll_ms.max(1) as u64;

        while received < N {
            if self.bus.byte_available() {
                data[received] = self.bus.read_byte();
                received += 1;
            } else if self.clock.elapsed_since(start) > watchdog {
                break;
            } else {
                self.clock.sleep_ms(poll);
            }
        }

        if received < N {
            debug!(
                "short read from {}: register {}, {} of {} bytes",
                address,
                register.code(),
                received,
                N
            );
            return Err(BusError::ShortRead {
                expected: N as u8,
                received: received as u8,
            });
        }

        trace!("read register {} from {}", register.code(), address);
        Ok(data)
    }

    fn finish_write(&mut self, address: u8, register: Register) -> Result<(), BusError> {
        let status = self.bus.end_write();
        if status != STATUS_OK {
            debug!(
                "write to {} register {} failed, status {}",
                address,
                register.code(),
                status
            );
            return Err(BusError::TransmissionFailed(status));
        }
        Ok(())
    }
}
