//! embedded-hal adapters
//!
//! Lets any `embedded_hal` 1.0 I2C bus and output pin drive the sensor
//! without board-specific glue.

use core::convert::Infallible;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};
use heapless::{Deque, Vec};

use crate::gpio::OutputPin;
use crate::i2c::{
    TwoWire, STATUS_ADDRESS_NACK, STATUS_DATA_NACK, STATUS_DATA_TOO_LONG, STATUS_OK, STATUS_OTHER,
};

/// Transmit/receive buffer size, same as the classic Wire library
pub const WIRE_BUFFER_LEN: usize = 32;

/// Map an embedded-hal I2C error kind to a Wire status code
pub fn status_for(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => STATUS_ADDRESS_NACK,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => STATUS_DATA_NACK,
        ErrorKind::NoAcknowledge(_) => STATUS_ADDRESS_NACK,
        _ => STATUS_OTHER,
    }
}

/// Wire-style transport over an embedded-hal I2C bus
///
/// Writes are collected until [`TwoWire::end_write`] and sent as one
/// transaction. [`TwoWire::request_read`] performs the whole read and
/// parks the bytes in a queue; if the read fails the queue stays empty.
pub struct WireI2c<I2C> {
    i2c: I2C,
    address: u8,
    tx: Vec<u8, WIRE_BUFFER_LEN>,
    overflow: bool,
    rx: Deque<u8, WIRE_BUFFER_LEN>,
}

impl<I2C: I2c> WireI2c<I2C> {
    /// Wrap an I2C bus
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: 0,
            tx: Vec::new(),
            overflow: false,
            rx: Deque::new(),
        }
    }

    /// Give the I2C bus back
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> TwoWire for WireI2c<I2C> {
    fn begin(&mut self) {
        self.tx.clear();
        self.rx.clear();
        self.overflow = false;
    }

    fn end(&mut self) {
        self.tx.clear();
        self.rx.clear();
    }

    fn begin_write(&mut self, address: u8) {
        self.address = address;
        self.tx.clear();
        self.overflow = false;
    }

    fn write_byte(&mut self, byte: u8) {
        if self.tx.push(byte).is_err() {
            self.overflow = true;
        }
    }

    fn end_write(&mut self) -> u8 {
        if self.overflow {
            self.tx.clear();
            return STATUS_DATA_TOO_LONG;
        }

        let status = match self.i2c.write(self.address, &self.tx) {
            Ok(()) => STATUS_OK,
            Err(e) => status_for(e.kind()),
        };
        self.tx.clear();
        status
    }

    fn request_read(&mut self, address: u8, count: usize) {
        self.rx.clear();

        let count = count.min(WIRE_BUFFER_LEN);
        let mut buf = [0u8; WIRE_BUFFER_LEN];
        if self.i2c.read(address, &mut buf[..count]).is_err() {
            return;
        }

        for &byte in &buf[..count] {
            // Capacity equals the clamp above, push cannot fail
            let _ = self.rx.push_back(byte);
        }
    }

    fn byte_available(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or(0)
    }
}

/// Infallible embedded-hal output pin as a Humus [`OutputPin`]
pub struct HalPin<P> {
    pin: P,
    high: bool,
}

impl<P> HalPin<P>
where
    P: embedded_hal::digital::OutputPin<Error = Infallible>,
{
    /// Wrap a pin, driving it to a known low level
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> OutputPin for HalPin<P>
where
    P: embedded_hal::digital::OutputPin<Error = Infallible>,
{
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}
