//! Two-wire bus abstractions
//!
//! Models a master-side bus the way Arduino's `Wire` exposes it: a write
//! phase that is buffered and committed by [`TwoWire::end_write`], and a
//! read phase where the requested bytes trickle into a receive queue.
//! The RAK12035 protocol timing is defined in these terms, so the driver
//! is written against them rather than against a combined write-read.

/// `end_write` status for a successful transmission
pub const STATUS_OK: u8 = 0;
/// Data too long to fit in the transmit buffer
pub const STATUS_DATA_TOO_LONG: u8 = 1;
/// Address byte was not acknowledged
pub const STATUS_ADDRESS_NACK: u8 = 2;
/// Data byte was not acknowledged
pub const STATUS_DATA_NACK: u8 = 3;
/// Any other bus error
pub const STATUS_OTHER: u8 = 4;

/// Two-wire bus master
///
/// One transaction at a time: holding `&mut` to the bus for the whole
/// write/settle/read exchange is what keeps sessions on a shared bus
/// from interleaving their phases.
pub trait TwoWire {
    /// Bring up the bus peripheral
    fn begin(&mut self);

    /// Release the bus peripheral
    fn end(&mut self);

    /// Start buffering a write to the device at `address` (7-bit)
    fn begin_write(&mut self, address: u8);

    /// Queue one byte for the current write
    fn write_byte(&mut self, byte: u8);

    /// Transmit the buffered write
    ///
    /// Returns [`STATUS_OK`] on success, any other value is a failure
    /// code (see the `STATUS_*` constants).
    fn end_write(&mut self) -> u8;

    /// Request `count` bytes from the device at `address`
    ///
    /// The bytes become available through [`TwoWire::read_byte`].
    /// A device may deliver fewer bytes than requested.
    fn request_read(&mut self, address: u8, count: usize);

    /// Check if a received byte is waiting
    fn byte_available(&mut self) -> bool;

    /// Take the next received byte
    ///
    /// Only meaningful after [`TwoWire::byte_available`] returned true.
    fn read_byte(&mut self) -> u8;
}

impl<T: TwoWire + ?Sized> TwoWire for &mut T {
    fn begin(&mut self) {
        T::begin(self)
    }

    fn end(&mut self) {
        T::end(self)
    }

    fn begin_write(&mut self, address: u8) {
        T::begin_write(self, address)
    }

    fn write_byte(&mut self, byte: u8) {
        T::write_byte(self, byte)
    }

    fn end_write(&mut self) -> u8 {
        T::end_write(self)
    }

    fn request_read(&mut self, address: u8, count: usize) {
        T::request_read(self, address, count)
    }

    fn byte_available(&mut self) -> bool {
        T::byte_available(self)
    }

    fn read_byte(&mut self) -> u8 {
        T::read_byte(self)
    }
}
