//! GPIO pin abstractions
//!
//! The sensor only needs outputs: a primary power-enable line and a
//! second line that is both the secondary enable and the reset.

/// Pin direction/mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Push-pull output
    Output,
    /// Floating input
    Input,
}

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Reconfigure the pin mode
    ///
    /// Pins whose mode is fixed by their type can ignore this.
    fn configure(&mut self, _mode: PinMode) {}
}

impl<T: OutputPin + ?Sized> OutputPin for &mut T {
    fn set_high(&mut self) {
        T::set_high(self)
    }

    fn set_low(&mut self) {
        T::set_low(self)
    }

    fn is_set_high(&self) -> bool {
        T::is_set_high(self)
    }

    fn configure(&mut self, mode: PinMode) {
        T::configure(self, mode)
    }
}
