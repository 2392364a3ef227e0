//! Monotonic time source
//!
//! All protocol delays and watchdogs are measured on a [`Clock`]. The
//! methods take `&self` so the bus layer and the power sequencer can
//! share one clock by reference.

/// Monotonic millisecond clock with blocking sleep
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin
    fn now_ms(&self) -> u64;

    /// Block the caller for at least `ms` milliseconds
    fn sleep_ms(&self, ms: u64);

    /// Milliseconds elapsed since `start` (as returned by `now_ms`)
    fn elapsed_since(&self, start: u64) -> u64 {
        self.now_ms().saturating_sub(start)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        T::now_ms(self)
    }

    fn sleep_ms(&self, ms: u64) {
        T::sleep_ms(self, ms)
    }
}

/// Host clock backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}

/// Blocking clock on top of the embassy time driver
///
/// Sleeps busy-wait with `block_for`, matching the blocking model of the
/// driver; it does not yield to an executor.
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }

    fn sleep_ms(&self, ms: u64) {
        embassy_time::block_for(embassy_time::Duration::from_millis(ms));
    }
}
