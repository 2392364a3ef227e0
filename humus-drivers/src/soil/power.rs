//! Power sequencing
//!
//! The sensor hangs off two lines:
//!
//! - `power`: primary power enable (WB_IO2 on the RAK baseboards)
//! - `reset`: secondary enable that doubles as the active-low reset
//!   (WB_IO4)
//!
//! Readiness is never assumed from the pins. After power-up or reset the
//! device is polled with a version query until it answers.

use humus_core::config::Timing;
use humus_core::power::{PowerEvent, PowerState};
use humus_hal::gpio::PinMode;
use humus_hal::{Clock, OutputPin};

use super::retry::Retry;

/// Power sequencing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    /// Device did not answer before the deadline
    Timeout,
}

/// Drives the power and reset lines of one sensor
pub struct PowerSequencer<P, R, C> {
    power: P,
    reset: R,
    clock: C,
    timing: Timing,
    state: PowerState,
}

impl<P: OutputPin, R: OutputPin, C: Clock> PowerSequencer<P, R, C> {
    /// Create a sequencer; the lines are left untouched
    pub fn new(power: P, reset: R, clock: C, timing: Timing) -> Self {
        Self {
            power,
            reset,
            clock,
            timing,
            state: PowerState::Off,
        }
    }

    /// Current power state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Give the pins and clock back
    pub fn release(self) -> (P, R, C) {
        (self.power, self.reset, self.clock)
    }

    /// Pulse the reset line low for the reset hold time
    ///
    /// The device must be polled again with [`Self::power_up_and_wait`]
    /// before it is used.
    pub fn reset(&mut self) {
        self.reset.configure(PinMode::Output);
        self.reset.set_low();
        self.clock.sleep_ms(self.timing.reset_hold_ms as u64);
        self.reset.set_high();
        self.state = self.state.transition(PowerEvent::Reset);
        debug!("sensor reset");
    }

    /// Assert both enable lines and wait for the device to answer
    ///
    /// `probe` is polled until it returns true or `timeout_ms` elapses.
    /// After the first successful probe the boot settle delay is applied.
    pub fn power_up_and_wait<F>(&mut self, timeout_ms: u32, probe: F) -> Result<(), PowerError>
    where
        F: FnMut() -> bool,
    {
        self.power.set_high();
        self.reset.set_high();
        self.wait_ready(timeout_ms, probe)
    }

    /// Full bring-up from an unknown state
    ///
    /// Configures and raises the power line, pulses reset, gives the
    /// device its boot time, then polls for readiness like
    /// [`Self::power_up_and_wait`].
    pub fn cold_start<F>(&mut self, probe: F) -> Result<(), PowerError>
    where
        F: FnMut() -> bool,
    {
        self.power.configure(PinMode::Output);
        self.power.set_high();
        self.reset();
        self.clock.sleep_ms(self.timing.boot_settle_ms as u64);
        self.wait_ready(self.timing.wake_timeout_ms, probe)
    }

    /// Deassert the secondary then the primary enable line
    pub fn power_down(&mut self) {
        self.reset.set_low();
        self.power.set_low();
        self.state = self.state.transition(PowerEvent::PoweredDown);
        debug!("sensor powered down");
    }

    fn wait_ready<F>(&mut self, timeout_ms: u32, mut probe: F) -> Result<(), PowerError>
    where
        F: FnMut() -> bool,
    {
        let policy =
            Retry::until(timeout_ms as u64).with_backoff(self.timing.wake_poll_ms as u64);
        let polled = policy.run(&self.clock, || if probe() { Ok(()) } else { Err(()) });

        match polled {
            Ok(()) => {
                self.clock.sleep_ms(self.timing.boot_settle_ms as u64);
                self.state = self.state.transition(PowerEvent::WakeSucceeded);
                Ok(())
            }
            Err(exhausted) => {
                warn!(
                    "sensor did not answer within {} ms ({} polls)",
                    timeout_ms,
                    exhausted.attempts
                );
                self.state = self.state.transition(PowerEvent::WakeTimedOut);
                Err(PowerError::Timeout)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soil::mock::{PinLog, SimClock, SimPin};

    fn sequencer(clock: &SimClock) -> PowerSequencer<SimPin, SimPin, &SimClock> {
        PowerSequencer::new(SimPin::default(), SimPin::default(), clock, Timing::HARDWARE)
    }

    fn logged_sequencer<'a>(
        clock: &'a SimClock,
        log: &PinLog,
    ) -> PowerSequencer<SimPin, SimPin, &'a SimClock> {
        PowerSequencer::new(
            SimPin::logged("power", log),
            SimPin::logged("reset", log),
            clock,
            Timing::HARDWARE,
        )
    }

    #[test]
    fn test_reset_pulse() {
        let clock = SimClock::new();
        let mut power = sequencer(&clock);

        power.reset();

        assert_eq!(clock.now_ms(), 500);
        assert_eq!(power.state(), PowerState::Unready);
        let (_, reset, _) = power.release();
        assert_eq!(reset.history, vec![false, true]);
        assert_eq!(reset.mode, Some(PinMode::Output));
    }

    #[test]
    fn test_power_up_waits_for_probe_then_settles() {
        let clock = SimClock::new();
        let mut power = sequencer(&clock);

        let mut polls = 0;
        let result = power.power_up_and_wait(5000, || {
            polls += 1;
            polls == 4
        });

        assert_eq!(result, Ok(()));
        assert_eq!(polls, 4);
        // Three 10 ms back-offs, then 500 ms settle
        assert_eq!(clock.now_ms(), 530);
        assert!(power.state().is_ready());

        let (pwr, reset, _) = power.release();
        assert!(pwr.is_set_high());
        assert!(reset.is_set_high());
    }

    #[test]
    fn test_power_up_times_out() {
        let clock = SimClock::new();
        let mut power = sequencer(&clock);

        let result = power.power_up_and_wait(5000, || false);

        assert_eq!(result, Err(PowerError::Timeout));
        assert_eq!(power.state(), PowerState::Unready);
        // Bounded by the deadline plus one back-off, no settle delay
        assert!(clock.now_ms() > 5000 && clock.now_ms() <= 5010);
    }

    #[test]
    fn test_power_down_order() {
        let clock = SimClock::new();
        let log = PinLog::default();
        let mut power = logged_sequencer(&clock, &log);
        power.power_up_and_wait(5000, || true).unwrap();

        power.power_down();

        assert_eq!(power.state(), PowerState::Off);
        // Primary up first, secondary down first
        assert_eq!(
            *log.borrow(),
            vec![
                ("power", true),
                ("reset", true),
                ("reset", false),
                ("power", false),
            ]
        );
    }

    #[test]
    fn test_reset_holds_low_then_releases() {
        let clock = SimClock::new();
        let log = PinLog::default();
        let mut power = logged_sequencer(&clock, &log);

        let mut probe_saw = None;
        power.reset();
        power
            .power_up_and_wait(5000, || {
                probe_saw = Some(clock.now_ms());
                true
            })
            .unwrap();

        // Released only after the full hold, before the readiness poll
        assert_eq!(probe_saw, Some(500));
        assert_eq!(
            *log.borrow(),
            vec![
                ("reset", false),
                ("reset", true),
                ("power", true),
                ("reset", true),
            ]
        );
    }

    #[test]
    fn test_cold_start_sequence() {
        let clock = SimClock::new();
        let mut power = sequencer(&clock);

        let result = power.cold_start(|| true);

        assert_eq!(result, Ok(()));
        // reset hold + boot wait + settle after first answer
        assert_eq!(clock.now_ms(), 1500);
        assert!(power.state().is_ready());

        let (pwr, reset, _) = power.release();
        assert_eq!(pwr.mode, Some(PinMode::Output));
        assert_eq!(pwr.history, vec![true]);
        assert_eq!(reset.history, vec![false, true]);
    }

    #[test]
    fn test_cold_start_powers_before_reset() {
        let clock = SimClock::new();
        let log = PinLog::default();
        let mut power = logged_sequencer(&clock, &log);

        power.cold_start(|| true).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![("power", true), ("reset", false), ("reset", true)]
        );
    }
}
