//! Sensor power state machine
//!
//! ```text
//!            wake ok                   power_down
//!   Off ───────────────────► Ready ─────────────────► Off
//!    │                         │
//!    │ reset                   │ reset / address change
//!    ▼                         ▼
//! Unready ◄──── wake timeout ── (any powered state)
//! ```
//!
//! The sequencer records these transitions; it does not refuse bus
//! traffic in any state. The device decides whether it answers.

/// Power state of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Power lines deasserted
    #[default]
    Off,
    /// Powered and answering version queries
    Ready,
    /// Powered but must be polled for readiness before use
    Unready,
}

/// Power-related events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerEvent {
    /// Device answered after power-up
    WakeSucceeded,
    /// Device did not answer before the deadline (lines stay asserted)
    WakeTimedOut,
    /// Power lines deasserted (caller request or error policy)
    PoweredDown,
    /// Reset pulse issued or device address reprogrammed
    Reset,
}

impl PowerState {
    /// Check if the device can be talked to without re-polling
    pub fn is_ready(&self) -> bool {
        matches!(self, PowerState::Ready)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: PowerEvent) -> Self {
        use PowerEvent::*;
        use PowerState::*;

        match (self, event) {
            (_, WakeSucceeded) => Ready,
            (_, WakeTimedOut) => Unready,
            (_, PoweredDown) => Off,
            (_, Reset) => Unready,
        }
    }
}
