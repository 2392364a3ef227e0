//! Test doubles: simulated RAK12035, clock and pins

use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use humus_core::config::DEFAULT_ADDRESS;
use humus_hal::gpio::{OutputPin, PinMode};
use humus_hal::i2c::{TwoWire, STATUS_ADDRESS_NACK, STATUS_OK};
use humus_hal::Clock;

use super::registers::Register;

/// Clock whose sleeps advance time instantly
#[derive(Debug, Default)]
pub struct SimClock {
    now: Cell<u64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

/// Writes to several pins, in the order they happened
pub type PinLog = Rc<RefCell<Vec<(&'static str, bool)>>>;

/// Output pin that remembers every level it was driven to
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
    pub history: Vec<bool>,
    pub mode: Option<PinMode>,
    log: Option<(&'static str, PinLog)>,
}

impl SimPin {
    /// Pin that also appends `(name, level)` to a shared log
    pub fn logged(name: &'static str, log: &PinLog) -> Self {
        Self {
            log: Some((name, Rc::clone(log))),
            ..Self::default()
        }
    }

    fn drive(&mut self, high: bool) {
        self.high = high;
        self.history.push(high);
        if let Some((name, log)) = &self.log {
            log.borrow_mut().push((*name, high));
        }
    }
}

impl OutputPin for SimPin {
    fn set_high(&mut self) {
        self.drive(true);
    }

    fn set_low(&mut self) {
        self.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }

    fn configure(&mut self, mode: PinMode) {
        self.mode = Some(mode);
    }
}

/// Simulated sensor on a Wire-style bus
///
/// Answers register reads from its fields. Capacitance is served from a
/// script, repeating the last value once the script runs out.
#[derive(Debug)]
pub struct SimSensor {
    pub address: u8,
    pub version: u8,
    pub capacitance: Vec<u16>,
    pub temperature_x10: i16,
    /// `end_write` calls (0-based) that report an address NACK
    pub nack_writes: Vec<usize>,
    /// Accept writes but never deliver read bytes
    pub silent: bool,
    /// Deliver this many bytes fewer than requested
    pub short_by: usize,
    /// Value written to SET_I2C_ADDRESS, if any
    pub programmed_address: Option<u8>,
    pub writes: Vec<(u8, Vec<u8>)>,
    pub read_requests: Vec<(u8, usize)>,
    pub begun: bool,
    write_count: usize,
    cap_index: usize,
    selected: Option<Register>,
    target: u8,
    tx: Vec<u8>,
    rx: VecDeque<u8>,
}

impl Default for SimSensor {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            version: 3,
            capacitance: vec![300],
            temperature_x10: 215,
            nack_writes: Vec::new(),
            silent: false,
            short_by: 0,
            programmed_address: None,
            writes: Vec::new(),
            read_requests: Vec::new(),
            begun: false,
            write_count: 0,
            cap_index: 0,
            selected: None,
            target: 0,
            tx: Vec::new(),
            rx: VecDeque::new(),
        }
    }
}

impl SimSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacitance(capacitance: &[u16]) -> Self {
        Self {
            capacitance: capacitance.to_vec(),
            ..Self::default()
        }
    }

    /// Number of `end_write` calls so far
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    fn next_capacitance(&mut self) -> u16 {
        let index = self.cap_index.min(self.capacitance.len().saturating_sub(1));
        self.cap_index += 1;
        self.capacitance.get(index).copied().unwrap_or(0)
    }

    fn register_bytes(&mut self, register: Register) -> Vec<u8> {
        match register {
            Register::GetCapacitance => self.next_capacitance().to_be_bytes().to_vec(),
            Register::GetTemperature => self.temperature_x10.to_be_bytes().to_vec(),
            Register::GetVersion => vec![self.version],
            Register::GetI2cAddress => vec![self.address],
            Register::SetI2cAddress => Vec::new(),
        }
    }
}

impl TwoWire for SimSensor {
    fn begin(&mut self) {
        self.begun = true;
    }

    fn end(&mut self) {
        self.begun = false;
    }

    fn begin_write(&mut self, address: u8) {
        self.target = address;
        self.tx.clear();
    }

    fn write_byte(&mut self, byte: u8) {
        self.tx.push(byte);
    }

    fn end_write(&mut self) -> u8 {
        let index = self.write_count;
        self.write_count += 1;
        self.writes.push((self.target, self.tx.clone()));

        if self.nack_writes.contains(&index) || self.target != self.address {
            return STATUS_ADDRESS_NACK;
        }

        match self.tx.as_slice() {
            [code] => self.selected = Register::from_code(*code),
            [0x03, address] => self.programmed_address = Some(*address),
            _ => {}
        }
        STATUS_OK
    }

    fn request_read(&mut self, address: u8, count: usize) {
        self.read_requests.push((address, count));
        self.rx.clear();

        if self.silent || address != self.address {
            return;
        }
        let Some(register) = self.selected else {
            return;
        };

        let bytes = self.register_bytes(register);
        let deliver = count.min(bytes.len()).saturating_sub(self.short_by);
        self.rx.extend(bytes.into_iter().take(deliver));
    }

    fn byte_available(&mut self) -> bool {
        !self.rx.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.rx.pop_front().unwrap_or(0)
    }
}
