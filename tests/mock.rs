//! Simulated ATA8520 module for driver tests
//!
//! The SPI device, control lines and delay provider share one [`Sim`], which
//! keeps a simulated clock advanced only by the delay provider. The EVENT
//! line goes high after power-up, reset release and each exchanged frame,
//! and returns low once the configured busy time has elapsed.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::rc::Rc;

use ata8520::{Config, Device, Pins, Timeouts};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, ErrorKind, Operation, SpiDevice};

const NEVER: u64 = u64::MAX;

/// Mock bus error
#[derive(Debug)]
pub enum MockError {
    Bus,
}

impl spi::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Simulated module and its surroundings
pub struct Sim {
    pub now_ns: u64,
    pub powered: bool,
    pub reset_asserted: bool,
    busy_until_ns: u64,
    /// Time from power-up or reset release until EVENT goes low
    pub boot_ns: u64,
    /// Keep EVENT high forever after power-up or reset
    pub boot_stuck: bool,
    /// Busy time after a frame, per opcode
    pub busy_ns: HashMap<u8, u64>,
    /// Opcodes after which EVENT never goes low again
    pub stuck: HashSet<u8>,
    /// Response bytes clocked out at the tail of a frame, per opcode
    pub responses: HashMap<u8, Vec<u8>>,
    /// Every frame clocked in, in order
    pub frames: Vec<Vec<u8>>,
    pub fail_transfers: bool,
    pub led_history: Vec<bool>,
}

impl Sim {
    pub fn new() -> Self {
        let mut responses = HashMap::new();
        responses.insert(0x0A, vec![0x00, 0x00, 0x00, 0x00]);

        let mut busy_ns = HashMap::new();
        busy_ns.insert(0x0D, 20_000_000);
        busy_ns.insert(0x11, 2_000_000);
        busy_ns.insert(0x14, 1_000_000);

        Self {
            now_ns: 0,
            powered: false,
            reset_asserted: false,
            busy_until_ns: 0,
            boot_ns: 5_000_000,
            boot_stuck: false,
            busy_ns,
            stuck: HashSet::new(),
            responses,
            frames: Vec::new(),
            fail_transfers: false,
            led_history: Vec::new(),
        }
    }

    fn boot(&mut self) {
        self.busy_until_ns = if self.boot_stuck {
            NEVER
        } else {
            self.now_ns + self.boot_ns
        };
    }

    fn event_low(&self) -> bool {
        self.powered && !self.reset_asserted && self.now_ns >= self.busy_until_ns
    }

    /// Frames whose first byte is `opcode`
    pub fn frames_with(&self, opcode: u8) -> Vec<Vec<u8>> {
        self.frames
            .iter()
            .filter(|frame| frame.first() == Some(&opcode))
            .cloned()
            .collect()
    }

    pub fn opcodes(&self) -> Vec<u8> {
        self.frames.iter().filter_map(|f| f.first().copied()).collect()
    }

    fn exchange(&mut self, buffer: &mut [u8]) -> Result<(), MockError> {
        if self.fail_transfers {
            return Err(MockError::Bus);
        }

        self.frames.push(buffer.to_vec());
        let Some(&opcode) = buffer.first() else {
            return Ok(());
        };

        if let Some(response) = self.responses.get(&opcode) {
            let n = response.len().min(buffer.len());
            let start = buffer.len() - n;
            buffer[start..].copy_from_slice(&response[..n]);
        }

        self.busy_until_ns = if self.stuck.contains(&opcode) {
            NEVER
        } else {
            self.now_ns + self.busy_ns.get(&opcode).copied().unwrap_or(0)
        };
        Ok(())
    }
}

pub type SharedSim = Rc<RefCell<Sim>>;

pub struct MockSpi {
    sim: SharedSim,
}

impl spi::ErrorType for MockSpi {
    type Error = MockError;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut sim = self.sim.borrow_mut();
        for op in operations {
            match op {
                Operation::TransferInPlace(buffer) => sim.exchange(buffer)?,
                Operation::Write(bytes) => sim.exchange(&mut bytes.to_vec())?,
                Operation::Read(buffer) => buffer.fill(0),
                Operation::Transfer(read, write) => {
                    let mut buffer = write.to_vec();
                    sim.exchange(&mut buffer)?;
                    let n = read.len().min(buffer.len());
                    read[..n].copy_from_slice(&buffer[..n]);
                }
                Operation::DelayNs(ns) => sim.now_ns += u64::from(*ns),
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub enum Line {
    Reset,
    Power,
    Led,
}

pub struct MockPin {
    sim: SharedSim,
    line: Line,
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl MockPin {
    fn set(&mut self, high: bool) {
        let mut sim = self.sim.borrow_mut();
        match self.line {
            Line::Reset => {
                let released = sim.reset_asserted && high;
                sim.reset_asserted = !high;
                if released {
                    sim.boot();
                }
            }
            Line::Power => {
                let powered_up = !sim.powered && high;
                sim.powered = high;
                if powered_up {
                    sim.boot();
                }
            }
            Line::Led => sim.led_history.push(high),
        }
    }
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

pub struct MockEvent {
    sim: SharedSim,
}

impl digital::ErrorType for MockEvent {
    type Error = Infallible;
}

impl InputPin for MockEvent {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.sim.borrow().event_low())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.sim.borrow().event_low())
    }
}

pub struct MockDelay {
    sim: SharedSim,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.sim.borrow_mut().now_ns += u64::from(ns);
    }
}

pub type MockDevice = Device<MockSpi, MockPin, MockPin, MockEvent, MockPin, MockDelay>;

/// Short bounds so that timeouts are reached quickly on the simulated clock
pub fn test_config() -> Config {
    Config {
        timeouts: Timeouts {
            short_ms: 10,
            medium_ms: 50,
            long_ms: 200,
        },
        ..Config::default()
    }
}

pub fn mock_device_with(sim: Sim, config: Config) -> (MockDevice, SharedSim) {
    let sim = Rc::new(RefCell::new(sim));
    let pins = Pins::new(
        MockPin {
            sim: sim.clone(),
            line: Line::Reset,
        },
        MockPin {
            sim: sim.clone(),
            line: Line::Power,
        },
        MockEvent { sim: sim.clone() },
    )
    .with_led(MockPin {
        sim: sim.clone(),
        line: Line::Led,
    });

    let device = Device::new(
        MockSpi { sim: sim.clone() },
        pins,
        MockDelay { sim: sim.clone() },
        config,
    );
    (device, sim)
}

pub fn mock_device() -> (MockDevice, SharedSim) {
    mock_device_with(Sim::new(), test_config())
}

/// A device that has completed `begin(true)`, with the frame log cleared
pub fn ready_device() -> (MockDevice, SharedSim) {
    let (mut device, sim) = mock_device();
    device.begin(true).unwrap();
    sim.borrow_mut().frames.clear();
    (device, sim)
}
