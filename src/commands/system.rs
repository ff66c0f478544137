//! System commands
//!
//! This module contains the commands that configure and exercise the module:
//! - Region and duty mode selection
//! - Supply voltage and temperature measurement
//! - Crystal calibration
//! - Continuous transmission test mode
//! - Configuration dump
//!
//! Configuration, measurement and test commands hold EVENT high while the
//! module works; calibration can take several seconds.

use core::convert::Infallible;

use regiface::FromByteArray;

use super::{
    CommandSpec, ModuleCommand, CALIBRATE_CRYSTAL, GET_MEASUREMENT, READ_CONFIG, SET_MODE,
    START_MEASUREMENT, TEST_MODE,
};
use crate::{Command, NoParameters, ToByteArray};

/// Regulatory region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    /// RCZ2/RCZ4, 902 MHz band
    Us = 0,
    /// RCZ1, 868 MHz band
    Eu = 1,
}

/// Whether a downlink window follows each uplink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DutyMode {
    TransmitOnly = 0,
    TransmitReceive = 1,
}

/// Operating mode of the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mode {
    pub region: Region,
    pub duty: DutyMode,
}

impl ToByteArray for Mode {
    type Error = Infallible;
    type Array = [u8; 2];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.region as u8, self.duty as u8])
    }
}

/// SetMode command (0x11)
///
/// Writes the region and duty mode selector to the module's system
/// configuration.
///
/// # Important Notes
/// - EVENT goes low once the configuration has been applied
/// - The selected mode persists across resets
#[derive(Debug, Clone)]
pub struct SetMode {
    pub mode: Mode,
}

impl Command for SetMode {
    type IdType = u8;
    type CommandParameters = Mode;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SET_MODE.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.mode
    }
}

impl ModuleCommand for SetMode {
    const SPEC: CommandSpec = SET_MODE;
}

/// StartMeasurement command (0x14)
///
/// Samples the supply voltage (idle and under load) and the internal
/// temperature sensor. Results are read with [`GetMeasurement`].
#[derive(Debug, Clone)]
pub struct StartMeasurement;

impl Command for StartMeasurement {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        START_MEASUREMENT.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for StartMeasurement {
    const SPEC: CommandSpec = START_MEASUREMENT;
}

/// Raw measurement results
///
/// No unit conversion is applied; the conversion depends on the module's
/// calibration data and is left to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Supply voltage while idle
    pub supply_idle: u16,
    /// Supply voltage while the PA is active
    pub supply_active: u16,
    /// Temperature sensor bytes, low byte first
    pub temperature: [u8; 2],
}

impl FromByteArray for Measurement {
    type Error = Infallible;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            supply_idle: u16::from_be_bytes([bytes[0], bytes[1]]),
            supply_active: u16::from_be_bytes([bytes[2], bytes[3]]),
            temperature: [bytes[4], bytes[5]],
        })
    }
}

/// GetMeasurement command (0x13)
#[derive(Debug, Clone)]
pub struct GetMeasurement;

impl Command for GetMeasurement {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = Measurement;

    fn id() -> Self::IdType {
        GET_MEASUREMENT.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for GetMeasurement {
    const SPEC: CommandSpec = GET_MEASUREMENT;
}

/// Test mode parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestParameters {
    /// Number of frames, low byte
    pub frame_low: u8,
    /// Number of frames, high byte
    pub frame_high: u8,
    /// Channel, low byte
    pub channel_low: u8,
    /// Channel, high byte
    pub channel_high: u8,
}

impl ToByteArray for TestParameters {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            self.frame_low,
            self.frame_high,
            self.channel_low,
            self.channel_high,
        ])
    }
}

/// TestMode command (0x15)
///
/// # Important Notes
/// - Manufacturing and bench use only
/// - Transmits test frames on a fixed channel; not for use on a live network
#[derive(Debug, Clone)]
pub struct TestMode {
    pub params: TestParameters,
}

impl Command for TestMode {
    type IdType = u8;
    type CommandParameters = TestParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        TEST_MODE.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.params
    }
}

impl ModuleCommand for TestMode {
    const SPEC: CommandSpec = TEST_MODE;
}

/// Longest configuration dump the module returns
pub const MAX_CONFIG_LEN: usize = 15;

/// Configuration dump
///
/// The first response byte carries the number of valid bytes that follow.
/// The known layout is:
/// - Bytes 0..4: TX frequency in Hz
/// - Bytes 4..8: RX frequency in Hz
/// - Byte 8: configuration flags
/// - Byte 9: frame repetitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigDump {
    len: u8,
    bytes: [u8; MAX_CONFIG_LEN],
}

impl ConfigDump {
    /// Valid bytes of the dump
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn word(&self, offset: usize) -> Option<u32> {
        let raw = self.as_bytes().get(offset..offset + 4)?;
        Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn tx_frequency(&self) -> Option<u32> {
        self.word(0)
    }

    pub fn rx_frequency(&self) -> Option<u32> {
        self.word(4)
    }

    pub fn configuration(&self) -> Option<u8> {
        self.as_bytes().get(8).copied()
    }

    pub fn repeat(&self) -> Option<u8> {
        self.as_bytes().get(9).copied()
    }
}

impl FromByteArray for ConfigDump {
    type Error = Infallible;
    type Array = [u8; 1 + MAX_CONFIG_LEN];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        let mut dump = [0u8; MAX_CONFIG_LEN];
        dump.copy_from_slice(&bytes[1..]);

        Ok(Self {
            len: bytes[0].min(MAX_CONFIG_LEN as u8),
            bytes: dump,
        })
    }
}

/// ReadConfig command (0x16)
#[derive(Debug, Clone)]
pub struct ReadConfig;

impl Command for ReadConfig {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = ConfigDump;

    fn id() -> Self::IdType {
        READ_CONFIG.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for ReadConfig {
    const SPEC: CommandSpec = READ_CONFIG;
}

/// CalibrateCrystal command (0x17)
///
/// Trims the crystal oscillator against the module's reference.
///
/// # Important Notes
/// - Takes substantially longer than other commands
/// - The outcome is reported in the radio status
#[derive(Debug, Clone)]
pub struct CalibrateCrystal;

impl Command for CalibrateCrystal {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        CALIBRATE_CRYSTAL.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for CalibrateCrystal {
    const SPEC: CommandSpec = CALIBRATE_CRYSTAL;
}
