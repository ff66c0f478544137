//! Status, version and identity commands
//!
//! This module contains the read-only commands of the module:
//! - Device status (system state machine, network stack and radio stack codes)
//! - Firmware versions of the network and radio stacks
//! - Device ID and PAC assigned at manufacture
//!
//! None of these commands take parameters; their responses are fixed-length
//! and follow the turnaround byte.

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::FromByteArray;

use super::{
    CommandSpec, ModuleCommand, GET_ID, GET_NETWORK_VERSION, GET_PAC, GET_RADIO_VERSION,
    GET_STATUS,
};
use crate::{Command, NoParameters};

/// Placeholder text for codes missing from the status tables
pub const UNRECOGNIZED_STATUS: &str = "Unrecognized status code";

/// Selects one of the three cached status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusKind {
    /// System state machine status
    Module,
    /// Network stack status
    Network,
    /// Radio stack status
    Radio,
}

/// One of the two firmware stacks running on the module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stack {
    Network,
    Radio,
}

/// System state machine status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModuleStatus(pub u8);

impl ModuleStatus {
    pub fn code(&self) -> u8 {
        self.0
    }
}

bitflags! {
    /// Single-bit indications of the network status byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NetworkFlags: u8 {
        /// Power amplifier enabled
        const PA_ON = 1 << 0;
        /// Last frame was sent
        const FRAME_SENT = 1 << 5;
        /// System ready to operate
        const SYSTEM_READY = 1 << 6;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NetworkFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "NetworkFlags {{ 0b{=u8:08b} }}", self.bits())
    }
}

/// Network stack status code
///
/// # Status Byte Format
/// - Bit 7: Reserved
/// - Bit 6: System ready
/// - Bit 5: Frame sent
/// - Bits 4:1: Error code
/// - Bit 0: PA on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkStatus(pub u8);

impl NetworkStatus {
    pub fn code(&self) -> u8 {
        self.0
    }

    /// Flag bits of the status byte
    pub fn flags(&self) -> NetworkFlags {
        NetworkFlags::from_bits_truncate(self.0)
    }

    /// Error field, bits 4:1
    pub fn error_code(&self) -> u8 {
        (self.0 >> 1) & 0x0F
    }

    /// Describes the error field
    pub fn message(&self) -> &'static str {
        match self.error_code() {
            0x0 => "No error",
            0x1 => "Command error / not supported",
            0x2 => "Generic error",
            0x3 => "Frequency error",
            0x4 => "Usage error",
            0x5 => "Opening error",
            0x6 => "Closing error",
            0x7 => "Send error",
            _ => UNRECOGNIZED_STATUS,
        }
    }
}

/// Radio stack status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioStatus(pub u8);

impl RadioStatus {
    pub fn code(&self) -> u8 {
        self.0
    }

    pub fn is_ok(&self) -> bool {
        self.0 == 0x00
    }

    pub fn message(&self) -> &'static str {
        match self.0 {
            0x00 => "No error",
            0x10 => "Manufacturer error",
            0x20 => "ID or key error",
            0x30 => "State machine error",
            0x40 => "Frame size error",
            0x50 => "Manufacturer send error",
            0x60 => "Get voltage/temperature error",
            0x70 => "Close issues encountered",
            0x80 => "API error indication",
            0x90 => "Error getting PN9",
            0xA0 => "Error getting frequency",
            0xB0 => "Error building frame",
            0xC0 => "Error in delay routine",
            0xD0 => "Callback causes error",
            0xE0 => "Timing error",
            0xF0 => "Frequency error",
            _ => UNRECOGNIZED_STATUS,
        }
    }
}

/// Device status
///
/// Returned by the GetStatus command, one byte per field in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub module: ModuleStatus,
    pub network: NetworkStatus,
    pub radio: RadioStatus,
    /// Secondary radio stack status, kept raw
    pub radio_detail: u8,
}

impl DeviceStatus {
    /// Raw code of one status field
    pub fn code(&self, kind: StatusKind) -> u8 {
        match kind {
            StatusKind::Module => self.module.code(),
            StatusKind::Network => self.network.code(),
            StatusKind::Radio => self.radio.code(),
        }
    }

    /// Text for the network or radio code
    pub fn message(&self, stack: Stack) -> &'static str {
        match stack {
            Stack::Network => self.network.message(),
            Stack::Radio => self.radio.message(),
        }
    }
}

impl FromByteArray for DeviceStatus {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            module: ModuleStatus(bytes[0]),
            network: NetworkStatus(bytes[1]),
            radio: RadioStatus(bytes[2]),
            radio_detail: bytes[3],
        })
    }
}

/// GetStatus command (0x0A)
///
/// Reads the three status codes and the secondary radio status.
#[derive(Debug, Clone)]
pub struct GetStatus;

impl Command for GetStatus {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = DeviceStatus;

    fn id() -> Self::IdType {
        GET_STATUS.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for GetStatus {
    const SPEC: CommandSpec = GET_STATUS;
}

/// Firmware version of one stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl FromByteArray for Version {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            major: bytes[0],
            minor: bytes[1],
        })
    }
}

/// GetNetworkVersion command (0x06)
#[derive(Debug, Clone)]
pub struct GetNetworkVersion;

impl Command for GetNetworkVersion {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = Version;

    fn id() -> Self::IdType {
        GET_NETWORK_VERSION.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for GetNetworkVersion {
    const SPEC: CommandSpec = GET_NETWORK_VERSION;
}

/// GetRadioVersion command (0x0B)
#[derive(Debug, Clone)]
pub struct GetRadioVersion;

impl Command for GetRadioVersion {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = Version;

    fn id() -> Self::IdType {
        GET_RADIO_VERSION.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for GetRadioVersion {
    const SPEC: CommandSpec = GET_RADIO_VERSION;
}

/// Device ID, in the order the module sends it (least significant byte first)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceId(pub [u8; 4]);

impl DeviceId {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The ID as printed on the module label
    pub fn value(&self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl FromByteArray for DeviceId {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes))
    }
}

/// GetId command (0x12)
#[derive(Debug, Clone)]
pub struct GetId;

impl Command for GetId {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = DeviceId;

    fn id() -> Self::IdType {
        GET_ID.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for GetId {
    const SPEC: CommandSpec = GET_ID;
}

/// Pairing authorization code used for network registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pac(pub [u8; 16]);

impl Pac {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl FromByteArray for Pac {
    type Error = Infallible;
    type Array = [u8; 16];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self(bytes))
    }
}

/// GetPac command (0x0F)
///
/// # Important Notes
/// - The PAC is only valid for the first registration of the device
#[derive(Debug, Clone)]
pub struct GetPac;

impl Command for GetPac {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = Pac;

    fn id() -> Self::IdType {
        GET_PAC.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for GetPac {
    const SPEC: CommandSpec = GET_PAC;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_fields_keep_response_order() {
        let status = DeviceStatus::from_bytes([0x01, 0x40, 0x30, 0x02]).unwrap();
        assert_eq!(status.code(StatusKind::Module), 0x01);
        assert_eq!(status.code(StatusKind::Network), 0x40);
        assert_eq!(status.code(StatusKind::Radio), 0x30);
        assert_eq!(status.radio_detail, 0x02);
    }

    #[test]
    fn network_error_field_is_bits_4_to_1() {
        let status = NetworkStatus(0b0100_1111);
        assert_eq!(status.error_code(), 0x7);
        assert_eq!(status.message(), "Send error");
        assert!(status.flags().contains(NetworkFlags::PA_ON));
        assert!(status.flags().contains(NetworkFlags::SYSTEM_READY));
        assert!(!status.flags().contains(NetworkFlags::FRAME_SENT));
    }

    #[test]
    fn every_network_code_has_its_text() {
        let table = [
            (0x0, "No error"),
            (0x1, "Command error / not supported"),
            (0x2, "Generic error"),
            (0x3, "Frequency error"),
            (0x4, "Usage error"),
            (0x5, "Opening error"),
            (0x6, "Closing error"),
            (0x7, "Send error"),
        ];
        for (code, text) in table {
            assert_eq!(NetworkStatus(code << 1).message(), text);
            // flag bits do not affect the error field
            assert_eq!(NetworkStatus((code << 1) | 0x61).message(), text);
        }
        for code in 0x8..=0xF_u8 {
            assert_eq!(NetworkStatus(code << 1).message(), UNRECOGNIZED_STATUS);
        }
    }

    #[test]
    fn every_radio_code_has_its_text() {
        let table = [
            (0x00, "No error"),
            (0x10, "Manufacturer error"),
            (0x20, "ID or key error"),
            (0x30, "State machine error"),
            (0x40, "Frame size error"),
            (0x50, "Manufacturer send error"),
            (0x60, "Get voltage/temperature error"),
            (0x70, "Close issues encountered"),
            (0x80, "API error indication"),
            (0x90, "Error getting PN9"),
            (0xA0, "Error getting frequency"),
            (0xB0, "Error building frame"),
            (0xC0, "Error in delay routine"),
            (0xD0, "Callback causes error"),
            (0xE0, "Timing error"),
            (0xF0, "Frequency error"),
        ];
        for (code, text) in table {
            assert_eq!(RadioStatus(code).message(), text);
        }

        for code in 0..=u8::MAX {
            if code & 0x0F != 0 {
                assert_eq!(RadioStatus(code).message(), UNRECOGNIZED_STATUS);
            }
        }
    }

    #[test]
    fn device_id_value_is_little_endian() {
        let id = DeviceId::from_bytes([0x78, 0x56, 0x34, 0x12]).unwrap();
        assert_eq!(id.value(), 0x1234_5678);
    }
}
