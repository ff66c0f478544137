//! Module command implementations
//!
//! Every ATA8520 command is a type implementing [`Command`] with its
//! request parameters and response layout expressed as
//! [`ToByteArray`](regiface::ToByteArray) and
//! [`FromByteArray`](regiface::FromByteArray) types. Commands are grouped by
//! function:
//!
//! - [`status`]: status, version and identity reads
//! - [`system`]: mode configuration, measurement, calibration and test mode
//! - [`transmit`]: TX buffer and frame transmission
//!
//! # Command Execution
//! A command is clocked out in a single SPI exchange with select asserted:
//!
//! ```text
//! | opcode | request (fixed length) | turnaround | response (fixed length) |
//! ```
//!
//! The turnaround byte is only present for commands with a response. The
//! EVENT line is active low:
//! - High = module busy, wait before sending the next command
//! - Low = module ready, or the previous command completed
//!
//! # Common Patterns
//! 1. Wait for EVENT low before selecting the module
//! 2. Exchange the frame
//! 3. Wait for EVENT low again, bounded by the command's [`TimeoutClass`]
//! 4. Decode the response area

mod status;
mod system;
mod transmit;

pub use status::*;
pub use system::*;
pub use transmit::*;

use crate::config::TimeoutClass;
use crate::Command;

/// Entry of the command opcode table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandSpec {
    /// Command opcode
    pub opcode: u8,
    /// Fixed request length following the opcode
    pub request_len: usize,
    /// Fixed response length following the turnaround byte
    pub response_len: usize,
    /// How long the module may hold EVENT high after the command
    pub timeout: TimeoutClass,
}

pub const GET_NETWORK_VERSION: CommandSpec = CommandSpec {
    opcode: 0x06,
    request_len: 0,
    response_len: 2,
    timeout: TimeoutClass::Short,
};

pub const WRITE_TX_BUFFER: CommandSpec = CommandSpec {
    opcode: 0x07,
    request_len: 1 + MAX_MESSAGE_LEN,
    response_len: 0,
    timeout: TimeoutClass::Short,
};

pub const GET_STATUS: CommandSpec = CommandSpec {
    opcode: 0x0A,
    request_len: 0,
    response_len: 4,
    timeout: TimeoutClass::Short,
};

pub const GET_RADIO_VERSION: CommandSpec = CommandSpec {
    opcode: 0x0B,
    request_len: 0,
    response_len: 2,
    timeout: TimeoutClass::Short,
};

pub const SEND_FRAME: CommandSpec = CommandSpec {
    opcode: 0x0D,
    request_len: 0,
    response_len: 0,
    timeout: TimeoutClass::Long,
};

pub const GET_PAC: CommandSpec = CommandSpec {
    opcode: 0x0F,
    request_len: 0,
    response_len: 16,
    timeout: TimeoutClass::Short,
};

pub const SET_MODE: CommandSpec = CommandSpec {
    opcode: 0x11,
    request_len: 2,
    response_len: 0,
    timeout: TimeoutClass::Medium,
};

pub const GET_ID: CommandSpec = CommandSpec {
    opcode: 0x12,
    request_len: 0,
    response_len: 4,
    timeout: TimeoutClass::Short,
};

pub const GET_MEASUREMENT: CommandSpec = CommandSpec {
    opcode: 0x13,
    request_len: 0,
    response_len: 6,
    timeout: TimeoutClass::Short,
};

pub const START_MEASUREMENT: CommandSpec = CommandSpec {
    opcode: 0x14,
    request_len: 0,
    response_len: 0,
    timeout: TimeoutClass::Medium,
};

pub const TEST_MODE: CommandSpec = CommandSpec {
    opcode: 0x15,
    request_len: 4,
    response_len: 0,
    timeout: TimeoutClass::Medium,
};

pub const READ_CONFIG: CommandSpec = CommandSpec {
    opcode: 0x16,
    request_len: 0,
    response_len: 1 + MAX_CONFIG_LEN,
    timeout: TimeoutClass::Short,
};

pub const CALIBRATE_CRYSTAL: CommandSpec = CommandSpec {
    opcode: 0x17,
    request_len: 0,
    response_len: 0,
    timeout: TimeoutClass::Long,
};

/// All commands understood by the driver, ordered by opcode
pub const COMMAND_TABLE: [CommandSpec; 13] = [
    GET_NETWORK_VERSION,
    WRITE_TX_BUFFER,
    GET_STATUS,
    GET_RADIO_VERSION,
    SEND_FRAME,
    GET_PAC,
    SET_MODE,
    GET_ID,
    GET_MEASUREMENT,
    START_MEASUREMENT,
    TEST_MODE,
    READ_CONFIG,
    CALIBRATE_CRYSTAL,
];

/// Looks up the table entry of an opcode
pub fn lookup(opcode: u8) -> Option<&'static CommandSpec> {
    COMMAND_TABLE.iter().find(|spec| spec.opcode == opcode)
}

/// A [`Command`] with an entry in the opcode table
pub trait ModuleCommand: Command<IdType = u8> {
    /// Table entry for this command
    const SPEC: CommandSpec;
}
