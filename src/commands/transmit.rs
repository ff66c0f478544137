//! Transmission commands
//!
//! A SIGFOX uplink takes two commands: the message is first written to the
//! module's TX buffer, then SendFrame starts the transmission. The module
//! holds EVENT high until every repetition of the frame has been sent.

use core::convert::Infallible;

use super::{CommandSpec, ModuleCommand, SEND_FRAME, WRITE_TX_BUFFER};
use crate::error::Error;
use crate::{Command, NoParameters, ToByteArray};

/// Longest payload of a single uplink
pub const MAX_MESSAGE_LEN: usize = 12;

/// TX buffer contents
///
/// Serialized as a length byte followed by the message zero-padded to
/// [`MAX_MESSAGE_LEN`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxBuffer {
    len: u8,
    data: [u8; MAX_MESSAGE_LEN],
}

impl TxBuffer {
    /// Copies a message into a TX buffer
    ///
    /// # Errors
    /// * `Error::MessageTooLong` - the message exceeds 12 bytes
    pub fn new(message: &[u8]) -> Result<Self, Error> {
        if message.len() > MAX_MESSAGE_LEN {
            return Err(Error::MessageTooLong);
        }

        let mut data = [0u8; MAX_MESSAGE_LEN];
        data[..message.len()].copy_from_slice(message);

        Ok(Self {
            len: message.len() as u8,
            data,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

impl ToByteArray for TxBuffer {
    type Error = Infallible;
    type Array = [u8; 1 + MAX_MESSAGE_LEN];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let mut bytes = [0u8; 1 + MAX_MESSAGE_LEN];
        bytes[0] = self.len;
        bytes[1..].copy_from_slice(&self.data);
        Ok(bytes)
    }
}

/// WriteTxBuffer command (0x07)
#[derive(Debug, Clone)]
pub struct WriteTxBuffer {
    pub buffer: TxBuffer,
}

impl Command for WriteTxBuffer {
    type IdType = u8;
    type CommandParameters = TxBuffer;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        WRITE_TX_BUFFER.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        self.buffer
    }
}

impl ModuleCommand for WriteTxBuffer {
    const SPEC: CommandSpec = WRITE_TX_BUFFER;
}

/// SendFrame command (0x0D)
///
/// # Important Notes
/// - Sends the current TX buffer, including repetitions
/// - EVENT goes low once the transmission (and downlink window, in
///   transmit-receive mode) is over
/// - Read the status afterwards to learn the outcome
#[derive(Debug, Clone)]
pub struct SendFrame;

impl Command for SendFrame {
    type IdType = u8;
    type CommandParameters = NoParameters;
    type ResponseParameters = NoParameters;

    fn id() -> Self::IdType {
        SEND_FRAME.opcode
    }

    fn invoking_parameters(self) -> Self::CommandParameters {
        NoParameters::default()
    }
}

impl ModuleCommand for SendFrame {
    const SPEC: CommandSpec = SEND_FRAME;
}
