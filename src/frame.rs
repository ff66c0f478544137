//! Command frame codec
//!
//! Every bus transaction exchanges a single frame. The frame is laid out
//! without delimiters; the offsets come from the command table:
//!
//! ```text
//! | opcode | request (request_len) | turnaround | response (response_len) |
//! ```
//!
//! The request is zero-padded to its fixed length and the response area is
//! clocked out as zeros. After an in-place exchange the response area holds
//! the module's answer.

use regiface::{ByteArray, FromByteArray, ToByteArray};

use crate::commands::{CommandSpec, ModuleCommand};
use crate::error::Error;

/// Capacity of a frame in bytes
pub const BUFFER_LEN: usize = 64;

/// Dummy byte clocked between request and response
const TURNAROUND_LEN: usize = 1;

/// A single bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    buffer: [u8; BUFFER_LEN],
    request_len: usize,
    response_offset: usize,
    len: usize,
}

impl Frame {
    /// Serializes an opcode and its payload
    ///
    /// # Errors
    /// * `Error::PayloadTooLarge` - the payload exceeds the command's request
    ///   length, or the frame exceeds [`BUFFER_LEN`]
    pub fn encode(spec: &CommandSpec, payload: &[u8]) -> Result<Self, Error> {
        if payload.len() > spec.request_len {
            return Err(Error::PayloadTooLarge);
        }

        let turnaround = if spec.response_len > 0 {
            TURNAROUND_LEN
        } else {
            0
        };
        let response_offset = 1 + spec.request_len + turnaround;
        let len = response_offset + spec.response_len;
        if len > BUFFER_LEN {
            return Err(Error::PayloadTooLarge);
        }

        let mut buffer = [0u8; BUFFER_LEN];
        buffer[0] = spec.opcode;
        buffer[1..1 + payload.len()].copy_from_slice(payload);

        Ok(Self {
            buffer,
            request_len: spec.request_len,
            response_offset,
            len,
        })
    }

    /// Serializes a command with its invoking parameters
    pub fn for_command<C>(command: C) -> Result<Self, Error>
    where
        C: ModuleCommand,
    {
        let params = command
            .invoking_parameters()
            .to_bytes()
            .map_err(|_| Error::PayloadTooLarge)?;

        Self::encode(&C::SPEC, params.as_ref())
    }

    pub fn opcode(&self) -> u8 {
        self.buffer[0]
    }

    /// Request bytes following the opcode, padding included
    pub fn payload(&self) -> &[u8] {
        &self.buffer[1..1 + self.request_len]
    }

    /// Response area
    pub fn response(&self) -> &[u8] {
        &self.buffer[self.response_offset..self.len]
    }

    /// The bytes exchanged on the bus
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.buffer[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decodes the response area into a typed value
    ///
    /// # Errors
    /// * `Error::Decode` - the response area does not match the layout of `R`
    ///   or `R` rejected its contents
    pub fn decode<R>(&self) -> Result<R, Error>
    where
        R: FromByteArray,
    {
        let mut raw = R::Array::new();
        let response = self.response();
        if raw.as_ref().len() != response.len() {
            return Err(Error::Decode);
        }
        raw.as_mut().copy_from_slice(response);

        R::from_bytes(raw).map_err(|_| Error::Decode)
    }
}
