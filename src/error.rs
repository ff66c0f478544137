//! Driver error type

use core::fmt;

/// Errors reported by the driver
///
/// Unknown status or version codes are never errors; they decode to
/// placeholder values instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The SPI exchange failed
    Transport,
    /// A GPIO line could not be driven or sampled
    Pin,
    /// The module did not signal ready after power-up or reset
    InitTimeout,
    /// The module did not signal completion of a command in time
    CommandTimeout,
    /// A command payload does not fit the command's fixed length
    PayloadTooLarge,
    /// A user message is longer than 12 bytes
    MessageTooLong,
    /// The driver has not been started with `begin`, or was stopped with `end`
    NotInitialized,
    /// The response area could not be decoded
    Decode,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::Transport => "SPI transfer failed",
            Error::Pin => "GPIO operation failed",
            Error::InitTimeout => "module not ready after power-up",
            Error::CommandTimeout => "command did not complete in time",
            Error::PayloadTooLarge => "payload exceeds command length",
            Error::MessageTooLong => "message longer than 12 bytes",
            Error::NotInitialized => "driver not initialized",
            Error::Decode => "malformed response",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}

impl From<regiface::errors::Error> for Error {
    fn from(err: regiface::errors::Error) -> Self {
        match err {
            regiface::errors::Error::BusError => Error::Transport,
            _ => Error::Decode,
        }
    }
}
