#![no_std]
//! ATA8520 SIGFOX Driver
//!
//! This crate provides a type-safe interface for the Atmel ATA8520 SIGFOX
//! transceiver module. The module runs the SIGFOX network and radio stacks
//! in its own firmware; the host talks to it over SPI and three control
//! lines and only sees a small command set.
//!
//! # Features
//! - Uplink messages of up to 12 bytes
//! - Region (US/EU) and duty mode (TX only, TX/RX) selection
//! - Status, firmware version, device ID and PAC readout
//! - Supply voltage and temperature measurement (raw values)
//! - Crystal calibration and manufacturing test mode
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: Protocol engine
//!   - Power and reset sequencing
//!   - EVENT line handshake around every command
//!   - Lifecycle enforcement (`begin` / `end`)
//!
//! - [`commands`]: Command set of the module
//!   - Opcode table with request/response lengths and timeout classes
//!   - Typed parameters and responses for every command
//!   - Status code tables
//!
//! - [`frame`]: Fixed-layout frame codec used for every transaction
//!
//! - [`pins`]: Control lines and the EVENT readiness wait
//!
//! - [`state`]: Values cached from the module
//!
//! - [`config`]: Timeouts and timings
//!
//! # Usage
//! Commands are expressed with the `regiface` crate's [`Command`] trait;
//! the [`Device`] struct wraps an [`SpiDevice`](embedded_hal::spi::SpiDevice)
//! and the control [`Pins`] and exposes one method per operation.
//!
//! Operation follows a specific sequence:
//!
//! 1. Create a new [`Device`] with the SPI device, pins, delay and [`Config`]
//! 2. Call [`Device::begin`] to power up and reset the module
//! 3. Send messages, read status or identity
//! 4. Call [`Device::end`] to power the module down
//!
//! # Important Notes
//! - Every operation blocks until the module signals completion or the
//!   command's timeout expires
//! - A transmission can take several seconds, longer with a downlink window
//! - After a timeout the module state is unknown; call [`Device::reset`]
//! - Status and version codes unknown to this crate are not errors

use regiface::*;

pub mod commands;
pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod pins;
pub mod state;

pub use commands::*;
pub use config::{Config, TimeoutClass, Timeouts};
pub use device::{Device, Phase};
pub use error::Error;
pub use pins::{NoLed, Pins};
pub use state::DeviceState;
