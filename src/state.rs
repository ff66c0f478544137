//! Cached device state
//!
//! Filled in by the [`Device`](crate::Device) after each fully decoded
//! response. Reading it never touches the bus.

use crate::commands::{
    DeviceId, DeviceStatus, Measurement, Mode, Pac, RadioStatus, Stack, StatusKind, Version,
};

/// Last values read from the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    pub(crate) status: DeviceStatus,
    pub(crate) last_send: Option<RadioStatus>,
    pub(crate) measurement: Option<Measurement>,
    pub(crate) id: Option<DeviceId>,
    pub(crate) pac: Option<Pac>,
    pub(crate) network_version: Option<Version>,
    pub(crate) radio_version: Option<Version>,
    pub(crate) mode: Option<Mode>,
}

impl DeviceState {
    /// Status from the most recent status read
    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }

    pub fn status_code(&self, kind: StatusKind) -> u8 {
        self.status.code(kind)
    }

    pub fn status_message(&self, stack: Stack) -> &'static str {
        self.status.message(stack)
    }

    /// Radio status reported after the last transmission
    pub fn last_send_status(&self) -> Option<RadioStatus> {
        self.last_send
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    /// Raw temperature sensor bytes, low byte first
    pub fn temperature_raw(&self) -> Option<[u8; 2]> {
        self.measurement.map(|m| m.temperature)
    }

    pub fn id(&self) -> Option<&DeviceId> {
        self.id.as_ref()
    }

    pub fn pac(&self) -> Option<&Pac> {
        self.pac.as_ref()
    }

    /// Firmware version of a stack, once read
    pub fn version(&self, stack: Stack) -> Option<Version> {
        match stack {
            Stack::Network => self.network_version,
            Stack::Radio => self.radio_version,
        }
    }

    /// Mode acknowledged by the module, if one was written
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }
}
