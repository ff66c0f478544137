//! Driver configuration
//!
//! Timing constants for the power and reset sequence, and the per-class
//! bounds applied while waiting on the module's event line.

use crate::commands::{DutyMode, Mode, Region};

/// Fixed timings of the power and reset sequence
pub mod timing {
    /// Settle time after asserting power-enable
    pub const POWER_ON_SETTLE_MS: u32 = 10;
    /// Time the reset line is held low
    pub const RESET_HOLD_MS: u32 = 10;
    /// Settle time after releasing reset
    pub const RESET_SETTLE_MS: u32 = 10;
    /// Interval between two samples of the event line
    pub const POLL_INTERVAL_US: u32 = 100;
}

/// Timeout class of a command
///
/// Each opcode in the command table carries one of these classes; the
/// actual bound is taken from [`Timeouts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutClass {
    /// Register-style reads and buffer writes
    Short,
    /// Reset, configuration, measurement and test commands
    Medium,
    /// Frame transmission and crystal calibration
    Long,
}

/// Upper bounds for waiting on the event line, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeouts {
    pub short_ms: u32,
    pub medium_ms: u32,
    /// Covers a full uplink with repetitions plus the downlink window
    pub long_ms: u32,
}

impl Timeouts {
    /// Returns the bound for a timeout class
    pub fn for_class(&self, class: TimeoutClass) -> u32 {
        match class {
            TimeoutClass::Short => self.short_ms,
            TimeoutClass::Medium => self.medium_ms,
            TimeoutClass::Long => self.long_ms,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short_ms: 50,
            medium_ms: 1_000,
            long_ms: 60_000,
        }
    }
}

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Event line wait bounds
    pub timeouts: Timeouts,
    /// Mode written to the module by `begin` when it is not preconfigured
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeouts: Timeouts::default(),
            mode: Mode {
                region: Region::Eu,
                duty: DutyMode::TransmitOnly,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_classes_map_to_their_bounds() {
        let timeouts = Timeouts {
            short_ms: 1,
            medium_ms: 2,
            long_ms: 3,
        };
        assert_eq!(timeouts.for_class(TimeoutClass::Short), 1);
        assert_eq!(timeouts.for_class(TimeoutClass::Medium), 2);
        assert_eq!(timeouts.for_class(TimeoutClass::Long), 3);
    }

    #[test]
    fn default_mode_is_eu_transmit_only() {
        let config = Config::default();
        assert_eq!(config.mode.region, Region::Eu);
        assert_eq!(config.mode.duty, DutyMode::TransmitOnly);
    }
}
