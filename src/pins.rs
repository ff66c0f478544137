//! Control lines of the module
//!
//! The module is wired with three dedicated lines besides SPI:
//! - RESET (output, active low)
//! - PWRON (output, high powers the module)
//! - EVENT (input, active low): the module pulls it low when it is ready for
//!   the next command or has completed the previous one
//!
//! An optional LED shows transmissions when debugging is enabled. The SPI
//! chip select belongs to the [`SpiDevice`](embedded_hal::spi::SpiDevice)
//! passed to the driver.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::config::timing::POLL_INTERVAL_US;
use crate::error::Error;

/// Placeholder for boards without a status LED
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLed;

impl ErrorType for NoLed {
    type Error = Infallible;
}

impl OutputPin for NoLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// GPIO lines used by the driver
pub struct Pins<RST, PWR, EVT, LED = NoLed> {
    pub reset: RST,
    pub power: PWR,
    pub event: EVT,
    pub led: LED,
}

impl<RST, PWR, EVT> Pins<RST, PWR, EVT, NoLed> {
    pub fn new(reset: RST, power: PWR, event: EVT) -> Self {
        Self {
            reset,
            power,
            event,
            led: NoLed,
        }
    }

    /// Adds a status LED
    pub fn with_led<LED: OutputPin>(self, led: LED) -> Pins<RST, PWR, EVT, LED> {
        Pins {
            reset: self.reset,
            power: self.power,
            event: self.event,
            led,
        }
    }
}

impl<RST, PWR, EVT, LED> Pins<RST, PWR, EVT, LED>
where
    RST: OutputPin,
    PWR: OutputPin,
    EVT: InputPin,
    LED: OutputPin,
{
    pub(crate) fn set_power(&mut self, on: bool) -> Result<(), Error> {
        if on {
            self.power.set_high().map_err(|_| Error::Pin)
        } else {
            self.power.set_low().map_err(|_| Error::Pin)
        }
    }

    pub(crate) fn set_reset(&mut self, asserted: bool) -> Result<(), Error> {
        if asserted {
            self.reset.set_low().map_err(|_| Error::Pin)
        } else {
            self.reset.set_high().map_err(|_| Error::Pin)
        }
    }

    pub(crate) fn set_led(&mut self, on: bool) -> Result<(), Error> {
        if on {
            self.led.set_high().map_err(|_| Error::Pin)
        } else {
            self.led.set_low().map_err(|_| Error::Pin)
        }
    }

    /// Polls EVENT until it reads low
    ///
    /// Returns `on_timeout` once `timeout_ms` has elapsed without the line
    /// going low.
    pub(crate) fn wait_ready<D: DelayNs>(
        &mut self,
        delay: &mut D,
        timeout_ms: u32,
        on_timeout: Error,
    ) -> Result<(), Error> {
        let limit_us = u64::from(timeout_ms) * 1_000;
        let mut waited_us: u64 = 0;

        loop {
            if self.event.is_low().map_err(|_| Error::Pin)? {
                return Ok(());
            }
            if waited_us >= limit_us {
                return Err(on_timeout);
            }
            delay.delay_us(POLL_INTERVAL_US);
            waited_us += u64::from(POLL_INTERVAL_US);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Line {
        low_after_polls: u32,
        polls: u32,
    }

    impl ErrorType for Line {
        type Error = Infallible;
    }

    impl InputPin for Line {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.polls += 1;
            Ok(self.polls > self.low_after_polls)
        }
    }

    #[derive(Default)]
    struct Clock {
        elapsed_ns: u64,
    }

    impl DelayNs for Clock {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_ns += u64::from(ns);
        }
    }

    fn pins(low_after_polls: u32) -> Pins<NoLed, NoLed, Line> {
        Pins::new(
            NoLed,
            NoLed,
            Line {
                low_after_polls,
                polls: 0,
            },
        )
    }

    #[test]
    fn ready_line_low_returns_immediately() {
        let mut pins = pins(0);
        let mut clock = Clock::default();
        assert_eq!(pins.wait_ready(&mut clock, 1, Error::CommandTimeout), Ok(()));
        assert_eq!(clock.elapsed_ns, 0);
    }

    #[test]
    fn waits_one_interval_per_busy_poll() {
        let mut pins = pins(3);
        let mut clock = Clock::default();
        assert_eq!(pins.wait_ready(&mut clock, 1, Error::CommandTimeout), Ok(()));
        assert_eq!(clock.elapsed_ns, 3 * u64::from(POLL_INTERVAL_US) * 1_000);
    }

    #[test]
    fn stuck_line_reports_the_given_timeout() {
        let mut pins = pins(u32::MAX);
        let mut clock = Clock::default();
        assert_eq!(
            pins.wait_ready(&mut clock, 2, Error::InitTimeout),
            Err(Error::InitTimeout)
        );
        assert!(clock.elapsed_ns >= 2_000_000);
    }
}
