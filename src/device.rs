//! ATA8520 Device Interface
//!
//! This module provides the protocol engine driving the module over SPI and
//! its three control lines. It sequences power-up and reset, issues commands
//! through the [`Frame`] codec and caches what it reads in a
//! [`DeviceState`].
//!
//! Every command follows the same handshake:
//! 1. Wait for EVENT low (short bound)
//! 2. Exchange the frame with chip select asserted
//! 3. Wait for EVENT low again, bounded by the command's timeout class
//! 4. Decode the response area
//!
//! Timed out commands are not retried. The module's internal state is then
//! unknown; [`Device::reset`] is the recovery path.
//!
//! # Example
//! ```no_run
//! use ata8520::{Config, Device, Error, Pins};
//! use embedded_hal::{delay::DelayNs, digital::{InputPin, OutputPin}, spi::SpiDevice};
//!
//! fn hello<SPI, RST, PWR, EVT, D>(
//!     spi: SPI,
//!     pins: Pins<RST, PWR, EVT>,
//!     delay: D,
//! ) -> Result<(), Error>
//! where
//!     SPI: SpiDevice,
//!     RST: OutputPin,
//!     PWR: OutputPin,
//!     EVT: InputPin,
//!     D: DelayNs,
//! {
//!     let mut device = Device::new(spi, pins, delay, Config::default());
//!     device.begin(false)?;
//!
//!     let status = device.send(b"HELLO")?;
//!     assert!(status.is_ok());
//!
//!     device.end()
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::commands::{
    CalibrateCrystal, ConfigDump, DeviceId, DeviceStatus, DutyMode, GetId, GetMeasurement,
    GetNetworkVersion, GetPac, GetRadioVersion, GetStatus, Mode, ModuleCommand, Pac,
    RadioStatus, ReadConfig, Region, SendFrame, SetMode, Stack, StartMeasurement, StatusKind,
    TestMode, TestParameters, TxBuffer, Version, WriteTxBuffer,
};
use crate::config::timing::{POWER_ON_SETTLE_MS, RESET_HOLD_MS, RESET_SETTLE_MS};
use crate::config::Config;
use crate::error::Error;
use crate::frame::Frame;
use crate::pins::Pins;
use crate::state::DeviceState;

/// Lifecycle of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Not started, or stopped with [`Device::end`]
    Uninitialized,
    /// Powered, reset and accepting commands
    Ready,
}

/// Driver for one ATA8520 module.
///
/// Owns the SPI device, the control lines and a delay provider. Operations
/// take `&mut self`, so at most one command is in flight at a time.
pub struct Device<SPI, RST, PWR, EVT, LED, DELAY> {
    spi: SPI,
    pins: Pins<RST, PWR, EVT, LED>,
    delay: DELAY,
    config: Config,
    state: DeviceState,
    phase: Phase,
    debug: bool,
}

impl<SPI, RST, PWR, EVT, LED, DELAY> Device<SPI, RST, PWR, EVT, LED, DELAY> {
    /// Creates a new Device with an empty state.
    ///
    /// No line is driven until [`begin`](Device::begin) is called.
    pub fn new(spi: SPI, pins: Pins<RST, PWR, EVT, LED>, delay: DELAY, config: Config) -> Self {
        Self {
            spi,
            pins,
            delay,
            config,
            state: DeviceState::default(),
            phase: Phase::Uninitialized,
            debug: false,
        }
    }

    /// Releases the SPI device, the control lines and the delay provider.
    pub fn release(self) -> (SPI, Pins<RST, PWR, EVT, LED>, DELAY) {
        (self.spi, self.pins, self.delay)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Cached state; reading it never touches the bus.
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Raw code from the last status read.
    pub fn status_code(&self, kind: StatusKind) -> u8 {
        self.state.status_code(kind)
    }

    /// Text for the network or radio code from the last status read.
    ///
    /// Codes outside the tables map to
    /// [`UNRECOGNIZED_STATUS`](crate::commands::UNRECOGNIZED_STATUS).
    pub fn status_message(&self, stack: Stack) -> &'static str {
        self.state.status_message(stack)
    }

    /// Mode acknowledged by the module.
    pub fn mode(&self) -> Option<Mode> {
        self.state.mode()
    }

    fn ensure_ready(&self) -> Result<(), Error> {
        match self.phase {
            Phase::Ready => Ok(()),
            Phase::Uninitialized => Err(Error::NotInitialized),
        }
    }
}

impl<SPI, RST, PWR, EVT, LED, DELAY> Device<SPI, RST, PWR, EVT, LED, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    PWR: OutputPin,
    EVT: InputPin,
    LED: OutputPin,
    DELAY: DelayNs,
{
    /// Executes a command on the module.
    ///
    /// # Errors
    /// * `on_timeout` - EVENT stayed high before or after the exchange
    /// * `Error::Transport` - SPI communication failed
    /// * `Error::Pin` - EVENT could not be read
    fn execute<C>(&mut self, command: C, on_timeout: Error) -> Result<C::ResponseParameters, Error>
    where
        C: ModuleCommand,
    {
        let mut frame = Frame::for_command(command)?;

        #[cfg(feature = "defmt")]
        defmt::trace!("command {=u8:#x}, {} bytes", frame.opcode(), frame.len());

        let short_ms = self.config.timeouts.short_ms;
        self.pins.wait_ready(&mut self.delay, short_ms, on_timeout)?;

        self.spi
            .transfer_in_place(frame.as_mut_bytes())
            .map_err(|_| Error::Transport)?;

        let bound_ms = self.config.timeouts.for_class(C::SPEC.timeout);
        if let Err(err) = self.pins.wait_ready(&mut self.delay, bound_ms, on_timeout) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "command {=u8:#x} not completed after {} ms",
                frame.opcode(),
                bound_ms
            );
            return Err(err);
        }

        frame.decode()
    }

    /// Drives the reset line and waits for the module to come up.
    fn pulse_reset(&mut self) -> Result<(), Error> {
        self.pins.set_reset(true)?;
        self.delay.delay_ms(RESET_HOLD_MS);
        self.pins.set_reset(false)?;
        self.delay.delay_ms(RESET_SETTLE_MS);

        let medium_ms = self.config.timeouts.medium_ms;
        self.pins
            .wait_ready(&mut self.delay, medium_ms, Error::InitTimeout)
    }

    /// Powers up and resets the module, then reads its status.
    ///
    /// When `preconfigured` is false the mode from [`Config::mode`] is
    /// written before the driver becomes ready.
    ///
    /// # Errors
    /// * `Error::InitTimeout` - EVENT did not go low within the medium bound
    /// * `Error::Transport` - SPI communication failed
    /// * `Error::Pin` - a control line failed
    pub fn begin(&mut self, preconfigured: bool) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("begin, preconfigured: {}", preconfigured);

        self.phase = Phase::Uninitialized;

        self.pins.set_power(true)?;
        self.delay.delay_ms(POWER_ON_SETTLE_MS);
        self.pulse_reset()?;

        let status = self.execute(GetStatus, Error::InitTimeout)?;

        let mode = if preconfigured {
            None
        } else {
            let mode = self.config.mode;
            self.execute(SetMode { mode }, Error::InitTimeout)?;
            Some(mode)
        };

        self.state = DeviceState {
            status,
            mode,
            ..DeviceState::default()
        };
        self.phase = Phase::Ready;

        #[cfg(feature = "defmt")]
        defmt::debug!("ready, status: {}", status);

        Ok(())
    }

    /// Sends up to 12 bytes as one uplink frame.
    ///
    /// Blocks until the module reports the end of the transmission, which
    /// can take several seconds. Returns the radio status read afterwards.
    ///
    /// # Errors
    /// * `Error::MessageTooLong` - more than 12 bytes; nothing is sent
    /// * `Error::CommandTimeout` - the transmission did not complete in time
    pub fn send(&mut self, message: &[u8]) -> Result<RadioStatus, Error> {
        self.ensure_ready()?;
        let buffer = TxBuffer::new(message)?;

        if self.debug {
            self.pins.set_led(true)?;
        }
        let result = self.transmit(buffer);
        let led = if self.debug {
            self.pins.set_led(false)
        } else {
            Ok(())
        };

        let status = result?;
        led?;

        self.state.status = status;
        self.state.last_send = Some(status.radio);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "sent {} bytes, radio status {=u8:#x}",
            message.len(),
            status.radio.code()
        );

        Ok(status.radio)
    }

    /// Sends a text message of up to 12 bytes.
    pub fn send_str(&mut self, message: &str) -> Result<RadioStatus, Error> {
        self.send(message.as_bytes())
    }

    fn transmit(&mut self, buffer: TxBuffer) -> Result<DeviceStatus, Error> {
        self.execute(WriteTxBuffer { buffer }, Error::CommandTimeout)?;
        self.execute(SendFrame, Error::CommandTimeout)?;
        self.execute(GetStatus, Error::CommandTimeout)
    }

    /// Reads the three status codes into the cached state.
    pub fn get_status(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        self.state.status = self.execute(GetStatus, Error::CommandTimeout)?;
        Ok(())
    }

    /// Reads the firmware version of one stack.
    ///
    /// The result is cached in the device state.
    pub fn get_version(&mut self, stack: Stack) -> Result<Version, Error> {
        self.ensure_ready()?;
        match stack {
            Stack::Network => {
                let version = self.execute(GetNetworkVersion, Error::CommandTimeout)?;
                self.state.network_version = Some(version);
                Ok(version)
            }
            Stack::Radio => {
                let version = self.execute(GetRadioVersion, Error::CommandTimeout)?;
                self.state.radio_version = Some(version);
                Ok(version)
            }
        }
    }

    /// Returns the device ID, reading it from the module on first use.
    pub fn get_id(&mut self) -> Result<DeviceId, Error> {
        self.ensure_ready()?;
        if let Some(id) = self.state.id {
            return Ok(id);
        }

        let id = self.execute(GetId, Error::CommandTimeout)?;
        self.state.id = Some(id);
        Ok(id)
    }

    /// Returns the PAC, reading it from the module on first use.
    pub fn get_pac(&mut self) -> Result<Pac, Error> {
        self.ensure_ready()?;
        if let Some(pac) = self.state.pac {
            return Ok(pac);
        }

        let pac = self.execute(GetPac, Error::CommandTimeout)?;
        self.state.pac = Some(pac);
        Ok(pac)
    }

    /// Resets the module through its reset line without cycling power.
    ///
    /// Cached state is kept.
    ///
    /// # Errors
    /// * `Error::InitTimeout` - the module did not come back up
    pub fn reset(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("reset");

        self.pulse_reset()
    }

    /// Measures supply voltage and temperature.
    ///
    /// The raw results are available through
    /// [`DeviceState::measurement`].
    pub fn get_temperature_internal(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;
        self.execute(StartMeasurement, Error::CommandTimeout)?;
        let measurement = self.execute(GetMeasurement, Error::CommandTimeout)?;
        self.state.measurement = Some(measurement);
        Ok(())
    }

    /// Selects region and duty mode.
    ///
    /// The cached mode changes only once the module has acknowledged.
    pub fn set_mode(&mut self, region: Region, duty: DutyMode) -> Result<(), Error> {
        self.ensure_ready()?;
        let mode = Mode { region, duty };
        self.execute(SetMode { mode }, Error::CommandTimeout)?;
        self.state.mode = Some(mode);
        Ok(())
    }

    /// Calibrates the crystal oscillator.
    ///
    /// Uses the long timeout class. Returns the radio status read afterwards.
    pub fn calibrate_crystal(&mut self) -> Result<RadioStatus, Error> {
        self.ensure_ready()?;
        self.execute(CalibrateCrystal, Error::CommandTimeout)?;
        let status = self.execute(GetStatus, Error::CommandTimeout)?;
        self.state.status = status;
        Ok(status.radio)
    }

    /// Starts the manufacturing test mode.
    pub fn test_mode(
        &mut self,
        frame_low: u8,
        frame_high: u8,
        channel_low: u8,
        channel_high: u8,
    ) -> Result<(), Error> {
        self.ensure_ready()?;
        let params = TestParameters {
            frame_low,
            frame_high,
            channel_low,
            channel_high,
        };
        self.execute(TestMode { params }, Error::CommandTimeout)?;
        Ok(())
    }

    /// Reads the module's configuration dump.
    pub fn read_config(&mut self) -> Result<ConfigDump, Error> {
        self.ensure_ready()?;
        self.execute(ReadConfig, Error::CommandTimeout)
    }

    /// Lights the LED during transmissions when enabled.
    pub fn set_debug(&mut self, on: bool) -> Result<(), Error> {
        self.debug = on;
        if !on {
            self.pins.set_led(false)?;
        }
        Ok(())
    }

    /// Powers the module down and clears the cached state.
    ///
    /// Every operation other than [`begin`](Device::begin) fails with
    /// `Error::NotInitialized` afterwards, including a second `end`.
    pub fn end(&mut self) -> Result<(), Error> {
        self.ensure_ready()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("end");

        self.phase = Phase::Uninitialized;
        self.state = DeviceState::default();
        self.pins.set_led(false)?;
        self.pins.set_power(false)
    }
}
