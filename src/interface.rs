//! Transport abstraction
//!
//! This module provides the [`Transport`] trait through which the display
//! session reaches the panel, and [`I2cTransport`], an implementation for
//! any `embedded-hal` v1.0 I2C bus.
//!
//! ## Hardware Requirements
//!
//! The SSD1306 sits on an I2C bus behind a bridge chip that tunnels bus
//! transactions over a host-side serial link. The driver only needs:
//! - a way to write a command transfer to the slave address
//! - a way to write a data transfer to the slave address
//!
//! Transfers arrive already framed with their control byte (see
//! [`command`](crate::command)), so a transport never inspects or prefixes
//! the bytes it is given.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ssd1306_bridge::{I2cTransport, Transport};
//! # use core::convert::Infallible;
//! # use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = Infallible; }
//! # impl I2c<SevenBitAddress> for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! // Bridge exposes the panel bus as an embedded-hal I2C bus
//! let mut transport = I2cTransport::new(MockI2c, 0x3C);
//!
//! // Display off
//! let _ = transport.send_command(&[0x00, 0xAE]);
//!
//! // One data byte
//! let _ = transport.send_data(&[0x40, 0x01]);
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::config::Config;

type TransportResult<E> = core::result::Result<(), E>;

/// Trait for the byte transport towards the SSD1306 controller
///
/// This trait abstracts over the bridge chip and host link, allowing the
/// [`Display`](crate::display::Display) to work with anything that can move
/// framed transfers to the panel.
///
/// ## Implementing
///
/// For an `embedded-hal` I2C bus, use the provided [`I2cTransport`]. A
/// bridge with its own host protocol can implement this trait directly.
/// Retry and timeout policy belongs to the implementation.
pub trait Transport {
    /// Error type for transport operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send one framed command transfer
    ///
    /// `bytes` starts with the [`COMMAND_MODE`](crate::command::COMMAND_MODE)
    /// control byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer could not be delivered, e.g. the
    /// controller did not acknowledge its address.
    fn send_command(&mut self, bytes: &[u8]) -> TransportResult<Self::Error>;

    /// Send one framed data transfer
    ///
    /// `bytes` starts with the [`DATA_MODE`](crate::command::DATA_MODE)
    /// control byte.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer could not be delivered.
    fn send_data(&mut self, bytes: &[u8]) -> TransportResult<Self::Error>;
}

/// Lend a transport to a display without giving up ownership
impl<T> Transport for &mut T
where
    T: Transport + ?Sized,
{
    type Error = T::Error;

    fn send_command(&mut self, bytes: &[u8]) -> TransportResult<Self::Error> {
        T::send_command(self, bytes)
    }

    fn send_data(&mut self, bytes: &[u8]) -> TransportResult<Self::Error> {
        T::send_data(self, bytes)
    }
}

/// Transport over an `embedded-hal` v1.0 I2C bus
///
/// Every transfer becomes a single I2C write to the slave address.
///
/// ## Missing acknowledgments
///
/// Some modules bring out separate SDA-in and SDA-out lines. Unless both are
/// tied together the controller's ACK never reaches the bus master, and every
/// write reports [`ErrorKind::NoAcknowledge`]. Setting
/// [`ignore_ack_errors`](Self::set_ignore_ack_errors) treats those errors as
/// success. Note that a wrong slave address then goes unnoticed.
#[derive(Debug)]
pub struct I2cTransport<I2C> {
    /// I2C bus (usually provided by the bridge chip's host driver)
    i2c: I2C,
    /// 7-bit slave address of the controller
    address: u8,
    /// Treat NACK errors as delivered transfers
    ignore_ack_errors: bool,
}

impl<I2C> I2cTransport<I2C>
where
    I2C: I2c,
{
    /// Create a new transport for the controller at `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            ignore_ack_errors: false,
        }
    }

    /// Create a transport addressing the controller named in `config`
    pub fn from_config(i2c: I2C, config: &Config) -> Self {
        Self::new(i2c, config.i2c_address)
    }

    /// Set whether missing acknowledgments are ignored
    ///
    /// Default is false: every NACK surfaces as an error.
    pub fn set_ignore_ack_errors(&mut self, ignore: bool) -> &mut Self {
        self.ignore_ack_errors = ignore;
        self
    }

    /// Whether missing acknowledgments are ignored
    pub fn ignore_ack_errors(&self) -> bool {
        self.ignore_ack_errors
    }

    /// Slave address transfers are sent to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write(&mut self, bytes: &[u8]) -> TransportResult<I2C::Error> {
        match self.i2c.write(self.address, bytes) {
            Err(err) if self.ignore_ack_errors && is_nack(err.kind()) => {
                log::warn!(
                    "ignoring missing ACK from {:#04x} ({} bytes)",
                    self.address,
                    bytes.len()
                );
                Ok(())
            }
            result => result,
        }
    }
}

fn is_nack(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::NoAcknowledge(_))
}

impl<I2C> Transport for I2cTransport<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn send_command(&mut self, bytes: &[u8]) -> TransportResult<Self::Error> {
        self.write(bytes)
    }

    fn send_data(&mut self, bytes: &[u8]) -> TransportResult<Self::Error> {
        self.write(bytes)
    }
}
