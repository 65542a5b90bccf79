//! SSD1306 OLED Driver Core
//!
//! A driver for SSD1306 monochrome OLED panels (up to 128x64 pixels) whose
//! I2C bus is reached through a bridge chip, such as a USB-to-I2C adapter.
//!
//! ## Features
//!
//! - `no_std` compatible, no allocation
//! - `embedded-hal` v1.0 I2C support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Dirty region tracking: a flush only sends the bytes that changed
//! - Transfer size limit for bridges with small message buffers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
//! use ssd1306_bridge::{Builder, Display, Geometry, I2cTransport};
//!
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
//! # let i2c = MockI2c;
//! let geometry = match Geometry::new(128, 64) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().geometry(geometry).max_transfer_len(60).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let transport = I2cTransport::from_config(i2c, &config);
//! let mut display = Display::new(transport, config);
//! if display.initialize().is_err() {
//!     return;
//! }
//!
//! display.fill_rect(10, 10, 20, 8, true);
//! let _ = display.flush();
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// SSD1306 command definitions and transfer encoding
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Display session and controller state
pub mod display;
/// Error types for the driver
pub mod error;
/// Page-packed framebuffer with dirty tracking
pub mod framebuffer;
/// Transport abstraction
pub mod interface;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use command::{AddressingMode, Command};
pub use config::{
    Builder, ComPins, Config, DEFAULT_CONTRAST, DEFAULT_I2C_ADDRESS, Geometry, MAX_COLUMNS,
    MAX_ROWS, VccMode,
};
pub use display::{ControllerState, Display};
pub use error::{BuilderError, Error, ParameterError};
pub use framebuffer::{Bitmap, BitmapSource, DirtyRegion, Framebuffer, MAX_BUFFER_SIZE};
pub use interface::{I2cTransport, Transport};
