//! Error types for the driver
//!
//! This module defines error types for parameter validation
//! ([`ParameterError`]), configuration building ([`BuilderError`]) and
//! display session operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`ParameterError`] - An out-of-range geometry, address or command argument
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display session operations
//!
//! ## Example
//!
//! ```
//! use ssd1306_bridge::{Builder, BuilderError, Geometry, ParameterError};
//!
//! // Missing geometry
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingGeometry)));
//!
//! // Height must be a whole number of 8-row pages
//! let result = Geometry::new(128, 60);
//! assert!(matches!(result, Err(ParameterError::Height(60))));
//! ```

use crate::display::ControllerState;
use crate::interface::Transport;

/// Maximum number of columns (segment outputs) driven by the SSD1306
pub const MAX_COLUMNS: u16 = 128;

/// Maximum number of rows (COM outputs) driven by the SSD1306
pub const MAX_ROWS: u16 = 64;

/// An argument outside the range the panel or the protocol accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterError {
    /// Width must be a non-zero multiple of 8, at most [`MAX_COLUMNS`]
    Width(u16),
    /// Height must be a non-zero multiple of 8, at most [`MAX_ROWS`]
    Height(u16),
    /// Column window is reversed or extends past the panel width
    ColumnRange {
        /// First column
        start: u8,
        /// Last column (inclusive)
        end: u8,
    },
    /// Page window is reversed or extends past the last page
    PageRange {
        /// First page
        start: u8,
        /// Last page (inclusive)
        end: u8,
    },
    /// Display start line must be below the panel height
    StartLine(u8),
    /// I2C slave address must fit in 7 bits
    Address(u8),
    /// Transfer length must leave room for the control byte and one data byte
    TransferLength(usize),
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Width(width) => write!(
                f,
                "Invalid width {width} (multiple of 8, at most {MAX_COLUMNS})"
            ),
            Self::Height(height) => write!(
                f,
                "Invalid height {height} (multiple of 8, at most {MAX_ROWS})"
            ),
            Self::ColumnRange { start, end } => {
                write!(f, "Invalid column window {start}..={end}")
            }
            Self::PageRange { start, end } => write!(f, "Invalid page window {start}..={end}"),
            Self::StartLine(line) => write!(f, "Invalid start line {line}"),
            Self::Address(address) => write!(f, "Invalid I2C address {address:#04x}"),
            Self::TransferLength(len) => write!(f, "Invalid transfer length {len}"),
        }
    }
}

impl core::error::Error for ParameterError {}

/// Errors that can occur when driving the display
///
/// Generic over the transport type to preserve the specific error type.
/// This allows error handling code to match on the underlying bus error,
/// e.g. to tell a missing acknowledgment apart from a dead bridge.
#[derive(Debug)]
pub enum Error<T: Transport> {
    /// Caller supplied an out-of-range geometry, address or command argument
    InvalidParameter(ParameterError),
    /// Operation is not allowed from the current controller state
    InvalidStateTransition {
        /// State the session was in
        from: ControllerState,
        /// State the operation would have entered
        to: ControllerState,
    },
    /// [`Display::initialize`](crate::Display::initialize) was already performed
    AlreadyInitialized,
    /// Operation requires an active (initialized and awake) display
    NotActive,
    /// The transport rejected a transfer
    ///
    /// Wraps the underlying error from the [`Transport`] implementation.
    TransportFailure(T::Error),
}

impl<T: Transport> From<ParameterError> for Error<T> {
    fn from(err: ParameterError) -> Self {
        Self::InvalidParameter(err)
    }
}

impl<T: Transport> core::fmt::Display for Error<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidParameter(err) => write!(f, "Invalid parameter: {err}"),
            Self::InvalidStateTransition { from, to } => {
                write!(f, "Invalid state transition: {from} -> {to}")
            }
            Self::AlreadyInitialized => write!(f, "Display already initialized"),
            Self::NotActive => write!(f, "Display is not active"),
            Self::TransportFailure(err) => write!(f, "Transport failure: {err:?}"),
        }
    }
}

impl<T: Transport + core::fmt::Debug> core::error::Error for Error<T> {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug, PartialEq, Eq)]
pub enum BuilderError {
    /// Geometry was not specified
    ///
    /// [`Builder::geometry()`](crate::config::Builder::geometry) must be called before building.
    MissingGeometry,
    /// A configured value is out of range
    InvalidParameter(ParameterError),
}

impl From<ParameterError> for BuilderError {
    fn from(err: ParameterError) -> Self {
        Self::InvalidParameter(err)
    }
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingGeometry => write!(f, "Geometry must be specified"),
            Self::InvalidParameter(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for BuilderError {}
