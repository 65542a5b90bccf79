//! Display configuration types and builder

pub use crate::error::{BuilderError, MAX_COLUMNS, MAX_ROWS, ParameterError};

/// Default 7-bit I2C address of SSD1306 modules (0x3D with the address jumper set)
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Default contrast written during initialization
pub const DEFAULT_CONTRAST: u8 = 0xCF;

/// Panel geometry in pixels
///
/// Both dimensions are multiples of 8; the height is split into 8-row pages.
/// Fields are private so a `Geometry` value is always valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    width: u16,
    height: u16,
}

impl Geometry {
    /// Create a new geometry with validation
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Width`] or [`ParameterError::Height`] if a
    /// dimension is zero, not a multiple of 8, or larger than the controller
    /// supports ([`MAX_COLUMNS`] x [`MAX_ROWS`]).
    pub fn new(width: u16, height: u16) -> Result<Self, ParameterError> {
        if width == 0 || width > MAX_COLUMNS || width % 8 != 0 {
            return Err(ParameterError::Width(width));
        }
        if height == 0 || height > MAX_ROWS || height % 8 != 0 {
            return Err(ParameterError::Height(height));
        }
        Ok(Self { width, height })
    }

    /// Width in pixels (columns)
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels (rows)
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> u16 {
        self.height / 8
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        (self.width as usize * self.height as usize) / 8
    }

    /// Whether the pixel lies on the panel
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < i32::from(self.width) && y < i32::from(self.height)
    }
}

/// COM pins hardware configuration (register 0xDA)
///
/// Depends on how the module routes the COM lines to the glass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ComPins {
    /// Sequential COM pins, used by 128x32 modules
    Sequential = 0x02,
    /// Alternative COM pins, used by 128x64 and most other modules
    Alternative = 0x12,
}

impl ComPins {
    /// The usual wiring for a panel of the given height
    pub fn for_height(height: u16) -> Self {
        if height == 32 {
            Self::Sequential
        } else {
            Self::Alternative
        }
    }
}

/// How the panel drive voltage (VCC) is supplied
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VccMode {
    /// Generated from VBAT by the internal charge pump
    #[default]
    SwitchCap,
    /// Supplied externally (7..12V), charge pump disabled
    External,
}

impl VccMode {
    /// Charge pump setting byte (command 0x8D)
    pub fn charge_pump(self) -> u8 {
        match self {
            Self::SwitchCap => 0x14,
            Self::External => 0x10,
        }
    }

    /// Pre-charge period byte (command 0xD9)
    pub fn precharge(self) -> u8 {
        match self {
            Self::SwitchCap => 0xF1,
            Self::External => 0x22,
        }
    }
}

/// Display configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Panel geometry
    pub geometry: Geometry,
    /// 7-bit I2C slave address of the controller
    pub i2c_address: u8,
    /// COM pins hardware configuration
    pub com_pins: ComPins,
    /// VCC supply mode
    pub vcc: VccMode,
    /// Contrast written during initialization
    pub contrast: u8,
    /// Upper bound on bytes per transfer, control byte included
    ///
    /// `None` sends every flush as a single data transfer.
    pub max_transfer_len: Option<usize>,
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use ssd1306_bridge::{Builder, ComPins, Geometry};
///
/// let geometry = match Geometry::new(128, 32) {
///     Ok(geometry) => geometry,
///     Err(_) => return,
/// };
/// let config = match Builder::new().geometry(geometry).i2c_address(0x3D).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.com_pins, ComPins::Sequential);
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    geometry: Option<Geometry>,
    i2c_address: Option<u8>,
    com_pins: Option<ComPins>,
    vcc: VccMode,
    contrast: Option<u8>,
    max_transfer_len: Option<usize>,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel geometry (required)
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the I2C slave address (default 0x3C)
    pub fn i2c_address(mut self, address: u8) -> Self {
        self.i2c_address = Some(address);
        self
    }

    /// Override the COM pins configuration derived from the height
    pub fn com_pins(mut self, com_pins: ComPins) -> Self {
        self.com_pins = Some(com_pins);
        self
    }

    /// Set the VCC supply mode
    pub fn vcc(mut self, vcc: VccMode) -> Self {
        self.vcc = vcc;
        self
    }

    /// Set the initial contrast (default 0xCF)
    pub fn contrast(mut self, contrast: u8) -> Self {
        self.contrast = Some(contrast);
        self
    }

    /// Limit the size of a single transfer, control byte included
    ///
    /// Bridges with small message buffers need this; the FF32 bridge for
    /// instance accepts 60 bytes per message.
    pub fn max_transfer_len(mut self, len: usize) -> Self {
        self.max_transfer_len = Some(len);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingGeometry` if the geometry was not set,
    /// or `BuilderError::InvalidParameter` for an address wider than 7 bits
    /// or a transfer length below 2.
    pub fn build(self) -> Result<Config, BuilderError> {
        let geometry = self.geometry.ok_or(BuilderError::MissingGeometry)?;

        let i2c_address = self.i2c_address.unwrap_or(DEFAULT_I2C_ADDRESS);
        if i2c_address > 0x7F {
            return Err(ParameterError::Address(i2c_address).into());
        }

        if let Some(len) = self.max_transfer_len {
            if len < 2 {
                return Err(ParameterError::TransferLength(len).into());
            }
        }

        Ok(Config {
            geometry,
            i2c_address,
            com_pins: self
                .com_pins
                .unwrap_or_else(|| ComPins::for_height(geometry.height())),
            vcc: self.vcc,
            contrast: self.contrast.unwrap_or(DEFAULT_CONTRAST),
            max_transfer_len: self.max_transfer_len,
        })
    }
}
