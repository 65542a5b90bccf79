//! SSD1306 command encoder
//!
//! This module defines the command bytes of the SSD1306 OLED controller and
//! pure functions that turn display operations into framed transfers. Over
//! I2C every transfer starts with a control byte telling the controller how
//! to interpret the rest:
//!
//! - [`COMMAND_MODE`] (0x00): the following bytes are a command and its arguments
//! - [`DATA_MODE`] (0x40): the following bytes are written to display RAM
//!
//! The encoder never talks to the bus and keeps no state. A function either
//! returns complete transfers or an error, so a rejected argument never
//! leaves a half-sent sequence behind.
//!
//! ## Example
//!
//! ```
//! use ssd1306_bridge::command;
//!
//! assert_eq!(command::set_contrast(0x7F).as_bytes(), &[0x00, 0x81, 0x7F]);
//! assert_eq!(command::display_on().as_bytes(), &[0x00, 0xAF]);
//! ```

use crate::config::{Config, Geometry};
use crate::error::ParameterError;

/// Control byte preceding command bytes (Co=0, D/C#=0)
pub const COMMAND_MODE: u8 = 0x00;

/// Control byte preceding display RAM data (Co=0, D/C#=1)
pub const DATA_MODE: u8 = 0x40;

// Fundamental commands

/// Set contrast control (0x81), followed by 1 byte
pub const SET_CONTRAST: u8 = 0x81;

/// Resume display from RAM content (0xA4)
pub const DISPLAY_ALL_ON_RESUME: u8 = 0xA4;

/// Light every pixel regardless of RAM (0xA5)
pub const DISPLAY_ALL_ON: u8 = 0xA5;

/// Normal display, RAM bit 1 = pixel on (0xA6)
pub const NORMAL_DISPLAY: u8 = 0xA6;

/// Inverted display, RAM bit 0 = pixel on (0xA7)
pub const INVERT_DISPLAY: u8 = 0xA7;

/// Display off, controller in sleep mode (0xAE)
pub const DISPLAY_OFF: u8 = 0xAE;

/// Display on (0xAF)
pub const DISPLAY_ON: u8 = 0xAF;

// Addressing

/// Memory addressing mode (0x20), followed by 1 byte
pub const SET_MEMORY_MODE: u8 = 0x20;

/// Column address window (0x21), followed by start and end column
pub const SET_COLUMN_ADDRESS: u8 = 0x21;

/// Page address window (0x22), followed by start and end page
pub const SET_PAGE_ADDRESS: u8 = 0x22;

// Hardware configuration

/// Display start line (0x40 | line)
pub const SET_START_LINE: u8 = 0x40;

/// Segment remap base (0xA0 = column 0 on SEG0, 0xA1 = column 127 on SEG0)
pub const SEG_REMAP: u8 = 0xA0;

/// Multiplex ratio (0xA8), followed by rows - 1
pub const SET_MULTIPLEX: u8 = 0xA8;

/// COM output scan from COM0 upwards (0xC0)
pub const COM_SCAN_INC: u8 = 0xC0;

/// COM output scan from COM[N-1] downwards (0xC8)
pub const COM_SCAN_DEC: u8 = 0xC8;

/// Vertical display offset (0xD3), followed by 1 byte
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;

/// COM pins hardware configuration (0xDA), followed by 1 byte
pub const SET_COM_PINS: u8 = 0xDA;

// Timing and driving scheme

/// Display clock divide ratio / oscillator frequency (0xD5), followed by 1 byte
pub const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;

/// Pre-charge period (0xD9), followed by 1 byte
pub const SET_PRECHARGE: u8 = 0xD9;

/// VCOMH deselect level (0xDB), followed by 1 byte
pub const SET_VCOM_DETECT: u8 = 0xDB;

/// Charge pump setting (0x8D), followed by 1 byte
pub const CHARGE_PUMP: u8 = 0x8D;

/// Number of command transfers produced by [`initialize`]
pub const INIT_SEQUENCE_LEN: usize = 19;

/// Longest command transfer: control byte, opcode and two arguments
const MAX_COMMAND_LEN: usize = 4;

/// Memory addressing mode (register 0x20)
///
/// Governs how the column/page cursor advances as data bytes are streamed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressingMode {
    /// Column advances, then wraps to the next page of the window
    #[default]
    Horizontal = 0x00,
    /// Page advances, then wraps to the next column of the window
    Vertical = 0x01,
    /// Column advances within a single page, no wrap
    Page = 0x02,
}

/// A single framed command transfer
///
/// Holds the [`COMMAND_MODE`] control byte followed by the opcode and its
/// arguments, ready to hand to [`Transport::send_command`](crate::Transport::send_command).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Command {
    bytes: [u8; MAX_COMMAND_LEN],
    len: u8,
}

impl Command {
    const fn new(opcode: u8) -> Self {
        Self {
            bytes: [COMMAND_MODE, opcode, 0, 0],
            len: 2,
        }
    }

    const fn with_arg(opcode: u8, arg: u8) -> Self {
        Self {
            bytes: [COMMAND_MODE, opcode, arg, 0],
            len: 3,
        }
    }

    const fn with_args(opcode: u8, first: u8, second: u8) -> Self {
        Self {
            bytes: [COMMAND_MODE, opcode, first, second],
            len: 4,
        }
    }

    /// The framed bytes, control byte included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// The opcode byte
    pub fn opcode(&self) -> u8 {
        self.bytes[1]
    }

    /// Arguments following the opcode
    pub fn args(&self) -> &[u8] {
        &self.bytes[2..self.len as usize]
    }
}

impl core::fmt::Debug for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Command({:02X?})", self.as_bytes())
    }
}

/// Full power-on sequence for the configured panel
///
/// Ends with the display switched on, horizontal addressing selected and
/// the address window covering the whole panel.
pub fn initialize(config: &Config) -> [Command; INIT_SEQUENCE_LEN] {
    let geometry = config.geometry;
    let charge_pump = config.vcc.charge_pump();
    [
        display_off(),
        Command::with_arg(SET_DISPLAY_CLOCK_DIV, 0x80),
        Command::with_arg(SET_MULTIPLEX, (geometry.height() - 1) as u8),
        Command::with_arg(SET_DISPLAY_OFFSET, 0x00),
        Command::new(SET_START_LINE),
        Command::with_arg(CHARGE_PUMP, charge_pump),
        Command::new(SEG_REMAP | 0x01),
        Command::new(COM_SCAN_DEC),
        Command::with_arg(SET_COM_PINS, config.com_pins as u8),
        set_contrast(config.contrast),
        Command::with_arg(SET_PRECHARGE, config.vcc.precharge()),
        Command::with_arg(SET_VCOM_DETECT, 0x40),
        Command::new(DISPLAY_ALL_ON_RESUME),
        set_invert(false),
        set_addressing_mode(AddressingMode::Horizontal),
        Command::with_args(SET_COLUMN_ADDRESS, 0, (geometry.width() - 1) as u8),
        Command::with_args(SET_PAGE_ADDRESS, 0, (geometry.pages() - 1) as u8),
        // Charge pump must be enabled right before the panel is switched on
        Command::with_arg(CHARGE_PUMP, charge_pump),
        display_on(),
    ]
}

/// Contrast control, 0x00 (dimmest) to 0xFF (brightest)
pub fn set_contrast(value: u8) -> Command {
    Command::with_arg(SET_CONTRAST, value)
}

/// Restrict data writes to a rectangle of columns and pages
///
/// Bounds are inclusive. In horizontal addressing mode the cursor walks the
/// window column by column, page by page.
///
/// # Errors
///
/// Returns [`ParameterError::ColumnRange`] or [`ParameterError::PageRange`]
/// if a range is reversed or reaches past the panel.
pub fn set_addressing_window(
    geometry: &Geometry,
    col_start: u8,
    col_end: u8,
    page_start: u8,
    page_end: u8,
) -> Result<[Command; 2], ParameterError> {
    if col_start > col_end || u16::from(col_end) >= geometry.width() {
        return Err(ParameterError::ColumnRange {
            start: col_start,
            end: col_end,
        });
    }
    if page_start > page_end || u16::from(page_end) >= geometry.pages() {
        return Err(ParameterError::PageRange {
            start: page_start,
            end: page_end,
        });
    }
    Ok([
        Command::with_args(SET_COLUMN_ADDRESS, col_start, col_end),
        Command::with_args(SET_PAGE_ADDRESS, page_start, page_end),
    ])
}

/// Select the memory addressing mode
pub fn set_addressing_mode(mode: AddressingMode) -> Command {
    Command::with_arg(SET_MEMORY_MODE, mode as u8)
}

/// Switch the panel on
pub fn display_on() -> Command {
    Command::new(DISPLAY_ON)
}

/// Switch the panel off (sleep), RAM is retained
pub fn display_off() -> Command {
    Command::new(DISPLAY_OFF)
}

/// Inverted or normal pixel polarity
pub fn set_invert(inverted: bool) -> Command {
    if inverted {
        Command::new(INVERT_DISPLAY)
    } else {
        Command::new(NORMAL_DISPLAY)
    }
}

/// Rotate the picture by 180 degrees (mirror both segments and COM scan)
pub fn set_flipped(flipped: bool) -> [Command; 2] {
    if flipped {
        [Command::new(SEG_REMAP), Command::new(COM_SCAN_INC)]
    } else {
        [Command::new(SEG_REMAP | 0x01), Command::new(COM_SCAN_DEC)]
    }
}

/// Map display RAM row `line` to the top of the panel
///
/// # Errors
///
/// Returns [`ParameterError::StartLine`] if `line` is not below the panel height.
pub fn set_start_line(line: u8, geometry: &Geometry) -> Result<Command, ParameterError> {
    if u16::from(line) >= geometry.height() {
        return Err(ParameterError::StartLine(line));
    }
    Ok(Command::new(SET_START_LINE | line))
}

/// Frame the next run of display data into `out`
///
/// Writes the [`DATA_MODE`] control byte followed by up to `out.len() - 1`
/// bytes pulled from `bytes`. Returns the framed length, or 0 once `bytes`
/// is exhausted (or `out` cannot hold any data).
pub fn encode_data<I>(bytes: &mut I, out: &mut [u8]) -> usize
where
    I: Iterator<Item = u8>,
{
    let Some((control, payload)) = out.split_first_mut() else {
        return 0;
    };
    let mut len = 0;
    for (slot, byte) in payload.iter_mut().zip(bytes.by_ref()) {
        *slot = byte;
        len += 1;
    }
    if len == 0 {
        return 0;
    }
    *control = DATA_MODE;
    len + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, VccMode};

    fn config(width: u16, height: u16) -> Config {
        Builder::new()
            .geometry(Geometry::new(width, height).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_every_command_starts_with_command_mode() {
        for cmd in initialize(&config(128, 64)) {
            assert_eq!(cmd.as_bytes()[0], COMMAND_MODE);
        }
    }

    #[test]
    fn test_initialize_128x64() {
        let seq = initialize(&config(128, 64));
        let framed: alloc::vec::Vec<&[u8]> = seq.iter().map(Command::as_bytes).collect();
        assert_eq!(
            framed,
            alloc::vec![
                &[0x00, 0xAE][..],
                &[0x00, 0xD5, 0x80],
                &[0x00, 0xA8, 63],
                &[0x00, 0xD3, 0x00],
                &[0x00, 0x40],
                &[0x00, 0x8D, 0x14],
                &[0x00, 0xA1],
                &[0x00, 0xC8],
                &[0x00, 0xDA, 0x12],
                &[0x00, 0x81, 0xCF],
                &[0x00, 0xD9, 0xF1],
                &[0x00, 0xDB, 0x40],
                &[0x00, 0xA4],
                &[0x00, 0xA6],
                &[0x00, 0x20, 0x00],
                &[0x00, 0x21, 0, 127],
                &[0x00, 0x22, 0, 7],
                &[0x00, 0x8D, 0x14],
                &[0x00, 0xAF],
            ]
        );
    }

    #[test]
    fn test_initialize_128x32_uses_sequential_com_pins() {
        let seq = initialize(&config(128, 32));
        let find = |opcode| seq.iter().find(|cmd| cmd.opcode() == opcode).unwrap();
        assert_eq!(find(SET_MULTIPLEX).args(), &[31]);
        assert_eq!(find(SET_COM_PINS).args(), &[0x02]);
        assert_eq!(find(SET_PAGE_ADDRESS).args(), &[0, 3]);
    }

    #[test]
    fn test_initialize_external_vcc() {
        let config = Builder::new()
            .geometry(Geometry::new(128, 64).unwrap())
            .vcc(VccMode::External)
            .contrast(0x9F)
            .build()
            .unwrap();
        let seq = initialize(&config);
        let pumps: alloc::vec::Vec<_> = seq
            .iter()
            .filter(|cmd| cmd.opcode() == CHARGE_PUMP)
            .map(|cmd| cmd.args()[0])
            .collect();
        assert_eq!(pumps, alloc::vec![0x10, 0x10]);
        let precharge = seq.iter().find(|cmd| cmd.opcode() == SET_PRECHARGE).unwrap();
        assert_eq!(precharge.args(), &[0x22]);
        let contrast = seq.iter().find(|cmd| cmd.opcode() == SET_CONTRAST).unwrap();
        assert_eq!(contrast.args(), &[0x9F]);
    }

    #[test]
    fn test_charge_pump_precedes_display_on() {
        let seq = initialize(&config(128, 64));
        assert_eq!(seq[INIT_SEQUENCE_LEN - 2].opcode(), CHARGE_PUMP);
        assert_eq!(seq[INIT_SEQUENCE_LEN - 1].opcode(), DISPLAY_ON);
    }

    #[test]
    fn test_addressing_window() {
        let geometry = Geometry::new(128, 64).unwrap();
        let [cols, pages] = set_addressing_window(&geometry, 3, 10, 1, 2).unwrap();
        assert_eq!(cols.as_bytes(), &[0x00, 0x21, 3, 10]);
        assert_eq!(pages.as_bytes(), &[0x00, 0x22, 1, 2]);
    }

    #[test]
    fn test_addressing_window_rejects_out_of_range() {
        let geometry = Geometry::new(128, 32).unwrap();
        assert_eq!(
            set_addressing_window(&geometry, 0, 128, 0, 0),
            Err(ParameterError::ColumnRange { start: 0, end: 128 })
        );
        assert_eq!(
            set_addressing_window(&geometry, 5, 4, 0, 0),
            Err(ParameterError::ColumnRange { start: 5, end: 4 })
        );
        assert_eq!(
            set_addressing_window(&geometry, 0, 127, 0, 4),
            Err(ParameterError::PageRange { start: 0, end: 4 })
        );
        assert_eq!(
            set_addressing_window(&geometry, 0, 127, 2, 1),
            Err(ParameterError::PageRange { start: 2, end: 1 })
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(display_on().as_bytes(), &[0x00, 0xAF]);
        assert_eq!(display_off().as_bytes(), &[0x00, 0xAE]);
        assert_eq!(set_invert(true).as_bytes(), &[0x00, 0xA7]);
        assert_eq!(set_invert(false).as_bytes(), &[0x00, 0xA6]);
        assert_eq!(set_contrast(0x00).as_bytes(), &[0x00, 0x81, 0x00]);
        assert_eq!(set_contrast(0xFF).as_bytes(), &[0x00, 0x81, 0xFF]);
        assert_eq!(
            set_addressing_mode(AddressingMode::Vertical).as_bytes(),
            &[0x00, 0x20, 0x01]
        );
        assert_eq!(
            set_addressing_mode(AddressingMode::Page).as_bytes(),
            &[0x00, 0x20, 0x02]
        );
    }

    #[test]
    fn test_flip_commands() {
        let [seg, com] = set_flipped(true);
        assert_eq!((seg.opcode(), com.opcode()), (0xA0, 0xC0));
        let [seg, com] = set_flipped(false);
        assert_eq!((seg.opcode(), com.opcode()), (0xA1, 0xC8));
    }

    #[test]
    fn test_start_line() {
        let geometry = Geometry::new(128, 32).unwrap();
        assert_eq!(
            set_start_line(31, &geometry).unwrap().as_bytes(),
            &[0x00, 0x5F]
        );
        assert_eq!(
            set_start_line(32, &geometry),
            Err(ParameterError::StartLine(32))
        );
    }

    #[test]
    fn test_encode_data_frames_chunks() {
        let mut bytes = [1u8, 2, 3, 4, 5].into_iter();
        let mut out = [0u8; 3];

        assert_eq!(encode_data(&mut bytes, &mut out), 3);
        assert_eq!(out, [DATA_MODE, 1, 2]);
        assert_eq!(encode_data(&mut bytes, &mut out), 3);
        assert_eq!(out, [DATA_MODE, 3, 4]);
        assert_eq!(encode_data(&mut bytes, &mut out), 2);
        assert_eq!(&out[..2], &[DATA_MODE, 5]);
        assert_eq!(encode_data(&mut bytes, &mut out), 0);
    }

    #[test]
    fn test_encode_data_without_room() {
        let mut bytes = [1u8].into_iter();
        assert_eq!(encode_data(&mut bytes, &mut []), 0);
        assert_eq!(encode_data(&mut bytes, &mut [0u8; 1]), 0);
        // Nothing was consumed while there was no room.
        assert_eq!(bytes.next(), Some(1));
    }
}
