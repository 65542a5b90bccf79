//! Display session
//!
//! [`Display`] owns the framebuffer and the transport handle, tracks the
//! controller's power state and pushes framebuffer changes to the panel.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Active --sleep--> Asleep
//!                                  ^                 |
//!                                  +------wake-------+
//! ```
//!
//! There is no closed state: dropping the session (or calling
//! [`Display::release`]) gives the transport back to the caller.
//!
//! A session is a single-owner value. Sharing one across threads requires
//! external locking.

use crate::command::{self, AddressingMode, Command};
use crate::config::{Config, Geometry};
use crate::error::Error;
use crate::framebuffer::{BitmapSource, DirtyRegion, Framebuffer, MAX_BUFFER_SIZE};
use crate::interface::Transport;

type DisplayResult<T> = core::result::Result<(), Error<T>>;

/// Room for the largest possible transfer: control byte plus the whole panel
const SCRATCH_LEN: usize = MAX_BUFFER_SIZE + 1;

/// Power and initialization state of the controller
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControllerState {
    /// Power-on sequence has not been sent yet
    #[default]
    Uninitialized,
    /// Initialized, panel output switched off
    Asleep,
    /// Initialized and showing display RAM
    Active,
}

impl core::fmt::Display for ControllerState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Asleep => "asleep",
            Self::Active => "active",
        })
    }
}

/// Display session for one SSD1306 panel
///
/// Draw with [`set_pixel`](Self::set_pixel), [`fill_rect`](Self::fill_rect)
/// and [`blit`](Self::blit) (or through `embedded-graphics` with the
/// `graphics` feature), then call
/// [`flush`](Self::flush) to send only the changed bytes.
///
/// ## Example
///
/// ```rust,no_run
/// use ssd1306_bridge::{Builder, Display, Geometry, Transport};
/// # use core::convert::Infallible;
/// # struct Bridge;
/// # impl Transport for Bridge {
/// #     type Error = Infallible;
/// #     fn send_command(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
/// #     fn send_data(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # let mut bridge = Bridge;
/// let geometry = match Geometry::new(128, 64) {
///     Ok(geometry) => geometry,
///     Err(_) => return,
/// };
/// let config = match Builder::new().geometry(geometry).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
///
/// // Lend the transport; the caller keeps ownership
/// let mut display = Display::new(&mut bridge, config);
/// if display.initialize().is_err() {
///     return;
/// }
///
/// display.set_pixel(0, 0, true);
/// let _ = display.flush();
/// ```
pub struct Display<T>
where
    T: Transport,
{
    /// Transport towards the panel
    transport: T,
    /// Display configuration
    config: Config,
    /// Pixel buffer and dirty tracking
    framebuffer: Framebuffer,
    /// Controller power state
    state: ControllerState,
    /// Staging area for framed data transfers
    scratch: [u8; SCRATCH_LEN],
}

impl<T> Display<T>
where
    T: Transport,
{
    /// Create a new session; nothing is sent until [`initialize`](Self::initialize)
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            framebuffer: Framebuffer::new(config.geometry),
            config,
            state: ControllerState::Uninitialized,
            scratch: [0; SCRATCH_LEN],
        }
    }

    /// Send the power-on sequence and switch the panel on
    ///
    /// Clears the framebuffer and marks it fully dirty so the first
    /// [`flush`](Self::flush) repaints the whole panel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyInitialized`] if called twice. On
    /// [`Error::TransportFailure`] the session stays uninitialized and may be
    /// initialized again; the driver never retries on its own.
    pub fn initialize(&mut self) -> DisplayResult<T> {
        if self.state != ControllerState::Uninitialized {
            return Err(Error::AlreadyInitialized);
        }

        let geometry = self.config.geometry;
        log::debug!(
            "initializing {}x{} panel at {:#04x}",
            geometry.width(),
            geometry.height(),
            self.config.i2c_address
        );
        for cmd in command::initialize(&self.config) {
            self.send_command(&cmd)?;
        }

        self.framebuffer.clear();
        self.transition(ControllerState::Active);
        Ok(())
    }

    /// Send framebuffer changes made since the last successful flush
    ///
    /// Nothing is sent when nothing changed. Otherwise the controller's
    /// address window is set to the dirty rectangle and its bytes follow in
    /// one data burst (split into several transfers only when
    /// [`Config::max_transfer_len`] asks for it).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotActive`] unless the display is initialized and
    /// awake. On [`Error::TransportFailure`] the dirty region is kept, so a
    /// retried flush resends exactly the same bytes.
    pub fn flush(&mut self) -> DisplayResult<T> {
        self.require_active()?;
        let Some(region) = self.framebuffer.dirty_region() else {
            return Ok(());
        };

        log::trace!(
            "flush pages {}..={} columns {}..={} ({} bytes)",
            region.page_start,
            region.page_end,
            region.col_start,
            region.col_end,
            region.byte_len()
        );
        let window = command::set_addressing_window(
            &self.config.geometry,
            region.col_start,
            region.col_end,
            region.page_start,
            region.page_end,
        )?;
        for cmd in &window {
            self.send_command(cmd)?;
        }
        self.send_region(region)?;

        self.framebuffer.mark_clean();
        Ok(())
    }

    /// Switch the panel output off, keeping display RAM and framebuffer
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] unless the display is active.
    pub fn sleep(&mut self) -> DisplayResult<T> {
        self.require_transition(ControllerState::Active, ControllerState::Asleep)?;
        self.send_command(&command::display_off())?;
        self.transition(ControllerState::Asleep);
        Ok(())
    }

    /// Switch the panel output back on
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] unless the display is asleep.
    pub fn wake(&mut self) -> DisplayResult<T> {
        self.require_transition(ControllerState::Asleep, ControllerState::Active)?;
        self.send_command(&command::display_on())?;
        self.transition(ControllerState::Active);
        Ok(())
    }

    /// Set contrast, 0x00 (dimmest) to 0xFF (brightest)
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotActive`] unless the display is active.
    pub fn set_contrast(&mut self, value: u8) -> DisplayResult<T> {
        self.require_active()?;
        log::debug!("contrast {value:#04x}");
        self.send_command(&command::set_contrast(value))
    }

    /// Invert pixel polarity without touching display RAM
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotActive`] unless the display is active.
    pub fn set_invert(&mut self, inverted: bool) -> DisplayResult<T> {
        self.require_active()?;
        log::debug!("invert {inverted}");
        self.send_command(&command::set_invert(inverted))
    }

    /// Rotate the picture by 180 degrees
    ///
    /// Takes effect on the whole panel immediately; display RAM is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotActive`] unless the display is active.
    pub fn set_flipped(&mut self, flipped: bool) -> DisplayResult<T> {
        self.require_active()?;
        log::debug!("flipped {flipped}");
        for cmd in &command::set_flipped(flipped) {
            self.send_command(cmd)?;
        }
        Ok(())
    }

    /// Map display RAM row `line` to the top of the panel
    ///
    /// Moving the start line scrolls the picture vertically without
    /// resending any pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `line` is not below the panel
    /// height, or [`Error::NotActive`] unless the display is active.
    pub fn set_start_line(&mut self, line: u8) -> DisplayResult<T> {
        let cmd = command::set_start_line(line, &self.config.geometry)?;
        self.require_active()?;
        self.send_command(&cmd)
    }

    /// Current controller state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Whether the display is initialized and awake
    pub fn is_active(&self) -> bool {
        self.state == ControllerState::Active
    }

    /// Addressing mode the controller is kept in
    pub fn addressing_mode(&self) -> AddressingMode {
        AddressingMode::Horizontal
    }

    /// Panel geometry
    pub fn geometry(&self) -> &Geometry {
        &self.config.geometry
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The framebuffer, read-only
    ///
    /// Drawing goes through the session so every change is tracked; the
    /// framebuffer itself cannot be swapped out:
    ///
    /// ```rust,compile_fail
    /// # use ssd1306_bridge::{Builder, Display, Framebuffer, Geometry, Transport};
    /// # struct Bridge;
    /// # impl Transport for Bridge {
    /// #     type Error = ();
    /// #     fn send_command(&mut self, _bytes: &[u8]) -> Result<(), ()> { Ok(()) }
    /// #     fn send_data(&mut self, _bytes: &[u8]) -> Result<(), ()> { Ok(()) }
    /// # }
    /// # let Ok(geometry) = Geometry::new(128, 64) else { return };
    /// # let Ok(config) = Builder::new().geometry(geometry).build() else { return };
    /// let mut display = Display::new(Bridge, config);
    /// let snapshot = display.framebuffer().clone();
    /// *display.framebuffer_mut() = snapshot;
    /// ```
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Mutable framebuffer for drawing code inside the crate
    #[cfg(feature = "graphics")]
    pub(crate) fn framebuffer_mut(&mut self) -> &mut Framebuffer {
        &mut self.framebuffer
    }

    /// Switch the pixel at (x, y) on or off; see [`Framebuffer::set_pixel`]
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        self.framebuffer.set_pixel(x, y, on);
    }

    /// Switch a `w x h` block of pixels on or off
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, on: bool) {
        self.framebuffer.fill_rect(x, y, w, h, on);
    }

    /// Copy a bitmap into the framebuffer; see [`Framebuffer::blit`]
    pub fn blit<B>(&mut self, bitmap: &B, x: i32, y: i32, w: u32, h: u32)
    where
        B: BitmapSource + ?Sized,
    {
        self.framebuffer.blit(bitmap, x, y, w, h);
    }

    /// Turn every pixel off; the next flush repaints the whole panel
    pub fn clear_buffer(&mut self) {
        self.framebuffer.clear();
    }

    /// Repaint the whole panel on the next flush, keeping the pixels
    pub fn invalidate(&mut self) {
        self.framebuffer.invalidate();
    }

    /// End the session and hand the transport back
    pub fn release(self) -> T {
        self.transport
    }

    fn require_active(&self) -> DisplayResult<T> {
        if self.state == ControllerState::Active {
            Ok(())
        } else {
            Err(Error::NotActive)
        }
    }

    fn require_transition(&self, from: ControllerState, to: ControllerState) -> DisplayResult<T> {
        if self.state == from {
            Ok(())
        } else {
            Err(Error::InvalidStateTransition {
                from: self.state,
                to,
            })
        }
    }

    fn transition(&mut self, to: ControllerState) {
        log::debug!("controller {} -> {}", self.state, to);
        self.state = to;
    }

    /// Stream the bytes of `region` as framed data transfers
    fn send_region(&mut self, region: DirtyRegion) -> DisplayResult<T> {
        let limit = self
            .config
            .max_transfer_len
            .map_or(SCRATCH_LEN, |len| len.clamp(2, SCRATCH_LEN));
        let mut bytes = self.framebuffer.region_bytes(region);
        loop {
            let len = command::encode_data(&mut bytes, &mut self.scratch[..limit]);
            if len == 0 {
                return Ok(());
            }
            self.transport
                .send_data(&self.scratch[..len])
                .map_err(Error::TransportFailure)?;
        }
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: &Command) -> DisplayResult<T> {
        self.transport
            .send_command(cmd.as_bytes())
            .map_err(Error::TransportFailure)
    }
}
