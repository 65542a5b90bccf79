//! In-memory framebuffer with dirty tracking
//!
//! The SSD1306 stores pixels in pages: each byte holds a column of 8
//! vertically stacked pixels, least significant bit on top. A panel of
//! `width x height` pixels therefore needs `width * height / 8` bytes,
//! laid out page by page:
//!
//! ```text
//! byte_index = (y / 8) * width + x
//! bit        = 1 << (y % 8)
//! ```
//!
//! Every write expands a [`DirtyRegion`] so the display session only sends
//! the bytes that may have changed since the last flush.
//!
//! ## Example
//!
//! ```
//! use ssd1306_bridge::{Framebuffer, Geometry};
//!
//! let geometry = match Geometry::new(128, 64) {
//!     Ok(geometry) => geometry,
//!     Err(_) => return,
//! };
//! let mut fb = Framebuffer::new(geometry);
//! fb.set_pixel(3, 10, true);
//!
//! assert!(fb.read_pixel(3, 10));
//! assert_eq!(fb.as_bytes()[128 + 3], 0b0000_0100);
//!
//! let dirty = fb.dirty_region().unwrap_or_default();
//! assert_eq!((dirty.page_start, dirty.col_start), (1, 3));
//! ```

use crate::config::Geometry;
use crate::error::{MAX_COLUMNS, MAX_ROWS};

/// Size of the SSD1306 display RAM in bytes (128 x 64 pixels)
pub const MAX_BUFFER_SIZE: usize = (MAX_COLUMNS as usize * MAX_ROWS as usize) / 8;

/// Rectangle of framebuffer bytes, in page/column coordinates
///
/// All bounds are inclusive. Page bounds are whole bytes by construction, so
/// the rectangle maps directly onto a controller address window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirtyRegion {
    /// First page
    pub page_start: u8,
    /// Last page
    pub page_end: u8,
    /// First column
    pub col_start: u8,
    /// Last column
    pub col_end: u8,
}

impl DirtyRegion {
    /// Region covering a single byte
    pub fn byte(page: u8, column: u8) -> Self {
        Self {
            page_start: page,
            page_end: page,
            col_start: column,
            col_end: column,
        }
    }

    /// Region covering the whole panel
    pub fn full(geometry: &Geometry) -> Self {
        Self {
            page_start: 0,
            page_end: (geometry.pages() - 1) as u8,
            col_start: 0,
            col_end: (geometry.width() - 1) as u8,
        }
    }

    /// Smallest region containing both `self` and `other`
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            page_start: self.page_start.min(other.page_start),
            page_end: self.page_end.max(other.page_end),
            col_start: self.col_start.min(other.col_start),
            col_end: self.col_end.max(other.col_end),
        }
    }

    /// Part of the region lying on a panel of `geometry`
    ///
    /// `None` if the region is reversed or entirely off the panel.
    #[must_use]
    pub fn clip(self, geometry: &Geometry) -> Option<Self> {
        let last_page = (geometry.pages() - 1) as u8;
        let last_col = (geometry.width() - 1) as u8;
        if self.page_start > self.page_end
            || self.col_start > self.col_end
            || self.page_start > last_page
            || self.col_start > last_col
        {
            return None;
        }
        Some(Self {
            page_end: self.page_end.min(last_page),
            col_end: self.col_end.min(last_col),
            ..self
        })
    }

    /// Number of pages covered, 0 if reversed
    pub fn page_count(&self) -> usize {
        span(self.page_start, self.page_end)
    }

    /// Number of columns covered, 0 if reversed
    pub fn column_count(&self) -> usize {
        span(self.col_start, self.col_end)
    }

    /// Number of framebuffer bytes covered
    pub fn byte_len(&self) -> usize {
        self.page_count() * self.column_count()
    }
}

fn span(start: u8, end: u8) -> usize {
    end.checked_sub(start).map_or(0, |len| usize::from(len) + 1)
}

/// Read access to a 1-bit image
///
/// Used by [`Framebuffer::blit`]. Coordinates are only queried inside
/// `width() x height()`.
pub trait BitmapSource {
    /// Width in pixels
    fn width(&self) -> u32;
    /// Height in pixels
    fn height(&self) -> u32;
    /// Whether the pixel at (x, y) is on
    fn pixel(&self, x: u32, y: u32) -> bool;
}

/// Borrowed 1-bit image, row-major with the leftmost pixel in the MSB
///
/// This is the layout produced by most font and image converters: each row
/// takes `ceil(width / 8)` bytes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bitmap<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> Bitmap<'a> {
    /// Wrap packed image data `width` pixels wide
    ///
    /// The height is the number of complete rows in `data`. A zero width
    /// gives an empty bitmap.
    pub fn new(data: &'a [u8], width: u32) -> Self {
        let stride = width.div_ceil(8) as usize;
        let height = if stride == 0 { 0 } else { data.len() / stride };
        Self {
            data,
            width,
            height: height as u32,
        }
    }

    fn stride(&self) -> usize {
        self.width.div_ceil(8) as usize
    }
}

impl BitmapSource for Bitmap<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y as usize * self.stride() + x as usize / 8;
        self.data
            .get(index)
            .is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0)
    }
}

/// Page-packed pixel buffer for one panel
///
/// Storage is sized for the largest SSD1306 panel so no allocation is
/// needed; only the first [`Geometry::buffer_size`] bytes are used.
/// Writes outside the panel are ignored and never mark anything dirty.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    /// Panel geometry
    geometry: Geometry,
    /// Pixel storage, page-major
    buffer: [u8; MAX_BUFFER_SIZE],
    /// Bytes touched since the last successful flush
    dirty: Option<DirtyRegion>,
}

impl Framebuffer {
    /// Create a blank framebuffer with nothing marked dirty
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            buffer: [0; MAX_BUFFER_SIZE],
            dirty: None,
        }
    }

    /// Panel geometry
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Buffer contents, `geometry().buffer_size()` bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.geometry.buffer_size()]
    }

    /// Bytes touched since the last successful flush, if any
    pub fn dirty_region(&self) -> Option<DirtyRegion> {
        self.dirty
    }

    /// Whether anything needs to be sent
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Mark the whole panel dirty so the next flush repaints everything
    pub fn invalidate(&mut self) {
        self.dirty = Some(DirtyRegion::full(&self.geometry));
    }

    /// Forget pending changes once they reached the panel
    pub(crate) fn mark_clean(&mut self) {
        self.dirty = None;
    }

    /// Turn every pixel off and mark the whole panel dirty
    pub fn clear(&mut self) {
        self.buffer.fill(0);
        self.invalidate();
    }

    /// Switch the pixel at (x, y) on or off
    ///
    /// Coordinates outside the panel are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        let Some((index, bit)) = self.locate(x, y) else {
            return;
        };
        if on {
            self.buffer[index] |= bit;
        } else {
            self.buffer[index] &= !bit;
        }
        // Range checked by locate()
        let region = DirtyRegion::byte((y / 8) as u8, x as u8);
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(region),
            None => region,
        });
    }

    /// Whether the pixel at (x, y) is on; `false` outside the panel
    pub fn read_pixel(&self, x: i32, y: i32) -> bool {
        self.locate(x, y)
            .is_some_and(|(index, bit)| self.buffer[index] & bit != 0)
    }

    /// Copy up to `w x h` pixels of `bitmap` with its top-left corner at (x, y)
    ///
    /// Both on and off pixels are copied. Anything falling outside the panel
    /// is clipped.
    pub fn blit<B>(&mut self, bitmap: &B, x: i32, y: i32, w: u32, h: u32)
    where
        B: BitmapSource + ?Sized,
    {
        let w = w.min(bitmap.width());
        let h = h.min(bitmap.height());
        for by in 0..h {
            let Some(py) = offset(y, by) else { break };
            for bx in 0..w {
                let Some(px) = offset(x, bx) else { break };
                self.set_pixel(px, py, bitmap.pixel(bx, by));
            }
        }
    }

    /// Switch a `w x h` block of pixels on or off
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, on: bool) {
        for dy in 0..h {
            let Some(py) = offset(y, dy) else { break };
            for dx in 0..w {
                let Some(px) = offset(x, dx) else { break };
                self.set_pixel(px, py, on);
            }
        }
    }

    /// Bytes inside `region`, page-major then column
    ///
    /// This is the order the controller expects in horizontal addressing mode.
    /// The region is clipped to the panel first.
    pub(crate) fn region_bytes(&self, region: DirtyRegion) -> impl Iterator<Item = u8> + '_ {
        let width = usize::from(self.geometry.width());
        region
            .clip(&self.geometry)
            .into_iter()
            .flat_map(move |region| {
                let columns = region.column_count();
                (region.page_start..=region.page_end).flat_map(move |page| {
                    let start = usize::from(page) * width + usize::from(region.col_start);
                    self.buffer[start..start + columns].iter().copied()
                })
            })
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if !self.geometry.contains(x, y) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let index = (y / 8) * usize::from(self.geometry.width()) + x;
        Some((index, 1 << (y % 8)))
    }
}

/// `base + delta` if it still fits an `i32`
fn offset(base: i32, delta: u32) -> Option<i32> {
    i32::try_from(delta).ok()?.checked_add(base)
}

impl BitmapSource for Framebuffer {
    fn width(&self) -> u32 {
        u32::from(self.geometry.width())
    }

    fn height(&self) -> u32 {
        u32::from(self.geometry.height())
    }

    fn pixel(&self, x: u32, y: u32) -> bool {
        match (i32::try_from(x), i32::try_from(y)) {
            (Ok(x), Ok(y)) => self.read_pixel(x, y),
            _ => false,
        }
    }
}

/// ASCII dump, one line per pixel row: `*` for on, space for off
impl core::fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for y in 0..i32::from(self.geometry.height()) {
            f.write_str("|")?;
            for x in 0..i32::from(self.geometry.width()) {
                f.write_str(if self.read_pixel(x, y) { "*" } else { " " })?;
            }
            f.write_str("|\n")?;
        }
        Ok(())
    }
}
