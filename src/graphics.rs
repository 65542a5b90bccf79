//! Graphics support via embedded-graphics
//!
//! Implements [`DrawTarget`] with [`BinaryColor`] for both [`Framebuffer`]
//! and [`Display`], so any embedded-graphics primitive, font or image can be
//! drawn straight into the page-packed buffer. Drawing only touches memory;
//! call [`Display::flush`] to send the result.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::BinaryColor,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//! };
//! use ssd1306_bridge::{Builder, Display, Geometry};
//! # use core::convert::Infallible;
//! # use ssd1306_bridge::Transport;
//! # struct Bridge;
//! # impl Transport for Bridge {
//! #     type Error = Infallible;
//! #     fn send_command(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn send_data(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # let geometry = match Geometry::new(128, 64) {
//! #     Ok(geometry) => geometry,
//! #     Err(_) => return,
//! # };
//! # let config = match Builder::new().geometry(geometry).build() {
//! #     Ok(config) => config,
//! #     Err(_) => return,
//! # };
//! let mut display = Display::new(Bridge, config);
//! if display.initialize().is_err() {
//!     return;
//! }
//!
//! let _ = Rectangle::new(Point::new(0, 0), Size::new(128, 64))
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
//!     .draw(&mut display);
//! let _ = Circle::new(Point::new(48, 16), 32)
//!     .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
//!     .draw(&mut display);
//!
//! let _ = display.flush();
//! ```

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::BinaryColor,
    primitives::Rectangle,
};

use crate::display::Display;
use crate::framebuffer::Framebuffer;
use crate::interface::Transport;

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height,
            color.is_on(),
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        if color.is_on() {
            let size = self.size();
            self.fill_rect(0, 0, size.width, size.height, true);
        } else {
            Framebuffer::clear(self);
        }
        Ok(())
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        let geometry = self.geometry();
        Size::new(u32::from(geometry.width()), u32::from(geometry.height()))
    }
}

/// Drawing on a display draws into its framebuffer
impl<T> DrawTarget for Display<T>
where
    T: Transport,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.framebuffer_mut().draw_iter(pixels)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.framebuffer_mut().fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        DrawTarget::clear(self.framebuffer_mut(), color)
    }
}

impl<T> OriginDimensions for Display<T>
where
    T: Transport,
{
    fn size(&self) -> Size {
        self.framebuffer().size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Geometry};
    use crate::framebuffer::DirtyRegion;
    use alloc::vec::Vec;
    use embedded_graphics::{
        prelude::*,
        primitives::{Line, PrimitiveStyle},
    };

    #[derive(Debug, Default)]
    struct RecordingTransport {
        data: Vec<Vec<u8>>,
    }

    impl Transport for RecordingTransport {
        type Error = Infallible;

        fn send_command(&mut self, _bytes: &[u8]) -> Result<(), Self::Error> {
            Ok(())
        }

        fn send_data(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            self.data.push(bytes.to_vec());
            Ok(())
        }
    }

    fn framebuffer() -> Framebuffer {
        Framebuffer::new(Geometry::new(128, 64).unwrap())
    }

    #[test]
    fn test_size_matches_geometry() {
        let fb = Framebuffer::new(Geometry::new(128, 32).unwrap());
        assert_eq!(fb.size(), Size::new(128, 32));
        assert_eq!(fb.bounding_box(), Rectangle::new(Point::zero(), Size::new(128, 32)));
    }

    #[test]
    fn test_draw_rectangle() {
        let mut fb = framebuffer();
        Rectangle::new(Point::new(2, 3), Size::new(4, 2))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();

        assert!(fb.read_pixel(2, 3));
        assert!(fb.read_pixel(5, 4));
        assert!(!fb.read_pixel(6, 4));
        assert!(!fb.read_pixel(2, 5));
        assert_eq!(
            fb.dirty_region(),
            Some(DirtyRegion {
                page_start: 0,
                page_end: 0,
                col_start: 2,
                col_end: 5,
            })
        );
    }

    #[test]
    fn test_fill_solid_clips_to_panel() {
        let mut fb = framebuffer();
        fb.fill_solid(
            &Rectangle::new(Point::new(120, 60), Size::new(100, 100)),
            BinaryColor::On,
        )
        .unwrap();

        assert!(fb.read_pixel(127, 63));
        assert!(fb.read_pixel(120, 60));
        assert!(!fb.read_pixel(119, 60));
        assert_eq!(
            fb.dirty_region(),
            Some(DirtyRegion {
                page_start: 7,
                page_end: 7,
                col_start: 120,
                col_end: 127,
            })
        );
    }

    #[test]
    fn test_offscreen_pixels_are_ignored() {
        let mut fb = framebuffer();
        Pixel(Point::new(-1, 5), BinaryColor::On).draw(&mut fb).unwrap();
        Pixel(Point::new(128, 5), BinaryColor::On).draw(&mut fb).unwrap();
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
        assert_eq!(fb.dirty_region(), None);
    }

    #[test]
    fn test_clear_colors() {
        let mut fb = framebuffer();
        DrawTarget::clear(&mut fb, BinaryColor::On).unwrap();
        assert!(fb.as_bytes().iter().all(|b| *b == 0xFF));

        DrawTarget::clear(&mut fb, BinaryColor::Off).unwrap();
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
        assert_eq!(fb.dirty_region(), Some(DirtyRegion::full(fb.geometry())));
    }

    #[test]
    fn test_draw_on_display_then_flush() {
        let config = Builder::new()
            .geometry(Geometry::new(128, 64).unwrap())
            .build()
            .unwrap();
        let mut display = Display::new(RecordingTransport::default(), config);
        display.initialize().unwrap();
        display.flush().unwrap();
        assert_eq!(display.size(), Size::new(128, 64));

        Line::new(Point::new(0, 8), Point::new(3, 8))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut display)
            .unwrap();
        display.flush().unwrap();

        let transport = display.release();
        assert_eq!(
            transport.data.last(),
            Some(&alloc::vec![0x40, 0x01, 0x01, 0x01, 0x01])
        );
    }
}
