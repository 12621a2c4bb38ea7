//! Video frame plumbing
//!
//! A [`Frame`] flows from a [`FrameSource`] (camera), is annotated in place,
//! and is handed to a [`DisplaySink`] (window). The window also doubles as
//! the [`CommandInput`]. All three sit behind traits so the render loop is
//! testable without camera or display hardware.

mod annotate;
mod camera;
mod window;

pub use annotate::{FOCUS_COLOR, OTHER_COLOR, draw_detection};
pub use camera::CameraSource;
pub use window::VideoWindow;

use std::io::Cursor;

use crate::{Error, Result};

/// One video frame, 32-bit `0x00RRGGBB` pixels in row-major order
#[derive(Debug, Clone)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Frame {
    /// Create a frame from packed RGB bytes (3 bytes per pixel)
    #[must_use]
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Self {
        let pixels = rgb
            .chunks_exact(3)
            .map(|p| (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2]))
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a black frame
    #[must_use]
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Frame width in pixels
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Raw pixel buffer
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Read one pixel; `None` outside the frame
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Write one pixel; out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Encode the frame as JPEG for the detector API
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn to_jpeg(&self) -> Result<Vec<u8>> {
        let mut rgb = Vec::with_capacity(self.width * self.height * 3);
        for &px in &self.pixels {
            rgb.push((px >> 16) as u8);
            rgb.push((px >> 8) as u8);
            rgb.push(px as u8);
        }

        let img: image::RgbImage =
            image::ImageBuffer::from_raw(self.width as u32, self.height as u32, rgb)
                .ok_or_else(|| Error::Display("frame buffer size mismatch".to_string()))?;

        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, image::ImageFormat::Jpeg)
            .map_err(|e| Error::Display(e.to_string()))?;

        Ok(cursor.into_inner())
    }
}

/// Produces frames for the render loop
pub trait FrameSource {
    /// Pull the next frame; `Ok(None)` means the source is exhausted and the
    /// loop should terminate cleanly.
    ///
    /// # Errors
    ///
    /// Returns error if the source fails irrecoverably
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Presents annotated frames
pub trait DisplaySink {
    /// Show one frame; fire-and-forget from the loop's perspective
    ///
    /// # Errors
    ///
    /// Returns error if the sink can no longer display
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

/// A command dispatched from user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Terminate the render loop
    Quit,
    /// Start a voice capture to change the focus label
    ChangeFocus,
}

/// Polled once per frame for user commands
///
/// Implementations may block briefly (a few milliseconds); this poll is the
/// render loop's only deliberate blocking point.
pub trait CommandInput {
    /// Poll for a pending command
    fn poll_command(&mut self) -> Option<Command>;
}
