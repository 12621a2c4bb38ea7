//! Camera frame source

use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

use crate::video::{Frame, FrameSource};
use crate::{Error, Result};

/// Live camera implementing [`FrameSource`]
pub struct CameraSource {
    camera: Camera,
    width: usize,
    height: usize,
}

impl CameraSource {
    /// Open camera `index` and start streaming
    ///
    /// # Errors
    ///
    /// Returns error if the camera cannot be opened; the caller treats this
    /// as a fatal startup failure.
    pub fn open(index: u32) -> Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| Error::Camera(e.to_string()))?;

        camera
            .open_stream()
            .map_err(|e| Error::Camera(e.to_string()))?;

        let resolution = camera.resolution();
        let (width, height) = (resolution.width() as usize, resolution.height() as usize);

        tracing::info!(index, width, height, "camera opened");

        Ok(Self {
            camera,
            width,
            height,
        })
    }

    /// Native frame width
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Native frame height
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }
}

impl FrameSource for CameraSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        // A failed read means the device is gone; the loop treats it as end
        // of stream rather than retrying.
        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::warn!(error = %e, "camera read failed, stopping");
                return Ok(None);
            }
        };

        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::Camera(e.to_string()))?;

        let (w, h) = (decoded.width() as usize, decoded.height() as usize);
        Ok(Some(Frame::from_rgb(w, h, decoded.as_raw())))
    }
}
