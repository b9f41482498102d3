// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Camera frames handed from the platform camera pipeline to the analysis
// worker.
//
// A `Frame` owns the release action of the underlying platform buffer (an
// `ImageProxy` on Android). Release runs exactly once: through
// `Frame::close`, or on drop if the frame was never closed explicitly.

use std::fmt;
use std::sync::Arc;

use crate::error::{Result, VisionwerkError};

/// Pixel layout of an [`InputImage`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit luminance, one byte per pixel.
    Luma8,
    /// 8-bit RGBA, four bytes per pixel.
    Rgba8,
    /// NV21: full-resolution Y plane followed by interleaved V/U at half resolution.
    Nv21,
}

impl PixelFormat {
    /// Bytes required for a `width` x `height` buffer in this format, or
    /// `None` if that does not fit in `usize`.
    pub fn buffer_len(&self, width: u32, height: u32) -> Option<usize> {
        let pixels = (width as usize).checked_mul(height as usize)?;
        match self {
            Self::Luma8 => Some(pixels),
            Self::Rgba8 => pixels.checked_mul(4),
            Self::Nv21 => {
                let chroma = (width.div_ceil(2) as usize).checked_mul(height.div_ceil(2) as usize)?;
                pixels.checked_add(chroma.checked_mul(2)?)
            }
        }
    }
}

/// A decodable image handed to the face detector.
///
/// Pixel data is reference-counted so the detector request and the frame
/// can share it without copying.
#[derive(Clone)]
pub struct InputImage {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Arc<[u8]>,
}

impl InputImage {
    /// Wrap a raw pixel buffer, checking its length against the dimensions.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let data = data.into();
        let Some(expected) = format.buffer_len(width, height) else {
            return Err(VisionwerkError::ImageError(format!(
                "{format:?} buffer for {width}x{height} is too large"
            )));
        };
        if data.len() != expected {
            return Err(VisionwerkError::ImageError(format!(
                "{format:?} buffer for {width}x{height} must be {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for InputImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

type ReleaseFn = Box<dyn FnOnce() + Send + 'static>;

/// One camera frame awaiting analysis.
pub struct Frame {
    image: Option<InputImage>,
    rotation_degrees: u32,
    release: Option<ReleaseFn>,
}

impl Frame {
    /// Create a frame whose platform buffer is released by `release`.
    pub fn new(
        image: Option<InputImage>,
        rotation_degrees: u32,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            image,
            rotation_degrees,
            release: Some(Box::new(release)),
        }
    }

    /// The decodable image, or `None` if the camera delivered no image.
    pub fn image(&self) -> Option<&InputImage> {
        self.image.as_ref()
    }

    /// Clockwise rotation to apply so the image is upright.
    pub fn rotation_degrees(&self) -> u32 {
        self.rotation_degrees
    }

    /// Release the platform buffer now.
    pub fn close(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("image", &self.image)
            .field("rotation_degrees", &self.rotation_degrees)
            .field("released", &self.release.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_frame(counter: &Arc<AtomicUsize>) -> Frame {
        let counter = Arc::clone(counter);
        Frame::new(None, 90, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn close_releases_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let frame = counting_frame(&released);
        frame.close();
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_unclosed_frame() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let _frame = counting_frame(&released);
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn input_image_rejects_short_buffer() {
        let result = InputImage::new(4, 4, PixelFormat::Rgba8, vec![0u8; 10]);
        assert!(matches!(result, Err(VisionwerkError::ImageError(_))));
    }

    #[test]
    fn nv21_buffer_length_rounds_chroma_up() {
        // 3x3 luma + 2x2 interleaved VU pairs.
        assert_eq!(PixelFormat::Nv21.buffer_len(3, 3), Some(9 + 8));
    }

    #[test]
    fn oversized_dimensions_are_an_image_error() {
        assert_eq!(PixelFormat::Rgba8.buffer_len(u32::MAX, u32::MAX), None);
        assert_eq!(PixelFormat::Nv21.buffer_len(u32::MAX, u32::MAX), None);
        let result = InputImage::new(u32::MAX, u32::MAX, PixelFormat::Nv21, Vec::new());
        assert!(matches!(result, Err(VisionwerkError::ImageError(_))));
    }
}
