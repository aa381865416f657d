//! Receiver-side JPEG decoding.

use std::io::Cursor;

use image::ImageDecoder;
use image::codecs::jpeg::JpegDecoder;

use crate::error::GlanceError;
use crate::stream::types::{PixelFormat, RawFrame};

/// Decodes JPEG payloads into tightly-packed RGB frames.
///
/// Stateless: a decode failure affects only the offending frame, and the
/// receiver drops that frame and keeps the stream alive.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder;

impl FrameDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one JPEG payload.
    pub fn decode(&self, payload: &[u8]) -> Result<RawFrame, GlanceError> {
        let decoder = JpegDecoder::new(Cursor::new(payload))
            .map_err(|e| GlanceError::DecodeFailed(e.to_string()))?;

        if decoder.color_type() != image::ColorType::Rgb8 {
            return Err(GlanceError::DecodeFailed(format!(
                "unexpected color type {:?}",
                decoder.color_type()
            )));
        }

        let (width, height) = decoder.dimensions();
        let mut data = vec![0u8; decoder.total_bytes() as usize];
        decoder
            .read_image(&mut data)
            .map_err(|e| GlanceError::DecodeFailed(e.to_string()))?;

        Ok(RawFrame::packed(width, height, PixelFormat::Rgb8, data))
    }
}
