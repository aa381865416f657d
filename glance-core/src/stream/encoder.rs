//! Sender-side frame preparation: resample to the target resolution,
//! then JPEG-compress at a fixed quality.
//!
//! Resampling is nearest-neighbor — deterministic for a given input —
//! and folds the BGRA→RGB swizzle into the same pass, so a captured
//! frame makes exactly one trip through its pixels before compression.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, RgbImage};

use crate::error::GlanceError;
use crate::stream::types::{PixelFormat, RawFrame};

/// Lossy quality on the 0–100 JPEG scale used when none is configured.
pub const DEFAULT_QUALITY: u8 = 80;

// ── FrameEncoder ─────────────────────────────────────────────────

/// Resamples raw frames to a fixed resolution and encodes them to JPEG.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    width: u32,
    height: u32,
    quality: u8,
}

impl FrameEncoder {
    /// Encoder producing `width × height` frames at `quality` (1–100).
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width,
            height,
            quality,
        }
    }

    /// Encode one raw frame to JPEG bytes at the target resolution.
    ///
    /// Frames already at the target size take the same deterministic
    /// path: the resample degenerates to a copy-plus-swizzle.
    pub fn encode(&self, frame: &RawFrame) -> Result<Vec<u8>, GlanceError> {
        let rgb = resample_rgb(frame, self.width, self.height);
        let img: RgbImage = ImageBuffer::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| {
                GlanceError::EncodeFailed("buffer does not match dimensions".into())
            })?;

        let mut buf = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.quality);
        img.write_with_encoder(encoder)
            .map_err(|e| GlanceError::EncodeFailed(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

// ── Resampling ───────────────────────────────────────────────────

/// Nearest-neighbor resample of `frame` into tightly-packed RGB rows at
/// `dst_w × dst_h`. Handles stride padding and both supported pixel
/// layouts; out-of-range source offsets fall back to black.
pub(crate) fn resample_rgb(frame: &RawFrame, dst_w: u32, dst_h: u32) -> Vec<u8> {
    let bpp = frame.format.bytes_per_pixel();
    let stride = frame.stride as usize;
    let src_w = frame.width as usize;
    let src_h = frame.height as usize;
    let mut rgb = Vec::with_capacity(dst_w as usize * dst_h as usize * 3);

    for y in 0..dst_h as usize {
        let src_y = y * src_h / dst_h as usize;
        for x in 0..dst_w as usize {
            let src_x = x * src_w / dst_w as usize;
            let offset = src_y * stride + src_x * bpp;
            if offset + bpp <= frame.data.len() {
                match frame.format {
                    PixelFormat::Bgra8 => {
                        rgb.push(frame.data[offset + 2]);
                        rgb.push(frame.data[offset + 1]);
                        rgb.push(frame.data[offset]);
                    }
                    PixelFormat::Rgb8 => {
                        rgb.extend_from_slice(&frame.data[offset..offset + 3]);
                    }
                }
            } else {
                rgb.extend_from_slice(&[0, 0, 0]);
            }
        }
    }

    rgb
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> RawFrame {
        let data: Vec<u8> = color
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        RawFrame::packed(width, height, PixelFormat::Rgb8, data)
    }

    #[test]
    fn resample_identity_preserves_pixels() {
        let mut frame = solid_rgb(2, 2, [0, 0, 0]);
        frame.data[0..3].copy_from_slice(&[1, 2, 3]);
        frame.data[9..12].copy_from_slice(&[7, 8, 9]);

        let out = resample_rgb(&frame, 2, 2);
        assert_eq!(out, frame.data);
    }

    #[test]
    fn resample_swizzles_bgra() {
        // One blue-ish BGRA pixel: B=200 G=100 R=50.
        let frame = RawFrame::packed(1, 1, PixelFormat::Bgra8, vec![200, 100, 50, 255]);
        let out = resample_rgb(&frame, 1, 1);
        assert_eq!(out, vec![50, 100, 200]);
    }

    #[test]
    fn resample_skips_row_padding() {
        // 1x2 BGRA, 4 padding bytes per row filled with a sentinel.
        let stride = 8;
        let mut data = vec![0xEE; stride * 2];
        data[0..4].copy_from_slice(&[1, 2, 3, 255]);
        data[stride..stride + 4].copy_from_slice(&[4, 5, 6, 255]);
        let frame = RawFrame {
            width: 1,
            height: 2,
            stride: stride as u32,
            format: PixelFormat::Bgra8,
            data,
        };

        let out = resample_rgb(&frame, 1, 2);
        assert_eq!(out, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn resample_downscale_is_deterministic() {
        let frame = solid_rgb(64, 64, [90, 120, 150]);
        let a = resample_rgb(&frame, 16, 16);
        let b = resample_rgb(&frame, 16, 16);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16 * 16 * 3);
        assert!(a.chunks(3).all(|px| px == [90, 120, 150]));
    }

    #[test]
    fn resample_upscale_repeats_source_pixels() {
        // 2x1 source: left red, right green.
        let frame = RawFrame::packed(
            2,
            1,
            PixelFormat::Rgb8,
            vec![255, 0, 0, 0, 255, 0],
        );
        let out = resample_rgb(&frame, 4, 1);
        assert_eq!(
            out,
            vec![255, 0, 0, 255, 0, 0, 0, 255, 0, 0, 255, 0]
        );
    }

    #[test]
    fn encode_produces_jpeg_bytes() {
        let encoder = FrameEncoder::new(32, 32, DEFAULT_QUALITY);
        let payload = encoder.encode(&solid_rgb(32, 32, [10, 200, 30])).unwrap();
        // JPEG SOI marker.
        assert_eq!(&payload[..2], &[0xFF, 0xD8]);
        assert!(!payload.is_empty());
    }

    #[test]
    fn encode_resamples_to_target_resolution() {
        let encoder = FrameEncoder::new(16, 16, DEFAULT_QUALITY);
        let payload = encoder.encode(&solid_rgb(64, 64, [0, 0, 255])).unwrap();

        let decoded = crate::stream::decoder::FrameDecoder::new()
            .decode(&payload)
            .unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 16));
    }
}
