//! YUV 4:2:0 to RGBA conversion for camera sensor frames.
//!
//! Fixed-point BT.601 limited-range transform:
//!
//! ```text
//! C = Y - 16;  D = U - 128;  E = V - 128
//! R = (298C + 409E + 128) >> 8
//! G = (298C - 100D - 208E + 128) >> 8
//! B = (298C + 516D + 128) >> 8
//! ```
//!
//! Chroma planes may be planar (`uv_pixel_stride == 1`) or semi-planar /
//! interleaved (`uv_pixel_stride == 2`), as camera HALs deliver them.

use crate::error::{EngineError, Result};
use crate::frame::{frame_len, BYTES_PER_PIXEL};
use crate::luma::OPAQUE;

/// Borrowed Y, U and V planes with their strides.
#[derive(Debug, Clone, Copy)]
pub struct Yuv420Planes<'a> {
    pub y: &'a [u8],
    pub u: &'a [u8],
    pub v: &'a [u8],
    /// Bytes between luma rows (>= width)
    pub y_row_stride: usize,
    /// Bytes between chroma rows
    pub uv_row_stride: usize,
    /// Bytes between horizontally adjacent chroma samples
    pub uv_pixel_stride: usize,
}

impl Yuv420Planes<'_> {
    /// Check that every index the conversion will touch is in bounds.
    ///
    /// Dimensions must already be non-zero (see `frame_len`).
    fn validate(&self, width: u32, height: u32) -> Result<()> {
        let (w, h) = (width as usize, height as usize);
        if self.y_row_stride < w || self.uv_pixel_stride == 0 {
            return Err(EngineError::InvalidParameters(format!(
                "bad strides: y_row_stride={} uv_pixel_stride={} for width {}",
                self.y_row_stride, self.uv_pixel_stride, width
            )));
        }

        let overflow = || {
            EngineError::InvalidParameters(format!(
                "strides overflow for {}x{}: y_row_stride={} uv_row_stride={} uv_pixel_stride={}",
                width, height, self.y_row_stride, self.uv_row_stride, self.uv_pixel_stride
            ))
        };

        let y_needed = (h - 1)
            .checked_mul(self.y_row_stride)
            .and_then(|n| n.checked_add(w))
            .ok_or_else(overflow)?;
        if self.y.len() < y_needed {
            return Err(EngineError::BufferTooSmall {
                buffer: "y plane",
                expected: y_needed,
                actual: self.y.len(),
            });
        }

        let uv_needed = ((h - 1) / 2)
            .checked_mul(self.uv_row_stride)
            .zip(((w - 1) / 2).checked_mul(self.uv_pixel_stride))
            .and_then(|(rows, cols)| rows.checked_add(cols))
            .and_then(|n| n.checked_add(1))
            .ok_or_else(overflow)?;
        for (name, plane) in [("u plane", self.u), ("v plane", self.v)] {
            if plane.len() < uv_needed {
                return Err(EngineError::BufferTooSmall {
                    buffer: name,
                    expected: uv_needed,
                    actual: plane.len(),
                });
            }
        }
        Ok(())
    }
}

#[inline]
fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Convert one Y/U/V sample triple to RGB.
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    [
        clamp_channel((298 * c + 409 * e + 128) >> 8),
        clamp_channel((298 * c - 100 * d - 208 * e + 128) >> 8),
        clamp_channel((298 * c + 516 * d + 128) >> 8),
    ]
}

/// Convert a full `width x height` YUV 4:2:0 frame into packed RGBA.
///
/// All bounds are checked up front; on error `output` is left untouched.
pub fn convert_yuv420_to_rgba(
    planes: &Yuv420Planes<'_>,
    width: u32,
    height: u32,
    output: &mut [u8],
) -> Result<()> {
    let out_len = frame_len(width, height)?;
    if output.len() < out_len {
        return Err(EngineError::BufferTooSmall {
            buffer: "output",
            expected: out_len,
            actual: output.len(),
        });
    }
    planes.validate(width, height)?;

    let w = width as usize;
    let row_bytes = w * BYTES_PER_PIXEL;

    for (row, out_row) in output[..out_len].chunks_exact_mut(row_bytes).enumerate() {
        let y_row = &planes.y[row * planes.y_row_stride..][..w];
        let uv_row = (row / 2) * planes.uv_row_stride;

        for (col, px) in out_row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            let uv_index = uv_row + (col / 2) * planes.uv_pixel_stride;
            let [r, g, b] = yuv_to_rgb(y_row[col], planes.u[uv_index], planes.v[uv_index]);
            px[0] = r;
            px[1] = g;
            px[2] = b;
            px[3] = OPAQUE;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planar(width: usize, height: usize, y: u8, u: u8, v: u8) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let cw = width.div_ceil(2);
        let ch = height.div_ceil(2);
        (vec![y; width * height], vec![u; cw * ch], vec![v; cw * ch])
    }

    #[test]
    fn test_limited_range_black() {
        assert_eq!(yuv_to_rgb(16, 128, 128), [0, 0, 0]);
    }

    #[test]
    fn test_limited_range_white_clamps() {
        assert_eq!(yuv_to_rgb(235, 128, 128), [255, 255, 255]);
        assert_eq!(yuv_to_rgb(255, 128, 128), [255, 255, 255]);
        assert_eq!(yuv_to_rgb(0, 128, 128), [0, 0, 0]);
    }

    #[test]
    fn test_saturated_chroma_clamps() {
        // Strong V pushes red over and green under the range
        let [r, g, _] = yuv_to_rgb(128, 128, 255);
        assert_eq!(r, 255);
        assert!(g < 128);
    }

    #[test]
    fn test_full_frame_black() {
        let (y, u, v) = planar(4, 4, 16, 128, 128);
        let planes = Yuv420Planes {
            y: &y,
            u: &u,
            v: &v,
            y_row_stride: 4,
            uv_row_stride: 2,
            uv_pixel_stride: 1,
        };
        let mut out = vec![7u8; 4 * 4 * 4];
        convert_yuv420_to_rgba(&planes, 4, 4, &mut out).unwrap();
        for px in out.chunks_exact(4) {
            assert_eq!(px, [0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_chroma_subsampling_blocks() {
        // 4x2 frame, two chroma samples per row: left block neutral, right block strong V
        let y = vec![128u8; 8];
        let u = vec![128u8, 128];
        let v = vec![128u8, 255];
        let planes = Yuv420Planes {
            y: &y,
            u: &u,
            v: &v,
            y_row_stride: 4,
            uv_row_stride: 2,
            uv_pixel_stride: 1,
        };
        let mut out = vec![0u8; 4 * 2 * 4];
        convert_yuv420_to_rgba(&planes, 4, 2, &mut out).unwrap();

        let neutral = yuv_to_rgb(128, 128, 128);
        let reddish = yuv_to_rgb(128, 128, 255);
        for row in 0..2 {
            for col in 0..4 {
                let px = &out[(row * 4 + col) * 4..][..3];
                let expected = if col < 2 { neutral } else { reddish };
                assert_eq!(px, expected, "pixel ({col}, {row})");
            }
        }
    }

    #[test]
    fn test_row_padding_and_interleaved_chroma() {
        // 2x2 frame, luma rows padded to 8 bytes, chroma interleaved (pixel stride 2)
        let mut y = vec![0u8; 16];
        y[..2].copy_from_slice(&[16, 16]);
        y[8..10].copy_from_slice(&[16, 16]);
        let u = vec![128u8, 0];
        let v = vec![128u8, 0];
        let planes = Yuv420Planes {
            y: &y,
            u: &u,
            v: &v,
            y_row_stride: 8,
            uv_row_stride: 4,
            uv_pixel_stride: 2,
        };
        let mut out = vec![1u8; 16];
        convert_yuv420_to_rgba(&planes, 2, 2, &mut out).unwrap();
        assert!(out.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_short_plane_is_rejected_without_writing() {
        let (y, u, v) = planar(4, 4, 16, 128, 128);
        let planes = Yuv420Planes {
            y: &y[..10],
            u: &u,
            v: &v,
            y_row_stride: 4,
            uv_row_stride: 2,
            uv_pixel_stride: 1,
        };
        let mut out = vec![7u8; 64];
        assert!(convert_yuv420_to_rgba(&planes, 4, 4, &mut out).is_err());
        assert!(out.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_huge_strides_are_rejected_without_writing() {
        let (y, u, v) = planar(8, 8, 16, 128, 128);
        let mut out = vec![7u8; 8 * 8 * 4];

        let planes = Yuv420Planes {
            y: &y,
            u: &u,
            v: &v,
            y_row_stride: usize::MAX / 2,
            uv_row_stride: 4,
            uv_pixel_stride: 1,
        };
        assert!(matches!(
            convert_yuv420_to_rgba(&planes, 8, 8, &mut out),
            Err(EngineError::InvalidParameters(_))
        ));

        let planes = Yuv420Planes {
            y_row_stride: 8,
            uv_row_stride: usize::MAX,
            uv_pixel_stride: usize::MAX,
            ..planes
        };
        assert!(matches!(
            convert_yuv420_to_rgba(&planes, 8, 8, &mut out),
            Err(EngineError::InvalidParameters(_))
        ));
        assert!(out.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_odd_dimensions() {
        // 3x3 frame: chroma is 2x2, last column and row reuse the second sample
        let y = vec![16u8; 9];
        let u = vec![128u8; 4];
        let v = vec![128u8, 255, 128, 255];
        let planes = Yuv420Planes {
            y: &y,
            u: &u,
            v: &v,
            y_row_stride: 3,
            uv_row_stride: 2,
            uv_pixel_stride: 1,
        };
        let mut out = vec![0u8; 3 * 3 * 4];
        convert_yuv420_to_rgba(&planes, 3, 3, &mut out).unwrap();

        let dark = yuv_to_rgb(16, 128, 128);
        let reddish = yuv_to_rgb(16, 128, 255);
        for row in 0..3 {
            for col in 0..3 {
                let px = &out[(row * 3 + col) * 4..][..4];
                let expected = if col < 2 { dark } else { reddish };
                assert_eq!(&px[..3], expected, "pixel ({col}, {row})");
                assert_eq!(px[3], 255);
            }
        }

        // Four chroma samples are the minimum for 3x3
        let short = Yuv420Planes { u: &u[..3], ..planes };
        assert!(convert_yuv420_to_rgba(&short, 3, 3, &mut out).is_err());
    }

    #[test]
    fn test_small_output_is_rejected() {
        let (y, u, v) = planar(2, 2, 16, 128, 128);
        let planes = Yuv420Planes {
            y: &y,
            u: &u,
            v: &v,
            y_row_stride: 2,
            uv_row_stride: 1,
            uv_pixel_stride: 1,
        };
        let mut out = vec![0u8; 8];
        assert!(matches!(
            convert_yuv420_to_rgba(&planes, 2, 2, &mut out),
            Err(EngineError::BufferTooSmall { buffer: "output", .. })
        ));
    }
}
