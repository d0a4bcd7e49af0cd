//! Pixel layout conversion between premultiplied ARGB and straight RGBA.
//!
//! Whole-slide backends hand out regions as native-endian 32-bit words holding
//! premultiplied ARGB. Image libraries expect straight RGBA bytes. The
//! conversion is done in place on a raw byte buffer.

use crate::error::SourceError;

#[cfg(target_endian = "big")]
mod channel {
    pub const A: usize = 0;
    pub const R: usize = 1;
    pub const G: usize = 2;
    pub const B: usize = 3;
}

#[cfg(target_endian = "little")]
mod channel {
    pub const B: usize = 0;
    pub const G: usize = 1;
    pub const R: usize = 2;
    pub const A: usize = 3;
}

/// Convert premultiplied ARGB words to straight RGBA bytes, in place.
///
/// `buf` holds native-endian `u32` ARGB pixels. Fully transparent pixels are
/// left at zero, fully opaque pixels are only reordered, and partially
/// transparent pixels have each color channel divided by alpha (rounded).
pub fn argb_to_rgba(buf: &mut [u8]) -> Result<(), SourceError> {
    if buf.len() % 4 != 0 {
        return Err(SourceError::InvalidRegion {
            message: format!("pixel buffer length {} is not a multiple of 4", buf.len()),
        });
    }

    for px in buf.chunks_exact_mut(4) {
        let a = px[channel::A];
        let mut r = px[channel::R];
        let mut g = px[channel::G];
        let mut b = px[channel::B];
        if a != 0 && a != 255 {
            r = unpremultiply(r, a);
            g = unpremultiply(g, a);
            b = unpremultiply(b, a);
        }
        px[0] = r;
        px[1] = g;
        px[2] = b;
        px[3] = a;
    }

    Ok(())
}

#[inline]
fn unpremultiply(c: u8, a: u8) -> u8 {
    let a = a as u32;
    ((c as u32 * 255 + a / 2) / a).min(255) as u8
}

/// Pack a straight RGBA pixel into a premultiplied ARGB word.
#[inline]
pub fn premultiply(rgba: [u8; 4]) -> u32 {
    let [r, g, b, a] = rgba;
    let scale = |c: u8| -> u32 {
        match a {
            0 => 0,
            255 => c as u32,
            _ => (c as u32 * a as u32 + 127) / 255,
        }
    };
    (a as u32) << 24 | scale(r) << 16 | scale(g) << 8 | scale(b)
}
