//! PPM (P6) serialization: the on-disk container a decoded [`Image`] is
//! persisted to.
//!
//! The format is deliberately trivial compared to JPEG: an ASCII header
//! naming the format, width, height and maximum sample value, followed by
//! raw interleaved samples. No compression, no byte-stuffing, no markers.
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

use crate::image::{Image, ImageInfo};
use crate::misc::{ColorSpace, SOFMarkers};

/// Everything that can go wrong turning PPM bytes back into an [`Image`].
/// `write_ppm` itself cannot fail: an `Image`'s invariants already guarantee
/// its data is the right size for its dimensions and colour space.
pub enum PpmError {
    /// Missing or malformed `P6` magic bytes.
    BadMagic,
    /// The header's width/height/maxval fields ran out before three
    /// whitespace-separated tokens were found.
    TruncatedHeader,
    /// A header token wasn't a valid unsigned integer.
    InvalidHeaderValue { token: String },
    /// Maxval other than 255; this writer/reader only handles 8-bit samples.
    UnsupportedMaxval { maxval: u32 },
    /// The pixel data after the header is shorter than `3 * width * height`.
    TruncatedData { expected: usize, found: usize }
}

impl Debug for PpmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadMagic => write!(f, "not a P6 PPM: missing or unrecognized magic bytes"),
            Self::TruncatedHeader => write!(f, "PPM header ended before width, height and maxval were all read"),
            Self::InvalidHeaderValue { token } => write!(f, "PPM header token {token:?} is not a valid integer"),
            Self::UnsupportedMaxval { maxval } => {
                write!(f, "PPM maxval {maxval} is not supported, only 255 (8-bit) is")
            }
            Self::TruncatedData { expected, found } => {
                write!(f, "PPM pixel data is truncated: expected {expected} bytes, found {found}")
            }
        }
    }
}

impl Display for PpmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for PpmError {}

/// Serialize an [`Image`] as a P6 PPM byte stream: `P6\n<W> <H>\n255\n`
/// followed by `3*W*H` raw R,G,B bytes, row-major, top-to-bottom.
///
/// A [`ColorSpace::Luma`] image is expanded to RGB by replicating its
/// single sample across all three channels.
#[must_use]
pub fn write_ppm(image: &Image) -> Vec<u8> {
    let width = usize::from(image.width());
    let height = usize::from(image.height());

    let mut out = Vec::with_capacity(32 + width * height * 3);
    out.extend_from_slice(format!("P6\n{width} {height}\n255\n").as_bytes());

    match image.colorspace() {
        ColorSpace::Rgb => out.extend_from_slice(image.data()),
        ColorSpace::Luma => {
            for &sample in image.data() {
                out.extend_from_slice(&[sample, sample, sample]);
            }
        }
    }

    out
}

/// Parse bytes previously produced by [`write_ppm`] back into an [`Image`].
///
/// Only the exact subset of P6 this crate writes is accepted: a single
/// whitespace-delimited `P6 <W> <H> <maxval>` header (comments are not
/// handled) followed by maxval 255 and exactly `3*W*H` bytes of pixel data.
/// The resulting `Image` is always [`ColorSpace::Rgb`], since PPM carries
/// no marker distinguishing a replicated-luma source from a genuine colour
/// one.
///
/// # Errors
/// Returns a [`PpmError`] if the magic bytes, header tokens, or pixel data
/// length don't match what this writer produces.
pub fn parse_ppm(bytes: &[u8]) -> Result<Image, PpmError> {
    if bytes.len() < 2 || &bytes[0..2] != b"P6" {
        return Err(PpmError::BadMagic);
    }

    let mut cursor = 2usize;
    let mut tokens: Vec<u32> = Vec::with_capacity(3);
    while tokens.len() < 3 {
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        let start = cursor;
        while cursor < bytes.len() && !bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if start == cursor {
            return Err(PpmError::TruncatedHeader);
        }
        let token = std::str::from_utf8(&bytes[start..cursor]).unwrap_or("");
        let value: u32 = token.parse().map_err(|_| PpmError::InvalidHeaderValue {
            token: token.to_string()
        })?;
        tokens.push(value);
    }
    // The single whitespace byte that terminated the maxval token is part
    // of the header, not the pixel data.
    cursor += 1;

    let width = tokens[0];
    let height = tokens[1];
    let maxval = tokens[2];
    if maxval != 255 {
        return Err(PpmError::UnsupportedMaxval { maxval });
    }

    let expected = 3 * width as usize * height as usize;
    let data = bytes.get(cursor..).unwrap_or(&[]);
    if data.len() < expected {
        return Err(PpmError::TruncatedData {
            expected,
            found: data.len()
        });
    }

    let info = ImageInfo {
        width: width as u16,
        height: height as u16,
        components: 3,
        sof: SOFMarkers::BaselineDct,
        x_density: 0,
        y_density: 0
    };
    Ok(Image::new(info, ColorSpace::Rgb, data[..expected].to_vec()))
}
