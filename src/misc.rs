//! Shared constants and small value types used across the decoder.
#![allow(dead_code)]

/// Maximum number of quantization/Huffman table slots; Tq/Th/Ta each range
/// over 0..=3.
pub(crate) const MAX_TABLES: usize = 4;

/// Maximum number of colour components a baseline frame may carry. SOF
/// parsing rejects frames with more than this many component records.
pub(crate) const MAX_COMPONENTS: usize = 3;

/// Maximum accepted `width * height`; guards against absurd headers turning
/// a tiny input file into a multi-gigabyte allocation.
pub(crate) const MAX_DIMENSIONS: usize = 1 << 27;

/// Undo zig-zag ordering: `UN_ZIGZAG[i]` is the natural-order position of the
/// coefficient stored at zig-zag index `i`.
#[rustfmt::skip]
pub(crate) const UN_ZIGZAG: [usize; 64] = [
    0,  1,  8,  16, 9,  2,  3, 10,
    17, 24, 32, 25, 18, 11, 4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13, 6,  7,  14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// The colour space of a decoded [`Image`](crate::image::Image).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorSpace {
    /// Single-channel luma. The PPM writer replicates it across R, G, B.
    Luma,
    /// 3-channel interleaved R, G, B.
    Rgb
}

impl ColorSpace {
    /// Number of channels in a pixel of this colour space.
    #[must_use]
    pub const fn num_components(self) -> usize {
        match self {
            Self::Luma => 1,
            Self::Rgb => 3
        }
    }
}

/// Which Start-Of-Frame variant a frame header declared.
///
/// Only [`SOFMarkers::BaselineDct`] is implemented; every other variant
/// exists so [`crate::errors::DecodeErrors::UnsupportedMode`] can name what
/// it rejected.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum SOFMarkers {
    /// SOF0: Baseline sequential DCT, Huffman coding. The only supported mode.
    BaselineDct,
    /// SOF1: Extended sequential DCT, Huffman coding.
    ExtendedSequentialHuffman,
    /// SOF2: Progressive DCT, Huffman coding.
    ProgressiveDctHuffman,
    /// SOF3: Lossless (sequential), Huffman coding.
    LosslessHuffman,
    /// SOF9: Extended sequential DCT, arithmetic coding.
    ExtendedSequentialArithmetic,
    /// SOF10: Progressive DCT, arithmetic coding.
    ProgressiveDctArithmetic,
    /// SOF11: Lossless (sequential), arithmetic coding.
    LosslessArithmetic
}

impl SOFMarkers {
    /// Map a SOF marker's payload number (`SOF(n)`) to its named variant.
    #[must_use]
    pub fn from_sof_number(n: u8) -> Option<SOFMarkers> {
        match n {
            0 => Some(Self::BaselineDct),
            1 => Some(Self::ExtendedSequentialHuffman),
            2 => Some(Self::ProgressiveDctHuffman),
            3 => Some(Self::LosslessHuffman),
            9 => Some(Self::ExtendedSequentialArithmetic),
            10 => Some(Self::ProgressiveDctArithmetic),
            11 => Some(Self::LosslessArithmetic),
            _ => None
        }
    }
}
