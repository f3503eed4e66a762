//! Contains the closed set of errors that can be encountered while decoding a
//! baseline JPEG image.
//!
//! Every variant carries the byte offset in the input buffer at which the
//! condition was detected, so callers can point a user at the exact spot a
//! malformed file went wrong. Decoding is fatal on the first error
//! encountered: there is no retry and no partial `Image` is ever handed back.
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Table kind referenced by a scan but never defined via DQT/DHT.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum TableKind {
    /// Discrete quantization table
    Quantization,
    /// DC Huffman table
    DcHuffman,
    /// AC Huffman table
    AcHuffman
}

impl Debug for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quantization => write!(f, "quantization"),
            Self::DcHuffman => write!(f, "DC Huffman"),
            Self::AcHuffman => write!(f, "AC Huffman")
        }
    }
}

/// All errors that [`Decoder::decode_buffer`](crate::decoder::Decoder::decode_buffer) can return.
#[allow(clippy::module_name_repetitions)]
pub enum DecodeErrors {
    /// The buffer is missing the `FF D8` SOI marker at offset 0.
    NotJpeg,
    /// A read ran past the end of the buffer.
    UnexpectedEof { offset: usize },
    /// A segment's declared length didn't match its contents.
    TruncatedSegment { offset: usize, reason: String },
    /// SOF marker other than SOF0, precision != 8, or Nf not in {1,3}.
    UnsupportedMode { offset: usize, reason: String },
    /// A marker byte that isn't in the recognized set while parsing headers.
    UnknownMarker { offset: usize, byte: u8 },
    /// A scan referenced a quantization/Huffman table that was never defined.
    MissingTable {
        offset: usize,
        kind: TableKind,
        id: u8
    },
    /// Sum of Huffman code-length counts exceeded 256, or the symbol list
    /// length didn't match.
    InvalidHuffmanTable { offset: usize, reason: String },
    /// AC index overflow, invalid category, or a Huffman lookup miss.
    InvalidBitstream { offset: usize, reason: String },
    /// Expected RSTm was missing, or its cyclic index didn't match.
    RestartOutOfSync {
        offset: usize,
        expected: u8,
        found: Option<u8>
    },
    /// An invariant that should be unreachable was violated.
    InternalError(String)
}

impl DecodeErrors {
    /// The byte offset at which this error was detected, when known.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::NotJpeg | Self::InternalError(_) => None,
            Self::UnexpectedEof { offset }
            | Self::TruncatedSegment { offset, .. }
            | Self::UnsupportedMode { offset, .. }
            | Self::UnknownMarker { offset, .. }
            | Self::MissingTable { offset, .. }
            | Self::InvalidHuffmanTable { offset, .. }
            | Self::InvalidBitstream { offset, .. }
            | Self::RestartOutOfSync { offset, .. } => Some(*offset)
        }
    }
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotJpeg => write!(f, "Missing SOI marker, this is not a JPEG file"),
            Self::UnexpectedEof { offset } => {
                write!(f, "Unexpected end of buffer at offset {offset}")
            }
            Self::TruncatedSegment { offset, reason } => {
                write!(f, "Truncated segment at offset {offset}: {reason}")
            }
            Self::UnsupportedMode { offset, reason } => {
                write!(f, "Unsupported JPEG mode at offset {offset}: {reason}")
            }
            Self::UnknownMarker { offset, byte } => {
                write!(f, "Unknown marker 0xFF{byte:02X} at offset {offset}")
            }
            Self::MissingTable { offset, kind, id } => {
                write!(
                    f,
                    "Scan at offset {offset} references {kind:?} table {id} which was never defined"
                )
            }
            Self::InvalidHuffmanTable { offset, reason } => {
                write!(f, "Invalid Huffman table at offset {offset}: {reason}")
            }
            Self::InvalidBitstream { offset, reason } => {
                write!(
                    f,
                    "Invalid entropy-coded bitstream at offset {offset}: {reason}"
                )
            }
            Self::RestartOutOfSync {
                offset,
                expected,
                found
            } => match found {
                Some(found) => write!(
                    f,
                    "Restart marker out of sync at offset {offset}: expected RST{expected}, found RST{found}"
                ),
                None => write!(
                    f,
                    "Restart marker out of sync at offset {offset}: expected RST{expected}, found none"
                )
            },
            Self::InternalError(reason) => write!(f, "Internal error (this is a bug): {reason}")
        }
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for DecodeErrors {}
