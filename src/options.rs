//! Decoder configuration.
//!
//! These knobs never change decode *semantics* for a well-formed file; they
//! only add extra guard rails (`max_width`/`max_height`) or tighten how
//! strictly malformed-but-common files are rejected (`strict_mode`), in the
//! same spirit as `zune-jpeg`'s `ZuneJpegOptions`.

/// Tunables for a [`Decoder`](crate::decoder::Decoder).
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    max_width: u16,
    max_height: u16,
    strict_mode: bool
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_width: u16::MAX,
            max_height: u16::MAX,
            strict_mode: false
        }
    }
}

impl DecoderOptions {
    /// Create a new set of options with the library defaults.
    #[must_use]
    pub fn new() -> DecoderOptions {
        DecoderOptions::default()
    }

    /// Reject frames wider than `width`.
    #[must_use]
    pub fn set_max_width(mut self, width: u16) -> Self {
        self.max_width = width;
        self
    }

    /// Reject frames taller than `height`.
    #[must_use]
    pub fn set_max_height(mut self, height: u16) -> Self {
        self.max_height = height;
        self
    }

    /// When set, extra fill bytes between a segment and the following
    /// marker become a fatal `TruncatedSegment` instead of being skipped.
    #[must_use]
    pub fn set_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    #[must_use]
    pub(crate) fn max_width(self) -> u16 {
        self.max_width
    }

    #[must_use]
    pub(crate) fn max_height(self) -> u16 {
        self.max_height
    }

    #[must_use]
    pub(crate) fn strict_mode(self) -> bool {
        self.strict_mode
    }
}
