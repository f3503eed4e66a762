//! JPEG segment markers.
//!
//! A marker is always `0xFF` followed by a non-zero, non-`0xFF` byte. This
//! module turns that raw byte into a tagged variant; `headers.rs` and
//! `mcu.rs` switch on it to decide what to parse next.

/// A recognized JPEG marker.
#[derive(Copy, Clone, Eq, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Marker {
    /// Start of Image, `FF D8`.
    SOI,
    /// End of Image, `FF D9`.
    EOI,
    /// Start of Frame, `FF C0..CF` excluding DHT/JPG/DAC. The payload is the
    /// SOF number (0 for baseline).
    SOF(u8),
    /// Define Huffman Table(s), `FF C4`.
    DHT,
    /// Define Quantization Table(s), `FF DB`.
    DQT,
    /// Define Restart Interval, `FF DD`.
    DRI,
    /// Start of Scan, `FF DA`.
    SOS,
    /// Restart marker, `FF D0..D7`. The payload is the cyclic index 0..7.
    RST(u8),
    /// Application segment, `FF E0..EF`. The payload is the APPn number.
    APP(u8),
    /// Comment, `FF FE`.
    COM
}

impl Marker {
    /// Recognize a marker from the byte that follows `0xFF`.
    ///
    /// Returns `None` for bytes this decoder has no use for: `0xFF`, `0x00`
    /// (stuffed byte, never a marker), `TEM`/`JPG`/`DAC`/`DNL` and reserved
    /// bytes. The caller treats `None` as `UnknownMarker` while parsing
    /// headers.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            // SOF0..SOF15, skipping 0xC4 (DHT), 0xC8 (JPG extension), 0xCC (DAC)
            0xC0..=0xC3 => Some(Marker::SOF(byte - 0xC0)),
            0xC5..=0xC7 => Some(Marker::SOF(byte - 0xC0)),
            0xC9..=0xCB => Some(Marker::SOF(byte - 0xC0)),
            0xCD..=0xCF => Some(Marker::SOF(byte - 0xC0)),
            0xC4 => Some(Marker::DHT),
            0xDB => Some(Marker::DQT),
            0xDD => Some(Marker::DRI),
            0xDA => Some(Marker::SOS),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            _ => None
        }
    }
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SOI => write!(f, "SOI"),
            Self::EOI => write!(f, "EOI"),
            Self::SOF(0) => write!(f, "SOF0 (baseline DCT)"),
            Self::SOF(n) => write!(f, "SOF{n}"),
            Self::DHT => write!(f, "DHT"),
            Self::DQT => write!(f, "DQT"),
            Self::DRI => write!(f, "DRI"),
            Self::SOS => write!(f, "SOS"),
            Self::RST(n) => write!(f, "RST{n}"),
            Self::APP(n) => write!(f, "APP{n}"),
            Self::COM => write!(f, "COM")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Marker;

    #[test]
    fn recognizes_baseline_sof() {
        assert!(matches!(Marker::from_u8(0xC0), Some(Marker::SOF(0))));
    }

    #[test]
    fn recognizes_restart_markers() {
        for i in 0..8u8 {
            assert!(matches!(Marker::from_u8(0xD0 + i), Some(Marker::RST(n)) if n == i));
        }
    }

    #[test]
    fn rejects_dac_and_jpg_extension() {
        assert!(Marker::from_u8(0xCC).is_none());
        assert!(Marker::from_u8(0xC8).is_none());
        assert!(Marker::from_u8(0xFF).is_none());
        assert!(Marker::from_u8(0x01).is_none());
    }
}
