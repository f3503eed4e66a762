//! The decoder entry point: drives the marker parser across a whole JPEG
//! buffer, then hands the scan off to the entropy decoder and the image
//! assembler.
use crate::bitstream::ByteReader;
use crate::components::ComponentID;
use crate::errors::DecodeErrors;
use crate::headers::{check_quant_tables, parse_app0, parse_dht, parse_dqt, parse_dri, parse_sof0, parse_sos,
                     skip_segment, FrameHeader};
use crate::huffman::HuffmanTable;
use crate::image::{Image, ImageInfo};
use crate::marker::Marker;
use crate::misc::{ColorSpace, SOFMarkers, MAX_DIMENSIONS, MAX_TABLES};
use crate::options::DecoderOptions;
use crate::{mcu, worker};

/// A JPEG decoder instance.
///
/// Holds only configuration ([`DecoderOptions`]) and the metadata of the
/// last successful decode; it owns no buffers between calls, so a single
/// `Decoder` can be reused across many [`Self::decode_buffer`] calls.
#[derive(Default)]
pub struct Decoder {
    options: DecoderOptions,
    info: Option<ImageInfo>
}

impl Decoder {
    /// Create a decoder with the library's default options.
    #[must_use]
    pub fn new() -> Decoder {
        Decoder::default()
    }

    /// Create a decoder with explicit [`DecoderOptions`].
    #[must_use]
    pub fn new_with_options(options: DecoderOptions) -> Decoder {
        Decoder { options, info: None }
    }

    /// Header metadata from the most recent successful [`Self::decode_buffer`]
    /// call, or `None` if nothing has been decoded yet.
    #[must_use]
    pub fn info(&self) -> Option<ImageInfo> {
        self.info.clone()
    }

    /// Decode a complete in-memory JFIF/JPEG byte buffer into an [`Image`].
    ///
    /// # Errors
    /// Returns the first [`DecodeErrors`] encountered; no partial image is
    /// ever returned.
    pub fn decode_buffer(&mut self, buf: &[u8]) -> Result<Image, DecodeErrors> {
        let image = decode_internal(buf, &self.options)?;
        self.info = Some(image.info());
        Ok(image)
    }

    /// Parse only the marker stream up to and including SOS, populating
    /// [`Self::info`] without entropy-decoding the scan. Useful for
    /// inspecting a file's dimensions and colour space without paying for
    /// a full decode.
    ///
    /// # Errors
    /// Returns the first [`DecodeErrors`] encountered while parsing headers.
    pub fn read_headers(&mut self, buf: &[u8]) -> Result<(), DecodeErrors> {
        let mut reader = ByteReader::new(buf);
        let (frame, _scan_order, _restart_interval, _dc, _ac, _qt, (x_density, y_density)) =
            parse_headers(&mut reader, &self.options)?;

        let colorspace = match frame.components.len() {
            1 => ColorSpace::Luma,
            3 => ColorSpace::Rgb,
            n => return Err(DecodeErrors::InternalError(format!("{n} components survived SOF0 validation")))
        };

        self.info = Some(ImageInfo {
            width: frame.width,
            height: frame.height,
            components: colorspace.num_components() as u8,
            sof: SOFMarkers::BaselineDct,
            x_density,
            y_density
        });
        Ok(())
    }
}

/// Find the next marker byte: a run of `0xFF` fill bytes followed by a
/// non-`0xFF` byte. Bare non-marker bytes between segments are only
/// tolerated when [`DecoderOptions::strict_mode`](crate::options::DecoderOptions)
/// is off.
fn next_marker(reader: &mut ByteReader, strict: bool) -> Result<Marker, DecodeErrors> {
    let offset = reader.position();
    let first = reader.read_u8()?;
    if first != 0xFF {
        if strict {
            return Err(DecodeErrors::TruncatedSegment {
                offset,
                reason: format!("expected a marker (0xFF..) but found byte 0x{first:02X}")
            });
        }
        // Skip stray bytes until we find a marker lead-in.
        let mut byte = first;
        while byte != 0xFF {
            byte = reader.read_u8()?;
        }
    }

    let mut byte = reader.read_u8()?;
    while byte == 0xFF {
        // fill bytes before a real marker byte are legal
        byte = reader.read_u8()?;
    }

    Marker::from_u8(byte).ok_or(DecodeErrors::UnknownMarker {
        offset,
        byte
    })
}

/// Parse the marker stream up to and including SOS, populating tables and
/// returning the frame header, the SOS scan order, and the restart interval.
#[allow(clippy::type_complexity)]
fn parse_headers(
    reader: &mut ByteReader, options: &DecoderOptions
) -> Result<
    (
        FrameHeader,
        Vec<usize>,
        u16,
        [Option<HuffmanTable>; MAX_TABLES],
        [Option<HuffmanTable>; MAX_TABLES],
        [Option<[u16; 64]>; MAX_TABLES],
        (u16, u16)
    ),
    DecodeErrors
> {
    let first = reader.read_u8()?;
    let second = reader.read_u8()?;
    if first != 0xFF || second != 0xD8 {
        return Err(DecodeErrors::NotJpeg);
    }

    let mut qt_tables: [Option<[u16; 64]>; MAX_TABLES] = Default::default();
    let mut dc_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
    let mut ac_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
    let mut frame: Option<FrameHeader> = None;
    let mut restart_interval: u16 = 0;
    let mut density = (0u16, 0u16);

    loop {
        let marker_offset = reader.position();
        let marker = next_marker(reader, options.strict_mode())?;

        match marker {
            Marker::APP(0) => {
                if let Some(d) = parse_app0(reader)? {
                    density = d;
                }
            }
            Marker::APP(_) | Marker::COM => skip_segment(reader)?,
            Marker::DQT => parse_dqt(reader, &mut qt_tables)?,
            Marker::DHT => parse_dht(reader, &mut dc_tables, &mut ac_tables)?,
            Marker::DRI => restart_interval = parse_dri(reader)?,
            Marker::SOF(0) => {
                let header = parse_sof0(reader)?;
                if header.width > options.max_width() || header.height > options.max_height() {
                    return Err(DecodeErrors::UnsupportedMode {
                        offset: marker_offset,
                        reason: format!(
                            "{}x{} exceeds the configured maximum of {}x{}",
                            header.width,
                            header.height,
                            options.max_width(),
                            options.max_height()
                        )
                    });
                }
                if usize::from(header.width) * usize::from(header.height) > MAX_DIMENSIONS {
                    return Err(DecodeErrors::UnsupportedMode {
                        offset: marker_offset,
                        reason: "image dimensions are implausibly large".into()
                    });
                }
                frame = Some(header);
            }
            Marker::SOF(n) => {
                return Err(DecodeErrors::UnsupportedMode {
                    offset: marker_offset,
                    reason: format!(
                        "SOF{n} is not baseline sequential DCT; progressive, arithmetic, extended and \
                         lossless modes are not supported"
                    )
                });
            }
            Marker::SOS => {
                let header = frame
                    .as_mut()
                    .ok_or_else(|| DecodeErrors::InternalError("SOS encountered before SOF0".into()))?;
                check_quant_tables(&header.components, &qt_tables, marker_offset)?;
                let scan_order = parse_sos(reader, &mut header.components)?;
                for &index in &scan_order {
                    let component = &header.components[index];
                    if dc_tables[usize::from(component.dc_huff_table)].is_none() {
                        return Err(DecodeErrors::MissingTable {
                            offset: marker_offset,
                            kind: crate::errors::TableKind::DcHuffman,
                            id: component.dc_huff_table
                        });
                    }
                    if ac_tables[usize::from(component.ac_huff_table)].is_none() {
                        return Err(DecodeErrors::MissingTable {
                            offset: marker_offset,
                            kind: crate::errors::TableKind::AcHuffman,
                            id: component.ac_huff_table
                        });
                    }
                }
                let frame = frame.expect("checked above");
                return Ok((frame, scan_order, restart_interval, dc_tables, ac_tables, qt_tables, density));
            }
            Marker::EOI => {
                return Err(DecodeErrors::InvalidBitstream {
                    offset: marker_offset,
                    reason: "encountered EOI before any scan was read".into()
                });
            }
            Marker::RST(_) => {
                return Err(DecodeErrors::InvalidBitstream {
                    offset: marker_offset,
                    reason: "restart marker outside of a scan".into()
                });
            }
            Marker::SOI => {
                return Err(DecodeErrors::InvalidBitstream {
                    offset: marker_offset,
                    reason: "duplicate SOI marker".into()
                });
            }
        }
    }
}

fn decode_internal(buf: &[u8], options: &DecoderOptions) -> Result<Image, DecodeErrors> {
    let mut reader = ByteReader::new(buf);

    let (frame, scan_order, restart_interval, dc_tables, ac_tables, qt_tables, (x_density, y_density)) =
        parse_headers(&mut reader, options)?;

    let FrameHeader {
        width,
        height,
        mut components
    } = frame;

    // Reorder components into scan order: this is the order blocks actually
    // interleave in within each MCU.
    let mut ordered = Vec::with_capacity(components.len());
    for &index in &scan_order {
        ordered.push(components[index].clone());
    }
    components = ordered;

    let h_max = usize::from(components.iter().map(|c| c.horizontal_sample).max().unwrap_or(1));
    let v_max = usize::from(components.iter().map(|c| c.vertical_sample).max().unwrap_or(1));
    let mcu_width = 8 * h_max;
    let mcu_height = 8 * v_max;
    let mcus_per_line = (usize::from(width) + mcu_width - 1) / mcu_width;
    let mcus_per_column = (usize::from(height) + mcu_height - 1) / mcu_height;

    let planes = mcu::decode_scan(
        &mut reader,
        &mut components,
        &dc_tables,
        &ac_tables,
        &qt_tables,
        mcus_per_line,
        mcus_per_column,
        usize::from(restart_interval)
    )?;

    let colorspace = match components.len() {
        1 => ColorSpace::Luma,
        3 => ColorSpace::Rgb,
        n => return Err(DecodeErrors::InternalError(format!("{n} components survived SOF0 validation"))),
    };

    // worker::assemble_image assumes index 0/1/2 are Y/Cb/Cr; SOS scan order
    // need not match that, so reindex both planes and components by id.
    // parse_sof0 already rejects any 3-component frame that doesn't carry
    // exactly one each of Y/Cb/Cr, so these lookups cannot miss; they return
    // InternalError instead of panicking if that invariant is ever broken.
    let (components, planes) = if colorspace == ColorSpace::Rgb {
        let find = |id: ComponentID| {
            components
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| DecodeErrors::InternalError(format!("RGB frame is missing component {id:?}")))
        };
        let y = find(ComponentID::Y)?;
        let cb = find(ComponentID::Cb)?;
        let cr = find(ComponentID::Cr)?;
        (
            vec![components[y].clone(), components[cb].clone(), components[cr].clone()],
            vec![planes[y].clone(), planes[cb].clone(), planes[cr].clone()]
        )
    } else {
        (components, planes)
    };

    let data = worker::assemble_image(&planes, &components, colorspace, usize::from(width), usize::from(height));

    let info = ImageInfo {
        width,
        height,
        components: colorspace.num_components() as u8,
        sof: SOFMarkers::BaselineDct,
        x_density,
        y_density
    };

    Ok(Image::new(info, colorspace, data))
}

/// Decode a complete JFIF/JPEG byte buffer with the default [`DecoderOptions`].
///
/// # Errors
/// Returns the first [`DecodeErrors`] encountered.
pub fn decode(input: &[u8]) -> Result<Image, DecodeErrors> {
    Decoder::new().decode_buffer(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds the smallest legal baseline JPEG: SOI, a trivial DQT/DHT pair,
    /// a 1x1 SOF0, a matching SOS, a one-block all-zero scan, EOI.
    fn minimal_grayscale_jpeg() -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];

        // DQT: table 0, all ones (8-bit), so dequantization is a no-op.
        bytes.extend_from_slice(&[0xFF, 0xDB]);
        bytes.extend_from_slice(&(2u16 + 1 + 64).to_be_bytes());
        bytes.push(0x00); // Pq=0, Tq=0
        bytes.extend(std::iter::repeat(1u8).take(64));

        // DHT: DC table 0 with a single 1-bit symbol 0x00 (category 0).
        bytes.extend_from_slice(&[0xFF, 0xC4]);
        bytes.extend_from_slice(&(2u16 + 1 + 16 + 1).to_be_bytes());
        bytes.push(0x00); // Tc=0 (DC), Th=0
        let mut counts = [0u8; 16];
        counts[0] = 1;
        bytes.extend_from_slice(&counts);
        bytes.push(0x00);

        // DHT: AC table 0 with a single 1-bit symbol 0x00 (EOB).
        bytes.extend_from_slice(&[0xFF, 0xC4]);
        bytes.extend_from_slice(&(2u16 + 1 + 16 + 1).to_be_bytes());
        bytes.push(0x10); // Tc=1 (AC), Th=0
        bytes.extend_from_slice(&counts);
        bytes.push(0x00);

        // SOF0: 1x1, 1 component.
        bytes.extend_from_slice(&[0xFF, 0xC0]);
        bytes.extend_from_slice(&(8u16 + 3).to_be_bytes());
        bytes.push(8); // precision
        bytes.extend_from_slice(&1u16.to_be_bytes()); // Y
        bytes.extend_from_slice(&1u16.to_be_bytes()); // X
        bytes.push(1); // Nf
        bytes.extend_from_slice(&[1, 0x11, 0]); // Ci, HiVi, Tqi

        // SOS.
        bytes.extend_from_slice(&[0xFF, 0xDA]);
        bytes.extend_from_slice(&(6u16 + 2).to_be_bytes());
        bytes.push(1); // Ns
        bytes.extend_from_slice(&[1, 0x00]); // Cs, Td|Ta
        bytes.extend_from_slice(&[0, 63, 0]); // Ss, Se, Ah|Al

        // Entropy-coded segment: DC symbol '0' then AC symbol EOB '0'.
        bytes.push(0x00);

        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn decodes_minimal_grayscale_image() {
        let jpeg = minimal_grayscale_jpeg();
        let image = decode(&jpeg).unwrap();
        assert_eq!(image.width(), 1);
        assert_eq!(image.height(), 1);
        assert_eq!(image.colorspace(), ColorSpace::Luma);
        assert_eq!(image.data(), &[128]);
    }

    #[test]
    fn read_headers_populates_info_without_decoding_scan() {
        let jpeg = minimal_grayscale_jpeg();
        let mut decoder = Decoder::new();
        assert!(decoder.info().is_none());
        decoder.read_headers(&jpeg).unwrap();
        let info = decoder.info().unwrap();
        assert_eq!(info.width, 1);
        assert_eq!(info.height, 1);
        assert_eq!(info.components, 1);
    }

    #[test]
    fn missing_soi_is_not_jpeg() {
        let err = decode(&[0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, DecodeErrors::NotJpeg));
    }

    #[test]
    fn progressive_sof2_is_rejected() {
        let mut jpeg = minimal_grayscale_jpeg();
        // The SOF0 marker byte sits right after SOI + DQT + two DHTs.
        let sof_pos = jpeg.windows(2).position(|w| w == [0xFF, 0xC0]).unwrap();
        jpeg[sof_pos + 1] = 0xC2; // SOF2: progressive
        let err = decode(&jpeg).unwrap_err();
        assert!(matches!(err, DecodeErrors::UnsupportedMode { .. }));
    }

    #[test]
    fn truncated_dqt_is_rejected() {
        let mut jpeg = minimal_grayscale_jpeg();
        // Remove the final coefficient byte of the DQT segment without
        // updating its length field.
        let dqt_pos = jpeg.windows(2).position(|w| w == [0xFF, 0xDB]).unwrap();
        let last_coefficient = dqt_pos + 2 + 2 + 1 + 63;
        jpeg.remove(last_coefficient);
        let err = decode(&jpeg).unwrap_err();
        assert!(matches!(
            err,
            DecodeErrors::TruncatedSegment { .. } | DecodeErrors::UnexpectedEof { .. }
        ));
    }
}
