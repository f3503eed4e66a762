//! Segment parsing: turns the marker-delimited header portion of a JPEG
//! stream into the tables and frame/scan metadata the rest of the decoder
//! needs.
//!
//! Each function here consumes exactly the bytes its segment's length field
//! promises and returns [`DecodeErrors::TruncatedSegment`] if the segment's
//! actual contents don't add up to that length -- the length field is the
//! ground truth, not the fixed-field layout.
use crate::bitstream::ByteReader;
use crate::components::{Component, ComponentID};
use crate::errors::{DecodeErrors, TableKind};
use crate::huffman::HuffmanTable;
use crate::misc::MAX_TABLES;

/// `Y`/`X`/`Nf` and the per-component sampling/quantization assignments read
/// from a SOF0 segment.
pub(crate) struct FrameHeader {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) components: Vec<Component>
}

/// Read a segment's 2-byte big-endian length and turn it into the position
/// the segment's payload must end at. `length` includes the two length
/// bytes themselves, per the JPEG spec.
fn segment_end(reader: &mut ByteReader) -> Result<usize, DecodeErrors> {
    let offset = reader.position();
    let length = reader.read_u16_be()?;
    if length < 2 {
        return Err(DecodeErrors::TruncatedSegment {
            offset,
            reason: format!("segment length {length} is smaller than the length field itself")
        });
    }
    Ok(reader.position() + usize::from(length) - 2)
}

fn expect_end(reader: &mut ByteReader, end: usize, offset: usize, what: &str) -> Result<(), DecodeErrors> {
    if reader.position() != end {
        return Err(DecodeErrors::TruncatedSegment {
            offset,
            reason: format!(
                "{what} payload ended at offset {} but the segment length promised {end}",
                reader.position()
            )
        });
    }
    Ok(())
}

/// Skip an APPn or COM segment we have no use for, validating only that its
/// declared length doesn't run past the buffer.
pub(crate) fn skip_segment(reader: &mut ByteReader) -> Result<(), DecodeErrors> {
    let end = segment_end(reader)?;
    let remaining = end.saturating_sub(reader.position());
    reader.skip(remaining)
}

/// Parse a JFIF APP0 segment: identifier, version, density units, thumbnail
/// dimensions, and (discarded) thumbnail pixels. A non-JFIF APP0 (missing
/// the `"JFIF\0"` tag) is skipped by length like any other APPn.
pub(crate) fn parse_app0(reader: &mut ByteReader) -> Result<Option<(u16, u16)>, DecodeErrors> {
    let offset = reader.position();
    let end = segment_end(reader)?;

    if end.saturating_sub(reader.position()) < 7 {
        // too short to carry an identifier, skip whatever is left
        let remaining = end.saturating_sub(reader.position());
        reader.skip(remaining)?;
        return Ok(None);
    }

    let identifier = reader.read_bytes(5)?;
    if identifier != b"JFIF\0" {
        let remaining = end.saturating_sub(reader.position());
        reader.skip(remaining)?;
        return Ok(None);
    }

    let _version = reader.read_u16_be()?;
    let _density_units = reader.read_u8()?;
    let x_density = reader.read_u16_be()?;
    let y_density = reader.read_u16_be()?;
    let thumb_w = reader.read_u8()?;
    let thumb_h = reader.read_u8()?;
    let thumb_bytes = usize::from(thumb_w) * usize::from(thumb_h) * 3;

    debug!("JFIF APP0: density {x_density}x{y_density}, thumbnail {thumb_w}x{thumb_h}");

    let remaining = end.saturating_sub(reader.position());
    if remaining < thumb_bytes {
        return Err(DecodeErrors::TruncatedSegment {
            offset,
            reason: "APP0 thumbnail pixels run past the segment length".into()
        });
    }
    reader.skip(remaining)?;
    Ok(Some((x_density, y_density)))
}

/// **DQT**: one or more quantization tables, each `Pq<<4 | Tq` followed by
/// 64 values (8-bit if `Pq==0`, big-endian 16-bit if `Pq==1`), stored in
/// zig-zag order exactly as the bitstream carries them.
pub(crate) fn parse_dqt(
    reader: &mut ByteReader, qt_tables: &mut [Option<[u16; 64]>; MAX_TABLES]
) -> Result<(), DecodeErrors> {
    let offset = reader.position();
    let end = segment_end(reader)?;

    while reader.position() < end {
        let pq_tq = reader.read_u8()?;
        let pq = pq_tq >> 4;
        let tq = usize::from(pq_tq & 0x0F);
        if tq >= MAX_TABLES {
            return Err(DecodeErrors::TruncatedSegment {
                offset,
                reason: format!("quantization table id {tq} is outside the valid 0..4 range")
            });
        }

        let mut values = [0u16; 64];
        match pq {
            0 => {
                for v in &mut values {
                    *v = u16::from(reader.read_u8()?);
                }
            }
            1 => {
                for v in &mut values {
                    *v = reader.read_u16_be()?;
                }
            }
            _ => {
                return Err(DecodeErrors::TruncatedSegment {
                    offset,
                    reason: format!("quantization table precision must be 0 or 1, found {pq}")
                });
            }
        }
        debug!("DQT: table {tq} ({} bit)", if pq == 0 { 8 } else { 16 });
        qt_tables[tq] = Some(values);
    }

    expect_end(reader, end, offset, "DQT")
}

/// **DHT**: one or more Huffman tables, each `Tc<<4 | Th`, 16 length counts,
/// then the concatenated symbol list.
pub(crate) fn parse_dht(
    reader: &mut ByteReader, dc_tables: &mut [Option<HuffmanTable>; MAX_TABLES],
    ac_tables: &mut [Option<HuffmanTable>; MAX_TABLES]
) -> Result<(), DecodeErrors> {
    let offset = reader.position();
    let end = segment_end(reader)?;

    while reader.position() < end {
        let table_offset = reader.position();
        let tc_th = reader.read_u8()?;
        let tc = tc_th >> 4;
        let th = usize::from(tc_th & 0x0F);
        if th >= MAX_TABLES {
            return Err(DecodeErrors::TruncatedSegment {
                offset,
                reason: format!("huffman table id {th} is outside the valid 0..4 range")
            });
        }

        let count_bytes = reader.read_bytes(16)?;
        let mut counts = [0u8; 16];
        counts.copy_from_slice(count_bytes);
        let total: usize = counts.iter().map(|&b| usize::from(b)).sum();
        let symbols = reader.read_bytes(total)?.to_vec();

        let table = HuffmanTable::build(&counts, symbols, table_offset)?;
        if tc == 0 {
            debug!("DHT: DC table {th}");
            dc_tables[th] = Some(table);
        } else {
            debug!("DHT: AC table {th}");
            ac_tables[th] = Some(table);
        }
    }

    expect_end(reader, end, offset, "DHT")
}

/// **DRI**: a 2-byte restart interval, in MCUs. Zero means "no restart
/// markers".
pub(crate) fn parse_dri(reader: &mut ByteReader) -> Result<u16, DecodeErrors> {
    let offset = reader.position();
    let end = segment_end(reader)?;
    let ri = reader.read_u16_be()?;
    expect_end(reader, end, offset, "DRI")?;
    debug!("DRI: restart interval {ri}");
    Ok(ri)
}

/// **SOF0**: precision, `Y`, `X`, `Nf`, then `Nf` 3-byte component records.
/// Only called once `Marker::SOF(0)` has already been recognized; any other
/// SOF number is rejected by the caller before reaching here.
pub(crate) fn parse_sof0(reader: &mut ByteReader) -> Result<FrameHeader, DecodeErrors> {
    let offset = reader.position();
    let end = segment_end(reader)?;

    let precision = reader.read_u8()?;
    if precision != 8 {
        return Err(DecodeErrors::UnsupportedMode {
            offset,
            reason: format!("sample precision {precision} is not supported, only 8-bit samples are")
        });
    }

    let height = reader.read_u16_be()?;
    let width = reader.read_u16_be()?;
    if width == 0 || height == 0 {
        return Err(DecodeErrors::UnsupportedMode {
            offset,
            reason: "image width and height must both be non-zero".into()
        });
    }

    let nf = reader.read_u8()?;
    if nf != 1 && nf != 3 {
        return Err(DecodeErrors::UnsupportedMode {
            offset,
            reason: format!("{nf} components is not supported, only 1 (grayscale) or 3 (YCbCr) are")
        });
    }

    let expected_length = 8 + 3 * usize::from(nf);
    if end - offset != expected_length {
        return Err(DecodeErrors::TruncatedSegment {
            offset,
            reason: format!("SOF0 with {nf} components should be {expected_length} bytes long")
        });
    }

    let mut components = Vec::with_capacity(usize::from(nf));
    let mut total_blocks = 0usize;
    for _ in 0..nf {
        let record = reader.read_bytes(3)?;
        let bytes = [record[0], record[1], record[2]];
        let component = Component::parse(bytes, offset)?;
        total_blocks += usize::from(component.horizontal_sample) * usize::from(component.vertical_sample);
        components.push(component);
    }
    if total_blocks > 10 {
        return Err(DecodeErrors::UnsupportedMode {
            offset,
            reason: format!("{total_blocks} blocks per MCU exceeds the baseline limit of 10")
        });
    }
    if components.len() == 3 {
        let mut has_y = false;
        let mut has_cb = false;
        let mut has_cr = false;
        for component in &components {
            match component.id {
                ComponentID::Y => has_y = true,
                ComponentID::Cb => has_cb = true,
                ComponentID::Cr => has_cr = true
            }
        }
        if !(has_y && has_cb && has_cr) {
            return Err(DecodeErrors::UnsupportedMode {
                offset,
                reason: "a 3-component frame must declare exactly one each of Y, Cb and Cr".into()
            });
        }
    }

    expect_end(reader, end, offset, "SOF0")?;
    debug!("SOF0: {width}x{height}, {nf} components");

    Ok(FrameHeader {
        width,
        height,
        components
    })
}

/// **SOS**: `Ns` component selectors (each with its DC/AC table slots),
/// then the baseline-only spectral selection bytes (`Ss=0, Se=63, Ah=Al=0`).
///
/// Returns the indices into `components`, in scan order -- this fixes the
/// MCU interleaving order the entropy decoder must follow.
pub(crate) fn parse_sos(reader: &mut ByteReader, components: &mut [Component]) -> Result<Vec<usize>, DecodeErrors> {
    let offset = reader.position();
    let end = segment_end(reader)?;

    let ns = reader.read_u8()?;
    if usize::from(ns) != components.len() {
        return Err(DecodeErrors::UnsupportedMode {
            offset,
            reason: format!(
                "scan declares {ns} components but the frame has {}; non-interleaved scans are not supported",
                components.len()
            )
        });
    }

    let mut scan_order = Vec::with_capacity(usize::from(ns));
    for _ in 0..ns {
        let cs = reader.read_u8()?;
        let td_ta = reader.read_u8()?;
        let td = td_ta >> 4;
        let ta = td_ta & 0x0F;

        let id = ComponentID::from_u8(cs).ok_or_else(|| DecodeErrors::UnsupportedMode {
            offset,
            reason: format!("scan component selector {cs} does not match any frame component")
        })?;
        let index = components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DecodeErrors::UnsupportedMode {
                offset,
                reason: format!("scan references component {cs} which the frame header never declared")
            })?;

        components[index].dc_huff_table = td;
        components[index].ac_huff_table = ta;
        scan_order.push(index);
    }

    let ss = reader.read_u8()?;
    let se = reader.read_u8()?;
    let ah_al = reader.read_u8()?;
    if ss != 0 || se != 63 || ah_al != 0 {
        return Err(DecodeErrors::UnsupportedMode {
            offset,
            reason: format!(
                "spectral selection Ss={ss} Se={se} Ah={} Al={} is not baseline (expected 0, 63, 0, 0)",
                ah_al >> 4,
                ah_al & 0x0F
            )
        });
    }

    expect_end(reader, end, offset, "SOS")?;
    debug!("SOS: {ns} components, scan order {scan_order:?}");

    Ok(scan_order)
}

/// Validate that every component's referenced quantization table has been
/// defined by a prior DQT, surfacing [`DecodeErrors::MissingTable`] at the
/// SOS offset rather than letting the entropy decoder discover it lazily.
pub(crate) fn check_quant_tables(
    components: &[Component], qt_tables: &[Option<[u16; 64]>; MAX_TABLES], offset: usize
) -> Result<(), DecodeErrors> {
    for component in components {
        let id = usize::from(component.quantization_table_number);
        if qt_tables.get(id).map_or(true, Option::is_none) {
            return Err(DecodeErrors::MissingTable {
                offset,
                kind: TableKind::Quantization,
                id: component.quantization_table_number
            });
        }
    }
    Ok(())
}
