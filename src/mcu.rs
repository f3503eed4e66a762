//! Entropy decoding: turns the scan's bitstream into per-component sample
//! planes, one MCU at a time.
//!
//! Handles DC prediction (the running per-component predictor that DC
//! coefficients are diffs against) and restart markers (which reset that
//! predictor and resynchronize the bit reader to a byte boundary).
use crate::bitstream::{huff_extend, BitReader, ByteReader};
use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::idct::idct_block;
use crate::marker::Marker;
use crate::misc::MAX_TABLES;

/// One component's decoded samples for the whole scan, at that component's
/// own (possibly sub-sampled) resolution, padded up to a whole number of
/// MCUs.
#[derive(Clone)]
pub(crate) struct ComponentPlane {
    pub(crate) samples: Vec<u8>,
    pub(crate) width: usize,
    pub(crate) height: usize
}

fn unexpected_marker(reader: &ByteReader) -> DecodeErrors {
    DecodeErrors::InvalidBitstream {
        offset: reader.position(),
        reason: "marker encountered before the expected restart interval boundary".into()
    }
}

/// Decode one 8x8 block's zig-zag-ordered coefficients.
fn decode_block(
    reader: &mut ByteReader, bits: &mut BitReader, dc_table: &HuffmanTable, ac_table: &HuffmanTable,
    dc_pred: &mut i32, block: &mut [i16; 64]
) -> Result<(), DecodeErrors> {
    let dc_size = dc_table
        .decode(bits, reader)?
        .ok_or_else(|| unexpected_marker(reader))?;

    let diff = if dc_size == 0 {
        0
    } else {
        let raw = bits
            .receive(reader, dc_size)
            .ok_or_else(|| unexpected_marker(reader))? as i32;
        huff_extend(raw, i32::from(dc_size))
    };
    *dc_pred += diff;
    block[0] = *dc_pred as i16;

    let mut k = 1usize;
    while k < 64 {
        let rs = ac_table
            .decode(bits, reader)?
            .ok_or_else(|| unexpected_marker(reader))?;
        let run = rs >> 4;
        let size = rs & 0x0F;

        if size == 0 {
            if run == 15 {
                // ZRL: skip 16 zero coefficients
                k += 16;
                if k >= 64 {
                    return Err(DecodeErrors::InvalidBitstream {
                        offset: reader.position(),
                        reason: "ZRL run ran past the end of the block".into()
                    });
                }
                continue;
            }
            // end of block, remaining coefficients are already zero
            break;
        }

        k += run as usize;
        if k >= 64 {
            return Err(DecodeErrors::InvalidBitstream {
                offset: reader.position(),
                reason: "AC run length ran past the end of the block".into()
            });
        }

        let raw = bits
            .receive(reader, size)
            .ok_or_else(|| unexpected_marker(reader))? as i32;
        block[k] = huff_extend(raw, i32::from(size)) as i16;
        k += 1;
    }

    Ok(())
}

/// Write one IDCT'd 8x8 block into its position in a component's plane.
fn place_block(plane: &mut ComponentPlane, block_col: usize, block_row: usize, samples: &[i16; 64]) {
    let x0 = block_col * 8;
    let y0 = block_row * 8;
    for row in 0..8 {
        let dst_start = (y0 + row) * plane.width + x0;
        for col in 0..8 {
            plane.samples[dst_start + col] = samples[row * 8 + col] as u8;
        }
    }
}

/// Decode every MCU of an interleaved scan, resetting DC predictors at the
/// start and at each restart marker.
#[allow(clippy::too_many_arguments)]
pub(crate) fn decode_scan(
    reader: &mut ByteReader, components: &mut [Component],
    dc_tables: &[Option<HuffmanTable>; MAX_TABLES], ac_tables: &[Option<HuffmanTable>; MAX_TABLES],
    quant_tables: &[Option<[u16; 64]>; MAX_TABLES], mcus_per_line: usize, mcus_per_column: usize,
    restart_interval: usize
) -> Result<Vec<ComponentPlane>, DecodeErrors> {
    let mut bits = BitReader::new();

    let mut planes: Vec<ComponentPlane> = components
        .iter()
        .map(|c| {
            let width = mcus_per_line * c.blocks_per_mcu_width * 8;
            let height = mcus_per_column * c.blocks_per_mcu_height * 8;
            ComponentPlane {
                samples: vec![0u8; width * height],
                width,
                height
            }
        })
        .collect();

    for component in components.iter_mut() {
        component.dc_pred = 0;
    }

    let total_mcus = mcus_per_line * mcus_per_column;
    let mut expected_rst = 0u8;
    let mut mcus_since_restart = 0usize;

    for mcu_index in 0..total_mcus {
        let mcu_x = mcu_index % mcus_per_line;
        let mcu_y = mcu_index / mcus_per_line;

        for (ci, component) in components.iter_mut().enumerate() {
            let dc_table = dc_tables[component.dc_huff_table as usize]
                .as_ref()
                .ok_or_else(|| DecodeErrors::MissingTable {
                    offset: reader.position(),
                    kind: crate::errors::TableKind::DcHuffman,
                    id: component.dc_huff_table
                })?;
            let ac_table = ac_tables[component.ac_huff_table as usize]
                .as_ref()
                .ok_or_else(|| DecodeErrors::MissingTable {
                    offset: reader.position(),
                    kind: crate::errors::TableKind::AcHuffman,
                    id: component.ac_huff_table
                })?;
            let quant_table = quant_tables[component.quantization_table_number as usize]
                .as_ref()
                .ok_or_else(|| DecodeErrors::MissingTable {
                    offset: reader.position(),
                    kind: crate::errors::TableKind::Quantization,
                    id: component.quantization_table_number
                })?;

            for by in 0..component.blocks_per_mcu_height {
                for bx in 0..component.blocks_per_mcu_width {
                    let mut block = [0i16; 64];
                    decode_block(reader, &mut bits, dc_table, ac_table, &mut component.dc_pred, &mut block)?;
                    let samples = idct_block(&block, quant_table);

                    let block_col = mcu_x * component.blocks_per_mcu_width + bx;
                    let block_row = mcu_y * component.blocks_per_mcu_height + by;
                    place_block(&mut planes[ci], block_col, block_row, &samples);
                }
            }
        }

        mcus_since_restart += 1;
        let is_last_mcu = mcu_index + 1 == total_mcus;
        if restart_interval > 0 && mcus_since_restart == restart_interval && !is_last_mcu {
            bits.refill(reader);
            match bits.marker {
                Some(Marker::RST(n)) if n == expected_rst => {
                    bits.reset();
                    for component in components.iter_mut() {
                        component.dc_pred = 0;
                    }
                    expected_rst = (expected_rst + 1) % 8;
                    mcus_since_restart = 0;
                }
                other => {
                    let found = match other {
                        Some(Marker::RST(n)) => Some(n),
                        _ => None
                    };
                    return Err(DecodeErrors::RestartOutOfSync {
                        offset: reader.position(),
                        expected: expected_rst,
                        found
                    });
                }
            }
        }
    }

    Ok(planes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentID;

    fn trivial_dc_table() -> HuffmanTable {
        // single symbol 0x00 (category 0: DC diff is always 0), 1-bit code
        let mut counts = [0u8; 16];
        counts[0] = 1;
        HuffmanTable::build(&counts, vec![0x00], 0).unwrap()
    }

    fn trivial_ac_table() -> HuffmanTable {
        // single symbol 0x00 (EOB), 1-bit code
        let mut counts = [0u8; 16];
        counts[0] = 1;
        HuffmanTable::build(&counts, vec![0x00], 0).unwrap()
    }

    fn zrl_only_ac_table() -> HuffmanTable {
        // single symbol 0xF0 (ZRL), 1-bit code
        let mut counts = [0u8; 16];
        counts[0] = 1;
        HuffmanTable::build(&counts, vec![0xF0], 0).unwrap()
    }

    fn single_component() -> Component {
        Component {
            id: ComponentID::Y,
            horizontal_sample: 1,
            vertical_sample: 1,
            quantization_table_number: 0,
            dc_huff_table: 0,
            ac_huff_table: 0,
            dc_pred: 0,
            blocks_per_mcu_width: 1,
            blocks_per_mcu_height: 1
        }
    }

    #[test]
    fn single_all_zero_block_decodes_to_flat_gray() {
        let mut components = vec![single_component()];
        let mut dc_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
        let mut ac_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
        let mut quant_tables: [Option<[u16; 64]>; MAX_TABLES] = Default::default();
        dc_tables[0] = Some(trivial_dc_table());
        ac_tables[0] = Some(trivial_ac_table());
        quant_tables[0] = Some([16u16; 64]);

        // DC symbol (1 bit '0'), AC symbol EOB (1 bit '0'): byte 0x00
        let data = [0x00u8, 0x00, 0x00];
        let mut reader = ByteReader::new(&data);

        let planes = decode_scan(
            &mut reader,
            &mut components,
            &dc_tables,
            &ac_tables,
            &quant_tables,
            1,
            1,
            0
        )
        .unwrap();

        assert_eq!(planes.len(), 1);
        assert_eq!(planes[0].width, 8);
        assert_eq!(planes[0].height, 8);
        assert!(planes[0].samples.iter().all(|&v| v == 128));
    }

    #[test]
    fn restart_marker_resets_dc_predictor() {
        let mut components = vec![single_component()];
        let mut dc_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
        let mut ac_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
        let mut quant_tables: [Option<[u16; 64]>; MAX_TABLES] = Default::default();
        dc_tables[0] = Some(trivial_dc_table());
        ac_tables[0] = Some(trivial_ac_table());
        quant_tables[0] = Some([16u16; 64]);

        // MCU 1: DC=0,EOB (bits 00), byte-align, RST0 marker, MCU 2: DC=0,EOB
        let data = [0x00u8, 0xFF, 0xD0, 0x00];
        let mut reader = ByteReader::new(&data);

        let planes = decode_scan(
            &mut reader,
            &mut components,
            &dc_tables,
            &ac_tables,
            &quant_tables,
            2,
            1,
            1
        )
        .unwrap();

        assert_eq!(planes[0].width, 16);
        assert!(planes[0].samples.iter().all(|&v| v == 128));
    }

    #[test]
    fn mismatched_restart_index_is_an_error() {
        let mut components = vec![single_component()];
        let mut dc_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
        let mut ac_tables: [Option<HuffmanTable>; MAX_TABLES] = Default::default();
        let mut quant_tables: [Option<[u16; 64]>; MAX_TABLES] = Default::default();
        dc_tables[0] = Some(trivial_dc_table());
        ac_tables[0] = Some(trivial_ac_table());
        quant_tables[0] = Some([16u16; 64]);

        // Wrong restart index: RST1 instead of the expected RST0
        let data = [0x00u8, 0xFF, 0xD1, 0x00];
        let mut reader = ByteReader::new(&data);

        let result = decode_scan(
            &mut reader,
            &mut components,
            &dc_tables,
            &ac_tables,
            &quant_tables,
            2,
            1,
            1
        );
        assert!(matches!(result, Err(DecodeErrors::RestartOutOfSync { .. })));
    }

    #[test]
    fn zrl_run_overrunning_the_block_is_invalid_bitstream() {
        let dc_table = trivial_dc_table();
        let ac_table = zrl_only_ac_table();

        // DC symbol '0' (1 bit), then four ZRL symbols '0' (1 bit each): the
        // fourth pushes k from 49 to 65, past the last valid AC index.
        let data = [0b0_0_0_0_0_000u8, 0x00];
        let mut reader = ByteReader::new(&data);
        let mut bits = BitReader::new();
        let mut dc_pred = 0i32;
        let mut block = [0i16; 64];

        let result = decode_block(&mut reader, &mut bits, &dc_table, &ac_table, &mut dc_pred, &mut block);
        assert!(matches!(result, Err(DecodeErrors::InvalidBitstream { .. })));
    }
}
