//! Synthetic baseline JPEG construction shared by the integration tests.
//!
//! Every table and scan built here is intentionally trivial: one
//! quantization table of all ones, one DC Huffman table and one AC Huffman
//! table each holding a single 1-bit symbol (`0x00`, meaning "category 0" /
//! "end of block"). That makes every block in the scan decode to DC=0 with
//! no AC coefficients, which after level-shifting is a flat 128 -- enough
//! to exercise header parsing, MCU geometry, upsampling and restart
//! handling without hand-assembling real entropy-coded data.
#![allow(dead_code)]

/// Build a minimal baseline JPEG with the given dimensions, one
/// `(horizontal_sample, vertical_sample)` pair per component, and restart
/// interval (`0` disables restart markers).
pub fn build_jpeg(width: u16, height: u16, components: &[(u8, u8)], restart_interval: u16) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];

    // DQT: table 0, all ones.
    bytes.extend_from_slice(&[0xFF, 0xDB]);
    bytes.extend_from_slice(&(2u16 + 1 + 64).to_be_bytes());
    bytes.push(0x00);
    bytes.extend(std::iter::repeat(1u8).take(64));

    let mut counts = [0u8; 16];
    counts[0] = 1;

    // DHT: DC table 0, single symbol 0x00.
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(2u16 + 1 + 16 + 1).to_be_bytes());
    bytes.push(0x00);
    bytes.extend_from_slice(&counts);
    bytes.push(0x00);

    // DHT: AC table 0, single symbol 0x00 (EOB).
    bytes.extend_from_slice(&[0xFF, 0xC4]);
    bytes.extend_from_slice(&(2u16 + 1 + 16 + 1).to_be_bytes());
    bytes.push(0x10);
    bytes.extend_from_slice(&counts);
    bytes.push(0x00);

    if restart_interval > 0 {
        bytes.extend_from_slice(&[0xFF, 0xDD]);
        bytes.extend_from_slice(&4u16.to_be_bytes());
        bytes.extend_from_slice(&restart_interval.to_be_bytes());
    }

    let nf = components.len() as u8;
    bytes.extend_from_slice(&[0xFF, 0xC0]);
    bytes.extend_from_slice(&(8u16 + 3 * u16::from(nf)).to_be_bytes());
    bytes.push(8); // precision
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.push(nf);
    for (i, &(h, v)) in components.iter().enumerate() {
        bytes.push((i + 1) as u8); // Ci
        bytes.push((h << 4) | v); // HiVi
        bytes.push(0); // Tqi
    }

    bytes.extend_from_slice(&[0xFF, 0xDA]);
    bytes.extend_from_slice(&(6u16 + 2 * u16::from(nf)).to_be_bytes());
    bytes.push(nf);
    for i in 0..nf {
        bytes.push(i + 1); // Cs
        bytes.push(0x00); // Td|Ta
    }
    bytes.extend_from_slice(&[0, 63, 0]); // Ss, Se, Ah|Al

    let h_max = components.iter().map(|&(h, _)| h).max().unwrap_or(1);
    let v_max = components.iter().map(|&(_, v)| v).max().unwrap_or(1);
    let mcu_w = 8 * u32::from(h_max);
    let mcu_h = 8 * u32::from(v_max);
    let mcus_per_line = (u32::from(width) + mcu_w - 1) / mcu_w;
    let mcus_per_column = (u32::from(height) + mcu_h - 1) / mcu_h;
    let total_mcus = mcus_per_line * mcus_per_column;
    let blocks_per_mcu: u32 = components.iter().map(|&(h, v)| u32::from(h) * u32::from(v)).sum();

    let mut rst_index = 0u8;
    for mcu in 0..total_mcus {
        for _ in 0..blocks_per_mcu {
            // One zero byte per block: far more zero bits than the 2 this
            // trivial scan needs per block, which is harmless since the
            // next block's symbols simply continue reading from wherever
            // the bit cursor landed.
            bytes.push(0x00);
        }
        let is_last = mcu + 1 == total_mcus;
        if restart_interval > 0 && (mcu + 1) % u32::from(restart_interval) == 0 && !is_last {
            bytes.extend_from_slice(&[0xFF, 0xD0 + rst_index]);
            rst_index = (rst_index + 1) % 8;
        }
    }

    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

/// A 1x1 single-component (grayscale) image, one MCU, no subsampling.
pub fn minimal_grayscale() -> Vec<u8> {
    build_jpeg(1, 1, &[(1, 1)], 0)
}

/// An 8x8 4:4:4 colour image: one MCU, every component sampled 1x1.
pub fn color_444_single_mcu() -> Vec<u8> {
    build_jpeg(8, 8, &[(1, 1), (1, 1), (1, 1)], 0)
}

/// A 16x16 4:2:0 colour image: one MCU, Y sampled 2x2, chroma 1x1.
pub fn color_420_single_mcu() -> Vec<u8> {
    build_jpeg(16, 16, &[(2, 2), (1, 1), (1, 1)], 0)
}
