//! Canonical Huffman table construction and symbol decoding.
//!
//! Code assignment follows the algorithm in the JPEG standard (Annex C):
//! codes are handed out in symbol order, shortest code length first, each new
//! length shifting the running code left by one. Decoding follows Annex F's
//! `mincode`/`maxcode`/`valptr` scheme, with a small direct-lookup table in
//! front for the common case where a code is no longer than [`LOOKAHEAD`]
//! bits.
use crate::bitstream::{BitReader, ByteReader};
use crate::errors::DecodeErrors;

/// Codes this length or shorter are resolved with a single table lookup.
pub(crate) const LOOKAHEAD: u8 = 9;

/// A derived DC or AC Huffman table, built from the 16 code-length counts and
/// symbol list a DHT segment carries for one table slot.
pub(crate) struct HuffmanTable {
    /// `fast[b]` for the top `LOOKAHEAD` bits `b`: `(length << 8) | symbol`,
    /// or `-1` if no code of length `<= LOOKAHEAD` has that prefix.
    fast: Vec<i16>,
    mincode: [i32; 17],
    maxcode: [i32; 18],
    valptr: [i32; 17],
    values: Vec<u8>
}

impl HuffmanTable {
    /// Build a derived table from the 16 per-length symbol counts (`bits`,
    /// summing to `values.len()`) and the symbols themselves in canonical
    /// order, as stored by a DHT segment.
    pub(crate) fn build(bits: &[u8; 16], values: Vec<u8>, offset: usize) -> Result<HuffmanTable, DecodeErrors> {
        let total: usize = bits.iter().map(|&b| b as usize).sum();
        if total != values.len() || total > 256 {
            return Err(DecodeErrors::InvalidHuffmanTable {
                offset,
                reason: format!(
                    "code length counts sum to {total} but {} symbols were given",
                    values.len()
                )
            });
        }

        // HUFFSIZE (Annex C.2): length of the code assigned to each symbol,
        // in the same order as `values`.
        let mut huffsize = vec![0u8; total];
        let mut k = 0;
        for (len, &count) in bits.iter().enumerate() {
            for _ in 0..count {
                huffsize[k] = (len + 1) as u8;
                k += 1;
            }
        }

        // HUFFCODE (Annex C.2): canonical code for each symbol.
        let mut huffcode = vec![0u32; total];
        let mut code = 0u32;
        let mut size = huffsize.first().copied().unwrap_or(0);
        let mut k = 0;
        while k < total {
            while k < total && huffsize[k] == size {
                huffcode[k] = code;
                code += 1;
                k += 1;
            }
            code <<= 1;
            size += 1;
        }

        let mut mincode = [0i32; 17];
        let mut maxcode = [-1i32; 18];
        let mut valptr = [0i32; 17];
        let mut p = 0usize;
        for l in 1..=16usize {
            if bits[l - 1] == 0 {
                maxcode[l] = -1;
            } else {
                valptr[l] = p as i32;
                mincode[l] = huffcode[p] as i32;
                p += bits[l - 1] as usize;
                maxcode[l] = huffcode[p - 1] as i32;
            }
        }
        maxcode[17] = i32::MAX;

        let mut fast = vec![-1i16; 1 << LOOKAHEAD];
        for (i, &len) in huffsize.iter().enumerate() {
            if len <= LOOKAHEAD {
                let shift = LOOKAHEAD - len;
                let base = (huffcode[i] as usize) << shift;
                let packed = ((len as i16) << 8) | i16::from(values[i]);
                for fill in 0..(1usize << shift) {
                    fast[base + fill] = packed;
                }
            }
        }

        Ok(HuffmanTable {
            fast,
            mincode,
            maxcode,
            valptr,
            values
        })
    }

    /// Decode the next Huffman symbol (a DC/AC category byte) from the
    /// bitstream.
    ///
    /// Returns `Ok(None)` when a marker was hit before enough bits were
    /// available to resolve a code; the caller decides whether that marker
    /// was an expected restart or a genuine error.
    pub(crate) fn decode(
        &self, bits: &mut BitReader, reader: &mut ByteReader
    ) -> Result<Option<u8>, DecodeErrors> {
        if !bits.has_bits(LOOKAHEAD) && !bits.refill(reader) && !bits.has_bits(LOOKAHEAD) {
            return Ok(None);
        }

        let peeked = bits.peek_bits(LOOKAHEAD);
        let fast = self.fast[peeked as usize];
        if fast >= 0 {
            bits.drop_bits((fast >> 8) as u8);
            return Ok(Some((fast & 0xFF) as u8));
        }

        for len in (LOOKAHEAD + 1)..=16 {
            if !bits.has_bits(len) && !bits.refill(reader) && !bits.has_bits(len) {
                return Ok(None);
            }
            let code = bits.peek_bits(len) as i32;
            if code <= self.maxcode[len as usize] {
                let index = (code - self.mincode[len as usize] + self.valptr[len as usize]) as usize;
                let Some(&symbol) = self.values.get(index) else {
                    return Err(DecodeErrors::InvalidBitstream {
                        offset: reader.position(),
                        reason: "huffman value index out of range".into()
                    });
                };
                bits.drop_bits(len);
                return Ok(Some(symbol));
            }
        }

        Err(DecodeErrors::InvalidBitstream {
            offset: reader.position(),
            reason: "no huffman code matched the bitstream".into()
        })
    }
}
