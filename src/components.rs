//! Per-component state, as declared by a frame's SOF segment.
use crate::errors::DecodeErrors;
use crate::misc::MAX_TABLES;

/// Which colour channel a [`Component`] carries.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ComponentID {
    Y,
    Cb,
    Cr
}

impl ComponentID {
    pub(crate) fn from_u8(id: u8) -> Option<ComponentID> {
        match id {
            1 => Some(ComponentID::Y),
            2 => Some(ComponentID::Cb),
            3 => Some(ComponentID::Cr),
            _ => None
        }
    }
}

/// One component's metadata, as read from a 3-byte SOF component record
/// (`Ci`, `HiVi`, `Tqi`), plus the per-scan state the entropy decoder mutates.
#[derive(Clone)]
pub(crate) struct Component {
    pub(crate) id: ComponentID,
    /// Horizontal sampling factor, 1..=4.
    pub(crate) horizontal_sample: u8,
    /// Vertical sampling factor, 1..=4.
    pub(crate) vertical_sample: u8,
    /// Quantization table slot (Tqi) this component dequantizes against.
    pub(crate) quantization_table_number: u8,
    /// DC Huffman table slot, set when the SOS header is parsed.
    pub(crate) dc_huff_table: u8,
    /// AC Huffman table slot, set when the SOS header is parsed.
    pub(crate) ac_huff_table: u8,
    /// Running DC predictor for this component; reset to 0 at SOS and at
    /// every restart marker.
    pub(crate) dc_pred: i32,
    /// 8x8 blocks per MCU row, accounting for this component's sampling
    /// factor relative to the frame's maximum.
    pub(crate) blocks_per_mcu_width: usize,
    pub(crate) blocks_per_mcu_height: usize
}

impl Component {
    /// Parse a single SOF component record. `offset` is only used to tag
    /// errors.
    pub(crate) fn parse(bytes: [u8; 3], offset: usize) -> Result<Component, DecodeErrors> {
        let id = ComponentID::from_u8(bytes[0]).ok_or_else(|| DecodeErrors::UnsupportedMode {
            offset,
            reason: format!(
                "component id {} is not one of the supported Y/Cb/Cr ids 1/2/3",
                bytes[0]
            )
        })?;

        let horizontal_sample = bytes[1] >> 4;
        let vertical_sample = bytes[1] & 0x0F;
        let quantization_table_number = bytes[2];

        if horizontal_sample == 0 || vertical_sample == 0 {
            return Err(DecodeErrors::UnsupportedMode {
                offset,
                reason: "component sampling factor of 0 is not valid".into()
            });
        }
        if !horizontal_sample.is_power_of_two() || !vertical_sample.is_power_of_two() {
            return Err(DecodeErrors::UnsupportedMode {
                offset,
                reason: format!(
                    "sampling factors must be powers of two, got {horizontal_sample}x{vertical_sample}"
                )
            });
        }
        if usize::from(quantization_table_number) >= MAX_TABLES {
            return Err(DecodeErrors::MissingTable {
                offset,
                kind: crate::errors::TableKind::Quantization,
                id: quantization_table_number
            });
        }

        debug!(
            "component {:?}: {}x{} sampling, quant table {}",
            id, horizontal_sample, vertical_sample, quantization_table_number
        );

        Ok(Component {
            id,
            horizontal_sample,
            vertical_sample,
            quantization_table_number,
            dc_huff_table: 0,
            ac_huff_table: 0,
            dc_pred: 0,
            blocks_per_mcu_width: usize::from(horizontal_sample),
            blocks_per_mcu_height: usize::from(vertical_sample)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_luma_component() {
        let c = Component::parse([1, 0x22, 0], 0).unwrap();
        assert_eq!(c.id, ComponentID::Y);
        assert_eq!(c.horizontal_sample, 2);
        assert_eq!(c.vertical_sample, 2);
    }

    #[test]
    fn rejects_non_power_of_two_sampling() {
        assert!(Component::parse([1, 0x31, 0], 0).is_err());
    }

    #[test]
    fn rejects_unknown_component_id() {
        assert!(Component::parse([7, 0x11, 0], 0).is_err());
    }
}
