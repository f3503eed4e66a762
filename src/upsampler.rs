//! Chroma upsampling.
//!
//! Subsampled components (4:2:0, 4:2:2, 4:1:1, ...) are decoded at a fraction
//! of the luma resolution; before colour conversion every component must be
//! brought up to the frame's full pixel grid. This uses nearest-neighbour
//! (sample replication): each output pixel copies the input sample its
//! position maps to, with no interpolation between neighbours.
use crate::mcu::ComponentPlane;

/// Upsample (or pass through, when `h_scale == v_scale == 1`) one component's
/// plane to `target_width x target_height` using nearest-neighbour
/// replication.
pub(crate) fn upsample_nearest(
    plane: &ComponentPlane, h_scale: usize, v_scale: usize, target_width: usize, target_height: usize
) -> Vec<u8> {
    if h_scale == 1 && v_scale == 1 && plane.width == target_width && plane.height == target_height {
        return plane.samples.clone();
    }

    let mut out = vec![0u8; target_width * target_height];
    for y in 0..target_height {
        let src_y = (y / v_scale).min(plane.height - 1);
        let src_row = src_y * plane.width;
        let dst_row = y * target_width;
        for x in 0..target_width {
            let src_x = (x / h_scale).min(plane.width - 1);
            out[dst_row + x] = plane.samples[src_row + src_x];
        }
    }
    out
}
