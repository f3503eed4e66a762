//! Assembles the final image: upsamples every component to the frame's full
//! resolution, colour-converts, and crops away the MCU padding.
use crate::color_convert::ycbcr_to_rgb_pixel;
use crate::components::Component;
use crate::mcu::ComponentPlane;
use crate::misc::ColorSpace;
use crate::upsampler::upsample_nearest;

/// Upsample every component to the frame's maximum sampling factor, colour
/// convert if needed, and crop MCU padding back down to `width x height`.
pub(crate) fn assemble_image(
    planes: &[ComponentPlane], components: &[Component], colorspace: ColorSpace, width: usize, height: usize
) -> Vec<u8> {
    let h_max = components.iter().map(|c| c.horizontal_sample).max().unwrap_or(1);
    let v_max = components.iter().map(|c| c.vertical_sample).max().unwrap_or(1);

    let full_planes: Vec<Vec<u8>> = components
        .iter()
        .zip(planes.iter())
        .map(|(component, plane)| {
            let h_scale = usize::from(h_max / component.horizontal_sample);
            let v_scale = usize::from(v_max / component.vertical_sample);
            upsample_nearest(plane, h_scale, v_scale, plane.width * h_scale, plane.height * v_scale)
        })
        .collect();

    // Every upsampled plane now shares the same padded dimensions; use the
    // first component's to index into all of them.
    let padded_width = planes[0].width * usize::from(h_max / components[0].horizontal_sample);

    match colorspace {
        ColorSpace::Luma => {
            let mut out = vec![0u8; width * height];
            for y in 0..height {
                let src_start = y * padded_width;
                let dst_start = y * width;
                out[dst_start..dst_start + width].copy_from_slice(&full_planes[0][src_start..src_start + width]);
            }
            out
        }
        ColorSpace::Rgb => {
            let mut out = Vec::with_capacity(width * height * 3);
            for y in 0..height {
                let row = y * padded_width;
                for x in 0..width {
                    let idx = row + x;
                    let pixel = ycbcr_to_rgb_pixel(full_planes[0][idx], full_planes[1][idx], full_planes[2][idx]);
                    out.extend_from_slice(&pixel);
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentID;

    fn luma_component(h: u8, v: u8) -> Component {
        Component {
            id: ComponentID::Y,
            horizontal_sample: h,
            vertical_sample: v,
            quantization_table_number: 0,
            dc_huff_table: 0,
            ac_huff_table: 0,
            dc_pred: 0,
            blocks_per_mcu_width: usize::from(h),
            blocks_per_mcu_height: usize::from(v)
        }
    }

    #[test]
    fn grayscale_crops_mcu_padding() {
        // a 2x2 luma-only plane padded from a 1x1 logical image
        let planes = vec![ComponentPlane {
            samples: vec![10, 20, 30, 40],
            width: 2,
            height: 2
        }];
        let components = vec![{
            let mut c = luma_component(1, 1);
            c.id = ComponentID::Y;
            c
        }];
        let out = assemble_image(&planes, &components, ColorSpace::Luma, 1, 1);
        assert_eq!(out, vec![10]);
    }

    #[test]
    fn color_convert_upsamples_subsampled_chroma() {
        let y_plane = ComponentPlane {
            samples: vec![128; 4],
            width: 2,
            height: 2
        };
        let chroma_plane = ComponentPlane {
            samples: vec![128],
            width: 1,
            height: 1
        };
        let planes = vec![y_plane, chroma_plane.clone(), chroma_plane];
        let mut components = vec![luma_component(2, 2)];
        components.push({
            let mut c = luma_component(1, 1);
            c.id = ComponentID::Cb;
            c
        });
        components.push({
            let mut c = luma_component(1, 1);
            c.id = ComponentID::Cr;
            c
        });

        let out = assemble_image(&planes, &components, ColorSpace::Rgb, 2, 2);
        assert_eq!(out, vec![128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128]);
    }
}
