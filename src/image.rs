//! Public data types describing a decoded image.
//!
//! [`Decoder`](crate::decoder::Decoder) is the thing that produces these;
//! this module only holds the shapes.
use crate::misc::ColorSpace;
use crate::misc::SOFMarkers;

/// Header-derived metadata about an image, available via
/// [`Decoder::info`](crate::decoder::Decoder::info) once headers have been
/// parsed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ImageInfo {
    /// Width in pixels, from SOF0's `X`.
    pub width: u16,
    /// Height in pixels, from SOF0's `Y`.
    pub height: u16,
    /// Number of components (1 or 3), from SOF0's `Nf`.
    pub components: u8,
    /// Which SOF variant the frame declared. Always `BaselineDct` for a
    /// frame this decoder accepted.
    pub sof: SOFMarkers,
    /// Horizontal pixel density from the JFIF APP0 segment, if present.
    pub x_density: u16,
    /// Vertical pixel density from the JFIF APP0 segment, if present.
    pub y_density: u16
}

/// A fully decoded raster: dimensions, colour space, and samples.
///
/// `data` holds `width * height * colorspace.num_components()` bytes in
/// row-major order; for [`ColorSpace::Rgb`] each pixel is three
/// consecutive `R, G, B` bytes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Image {
    pub(crate) info: ImageInfo,
    pub(crate) colorspace: ColorSpace,
    pub(crate) data: Vec<u8>
}

impl Image {
    pub(crate) fn new(info: ImageInfo, colorspace: ColorSpace, data: Vec<u8>) -> Image {
        Image {
            info,
            colorspace,
            data
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.info.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.info.height
    }

    /// The colour space `data` is encoded in.
    #[must_use]
    pub fn colorspace(&self) -> ColorSpace {
        self.colorspace
    }

    /// The header metadata this image was decoded from.
    #[must_use]
    pub fn info(&self) -> ImageInfo {
        self.info.clone()
    }

    /// The raw sample data, row-major, `colorspace.num_components()` bytes
    /// per pixel.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image, returning its sample data.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
