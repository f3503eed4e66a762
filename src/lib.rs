//! A decoder for baseline (SOF0) JFIF/JPEG images, plus a PPM (P6) encoder
//! for the resulting raster.
//!
//! Progressive, arithmetic-coded, hierarchical and lossless JPEG are
//! detected and rejected with [`errors::DecodeErrors::UnsupportedMode`],
//! not implemented.
//!
//! ```no_run
//! let bytes = std::fs::read("input.jpg").unwrap();
//! let image = baseline_jpeg::decode(&bytes).unwrap();
//! let ppm = baseline_jpeg::write_ppm(&image);
//! std::fs::write("output.ppm", ppm).unwrap();
//! ```
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::inline_always,
    clippy::similar_names
)]
#![warn(
    clippy::correctness,
    clippy::perf,
    clippy::pedantic,
    clippy::inline_always
)]
#[macro_use]
extern crate log;

pub use crate::decoder::{decode, Decoder};
pub use crate::errors::DecodeErrors;
pub use crate::image::{Image, ImageInfo};
pub use crate::misc::ColorSpace;
pub use crate::options::DecoderOptions;
pub use crate::ppm::{parse_ppm, write_ppm, PpmError};

pub mod bitstream;
mod color_convert;
mod components;
mod decoder;
pub mod errors;
mod headers;
mod huffman;
mod idct;
pub mod image;
mod marker;
mod mcu;
mod misc;
mod options;
pub mod ppm;
mod upsampler;
mod worker;
