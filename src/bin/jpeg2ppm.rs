//! Thin CLI driver: reads a JPEG file, decodes it, writes a PPM file.
//!
//! Contains no decoding logic of its own; it only wires argument parsing,
//! file I/O and logger initialization around the library's `decode` and
//! `write_ppm` functions.
use std::path::PathBuf;
use std::process::ExitCode;

use baseline_jpeg::{decode, write_ppm};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Decode a baseline JPEG file into a PPM (P6) file", long_about = None)]
struct Args {
    /// Path to the input JFIF/JPEG file.
    input: PathBuf,
    /// Path to write the output PPM (P6) file to.
    output: PathBuf
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let bytes = match std::fs::read(&args.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("error reading {}: {err}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let image = match decode(&bytes) {
        Ok(image) => image,
        Err(err) => {
            eprintln!("error decoding {}: {err}", args.input.display());
            return ExitCode::FAILURE;
        }
    };

    let ppm = write_ppm(&image);
    if let Err(err) = std::fs::write(&args.output, ppm) {
        eprintln!("error writing {}: {err}", args.output.display());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
