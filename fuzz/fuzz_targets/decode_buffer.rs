#![no_main]
use baseline_jpeg::Decoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut d = Decoder::new();

    let _ = d.decode_buffer(data);
});
