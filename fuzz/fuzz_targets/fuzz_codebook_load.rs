#![no_main]

use contvoc_excitation::ResidualCodebook;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary bytes must never panic; a parsed codebook must re-encode
    // to the bytes it was read from (minus any trailing garbage).
    if let Ok(codebook) = ResidualCodebook::from_bytes(data) {
        let encoded = codebook.to_bytes();
        assert_eq!(&data[..encoded.len()], &encoded[..]);
    }
});
