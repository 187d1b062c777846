#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut out = vec![0u8; data.len().saturating_mul(4).max(64)];
    let outcome = unlzma2::xz::decode(data, &mut out);

    assert!(outcome.consumed_in <= data.len());
    assert!(outcome.produced_out <= out.len());
});
