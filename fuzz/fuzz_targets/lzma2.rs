#![no_main]

use libfuzzer_sys::fuzz_target;

// spec.md §8: fuzzing random byte sequences must never panic, never read
// past `data`, never write past the output buffer, and never report `Ok`
// without having consumed the trailing `0x00` end marker.
fuzz_target!(|data: &[u8]| {
    let mut out = vec![0u8; data.len().saturating_mul(4).max(64)];
    let outcome = unlzma2::decode(data, &mut out);

    assert!(outcome.consumed_in <= data.len());
    assert!(outcome.produced_out <= out.len());
    if outcome.status == unlzma2::Status::Ok {
        assert!(outcome.consumed_in >= 1);
        assert_eq!(data[outcome.consumed_in - 1], 0x00);
    }
});
