#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the structural reStructuredText validator.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = pyrind::rst::validate(s);
    }
});
