#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the requires-python specifier-set parser.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = pyrind::version::parse_specifier_set(s);
    }
});
