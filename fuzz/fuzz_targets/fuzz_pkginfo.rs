#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the core-metadata (PKG-INFO / METADATA) parser.
///
/// Exercises header splitting, continuation folding, and the
/// placeholder-elision paths with arbitrary input.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = pyrind::extract::pkginfo::parse(s);
    }
});
