#![no_main]
use libfuzzer_sys::fuzz_target;
use std::path::Path;

/// Fuzz the pyproject.toml project-table collector.
///
/// The directory is nonexistent so readme references fail cleanly; the
/// target exercises the TOML walking and field mapping.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = pyrind::extract::project::parse_pyproject(s, Path::new("/nonexistent"));
    }
});
