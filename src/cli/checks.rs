//! The `checks` command handler: list the registered check names.

use crate::checks::CheckRegistry;
use anyhow::Result;

/// Print every check name in registration order.
pub fn run_checks() -> Result<i32> {
    for name in CheckRegistry::standard().check_names() {
        println!("{name}");
    }
    Ok(super::exit_codes::SUCCESS)
}
