//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs; each implements the business
//! logic for one subcommand and returns the process exit code.

mod checks;
mod rate;

pub use checks::run_checks;
pub use rate::{run_rate, OutputFormat, RateConfig, TargetMode};

/// Process exit codes.
pub mod exit_codes {
    /// Clean run, score at or above the minimum.
    pub const SUCCESS: i32 = 0;
    /// The rating came out below the requested minimum.
    pub const BELOW_MINIMUM: i32 = 2;
}
