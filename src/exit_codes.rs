//! Exit code constants for the simfleet CLI.
//!
//! - 0: every project in the selected workflow succeeded
//! - 1: at least one project failed, or a usage/configuration error

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// At least one project failed, or the tool could not start.
pub const FAILURE: i32 = 1;
