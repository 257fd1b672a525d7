//! Exit codes for the `benchdiff` binary.
//! These codes are part of the public contract: CI scripts branch on them.

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG_ERROR: i32 = 2; // Bad flags, thresholds, filter, config file or input JSON
pub const EXIT_GATE_FAILED: i32 = 4; // --ci and at least one regression rule breached
