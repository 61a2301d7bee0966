//! Process exit codes

/// Successful termination, including help output
pub const OK: i32 = 0;

/// Any parse, dispatch or output failure
pub const FAILURE: i32 = 1;
