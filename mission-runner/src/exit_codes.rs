//! Stable exit codes for the mission runner.

/// Mission completed (with the primary or the fallback model).
pub const OK: i32 = 0;
/// Setup/auth failed or the agent failed on every configured model.
pub const FAILED: i32 = 1;
/// Invalid invocation: bad flags, no mission or both mission and template,
/// missing template file. Matches clap's usage-error code.
pub const INVALID: i32 = 2;
