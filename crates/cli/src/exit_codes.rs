//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, missing input flag)       |
//! | 3    | Missing items found and `--fail-on-missing` is set   |
//! | 4    | Invalid config (TOML parse, validation, grammar)     |
//! | 5    | Input could not be read or parsed                    |
//! | 6    | Report could not be written                          |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Registered items are unaccounted for (only with `--fail-on-missing`).
pub const EXIT_MISSING: u8 = 3;

/// Config could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Registry, scanner list or on-hand file could not be read.
pub const EXIT_INPUT: u8 = 5;

/// A report file could not be written.
pub const EXIT_OUTPUT: u8 = 6;

/// Exit code for an adapter error, given which side of the run it came from.
pub fn io_exit_code(err: &stocktake_io::IoError) -> u8 {
    match err {
        stocktake_io::IoError::Write { .. } => EXIT_OUTPUT,
        stocktake_io::IoError::Read { .. }
        | stocktake_io::IoError::Parse { .. }
        | stocktake_io::IoError::UnsupportedFormat { .. } => EXIT_INPUT,
    }
}
