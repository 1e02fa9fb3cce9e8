//! Shared CLI option types for `thirc`.

use thirc_backend::OptLevel;

/// Resolved options for a single compilation, independent of how `clap`
/// gathered them — mirrors the teacher pattern of keeping the option
/// bundle decoupled from the `Cli` struct `clap` derives.
pub struct ThircOptions {
    pub input: String,
    pub output: Option<String>,
    pub opt_level: OptLevel,
    pub print_thir: bool,
}
