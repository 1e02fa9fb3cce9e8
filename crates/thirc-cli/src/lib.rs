//! `thirc` command-line driver.
//!
//! Wires the lexer/parser (`thirc-syntax`), the dependency-driven typed
//! lowering pipeline (`thirc-core`), and the textual IR backend
//! (`thirc-backend`) into the single-file-in, diagnostic-or-IR-out contract
//! described by the CLI section of the design: one positional source path,
//! an exit status of 0 on success and 1 on any compilation error.

pub mod options;
pub mod pipeline;

pub use options::ThircOptions;
pub use pipeline::compile;
