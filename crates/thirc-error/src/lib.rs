//! # thirc-error
//!
//! Unified error handling and source locations for the `thirc` workspace.
//!
//! Every crate — lexer, parser, core, backend, CLI — returns `thirc_error::Result<T>`
//! and reports failures as a `thirc_error::Error`. Unlike a long-running service,
//! this compiler treats every error as fatal: the first one aborts the
//! compilation, so there is no retry/status machinery here, only what is
//! needed to print one readable diagnostic: an `ErrorKind`, a `SourceLocation`,
//! and a message.
//!
//! ```rust
//! use thirc_error::{Error, SourceLocation};
//!
//! fn example() -> thirc_error::Result<()> {
//!     Err(Error::unknown_name(SourceLocation::new("main.th", 4, 1), "foo"))
//! }
//! ```

mod error;
mod kind;
mod location;

pub use error::Error;
pub use kind::ErrorKind;
pub use location::SourceLocation;

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
