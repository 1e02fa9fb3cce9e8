//! # thirc-backend
//!
//! Consumes a fully lowered THIR `Program` and renders it as a readable
//! SSA-like text dump. This is a stand-in: it does not emit real machine or
//! LLVM IR, but it satisfies the same consumption contract a real backend
//! would (traverse `Program.statements` in order, query the type table for
//! every type it renders, and follow `Identifier`/`Call` back-references,
//! which the generator in `thirc-core` guarantees are never dangling).

pub mod text;

use thirc_core::{ThirNode, TypeTable};
use thirc_error::Result;

pub use text::{OptLevel, TextIrBackend};

/// A consumer of a lowered `Program`.
///
/// Every implementation can assume the THIR it receives is well-formed:
/// every `Identifier::resolved` and `Call::callee` points at an already
/// lowered declaration, and every `TypeId` it sees was handed out by
/// `types`. A backend that panics on a well-formed `Program` has a bug.
pub trait Backend {
    fn emit(&self, program: &ThirNode<'_>, types: &TypeTable) -> Result<String>;
}
