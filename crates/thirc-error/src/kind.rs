//! The closed taxonomy of errors the compiler can produce.

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Deliberately a closed sum, not `#[non_exhaustive]`: every stage of the
/// pipeline is fatal-on-first-error (see `Error`), so there is no reason for
/// a caller to match on a kind the compiler does not actually produce, and a
/// closed enum lets `match` catch a forgotten variant at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
pub enum ErrorKind {
    /// Identifier, call target, or type name not found in any enclosing scope.
    UnknownName,
    /// Member access where the struct has no field of that name.
    UnknownMember,
    /// A name already exists in the same scope.
    Redeclaration,
    /// Declared type and value/operand/argument type disagree.
    TypeMismatch,
    /// Non-variadic call whose argument count differs from the signature.
    WrongArity,
    /// Call target's resolved type is not a function.
    NotCallable,
    /// Assignment left operand is not an lvalue form.
    NotAssignable,
    /// `lower` re-entered a dependency node already in `Resolving` state.
    CyclicDependency,
    /// No function in the program is marked `@entry`.
    EntryPointMissing,
    /// Malformed token stream or grammar violation (lexer/parser).
    SyntaxError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_variant_name() {
        assert_eq!(ErrorKind::UnknownName.to_string(), "UnknownName");
        assert_eq!(ErrorKind::CyclicDependency.to_string(), "CyclicDependency");
    }
}
