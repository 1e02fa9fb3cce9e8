//! The single `Error` type every crate in the workspace returns.

use std::fmt;

use crate::{ErrorKind, SourceLocation};

/// A fatal compilation error.
///
/// Every error in this compiler is fatal: there is no recovery, no retry,
/// and no partial success, so unlike a long-running service's error type
/// this one carries no status/retryability machinery, only what is needed
/// to print one readable diagnostic line: a kind, a location, a message,
/// and optional key/value context for callers that want more detail.
pub struct Error {
    kind: ErrorKind,
    location: SourceLocation,
    message: String,
    context: Vec<(&'static str, String)>,
}

impl Error {
    pub fn new(kind: ErrorKind, location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    pub fn unknown_name(location: SourceLocation, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::UnknownName,
            location,
            format!("unknown name '{}'", name),
        )
        .with_context("name", name)
    }

    pub fn unknown_member(
        location: SourceLocation,
        type_name: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        let type_name = type_name.into();
        let member = member.into();
        Self::new(
            ErrorKind::UnknownMember,
            location,
            format!("type '{}' has no member '{}'", type_name, member),
        )
        .with_context("type", type_name)
        .with_context("member", member)
    }

    pub fn redeclaration(location: SourceLocation, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::Redeclaration,
            location,
            format!("'{}' is already declared in this scope", name),
        )
        .with_context("name", name)
    }

    pub fn type_mismatch(
        location: SourceLocation,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        let expected = expected.into();
        let found = found.into();
        Self::new(
            ErrorKind::TypeMismatch,
            location,
            format!("expected type '{}', found '{}'", expected, found),
        )
        .with_context("expected", expected)
        .with_context("found", found)
    }

    pub fn wrong_arity(location: SourceLocation, expected: usize, found: usize) -> Self {
        Self::new(
            ErrorKind::WrongArity,
            location,
            format!("expected {} argument(s), found {}", expected, found),
        )
        .with_context("expected", expected.to_string())
        .with_context("found", found.to_string())
    }

    pub fn not_callable(location: SourceLocation, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::NotCallable,
            location,
            format!("'{}' is not callable", name),
        )
        .with_context("name", name)
    }

    pub fn not_assignable(location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::NotAssignable,
            location,
            "left-hand side of assignment is not an lvalue",
        )
    }

    pub fn cyclic_dependency(location: SourceLocation, name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::CyclicDependency,
            location,
            format!("cyclic dependency detected while lowering '{}'", name),
        )
        .with_context("name", name)
    }

    pub fn entry_point_missing() -> Self {
        Self::new(
            ErrorKind::EntryPointMissing,
            SourceLocation::synthetic(),
            "no function is marked @entry",
        )
    }

    pub fn syntax_error(location: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, location, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.location, self.message, self.kind)?;
        if !self.context.is_empty() {
            write!(f, " {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new("main.th", 3, 5)
    }

    #[test]
    fn display_includes_location_and_kind() {
        let err = Error::unknown_name(loc(), "frobnicate");
        let rendered = err.to_string();
        assert!(rendered.contains("main.th:3:5"));
        assert!(rendered.contains("UnknownName"));
        assert!(rendered.contains("frobnicate"));
    }

    #[test]
    fn wrong_arity_carries_both_counts() {
        let err = Error::wrong_arity(loc(), 2, 0);
        assert_eq!(err.kind(), ErrorKind::WrongArity);
        assert!(err.message().contains('2'));
        assert!(err.message().contains('0'));
    }
}
