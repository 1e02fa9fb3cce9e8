//! Source locations shared by every crate in the workspace.
//!
//! Tokens, AST nodes, THIR nodes, and `Error` values all carry a
//! `SourceLocation` so diagnostics can point at a concrete file/line/column
//! no matter which stage of the pipeline produced them.

use std::fmt;
use std::rc::Rc;

/// A file/line/column triple.
///
/// `line` and `column` are both 1-based, matching how editors and compilers
/// conventionally report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<Rc<str>>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// A location used where no real one is available (e.g. a synthesized
    /// primitive type). Never produced by the lexer or parser.
    pub fn synthetic() -> Self {
        Self::new("<builtin>", 0, 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
