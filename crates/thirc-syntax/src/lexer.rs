//! Hand-written scanner over UTF-8 source bytes.
//!
//! Whitespace and both comment forms (`// ...` to end of line, `/* ... */`)
//! are elided. Block comments do not nest — the first `*/` encountered
//! closes the comment regardless of how many `/*` preceded it — and an
//! unterminated block comment is a `SyntaxError`. Line/column tracking is
//! updated on every byte consumed, including inside multi-line block
//! comments and string literals, so a diagnostic anywhere downstream still
//! points at the right place.

use std::rc::Rc;

use thirc_error::{Error, Result, SourceLocation};

use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    file: Rc<str>,
    src: &'src [u8],
    pos: usize,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(file: impl Into<Rc<str>>, src: &'src str) -> Self {
        Self {
            file: file.into(),
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scan the entire source into a token vector, terminated by `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let loc = self.here();
            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, "", loc));
                break;
            };

            let token = if c == b'"' {
                self.scan_string(loc)?
            } else if c.is_ascii_digit() {
                self.scan_number(loc)
            } else if is_ident_start(c) {
                self.scan_ident_or_keyword(loc)
            } else {
                self.scan_punct(loc)?
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn here(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.line, self.column)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some() && self.peek() != Some(b'\n') {
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(Error::syntax_error(
                                    start,
                                    "unterminated block comment",
                                ));
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_string(&mut self, loc: SourceLocation) -> Result<Token> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(Error::syntax_error(loc, "unterminated string literal")),
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(b'n') => value.push('\n'),
                    Some(b't') => value.push('\t'),
                    Some(b'"') => value.push('"'),
                    Some(b'\\') => value.push('\\'),
                    Some(other) => value.push(other as char),
                    None => return Err(Error::syntax_error(loc, "unterminated string literal")),
                },
                Some(c) => value.push(c as char),
            }
        }
        let lexeme = format!("\"{}\"", value);
        Ok(Token::new(TokenKind::String(value), lexeme, loc))
    }

    fn scan_number(&mut self, loc: SourceLocation) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let lexeme = std::str::from_utf8(&self.src[start..self.pos])
            .unwrap()
            .to_string();
        let value: i32 = lexeme.parse().unwrap_or(0);
        Token::new(TokenKind::Number(value), lexeme, loc)
    }

    fn scan_ident_or_keyword(&mut self, loc: SourceLocation) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        let lexeme = std::str::from_utf8(&self.src[start..self.pos])
            .unwrap()
            .to_string();
        let kind = match lexeme.as_str() {
            "fn" => TokenKind::KwFn,
            "type" => TokenKind::KwType,
            "return" => TokenKind::KwReturn,
            _ => TokenKind::Identifier,
        };
        Token::new(kind, lexeme, loc)
    }

    fn scan_punct(&mut self, loc: SourceLocation) -> Result<Token> {
        let c = self.advance().unwrap();
        let (kind, lexeme) = match c {
            b'(' => (TokenKind::LParen, "(".to_string()),
            b')' => (TokenKind::RParen, ")".to_string()),
            b'{' => (TokenKind::LBrace, "{".to_string()),
            b'}' => (TokenKind::RBrace, "}".to_string()),
            b',' => (TokenKind::Comma, ",".to_string()),
            b';' => (TokenKind::Semicolon, ";".to_string()),
            b'+' => (TokenKind::Plus, "+".to_string()),
            b'-' => (TokenKind::Minus, "-".to_string()),
            b'*' => (TokenKind::Star, "*".to_string()),
            b'/' => (TokenKind::Slash, "/".to_string()),
            b'.' => {
                if self.peek() == Some(b'.') && self.peek_at(1) == Some(b'.') {
                    self.advance();
                    self.advance();
                    (TokenKind::Ellipsis, "...".to_string())
                } else {
                    (TokenKind::Dot, ".".to_string())
                }
            }
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    (TokenKind::EqEq, "==".to_string())
                } else {
                    (TokenKind::Eq, "=".to_string())
                }
            }
            b'@' => {
                let start = self.pos;
                while self.peek().is_some_and(is_ident_continue) {
                    self.advance();
                }
                let name = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
                match name {
                    "extern" => (TokenKind::AtExtern, "@extern".to_string()),
                    "entry" => (TokenKind::AtEntry, "@entry".to_string()),
                    other => {
                        return Err(Error::syntax_error(
                            loc,
                            format!("unknown annotation '@{}'", other),
                        ));
                    }
                }
            }
            other => {
                return Err(Error::syntax_error(
                    loc,
                    format!("unexpected character '{}'", other as char),
                ));
            }
        };
        Ok(Token::new(kind, lexeme, loc))
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new("test.th", src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn elides_whitespace_and_line_comments() {
        let kinds = kinds("fn // comment\n  type");
        assert_eq!(kinds, vec![TokenKind::KwFn, TokenKind::KwType, TokenKind::Eof]);
    }

    #[test]
    fn elides_block_comments_and_tracks_lines() {
        let src = "fn /* a\nb */ type";
        let tokens = Lexer::new("test.th", src).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::KwType);
        assert_eq!(tokens[1].location.line, 2);
    }

    #[test]
    fn unterminated_block_comment_is_syntax_error() {
        let err = Lexer::new("test.th", "fn /* oops").tokenize().unwrap_err();
        assert_eq!(err.kind(), thirc_error::ErrorKind::SyntaxError);
    }

    #[test]
    fn scans_string_with_escapes() {
        let tokens = Lexer::new("test.th", "\"a\\nb\"").tokenize().unwrap();
        match &tokens[0].kind {
            TokenKind::String(s) => assert_eq!(s, "a\nb"),
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn annotations_and_varargs_marker() {
        let kinds = kinds("@extern @entry ...");
        assert_eq!(
            kinds,
            vec![
                TokenKind::AtExtern,
                TokenKind::AtEntry,
                TokenKind::Ellipsis,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_and_identifier() {
        let kinds = kinds("x42 42");
        assert_eq!(
            kinds,
            vec![TokenKind::Identifier, TokenKind::Number(42), TokenKind::Eof]
        );
    }
}
