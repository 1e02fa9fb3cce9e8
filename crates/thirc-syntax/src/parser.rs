//! Recursive-descent, single-look-ahead parser.
//!
//! Fail-fast: the first syntax error aborts with a `SyntaxError` carrying a
//! `SourceLocation`. There is no error recovery or resynchronization — a
//! malformed file never produces a partial AST.
//!
//! Grammar (informal; mirrors the node kinds in `ast.rs`):
//!
//! ```text
//! program      := decl*
//! decl         := function_decl | type_decl
//! function_decl:= "fn" ident "(" params? ")" return_type? annotations? (block | ";")
//! params       := param ("," param)*
//! param        := type_name ident | "..."
//! return_type  := type_name                      # absent => Void
//! annotations  := ("@extern" | "@entry")*
//! type_decl    := "type" ident "(" members? ")" ";"
//! members      := member ("," member)*
//! member       := type_name ident
//! block        := "{" stmt* "}"
//! stmt         := var_decl | return_stmt | expr_stmt | block
//! var_decl     := type_name ident ("=" expr)? ";"
//! return_stmt  := "return" expr? ";"
//! expr_stmt    := expr ";"
//! expr         := assignment
//! assignment   := equality ("=" assignment)?
//! equality     := additive ("==" additive)*
//! additive     := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := primary (("*" | "/") primary)*
//! primary      := number | string | call | member_chain | ident | "(" expr ")"
//! call         := ident "(" args? ")"
//! member_chain := (ident | call) ("." ident)*
//! args         := expr ("," expr)*
//! type_name    := ident
//! ```
//!
//! A leading variadic parameter, or any variadic parameter that is not
//! last, is rejected here with a `SyntaxError`: the core never sees a
//! malformed parameter list.

use thirc_error::{Error, Result, SourceLocation};

use crate::ast::{
    Arena, AstIdGen, AstNode, BinaryExpr, BinaryOp, Block, Call, FunctionDecl, Identifier, Member,
    MemberAccess, NumberLit, Param, Program, ReturnStmt, StringLit, TypeDecl, VarDecl,
};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub struct Parser<'tcx> {
    tokens: Vec<Token>,
    pos: usize,
    arena: &'tcx Arena<'tcx>,
    ids: AstIdGen,
}

/// Parse `src` (from `file`, used only for diagnostics) into a `Program`
/// allocated out of `arena`.
pub fn parse<'tcx>(
    file: &str,
    src: &str,
    arena: &'tcx Arena<'tcx>,
) -> Result<&'tcx Program<'tcx>> {
    let tokens = Lexer::new(file.to_string(), src).tokenize()?;
    Parser::new(tokens, arena).parse_program()
}

impl<'tcx> Parser<'tcx> {
    pub fn new(tokens: Vec<Token>, arena: &'tcx Arena<'tcx>) -> Self {
        Self {
            tokens,
            pos: 0,
            arena,
            ids: AstIdGen::default(),
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn loc(&self) -> SourceLocation {
        self.peek().location.clone()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(Error::syntax_error(
                self.loc(),
                format!("expected {:?}, found {:?}", kind, self.peek().kind),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, SourceLocation)> {
        let loc = self.loc();
        if matches!(self.peek().kind, TokenKind::Identifier) {
            let tok = self.advance();
            Ok((tok.lexeme, loc))
        } else {
            Err(Error::syntax_error(
                loc,
                format!("expected identifier, found {:?}", self.peek().kind),
            ))
        }
    }

    pub fn parse_program(&mut self) -> Result<&'tcx Program<'tcx>> {
        let loc = self.loc();
        let mut decls = Vec::new();
        while !self.check(&TokenKind::Eof) {
            decls.push(self.parse_decl()?);
        }
        let program = self.arena.alloc(Program {
            id: self.ids.next(),
            decls,
            location: loc,
        });
        for decl in &program.decls {
            decl.set_parent(AstNode::Program(program));
        }
        Ok(program)
    }

    fn parse_decl(&mut self) -> Result<AstNode<'tcx>> {
        match self.peek().kind {
            TokenKind::KwFn => self.parse_function_decl(),
            TokenKind::KwType => self.parse_type_decl(),
            _ => Err(Error::syntax_error(
                self.loc(),
                format!("expected 'fn' or 'type', found {:?}", self.peek().kind),
            )),
        }
    }

    fn parse_function_decl(&mut self) -> Result<AstNode<'tcx>> {
        let loc = self.loc();
        self.expect(TokenKind::KwFn)?;
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let return_type_name = if matches!(self.peek().kind, TokenKind::Identifier) {
            Some(self.advance().lexeme)
        } else {
            None
        };

        let mut is_extern = false;
        let mut is_entry = false;
        loop {
            match self.peek().kind {
                TokenKind::AtExtern => {
                    self.advance();
                    is_extern = true;
                }
                TokenKind::AtEntry => {
                    self.advance();
                    is_entry = true;
                }
                _ => break,
            }
        }

        let body = if self.check(&TokenKind::LBrace) {
            if is_extern {
                return Err(Error::syntax_error(
                    self.loc(),
                    "extern function declaration cannot have a body",
                ));
            }
            Some(self.parse_block()?)
        } else {
            self.expect(TokenKind::Semicolon)?;
            None
        };

        let decl = self.arena.alloc(FunctionDecl {
            id: self.ids.next(),
            name,
            return_type_name,
            params,
            body,
            is_extern,
            is_entry,
            location: loc,
            parent: Default::default(),
        });
        if let Some(body) = decl.body {
            AstNode::Block(body).set_parent(AstNode::FunctionDecl(decl));
        }
        Ok(AstNode::FunctionDecl(decl))
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let loc = self.loc();
            if self.check(&TokenKind::Ellipsis) {
                self.advance();
                params.push(Param {
                    type_name: String::new(),
                    name: "...".to_string(),
                    is_variadic: true,
                    location: loc,
                });
            } else {
                let (type_name, _) = self.expect_identifier()?;
                let (name, _) = self.expect_identifier()?;
                params.push(Param {
                    type_name,
                    name,
                    is_variadic: false,
                    location: loc,
                });
            }
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }

        if let Some(pos) = params.iter().position(|p| p.is_variadic) {
            if pos != params.len() - 1 {
                return Err(Error::syntax_error(
                    params[pos].location.clone(),
                    "variadic parameter '...' must be the last parameter",
                ));
            }
        }
        Ok(params)
    }

    fn parse_type_decl(&mut self) -> Result<AstNode<'tcx>> {
        let loc = self.loc();
        self.expect(TokenKind::KwType)?;
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let members = self.parse_members()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;

        let decl = self.arena.alloc(TypeDecl {
            id: self.ids.next(),
            name,
            members,
            location: loc,
            parent: Default::default(),
        });
        Ok(AstNode::TypeDecl(decl))
    }

    fn parse_members(&mut self) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(members);
        }
        loop {
            let loc = self.loc();
            let (type_name, _) = self.expect_identifier()?;
            let (name, _) = self.expect_identifier()?;
            members.push(Member {
                type_name,
                name,
                location: loc,
            });
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(members)
    }

    fn parse_block(&mut self) -> Result<&'tcx Block<'tcx>> {
        let loc = self.loc();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        let block = self.arena.alloc(Block {
            id: self.ids.next(),
            stmts,
            location: loc,
            parent: Default::default(),
        });
        for stmt in &block.stmts {
            stmt.set_parent(AstNode::Block(block));
        }
        Ok(block)
    }

    fn parse_stmt(&mut self) -> Result<AstNode<'tcx>> {
        match self.peek().kind {
            TokenKind::KwReturn => self.parse_return_stmt(),
            TokenKind::LBrace => Ok(AstNode::Block(self.parse_block()?)),
            TokenKind::Identifier
                if matches!(self.peek_kind(1), TokenKind::Identifier) =>
            {
                self.parse_var_decl()
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_var_decl(&mut self) -> Result<AstNode<'tcx>> {
        let loc = self.loc();
        let (type_name, _) = self.expect_identifier()?;
        let (name, _) = self.expect_identifier()?;
        let value = if self.check(&TokenKind::Eq) {
            self.advance();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon)?;
        let decl = self.arena.alloc(VarDecl {
            id: self.ids.next(),
            type_name,
            name,
            value,
            location: loc,
            parent: Default::default(),
        });
        if let Some(value) = decl.value {
            value.set_parent(AstNode::VarDecl(decl));
        }
        Ok(AstNode::VarDecl(decl))
    }

    fn parse_return_stmt(&mut self) -> Result<AstNode<'tcx>> {
        let loc = self.loc();
        self.expect(TokenKind::KwReturn)?;
        let expr = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        let stmt = self.arena.alloc(ReturnStmt {
            id: self.ids.next(),
            expr,
            location: loc,
            parent: Default::default(),
        });
        if let Some(expr) = stmt.expr {
            expr.set_parent(AstNode::Return(stmt));
        }
        Ok(AstNode::Return(stmt))
    }

    fn parse_expr_stmt(&mut self) -> Result<AstNode<'tcx>> {
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<AstNode<'tcx>> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<AstNode<'tcx>> {
        let left = self.parse_equality()?;
        if self.check(&TokenKind::Eq) {
            let loc = self.loc();
            self.advance();
            let right = self.parse_assignment()?;
            return Ok(self.make_binary(BinaryOp::Assign, left, right, loc));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<AstNode<'tcx>> {
        let mut left = self.parse_additive()?;
        while self.check(&TokenKind::EqEq) {
            let loc = self.loc();
            self.advance();
            let right = self.parse_additive()?;
            left = self.make_binary(BinaryOp::Eq, left, right, loc);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<AstNode<'tcx>> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let loc = self.loc();
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.make_binary(op, left, right, loc);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<AstNode<'tcx>> {
        let mut left = self.parse_primary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => break,
            };
            let loc = self.loc();
            self.advance();
            let right = self.parse_primary()?;
            left = self.make_binary(op, left, right, loc);
        }
        Ok(left)
    }

    fn make_binary(
        &mut self,
        op: BinaryOp,
        left: AstNode<'tcx>,
        right: AstNode<'tcx>,
        loc: SourceLocation,
    ) -> AstNode<'tcx> {
        let node = self.arena.alloc(BinaryExpr {
            id: self.ids.next(),
            op,
            left,
            right,
            location: loc,
            parent: Default::default(),
        });
        left.set_parent(AstNode::Binary(node));
        right.set_parent(AstNode::Binary(node));
        AstNode::Binary(node)
    }

    fn parse_primary(&mut self) -> Result<AstNode<'tcx>> {
        let loc = self.loc();
        let mut node = match &self.peek().kind {
            TokenKind::Number(_) => {
                let value = match self.advance().kind {
                    TokenKind::Number(v) => v,
                    _ => unreachable!(),
                };
                AstNode::Number(self.arena.alloc(NumberLit {
                    id: self.ids.next(),
                    value,
                    location: loc,
                    parent: Default::default(),
                }))
            }
            TokenKind::String(_) => {
                let value = match self.advance().kind {
                    TokenKind::String(s) => s,
                    _ => unreachable!(),
                };
                AstNode::String(self.arena.alloc(StringLit {
                    id: self.ids.next(),
                    value,
                    location: loc,
                    parent: Default::default(),
                }))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                inner
            }
            TokenKind::Identifier => {
                let (name, ident_loc) = self.expect_identifier()?;
                if self.check(&TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen)?;
                    let call = self.arena.alloc(Call {
                        id: self.ids.next(),
                        name,
                        args,
                        location: ident_loc,
                        parent: Default::default(),
                    });
                    for arg in &call.args {
                        arg.set_parent(AstNode::Call(call));
                    }
                    AstNode::Call(call)
                } else {
                    AstNode::Identifier(self.arena.alloc(Identifier {
                        id: self.ids.next(),
                        name,
                        location: ident_loc,
                        parent: Default::default(),
                    }))
                }
            }
            other => {
                return Err(Error::syntax_error(
                    loc,
                    format!("unexpected token {:?}", other),
                ));
            }
        };

        while self.check(&TokenKind::Dot) {
            let dot_loc = self.loc();
            self.advance();
            let (member, _) = self.expect_identifier()?;
            let access = self.arena.alloc(MemberAccess {
                id: self.ids.next(),
                base: node,
                member,
                location: dot_loc,
                parent: Default::default(),
            });
            node.set_parent(AstNode::MemberAccess(access));
            node = AstNode::MemberAccess(access);
        }
        Ok(node)
    }

    fn parse_args(&mut self) -> Result<Vec<AstNode<'tcx>>> {
        let mut args = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> usize {
        let arena = Arena::default();
        let program = parse("test.th", src, &arena).unwrap();
        program.decls.len()
    }

    #[test]
    fn empty_program_parses() {
        assert_eq!(parse_ok(""), 0);
    }

    #[test]
    fn extern_function_without_body() {
        assert_eq!(parse_ok("fn b() i32 @extern;"), 1);
    }

    #[test]
    fn entry_function_with_body_and_call() {
        assert_eq!(parse_ok("fn a() { b(); } fn main() @entry { a(); }"), 2);
    }

    #[test]
    fn type_decl_with_members() {
        let arena = Arena::default();
        let program = parse(
            "test.th",
            "type Vector_2 ( i32 x, i32 y );",
            &arena,
        )
        .unwrap();
        let decl = program.decls[0].as_type_decl().unwrap();
        assert_eq!(decl.name, "Vector_2");
        assert_eq!(decl.members.len(), 2);
    }

    #[test]
    fn variadic_must_be_last() {
        let arena = Arena::default();
        let err = parse("test.th", "fn f(..., i32 x) {}", &arena).unwrap_err();
        assert_eq!(err.kind(), thirc_error::ErrorKind::SyntaxError);
    }

    #[test]
    fn member_assignment_and_read() {
        let arena = Arena::default();
        let program = parse(
            "test.th",
            "fn main() @entry { Vector_3 v; v.z = 100; printf(\"v.z = '%d'\\n\", v.z); }",
            &arena,
        )
        .unwrap();
        let func = program.decls[0].as_function_decl().unwrap();
        let body = func.body.unwrap();
        assert_eq!(body.stmts.len(), 3);
    }

    #[test]
    fn variadic_extern_call() {
        let arena = Arena::default();
        let program = parse(
            "test.th",
            "fn printf(String fmt, ...) @extern; fn main() @entry { printf(\"%d %d\\n\", 1, 2); }",
            &arena,
        )
        .unwrap();
        let printf = program.decls[0].as_function_decl().unwrap();
        assert!(printf.params.last().unwrap().is_variadic);
    }
}
