//! The abstract syntax tree produced by the parser and consumed by
//! `thirc-core`.
//!
//! Every node is allocated out of one [`Arena`] and referenced by shared
//! reference for the remainder of the compilation; nodes are never freed
//! individually. Each node carries a monotonically increasing [`AstId`]
//! (rather than its raw arena address) as its identity — the dependency
//! graph registry content-addresses on this id, which keeps the core crate
//! free of raw-pointer bookkeeping while still guaranteeing that two
//! requests for the same syntactic node agree on identity.
//!
//! Types and referenced names are plain `String`s here; nothing is resolved
//! until `thirc-core` walks the tree.

use std::cell::Cell;

use thirc_error::SourceLocation;

use crate::declare_arena;

/// Stable identity of an AST node, assigned in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstId(pub u32);

/// Hands out the next [`AstId`] for a single parse. Not `Sync`; the parser
/// is single-threaded, so a plain `Cell` counter is enough.
#[derive(Default)]
pub struct AstIdGen(Cell<u32>);

impl AstIdGen {
    pub fn next(&self) -> AstId {
        let id = self.0.get();
        self.0.set(id + 1);
        AstId(id)
    }
}

declare_arena!([
    program: Program<'tcx>,
    block: Block<'tcx>,
    identifier: Identifier<'tcx>,
    number: NumberLit<'tcx>,
    string_lit: StringLit<'tcx>,
    binary: BinaryExpr<'tcx>,
    call: Call<'tcx>,
    member_access: MemberAccess<'tcx>,
    return_stmt: ReturnStmt<'tcx>,
    function_decl: FunctionDecl<'tcx>,
    type_decl: TypeDecl<'tcx>,
    var_decl: VarDecl<'tcx>,
]);

/// A reference to any AST node, regardless of kind.
///
/// Copy because every variant is itself a shared reference into the arena.
#[derive(Debug, Clone, Copy)]
pub enum AstNode<'tcx> {
    Program(&'tcx Program<'tcx>),
    Block(&'tcx Block<'tcx>),
    Identifier(&'tcx Identifier<'tcx>),
    Number(&'tcx NumberLit<'tcx>),
    String(&'tcx StringLit<'tcx>),
    Binary(&'tcx BinaryExpr<'tcx>),
    Call(&'tcx Call<'tcx>),
    MemberAccess(&'tcx MemberAccess<'tcx>),
    Return(&'tcx ReturnStmt<'tcx>),
    FunctionDecl(&'tcx FunctionDecl<'tcx>),
    TypeDecl(&'tcx TypeDecl<'tcx>),
    VarDecl(&'tcx VarDecl<'tcx>),
}

impl<'tcx> AstNode<'tcx> {
    pub fn id(&self) -> AstId {
        match self {
            AstNode::Program(n) => n.id,
            AstNode::Block(n) => n.id,
            AstNode::Identifier(n) => n.id,
            AstNode::Number(n) => n.id,
            AstNode::String(n) => n.id,
            AstNode::Binary(n) => n.id,
            AstNode::Call(n) => n.id,
            AstNode::MemberAccess(n) => n.id,
            AstNode::Return(n) => n.id,
            AstNode::FunctionDecl(n) => n.id,
            AstNode::TypeDecl(n) => n.id,
            AstNode::VarDecl(n) => n.id,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            AstNode::Program(n) => n.location.clone(),
            AstNode::Block(n) => n.location.clone(),
            AstNode::Identifier(n) => n.location.clone(),
            AstNode::Number(n) => n.location.clone(),
            AstNode::String(n) => n.location.clone(),
            AstNode::Binary(n) => n.location.clone(),
            AstNode::Call(n) => n.location.clone(),
            AstNode::MemberAccess(n) => n.location.clone(),
            AstNode::Return(n) => n.location.clone(),
            AstNode::FunctionDecl(n) => n.location.clone(),
            AstNode::TypeDecl(n) => n.location.clone(),
            AstNode::VarDecl(n) => n.location.clone(),
        }
    }

    /// The syntactic parent of this node, if any (the `Program` root has
    /// none). Set once, after the parent itself has been allocated.
    pub fn parent(&self) -> Option<AstNode<'tcx>> {
        match self {
            AstNode::Program(_) => None,
            AstNode::Block(n) => n.parent.get(),
            AstNode::Identifier(n) => n.parent.get(),
            AstNode::Number(n) => n.parent.get(),
            AstNode::String(n) => n.parent.get(),
            AstNode::Binary(n) => n.parent.get(),
            AstNode::Call(n) => n.parent.get(),
            AstNode::MemberAccess(n) => n.parent.get(),
            AstNode::Return(n) => n.parent.get(),
            AstNode::FunctionDecl(n) => n.parent.get(),
            AstNode::TypeDecl(n) => n.parent.get(),
            AstNode::VarDecl(n) => n.parent.get(),
        }
    }

    pub fn set_parent(&self, parent: AstNode<'tcx>) {
        match self {
            AstNode::Program(_) => {}
            AstNode::Block(n) => n.parent.set(Some(parent)),
            AstNode::Identifier(n) => n.parent.set(Some(parent)),
            AstNode::Number(n) => n.parent.set(Some(parent)),
            AstNode::String(n) => n.parent.set(Some(parent)),
            AstNode::Binary(n) => n.parent.set(Some(parent)),
            AstNode::Call(n) => n.parent.set(Some(parent)),
            AstNode::MemberAccess(n) => n.parent.set(Some(parent)),
            AstNode::Return(n) => n.parent.set(Some(parent)),
            AstNode::FunctionDecl(n) => n.parent.set(Some(parent)),
            AstNode::TypeDecl(n) => n.parent.set(Some(parent)),
            AstNode::VarDecl(n) => n.parent.set(Some(parent)),
        }
    }

    pub fn as_function_decl(&self) -> Option<&'tcx FunctionDecl<'tcx>> {
        match self {
            AstNode::FunctionDecl(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_type_decl(&self) -> Option<&'tcx TypeDecl<'tcx>> {
        match self {
            AstNode::TypeDecl(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Assign,
}

#[derive(Debug)]
pub struct Program<'tcx> {
    pub id: AstId,
    pub decls: Vec<AstNode<'tcx>>,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct Block<'tcx> {
    pub id: AstId,
    pub stmts: Vec<AstNode<'tcx>>,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct Identifier<'tcx> {
    pub id: AstId,
    pub name: String,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct NumberLit<'tcx> {
    pub id: AstId,
    pub value: i32,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct StringLit<'tcx> {
    pub id: AstId,
    pub value: String,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct BinaryExpr<'tcx> {
    pub id: AstId,
    pub op: BinaryOp,
    pub left: AstNode<'tcx>,
    pub right: AstNode<'tcx>,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct Call<'tcx> {
    pub id: AstId,
    pub name: String,
    pub args: Vec<AstNode<'tcx>>,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct MemberAccess<'tcx> {
    pub id: AstId,
    pub base: AstNode<'tcx>,
    pub member: String,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct ReturnStmt<'tcx> {
    pub id: AstId,
    pub expr: Option<AstNode<'tcx>>,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

/// A function parameter. `is_variadic` marks the `...` marker slot, which
/// the parser guarantees (if present at all) is the last parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub type_name: String,
    pub name: String,
    pub is_variadic: bool,
    pub location: SourceLocation,
}

/// A struct member declaration: `type_name name`.
#[derive(Debug, Clone)]
pub struct Member {
    pub type_name: String,
    pub name: String,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct FunctionDecl<'tcx> {
    pub id: AstId,
    pub name: String,
    pub return_type_name: Option<String>,
    pub params: Vec<Param>,
    pub body: Option<&'tcx Block<'tcx>>,
    pub is_extern: bool,
    pub is_entry: bool,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct TypeDecl<'tcx> {
    pub id: AstId,
    pub name: String,
    pub members: Vec<Member>,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}

#[derive(Debug)]
pub struct VarDecl<'tcx> {
    pub id: AstId,
    pub type_name: String,
    pub name: String,
    pub value: Option<AstNode<'tcx>>,
    pub location: SourceLocation,
    pub parent: Cell<Option<AstNode<'tcx>>>,
}
