//! The typed high-level IR (THIR): the lowering generator's output.
//!
//! Every node carries a `type_id` resolved against the shared `TypeTable`.
//! `Identifier` and `Call` nodes carry direct references to the THIR node
//! that declared the name they refer to, rather than a name to re-resolve —
//! by the time a node exists, resolution has already happened once.
//!
//! Allocated out of the same arena as `Symbol` and `Scope`: all three are
//! produced together, by the same generator pass, and live for exactly as
//! long as the THIR itself does.

use thirc_error::SourceLocation;
use thirc_syntax::declare_arena;

use crate::symbol::{Scope, Symbol};
use crate::types::TypeId;

declare_arena!([
    thir_program: ThirProgram<'tcx>,
    thir_block: ThirBlock<'tcx>,
    thir_binary: ThirBinary<'tcx>,
    thir_call: ThirCall<'tcx>,
    thir_member_access: ThirMemberAccess<'tcx>,
    thir_identifier: ThirIdentifier<'tcx>,
    thir_number: ThirNumber,
    thir_string: ThirString,
    thir_return: ThirReturn<'tcx>,
    thir_function: ThirFunction<'tcx>,
    thir_type_decl: ThirTypeDecl<'tcx>,
    thir_var_decl: ThirVarDecl<'tcx>,
    symbol: Symbol<'tcx>,
    scope: Scope<'tcx>,
]);

/// A reference to any THIR node, regardless of kind. Copy, like `AstNode`,
/// since every variant is itself a shared reference into the arena.
#[derive(Debug, Clone, Copy)]
pub enum ThirNode<'tcx> {
    Program(&'tcx ThirProgram<'tcx>),
    Block(&'tcx ThirBlock<'tcx>),
    Binary(&'tcx ThirBinary<'tcx>),
    Call(&'tcx ThirCall<'tcx>),
    MemberAccess(&'tcx ThirMemberAccess<'tcx>),
    Identifier(&'tcx ThirIdentifier<'tcx>),
    Number(&'tcx ThirNumber),
    String(&'tcx ThirString),
    Return(&'tcx ThirReturn<'tcx>),
    Function(&'tcx ThirFunction<'tcx>),
    TypeDecl(&'tcx ThirTypeDecl<'tcx>),
    VarDecl(&'tcx ThirVarDecl<'tcx>),
}

impl<'tcx> ThirNode<'tcx> {
    pub fn type_id(&self) -> TypeId {
        match self {
            ThirNode::Program(_) => crate::types::VOID,
            ThirNode::Block(n) => n.type_id,
            ThirNode::Binary(n) => n.type_id,
            ThirNode::Call(n) => n.type_id,
            ThirNode::MemberAccess(n) => n.type_id,
            ThirNode::Identifier(n) => n.type_id,
            ThirNode::Number(n) => n.type_id,
            ThirNode::String(n) => n.type_id,
            ThirNode::Return(n) => n.type_id,
            ThirNode::Function(n) => n.type_id,
            ThirNode::TypeDecl(n) => n.type_id,
            ThirNode::VarDecl(n) => n.type_id,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            ThirNode::Program(n) => n.location.clone(),
            ThirNode::Block(n) => n.location.clone(),
            ThirNode::Binary(n) => n.location.clone(),
            ThirNode::Call(n) => n.location.clone(),
            ThirNode::MemberAccess(n) => n.location.clone(),
            ThirNode::Identifier(n) => n.location.clone(),
            ThirNode::Number(n) => n.location.clone(),
            ThirNode::String(n) => n.location.clone(),
            ThirNode::Return(n) => n.location.clone(),
            ThirNode::Function(n) => n.location.clone(),
            ThirNode::TypeDecl(n) => n.location.clone(),
            ThirNode::VarDecl(n) => n.location.clone(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ThirNode::Program(_) => "Program",
            ThirNode::Block(_) => "Block",
            ThirNode::Binary(_) => "Binary",
            ThirNode::Call(_) => "Call",
            ThirNode::MemberAccess(_) => "MemberAccess",
            ThirNode::Identifier(_) => "Identifier",
            ThirNode::Number(_) => "Number",
            ThirNode::String(_) => "String",
            ThirNode::Return(_) => "Return",
            ThirNode::Function(_) => "Function",
            ThirNode::TypeDecl(_) => "TypeDecl",
            ThirNode::VarDecl(_) => "VarDecl",
        }
    }
}

pub use thirc_syntax::ast::BinaryOp;

#[derive(Debug)]
pub struct ThirProgram<'tcx> {
    pub statements: Vec<ThirNode<'tcx>>,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirBlock<'tcx> {
    pub stmts: Vec<ThirNode<'tcx>>,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirBinary<'tcx> {
    pub op: BinaryOp,
    pub left: ThirNode<'tcx>,
    pub right: ThirNode<'tcx>,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirCall<'tcx> {
    pub callee: ThirNode<'tcx>,
    pub args: Vec<ThirNode<'tcx>>,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirMemberAccess<'tcx> {
    pub base: ThirNode<'tcx>,
    pub member: String,
    pub member_index: usize,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirIdentifier<'tcx> {
    pub name: String,
    pub resolved: ThirNode<'tcx>,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirNumber {
    pub value: i32,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirString {
    pub value: String,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirReturn<'tcx> {
    pub expr: Option<ThirNode<'tcx>>,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirFunction<'tcx> {
    pub name: String,
    pub params: Vec<(String, TypeId)>,
    pub is_varargs: bool,
    pub is_extern: bool,
    pub is_entry: bool,
    pub body: Option<ThirNode<'tcx>>,
    /// The function's own (interned) `Function` type: return + params + varargs.
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirTypeDecl<'tcx> {
    pub name: String,
    pub members: Vec<(String, TypeId)>,
    /// The struct's own member-name scope, populated alongside the type
    /// table's member list (see `symbol.rs`'s module doc comment).
    pub member_scope: &'tcx Scope<'tcx>,
    pub type_id: TypeId,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct ThirVarDecl<'tcx> {
    pub name: String,
    pub value: Option<ThirNode<'tcx>>,
    pub type_id: TypeId,
    pub location: SourceLocation,
}
