//! The THIR generator: walks the dependency graph, forcing each
//! declaration's dependencies before lowering the declaration itself, and
//! applies the per-AST-kind typing rules along the way.
//!
//! `force` is a depth-first topological walk over `DepNode`s guarded by the
//! tri-state machine (`Unresolved -> Resolving -> Resolved`, with
//! re-entering a `Resolving` node reported as `CyclicDependency`). Driving
//! the graph's roots in source order, recursively forcing each root's
//! dependencies first, produces the same ordering guarantee as a Kahn
//! in-degree queue with a final unreached-node sweep would — every
//! dependency finishes before its dependent — without separate bookkeeping
//! for in-degrees, and it falls out naturally from `force` being memoized
//! (a `Resolved` node returns its cached THIR instead of re-lowering).
//!
//! A function's own symbol is only recorded in the program scope after its
//! body has been fully lowered, so a function cannot call itself, directly
//! or mutually: a self-call fails to resolve the name (not yet registered)
//! and a mutual pair fails earlier still, as a `CyclicDependency` from the
//! dependency graph itself. This compiler has no notion of recursion.

use std::cell::RefCell;
use std::collections::HashMap;

use thirc_error::{Error, Result};
use thirc_syntax::ast::{self, AstNode};
use thirc_syntax::AstId;

use crate::context::CompilationContext;
use crate::dep_graph::{build_dep_graph, DepNode, DepState};
use crate::symbol::Scope;
use crate::thir::{
    ThirBinary, ThirBlock, ThirCall, ThirFunction, ThirIdentifier, ThirMemberAccess, ThirNode,
    ThirNumber, ThirProgram, ThirReturn, ThirString, ThirTypeDecl, ThirVarDecl,
};
use crate::types::{TypeId, TypeKind, I32, STRING, VOID};

struct Generator<'tcx> {
    ctx: &'tcx CompilationContext<'tcx>,
    program_scope: &'tcx Scope<'tcx>,
    lowered: RefCell<HashMap<AstId, ThirNode<'tcx>>>,
    statements: RefCell<Vec<ThirNode<'tcx>>>,
}

/// Builds the dependency graph for `program` and lowers it into a THIR
/// `Program`, whose statements are ordered so that every declaration
/// appears after everything it depends on.
///
/// Does not check for an `@entry` function — an empty program, or one with
/// no entry point, lowers successfully to a `Program` THIR with no error.
/// `EntryPointMissing` is a driver-level check (spec.md §7), applied by the
/// CLI after this function returns.
pub fn lower_program<'tcx>(
    program: &'tcx ast::Program<'tcx>,
    ctx: &'tcx CompilationContext<'tcx>,
) -> Result<ThirNode<'tcx>> {
    let graph = build_dep_graph(program, &ctx.dep_arena, &ctx.dep_registry);
    let program_scope = ctx.new_scope(None);
    let generator = Generator {
        ctx,
        program_scope,
        lowered: RefCell::new(HashMap::new()),
        statements: RefCell::new(Vec::new()),
    };
    for root in graph.roots() {
        generator.force(*root)?;
    }
    let statements = generator.statements.borrow().clone();
    let thir_program = ctx.thir_arena.alloc(ThirProgram {
        statements,
        location: program.location.clone(),
    });
    Ok(ThirNode::Program(thir_program))
}

impl<'tcx> Generator<'tcx> {
    fn force(&self, node: &'tcx DepNode<'tcx>) -> Result<ThirNode<'tcx>> {
        match node.state.get() {
            DepState::Resolved => {
                return Ok(*self
                    .lowered
                    .borrow()
                    .get(&node.ast.id())
                    .expect("dep node marked Resolved with no cached THIR"));
            }
            DepState::Resolving => {
                node.state.set(DepState::Errored);
                return Err(Error::cyclic_dependency(node.ast.location(), node.name()));
            }
            DepState::Errored => {
                return Err(Error::cyclic_dependency(node.ast.location(), node.name()));
            }
            DepState::Unresolved => {}
        }

        node.state.set(DepState::Resolving);
        for dep in node.dependencies.borrow().iter() {
            if let Err(e) = self.force(*dep) {
                node.state.set(DepState::Errored);
                return Err(e);
            }
        }

        let thir = match node.ast {
            AstNode::FunctionDecl(f) => self.lower_function_decl(f),
            AstNode::TypeDecl(t) => self.lower_type_decl(t),
            other => unreachable!("dep node wraps non-declaration AST kind {:?}", other),
        };
        let thir = match thir {
            Ok(t) => t,
            Err(e) => {
                node.state.set(DepState::Errored);
                return Err(e);
            }
        };

        self.lowered.borrow_mut().insert(node.ast.id(), thir);
        self.statements.borrow_mut().push(thir);
        node.state.set(DepState::Resolved);
        Ok(thir)
    }

    fn lower_function_decl(&self, f: &'tcx ast::FunctionDecl<'tcx>) -> Result<ThirNode<'tcx>> {
        let fn_scope = self.ctx.new_scope(Some(self.program_scope));
        let mut param_types = Vec::new();
        let mut params_for_function = Vec::new();
        let mut is_varargs = false;

        for param in &f.params {
            if param.is_variadic {
                is_varargs = true;
                continue;
            }
            let type_id = self.ctx.types.find_by_name(&param.type_name).ok_or_else(|| {
                Error::unknown_name(param.location.clone(), param.type_name.clone())
            })?;
            let var_node = self.ctx.thir_arena.alloc(ThirVarDecl {
                name: param.name.clone(),
                value: None,
                type_id,
                location: param.location.clone(),
            });
            fn_scope.insert(
                &self.ctx.thir_arena,
                self.ctx.sym_ids(),
                param.name.clone(),
                ThirNode::VarDecl(var_node),
                type_id,
                param.location.clone(),
            )?;
            param_types.push(type_id);
            params_for_function.push((param.name.clone(), type_id));
        }

        let return_type = match &f.return_type_name {
            Some(name) => self
                .ctx
                .types
                .find_by_name(name)
                .ok_or_else(|| Error::unknown_name(f.location.clone(), name.clone()))?,
            None => VOID,
        };

        let (fn_type, _) = self
            .ctx
            .types
            .find_or_create_function(return_type, param_types, is_varargs);

        let body = match f.body {
            Some(block) => Some(self.lower_block(block, fn_scope, return_type)?),
            None => None,
        };

        let node = self.ctx.thir_arena.alloc(ThirFunction {
            name: f.name.clone(),
            params: params_for_function,
            is_varargs,
            is_extern: f.is_extern,
            is_entry: f.is_entry,
            body,
            type_id: fn_type,
            location: f.location.clone(),
        });
        self.program_scope.insert(
            &self.ctx.thir_arena,
            self.ctx.sym_ids(),
            f.name.clone(),
            ThirNode::Function(node),
            fn_type,
            f.location.clone(),
        )?;
        Ok(ThirNode::Function(node))
    }

    fn lower_type_decl(&self, t: &'tcx ast::TypeDecl<'tcx>) -> Result<ThirNode<'tcx>> {
        let type_id = self.ctx.types.create_struct(t.name.clone());
        let member_scope = self.ctx.new_scope(None);
        let mut members = Vec::new();

        for m in &t.members {
            let member_type = self.ctx.types.find_by_name(&m.type_name).ok_or_else(|| {
                Error::unknown_name(m.location.clone(), m.type_name.clone())
            })?;
            self.ctx.types.push_struct_member(type_id, m.name.clone(), member_type);
            let field_node = self.ctx.thir_arena.alloc(ThirVarDecl {
                name: m.name.clone(),
                value: None,
                type_id: member_type,
                location: m.location.clone(),
            });
            member_scope.insert(
                &self.ctx.thir_arena,
                self.ctx.sym_ids(),
                m.name.clone(),
                ThirNode::VarDecl(field_node),
                member_type,
                m.location.clone(),
            )?;
            members.push((m.name.clone(), member_type));
        }

        let node = self.ctx.thir_arena.alloc(ThirTypeDecl {
            name: t.name.clone(),
            members,
            member_scope,
            type_id,
            location: t.location.clone(),
        });
        self.program_scope.insert(
            &self.ctx.thir_arena,
            self.ctx.sym_ids(),
            t.name.clone(),
            ThirNode::TypeDecl(node),
            type_id,
            t.location.clone(),
        )?;
        Ok(ThirNode::TypeDecl(node))
    }

    fn lower_block(
        &self,
        block: &'tcx ast::Block<'tcx>,
        parent_scope: &'tcx Scope<'tcx>,
        func_return_type: TypeId,
    ) -> Result<ThirNode<'tcx>> {
        let scope = self.ctx.new_scope(Some(parent_scope));
        let mut stmts = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            stmts.push(self.lower_stmt(*stmt, scope, func_return_type)?);
        }
        let node = self.ctx.thir_arena.alloc(ThirBlock {
            stmts,
            type_id: VOID,
            location: block.location.clone(),
        });
        Ok(ThirNode::Block(node))
    }

    fn lower_stmt(
        &self,
        node: AstNode<'tcx>,
        scope: &'tcx Scope<'tcx>,
        func_return_type: TypeId,
    ) -> Result<ThirNode<'tcx>> {
        match node {
            AstNode::VarDecl(v) => self.lower_var_decl(v, scope),
            AstNode::Return(r) => self.lower_return(r, scope, func_return_type),
            AstNode::Block(b) => self.lower_block(b, scope, func_return_type),
            other => self.lower_expr(other, scope),
        }
    }

    fn lower_var_decl(&self, v: &'tcx ast::VarDecl<'tcx>, scope: &'tcx Scope<'tcx>) -> Result<ThirNode<'tcx>> {
        let type_id = self
            .ctx
            .types
            .find_by_name(&v.type_name)
            .ok_or_else(|| Error::unknown_name(v.location.clone(), v.type_name.clone()))?;
        let value = match v.value {
            Some(expr) => Some(self.lower_expr(expr, scope)?),
            None => None,
        };
        if let Some(value) = value {
            if value.type_id() != type_id {
                return Err(Error::type_mismatch(
                    v.location.clone(),
                    self.ctx.types.describe(type_id),
                    self.ctx.types.describe(value.type_id()),
                ));
            }
        }
        let node = self.ctx.thir_arena.alloc(ThirVarDecl {
            name: v.name.clone(),
            value,
            type_id,
            location: v.location.clone(),
        });
        scope.insert(
            &self.ctx.thir_arena,
            self.ctx.sym_ids(),
            v.name.clone(),
            ThirNode::VarDecl(node),
            type_id,
            v.location.clone(),
        )?;
        Ok(ThirNode::VarDecl(node))
    }

    fn lower_return(
        &self,
        r: &'tcx ast::ReturnStmt<'tcx>,
        scope: &'tcx Scope<'tcx>,
        func_return_type: TypeId,
    ) -> Result<ThirNode<'tcx>> {
        let expr = match r.expr {
            Some(e) => Some(self.lower_expr(e, scope)?),
            None => None,
        };
        match expr {
            Some(e) if e.type_id() != func_return_type => {
                return Err(Error::type_mismatch(
                    r.location.clone(),
                    self.ctx.types.describe(func_return_type),
                    self.ctx.types.describe(e.type_id()),
                ));
            }
            None if func_return_type != VOID => {
                return Err(Error::type_mismatch(
                    r.location.clone(),
                    self.ctx.types.describe(func_return_type),
                    "void",
                ));
            }
            _ => {}
        }
        let node = self.ctx.thir_arena.alloc(ThirReturn {
            expr,
            type_id: VOID,
            location: r.location.clone(),
        });
        Ok(ThirNode::Return(node))
    }

    fn lower_expr(&self, node: AstNode<'tcx>, scope: &'tcx Scope<'tcx>) -> Result<ThirNode<'tcx>> {
        match node {
            AstNode::Number(n) => {
                let t = self.ctx.thir_arena.alloc(ThirNumber {
                    value: n.value,
                    type_id: I32,
                    location: n.location.clone(),
                });
                Ok(ThirNode::Number(t))
            }
            AstNode::String(s) => {
                let t = self.ctx.thir_arena.alloc(ThirString {
                    value: s.value.clone(),
                    type_id: STRING,
                    location: s.location.clone(),
                });
                Ok(ThirNode::String(t))
            }
            AstNode::Identifier(id) => self.lower_identifier(id, scope),
            AstNode::Call(c) => self.lower_call(c, scope),
            AstNode::MemberAccess(m) => self.lower_member_access(m, scope),
            AstNode::Binary(b) => self.lower_binary(b, scope),
            other => unreachable!("grammar never produces {:?} in expression position", other),
        }
    }

    /// Lowers a left-hand-side of an assignment. Only identifiers and
    /// member accesses are lvalue forms; anything else is `NotAssignable`.
    fn lower_lvalue(&self, node: AstNode<'tcx>, scope: &'tcx Scope<'tcx>) -> Result<ThirNode<'tcx>> {
        match node {
            AstNode::Identifier(_) | AstNode::MemberAccess(_) => self.lower_expr(node, scope),
            other => Err(Error::not_assignable(other.location())),
        }
    }

    fn lower_identifier(&self, id: &'tcx ast::Identifier<'tcx>, scope: &'tcx Scope<'tcx>) -> Result<ThirNode<'tcx>> {
        let sym = scope
            .lookup(&id.name)
            .ok_or_else(|| Error::unknown_name(id.location.clone(), id.name.clone()))?;
        let node = self.ctx.thir_arena.alloc(ThirIdentifier {
            name: id.name.clone(),
            resolved: sym.node,
            type_id: sym.type_id,
            location: id.location.clone(),
        });
        Ok(ThirNode::Identifier(node))
    }

    fn lower_call(&self, c: &'tcx ast::Call<'tcx>, scope: &'tcx Scope<'tcx>) -> Result<ThirNode<'tcx>> {
        let sym = scope
            .lookup(&c.name)
            .ok_or_else(|| Error::unknown_name(c.location.clone(), c.name.clone()))?;
        let func = match sym.node {
            ThirNode::Function(f) => f,
            _ => return Err(Error::not_callable(c.location.clone(), c.name.clone())),
        };
        let fn_type = self.ctx.types.get(sym.type_id);
        let (return_type, declared_params, is_varargs) = match &fn_type.kind {
            TypeKind::Function {
                return_type,
                params,
                is_varargs,
            } => (*return_type, params.clone(), *is_varargs),
            _ => return Err(Error::not_callable(c.location.clone(), c.name.clone())),
        };

        let arity_ok = if is_varargs {
            c.args.len() >= declared_params.len()
        } else {
            c.args.len() == declared_params.len()
        };
        if !arity_ok {
            return Err(Error::wrong_arity(c.location.clone(), declared_params.len(), c.args.len()));
        }

        let mut args = Vec::with_capacity(c.args.len());
        for (i, arg) in c.args.iter().enumerate() {
            let lowered = self.lower_expr(*arg, scope)?;
            if let Some(expected) = declared_params.get(i) {
                if lowered.type_id() != *expected {
                    return Err(Error::type_mismatch(
                        lowered.location(),
                        self.ctx.types.describe(*expected),
                        self.ctx.types.describe(lowered.type_id()),
                    ));
                }
            }
            args.push(lowered);
        }

        let node = self.ctx.thir_arena.alloc(ThirCall {
            callee: ThirNode::Function(func),
            args,
            type_id: return_type,
            location: c.location.clone(),
        });
        Ok(ThirNode::Call(node))
    }

    fn lower_member_access(&self, m: &'tcx ast::MemberAccess<'tcx>, scope: &'tcx Scope<'tcx>) -> Result<ThirNode<'tcx>> {
        let base = self.lower_expr(m.base, scope)?;
        let base_type = self.ctx.types.get(base.type_id());
        if !matches!(base_type.kind, TypeKind::Struct { .. }) {
            return Err(Error::unknown_member(
                m.location.clone(),
                self.ctx.types.describe(base.type_id()),
                m.member.clone(),
            ));
        }
        let index = self
            .ctx
            .types
            .get_member_index(base.type_id(), &m.member)
            .ok_or_else(|| {
                Error::unknown_member(m.location.clone(), self.ctx.types.describe(base.type_id()), m.member.clone())
            })?;
        let member_type = match &base_type.kind {
            TypeKind::Struct { members, .. } => members.borrow()[index].1,
            _ => unreachable!(),
        };
        let node = self.ctx.thir_arena.alloc(ThirMemberAccess {
            base,
            member: m.member.clone(),
            member_index: index,
            type_id: member_type,
            location: m.location.clone(),
        });
        Ok(ThirNode::MemberAccess(node))
    }

    fn lower_binary(&self, b: &'tcx ast::BinaryExpr<'tcx>, scope: &'tcx Scope<'tcx>) -> Result<ThirNode<'tcx>> {
        if b.op == ast::BinaryOp::Assign {
            let left = self.lower_lvalue(b.left, scope)?;
            let right = self.lower_expr(b.right, scope)?;
            if left.type_id() != right.type_id() {
                return Err(Error::type_mismatch(
                    b.location.clone(),
                    self.ctx.types.describe(left.type_id()),
                    self.ctx.types.describe(right.type_id()),
                ));
            }
            let node = self.ctx.thir_arena.alloc(ThirBinary {
                op: b.op,
                left,
                right,
                type_id: right.type_id(),
                location: b.location.clone(),
            });
            return Ok(ThirNode::Binary(node));
        }

        let left = self.lower_expr(b.left, scope)?;
        let right = self.lower_expr(b.right, scope)?;
        if left.type_id() != right.type_id() {
            return Err(Error::type_mismatch(
                b.location.clone(),
                self.ctx.types.describe(left.type_id()),
                self.ctx.types.describe(right.type_id()),
            ));
        }
        let node = self.ctx.thir_arena.alloc(ThirBinary {
            op: b.op,
            left,
            right,
            type_id: left.type_id(),
            location: b.location.clone(),
        });
        Ok(ThirNode::Binary(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirc_error::ErrorKind;
    use thirc_syntax::ast::Arena as AstArena;

    fn compile(src: &str) -> Result<String> {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse("test.th", src, &ast_arena)?;
        let ctx = CompilationContext::new();
        let thir = lower_program(program, &ctx)?;
        Ok(crate::printer::pretty_print(&thir, &ctx.types))
    }

    fn statement_names(src: &str) -> Vec<String> {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse("test.th", src, &ast_arena).unwrap();
        let ctx = CompilationContext::new();
        let thir = lower_program(program, &ctx).unwrap();
        match thir {
            ThirNode::Program(p) => p
                .statements
                .iter()
                .map(|s| match s {
                    ThirNode::Function(f) => f.name.clone(),
                    ThirNode::TypeDecl(t) => t.name.clone(),
                    _ => unreachable!(),
                })
                .collect(),
            _ => unreachable!(),
        }
    }

    // S1: forward reference. `a` calls `b`, declared later; `main` calls `a`.
    #[test]
    fn s1_forward_reference_lowers_in_dependency_order() {
        let names = statement_names("fn a() { b(); } fn b() i32 @extern; fn main() @entry { a(); }");
        assert_eq!(names, vec!["b", "a", "main"]);
    }

    // S2: a struct nested inside another struct's member list.
    #[test]
    fn s2_nested_struct_member_resolves() {
        let out = compile(
            "type Inner ( i32 x ); \
             type Outer ( Inner inner ); \
             fn main() @entry { Outer o; }",
        );
        assert!(out.is_ok(), "{:?}", out.err());
    }

    // S3: member assignment then read.
    #[test]
    fn s3_member_assignment_and_read_typecheck() {
        let out = compile(
            "type Vector_3 ( i32 x, i32 y, i32 z ); \
             fn printf(String fmt, ...) @extern; \
             fn main() @entry { Vector_3 v; v.z = 100; printf(\"v.z = '%d'\\n\", v.z); }",
        );
        assert!(out.is_ok(), "{:?}", out.err());
    }

    // S4: mutual recursion is a dependency cycle, not a valid program.
    #[test]
    fn s4_mutual_calls_are_a_cyclic_dependency() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse("test.th", "fn a() { b(); } fn b() { a(); }", &ast_arena).unwrap();
        let ctx = CompilationContext::new();
        let err = lower_program(program, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CyclicDependency);
    }

    // S5: calling a non-variadic function with the wrong argument count.
    #[test]
    fn s5_wrong_arity_on_non_variadic_call() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse(
            "test.th",
            "fn add(i32 a, i32 b) i32 @extern; fn main() @entry { add(1); }",
            &ast_arena,
        )
        .unwrap();
        let ctx = CompilationContext::new();
        let err = lower_program(program, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongArity);
    }

    // S6: a variadic extern call with extra trailing arguments is fine.
    #[test]
    fn s6_variadic_call_accepts_extra_arguments() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse(
            "test.th",
            "fn printf(String fmt, ...) @extern; fn main() @entry { printf(\"%d %d\\n\", 1, 2); }",
            &ast_arena,
        )
        .unwrap();
        let ctx = CompilationContext::new();
        assert!(lower_program(program, &ctx).is_ok());
    }

    #[test]
    fn empty_program_lowers_with_no_statements_and_no_error() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse("test.th", "", &ast_arena).unwrap();
        let ctx = CompilationContext::new();
        let thir = lower_program(program, &ctx).unwrap();
        match thir {
            ThirNode::Program(p) => assert!(p.statements.is_empty()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn self_call_is_unknown_name_not_recursion() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse("test.th", "fn a() { a(); }", &ast_arena).unwrap();
        let ctx = CompilationContext::new();
        let err = lower_program(program, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownName);
    }

    #[test]
    fn redeclaration_in_same_scope_is_an_error() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse(
            "test.th",
            "fn main() @entry { i32 x = 1; i32 x = 2; }",
            &ast_arena,
        )
        .unwrap();
        let ctx = CompilationContext::new();
        let err = lower_program(program, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Redeclaration);
    }

    #[test]
    fn shadowing_in_nested_block_is_allowed() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse(
            "test.th",
            "fn main() @entry { i32 x = 1; { i32 x = 2; } }",
            &ast_arena,
        )
        .unwrap();
        let ctx = CompilationContext::new();
        assert!(lower_program(program, &ctx).is_ok());
    }

    #[test]
    fn assigning_to_a_non_lvalue_is_not_assignable() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse("test.th", "fn main() @entry { 1 = 2; }", &ast_arena).unwrap();
        let ctx = CompilationContext::new();
        let err = lower_program(program, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAssignable);
    }

    #[test]
    fn calling_a_non_function_symbol_is_not_callable() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse(
            "test.th",
            "fn main() @entry { i32 x = 1; x(); }",
            &ast_arena,
        )
        .unwrap();
        let ctx = CompilationContext::new();
        let err = lower_program(program, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotCallable);
    }
}
