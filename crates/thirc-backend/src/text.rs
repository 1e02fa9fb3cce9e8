//! `TextIrBackend`: a readable, deterministic SSA-like text dump.
//!
//! This is the one concrete `Backend` this repository ships. It is not a
//! real code generator — no registers are allocated, no instructions are
//! scheduled — but it walks the THIR exactly the way a real backend would:
//! top-level statements in order, `TypeTable::get` for every type it
//! renders, and the non-null `Identifier`/`Call` back-references the
//! generator in `thirc-core` guarantees. Good enough to prove the THIR is
//! complete and to snapshot-test against.

use std::fmt::Write as _;

use thirc_core::thir::{BinaryOp, ThirNode};
use thirc_core::TypeTable;
use thirc_error::Result;

use crate::Backend;

/// Whether to optimize the emitted IR. The shipped backend accepts this but
/// does not act on it — optimization passes are out of scope (§1) — a real
/// backend would use it to pick an LLVM `OptimizationLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLevel {
    #[default]
    Debug,
    Release,
}

#[derive(Debug, Default)]
pub struct TextIrBackend {
    pub opt_level: OptLevel,
}

impl TextIrBackend {
    pub fn new(opt_level: OptLevel) -> Self {
        Self { opt_level }
    }
}

impl Backend for TextIrBackend {
    fn emit(&self, program: &ThirNode<'_>, types: &TypeTable) -> Result<String> {
        let ThirNode::Program(program) = program else {
            unreachable!("Backend::emit is only ever called with the THIR root");
        };
        let mut out = String::new();
        let _ = writeln!(out, "; thirc text IR ({:?})", self.opt_level);
        for stmt in &program.statements {
            emit_top_level(&mut out, stmt, types);
        }
        Ok(out)
    }
}

fn emit_top_level(out: &mut String, node: &ThirNode<'_>, types: &TypeTable) {
    match node {
        ThirNode::TypeDecl(t) => {
            let _ = writeln!(out, "%{} = type {{", t.name);
            for (name, type_id) in &t.members {
                let _ = writeln!(out, "  {}: {},", name, types.describe(*type_id));
            }
            let _ = writeln!(out, "}}");
        }
        ThirNode::Function(f) => {
            let linkage = if f.is_extern { "declare" } else { "define" };
            let params: Vec<String> = f
                .params
                .iter()
                .map(|(name, type_id)| format!("{} %{}", types.describe(*type_id), name))
                .collect();
            let varargs = if f.is_varargs { ", ..." } else { "" };
            let entry = if f.is_entry { " entry" } else { "" };
            let _ = writeln!(
                out,
                "{} @{}({}{}) -> {}{} {{",
                linkage,
                f.name,
                params.join(", "),
                varargs,
                types.describe(f.type_id),
                entry,
            );
            if let Some(body) = &f.body {
                let mut counter = 0usize;
                emit_stmt(out, body, types, &mut counter, 1);
            }
            let _ = writeln!(out, "}}");
        }
        other => unreachable!("non-declaration THIR node at top level: {}", other.kind_name()),
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn emit_stmt(out: &mut String, node: &ThirNode<'_>, types: &TypeTable, counter: &mut usize, depth: usize) {
    match node {
        ThirNode::Block(b) => {
            for stmt in &b.stmts {
                emit_stmt(out, stmt, types, counter, depth);
            }
        }
        ThirNode::VarDecl(v) => {
            indent(out, depth);
            match &v.value {
                Some(value) => {
                    let rhs = emit_value(out, value, types, counter, depth);
                    let _ = writeln!(out, "%{} = alloca {} ; = {}", v.name, types.describe(v.type_id), rhs);
                }
                None => {
                    let _ = writeln!(out, "%{} = alloca {}", v.name, types.describe(v.type_id));
                }
            }
        }
        ThirNode::Return(r) => {
            indent(out, depth);
            match &r.expr {
                Some(expr) => {
                    let value = emit_value(out, expr, types, counter, depth);
                    let _ = writeln!(out, "ret {}", value);
                }
                None => {
                    let _ = writeln!(out, "ret void");
                }
            }
        }
        expr => {
            indent(out, depth);
            let value = emit_value(out, expr, types, counter, depth);
            let _ = writeln!(out, "{}", value);
        }
    }
}

/// Renders an expression to a value reference, emitting any intermediate
/// `%tN = ...` lines it needs along the way.
fn emit_value(out: &mut String, node: &ThirNode<'_>, types: &TypeTable, counter: &mut usize, depth: usize) -> String {
    match node {
        ThirNode::Number(n) => n.value.to_string(),
        ThirNode::String(s) => format!("{:?}", s.value),
        ThirNode::Identifier(i) => format!("%{}", i.name),
        ThirNode::MemberAccess(m) => {
            let base = emit_value(out, &m.base, types, counter, depth);
            format!("{}.{}", base, m.member)
        }
        ThirNode::Call(c) => {
            let callee_name = match c.callee {
                ThirNode::Function(f) => f.name.clone(),
                other => other.kind_name().to_string(),
            };
            let args: Vec<String> = c
                .args
                .iter()
                .map(|a| emit_value(out, a, types, counter, depth))
                .collect();
            let tmp = next_temp(counter);
            indent(out, depth);
            let _ = writeln!(
                out,
                "{} = call {} @{}({})",
                tmp,
                types.describe(c.type_id),
                callee_name,
                args.join(", ")
            );
            tmp
        }
        ThirNode::Binary(b) if b.op == BinaryOp::Assign => {
            let lhs = emit_value(out, &b.left, types, counter, depth);
            let rhs = emit_value(out, &b.right, types, counter, depth);
            indent(out, depth);
            let _ = writeln!(out, "store {}, {}", rhs, lhs);
            lhs
        }
        ThirNode::Binary(b) => {
            let lhs = emit_value(out, &b.left, types, counter, depth);
            let rhs = emit_value(out, &b.right, types, counter, depth);
            let tmp = next_temp(counter);
            indent(out, depth);
            let _ = writeln!(out, "{} = {} {}, {}", tmp, op_mnemonic(b.op), lhs, rhs);
            tmp
        }
        other => unreachable!("{} cannot appear in value position", other.kind_name()),
    }
}

fn next_temp(counter: &mut usize) -> String {
    let tmp = format!("%t{}", counter);
    *counter += 1;
    tmp
}

fn op_mnemonic(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "div",
        BinaryOp::Eq => "eq",
        BinaryOp::Assign => unreachable!("assign is handled separately"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirc_core::context::CompilationContext;
    use thirc_core::lower_program;
    use thirc_syntax::ast::Arena as AstArena;

    fn emit(src: &str) -> String {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse("test.th", src, &ast_arena).unwrap();
        let ctx = CompilationContext::new();
        let thir = lower_program(program, &ctx).unwrap();
        TextIrBackend::default().emit(&thir, &ctx.types).unwrap()
    }

    #[test]
    fn emits_extern_declaration_and_entry_definition() {
        let out = emit("fn b() i32 @extern; fn main() @entry { b(); }");
        assert!(out.contains("declare @b() -> i32"));
        assert!(out.contains("define @main() -> void entry"));
        assert!(out.contains("call i32 @b()"));
    }

    #[test]
    fn emits_struct_type_with_members_in_order() {
        let out = emit("type Vector_2 ( i32 x, i32 y ); fn main() @entry {}");
        let lines: Vec<&str> = out.lines().collect();
        let type_line = lines.iter().position(|l| l.contains("%Vector_2")).unwrap();
        assert_eq!(lines[type_line + 1].trim(), "x: i32,");
        assert_eq!(lines[type_line + 2].trim(), "y: i32,");
    }

    #[test]
    fn emission_is_deterministic() {
        let src = "type Vector_2 ( i32 x, i32 y ); \
                   fn main() @entry { Vector_2 v; v.x = 1; }";
        assert_eq!(emit(src), emit(src));
    }

    #[test]
    fn rejects_nothing_on_member_assignment_and_read() {
        let out = emit(
            "type Vector_3 ( i32 x, i32 y, i32 z ); \
             fn printf(String fmt, ...) @extern; \
             fn main() @entry { Vector_3 v; v.z = 100; printf(\"v.z = '%d'\\n\", v.z); }",
        );
        assert!(out.contains("store 100, %v.z"));
    }
}
