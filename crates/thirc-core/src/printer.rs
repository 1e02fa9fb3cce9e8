//! A structural, indented dump of a THIR tree. Purely diagnostic — the
//! backend never calls this, and nothing here affects lowering.

use std::fmt::Write as _;

use crate::thir::ThirNode;
use crate::types::TypeTable;

pub fn pretty_print(root: &ThirNode<'_>, types: &TypeTable) -> String {
    let mut out = String::new();
    write_node(&mut out, root, types, 0);
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn write_node(out: &mut String, node: &ThirNode<'_>, types: &TypeTable, depth: usize) {
    indent(out, depth);
    match node {
        ThirNode::Program(p) => {
            let _ = writeln!(out, "Program");
            for stmt in &p.statements {
                write_node(out, stmt, types, depth + 1);
            }
        }
        ThirNode::Block(b) => {
            let _ = writeln!(out, "Block: {}", types.describe(b.type_id));
            for stmt in &b.stmts {
                write_node(out, stmt, types, depth + 1);
            }
        }
        ThirNode::Binary(b) => {
            let _ = writeln!(out, "Binary({:?}): {}", b.op, types.describe(b.type_id));
            write_node(out, &b.left, types, depth + 1);
            write_node(out, &b.right, types, depth + 1);
        }
        ThirNode::Call(c) => {
            let _ = writeln!(
                out,
                "Call({}): {}",
                c.callee.kind_name(),
                types.describe(c.type_id)
            );
            for arg in &c.args {
                write_node(out, arg, types, depth + 1);
            }
        }
        ThirNode::MemberAccess(m) => {
            let _ = writeln!(
                out,
                "MemberAccess(.{}, #{}): {}",
                m.member,
                m.member_index,
                types.describe(m.type_id)
            );
            write_node(out, &m.base, types, depth + 1);
        }
        ThirNode::Identifier(i) => {
            let _ = writeln!(out, "Identifier({}): {}", i.name, types.describe(i.type_id));
        }
        ThirNode::Number(n) => {
            let _ = writeln!(out, "Number({}): {}", n.value, types.describe(n.type_id));
        }
        ThirNode::String(s) => {
            let _ = writeln!(out, "String({:?}): {}", s.value, types.describe(s.type_id));
        }
        ThirNode::Return(r) => {
            let _ = writeln!(out, "Return");
            if let Some(expr) = &r.expr {
                write_node(out, expr, types, depth + 1);
            }
        }
        ThirNode::Function(f) => {
            let _ = writeln!(
                out,
                "Function({}{}{}): {}",
                f.name,
                if f.is_extern { " @extern" } else { "" },
                if f.is_entry { " @entry" } else { "" },
                types.describe(f.type_id)
            );
            if let Some(body) = &f.body {
                write_node(out, body, types, depth + 1);
            }
        }
        ThirNode::TypeDecl(t) => {
            let _ = writeln!(out, "TypeDecl({})", t.name);
            for (name, type_id) in &t.members {
                indent(out, depth + 1);
                let _ = writeln!(out, "{}: {}", name, types.describe(*type_id));
            }
        }
        ThirNode::VarDecl(v) => {
            let _ = writeln!(out, "VarDecl({}): {}", v.name, types.describe(v.type_id));
            if let Some(value) = &v.value {
                write_node(out, value, types, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilationContext;
    use crate::lower::lower_program;
    use thirc_syntax::ast::Arena as AstArena;

    #[test]
    fn pretty_print_contains_each_top_level_name() {
        let ast_arena = AstArena::default();
        let program = thirc_syntax::parse(
            "test.th",
            "type Vector_2 ( i32 x, i32 y ); fn main() @entry { Vector_2 v; }",
            &ast_arena,
        )
        .unwrap();
        let ctx = CompilationContext::new();
        let thir = lower_program(program, &ctx).unwrap();
        let out = pretty_print(&thir, &ctx.types);
        assert!(out.contains("Vector_2"));
        assert!(out.contains("Function(main @entry)"));
        assert!(out.contains("VarDecl(v)"));
    }
}
