//! The dependency graph: one node per top-level declaration, edges pointing
//! at the declarations it must be lowered after.
//!
//! Building the graph never fails on an unresolved name — an edge is only
//! added when the referenced name is found in the flat top-level index;
//! anything else (an unknown local variable, a genuinely undeclared name)
//! is left for the generator to report as `UnknownName` once it actually
//! tries to resolve it. This builder's only job is ordering, not
//! validation.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use thirc_syntax::ast::{AstId, AstNode, FunctionDecl, Program, TypeDecl};
use thirc_syntax::declare_arena;

declare_arena!([dep_node: DepNode<'tcx>]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepState {
    #[default]
    Unresolved,
    Resolving,
    Resolved,
    Errored,
}

/// One node in the dependency graph, wrapping exactly one top-level
/// `FunctionDecl` or `TypeDecl` AST node.
#[derive(Debug)]
pub struct DepNode<'tcx> {
    pub ast: AstNode<'tcx>,
    pub state: Cell<DepState>,
    pub dependencies: RefCell<Vec<&'tcx DepNode<'tcx>>>,
}

impl<'tcx> DepNode<'tcx> {
    pub fn name(&self) -> &str {
        match self.ast {
            AstNode::FunctionDecl(f) => &f.name,
            AstNode::TypeDecl(t) => &t.name,
            _ => "<unknown>",
        }
    }
}

/// Content-addresses `DepNode`s by the `AstId` of the declaration they
/// wrap, so two requests for the same declaration always yield the same
/// node.
#[derive(Default)]
pub struct DepNodeRegistry<'tcx> {
    by_ast_id: RefCell<HashMap<AstId, &'tcx DepNode<'tcx>>>,
}

impl<'tcx> DepNodeRegistry<'tcx> {
    pub fn get_or_create(&self, arena: &'tcx Arena<'tcx>, ast: AstNode<'tcx>) -> &'tcx DepNode<'tcx> {
        if let Some(existing) = self.by_ast_id.borrow().get(&ast.id()) {
            return *existing;
        }
        let node = arena.alloc(DepNode {
            ast,
            state: Cell::new(DepState::Unresolved),
            dependencies: RefCell::new(Vec::new()),
        });
        self.by_ast_id.borrow_mut().insert(ast.id(), node);
        node
    }

    /// Adds `to` as a dependency of `from`, rejecting self-loops (a
    /// declaration cannot depend on itself — see `lower`'s module doc
    /// comment on why that also rules out recursion) and duplicate edges.
    pub fn add_dependency(&self, from: &'tcx DepNode<'tcx>, to: &'tcx DepNode<'tcx>) {
        if from.ast.id() == to.ast.id() {
            return;
        }
        let mut deps = from.dependencies.borrow_mut();
        if !deps.iter().any(|d| d.ast.id() == to.ast.id()) {
            deps.push(to);
        }
    }
}

/// The full graph: one root per top-level declaration, in source order.
pub struct DepGraph<'tcx> {
    roots: Vec<&'tcx DepNode<'tcx>>,
}

impl<'tcx> DepGraph<'tcx> {
    pub fn roots(&self) -> &[&'tcx DepNode<'tcx>] {
        &self.roots
    }
}

fn is_builtin_type_name(name: &str) -> bool {
    matches!(name, "void" | "i32" | "f32" | "String")
}

/// Builds the dependency graph for `program`: one root per top-level
/// declaration and edges per the type/call references each one makes to
/// another top-level declaration.
pub fn build_dep_graph<'tcx>(
    program: &'tcx Program<'tcx>,
    arena: &'tcx Arena<'tcx>,
    registry: &DepNodeRegistry<'tcx>,
) -> DepGraph<'tcx> {
    let mut index: HashMap<String, AstNode<'tcx>> = HashMap::new();
    for decl in &program.decls {
        let name = match decl {
            AstNode::FunctionDecl(f) => f.name.clone(),
            AstNode::TypeDecl(t) => t.name.clone(),
            _ => continue,
        };
        index.entry(name).or_insert(*decl);
    }

    let mut roots = Vec::with_capacity(program.decls.len());
    for decl in &program.decls {
        let node = registry.get_or_create(arena, *decl);
        roots.push(node);
        match *decl {
            AstNode::TypeDecl(t) => walk_type_decl(t, &index, arena, registry, node),
            AstNode::FunctionDecl(f) => walk_function_decl(f, &index, arena, registry, node),
            _ => {}
        }
    }

    DepGraph { roots }
}

fn link_by_name<'tcx>(
    name: &str,
    index: &HashMap<String, AstNode<'tcx>>,
    arena: &'tcx Arena<'tcx>,
    registry: &DepNodeRegistry<'tcx>,
    from: &'tcx DepNode<'tcx>,
) {
    if is_builtin_type_name(name) {
        return;
    }
    if let Some(target) = index.get(name) {
        let to = registry.get_or_create(arena, *target);
        registry.add_dependency(from, to);
    }
}

fn walk_type_decl<'tcx>(
    t: &'tcx TypeDecl<'tcx>,
    index: &HashMap<String, AstNode<'tcx>>,
    arena: &'tcx Arena<'tcx>,
    registry: &DepNodeRegistry<'tcx>,
    from: &'tcx DepNode<'tcx>,
) {
    for member in &t.members {
        link_by_name(&member.type_name, index, arena, registry, from);
    }
}

fn walk_function_decl<'tcx>(
    f: &'tcx FunctionDecl<'tcx>,
    index: &HashMap<String, AstNode<'tcx>>,
    arena: &'tcx Arena<'tcx>,
    registry: &DepNodeRegistry<'tcx>,
    from: &'tcx DepNode<'tcx>,
) {
    for param in &f.params {
        if param.is_variadic {
            continue;
        }
        link_by_name(&param.type_name, index, arena, registry, from);
    }
    if let Some(return_type_name) = &f.return_type_name {
        link_by_name(return_type_name, index, arena, registry, from);
    }
    if let Some(body) = f.body {
        walk_block_edges(body, index, arena, registry, from);
    }
}

fn walk_block_edges<'tcx>(
    block: &'tcx thirc_syntax::ast::Block<'tcx>,
    index: &HashMap<String, AstNode<'tcx>>,
    arena: &'tcx Arena<'tcx>,
    registry: &DepNodeRegistry<'tcx>,
    from: &'tcx DepNode<'tcx>,
) {
    for stmt in &block.stmts {
        walk_node_edges(*stmt, index, arena, registry, from);
    }
}

/// Recurses through statements and expressions collecting edges. Never
/// descends into another `FunctionDecl` or `TypeDecl` — the grammar never
/// nests one inside a block, so this falls out of the AST shape rather than
/// needing an explicit guard.
fn walk_node_edges<'tcx>(
    node: AstNode<'tcx>,
    index: &HashMap<String, AstNode<'tcx>>,
    arena: &'tcx Arena<'tcx>,
    registry: &DepNodeRegistry<'tcx>,
    from: &'tcx DepNode<'tcx>,
) {
    match node {
        AstNode::Call(call) => {
            link_by_name(&call.name, index, arena, registry, from);
            for arg in &call.args {
                walk_node_edges(*arg, index, arena, registry, from);
            }
        }
        AstNode::Binary(bin) => {
            walk_node_edges(bin.left, index, arena, registry, from);
            walk_node_edges(bin.right, index, arena, registry, from);
        }
        AstNode::MemberAccess(access) => {
            walk_node_edges(access.base, index, arena, registry, from);
        }
        AstNode::Return(ret) => {
            if let Some(expr) = ret.expr {
                walk_node_edges(expr, index, arena, registry, from);
            }
        }
        AstNode::VarDecl(var) => {
            link_by_name(&var.type_name, index, arena, registry, from);
            if let Some(value) = var.value {
                walk_node_edges(value, index, arena, registry, from);
            }
        }
        AstNode::Block(block) => {
            walk_block_edges(block, index, arena, registry, from);
        }
        AstNode::Identifier(_) | AstNode::Number(_) | AstNode::String(_) => {}
        AstNode::Program(_) | AstNode::FunctionDecl(_) | AstNode::TypeDecl(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirc_syntax::ast::Arena as AstArena;

    fn build<'tcx>(
        src: &str,
        ast_arena: &'tcx AstArena<'tcx>,
        dep_arena: &'tcx Arena<'tcx>,
        registry: &DepNodeRegistry<'tcx>,
    ) -> DepGraph<'tcx> {
        let program = thirc_syntax::parse("test.th", src, ast_arena).unwrap();
        build_dep_graph(program, dep_arena, registry)
    }

    #[test]
    fn forward_reference_creates_an_edge_regardless_of_declaration_order() {
        let ast_arena = AstArena::default();
        let dep_arena = Arena::default();
        let registry = DepNodeRegistry::default();
        let graph = build(
            "fn a() { b(); } fn b() i32 @extern; fn main() @entry { a(); }",
            &ast_arena,
            &dep_arena,
            &registry,
        );
        assert_eq!(graph.roots().len(), 3);
        let a = graph.roots()[0];
        assert_eq!(a.name(), "a");
        assert_eq!(a.dependencies.borrow().len(), 1);
        assert_eq!(a.dependencies.borrow()[0].name(), "b");
    }

    #[test]
    fn mutual_calls_create_reciprocal_edges() {
        let ast_arena = AstArena::default();
        let dep_arena = Arena::default();
        let registry = DepNodeRegistry::default();
        let graph = build(
            "fn a() { b(); } fn b() { a(); }",
            &ast_arena,
            &dep_arena,
            &registry,
        );
        let a = graph.roots()[0];
        let b = graph.roots()[1];
        assert_eq!(a.dependencies.borrow()[0].name(), "b");
        assert_eq!(b.dependencies.borrow()[0].name(), "a");
    }

    #[test]
    fn unresolved_name_adds_no_edge_and_does_not_fail_the_build() {
        let ast_arena = AstArena::default();
        let dep_arena = Arena::default();
        let registry = DepNodeRegistry::default();
        let graph = build(
            "fn a() { ghost(); }",
            &ast_arena,
            &dep_arena,
            &registry,
        );
        assert_eq!(graph.roots()[0].dependencies.borrow().len(), 0);
    }

    #[test]
    fn struct_member_of_another_struct_creates_an_edge() {
        let ast_arena = AstArena::default();
        let dep_arena = Arena::default();
        let registry = DepNodeRegistry::default();
        let graph = build(
            "type Inner ( i32 x ); type Outer ( Inner inner );",
            &ast_arena,
            &dep_arena,
            &registry,
        );
        let outer = graph.roots()[1];
        assert_eq!(outer.name(), "Outer");
        assert_eq!(outer.dependencies.borrow()[0].name(), "Inner");
    }
}
