//! `CompilationContext`: the one mutable-state bundle threaded through a
//! single compilation.
//!
//! There is no global or thread-local state anywhere in this crate — every
//! function that needs the type table, an arena, or an id generator takes
//! it as an explicit argument (directly, or via this bundle). That makes a
//! second, fully independent compilation in the same process just another
//! `CompilationContext::new()`, with no cross-talk possible.

use crate::dep_graph::{Arena as DepArena, DepNodeRegistry};
use crate::symbol::{Scope, ScopeId, ScopeIdGen, SymIdGen};
use crate::thir::Arena as ThirArena;
use crate::types::TypeTable;

pub struct CompilationContext<'tcx> {
    pub types: TypeTable,
    pub dep_arena: DepArena<'tcx>,
    pub thir_arena: ThirArena<'tcx>,
    pub dep_registry: DepNodeRegistry<'tcx>,
    sym_ids: SymIdGen,
    scope_ids: ScopeIdGen,
}

impl<'tcx> Default for CompilationContext<'tcx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'tcx> CompilationContext<'tcx> {
    pub fn new() -> Self {
        Self {
            types: TypeTable::new(),
            dep_arena: DepArena::default(),
            thir_arena: ThirArena::default(),
            dep_registry: DepNodeRegistry::default(),
            sym_ids: SymIdGen::default(),
            scope_ids: ScopeIdGen::default(),
        }
    }

    pub fn sym_ids(&self) -> &SymIdGen {
        &self.sym_ids
    }

    /// Allocates a fresh scope chained to `parent`.
    pub fn new_scope(&'tcx self, parent: Option<&'tcx Scope<'tcx>>) -> &'tcx Scope<'tcx> {
        let id: ScopeId = self.scope_ids.next();
        self.thir_arena.alloc(Scope::new(id, parent))
    }
}
