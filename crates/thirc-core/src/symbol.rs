//! Symbol tables: name resolution scopes chained to their parent.
//!
//! A `Scope` holds an ordered list of `Symbol`s declared directly in it.
//! `lookup` walks outward through parents, innermost first, so an inner
//! declaration shadows an outer one of the same name; `insert` only ever
//! checks the scope it is called on, so redeclaring a name in a *nested*
//! scope is shadowing (fine), while redeclaring it in the *same* scope is
//! an error.

use std::cell::{Cell, RefCell};

use thirc_error::{Error, Result, SourceLocation};

use crate::thir::ThirNode;
use crate::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Default)]
pub struct SymIdGen(Cell<u32>);

impl SymIdGen {
    pub fn next(&self) -> SymId {
        let id = self.0.get();
        self.0.set(id + 1);
        SymId(id)
    }
}

#[derive(Default)]
pub struct ScopeIdGen(Cell<u32>);

impl ScopeIdGen {
    pub fn next(&self) -> ScopeId {
        let id = self.0.get();
        self.0.set(id + 1);
        ScopeId(id)
    }
}

/// Binds one name to the THIR node that declared it and its type.
#[derive(Debug)]
pub struct Symbol<'tcx> {
    pub id: SymId,
    pub name: String,
    pub node: ThirNode<'tcx>,
    pub type_id: TypeId,
}

/// One lexical scope: Program (top level), a function body, a nested block,
/// or a struct's member namespace.
#[derive(Debug)]
pub struct Scope<'tcx> {
    pub id: ScopeId,
    pub parent: Option<&'tcx Scope<'tcx>>,
    symbols: RefCell<Vec<&'tcx Symbol<'tcx>>>,
}

impl<'tcx> Scope<'tcx> {
    pub fn new(id: ScopeId, parent: Option<&'tcx Scope<'tcx>>) -> Self {
        Self {
            id,
            parent,
            symbols: RefCell::new(Vec::new()),
        }
    }

    /// Declares `name` in this scope. Errors with `Redeclaration` if the
    /// name already exists in this exact scope; a same-named symbol in an
    /// ancestor scope is shadowed, not rejected.
    pub fn insert(
        &self,
        arena: &'tcx crate::thir::Arena<'tcx>,
        ids: &SymIdGen,
        name: impl Into<String>,
        node: ThirNode<'tcx>,
        type_id: TypeId,
        location: SourceLocation,
    ) -> Result<&'tcx Symbol<'tcx>> {
        let name = name.into();
        if self.symbols.borrow().iter().any(|s| s.name == name) {
            return Err(Error::redeclaration(location, name));
        }
        let symbol = arena.alloc(Symbol {
            id: ids.next(),
            name,
            node,
            type_id,
        });
        self.symbols.borrow_mut().push(symbol);
        Ok(symbol)
    }

    /// Looks up `name` starting in this scope and walking outward through
    /// parents. Returns the innermost match.
    pub fn lookup(&self, name: &str) -> Option<&'tcx Symbol<'tcx>> {
        if let Some(sym) = self.symbols.borrow().iter().find(|s| s.name == name) {
            return Some(*sym);
        }
        self.parent.and_then(|parent| parent.lookup(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_in_nested_scope_is_allowed() {
        // Exercised end-to-end in `lower`'s tests, where real `ThirNode`
        // values exist; here we only check the id generators are monotonic
        // and distinct, since `Scope` itself needs a `ThirArena` to do
        // anything interesting.
        let ids = SymIdGen::default();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
    }
}
