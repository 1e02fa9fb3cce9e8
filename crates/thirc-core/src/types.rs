//! The type table: an append-only, interning store of every type the
//! compiler knows about.
//!
//! Primitives are installed once, at fixed ids, when the table is created.
//! Struct types get a fresh id per declaration (even same-named structs in
//! different, illegal redeclarations — the duplicate is caught later, at
//! symbol insertion, not here). Function types are structurally interned:
//! two declarations with the same return type, parameter types, and
//! variadic flag share one `TypeId`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A stable index into a `TypeTable`. Never reused, never dangling once
/// handed out — the table only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

pub const VOID: TypeId = TypeId(0);
pub const I32: TypeId = TypeId(1);
pub const F32: TypeId = TypeId(2);
pub const STRING: TypeId = TypeId(3);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
pub enum TypeKind {
    Void,
    I32,
    F32,
    String,
    Struct {
        name: String,
        members: RefCell<Vec<(String, TypeId)>>,
    },
    Function {
        return_type: TypeId,
        params: Vec<TypeId>,
        is_varargs: bool,
    },
}

#[derive(Debug)]
pub struct Type {
    pub id: TypeId,
    pub kind: TypeKind,
}

/// Append-only type store, shared by reference-counted handle rather than
/// arena allocation: types are small, cheaply cloned, and need no lifetime
/// tied to the AST or THIR arenas.
#[derive(Debug)]
pub struct TypeTable {
    types: RefCell<Vec<Rc<Type>>>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeTable {
    pub fn new() -> Self {
        let table = Self {
            types: RefCell::new(Vec::new()),
        };
        table.install_primitives();
        table
    }

    /// Installs `Void`, `I32`, `F32`, `String` at ids 0-3, in that order.
    /// A no-op if primitives are already present, so callers don't need to
    /// track whether a table is freshly constructed.
    pub fn install_primitives(&self) {
        if !self.types.borrow().is_empty() {
            return;
        }
        self.push(TypeKind::Void);
        self.push(TypeKind::I32);
        self.push(TypeKind::F32);
        self.push(TypeKind::String);
    }

    fn push(&self, kind: TypeKind) -> TypeId {
        let mut types = self.types.borrow_mut();
        let id = TypeId(types.len() as u32);
        types.push(Rc::new(Type { id, kind }));
        id
    }

    /// Creates a new, empty struct type and returns its id immediately, so
    /// a member whose own type is this same struct (a self-reference
    /// through a would-be-recursive declaration) can still be looked up by
    /// name while its member list is being filled in.
    pub fn create_struct(&self, name: impl Into<String>) -> TypeId {
        self.push(TypeKind::Struct {
            name: name.into(),
            members: RefCell::new(Vec::new()),
        })
    }

    /// Appends one field to a struct type created by `create_struct`.
    /// Panics if `type_id` does not name a struct — a caller bug, since
    /// only `lower_type_decl` ever calls this, immediately after creating
    /// the struct itself.
    pub fn push_struct_member(&self, type_id: TypeId, name: impl Into<String>, member_type: TypeId) {
        let types = self.types.borrow();
        let ty = &types[type_id.0 as usize];
        match &ty.kind {
            TypeKind::Struct { members, .. } => members.borrow_mut().push((name.into(), member_type)),
            other => panic!("push_struct_member on non-struct type: {:?}", other),
        }
    }

    /// Finds an existing function type with the same return type,
    /// parameter types, and variadic flag, or creates one. Returns
    /// `(id, true)` when a new type was created.
    ///
    /// All three fields must match for two declarations to share a type —
    /// matching only parameters and the variadic flag (or only the
    /// parameters alone) would merge functions that differ in return type.
    pub fn find_or_create_function(
        &self,
        return_type: TypeId,
        params: Vec<TypeId>,
        is_varargs: bool,
    ) -> (TypeId, bool) {
        for ty in self.types.borrow().iter() {
            if let TypeKind::Function {
                return_type: rt,
                params: ps,
                is_varargs: va,
            } = &ty.kind
            {
                if *rt == return_type && *ps == params && *va == is_varargs {
                    return (ty.id, false);
                }
            }
        }
        let id = self.push(TypeKind::Function {
            return_type,
            params,
            is_varargs,
        });
        (id, true)
    }

    /// Resolves a type name as written in source: the four primitive
    /// spellings, or a declared struct name.
    pub fn find_by_name(&self, name: &str) -> Option<TypeId> {
        match name {
            "void" => return Some(VOID),
            "i32" => return Some(I32),
            "f32" => return Some(F32),
            "String" => return Some(STRING),
            _ => {}
        }
        self.types.borrow().iter().find_map(|ty| match &ty.kind {
            TypeKind::Struct { name: n, .. } if n == name => Some(ty.id),
            _ => None,
        })
    }

    /// Bounds-checked lookup. Panics on an out-of-range id: every `TypeId`
    /// in circulation was handed out by this same table and the table never
    /// shrinks, so an out-of-range id is a compiler bug, not a user error.
    pub fn get(&self, id: TypeId) -> Rc<Type> {
        self.types
            .borrow()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| panic!("type id {} out of bounds", id.0))
    }

    pub fn get_member_index(&self, type_id: TypeId, name: &str) -> Option<usize> {
        let ty = self.get(type_id);
        match &ty.kind {
            TypeKind::Struct { members, .. } => members.borrow().iter().position(|(n, _)| n == name),
            _ => None,
        }
    }

    /// A short, human-readable rendering of a type, used in diagnostics and
    /// by the pretty-printer. Not a stable wire format.
    pub fn describe(&self, id: TypeId) -> String {
        let ty = self.get(id);
        match &ty.kind {
            TypeKind::Void => "void".to_string(),
            TypeKind::I32 => "i32".to_string(),
            TypeKind::F32 => "f32".to_string(),
            TypeKind::String => "String".to_string(),
            TypeKind::Struct { name, .. } => name.clone(),
            TypeKind::Function {
                return_type,
                params,
                is_varargs,
            } => {
                let mut parts: Vec<String> = params.iter().map(|p| self.describe(*p)).collect();
                if *is_varargs {
                    parts.push("...".to_string());
                }
                format!("fn({}) {}", parts.join(", "), self.describe(*return_type))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_get_fixed_ids_in_order() {
        let table = TypeTable::new();
        assert_eq!(table.find_by_name("void"), Some(VOID));
        assert_eq!(table.find_by_name("i32"), Some(I32));
        assert_eq!(table.find_by_name("f32"), Some(F32));
        assert_eq!(table.find_by_name("String"), Some(STRING));
        assert_eq!(VOID.0, 0);
        assert_eq!(I32.0, 1);
        assert_eq!(F32.0, 2);
        assert_eq!(STRING.0, 3);
    }

    #[test]
    fn install_primitives_is_idempotent() {
        let table = TypeTable::new();
        table.install_primitives();
        table.install_primitives();
        assert_eq!(table.types.borrow().len(), 4);
    }

    #[test]
    fn struct_members_fill_in_after_creation() {
        let table = TypeTable::new();
        let id = table.create_struct("Vector_2");
        assert_eq!(table.get_member_index(id, "x"), None);
        table.push_struct_member(id, "x", I32);
        table.push_struct_member(id, "y", I32);
        assert_eq!(table.get_member_index(id, "x"), Some(0));
        assert_eq!(table.get_member_index(id, "y"), Some(1));
        assert_eq!(table.find_by_name("Vector_2"), Some(id));
    }

    #[test]
    fn function_interning_requires_all_three_fields_to_match() {
        let table = TypeTable::new();
        let (f1, created1) = table.find_or_create_function(I32, vec![I32, I32], false);
        assert!(created1);
        let (f2, created2) = table.find_or_create_function(I32, vec![I32, I32], false);
        assert_eq!(f1, f2);
        assert!(!created2);

        // Same params and variadic flag, different return type: must NOT merge.
        let (f3, created3) = table.find_or_create_function(F32, vec![I32, I32], false);
        assert!(created3);
        assert_ne!(f1, f3);

        // Same return type and params, different variadic flag: must NOT merge.
        let (f4, created4) = table.find_or_create_function(I32, vec![I32, I32], true);
        assert!(created4);
        assert_ne!(f1, f4);
    }

    #[test]
    fn describe_renders_struct_and_function_types() {
        let table = TypeTable::new();
        let vec2 = table.create_struct("Vector_2");
        table.push_struct_member(vec2, "x", I32);
        assert_eq!(table.describe(vec2), "Vector_2");
        let (printf, _) = table.find_or_create_function(VOID, vec![STRING], true);
        assert_eq!(table.describe(printf), "fn(String, ...) void");
    }
}
