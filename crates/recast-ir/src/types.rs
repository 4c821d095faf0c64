//! Resolved type descriptors attached to expression nodes.
//!
//! Descriptors come from the front end's type resolution. The engine only
//! reads them; a missing descriptor means "unknown" and every rule that
//! needs one declines.

use std::collections::HashMap;

use cranelift_entity::PrimaryMap;
use smallvec::SmallVec;

use crate::refs::TypeRef;
use crate::symbol::Symbol;

/// Coarse classification of a resolved type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `int`, `boolean`, `char`, `double`, ...
    Primitive,
    /// Boxed wrapper of a primitive (`java.lang.Integer`, ...).
    Boxed,
    /// An enum type; case labels of this type are enum constants.
    Enum,
    /// Any other class or interface type.
    Class,
    /// Array type; `name` is the element type followed by `[]`.
    Array,
}

/// A resolved type: canonical name, classification, and the canonical
/// names of every supertype the front end chose to report.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    pub name: Symbol,
    pub kind: TypeKind,
    pub supertypes: SmallVec<[Symbol; 4]>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<Symbol>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supertypes: SmallVec::new(),
        }
    }

    pub fn primitive(name: &'static str) -> Self {
        Self::new(name, TypeKind::Primitive)
    }

    pub fn boxed(name: &'static str) -> Self {
        Self::new(name, TypeKind::Boxed)
    }

    pub fn enumeration(name: impl Into<Symbol>) -> Self {
        Self::new(name, TypeKind::Enum)
    }

    pub fn class(name: impl Into<Symbol>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn array(name: impl Into<Symbol>) -> Self {
        Self::new(name, TypeKind::Array)
    }

    pub fn with_supertypes(mut self, supers: impl IntoIterator<Item = &'static str>) -> Self {
        self.supertypes.extend(supers.into_iter().map(Symbol::new));
        self
    }

    /// `true` if this type is `name` or reports `name` as a supertype.
    pub fn is_subtype_of(&self, name: &str) -> bool {
        self.name == name || self.supertypes.iter().any(|s| *s == name)
    }

    /// `true` if the type is one of the given canonical names.
    pub fn is_one_of(&self, names: &[&str]) -> bool {
        self.name.with_str(|n| names.contains(&n))
    }

    /// Last segment of the canonical name (`java.util.List` → `List`).
    pub fn simple_name(&self) -> String {
        self.name
            .with_str(|n| n.rsplit('.').next().unwrap_or(n).to_owned())
    }
}

/// Deduplicating type interner. Same descriptor always yields the same `TypeRef`.
pub struct TypeInterner {
    types: PrimaryMap<TypeRef, TypeDescriptor>,
    dedup: HashMap<TypeDescriptor, TypeRef>,
}

impl TypeInterner {
    pub fn new() -> Self {
        Self {
            types: PrimaryMap::new(),
            dedup: HashMap::default(),
        }
    }

    /// Intern a descriptor, returning the existing ref if it was seen before.
    pub fn intern(&mut self, data: TypeDescriptor) -> TypeRef {
        if let Some(&existing) = self.dedup.get(&data) {
            return existing;
        }
        let r = self.types.push(data.clone());
        self.dedup.insert(data, r);
        r
    }

    pub fn get(&self, r: TypeRef) -> &TypeDescriptor {
        &self.types[r]
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner_dedup() {
        let mut interner = TypeInterner::new();
        let r1 = interner.intern(TypeDescriptor::boxed("java.lang.Integer"));
        let r2 = interner.intern(TypeDescriptor::boxed("java.lang.Integer"));
        assert_eq!(r1, r2, "same descriptor must yield same TypeRef");
        let r3 = interner.intern(TypeDescriptor::primitive("int"));
        assert_ne!(r1, r3);
    }

    #[test]
    fn subtype_queries() {
        let list = TypeDescriptor::class("java.util.ArrayList")
            .with_supertypes(["java.util.List", "java.util.Collection"]);
        assert!(list.is_subtype_of("java.util.Collection"));
        assert!(list.is_subtype_of("java.util.ArrayList"));
        assert!(!list.is_subtype_of("java.util.Map"));
        assert_eq!(list.simple_name(), "ArrayList");
    }
}
