//! Tree-building helpers for tests.
//!
//! Stands in for the front end: hands out stable bindings per variable name
//! and remembers declared types, so fixtures read close to the source they
//! model.

use std::collections::HashMap;

use cranelift_entity::EntityRef;

use crate::context::{Child, TreeContext};
use crate::refs::{BindingId, NodeRef, TypeRef};
use crate::symbol::Symbol;
use crate::types::{TypeDescriptor, TypeKind};

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double",
];

#[derive(Default)]
pub struct TreeFixture {
    pub ctx: TreeContext,
    bindings: HashMap<&'static str, BindingId>,
    var_types: HashMap<&'static str, TypeRef>,
}

impl TreeFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// The binding for `name`; the same name always resolves to the same entity.
    pub fn binding(&mut self, name: &'static str) -> BindingId {
        let next = self.bindings.len();
        *self
            .bindings
            .entry(name)
            .or_insert_with(|| BindingId::new(next))
    }

    /// Intern a type by canonical name: primitives by their keyword, anything
    /// else as a class.
    pub fn ty(&mut self, name: &'static str) -> TypeRef {
        let kind = if PRIMITIVES.contains(&name) {
            TypeKind::Primitive
        } else {
            TypeKind::Class
        };
        self.ctx.intern_type(TypeDescriptor::new(name, kind))
    }

    /// Record the type of variable `name`; later `var(name)` nodes carry it.
    pub fn declare(&mut self, name: &'static str, descriptor: TypeDescriptor) -> TypeRef {
        let ty = self.ctx.intern_type(descriptor);
        self.var_types.insert(name, ty);
        ty
    }

    /// A resolved reference to variable `name`.
    pub fn var(&mut self, name: &'static str) -> NodeRef {
        let binding = self.binding(name);
        let ty = self.var_types.get(name).copied();
        self.ctx.name(name, Some(binding), ty)
    }

    /// `declare` followed by `var`.
    pub fn typed_var(&mut self, name: &'static str, descriptor: TypeDescriptor) -> NodeRef {
        self.declare(name, descriptor);
        self.var(name)
    }

    /// A reference the front end could not resolve.
    pub fn unresolved(&mut self, name: &'static str) -> NodeRef {
        self.ctx.name(name, None, None)
    }

    /// `type name = init;`
    pub fn decl(
        &mut self,
        name: &'static str,
        type_name: &'static str,
        init: Option<Child>,
    ) -> NodeRef {
        let ty = self.ty(type_name);
        self.var_types.insert(name, ty);
        let binding = self.binding(name);
        self.ctx.var_decl(name, Some(binding), Some(ty), init)
    }

    /// `receiver.name(args)`
    pub fn method(&mut self, receiver: NodeRef, name: &'static str, args: Vec<Child>) -> NodeRef {
        self.ctx.call(Some(receiver.into()), Symbol::new(name), args)
    }

    /// `name(args);`
    pub fn call_stmt(&mut self, name: &'static str, args: Vec<Child>) -> NodeRef {
        let call = self.ctx.call(None, name, args);
        self.ctx.expr_stmt(call)
    }
}
