//! `new Hashtable()` → `new HashMap()` where the table never escapes.
//!
//! A table created as the receiver of a call is replaced in place. A table
//! stored in a local declared as `Hashtable` is replaced together with the
//! declaration, provided every later use of the local (and of any
//! `Hashtable` local initialized from it) only calls methods on it. Anything
//! else (an interface-typed local, returning the table, passing it along,
//! reassigning the local) may rely on the synchronized class and declines.

use std::collections::HashSet;
use std::ops::ControlFlow;

use recast_ir::walk::walk_node;
use recast_ir::{
    BindingId, Child, NodeKind, NodeRef, RewriteRule, Rewriter, Symbol, TreeContext,
    TypeDescriptor, TypeRef, WalkAction,
};
use tracing::{debug, trace};

const HASHTABLE: &str = "java.util.Hashtable";

/// `Hashtable` methods `HashMap` does not have.
const HASHTABLE_ONLY: &[&str] = &["contains", "elements", "keys", "rehash"];

pub struct HashMapRatherThanHashtable;

impl HashMapRatherThanHashtable {
    pub const NAME: &'static str = "HashMapRatherThanHashtable";
}

impl RewriteRule for HashMapRatherThanHashtable {
    fn match_and_rewrite(
        &self,
        ctx: &mut TreeContext,
        node: NodeRef,
        rewriter: &mut Rewriter,
    ) -> WalkAction {
        match ctx.kind(node) {
            NodeKind::VarDecl {
                binding: Some(binding),
                init: Some(init),
                ..
            } if is_hashtable(ctx, node) && is_hashtable_creation(ctx, *init) => {
                let (binding, init) = (*binding, *init);
                rewrite_local(ctx, rewriter, node, binding, init)
            }
            NodeKind::New { .. } if is_hashtable(ctx, node) => {
                if !is_safe_receiver(ctx, node) {
                    return WalkAction::Advance;
                }
                let replacement = hashmap_creation(ctx, node);
                debug!(node = %node, "Hashtable receiver replaced");
                rewriter.replace(node, replacement);
                WalkAction::Skip
            }
            _ => WalkAction::Advance,
        }
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }
}

/// A use of a local that survives the switch to `HashMap`.
enum Use {
    /// `local.method(..)`
    Receiver { name: NodeRef },
    /// `Hashtable alias = local;`
    Alias {
        decl: NodeRef,
        alias: Symbol,
        binding: BindingId,
        source: NodeRef,
    },
}

fn rewrite_local(
    ctx: &mut TreeContext,
    rewriter: &mut Rewriter,
    decl: NodeRef,
    binding: BindingId,
    init: NodeRef,
) -> WalkAction {
    let Some(uses) = local_uses(ctx, decl, binding) else {
        trace!(decl = %decl, "Hashtable local escapes");
        return WalkAction::Advance;
    };

    let NodeKind::VarDecl { name, .. } = *ctx.kind(decl) else {
        return WalkAction::Advance;
    };
    let map = hashmap_type(ctx);
    let creation = hashmap_creation(ctx, init);
    let replacement = ctx.var_decl(name, Some(binding), Some(map), Some(creation.into()));
    rewriter.replace(decl, replacement);
    for used in uses {
        match used {
            Use::Receiver { name } => {
                let retyped = retyped_name(ctx, name, map);
                rewriter.replace(name, retyped);
            }
            Use::Alias {
                decl,
                alias,
                binding,
                source,
            } => {
                let source = retyped_name(ctx, source, map);
                let replacement =
                    ctx.var_decl(alias, Some(binding), Some(map), Some(source.into()));
                rewriter.replace(decl, replacement);
            }
        }
    }
    debug!(decl = %decl, "Hashtable local replaced");
    WalkAction::Skip
}

/// Every use of `binding` in the statements after `decl`, or `None` if one
/// of them lets the table escape.
fn local_uses(ctx: &TreeContext, decl: NodeRef, binding: BindingId) -> Option<Vec<Use>> {
    let parent = ctx.parent(decl)?;
    let scope = match ctx.kind(parent) {
        NodeKind::Block { stmts: list }
        | NodeKind::Switch { body: list, .. }
        | NodeKind::Unit { members: list } => list,
        _ => return None,
    };
    let position = scope.iter().position(|s| *s == decl)?;

    let mut locals: HashSet<BindingId> = [binding].into_iter().collect();
    let mut uses = Vec::new();
    for &stmt in &scope[position + 1..] {
        let flow = walk_node(ctx, stmt, &mut |n| {
            let NodeKind::Name {
                binding: Some(b), ..
            } = ctx.kind(n)
            else {
                return ControlFlow::Continue(WalkAction::Advance);
            };
            if !locals.contains(b) {
                return ControlFlow::Continue(WalkAction::Advance);
            }
            match classify_use(ctx, n) {
                Some(used) => {
                    if let Use::Alias { binding, .. } = used {
                        locals.insert(binding);
                    }
                    uses.push(used);
                    ControlFlow::Continue(WalkAction::Advance)
                }
                None => ControlFlow::Break(()),
            }
        });
        if flow.is_break() {
            return None;
        }
    }
    Some(uses)
}

fn classify_use(ctx: &TreeContext, name: NodeRef) -> Option<Use> {
    let parent = ctx.parent(name)?;
    match ctx.kind(parent) {
        NodeKind::MethodCall {
            receiver: Some(receiver),
            name: method,
            ..
        } if *receiver == name && !is_hashtable_only(*method) => Some(Use::Receiver { name }),
        NodeKind::VarDecl {
            name: alias,
            binding: Some(binding),
            init: Some(init),
        } if *init == name && is_hashtable(ctx, parent) => Some(Use::Alias {
            decl: parent,
            alias: *alias,
            binding: *binding,
            source: name,
        }),
        _ => None,
    }
}

/// `true` if `creation` is the receiver of a call `HashMap` also offers.
fn is_safe_receiver(ctx: &TreeContext, creation: NodeRef) -> bool {
    let Some(parent) = ctx.parent(creation) else {
        return false;
    };
    matches!(
        ctx.kind(parent),
        NodeKind::MethodCall { receiver: Some(receiver), name, .. }
            if *receiver == creation && !is_hashtable_only(*name)
    )
}

fn is_hashtable(ctx: &TreeContext, node: NodeRef) -> bool {
    ctx.type_of(node).is_some_and(|ty| ty.name == HASHTABLE)
}

fn is_hashtable_creation(ctx: &TreeContext, expr: NodeRef) -> bool {
    matches!(ctx.kind(expr), NodeKind::New { .. }) && is_hashtable(ctx, expr)
}

fn is_hashtable_only(method: Symbol) -> bool {
    method.with_str(|m| HASHTABLE_ONLY.contains(&m))
}

fn hashmap_type(ctx: &mut TreeContext) -> TypeRef {
    ctx.intern_type(TypeDescriptor::class("java.util.HashMap").with_supertypes([
        "java.util.AbstractMap",
        "java.util.Map",
        "java.lang.Cloneable",
        "java.io.Serializable",
    ]))
}

/// `new HashMap(args)`, moving the arguments of `creation`.
fn hashmap_creation(ctx: &mut TreeContext, creation: NodeRef) -> NodeRef {
    let args = ctx.children(creation);
    let args: Vec<Child> = args.into_iter().map(|a| ctx.take(a).into()).collect();
    let map = hashmap_type(ctx);
    ctx.new_object(map, args)
}

/// A fresh copy of name `name` carrying type `ty`.
fn retyped_name(ctx: &mut TreeContext, name: NodeRef, ty: TypeRef) -> NodeRef {
    let copy = ctx.deep_copy(name);
    ctx.set_type(copy, ty);
    copy
}
