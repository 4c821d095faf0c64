//! The rewrite rule catalog.
//!
//! One module per rule. Every rule is a unit struct implementing
//! [`RewriteRule`]; [`all_rules`] lists them in the order the engine offers
//! them to each node.

use recast_ir::{NodeRef, RewriteRule, Rewriter, TreeContext};

pub mod dead_code;
pub mod hashmap_rather_than_hashtable;
pub mod is_empty_rather_than_size;
pub mod push_negation_down;
pub mod string_value_of_rather_than_concat;
pub mod switch_to_if;
pub mod update_set_rather_than_testing_first;

pub use dead_code::DeadCodeElimination;
pub use hashmap_rather_than_hashtable::HashMapRatherThanHashtable;
pub use is_empty_rather_than_size::IsEmptyRatherThanSize;
pub use push_negation_down::PushNegationDown;
pub use string_value_of_rather_than_concat::StringValueOfRatherThanConcat;
pub use switch_to_if::IfRatherThanTwoSwitchCases;
pub use update_set_rather_than_testing_first::UpdateSetRatherThanTestingFirst;

/// Names of every rule in the catalog, in registration order.
pub const RULE_NAMES: &[&str] = &[
    IfRatherThanTwoSwitchCases::NAME,
    PushNegationDown::NAME,
    IsEmptyRatherThanSize::NAME,
    UpdateSetRatherThanTestingFirst::NAME,
    StringValueOfRatherThanConcat::NAME,
    HashMapRatherThanHashtable::NAME,
    DeadCodeElimination::NAME,
];

/// Every rule of the catalog.
pub fn all_rules() -> Vec<Box<dyn RewriteRule>> {
    RULE_NAMES.iter().filter_map(|name| rule_by_name(name)).collect()
}

/// Look a rule up by its catalog name.
pub fn rule_by_name(name: &str) -> Option<Box<dyn RewriteRule>> {
    let rule: Box<dyn RewriteRule> = match name {
        IfRatherThanTwoSwitchCases::NAME => Box::new(IfRatherThanTwoSwitchCases),
        PushNegationDown::NAME => Box::new(PushNegationDown),
        IsEmptyRatherThanSize::NAME => Box::new(IsEmptyRatherThanSize),
        UpdateSetRatherThanTestingFirst::NAME => Box::new(UpdateSetRatherThanTestingFirst),
        StringValueOfRatherThanConcat::NAME => Box::new(StringValueOfRatherThanConcat),
        HashMapRatherThanHashtable::NAME => Box::new(HashMapRatherThanHashtable),
        DeadCodeElimination::NAME => Box::new(DeadCodeElimination),
        _ => return None,
    };
    Some(rule)
}

/// Remove a statement, or empty it out when its slot cannot be vacated
/// (the `then` branch of an `if`, the body of a loop).
pub(crate) fn remove_statement(ctx: &mut TreeContext, rewriter: &mut Rewriter, stmt: NodeRef) {
    if ctx.can_remove(stmt) {
        rewriter.remove(stmt);
    } else {
        let empty = ctx.block(vec![]);
        rewriter.replace(stmt, empty);
    }
}
