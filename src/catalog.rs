//! User-facing rule metadata.
//!
//! Names, descriptions and reasons live in `rules.json`, not in the rules,
//! so the engine never depends on presentation text. The embedded catalog
//! is parsed once on first use.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

const BUILTIN_CATALOG: &str = include_str!("rules.json");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_json(BUILTIN_CATALOG).expect("embedded rule catalog is valid")
});

/// Presentation text for one rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDescriptor {
    pub name: String,
    pub description: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    rules: Vec<RuleDescriptor>,
}

impl Catalog {
    /// The catalog shipped with the engine.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Parse a catalog, rejecting entries for rules the engine does not have.
    pub fn from_json(text: &str) -> Result<Self> {
        let rules: Vec<RuleDescriptor> = serde_json::from_str(text)?;
        if let Some(unknown) = rules
            .iter()
            .find(|r| recast_rules::rule_by_name(&r.name).is_none())
        {
            return Err(Error::unknown_rule(unknown.name.clone()));
        }
        Ok(Self { rules })
    }

    pub fn get(&self, name: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
