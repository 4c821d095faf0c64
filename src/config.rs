//! Engine configuration.
//!
//! ```json
//! { "language_level": 8, "max_iterations": 10, "enabled_rules": ["PushNegationDown"] }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use recast_ir::RewriteOptions;
use recast_ir::rewrite::DEFAULT_LANGUAGE_LEVEL;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum supported Java version of the code being rewritten, as its
    /// minor number (`6` for Java 6).
    pub language_level: u32,
    /// Cap on fixpoint passes per compilation unit.
    pub max_iterations: usize,
    /// Catalog names of the rules to run, in catalog order. `None` runs
    /// the whole catalog.
    pub enabled_rules: Option<Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language_level: DEFAULT_LANGUAGE_LEVEL,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            enabled_rules: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_language_level(mut self, language_level: u32) -> Self {
        self.language_level = language_level;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_enabled_rules<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_rules = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Reject settings no run could use. Rule names are checked against the
    /// catalog by `Engine::new`.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::invalid_config("max_iterations must be at least 1"));
        }
        Ok(())
    }

    /// The slice of the configuration rules get to see.
    pub fn rewrite_options(&self) -> RewriteOptions {
        RewriteOptions {
            language_level: self.language_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.rewrite_options().language_level, 8);
    }

    #[test]
    fn fields_override_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "language_level": 5, "enabled_rules": ["PushNegationDown"] }"#,
        )
        .unwrap();
        assert_eq!(config.language_level, 5);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(
            config.enabled_rules.as_deref(),
            Some(&["PushNegationDown".to_string()][..])
        );
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let err = EngineConfig::from_json(r#"{ "max_iterations": 0 }"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = EngineConfig::from_json(r#"{ "max_iteration": 3 }"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Json(_)), "{err}");
    }
}
