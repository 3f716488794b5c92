//! Dotted-name registry.
//!
//! Views can be referred to by a dotted name such as `demo.my_view`
//! (`demo:my_view` is accepted as well). Names are registered at startup and
//! resolved once when a route is added.

use std::collections::HashMap;

use crate::app::ConfigurationError;
use crate::view::{Target, TargetRef};

#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    names: HashMap<String, Target>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` under `name`, replacing any previous entry.
    pub fn register(
        &mut self,
        name: &str,
        target: impl Into<Target>,
    ) -> Result<(), ConfigurationError> {
        let name = normalize(name)?;
        self.names.insert(name, target.into());
        Ok(())
    }

    /// Resolve a dotted name.
    pub fn resolve(&self, name: &str) -> Result<Target, ConfigurationError> {
        let key = normalize(name)?;
        self.names
            .get(&key)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnresolvedName(name.to_string()))
    }

    /// Resolve dotted names; live targets pass through unchanged.
    pub fn maybe_resolve(&self, target: TargetRef) -> Result<Target, ConfigurationError> {
        match target {
            TargetRef::Live(target) => Ok(target),
            TargetRef::Dotted(name) => self.resolve(&name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        normalize(name).map_or(false, |key| self.names.contains_key(&key))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn normalize(name: &str) -> Result<String, ConfigurationError> {
    let trimmed = name.trim();
    if trimmed.matches(':').count() > 1 {
        return Err(ConfigurationError::InvalidDottedName(name.to_string()));
    }

    let normalized = trimmed.replace(':', ".");
    let valid = !normalized.is_empty()
        && normalized.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
                && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        });

    if valid {
        Ok(normalized)
    } else {
        Err(ConfigurationError::InvalidDottedName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use crate::view::{FunctionView, Kwargs, ViewResult};
    use serde_json::json;

    fn my_view(_request: &Request, _kwargs: &Kwargs) -> ViewResult {
        Ok(json!({"foo": "bar"}).into())
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = NameRegistry::new();
        registry
            .register("tests.simple_app.my_view", FunctionView::new("my_view", my_view))
            .unwrap();

        let target = registry.resolve("tests.simple_app.my_view").unwrap();
        assert_eq!(target.name(), "my_view");

        // Colon form refers to the same entry.
        assert!(registry.contains("tests.simple_app:my_view"));
    }

    #[test]
    fn test_unresolved_name() {
        let registry = NameRegistry::new();
        assert!(matches!(
            registry.maybe_resolve(TargetRef::from("missing.view")),
            Err(ConfigurationError::UnresolvedName(_))
        ));
    }

    #[test]
    fn test_invalid_names() {
        let mut registry = NameRegistry::new();
        for name in ["", "a..b", "1a.b", "a:b:c", "a.b-c"] {
            assert!(
                matches!(
                    registry.register(name, FunctionView::new("v", my_view)),
                    Err(ConfigurationError::InvalidDottedName(_))
                ),
                "{name} should be rejected"
            );
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_live_targets_pass_through() {
        let registry = NameRegistry::new();
        let target = registry
            .maybe_resolve(FunctionView::new("inline", my_view).into())
            .unwrap();
        assert_eq!(target.name(), "inline");
    }
}
