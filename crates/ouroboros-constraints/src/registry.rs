//! Validator functions and the registry that names them
//!
//! A validator is anything implementing [`ConstraintValidator`]; plain
//! closures qualify through a blanket implementation. Constraints refer to
//! validators by name, and a [`ValidatorRegistry`] resolves those names
//! during normalization.
//!
//! # Example
//!
//! ```rust
//! use ouroboros_constraints::{MapRegistry, Value, ValidatorRegistry};
//!
//! let mut registry = MapRegistry::new();
//! registry.register("even", |_owner, value, _params, _vctx| {
//!     value.and_then(Value::as_i64).map(|n| n % 2 == 0)
//! });
//! assert!(registry.get_registered_validator("even").is_some());
//! ```

use crate::builtins;
use crate::constraints::ConstraintParams;
use crate::context::ValidationContext;
use crate::types::Value;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Validator Trait
// ============================================================================

/// A validation rule implementation
pub trait ConstraintValidator: Send + Sync {
    /// Check `value`, the property of `owner` currently being validated
    ///
    /// # Arguments
    /// * `owner` - The object containing the value
    /// * `value` - The value, `None` if the property is missing
    /// * `params` - Parameters of the constraint
    /// * `vctx` - The running validation context (messages, parent lookups)
    ///
    /// # Returns
    /// * `Some(true)` / `Some(false)` - Valid / invalid, recorded as a result
    /// * `None` - No opinion, nothing is recorded
    fn check(
        &self,
        owner: &Value,
        value: Option<&Value>,
        params: &ConstraintParams,
        vctx: &mut ValidationContext<'_>,
    ) -> Option<bool>;
}

impl<F> ConstraintValidator for F
where
    F: Fn(&Value, Option<&Value>, &ConstraintParams, &mut ValidationContext<'_>) -> Option<bool>
        + Send
        + Sync,
{
    fn check(
        &self,
        owner: &Value,
        value: Option<&Value>,
        params: &ConstraintParams,
        vctx: &mut ValidationContext<'_>,
    ) -> Option<bool> {
        self(owner, value, params, vctx)
    }
}

/// Shared handle to a validator; identity is the `Arc` pointer
pub type ValidatorFn = Arc<dyn ConstraintValidator>;

/// Wrap a closure as a [`ValidatorFn`]
pub fn validator_fn<F>(f: F) -> ValidatorFn
where
    F: Fn(&Value, Option<&Value>, &ConstraintParams, &mut ValidationContext<'_>) -> Option<bool>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

// ============================================================================
// Registry
// ============================================================================

/// Resolves validator names used in constraint shorthands
pub trait ValidatorRegistry: Send + Sync {
    /// The validator registered under `name`
    fn get_registered_validator(&self, name: &str) -> Option<ValidatorFn>;
}

impl ValidatorRegistry for HashMap<String, ValidatorFn> {
    fn get_registered_validator(&self, name: &str) -> Option<ValidatorFn> {
        self.get(name).cloned()
    }
}

impl<R: ValidatorRegistry + ?Sized> ValidatorRegistry for Arc<R> {
    fn get_registered_validator(&self, name: &str) -> Option<ValidatorFn> {
        (**self).get_registered_validator(name)
    }
}

/// Registry backed by a name map
#[derive(Default, Clone)]
pub struct MapRegistry {
    validators: HashMap<String, ValidatorFn>,
}

impl MapRegistry {
    /// Create empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in validators
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_builtins(&mut registry);
        registry
    }

    /// Register a closure under `name`, replacing any previous entry
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&Value, Option<&Value>, &ConstraintParams, &mut ValidationContext<'_>) -> Option<bool>
            + Send
            + Sync
            + 'static,
    {
        self.register_validator(name, validator_fn(f))
    }

    /// Register an existing validator handle under `name`
    pub fn register_validator(&mut self, name: impl Into<String>, validator: ValidatorFn) -> &mut Self {
        self.validators.insert(name.into(), validator);
        self
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Registered names (unordered)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    /// Number of registered validators
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl ValidatorRegistry for MapRegistry {
    fn get_registered_validator(&self, name: &str) -> Option<ValidatorFn> {
        self.validators.get(name).cloned()
    }
}

impl std::fmt::Debug for MapRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("MapRegistry").field("validators", &names).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = MapRegistry::new();
        registry.register("positive", |_owner, value, _params, _vctx| {
            value.and_then(Value::as_f64).map(|n| n > 0.0)
        });

        assert!(registry.contains("positive"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get_registered_validator("missing").is_none());

        let validator = registry.get_registered_validator("positive").unwrap();
        let params = ConstraintParams::default();
        let mut vctx = ValidationContext::new();
        let owner = Value::Null;
        assert_eq!(validator.check(&owner, Some(&Value::Int(3)), &params, &mut vctx), Some(true));
        assert_eq!(validator.check(&owner, Some(&Value::Int(-3)), &params, &mut vctx), Some(false));
        assert_eq!(validator.check(&owner, None, &params, &mut vctx), None);
    }

    #[test]
    fn test_lookup_returns_same_handle() {
        let mut registry = MapRegistry::new();
        let handle = validator_fn(|_, _, _, _| Some(true));
        registry.register_validator("ok", handle.clone());

        let found = registry.get_registered_validator("ok").unwrap();
        assert!(Arc::ptr_eq(&found, &handle));
    }

    #[test]
    fn test_hash_map_registry() {
        let mut map: HashMap<String, ValidatorFn> = HashMap::new();
        map.insert("ok".to_string(), validator_fn(|_, _, _, _| Some(true)));
        assert!(map.get_registered_validator("ok").is_some());
        assert!(map.get_registered_validator("nope").is_none());
    }

    #[test]
    fn test_with_builtins() {
        let registry = MapRegistry::with_builtins();
        for name in ["required", "nospaces", "length", "range", "pattern", "email"] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
    }
}
