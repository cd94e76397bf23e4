//! Ouroboros Constraints
//!
//! Constraint-driven model validation for the Ouroboros framework.
//!
//! Given a nested model (objects, lists, scalars, dates) and constraints
//! declared per property, the [`Validator`] walks the model depth-first and
//! builds a result tree with the same shape: every node records the outcome
//! of each constraint placed on it, whether it is valid itself and whether
//! all of its descendants are.
//!
//! # Architecture
//!
//! ```text
//! Validator ──► IntrospectionStrategy   which properties, which constraints, what type
//!     │
//!     ├──────► ValidatorRegistry       validator names -> functions
//!     │
//!     └──────► ValidationContext       path stacks + result tree (one per run)
//! ```
//!
//! # Features
//!
//! - **Groups**: constraints carry groups; a run evaluates only the requested ones
//! - **Eager mode**: stop the whole walk at the first invalid property
//! - **Shorthands**: `"v"`, `("v", params)`, `("k", "v", params)`, or a closure
//! - **serde**: `serde_json::Value` conversion and JSON rule tables
//!
//! # Example
//!
//! ```rust
//! use ouroboros_constraints::{constraints, MapRegistry, RawParams, RuleTable, ValidateOptions, Validator, Value};
//!
//! let rules = RuleTable::new("Pet")
//!     .rule("Pet", "name", constraints!["required", ("length", RawParams::new().set("max", 8))]);
//! let validator = Validator::new(MapRegistry::with_builtins(), rules.into_introspector());
//!
//! let pet = Value::object([("name", Value::from("Sir Barksalot"))]);
//! let vctx = validator.validate(&pet, &ValidateOptions::new()).unwrap();
//!
//! let name = vctx.result().child("name").unwrap();
//! assert!(!name.this_valid());
//! assert!(name.result_for("required").unwrap().is_valid);
//! assert!(!name.result_for("length").unwrap().is_valid);
//! ```

// Public modules
pub mod builtins;
pub mod config;
pub mod constraints;
pub mod context;
pub mod errors;
pub mod introspection;
pub mod registry;
pub mod result;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use config::{EnumerationMode, ValidateOptions, ValidatorConfig};
pub use constraints::{
    Constraint, ConstraintLike, ConstraintList, ConstraintParams, RawParams, ValidatorRef,
    DEFAULT_GROUP,
};
pub use context::{ModelPathEntry, ValidationContext};
pub use errors::{ConfigError, ConfigResult};
pub use introspection::{
    ConstraintSource, Flow, IntrospectionStrategy, JsonIntrospector, PropertyRule, PropertyRules,
    RuleTable, RulesIntrospector, TaggedIntrospector, TaggedTypes,
};
pub use registry::{validator_fn, ConstraintValidator, MapRegistry, ValidatorFn, ValidatorRegistry};
pub use result::{Children, ResultNode, ValidationResult};
pub use types::{PathSegment, Value};
pub use validator::Validator;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_validator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
        assert_send_sync::<ConstraintList>();
    }
}
