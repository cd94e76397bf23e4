//! The recursive validation walk
//!
//! A [`Validator`] pairs a [`ValidatorRegistry`] (resolving validator names)
//! with an [`IntrospectionStrategy`] (walking the model) and produces a
//! [`ValidationContext`] whose result tree mirrors the model.
//!
//! # Example
//!
//! ```rust
//! use ouroboros_constraints::{constraints, MapRegistry, RuleTable, ValidateOptions, Validator, Value};
//!
//! let rules = RuleTable::new("Person").rule("Person", "name", constraints!["required"]);
//! let validator = Validator::new(MapRegistry::with_builtins(), rules.into_introspector());
//!
//! let model = Value::object([("name", Value::Null)]);
//! let vctx = validator.validate(&model, &ValidateOptions::new()).unwrap();
//! assert!(vctx.has_validation_errors());
//! ```

use crate::config::{ValidateOptions, ValidatorConfig};
use crate::constraints::{Constraint, ConstraintLike, ConstraintList, ConstraintParams, RawParams, ValidatorRef};
use crate::context::ValidationContext;
use crate::errors::{ConfigError, ConfigResult};
use crate::introspection::{Flow, IntrospectionStrategy};
use crate::registry::{ValidatorFn, ValidatorRegistry};
use crate::types::{PathSegment, Value};
use std::sync::Arc;

/// Validation engine: registry + introspection strategy + config
///
/// Holds no per-run state; one instance can serve any number of runs, from
/// any number of threads.
#[derive(Clone)]
pub struct Validator {
    registry: Arc<dyn ValidatorRegistry>,
    introspector: Arc<dyn IntrospectionStrategy>,
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator with the default config
    pub fn new<R, I>(registry: R, introspector: I) -> Self
    where
        R: ValidatorRegistry + 'static,
        I: IntrospectionStrategy + 'static,
    {
        Self::from_shared(Arc::new(registry), Arc::new(introspector))
    }

    /// Create a validator from already shared parts
    pub fn from_shared(
        registry: Arc<dyn ValidatorRegistry>,
        introspector: Arc<dyn IntrospectionStrategy>,
    ) -> Self {
        Self {
            registry,
            introspector,
            config: ValidatorConfig::default(),
        }
    }

    /// Replace the config
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// The config
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// The introspection strategy
    pub fn introspector(&self) -> &dyn IntrospectionStrategy {
        &*self.introspector
    }

    // ------------------------------------------------------------------------
    // Model validation
    // ------------------------------------------------------------------------

    /// Validate a whole model
    ///
    /// A null model yields an empty, valid context without consulting the
    /// introspection strategy.
    ///
    /// # Errors
    /// Configuration errors only (unknown validator names, malformed groups);
    /// failing constraints are recorded in the returned context.
    pub fn validate<'m>(
        &self,
        model: &'m Value,
        options: &ValidateOptions,
    ) -> ConfigResult<ValidationContext<'m>> {
        let mut vctx = ValidationContext::with_root(model);
        if model.is_null() {
            tracing::debug!("Null model, nothing to validate");
            return Ok(vctx);
        }

        let groups = options
            .groups
            .as_deref()
            .unwrap_or(&self.config.default_groups);
        let root_type = self.introspector.find_type(&vctx, None, None);
        tracing::debug!(
            "Validating model of type {:?} (eager: {}, groups: {:?})",
            root_type,
            options.eager,
            groups
        );

        let flow = self.validate_properties(
            &mut vctx,
            model,
            root_type.as_deref(),
            options.eager,
            groups,
            options.prop_filter(),
        )?;

        tracing::debug!(
            "Validation finished: valid={}, stopped early={}",
            !vctx.has_validation_errors(),
            flow == Flow::Stop
        );
        Ok(vctx)
    }

    /// Validate the properties of `model` and, recursively, their contents
    ///
    /// `props` restricts this level only; nested levels are never filtered.
    /// Returns [`Flow::Stop`] when eager validation found an error, in which
    /// case every enclosing level stops too.
    pub fn validate_properties<'m>(
        &self,
        vctx: &mut ValidationContext<'m>,
        model: &'m Value,
        type_key: Option<&str>,
        eager: bool,
        groups: &[String],
        props: Option<&[String]>,
    ) -> ConfigResult<Flow> {
        let introspector = &*self.introspector;

        introspector.enumerate_props(
            vctx,
            model,
            type_key,
            &mut |vctx: &mut ValidationContext<'m>, property: PathSegment| {
                if let Some(props) = props {
                    if !props.iter().any(|name| property.matches(name)) {
                        return Ok(Flow::Continue);
                    }
                }

                let constraints = introspector.extract_constraints(vctx, model, type_key, &property);
                let value = introspector.evaluate(model, &property, type_key, vctx);

                vctx.push_path(property.clone(), value);
                self.evaluate_constraints(vctx, &constraints, model, value, eager, Some(groups))?;

                let mut flow = Flow::Continue;
                if !eager || !vctx.has_validation_errors() {
                    if let Some(child) = value.filter(|v| v.is_descendable()) {
                        if introspector.should_descend(model, &property, type_key, vctx) {
                            let child_type = introspector.find_type(vctx, type_key, Some(&property));
                            flow = self.validate_properties(
                                vctx,
                                child,
                                child_type.as_deref(),
                                eager,
                                groups,
                                None,
                            )?;
                        }
                    }
                }

                vctx.pop_path()?;

                if flow == Flow::Stop || (eager && vctx.has_validation_errors()) {
                    Ok(Flow::Stop)
                } else {
                    Ok(Flow::Continue)
                }
            },
        )
    }

    /// Validate a single property of `owner` against explicit constraints
    ///
    /// The result tree has one child, named after `property`.
    pub fn validate_field<'m>(
        &self,
        owner: &'m Value,
        property: impl Into<PathSegment>,
        constraints: &ConstraintList,
        options: &ValidateOptions,
    ) -> ConfigResult<ValidationContext<'m>> {
        let property = property.into();
        let mut vctx = ValidationContext::with_root(owner);
        let value = self.introspector.evaluate(owner, &property, None, &vctx);

        vctx.push_path(property, value);
        self.evaluate_constraints(
            &mut vctx,
            constraints,
            owner,
            value,
            options.eager,
            options.groups.as_deref(),
        )?;
        vctx.pop_path()?;
        Ok(vctx)
    }

    // ------------------------------------------------------------------------
    // Constraint evaluation
    // ------------------------------------------------------------------------

    /// Run `constraints` against `value` and record the outcomes at the current node
    ///
    /// `owner` is the object containing `value`. Only constraints sharing a
    /// group with `groups` run; `None` uses the config's default groups.
    /// Under `eager`, the first failure ends the list.
    pub fn evaluate_constraints(
        &self,
        vctx: &mut ValidationContext<'_>,
        constraints: &ConstraintList,
        owner: &Value,
        value: Option<&Value>,
        eager: bool,
        groups: Option<&[String]>,
    ) -> ConfigResult<()> {
        if constraints.is_empty() {
            return Ok(());
        }
        let normalized = self.normalize_constraints(constraints)?;
        let groups = groups.unwrap_or(&self.config.default_groups);

        for constraint in normalized.iter() {
            if !constraint.in_groups(groups) {
                continue;
            }

            vctx.set_current_constraint_name(Some(constraint.key()));
            let params = constraint.params();

            if let Some(condition) = params.condition() {
                if condition.check(owner, value, params, vctx) == Some(false) {
                    tracing::trace!("Skipping {} at '{}': condition not met", constraint.key(), vctx.path_string());
                    vctx.set_current_constraint_name(None);
                    continue;
                }
                // fresh message state for the validator itself
                vctx.set_current_constraint_name(Some(constraint.key()));
            }

            let outcome = constraint.validator().check(owner, value, params, vctx);
            if let Some(valid) = outcome {
                tracing::trace!("{} at '{}': {}", constraint.key(), vctx.path_string(), valid);
                vctx.add_result(valid);
            }
            vctx.set_current_constraint_name(None);

            if eager && outcome == Some(false) {
                break;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Normalization
    // ------------------------------------------------------------------------

    /// Normalized form of `constraints`, computed once per list
    ///
    /// The result is cached on the list itself: every later call with the
    /// same list (or a clone of it) returns the same `Arc`, whichever
    /// validator makes it.
    pub fn normalize_constraints(&self, constraints: &ConstraintList) -> ConfigResult<Arc<[Constraint]>> {
        constraints.normalized_or_try_init(|items| {
            items
                .iter()
                .map(|item| self.normalize_constraint(item))
                .collect()
        })
    }

    /// Resolve one shorthand into a [`Constraint`]
    ///
    /// # Errors
    /// [`ConfigError::UnregisteredValidator`] for unknown validator names and
    /// [`ConfigError::InvalidGroups`] for malformed `groups` params.
    pub fn normalize_constraint(&self, constraint: &ConstraintLike) -> ConfigResult<Constraint> {
        match constraint {
            ConstraintLike::Resolved(resolved) => Ok(resolved.clone()),
            ConstraintLike::Named(name) => self.build_constraint(name, self.resolve(name)?, None),
            ConstraintLike::WithParams(name, params) => {
                self.build_constraint(name, self.resolve(name)?, Some(params))
            }
            ConstraintLike::Full {
                key,
                validator,
                params,
            } => {
                let validator = match validator {
                    ValidatorRef::Named(name) => self.resolve(name)?,
                    ValidatorRef::Func(f) => Arc::clone(f),
                };
                self.build_constraint(key, validator, params.as_ref())
            }
        }
    }

    fn resolve(&self, name: &str) -> ConfigResult<ValidatorFn> {
        self.registry
            .get_registered_validator(name)
            .ok_or_else(|| ConfigError::UnregisteredValidator(name.to_string()))
    }

    fn build_constraint(
        &self,
        key: &str,
        validator: ValidatorFn,
        params: Option<&RawParams>,
    ) -> ConfigResult<Constraint> {
        let params = match params {
            Some(params) => params.normalize(key)?,
            None => ConstraintParams::default(),
        };
        Ok(Constraint::new(key, validator, params))
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
