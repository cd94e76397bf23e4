//! Introspection of [`Value`] models
//!
//! [`JsonIntrospector`] does the model-side work (enumerating object keys and
//! list indices, reading properties) and asks a [`ConstraintSource`] for the
//! declared constraints and types.

use super::{Flow, IntrospectionStrategy, Visit};
use crate::config::EnumerationMode;
use crate::constraints::ConstraintList;
use crate::context::ValidationContext;
use crate::errors::ConfigResult;
use crate::types::{PathSegment, Value};
use indexmap::{IndexMap, IndexSet};

// ============================================================================
// Declared Rules
// ============================================================================

/// Constraints and child type declared for one property
#[derive(Debug, Clone, Default)]
pub struct PropertyRule {
    type_key: Option<String>,
    constraints: ConstraintList,
}

impl PropertyRule {
    /// Create a rule with constraints and no child type
    pub fn new(constraints: impl Into<ConstraintList>) -> Self {
        Self {
            type_key: None,
            constraints: constraints.into(),
        }
    }

    /// Declare the type of the property's value
    pub fn with_type(mut self, type_key: impl Into<String>) -> Self {
        self.type_key = Some(type_key.into());
        self
    }

    /// Declared type of the property's value
    pub fn type_key(&self) -> Option<&str> {
        self.type_key.as_deref()
    }

    /// Declared constraints
    pub fn constraints(&self) -> &ConstraintList {
        &self.constraints
    }
}

/// Rules of all declared properties of one type, in declaration order
#[derive(Debug, Clone, Default)]
pub struct PropertyRules {
    props: IndexMap<String, PropertyRule>,
}

impl PropertyRules {
    /// Create empty rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) the rule of a property
    pub fn insert(&mut self, property: impl Into<String>, rule: PropertyRule) {
        self.props.insert(property.into(), rule);
    }

    /// Rule of a property
    pub fn get(&self, property: &str) -> Option<&PropertyRule> {
        self.props.get(property)
    }

    /// Declared property names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether no property is declared
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// Where a [`JsonIntrospector`] finds declared constraints and types
pub trait ConstraintSource: Send + Sync {
    /// Rules applying to `model`, which has type `type_key` if known
    fn property_rules(&self, model: &Value, type_key: Option<&str>) -> Option<&PropertyRules>;

    /// Type of `property` of `parent_type`; with both `None`, the root type
    fn find_type(&self, parent_type: Option<&str>, property: Option<&PathSegment>) -> Option<String>;
}

// ============================================================================
// JsonIntrospector
// ============================================================================

/// Introspection strategy for [`Value`] models
#[derive(Debug, Clone)]
pub struct JsonIntrospector<S> {
    source: S,
    mode: EnumerationMode,
}

impl<S: ConstraintSource> JsonIntrospector<S> {
    /// Create an introspector enumerating declared properties
    pub fn new(source: S) -> Self {
        Self::with_mode(source, EnumerationMode::default())
    }

    /// Create an introspector with an explicit enumeration mode
    pub fn with_mode(source: S, mode: EnumerationMode) -> Self {
        Self { source, mode }
    }

    /// The enumeration mode
    pub fn mode(&self) -> EnumerationMode {
        self.mode
    }

    /// The constraint source
    pub fn source(&self) -> &S {
        &self.source
    }

    fn declared_names(&self, model: &Value, type_key: Option<&str>) -> Vec<String> {
        self.source
            .property_rules(model, type_key)
            .map(|rules| rules.names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn property_names(&self, model: &Value, type_key: Option<&str>) -> Vec<String> {
        match self.mode {
            EnumerationMode::Validators => self.declared_names(model, type_key),
            EnumerationMode::Model => model.keys().map(str::to_string).collect(),
            EnumerationMode::Union => {
                let mut names: IndexSet<String> =
                    self.declared_names(model, type_key).into_iter().collect();
                names.extend(model.keys().map(str::to_string));
                names.into_iter().collect()
            }
        }
    }
}

impl<S: ConstraintSource> IntrospectionStrategy for JsonIntrospector<S> {
    fn enumerate_props<'m>(
        &self,
        vctx: &mut ValidationContext<'m>,
        model: &'m Value,
        type_key: Option<&str>,
        visit: &mut Visit<'_, 'm>,
    ) -> ConfigResult<Flow> {
        let segments: Vec<PathSegment> = match model {
            Value::List(items) => (0..items.len()).map(PathSegment::Index).collect(),
            _ => self
                .property_names(model, type_key)
                .into_iter()
                .map(PathSegment::Key)
                .collect(),
        };

        for segment in segments {
            if visit(vctx, segment)? == Flow::Stop {
                return Ok(Flow::Stop);
            }
        }
        Ok(Flow::Continue)
    }

    fn extract_constraints(
        &self,
        _vctx: &ValidationContext<'_>,
        model: &Value,
        type_key: Option<&str>,
        property: &PathSegment,
    ) -> ConstraintList {
        self.source
            .property_rules(model, type_key)
            .and_then(|rules| rules.get(&property.to_string()))
            .map(|rule| rule.constraints().clone())
            .unwrap_or_default()
    }

    fn evaluate<'m>(
        &self,
        model: &'m Value,
        property: &PathSegment,
        _type_key: Option<&str>,
        _vctx: &ValidationContext<'m>,
    ) -> Option<&'m Value> {
        model.lookup(property)
    }

    fn find_type(
        &self,
        _vctx: &ValidationContext<'_>,
        parent_type: Option<&str>,
        property: Option<&PathSegment>,
    ) -> Option<String> {
        self.source.find_type(parent_type, property)
    }
}
