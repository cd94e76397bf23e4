//! Introspection strategies
//!
//! An [`IntrospectionStrategy`] tells the [`Validator`](crate::Validator) how
//! to walk a model: which properties a node has, which constraints apply to
//! each, how to read a property and what type a child has. The walk itself
//! knows nothing about where constraints come from.
//!
//! [`JsonIntrospector`] implements the strategy over [`Value`] trees for any
//! [`ConstraintSource`]; [`RuleTable`] and [`TaggedTypes`] are the two
//! sources provided here.

mod json;
mod rules;
mod tagged;

pub use json::{ConstraintSource, JsonIntrospector, PropertyRule, PropertyRules};
pub use rules::{RuleTable, RulesIntrospector};
pub use tagged::{TaggedIntrospector, TaggedTypes, DEFAULT_TAG_FIELD};

use crate::constraints::ConstraintList;
use crate::context::ValidationContext;
use crate::errors::ConfigResult;
use crate::types::{PathSegment, Value};

/// Whether an enumeration should go on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep enumerating
    Continue,
    /// Stop here and at every enclosing level
    Stop,
}

/// Callback invoked once per enumerated property
pub type Visit<'a, 'm> =
    dyn FnMut(&mut ValidationContext<'m>, PathSegment) -> ConfigResult<Flow> + 'a;

/// Policy for enumerating, reading and typing the properties of a model
pub trait IntrospectionStrategy: Send + Sync {
    /// Call `visit` for every property (or index) of `model`
    ///
    /// Must return [`Flow::Stop`] as soon as `visit` does, without visiting
    /// further properties, and [`Flow::Continue`] once all are visited.
    fn enumerate_props<'m>(
        &self,
        vctx: &mut ValidationContext<'m>,
        model: &'m Value,
        type_key: Option<&str>,
        visit: &mut Visit<'_, 'm>,
    ) -> ConfigResult<Flow>;

    /// Constraints declared for `property` of `model` (possibly empty)
    fn extract_constraints(
        &self,
        vctx: &ValidationContext<'_>,
        model: &Value,
        type_key: Option<&str>,
        property: &PathSegment,
    ) -> ConstraintList;

    /// Current value of `property`, `None` if missing
    fn evaluate<'m>(
        &self,
        model: &'m Value,
        property: &PathSegment,
        type_key: Option<&str>,
        vctx: &ValidationContext<'m>,
    ) -> Option<&'m Value>;

    /// Type key of `property` of `parent_type`; with both `None`, the root type
    fn find_type(
        &self,
        vctx: &ValidationContext<'_>,
        parent_type: Option<&str>,
        property: Option<&PathSegment>,
    ) -> Option<String>;

    /// Whether the walk may descend into `property`; called only for objects and lists
    fn should_descend(
        &self,
        _model: &Value,
        _property: &PathSegment,
        _type_key: Option<&str>,
        _vctx: &ValidationContext<'_>,
    ) -> bool {
        true
    }
}
