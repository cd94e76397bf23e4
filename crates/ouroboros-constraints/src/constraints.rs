//! Constraint descriptors and their shorthand forms
//!
//! Constraints are declared in a compact shorthand ([`ConstraintLike`]) and
//! turned into canonical [`Constraint`]s by
//! [`Validator::normalize_constraint`](crate::Validator::normalize_constraint).
//! A [`ConstraintList`] carries its own normalization cache, so a list shared
//! by many models is normalized only once.

use crate::errors::{ConfigError, ConfigResult};
use crate::registry::{validator_fn, ValidatorFn};
use crate::context::ValidationContext;
use crate::types::Value;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Group assigned to constraints that do not name one
pub const DEFAULT_GROUP: &str = "default";

/// The groups used when none are given: `["default"]`
pub fn default_groups() -> Vec<String> {
    vec![DEFAULT_GROUP.to_string()]
}

// ============================================================================
// Raw Params
// ============================================================================

/// Parameters as declared, before normalization
///
/// The `groups` entry may be missing, a single string or a list of strings.
#[derive(Clone, Default)]
pub struct RawParams {
    entries: Vec<(String, Value)>,
    condition: Option<ValidatorFn>,
}

impl RawParams {
    /// Create empty params
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    /// Restrict the constraint to a single group
    pub fn group(self, group: impl Into<String>) -> Self {
        self.set("groups", Value::String(group.into()))
    }

    /// Restrict the constraint to several groups
    pub fn groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let groups = groups.into_iter().map(|g| Value::String(g.into()));
        self.set("groups", Value::list(groups))
    }

    /// Gate the validator behind a condition; a `Some(false)` skips it
    pub fn condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, Option<&Value>, &ConstraintParams, &mut ValidationContext<'_>) -> Option<bool>
            + Send
            + Sync
            + 'static,
    {
        self.condition = Some(validator_fn(f));
        self
    }

    /// Gate the validator behind an existing validator handle
    pub fn condition_fn(mut self, condition: ValidatorFn) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Look up a declared parameter
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Build params from an object value; other values are rejected
    pub fn from_value(value: &Value) -> ConfigResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self {
                entries: fields.clone(),
                condition: None,
            }),
            other => Err(ConfigError::InvalidConstraint(format!(
                "expected params object, got {}",
                other.type_name()
            ))),
        }
    }

    /// Split into normalized params, resolving the `groups` shorthand
    pub(crate) fn normalize(&self, key: &str) -> ConfigResult<ConstraintParams> {
        let mut groups = None;
        let mut values = Vec::with_capacity(self.entries.len());

        for (name, value) in &self.entries {
            if name != "groups" {
                values.push((name.clone(), value.clone()));
                continue;
            }
            groups = match value {
                Value::Null => None,
                Value::String(group) => Some(vec![group.clone()]),
                Value::List(items) => Some(
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| ConfigError::InvalidGroups {
                            key: key.to_string(),
                        })?,
                ),
                _ => {
                    return Err(ConfigError::InvalidGroups {
                        key: key.to_string(),
                    })
                }
            };
        }

        Ok(ConstraintParams {
            groups: groups.unwrap_or_else(default_groups),
            condition: self.condition.clone(),
            values,
        })
    }
}

impl fmt::Debug for RawParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawParams")
            .field("entries", &self.entries)
            .field("condition", &self.condition.is_some())
            .finish()
    }
}

// ============================================================================
// Constraint Params
// ============================================================================

/// Normalized parameters handed to validators
#[derive(Clone)]
pub struct ConstraintParams {
    groups: Vec<String>,
    condition: Option<ValidatorFn>,
    values: Vec<(String, Value)>,
}

impl ConstraintParams {
    /// Groups this constraint belongs to (never empty after normalization)
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Condition gating the validator, if any
    pub fn condition(&self) -> Option<&ValidatorFn> {
        self.condition.as_ref()
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Numeric parameter as f64
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// String parameter
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// All parameters except `groups`, in declaration order
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }
}

impl Default for ConstraintParams {
    fn default() -> Self {
        Self {
            groups: default_groups(),
            condition: None,
            values: Vec::new(),
        }
    }
}

impl fmt::Debug for ConstraintParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintParams")
            .field("groups", &self.groups)
            .field("condition", &self.condition.is_some())
            .field("values", &self.values)
            .finish()
    }
}

// ============================================================================
// Constraint
// ============================================================================

/// A named validation rule with its validator and parameters
#[derive(Clone)]
pub struct Constraint {
    key: String,
    validator: ValidatorFn,
    params: ConstraintParams,
}

impl Constraint {
    /// Create a new constraint
    pub fn new(key: impl Into<String>, validator: ValidatorFn, params: ConstraintParams) -> Self {
        Self {
            key: key.into(),
            validator,
            params,
        }
    }

    /// Key the results of this constraint are recorded under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The validator function
    pub fn validator(&self) -> &ValidatorFn {
        &self.validator
    }

    /// The normalized parameters
    pub fn params(&self) -> &ConstraintParams {
        &self.params
    }

    /// Whether this constraint belongs to any of `groups`
    pub fn in_groups(&self, groups: &[String]) -> bool {
        self.params.groups.iter().any(|g| groups.contains(g))
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("key", &self.key)
            .field("params", &self.params)
            .finish()
    }
}

// ============================================================================
// Shorthand Forms
// ============================================================================

/// How a constraint names its validator
#[derive(Clone)]
pub enum ValidatorRef {
    /// Resolved through the registry
    Named(String),
    /// Used as is
    Func(ValidatorFn),
}

impl fmt::Debug for ValidatorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// A constraint as declared
///
/// | Shorthand | Meaning |
/// |---|---|
/// | `"v"` | key `v`, validator `v`, no params |
/// | `["v", {params}]` | key `v`, validator `v`, params |
/// | `["k", "v", {params}]` | key `k`, validator `v`, params |
/// | `["k", fn, {params}]` | key `k`, the given function, params |
#[derive(Clone, Debug)]
pub enum ConstraintLike {
    /// `"v"`
    Named(String),
    /// `["v", {params}]`
    WithParams(String, RawParams),
    /// `["k", validator, {params}?]`
    Full {
        /// Result key
        key: String,
        /// Validator name or function
        validator: ValidatorRef,
        /// Optional params
        params: Option<RawParams>,
    },
    /// Already normalized
    Resolved(Constraint),
}

impl ConstraintLike {
    /// `"v"`
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// `["v", {params}]`
    pub fn with_params(name: impl Into<String>, params: RawParams) -> Self {
        Self::WithParams(name.into(), params)
    }

    /// `["k", "v", {params}]`
    pub fn aliased(key: impl Into<String>, validator: impl Into<String>, params: RawParams) -> Self {
        Self::Full {
            key: key.into(),
            validator: ValidatorRef::Named(validator.into()),
            params: Some(params),
        }
    }

    /// `["k", fn, {params}]`
    pub fn func<F>(key: impl Into<String>, f: F, params: Option<RawParams>) -> Self
    where
        F: Fn(&Value, Option<&Value>, &ConstraintParams, &mut ValidationContext<'_>) -> Option<bool>
            + Send
            + Sync
            + 'static,
    {
        Self::Full {
            key: key.into(),
            validator: ValidatorRef::Func(validator_fn(f)),
            params,
        }
    }

    /// Parse the shorthand from a value (string or list form)
    pub fn from_value(value: &Value) -> ConfigResult<Self> {
        let items = match value {
            Value::String(name) => return Ok(Self::Named(name.clone())),
            Value::List(items) => items.as_slice(),
            other => {
                return Err(ConfigError::InvalidConstraint(format!(
                    "expected string or list, got {}",
                    other.type_name()
                )))
            }
        };

        match items {
            [Value::String(name), params @ Value::Object(_)] => {
                Ok(Self::WithParams(name.clone(), RawParams::from_value(params)?))
            }
            [Value::String(key), Value::String(validator)] => Ok(Self::Full {
                key: key.clone(),
                validator: ValidatorRef::Named(validator.clone()),
                params: None,
            }),
            [Value::String(key), Value::String(validator), params] => Ok(Self::Full {
                key: key.clone(),
                validator: ValidatorRef::Named(validator.clone()),
                params: match params {
                    Value::Null => None,
                    params => Some(RawParams::from_value(params)?),
                },
            }),
            _ => Err(ConfigError::InvalidConstraint(format!(
                "unrecognized constraint shorthand: {:?}",
                value
            ))),
        }
    }
}

impl From<&str> for ConstraintLike {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for ConstraintLike {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<Constraint> for ConstraintLike {
    fn from(constraint: Constraint) -> Self {
        Self::Resolved(constraint)
    }
}

// ============================================================================
// Constraint List
// ============================================================================

struct ConstraintListInner {
    items: Vec<ConstraintLike>,
    normalized: OnceCell<Arc<[Constraint]>>,
}

/// Shared list of declared constraints
///
/// Clones share identity (and the normalization cache); separately built
/// lists never do, even with equal contents.
#[derive(Clone)]
pub struct ConstraintList {
    inner: Arc<ConstraintListInner>,
}

impl ConstraintList {
    /// Create a list from declared constraints
    pub fn new(items: Vec<ConstraintLike>) -> Self {
        Self {
            inner: Arc::new(ConstraintListInner {
                items,
                normalized: OnceCell::new(),
            }),
        }
    }

    /// A list with no constraints
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Parse a list of shorthands from a value (a string or a list)
    pub fn from_value(value: &Value) -> ConfigResult<Self> {
        match value {
            Value::String(_) => Ok(Self::new(vec![ConstraintLike::from_value(value)?])),
            Value::List(items) => items
                .iter()
                .map(ConstraintLike::from_value)
                .collect::<ConfigResult<Vec<_>>>()
                .map(Self::new),
            Value::Null => Ok(Self::empty()),
            other => Err(ConfigError::InvalidConstraint(format!(
                "expected string or list of constraints, got {}",
                other.type_name()
            ))),
        }
    }

    /// Declared constraints
    pub fn items(&self) -> &[ConstraintLike] {
        &self.inner.items
    }

    /// Number of declared constraints
    pub fn len(&self) -> usize {
        self.inner.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.inner.items.is_empty()
    }

    /// Whether both handles refer to the same list
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Cached normalized form, computing it on first use
    pub(crate) fn normalized_or_try_init<F>(&self, init: F) -> ConfigResult<Arc<[Constraint]>>
    where
        F: FnOnce(&[ConstraintLike]) -> ConfigResult<Vec<Constraint>>,
    {
        self.inner
            .normalized
            .get_or_try_init(|| init(&self.inner.items).map(Arc::from))
            .map(Arc::clone)
    }
}

impl FromIterator<ConstraintLike> for ConstraintList {
    fn from_iter<I: IntoIterator<Item = ConstraintLike>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<ConstraintLike>> for ConstraintList {
    fn from(items: Vec<ConstraintLike>) -> Self {
        Self::new(items)
    }
}

impl Default for ConstraintList {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ConstraintList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items()).finish()
    }
}

/// Build a [`ConstraintList`] from shorthand items
///
/// ```rust
/// use ouroboros_constraints::{constraints, RawParams};
///
/// let list = constraints!["required", ("length", RawParams::new().set("max", 9))];
/// assert_eq!(list.len(), 2);
/// ```
#[macro_export]
macro_rules! constraints {
    () => { $crate::ConstraintList::empty() };
    ($($item:expr),+ $(,)?) => {
        $crate::ConstraintList::new(vec![$($crate::constraints::IntoConstraintLike::into_constraint_like($item)),+])
    };
}

/// Conversion used by the [`constraints!`](crate::constraints!) macro
pub trait IntoConstraintLike {
    /// Convert into a declared constraint
    fn into_constraint_like(self) -> ConstraintLike;
}

impl IntoConstraintLike for ConstraintLike {
    fn into_constraint_like(self) -> ConstraintLike {
        self
    }
}

impl IntoConstraintLike for &str {
    fn into_constraint_like(self) -> ConstraintLike {
        ConstraintLike::named(self)
    }
}

impl IntoConstraintLike for (&str, RawParams) {
    fn into_constraint_like(self) -> ConstraintLike {
        ConstraintLike::with_params(self.0, self.1)
    }
}

impl IntoConstraintLike for (&str, &str, RawParams) {
    fn into_constraint_like(self) -> ConstraintLike {
        ConstraintLike::aliased(self.0, self.1, self.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_shorthand() {
        let params = RawParams::new().set("x", 1).group("A").normalize("k").unwrap();
        assert_eq!(params.groups(), ["A".to_string()]);
        assert_eq!(params.get("x"), Some(&Value::Int(1)));
        assert_eq!(params.get("groups"), None);

        let params = RawParams::new().groups(["A", "B"]).normalize("k").unwrap();
        assert_eq!(params.groups(), ["A".to_string(), "B".to_string()]);

        let params = RawParams::new().normalize("k").unwrap();
        assert_eq!(params.groups(), default_groups().as_slice());
    }

    #[test]
    fn test_invalid_groups() {
        let err = RawParams::new().set("groups", 3).normalize("k").unwrap_err();
        assert_eq!(err, ConfigError::InvalidGroups { key: "k".to_string() });

        let err = RawParams::new()
            .set("groups", Value::list([Value::from("A"), Value::Int(1)]))
            .normalize("k")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGroups { .. }));
    }

    #[test]
    fn test_in_groups() {
        let params = RawParams::new().groups(["A", "B"]).normalize("k").unwrap();
        let constraint = Constraint::new("k", validator_fn(|_, _, _, _| Some(true)), params);

        assert!(constraint.in_groups(&["B".to_string()]));
        assert!(constraint.in_groups(&["X".to_string(), "A".to_string()]));
        assert!(!constraint.in_groups(&["a".to_string()]));
        assert!(!constraint.in_groups(&[]));
    }

    #[test]
    fn test_shorthand_from_value() {
        let named = ConstraintLike::from_value(&Value::from("required")).unwrap();
        assert!(matches!(named, ConstraintLike::Named(ref n) if n == "required"));

        let with_params = ConstraintLike::from_value(&Value::list([
            Value::from("length"),
            Value::object([("max", Value::Int(9))]),
        ]))
        .unwrap();
        match with_params {
            ConstraintLike::WithParams(name, params) => {
                assert_eq!(name, "length");
                assert_eq!(params.get("max"), Some(&Value::Int(9)));
            }
            other => panic!("unexpected {:?}", other),
        }

        let full = ConstraintLike::from_value(&Value::list([
            Value::from("short"),
            Value::from("length"),
            Value::object([("max", Value::Int(3))]),
        ]))
        .unwrap();
        assert!(matches!(
            full,
            ConstraintLike::Full { ref key, validator: ValidatorRef::Named(ref v), params: Some(_) }
                if key == "short" && v == "length"
        ));

        let aliased =
            ConstraintLike::from_value(&Value::list([Value::from("id"), Value::from("required")]))
                .unwrap();
        assert!(matches!(
            aliased,
            ConstraintLike::Full { ref key, validator: ValidatorRef::Named(ref v), params: None }
                if key == "id" && v == "required"
        ));

        assert!(ConstraintLike::from_value(&Value::Int(111)).is_err());
        assert!(ConstraintLike::from_value(&Value::list([Value::from("x")])).is_err());
    }

    #[test]
    fn test_constraint_list_from_value() {
        assert_eq!(ConstraintList::from_value(&Value::from("required")).unwrap().len(), 1);
        assert_eq!(ConstraintList::from_value(&Value::Null).unwrap().len(), 0);
        assert!(ConstraintList::from_value(&Value::Int(111)).is_err());
    }

    #[test]
    fn test_list_identity() {
        let a = constraints!["required"];
        let b = a.clone();
        let c = constraints!["required"];
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
