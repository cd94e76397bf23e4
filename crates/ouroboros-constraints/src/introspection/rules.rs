//! Constraints declared in a type-keyed rule table
//!
//! A [`RuleTable`] maps type names to property rules, each property carrying
//! its constraints and optionally the type of its value. A type name ending
//! in `[]` declares a list whose elements have the type without the suffix.
//!
//! Tables are built in code or loaded from a [`Value`] shaped like:
//!
//! ```text
//! {
//!   "Person": {
//!     "name": ["required", "nospaces"],
//!     "address": { "type": "Address", "validators": "required" },
//!     "pets": { "type": "Pet[]" }
//!   },
//!   "Pet": { "name": "required" }
//! }
//! ```

use super::json::{ConstraintSource, JsonIntrospector, PropertyRule, PropertyRules};
use crate::constraints::ConstraintList;
use crate::errors::{ConfigError, ConfigResult};
use crate::types::{PathSegment, Value};
use indexmap::IndexMap;

/// Suffix marking a list type
const LIST_SUFFIX: &str = "[]";

/// Introspector reading constraints from a [`RuleTable`]
pub type RulesIntrospector = JsonIntrospector<RuleTable>;

/// Type-keyed table of property rules
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    root_type: Option<String>,
    types: IndexMap<String, PropertyRules>,
}

impl RuleTable {
    /// Create an empty table whose root model has type `root_type`
    pub fn new(root_type: impl Into<String>) -> Self {
        Self {
            root_type: Some(root_type.into()),
            types: IndexMap::new(),
        }
    }

    /// Declare constraints on `property` of `type_key`
    pub fn rule(
        self,
        type_key: impl Into<String>,
        property: impl Into<String>,
        constraints: impl Into<ConstraintList>,
    ) -> Self {
        self.with_rule(type_key, property, PropertyRule::new(constraints))
    }

    /// Declare constraints on `property` of `type_key` whose value has type `value_type`
    pub fn typed_rule(
        self,
        type_key: impl Into<String>,
        property: impl Into<String>,
        value_type: impl Into<String>,
        constraints: impl Into<ConstraintList>,
    ) -> Self {
        self.with_rule(
            type_key,
            property,
            PropertyRule::new(constraints).with_type(value_type),
        )
    }

    fn with_rule(
        mut self,
        type_key: impl Into<String>,
        property: impl Into<String>,
        rule: PropertyRule,
    ) -> Self {
        self.types
            .entry(type_key.into())
            .or_default()
            .insert(property, rule);
        self
    }

    /// Load a table from a value (see the module docs for the shape)
    pub fn from_value(root_type: Option<&str>, rules: &Value) -> ConfigResult<Self> {
        let types = match rules {
            Value::Object(types) => types,
            other => {
                return Err(ConfigError::InvalidRule {
                    type_key: String::new(),
                    property: String::new(),
                    reason: format!("expected an object of types, got {}", other.type_name()),
                })
            }
        };

        let mut table = Self {
            root_type: root_type.map(str::to_string),
            types: IndexMap::new(),
        };
        for (type_key, props) in types {
            let props = match props {
                Value::Object(props) => props,
                other => {
                    return Err(ConfigError::InvalidRule {
                        type_key: type_key.clone(),
                        property: String::new(),
                        reason: format!("expected an object of properties, got {}", other.type_name()),
                    })
                }
            };
            let rules = table.types.entry(type_key.clone()).or_default();
            for (property, rule) in props {
                rules.insert(property.clone(), parse_rule(type_key, property, rule)?);
            }
        }
        Ok(table)
    }

    /// Load a table from JSON (see the module docs for the shape)
    #[cfg(feature = "serde")]
    pub fn from_json(root_type: Option<&str>, rules: serde_json::Value) -> ConfigResult<Self> {
        Self::from_value(root_type, &Value::from(rules))
    }

    /// Type of the root model
    pub fn root_type(&self) -> Option<&str> {
        self.root_type.as_deref()
    }

    /// Rules declared for `type_key`
    pub fn type_rules(&self, type_key: &str) -> Option<&PropertyRules> {
        self.types.get(type_key)
    }

    /// Wrap the table in an introspector with the default enumeration mode
    pub fn into_introspector(self) -> RulesIntrospector {
        JsonIntrospector::new(self)
    }
}

fn parse_rule(type_key: &str, property: &str, rule: &Value) -> ConfigResult<PropertyRule> {
    let invalid = |reason: String| ConfigError::InvalidRule {
        type_key: type_key.to_string(),
        property: property.to_string(),
        reason,
    };

    match rule {
        Value::Null => Ok(PropertyRule::default()),
        Value::String(_) | Value::List(_) => ConstraintList::from_value(rule)
            .map(PropertyRule::new)
            .map_err(|e| invalid(e.to_string())),
        Value::Object(_) => {
            let constraints = match rule.get("validators") {
                None => ConstraintList::empty(),
                Some(validators) => {
                    ConstraintList::from_value(validators).map_err(|e| invalid(e.to_string()))?
                }
            };
            let parsed = PropertyRule::new(constraints);
            match rule.get("type") {
                None | Some(Value::Null) => Ok(parsed),
                Some(Value::String(value_type)) => Ok(parsed.with_type(value_type.clone())),
                Some(other) => Err(invalid(format!(
                    "type must be a string, got {}",
                    other.type_name()
                ))),
            }
        }
        other => Err(invalid(format!("unrecognized rule of type {}", other.type_name()))),
    }
}

impl ConstraintSource for RuleTable {
    fn property_rules(&self, _model: &Value, type_key: Option<&str>) -> Option<&PropertyRules> {
        type_key.and_then(|type_key| self.types.get(type_key))
    }

    fn find_type(&self, parent_type: Option<&str>, property: Option<&PathSegment>) -> Option<String> {
        let parent_type = match (parent_type, property) {
            (None, None) => return self.root_type.clone(),
            (None, Some(_)) => return None,
            (Some(parent_type), _) => parent_type,
        };

        if let Some(element_type) = parent_type.strip_suffix(LIST_SUFFIX) {
            return Some(element_type.to_string());
        }

        let property = property?.to_string();
        self.types
            .get(parent_type)?
            .get(&property)?
            .type_key()
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints;

    fn person_table() -> RuleTable {
        RuleTable::new("Person")
            .rule("Person", "name", constraints!["required"])
            .typed_rule("Person", "pets", "Pet[]", constraints![])
            .rule("Pet", "name", constraints!["required", "nospaces"])
    }

    #[test]
    fn test_find_type() {
        let table = person_table();
        assert_eq!(table.find_type(None, None), Some("Person".to_string()));
        assert_eq!(table.find_type(None, Some(&"name".into())), None);
        assert_eq!(
            table.find_type(Some("Person"), Some(&"pets".into())),
            Some("Pet[]".to_string())
        );
        assert_eq!(
            table.find_type(Some("Pet[]"), Some(&PathSegment::Index(2))),
            Some("Pet".to_string())
        );
        assert_eq!(table.find_type(Some("Person"), Some(&"name".into())), None);
        assert_eq!(table.find_type(Some("Unknown"), Some(&"name".into())), None);
    }

    #[test]
    fn test_property_rules_by_type() {
        let table = person_table();
        let model = Value::Null;
        let pet = table.property_rules(&model, Some("Pet")).unwrap();
        assert_eq!(pet.names().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(pet.get("name").unwrap().constraints().len(), 2);
        assert!(table.property_rules(&model, None).is_none());
    }

    #[test]
    fn test_from_value() {
        let rules = Value::object([
            (
                "Person",
                Value::object([
                    ("name", Value::list([Value::from("required"), Value::from("nospaces")])),
                    (
                        "address",
                        Value::object([
                            ("type", Value::from("Address")),
                            ("validators", Value::from("required")),
                        ]),
                    ),
                    ("nickname", Value::Null),
                ]),
            ),
            ("Address", Value::object([("city", Value::from("required"))])),
        ]);

        let table = RuleTable::from_value(Some("Person"), &rules).unwrap();
        assert_eq!(table.root_type(), Some("Person"));

        let person = table.type_rules("Person").unwrap();
        assert_eq!(person.len(), 3);
        assert_eq!(person.get("name").unwrap().constraints().len(), 2);
        assert_eq!(person.get("address").unwrap().type_key(), Some("Address"));
        assert_eq!(person.get("address").unwrap().constraints().len(), 1);
        assert!(person.get("nickname").unwrap().constraints().is_empty());
        assert_eq!(table.type_rules("Address").unwrap().len(), 1);
    }

    #[test]
    fn test_from_value_rejects_bad_rules() {
        let err = RuleTable::from_value(None, &Value::from("Person")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { .. }));

        let rules = Value::object([("Person", Value::object([("age", Value::Int(3))]))]);
        let err = RuleTable::from_value(None, &rules).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidRule { ref type_key, ref property, .. }
                if type_key == "Person" && property == "age"
        ));

        let rules = Value::object([(
            "Person",
            Value::object([("age", Value::object([("type", Value::Int(1))]))]),
        )]);
        assert!(RuleTable::from_value(None, &rules).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let table = RuleTable::from_json(
            Some("Pet"),
            serde_json::json!({ "Pet": { "name": ["required", ["length", { "max": 10 }]] } }),
        )
        .unwrap();
        let pet = table.type_rules("Pet").unwrap();
        assert_eq!(pet.get("name").unwrap().constraints().len(), 2);
    }
}
