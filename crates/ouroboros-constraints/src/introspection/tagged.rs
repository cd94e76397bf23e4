//! Constraints selected by a tag field of the model itself
//!
//! Each object names its own type in a tag field (`"type"` by default), so
//! heterogeneous lists validate element by element without declaring types
//! on the parent.

use super::json::{ConstraintSource, JsonIntrospector, PropertyRule, PropertyRules};
use crate::constraints::ConstraintList;
use crate::types::{PathSegment, Value};
use indexmap::IndexMap;

/// Tag field used when none is configured
pub const DEFAULT_TAG_FIELD: &str = "type";

/// Introspector reading constraints from [`TaggedTypes`]
pub type TaggedIntrospector = JsonIntrospector<TaggedTypes>;

/// Property rules keyed by the value of a tag field
#[derive(Debug, Clone)]
pub struct TaggedTypes {
    tag_field: String,
    types: IndexMap<String, PropertyRules>,
}

impl TaggedTypes {
    /// Create empty rules read through the default tag field
    pub fn new() -> Self {
        Self::with_tag_field(DEFAULT_TAG_FIELD)
    }

    /// Create empty rules read through `tag_field`
    pub fn with_tag_field(tag_field: impl Into<String>) -> Self {
        Self {
            tag_field: tag_field.into(),
            types: IndexMap::new(),
        }
    }

    /// Declare constraints on `property` of objects tagged `tag`
    pub fn rule(
        mut self,
        tag: impl Into<String>,
        property: impl Into<String>,
        constraints: impl Into<ConstraintList>,
    ) -> Self {
        self.types
            .entry(tag.into())
            .or_default()
            .insert(property, PropertyRule::new(constraints));
        self
    }

    /// The tag field name
    pub fn tag_field(&self) -> &str {
        &self.tag_field
    }

    /// Tag of `model`, if it is an object carrying a string tag
    pub fn tag_of<'a>(&self, model: &'a Value) -> Option<&'a str> {
        model.get(&self.tag_field)?.as_str()
    }

    /// Wrap the rules in an introspector with the default enumeration mode
    pub fn into_introspector(self) -> TaggedIntrospector {
        JsonIntrospector::new(self)
    }
}

impl Default for TaggedTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintSource for TaggedTypes {
    fn property_rules(&self, model: &Value, _type_key: Option<&str>) -> Option<&PropertyRules> {
        self.types.get(self.tag_of(model)?)
    }

    fn find_type(&self, _parent_type: Option<&str>, _property: Option<&PathSegment>) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints;

    #[test]
    fn test_rules_follow_tag() {
        let types = TaggedTypes::new()
            .rule("dog", "name", constraints!["required"])
            .rule("cat", "lives", constraints!["range"]);

        let dog = Value::object([("type", Value::from("dog"))]);
        let rules = types.property_rules(&dog, None).unwrap();
        assert_eq!(rules.names().collect::<Vec<_>>(), vec!["name"]);

        let fish = Value::object([("type", Value::from("fish"))]);
        assert!(types.property_rules(&fish, None).is_none());
        assert!(types.property_rules(&Value::Int(1), None).is_none());
        assert_eq!(types.find_type(None, None), None);
    }

    #[test]
    fn test_custom_tag_field() {
        let types = TaggedTypes::with_tag_field("kind").rule("dog", "name", constraints!["required"]);
        assert_eq!(types.tag_field(), "kind");

        let tagged = Value::object([("kind", Value::from("dog"))]);
        assert_eq!(types.tag_of(&tagged), Some("dog"));
        let untagged = Value::object([("type", Value::from("dog"))]);
        assert!(types.property_rules(&untagged, None).is_none());
    }
}
