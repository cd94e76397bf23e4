//! Validation outcomes and the result tree
//!
//! The result tree mirrors the shape of the validated model: one
//! [`ResultNode`] per visited path segment, with the root node standing for
//! the model itself.

use crate::types::{PathSegment, Value};
use indexmap::IndexMap;
use std::collections::BTreeMap;

// ============================================================================
// Validation Result
// ============================================================================

/// Outcome of one constraint on one field
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether the constraint is fulfilled
    pub is_valid: bool,
    /// Message left by the validator, if any
    pub message: Option<String>,
    /// Parameters for the message, if any
    pub params: Option<Value>,
}

impl ValidationResult {
    /// Create a new validation result
    pub fn new(is_valid: bool, message: Option<String>, params: Option<Value>) -> Self {
        Self {
            is_valid,
            message,
            params,
        }
    }
}

// ============================================================================
// Children
// ============================================================================

/// Child nodes of a [`ResultNode`]
///
/// The container kind is fixed by the first segment pushed under a node:
/// an index creates an indexed container, a key creates a keyed one.
#[derive(Debug, Clone, PartialEq)]
pub enum Children {
    /// Children of an object, by property name
    Keyed(IndexMap<String, ResultNode>),
    /// Children of a list, by index
    Indexed(BTreeMap<usize, ResultNode>),
}

impl Children {
    fn for_segment(segment: &PathSegment) -> Self {
        match segment {
            PathSegment::Index(_) => Self::Indexed(BTreeMap::new()),
            PathSegment::Key(_) => Self::Keyed(IndexMap::new()),
        }
    }

    /// Get a child by segment
    pub fn get(&self, segment: &PathSegment) -> Option<&ResultNode> {
        match self {
            Self::Keyed(map) => map.get(segment.to_string().as_str()),
            Self::Indexed(items) => segment.as_index().and_then(|i| items.get(&i)),
        }
    }

    /// Number of children
    pub fn len(&self) -> usize {
        match self {
            Self::Keyed(map) => map.len(),
            Self::Indexed(items) => items.len(),
        }
    }

    /// Whether there are no children
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate children with their segments, in insertion (keyed) or index order
    pub fn iter(&self) -> Box<dyn Iterator<Item = (PathSegment, &ResultNode)> + '_> {
        match self {
            Self::Keyed(map) => Box::new(
                map.iter()
                    .map(|(k, node)| (PathSegment::Key(k.clone()), node)),
            ),
            Self::Indexed(items) => {
                Box::new(items.iter().map(|(i, node)| (PathSegment::Index(*i), node)))
            }
        }
    }

    /// Get or create the child slot for a segment
    ///
    /// A non-numeric key under an indexed container turns it into a keyed one.
    fn slot_mut(&mut self, segment: &PathSegment) -> &mut ResultNode {
        if matches!(self, Self::Indexed(_)) && segment.as_index().is_none() {
            self.convert_to_keyed();
        }
        match self {
            Self::Indexed(items) => items
                .entry(segment.as_index().unwrap_or_default())
                .or_default(),
            Self::Keyed(map) => map.entry(segment.to_string()).or_default(),
        }
    }

    fn convert_to_keyed(&mut self) {
        if let Self::Indexed(items) = self {
            let keyed = std::mem::take(items)
                .into_iter()
                .map(|(i, node)| (i.to_string(), node))
                .collect();
            *self = Self::Keyed(keyed);
        }
    }
}

// ============================================================================
// Result Node
// ============================================================================

/// Validation result for one model path
#[derive(Debug, Clone, PartialEq)]
pub struct ResultNode {
    pub(crate) this_valid: bool,
    pub(crate) children_valid: Option<bool>,
    pub(crate) validity: Option<IndexMap<String, ValidationResult>>,
    pub(crate) children: Option<Children>,
}

impl ResultNode {
    /// Create an empty, valid node
    pub fn new() -> Self {
        Self {
            this_valid: true,
            children_valid: None,
            validity: None,
            children: None,
        }
    }

    /// False if a constraint placed directly on this node failed
    pub fn this_valid(&self) -> bool {
        self.this_valid
    }

    /// Validity of all descendants
    ///
    /// `None` while the node has no children at all, which is different from
    /// having children that are all valid.
    pub fn children_valid(&self) -> Option<bool> {
        self.children_valid
    }

    /// Results of constraints evaluated on this node, by constraint key
    pub fn validity(&self) -> Option<&IndexMap<String, ValidationResult>> {
        self.validity.as_ref()
    }

    /// Result of one constraint on this node
    pub fn result_for(&self, constraint_key: &str) -> Option<&ValidationResult> {
        self.validity.as_ref().and_then(|v| v.get(constraint_key))
    }

    /// Child nodes, if any were pushed
    pub fn children(&self) -> Option<&Children> {
        self.children.as_ref()
    }

    /// Child node by property name or index
    pub fn child(&self, segment: impl Into<PathSegment>) -> Option<&ResultNode> {
        let segment = segment.into();
        self.children.as_ref().and_then(|c| c.get(&segment))
    }

    /// Descend through several segments
    pub fn descendant<I, S>(&self, segments: I) -> Option<&ResultNode>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        segments
            .into_iter()
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// True if this node or any descendant failed a constraint
    pub fn has_validation_errors(&self) -> bool {
        !self.this_valid || self.children_valid == Some(false)
    }

    pub(crate) fn record(&mut self, key: String, result: ValidationResult) {
        self.validity
            .get_or_insert_with(IndexMap::new)
            .insert(key, result);
    }

    /// Child slot for navigation, created if missing
    pub(crate) fn child_slot_mut(&mut self, segment: &PathSegment) -> &mut ResultNode {
        self.children
            .get_or_insert_with(|| Children::for_segment(segment))
            .slot_mut(segment)
    }

    /// Register a fresh child under `segment`, replacing any previous one
    pub(crate) fn open_child(&mut self, segment: &PathSegment) {
        if self.children_valid.is_none() {
            self.children_valid = Some(true);
        }
        *self.child_slot_mut(segment) = ResultNode::new();
    }
}

impl Default for ResultNode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(this_valid: bool, children_valid: Option<bool>) -> ResultNode {
        ResultNode {
            this_valid,
            children_valid,
            ..ResultNode::new()
        }
    }

    #[test]
    fn test_has_validation_errors_table() {
        assert!(!node(true, None).has_validation_errors());
        assert!(!node(true, Some(true)).has_validation_errors());
        assert!(node(false, None).has_validation_errors());
        assert!(node(false, Some(true)).has_validation_errors());
        assert!(node(true, Some(false)).has_validation_errors());
    }

    #[test]
    fn test_open_child_initializes_children_valid() {
        let mut root = ResultNode::new();
        assert_eq!(root.children_valid(), None);

        root.open_child(&"name".into());
        assert_eq!(root.children_valid(), Some(true));
        assert!(matches!(root.children(), Some(Children::Keyed(_))));
        assert!(root.child("name").is_some());
    }

    #[test]
    fn test_index_segment_creates_indexed_children() {
        let mut root = ResultNode::new();
        root.open_child(&0usize.into());
        root.open_child(&2usize.into());

        let children = root.children().unwrap();
        assert!(matches!(children, Children::Indexed(_)));
        assert_eq!(children.len(), 2);
        assert!(root.child(2usize).is_some());
        assert!(root.child(1usize).is_none());
    }

    #[test]
    fn test_key_under_indexed_children_converts() {
        let mut root = ResultNode::new();
        root.open_child(&0usize.into());
        root.open_child(&"length".into());

        assert!(matches!(root.children(), Some(Children::Keyed(_))));
        assert!(root.child("0").is_some());
        assert!(root.child("length").is_some());
    }

    #[test]
    fn test_descendant() {
        let mut root = ResultNode::new();
        root.open_child(&"pets".into());
        root.child_slot_mut(&"pets".into()).open_child(&0usize.into());

        assert!(root
            .descendant([PathSegment::from("pets"), PathSegment::from(0usize)])
            .is_some());
        assert!(root.descendant(["pets", "name"]).is_none());
    }
}
