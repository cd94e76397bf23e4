//! Validation context
//!
//! A [`ValidationContext`] accumulates the result tree of one validation run
//! and tracks where in the model the run currently is. It is created fresh
//! for every run and handed back to the caller afterwards.

use crate::errors::{ConfigError, ConfigResult};
use crate::result::{ResultNode, ValidationResult};
use crate::types::{PathSegment, Value};

// ============================================================================
// Model Path Entry
// ============================================================================

/// One step of the model path: the property name and the model value at it
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPathEntry<'m> {
    /// Property name or index (empty key for the root)
    pub path: PathSegment,
    /// Model value at this step, `None` if the property is missing
    pub value: Option<&'m Value>,
}

impl<'m> ModelPathEntry<'m> {
    /// Create a new entry
    pub fn new(path: PathSegment, value: Option<&'m Value>) -> Self {
        Self { path, value }
    }
}

// ============================================================================
// Current Evaluation
// ============================================================================

/// State scoped to one constraint invocation
///
/// Validators may leave a message and message parameters here; they are read
/// by [`ValidationContext::add_result`] and reset with every new constraint.
#[derive(Debug, Clone, Default)]
pub struct CurrentEvaluation {
    constraint_name: Option<String>,
    message: Option<String>,
    message_params: Option<Value>,
}

// ============================================================================
// Validation Context
// ============================================================================

/// Per-run accumulator of validation results
#[derive(Debug, Clone)]
pub struct ValidationContext<'m> {
    /// Root of the result tree
    result: ResultNode,
    /// Segments of the currently open nodes below the root
    path: Vec<PathSegment>,
    /// Model values along the current path, parents first
    model_path: Vec<ModelPathEntry<'m>>,
    /// Position of the real root inside `model_path`
    root_index: usize,
    current: CurrentEvaluation,
}

impl<'m> ValidationContext<'m> {
    /// Create a context without a root model value
    pub fn new() -> Self {
        Self::with_root_entry(None)
    }

    /// Create a context for validating `root`
    pub fn with_root(root: &'m Value) -> Self {
        Self::with_root_entry(Some(root))
    }

    fn with_root_entry(root: Option<&'m Value>) -> Self {
        Self {
            result: ResultNode::new(),
            path: Vec::new(),
            model_path: vec![ModelPathEntry::new(PathSegment::Key(String::new()), root)],
            root_index: 0,
            current: CurrentEvaluation::default(),
        }
    }

    // ------------------------------------------------------------------------
    // Current constraint
    // ------------------------------------------------------------------------

    /// Set the key of the constraint about to run, resetting message state
    pub fn set_current_constraint_name(&mut self, name: Option<&str>) {
        self.current = CurrentEvaluation {
            constraint_name: name.map(str::to_string),
            message: None,
            message_params: None,
        };
    }

    /// Key of the constraint currently running
    pub fn constraint_name(&self) -> Option<&str> {
        self.current.constraint_name.as_deref()
    }

    /// Set the message for the current result
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.current.message = Some(message.into());
    }

    /// Set the parameters for the current message
    pub fn set_message_params(&mut self, params: Value) {
        self.current.message_params = Some(params);
    }

    /// Message left by the current validator
    pub fn message(&self) -> Option<&str> {
        self.current.message.as_deref()
    }

    /// Message parameters left by the current validator
    pub fn message_params(&self) -> Option<&Value> {
        self.current.message_params.as_ref()
    }

    /// Record the outcome of the current constraint at the current node
    ///
    /// A failure marks the current node invalid and every strict ancestor as
    /// having invalid children.
    pub fn add_result(&mut self, valid: bool) {
        let key = self.current.constraint_name.clone().unwrap_or_default();
        let result = ValidationResult::new(
            valid,
            self.current.message.clone(),
            self.current.message_params.clone(),
        );

        let mut node = &mut self.result;
        for segment in &self.path {
            if !valid {
                node.children_valid = Some(false);
            }
            node = node.child_slot_mut(segment);
        }
        if !valid {
            node.this_valid = false;
        }
        node.record(key, result);
    }

    // ------------------------------------------------------------------------
    // Path
    // ------------------------------------------------------------------------

    /// Enter a property (or index) of the current node
    pub fn push_path(&mut self, segment: impl Into<PathSegment>, value: Option<&'m Value>) {
        let segment = segment.into();
        self.current_node_mut().open_child(&segment);
        self.model_path
            .push(ModelPathEntry::new(segment.clone(), value));
        self.path.push(segment);
    }

    /// Leave the property entered by the matching [`push_path`](Self::push_path)
    pub fn pop_path(&mut self) -> ConfigResult<()> {
        if self.path.pop().is_none() {
            return Err(ConfigError::PathUnderflow);
        }
        self.model_path.pop();
        Ok(())
    }

    /// Number of open path segments below the root
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Segments of the current path, from the root down
    pub fn current_path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Dotted form of the current path (e.g. `pets.0.name`)
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    // ------------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------------

    /// Root of the result tree
    pub fn result(&self) -> &ResultNode {
        &self.result
    }

    /// Consume the context, keeping the result tree
    pub fn into_result(self) -> ResultNode {
        self.result
    }

    /// Node of the current path
    pub fn current_node(&self) -> &ResultNode {
        let mut node = &self.result;
        for segment in &self.path {
            match node.children().and_then(|c| c.get(segment)) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    fn current_node_mut(&mut self) -> &mut ResultNode {
        let mut node = &mut self.result;
        for segment in &self.path {
            node = node.child_slot_mut(segment);
        }
        node
    }

    /// True if anything in this run failed
    pub fn has_validation_errors(&self) -> bool {
        self.result.has_validation_errors()
    }

    /// Check an arbitrary node; no node means no errors
    pub fn node_has_errors(node: Option<&ResultNode>) -> bool {
        node.map_or(false, ResultNode::has_validation_errors)
    }

    // ------------------------------------------------------------------------
    // Model path
    // ------------------------------------------------------------------------

    /// Model path entry `index` steps up from the current one (0 = current)
    pub fn model_path(&self, index: usize) -> ConfigResult<&ModelPathEntry<'m>> {
        let depth = self.model_path.len();
        if index >= depth {
            return Err(ConfigError::PathIndexOutOfRange { index, depth });
        }
        Ok(&self.model_path[depth - index - 1])
    }

    /// Parent entry `index` steps above the immediate parent (0 = parent)
    pub fn parent(&self, index: usize) -> ConfigResult<&ModelPathEntry<'m>> {
        self.model_path(index + 1)
    }

    /// Insert an ancestor above everything else in the model path
    pub fn prepend_parent_path(&mut self, value: &'m Value, name: Option<PathSegment>) {
        self.model_path.insert(0, Self::parent_entry(value, name));
        self.root_index += 1;
    }

    /// Insert an ancestor directly above the root of the model path
    pub fn append_parent_path(&mut self, value: &'m Value, name: Option<PathSegment>) {
        self.model_path
            .insert(self.root_index, Self::parent_entry(value, name));
        self.root_index += 1;
    }

    fn parent_entry(value: &'m Value, name: Option<PathSegment>) -> ModelPathEntry<'m> {
        ModelPathEntry::new(
            name.unwrap_or_else(|| PathSegment::Key(String::new())),
            Some(value),
        )
    }
}

impl Default for ValidationContext<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Children;

    fn fail(vctx: &mut ValidationContext<'_>, key: &str) {
        vctx.set_current_constraint_name(Some(key));
        vctx.add_result(false);
        vctx.set_current_constraint_name(None);
    }

    #[test]
    fn test_push_pop_builds_tree() {
        let mut vctx = ValidationContext::new();
        vctx.push_path("name", None);
        vctx.pop_path().unwrap();
        vctx.push_path("address", None);
        vctx.push_path("street", None);
        vctx.pop_path().unwrap();
        vctx.push_path("number", None);
        vctx.pop_path().unwrap();
        vctx.pop_path().unwrap();
        vctx.push_path("pets", None);
        vctx.push_path(0usize, None);
        vctx.push_path("name", None);
        vctx.pop_path().unwrap();
        vctx.pop_path().unwrap();
        vctx.pop_path().unwrap();

        assert_eq!(vctx.depth(), 0);
        assert!(vctx.model_path(1).is_err());

        let root = vctx.result();
        let Some(Children::Keyed(top)) = root.children() else {
            panic!("root should have keyed children");
        };
        assert_eq!(
            top.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["name", "address", "pets"]
        );

        assert!(root.child("name").unwrap().children().is_none());
        assert_eq!(root.child("address").unwrap().children().unwrap().len(), 2);
        let pets = root.child("pets").unwrap();
        assert!(matches!(pets.children(), Some(Children::Indexed(_))));
        assert!(root.descendant([
            PathSegment::from("pets"),
            PathSegment::Index(0),
            PathSegment::from("name")
        ])
        .is_some());
        assert!(!vctx.has_validation_errors());
    }

    #[test]
    fn test_failure_propagates_to_strict_ancestors() {
        let mut vctx = ValidationContext::new();
        vctx.push_path("sibling", None);
        vctx.pop_path().unwrap();
        vctx.push_path("a", None);
        vctx.push_path("b", None);
        vctx.push_path("c", None);
        fail(&mut vctx, "required");

        let root = vctx.result();
        let a = root.child("a").unwrap();
        let b = a.child("b").unwrap();
        let c = b.child("c").unwrap();

        assert_eq!(root.children_valid(), Some(false));
        assert_eq!(a.children_valid(), Some(false));
        assert_eq!(b.children_valid(), Some(false));
        assert!(root.this_valid() && a.this_valid() && b.this_valid());
        assert!(!c.this_valid());
        assert_eq!(c.children_valid(), None);
        assert!(!c.result_for("required").unwrap().is_valid);

        let sibling = root.child("sibling").unwrap();
        assert!(sibling.this_valid());
        assert!(!sibling.has_validation_errors());
    }

    #[test]
    fn test_failure_on_root_does_not_touch_children_valid() {
        let mut vctx = ValidationContext::new();
        fail(&mut vctx, "root");
        assert!(!vctx.result().this_valid());
        assert_eq!(vctx.result().children_valid(), None);
        assert!(vctx.has_validation_errors());
    }

    #[test]
    fn test_add_result_reads_message() {
        let mut vctx = ValidationContext::new();
        vctx.push_path("age", None);
        vctx.set_current_constraint_name(Some("range"));
        vctx.set_message("too young");
        vctx.set_message_params(Value::object([("min", Value::Int(18))]));
        vctx.add_result(false);

        let result = vctx.current_node().result_for("range").unwrap().clone();
        assert_eq!(result.message.as_deref(), Some("too young"));
        assert_eq!(
            result.params.as_ref().and_then(|p| p.get("min")),
            Some(&Value::Int(18))
        );

        vctx.set_current_constraint_name(Some("next"));
        assert_eq!(vctx.message(), None);
        assert_eq!(vctx.message_params(), None);
        vctx.add_result(true);
        assert_eq!(vctx.current_node().result_for("next").unwrap().message, None);
    }

    #[test]
    fn test_pop_without_push_fails() {
        let mut vctx = ValidationContext::new();
        assert_eq!(vctx.pop_path(), Err(ConfigError::PathUnderflow));
        vctx.push_path("x", None);
        assert!(vctx.pop_path().is_ok());
        assert_eq!(vctx.pop_path(), Err(ConfigError::PathUnderflow));
    }

    #[test]
    fn test_model_path_and_parent() {
        let root = Value::object([("address", Value::object([("street", Value::from("X"))]))]);
        let address = root.get("address").unwrap();
        let street = address.get("street").unwrap();

        let mut vctx = ValidationContext::with_root(&root);
        vctx.push_path("address", Some(address));
        vctx.push_path("street", Some(street));

        assert_eq!(vctx.model_path(0).unwrap().value, Some(street));
        assert_eq!(vctx.parent(0).unwrap().path, PathSegment::from("address"));
        assert_eq!(vctx.parent(1).unwrap().value, Some(&root));
        assert_eq!(vctx.path_string(), "address.street");
        assert_eq!(
            vctx.parent(2),
            Err(ConfigError::PathIndexOutOfRange { index: 3, depth: 3 })
        );
    }

    #[test]
    fn test_parent_path_insertion_order() {
        let root = Value::from("root");
        let p1 = Value::from("p1");
        let p2 = Value::from("p2");
        let a1 = Value::from("a1");
        let a2 = Value::from("a2");

        let mut vctx = ValidationContext::with_root(&root);
        vctx.append_parent_path(&a1, Some("a1".into()));
        vctx.prepend_parent_path(&p1, None);
        vctx.append_parent_path(&a2, Some("a2".into()));
        vctx.prepend_parent_path(&p2, Some(PathSegment::Index(0)));

        // front to back: p2, p1, a1, a2, root
        let order: Vec<_> = (0..5)
            .map(|i| vctx.model_path(i).unwrap().value.and_then(Value::as_str).unwrap())
            .collect();
        assert_eq!(order, vec!["root", "a2", "a1", "p1", "p2"]);
        assert_eq!(vctx.parent(0).unwrap().path, PathSegment::from("a2"));
        assert_eq!(vctx.parent(2).unwrap().path, PathSegment::Key(String::new()));
        assert!(vctx.model_path(5).is_err());
    }

    #[test]
    fn test_node_has_errors_on_none() {
        assert!(!ValidationContext::node_has_errors(None));
        let node = ResultNode::new();
        assert!(!ValidationContext::node_has_errors(Some(&node)));
    }
}
