//! Value classification, node paths and the placeholder exemption.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// Structural markers such as `<FIELD_NAME>`: an upper-case token in angle
/// brackets, optionally split by underscores. Anchored: the whole text must match.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<[A-Z][A-Z_]*>$").unwrap());

/// Shape of a JSON value as seen by the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    Scalar,
}

/// Classify a value. Total: every value is exactly one kind.
pub fn classify(value: &Value) -> NodeKind {
    match value {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        _ => NodeKind::Scalar,
    }
}

/// A mutable view of a value, split by kind so the traversal can dispatch
/// with a single match.
#[derive(Debug)]
pub enum Node<'a> {
    Object(&'a mut Map<String, Value>),
    Array(&'a mut Vec<Value>),
    Scalar(&'a mut Value),
}

impl<'a> From<&'a mut Value> for Node<'a> {
    fn from(value: &'a mut Value) -> Self {
        match value {
            Value::Object(map) => Node::Object(map),
            Value::Array(items) => Node::Array(items),
            scalar => Node::Scalar(scalar),
        }
    }
}

/// Canonical textual form of a scalar, as handed to detection.
///
/// Strings are passed verbatim, numbers and booleans use their JSON
/// rendering, and null becomes `null`. Containers render as compact JSON,
/// though the traversal never asks for them.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Whether `text` is a structural placeholder that must bypass redaction.
pub fn is_placeholder(text: &str) -> bool {
    PLACEHOLDER_RE.is_match(text)
}

/// One step from a container to a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a node relative to the document root.
///
/// Displays as a JSON Pointer (RFC 6901), so `Value::pointer` resolves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?,
                PathSegment::Index(index) => write!(f, "/{}", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify() {
        assert_eq!(classify(&json!({"a": 1})), NodeKind::Object);
        assert_eq!(classify(&json!({})), NodeKind::Object);
        assert_eq!(classify(&json!([1, 2])), NodeKind::Array);
        assert_eq!(classify(&json!("text")), NodeKind::Scalar);
        assert_eq!(classify(&json!(3.5)), NodeKind::Scalar);
        assert_eq!(classify(&json!(false)), NodeKind::Scalar);
        assert_eq!(classify(&Value::Null), NodeKind::Scalar);
    }

    #[test]
    fn test_node_from_value() {
        let mut value = json!({"k": [1]});
        match Node::from(&mut value) {
            Node::Object(map) => {
                let inner = map.get_mut("k").unwrap();
                assert!(matches!(Node::from(inner), Node::Array(items) if items.len() == 1));
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("call me")), "call me");
        assert_eq!(scalar_text(&json!(42)), "42");
        assert_eq!(scalar_text(&json!(-7)), "-7");
        assert_eq!(scalar_text(&json!(1.5)), "1.5");
        assert_eq!(scalar_text(&json!(true)), "true");
        assert_eq!(scalar_text(&Value::Null), "null");
    }

    #[test]
    fn test_placeholder_matches() {
        assert!(is_placeholder("<ID>"));
        assert!(is_placeholder("<FIELD_NAME>"));
        assert!(is_placeholder("<PHONE_NUMBER>"));
        assert!(is_placeholder("<A__B_>"));
    }

    #[test]
    fn test_placeholder_rejects() {
        assert!(!is_placeholder("<>"));
        assert!(!is_placeholder("<id>"));
        assert!(!is_placeholder("<_ID>"));
        assert!(!is_placeholder("<ID1>"));
        assert!(!is_placeholder("ID"));
        assert!(!is_placeholder("call <NAME>"));
        assert!(!is_placeholder("<NAME> called"));
        assert!(!is_placeholder("<Field_Name>"));
    }

    #[test]
    fn test_path_display_is_json_pointer() {
        let path = NodePath::root().key("notes").index(0);
        assert_eq!(path.to_string(), "/notes/0");
        assert_eq!(NodePath::root().to_string(), "");

        let escaped = NodePath::root().key("a/b").key("c~d");
        assert_eq!(escaped.to_string(), "/a~1b/c~0d");

        let doc = json!({"a/b": {"c~d": "x"}, "notes": ["y"]});
        assert_eq!(doc.pointer(&escaped.to_string()), Some(&json!("x")));
        assert_eq!(doc.pointer(&path.to_string()), Some(&json!("y")));
    }
}
