//! AST projection.
//!
//! A `SyntaxNode` is a borrowed view over an object `Value` that carries a
//! discriminator field (`_nodetype` in pycparser's JSON export). Nothing is
//! copied: the node keeps references into the document, and children are only
//! projected when an accessor asks for them.

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::value::{Map, Value, escape_pointer_token};

pub const DEFAULT_DISCRIMINATOR: &str = "_nodetype";

// ------------------------------- Errors ----------------------------------- //

/// The document does not have the shape of a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("expected an object at {path}, found {found}")]
    NotAnObject { path: String, found: &'static str },
    #[error("expected an array at {path}, found {found}")]
    NotAnArray { path: String, found: &'static str },
    #[error("object at {path} has no `{discriminator}` discriminator")]
    MissingDiscriminator { path: String, discriminator: String },
}

impl ProjectionError {
    /// JSON-pointer-style location of the offending value.
    pub fn path(&self) -> &str {
        match self {
            ProjectionError::NotAnObject { path, .. }
            | ProjectionError::NotAnArray { path, .. }
            | ProjectionError::MissingDiscriminator { path, .. } => path,
        }
    }
}

// -------------------------------- Paths ----------------------------------- //

/// Location of a value inside the document.
///
/// Child paths share their parent's segments, so extending a path is O(1)
/// no matter how deep the tree is; the pointer text is only built when an
/// error needs it.
#[derive(Debug, Clone, Default)]
pub struct NodePath<'a>(Option<Rc<Segment<'a>>>);

#[derive(Debug)]
struct Segment<'a> {
    parent: NodePath<'a>,
    step: Step<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> NodePath<'a> {
    pub fn root() -> Self {
        NodePath(None)
    }

    pub fn child(&self, key: &'a str) -> Self {
        self.extend(Step::Key(key))
    }

    pub fn index(&self, index: usize) -> Self {
        self.extend(Step::Index(index))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_none()
    }

    fn extend(&self, step: Step<'a>) -> Self {
        NodePath(Some(Rc::new(Segment { parent: self.clone(), step })))
    }

    /// RFC 6901 rendering; the root is the empty string.
    pub fn to_pointer(&self) -> String {
        let mut steps = Vec::new();
        let mut cursor = self.0.as_deref();
        while let Some(segment) = cursor {
            steps.push(segment.step);
            cursor = segment.parent.0.as_deref();
        }
        let mut out = String::new();
        for step in steps.iter().rev() {
            out.push('/');
            match step {
                Step::Key(key) => out.push_str(&escape_pointer_token(key)),
                Step::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }
}

impl fmt::Display for NodePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.to_pointer())
        }
    }
}

// Long chains are unlinked iteratively once their last owner goes away.
impl Drop for NodePath<'_> {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(segment) = next {
            match Rc::try_unwrap(segment) {
                Ok(mut segment) => next = segment.parent.0.take(),
                Err(_) => break,
            }
        }
    }
}

// -------------------------------- Nodes ----------------------------------- //

#[derive(Debug, Clone)]
pub struct SyntaxNode<'a> {
    kind: &'a str,
    object: &'a Map,
    discriminator: &'a str,
    path: NodePath<'a>,
}

/// Project a root value. Fails unless it is an object carrying `discriminator`.
pub fn project<'a>(value: &'a Value, discriminator: &'a str) -> Result<SyntaxNode<'a>, ProjectionError> {
    match value {
        Value::Object(object) => SyntaxNode::from_object(object, discriminator, NodePath::root()),
        other => Err(ProjectionError::NotAnObject {
            path: NodePath::root().to_string(),
            found: other.type_name(),
        }),
    }
}

/// The discriminator value of an object, if it has a string one.
pub(crate) fn kind_of<'a>(object: &'a Map, discriminator: &str) -> Option<&'a str> {
    object.get(discriminator).and_then(Value::as_str)
}

impl<'a> SyntaxNode<'a> {
    pub(crate) fn from_object(
        object: &'a Map,
        discriminator: &'a str,
        path: NodePath<'a>,
    ) -> Result<Self, ProjectionError> {
        match kind_of(object, discriminator) {
            Some(kind) => Ok(SyntaxNode { kind, object, discriminator, path }),
            None => Err(ProjectionError::MissingDiscriminator {
                path: path.to_string(),
                discriminator: discriminator.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> &'a str {
        self.kind
    }

    pub fn discriminator(&self) -> &'a str {
        self.discriminator
    }

    pub fn path(&self) -> &NodePath<'a> {
        &self.path
    }

    /// A field other than the discriminator.
    pub fn field(&self, key: &str) -> Option<&'a Value> {
        if key == self.discriminator {
            None
        } else {
            self.object.get(key)
        }
    }

    /// A string-valued field; `None` when absent or of another type.
    pub fn field_str(&self, key: &str) -> Option<&'a str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Every field except the discriminator, in document order.
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        let discriminator = self.discriminator;
        self.object
            .iter()
            .filter(move |(key, _)| key.as_str() != discriminator)
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Project an object-valued field. Absent and `null` fields are `None`.
    pub fn field_as_node(&self, key: &'a str) -> Result<Option<SyntaxNode<'a>>, ProjectionError> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(object)) => {
                SyntaxNode::from_object(object, self.discriminator, self.path.child(key)).map(Some)
            }
            Some(other) => Err(ProjectionError::NotAnObject {
                path: self.path.child(key).to_string(),
                found: other.type_name(),
            }),
        }
    }

    /// Project the object elements of an array-valued field, in order.
    /// Absent and `null` fields are empty; non-object elements are skipped.
    pub fn field_as_node_array(&self, key: &'a str) -> Result<Vec<SyntaxNode<'a>>, ProjectionError> {
        match self.field(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => {
                let base = self.path.child(key);
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| match item {
                        Value::Object(object) => {
                            Some(SyntaxNode::from_object(object, self.discriminator, base.index(index)))
                        }
                        _ => None,
                    })
                    .collect()
            }
            Some(other) => Err(ProjectionError::NotAnArray {
                path: self.path.child(key).to_string(),
                found: other.type_name(),
            }),
        }
    }

    /// Rebuild the object this node was projected from.
    pub fn to_value(&self) -> Value {
        Value::Object(self.object.clone())
    }
}

// ------------------------------- Tests ------------------------------------ //
