//! Receiver capabilities and constructible target types.
//!
//! The recorder and the property reader never know the concrete type they
//! are replayed against. Host types opt in by implementing [`Object`], which
//! answers "do you have a method called X", "call X with these arguments",
//! "what is in field X" and, optionally, offset reads, iteration and a
//! string form.

use std::fmt;
use std::rc::Rc;

use crate::collection::{Collection, Key};
use crate::error::FluentError;
use crate::value::Value;

/// A host value that recorders and property paths can be replayed against.
pub trait Object: fmt::Debug {
    /// Name used in error messages (`NoSuchMethod`, `UnreadableProperty`).
    fn type_name(&self) -> &str;

    fn has_method(&self, name: &str) -> bool;

    /// Invokes a method previously confirmed by [`Object::has_method`].
    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, FluentError>;

    /// Public field lookup; `None` when the field does not exist.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Whether the object answers offset reads (`object[key]`).
    fn supports_offsets(&self) -> bool {
        false
    }

    fn offset_get(&self, _key: &Key) -> Option<Value> {
        None
    }

    /// Entries in iteration order for objects that can be traversed;
    /// `None` for anything else.
    fn entries(&self) -> Option<Collection> {
        None
    }

    /// String form used by `join` and other text conversions.
    fn to_text(&self) -> Option<String> {
        None
    }
}

// ──────────────────────────────────────────────
// Target types for `to`
// ──────────────────────────────────────────────

/// Constructor body: receives the positional constructor arguments.
pub type ConstructFn = dyn Fn(Vec<Value>) -> Result<Value, FluentError>;

/// One declared constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub optional: bool,
    /// Set when the parameter is typed with a class rather than a plain
    /// container; such a parameter cannot receive the collection.
    pub class_hint: Option<String>,
}

impl Parameter {
    pub fn required(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            optional: false,
            class_hint: None,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            optional: true,
            class_hint: None,
        }
    }

    pub fn with_class_hint(mut self, class: impl Into<String>) -> Self {
        self.class_hint = Some(class.into());
        self
    }
}

#[derive(Clone)]
pub struct Constructor {
    pub public: bool,
    pub parameters: Vec<Parameter>,
    build: Rc<ConstructFn>,
}

impl Constructor {
    pub fn new<F>(parameters: Vec<Parameter>, build: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, FluentError> + 'static,
    {
        Constructor {
            public: true,
            parameters,
            build: Rc::new(build),
        }
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|p| !p.optional).count()
    }

    pub fn construct(&self, args: Vec<Value>) -> Result<Value, FluentError> {
        (self.build)(args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("public", &self.public)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A named type a pipeline can be converted into with `to`.
#[derive(Debug, Clone)]
pub struct TargetType {
    name: String,
    constructor: Option<Constructor>,
}

impl TargetType {
    /// A type without any constructor.
    pub fn new(name: impl Into<String>) -> Self {
        TargetType {
            name: name.into(),
            constructor: None,
        }
    }

    pub fn with_constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }
}
