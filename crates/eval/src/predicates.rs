//! Predicate expressions over element properties.
//!
//! Builders produce a [`Predicate`] tree; [`Predicate::test`] evaluates it
//! against one element. A predicate converts into a [`Callback`] so it can
//! be handed to `filter`, `allMatch`, `partition` and friends.
//!
//! Every comparison reads its left-hand side through a [`PropertyPath`]
//! (`"publisher.name"`, a recorded program, or the element itself).

use fluent_core::{Callback, Collection, FluentError, PropertyPath, PropertyReader, Value};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Loose equality.
    Eq,
    /// Strict equality.
    Identical,
    Gt,
    Lt,
    Gte,
    Lte,
}

#[derive(Debug, Clone)]
pub enum Predicate {
    Compare {
        path: PropertyPath,
        op: Comparison,
        value: Value,
    },
    In {
        path: PropertyPath,
        values: Collection,
    },
    NotNull(PropertyPath),
    Contains {
        path: PropertyPath,
        needle: Value,
    },
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    /// Arbitrary callable, truthiness of its result.
    Callback(Callback),
}

impl Predicate {
    pub fn test(&self, element: &Value) -> Result<bool, FluentError> {
        let reader = PropertyReader;
        match self {
            Predicate::Compare { path, op, value } => {
                let actual = reader.read(element, path)?;
                Ok(match op {
                    Comparison::Eq => actual.loose_eq(value),
                    Comparison::Identical => actual == *value,
                    Comparison::Gt => actual.compare(value) == Ordering::Greater,
                    Comparison::Lt => actual.compare(value) == Ordering::Less,
                    Comparison::Gte => actual.compare(value) != Ordering::Less,
                    Comparison::Lte => actual.compare(value) != Ordering::Greater,
                })
            }
            Predicate::In { path, values } => {
                let actual = reader.read(element, path)?;
                Ok(values.values().any(|v| v.loose_eq(&actual)))
            }
            Predicate::NotNull(path) => Ok(!reader.read(element, path)?.is_null()),
            Predicate::Contains { path, needle } => {
                let haystack = reader.read(element, path)?;
                match &haystack {
                    Value::Text(text) => Ok(text.contains(needle.to_text()?.as_str())),
                    Value::Collection(items) => Ok(items.values().any(|v| v.loose_eq(needle))),
                    _ => Ok(false),
                }
            }
            Predicate::Not(inner) => Ok(!inner.test(element)?),
            Predicate::All(predicates) => {
                for p in predicates {
                    if !p.test(element)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Predicate::Any(predicates) => {
                for p in predicates {
                    if p.test(element)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::Callback(cb) => Ok(cb.call(std::slice::from_ref(element))?.is_truthy()),
        }
    }
}

impl From<Predicate> for Callback {
    fn from(predicate: Predicate) -> Self {
        Callback::unary(move |element| predicate.test(element).map(Value::Bool))
    }
}

impl From<Callback> for Predicate {
    fn from(cb: Callback) -> Self {
        Predicate::Callback(cb)
    }
}

// ──────────────────────────────────────────────
// Builders
// ──────────────────────────────────────────────

fn compare(path: impl Into<PropertyPath>, op: Comparison, value: impl Into<Value>) -> Predicate {
    Predicate::Compare {
        path: path.into(),
        op,
        value: value.into(),
    }
}

pub fn eq(path: impl Into<PropertyPath>, value: impl Into<Value>) -> Predicate {
    compare(path, Comparison::Eq, value)
}

pub fn identical(path: impl Into<PropertyPath>, value: impl Into<Value>) -> Predicate {
    compare(path, Comparison::Identical, value)
}

pub fn gt(path: impl Into<PropertyPath>, value: impl Into<Value>) -> Predicate {
    compare(path, Comparison::Gt, value)
}

pub fn lt(path: impl Into<PropertyPath>, value: impl Into<Value>) -> Predicate {
    compare(path, Comparison::Lt, value)
}

pub fn gte(path: impl Into<PropertyPath>, value: impl Into<Value>) -> Predicate {
    compare(path, Comparison::Gte, value)
}

pub fn lte(path: impl Into<PropertyPath>, value: impl Into<Value>) -> Predicate {
    compare(path, Comparison::Lte, value)
}

pub fn not(predicate: impl Into<Predicate>) -> Predicate {
    Predicate::Not(Box::new(predicate.into()))
}

pub fn and_x<I, P>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = P>,
    P: Into<Predicate>,
{
    Predicate::All(predicates.into_iter().map(Into::into).collect())
}

pub fn or_x<I, P>(predicates: I) -> Predicate
where
    I: IntoIterator<Item = P>,
    P: Into<Predicate>,
{
    Predicate::Any(predicates.into_iter().map(Into::into).collect())
}

/// Loose membership of the property value in `values`.
pub fn is_in(path: impl Into<PropertyPath>, values: impl Into<Collection>) -> Predicate {
    Predicate::In {
        path: path.into(),
        values: values.into(),
    }
}

pub fn not_null(path: impl Into<PropertyPath>) -> Predicate {
    Predicate::NotNull(path.into())
}

pub fn is_null(path: impl Into<PropertyPath>) -> Predicate {
    identical(path, Value::Null)
}

pub fn is_true(path: impl Into<PropertyPath>) -> Predicate {
    identical(path, true)
}

pub fn is_false(path: impl Into<PropertyPath>) -> Predicate {
    identical(path, false)
}

/// Substring test for text, loose membership for collections.
pub fn contains(path: impl Into<PropertyPath>, needle: impl Into<Value>) -> Predicate {
    Predicate::Contains {
        path: path.into(),
        needle: needle.into(),
    }
}
