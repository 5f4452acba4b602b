//! Receiver-agnostic access recorder.
//!
//! A [`Recorder`] captures a chain of property reads, method calls and index
//! reads without knowing what it will be applied to, then replays the chain
//! against a concrete receiver. Replay stops with `Null` as soon as the
//! carried value can no longer be accessed; only a missing *method* is an
//! error.

use tracing::{debug, trace};

use crate::collection::Key;
use crate::error::FluentError;
use crate::property::lookup_member;
use crate::value::Value;

/// One recorded step.
#[derive(Debug, Clone, PartialEq)]
pub enum Movement {
    Property(String),
    Call { method: String, args: Vec<Value> },
    Index(Key),
}

/// Replayable program of movements.
///
/// Chaining methods take `&mut self` and return `&mut Self`, so a recorder
/// handed out by a composer can be extended in place:
///
/// ```
/// use fluent_core::{Recorder, Value};
///
/// let mut name = Recorder::record();
/// name.index("publisher").index("name");
///
/// let book = Value::Collection(fluent_core::Collection::from_entries(vec![(
///     "publisher",
///     Value::Collection(fluent_core::Collection::from_entries(vec![("name", Value::from("halion"))])),
/// )]));
/// assert_eq!(name.replay(&book).unwrap(), Value::from("halion"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Recorder {
    movements: Vec<Movement>,
    callable: bool,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::record()
    }
}

impl Recorder {
    /// Empty recorder usable as a callback.
    pub fn record() -> Self {
        Recorder {
            movements: Vec::new(),
            callable: true,
        }
    }

    /// Empty recorder standing in for a not-yet-computed optional result.
    /// It cannot be used as a callback.
    pub fn placeholder() -> Self {
        Recorder {
            movements: Vec::new(),
            callable: false,
        }
    }

    pub fn property(&mut self, name: impl Into<String>) -> &mut Self {
        self.movements.push(Movement::Property(name.into()));
        self
    }

    pub fn call<I>(&mut self, method: impl Into<String>, args: I) -> &mut Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.movements.push(Movement::Call {
            method: method.into(),
            args: args.into_iter().collect(),
        });
        self
    }

    pub fn index(&mut self, key: impl Into<Key>) -> &mut Self {
        self.movements.push(Movement::Index(key.into()));
        self
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn is_empty(&self) -> bool {
        self.movements.is_empty()
    }

    pub fn is_callable(&self) -> bool {
        self.callable
    }

    /// Applies the recorded movements to `receiver` in order.
    pub fn replay(&self, receiver: &Value) -> Result<Value, FluentError> {
        let mut current = receiver.clone();

        for (step, movement) in self.movements.iter().enumerate() {
            if !current.is_accessible() {
                debug!(
                    step,
                    receiver = current.type_name(),
                    "recorder replay short-circuited to null"
                );
                return Ok(Value::Null);
            }

            trace!(step, movement = ?movement, "recorder replay");
            current = match movement {
                Movement::Property(name) => lookup_member(&current, name)?.unwrap_or(Value::Null),
                Movement::Call { method, args } => current.call_method(method, args)?,
                Movement::Index(key) => current.offset(key).unwrap_or(Value::Null),
            };
        }

        Ok(current)
    }
}
