//! Callables passed to pipeline operations.
//!
//! Pipeline callbacks are invoked with `(value, key)`. A callback is either a
//! native closure or a standalone [`Recorder`], which replays against the
//! first argument. Recorders spawned by a composer for optional terminals are
//! not callable and are rejected with `InvalidUsage`.

use std::fmt;
use std::rc::Rc;

use crate::error::FluentError;
use crate::recorder::Recorder;
use crate::value::Value;

pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, FluentError>;

#[derive(Clone)]
pub enum Callback {
    Native(Rc<NativeFn>),
    Recorder(Recorder),
}

impl Callback {
    /// Callback receiving every positional argument.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FluentError> + 'static,
    {
        Callback::Native(Rc::new(func))
    }

    /// Callback that only looks at its first argument.
    pub fn unary<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, FluentError> + 'static,
    {
        Callback::new(move |args| func(args.first().unwrap_or(&Value::Null)))
    }

    /// Callback over the first two arguments (comparators, reducers).
    pub fn binary<F>(func: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value, FluentError> + 'static,
    {
        Callback::new(move |args| {
            let a = args.first().unwrap_or(&Value::Null);
            let b = args.get(1).unwrap_or(&Value::Null);
            func(a, b)
        })
    }

    /// Infallible unary predicate.
    pub fn predicate<F>(func: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        Callback::unary(move |v| Ok(Value::Bool(func(v))))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, FluentError> {
        match self {
            Callback::Native(func) => func(args),
            Callback::Recorder(recorder) => recorder.replay(args.first().unwrap_or(&Value::Null)),
        }
    }

    pub fn is_callable(&self) -> bool {
        match self {
            Callback::Native(_) => true,
            Callback::Recorder(recorder) => recorder.is_callable(),
        }
    }

    /// Rejects composer-spawned recorders passed to `method`.
    pub fn ensure_callable(&self, method: &str) -> Result<&Self, FluentError> {
        if self.is_callable() {
            Ok(self)
        } else {
            Err(FluentError::InvalidUsage {
                method: method.to_string(),
            })
        }
    }
}

impl From<Recorder> for Callback {
    fn from(recorder: Recorder) -> Self {
        Callback::Recorder(recorder)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callback::Native(a), Callback::Native(b)) => Rc::ptr_eq(a, b),
            (Callback::Recorder(a), Callback::Recorder(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Native(_) => f.write_str("Callback::Native(..)"),
            Callback::Recorder(r) => f.debug_tuple("Callback::Recorder").field(r).finish(),
        }
    }
}

/// Extracts a callable argument at `index` for `method`.
///
/// A missing argument or a non-callback value is `InvalidArgument`; a
/// composer-spawned recorder is `InvalidUsage`.
pub fn callback_arg<'a>(
    args: &'a [Value],
    index: usize,
    method: &str,
) -> Result<&'a Callback, FluentError> {
    match args.get(index) {
        Some(Value::Callback(cb)) => cb.ensure_callable(method),
        other => Err(FluentError::invalid_argument(format!(
            "invalid callback \"{}\" was provided to method \"{}\"",
            other.map(Value::type_name).unwrap_or("nothing"),
            method
        ))),
    }
}

/// Like [`callback_arg`] but a missing or null argument yields `None`.
pub fn optional_callback_arg<'a>(
    args: &'a [Value],
    index: usize,
    method: &str,
) -> Result<Option<&'a Callback>, FluentError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => callback_arg(args, index, method).map(Some),
    }
}
