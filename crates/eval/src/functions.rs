//! Ready-made callbacks.

use fluent_core::{Callback, PropertyPath, PropertyReader, Value};

/// Reads `path` from the element.
pub fn property_value(path: impl Into<PropertyPath>) -> Callback {
    let path = path.into();
    let reader = PropertyReader;
    Callback::unary(move |element| reader.read(element, &path))
}

/// Wraps `inner` so it only ever sees the element, never its key.
pub fn unary(inner: impl Into<Callback>) -> Callback {
    let inner = inner.into();
    Callback::new(move |args| match args.first() {
        Some(first) => inner.call(std::slice::from_ref(first)),
        None => inner.call(&[]),
    })
}

/// Size of the collection at `path`: its length, 0 for null, 1 for anything
/// else.
pub fn count(path: impl Into<PropertyPath>) -> Callback {
    let path = path.into();
    let reader = PropertyReader;
    Callback::unary(move |element| {
        Ok(match reader.read(element, &path)? {
            Value::Collection(c) => Value::from(c.len()),
            Value::Null => Value::Int(0),
            _ => Value::Int(1),
        })
    })
}
