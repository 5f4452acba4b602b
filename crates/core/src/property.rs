//! Property-path reading.
//!
//! A [`PropertyPath`] is either the identity, a dotted path such as
//! `"publisher.name"`, or a recorded program. Dotted segments resolve
//! against collections by key and against objects through getters
//! (`getName`, `isName`, `name`), fields and offsets, in that order.

use crate::collection::Key;
use crate::error::FluentError;
use crate::recorder::Recorder;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropertyPath {
    /// The value itself.
    #[default]
    Identity,
    Dotted(Vec<String>),
    Program(Recorder),
}

impl PropertyPath {
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            PropertyPath::Identity
        } else {
            PropertyPath::Dotted(path.split('.').map(str::to_string).collect())
        }
    }
}

impl From<&str> for PropertyPath {
    fn from(path: &str) -> Self {
        PropertyPath::parse(path)
    }
}

impl From<String> for PropertyPath {
    fn from(path: String) -> Self {
        PropertyPath::parse(&path)
    }
}

impl From<Option<&str>> for PropertyPath {
    fn from(path: Option<&str>) -> Self {
        path.map(PropertyPath::parse).unwrap_or_default()
    }
}

impl From<Recorder> for PropertyPath {
    fn from(recorder: Recorder) -> Self {
        PropertyPath::Program(recorder)
    }
}

/// Stateless reader; cheap to copy into closures.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyReader;

impl PropertyReader {
    pub fn read(&self, target: &Value, path: &PropertyPath) -> Result<Value, FluentError> {
        match path {
            PropertyPath::Identity => Ok(target.clone()),
            PropertyPath::Program(recorder) => recorder.replay(target),
            PropertyPath::Dotted(segments) => {
                let mut current = target.clone();
                for segment in segments {
                    current = read_segment(&current, segment)?;
                }
                Ok(current)
            }
        }
    }
}

fn read_segment(target: &Value, property: &str) -> Result<Value, FluentError> {
    match target {
        Value::Collection(c) => Ok(c.get(&Key::from_text(property)).cloned().unwrap_or(Value::Null)),
        Value::Object(_) | Value::Optional(_) => {
            lookup_member(target, property)?.ok_or_else(|| FluentError::UnreadableProperty {
                property: property.to_string(),
                type_name: target.type_name().to_string(),
            })
        }
        _ => Ok(Value::Null),
    }
}

/// Resolves `name` on `target`: `get<Name>()`, `is<Name>()`, `<name>()`,
/// then the field, then an offset read. `None` when nothing matches.
pub(crate) fn lookup_member(target: &Value, name: &str) -> Result<Option<Value>, FluentError> {
    let capitalized = capitalize(name);
    let getters = [
        format!("get{}", capitalized),
        format!("is{}", capitalized),
        name.to_string(),
    ];

    for getter in &getters {
        if target.has_method(getter) {
            return target.call_method(getter, &[]).map(Some);
        }
    }

    if let Some(value) = target.field(name) {
        return Ok(Some(value));
    }

    if target.is_indexable() {
        return Ok(Some(
            target.offset(&Key::from_text(name)).unwrap_or(Value::Null),
        ));
    }

    Ok(None)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
