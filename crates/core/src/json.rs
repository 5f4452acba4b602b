//! Conversion between [`Value`] and `serde_json::Value`.

use rust_decimal::Decimal;

use crate::collection::{Collection, Key};
use crate::error::FluentError;
use crate::value::Value;

impl Value {
    /// Builds a value from JSON. Integral numbers become `Int`, other
    /// numbers `Decimal`; object keys are normalized like array offsets.
    pub fn from_json(json: &serde_json::Value) -> Result<Value, FluentError> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => {
                    let d = n.to_string().parse::<Decimal>().map_err(|e| {
                        FluentError::invalid_argument(format!("invalid number {}: {}", n, e))
                    })?;
                    Value::Decimal(d)
                }
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::Collection(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .collect(),
            ),
            serde_json::Value::Object(fields) => {
                let mut collection = Collection::new();
                for (key, value) in fields {
                    collection.insert(Key::from_text(key), Value::from_json(value)?);
                }
                Value::Collection(collection)
            }
        })
    }

    /// Renders plain data as JSON. List-shaped collections become arrays,
    /// other collections objects; optionals collapse to their value or null.
    pub fn to_json(&self) -> Result<serde_json::Value, FluentError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Decimal(d) => d
                .normalize()
                .to_string()
                .parse::<serde_json::Number>()
                .map(serde_json::Value::Number)
                .map_err(|e| {
                    FluentError::invalid_argument(format!("decimal {} not representable: {}", d, e))
                })?,
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Collection(c) if c.is_list() => serde_json::Value::Array(
                c.values()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Collection(c) => {
                let mut object = serde_json::Map::new();
                for (key, value) in c.iter() {
                    object.insert(key.to_string(), value.to_json()?);
                }
                serde_json::Value::Object(object)
            }
            Value::Optional(inner) => match inner {
                Some(v) => v.to_json()?,
                None => serde_json::Value::Null,
            },
            other => {
                return Err(FluentError::invalid_argument(format!(
                    "{} has no JSON representation",
                    other.type_name()
                )))
            }
        })
    }
}
