//! Runtime values.
//!
//! Pipelines operate on dynamically typed values. Scalars, collections and
//! optionals are plain data; objects, callbacks and target types are shared
//! handles compared by identity. Non-integer numbers use
//! `rust_decimal::Decimal`, never `f64`.

use std::cmp::Ordering;
use std::rc::Rc;

use rust_decimal::Decimal;

use crate::callback::{callback_arg, Callback};
use crate::collection::{Collection, Key};
use crate::error::FluentError;
use crate::object::{Object, TargetType};

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Collection(Collection),
    Optional(Option<Box<Value>>),
    Object(Rc<dyn Object>),
    Callback(Callback),
    Type(Rc<TargetType>),
}

/// Methods an optional value answers to.
const OPTIONAL_METHODS: &[&str] = &[
    "map",
    "flatMap",
    "filter",
    "get",
    "getOrElse",
    "getOrCall",
    "orElse",
    "isEmpty",
    "isDefined",
];

impl Value {
    pub fn none() -> Value {
        Value::Optional(None)
    }

    pub fn some(value: impl Into<Value>) -> Value {
        Value::Optional(Some(Box::new(value.into())))
    }

    /// Optional that is empty when `value` is null.
    pub fn optional_from(value: Value) -> Value {
        match value {
            Value::Null => Value::none(),
            other => Value::some(other),
        }
    }

    pub fn object(object: impl Object + 'static) -> Value {
        Value::Object(Rc::new(object))
    }

    /// List-shaped collection (keys `0..n`).
    pub fn list<I, V>(values: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Collection(values.into_iter().map(Into::into).collect())
    }

    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "string",
            Value::Collection(_) => "array",
            Value::Optional(_) => "Option",
            Value::Object(o) => o.type_name(),
            Value::Callback(_) => "callable",
            Value::Type(_) => "type",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether property, method or index access can be applied to this value.
    pub fn is_accessible(&self) -> bool {
        matches!(
            self,
            Value::Collection(_) | Value::Optional(_) | Value::Object(_)
        )
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Text(s) => !s.is_empty() && s != "0",
            Value::Collection(c) => !c.is_empty(),
            Value::Optional(_) | Value::Object(_) | Value::Callback(_) | Value::Type(_) => true,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Entries of an array or of a traversable object.
    pub fn iterable_entries(&self) -> Option<Collection> {
        match self {
            Value::Collection(c) => Some(c.clone()),
            Value::Object(o) => o.entries(),
            _ => None,
        }
    }

    pub fn is_iterable(&self) -> bool {
        match self {
            Value::Collection(_) => true,
            Value::Object(o) => o.entries().is_some(),
            _ => false,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view: ints, decimals and numeric text.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Int(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            Value::Text(s) => numeric_text(s),
            _ => None,
        }
    }

    /// Converts a scalar to text the way string interpolation does.
    pub fn to_text(&self) -> Result<String, FluentError> {
        match self {
            Value::Null => Ok(String::new()),
            Value::Bool(true) => Ok("1".to_string()),
            Value::Bool(false) => Ok(String::new()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Decimal(d) => Ok(d.normalize().to_string()),
            Value::Text(s) => Ok(s.clone()),
            Value::Object(o) => o.to_text().ok_or_else(|| {
                FluentError::invalid_argument(format!(
                    "{} can not be converted to string",
                    o.type_name()
                ))
            }),
            other => Err(FluentError::invalid_argument(format!(
                "{} can not be converted to string",
                other.type_name()
            ))),
        }
    }

    // ──────────────────────────────────────────────
    // Comparison
    // ──────────────────────────────────────────────

    /// Loose (`==`) equality: numbers compare numerically across int,
    /// decimal and numeric text; bools and null compare by truthiness;
    /// collections compare key by key.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(_), _) | (_, Value::Bool(_)) => self.is_truthy() == other.is_truthy(),
            (Value::Null, x) | (x, Value::Null) => !x.is_truthy(),
            (Value::Text(a), Value::Text(b)) => match (numeric_text(a), numeric_text(b)) {
                (Some(x), Some(y)) => x == y,
                _ => a == b,
            },
            (Value::Collection(a), Value::Collection(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map(|w| v.loose_eq(w)).unwrap_or(false))
            }
            (Value::Optional(a), Value::Optional(b)) => match (a, b) {
                (None, None) => true,
                (Some(x), Some(y)) => x.loose_eq(y),
                _ => false,
            },
            (Value::Text(s), n) | (n, Value::Text(s)) if is_number(n) => match numeric_text(s) {
                Some(x) => n.as_number() == Some(x),
                None => n.to_text().map(|t| &t == s).unwrap_or(false),
            },
            _ if is_number(self) && is_number(other) => self.as_number() == other.as_number(),
            _ => self == other,
        }
    }

    /// Three-way comparison used for default ordering, `max`, `min` and the
    /// ordering predicates.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(_), _) | (_, Value::Bool(_)) | (Value::Null, _) | (_, Value::Null) => {
                self.is_truthy().cmp(&other.is_truthy())
            }
            (Value::Text(a), Value::Text(b)) => match (numeric_text(a), numeric_text(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.cmp(b),
            },
            (Value::Text(s), n) if is_number(n) => match numeric_text(s) {
                Some(x) => n.as_number().map(|y| x.cmp(&y)).unwrap_or(Ordering::Equal),
                None => n.to_text().map(|t| s.as_str().cmp(&t)).unwrap_or(Ordering::Equal),
            },
            (n, Value::Text(_)) if is_number(n) => other.compare(self).reverse(),
            _ if is_number(self) && is_number(other) => {
                match (self.as_number(), other.as_number()) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    _ => Ordering::Equal,
                }
            }
            (Value::Collection(a), Value::Collection(b)) => {
                a.len().cmp(&b.len()).then_with(|| {
                    a.values()
                        .zip(b.values())
                        .map(|(x, y)| x.compare(y))
                        .find(|o| *o != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                })
            }
            (Value::Optional(a), Value::Optional(b)) => match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.compare(y),
            },
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Decimal(_) => 2,
            Value::Text(_) => 3,
            Value::Collection(_) => 4,
            Value::Optional(_) => 5,
            Value::Object(_) => 6,
            Value::Callback(_) => 7,
            Value::Type(_) => 8,
        }
    }

    // ──────────────────────────────────────────────
    // Member access
    // ──────────────────────────────────────────────

    pub fn has_method(&self, name: &str) -> bool {
        match self {
            Value::Object(o) => o.has_method(name),
            Value::Optional(_) => OPTIONAL_METHODS.contains(&name),
            _ => false,
        }
    }

    /// Invokes a named method; a receiver without that method is a
    /// `NoSuchMethod` error.
    pub fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, FluentError> {
        match self {
            Value::Object(o) if o.has_method(name) => o.call_method(name, args),
            Value::Optional(inner) if OPTIONAL_METHODS.contains(&name) => {
                call_optional(inner.as_deref(), name, args)
            }
            other => Err(FluentError::NoSuchMethod {
                type_name: other.type_name().to_string(),
                method: name.to_string(),
            }),
        }
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(o) => o.field(name),
            _ => None,
        }
    }

    pub fn is_indexable(&self) -> bool {
        match self {
            Value::Collection(_) => true,
            Value::Object(o) => o.supports_offsets(),
            _ => false,
        }
    }

    /// Offset read; `None` when the key is absent or the value is not
    /// index-accessible.
    pub fn offset(&self, key: &Key) -> Option<Value> {
        match self {
            Value::Collection(c) => c.get(key).cloned(),
            Value::Object(o) if o.supports_offsets() => o.offset_get(key),
            _ => None,
        }
    }
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Int(_) | Value::Decimal(_))
}

fn numeric_text(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<Decimal>().ok()
}

fn call_optional(inner: Option<&Value>, method: &str, args: &[Value]) -> Result<Value, FluentError> {
    match method {
        "map" => {
            let func = callback_arg(args, 0, "map")?;
            match inner {
                Some(v) => Ok(Value::some(func.call(&[v.clone()])?)),
                None => Ok(Value::none()),
            }
        }
        "flatMap" => {
            let func = callback_arg(args, 0, "flatMap")?;
            match inner {
                Some(v) => match func.call(&[v.clone()])? {
                    opt @ Value::Optional(_) => Ok(opt),
                    other => Err(FluentError::invalid_argument(format!(
                        "callable passed to flatMap must return an Option, {} given",
                        other.type_name()
                    ))),
                },
                None => Ok(Value::none()),
            }
        }
        "filter" => {
            let predicate = callback_arg(args, 0, "filter")?;
            match inner {
                Some(v) if predicate.call(&[v.clone()])?.is_truthy() => Ok(Value::some(v.clone())),
                _ => Ok(Value::none()),
            }
        }
        "get" => inner.cloned().ok_or(FluentError::NoValue),
        "getOrElse" => Ok(inner
            .cloned()
            .unwrap_or_else(|| args.first().cloned().unwrap_or(Value::Null))),
        "getOrCall" => match inner {
            Some(v) => Ok(v.clone()),
            None => callback_arg(args, 0, "getOrCall")?.call(&[]),
        },
        "orElse" => match inner {
            Some(v) => Ok(Value::some(v.clone())),
            None => match args.first() {
                Some(alternative @ Value::Optional(_)) => Ok(alternative.clone()),
                other => Err(FluentError::invalid_argument(format!(
                    "orElse expects an Option, {} given",
                    other.map(Value::type_name).unwrap_or("nothing")
                ))),
            },
        },
        "isEmpty" => Ok(Value::Bool(inner.is_none())),
        "isDefined" => Ok(Value::Bool(inner.is_some())),
        _ => Err(FluentError::NoSuchMethod {
            type_name: "Option".to_string(),
            method: method.to_string(),
        }),
    }
}

/// Strict (`===`) equality: same kind and same data; shared handles compare
/// by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a == b,
            (Value::Optional(a), Value::Optional(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Callback(a), Value::Callback(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ──────────────────────────────────────────────
// Conversions
// ──────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Collection> for Value {
    fn from(c: Collection) -> Self {
        Value::Collection(c)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Collection(Collection::from_values(values))
    }
}

impl From<Callback> for Value {
    fn from(cb: Callback) -> Self {
        Value::Callback(cb)
    }
}

impl From<TargetType> for Value {
    fn from(t: TargetType) -> Self {
        Value::Type(Rc::new(t))
    }
}

impl From<Option<Value>> for Value {
    fn from(opt: Option<Value>) -> Self {
        Value::Optional(opt.map(Box::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_scalar_rules() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("a").is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::list(Vec::<Value>::new()).is_truthy());
        assert!(Value::none().is_truthy());
    }

    #[test]
    fn loose_equality_crosses_numeric_kinds() {
        assert!(Value::Int(1).loose_eq(&Value::Decimal(Decimal::ONE)));
        assert!(Value::Int(5).loose_eq(&Value::from("5")));
        assert!(Value::from("1.0").loose_eq(&Value::from("1")));
        assert!(Value::Null.loose_eq(&Value::Int(0)));
        assert!(Value::Bool(true).loose_eq(&Value::from("x")));
        assert!(!Value::from("abc").loose_eq(&Value::Int(0)));
        assert_ne!(Value::Int(1), Value::Decimal(Decimal::ONE));
    }

    #[test]
    fn compare_orders_numbers_and_text() {
        assert_eq!(Value::Int(2).compare(&Value::Int(10)), Ordering::Less);
        assert_eq!(Value::from("10").compare(&Value::from("9")), Ordering::Greater);
        assert_eq!(Value::from("b").compare(&Value::from("a")), Ordering::Greater);
        assert_eq!(
            Value::Decimal(Decimal::new(15, 1)).compare(&Value::Int(1)),
            Ordering::Greater
        );
        assert_eq!(Value::list([1, 2]).compare(&Value::list([3])), Ordering::Greater);
    }

    #[test]
    fn optional_methods() {
        let some = Value::some(5);
        let none = Value::none();
        let add_one = Callback::unary(|v| match v {
            Value::Int(i) => Ok(Value::Int(i + 1)),
            other => Ok(other.clone()),
        });

        assert_eq!(
            some.call_method("map", &[add_one.clone().into()]).unwrap(),
            Value::some(6)
        );
        assert_eq!(none.call_method("map", &[add_one.into()]).unwrap(), Value::none());
        assert_eq!(
            none.call_method("getOrElse", &[Value::from("fallback")]).unwrap(),
            Value::from("fallback")
        );
        assert_eq!(some.call_method("isDefined", &[]).unwrap(), Value::Bool(true));
        assert_eq!(none.call_method("get", &[]).unwrap_err(), FluentError::NoValue);
        assert_eq!(
            none.call_method("orElse", &[Value::some("x")]).unwrap(),
            Value::some("x")
        );
    }

    #[test]
    fn missing_method_names_receiver_type() {
        let err = Value::list([1]).call_method("count", &[]).unwrap_err();
        assert_eq!(
            err,
            FluentError::NoSuchMethod {
                type_name: "array".to_string(),
                method: "count".to_string(),
            }
        );
    }

    #[test]
    fn optional_from_null_is_empty() {
        assert_eq!(Value::optional_from(Value::Null), Value::none());
        assert_eq!(Value::optional_from(Value::Int(0)), Value::some(0));
    }

    #[test]
    fn to_text_rejects_collections() {
        assert_eq!(Value::Bool(true).to_text().unwrap(), "1");
        assert_eq!(Value::Decimal(Decimal::new(250, 2)).to_text().unwrap(), "2.5");
        assert!(Value::list([1]).to_text().is_err());
    }

    #[derive(Debug)]
    struct Tag(&'static str);

    impl Object for Tag {
        fn type_name(&self) -> &str {
            "Tag"
        }

        fn has_method(&self, _name: &str) -> bool {
            false
        }

        fn call_method(&self, name: &str, _args: &[Value]) -> Result<Value, FluentError> {
            Err(FluentError::NoSuchMethod {
                type_name: "Tag".to_string(),
                method: name.to_string(),
            })
        }

        fn entries(&self) -> Option<Collection> {
            Some(self.0.split(',').map(Value::from).collect())
        }

        fn to_text(&self) -> Option<String> {
            Some(format!("#{}", self.0))
        }
    }

    #[test]
    fn objects_opt_into_iteration_and_text() {
        let tag = Value::object(Tag("a,b"));
        assert!(tag.is_iterable());
        assert_eq!(tag.iterable_entries(), Value::list(["a", "b"]).as_collection().cloned());
        assert_eq!(tag.to_text().unwrap(), "#a,b");

        assert!(!Value::Int(1).is_iterable());
        assert_eq!(Value::Int(1).iterable_entries(), None);
    }
}
