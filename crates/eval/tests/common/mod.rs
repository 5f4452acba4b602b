//! Shared receivers for integration tests: books with publishers and
//! authors, exposing getters, fields and offset access through `Object`.

#![allow(dead_code)]

use std::rc::Rc;

use fluent_core::{Collection, FluentError, Key, Object, Value};

pub const FULL: &str = "full";
pub const SHORT: &str = "short";

fn no_such_method(type_name: &str, method: &str) -> FluentError {
    FluentError::NoSuchMethod {
        type_name: type_name.to_string(),
        method: method.to_string(),
    }
}

// ──────────────────────────────────────────────
// Publisher
// ──────────────────────────────────────────────

#[derive(Debug)]
pub struct Publisher {
    pub name: String,
}

impl Object for Publisher {
    fn type_name(&self) -> &str {
        "Publisher"
    }

    fn has_method(&self, name: &str) -> bool {
        name == "getName"
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Result<Value, FluentError> {
        match name {
            "getName" => Ok(Value::from(self.name.as_str())),
            other => Err(no_such_method("Publisher", other)),
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            _ => None,
        }
    }
}

// ──────────────────────────────────────────────
// Author
// ──────────────────────────────────────────────

#[derive(Debug)]
pub struct Author {
    name: String,
}

impl Object for Author {
    fn type_name(&self) -> &str {
        "Author"
    }

    fn has_method(&self, name: &str) -> bool {
        name == "getName"
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Result<Value, FluentError> {
        match name {
            "getName" => Ok(Value::from(self.name.as_str())),
            other => Err(no_such_method("Author", other)),
        }
    }

    fn to_text(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

impl Author {
    pub fn named(name: &str) -> Value {
        Value::object(Author {
            name: name.to_string(),
        })
    }
}

// ──────────────────────────────────────────────
// Book
// ──────────────────────────────────────────────

#[derive(Debug)]
pub struct Book {
    full_title: Option<String>,
    short_title: Option<String>,
    authors: Collection,
    publisher: Option<Rc<Publisher>>,
    cool: bool,
    pages: i64,
}

impl Book {
    fn title(&self, kind: &str) -> Value {
        let title = match kind {
            SHORT => self.short_title.as_ref().or(self.full_title.as_ref()),
            _ => self.full_title.as_ref(),
        };
        title.map(|t| Value::from(t.as_str())).unwrap_or(Value::Null)
    }

    fn publisher_value(&self) -> Value {
        match &self.publisher {
            Some(p) => Value::Object(p.clone()),
            None => Value::Null,
        }
    }
}

impl Object for Book {
    fn type_name(&self) -> &str {
        "Book"
    }

    fn has_method(&self, name: &str) -> bool {
        matches!(
            name,
            "getAuthors" | "getTitle" | "getPublisher" | "isCool" | "getPages"
        )
    }

    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, FluentError> {
        match name {
            "getAuthors" => Ok(Value::Collection(self.authors.clone())),
            "getTitle" => {
                let kind = args.first().and_then(Value::as_text).unwrap_or(FULL);
                Ok(self.title(kind))
            }
            "getPublisher" => Ok(self.publisher_value()),
            "isCool" => Ok(Value::Bool(self.cool)),
            "getPages" => Ok(Value::Int(self.pages)),
            other => Err(no_such_method("Book", other)),
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "authors" => Some(Value::Collection(self.authors.clone())),
            "publisher" => Some(self.publisher_value()),
            _ => None,
        }
    }
}

/// Offset-readable shelf of books keyed by title.
#[derive(Debug)]
pub struct Shelf {
    pub books: Collection,
}

impl Object for Shelf {
    fn type_name(&self) -> &str {
        "Shelf"
    }

    fn has_method(&self, _name: &str) -> bool {
        false
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Result<Value, FluentError> {
        Err(no_such_method("Shelf", name))
    }

    fn supports_offsets(&self) -> bool {
        true
    }

    fn offset_get(&self, key: &Key) -> Option<Value> {
        self.books.get(key).cloned()
    }
}

/// Traversable container over a fixed set of entries.
#[derive(Debug)]
pub struct ArrayObject {
    items: Collection,
}

impl ArrayObject {
    pub fn wrap<I, V>(values: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::object(ArrayObject {
            items: values.into_iter().map(Into::into).collect(),
        })
    }
}

impl Object for ArrayObject {
    fn type_name(&self) -> &str {
        "ArrayObject"
    }

    fn has_method(&self, name: &str) -> bool {
        name == "count"
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Result<Value, FluentError> {
        match name {
            "count" => Ok(Value::from(self.items.len())),
            other => Err(no_such_method("ArrayObject", other)),
        }
    }

    fn supports_offsets(&self) -> bool {
        true
    }

    fn offset_get(&self, key: &Key) -> Option<Value> {
        self.items.get(key).cloned()
    }

    fn entries(&self) -> Option<Collection> {
        Some(self.items.clone())
    }
}

#[derive(Debug, Default)]
pub struct BookBuilder {
    full_title: Option<String>,
    short_title: Option<String>,
    authors: Vec<String>,
    publisher: Option<String>,
    not_cool: bool,
    pages: i64,
}

impl BookBuilder {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.full_title = Some(title.to_string());
        self
    }

    pub fn short_title(mut self, title: &str) -> Self {
        self.short_title = Some(title.to_string());
        self
    }

    pub fn author(mut self, name: &str) -> Self {
        self.authors.push(name.to_string());
        self
    }

    pub fn publisher(mut self, name: Option<&str>) -> Self {
        self.publisher = name.map(str::to_string);
        self
    }

    pub fn cool(mut self, cool: bool) -> Self {
        self.not_cool = !cool;
        self
    }

    pub fn pages(mut self, pages: i64) -> Self {
        self.pages = pages;
        self
    }

    pub fn book(self) -> Book {
        Book {
            full_title: self.full_title,
            short_title: self.short_title,
            authors: self
                .authors
                .into_iter()
                .map(|name| Value::object(Author { name }))
                .collect(),
            publisher: self.publisher.map(|name| Rc::new(Publisher { name })),
            cool: !self.not_cool,
            pages: self.pages,
        }
    }

    pub fn build(self) -> Value {
        Value::object(self.book())
    }
}

/// Extracts a string result, panicking with context otherwise.
pub fn text(value: &Value) -> &str {
    value
        .as_text()
        .unwrap_or_else(|| panic!("expected text, got {:?}", value))
}
