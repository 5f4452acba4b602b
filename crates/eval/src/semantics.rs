//! Short aliases that read well at the call site:
//!
//! ```
//! use fluent_core::Value;
//! use fluent_eval::semantics::{compose, get, is};
//!
//! let mut titles = compose::for_array();
//! titles
//!     .filter(is::not_null("title")).unwrap()
//!     .map(get::value("title")).unwrap()
//!     .to_array().unwrap();
//!
//! let books = Value::from_json(&serde_json::json!([{"title": "Dune"}, {"isbn": "0-441"}])).unwrap();
//! assert_eq!(titles.apply(books).unwrap(), Value::list(["Dune"]));
//! ```

/// Predicate builders.
pub mod is {
    pub use crate::predicates::{
        and_x, contains, eq, gt, gte, identical, is_false, is_in, is_null, is_true, lt, lte, not,
        not_null, or_x,
    };
}

pub mod get {
    use fluent_core::{Callback, PropertyPath};

    pub fn value(path: impl Into<PropertyPath>) -> Callback {
        crate::functions::property_value(path)
    }
}

pub mod size {
    use fluent_core::{Callback, PropertyPath};

    pub fn of(path: impl Into<PropertyPath>) -> Callback {
        crate::functions::count(path)
    }
}

pub mod func {
    use fluent_core::Callback;

    pub fn unary(inner: impl Into<Callback>) -> Callback {
        crate::functions::unary(inner)
    }

    pub fn fix(inner: impl Into<Callback>) -> Callback {
        crate::functions::unary(inner)
    }
}

pub mod call {
    use fluent_core::Callback;

    pub fn func(inner: impl Into<Callback>) -> Callback {
        crate::functions::unary(inner)
    }
}

pub mod compose {
    use crate::composer::Composer;

    pub fn for_array() -> Composer {
        Composer::for_array()
    }

    pub fn for_varargs() -> Composer {
        Composer::for_varargs()
    }

    pub fn for_value() -> Composer {
        Composer::for_value()
    }
}
