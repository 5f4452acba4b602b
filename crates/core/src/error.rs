/// All errors that can be returned while building or running a pipeline.
///
/// Null-propagation through a recorder (a missing property, a missing index,
/// a null intermediate receiver) is not an error and never surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FluentError {
    /// A second terminal operation, or an intermediate operation after the
    /// terminal one, was appended to a composer.
    #[error("only one terminal operation can be called, \"{terminal}\" has been already called")]
    Protocol { terminal: String },

    /// Malformed input: a non-collection where a collection is required, a
    /// value that is not a callback, an unusable `to` target and similar.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A composer-spawned recorder was used where a plain callable is expected.
    #[error(
        "recorder passed to method \"{method}\" cannot be directly chained when the terminal \
         operation you called returns an optional; keep the composer in a variable, chain on it \
         and pass the composer itself as the callback instead"
    )]
    InvalidUsage { method: String },

    /// The receiver exposes no callable member with this name.
    #[error("method {type_name}::{method} does not exist")]
    NoSuchMethod { type_name: String, method: String },

    /// Two elements produced the same key in `indexBy`.
    #[error(
        "index collision occurred in indexBy function, two elements (\"{first}\", \"{second}\") \
         with index \"{key}\""
    )]
    KeyCollision {
        first: String,
        second: String,
        key: String,
    },

    /// An element could not be flattened because it is not a collection.
    #[error("\"{type_name}\" can not be flattened, because it is not iterable")]
    NotIterable { type_name: String },

    /// A dotted property path hit an object exposing no matching member.
    #[error("property \"{property}\" cannot be read from {type_name}")]
    UnreadableProperty { property: String, type_name: String },

    /// `get()` was called on an empty optional.
    #[error("optional is empty, there is no value to get")]
    NoValue,
}

impl FluentError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        FluentError::InvalidArgument {
            message: message.into(),
        }
    }
}
