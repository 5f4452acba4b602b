//! fluent-core: value model and access recording for fluent collection
//! pipelines.
//!
//! Provides the pieces every pipeline stage is built from:
//!
//! - [`Value`] -- dynamically typed runtime value, with [`Collection`] as the
//!   ordered key-value container
//! - [`Object`] -- capability trait host types implement so recorders and
//!   property paths can be replayed against them
//! - [`Recorder`] -- receiver-agnostic program of property reads, method
//!   calls and index reads
//! - [`PropertyReader`] / [`PropertyPath`] -- dotted-path and program reads
//! - [`Callback`] -- callables accepted by pipeline operations
//! - [`FluentError`] -- the single error type

pub mod callback;
pub mod collection;
pub mod error;
pub mod json;
pub mod object;
pub mod property;
pub mod recorder;
pub mod value;

pub use callback::{callback_arg, optional_callback_arg, Callback, NativeFn};
pub use collection::{Collection, Key};
pub use error::FluentError;
pub use object::{Constructor, Object, Parameter, TargetType};
pub use property::{PropertyPath, PropertyReader};
pub use recorder::{Movement, Recorder};
pub use value::Value;
