//! fluent-eval: eager collection pipelines and deferred composition.
//!
//! [`Pipeline`] applies operations to a materialized collection right away.
//! [`Composer`] records the same operations and replays them later as one
//! function, with recorders standing in for optional terminal results.
//!
//! Predicate builders, ready-made callbacks and short semantic aliases live
//! in [`predicates`], [`functions`] and [`semantics`].

pub mod composer;
pub mod functions;
pub mod operation;
pub mod pipeline;
pub mod predicates;
pub mod semantics;

pub use composer::{Composer, Plan, PlanStep};
pub use operation::{ArgumentType, LogEntry, OperationKind, OperationName};
pub use pipeline::{Outcome, Pipeline, SortDirection};
pub use predicates::{Comparison, Predicate};
