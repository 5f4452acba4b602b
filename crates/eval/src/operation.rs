//! Operation vocabulary shared by the pipeline engine and the composer.
//!
//! Every pipeline operation has a fixed name. Names are partitioned into
//! intermediate operations (the pipeline stays open) and terminal operations
//! (the pipeline yields a value). A subset of terminal operations yields an
//! optional single value; the composer hands out a recorder for those.

use std::fmt;
use std::str::FromStr;

use fluent_core::{FluentError, Recorder, Value};
use serde::{Deserialize, Serialize};

/// Whether an operation keeps the pipeline open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Intermediate,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationName {
    // intermediate
    Map,
    FlatMap,
    Flatten,
    Filter,
    Unique,
    GroupBy,
    IndexBy,
    Order,
    OrderBy,
    Skip,
    Limit,
    Partition,
    #[serde(alias = "intersection")]
    Intersect,
    Difference,
    Keys,
    Zip,
    Append,
    Merge,
    // terminal
    AllMatch,
    AnyMatch,
    NoneMatch,
    Size,
    Max,
    MaxBy,
    Min,
    MinBy,
    FirstMatch,
    ToArray,
    ToMap,
    To,
    Collect,
    Join,
    First,
    Last,
    Get,
    Reduce,
    ReduceFromIdentity,
    Each,
}

impl OperationName {
    pub const ALL: [OperationName; 38] = [
        OperationName::Map,
        OperationName::FlatMap,
        OperationName::Flatten,
        OperationName::Filter,
        OperationName::Unique,
        OperationName::GroupBy,
        OperationName::IndexBy,
        OperationName::Order,
        OperationName::OrderBy,
        OperationName::Skip,
        OperationName::Limit,
        OperationName::Partition,
        OperationName::Intersect,
        OperationName::Difference,
        OperationName::Keys,
        OperationName::Zip,
        OperationName::Append,
        OperationName::Merge,
        OperationName::AllMatch,
        OperationName::AnyMatch,
        OperationName::NoneMatch,
        OperationName::Size,
        OperationName::Max,
        OperationName::MaxBy,
        OperationName::Min,
        OperationName::MinBy,
        OperationName::FirstMatch,
        OperationName::ToArray,
        OperationName::ToMap,
        OperationName::To,
        OperationName::Collect,
        OperationName::Join,
        OperationName::First,
        OperationName::Last,
        OperationName::Get,
        OperationName::Reduce,
        OperationName::ReduceFromIdentity,
        OperationName::Each,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationName::Map => "map",
            OperationName::FlatMap => "flatMap",
            OperationName::Flatten => "flatten",
            OperationName::Filter => "filter",
            OperationName::Unique => "unique",
            OperationName::GroupBy => "groupBy",
            OperationName::IndexBy => "indexBy",
            OperationName::Order => "order",
            OperationName::OrderBy => "orderBy",
            OperationName::Skip => "skip",
            OperationName::Limit => "limit",
            OperationName::Partition => "partition",
            OperationName::Intersect => "intersect",
            OperationName::Difference => "difference",
            OperationName::Keys => "keys",
            OperationName::Zip => "zip",
            OperationName::Append => "append",
            OperationName::Merge => "merge",
            OperationName::AllMatch => "allMatch",
            OperationName::AnyMatch => "anyMatch",
            OperationName::NoneMatch => "noneMatch",
            OperationName::Size => "size",
            OperationName::Max => "max",
            OperationName::MaxBy => "maxBy",
            OperationName::Min => "min",
            OperationName::MinBy => "minBy",
            OperationName::FirstMatch => "firstMatch",
            OperationName::ToArray => "toArray",
            OperationName::ToMap => "toMap",
            OperationName::To => "to",
            OperationName::Collect => "collect",
            OperationName::Join => "join",
            OperationName::First => "first",
            OperationName::Last => "last",
            OperationName::Get => "get",
            OperationName::Reduce => "reduce",
            OperationName::ReduceFromIdentity => "reduceFromIdentity",
            OperationName::Each => "each",
        }
    }

    pub fn kind(self) -> OperationKind {
        match self {
            OperationName::Map
            | OperationName::FlatMap
            | OperationName::Flatten
            | OperationName::Filter
            | OperationName::Unique
            | OperationName::GroupBy
            | OperationName::IndexBy
            | OperationName::Order
            | OperationName::OrderBy
            | OperationName::Skip
            | OperationName::Limit
            | OperationName::Partition
            | OperationName::Intersect
            | OperationName::Difference
            | OperationName::Keys
            | OperationName::Zip
            | OperationName::Append
            | OperationName::Merge => OperationKind::Intermediate,
            _ => OperationKind::Terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.kind() == OperationKind::Terminal
    }

    /// Terminal operations whose result is an optional single value.
    pub fn yields_optional(self) -> bool {
        matches!(
            self,
            OperationName::Max
                | OperationName::MaxBy
                | OperationName::Min
                | OperationName::MinBy
                | OperationName::FirstMatch
                | OperationName::First
                | OperationName::Last
                | OperationName::Get
                | OperationName::Reduce
        )
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationName {
    type Err = FluentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "intersection" {
            return Ok(OperationName::Intersect);
        }
        OperationName::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FluentError::invalid_argument(format!("unknown operation '{}'", s)))
    }
}

/// How the composed function turns its call arguments into a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentType {
    /// The single argument is the collection.
    Collection,
    /// Every argument is one element.
    Varargs,
    /// Only the first argument, as the sole element.
    SingleValue,
}

/// One entry of a composer's operation log.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Call {
        name: OperationName,
        args: Vec<Value>,
    },
    /// Stand-in for whatever the terminal operation returns.
    Replay(Recorder),
}
