//! Deferred pipeline composition.
//!
//! A [`Composer`] records pipeline operations without any input and later
//! runs them, as one function, against whatever it is invoked with. At most
//! one terminal operation can be recorded and nothing can follow it.
//!
//! Terminal operations yielding an optional hand out a non-callable
//! [`Recorder`]; whatever is chained on it is replayed against the optional
//! once the pipeline has run:
//!
//! ```
//! use fluent_core::{Callback, Value};
//! use fluent_eval::Composer;
//!
//! let mut describe = Composer::for_varargs();
//! describe
//!     .max()
//!     .unwrap()
//!     .call("map", [Value::from(Callback::unary(|v| Ok(Value::Text(format!("max: {}", v.to_text()?)))))])
//!     .call("getOrElse", [Value::from("max not found")]);
//!
//! let args = [Value::Int(1), Value::Int(5), Value::Int(3)];
//! assert_eq!(describe.invoke(&args).unwrap(), Value::from("max: 5"));
//! assert_eq!(describe.invoke(&[]).unwrap(), Value::from("max not found"));
//! ```

use std::rc::Rc;

use fluent_core::{Callback, Collection, FluentError, Key, Recorder, TargetType, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::operation::{ArgumentType, LogEntry, OperationName};
use crate::pipeline::{Outcome, Pipeline, SortDirection};

#[derive(Debug, Clone)]
pub struct Composer {
    argument_type: ArgumentType,
    log: Vec<LogEntry>,
    terminal: Option<OperationName>,
}

/// Serializable description of a composer's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub argument_type: ArgumentType,
    pub steps: Vec<PlanStep>,
    pub terminal: Option<OperationName>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanStep {
    Operation { name: OperationName, arity: usize },
    Replay { movements: usize },
}

impl Composer {
    pub fn new(argument_type: ArgumentType) -> Self {
        Composer {
            argument_type,
            log: Vec::new(),
            terminal: None,
        }
    }

    /// The composed function takes one collection argument.
    pub fn for_collection() -> Self {
        Composer::new(ArgumentType::Collection)
    }

    pub fn for_array() -> Self {
        Composer::for_collection()
    }

    /// Every argument of the composed function is one element.
    pub fn for_varargs() -> Self {
        Composer::new(ArgumentType::Varargs)
    }

    /// The first argument of the composed function is the only element.
    pub fn for_single_value() -> Self {
        Composer::new(ArgumentType::SingleValue)
    }

    pub fn for_value() -> Self {
        Composer::for_single_value()
    }

    pub fn argument_type(&self) -> ArgumentType {
        self.argument_type
    }

    pub fn operations(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn terminal_operation(&self) -> Option<OperationName> {
        self.terminal
    }

    pub fn plan(&self) -> Plan {
        let steps = self
            .log
            .iter()
            .map(|entry| match entry {
                LogEntry::Call { name, args } => PlanStep::Operation {
                    name: *name,
                    arity: args.len(),
                },
                LogEntry::Replay(recorder) => PlanStep::Replay {
                    movements: recorder.movements().len(),
                },
            })
            .collect();
        Plan {
            argument_type: self.argument_type,
            steps,
            terminal: self.terminal,
        }
    }

    // ──────────────────────────────────────────────
    // Recording
    // ──────────────────────────────────────────────

    fn record(&mut self, name: OperationName, args: Vec<Value>) -> Result<(), FluentError> {
        if let Some(terminal) = self.terminal {
            return Err(FluentError::Protocol {
                terminal: terminal.to_string(),
            });
        }
        for arg in &args {
            if let Value::Callback(cb) = arg {
                cb.ensure_callable(name.as_str())?;
            }
        }
        if name.is_terminal() {
            self.terminal = Some(name);
        }
        trace!(operation = %name, args = args.len(), "composer append");
        self.log.push(LogEntry::Call { name, args });
        Ok(())
    }

    fn chain(&mut self, name: OperationName, args: Vec<Value>) -> Result<&mut Self, FluentError> {
        self.record(name, args)?;
        Ok(self)
    }

    fn optional(&mut self, name: OperationName, args: Vec<Value>) -> Result<&mut Recorder, FluentError> {
        self.record(name, args)?;
        self.log.push(LogEntry::Replay(Recorder::placeholder()));
        match self.log.last_mut() {
            Some(LogEntry::Replay(recorder)) => Ok(recorder),
            _ => Err(FluentError::Protocol {
                terminal: name.to_string(),
            }),
        }
    }

    // intermediate

    pub fn map(&mut self, func: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Map, vec![callback(func)])
    }

    pub fn flat_map(&mut self, func: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::FlatMap, vec![callback(func)])
    }

    pub fn flatten(&mut self) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Flatten, Vec::new())
    }

    pub fn filter(&mut self, predicate: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Filter, vec![callback(predicate)])
    }

    pub fn unique(&mut self) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Unique, Vec::new())
    }

    pub fn group_by(&mut self, key_func: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::GroupBy, vec![callback(key_func)])
    }

    pub fn index_by(&mut self, index_func: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::IndexBy, vec![callback(index_func)])
    }

    /// Natural ordering.
    pub fn order(&mut self) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Order, Vec::new())
    }

    pub fn order_with(&mut self, comparator: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Order, vec![callback(comparator)])
    }

    pub fn order_by(
        &mut self,
        value_func: impl Into<Callback>,
        direction: SortDirection,
    ) -> Result<&mut Self, FluentError> {
        self.chain(
            OperationName::OrderBy,
            vec![callback(value_func), Value::Text(direction.to_string())],
        )
    }

    pub fn skip(&mut self, count: i64) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Skip, vec![Value::Int(count)])
    }

    pub fn limit(&mut self, count: i64) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Limit, vec![Value::Int(count)])
    }

    pub fn partition(&mut self, predicate: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Partition, vec![callback(predicate)])
    }

    pub fn intersect(&mut self, other: Collection) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Intersect, vec![Value::Collection(other)])
    }

    pub fn intersection(&mut self, other: Collection) -> Result<&mut Self, FluentError> {
        self.intersect(other)
    }

    pub fn difference(&mut self, other: Collection) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Difference, vec![Value::Collection(other)])
    }

    pub fn keys(&mut self) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Keys, Vec::new())
    }

    pub fn zip(&mut self, other: Collection) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Zip, vec![Value::Collection(other)])
    }

    pub fn zip_with(
        &mut self,
        other: Collection,
        combiner: impl Into<Callback>,
    ) -> Result<&mut Self, FluentError> {
        self.chain(
            OperationName::Zip,
            vec![Value::Collection(other), callback(combiner)],
        )
    }

    pub fn append(&mut self, value: impl Into<Value>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Append, vec![value.into()])
    }

    pub fn merge(&mut self, other: Collection) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Merge, vec![Value::Collection(other)])
    }

    // terminal, concrete value

    pub fn all_match(&mut self, predicate: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::AllMatch, vec![callback(predicate)])
    }

    pub fn any_match(&mut self, predicate: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::AnyMatch, vec![callback(predicate)])
    }

    pub fn none_match(&mut self, predicate: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::NoneMatch, vec![callback(predicate)])
    }

    pub fn size(&mut self) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Size, Vec::new())
    }

    pub fn to_array(&mut self) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::ToArray, Vec::new())
    }

    pub fn to_map(&mut self) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::ToMap, Vec::new())
    }

    pub fn to(&mut self, target: impl Into<Rc<TargetType>>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::To, vec![Value::Type(target.into())])
    }

    pub fn collect(&mut self, collector: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Collect, vec![callback(collector)])
    }

    pub fn join(&mut self, separator: &str) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Join, vec![Value::from(separator)])
    }

    pub fn reduce_from_identity(
        &mut self,
        identity: impl Into<Value>,
        operator: impl Into<Callback>,
    ) -> Result<&mut Self, FluentError> {
        self.chain(
            OperationName::ReduceFromIdentity,
            vec![identity.into(), callback(operator)],
        )
    }

    pub fn each(&mut self, func: impl Into<Callback>) -> Result<&mut Self, FluentError> {
        self.chain(OperationName::Each, vec![callback(func)])
    }

    // terminal, optional value

    pub fn max(&mut self) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::Max, Vec::new())
    }

    pub fn max_with(&mut self, comparator: impl Into<Callback>) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::Max, vec![callback(comparator)])
    }

    pub fn max_by(&mut self, value_func: impl Into<Callback>) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::MaxBy, vec![callback(value_func)])
    }

    pub fn min(&mut self) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::Min, Vec::new())
    }

    pub fn min_with(&mut self, comparator: impl Into<Callback>) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::Min, vec![callback(comparator)])
    }

    pub fn min_by(&mut self, value_func: impl Into<Callback>) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::MinBy, vec![callback(value_func)])
    }

    pub fn first_match(&mut self, predicate: impl Into<Callback>) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::FirstMatch, vec![callback(predicate)])
    }

    pub fn first(&mut self) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::First, Vec::new())
    }

    pub fn last(&mut self) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::Last, Vec::new())
    }

    pub fn get(&mut self, key: impl Into<Key>) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::Get, vec![key.into().to_value()])
    }

    pub fn reduce(&mut self, operator: impl Into<Callback>) -> Result<&mut Recorder, FluentError> {
        self.optional(OperationName::Reduce, vec![callback(operator)])
    }

    // ──────────────────────────────────────────────
    // Invocation
    // ──────────────────────────────────────────────

    /// Runs the recorded operations against `args`. Without a terminal
    /// operation the resulting collection is returned with its keys.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, FluentError> {
        let input = self.resolve_input(args)?;
        debug!(
            argument_type = ?self.argument_type,
            operations = self.log.len(),
            elements = input.len(),
            "composer invoke"
        );

        let mut state = Outcome::Pipeline(Pipeline::from_collection(input));
        for entry in &self.log {
            state = match (state, entry) {
                (Outcome::Pipeline(pipeline), LogEntry::Call { name, args }) => {
                    pipeline.dispatch(*name, args)?
                }
                (Outcome::Pipeline(pipeline), LogEntry::Replay(recorder)) => Outcome::Value(
                    recorder.replay(&Value::Collection(pipeline.into_collection()))?,
                ),
                (Outcome::Value(value), LogEntry::Replay(recorder)) => {
                    Outcome::Value(recorder.replay(&value)?)
                }
                (Outcome::Value(_), LogEntry::Call { .. }) => {
                    return Err(FluentError::Protocol {
                        terminal: self
                            .terminal
                            .map(|t| t.to_string())
                            .unwrap_or_default(),
                    })
                }
            };
        }

        let result = match state {
            Outcome::Pipeline(pipeline) => Value::Collection(pipeline.into_collection()),
            Outcome::Value(value) => value,
        };
        debug!(result = result.type_name(), "composer result");
        Ok(result)
    }

    /// Single-argument form of [`Composer::invoke`].
    pub fn apply(&self, input: impl Into<Value>) -> Result<Value, FluentError> {
        self.invoke(&[input.into()])
    }

    fn resolve_input(&self, args: &[Value]) -> Result<Collection, FluentError> {
        match self.argument_type {
            ArgumentType::Collection => match args.first() {
                Some(input) => input.iterable_entries().ok_or_else(|| {
                    FluentError::invalid_argument(format!(
                        "composed function supports only arrays and iterables, {} given",
                        input.type_name()
                    ))
                }),
                None => Err(FluentError::invalid_argument(
                    "composed function expects one array or iterable argument, none given",
                )),
            },
            ArgumentType::Varargs => Ok(Collection::from_values(args.iter().cloned())),
            ArgumentType::SingleValue => Ok(Collection::from_values(args.first().cloned())),
        }
    }
}

/// A composer used as a callback is invoked with the callback's arguments.
impl From<Composer> for Callback {
    fn from(composer: Composer) -> Self {
        Callback::new(move |args| composer.invoke(args))
    }
}

fn callback(func: impl Into<Callback>) -> Value {
    Value::Callback(func.into())
}
