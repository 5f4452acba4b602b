//! Eager collection pipeline.
//!
//! A [`Pipeline`] owns a materialized [`Collection`] and applies operations
//! to it immediately. Intermediate operations consume the pipeline and return
//! a new one; terminal operations produce a value. Callbacks are invoked with
//! `(value, key)` unless noted otherwise.
//!
//! [`Pipeline::dispatch`] applies an operation by name with positional
//! arguments, which is how the composer replays its log.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use fluent_core::{
    callback_arg, optional_callback_arg, Callback, Collection, FluentError, Key, TargetType, Value,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::operation::OperationName;

/// Sort direction for `orderBy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = FluentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(FluentError::invalid_argument(format!(
                "sort direction must be ASC or DESC, got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("ASC"),
            SortDirection::Desc => f.write_str("DESC"),
        }
    }
}

/// Result of dispatching one operation.
#[derive(Debug)]
pub enum Outcome {
    /// Intermediate operation: the pipeline continues.
    Pipeline(Pipeline),
    /// Terminal operation: the produced value.
    Value(Value),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    elements: Collection,
}

impl Pipeline {
    /// Starts a pipeline over a collection value; anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self, FluentError> {
        match value {
            Value::Collection(c) => Ok(Pipeline::from_collection(c)),
            other => match other.iterable_entries() {
                Some(entries) => Ok(Pipeline::from_collection(entries)),
                None => Err(FluentError::invalid_argument(format!(
                    "pipelines support only arrays and iterables, {} given",
                    other.type_name()
                ))),
            },
        }
    }

    pub fn from_collection(elements: Collection) -> Self {
        Pipeline { elements }
    }

    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Pipeline::from_collection(values.into_iter().map(Into::into).collect())
    }

    pub fn elements(&self) -> &Collection {
        &self.elements
    }

    pub fn into_collection(self) -> Collection {
        self.elements
    }

    // ──────────────────────────────────────────────
    // Intermediate operations
    // ──────────────────────────────────────────────

    pub fn map(self, func: &Callback) -> Result<Self, FluentError> {
        self.map_named(func, "map")
    }

    fn map_named(self, func: &Callback, method: &str) -> Result<Self, FluentError> {
        func.ensure_callable(method)?;
        let mut mapped = Collection::new();
        for (key, value) in self.elements {
            let result = func.call(&[value, key.to_value()])?;
            mapped.insert(key, result);
        }
        Ok(Pipeline::from_collection(mapped))
    }

    pub fn flat_map(self, func: &Callback) -> Result<Self, FluentError> {
        self.map_named(func, "flatMap")?.flatten()
    }

    /// Concatenates nested collections; every element must be a collection.
    pub fn flatten(self) -> Result<Self, FluentError> {
        let mut flat = Collection::new();
        for (_, value) in self.elements {
            let inner = match value {
                Value::Collection(inner) => inner,
                other => other.iterable_entries().ok_or_else(|| FluentError::NotIterable {
                    type_name: other.type_name().to_string(),
                })?,
            };
            for item in inner.into_values() {
                flat.push(item);
            }
        }
        Ok(Pipeline::from_collection(flat))
    }

    /// Keeps elements the predicate accepts; keys are preserved.
    pub fn filter(self, predicate: &Callback) -> Result<Self, FluentError> {
        predicate.ensure_callable("filter")?;
        let mut kept = Collection::new();
        for (key, value) in self.elements {
            if predicate.call(&[value.clone(), key.to_value()])?.is_truthy() {
                kept.insert(key, value);
            }
        }
        Ok(Pipeline::from_collection(kept))
    }

    /// Drops loosely-equal duplicates, keeping the first occurrence.
    pub fn unique(self) -> Self {
        let mut seen: Vec<Value> = Vec::new();
        let mut kept = Collection::new();
        for (key, value) in self.elements {
            if !seen.iter().any(|s| s.loose_eq(&value)) {
                seen.push(value.clone());
                kept.insert(key, value);
            }
        }
        Pipeline::from_collection(kept)
    }

    pub fn group_by(self, key_func: &Callback) -> Result<Self, FluentError> {
        key_func.ensure_callable("groupBy")?;
        let mut groups = Collection::new();
        for (key, value) in self.elements {
            let group = Key::try_from(&key_func.call(&[value.clone(), key.to_value()])?)?;
            match groups.get_mut(&group) {
                Some(Value::Collection(members)) => members.push(value),
                _ => groups.insert(group, Value::list([value])),
            }
        }
        Ok(Pipeline::from_collection(groups))
    }

    /// Re-keys elements; two elements with the same key is a `KeyCollision`.
    pub fn index_by(self, index_func: &Callback) -> Result<Self, FluentError> {
        index_func.ensure_callable("indexBy")?;
        let mut indexed = Collection::new();
        for (key, value) in self.elements {
            let index = Key::try_from(&index_func.call(&[value.clone(), key.to_value()])?)?;
            if let Some(existing) = indexed.get(&index) {
                debug!(key = %index, "indexBy key collision");
                return Err(FluentError::KeyCollision {
                    first: existing.type_name().to_string(),
                    second: value.type_name().to_string(),
                    key: index.to_string(),
                });
            }
            indexed.insert(index, value);
        }
        Ok(Pipeline::from_collection(indexed))
    }

    /// Stable sort, keys preserved. Without a comparator values use their
    /// natural ordering; a comparator returns a number whose sign orders.
    pub fn order(self, comparator: Option<&Callback>) -> Result<Self, FluentError> {
        if let Some(cmp) = comparator {
            cmp.ensure_callable("order")?;
        }
        let mut entries: Vec<(Key, Value)> = self.elements.into_iter().collect();
        sort_fallible(&mut entries, |(_, a), (_, b)| match comparator {
            Some(cmp) => Ok(ordering_of(&cmp.call(&[a.clone(), b.clone()])?)),
            None => Ok(a.compare(b)),
        })?;
        Ok(Pipeline::from_collection(Collection::from_entries(entries)))
    }

    /// Stable sort by a mapped value (the callback receives only the value).
    pub fn order_by(self, value_func: &Callback, direction: SortDirection) -> Result<Self, FluentError> {
        value_func.ensure_callable("orderBy")?;
        let mut entries: Vec<(Key, Value, Value)> = Vec::with_capacity(self.elements.len());
        for (key, value) in self.elements {
            let sort_key = value_func.call(&[value.clone()])?;
            entries.push((key, value, sort_key));
        }
        entries.sort_by(|(_, _, a), (_, _, b)| match direction {
            SortDirection::Asc => a.compare(b),
            SortDirection::Desc => b.compare(a),
        });
        Ok(Pipeline::from_collection(
            entries.into_iter().map(|(k, v, _)| (k, v)).collect(),
        ))
    }

    pub fn skip(self, count: i64) -> Self {
        Pipeline::from_collection(self.elements.slice(count, None))
    }

    pub fn limit(self, count: i64) -> Self {
        Pipeline::from_collection(self.elements.slice(0, Some(count)))
    }

    /// Splits into `{0: matching, 1: non-matching}`; both groups always exist.
    pub fn partition(self, predicate: &Callback) -> Result<Self, FluentError> {
        predicate.ensure_callable("partition")?;
        let mut matching = Collection::new();
        let mut rest = Collection::new();
        for (key, value) in self.elements {
            if predicate.call(&[value.clone(), key.to_value()])?.is_truthy() {
                matching.push(value);
            } else {
                rest.push(value);
            }
        }
        Ok(Pipeline::from_values([
            Value::Collection(matching),
            Value::Collection(rest),
        ]))
    }

    pub fn intersect(self, other: &Collection) -> Self {
        self.retain_by_membership(other, true)
    }

    pub fn difference(self, other: &Collection) -> Self {
        self.retain_by_membership(other, false)
    }

    fn retain_by_membership(self, other: &Collection, keep_members: bool) -> Self {
        let kept = self
            .elements
            .into_iter()
            .filter(|(_, value)| other.values().any(|o| o.loose_eq(value)) == keep_members)
            .collect();
        Pipeline::from_collection(kept)
    }

    pub fn keys(self) -> Self {
        Pipeline::from_values(self.elements.keys().map(Key::to_value).collect::<Vec<_>>())
    }

    /// Pairs elements by position up to the shorter side. Without a combiner
    /// each pair becomes `[left, right]`.
    pub fn zip(self, other: &Collection, combiner: Option<&Callback>) -> Result<Self, FluentError> {
        if let Some(cb) = combiner {
            cb.ensure_callable("zip")?;
        }
        let mut zipped = Collection::new();
        for (left, right) in self.elements.into_values().into_iter().zip(other.values()) {
            let pair = match combiner {
                Some(cb) => cb.call(&[left, right.clone()])?,
                None => Value::list([left, right.clone()]),
            };
            zipped.push(pair);
        }
        Ok(Pipeline::from_collection(zipped))
    }

    pub fn append(mut self, value: Value) -> Self {
        self.elements.push(value);
        self
    }

    /// Array-merge: integer keys are renumbered, text keys from `other`
    /// overwrite.
    pub fn merge(self, other: &Collection) -> Self {
        let mut merged = Collection::new();
        let right = other.iter().map(|(k, v)| (k.clone(), v.clone()));
        for (key, value) in self.elements.into_iter().chain(right) {
            match key {
                Key::Int(_) => merged.push(value),
                Key::Text(_) => merged.insert(key, value),
            }
        }
        Pipeline::from_collection(merged)
    }

    // ──────────────────────────────────────────────
    // Terminal operations
    // ──────────────────────────────────────────────

    pub fn all_match(&self, predicate: &Callback) -> Result<bool, FluentError> {
        predicate.ensure_callable("allMatch")?;
        for (key, value) in self.elements.iter() {
            if !predicate.call(&[value.clone(), key.to_value()])?.is_truthy() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn any_match(&self, predicate: &Callback) -> Result<bool, FluentError> {
        predicate.ensure_callable("anyMatch")?;
        for (key, value) in self.elements.iter() {
            if predicate.call(&[value.clone(), key.to_value()])?.is_truthy() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn none_match(&self, predicate: &Callback) -> Result<bool, FluentError> {
        predicate.ensure_callable("noneMatch")?;
        Ok(!self.any_match(predicate)?)
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Greatest element as an optional. With a comparator the values are
    /// stably sorted and the last one wins.
    pub fn max(&self, comparator: Option<&Callback>) -> Result<Value, FluentError> {
        self.extreme(comparator, "max", Ordering::Greater)
    }

    pub fn min(&self, comparator: Option<&Callback>) -> Result<Value, FluentError> {
        self.extreme(comparator, "min", Ordering::Less)
    }

    fn extreme(
        &self,
        comparator: Option<&Callback>,
        method: &str,
        wanted: Ordering,
    ) -> Result<Value, FluentError> {
        if self.elements.is_empty() {
            return Ok(Value::none());
        }
        match comparator {
            Some(cmp) => {
                cmp.ensure_callable(method)?;
                let mut values: Vec<Value> = self.elements.values().cloned().collect();
                sort_fallible(&mut values, |a, b| {
                    Ok(ordering_of(&cmp.call(&[a.clone(), b.clone()])?))
                })?;
                let picked = if wanted == Ordering::Greater {
                    values.pop()
                } else {
                    values.into_iter().next()
                };
                Ok(picked.map(Value::optional_from).unwrap_or_else(Value::none))
            }
            None => {
                let mut best: Option<&Value> = None;
                for value in self.elements.values() {
                    if best.map_or(true, |b| value.compare(b) == wanted) {
                        best = Some(value);
                    }
                }
                Ok(best.cloned().map(Value::optional_from).unwrap_or_else(Value::none))
            }
        }
    }

    /// Element with the greatest mapped value (first one on ties).
    pub fn max_by(&self, value_func: &Callback) -> Result<Value, FluentError> {
        self.extreme_by(value_func, "maxBy", Ordering::Greater)
    }

    pub fn min_by(&self, value_func: &Callback) -> Result<Value, FluentError> {
        self.extreme_by(value_func, "minBy", Ordering::Less)
    }

    fn extreme_by(
        &self,
        value_func: &Callback,
        method: &str,
        wanted: Ordering,
    ) -> Result<Value, FluentError> {
        value_func.ensure_callable(method)?;
        let mut best: Option<(&Value, Value)> = None;
        for value in self.elements.values() {
            let mapped = value_func.call(&[value.clone()])?;
            let better = match &best {
                None => true,
                Some((_, current)) => mapped.compare(current) == wanted,
            };
            if better {
                best = Some((value, mapped));
            }
        }
        Ok(best
            .map(|(value, _)| Value::optional_from(value.clone()))
            .unwrap_or_else(Value::none))
    }

    pub fn first_match(&self, predicate: &Callback) -> Result<Value, FluentError> {
        predicate.ensure_callable("firstMatch")?;
        for (key, value) in self.elements.iter() {
            if predicate.call(&[value.clone(), key.to_value()])?.is_truthy() {
                return Ok(Value::optional_from(value.clone()));
            }
        }
        Ok(Value::none())
    }

    /// Values only, renumbered `0..n`.
    pub fn to_array(&self) -> Collection {
        self.elements.reindexed()
    }

    /// Keys preserved.
    pub fn to_map(&self) -> Collection {
        self.elements.clone()
    }

    /// Constructs `target` with the collection as its first constructor
    /// argument. A constructor without parameters is called with none.
    pub fn to(&self, target: &TargetType) -> Result<Value, FluentError> {
        let name = target.name();
        let constructor = target
            .constructor()
            .filter(|c| c.public)
            .ok_or_else(|| {
                FluentError::invalid_argument(format!(
                    "type \"{}\" has not defined public constructor",
                    name
                ))
            })?;

        if constructor.required_count() > 1 {
            return Err(FluentError::invalid_argument(format!(
                "constructor of \"{}\" has more than 1 required parameter",
                name
            )));
        }

        let Some((first, rest)) = constructor.parameters.split_first() else {
            return constructor.construct(Vec::new());
        };
        if rest.iter().any(|p| !p.optional) {
            return Err(FluentError::invalid_argument(format!(
                "required parameter of \"{}\" constructor is not the first one",
                name
            )));
        }
        if first.class_hint.is_some() {
            return Err(FluentError::invalid_argument(format!(
                "can not pass array as first constructor argument of \"{}\"",
                name
            )));
        }

        constructor.construct(vec![Value::Collection(self.elements.clone())])
    }

    pub fn collect(&self, collector: &Callback) -> Result<Value, FluentError> {
        collector.ensure_callable("collect")?;
        collector.call(&[Value::Collection(self.elements.clone())])
    }

    pub fn join(&self, separator: &str) -> Result<String, FluentError> {
        let parts = self
            .elements
            .values()
            .map(Value::to_text)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(separator))
    }

    pub fn first(&self) -> Value {
        self.elements
            .first()
            .cloned()
            .map(Value::optional_from)
            .unwrap_or_else(Value::none)
    }

    pub fn last(&self) -> Value {
        self.elements
            .last()
            .cloned()
            .map(Value::optional_from)
            .unwrap_or_else(Value::none)
    }

    pub fn get(&self, key: &Key) -> Value {
        self.elements
            .get(key)
            .cloned()
            .map(Value::optional_from)
            .unwrap_or_else(Value::none)
    }

    /// Folds with the first element as the seed; empty yields an empty
    /// optional.
    pub fn reduce(&self, operator: &Callback) -> Result<Value, FluentError> {
        operator.ensure_callable("reduce")?;
        let mut values = self.elements.values();
        let Some(seed) = values.next() else {
            return Ok(Value::none());
        };
        let mut acc = seed.clone();
        for value in values {
            acc = operator.call(&[acc, value.clone()])?;
        }
        Ok(Value::optional_from(acc))
    }

    pub fn reduce_from_identity(
        &self,
        identity: Value,
        operator: &Callback,
    ) -> Result<Value, FluentError> {
        operator.ensure_callable("reduceFromIdentity")?;
        let mut acc = identity;
        for value in self.elements.values() {
            acc = operator.call(&[acc, value.clone()])?;
        }
        Ok(acc)
    }

    pub fn each(&self, func: &Callback) -> Result<(), FluentError> {
        func.ensure_callable("each")?;
        for (key, value) in self.elements.iter() {
            func.call(&[value.clone(), key.to_value()])?;
        }
        Ok(())
    }

    // ──────────────────────────────────────────────
    // Dispatch by name
    // ──────────────────────────────────────────────

    /// Applies `name` with positional `args`.
    pub fn dispatch(self, name: OperationName, args: &[Value]) -> Result<Outcome, FluentError> {
        debug!(
            operation = %name,
            elements = self.elements.len(),
            args = args.len(),
            "pipeline dispatch"
        );
        let method = name.as_str();

        let next = match name {
            OperationName::Map => self.map(callback_arg(args, 0, method)?)?,
            OperationName::FlatMap => self.flat_map(callback_arg(args, 0, method)?)?,
            OperationName::Flatten => self.flatten()?,
            OperationName::Filter => self.filter(callback_arg(args, 0, method)?)?,
            OperationName::Unique => self.unique(),
            OperationName::GroupBy => self.group_by(callback_arg(args, 0, method)?)?,
            OperationName::IndexBy => self.index_by(callback_arg(args, 0, method)?)?,
            OperationName::Order => self.order(optional_callback_arg(args, 0, method)?)?,
            OperationName::OrderBy => self.order_by(
                callback_arg(args, 0, method)?,
                direction_arg(args, 1)?,
            )?,
            OperationName::Skip => self.skip(int_arg(args, 0, method)?),
            OperationName::Limit => self.limit(int_arg(args, 0, method)?),
            OperationName::Partition => self.partition(callback_arg(args, 0, method)?)?,
            OperationName::Intersect => self.intersect(&collection_arg(args, 0, method)?),
            OperationName::Difference => self.difference(&collection_arg(args, 0, method)?),
            OperationName::Keys => self.keys(),
            OperationName::Zip => self.zip(
                &collection_arg(args, 0, method)?,
                optional_callback_arg(args, 1, method)?,
            )?,
            OperationName::Append => self.append(args.first().cloned().unwrap_or(Value::Null)),
            OperationName::Merge => self.merge(&collection_arg(args, 0, method)?),
            terminal => return self.dispatch_terminal(terminal, args).map(Outcome::Value),
        };

        Ok(Outcome::Pipeline(next))
    }

    fn dispatch_terminal(&self, name: OperationName, args: &[Value]) -> Result<Value, FluentError> {
        let method = name.as_str();
        match name {
            OperationName::AllMatch => self.all_match(callback_arg(args, 0, method)?).map(Value::Bool),
            OperationName::AnyMatch => self.any_match(callback_arg(args, 0, method)?).map(Value::Bool),
            OperationName::NoneMatch => {
                self.none_match(callback_arg(args, 0, method)?).map(Value::Bool)
            }
            OperationName::Size => Ok(Value::from(self.size())),
            OperationName::Max => self.max(optional_callback_arg(args, 0, method)?),
            OperationName::MaxBy => self.max_by(callback_arg(args, 0, method)?),
            OperationName::Min => self.min(optional_callback_arg(args, 0, method)?),
            OperationName::MinBy => self.min_by(callback_arg(args, 0, method)?),
            OperationName::FirstMatch => self.first_match(callback_arg(args, 0, method)?),
            OperationName::ToArray => Ok(Value::Collection(self.to_array())),
            OperationName::ToMap => Ok(Value::Collection(self.to_map())),
            OperationName::To => match args.first() {
                Some(Value::Type(target)) => self.to(target),
                other => Err(FluentError::invalid_argument(format!(
                    "method \"to\" expects a target type, {} given",
                    other.map(Value::type_name).unwrap_or("nothing")
                ))),
            },
            OperationName::Collect => self.collect(callback_arg(args, 0, method)?),
            OperationName::Join => {
                let separator = args.first().map(Value::to_text).transpose()?.unwrap_or_default();
                self.join(&separator).map(Value::Text)
            }
            OperationName::First => Ok(self.first()),
            OperationName::Last => Ok(self.last()),
            OperationName::Get => {
                let key = Key::try_from(args.first().unwrap_or(&Value::Null))?;
                Ok(self.get(&key))
            }
            OperationName::Reduce => self.reduce(callback_arg(args, 0, method)?),
            OperationName::ReduceFromIdentity => self.reduce_from_identity(
                args.first().cloned().unwrap_or(Value::Null),
                callback_arg(args, 1, method)?,
            ),
            OperationName::Each => self.each(callback_arg(args, 0, method)?).map(|_| Value::Null),
            intermediate => Err(FluentError::invalid_argument(format!(
                "\"{}\" is not a terminal operation",
                intermediate
            ))),
        }
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// Stable sort with a fallible comparator; the first error aborts the sort
/// and is returned.
fn sort_fallible<T, F>(items: &mut [T], mut compare: F) -> Result<(), FluentError>
where
    F: FnMut(&T, &T) -> Result<Ordering, FluentError>,
{
    let mut failure: Option<FluentError> = None;
    items.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        match compare(a, b) {
            Ok(ordering) => ordering,
            Err(e) => {
                failure = Some(e);
                Ordering::Equal
            }
        }
    });
    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Interprets a comparator result: the sign of a number, or greater for any
/// other truthy value.
fn ordering_of(result: &Value) -> Ordering {
    match result.as_number() {
        Some(n) => n.cmp(&rust_decimal::Decimal::ZERO),
        None if result.is_truthy() => Ordering::Greater,
        None => Ordering::Equal,
    }
}

fn int_arg(args: &[Value], index: usize, method: &str) -> Result<i64, FluentError> {
    match args.get(index) {
        Some(Value::Int(i)) => Ok(*i),
        Some(value) => value
            .as_number()
            .and_then(|d| i64::try_from(d.trunc()).ok())
            .ok_or_else(|| {
                FluentError::invalid_argument(format!(
                    "method \"{}\" expects an integer, {} given",
                    method,
                    value.type_name()
                ))
            }),
        None => Err(FluentError::invalid_argument(format!(
            "method \"{}\" expects an integer argument",
            method
        ))),
    }
}

fn collection_arg(args: &[Value], index: usize, method: &str) -> Result<Collection, FluentError> {
    match args.get(index).and_then(Value::iterable_entries) {
        Some(c) => Ok(c),
        None => Err(FluentError::invalid_argument(format!(
            "method \"{}\" supports only arrays and iterables, {} given",
            method,
            args.get(index).map(Value::type_name).unwrap_or("nothing")
        ))),
    }
}

fn direction_arg(args: &[Value], index: usize) -> Result<SortDirection, FluentError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(SortDirection::Asc),
        Some(Value::Text(s)) => s.parse(),
        Some(other) => Err(FluentError::invalid_argument(format!(
            "sort direction must be text, {} given",
            other.type_name()
        ))),
    }
}
