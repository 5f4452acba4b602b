//! Eager pipeline behavior over plain data and host objects.

mod common;

use common::{ArrayObject, Author, BookBuilder};
use fluent_core::{
    Callback, Collection, Constructor, FluentError, Key, Parameter, Recorder, TargetType, Value,
};
use fluent_eval::functions::{count, property_value};
use fluent_eval::predicates::{and_x, eq, gt, is_in, not};
use fluent_eval::{OperationName, Outcome, Pipeline, SortDirection};

fn range(from: i64, to: i64) -> Pipeline {
    Pipeline::from_values(from..=to)
}

fn int(value: &Value) -> i64 {
    match value {
        Value::Int(i) => *i,
        other => panic!("expected int, got {:?}", other),
    }
}

fn map_of(entries: Vec<(Key, Value)>) -> Collection {
    Collection::from_entries(entries)
}

// ──────────────────────────────────────────────
// Keys and indexes
// ──────────────────────────────────────────────

#[test]
fn index_by_moves_elements_to_new_keys() {
    let actual = range(1, 4)
        .index_by(&Callback::unary(|v| Ok(Value::Int(int(v) + 3))))
        .unwrap()
        .to_map();
    assert_eq!(
        actual,
        map_of(vec![
            (Key::Int(4), Value::Int(1)),
            (Key::Int(5), Value::Int(2)),
            (Key::Int(6), Value::Int(3)),
            (Key::Int(7), Value::Int(4)),
        ])
    );
}

#[test]
fn index_by_receives_the_current_key() {
    let actual = range(1, 4)
        .index_by(&Callback::binary(|_, key| Ok(key.clone())))
        .unwrap()
        .to_map();
    assert_eq!(actual, range(1, 4).to_map());
}

#[test]
fn index_by_collision_names_both_elements() {
    let err = range(1, 4)
        .index_by(&Callback::unary(|_| Ok(Value::Int(1))))
        .unwrap_err();
    assert_eq!(
        err,
        FluentError::KeyCollision {
            first: "int".to_string(),
            second: "int".to_string(),
            key: "1".to_string(),
        }
    );
}

#[test]
fn first_and_last_ignore_key_order() {
    let p = Pipeline::from_collection(map_of(vec![
        (Key::Int(5), Value::from("a")),
        (Key::Int(1), Value::from("b")),
    ]));
    assert_eq!(p.first(), Value::some("a"));
    assert_eq!(p.last(), Value::some("b"));
}

#[test]
fn keys_lists_current_keys() {
    let p = Pipeline::from_collection(map_of(vec![
        (Key::from("x"), Value::Int(1)),
        (Key::Int(3), Value::Int(2)),
    ]));
    assert_eq!(
        p.keys().to_array(),
        Collection::from_values(vec![Value::from("x"), Value::Int(3)])
    );
}

// ──────────────────────────────────────────────
// Slicing
// ──────────────────────────────────────────────

#[test]
fn skip_and_limit_clamp_to_bounds() {
    assert_eq!(range(1, 3).skip(5).size(), 0);
    assert_eq!(range(1, 3).skip(0).to_array(), range(1, 3).to_array());
    assert_eq!(range(1, 3).limit(0).size(), 0);
    assert_eq!(range(1, 3).limit(10).to_array(), range(1, 3).to_array());
    assert_eq!(range(1, 5).skip(1).limit(2).to_array(), range(2, 3).to_array());
}

#[test]
fn negative_counts_measure_from_the_end() {
    assert_eq!(range(1, 5).skip(-2).to_array(), range(4, 5).to_array());
    assert_eq!(range(1, 5).limit(-2).to_array(), range(1, 3).to_array());
    assert_eq!(range(1, 5).skip(-10).to_array(), range(1, 5).to_array());
}

// ──────────────────────────────────────────────
// Grouping
// ──────────────────────────────────────────────

#[test]
fn partition_by_parity() {
    let parts = range(1, 5)
        .partition(&Callback::predicate(|v| int(v) % 2 == 0))
        .unwrap()
        .to_map();
    assert_eq!(parts.get(&Key::Int(0)), Some(&Value::list([2, 4])));
    assert_eq!(parts.get(&Key::Int(1)), Some(&Value::list([1, 3, 5])));

    let empty = Pipeline::default()
        .partition(&Callback::predicate(|_| true))
        .unwrap()
        .to_map();
    assert_eq!(empty.len(), 2);
}

#[test]
fn group_by_publisher_name() {
    let books = Pipeline::from_values([
        BookBuilder::create().title("A").publisher(Some("Helion")).build(),
        BookBuilder::create().title("B").publisher(Some("PWN")).build(),
        BookBuilder::create().title("C").publisher(Some("Helion")).build(),
    ]);
    let grouped = books
        .group_by(&property_value("publisher.name"))
        .unwrap()
        .map(&Callback::unary(|group| {
            Pipeline::from_value(group.clone())?
                .map(&property_value("title"))?
                .join("")
                .map(Value::Text)
        }))
        .unwrap()
        .to_map();
    assert_eq!(grouped.get(&Key::from("Helion")), Some(&Value::from("AC")));
    assert_eq!(grouped.get(&Key::from("PWN")), Some(&Value::from("B")));
}

#[test]
fn flat_map_concatenates_author_lists() {
    let mut names = Recorder::record();
    names.call("getName", []);

    let books = Pipeline::from_values([
        BookBuilder::create().author("Eddy").author("psliwa").build(),
        BookBuilder::create().author("Ola").build(),
    ]);
    let authors = books
        .flat_map(&property_value("authors"))
        .unwrap()
        .map(&Callback::from(names))
        .unwrap()
        .to_array();
    assert_eq!(
        authors,
        Collection::from_values(vec!["Eddy".into(), "psliwa".into(), "Ola".into()])
    );
}

#[test]
fn flatten_rejects_non_collections() {
    let err = Pipeline::from_values([Value::list([1]), Value::from("x")])
        .flatten()
        .unwrap_err();
    assert_eq!(
        err,
        FluentError::NotIterable {
            type_name: "string".to_string()
        }
    );
}

// ──────────────────────────────────────────────
// Ordering
// ──────────────────────────────────────────────

#[test]
fn order_by_name_in_both_directions() {
    let people = || {
        Pipeline::from_values(["T", "Z", "A"].map(|name| {
            Value::Collection(map_of(vec![(Key::from("name"), Value::from(name))]))
        }))
    };
    let name = property_value("name");
    let names = |p: Pipeline| {
        p.map(&property_value("name"))
            .and_then(|p| p.join(""))
            .unwrap()
    };

    assert_eq!(names(people().order_by(&name, SortDirection::Asc).unwrap()), "ATZ");
    assert_eq!(names(people().order_by(&name, SortDirection::Desc).unwrap()), "ZTA");
}

#[test]
fn order_by_rejects_unknown_direction() {
    let err = range(1, 3)
        .dispatch(
            OperationName::OrderBy,
            &[
                Value::from(property_value("")),
                Value::from("sideways"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, FluentError::InvalidArgument { .. }));
}

#[test]
fn max_by_page_count() {
    let books = Pipeline::from_values([
        BookBuilder::create().title("thin").pages(10).build(),
        BookBuilder::create().title("thick").pages(900).build(),
        BookBuilder::create().title("medium").pages(300).build(),
    ]);
    let mut title = Recorder::record();
    title.call("get", []).call("getTitle", []);

    let thickest = books.max_by(&property_value("pages")).unwrap();
    assert_eq!(title.replay(&thickest).unwrap(), Value::from("thick"));
    let thinnest = books.min_by(&property_value("pages")).unwrap();
    assert_eq!(title.replay(&thinnest).unwrap(), Value::from("thin"));
}

// ──────────────────────────────────────────────
// Predicates and functions
// ──────────────────────────────────────────────

#[test]
fn predicates_read_through_getters() {
    let books = Pipeline::from_values([
        BookBuilder::create().title("A").pages(100).publisher(Some("Helion")).build(),
        BookBuilder::create().title("B").pages(400).publisher(Some("Helion")).build(),
        BookBuilder::create().title("C").pages(500).publisher(Some("PWN")).build(),
    ]);
    let long_helion = and_x([gt("pages", 300), eq("publisher.name", "Helion")]);
    let titles = books
        .clone()
        .filter(&long_helion.into())
        .unwrap()
        .map(&property_value("title"))
        .unwrap()
        .to_array();
    assert_eq!(titles, Collection::from_values(vec!["B".into()]));

    let other_publishers = not(is_in("publisher.name", Collection::from_values(vec!["Helion".into()])));
    assert_eq!(books.filter(&other_publishers.into()).unwrap().size(), 1);
}

#[test]
fn unreadable_property_on_object_is_an_error() {
    let books = Pipeline::from_values([BookBuilder::create().build()]);
    let err = books.map(&property_value("isbn")).unwrap_err();
    assert_eq!(
        err,
        FluentError::UnreadableProperty {
            property: "isbn".to_string(),
            type_name: "Book".to_string(),
        }
    );
}

#[test]
fn count_sizes_author_lists() {
    let books = Pipeline::from_values([
        BookBuilder::create().author("a").author("b").build(),
        BookBuilder::create().build(),
    ]);
    let sizes = books.map(&count("authors")).unwrap().to_array();
    assert_eq!(sizes, Collection::from_values(vec![Value::Int(2), Value::Int(0)]));
}

// ──────────────────────────────────────────────
// Conversion into target types
// ──────────────────────────────────────────────

#[test]
fn to_builds_target_from_collection() {
    let target = TargetType::new("Wrapper").with_constructor(Constructor::new(
        vec![Parameter::optional("items")],
        |args| Ok(Value::list([Value::from("wrapped"), args.into_iter().next().unwrap_or(Value::Null)])),
    ));
    assert_eq!(
        range(1, 3).to(&target).unwrap(),
        Value::list([Value::from("wrapped"), Value::list([1, 2, 3])])
    );
}

#[test]
fn to_rejects_multiple_required_parameters() {
    let target = TargetType::new("Pair").with_constructor(Constructor::new(
        vec![Parameter::required("left"), Parameter::required("right")],
        |_| Ok(Value::Null),
    ));
    let err = range(1, 3).to(&target).unwrap_err();
    assert!(matches!(err, FluentError::InvalidArgument { .. }));
}

#[test]
fn to_rejects_class_hinted_parameter() {
    let target = TargetType::new("Holder").with_constructor(Constructor::new(
        vec![Parameter::required("inner").with_class_hint("stdClass")],
        |_| Ok(Value::Null),
    ));
    assert!(range(1, 3).to(&target).is_err());
}

#[test]
fn to_rejects_type_without_constructor() {
    assert!(range(1, 3).to(&TargetType::new("stdClass")).is_err());
}

// ──────────────────────────────────────────────
// Dispatch
// ──────────────────────────────────────────────

#[test]
fn dispatch_chains_like_direct_calls() {
    let double = Value::from(Callback::unary(|v| Ok(Value::Int(int(v) * 2))));
    let mut outcome = Outcome::Pipeline(range(1, 3));
    for (name, args) in [
        (OperationName::Map, vec![double]),
        (OperationName::Skip, vec![Value::Int(1)]),
        (OperationName::Join, vec![Value::from("-")]),
    ] {
        outcome = match outcome {
            Outcome::Pipeline(p) => p.dispatch(name, &args).unwrap(),
            Outcome::Value(v) => panic!("terminal reached early: {:?}", v),
        };
    }
    match outcome {
        Outcome::Value(v) => assert_eq!(v, Value::from("4-6")),
        Outcome::Pipeline(p) => panic!("no terminal result: {:?}", p),
    }
}

#[test]
fn pipeline_reads_json_input() {
    let input = Value::from_json(&serde_json::json!([3, 1, 2])).unwrap();
    let sorted = Pipeline::from_value(input).unwrap().order(None).unwrap().to_array();
    assert_eq!(
        Value::Collection(sorted).to_json().unwrap(),
        serde_json::json!([1, 2, 3])
    );
}

// ──────────────────────────────────────────────
// Traversable and printable objects
// ──────────────────────────────────────────────

#[test]
fn pipeline_starts_from_traversable_object() {
    let pipeline = Pipeline::from_value(ArrayObject::wrap([1, 2, 3])).unwrap();
    assert_eq!(pipeline.size(), 3);

    let err = Pipeline::from_value(BookBuilder::create().title("Dune").build()).unwrap_err();
    assert!(matches!(err, FluentError::InvalidArgument { .. }));
}

#[test]
fn flatten_and_merge_accept_traversable_objects() {
    let flat = Pipeline::from_values([ArrayObject::wrap([1, 2]), Value::list([3])])
        .flatten()
        .unwrap();
    assert_eq!(flat.to_array(), range(1, 3).to_array());

    let merged = match range(1, 2)
        .dispatch(OperationName::Merge, &[ArrayObject::wrap([3, 4])])
        .unwrap()
    {
        Outcome::Pipeline(p) => p.to_array(),
        Outcome::Value(v) => panic!("merge ended the pipeline with {:?}", v),
    };
    assert_eq!(merged, range(1, 4).to_array());
}

#[test]
fn join_uses_string_form_of_objects() {
    let authors = Pipeline::from_values([Author::named("Frank Herbert"), Author::named("Tolkien")]);
    assert_eq!(authors.join(", ").unwrap(), "Frank Herbert, Tolkien");

    let books = Pipeline::from_values([BookBuilder::create().title("Dune").build()]);
    assert!(matches!(
        books.join(", "),
        Err(FluentError::InvalidArgument { .. })
    ));
}
