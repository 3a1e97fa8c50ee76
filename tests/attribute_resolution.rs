use recordmap::attributes::{AttributeOptions, Primitive};
use recordmap::error::Error;
use recordmap::schema::Schema;
use recordmap::{Model, Value};
use serde_json::json;
use std::rc::Rc;

fn thing_schema() -> Rc<Schema> {
    Schema::builder("Thing")
        .attribute("name", AttributeOptions::new())
        .build()
        .unwrap()
}

fn race_schema(thing: &Rc<Schema>) -> Rc<Schema> {
    Schema::builder("Race")
        .attribute("name", AttributeOptions::new())
        .attribute("venue", AttributeOptions::new().primitive(Primitive::String))
        .attribute("fooName", AttributeOptions::new().alias("bar_name"))
        .attribute(
            "raceIdentifier",
            AttributeOptions::new()
                .alias("identifier")
                .primitive(Primitive::String),
        )
        .attribute("number", AttributeOptions::new().primitive(Primitive::Integer))
        .attribute("stake", AttributeOptions::new().primitive(Primitive::Float))
        .attribute(
            ["fooMeeting", "barMeeting"],
            AttributeOptions::new().alias("meeting"),
        )
        .attribute("manyThings", AttributeOptions::new().collection(thing))
        .attribute("singleThing", AttributeOptions::new().model(thing))
        .attribute("someDetails", AttributeOptions::new().alias("details"))
        .attribute("nestedDetail", AttributeOptions::new().within("details"))
        .attribute(
            ["status", "raceStatus"],
            AttributeOptions::new().alias("status").try_in("details"),
        )
        .attribute("afterParseValue", AttributeOptions::new())
        .attribute(
            "afterOptions",
            AttributeOptions::new().parse_with(|value| Ok(Value::from(format!("{} after parse!", value)))),
        )
        .after_parse(|race| race.set("after_parse_value", "after parse!"))
        .build()
        .unwrap()
}

fn parse(input: serde_json::Value) -> Model {
    let thing = thing_schema();
    Model::parse_new(&race_schema(&thing), input).unwrap()
}

#[test]
fn identity_cast_returns_value_unchanged() {
    let race = parse(json!({"name": "Phar Lap"}));
    assert_eq!(race.get("name").unwrap(), Value::from("Phar Lap"));
}

#[test]
fn casts_strings() {
    let race = parse(json!({"venue": 42}));
    assert_eq!(race.get("venue").unwrap(), Value::from("42"));
}

#[test]
fn casts_floats() {
    let race = parse(json!({"stake": "1.5"}));
    assert_eq!(race.get("stake").unwrap(), Value::Float(1.5));
}

#[test]
fn casts_integers() {
    let race = parse(json!({"number": "10"}));
    assert_eq!(race.get("number").unwrap(), Value::Int(10));
}

#[test]
fn coercion_failure_reaches_the_caller() {
    let race = parse(json!({"number": "ten"}));
    let err = race.get("number").unwrap_err();
    assert!(matches!(err, Error::Coercion { target: Primitive::Integer, .. }));
}

#[test]
fn absent_primitive_stays_absent() {
    let race = parse(json!({}));
    assert_eq!(race.get("number").unwrap(), Value::Null);
}

#[test]
fn renames_attributes() {
    let race = parse(json!({"raceIdentifier": "R7"}));
    assert_eq!(race.get("identifier").unwrap(), Value::from("R7"));
}

#[test]
fn setter_overrides_resolved_value() {
    let race = parse(json!({"raceIdentifier": "R7"}));
    race.set("identifier", "Matamata").unwrap();
    assert_eq!(race.get("identifier").unwrap(), Value::from("Matamata"));
}

#[test]
fn tries_source_keys_in_order() {
    let race = parse(json!({"fooMeeting": null, "barMeeting": "X"}));
    assert_eq!(race.get("meeting").unwrap(), Value::from("X"));

    let race = parse(json!({"fooMeeting": "first", "barMeeting": "second"}));
    assert_eq!(race.get("meeting").unwrap(), Value::from("first"));
}

#[test]
fn parses_collections() {
    let race = parse(json!({"manyThings": [{"name": "X"}]}));
    let things = race.get("many_things").unwrap();
    let things = things.as_list().unwrap();
    assert_eq!(things.len(), 1);
    assert_eq!(
        things[0].as_model().unwrap().get("name").unwrap(),
        Value::from("X")
    );
}

#[test]
fn collection_members_pass_through() {
    let thing = thing_schema();
    let race_schema = race_schema(&thing);
    let existing = Rc::new(Model::parse_new(&thing, json!({"name": "built"})).unwrap());

    let input = [(
        "manyThings",
        Value::List(vec![
            Value::Model(Rc::clone(&existing)),
            Value::from(json!({"name": "raw"})),
        ]),
    )];
    let race = Model::parse_new(&race_schema, input).unwrap();

    let things = race.get("many_things").unwrap();
    let things = things.as_list().unwrap();
    assert!(Rc::ptr_eq(things[0].as_model().unwrap(), &existing));
    assert_eq!(
        things[1].as_model().unwrap().get("name").unwrap(),
        Value::from("raw")
    );
}

#[test]
fn collection_of_other_schema_is_reparsed() {
    let thing = thing_schema();
    let other = Schema::builder("Other")
        .attribute("name", AttributeOptions::new())
        .build()
        .unwrap();
    let foreign = Rc::new(Model::parse_new(&other, json!({"name": "elsewhere"})).unwrap());

    let race =
        Model::parse_new(&race_schema(&thing), [("manyThings", vec![Value::Model(Rc::clone(&foreign))])])
            .unwrap();
    let things = race.get("many_things").unwrap();
    let first = things.as_list().unwrap()[0].as_model().unwrap().clone();
    assert!(!Rc::ptr_eq(&first, &foreign));
    assert!(first.is_instance_of(&thing));
    assert_eq!(first.get("name").unwrap(), Value::from("elsewhere"));
}

#[test]
fn memoizes_resolved_values() {
    let race = parse(json!({"manyThings": [{"name": "X"}]}));
    let first = race.get("many_things").unwrap();
    let second = race.get("many_things").unwrap();
    assert!(Rc::ptr_eq(
        first.as_list().unwrap()[0].as_model().unwrap(),
        second.as_list().unwrap()[0].as_model().unwrap()
    ));
}

#[test]
fn reparse_discards_memoized_values_even_if_unchanged() {
    let race = parse(json!({"manyThings": [{"name": "X"}]}));
    let before = race.get("many_things").unwrap();
    race.parse(json!({})).unwrap();
    let after = race.get("many_things").unwrap();
    assert!(!Rc::ptr_eq(
        before.as_list().unwrap()[0].as_model().unwrap(),
        after.as_list().unwrap()[0].as_model().unwrap()
    ));
}

#[test]
fn null_collection_is_empty_list() {
    let race = parse(json!({"manyThings": null}));
    assert_eq!(race.get("many_things").unwrap(), Value::List(vec![]));
}

#[test]
fn non_list_collection_is_an_error() {
    let race = parse(json!({"manyThings": "lots"}));
    assert!(matches!(
        race.get("many_things").unwrap_err(),
        Error::NotACollection { found: "string", .. }
    ));
}

#[test]
fn parses_single_members() {
    let race = parse(json!({"singleThing": {"name": "X"}}));
    let thing = race.get("single_thing").unwrap();
    assert_eq!(
        thing.as_model().unwrap().get("name").unwrap(),
        Value::from("X")
    );
}

#[test]
fn single_member_passes_through() {
    let thing = thing_schema();
    let existing = Rc::new(Model::parse_new(&thing, json!({"name": "built"})).unwrap());

    let race = Model::parse_new(
        &race_schema(&thing),
        [("singleThing", Value::Model(Rc::clone(&existing)))],
    )
    .unwrap();
    let single = race.get("single_thing").unwrap();
    assert!(Rc::ptr_eq(single.as_model().unwrap(), &existing));
}

#[test]
fn scalar_member_is_an_error() {
    let race = parse(json!({"singleThing": 3}));
    assert!(matches!(
        race.get("single_thing").unwrap_err(),
        Error::NotARecord { found: "integer", .. }
    ));
}

#[test]
fn resolves_one_level_deep() {
    let race = parse(json!({"someDetails": {"nestedDetail": "X"}}));
    assert_eq!(race.get("nested_detail").unwrap(), Value::from("X"));
}

#[test]
fn within_does_not_fall_back_to_top_level() {
    let race = parse(json!({"nestedDetail": "top"}));
    // the alias slot is different from the source key, so nothing is found
    assert_eq!(race.get("nested_detail").unwrap(), Value::Null);
}

#[test]
fn within_uses_alias_slot_first() {
    let race = parse(json!({"nested_detail": "direct", "someDetails": {"nestedDetail": "inner"}}));
    assert_eq!(race.get("nested_detail").unwrap(), Value::from("direct"));
}

#[test]
fn try_searches_other_places() {
    let race = parse(json!({"someDetails": {"raceStatus": "inner"}}));
    assert_eq!(race.get("status").unwrap(), Value::from("inner"));

    let race = parse(json!({"raceStatus": "top"}));
    assert_eq!(race.get("status").unwrap(), Value::from("top"));

    let race = parse(json!({"status": "direct", "someDetails": {"raceStatus": "inner"}}));
    assert_eq!(race.get("status").unwrap(), Value::from("direct"));
}

#[test]
fn try_does_not_fall_back_when_root_resolves() {
    let race = parse(json!({"raceStatus": "top", "someDetails": {"other": 1}}));
    assert_eq!(race.get("status").unwrap(), Value::Null);
}

#[test]
fn roots_resolving_to_models_are_searched() {
    let details = Schema::builder("Details")
        .attribute("going", AttributeOptions::new())
        .build()
        .unwrap();
    let race = Schema::builder("Race")
        .attribute("someDetails", AttributeOptions::new().model(&details))
        .attribute("nestedDetail", AttributeOptions::new().within("some_details"))
        .attribute(
            ["status", "raceStatus"],
            AttributeOptions::new().alias("status").try_in("some_details"),
        )
        .build()
        .unwrap();

    let model = Model::parse_new(
        &race,
        json!({
            "raceStatus": "top",
            "someDetails": {"nestedDetail": "X", "raceStatus": "inner", "going": "soft"}
        }),
    )
    .unwrap();

    let root = model.get("some_details").unwrap();
    assert!(root.as_model().unwrap().is_instance_of(&details));
    assert_eq!(model.get("nested_detail").unwrap(), Value::from("X"));
    assert_eq!(model.get("status").unwrap(), Value::from("inner"));
}

#[test]
fn returns_value_stored_under_alias() {
    let race = parse(json!({"bar_name": "aliased"}));
    assert_eq!(race.get("bar_name").unwrap(), Value::from("aliased"));
}

#[test]
fn after_parse_hook_overrides_value() {
    let race = parse(json!({"afterParseValue": "from record"}));
    assert_eq!(race.get("after_parse_value").unwrap(), Value::from("after parse!"));
    // the record itself is untouched
    assert_eq!(
        race.attributes()["afterParseValue"],
        Value::from("from record")
    );
}

#[test]
fn custom_cast_receives_searched_value() {
    let race = parse(json!({"afterOptions": "hello"}));
    assert_eq!(race.get("after_options").unwrap(), Value::from("hello after parse!"));
}

#[test]
fn unparsed_instance_resolves_nothing() {
    let thing = thing_schema();
    let race = Model::new(&race_schema(&thing));
    assert_eq!(race.get("name").unwrap(), Value::Null);
    assert!(race.attributes().is_empty());
    assert!(race.cache_key().is_none());

    race.parse(json!({"name": "foo"})).unwrap();
    assert_eq!(race.get("name").unwrap(), Value::from("foo"));
}

#[test]
fn instance_parse_and_merge() {
    let thing = thing_schema();
    let race = Model::new(&race_schema(&thing));

    race.parse(json!({"name": "foo", "venue": "Randwick"})).unwrap();
    assert_eq!(race.get("name").unwrap(), Value::from("foo"));

    race.merge_attributes(json!({"name": "bar"})).unwrap();
    assert_eq!(race.get("name").unwrap(), Value::from("bar"));
    assert_eq!(race.get("venue").unwrap(), Value::from("Randwick"));
}

#[test]
fn cache_key_is_stable_across_instances() {
    let thing = thing_schema();
    let one = Model::parse_new(&thing, json!({"name": "foo"})).unwrap();
    let two = Model::parse_new(&thing, json!({"name": "foo"})).unwrap();
    assert_eq!(one.cache_key(), two.cache_key());
    assert_eq!(one.cache_key().unwrap().len(), 64);
}

#[test]
fn cache_key_changes_with_content() {
    let thing = thing_schema();
    let one = Model::parse_new(&thing, json!({"name": "foo"})).unwrap();
    let two = Model::parse_new(&thing, json!({"name": "bar"})).unwrap();
    assert_ne!(one.cache_key(), two.cache_key());
}

#[test]
fn cache_key_follows_merges() {
    let thing = thing_schema();
    let merged = Model::parse_new(&thing, json!({"name": "foo"})).unwrap();
    merged.merge_attributes(json!({"extra": 1})).unwrap();
    let direct = Model::parse_new(&thing, json!({"name": "foo", "extra": 1})).unwrap();
    assert_eq!(merged.cache_key(), direct.cache_key());
}
