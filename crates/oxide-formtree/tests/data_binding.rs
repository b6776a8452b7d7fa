//! Tests for data-source resolution and value aggregation.

mod common;
use common::*;

use oxide_formtree::{
    ArrayDataSource, DataSource, Key, NodeDef, SelectOption, Value, ValueMap,
};
use serde_json::json;

/// A source that is not null-aware and answers every lookup with one value.
#[derive(Debug)]
struct Constant(&'static str);

impl DataSource for Constant {
    fn value(&self, _name: &str) -> Option<Value> {
        Some(Value::from(self.0))
    }
}

#[test]
fn test_first_source_with_a_value_wins() {
    let mut form = form("order");
    form.add_data_source(ArrayDataSource::new(json!({"field": "from A"})));
    form.add_data_source(ArrayDataSource::new(json!({"field": "from B"})));
    form.add_data_source(Constant("from C"));
    let root = form.root();
    let field = add(&mut form, root, NodeDef::text("field"));
    assert_eq!(form.value(field), Some(Value::from("from A")));

    let other = add(&mut form, root, NodeDef::text("other"));
    assert_eq!(form.value(other), Some(Value::from("from C")));
}

#[test]
fn test_null_aware_source_stops_resolution() {
    let mut form = form("null");
    form.add_data_source(ArrayDataSource::new(json!({"field": null})));
    form.add_data_source(ArrayDataSource::new(json!({"field": "from B"})));
    let root = form.root();
    let field = add(&mut form, root, NodeDef::text("field").value("initial"));
    assert_eq!(form.value(field), Some(Value::from("")));

    let select = add(
        &mut form,
        root,
        NodeDef::select("field").options([("from B", "B")]),
    );
    assert_eq!(form.value(select), None);
}

#[test]
fn test_select_intrinsic_validation() {
    let mut form = form("sel");
    let root = form.root();
    let select = add(
        &mut form,
        root,
        NodeDef::select("num")
            .select_option(SelectOption::item("One", "1").disabled())
            .option("Two", "2"),
    );
    form.set_value(select, Some(Value::from("1"))).unwrap();
    assert_eq!(form.raw_value(select), None);
    form.set_value(select, Some(Value::from("2"))).unwrap();
    assert_eq!(form.raw_value(select), Some(Value::from("2")));

    // Values outside the option list are dropped too.
    form.set_value(select, Some(Value::from("9"))).unwrap();
    assert_eq!(form.raw_value(select), None);
}

#[test]
fn test_select_without_intrinsic_validation_accepts_anything() {
    let mut form = form("sel2");
    let root = form.root();
    let select = add(
        &mut form,
        root,
        NodeDef::select("num").intrinsic_validation(false),
    );
    form.set_value(select, Some(Value::from("anything"))).unwrap();
    assert_eq!(form.raw_value(select), Some(Value::from("anything")));
}

#[test]
fn test_tampered_single_select_takes_last_selected_in_document_order() {
    let mut form = form("tamper");
    let root = form.root();
    let select = add(
        &mut form,
        root,
        NodeDef::select("s").options([("a", "A"), ("b", "B"), ("c", "C")]),
    );
    form.set_value(select, Some(Value::list(["c", "a"]))).unwrap();
    assert_eq!(form.raw_value(select), Some(Value::from("c")));
}

#[test]
fn test_integer_keys_survive_merging() {
    let child = ValueMap::new().with(0_i64, "a").with(2_i64, "b");
    let acc = ValueMap::new().with(1_i64, "x");
    let merged = acc.merge(&child);
    let keys: Vec<&Key> = merged.keys().collect();
    assert_eq!(keys.len(), 3);
    for i in 0..3_i64 {
        assert!(merged.contains_key(i), "missing key {i}");
    }
    assert_eq!(merged.get(1_i64), Some(&Value::from("x")));
}

#[test]
fn test_fieldsets_merge_explicit_indexes() {
    let mut form = form("merge");
    let root = form.root();
    let first = add(&mut form, root, NodeDef::fieldset());
    add(&mut form, first, NodeDef::text("list[1]").value("x"));
    let second = add(&mut form, root, NodeDef::fieldset());
    add(&mut form, second, NodeDef::text("list[0]").value("a"));
    add(&mut form, second, NodeDef::text("list[2]").value("b"));

    let values = form.values();
    let list = values.get("list").and_then(Value::as_map).unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list.get(0_i64), Some(&Value::from("a")));
    assert_eq!(list.get(1_i64), Some(&Value::from("x")));
    assert_eq!(list.get(2_i64), Some(&Value::from("b")));
}

#[test]
fn test_nested_groups_build_nested_values() {
    let mut form = form("nest");
    form.add_data_source(ArrayDataSource::new(json!({
        "user": {"address": {"city": "Bergen", "zip": "5003"}},
    })));
    let root = form.root();
    let user = add(&mut form, root, NodeDef::group("user"));
    let address = add(&mut form, user, NodeDef::group("address"));
    let city = add(&mut form, address, NodeDef::text("city"));
    add(&mut form, address, NodeDef::text("zip"));

    assert_eq!(form.name(city), Some("user[address][city]"));
    assert_eq!(form.value(city), Some(Value::from("Bergen")));
    let user_value = form.value(user).and_then(Value::into_map).unwrap();
    assert_eq!(
        user_value.get_path("address[zip]"),
        Some(&Value::from("5003"))
    );
    assert_eq!(
        serde_json::to_value(form.values()).unwrap(),
        json!({"user": {"address": {"city": "Bergen", "zip": "5003"}}})
    );
}

#[test]
fn test_container_set_value_distributes_by_name() {
    let mut form = form("dist");
    let root = form.root();
    let group = add(&mut form, root, NodeDef::group("g"));
    let a = add(&mut form, group, NodeDef::text("a"));
    let b = add(&mut form, group, NodeDef::checkbox("b"));
    form.set_value(
        group,
        Some(Value::Map(ValueMap::new().with("a", "one").with("b", "1"))),
    )
    .unwrap();
    assert_eq!(form.value(a), Some(Value::from("one")));
    assert_eq!(form.value(b), Some(Value::from("1")));
}

#[test]
fn test_disabled_elements_have_no_value() {
    let mut form = form("dis");
    let root = form.root();
    let field = add(&mut form, root, NodeDef::text("x").value("v").disabled());
    assert_eq!(form.raw_value(field), None);
    form.remove_attribute(field, "disabled").unwrap();
    assert_eq!(form.raw_value(field), Some(Value::from("v")));
}

#[test]
fn test_freeze_round_trip_keeps_values() {
    let mut form = form("freeze");
    let root = form.root();
    let defs = vec![
        NodeDef::text("t").value("text"),
        NodeDef::textarea("area").value("long text"),
        NodeDef::checkbox("c").attr("checked", "checked"),
        NodeDef::select("s").options([("1", "One")]).value("1"),
        NodeDef::radio("r", "yes").attr("checked", "checked"),
    ];
    for def in defs {
        let key = add(&mut form, root, def);
        let before = (form.value(key), form.raw_value(key));
        assert!(!form.toggle_frozen(key, Some(true)).unwrap());
        assert!(form.is_frozen(key));
        assert!(form.toggle_frozen(key, Some(false)).unwrap());
        assert_eq!((form.value(key), form.raw_value(key)), before);
    }
}
