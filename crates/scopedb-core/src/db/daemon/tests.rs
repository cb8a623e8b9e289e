use super::*;
use crate::db::descriptor::{FilterSpec, SearchSpec};
use serde_json::json;
use time::OffsetDateTime;

fn filters(descriptor: &QueryDescriptor) -> Option<String> {
    compile_daemon_expression(&descriptor.filters, None)
}

#[test]
fn nothing_compiles_to_none() {
    assert_eq!(compile_daemon_query(&QueryDescriptor::new()), None);
}

#[test]
fn single_condition_is_parenthesized() {
    let descriptor = QueryDescriptor::new().filter("type", Condition::equals("ssh"));

    assert_eq!(filters(&descriptor).as_deref(), Some(r#"(type = "ssh")"#));
}

#[test]
fn group_operator_joins_clauses() {
    let descriptor = QueryDescriptor::new()
        .filter(
            "status",
            vec![Condition::equals("active"), Condition::equals("pending")],
        )
        .filter(
            "port",
            FilterSpec::all(vec![Condition::gte(22), Condition::lt(1024)]),
        );

    assert_eq!(
        filters(&descriptor).as_deref(),
        Some(r#"(status = "active" or status = "pending") and (port >= 22 and port < 1024)"#)
    );
}

#[test]
fn every_operator_has_a_symbol() {
    let descriptor = QueryDescriptor::new().filter(
        "name",
        FilterSpec::all(vec![
            Condition::equals("a"),
            Condition::not_equals("b"),
            Condition::contains("c"),
            Condition::gt("d"),
            Condition::gte("e"),
            Condition::lt("f"),
            Condition::lte("g"),
        ]),
    );

    assert_eq!(
        filters(&descriptor).as_deref(),
        Some(concat!(
            r#"(name = "a" and name != "b" and name % "c" and name > "d""#,
            r#" and name >= "e" and name < "f" and name <= "g")"#
        ))
    );
}

#[test]
fn quotes_and_backslashes_are_escaped() {
    let descriptor = QueryDescriptor::new().filter("name", Condition::contains(r#"a"b\c"#));

    assert_eq!(
        filters(&descriptor).as_deref(),
        Some(r#"(name % "a\"b\\c")"#)
    );
}

#[test]
fn blank_values_suppress_clauses_and_groups() {
    let descriptor = QueryDescriptor::new()
        .filter("status", vec![Condition::equals(Value::Null), Condition::equals("")])
        .filter("type", vec![Condition::equals(""), Condition::not_equals("tcp")]);

    assert_eq!(filters(&descriptor).as_deref(), Some(r#"(type != "tcp")"#));
}

#[test]
fn dates_and_booleans_render_as_literals() {
    let date = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
    let descriptor = QueryDescriptor::new()
        .filter("updated_time", Condition::gt(date))
        .filter("enabled", Condition::equals(true));

    assert_eq!(
        filters(&descriptor).as_deref(),
        Some(r#"(updated_time > "2023-11-14T22:13:20Z") and (enabled = true)"#)
    );
}

#[test]
fn search_fields_become_one_or_group() {
    let search = Search::from(SearchSpec::new("prod").fields(["name", "description"]));

    assert_eq!(
        compile_daemon_expression(&Filters::new(), Some(&search)).as_deref(),
        Some(r#"(name % "prod" or description % "prod")"#)
    );
}

#[test]
fn filters_and_search_combine_with_and() {
    let descriptor = QueryDescriptor::new()
        .filter("type", Condition::equals("ssh"))
        .search(SearchSpec::new("prod").fields(["name"]));

    assert_eq!(
        compile_daemon_query(&descriptor).as_deref(),
        Some(r#"(type = "ssh") and (name % "prod")"#)
    );
}

#[test]
fn bare_or_blank_search_adds_nothing() {
    let bare = Search::from("prod");
    let blank = Search::from(SearchSpec::new("").fields(["name"]));

    assert_eq!(compile_daemon_expression(&Filters::new(), Some(&bare)), None);
    assert_eq!(compile_daemon_expression(&Filters::new(), Some(&blank)), None);
}

#[test]
fn descriptor_json_compiles_in_key_order() {
    let descriptor: QueryDescriptor = serde_json::from_value(json!({
        "filters": {
            "type": [{ "equals": "ssh" }],
            "id": { "logicalOperator": "and", "values": [{ "notEquals": "t_1" }, { "notEquals": "t_2" }] },
        },
    }))
    .unwrap();

    assert_eq!(
        compile_daemon_query(&descriptor).as_deref(),
        Some(r#"(type = "ssh") and (id != "t_1" and id != "t_2")"#)
    );
}

#[test]
fn compilation_is_idempotent() {
    let descriptor = QueryDescriptor::new()
        .filter("type", Condition::equals("ssh"))
        .search(SearchSpec::new("x").fields(["name"]));

    assert_eq!(compile_daemon_query(&descriptor), compile_daemon_query(&descriptor));
}
