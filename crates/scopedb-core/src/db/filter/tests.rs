use super::*;
use crate::db::descriptor::{FilterSpec, QueryDescriptor};

fn status_filter(spec: FilterSpec) -> QueryDescriptor {
    QueryDescriptor::new().filter("status", spec)
}

#[test]
fn empty_groups_are_dropped() {
    let descriptor = QueryDescriptor::new()
        .filter("type", FilterSpec::List(Vec::new()))
        .filter("status", Condition::equals("active"));

    let groups = filter_groups(&descriptor.filters);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].attribute, "status");
}

#[test]
fn equals_collapse_into_one_membership_part() {
    let descriptor = status_filter(FilterSpec::List(vec![
        Condition::equals("active"),
        Condition::equals("pending"),
        Condition::equals(Value::Null),
    ]));
    let parts = filter_groups(&descriptor.filters)[0].parts();

    assert_eq!(
        parts,
        [GroupPart::Membership {
            values: vec![&Value::from("active"), &Value::from("pending")],
            include_null: true,
        }]
    );
}

#[test]
fn mixed_or_group_keeps_one_part_per_condition() {
    let descriptor = status_filter(FilterSpec::List(vec![
        Condition::not_equals("a"),
        Condition::not_equals("b"),
        Condition::equals("c"),
    ]));
    let parts = filter_groups(&descriptor.filters)[0].parts();

    assert_eq!(
        parts,
        [
            GroupPart::Compare {
                op: CompareOp::Ne,
                value: &Value::from("a"),
            },
            GroupPart::Compare {
                op: CompareOp::Ne,
                value: &Value::from("b"),
            },
            GroupPart::Compare {
                op: CompareOp::Eq,
                value: &Value::from("c"),
            },
        ]
    );
}

#[test]
fn equals_beside_comparisons_are_not_merged() {
    let descriptor = QueryDescriptor::new().filter(
        "port",
        FilterSpec::all(vec![Condition::equals(1), Condition::equals(2), Condition::gt(0)]),
    );
    let parts = filter_groups(&descriptor.filters)[0].parts();

    assert_eq!(
        parts,
        [
            GroupPart::Compare {
                op: CompareOp::Eq,
                value: &Value::Int(1),
            },
            GroupPart::Compare {
                op: CompareOp::Eq,
                value: &Value::Int(2),
            },
            GroupPart::Compare {
                op: CompareOp::Gt,
                value: &Value::Int(0),
            },
        ]
    );
}

#[test]
fn lone_not_equals_null_folds_to_exclusion() {
    let descriptor = status_filter(FilterSpec::List(vec![Condition::not_equals(Value::Null)]));
    let parts = filter_groups(&descriptor.filters)[0].parts();

    assert_eq!(
        parts,
        [GroupPart::Exclusion {
            values: Vec::new(),
            exclude_null: true,
        }]
    );
}

#[test]
fn null_comparisons_are_dropped() {
    let descriptor = status_filter(FilterSpec::List(vec![
        Condition::gt(Value::Null),
        Condition::contains(Value::Null),
        Condition::not_equals(Value::Null),
    ]));
    let parts = filter_groups(&descriptor.filters)[0].parts();

    assert_eq!(parts, [GroupPart::IsNull { negated: true }]);
}
