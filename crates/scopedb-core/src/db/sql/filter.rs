use crate::{
    db::{
        descriptor::LogicalOperator,
        filter::{CompareOp, FilterGroup, GroupPart},
        ident,
        sql::ast::{Column, Expr, Qualifier},
    },
    error::CompileError,
    value::Value,
};

/// Lower one filter group to an expression rendered as one parenthesized
/// WHERE group. Groups whose parts all dropped out contribute nothing.
pub(crate) fn lower_group(
    group: &FilterGroup<'_>,
    qualifier: &Qualifier,
) -> Result<Option<Expr>, CompileError> {
    let name = ident::checked(group.attribute, "column")?;
    let column = Column::new(qualifier, name);

    let mut exprs = group
        .parts()
        .into_iter()
        .filter_map(|part| lower_part(&column, part))
        .collect::<Vec<_>>();

    Ok(match exprs.len() {
        0 => None,
        1 => exprs.pop(),
        _ => Some(match group.operator {
            LogicalOperator::And => Expr::And(exprs),
            LogicalOperator::Or => Expr::Or(exprs),
        }),
    })
}

fn lower_part(column: &Column, part: GroupPart<'_>) -> Option<Expr> {
    match part {
        GroupPart::Membership {
            values,
            include_null,
        } => {
            let set = value_set(column, &values, false);
            let null = include_null.then(|| Expr::IsNull {
                column: column.clone(),
                negated: false,
            });

            combine(set, null, Expr::Or)
        }
        GroupPart::Exclusion {
            values,
            exclude_null,
        } => {
            let set = value_set(column, &values, true);
            let null = exclude_null.then(|| Expr::IsNull {
                column: column.clone(),
                negated: true,
            });

            combine(set, null, Expr::And)
        }
        GroupPart::Compare { op, value } => Some(Expr::Compare {
            column: column.clone(),
            op: op.symbol(),
            value: value.clone(),
        }),
        GroupPart::IsNull { negated } => Some(Expr::IsNull {
            column: column.clone(),
            negated,
        }),
        GroupPart::Contains(value) => Some(Expr::Like {
            column: column.clone(),
            pattern: like_pattern(value),
        }),
    }
}

// One value compares directly; several collapse into one IN list.
fn value_set(column: &Column, values: &[&Value], negated: bool) -> Option<Expr> {
    match values {
        [] => None,
        [value] => Some(Expr::Compare {
            column: column.clone(),
            op: (if negated { CompareOp::Ne } else { CompareOp::Eq }).symbol(),
            value: (*value).clone(),
        }),
        _ => Some(Expr::InList {
            column: column.clone(),
            values: values.iter().map(|value| (*value).clone()).collect(),
            negated,
        }),
    }
}

fn combine(set: Option<Expr>, null: Option<Expr>, join: fn(Vec<Expr>) -> Expr) -> Option<Expr> {
    match (set, null) {
        (Some(set), Some(null)) => Some(join(vec![set, null])),
        (set, null) => set.or(null),
    }
}

fn like_pattern(value: &Value) -> Value {
    let text = value.to_text().unwrap_or_default();

    Value::Text(format!("%{text}%"))
}
