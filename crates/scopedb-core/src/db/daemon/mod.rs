//! Descriptor → search daemon expression.
//!
//! The daemon's query language is symbolic: `=`, `!=`, `%` (contains),
//! `>`, `>=`, `<`, `<=`. Each filter group becomes one parenthesized
//! clause list; groups and the search clause are joined with `and`.

#[cfg(test)]
mod tests;

use crate::{
    db::descriptor::{Condition, Filters, QueryDescriptor, Search},
    value::Value,
};
use tracing::debug;

///
/// DaemonOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum DaemonOp {
    Eq,
    Ne,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl DaemonOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Contains => "%",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    const fn of(condition: &Condition) -> (Self, &Value) {
        match condition {
            Condition::Equals(value) => (Self::Eq, value),
            Condition::NotEquals(value) => (Self::Ne, value),
            Condition::Contains(value) => (Self::Contains, value),
            Condition::Gt(value) => (Self::Gt, value),
            Condition::Gte(value) => (Self::Gte, value),
            Condition::Lt(value) => (Self::Lt, value),
            Condition::Lte(value) => (Self::Lte, value),
        }
    }
}

/// Compile filters and search into one daemon expression.
///
/// Returns `None` when neither produces a clause.
#[must_use]
pub fn compile_daemon_expression(filters: &Filters, search: Option<&Search>) -> Option<String> {
    let filter_expr = filter_expression(filters);
    let search_expr = search.and_then(search_expression);

    let expression = match (filter_expr, search_expr) {
        (Some(filters), Some(search)) => Some(format!("{filters} and {search}")),
        (filters, search) => filters.or(search),
    };

    debug!(expression = ?expression, "compiled daemon expression");

    expression
}

/// Compile a whole descriptor; only its filters and search are used.
#[must_use]
pub fn compile_daemon_query(descriptor: &QueryDescriptor) -> Option<String> {
    compile_daemon_expression(&descriptor.filters, descriptor.search.as_ref())
}

fn filter_expression(filters: &Filters) -> Option<String> {
    let groups = filters
        .iter()
        .filter_map(|(attribute, spec)| {
            let keyword = spec.logical_operator().daemon_keyword();
            let clauses = spec
                .conditions()
                .iter()
                .filter_map(|condition| {
                    let (op, value) = DaemonOp::of(condition);
                    clause(attribute, op, value)
                })
                .collect::<Vec<_>>();

            (!clauses.is_empty()).then(|| format!("({})", clauses.join(&format!(" {keyword} "))))
        })
        .collect::<Vec<_>>();

    (!groups.is_empty()).then(|| groups.join(" and "))
}

// Only the object form names fields; a bare search string has nothing to
// qualify and contributes no clause.
fn search_expression(search: &Search) -> Option<String> {
    let text = Value::from(search.text());

    let clauses = search
        .fields()
        .iter()
        .filter_map(|field| clause(field, DaemonOp::Contains, &text))
        .collect::<Vec<_>>();

    (!clauses.is_empty()).then(|| format!("({})", clauses.join(" or ")))
}

fn clause(attribute: &str, op: DaemonOp, value: &Value) -> Option<String> {
    literal(value).map(|literal| format!("{attribute} {} {literal}", op.symbol()))
}

/// Render a value as a daemon literal. Blank values have no literal.
fn literal(value: &Value) -> Option<String> {
    if value.is_blank() {
        return None;
    }

    match value {
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => value.to_text(),
        _ => value.to_text().map(|text| quote(&text)),
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');

    quoted
}
