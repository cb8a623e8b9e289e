use crate::{
    db::sql::{
        CompiledSql,
        ast::{Expr, OrderKey, OrderTerm},
    },
    value::Value,
};

///
/// SqlWriter
///
/// Single rendering pass over the clause AST. Placeholders and parameters
/// are emitted together, so `?` order always matches parameter order.
///

#[derive(Debug, Default)]
pub(crate) struct SqlWriter {
    sql: String,
    parameters: Vec<Value>,
}

impl SqlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub(crate) fn bind(&mut self, value: &Value) {
        self.sql.push('?');
        self.parameters.push(value.to_parameter());
    }

    /// WHERE clause: filter groups parenthesized one by one, trailing
    /// terms (the search subquery) appended bare, all joined with AND.
    pub(crate) fn where_clause(&mut self, groups: &[Expr], trailing: &[Expr]) {
        if groups.is_empty() && trailing.is_empty() {
            return;
        }

        self.push(" WHERE ");
        let mut first = true;
        for group in groups {
            self.separator(&mut first, " AND ");
            self.push("(");
            self.expr(group);
            self.push(")");
        }
        for term in trailing {
            self.separator(&mut first, " AND ");
            self.expr(term);
        }
    }

    pub(crate) fn order_clause(&mut self, terms: &[OrderTerm]) {
        if terms.is_empty() {
            return;
        }

        self.push(" ORDER BY ");
        let mut first = true;
        for term in terms {
            self.separator(&mut first, ", ");
            self.order_term(term);
        }
    }

    pub(crate) fn limit_clause(&mut self, limit: u64, offset: u64) {
        self.push(" LIMIT ");
        self.bind(&Value::Int(clamp_i64(limit)));
        self.push(" OFFSET ");
        self.bind(&Value::Int(clamp_i64(offset)));
    }

    pub(crate) fn finish(self) -> CompiledSql {
        CompiledSql {
            sql: self.sql,
            parameters: self.parameters,
        }
    }

    fn separator(&mut self, first: &mut bool, separator: &str) {
        if !*first {
            self.push(separator);
        }
        *first = false;
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Compare { column, op, value } => {
                self.push(&format!("{column} {op} "));
                self.bind(value);
            }
            Expr::Like { column, pattern } => {
                self.push(&format!("{column} LIKE "));
                self.bind(pattern);
            }
            Expr::InList {
                column,
                values,
                negated,
            } => {
                let keyword = if *negated { "NOT IN" } else { "IN" };
                self.push(&format!("{column} {keyword} ("));
                let mut first = true;
                for value in values {
                    self.separator(&mut first, ", ");
                    self.bind(value);
                }
                self.push(")");
            }
            Expr::IsNull { column, negated } => {
                let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
                self.push(&format!("{column} {keyword}"));
            }
            Expr::InSubquery { column, branches } => {
                self.push(&format!("{column} IN ("));
                let mut first = true;
                for branch in branches {
                    self.separator(&mut first, " UNION ");
                    self.push(&branch.head);
                    self.push(" MATCH ");
                    self.bind(&branch.pattern);
                }
                self.push(")");
            }
            Expr::And(children) => self.compound(children, " AND "),
            Expr::Or(children) => self.compound(children, " OR "),
        }
    }

    fn compound(&mut self, children: &[Expr], separator: &str) {
        let mut first = true;
        for child in children {
            self.separator(&mut first, separator);
            if child.is_compound() {
                self.push("(");
                self.expr(child);
                self.push(")");
            } else {
                self.expr(child);
            }
        }
    }

    fn order_term(&mut self, term: &OrderTerm) {
        match &term.key {
            OrderKey::Column(column) => self.push(&column.to_string()),
            OrderKey::Coalesce(columns) => {
                let list = columns
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.push(&format!("COALESCE({list})"));
            }
            OrderKey::Case { column, arms } => {
                self.push(&format!("CASE {column}"));
                for (raw, key) in arms {
                    self.push(" WHEN ");
                    self.bind(raw);
                    self.push(" THEN ");
                    self.bind(key);
                }
                self.push(" END");
            }
        }

        if term.collate_nocase {
            self.push(" COLLATE NOCASE");
        }
        self.push(" ");
        self.push(term.direction.keyword());
    }
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
