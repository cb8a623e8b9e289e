use crate::{db::descriptor::SortDirection, value::Value};
use std::fmt;

///
/// SQL clause AST
///
/// Intermediate form between descriptors and SQL text. Identifiers in the
/// AST are already validated; every `Value` becomes a bound parameter when
/// the writer renders it.
///

///
/// Qualifier
/// Root table references are quoted; join aliases are bare.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Qualifier {
    Table(String),
    Alias(String),
}

///
/// Column
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Column {
    pub(crate) qualifier: Qualifier,
    pub(crate) name: String,
}

impl Column {
    pub(crate) fn new(qualifier: &Qualifier, name: &str) -> Self {
        Self {
            qualifier: qualifier.clone(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Qualifier::Table(table) => write!(f, "\"{table}\".{}", self.name),
            Qualifier::Alias(alias) => write!(f, "{alias}.{}", self.name),
        }
    }
}

///
/// Expr
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Expr {
    Compare {
        column: Column,
        op: &'static str,
        value: Value,
    },
    Like {
        column: Column,
        pattern: Value,
    },
    InList {
        column: Column,
        values: Vec<Value>,
        negated: bool,
    },
    IsNull {
        column: Column,
        negated: bool,
    },
    InSubquery {
        column: Column,
        branches: Vec<MatchBranch>,
    },
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl Expr {
    /// Compound nodes need parentheses when nested inside another compound.
    pub(crate) const fn is_compound(&self) -> bool {
        match self {
            Self::And(children) | Self::Or(children) => children.len() > 1,
            _ => false,
        }
    }
}

///
/// MatchBranch
///
/// One `SELECT … WHERE <fts> MATCH ?` branch of a full-text subquery.
/// `head` is everything before `MATCH`.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MatchBranch {
    pub(crate) head: String,
    pub(crate) pattern: Value,
}

///
/// OrderKey
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum OrderKey {
    Column(Column),
    Coalesce(Vec<Column>),
    Case { column: Column, arms: Vec<(Value, Value)> },
}

///
/// OrderTerm
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OrderTerm {
    pub(crate) key: OrderKey,
    pub(crate) collate_nocase: bool,
    pub(crate) direction: SortDirection,
}
