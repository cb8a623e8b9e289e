//! Query descriptor: the backend-agnostic input contract.
//!
//! Descriptors are plain data. They deserialize from the console's JSON
//! shape (camelCase keys) and are never mutated by the compilers.

mod ordered;


use crate::{error::CompileError, value::Value};
use serde::Deserialize;

pub use ordered::OrderedMap;

/// Filter groups keyed by canonical attribute name, in descriptor order.
pub type Filters = OrderedMap<FilterSpec>;

///
/// QueryDescriptor
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub filters: Filters,
    pub search: Option<Search>,
    pub sort: Option<Sort>,
    pub pagination: Option<Pagination>,
    pub select: Vec<SelectField>,
    pub joins: Vec<Join>,
}

impl QueryDescriptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the filter group for one attribute.
    #[must_use]
    pub fn filter(mut self, attribute: impl Into<String>, spec: impl Into<FilterSpec>) -> Self {
        self.filters.insert(attribute, spec.into());
        self
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<Search>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    #[must_use]
    pub const fn paginate(mut self, page: u64, page_size: u64) -> Self {
        self.pagination = Some(Pagination {
            page: Some(page),
            page_size: Some(page_size),
        });
        self
    }

    #[must_use]
    pub fn select(mut self, field: SelectField) -> Self {
        self.select.push(field);
        self
    }

    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }
}

///
/// LogicalOperator
///
/// How conditions inside one filter group combine. Defaults to `or`.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    #[default]
    Or,
}

impl LogicalOperator {
    /// Keyword used by the search daemon's query language.
    #[must_use]
    pub const fn daemon_keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

///
/// FilterSpec
///
/// Either a bare condition list (combined with `or`) or an explicit group.
/// Extra keys on the grouped form are ignored.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterSpec {
    List(Vec<Condition>),
    Grouped {
        #[serde(default, rename = "logicalOperator")]
        logical_operator: Option<LogicalOperator>,
        values: Vec<Condition>,
    },
}

impl FilterSpec {
    /// Conditions combined with `and`.
    #[must_use]
    pub const fn all(values: Vec<Condition>) -> Self {
        Self::Grouped {
            logical_operator: Some(LogicalOperator::And),
            values,
        }
    }

    #[must_use]
    pub fn logical_operator(&self) -> LogicalOperator {
        match self {
            Self::List(_) => LogicalOperator::Or,
            Self::Grouped {
                logical_operator, ..
            } => logical_operator.unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        match self {
            Self::List(values) | Self::Grouped { values, .. } => values,
        }
    }
}

impl From<Vec<Condition>> for FilterSpec {
    fn from(values: Vec<Condition>) -> Self {
        Self::List(values)
    }
}

impl From<Condition> for FilterSpec {
    fn from(condition: Condition) -> Self {
        Self::List(vec![condition])
    }
}

///
/// Condition
///
/// One operator applied to one value. The enum shape makes "exactly one
/// operator per condition" structural: `{ "equals": 1, "gt": 2 }` does
/// not deserialize.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    Equals(Value),
    NotEquals(Value),
    Contains(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
}

impl Condition {
    #[must_use]
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals(value.into())
    }

    #[must_use]
    pub fn not_equals(value: impl Into<Value>) -> Self {
        Self::NotEquals(value.into())
    }

    #[must_use]
    pub fn contains(value: impl Into<Value>) -> Self {
        Self::Contains(value.into())
    }

    #[must_use]
    pub fn gt(value: impl Into<Value>) -> Self {
        Self::Gt(value.into())
    }

    #[must_use]
    pub fn gte(value: impl Into<Value>) -> Self {
        Self::Gte(value.into())
    }

    #[must_use]
    pub fn lt(value: impl Into<Value>) -> Self {
        Self::Lt(value.into())
    }

    #[must_use]
    pub fn lte(value: impl Into<Value>) -> Self {
        Self::Lte(value.into())
    }
}

///
/// Search
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Search {
    Text(String),
    Spec(SearchSpec),
}

impl Search {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Spec(spec) => &spec.text,
        }
    }

    /// Explicit field list; empty for the bare string form.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        match self {
            Self::Text(_) => &[],
            Self::Spec(spec) => &spec.fields,
        }
    }

    #[must_use]
    pub fn select(&self) -> SearchSelect {
        match self {
            Self::Text(_) => SearchSelect::default(),
            Self::Spec(spec) => spec.select,
        }
    }

    #[must_use]
    pub fn related_searches(&self) -> &[RelatedSearch] {
        match self {
            Self::Text(_) => &[],
            Self::Spec(spec) => &spec.related_searches,
        }
    }
}

impl From<&str> for Search {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Search {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<SearchSpec> for Search {
    fn from(spec: SearchSpec) -> Self {
        Self::Spec(spec)
    }
}

///
/// SearchSpec
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchSpec {
    pub text: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub select: SearchSelect,
    #[serde(default)]
    pub related_searches: Vec<RelatedSearch>,
}

impl SearchSpec {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

///
/// SearchSelect
/// Correlation column between a resource and its full-text index.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SearchSelect {
    Id,
    #[default]
    Rowid,
}

impl SearchSelect {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Rowid => "rowid",
        }
    }
}

///
/// RelatedSearch
/// Full-text search over another resource, correlated back by a join column.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSearch {
    pub resource: String,
    #[serde(default)]
    pub fields: Vec<String>,
    pub join: SearchJoin,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchJoin {
    pub join_on: String,
    pub join_from: Option<String>,
}

///
/// Sort
///
/// `direction` stays raw text so an unknown token is reported as a
/// compile-time validation error naming the token.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    #[serde(default)]
    pub attributes: Vec<String>,
    pub direction: Option<String>,
    #[serde(default)]
    pub is_coalesced: bool,
    pub custom_sort: Option<CustomSort>,
}

impl Sort {
    #[must_use]
    pub fn by<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    #[must_use]
    pub fn asc(self) -> Self {
        self.direction("asc")
    }

    #[must_use]
    pub fn desc(self) -> Self {
        self.direction("desc")
    }

    #[must_use]
    pub fn custom(mut self, attribute_map: OrderedMap<Value>) -> Self {
        self.custom_sort = Some(CustomSort { attribute_map });
        self
    }

    /// Parse the raw direction token; absent means descending.
    pub fn resolved_direction(&self) -> Result<SortDirection, CompileError> {
        SortDirection::parse(self.direction.as_deref())
    }
}

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Result<Self, CompileError> {
        match raw {
            None | Some("desc") => Ok(Self::Desc),
            Some("asc") => Ok(Self::Asc),
            Some(other) => Err(CompileError::InvalidSortDirection {
                direction: other.to_string(),
            }),
        }
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

///
/// CustomSort
/// Raw column value → sort key, rendered as a CASE expression.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomSort {
    pub attribute_map: OrderedMap<Value>,
}

///
/// Pagination
/// Only applied when both `page` and `page_size` are present.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl Pagination {
    /// Resolve to `(limit, offset)`. Pages are 1-based; page 0 reads as page 1.
    #[must_use]
    pub const fn window(&self) -> Option<(u64, u64)> {
        match (self.page, self.page_size) {
            (Some(page), Some(size)) => Some((size, page.saturating_sub(1).saturating_mul(size))),
            _ => None,
        }
    }
}

///
/// SelectField
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SelectField {
    pub field: String,
    pub alias: Option<String>,
    #[serde(default)]
    pub is_count: bool,
    #[serde(default)]
    pub is_distinct: bool,
}

impl SelectField {
    #[must_use]
    pub fn column(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            alias: None,
            is_count: false,
            is_distinct: false,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub const fn count(mut self) -> Self {
        self.is_count = true;
        self
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.is_distinct = true;
        self
    }
}

///
/// JoinType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
pub enum JoinType {
    #[default]
    #[serde(rename = "INNER", alias = "inner")]
    Inner,
    #[serde(rename = "LEFT", alias = "left")]
    Left,
}

impl JoinType {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
        }
    }
}

///
/// Join
///
/// Only the nested query's filters are compiled; they are qualified with
/// the join's alias and ANDed after the root resource's own filters.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    pub resource: String,
    #[serde(default)]
    pub query: QueryDescriptor,
    pub join_on: String,
    pub join_from: Option<String>,
    #[serde(default)]
    pub join_type: JoinType,
}

impl Join {
    #[must_use]
    pub fn new(resource: impl Into<String>, join_on: impl Into<String>, join_type: JoinType) -> Self {
        Self {
            resource: resource.into(),
            query: QueryDescriptor::default(),
            join_on: join_on.into(),
            join_from: None,
            join_type,
        }
    }

    #[must_use]
    pub fn query(mut self, query: QueryDescriptor) -> Self {
        self.query = query;
        self
    }
}
