//! Local store seam.
//!
//! The collection query engine reads through [`LocalStore`]: whole
//! collections, secondary-index range queries and primary-key lookups.
//! Index ranges follow SQL null semantics so a query means the same
//! thing here as it does against the relational engine.

mod memory;

pub use memory::MemoryStore;

use crate::{
    ID_ATTRIBUTE,
    db::mapper::StoragePath,
    error::StoreError,
    value::{Value, parse_iso},
};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

/// A stored document: `id` at the top level, everything else under `attributes`.
pub type Record = JsonValue;

/// Primary key of a record, if it has a scalar `id`.
#[must_use]
pub fn record_key(record: &Record) -> Option<String> {
    match record.get(ID_ATTRIBUTE)? {
        JsonValue::String(id) => Some(id.clone()),
        JsonValue::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

///
/// LocalStore
///
/// Asynchronous read access to one local ordered store. Implementations
/// return records in the store's own order.
///

#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn all(&self, collection: &str) -> Result<Vec<Record>, StoreError>;

    async fn query_index(
        &self,
        collection: &str,
        query: &IndexQuery,
    ) -> Result<Vec<Record>, StoreError>;

    /// Primary keys of the records an index query selects.
    async fn primary_keys(
        &self,
        collection: &str,
        query: &IndexQuery,
    ) -> Result<Vec<String>, StoreError> {
        let records = self.query_index(collection, query).await?;

        Ok(records.iter().filter_map(record_key).collect())
    }
}

///
/// IndexQuery
/// One range or equality probe on a storage path.
///

#[derive(Clone, Debug, PartialEq)]
pub struct IndexQuery {
    pub path: StoragePath,
    pub range: IndexRange,
}

impl IndexQuery {
    #[must_use]
    pub const fn new(path: StoragePath, range: IndexRange) -> Self {
        Self { path, range }
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.range.matches(self.path.resolve(record))
    }
}

///
/// IndexRange
///
/// Missing and null stored values only match an `AnyOf` that lists
/// `Value::Null`. They never match `NoneOf` or an ordered bound.
///

#[derive(Clone, Debug, PartialEq)]
pub enum IndexRange {
    AnyOf(Vec<Value>),
    NoneOf(Vec<Value>),
    Above(Value),
    AboveOrEqual(Value),
    Below(Value),
    BelowOrEqual(Value),
}

impl IndexRange {
    #[must_use]
    pub fn matches(&self, stored: Option<&JsonValue>) -> bool {
        let stored = stored.filter(|value| !value.is_null());

        match self {
            Self::AnyOf(values) => match stored {
                None => values.iter().any(Value::is_null),
                Some(stored) => values.iter().any(|value| equals(stored, value)),
            },
            Self::NoneOf(values) => {
                stored.is_some_and(|stored| !values.iter().any(|value| equals(stored, value)))
            }
            Self::Above(bound) => ordered(stored, bound, Ordering::is_gt),
            Self::AboveOrEqual(bound) => ordered(stored, bound, Ordering::is_ge),
            Self::Below(bound) => ordered(stored, bound, Ordering::is_lt),
            Self::BelowOrEqual(bound) => ordered(stored, bound, Ordering::is_le),
        }
    }
}

fn equals(stored: &JsonValue, value: &Value) -> bool {
    compare(stored, value) == Some(Ordering::Equal)
}

fn ordered(stored: Option<&JsonValue>, bound: &Value, accept: fn(Ordering) -> bool) -> bool {
    stored
        .and_then(|stored| compare(stored, bound))
        .is_some_and(accept)
}

/// Order a stored JSON scalar against a condition value. Mismatched kinds
/// are incomparable; dates compare against RFC 3339 strings.
#[allow(clippy::cast_precision_loss)]
fn compare(stored: &JsonValue, value: &Value) -> Option<Ordering> {
    match (stored, value) {
        (JsonValue::Bool(stored), Value::Bool(value)) => Some(stored.cmp(value)),
        (JsonValue::Number(stored), Value::Int(value)) => match stored.as_i64() {
            Some(stored) => Some(stored.cmp(value)),
            None => stored.as_f64()?.partial_cmp(&(*value as f64)),
        },
        (JsonValue::Number(stored), Value::Float(value)) => stored.as_f64()?.partial_cmp(value),
        (JsonValue::String(stored), Value::Text(value)) => Some(stored.as_str().cmp(value)),
        (JsonValue::String(stored), Value::Date(value)) => {
            parse_iso(stored).map(|stored| stored.cmp(value))
        }
        _ => None,
    }
}

///
/// TESTS
///
