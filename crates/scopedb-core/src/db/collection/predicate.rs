use crate::{
    db::{
        filter::{CompareOp, GroupPart},
        mapper::{StoragePath, canonical_to_storage_path},
        store::{IndexQuery, IndexRange, Record},
    },
    value::Value,
};
use serde_json::Value as JsonValue;

///
/// Clause
///
/// One group part resolved against a storage path. Range clauses can be
/// answered by a secondary index; substring containment cannot and is
/// only ever evaluated in memory.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Clause {
    Range(IndexQuery),
    Contains { path: StoragePath, needle: String },
}

impl Clause {
    pub(crate) fn from_part(path: &StoragePath, part: &GroupPart<'_>) -> Self {
        match index_range(part) {
            Ok(range) => Self::Range(IndexQuery::new(path.clone(), range)),
            Err(needle) => Self::Contains {
                path: path.clone(),
                needle: needle.to_text().unwrap_or_default().to_lowercase(),
            },
        }
    }

    #[must_use]
    pub const fn as_index(&self) -> Option<&IndexQuery> {
        match self {
            Self::Range(query) => Some(query),
            Self::Contains { .. } => None,
        }
    }

    /// Evaluate the clause against one record. `contains` is
    /// case-insensitive and never matches a missing value.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Range(query) => query.matches(record),
            Self::Contains { path, needle } => path
                .resolve(record)
                .and_then(scalar_text)
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str())),
        }
    }
}

/// Index range equivalent of a group part. Containment has none and
/// hands back its needle instead.
pub(crate) fn index_range<'a>(part: &GroupPart<'a>) -> Result<IndexRange, &'a Value> {
    let range = match part {
        GroupPart::Membership {
            values,
            include_null,
        } => {
            let mut values = values.iter().map(|value| (*value).clone()).collect::<Vec<_>>();
            if *include_null {
                values.push(Value::Null);
            }

            IndexRange::AnyOf(values)
        }
        GroupPart::Exclusion { values, .. } => {
            IndexRange::NoneOf(values.iter().map(|value| (*value).clone()).collect())
        }
        GroupPart::Compare { op, value } => {
            let value = (*value).clone();

            match op {
                CompareOp::Eq => IndexRange::AnyOf(vec![value]),
                CompareOp::Ne => IndexRange::NoneOf(vec![value]),
                CompareOp::Gt => IndexRange::Above(value),
                CompareOp::Gte => IndexRange::AboveOrEqual(value),
                CompareOp::Lt => IndexRange::Below(value),
                CompareOp::Lte => IndexRange::BelowOrEqual(value),
            }
        }
        GroupPart::IsNull { negated: false } => IndexRange::AnyOf(vec![Value::Null]),
        GroupPart::IsNull { negated: true } => IndexRange::NoneOf(Vec::new()),
        GroupPart::Contains(needle) => return Err(*needle),
    };

    Ok(range)
}

///
/// TextScan
///
/// Case-insensitive substring search over a record. With no field paths
/// every scalar in the record is scanned.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TextScan {
    needle: String,
    paths: Vec<StoragePath>,
}

impl TextScan {
    #[must_use]
    pub fn new(text: &str, fields: &[String]) -> Self {
        Self {
            needle: text.to_lowercase(),
            paths: fields
                .iter()
                .map(|field| canonical_to_storage_path(field))
                .collect(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[StoragePath] {
        &self.paths
    }

    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        if self.paths.is_empty() {
            return any_leaf_contains(record, &self.needle);
        }

        self.paths.iter().any(|path| {
            path.resolve(record)
                .is_some_and(|value| any_leaf_contains(value, &self.needle))
        })
    }
}

fn any_leaf_contains(value: &JsonValue, needle: &str) -> bool {
    match value {
        JsonValue::Array(items) => items.iter().any(|item| any_leaf_contains(item, needle)),
        JsonValue::Object(map) => map.values().any(|item| any_leaf_contains(item, needle)),
        scalar => scalar_text(scalar).is_some_and(|text| text.to_lowercase().contains(needle)),
    }
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(text) => Some(text.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}
