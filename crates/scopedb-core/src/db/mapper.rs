//! Canonical attribute → local storage path.
//!
//! Local records keep the resource id at the top level and every other
//! attribute under `attributes`. `scope_id` is the one attribute whose
//! storage path is nested further.

use crate::ID_ATTRIBUTE;
use derive_more::Deref;
use serde_json::Value as JsonValue;
use std::fmt;

const ATTRIBUTES_ROOT: &str = "attributes";
const SCOPE_ID_ATTRIBUTE: &str = "scope_id";

///
/// StoragePath
/// Dotted key path into a stored record.
///

#[derive(Clone, Debug, Deref, Eq, Hash, PartialEq)]
pub struct StoragePath(Vec<String>);

impl StoragePath {
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Follow the path into a record; `None` when any segment is missing.
    #[must_use]
    pub fn resolve<'r>(&self, record: &'r JsonValue) -> Option<&'r JsonValue> {
        self.0
            .iter()
            .try_fold(record, |node, segment| node.get(segment.as_str()))
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Map a canonical attribute name to its storage path.
#[must_use]
pub fn canonical_to_storage_path(attribute: &str) -> StoragePath {
    match attribute {
        ID_ATTRIBUTE => StoragePath::new([ID_ATTRIBUTE]),
        SCOPE_ID_ATTRIBUTE => StoragePath::new([ATTRIBUTES_ROOT, "scope", SCOPE_ID_ATTRIBUTE]),
        other => StoragePath::new([ATTRIBUTES_ROOT, other]),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_stays_bare() {
        assert_eq!(canonical_to_storage_path("id").to_string(), "id");
    }

    #[test]
    fn scope_id_maps_to_nested_scope() {
        assert_eq!(
            canonical_to_storage_path("scope_id").to_string(),
            "attributes.scope.scope_id"
        );
    }

    #[test]
    fn other_attributes_live_under_attributes() {
        assert_eq!(canonical_to_storage_path("type").to_string(), "attributes.type");
    }

    #[test]
    fn resolve_walks_nested_objects() {
        let record = json!({
            "id": "tssh_1",
            "attributes": { "scope": { "scope_id": "p_1" } },
        });

        assert_eq!(
            canonical_to_storage_path("scope_id").resolve(&record),
            Some(&json!("p_1"))
        );
        assert_eq!(canonical_to_storage_path("name").resolve(&record), None);
    }
}
