use crate::{
    db::store::{IndexQuery, LocalStore, Record},
    error::StoreError,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

///
/// MemoryStore
///
/// In-memory local store. Collections keep insertion order and index
/// queries are answered by scanning.
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Record>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a whole collection.
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>, records: Vec<Record>) -> Self {
        self.collections.insert(collection.into(), records);
        self
    }

    /// Append one record, creating the collection if needed.
    pub fn insert(&mut self, collection: &str, record: Record) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    fn collection(&self, collection: &str) -> Result<&[Record], StoreError> {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::UnknownCollection {
                collection: collection.to_string(),
            })
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn all(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        Ok(self.collection(collection)?.to_vec())
    }

    async fn query_index(
        &self,
        collection: &str,
        query: &IndexQuery,
    ) -> Result<Vec<Record>, StoreError> {
        Ok(self
            .collection(collection)?
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{mapper::canonical_to_storage_path, store::IndexRange},
        value::Value,
    };
    use serde_json::json;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert("target", json!({ "id": "t_1", "attributes": { "type": "ssh" } }));
        store.insert("target", json!({ "id": "t_2", "attributes": { "type": "tcp" } }));
        store.insert("target", json!({ "id": "t_3", "attributes": {} }));

        store
    }

    fn type_query(range: IndexRange) -> IndexQuery {
        IndexQuery::new(canonical_to_storage_path("type"), range)
    }

    #[tokio::test]
    async fn all_keeps_insertion_order() {
        let records = store().all("target").await.unwrap();
        let ids = records.iter().filter_map(|r| r["id"].as_str()).collect::<Vec<_>>();

        assert_eq!(ids, ["t_1", "t_2", "t_3"]);
    }

    #[tokio::test]
    async fn index_query_filters_records() {
        let records = store()
            .query_index("target", &type_query(IndexRange::AnyOf(vec![Value::from("tcp")])))
            .await
            .unwrap();

        assert_eq!(records, [json!({ "id": "t_2", "attributes": { "type": "tcp" } })]);
    }

    #[tokio::test]
    async fn primary_keys_default_to_index_records() {
        let keys = store()
            .primary_keys("target", &type_query(IndexRange::AnyOf(vec![Value::Null])))
            .await
            .unwrap();

        assert_eq!(keys, ["t_3"]);
    }

    #[tokio::test]
    async fn unknown_collection_is_a_store_error() {
        let err = store().all("alias").await.unwrap_err();

        assert_eq!(
            err,
            StoreError::UnknownCollection {
                collection: "alias".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn store_is_usable_as_trait_object() {
        let store: Box<dyn LocalStore> = Box::new(store());

        assert_eq!(store.all("target").await.unwrap().len(), 3);
    }
}
