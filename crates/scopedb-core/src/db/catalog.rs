//! Schema provider and resource-to-storage table.
//!
//! Both are passed explicitly into each compile call; nothing here is
//! global. A resource without a storage entry compiles to the minimal
//! unfiltered query.

use crate::{CREATED_TIME_ATTRIBUTE, ID_ATTRIBUTE, error::CompileError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMPTY_SCHEMA: ResourceSchema = ResourceSchema {
    attributes: Vec::new(),
    search_fields: Vec::new(),
};

///
/// AttributeType
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Number,
    Boolean,
    Date,
}

impl AttributeType {
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String)
    }
}

///
/// ResourceSchema
///
/// Declared attributes of one resource, in declaration order, plus the
/// fields the local text scan searches when a descriptor names none.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResourceSchema {
    attributes: Vec<(String, AttributeType)>,
    search_fields: Vec<String>,
}

impl ResourceSchema {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attributes: Vec::new(),
            search_fields: Vec::new(),
        }
    }

    /// Shared empty schema for resources with storage but no declared attributes.
    #[must_use]
    pub fn empty() -> &'static Self {
        &EMPTY_SCHEMA
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = ty,
            None => self.attributes.push((name, ty)),
        }

        self
    }

    #[must_use]
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<AttributeType> {
        self.attributes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, ty)| *ty)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, AttributeType)> {
        self.attributes.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    #[must_use]
    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    /// Resolve an attribute's type, including the two implicit attributes.
    #[must_use]
    pub fn attribute_type(&self, name: &str) -> Option<AttributeType> {
        match name {
            ID_ATTRIBUTE => Some(AttributeType::String),
            CREATED_TIME_ATTRIBUTE => Some(AttributeType::Date),
            _ => self.attribute(name),
        }
    }

    /// Every attribute a sort may reference: `id`, `created_time`, then declared.
    #[must_use]
    pub fn sortable_attributes(&self) -> Vec<String> {
        [ID_ATTRIBUTE, CREATED_TIME_ATTRIBUTE]
            .into_iter()
            .map(str::to_string)
            .chain(
                self.attributes
                    .iter()
                    .map(|(name, _)| name.clone())
                    .filter(|name| name != ID_ATTRIBUTE && name != CREATED_TIME_ATTRIBUTE),
            )
            .collect()
    }

    /// Validate one sort attribute against the allow-list.
    pub fn validate_sort_attribute(&self, attribute: &str) -> Result<(), CompileError> {
        if self.attribute_type(attribute).is_some() {
            Ok(())
        } else {
            Err(CompileError::UnknownSortAttribute {
                attribute: attribute.to_string(),
                supported: self.sortable_attributes(),
            })
        }
    }

    /// Whether an ORDER BY term over these attributes needs the
    /// case-insensitive variant. Only a term made entirely of declared
    /// non-string attributes skips it.
    #[must_use]
    pub fn needs_collation<S: AsRef<str>>(&self, attributes: &[S]) -> bool {
        attributes.iter().any(|attribute| {
            self.attribute_type(attribute.as_ref())
                .is_none_or(AttributeType::is_textual)
        })
    }
}

///
/// StorageEntry
/// Backing table, full-text index and local collection for one resource.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StorageEntry {
    pub table: String,
    pub fts_table: String,
    pub collection: String,
}

impl StorageEntry {
    /// Entry whose full-text index is `<table>_fts` and collection is `<table>`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();

        Self {
            fts_table: fts_table_name(&table),
            collection: table.clone(),
            table,
        }
    }

    #[must_use]
    pub fn with_fts_table(mut self, fts_table: impl Into<String>) -> Self {
        self.fts_table = fts_table.into();
        self
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }
}

/// Conventional full-text index name for a table.
#[must_use]
pub fn fts_table_name(table: &str) -> String {
    format!("{table}_fts")
}

///
/// Catalog
///
/// Schema provider plus resource-to-storage table, consulted read-only for
/// the duration of one compilation.
///

pub trait Catalog: Send + Sync {
    fn schema(&self, resource: &str) -> Option<&ResourceSchema>;

    fn storage(&self, resource: &str) -> Option<&StorageEntry>;
}

///
/// StaticCatalog
/// In-memory catalog built in code or loaded from configuration.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StaticCatalog {
    schemas: BTreeMap<String, ResourceSchema>,
    storage: BTreeMap<String, StorageEntry>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource with its schema and a default storage entry.
    #[must_use]
    pub fn with_resource(self, resource: impl Into<String>, schema: ResourceSchema) -> Self {
        let resource = resource.into();
        let storage = StorageEntry::new(resource.clone());

        self.with_schema(resource.clone(), schema)
            .with_storage(resource, storage)
    }

    #[must_use]
    pub fn with_schema(mut self, resource: impl Into<String>, schema: ResourceSchema) -> Self {
        self.schemas.insert(resource.into(), schema);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, resource: impl Into<String>, storage: StorageEntry) -> Self {
        self.storage.insert(resource.into(), storage);
        self
    }

    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.storage.keys().map(String::as_str)
    }
}

impl Catalog for StaticCatalog {
    fn schema(&self, resource: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource)
    }

    fn storage(&self, resource: &str) -> Option<&StorageEntry> {
        self.storage.get(resource)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn target_schema() -> ResourceSchema {
        ResourceSchema::new()
            .with_attribute("name", AttributeType::String)
            .with_attribute("port", AttributeType::Number)
            .with_attribute("updated_time", AttributeType::Date)
    }

    #[test]
    fn implicit_attributes_are_sortable() {
        let schema = ResourceSchema::new();

        assert!(schema.validate_sort_attribute("id").is_ok());
        assert!(schema.validate_sort_attribute("created_time").is_ok());
    }

    #[test]
    fn unknown_sort_attribute_lists_supported_set() {
        let err = target_schema()
            .validate_sort_attribute("color")
            .unwrap_err();

        assert_eq!(
            err,
            CompileError::UnknownSortAttribute {
                attribute: "color".to_string(),
                supported: vec![
                    "id".to_string(),
                    "created_time".to_string(),
                    "name".to_string(),
                    "port".to_string(),
                    "updated_time".to_string(),
                ],
            }
        );
        assert!(err.to_string().contains("'color'"));
    }

    #[test]
    fn collation_skipped_only_for_all_non_string_terms() {
        let schema = target_schema();

        assert!(schema.needs_collation(&["name"]));
        assert!(schema.needs_collation(&["port", "id"]));
        assert!(!schema.needs_collation(&["port", "updated_time"]));
        assert!(!schema.needs_collation(&["created_time"]));
    }

    #[test]
    fn storage_entry_defaults_follow_table_name() {
        let entry = StorageEntry::new("target");

        assert_eq!(entry.fts_table, "target_fts");
        assert_eq!(entry.collection, "target");
    }

    #[test]
    fn with_resource_registers_schema_and_storage() {
        let catalog = StaticCatalog::new().with_resource("target", target_schema());

        assert!(catalog.schema("target").is_some());
        assert_eq!(catalog.storage("target").map(|s| s.table.as_str()), Some("target"));
        assert!(catalog.storage("alias").is_none());
    }
}
