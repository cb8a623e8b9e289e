//! TOML catalog configuration.
//!
//! A catalog file declares, per resource, its backing storage names and
//! its attribute types:
//!
//! ```toml
//! [resources.target]
//! table = "target"
//! search_fields = ["name", "description"]
//!
//! [resources.target.attributes]
//! name = "string"
//! port = "number"
//! ```
//!
//! Every name that later reaches generated SQL is validated at load time.

use scopedb_core::{
    db::{
        catalog::{AttributeType, ResourceSchema, StaticCatalog, StorageEntry, fts_table_name},
        descriptor::OrderedMap,
        ident::is_safe_identifier,
    },
    error::ErrorClass,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;
use tracing::debug;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read catalog '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("resource '{resource}': {message}")]
    Invalid { resource: String, message: String },
}

impl ConfigError {
    /// Configuration problems are caller errors and are never retried.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::Validation
    }

    fn invalid(resource: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            resource: resource.to_string(),
            message: message.into(),
        }
    }
}

///
/// CatalogConfig
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub resources: OrderedMap<ResourceConfig>,
}

///
/// ResourceConfig
///
/// Storage names default from the resource name: table `<resource>`,
/// full-text index `<table>_fts`, collection `<table>`.
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    pub table: Option<String>,
    pub fts_table: Option<String>,
    pub collection: Option<String>,
    #[serde(default)]
    pub search_fields: Vec<String>,
    #[serde(default)]
    pub attributes: OrderedMap<AttributeType>,
}

impl CatalogConfig {
    /// Validate every resource and build the catalog.
    pub fn into_catalog(self) -> Result<StaticCatalog, ConfigError> {
        let mut catalog = StaticCatalog::new();

        for (resource, config) in self.resources {
            let (schema, storage) = config.resolve(&resource)?;
            catalog = catalog
                .with_schema(resource.clone(), schema)
                .with_storage(resource, storage);
        }

        Ok(catalog)
    }
}

impl ResourceConfig {
    fn resolve(self, resource: &str) -> Result<(ResourceSchema, StorageEntry), ConfigError> {
        check(resource, "resource name", resource)?;

        let table = self.table.unwrap_or_else(|| resource.to_string());
        check(resource, "table", &table)?;

        let fts_table = self.fts_table.unwrap_or_else(|| fts_table_name(&table));
        check(resource, "fts_table", &fts_table)?;

        let collection = self.collection.unwrap_or_else(|| table.clone());
        if collection.is_empty() {
            return Err(ConfigError::invalid(resource, "collection name is empty"));
        }

        let mut schema = ResourceSchema::new().with_search_fields(self.search_fields);
        for (attribute, ty) in self.attributes {
            check(resource, "attribute", &attribute)?;
            schema = schema.with_attribute(attribute, ty);
        }

        let storage = StorageEntry::new(table)
            .with_fts_table(fts_table)
            .with_collection(collection);

        Ok((schema, storage))
    }
}

fn check(resource: &str, what: &str, ident: &str) -> Result<(), ConfigError> {
    if is_safe_identifier(ident) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            resource,
            format!("{what} '{ident}' is not a valid identifier"),
        ))
    }
}

/// Parse a catalog from TOML text.
pub fn parse_catalog(source: &str) -> Result<StaticCatalog, ConfigError> {
    let config: CatalogConfig = toml::from_str(source)?;

    config.into_catalog()
}

/// Read and parse a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<StaticCatalog, ConfigError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = parse_catalog(&source)?;
    debug!(
        path = %path.display(),
        resources = catalog.resources().count(),
        "loaded catalog"
    );

    Ok(catalog)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use scopedb_core::db::catalog::Catalog;

    const CATALOG: &str = r#"
        [resources.target]
        search_fields = ["name", "description"]

        [resources.target.attributes]
        name = "string"
        port = "number"
        updated_time = "date"

        [resources.host_catalog]
        table = "host_catalogs"
        fts_table = "host_catalog_search"
        collection = "host-catalogs"
    "#;

    #[test]
    fn storage_names_default_from_resource() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let storage = catalog.storage("target").unwrap();

        assert_eq!(storage.table, "target");
        assert_eq!(storage.fts_table, "target_fts");
        assert_eq!(storage.collection, "target");
    }

    #[test]
    fn explicit_storage_names_are_kept() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let storage = catalog.storage("host_catalog").unwrap();

        assert_eq!(storage.table, "host_catalogs");
        assert_eq!(storage.fts_table, "host_catalog_search");
        assert_eq!(storage.collection, "host-catalogs");
    }

    #[test]
    fn attributes_keep_declaration_order() {
        let catalog = parse_catalog(CATALOG).unwrap();
        let schema = catalog.schema("target").unwrap();

        assert_eq!(
            schema.sortable_attributes(),
            ["id", "created_time", "name", "port", "updated_time"]
        );
        assert_eq!(schema.attribute("port"), Some(AttributeType::Number));
        assert_eq!(schema.search_fields(), ["name", "description"]);
    }

    #[test]
    fn unsafe_table_names_are_rejected() {
        let err = parse_catalog(
            r#"
            [resources.target]
            table = "target; DROP TABLE target"
            "#,
        )
        .unwrap_err();

        assert!(matches!(&err, ConfigError::Invalid { resource, .. } if resource == "target"));
        assert!(err.to_string().contains("is not a valid identifier"));
    }

    #[test]
    fn unknown_attribute_types_fail_to_parse() {
        let err = parse_catalog(
            r#"
            [resources.target.attributes]
            name = "text"
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
        assert_eq!(err.class(), ErrorClass::Validation);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_catalog("[resources.target]\nindex = \"x\"\n").is_err());
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_catalog("/nonexistent/scopedb/catalog.toml").unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/scopedb/catalog.toml"));
    }

    #[test]
    fn empty_file_is_an_empty_catalog() {
        let catalog = parse_catalog("").unwrap();

        assert_eq!(catalog.resources().count(), 0);
    }
}
