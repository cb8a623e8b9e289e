//! Core query compilation for ScopeDB: descriptors, field mapping, and the
//! three backend compilers (embedded SQL, local collection, search daemon).
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod value;

///
/// CONSTANTS
///

/// Attribute every resource can be sorted and filtered by, regardless of schema.
pub const ID_ATTRIBUTE: &str = "id";

/// Creation timestamp column; the default sort key for compiled SQL.
pub const CREATED_TIME_ATTRIBUTE: &str = "created_time";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, or compilers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            catalog::{AttributeType, Catalog, ResourceSchema, StaticCatalog, StorageEntry},
            descriptor::{
                Condition, FilterSpec, Join, JoinType, LogicalOperator, Pagination,
                QueryDescriptor, Search, SearchSpec, SelectField, Sort,
            },
        },
        value::Value,
    };
}
