//! Query compilation layer.
//!
//! One backend-agnostic [`QueryDescriptor`](descriptor::QueryDescriptor) is
//! compiled into three executable forms:
//!
//! - [`sql`]: parameterized SQL for the embedded relational engine
//! - [`collection`]: index-seeded operations against a local ordered store
//! - [`daemon`]: one expression in the search daemon's query language
//!
//! All compilers are pure functions of (resource, descriptor, catalog).

pub mod catalog;
pub mod collection;
pub mod daemon;
pub mod descriptor;
pub mod filter;
pub mod ident;
pub mod mapper;
pub mod sql;
pub mod store;

pub use collection::{CollectionPlan, compile_collection_plan, query_local_collection};
pub use daemon::{compile_daemon_expression, compile_daemon_query};
pub use sql::{CompiledSql, compile_sql};
