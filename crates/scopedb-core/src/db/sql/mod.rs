//! Descriptor → parameterized SQL for the embedded relational engine.
//!
//! Compilation lowers the descriptor to a small clause AST and renders it
//! in one pass. Only validated identifiers are interpolated; every value
//! is a `?` placeholder with its parameter in the same position.

mod ast;
mod filter;
mod order;
mod search;
mod select;
mod writer;


use crate::{
    ID_ATTRIBUTE,
    db::{
        catalog::{Catalog, ResourceSchema, StorageEntry},
        descriptor::{Join, QueryDescriptor},
        filter::filter_groups,
        ident,
    },
    error::CompileError,
    value::Value,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use ast::{Expr, Qualifier};
use writer::SqlWriter;

pub use search::match_pattern;

///
/// CompiledSql
/// SQL text plus positional parameters in placeholder order.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompiledSql {
    pub sql: String,
    pub parameters: Vec<Value>,
}

impl CompiledSql {
    /// Unfiltered form for resources with no storage mapping.
    fn minimal(resource: &str) -> Self {
        Self {
            sql: format!("SELECT * FROM {}", ident::quoted(resource)),
            parameters: Vec::new(),
        }
    }

    /// Number of `?` placeholders in the SQL text.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

/// Compile a descriptor for one resource into SQL text and parameters.
pub fn compile_sql(
    resource: &str,
    descriptor: &QueryDescriptor,
    catalog: &dyn Catalog,
) -> Result<CompiledSql, CompileError> {
    let Some(storage) = catalog.storage(resource) else {
        debug!(resource, "no storage mapping; compiling minimal query");
        return Ok(CompiledSql::minimal(resource));
    };
    let schema = catalog.schema(resource).unwrap_or(ResourceSchema::empty());

    let compiled = SqlCompiler {
        storage,
        schema,
        catalog,
    }
    .compile(descriptor)?;

    debug!(
        resource,
        parameters = compiled.parameters.len(),
        sql = %compiled.sql,
        "compiled sql query"
    );

    Ok(compiled)
}

///
/// SqlCompiler
/// Per-call compilation state. Nothing outlives one `compile_sql` call.
///

struct SqlCompiler<'a> {
    storage: &'a StorageEntry,
    schema: &'a ResourceSchema,
    catalog: &'a dyn Catalog,
}

impl SqlCompiler<'_> {
    fn compile(&self, descriptor: &QueryDescriptor) -> Result<CompiledSql, CompileError> {
        let table = ident::checked(&self.storage.table, "table")?;
        let root = Qualifier::Table(table.to_string());

        let select = select::render_select(&descriptor.select, table)?;

        let mut groups = self.lower_groups(descriptor, &root)?;
        let (join_sql, join_groups) = self.lower_joins(&descriptor.joins, table)?;
        groups.extend(join_groups);

        let mut trailing = Vec::new();
        if let Some(search) = &descriptor.search {
            trailing.extend(search::lower_search(search, self.storage, self.catalog)?);
        }

        let order = order::lower_order(descriptor.sort.as_ref(), table, self.schema)?;

        let mut writer = SqlWriter::new();
        writer.push(&format!("SELECT {select} FROM \"{table}\""));
        writer.push(&join_sql);
        writer.where_clause(&groups, &trailing);
        writer.order_clause(&order);
        if let Some((limit, offset)) = descriptor.pagination.and_then(|p| p.window()) {
            writer.limit_clause(limit, offset);
        }

        Ok(writer.finish())
    }

    fn lower_groups(
        &self,
        descriptor: &QueryDescriptor,
        qualifier: &Qualifier,
    ) -> Result<Vec<Expr>, CompileError> {
        let mut exprs = Vec::new();
        for group in filter_groups(&descriptor.filters) {
            exprs.extend(filter::lower_group(&group, qualifier)?);
        }

        Ok(exprs)
    }

    // Joins render in declaration order. Repeated resources get `name1`,
    // `name2`, … aliases from a counter scoped to this call.
    fn lower_joins(&self, joins: &[Join], table: &str) -> Result<(String, Vec<Expr>), CompileError> {
        let mut sql = String::new();
        let mut groups = Vec::new();
        let mut alias_counts: BTreeMap<&str, usize> = BTreeMap::new();

        for join in joins {
            let resource = ident::checked(&join.resource, "join resource")?;
            let count = alias_counts.entry(resource).or_insert(0);
            *count += 1;
            let alias = format!("{resource}{count}");

            let join_table = self
                .catalog
                .storage(resource)
                .map_or(resource, |storage| storage.table.as_str());
            let join_table = ident::checked(join_table, "join table")?;
            let join_from = ident::checked(
                join.join_from.as_deref().unwrap_or(ID_ATTRIBUTE),
                "join column",
            )?;
            let join_on = ident::checked(&join.join_on, "join column")?;

            sql.push_str(&format!(
                " {} JOIN \"{join_table}\" {alias} ON \"{table}\".{join_from} = {alias}.{join_on}",
                join.join_type.keyword()
            ));

            groups.extend(self.lower_groups(&join.query, &Qualifier::Alias(alias))?);
        }

        Ok((sql, groups))
    }
}
