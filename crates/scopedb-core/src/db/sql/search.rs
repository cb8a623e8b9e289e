use crate::{
    ID_ATTRIBUTE,
    db::{
        catalog::{Catalog, StorageEntry, fts_table_name},
        descriptor::{RelatedSearch, Search},
        ident,
        sql::ast::{Column, Expr, MatchBranch, Qualifier},
    },
    error::CompileError,
    value::Value,
};

/// Lower a search into one `IN (SELECT … MATCH ? UNION …)` term over the
/// resource's full-text index and any related indexes. Blank text adds
/// no constraint.
pub(crate) fn lower_search(
    search: &Search,
    storage: &StorageEntry,
    catalog: &dyn Catalog,
) -> Result<Option<Expr>, CompileError> {
    let text = search.text();
    if text.is_empty() {
        return Ok(None);
    }

    let table = ident::checked(&storage.table, "table")?;
    let fts = ident::checked(&storage.fts_table, "full-text table")?;
    let select = search.select().column();

    let mut branches = vec![MatchBranch {
        head: format!("SELECT {select} FROM {fts} WHERE {fts}"),
        pattern: match_pattern(text, search.fields()),
    }];

    for related in search.related_searches() {
        branches.push(related_branch(related, text, table, select, catalog)?);
    }

    Ok(Some(Expr::InSubquery {
        column: Column::new(&Qualifier::Table(table.to_string()), select),
        branches,
    }))
}

fn related_branch(
    related: &RelatedSearch,
    text: &str,
    table: &str,
    select: &str,
    catalog: &dyn Catalog,
) -> Result<MatchBranch, CompileError> {
    let fts = catalog
        .storage(&related.resource)
        .map_or_else(|| fts_table_name(&related.resource), |s| s.fts_table.clone());
    let fts = ident::checked(&fts, "full-text table")?;
    let join_on = ident::checked(&related.join.join_on, "join column")?;
    let join_from = ident::checked(
        related.join.join_from.as_deref().unwrap_or(ID_ATTRIBUTE),
        "join column",
    )?;

    Ok(MatchBranch {
        head: format!(
            "SELECT \"{table}\".{select} FROM {fts} JOIN \"{table}\" ON \"{table}\".{join_from} = {fts}.{join_on} WHERE {fts}"
        ),
        pattern: match_pattern(text, &related.fields),
    })
}

/// Prefix-match expression for one search text: `"text"*` unqualified, or
/// `field:"text"*` per field joined with OR.
pub fn match_pattern(text: &str, fields: &[String]) -> Value {
    let term = format!("\"{}\"*", text.replace('"', "\"\""));

    if fields.is_empty() {
        return Value::Text(term);
    }

    Value::Text(
        fields
            .iter()
            .map(|field| format!("{field}:{term}"))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}
