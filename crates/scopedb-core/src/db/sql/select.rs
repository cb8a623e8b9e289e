use crate::{db::descriptor::SelectField, db::ident, error::CompileError};

const STAR: &str = "*";

/// Render the select list. An empty list selects `*`.
///
/// Two or more distinct entries form one multi-column `DISTINCT`; the
/// engine cannot mix that row shape with plain or aggregate columns.
pub(crate) fn render_select(fields: &[SelectField], table: &str) -> Result<String, CompileError> {
    if fields.is_empty() {
        return Ok(STAR.to_string());
    }

    let distinct = fields.iter().filter(|f| f.is_distinct).count();
    if distinct >= 2 {
        let conflicting = fields
            .iter()
            .filter(|f| !f.is_distinct)
            .map(|f| f.field.clone())
            .collect::<Vec<_>>();

        if !conflicting.is_empty() {
            return Err(CompileError::MultiColumnDistinct {
                distinct: fields
                    .iter()
                    .filter(|f| f.is_distinct)
                    .map(|f| f.field.clone())
                    .collect(),
                conflicting,
            });
        }

        let columns = fields
            .iter()
            .map(|field| render_field(field, table, field.is_count))
            .collect::<Result<Vec<_>, _>>()?;

        return Ok(format!("DISTINCT {}", columns.join(", ")));
    }

    let columns = fields
        .iter()
        .map(|field| render_field(field, table, field.is_distinct))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(columns.join(", "))
}

fn render_field(field: &SelectField, table: &str, distinct: bool) -> Result<String, CompileError> {
    let mut column = if field.field == STAR {
        STAR.to_string()
    } else {
        let name = ident::checked(&field.field, "column")?;
        format!("\"{table}\".{name}")
    };

    if distinct {
        column = format!("DISTINCT {column}");
    }
    if field.is_count {
        column = format!("count({column})");
    }
    if let Some(alias) = &field.alias {
        let alias = ident::checked(alias, "alias")?;
        column = format!("{column} as {alias}");
    }

    Ok(column)
}
