use crate::{
    CREATED_TIME_ATTRIBUTE,
    db::{
        catalog::ResourceSchema,
        descriptor::{Sort, SortDirection},
        ident,
        sql::ast::{Column, OrderKey, OrderTerm, Qualifier},
    },
    error::CompileError,
    value::Value,
};

/// Lower the descriptor's sort to ORDER BY terms.
///
/// Without a sort the newest rows come first. Each sorted attribute is
/// emitted once case-insensitively and once raw, unless its declared type
/// is not a string. A custom sort map replaces the column with a CASE
/// expression and never collates.
pub(crate) fn lower_order(
    sort: Option<&Sort>,
    table: &str,
    schema: &ResourceSchema,
) -> Result<Vec<OrderTerm>, CompileError> {
    let qualifier = Qualifier::Table(table.to_string());

    let Some(sort) = sort else {
        return Ok(vec![created_time_term(&qualifier, SortDirection::Desc)]);
    };

    let direction = sort.resolved_direction()?;
    if sort.attributes.is_empty() {
        return Ok(vec![created_time_term(&qualifier, direction)]);
    }

    let mut columns = Vec::with_capacity(sort.attributes.len());
    for attribute in &sort.attributes {
        schema.validate_sort_attribute(attribute)?;
        let name = ident::checked(attribute, "sort column")?;
        columns.push(Column::new(&qualifier, name));
    }

    if let Some(custom) = &sort.custom_sort {
        let arms = custom
            .attribute_map
            .iter()
            .map(|(raw, key)| (Value::Text(raw.clone()), key.clone()))
            .collect::<Vec<_>>();

        return Ok(columns
            .into_iter()
            .map(|column| OrderTerm {
                key: if arms.is_empty() {
                    OrderKey::Column(column)
                } else {
                    OrderKey::Case {
                        column,
                        arms: arms.clone(),
                    }
                },
                collate_nocase: false,
                direction,
            })
            .collect());
    }

    if sort.is_coalesced {
        let collate = schema.needs_collation(&sort.attributes);
        return Ok(collated_pair(OrderKey::Coalesce(columns), collate, direction));
    }

    Ok(sort
        .attributes
        .iter()
        .zip(columns)
        .flat_map(|(attribute, column)| {
            let collate = schema.needs_collation(std::slice::from_ref(attribute));
            collated_pair(OrderKey::Column(column), collate, direction)
        })
        .collect())
}

// Case-insensitive term first, raw term second, for a stable display order.
fn collated_pair(key: OrderKey, collate: bool, direction: SortDirection) -> Vec<OrderTerm> {
    let raw = OrderTerm {
        key: key.clone(),
        collate_nocase: false,
        direction,
    };

    if collate {
        vec![
            OrderTerm {
                key,
                collate_nocase: true,
                direction,
            },
            raw,
        ]
    } else {
        vec![raw]
    }
}

fn created_time_term(qualifier: &Qualifier, direction: SortDirection) -> OrderTerm {
    OrderTerm {
        key: OrderKey::Column(Column::new(qualifier, CREATED_TIME_ATTRIBUTE)),
        collate_nocase: false,
        direction,
    }
}
