//! Shared condition grammar.
//!
//! Every backend reads filter groups through the same normalization:
//! a group's conditions fold into [`GroupPart`]s so that equality lists,
//! null checks and comparisons mean the same thing whether they are
//! rendered as SQL text or evaluated against local records.

#[cfg(test)]
mod tests;

use crate::{
    db::descriptor::{Condition, Filters, LogicalOperator},
    value::Value,
};

///
/// FilterGroup
///
/// All conditions for one attribute, combined by the group's operator.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterGroup<'a> {
    pub attribute: &'a str,
    pub operator: LogicalOperator,
    pub conditions: &'a [Condition],
}

/// Collect the non-empty filter groups in descriptor order.
#[must_use]
pub fn filter_groups(filters: &Filters) -> Vec<FilterGroup<'_>> {
    filters
        .iter()
        .filter(|(_, spec)| !spec.conditions().is_empty())
        .map(|(attribute, spec)| FilterGroup {
            attribute,
            operator: spec.logical_operator(),
            conditions: spec.conditions(),
        })
        .collect()
}

///
/// CompareOp
/// Single-value comparison operators.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

///
/// GroupPart
///
/// One normalized clause of a filter group.
///
/// A group made only of `equals` folds into a single `Membership`: the
/// non-null values become one membership test and an `equals: null`
/// becomes a separate null check. A group made only of `notEquals` folds
/// into the `Exclusion` mirror. Any other group keeps one part per
/// condition, so the group operator still joins every condition.
/// Comparisons and `contains` against a null value constrain nothing and
/// are dropped.
///

#[derive(Clone, Debug, PartialEq)]
pub enum GroupPart<'a> {
    Membership {
        values: Vec<&'a Value>,
        include_null: bool,
    },
    Exclusion {
        values: Vec<&'a Value>,
        exclude_null: bool,
    },
    Compare {
        op: CompareOp,
        value: &'a Value,
    },
    IsNull {
        negated: bool,
    },
    Contains(&'a Value),
}

impl<'a> GroupPart<'a> {
    fn single(condition: &'a Condition) -> Option<Self> {
        let (op, value) = match condition {
            Condition::Equals(value) if value.is_null() => {
                return Some(Self::IsNull { negated: false });
            }
            Condition::NotEquals(value) if value.is_null() => {
                return Some(Self::IsNull { negated: true });
            }
            Condition::Equals(value) => (CompareOp::Eq, value),
            Condition::NotEquals(value) => (CompareOp::Ne, value),
            Condition::Contains(value) => {
                return (!value.is_null()).then_some(Self::Contains(value));
            }
            Condition::Gt(value) => (CompareOp::Gt, value),
            Condition::Gte(value) => (CompareOp::Gte, value),
            Condition::Lt(value) => (CompareOp::Lt, value),
            Condition::Lte(value) => (CompareOp::Lte, value),
        };

        (!value.is_null()).then_some(Self::Compare { op, value })
    }
}

impl<'a> FilterGroup<'a> {
    /// Fold the group's conditions into parts, in condition order.
    #[must_use]
    pub fn parts(&self) -> Vec<GroupPart<'a>> {
        if let Some(part) = self.equality_list() {
            return vec![part];
        }

        self.conditions.iter().filter_map(GroupPart::single).collect()
    }

    // The folded part of an all-equals or all-notEquals group.
    fn equality_list(&self) -> Option<GroupPart<'a>> {
        let negated = matches!(self.conditions.first()?, Condition::NotEquals(_));
        let mut values = Vec::with_capacity(self.conditions.len());
        let mut null = false;

        for condition in self.conditions {
            let value = match (condition, negated) {
                (Condition::Equals(value), false) | (Condition::NotEquals(value), true) => value,
                _ => return None,
            };

            if value.is_null() {
                null = true;
            } else {
                values.push(value);
            }
        }

        Some(if negated {
            GroupPart::Exclusion {
                values,
                exclude_null: null,
            }
        } else {
            GroupPart::Membership {
                values,
                include_null: null,
            }
        })
    }
}
