//! Descriptor → index-seeded query against a local ordered store.
//!
//! The first filter group seeds the result through a secondary-index
//! operation. Every later group narrows that seed: `and` groups as
//! in-memory predicates, `or` groups through an independently computed
//! primary-key set. Search runs last as a case-insensitive text scan.

mod predicate;


pub use predicate::{Clause, TextScan};

use crate::{
    db::{
        catalog::{Catalog, ResourceSchema},
        descriptor::{Condition, LogicalOperator, QueryDescriptor},
        filter::{FilterGroup, filter_groups},
        mapper::canonical_to_storage_path,
        store::{IndexQuery, LocalStore, Record, record_key},
    },
    error::{CompileError, QueryError, StoreError},
};
use std::collections::BTreeSet;
use tracing::{debug, trace};

///
/// CollectionPlan
///
/// Compiled form of one descriptor for the local store. Pure data; the
/// same plan can be executed against any [`LocalStore`].
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectionPlan {
    pub seed: Option<SeedPlan>,
    pub groups: Vec<GroupPlan>,
    pub search: Option<TextScan>,
}

///
/// SeedPlan
///
/// The index-backed first group. An `or` seed unions one index query per
/// clause; an `and` seed probes the index with its first clause and
/// checks the rest in memory.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SeedPlan {
    pub attribute: String,
    pub index: Vec<IndexQuery>,
    pub residual: Vec<Clause>,
}

///
/// GroupPlan
///

#[derive(Clone, Debug, PartialEq)]
pub struct GroupPlan {
    pub attribute: String,
    pub operator: LogicalOperator,
    pub clauses: Vec<Clause>,
}

/// Compile a descriptor into a collection plan.
///
/// Groups whose conditions all drop out (empty lists, null comparisons)
/// are removed before the seed is chosen.
pub fn compile_collection_plan(
    descriptor: &QueryDescriptor,
    schema: &ResourceSchema,
) -> Result<CollectionPlan, CompileError> {
    let mut groups = filter_groups(&descriptor.filters)
        .into_iter()
        .map(|group| {
            let path = canonical_to_storage_path(group.attribute);
            let clauses = group
                .parts()
                .iter()
                .map(|part| Clause::from_part(&path, part))
                .collect::<Vec<_>>();

            (group, clauses)
        })
        .filter(|(_, clauses)| !clauses.is_empty())
        .collect::<Vec<_>>()
        .into_iter();

    let seed = groups
        .next()
        .map(|(group, clauses)| seed_plan(&group, clauses))
        .transpose()?;

    let groups = groups
        .map(|(group, clauses)| GroupPlan {
            attribute: group.attribute.to_string(),
            operator: group.operator,
            clauses,
        })
        .collect();

    let search = descriptor.search.as_ref().and_then(|search| {
        let text = search.text();
        if text.is_empty() {
            return None;
        }

        let fields = if search.fields().is_empty() {
            schema.search_fields()
        } else {
            search.fields()
        };

        Some(TextScan::new(text, fields))
    });

    Ok(CollectionPlan {
        seed,
        groups,
        search,
    })
}

fn seed_plan(group: &FilterGroup<'_>, clauses: Vec<Clause>) -> Result<SeedPlan, CompileError> {
    let unsupported = || CompileError::UnsupportedSeedFilter {
        attribute: group.attribute.to_string(),
    };

    if group
        .conditions
        .iter()
        .any(|condition| matches!(condition, Condition::Contains(_)))
    {
        return Err(unsupported());
    }

    let mut clauses = clauses.into_iter();
    let mut index = Vec::new();
    let mut residual = Vec::new();

    match group.operator {
        LogicalOperator::Or => {
            for clause in clauses {
                index.push(clause.as_index().cloned().ok_or_else(unsupported)?);
            }
        }
        LogicalOperator::And => {
            if let Some(first) = clauses.next() {
                index.push(first.as_index().cloned().ok_or_else(unsupported)?);
            }
            residual.extend(clauses);
        }
    }

    Ok(SeedPlan {
        attribute: group.attribute.to_string(),
        index,
        residual,
    })
}

impl CollectionPlan {
    /// Run the plan against one collection.
    pub async fn execute<S: LocalStore + ?Sized>(
        &self,
        store: &S,
        collection: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = match &self.seed {
            Some(seed) => seed.execute(store, collection).await?,
            None => store.all(collection).await?,
        };
        trace!(collection, records = records.len(), "seeded collection query");

        for group in &self.groups {
            if records.is_empty() {
                break;
            }
            records = group.narrow(store, collection, records).await?;
            trace!(
                collection,
                attribute = %group.attribute,
                records = records.len(),
                "narrowed by filter group"
            );
        }

        if let Some(scan) = &self.search {
            records.retain(|record| scan.matches(record));
            trace!(collection, records = records.len(), "applied text search");
        }

        Ok(records)
    }
}

impl SeedPlan {
    async fn execute<S: LocalStore + ?Sized>(
        &self,
        store: &S,
        collection: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = Vec::new();
        let mut seen = BTreeSet::new();

        for query in &self.index {
            trace!(collection, path = %query.path, "index seed query");

            for record in store.query_index(collection, query).await? {
                let fresh = match record_key(&record) {
                    Some(key) => seen.insert(key),
                    None => !records.contains(&record),
                };
                if fresh {
                    records.push(record);
                }
            }
        }

        records.retain(|record| self.residual.iter().all(|clause| clause.matches(record)));

        Ok(records)
    }
}

impl GroupPlan {
    async fn narrow<S: LocalStore + ?Sized>(
        &self,
        store: &S,
        collection: &str,
        mut records: Vec<Record>,
    ) -> Result<Vec<Record>, StoreError> {
        match self.operator {
            LogicalOperator::And => {
                records.retain(|record| self.clauses.iter().all(|clause| clause.matches(record)));
            }
            LogicalOperator::Or => {
                let mut keys = BTreeSet::new();
                for query in self.clauses.iter().filter_map(Clause::as_index) {
                    keys.extend(store.primary_keys(collection, query).await?);
                }

                let in_memory = self
                    .clauses
                    .iter()
                    .filter(|clause| clause.as_index().is_none())
                    .collect::<Vec<_>>();

                records.retain(|record| {
                    record_key(record).is_some_and(|key| keys.contains(&key))
                        || in_memory.iter().any(|clause| clause.matches(record))
                });
            }
        }

        Ok(records)
    }
}

/// Compile and run a descriptor against the local collection backing `resource`.
pub async fn query_local_collection<S: LocalStore + ?Sized>(
    store: &S,
    catalog: &dyn Catalog,
    resource: &str,
    descriptor: &QueryDescriptor,
) -> Result<Vec<Record>, QueryError> {
    let collection = catalog
        .storage(resource)
        .map_or(resource, |storage| storage.collection.as_str());
    let schema = catalog.schema(resource).unwrap_or(ResourceSchema::empty());

    let plan = compile_collection_plan(descriptor, schema)?;
    let records = plan.execute(store, collection).await?;

    debug!(
        resource,
        collection,
        records = records.len(),
        "local collection query complete"
    );

    Ok(records)
}
