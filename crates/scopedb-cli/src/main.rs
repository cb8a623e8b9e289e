use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use scopedb_core::{
    db::{
        catalog::{Catalog, StaticCatalog},
        compile_daemon_query, compile_sql,
        descriptor::QueryDescriptor,
        query_local_collection,
        store::{MemoryStore, Record},
    },
    error::QueryError,
};
use serde::Serialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

///
/// Cli
///

#[derive(Debug, Parser)]
#[command(name = "scopedb", version, about = "Compile and run ScopeDB query descriptors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile a descriptor to parameterized SQL.
    Sql(ResourceArgs),

    /// Compile a descriptor to a search daemon expression.
    Daemon {
        /// Descriptor JSON file; omitted means an empty descriptor.
        #[arg(long)]
        descriptor: Option<PathBuf>,
    },

    /// Run a descriptor against a JSON array of local records.
    Local {
        #[command(flatten)]
        target: ResourceArgs,

        #[arg(long)]
        records: PathBuf,
    },
}

#[derive(Debug, Args)]
struct ResourceArgs {
    /// Catalog TOML file.
    #[arg(long, env = "SCOPEDB_CATALOG")]
    catalog: PathBuf,

    #[arg(long)]
    resource: String,

    /// Descriptor JSON file; omitted means an empty descriptor.
    #[arg(long)]
    descriptor: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");

    match cli.command {
        Command::Sql(args) => {
            let catalog = load_catalog(&args.catalog)?;
            let descriptor = read_descriptor(args.descriptor.as_deref())?;
            let compiled = compile_sql(&args.resource, &descriptor, &catalog)?;

            print_json(&compiled)
        }
        Command::Daemon { descriptor } => {
            let descriptor = read_descriptor(descriptor.as_deref())?;
            let expression = compile_daemon_query(&descriptor);
            debug!(found = expression.is_some(), "compiled daemon expression");

            print_json(&expression)
        }
        Command::Local { target, records } => {
            let catalog = load_catalog(&target.catalog)?;
            let descriptor = read_descriptor(target.descriptor.as_deref())?;
            let records: Vec<Record> = read_json(&records)?;

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .context("failed to start runtime")?;
            let matched = runtime.block_on(run_local(
                &catalog,
                &target.resource,
                &descriptor,
                records,
            ))?;
            info!(matched = matched.len(), "local query complete");

            print_json(&matched)
        }
    }
}

async fn run_local(
    catalog: &StaticCatalog,
    resource: &str,
    descriptor: &QueryDescriptor,
    records: Vec<Record>,
) -> Result<Vec<Record>, QueryError> {
    let collection = catalog
        .storage(resource)
        .map_or(resource, |storage| storage.collection.as_str());
    let store = MemoryStore::new().with_collection(collection, records);

    query_local_collection(&store, catalog, resource, descriptor).await
}

fn load_catalog(path: &Path) -> Result<StaticCatalog> {
    let catalog = scopedb_config::load_catalog(path)?;
    info!(
        path = %path.display(),
        resources = catalog.resources().count(),
        "catalog loaded"
    );

    Ok(catalog)
}

fn read_descriptor(path: Option<&Path>) -> Result<QueryDescriptor> {
    path.map_or_else(|| Ok(QueryDescriptor::new()), read_json::<QueryDescriptor>)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("invalid json in '{}'", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);

    Ok(())
}

fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

///
/// TESTS
///
