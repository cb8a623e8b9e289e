//! One console descriptor compiled for every backend.

use scopedb_core::{
    db::{
        compile_daemon_query, compile_sql, query_local_collection,
        store::{MemoryStore, record_key},
    },
    prelude::*,
};
use serde_json::json;

const DESCRIPTOR: &str = r#"{
    "filters": {
        "type": [{ "equals": "ssh" }],
        "status": [{ "equals": "active" }, { "equals": "pending" }, { "equals": null }],
        "name": { "logicalOperator": "and", "values": [{ "contains": "prod" }], "deletedAt": null }
    },
    "sort": { "attributes": ["name", "id"], "isCoalesced": true, "direction": "desc" },
    "pagination": { "page": 3, "pageSize": 10 }
}"#;

fn catalog() -> StaticCatalog {
    StaticCatalog::new().with_resource(
        "target",
        ResourceSchema::new()
            .with_attribute("type", AttributeType::String)
            .with_attribute("status", AttributeType::String)
            .with_attribute("name", AttributeType::String),
    )
}

fn descriptor() -> QueryDescriptor {
    serde_json::from_str(DESCRIPTOR).expect("console descriptor should parse")
}

#[test]
fn console_descriptor_compiles_to_sql() {
    let compiled = compile_sql("target", &descriptor(), &catalog()).unwrap();

    assert_eq!(
        compiled.sql,
        concat!(
            r#"SELECT * FROM "target""#,
            r#" WHERE ("target".type = ?)"#,
            r#" AND ("target".status IN (?, ?) OR "target".status IS NULL)"#,
            r#" AND ("target".name LIKE ?)"#,
            r#" ORDER BY COALESCE("target".name, "target".id) COLLATE NOCASE DESC,"#,
            r#" COALESCE("target".name, "target".id) DESC"#,
            r#" LIMIT ? OFFSET ?"#,
        )
    );
    assert_eq!(
        compiled.parameters,
        [
            Value::from("ssh"),
            Value::from("active"),
            Value::from("pending"),
            Value::from("%prod%"),
            Value::Int(10),
            Value::Int(20),
        ]
    );
    assert_eq!(compiled.placeholder_count(), compiled.parameters.len());
}

#[test]
fn console_descriptor_compiles_to_daemon_expression() {
    assert_eq!(
        compile_daemon_query(&descriptor()).as_deref(),
        Some(r#"(type = "ssh") and (status = "active" or status = "pending") and (name % "prod")"#)
    );
}

#[tokio::test]
async fn console_descriptor_runs_against_local_store() {
    let store = MemoryStore::new().with_collection(
        "target",
        vec![
            json!({ "id": "t_1", "attributes": { "type": "ssh", "status": "active", "name": "prod-east" } }),
            json!({ "id": "t_2", "attributes": { "type": "ssh", "status": "closed", "name": "prod-west" } }),
            json!({ "id": "t_3", "attributes": { "type": "ssh", "name": "Prod staging" } }),
            json!({ "id": "t_4", "attributes": { "type": "tcp", "status": "active", "name": "prod-db" } }),
            json!({ "id": "t_5", "attributes": { "type": "ssh", "status": "pending", "name": "bastion" } }),
        ],
    );

    let records = query_local_collection(&store, &catalog(), "target", &descriptor())
        .await
        .unwrap();
    let ids = records.iter().filter_map(record_key).collect::<Vec<_>>();

    assert_eq!(ids, ["t_1", "t_3"]);
}

#[test]
fn unmapped_resource_ignores_descriptor() {
    let compiled = compile_sql("worker", &descriptor(), &catalog()).unwrap();

    assert_eq!(compiled.sql, r#"SELECT * FROM "worker""#);
    assert!(compiled.parameters.is_empty());
}
