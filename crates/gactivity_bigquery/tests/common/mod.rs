// Shared helpers for the BigQuery integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use gactivity_bigquery::{BigQueryClient, StaticToken};
use gactivity_config::BigQueryConfig;
use serde_json::{json, Value};
use wiremock::MockServer;

pub const PROJECT: &str = "test-project";

pub fn config(server: &MockServer) -> BigQueryConfig {
    BigQueryConfig {
        project_id: PROJECT.to_string(),
        dataset: "demo".to_string(),
        api_base: server.uri(),
        query_timeout_ms: 1000,
        ..Default::default()
    }
}

pub fn client(server: &MockServer) -> BigQueryClient {
    BigQueryClient::with_client(
        reqwest::Client::new(),
        &config(server),
        Arc::new(StaticToken("sa-token".to_string())),
    )
}

pub fn dataset_json(id: &str) -> Value {
    json!({
        "datasetReference": { "projectId": PROJECT, "datasetId": id },
        "location": "EU"
    })
}

pub fn table_json(dataset: &str, table: &str, fields: Value) -> Value {
    json!({
        "tableReference": { "projectId": PROJECT, "datasetId": dataset, "tableId": table },
        "numRows": "3",
        "schema": { "fields": fields }
    })
}

pub fn string_fields(names: &[&str]) -> Value {
    Value::Array(
        names
            .iter()
            .map(|name| json!({ "name": name, "type": "STRING", "mode": "NULLABLE" }))
            .collect(),
    )
}
