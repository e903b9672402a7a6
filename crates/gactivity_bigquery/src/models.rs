//! BigQuery REST v2 resources, trimmed to the fields this crate reads or writes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Datasets & tables ---

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference {
    pub project_id: String,
    pub dataset_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub dataset_reference: DatasetReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetList {
    #[serde(default)]
    pub datasets: Vec<Dataset>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TableFieldSchema {
    pub fn nullable(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
            mode: Some(FieldMode::Nullable.as_str().to_string()),
            description: None,
        }
    }

    /// Missing mode means NULLABLE.
    pub fn field_mode(&self) -> FieldMode {
        self.mode
            .as_deref()
            .map(FieldMode::parse)
            .unwrap_or(FieldMode::Nullable)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&TableFieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Nullable,
    Required,
    Repeated,
}

impl FieldMode {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "REQUIRED" => FieldMode::Required,
            "REPEATED" => FieldMode::Repeated,
            _ => FieldMode::Nullable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Required => "REQUIRED",
            FieldMode::Repeated => "REPEATED",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub table_reference: TableReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// int64 values travel as JSON strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_rows: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableList {
    #[serde(default)]
    pub tables: Vec<Table>,
    pub next_page_token: Option<String>,
}

// --- Queries ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameter {
    pub name: String,
    pub parameter_type: QueryParameterType,
    pub parameter_value: QueryParameterValue,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueryParameterType {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QueryParameterValue {
    /// `None` binds SQL NULL.
    pub value: Option<String>,
}

impl QueryParameter {
    pub fn string(name: &str, value: &str) -> Self {
        Self::typed(name, "STRING", Some(value.to_string()))
    }

    /// Binds a canonical timestamp; an empty value binds NULL.
    pub fn timestamp(name: &str, value: &str) -> Self {
        Self::typed(name, "TIMESTAMP", crate::records::timestamp_literal(value))
    }

    fn typed(name: &str, kind: &str, value: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            parameter_type: QueryParameterType {
                kind: kind.to_string(),
            },
            parameter_value: QueryParameterValue { value },
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub use_legacy_sql: bool,
    pub parameter_mode: String,
    pub query_parameters: Vec<QueryParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub timeout_ms: u64,
    pub format_options: FormatOptions,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    pub use_int64_timestamp: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: Option<String>,
    pub job_id: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ErrorProto {
    pub reason: Option<String>,
    pub message: Option<String>,
}

/// Shared shape of `jobs.query` and `jobs.getQueryResults` responses.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub job_complete: bool,
    pub schema: Option<TableSchema>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    pub page_token: Option<String>,
    pub total_rows: Option<String>,
    pub num_dml_affected_rows: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TableCell {
    #[serde(default)]
    pub v: Value,
}

// --- Inspection summary ---

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldOverview {
    pub name: String,
    pub field_type: String,
    pub mode: String,
    pub description: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableOverview {
    pub table_id: String,
    pub friendly_name: String,
    pub description: String,
    pub total_rows: u64,
    pub fields: Vec<FieldOverview>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub dataset_id: String,
    pub friendly_name: String,
    pub description: String,
    pub location: String,
    pub tables: Vec<TableOverview>,
}
