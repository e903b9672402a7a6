// --- File: crates/gactivity_bigquery/src/client.rs ---
//! BigQuery REST v2 client: dataset/table administration, parameterised
//! queries and DML.

use std::sync::Arc;

use async_trait::async_trait;
use gactivity_common::{CalendarEventRecord, HTTP_CLIENT};
use gactivity_config::BigQueryConfig;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::auth::AccessTokenProvider;
use crate::error::BigQueryError;
use crate::models::{
    Dataset, DatasetList, DatasetOverview, DatasetReference, FieldMode, FieldOverview,
    FormatOptions, JobReference, QueryParameter, QueryRequest, QueryResponse, Table,
    TableFieldSchema, TableList, TableOverview, TableReference, TableSchema,
};
use crate::records::{named_rows, Row};
use crate::schema::CALENDAR_TIMESTAMP_COLUMNS;

/// `getQueryResults` calls made while waiting for one job.
const MAX_POLLS: usize = 30;

/// Rows per INSERT statement; keeps each statement well below the parameter limit.
pub const INSERT_BATCH_ROWS: usize = 200;

/// Dataset, table and column names that may be spliced into SQL text.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 1024
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn identifier(name: &str) -> Result<&str, BigQueryError> {
    if is_valid_identifier(name) {
        Ok(name)
    } else {
        Err(BigQueryError::InvalidIdentifier(name.to_string()))
    }
}

/// Quotes a value as a GoogleSQL string literal.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// `SELECT * FROM table [WHERE ...] [ORDER BY a,b DESC]` with named parameters.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub table: String,
    pub condition: Option<String>,
    pub order_by: Vec<String>,
    pub params: Vec<QueryParameter>,
}

impl SelectQuery {
    pub fn all(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }

    /// `condition` refers to `params` as `@name`.
    pub fn filter(mut self, condition: &str, params: Vec<QueryParameter>) -> Self {
        self.condition = Some(condition.to_string());
        self.params = params;
        self
    }

    pub fn order_by_desc(mut self, columns: &[&str]) -> Self {
        self.order_by = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn to_sql(&self, project_id: &str, dataset: &str) -> Result<String, BigQueryError> {
        let mut sql = format!(
            "SELECT * FROM `{}.{}.{}`",
            project_id,
            identifier(dataset)?,
            identifier(&self.table)?
        );
        if let Some(condition) = self.condition.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        if !self.order_by.is_empty() {
            let columns = self
                .order_by
                .iter()
                .map(|column| identifier(column))
                .collect::<Result<Vec<_>, _>>()?;
            sql.push_str(&format!(" ORDER BY {} DESC", columns.join(",")));
        }
        Ok(sql)
    }
}

/// Column changes applied through DDL, in this order: rename, description,
/// data type, mode, default value.
#[derive(Debug, Clone, Default)]
pub struct ColumnChanges {
    pub new_name: Option<String>,
    pub description: Option<String>,
    pub data_type: Option<String>,
    /// Only REQUIRED -> NULLABLE is supported by BigQuery.
    pub nullable: bool,
    /// REPEATED columns take an array literal such as `["a","b"]`.
    pub default_value: Option<String>,
}

/// Rows and DML count of a finished query.
#[derive(Debug, Default)]
pub struct QueryOutput {
    pub rows: Vec<Row>,
    pub affected_rows: u64,
}

/// Read-only view of the datasets, used by the inspection page.
#[async_trait]
pub trait DatasetCatalog: Send + Sync {
    async fn datasets_overview(&self) -> Result<Vec<DatasetOverview>, BigQueryError>;
}

#[derive(Clone)]
pub struct BigQueryClient {
    http: Client,
    tokens: Arc<dyn AccessTokenProvider>,
    base_url: String,
    project_id: String,
    location: Option<String>,
    query_timeout_ms: u64,
}

impl BigQueryClient {
    pub fn new(config: &BigQueryConfig, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        Self::with_client(HTTP_CLIENT.clone(), config, tokens)
    }

    pub fn with_client(
        http: Client,
        config: &BigQueryConfig,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            http,
            tokens,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            location: config.location.clone(),
            query_timeout_ms: config.query_timeout_ms,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn project_url(&self) -> String {
        format!("{}/projects/{}", self.base_url, self.project_id)
    }

    fn dataset_url(&self, dataset: &str) -> Result<String, BigQueryError> {
        Ok(format!("{}/datasets/{}", self.project_url(), identifier(dataset)?))
    }

    fn table_url(&self, dataset: &str, table: &str) -> Result<String, BigQueryError> {
        Ok(format!(
            "{}/tables/{}",
            self.dataset_url(dataset)?,
            identifier(table)?
        ))
    }

    /// Fully qualified, backquoted table path for SQL text.
    pub fn table_path(&self, dataset: &str, table: &str) -> Result<String, BigQueryError> {
        Ok(format!(
            "`{}.{}.{}`",
            self.project_id,
            identifier(dataset)?,
            identifier(table)?
        ))
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, BigQueryError> {
        let token = self.tokens.access_token().await?;
        Ok(self
            .http
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token)))
    }

    async fn send_raw(request: RequestBuilder) -> Result<reqwest::Response, BigQueryError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BigQueryError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, BigQueryError> {
        Ok(Self::send_raw(request).await?.json::<T>().await?)
    }

    /// `Ok(None)` on 404.
    async fn send_optional<T: DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<Option<T>, BigQueryError> {
        match Self::send(request).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    // --- Datasets ---

    pub async fn list_datasets(&self) -> Result<Vec<Dataset>, BigQueryError> {
        let url = format!("{}/datasets", self.project_url());
        let mut datasets = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.request(Method::GET, &url).await?;
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }
            let page: DatasetList = Self::send(request).await?;
            datasets.extend(page.datasets);
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }
        if datasets.is_empty() {
            info!("Project {} does not contain any datasets", self.project_id);
        }
        Ok(datasets)
    }

    pub async fn get_dataset(&self, dataset: &str) -> Result<Option<Dataset>, BigQueryError> {
        let request = self.request(Method::GET, &self.dataset_url(dataset)?).await?;
        Self::send_optional(request).await
    }

    pub async fn dataset_exists(&self, dataset: &str) -> Result<bool, BigQueryError> {
        Ok(self.get_dataset(dataset).await?.is_some())
    }

    /// Returns `false` when the dataset already exists.
    pub async fn create_dataset(&self, dataset: &str) -> Result<bool, BigQueryError> {
        if self.dataset_exists(dataset).await? {
            warn!("Dataset {} already exists", dataset);
            return Ok(false);
        }
        let body = Dataset {
            dataset_reference: DatasetReference {
                project_id: self.project_id.clone(),
                dataset_id: identifier(dataset)?.to_string(),
            },
            location: self.location.clone(),
            ..Default::default()
        };
        let url = format!("{}/datasets", self.project_url());
        let created: Dataset = Self::send(self.request(Method::POST, &url).await?.json(&body)).await?;
        info!("{} created successfully", created.dataset_reference.dataset_id);
        Ok(true)
    }

    /// Deletes the dataset with all its tables.
    pub async fn delete_dataset(&self, dataset: &str) -> Result<(), BigQueryError> {
        let request = self
            .request(Method::DELETE, &self.dataset_url(dataset)?)
            .await?
            .query(&[("deleteContents", "true")]);
        Self::send_raw(request).await?;
        info!("Dataset {} deleted successfully", dataset);
        Ok(())
    }

    // --- Tables ---

    pub async fn list_tables(&self, dataset: &str) -> Result<Vec<Table>, BigQueryError> {
        let url = format!("{}/tables", self.dataset_url(dataset)?);
        let mut tables = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.request(Method::GET, &url).await?;
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }
            let page: TableList = Self::send(request).await?;
            tables.extend(page.tables);
            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }
        Ok(tables)
    }

    pub async fn get_table(&self, dataset: &str, table: &str) -> Result<Option<Table>, BigQueryError> {
        let request = self.request(Method::GET, &self.table_url(dataset, table)?).await?;
        Self::send_optional(request).await
    }

    pub async fn table_exists(&self, dataset: &str, table: &str) -> Result<bool, BigQueryError> {
        Ok(self.get_table(dataset, table).await?.is_some())
    }

    async fn existing_table(&self, dataset: &str, table: &str) -> Result<Table, BigQueryError> {
        self.get_table(dataset, table)
            .await?
            .ok_or_else(|| BigQueryError::SchemaError(format!("Table {} does not exist", table)))
    }

    /// Returns `false` and leaves the table alone when it already exists.
    pub async fn create_table(
        &self,
        dataset: &str,
        table: &str,
        schema: TableSchema,
    ) -> Result<bool, BigQueryError> {
        if self.table_exists(dataset, table).await? {
            warn!("Table {} already exists! Skipping...", table);
            return Ok(false);
        }
        let body = Table {
            table_reference: TableReference {
                project_id: self.project_id.clone(),
                dataset_id: identifier(dataset)?.to_string(),
                table_id: identifier(table)?.to_string(),
            },
            schema: Some(schema),
            ..Default::default()
        };
        let url = format!("{}/tables", self.dataset_url(dataset)?);
        let _: Table = Self::send(self.request(Method::POST, &url).await?.json(&body)).await?;
        info!("Table {} created successfully", table);
        Ok(true)
    }

    pub async fn delete_table(&self, dataset: &str, table: &str) -> Result<(), BigQueryError> {
        let request = self
            .request(Method::DELETE, &self.table_url(dataset, table)?)
            .await?;
        Self::send_raw(request).await?;
        info!("Table {} in DataSet {} deleted successfully", table, dataset);
        Ok(())
    }

    /// Appends an empty column. REQUIRED columns can only start a new schema.
    pub async fn add_column(
        &self,
        dataset: &str,
        table: &str,
        column: TableFieldSchema,
    ) -> Result<(), BigQueryError> {
        identifier(&column.name)?;
        let existing = self.existing_table(dataset, table).await?;
        let mut schema = existing.schema.unwrap_or_default();

        if !schema.fields.is_empty() && column.field_mode() == FieldMode::Required {
            return Err(BigQueryError::SchemaError(format!(
                "Required field ({}) cannot be added to an existing schema",
                column.name
            )));
        }
        if schema.field(&column.name).is_some() {
            return Err(BigQueryError::SchemaError(format!(
                "Column {} already exists",
                column.name
            )));
        }

        let name = column.name.clone();
        schema.fields.push(column);
        let body = serde_json::json!({ "schema": schema });
        let request = self
            .request(Method::PATCH, &self.table_url(dataset, table)?)
            .await?
            .json(&body);
        let _: Table = Self::send(request).await?;
        info!("Column {} successfully added to table: {}", name, table);
        Ok(())
    }

    /// Applies [`ColumnChanges`] with DDL statements.
    pub async fn change_column_properties(
        &self,
        dataset: &str,
        table: &str,
        column: &str,
        changes: &ColumnChanges,
    ) -> Result<(), BigQueryError> {
        let path = self.table_path(dataset, table)?;
        identifier(column)?;
        self.existing_table(dataset, table).await?;

        let new_name = changes.new_name.as_deref().filter(|name| !name.is_empty());
        if let Some(new_name) = new_name {
            identifier(new_name)?;
            self.execute(
                &format!("ALTER TABLE {} RENAME COLUMN `{}` TO `{}`", path, column, new_name),
                Vec::new(),
            )
            .await?;
            info!("Column: {} renamed to {} successfully", column, new_name);
        }
        let column = new_name.unwrap_or(column);

        if let Some(description) = changes.description.as_deref().filter(|d| !d.is_empty()) {
            self.execute(
                &format!(
                    "ALTER TABLE {} ALTER COLUMN `{}` SET OPTIONS(description={})",
                    path,
                    column,
                    string_literal(description)
                ),
                Vec::new(),
            )
            .await?;
            info!("Column: {} description updated successfully", column);
        }

        if let Some(data_type) = changes.data_type.as_deref() {
            let valid = !data_type.is_empty()
                && data_type
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "_<>(), ".contains(c));
            if !valid {
                return Err(BigQueryError::SchemaError(format!("Invalid data type {}", data_type)));
            }
            self.execute(
                &format!(
                    "ALTER TABLE {} ALTER COLUMN `{}` SET DATA TYPE {}",
                    path, column, data_type
                ),
                Vec::new(),
            )
            .await?;
            info!("Column: {} data type updated successfully", column);
        }

        let mode = self
            .existing_table(dataset, table)
            .await?
            .schema
            .unwrap_or_default()
            .field(column)
            .map(TableFieldSchema::field_mode)
            .ok_or_else(|| BigQueryError::SchemaError(format!("Column {} does not exist", column)))?;

        if changes.nullable {
            match mode {
                FieldMode::Nullable => info!("Column {} is already NULLABLE. Skip....", column),
                FieldMode::Repeated => info!("Column {} is REPEATED. Skip....", column),
                FieldMode::Required => {
                    self.execute(
                        &format!("ALTER TABLE {} ALTER COLUMN `{}` DROP NOT NULL", path, column),
                        Vec::new(),
                    )
                    .await?;
                    info!("Column: {} update to nullable successfully", column);
                }
            }
        }

        if let Some(default_value) = changes.default_value.as_deref().filter(|v| !v.is_empty()) {
            let literal = if mode == FieldMode::Repeated {
                if !default_value.starts_with('[') || !default_value.ends_with(']') {
                    return Err(BigQueryError::SchemaError(
                        "Default value of a REPEATED column must be an array literal".to_string(),
                    ));
                }
                default_value.to_string()
            } else {
                string_literal(default_value)
            };
            self.execute(
                &format!(
                    "ALTER TABLE {} ALTER COLUMN `{}` SET DEFAULT {}",
                    path, column, literal
                ),
                Vec::new(),
            )
            .await?;
            info!("Column: {} default value updated successfully", column);
        }

        Ok(())
    }

    // --- Queries ---

    async fn query_results(
        &self,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse, BigQueryError> {
        let url = format!("{}/queries/{}", self.project_url(), job.job_id);
        let mut params: Vec<(&str, String)> = vec![
            ("timeoutMs", self.query_timeout_ms.to_string()),
            ("formatOptions.useInt64Timestamp", "true".to_string()),
        ];
        if let Some(location) = job.location.as_deref().or(self.location.as_deref()) {
            params.push(("location", location.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        Self::send(self.request(Method::GET, &url).await?.query(&params)).await
    }

    /// Runs a GoogleSQL statement, waits for the job and collects every result page.
    pub async fn query(
        &self,
        sql: &str,
        params: Vec<QueryParameter>,
    ) -> Result<QueryOutput, BigQueryError> {
        debug!("BigQuery: {}", sql);
        let body = QueryRequest {
            query: sql.to_string(),
            use_legacy_sql: false,
            parameter_mode: "NAMED".to_string(),
            query_parameters: params,
            location: self.location.clone(),
            timeout_ms: self.query_timeout_ms,
            format_options: FormatOptions {
                use_int64_timestamp: true,
            },
        };
        let url = format!("{}/queries", self.project_url());
        let mut response: QueryResponse =
            Self::send(self.request(Method::POST, &url).await?.json(&body)).await?;

        let job = response.job_reference.clone();
        let mut polls = 0;
        while !response.job_complete {
            let job = job
                .as_ref()
                .ok_or_else(|| BigQueryError::JobError("Job no longer exists".to_string()))?;
            polls += 1;
            if polls > MAX_POLLS {
                return Err(BigQueryError::Timeout(job.job_id.clone()));
            }
            response = self.query_results(job, None).await?;
        }

        if !response.errors.is_empty() {
            let messages: Vec<String> = response
                .errors
                .iter()
                .filter_map(|error| error.message.clone())
                .collect();
            return Err(BigQueryError::JobError(messages.join("; ")));
        }

        let schema = response.schema.clone().unwrap_or_default();
        let affected_rows = response
            .num_dml_affected_rows
            .as_deref()
            .and_then(|count| count.parse().ok())
            .unwrap_or(0);
        let mut rows = named_rows(&schema, &response.rows);

        let mut page_token = response.page_token.take();
        while let Some(token) = page_token {
            let job = job
                .as_ref()
                .ok_or_else(|| BigQueryError::JobError("Job no longer exists".to_string()))?;
            let page = self.query_results(job, Some(&token)).await?;
            rows.extend(named_rows(&schema, &page.rows));
            page_token = page.page_token;
        }

        Ok(QueryOutput {
            rows,
            affected_rows,
        })
    }

    pub async fn select(&self, dataset: &str, query: &SelectQuery) -> Result<Vec<Row>, BigQueryError> {
        let sql = query.to_sql(&self.project_id, dataset)?;
        Ok(self.query(&sql, query.params.clone()).await?.rows)
    }

    /// DDL or DML; returns the number of affected rows.
    pub async fn execute(
        &self,
        sql: &str,
        params: Vec<QueryParameter>,
    ) -> Result<u64, BigQueryError> {
        Ok(self.query(sql, params).await?.affected_rows)
    }

    /// Inserts rows with parameterised `INSERT ... VALUES` statements.
    ///
    /// `rows` hold cells in `columns` order; cells of `timestamp_columns` are
    /// bound as TIMESTAMP.
    pub async fn insert_rows(
        &self,
        dataset: &str,
        table: &str,
        columns: &[&str],
        timestamp_columns: &[&str],
        rows: &[Vec<String>],
    ) -> Result<u64, BigQueryError> {
        let path = self.table_path(dataset, table)?;
        let column_list = columns
            .iter()
            .map(|column| identifier(column).map(|c| format!("`{}`", c)))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_BATCH_ROWS) {
            let mut params = Vec::with_capacity(chunk.len() * columns.len());
            let mut tuples = Vec::with_capacity(chunk.len());
            for (row_index, row) in chunk.iter().enumerate() {
                let mut names = Vec::with_capacity(columns.len());
                for (column_index, (column, cell)) in columns.iter().zip(row).enumerate() {
                    let name = format!("r{}_c{}", row_index, column_index);
                    params.push(if timestamp_columns.contains(column) {
                        QueryParameter::timestamp(&name, cell)
                    } else {
                        QueryParameter::string(&name, cell)
                    });
                    names.push(format!("@{}", name));
                }
                tuples.push(format!("({})", names.join(", ")));
            }
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                path,
                column_list,
                tuples.join(", ")
            );
            inserted += self.execute(&sql, params).await?;
        }
        Ok(inserted)
    }

    /// Overwrites every column of the stored event with the same `eventId`.
    pub async fn update_calendar_event(
        &self,
        dataset: &str,
        table: &str,
        record: &CalendarEventRecord,
    ) -> Result<u64, BigQueryError> {
        let (sql, params) = calendar_update_statement(&self.table_path(dataset, table)?, record);
        self.execute(&sql, params).await
    }
}

/// `UPDATE path SET col = @col, ... WHERE eventId = @eventId`
pub fn calendar_update_statement(
    path: &str,
    record: &CalendarEventRecord,
) -> (String, Vec<QueryParameter>) {
    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for (column, cell) in CalendarEventRecord::COLUMNS.iter().zip(record.cells()) {
        params.push(if CALENDAR_TIMESTAMP_COLUMNS.contains(column) {
            QueryParameter::timestamp(column, &cell)
        } else {
            QueryParameter::string(column, &cell)
        });
        if *column != "eventId" {
            assignments.push(format!("{} = @{}", column, column));
        }
    }
    let sql = format!(
        "UPDATE {} SET {} WHERE eventId = @eventId",
        path,
        assignments.join(", ")
    );
    (sql, params)
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

#[async_trait]
impl DatasetCatalog for BigQueryClient {
    async fn datasets_overview(&self) -> Result<Vec<DatasetOverview>, BigQueryError> {
        let mut overview = Vec::new();
        for listed in self.list_datasets().await? {
            let dataset_id = listed.dataset_reference.dataset_id.clone();
            debug!("Dataset ID: {}", dataset_id);
            let dataset = self.get_dataset(&dataset_id).await?.unwrap_or(listed);

            let mut tables = Vec::new();
            for listed_table in self.list_tables(&dataset_id).await? {
                let table_id = listed_table.table_reference.table_id.clone();
                let Some(table) = self.get_table(&dataset_id, &table_id).await? else {
                    continue;
                };
                let fields = table
                    .schema
                    .unwrap_or_default()
                    .fields
                    .into_iter()
                    .map(|field| FieldOverview {
                        mode: field.field_mode().as_str().to_string(),
                        name: field.name,
                        field_type: field.field_type,
                        description: or_placeholder(field.description, "No description"),
                    })
                    .collect();
                tables.push(TableOverview {
                    table_id,
                    friendly_name: or_placeholder(table.friendly_name, "No friendly name"),
                    description: or_placeholder(table.description, "No description"),
                    total_rows: table
                        .num_rows
                        .as_deref()
                        .and_then(|rows| rows.parse().ok())
                        .unwrap_or(0),
                    fields,
                });
            }

            overview.push(DatasetOverview {
                dataset_id,
                friendly_name: or_placeholder(dataset.friendly_name, "No friendly name"),
                description: or_placeholder(dataset.description, "No description"),
                location: dataset.location.unwrap_or_default(),
                tables,
            });
        }
        Ok(overview)
    }
}

impl std::fmt::Debug for BigQueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigQueryClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish()
    }
}

