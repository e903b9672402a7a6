//! BigQuery REST client against a mocked API.

mod common;

use common::{client, dataset_json, string_fields, table_json, PROJECT};
use gactivity_bigquery::{
    BigQueryError, ColumnChanges, DatasetCatalog, QueryParameter, SelectQuery, TableFieldSchema,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_select_sql() {
    let sql = SelectQuery::all("drive_activity")
        .filter("lower(userAction) LIKE lower(@p)", vec![QueryParameter::string("p", "%a%")])
        .order_by_desc(&["timeActivity", "activityId"])
        .to_sql(PROJECT, "demo")
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM `test-project.demo.drive_activity` WHERE lower(userAction) LIKE lower(@p) \
         ORDER BY timeActivity,activityId DESC"
    );

    let err = SelectQuery::all("bad`table").to_sql(PROJECT, "demo").unwrap_err();
    assert!(matches!(err, BigQueryError::InvalidIdentifier(_)));
}

#[tokio::test]
async fn test_existing_dataset_is_not_created_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo"))
        .and(header("authorization", "Bearer sa-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dataset_json("demo")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/datasets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!client(&server).create_dataset("demo").await.unwrap());
}

#[tokio::test]
async fn test_missing_table_is_created_with_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo/tables/calendar_collection"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found: Table"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/datasets/demo/tables"))
        .and(body_partial_json(json!({
            "tableReference": { "tableId": "calendar_collection" },
            "schema": { "fields": [{ "name": "eventId", "type": "STRING", "mode": "NULLABLE" }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json(
            "demo",
            "calendar_collection",
            string_fields(&["eventId"]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let schema = gactivity_bigquery::TableSchema {
        fields: vec![TableFieldSchema::nullable("eventId", "STRING")],
    };
    assert!(client(&server)
        .create_table("demo", "calendar_collection", schema)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_required_column_rejected_on_existing_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo/tables/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json(
            "demo",
            "t1",
            string_fields(&["a"]),
        )))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut column = TableFieldSchema::nullable("b", "STRING");
    column.mode = Some("REQUIRED".to_string());
    let err = client(&server).add_column("demo", "t1", column).await.unwrap_err();
    assert!(matches!(err, BigQueryError::SchemaError(message) if message.contains("Required field (b)")));
}

#[tokio::test]
async fn test_nullable_column_is_appended() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo/tables/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json(
            "demo",
            "t1",
            string_fields(&["a"]),
        )))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/projects/test-project/datasets/demo/tables/t1"))
        .and(body_partial_json(json!({ "schema": { "fields": [
            { "name": "a" }, { "name": "b", "type": "STRING" }
        ] } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json(
            "demo",
            "t1",
            string_fields(&["a", "b"]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .add_column("demo", "t1", TableFieldSchema::nullable("b", "STRING"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_column_changes_run_ddl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo/tables/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json(
            "demo",
            "t1",
            json!([{ "name": "title", "type": "STRING", "mode": "REQUIRED" }]),
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/queries"))
        .and(body_string_contains("RENAME COLUMN `name` TO `title`"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobComplete": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/queries"))
        .and(body_string_contains("ALTER COLUMN `title` DROP NOT NULL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobComplete": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/queries"))
        .and(body_string_contains("SET DEFAULT 'it\\\\'s'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "jobComplete": true })))
        .expect(1)
        .mount(&server)
        .await;

    let changes = ColumnChanges {
        new_name: Some("title".to_string()),
        nullable: true,
        default_value: Some("it's".to_string()),
        ..Default::default()
    };
    client(&server)
        .change_column_properties("demo", "t1", "name", &changes)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_query_polls_and_follows_pages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/queries"))
        .and(body_partial_json(json!({
            "useLegacySql": false,
            "parameterMode": "NAMED",
            "formatOptions": { "useInt64Timestamp": true },
            "queryParameters": [{
                "name": "email_pattern",
                "parameterType": { "type": "STRING" },
                "parameterValue": { "value": "%alice%" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobReference": { "projectId": PROJECT, "jobId": "job-1", "location": "EU" },
            "jobComplete": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/queries/job-1"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobComplete": true,
            "rows": [{ "f": [{ "v": "second" }] }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/queries/job-1"))
        .and(query_param("location", "EU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobComplete": true,
            "schema": { "fields": [{ "name": "name", "type": "STRING" }] },
            "rows": [{ "f": [{ "v": "first" }] }],
            "pageToken": "p2"
        })))
        .mount(&server)
        .await;

    let output = client(&server)
        .query(
            "SELECT name FROM t WHERE name LIKE @email_pattern",
            vec![QueryParameter::string("email_pattern", "%alice%")],
        )
        .await
        .unwrap();

    let names: Vec<&str> = output
        .rows
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn test_insert_rows_binds_typed_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/queries"))
        .and(body_string_contains(
            "INSERT INTO `test-project.demo.t1` (`id`, `at`) VALUES (@r0_c0, @r0_c1), (@r1_c0, @r1_c1)",
        ))
        .and(body_partial_json(json!({ "queryParameters": [
            { "name": "r0_c0", "parameterType": { "type": "STRING" }, "parameterValue": { "value": "a" } },
            { "name": "r0_c1", "parameterType": { "type": "TIMESTAMP" },
              "parameterValue": { "value": "2024-05-01 10:00:00.000 UTC" } },
            { "name": "r1_c0", "parameterType": { "type": "STRING" }, "parameterValue": { "value": "b" } },
            { "name": "r1_c1", "parameterType": { "type": "TIMESTAMP" }, "parameterValue": { "value": null } }
        ] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobComplete": true,
            "numDmlAffectedRows": "2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let inserted = client(&server)
        .insert_rows(
            "demo",
            "t1",
            &["id", "at"],
            &["at"],
            &[
                vec!["a".to_string(), "2024-05-01T10:00:00.000Z".to_string()],
                vec!["b".to_string(), String::new()],
            ],
        )
        .await
        .unwrap();
    assert_eq!(inserted, 2);
}

#[tokio::test]
async fn test_failed_query_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/projects/test-project/queries"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Syntax error"))
        .mount(&server)
        .await;

    let err = client(&server).execute("SELEC 1", Vec::new()).await.unwrap_err();
    assert!(matches!(err, BigQueryError::ApiError { status: 400, .. }));
}

#[tokio::test]
async fn test_datasets_overview() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "datasets": [dataset_json("demo")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(dataset_json("demo")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo/tables"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tables": [{ "tableReference": { "projectId": PROJECT, "datasetId": "demo", "tableId": "t1" } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/projects/test-project/datasets/demo/tables/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(table_json(
            "demo",
            "t1",
            string_fields(&["a", "b"]),
        )))
        .mount(&server)
        .await;

    let overview = client(&server).datasets_overview().await.unwrap();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].dataset_id, "demo");
    assert_eq!(overview[0].location, "EU");
    assert_eq!(overview[0].friendly_name, "No friendly name");
    let table = &overview[0].tables[0];
    assert_eq!(table.table_id, "t1");
    assert_eq!(table.total_rows, 3);
    assert_eq!(table.fields.len(), 2);
    assert_eq!(table.fields[0].description, "No description");
}

#[tokio::test]
async fn test_delete_dataset_drops_contents() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/projects/test-project/datasets/demo"))
        .and(query_param("deleteContents", "true"))
        .and(header("authorization", "Bearer sa-token"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).delete_dataset("demo").await.unwrap();
}

#[tokio::test]
async fn test_delete_table() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/projects/test-project/datasets/demo/tables/drive_activity"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/projects/test-project/datasets/demo/tables/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found: Table gone"))
        .mount(&server)
        .await;

    let client = client(&server);
    client.delete_table("demo", "drive_activity").await.unwrap();
    let err = client.delete_table("demo", "gone").await.unwrap_err();
    assert!(err.is_not_found());
}
